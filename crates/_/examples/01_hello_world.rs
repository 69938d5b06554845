use lazybundle::{
    Loader,
    fetch::{file::FileResourceFetch, immediate::ImmediateFetch},
    request::{LoadRequest, ReadyOptions},
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    /* ANCHOR: main */
    // Fetch engine tells how and when resources get fetched, resource fetch
    // tells where bytes come from.
    let loader = Loader::default()
        .with_fetch(ImmediateFetch::new(FileResourceFetch::default().with_root("resources")));

    // Loading defines bundle right away, callbacks fire once all its resources report.
    loader.load(
        LoadRequest::new(["vendor/jquery.js", "styles/theme.css"])
            .bundle("vendor")
            .on_success(|| println!("Vendor bundle loaded"))
            .on_error(|missing| println!("Vendor bundle is missing: {:?}", missing)),
    )?;

    // Anyone can wait for bundles, even before they got defined.
    loader.ready(
        ["vendor", "app"],
        ReadyOptions::default()
            .success(|| println!("Everything is ready"))
            .error(|failed| println!("Failed bundles: {:?}", failed)),
    );
    loader.load(LoadRequest::new("app.js").bundle("app"))?;

    // Results are only processed during maintenance.
    while loader.is_busy() {
        loader.maintain()?;
    }

    let jquery = loader.resource("vendor/jquery.js").ok_or("jQuery is not loaded")?;
    println!(
        "`{}` ({}): {}",
        jquery.path,
        jquery.kind.mime_type(),
        String::from_utf8_lossy(&jquery.bytes)
    );
    /* ANCHOR_END: main */

    Ok(())
}
