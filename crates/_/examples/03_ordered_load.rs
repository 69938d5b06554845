use lazybundle::{
    Loader,
    fetch::{deferred::DeferredFetch, file::FileResourceFetch},
    request::LoadRequest,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    /* ANCHOR: main */
    // Deferred fetch runs every fetch on its own background thread.
    let loader = Loader::default()
        .with_fetch(DeferredFetch::new(FileResourceFetch::default().with_root("resources")));

    // Scripts that depend on each other can be loaded in order - next fetch
    // starts only after previous one reported.
    loader.load(
        LoadRequest::new(["vendor/jquery.js", "vendor/plugin.js", "app.js"])
            .bundle("ordered")
            .asynchronous(false)
            .on_success(|| println!("Scripts loaded in order")),
    )?;

    while loader.is_busy() {
        loader.maintain()?;
        let progress = loader.progress();
        println!(
            "Progress: {:.0}% ({} awaiting)",
            progress.factor() * 100.0,
            progress.awaiting
        );
    }
    /* ANCHOR_END: main */

    Ok(())
}
