use lazybundle::{
    Loader,
    fetch::deferred::DeferredFetch,
    request::{LoadRequest, ReadyOptions},
};
use lazybundle_http::HttpResourceFetch;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    /* ANCHOR: main */
    let loader = Loader::default()
        // HTTP fetch is blocking, so we run it on background threads.
        .with_fetch(DeferredFetch::new(HttpResourceFetch::new(
            "https://cdnjs.cloudflare.com/ajax/libs/",
        )?));

    loader.load(
        LoadRequest::new([
            "jquery/3.7.1/jquery.min.js",
            "css://normalize/8.0.1/normalize.min.css",
        ])
        .bundle("vendor")
        .attribute("crossorigin", "anonymous"),
    )?;
    loader.ready(
        "vendor",
        ReadyOptions::default()
            .success(|| println!("Vendor bundle is ready"))
            .error(|failed| println!("Failed bundles: {:?}", failed)),
    );

    // Wait till loader is busy.
    while loader.is_busy() {
        println!("Waiting for loader: {:?}", loader.progress());
        loader.maintain()?;
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    if let Some(jquery) = loader.resource("jquery/3.7.1/jquery.min.js") {
        println!("jQuery: {} bytes", jquery.bytes.len());
    }
    /* ANCHOR_END: main */

    Ok(())
}
