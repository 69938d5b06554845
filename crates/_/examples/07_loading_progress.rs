use lazybundle::{
    Loader, LoaderConfig,
    bundle::loading::{BundlesLoadingStatus, BundlesLoadingTracker},
    fetch::{
        file::FileResourceFetch,
        throttled::{ThrottledFetch, ThrottledFetchStrategy},
    },
    request::LoadRequest,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    /* ANCHOR: main */
    // Loader defaults can come from config file.
    let config = LoaderConfig::from_file("resources/loader.json")?;
    let loader = Loader::new(config).with_fetch(ThrottledFetch::new(
        FileResourceFetch::default().with_root("resources"),
        ThrottledFetchStrategy::Number(1),
    ));

    let styles = loader.load(LoadRequest::new("styles/theme.css"))?;
    loader.load(LoadRequest::new(["vendor/jquery.js", "vendor/plugin.js"]).bundle("vendor"))?;
    loader.load(LoadRequest::new(["app.js", "app.css"]).bundle("app"))?;

    let tracker = BundlesLoadingTracker::default()
        .with(styles)
        .with_many(["vendor", "app", "analytics"]);
    let mut status = BundlesLoadingStatus::list();
    while loader.is_busy() {
        loader.maintain()?;
        tracker.report(&loader, &mut status);
        println!("Loading: {:.0}%", status.progress().factor() * 100.0);
    }
    println!("Final status: {:#?}", status);
    /* ANCHOR_END: main */

    Ok(())
}
