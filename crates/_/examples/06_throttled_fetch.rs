use lazybundle::{
    Loader,
    fetch::{
        file::FileResourceFetch,
        throttled::{ThrottledFetch, ThrottledFetchStrategy},
    },
    request::LoadRequest,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    /* ANCHOR: main */
    let loader = Loader::default().with_fetch(ThrottledFetch::new(
        FileResourceFetch::default().with_root("resources"),
        // Here we set the strategy to allow only 1 fetch per maintenance tick.
        // You can also limit fetches by time duration per maintenance tick.
        ThrottledFetchStrategy::Number(1),
    ));

    loader.load(
        LoadRequest::new(["vendor/jquery.js", "vendor/plugin.js", "app.js"]).bundle("scripts"),
    )?;

    let mut ticks = 0;
    while loader.is_busy() {
        loader.maintain()?;
        ticks += 1;
        println!("Tick {}: {:?}", ticks, loader.progress());
    }
    println!("Scripts published: {}", loader.is_published("scripts"));
    /* ANCHOR_END: main */

    Ok(())
}
