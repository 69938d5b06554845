use lazybundle::{
    Loader,
    bundle::events::{LoaderEvent, LoaderEventKind},
    fetch::{file::FileResourceFetch, immediate::ImmediateFetch},
    request::LoadRequest,
};
use std::{error::Error, sync::mpsc::channel};

fn main() -> Result<(), Box<dyn Error>> {
    /* ANCHOR: main */
    let loader = Loader::default()
        .with_fetch(ImmediateFetch::new(FileResourceFetch::default().with_root("resources")));

    // Closure listeners react to events as they happen.
    loader
        .events()
        .bind(|event: LoaderEvent| -> Result<(), Box<dyn Error>> {
            if event.kind.failure() {
                println!("Resource failed: {:?}", event.path);
            }
            Ok(())
        });
    // Channel senders collect events for later processing.
    let (tx, rx) = channel::<LoaderEvent>();
    loader.events().bind(tx);

    loader.load(LoadRequest::new(["app.js", "does-not-exist.js"]).bundle("app"))?;
    while loader.is_busy() {
        loader.maintain()?;
    }

    for event in rx.try_iter() {
        match event.kind {
            LoaderEventKind::BundleDefined | LoaderEventKind::BundlePublished => {
                println!("{:?}: bundle `{}`", event.kind, event.bundle)
            }
            kind => println!("{:?}: `{:?}` of `{}`", kind, event.path, event.bundle),
        }
    }
    /* ANCHOR_END: main */

    Ok(())
}
