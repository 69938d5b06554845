use futures::{channel::oneshot, executor::block_on};
use lazybundle::{
    Loader,
    fetch::{FetchError, future::FutureFetch},
    request::LoadRequest,
};
use std::{error::Error, path::PathBuf, thread::spawn};

fn main() -> Result<(), Box<dyn Error>> {
    /* ANCHOR: main */
    // Future fetch polls futures on every maintenance. Here futures are fed by
    // plain threads, but any async runtime works the same way.
    let loader = Loader::default().with_fetch(FutureFetch::new(|request| {
        let (sender, receiver) = oneshot::channel();
        let path = PathBuf::from("resources").join(request.path.path());
        spawn(move || {
            let _ = sender.send(std::fs::read(path));
        });
        async move {
            match receiver.await {
                Ok(result) => result.map_err(FetchError::from),
                Err(error) => Err(FetchError::from(error)),
            }
        }
    }));

    loader.load(LoadRequest::new("vendor/jquery.js").bundle("jquery"))?;
    loader.load(LoadRequest::new("app.js").bundle("app"))?;
    let ready = loader.ready_future(["jquery", "app"]);

    while loader.is_busy() {
        loader.maintain()?;
    }
    // Bundles are published by now, so future resolves right away.
    block_on(ready)?;
    println!("jQuery and app are ready");
    /* ANCHOR_END: main */

    Ok(())
}
