use lazybundle::{
    Loader,
    fetch::{file::FileResourceFetch, immediate::ImmediateFetch},
    request::{LoadArg, ReadyOptions},
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    /* ANCHOR: main */
    let loader = Loader::default()
        .with_fetch(ImmediateFetch::new(FileResourceFetch::default().with_root("resources")));

    // Plugin depends on jQuery, so we only start loading it once jQuery is ready.
    let plugin_loader = loader.clone();
    loader.ready(
        "jquery",
        ReadyOptions::default().success(move || {
            println!("jQuery is ready, loading plugin");
            if let Err(error) = plugin_loader.load_with(
                ["vendor/plugin.js", "vendor/missing-locale.js"],
                [
                    LoadArg::bundle("plugin"),
                    LoadArg::callback(|_| println!("Plugin loaded")),
                    LoadArg::callback(|missing| println!("Plugin is missing: {:?}", missing)),
                ],
            ) {
                println!("Could not load plugin: {}", error);
            }
        }),
    );

    // Bundles that are not loaded from resources can be marked as done manually.
    loader.ready(
        ["jquery", "plugin", "inline-config"],
        ReadyOptions::default()
            .success(|| println!("All dependencies are ready"))
            .error(|failed| println!("Dependencies that failed: {:?}", failed)),
    );
    loader.done("inline-config")?;

    loader.load_with("vendor/jquery.js", [LoadArg::bundle("jquery")])?;

    while loader.is_busy() {
        loader.maintain()?;
    }
    /* ANCHOR_END: main */

    Ok(())
}
