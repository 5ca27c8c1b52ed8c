//! Build the static site

use anyhow::Result;
use notify::Watcher;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::content::ContentLoader;
use crate::generator::Generator;
use crate::Site;

/// Run a full build: load, validate, compile and generate.
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let index = ContentLoader::new(&site.base_dir, &site.config).load()?;
    Generator::new(&site.base_dir, &site.config)?.generate(&index)?;

    tracing::info!("built in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Watch content and config for changes, rebuilding on each burst
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(site.content_dir.as_ref(), notify::RecursiveMode::Recursive)?;

    let static_dir = site.base_dir.join("static");
    if static_dir.exists() {
        watcher.watch(&static_dir, notify::RecursiveMode::Recursive)?;
    }

    let config_path = site.base_dir.join("_config.yml");
    if config_path.exists() {
        watcher.watch(
            Path::new(&config_path),
            notify::RecursiveMode::NonRecursive,
        )?;
    }

    tracing::info!("watching for changes, press Ctrl+C to stop");

    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("change detected, rebuilding");
                    if let Err(e) = run(site) {
                        tracing::error!("build failed: {:#}", e);
                    }
                    last_rebuild = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
