#![warn(missing_docs)]
//! blobrelay upload binary: push a directory of content-addressed blobs into
//! a store, skipping what the catalog already holds.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blobrelay_store::{FsStore, FsStoreFactory};
use blobrelay_upload::{Stopper, Uploader, UploaderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: blobrelay-upload <blob-dir> <store-root>");
        std::process::exit(1);
    }
    let blob_dir = PathBuf::from(&args[1]);
    let store_root = PathBuf::from(&args[2]);

    let catalog = Arc::new(FsStore::open(&store_root).await?);
    let stores = Arc::new(FsStoreFactory::new(&store_root));

    let stopper = Stopper::new();
    tokio::spawn({
        let stopper = stopper.clone();
        async move {
            shutdown_signal().await;
            tracing::warn!("shutdown signal received");
            stopper.stop();
        }
    });

    let uploader = Uploader::new(UploaderConfig::default(), catalog, stores)?;
    uploader.run(&blob_dir, &stopper).await?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
