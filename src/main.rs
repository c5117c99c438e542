use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use spindle::config::Config;
use spindle::handler::TextHandler;
use spindle::routing::Router;
use spindle::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let router = if cfg.routes.is_empty() {
        Router::new().route("/", |_, _| Ok(Box::new(TextHandler::new("Hello world"))))?
    } else {
        Router::from_entries(&cfg.routes, cfg.server.static_chunk_size)?
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let settings = cfg.server.clone();
    let mut event_loop = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut server = Server::bind(&settings, router)?;
        server.run(&flag)
    });

    tokio::select! {
        res = &mut event_loop => {
            res??;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            shutdown.store(true, Ordering::Relaxed);
            event_loop.await??;
        }
    }

    Ok(())
}
