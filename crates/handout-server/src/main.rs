use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handout_core::Registry;
use handout_server::{net, routes, state::AppState};

#[derive(Parser)]
#[command(name = "handout", version, about = "Share local files over HTTP on your network")]
struct Cli {
    /// Files to share at startup
    paths: Vec<PathBuf>,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handout=info,handout_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let registry = Arc::new(Registry::new());
    let base_url = format!("http://{}:{}", net::local_ip(), cli.port);

    let (shared, failed) = register_paths(&registry, &cli.paths, &base_url);
    if shared > 0 || failed > 0 {
        println!("{shared} file(s) shared, {failed} failed");
    }
    println!("Listing at {base_url}/");
    println!("Enter more paths (one per line) to share them.");

    let app = routes::router(AppState::new(registry.clone())).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "handout serving");

    // Registration flow and serving flow run independently; they share
    // nothing but the registry.
    tokio::spawn(accept_stdin_paths(registry, base_url));

    axum::serve(listener, app).await?;
    Ok(())
}

fn register_paths(registry: &Registry, paths: &[PathBuf], base_url: &str) -> (usize, usize) {
    let mut shared = 0;
    let mut failed = 0;
    for path in paths {
        match registry.register(path) {
            Ok(id) => {
                println!("{} -> {base_url}/download/{id}", path.display());
                shared += 1;
            }
            Err(e) => {
                eprintln!("skipping {}: {e}", path.display());
                failed += 1;
            }
        }
    }
    (shared, failed)
}

/// Accept file paths typed on stdin while the server runs, one per line.
async fn accept_stdin_paths(registry: Arc<Registry>, base_url: String) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let path = line.trim();
                if path.is_empty() {
                    continue;
                }
                match registry.register(path) {
                    Ok(id) => println!("{path} -> {base_url}/download/{id}"),
                    Err(e) => eprintln!("skipping {path}: {e}"),
                }
            }
            Ok(None) => {
                tracing::debug!("stdin closed, no further interactive registrations");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed reading stdin");
                break;
            }
        }
    }
}
