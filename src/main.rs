use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

use citekey::server::Backend;

/// Language server for BibTeX citation keys in Markdown and LaTeX documents.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Use a TCP server instead of stdio
    #[arg(long)]
    tcp: bool,

    /// Bind to this address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind to this port
    #[arg(long, default_value_t = 2087)]
    port: u16,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_env("CITEKEY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Can't create log file {}", path.display()))?;
            subscriber.with_writer(Mutex::new(file)).init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let (service, socket) = LspService::new(Backend::new);

    if args.tcp {
        let listener = TcpListener::bind((args.host.as_str(), args.port))
            .await
            .with_context(|| format!("Can't bind {}:{}", args.host, args.port))?;
        info!("Listening on {}", listener.local_addr()?);

        let (stream, peer) = listener.accept().await?;
        info!("Client connected from {peer}");

        let (read, write) = tokio::io::split(stream);
        Server::new(read, write, socket).serve(service).await;
    } else {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();

        Server::new(stdin, stdout, socket).serve(service).await;
    }

    info!("Client disconnected");
    Ok(())
}
