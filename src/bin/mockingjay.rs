//! mockingjay CLI binary.
//!
//! Serves stub files over HTTP and inspects what they answer.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use mockingjay::cli::{Cli, Command};
use mockingjay::output::{PrettyPrint, Resolution, StubRow};
use mockingjay::{Request, StubFile, StubServer, Stubs};
use tabled::Table;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> mockingjay::Result<()> {
    match cli.command {
        Command::Serve { stubs, addr } => handle_serve(&stubs, addr).await,
        Command::Check { stubs } => handle_check(&stubs, cli.json),
        Command::Resolve { stubs, method, url } => handle_resolve(&stubs, &method, &url, cli.json),
    }
}

fn load(path: &Path) -> mockingjay::Result<Stubs> {
    let stubs = Stubs::new();
    StubFile::load(path)?.register(&stubs)?;
    Ok(stubs)
}

async fn handle_serve(path: &Path, addr: SocketAddr) -> mockingjay::Result<()> {
    let stubs = load(path)?;
    let server = StubServer::start_on(addr, stubs).await?;
    eprintln!("Serving {} stubs on {}", server.stubs().len(), server.url());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown().await;
    Ok(())
}

fn handle_check(path: &Path, json: bool) -> mockingjay::Result<()> {
    let stubs = load(path)?;
    let rows: Vec<StubRow> = stubs
        .list()
        .iter()
        .enumerate()
        .map(|(i, stub)| StubRow::new(i + 1, stub))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No stubs defined.");
    } else {
        println!("{}", Table::new(&rows));
        println!("\n{} stubs OK", rows.len());
    }
    Ok(())
}

fn handle_resolve(path: &Path, method: &str, url: &str, json: bool) -> mockingjay::Result<()> {
    let stubs = load(path)?;

    let url = url::Url::parse(url)?;
    let request = Request::builder()
        .method(method.to_ascii_uppercase().as_str())
        .uri(url.as_str())
        .body(())?;

    let Some(stub) = stubs.find(&request) else {
        return Err(mockingjay::MockingjayError::Unmatched {
            method: request.method().to_string(),
            uri: request.uri().to_string(),
        });
    };
    let response = stub.respond(&request);

    if json {
        let resolution = Resolution::new(&stub, &response);
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("Stub {} ({})\n", stub.id(), stub.description());
        println!("{}", response.pretty_print());
    }
    Ok(())
}
