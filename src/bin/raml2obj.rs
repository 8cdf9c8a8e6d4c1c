//! raml2obj CLI
//!
//! Command-line interface for turning a RAML description into enriched JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use raml2obj::{parse, Source};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raml2obj")]
#[command(about = "Enrich a RAML API description into a JSON object tree")]
#[command(version)]
struct Cli {
    /// RAML source: file path, URL (http:// or https://), or - for stdin
    source: String,

    /// Output file (stdout if not specified)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

async fn run(cli: Cli) -> Result<(), u8> {
    let source = if cli.source == "-" {
        let mut content = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut content)
            .await
            .map_err(|e| {
                eprintln!("Error reading stdin: {}", e);
                3u8
            })?;
        Source::Bytes(content)
    } else {
        Source::Text(cli.source)
    };

    let doc = parse(source).await.map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if cli.pretty {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match cli.output {
        Some(path) => {
            tokio::fs::write(&path, &json_output).await.map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}
