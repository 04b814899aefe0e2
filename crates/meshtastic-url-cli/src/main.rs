//! `mturl`: decode Meshtastic share URLs from the command line.
//!
//! ```text
//! mturl https://meshtastic.org/e/#CgcSAQE6AggNEgwIATgBQANIAVAeaAE
//! mturl --pretty https://meshtastic.org/e/#CgcSAQE6AggNEgwIATgBQANIAVAeaAE
//! mturl --summary https://meshtastic.org/e/#CgcSAQE6AggNEgwIATgBQANIAVAeaAE
//! mturl --encode request.json
//! ```
//!
//! JSON goes to stdout and logs to stderr (`RUST_LOG`, default `warn`).
//! Hard failures exit with status 1.

mod summary;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use meshtastic_url::{CodecConfig, DecodeResponse, Decoder, Encoder, UrlError, UrlResult};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Decode Meshtastic channel URLs and display protobuf contents.
#[derive(Parser, Debug)]
#[command(name = "mturl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Meshtastic URL to decode.
    #[arg(required_unless_present = "encode")]
    url: Option<String>,

    /// Pretty print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Show a human-readable summary instead of JSON.
    #[arg(long, conflicts_with = "encode")]
    summary: bool,

    /// Encode the JSON request in this file (`-` for stdin) instead of decoding.
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    encode: Option<PathBuf>,

    /// Leave `qr_code` empty when encoding.
    #[arg(long, requires = "encode")]
    no_qr: bool,

    /// YAML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn to_json(value: &Value, pretty: bool) -> String {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.unwrap_or_else(|_| "null".to_string())
}

fn run_decode(url: &str, cli: &Cli) -> UrlResult<()> {
    let decoder = Decoder::new();
    let decoded = decoder.decode_url(url)?;
    debug!("mturl: classification {:?}", decoded.classification);
    let response = DecodeResponse::from_result(url, Ok(decoded));

    if cli.summary {
        print!("{}", summary::render_summary(&response));
    } else {
        println!("{}", to_json(&response.to_value(), cli.pretty));
    }
    Ok(())
}

fn read_request(path: &Path) -> UrlResult<Value> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(path)
    }
    .map_err(|e| UrlError::InvalidSpec(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| UrlError::InvalidSpec(e.to_string()))
}

fn run_encode(path: &Path, config: CodecConfig, cli: &Cli) -> UrlResult<()> {
    let request = read_request(path)?;
    let mut encoder = Encoder::new(config);
    if cli.no_qr {
        encoder = encoder.without_qr();
    }
    let response = encoder.encode_json(&request)?;
    println!("{}", to_json(&response.to_value(), cli.pretty));
    Ok(())
}

fn run(cli: &Cli) -> UrlResult<()> {
    let config = match &cli.config {
        Some(path) => CodecConfig::load(path)?,
        None => CodecConfig::default(),
    };

    match (&cli.encode, &cli.url) {
        (Some(path), _) => run_encode(path, config, cli),
        (None, Some(url)) => run_decode(url, cli),
        (None, None) => Err(UrlError::InvalidSpec("no URL given".to_string())),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
