//! tagwire - inspect tagged binary records
//!
//! Decodes one record of a named model type and prints it as JSON.

use clap::Parser;
use std::path::PathBuf;
use tagwire_core::{json, CodecConfig, RecordCodec};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagwire")]
#[command(about = "Decode a tagged binary record and print it as JSON")]
#[command(version)]
struct Cli {
    /// Record type to decode, e.g. KsDef or ColumnOrSuperColumn
    #[arg(required_unless_present = "list")]
    record: Option<String>,

    /// File holding the encoded record
    #[arg(required_unless_present = "list")]
    file: Option<PathBuf>,

    /// The file holds hex text instead of raw bytes
    #[arg(long)]
    hex: bool,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// List known record types and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let registry = tagwire_model::registry();

    if cli.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let (Some(record), Some(file)) = (cli.record, cli.file) else {
        return Err("a record type and a file are required".into());
    };

    // Fail on an explicitly named config file, otherwise fall back to defaults
    let config = match CodecConfig::load() {
        Ok(c) => c,
        Err(e) if std::env::var("TAGWIRE_CONFIG").is_ok() => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
        Err(e) => {
            tracing::warn!("Ignoring invalid environment overrides: {}", e);
            CodecConfig::default()
        }
    };
    tracing::debug!(?config, "codec configuration");

    let raw = std::fs::read(&file)?;
    let data = if cli.hex {
        let text: String = String::from_utf8(raw)?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        hex::decode(text)?
    } else {
        raw
    };
    tracing::info!("Decoding {} ({} bytes) as {}", file.display(), data.len(), record);

    let codec = RecordCodec::with_config(registry, config);
    let decoded = match codec.decode_bytes(&data, &record) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(code = e.error_code(), "Decode failed: {}", e);
            return Err(e.into());
        }
    };

    let value = json::record_to_json(&decoded);
    let rendered = if cli.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{}", rendered);
    Ok(())
}
