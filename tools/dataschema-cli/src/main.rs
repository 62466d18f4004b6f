//! # dataschema CLI
//!
//! Decodes binary records to JSON, encodes JSON value trees to binary, and
//! reports encoded sizes, all against a JSON schema definition.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dataschema::schema::{record_from_json, record_to_json};
use dataschema::{Codec, CodecConfig, Schema};

/// Schema-driven binary record codec.
#[derive(Parser, Debug)]
#[command(name = "dataschema", version, about)]
struct Cli {
    /// Codec configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a binary record and print it as JSON.
    Decode(DecodeArgs),
    /// Encode a JSON value tree into a binary record.
    Encode(EncodeArgs),
    /// Print the encoded size of a JSON value tree.
    Size(SizeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Schema definition file (JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Input file with the encoded bytes.
    #[arg(long)]
    input: PathBuf,
    /// Treat the input file as hex text.
    #[arg(long)]
    hex: bool,
    /// Byte offset to start decoding at.
    #[arg(long, default_value_t = 0)]
    offset: usize,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Schema definition file (JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Value tree file (JSON).
    #[arg(long)]
    value: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write hex text instead of raw bytes.
    #[arg(long)]
    hex: bool,
}

#[derive(Args, Debug)]
struct SizeArgs {
    /// Schema definition file (JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Value tree file (JSON).
    #[arg(long)]
    value: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let codec = Codec::with_config(load_config(cli.config.as_deref())?);

    match cli.command {
        Commands::Decode(args) => decode(&codec, &args),
        Commands::Encode(args) => encode(&codec, &args),
        Commands::Size(args) => size(&codec, &args),
    }
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(CodecConfig::default()),
    }
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path).with_context(|| format!("reading schema {}", path.display()))?;
    Schema::from_json_str(&text).with_context(|| format!("parsing schema {}", path.display()))
}

fn load_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading value {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing value {}", path.display()))
}

fn decode(codec: &Codec, args: &DecodeArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let raw = fs::read(&args.input).with_context(|| format!("reading input {}", args.input.display()))?;
    let data = if args.hex {
        let text: String = String::from_utf8(raw)
            .context("hex input is not text")?
            .split_whitespace()
            .collect();
        hex::decode(text).context("decoding hex input")?
    } else {
        raw
    };

    let (record, consumed) = codec.decode(&schema, &data, args.offset)?;
    tracing::info!(consumed, total = data.len(), "decoded record");

    let output = serde_json::json!({
        "bytesConsumed": consumed,
        "value": record_to_json(&record),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn encode(codec: &Codec, args: &EncodeArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let record = record_from_json(&schema, &load_json(&args.value)?)?;
    let (data, written) = codec.encode(&schema, &record)?;
    tracing::info!(written, "encoded record");

    let bytes = if args.hex {
        let mut text = hex::encode(&data).into_bytes();
        text.push(b'\n');
        text
    } else {
        data
    };

    match &args.output {
        Some(path) => fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?,
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

fn size(codec: &Codec, args: &SizeArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let record = record_from_json(&schema, &load_json(&args.value)?)?;
    println!("{}", codec.size_of(&schema, &record)?);
    Ok(())
}
