#![forbid(unsafe_code)]

//! Sloth command line tool.
//!
//! Derives primes, encodes/decodes buffers, verifies encodings, computes and
//! checks the input-keyed delay function, and measures the encode/decode cost
//! asymmetry on the local machine.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use sha2::{Digest, Sha512};
use sloth_core::SlothConfig;
use sloth_vdf::{calibrate_rounds, measure_asymmetry, EngineHandle, Sloth};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the configuration (e.g. `debug`)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct KeyArgs {
    /// Prime seed as hex, exactly one block long
    #[arg(long, conflicts_with = "seed_text")]
    seed_hex: Option<String>,
    /// Prime seed as text; its SHA-512 digest is repeated to fill one block
    #[arg(long, default_value = "subspace")]
    seed_text: String,
    /// Block size in bytes
    #[arg(short, long)]
    block_size: Option<usize>,
}

#[derive(Args, Clone)]
struct PayloadArgs {
    /// Payload as hex
    #[arg(long, conflicts_with = "input")]
    hex: Option<String>,
    /// Payload file (raw bytes)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the prime derived from a seed
    Prime {
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Encode a payload (slow direction)
    Encode {
        #[command(flatten)]
        key: KeyArgs,
        #[command(flatten)]
        payload: PayloadArgs,
        /// Rounds per block
        #[arg(short, long)]
        rounds: Option<u64>,
        /// Write raw bytes here instead of hex to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode a payload (fast direction)
    Decode {
        #[command(flatten)]
        key: KeyArgs,
        #[command(flatten)]
        payload: PayloadArgs,
        #[arg(short, long)]
        rounds: Option<u64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that an encoded payload matches the original
    Verify {
        #[command(flatten)]
        key: KeyArgs,
        /// Original data as hex
        #[arg(long)]
        data: String,
        /// Encoded data as hex
        #[arg(long)]
        encoded: String,
        #[arg(short, long)]
        rounds: Option<u64>,
    },
    /// Compare encode and decode time across block sizes
    Bench {
        #[arg(long, default_value = "subspace")]
        seed_text: String,
        /// Block sizes to measure
        #[arg(long, value_delimiter = ',', default_value = "64,128")]
        block_sizes: Vec<usize>,
        #[arg(short, long, default_value = "5")]
        rounds: u64,
        #[arg(short = 'n', long, default_value = "100")]
        iterations: u32,
    },
    /// Compute the input-keyed delay function (witness and final hash)
    Delay {
        /// Input string
        data: String,
        /// Prime size in bits, a multiple of 512
        #[arg(long, default_value = "1024")]
        bits: usize,
        #[arg(short, long, default_value = "100")]
        iterations: u64,
    },
    /// Check a witness and final hash against an input string
    DelayVerify {
        data: String,
        /// Witness as hex
        #[arg(long)]
        witness: String,
        /// Final hash as hex
        #[arg(long)]
        hash: String,
        #[arg(long, default_value = "1024")]
        bits: usize,
        #[arg(short, long, default_value = "100")]
        iterations: u64,
    },
    /// Pick a round count for a target single-block encode time
    Calibrate {
        #[command(flatten)]
        key: KeyArgs,
        /// Target delay in milliseconds
        #[arg(short, long, default_value = "100")]
        target_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => SlothConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => SlothConfig::default(),
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match &cli.command {
        Commands::Prime { key } => cmd_prime(&cfg, key),
        Commands::Encode { key, payload, rounds, output } => {
            cmd_transform(&cfg, key, payload, rounds.unwrap_or(cfg.rounds), output.as_ref(), true)
        }
        Commands::Decode { key, payload, rounds, output } => {
            cmd_transform(&cfg, key, payload, rounds.unwrap_or(cfg.rounds), output.as_ref(), false)
        }
        Commands::Verify { key, data, encoded, rounds } => {
            cmd_verify(&cfg, key, data, encoded, rounds.unwrap_or(cfg.rounds))
        }
        Commands::Bench { seed_text, block_sizes, rounds, iterations } => {
            cmd_bench(&cfg, seed_text, block_sizes, *rounds, *iterations)
        }
        Commands::Delay { data, bits, iterations } => cmd_delay(&cfg, data, *bits, *iterations),
        Commands::DelayVerify { data, witness, hash, bits, iterations } => {
            cmd_delay_verify(&cfg, data, witness, hash, *bits, *iterations)
        }
        Commands::Calibrate { key, target_ms } => cmd_calibrate(&cfg, key, *target_ms),
    }
}

/// Repeat SHA-512(`text`) until `block_size` bytes are filled.
fn seed_from_text(text: &str, block_size: usize) -> Vec<u8> {
    let digest = Sha512::digest(text.as_bytes());
    digest.iter().copied().cycle().take(block_size).collect()
}

fn decode_hex(label: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim()).with_context(|| format!("{label} is not valid hex"))
}

fn open_handle(cfg: &SlothConfig, key: &KeyArgs) -> Result<EngineHandle> {
    let block_size = key.block_size.unwrap_or(cfg.block_size);
    let seed = match &key.seed_hex {
        Some(h) => decode_hex("seed", h)?,
        None => seed_from_text(&key.seed_text, block_size),
    };
    debug!(block_size, "deriving prime");
    let handle = EngineHandle::with_config(&seed, block_size, cfg)?;
    Ok(handle)
}

fn read_payload(payload: &PayloadArgs) -> Result<Vec<u8>> {
    match (&payload.hex, &payload.input) {
        (Some(h), _) => decode_hex("payload", h),
        (None, Some(path)) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        (None, None) => bail!("either --hex or --input is required"),
    }
}

fn cmd_prime(cfg: &SlothConfig, key: &KeyArgs) -> Result<()> {
    let handle = open_handle(cfg, key)?;
    println!("{}", hex::encode(&*handle.prime_bytes()?));
    handle.release()?;
    Ok(())
}

fn cmd_transform(
    cfg: &SlothConfig,
    key: &KeyArgs,
    payload: &PayloadArgs,
    rounds: u64,
    output: Option<&PathBuf>,
    encode: bool,
) -> Result<()> {
    let handle = open_handle(cfg, key)?;
    let data = read_payload(payload)?;
    let out = if encode { handle.encode(rounds, &data)? } else { handle.decode(rounds, &data)? };
    match output {
        Some(path) => fs::write(path, &out).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", hex::encode(&out)),
    }
    handle.release()?;
    Ok(())
}

fn cmd_verify(cfg: &SlothConfig, key: &KeyArgs, data: &str, encoded: &str, rounds: u64) -> Result<()> {
    let handle = open_handle(cfg, key)?;
    let data = decode_hex("data", data)?;
    let encoded = decode_hex("encoded", encoded)?;
    let ok = handle.verify_proof(rounds, &data, &encoded)?;
    handle.release()?;
    if !ok {
        bail!("encoded data does not match");
    }
    println!("valid");
    Ok(())
}

fn cmd_bench(cfg: &SlothConfig, seed_text: &str, block_sizes: &[usize], rounds: u64, iterations: u32) -> Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Block size", "Encode", "Decode", "Ratio"]);

    for &block_size in block_sizes {
        let key = KeyArgs { seed_hex: None, seed_text: seed_text.to_string(), block_size: Some(block_size) };
        let handle = open_handle(cfg, &key)?;
        let mut block = seed_from_text("subspace-data", block_size);
        // keep the block below the prime
        block[0] = 0;
        let report = measure_asymmetry(&handle, rounds, &block, iterations)?;
        info!(block_size, ratio = report.ratio(), "benchmark finished");
        table.add_row(vec![
            block_size.to_string(),
            format!("{:.2} ms", report.encode.as_secs_f64() * 1000.0),
            format!("{:.2} ms", report.decode.as_secs_f64() * 1000.0),
            format!("{:.1}x", report.ratio()),
        ]);
        handle.release()?;
    }
    println!("{table}");
    Ok(())
}

fn cmd_delay(cfg: &SlothConfig, data: &str, bits: usize, iterations: u64) -> Result<()> {
    let proof = Sloth::from(cfg).compute(data.as_bytes(), bits, iterations)?;
    println!("witness: {}", hex::encode(&proof.witness));
    println!("hash:    {}", hex::encode(proof.hash));
    Ok(())
}

fn cmd_delay_verify(cfg: &SlothConfig, data: &str, witness: &str, hash: &str, bits: usize, iterations: u64) -> Result<()> {
    let witness = decode_hex("witness", witness)?;
    let hash = decode_hex("hash", hash)?;
    if !Sloth::from(cfg).verify(&witness, &hash, data.as_bytes(), bits, iterations)? {
        bail!("delay proof does not match");
    }
    println!("valid");
    Ok(())
}

fn cmd_calibrate(cfg: &SlothConfig, key: &KeyArgs, target_ms: u64) -> Result<()> {
    let handle = open_handle(cfg, key)?;
    let rounds = calibrate_rounds(&handle, target_ms)?;
    println!("{rounds}");
    handle.release()?;
    Ok(())
}
