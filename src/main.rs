//! # CLI entry point
//!
//! A single operation: prove (or refute) the primality of an integer via
//! APR-CL. `darkreach-aprcl prove <N>`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rug::Integer;
use tracing::info_span;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "darkreach-aprcl", about = "Deterministic APR-CL primality proving")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Copy, Clone, ValueEnum)]
enum Flavor {
    /// Jacobi-sum flavor with the tabulated R, retrying at R scaled x2, x3, x5.
    Jacobi,
    /// Gauss-sum flavor, growing R until s^2 > n.
    Gauss,
    /// Try Jacobi first (cheaper); this is purely a CLI convenience, not a
    /// driver behavior — the underlying retry ladder always scales R.
    Auto,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether N is prime.
    Prove {
        /// The number to test, as a decimal literal (or hex with --hex).
        n: String,

        /// Interpret N as a hexadecimal literal.
        #[arg(long)]
        hex: bool,

        /// Which congruence flavor to run.
        #[arg(long, value_enum, default_value_t = Flavor::Auto)]
        flavor: Flavor,

        /// How many times the driver retries with a rescaled R (Jacobi:
        /// the x2/x3/x5 ladder; Gauss: R growths) before giving up with
        /// a hard error.
        #[arg(long, default_value_t = 3)]
        max_retries: usize,
    },
}

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt().json().with_target(false).init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
}

fn parse_n(raw: &str, hex: bool) -> Result<Integer> {
    if hex {
        Integer::from_str_radix(raw.trim_start_matches("0x"), 16)
            .with_context(|| format!("'{raw}' is not a valid hexadecimal integer"))
    } else {
        Integer::from_str_radix(raw, 10).with_context(|| format!("'{raw}' is not a valid decimal integer"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match &cli.command {
        Commands::Prove {
            n,
            hex,
            flavor,
            max_retries,
        } => {
            let n = parse_n(n, *hex)?;
            let _span = info_span!("is_prime", bits = n.significant_bits()).entered();

            let status = match flavor {
                Flavor::Gauss => darkreach_aprcl::driver::is_prime_gauss_with_retries(&n, *max_retries as u32),
                Flavor::Jacobi | Flavor::Auto => darkreach_aprcl::driver::is_prime_with_retries(&n, *max_retries),
            };

            match status {
                Ok(status) => {
                    println!("{status}");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, "could not decide primality");
                    bail!(e)
                }
            }
        }
    }
}
