//! paillier-audit - security analysis of a freshly generated Paillier key
//!
//! Generates a reference Paillier key pair, runs the six security probes
//! against it and prints the aggregated report.
//!
//! # Usage
//!
//! ```bash
//! # Default 2048-bit key, text report
//! paillier-audit
//!
//! # Reproducible quick run with JSON output
//! paillier-audit --bits 1024 --preset quick --seed 42 --format json
//! ```
//!
//! Exit codes: 0 when every probe passed, 1 when any failed, 2 on invalid
//! arguments, 130 when interrupted with Ctrl-C.

use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use paillier_audit::{AuditConfig, AuditError, CancellationToken, PaillierCryptosystem, SecurityReport};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::process::ExitCode;

const EXIT_PROBE_FAILED: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// Security analysis of the Paillier homomorphic cryptosystem
#[derive(Parser)]
#[command(name = "paillier-audit")]
#[command(about = "Security analysis of the Paillier homomorphic cryptosystem")]
#[command(version)]
struct Cli {
    /// Modulus size in bits (even, at least 512)
    #[arg(short, long, default_value = "2048")]
    bits: u64,

    /// Sampling preset the individual overrides apply on top of
    #[arg(short, long, value_enum, default_value_t = Preset::Standard)]
    preset: Preset,

    /// Encryptions per uniqueness probe
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Homomorphic correctness trials
    #[arg(short, long)]
    trials: Option<usize>,

    /// Timed encryptions in the side-channel probe
    #[arg(long)]
    timing_samples: Option<usize>,

    /// Seed for key generation and sampling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Report output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Quick,
    Standard,
    Thorough,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn audit_config(&self) -> AuditConfig {
        let mut config = match self.preset {
            Preset::Quick => AuditConfig::quick(),
            Preset::Standard => AuditConfig::default(),
            Preset::Thorough => AuditConfig::thorough(),
        };
        if let Some(iterations) = self.iterations {
            config = config
                .with_probabilistic_iterations(iterations)
                .with_semantic_iterations(iterations);
        }
        if let Some(trials) = self.trials {
            config = config.with_homomorphic_trials(trials);
        }
        if let Some(samples) = self.timing_samples {
            config = config.with_timing_samples(samples);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn generate_key(bits: u64, seed: Option<u64>) -> Result<PaillierCryptosystem, AuditError> {
    let system = match seed {
        Some(seed) => {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            PaillierCryptosystem::generate_with_rng(bits, &mut rng)?
        }
        None => PaillierCryptosystem::generate(bits)?,
    };
    Ok(system)
}

fn render(report: &SecurityReport, format: OutputFormat) -> Result<String, AuditError> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => report.to_json(),
    }
}

fn run(cli: &Cli, token: &CancellationToken) -> Result<SecurityReport, AuditError> {
    let config = cli.audit_config();
    config.validate()?;

    info!("generating {}-bit Paillier key", cli.bits);
    let paillier = generate_key(cli.bits, cli.seed)?;
    let key_info = paillier.key_info();
    info!(
        "key ready: n is {} bits ({})",
        key_info.n_bit_length, key_info.security_level
    );

    paillier_audit::run_security_analysis(&paillier, config, token)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("could not install Ctrl-C handler: {}", err);
    }

    let report = match run(&cli, &token) {
        Ok(report) => report,
        Err(err @ AuditError::Interrupted { .. }) => {
            error!("{}", err);
            return ExitCode::from(EXIT_INTERRUPTED);
        }
        Err(err @ (AuditError::InvalidConfig(_) | AuditError::Cryptosystem(_))) => {
            error!("{}", err);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match render(&report, cli.format) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    }

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_PROBE_FAILED)
    }
}
