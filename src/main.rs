use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use pwseal::digest::{self, HashAlgorithm, Source};
use pwseal::{CryptError, DigestCheck, LogNotifier, format};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "pwseal")]
#[command(
    version,
    about = "Password-based file encryption and checksum verification."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a file into a password-protected container
    #[command(arg_required_else_help = true)]
    Encrypt {
        input: PathBuf,
        output: PathBuf,

        /// Overwrite OUTPUT if it exists
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Decrypts a container back into the original file
    #[command(arg_required_else_help = true)]
    Decrypt {
        input: PathBuf,
        output: PathBuf,

        /// Overwrite OUTPUT if it exists
        #[arg(short, long, default_value_t = false)]
        force: bool,

        /// Only write OUTPUT if the decrypted content has this digest
        #[arg(long, value_name = "HEX")]
        expect: Option<String>,

        /// Digest algorithm for --expect
        #[arg(long, default_value_t = HashAlgorithm::Sha256)]
        algo: HashAlgorithm,
    },

    /// Prints the digest of a file
    #[command(arg_required_else_help = true)]
    Hash {
        file: PathBuf,

        /// Digest algorithm (md5, sha256, sha512)
        #[arg(long, default_value_t = HashAlgorithm::Sha256)]
        algo: HashAlgorithm,
    },

    /// Checks a file against an expected digest
    #[command(arg_required_else_help = true)]
    Verify {
        file: PathBuf,
        expected: String,

        /// Digest algorithm (md5, sha256, sha512)
        #[arg(long, default_value_t = HashAlgorithm::Sha256)]
        algo: HashAlgorithm,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn ensure_writable(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "output '{}' already exists (use --force to overwrite)",
            output.display()
        );
    }
    Ok(())
}

fn looks_sealed(path: &Path) -> bool {
    let mut magic = [0u8; format::MAGIC_LEN];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .is_ok_and(|_| format::is_container(&magic))
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Encrypt {
            input,
            output,
            force,
        } => {
            ensure_writable(&output, force)?;
            if looks_sealed(&input) {
                log::warn!("'{}' is already a pwseal container", input.display());
            }
            let password = auth::read_new_password_with_confirmation()?;
            let outcome = pwseal::encrypt_file(&input, &output, password, Some(&LogNotifier));
            if !outcome.success() {
                bail!("{outcome}");
            }
            println!("{outcome}");
        }
        Commands::Decrypt {
            input,
            output,
            force,
            expect,
            algo,
        } => {
            ensure_writable(&output, force)?;
            let check = expect.map(|hex| DigestCheck::new(algo, hex));
            let password = auth::read_password()?;
            let outcome = pwseal::decrypt_file_checked(
                &input,
                &output,
                password,
                check.as_ref(),
                Some(&LogNotifier),
            );
            if !outcome.success() {
                bail!("{outcome}");
            }
            println!("{outcome}");
        }
        Commands::Hash { file, algo } => {
            let hex = digest::digest(Source::File(&file), algo)
                .with_context(|| format!("could not hash '{}'", file.display()))?;
            println!("{hex}  {}", file.display());
        }
        Commands::Verify {
            file,
            expected,
            algo,
        } => match digest::check(Source::File(&file), algo, &expected) {
            Ok(()) => println!("OK"),
            Err(CryptError::VerificationMismatch { actual, .. }) => {
                println!("MISMATCH");
                eprintln!("{algo} of '{}' is {actual}", file.display());
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("could not hash '{}'", file.display()));
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
