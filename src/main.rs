use anyhow::Result;
use clap::{Parser, Subcommand};
mod auth;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use serde::Serialize;
use wmsign::{
    BalanceRequest, ConfigError, HistoryRequest, KeyFile, MessageSigner, SignedRequest, Signer,
    SignerOptions, TransferRequest, current_request_number, default_key_file,
};
use zeroize::Zeroizing;

#[derive(Debug, Parser)]
#[command(name = "wmsign")]
#[command(
    version,
    about = "Signs WebMoney XML interface requests with a .kvm key container."
)]
struct Cli {
    /// WMID the key container belongs to
    #[arg(long, global = true, env = "WMSIGN_WMID")]
    wmid: Option<String>,

    /// Base64-encoded key container
    #[arg(
        long,
        global = true,
        env = "WMSIGN_KEY",
        hide_env_values = true,
        conflicts_with = "key_file"
    )]
    key: Option<String>,

    /// Path to the .kvm key container file
    #[arg(long, global = true, value_name = "PATH", env = "WMSIGN_KEY_FILE")]
    key_file: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Verifies the key container against its checksum
    Check,

    /// Signs a message
    #[command(arg_required_else_help = true)]
    Sign { message: String },

    /// Builds the signed authorization of an interface request
    #[command(subcommand)]
    Request(RequestKind),
}

#[derive(Debug, Subcommand)]
enum RequestKind {
    /// Purse balances
    Balance {
        /// WMID to query (default: the signing WMID)
        #[arg(long)]
        target: Option<String>,
    },

    /// Operation history of a purse
    History {
        #[arg(long)]
        purse: String,
        #[arg(long, default_value = "")]
        datestart: String,
        #[arg(long, default_value = "")]
        datefinish: String,
    },

    /// Transfer between purses
    Transfer {
        #[arg(long)]
        tranid: i64,
        #[arg(long)]
        purse_src: String,
        #[arg(long)]
        purse_dest: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value_t = 0)]
        period: i32,
        #[arg(long, default_value = "")]
        pcode: String,
        #[arg(long, default_value = "")]
        desc: String,
        #[arg(long, default_value_t = 0)]
        wminvid: i64,
    },
}

impl RequestKind {
    /// Signs the request and renders it as pretty JSON.
    fn sign(self, signer: &Signer, wmid: &str) -> Result<String> {
        let reqn = current_request_number();
        match self {
            RequestKind::Balance { target } => {
                let request = BalanceRequest {
                    wmid: target.unwrap_or_else(|| wmid.to_string()),
                };
                to_json(SignedRequest::new(signer, wmid, reqn, request)?)
            }
            RequestKind::History {
                purse,
                datestart,
                datefinish,
            } => {
                let request = HistoryRequest {
                    purse,
                    datestart,
                    datefinish,
                    ..Default::default()
                };
                to_json(SignedRequest::new(signer, wmid, reqn, request)?)
            }
            RequestKind::Transfer {
                tranid,
                purse_src,
                purse_dest,
                amount,
                period,
                pcode,
                desc,
                wminvid,
            } => {
                let request = TransferRequest {
                    tranid,
                    purse_src,
                    purse_dest,
                    amount,
                    period,
                    pcode,
                    desc,
                    wminvid,
                };
                to_json(SignedRequest::new(signer, wmid, reqn, request)?)
            }
        }
    }
}

fn to_json<T: Serialize>(signed: SignedRequest<T>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&signed)?)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn load_key(key: Option<String>, key_file: Option<PathBuf>) -> Result<Zeroizing<String>> {
    if let Some(key) = key {
        return Ok(Zeroizing::new(key));
    }

    let file = match key_file {
        Some(path) => KeyFile::new(path),
        None => default_key_file()?,
    };
    file.load_base64()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_tracing(args.verbose);

    let wmid = args.wmid.ok_or(ConfigError::WmIdNotConfigured)?;
    let key = load_key(args.key, args.key_file)?;
    let password = auth::read_password()?;

    let signer = Signer::new(
        SignerOptions::new()
            .wmid(wmid.as_str())
            .key(key.as_str())
            .password(password.as_str()),
    )?;
    drop(password);

    match args.command {
        Commands::Check => {
            println!("key container verified");
            println!("modulus: {} bits", signer.modulus_bits());
        }
        Commands::Sign { message } => {
            println!("{}", signer.sign(&message)?);
        }
        Commands::Request(kind) => {
            println!("{}", kind.sign(&signer, &wmid)?);
        }
    }

    Ok(())
}
