//! TagQuote CLI - Bridge interface for the storefront
//!
//! Commands: formats, quote, layout, transition, configure, share, unshare
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on business rejections (invalid transition, failed validation)

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use tagquote_core::{
    compute_quote, decode_share_token, encode_share_token,
    layout::{layout_tag_with, AdvanceTableMeasurer, HeuristicMeasurer, LayoutOptions, TextMeasurer},
    Catalog, Configurator, OrderStateMachine, QuoteError, QuoteInput, TagConfig,
};

#[derive(Parser)]
#[command(name = "tagquote-cli")]
#[command(about = "TagQuote CLI - Safety Tag Quote Engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog file or directory (built-in catalog when omitted)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum MeasurerKind {
    /// 0.6 em per character
    Heuristic,
    /// Helvetica-Bold advance widths
    Advance,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog formats
    Formats,

    /// Compute a quote
    Quote {
        /// JSON payload (QuoteInput); catalog sign images are used when none are given
        #[arg(short, long)]
        payload: String,
    },

    /// Fit preview text into a view box
    Layout {
        /// JSON payload (LayoutOptions)
        #[arg(short, long)]
        payload: String,

        #[arg(short, long, value_enum, default_value = "heuristic")]
        measurer: MeasurerKind,
    },

    /// Check an order status transition
    Transition {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Quote, lay out and validate a full tag configuration
    Configure {
        /// JSON payload (TagConfig); missing fields use defaults
        #[arg(short, long, default_value = "{}")]
        payload: String,

        /// Switch to this catalog format, taking its hole default
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Encode a configuration as a share token
    Share {
        #[arg(short, long, default_value = "{}")]
        payload: String,
    },

    /// Decode a share token
    Unshare {
        #[arg(short, long)]
        token: String,
    },
}

fn print_json(value: &impl Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(message: &str) -> ExitCode {
    println!("{}", serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, ExitCode> {
    serde_json::from_str(payload).map_err(|e| fail(&format!("Invalid payload: {}", e)))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = match &cli.catalog {
        Some(path) => match Catalog::load(path) {
            Ok(c) => c,
            Err(e) => return fail(&format!("Failed to load catalog: {}", e)),
        },
        None => Catalog::builtin(),
    };

    let configurator = Configurator::new(catalog);

    match cli.command {
        Commands::Formats => {
            let formats: Vec<_> = configurator
                .list_formats()
                .iter()
                .map(|f| serde_json::json!({
                    "id": f.id,
                    "label": f.label,
                    "shape": f.shape,
                    "sizeKey": f.size_key(),
                    "unitPrice": configurator.catalog().pricing.price_for_format(&f.dims()),
                }))
                .collect();
            print_json(&formats)
        }

        Commands::Quote { payload } => {
            let mut input: QuoteInput = match parse_payload(&payload) {
                Ok(i) => i,
                Err(code) => return code,
            };
            if input.sign_images.is_empty() {
                input.sign_images = configurator.catalog().sign_images.clone();
            }
            print_json(&compute_quote(&input, &configurator.catalog().pricing))
        }

        Commands::Layout { payload, measurer } => {
            let options: LayoutOptions = match parse_payload(&payload) {
                Ok(o) => o,
                Err(code) => return code,
            };
            let measurer: Box<dyn TextMeasurer> = match measurer {
                MeasurerKind::Heuristic => Box::new(HeuristicMeasurer::default()),
                MeasurerKind::Advance => Box::new(AdvanceTableMeasurer::helvetica_bold()),
            };
            print_json(&layout_tag_with(&options, measurer.as_ref()))
        }

        Commands::Transition { from, to } => {
            let result = OrderStateMachine::transition(&from, &to);
            let code = print_json(&result);
            if result.ok {
                code
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Configure { payload, format } => {
            let mut config: TagConfig = match parse_payload(&payload) {
                Ok(c) => c,
                Err(code) => return code,
            };
            if let Some(id) = format {
                if let Err(e) = configurator.select_format(&mut config, &id) {
                    return fail(&e.to_string());
                }
            }
            match configurator.configure(&config) {
                Ok(tag) => print_json(&serde_json::json!({
                    "success": true,
                    "tag": tag,
                    "summary": tag.summary(),
                })),
                Err(e @ QuoteError::ValidationFailed(_)) => {
                    println!("{}", serde_json::json!({ "success": false, "error": e.to_string() }));
                    ExitCode::from(2)
                }
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::Share { payload } => {
            let config: TagConfig = match parse_payload(&payload) {
                Ok(c) => c,
                Err(code) => return code,
            };
            match encode_share_token(&config) {
                Ok(token) => print_json(&serde_json::json!({ "token": token })),
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::Unshare { token } => match decode_share_token(&token) {
            Ok(config) => print_json(&config),
            Err(e) => fail(&e.to_string()),
        },
    }
}
