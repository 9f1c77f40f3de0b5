//! errcodes - CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use errcodes::extract::{self, CodeMap, UnfoldablePolicy};
use errcodes::util::config::{self, ExtractConfig};
use errcodes::util::logger::{self, LogLevel};
use errcodes::{collect_sources, extract_files, NAME, VERSION};
use std::path::PathBuf;
use tracing::info;

/// Extract assertion messages into stable numeric error codes
#[derive(Parser, Debug)]
#[command(name = NAME)]
#[command(version = VERSION)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan sources, update the code map and write the error modules
    Extract {
        /// Code map file
        #[arg(long, value_name = "FILE")]
        map: Option<PathBuf>,

        /// Directory for ErrorDev.js and ErrorProd.js
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Project configuration (default: errcodes.toml in the current directory or above)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Skip files whose messages cannot be fully resolved
        #[arg(long)]
        strict: bool,

        /// Files or directories to scan
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print the full message for an error code
    Decode {
        /// Code map file
        #[arg(long, value_name = "FILE")]
        map: PathBuf,

        /// Error code
        code: u32,

        /// Values for the message placeholders
        args: Vec<String>,
    },

    /// Print the decoder URL for an error code
    Url {
        /// Error code
        code: u32,

        /// Values passed to the production constructor
        args: Vec<String>,

        /// Decoder page the code is appended to
        #[arg(long, default_value = extract::DEFAULT_DECODER_URL)]
        decoder_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_with_level(LogLevel::from_flags(args.verbose, args.quiet));

    match args.command {
        Commands::Extract {
            map,
            out,
            config,
            strict,
            paths,
        } => {
            let cli = ExtractConfig {
                map_path: map,
                out_dir: out,
                policy: strict.then_some(UnfoldablePolicy::Reject),
                ..ExtractConfig::default()
            };
            let env = ExtractConfig::from_env(|name| std::env::var(name).ok());
            let file = project_config(config)?;
            let settings = cli.or(env).or(file);

            let files = collect_sources(&paths, &settings.extensions())?;
            let summary = extract_files(settings.to_options(), &files).await?;
            info!(
                "Scanned {} files ({} skipped): {} call sites, {} new codes, {} total",
                summary.files_scanned,
                summary.files_skipped,
                summary.call_sites,
                summary.new_codes,
                summary.total_codes
            );
        }
        Commands::Decode { map, code, args } => {
            let text = std::fs::read_to_string(&map)
                .with_context(|| format!("Failed to read {}", map.display()))?;
            let codes = CodeMap::from_json(&text)
                .with_context(|| format!("Failed to parse {}", map.display()))?;
            match extract::decode(&codes, code, &args[..]) {
                Some(message) => println!("{}", message),
                None => bail!("Unknown error code {} in {}", code, map.display()),
            }
        }
        Commands::Url {
            code,
            args,
            decoder_url,
        } => {
            println!("{}", extract::decoder_url_for(&decoder_url, code, &args[..]));
        }
    }

    Ok(())
}

/// `[extract]` section of the project file, if there is one
fn project_config(explicit: Option<PathBuf>) -> Result<ExtractConfig> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            match config::find_project_config(&cwd) {
                Some(path) => path,
                None => return Ok(ExtractConfig::default()),
            }
        }
    };
    let project = config::load_project_config(&path)?;
    info!("Using {}", path.display());
    Ok(project.extract)
}
