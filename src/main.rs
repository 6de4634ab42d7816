use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use medscan_lib::commands::config::{config_manager, get_config_path, init_config, show_config};
use medscan_lib::commands::{start_preview, ScanService, TerminalSink};
use medscan_lib::models::config::{AppConfig, MAX_TOP_K};
use medscan_lib::models::language::LanguageChoice;
use medscan_lib::services::camera::capture_snapshot;
use medscan_lib::services::imaging::load_image;
use medscan_lib::services::live_preview::PreviewEnd;
use std::path::PathBuf;
use tracing::Level;

/// Identify a medicine from a photo of its package
#[derive(Parser)]
#[command(name = "medscan", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a package image: OCR, barcode, expiry date and database matches
    Scan {
        /// JPEG or PNG image
        #[arg(required_unless_present = "camera", conflicts_with = "camera")]
        image: Option<PathBuf>,

        /// Take a single snapshot from the camera instead of reading a file
        #[arg(long)]
        camera: bool,

        /// OCR language
        #[arg(long, value_enum)]
        lang: Option<LangArg>,

        /// Number of matches to show
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=MAX_TOP_K as i64))]
        top_k: Option<u8>,

        /// Reference database CSV
        #[arg(long)]
        db: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Live camera preview until Ctrl-C
    Preview {
        /// Camera index
        #[arg(long)]
        device: Option<u32>,

        /// Write the last frame to this PNG on exit
        #[arg(long)]
        save_last: Option<PathBuf>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write the default configuration
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    English,
    Hindi,
    Both,
}

impl From<LangArg> for LanguageChoice {
    fn from(arg: LangArg) -> Self {
        match arg {
            LangArg::English => LanguageChoice::English,
            LangArg::Hindi => LanguageChoice::Hindi,
            LangArg::Both => LanguageChoice::Both,
        }
    }
}

fn init_logging(verbose: u8, json: bool) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let manager = config_manager(cli.config.as_deref())?;

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Show => println!("{}", show_config(&manager)?),
            ConfigAction::Path => println!("{}", get_config_path(&manager).display()),
            ConfigAction::Init { force } => {
                let path = init_config(&manager, force)?;
                println!("Wrote {}", path.display());
            }
        },

        Command::Scan {
            image,
            camera,
            lang,
            top_k,
            db,
            json,
        } => {
            let mut config = manager.load().context("Failed to load configuration")?;
            if let Some(lang) = lang {
                config.ocr.language = lang.into();
            }
            if let Some(top_k) = top_k {
                config.matching.top_k = usize::from(top_k);
            }
            if let Some(db) = db {
                config.matching.database_path = db;
            }
            config.validate().map_err(anyhow::Error::msg)?;

            run_scan(config, image, camera, json).await?;
        }

        Command::Preview { device, save_last } => {
            let mut config = manager.load().context("Failed to load configuration")?;
            if let Some(device) = device {
                config.camera.device_index = device;
            }

            let preview = start_preview(&config.camera, TerminalSink::new(save_last))?;
            eprintln!("Live preview running, press Ctrl-C to stop");

            let summary = preview
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                })
                .await;

            match summary.end {
                PreviewEnd::Stopped => eprintln!("Preview stopped after {} frames", summary.frames),
                PreviewEnd::SourceFailed => eprintln!(
                    "Camera stopped delivering frames after {} frames: {}",
                    summary.frames,
                    summary.error.as_deref().unwrap_or("unknown error")
                ),
                PreviewEnd::OpenFailed => bail!(
                    "Could not open camera {}: {}",
                    config.camera.device_index,
                    summary.error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
    }

    Ok(())
}

async fn run_scan(
    config: AppConfig,
    image: Option<PathBuf>,
    camera: bool,
    json: bool,
) -> anyhow::Result<()> {
    // The blocking HTTP client must be created and dropped off the async runtime
    let report = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let frame = match image {
            Some(path) => load_image(&path)?,
            None if camera => capture_snapshot(config.camera.device_index)
                .context("No camera image available")?,
            None => bail!("Provide an image path or --camera"),
        };

        let service = ScanService::from_config(&config)?;
        if service.database().is_empty() {
            tracing::warn!(
                path = %config.matching.database_path.display(),
                "Reference database is empty, no matches will be found"
            );
        }

        Ok(service.scan(&frame))
    })
    .await
    .context("Scan task failed")??;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
        println!();
        println!("Processing complete");
    }

    Ok(())
}
