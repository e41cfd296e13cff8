use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vidscrape::config::{ClientConfig, ConfigLoader, OutputConfig};
use vidscrape::output::publish;
use vidscrape::submission::{Submission, SubmissionState, failure_message, parse_urls};
use vidscrape::{Error, ScrapeClient};

#[derive(Parser)]
#[command(name = "vidscrape")]
#[command(version)]
#[command(about = "Batch client for a video metadata scrape service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a batch of video URLs and render the results table
    Submit {
        /// Path to the configuration file (JSON/YAML/TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Base URL of the scrape service
        #[arg(short, long)]
        server: Option<String>,

        /// File with one URL per line (stdin when neither this nor --url is given)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// A URL to submit; repeatable
        #[arg(short, long = "url")]
        urls: Vec<String>,

        /// Output format, overriding the config file
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Output path for html/json/csv/sqlite
        #[arg(short, long)]
        out: Option<String>,

        /// SQLite table name
        #[arg(long)]
        table: Option<String>,

        /// Don't pre-fill "Fetching" rows while waiting
        #[arg(long)]
        no_pending: bool,

        /// Hide the progress spinner (stderr)
        #[arg(long)]
        no_progress: bool,
    },
    /// Validate a configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Console,
    Html,
    Json,
    Csv,
    Sqlite,
}

impl Format {
    fn into_output(self, out: Option<String>, table: Option<String>) -> anyhow::Result<OutputConfig> {
        let path = |fmt: &str| match out.clone() {
            Some(path) => Ok(path),
            None => Err(anyhow::anyhow!("--out is required for --format {}", fmt)),
        };
        let output = match self {
            Format::Console => OutputConfig::Console,
            Format::Html => OutputConfig::Html { path: path("html")? },
            Format::Json => OutputConfig::Json { path: path("json")? },
            Format::Csv => OutputConfig::Csv { path: path("csv")? },
            Format::Sqlite => OutputConfig::Sqlite {
                path: path("sqlite")?,
                table: "scrape_results".to_string(),
            },
        };
        let out = if matches!(self, Format::Console) { out } else { None };
        Ok(output.with_overrides(out, table)?)
    }
}

fn read_input(urls: &[String], input: Option<&Path>) -> anyhow::Result<String> {
    if !urls.is_empty() {
        return Ok(urls.join("\n"));
    }
    if let Some(path) = input {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Paste video URLs, one per line, then press Ctrl-D:");
    }
    Ok(std::io::read_to_string(stdin)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let level = logger.filter();
    let multi = Arc::new(MultiProgress::new());

    match cli.command {
        Commands::Submit {
            config,
            server,
            input,
            urls,
            format,
            out,
            table,
            no_pending,
            no_progress,
        } => {
            let progress = !no_progress;
            if progress {
                indicatif_log_bridge::LogWrapper::new((*multi).clone(), logger).try_init()?;
            } else {
                log::set_boxed_logger(Box::new(logger))?;
            }
            log::set_max_level(level);

            let mut cfg: ClientConfig = match &config {
                Some(path) => {
                    log::info!("Loading config from {:?}", path);
                    ConfigLoader::load(path)?
                }
                None => ConfigLoader::from_env()?,
            };
            if let Some(server) = server {
                cfg.server_url = server;
            }
            if no_pending {
                cfg.show_pending = false;
            }
            if let Some(format) = format {
                cfg.output = Some(format.into_output(out, table)?);
            } else if out.is_some() || table.is_some() {
                let configured = cfg.output.take().unwrap_or(OutputConfig::Console);
                cfg.output = Some(configured.with_overrides(out, table)?);
            }
            ConfigLoader::validate(&cfg)?;

            let text = read_input(&urls, input.as_deref())?;
            let url_count = parse_urls(&text).len();

            let submission = Submission::new(ScrapeClient::new(&cfg)?, cfg.show_pending, None);

            let mut spinner: Option<ProgressBar> = None;
            let mut _state_task = None;
            if progress && url_count > 0 {
                let pb = multi.add(ProgressBar::new_spinner());
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
                );
                pb.enable_steady_tick(Duration::from_millis(100));

                let mut state_rx = submission.watch_state();
                let pb_clone = pb.clone();
                spinner = Some(pb);
                _state_task = Some(tokio::spawn(async move {
                    while state_rx.changed().await.is_ok() {
                        let state = *state_rx.borrow();
                        match state {
                            SubmissionState::Submitting => {
                                pb_clone.set_message(format!("Scraping {} URL(s)...", url_count))
                            }
                            SubmissionState::Rendering => pb_clone.set_message("Rendering..."),
                            _ => {}
                        }
                    }
                }));
            }

            let outcome = submission.submit(&text).await;
            if let Some(task) = _state_task {
                task.abort();
            }

            let message = match &outcome {
                Ok(report) => report.message.clone(),
                Err(Error::EmptyInput) => {
                    eprintln!("❌ {}", Error::EmptyInput);
                    std::process::exit(1);
                }
                Err(e) => failure_message(e),
            };

            let console_multi = if progress && std::io::stdout().is_terminal() {
                Some(multi.clone())
            } else {
                None
            };
            let mut handler = ConfigLoader::create_output(&cfg, console_multi).await?;
            publish(handler.as_mut(), &submission.table().await, &message).await?;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            let metrics = submission.metrics().snapshot();
            match &outcome {
                Ok(report) => {
                    eprintln!("\n✅ Submission Completed:");
                    eprintln!("   URLs Submitted: {}", report.urls_submitted);
                    eprintln!("   Rows Rendered: {}", report.rows_rendered);
                    eprintln!(
                        "   Succeeded / Failed: {} / {}",
                        metrics.items_success, metrics.items_error
                    );
                    eprintln!("   Success Rate: {:.1}%", metrics.item_success_rate);
                    eprintln!("   Response Time: {}ms", report.elapsed.as_millis());
                }
                Err(e) => {
                    eprintln!("❌ {}", failure_message(e));
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { config } => {
            log::set_boxed_logger(Box::new(logger))?;
            log::set_max_level(level);

            match ConfigLoader::load(&config) {
                Ok(cfg) => {
                    println!("✅ Config is valid:");
                    println!("   Server: {}{}", cfg.server_url, cfg.endpoint);
                    println!(
                        "   Timeouts: {}s total, {}s connect",
                        cfg.timeout_secs, cfg.connect_timeout_secs
                    );
                    println!("   Pending rows: {}", cfg.show_pending);
                    println!("   Output: {:?}", cfg.output.unwrap_or(OutputConfig::Console));
                }
                Err(e) => {
                    eprintln!("❌ Config error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
