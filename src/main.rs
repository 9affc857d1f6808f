use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tcstatus::config::{ConfigLoader, Overrides};
use tcstatus::metrics::report::MetricsReport;
use tcstatus::output::{self, OutputFormat};
use tcstatus::sort::SortField;
use tcstatus::{Error, server};

#[derive(Parser)]
#[command(name = "tcstatus")]
#[command(version)]
#[command(about = "Poll servlet container status pages and list in-flight requests", long_about = None)]
struct Cli {
    /// Host specs (host:port, URL, or a template such as app%d.prod:8080).
    /// More specs are read from stdin when it is not a terminal.
    hosts: Vec<String>,

    /// Field to sort on
    #[arg(short, long, value_enum)]
    sort: Option<SortField>,

    /// Username for basic auth
    #[arg(short, long)]
    username: Option<String>,

    /// Password for basic auth
    #[arg(short, long)]
    password: Option<String>,

    /// Request timeout in milliseconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Number of concurrent fetch workers
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Start the HTTP server after the first fetch
    #[arg(short, long)]
    web: bool,

    /// Port for the HTTP server
    #[arg(long)]
    port: Option<u16>,

    /// Output format for the console listing
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Show a progress bar (stderr)
    #[arg(long)]
    progress: bool,

    /// Configuration file (JSON/YAML/TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let multi = indicatif::MultiProgress::new();
    if cli.progress {
        indicatif_log_bridge::LogWrapper::new(multi.clone(), logger).try_init()?;
    } else {
        let level = logger.filter();
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(level);
    }

    let mut hosts = cli.hosts.clone();
    hosts.extend(read_stdin_hosts());

    let overrides = Overrides {
        hosts,
        sort: cli.sort,
        username: cli.username.clone(),
        password: cli.password.clone(),
        timeout_ms: cli.timeout,
        concurrency: cli.concurrency,
        serve: cli.web,
        port: cli.port,
        output: cli.output,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;
    let aggregator = Arc::new(ConfigLoader::create_aggregator(&config)?);

    let progress_bar = cli.progress.then(|| {
        let pb = multi.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        let mut metrics_rx = aggregator.watch_metrics();
        let pb_clone = pb.clone();
        let task = tokio::spawn(async move {
            while metrics_rx.changed().await.is_ok() {
                let report: MetricsReport = metrics_rx.borrow().clone();
                pb_clone.set_length(report.endpoints_queued);
                pb_clone.set_position(report.endpoints_processed);
                pb_clone.set_message(format!(
                    "OK: {} | Failed: {} | In-flight: {}",
                    report.fetch_success, report.fetch_failed, report.entries_extracted
                ));
            }
        });
        (pb, task)
    });

    let result = aggregator.refresh(None).await;

    if let Some((pb, task)) = progress_bar {
        task.abort();
        pb.finish_and_clear();
    }

    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(Error::NoEndpoints) => {
            eprintln!("No endpoints to fetch: no host specs given or none resolved.\n");
            eprintln!("{}", Cli::command().render_help());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut handler = output::handler_for(config.output, Box::new(std::io::stdout()));
    output::write_all(handler.as_mut(), &snapshot.entries).await?;

    let report = aggregator.get_metrics();
    log::info!(
        "{} in-flight requests across {} endpoints ({} unreachable, {} unrecognized) | Success: {:.1}% | Avg: {}ms",
        snapshot.entries.len(),
        snapshot.endpoints,
        report.fetch_failed,
        report.unrecognized_documents,
        report.success_rate,
        report.avg_response_time_ms
    );

    if config.serve {
        server::serve(aggregator, config.port).await?;
    }

    Ok(())
}

/// Newline-separated host specs from stdin, unless stdin is a terminal.
fn read_stdin_hosts() -> Vec<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Vec::new();
    }

    let mut input = String::new();
    if let Err(e) = stdin.read_to_string(&mut input) {
        log::error!("Failed to read hosts from stdin: {}", e);
        return Vec::new();
    }
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
