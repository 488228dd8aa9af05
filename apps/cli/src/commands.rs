//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use navi_core::{
    CancelToken, CommentAggregator, CommentBatch, FetchContext, ProgressReporter,
    StakeholderTally, derive_docket_id,
};
use navi_regulations::RegulationsClient;
use navi_shared::{
    AppConfig, ChainCredential, ClientConfig, Comment, CredentialSource, PipelineConfig,
    init_config, load_config, require_api_key,
};
use tracing::{info, warn};

/// Characters of comment body shown per comment in text output.
const EXCERPT_CHARS: usize = 240;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Navi: public comments on federal rulemaking documents.
#[derive(Parser)]
#[command(
    name = "navi",
    version,
    about = "Fetch recent public comments on regulations.gov documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch the most recent comments posted on a document.
    Comments {
        /// Document id, e.g. EPA-HQ-OAR-2021-0317-0001.
        document_id: String,

        /// Owning docket id (derived from the document id when omitted).
        #[arg(long)]
        docket: Option<String>,

        /// Concurrent detail requests (1-6).
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Give up on the whole run after this many seconds.
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Print the batch as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Print the total number of comments on a document.
    Count {
        /// Document id.
        document_id: String,
    },

    /// Print the docket id a document belongs to.
    Docket {
        /// Document id.
        document_id: String,
    },

    /// Check that the configured API key is accepted.
    Check,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "navi=info",
        1 => "navi=debug",
        _ => "navi=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Comments {
            document_id,
            docket,
            concurrency,
            deadline_secs,
            json,
        } => cmd_comments(&document_id, docket.as_deref(), concurrency, deadline_secs, json).await,
        Command::Count { document_id } => cmd_count(&document_id).await,
        Command::Docket { document_id } => cmd_docket(&document_id),
        Command::Check => cmd_check().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_comments(
    document_id: &str,
    docket: Option<&str>,
    concurrency: Option<usize>,
    deadline_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;

    // Flags override the config file
    let mut options = PipelineConfig::from(&config);
    if let Some(n) = concurrency {
        options = options.with_concurrency(n);
    }
    if let Some(secs) = deadline_secs {
        options = options.with_deadline(Some(Duration::from_secs(secs)));
    }

    let aggregator = build_aggregator(&config, options)?;

    let cancel = CancelToken::new();
    let ctx = FetchContext::from_config(aggregator.options()).with_cancel(cancel.clone());
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing with comments fetched so far");
            cancel.cancel();
        }
    });

    info!(
        document_id,
        concurrency = aggregator.options().detail_concurrency,
        "fetching comments"
    );

    let reporter = CliProgress::new();
    let result = aggregator.aggregate(document_id, docket, &ctx, &reporter).await;
    reporter.spinner.finish_and_clear();
    ctrl_c.abort();
    let batch = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        print_batch(&batch);
    }

    Ok(())
}

async fn cmd_count(document_id: &str) -> Result<()> {
    let config = load_config()?;
    let aggregator = CommentAggregator::from_config(&config)?;
    let count = aggregator.get_comment_count(document_id).await;
    println!("{count}");
    Ok(())
}

fn cmd_docket(document_id: &str) -> Result<()> {
    let docket = derive_docket_id(document_id)
        .ok_or_else(|| eyre!("'{document_id}' does not contain a docket id"))?;
    println!("{docket}");
    Ok(())
}

async fn cmd_check() -> Result<()> {
    let config = load_config()?;
    let credentials = ChainCredential::from_config(&config)?;
    let key = require_api_key(&credentials)?;
    let client = RegulationsClient::new(&ClientConfig::from(&config))?;

    info!(base_url = %client.base_url(), "checking API connection");
    let status = client.check_connection(&key).await?;

    println!("  {status}");
    println!("  Key:    {}", key.masked());
    println!("  Source: {}", credentials.describe());
    println!("  API:    {}", client.base_url());
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn build_aggregator(config: &AppConfig, options: PipelineConfig) -> Result<CommentAggregator> {
    let client = RegulationsClient::new(&ClientConfig::from(config))?;
    let credentials = ChainCredential::from_config(config)?;
    Ok(CommentAggregator::new(client, Arc::new(credentials), options))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_batch(batch: &CommentBatch) {
    let tally = StakeholderTally::from_comments(&batch.comments);

    println!();
    println!("  Document: {}", batch.document_id);
    if let Some(docket) = &batch.docket_id {
        println!("  Docket:   {docket}");
    }
    println!(
        "  Comments: {} of {} reported ({} attempted, {} skipped, {} on other documents)",
        batch.len(),
        batch.total_reported,
        batch.attempted,
        batch.skipped,
        batch.mismatched
    );
    if batch.cancelled {
        println!("  Interrupted: showing comments fetched before cancellation");
    }
    println!(
        "  Stakeholders: {} organizations, {} individuals, {} other",
        tally.organizations, tally.individuals, tally.other
    );
    if !tally.names.is_empty() {
        println!("  Submitters: {}", tally.names.join(", "));
    }

    for comment in &batch.comments {
        print_comment(comment);
    }
    println!();
}

fn print_comment(comment: &Comment) {
    let who = comment
        .submitter_display()
        .unwrap_or_else(|| "Anonymous".to_string());
    let when = comment
        .posted_at()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| comment.posted_date.clone());

    println!();
    println!("  {} | {who} | {when}", comment.id);
    if let Some(title) = &comment.title {
        println!("  {title}");
    }
    println!("    {}", excerpt(&comment.comment, EXCERPT_CHARS));
}

/// First `max` characters of `text` on one line, with an ellipsis if cut.
fn excerpt(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn comment_fetched(&self, comment_id: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {comment_id}"));
    }

    fn done(&self, _batch: &CommentBatch) {
        self.spinner.finish_and_clear();
    }
}
