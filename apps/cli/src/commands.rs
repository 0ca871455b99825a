//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use featuredoc_core::pipeline::{
    FeatureDocResult, LiveCollaborators, PipelineOptions, ProgressReporter, generate_feature_doc,
};
use featuredoc_shared::{AppConfig, BlockMode, RunInputs, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// featuredoc: document merged pull requests in Notion.
#[derive(Parser)]
#[command(
    name = "featuredoc",
    version,
    about = "Generate a feature document from a pull request and file it in Notion.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.featuredoc/featuredoc.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Block conversion override.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ModeArg {
    Structured,
    Paragraphs,
}

impl From<ModeArg> for BlockMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Structured => BlockMode::Structured,
            ModeArg::Paragraphs => BlockMode::Paragraphs,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate the document for one pull request and create its page.
    Generate {
        /// Repository as owner/name.
        #[arg(long, env = "REPO_FULL")]
        repo: Option<String>,

        /// Pull request number.
        #[arg(long, env = "PR_NUMBER")]
        pr: Option<String>,

        /// OpenAI API key.
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_api_key: Option<String>,

        /// Notion integration token.
        #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
        notion_token: Option<String>,

        /// Destination Notion database id.
        #[arg(long, env = "NOTION_DB_ID")]
        notion_db_id: Option<String>,

        /// GitHub token with read access to the repository.
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,

        /// Override the configured block mode.
        #[arg(long)]
        block_mode: Option<ModeArg>,
    },

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
        0 => "featuredoc=info",
        1 => "featuredoc=debug",
        _ => "featuredoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Generate {
            repo,
            pr,
            openai_api_key,
            notion_token,
            notion_db_id,
            github_token,
            block_mode,
        } => {
            let inputs = RunInputs {
                openai_api_key,
                notion_token,
                notion_db_id,
                github_token,
                repo_full: repo,
                pr_number: pr,
            };
            cmd_generate(config_path, inputs, block_mode).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn cmd_generate(
    config_path: Option<&Path>,
    inputs: RunInputs,
    block_mode: Option<ModeArg>,
) -> Result<()> {
    // Validate inputs before any network call
    let run = inputs.validate()?;
    let config = resolve_config(config_path)?;

    let mut opts = PipelineOptions::from(&config);
    if let Some(mode) = block_mode {
        opts.block_mode = mode.into();
    }

    info!(pr = %run.pull_request, mode = ?opts.block_mode, "generating feature doc");

    let live = LiveCollaborators::new(&run, &config)?;
    let reporter = CliProgress::new();

    let result = generate_feature_doc(
        &run,
        &opts,
        chrono::Utc::now(),
        &live.github,
        &live.openai,
        &live.notion,
        &reporter,
    )
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    println!();
    println!("  Feature doc created!");
    println!("  Title:  {}", result.metadata.filename);
    println!("  Task:   {}", result.metadata.task_id);
    println!("  Area:   {}", result.metadata.app_area);
    println!("  Blocks: {}", result.block_count);
    println!("  Page:   {}", result.page_id);
    println!("  URL:    {}", result.page_url);
    println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
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
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &FeatureDocResult) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
