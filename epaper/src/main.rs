/*
epaper - single-binary main.rs
Runs one batch job per invocation: the daily brief, the Up Ahead events
document, or a user plan read/update.
*/

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::{Config, LlmConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use epaper::llm::remote::RemoteLlmProvider;
use epaper::llm::LlmProvider;
use epaper::scraping::HttpArticleBodySource;
use epaper::{processing, up_ahead, user_plan};

#[derive(Parser, Debug)]
#[command(name = "epaper", about = "Daily news brief and Up Ahead event aggregator")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every source, summarize and translate, write the brief document
    Brief,
    /// Generate or fall back, merge with the stored document, write it
    UpAhead,
    /// Read or update the user's plan document
    UserPlan {
        #[command(subcommand)]
        action: PlanAction,
    },
}

#[derive(Subcommand, Debug)]
enum PlanAction {
    Read,
    Update {
        /// JSON object merged into the plan
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {:#}", e);
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    match args.command {
        Command::Brief => {
            let llm = create_llm_provider(&config.llm);
            let bodies = Arc::new(HttpArticleBodySource::new(config.politeness.fetch_timeout_seconds));
            processing::run_brief(&config, llm, bodies).await?;
        }
        Command::UpAhead => {
            let llm = create_llm_provider(&config.llm);
            up_ahead::run_up_ahead(&config, llm).await?;
        }
        Command::UserPlan { action } => run_user_plan(&config, action).await?,
    }

    Ok(())
}

async fn run_user_plan(config: &Config, action: PlanAction) -> Result<()> {
    let path = PathBuf::from(&config.user_plan.path);
    let plan = match action {
        PlanAction::Read => user_plan::load_plan(&path).await,
        PlanAction::Update { data } => {
            let updated = user_plan::apply_update(&path, &data).await?;
            info!(path = %path.display(), "user plan saved");
            updated
        }
    };
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Build the configured provider. Any problem disables the AI tiers instead of
/// aborting the run.
fn create_llm_provider(llm_config: &LlmConfig) -> Option<Arc<dyn LlmProvider>> {
    let adapter = llm_config.adapter.as_deref().unwrap_or("none");
    match adapter {
        "remote" => {
            let Some(remote_config) = llm_config.remote.as_ref() else {
                warn!("Remote adapter selected but no [llm.remote] section found; AI disabled");
                return None;
            };
            match RemoteLlmProvider::from_config(remote_config) {
                Ok(provider) => {
                    info!("LLM provider initialized: {}", provider.model());
                    Some(Arc::new(provider))
                }
                Err(e) => {
                    warn!("{:#}. AI features will be disabled.", e);
                    None
                }
            }
        }
        "none" => {
            info!("LLM adapter disabled; using extractive and headline summaries only");
            None
        }
        other => {
            warn!("Unknown LLM adapter type: {}; AI disabled", other);
            None
        }
    }
}
