//! Cuehand command line
//!
//! Opens a page in Chrome and runs one natural-language instruction against it. Results are
//! printed to stdout as JSON, logs go to stderr (`RUST_LOG` controls the level).

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use cuehand::{ActOptions, BrowserSession, ConnectionOptions, Cuehand, CuehandConfig, GeminiOptions, GeminiOracle,
              LaunchOptions, NotFoundPolicy, ResolutionStrategy};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Let the model pick a CSS/XPath selector from page content
    Selector,
    /// Let the model name a role and an exact accessible name
    Role,
}

impl From<Strategy> for ResolutionStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Selector => ResolutionStrategy::Selector,
            Strategy::Role => ResolutionStrategy::Role,
        }
    }
}

#[derive(Parser)]
#[command(name = "cuehand")]
#[command(version)]
#[command(about = "Run natural-language instructions against a web page", long_about = None)]
struct Cli {
    /// Page to open before running the command
    url: String,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// WebSocket endpoint URL of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Disable the Chrome sandbox (needed inside most containers)
    #[arg(long)]
    no_sandbox: bool,

    /// How instructions are resolved to elements
    #[arg(long, short = 's', value_enum, default_value = "selector")]
    strategy: Strategy,

    /// Fail instead of reporting when the target element is missing
    #[arg(long)]
    abort_on_missing: bool,

    /// Model identifier (overrides CUEHAND_MODEL)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Perform an action (click, fill, locate)
    Act {
        instruction: String,

        /// Placeholder value, `%key%` in the instruction becomes `value`
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_variable)]
        variables: Vec<(String, String)>,
    },
    /// Check whether an element is on the page
    Observe { instruction: String },
    /// Extract data matching a JSON schema
    Extract {
        instruction: String,

        /// JSON schema file describing the output
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,
    },
    /// Print the sanitized page content
    Content,
}

fn parse_variable(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let session = match &cli.ws_endpoint {
        Some(endpoint) => BrowserSession::connect(ConnectionOptions::new(endpoint.clone()))?,
        None => {
            let mut options = LaunchOptions::new().headless(!cli.headed).sandbox(!cli.no_sandbox);
            if let Some(path) = &cli.chrome_path {
                options = options.chrome_path(path);
            }
            if let Some(dir) = &cli.user_data_dir {
                options = options.user_data_dir(dir);
            }
            BrowserSession::launch(options)?
        }
    };

    let mut gemini = GeminiOptions::from_env()?;
    if let Some(model) = cli.model {
        gemini = gemini.model(model);
    }

    let config = CuehandConfig::new()
        .strategy(cli.strategy.into())
        .not_found(if cli.abort_on_missing {
            NotFoundPolicy::Abort
        } else {
            NotFoundPolicy::Report
        });
    let cuehand = Cuehand::with_config(session.page()?, GeminiOracle::new(gemini)?, config);

    cuehand.goto(&cli.url)?;

    let output = match cli.command {
        Command::Act { instruction, variables } => {
            let options = variables
                .into_iter()
                .fold(ActOptions::new(), |options, (key, value)| options.variable(key, value));
            serde_json::to_value(cuehand.act_with(&instruction, &options)?)?
        }
        Command::Observe { instruction } => serde_json::to_value(cuehand.observe(&instruction)?)?,
        Command::Extract { instruction, schema } => {
            let raw = std::fs::read_to_string(&schema).with_context(|| format!("reading {}", schema.display()))?;
            let schema = serde_json::from_str(&raw).with_context(|| format!("parsing {}", schema.display()))?;
            cuehand.extract_value(&instruction, &schema)?
        }
        Command::Content => {
            println!("{}", cuehand.content()?);
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if output.get("success") == Some(&serde_json::Value::Bool(false)) {
        return Err(anyhow!("instruction was not executed"));
    }
    Ok(())
}
