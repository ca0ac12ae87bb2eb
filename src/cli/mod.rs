//! CLI module for Sample
//!
//! Provides commands:
//! - `track`: Send a generic event
//! - `registration`, `sign-in`, `profile-update`: Account events
//! - `preview`: Print the payload an event would send, without sending it

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sample_core::{EventParams, EventTracker, RequestContext, TrackerConfig};
use std::path::PathBuf;
use tracing::info;

pub mod params;

/// Sample event tracker CLI
#[derive(Parser, Debug)]
#[command(name = "sample")]
#[command(about = "Send tracking events to the Sample analytics service")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides applied on top of the loaded configuration
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// App token attached to every event
    #[arg(long, global = true)]
    pub app_token: Option<String>,

    /// Analytics endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds (invalid values mean no timeout)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub timeout_ms: Option<String>,

    /// Config file (default: $SAMPLE_CONFIG or ~/.sample/sample.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Event fields given as KEY=VALUE pairs
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    /// Event field, repeatable; values are parsed as JSON, else taken as text
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a generic event
    Track {
        /// Event name, e.g. session_start
        event: String,
        /// Event category
        #[arg(short, long, default_value = "custom")]
        category: String,
        /// User id to attach
        #[arg(long)]
        user_id: Option<String>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Send a registration event for a new user
    Registration {
        user_id: String,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Send a sign-in event for an existing user
    SignIn {
        user_id: String,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Send an account update event
    ProfileUpdate {
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Print the payload an event would send
    Preview {
        event: String,
        #[arg(short, long, default_value = "custom")]
        category: String,
        #[arg(long)]
        user_id: Option<String>,
        #[command(flatten)]
        params: ParamArgs,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let tracker = build_tracker(&cli.global)?;

    match command {
        Commands::Track {
            event,
            category,
            user_id,
            params,
        } => {
            if let Some(user_id) = user_id {
                tracker.set_user_id(user_id);
            }
            tracker
                .track(&event, &category, event_params(&params)?)
                .await;
            info!("Tracked {} ({})", event, category);
        }
        Commands::Registration { user_id, params } => {
            tracker.registration(&user_id, event_params(&params)?).await;
            info!("Tracked registration for {}", user_id);
        }
        Commands::SignIn { user_id, params } => {
            tracker.sign_in(&user_id, event_params(&params)?).await;
            info!("Tracked sign_in for {}", user_id);
        }
        Commands::ProfileUpdate { params } => {
            tracker.profile_update(event_params(&params)?).await;
            info!("Tracked profile update");
        }
        Commands::Preview {
            event,
            category,
            user_id,
            params,
        } => {
            if let Some(user_id) = user_id {
                tracker.set_user_id(user_id);
            }
            let payload = tracker.build_payload(&event, &category, &event_params(&params)?);
            let request = tracker.outbound_request(&tracker.endpoint(), Some(&payload));

            println!("{} {}", request.method(), request.url);
            for (name, value) in &request.headers {
                println!("{}: {}", name, value);
            }
            println!();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "p": payload }))?
            );
        }
    }

    Ok(())
}

fn build_tracker(global: &GlobalArgs) -> Result<EventTracker> {
    let mut config = match &global.config {
        Some(path) => {
            let mut config = TrackerConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => TrackerConfig::load(),
    };

    if let Some(token) = global.app_token.as_ref().filter(|t| !t.is_empty()) {
        config.app_token = Some(token.clone());
    }
    if let Some(endpoint) = &global.endpoint {
        config.endpoint = endpoint.clone();
    }

    let tracker = EventTracker::with_defaults(config, &RequestContext::from_cgi_env());
    if let Some(timeout) = &global.timeout_ms {
        tracker.set_request_timeout_str(timeout);
    }
    Ok(tracker)
}

fn event_params(args: &ParamArgs) -> Result<EventParams> {
    let map = params::parse_pairs(&args.params)?;
    EventParams::from_map(map).context("Invalid event parameters")
}
