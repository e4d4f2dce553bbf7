//! Back2Back CLI - drive the member data layer from a terminal.
//!
//! Every command goes through the same cached resources the app screens use,
//! so cached values are shown (and marked stale) when the API is unreachable.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use back2back_core::hooks::{GymLocations, Membership, UserProfile};
use back2back_core::{
    ApiClient, Config, FileStore, GymApi, KeyValueStore, MemoryStore, MockApi, Resource,
    ResourceRegistry,
};

const LOG_FILE_PREFIX: &str = "back2back.log";

#[derive(Parser)]
#[command(name = "back2back", version, about = "Back2Back member data from the command line")]
struct Cli {
    /// Use the built-in mock backend
    #[arg(long, global = true, conflicts_with = "no_mock")]
    mock: bool,

    /// Use the real member API
    #[arg(long, global = true)]
    no_mock: bool,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Print values as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the member profile
    Profile,
    /// List gym locations and the primary gym
    Gyms,
    /// List membership plans and the current plan
    Plans,
    /// Make a gym location the primary gym
    SetPrimary {
        /// Gym location ID
        id: String,
    },
    /// Switch to another membership plan
    ChangePlan {
        /// Membership plan ID
        id: String,
    },
    /// Edit profile fields
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Remove all cached data
    ClearCache,
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file writer and must be held until exit.
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    let store = config
        .cache_dir()
        .and_then(|dir| FileStore::new(dir).map_err(anyhow::Error::from));
    match store {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Cache directory unavailable, caching in memory only");
            Arc::new(MemoryStore::new())
        }
    }
}

fn build_api(config: &Config) -> Result<Arc<dyn GymApi>> {
    if config.use_mock_api {
        info!(latency_ms = config.mock_latency_ms, "Using mock backend");
        return Ok(Arc::new(MockApi::new(Duration::from_millis(
            config.mock_latency_ms,
        ))));
    }

    let mut client = ApiClient::new(config.api_base_url.clone())
        .context("Failed to create API client")?;
    match &config.api_token {
        Some(token) => client.set_token(token.clone()),
        None => warn!("No API token configured, requests will be unauthenticated"),
    }
    Ok(Arc::new(client))
}

/// Status line under a listing: staleness and cache age.
fn freshness<T>(resource: &Resource<T>) -> String {
    let mut age = resource
        .age_display()
        .map(|age| format!("updated {}", age))
        .unwrap_or_else(|| "age unknown".to_string());
    if resource.is_outdated() {
        age.push_str(", may be out of date");
    }
    if resource.stale {
        format!("(offline copy, {})", age)
    } else {
        format!("({})", age)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fail the command when there is nothing to show.
fn require_value<T: Clone>(resource: &Resource<T>, what: &str) -> Result<T> {
    if let Some(value) = &resource.value {
        return Ok(value.clone());
    }
    match &resource.last_error {
        Some(e) if resource.is_failed() && e.is_transient() => bail!(
            "Could not load {} and nothing is cached yet: {}",
            what,
            e.user_message()
        ),
        Some(e) => bail!("Could not load {}: {}", what, e.user_message()),
        None => bail!("Could not load {}", what),
    }
}

async fn show_profile(registry: &ResourceRegistry, api: Arc<dyn GymApi>, json: bool) -> Result<()> {
    let hook = UserProfile::new(registry, api).await?;
    let resource = hook.reload().await;
    let user = require_value(&resource, "profile")?;

    if json {
        return print_json(&user);
    }
    println!("[{}] {}", user.initials(), user.full_name);
    println!("  Email: {}", user.email);
    println!("  Phone: {}", user.display_phone());
    println!("{}", freshness(&resource));
    Ok(())
}

async fn show_gyms(registry: &ResourceRegistry, api: Arc<dyn GymApi>, json: bool) -> Result<()> {
    let hook = GymLocations::new(registry, api).await?;
    let resource = hook.reload().await;
    let locations = require_value(&resource, "gym locations")?;

    if json {
        return print_json(&locations);
    }
    for location in &locations {
        let marker = if location.is_primary { "*" } else { " " };
        println!(
            "{} {:>3}  {}  {}",
            marker,
            location.id,
            location.name,
            location.full_address()
        );
    }
    println!("{}", freshness(&resource));
    Ok(())
}

async fn show_plans(registry: &ResourceRegistry, api: Arc<dyn GymApi>, json: bool) -> Result<()> {
    let hook = Membership::new(registry, api).await?;
    let view = hook.reload().await;
    let plans = require_value(&view.plans, "membership plans")?;
    let current = view.current.value.clone();

    if json {
        return print_json(&plans);
    }
    for plan in &plans {
        let marker = if current.as_deref() == Some(plan.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:>3}  {:<32} {}",
            marker,
            plan.id,
            plan.name,
            plan.display_price()
        );
    }
    if let Some(e) = &view.current.last_error {
        println!("Current plan unavailable: {}", e.user_message());
    }
    println!("{}", freshness(&view.plans));
    Ok(())
}

async fn set_primary(registry: &ResourceRegistry, api: Arc<dyn GymApi>, id: &str) -> Result<()> {
    let hook = GymLocations::new(registry, api).await?;
    require_value(&hook.reload().await, "gym locations")?;
    hook.set_primary(id)
        .await
        .with_context(|| format!("Failed to set primary gym to {}", id))?;

    if let Some(primary) = hook.primary() {
        println!("Primary gym is now {}", primary.name);
    }
    Ok(())
}

async fn change_plan(registry: &ResourceRegistry, api: Arc<dyn GymApi>, id: &str) -> Result<()> {
    let hook = Membership::new(registry, api).await?;
    require_value(&hook.reload().await.current, "current membership")?;
    hook.change_plan(id)
        .await
        .with_context(|| format!("Failed to change membership plan to {}", id))?;

    match hook.current_plan() {
        Some(plan) => println!("Membership changed to {} ({})", plan.name, plan.display_price()),
        None => println!("Membership changed to plan {}", id),
    }
    Ok(())
}

async fn update_profile(
    registry: &ResourceRegistry,
    api: Arc<dyn GymApi>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
) -> Result<()> {
    if name.is_none() && email.is_none() && phone.is_none() {
        bail!("Nothing to update: pass --name, --email or --phone");
    }

    let hook = UserProfile::new(registry, api).await?;
    let mut edited = require_value(&hook.reload().await, "profile")?;
    if let Some(name) = name {
        edited.full_name = name;
    }
    if let Some(email) = email {
        edited.email = email;
    }
    if let Some(phone) = phone {
        edited.phone_number = phone;
    }

    hook.update(edited).await.context("Failed to update profile")?;
    println!("Profile saved");
    Ok(())
}

async fn clear_cache(registry: &ResourceRegistry, api: Arc<dyn GymApi>) -> Result<()> {
    GymLocations::new(registry, Arc::clone(&api))
        .await?
        .clear()
        .await
        .context("Failed to clear gym locations")?;
    Membership::new(registry, Arc::clone(&api))
        .await?
        .clear()
        .await
        .context("Failed to clear membership")?;
    UserProfile::new(registry, api)
        .await?
        .clear()
        .await
        .context("Failed to clear profile")?;
    println!("Cache cleared");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_ref());

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Using default configuration");
            Config::default()
        }
    };
    config.apply_env();
    if cli.mock {
        config.use_mock_api = true;
    } else if cli.no_mock {
        config.use_mock_api = false;
    }

    let registry = ResourceRegistry::new(open_store(&config));
    let api = build_api(&config)?;

    match cli.command {
        Command::Profile => show_profile(&registry, api, cli.json).await,
        Command::Gyms => show_gyms(&registry, api, cli.json).await,
        Command::Plans => show_plans(&registry, api, cli.json).await,
        Command::SetPrimary { id } => set_primary(&registry, api, &id).await,
        Command::ChangePlan { id } => change_plan(&registry, api, &id).await,
        Command::UpdateProfile { name, email, phone } => {
            update_profile(&registry, api, name, email, phone).await
        }
        Command::ClearCache => clear_cache(&registry, api).await,
    }
}
