mod auth_cmds;
mod config;
mod grocery_cmds;
mod meal_cmds;
mod output;
mod suggest_cmd;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mealmate_api::TokenStore;
use mealmate_api::models::{DayOfWeek, GroceryItemId, MealId};
use mealmate_core::AppContext;

use config::MealmateConfig;
use output::Reported;

#[derive(Parser)]
#[command(name = "mealmate", about = "Weekly meal planner and grocery list")]
struct Cli {
    /// API base URL (overrides MEALMATE_API_URL env var)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a mealmate config file (uses --api-url if given)
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,
        /// Password (falls back to MEALMATE_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        /// Password (falls back to MEALMATE_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Check that the backend is reachable
    Health,
    /// Print the weekly meal plan
    Plan,
    /// Meal management
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Grocery list management
    Grocery {
        #[command(subcommand)]
        command: GroceryCommands,
    },
    /// Ask the AI for meal ideas, optionally adding one to the plan
    Suggest {
        /// What kind of meals to suggest
        prompt: String,
        /// Number of ideas
        #[arg(long, default_value_t = 3)]
        count: u32,
        /// Add suggestion number PICK (1-based) to the plan
        #[arg(long, requires = "day")]
        add: Option<usize>,
        /// Day to add the picked suggestion to
        #[arg(long)]
        day: Option<DayOfWeek>,
    },
}

#[derive(Subcommand)]
pub enum MealCommands {
    /// Plan a meal on a day
    Add {
        #[arg(long)]
        day: DayOfWeek,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// One ingredient per line, as "quantity, name"
        #[arg(long)]
        ingredients: String,
    },
    /// Change a planned meal; omitted fields keep their current value
    Edit {
        id: MealId,
        #[arg(long)]
        day: Option<DayOfWeek>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// One ingredient per line, as "quantity, name"
        #[arg(long)]
        ingredients: Option<String>,
    },
    /// Remove a planned meal
    Delete {
        id: MealId,
        #[arg(long)]
        day: DayOfWeek,
    },
}

#[derive(Subcommand)]
pub enum GroceryCommands {
    /// Print the grocery list
    List,
    /// Add an item by hand
    Add {
        name: String,
        /// Defaults to 1
        #[arg(long, default_value = "")]
        quantity: String,
    },
    /// Flip an item between purchased and not purchased
    Toggle { id: GroceryItemId },
    /// Remove an item
    Remove { id: GroceryItemId },
    /// Remove every purchased item
    ClearPurchased,
}

fn cmd_init(api_url: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut cfg = config::ConfigFile::default();
    if let Some(url) = api_url {
        cfg.client.api_url = url.to_string();
    }
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  client.api_url = {}", cfg.client.api_url);
    println!("  notifications.ttl_secs = {}", cfg.notifications.ttl_secs);
    println!();
    println!("Next: run `mealmate register` or `mealmate login`.");

    Ok(())
}

/// Build the context and resolve any saved session.
async fn open_context(cli_api_url: Option<&str>) -> anyhow::Result<AppContext> {
    let resolved = MealmateConfig::resolve(cli_api_url)?;
    tracing::debug!(
        base_url = %resolved.gateway.base_url,
        token_path = %resolved.token_path.display(),
        "resolved configuration"
    );
    let tokens = TokenStore::persistent(&resolved.token_path);
    let ctx = AppContext::new(resolved.gateway, tokens, resolved.notification_ttl)
        .context("failed to set up the API client")?;
    ctx.start().await;
    Ok(ctx)
}

async fn run(command: Commands, ctx: &AppContext) -> anyhow::Result<()> {
    match command {
        Commands::Init { .. } => anyhow::bail!("`init` does not use a session"),
        Commands::Register { email, password } => {
            auth_cmds::run_register(ctx, &email, password).await
        }
        Commands::Login { email, password } => auth_cmds::run_login(ctx, &email, password).await,
        Commands::Logout => {
            auth_cmds::run_logout(ctx);
            Ok(())
        }
        Commands::Whoami => {
            auth_cmds::run_whoami(ctx);
            Ok(())
        }
        Commands::Health => auth_cmds::run_health(ctx).await,
        Commands::Plan => meal_cmds::run_plan(ctx).await,
        Commands::Meal { command } => meal_cmds::run_meal_command(command, ctx).await,
        Commands::Grocery { command } => grocery_cmds::run_grocery_command(command, ctx).await,
        Commands::Suggest {
            prompt,
            count,
            add,
            day,
        } => suggest_cmd::run_suggest(ctx, &prompt, count, add.zip(day)).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        return cmd_init(cli.api_url.as_deref(), force);
    }

    let ctx = open_context(cli.api_url.as_deref()).await?;
    let result = run(cli.command, &ctx).await;
    output::flush_notifications(&ctx.notifications);

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is::<Reported>() => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    use mealmate_api::TokenStore;
    use mealmate_core::AppContext;
    use mealmate_test_utils::{MockBackend, TEST_EMAIL};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that touch process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// A started context signed in as the default mock user.
    pub async fn signed_in(backend: &MockBackend) -> AppContext {
        let tokens = TokenStore::in_memory();
        tokens.set(backend.issue_token(TEST_EMAIL));
        let ctx = AppContext::new(
            backend.gateway_config(),
            tokens,
            std::time::Duration::from_secs(60),
        )
        .unwrap();
        ctx.start().await;
        ctx
    }

    /// A started context with no session.
    pub async fn anonymous(backend: &MockBackend) -> AppContext {
        let ctx = AppContext::new(
            backend.gateway_config(),
            TokenStore::in_memory(),
            std::time::Duration::from_secs(60),
        )
        .unwrap();
        ctx.start().await;
        ctx
    }

    /// Messages posted so far, cleared.
    pub fn messages(ctx: &AppContext) -> Vec<String> {
        ctx.notifications
            .drain()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}
