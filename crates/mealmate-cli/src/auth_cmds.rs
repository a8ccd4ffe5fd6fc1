//! `mealmate register | login | logout | whoami | health`.

use anyhow::{Context, Result, bail};

use mealmate_core::{AppContext, SessionState};

pub const PASSWORD_ENV: &str = "MEALMATE_PASSWORD";

/// Password from the flag, falling back to `MEALMATE_PASSWORD`.
fn resolve_password(flag: Option<String>) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => Ok(password),
        _ => bail!("password required; pass --password or set {PASSWORD_ENV}"),
    }
}

/// Fail unless a user is logged in.
pub fn require_login(ctx: &AppContext) -> Result<()> {
    if !ctx.session.state().is_authenticated() {
        bail!("not logged in; run `mealmate login` first");
    }
    Ok(())
}

pub async fn run_register(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let user = ctx
        .register(email, &password)
        .await
        .context("registration failed")?;
    println!("Registered and logged in as {}.", user.email);
    Ok(())
}

pub async fn run_login(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let user = ctx.login(email, &password).await.context("login failed")?;
    println!("Logged in as {}.", user.email);
    Ok(())
}

pub fn run_logout(ctx: &AppContext) {
    ctx.logout();
}

pub fn run_whoami(ctx: &AppContext) {
    match ctx.session.state() {
        SessionState::Authenticated(user) => {
            println!("{} (user #{})", user.email, user.id);
            if let Some(created_at) = user.created_at {
                println!("Member since {}", created_at.format("%Y-%m-%d"));
            }
        }
        SessionState::Anonymous | SessionState::Unknown => println!("Not logged in."),
    }
}

pub async fn run_health(ctx: &AppContext) -> Result<()> {
    let health = ctx
        .remote
        .health()
        .await
        .context("backend health check failed")?;
    println!("Backend: {}", health.status);
    if let Some(message) = health.message {
        println!("  {message}");
    }
    if let Some(configured) = health.configured {
        let state = if configured { "configured" } else { "not configured" };
        println!("  AI suggestions: {state}");
    }
    Ok(())
}
