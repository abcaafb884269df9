//! Brandpost - generate and schedule professional posts from your terminal.
//!
//! Without a subcommand the interactive TUI opens. The other subcommands
//! run one workflow step against the content service and exit.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brandpost::core::{
    send_desktop_notification, Config, Credentials, LocalIdentityProvider, Profile, ProfileSource,
    Session,
};
use brandpost::integrations::{ContentService, HttpContentService};
use brandpost::{tui, App, PostWorkflow};

/// Generate and schedule professional posts
#[derive(Parser)]
#[command(name = "brandpost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default locations
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Content service base URL (overrides config and environment)
    #[arg(long, global = true, value_name = "URL")]
    service_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive interface (default)
    Run {
        /// Log in as this user on start
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Generate a post from a user's profile and print it
    Generate {
        /// User to generate for
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Schedule a post, generating one first unless --content is given
    Schedule {
        /// User the post belongs to
        #[arg(short, long)]
        user: String,

        /// Publish time, e.g. 2030-01-01T10:00
        #[arg(long, value_name = "TIME")]
        at: String,

        /// Post text to schedule instead of generating one
        #[arg(long)]
        content: Option<String>,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Print the content service's summary of a user's profile
    Analyze {
        /// User whose profile to analyze
        #[arg(short, long)]
        user: String,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Write the current configuration to the global config file
        #[arg(long, conflicts_with = "path")]
        init: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging. The TUI owns the screen, so it stays quiet by default.
    let interactive = matches!(cli.command, None | Some(Commands::Run { .. }));
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if interactive {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    Config::load_env_file()?;

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            cmd_completions(*shell);
            return Ok(());
        }
        Some(Commands::Config { path: true, .. }) => {
            return cmd_config_path();
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref(), cli.service_url.as_deref())?;

    match cli.command {
        None => cmd_run(config, None),
        Some(Commands::Run { user }) => cmd_run(config, user),
        Some(Commands::Generate { user, json }) => cmd_generate(&config, &user, json),
        Some(Commands::Schedule { user, at, content, json }) => {
            cmd_schedule(&config, &user, &at, content, json)
        }
        Some(Commands::Analyze { user }) => cmd_analyze(&config, &user),
        Some(Commands::Config { init, .. }) => cmd_config(&config, init),
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

/// Resolve configuration: file, then environment, then command-line flags.
fn load_config(path: Option<&std::path::Path>, service_url: Option<&str>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_with_path(path)?,
        None => Config::load()?,
    };

    if let Some(url) = service_url {
        config.service.base_url = url.to_string();
    }

    tracing::debug!(
        base_url = %config.service.base_url,
        timeout_secs = config.service.timeout_secs,
        "Resolved configuration"
    );
    Ok(config)
}

/// Log in as `user`.
fn open_session(config: &Config, user: &str) -> Result<Session> {
    let provider =
        LocalIdentityProvider::new().with_allowed_users(config.identity.allowed_users.clone());
    Ok(Session::login(&provider, &Credentials::username(user))?)
}

/// Load the session user's profile.
fn load_profile(config: &Config, session: &Session) -> Result<Profile> {
    config
        .profile_source()
        .load(session.identity())
        .with_context(|| format!("Could not load a profile for {}", session.identity()))
}

fn content_service(config: &Config) -> Result<HttpContentService> {
    Ok(HttpContentService::new(config.service.base_url.clone(), config.service.timeout())?)
}

/// Print queued workflow notifications to stderr.
fn report(config: &Config, workflow: &mut PostWorkflow) {
    for notification in workflow.take_notifications() {
        eprintln!("[{}] {notification}", notification.level.label());
        if config.ui.desktop_notifications {
            send_desktop_notification(&notification);
        }
    }
}

/// Open the interactive interface.
fn cmd_run(config: Config, user: Option<String>) -> Result<()> {
    let mut app = App::new(config)?;
    if let Some(user) = user {
        app.login_with(user);
    }
    tui::run_tui(app)
}

/// Generate a post and print it.
fn cmd_generate(config: &Config, user: &str, json: bool) -> Result<()> {
    let session = open_session(config, user)?;
    let profile = load_profile(config, &session)?;
    let service = content_service(config)?;
    let mut workflow = PostWorkflow::new(session.identity().clone());

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(workflow.generate(&service, profile));
    report(config, &mut workflow);
    let draft = result?;

    if json {
        let output = serde_json::json!({
            "user_id": session.identity(),
            "post_content": draft.content,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", draft.content);
    }

    Ok(())
}

/// Schedule a post, generating it first when no content is given.
fn cmd_schedule(
    config: &Config,
    user: &str,
    at: &str,
    content: Option<String>,
    json: bool,
) -> Result<()> {
    let session = open_session(config, user)?;
    let service = content_service(config)?;
    let mut workflow = PostWorkflow::new(session.identity().clone())
        .with_require_future(config.schedule.require_future);

    let rt = tokio::runtime::Runtime::new()?;

    match content {
        Some(content) => workflow.adopt_draft(content)?,
        None => {
            let profile = load_profile(config, &session)?;
            let result = rt.block_on(workflow.generate(&service, profile));
            report(config, &mut workflow);
            result?;
        }
    }

    workflow.select_schedule_time(at)?;
    let result = rt.block_on(workflow.schedule(&service));
    report(config, &mut workflow);
    let confirmation = result?;

    let request = match workflow.state() {
        brandpost::WorkflowState::Scheduled { request } => request.clone(),
        other => anyhow::bail!("Unexpected workflow state after scheduling: {}", other.name()),
    };

    if json {
        let output = serde_json::json!({
            "request": request,
            "status": confirmation.status,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Scheduled for {}:\n\n{}", request.scheduled_time, request.content);
    }

    Ok(())
}

/// Print the service's profile summary.
fn cmd_analyze(config: &Config, user: &str) -> Result<()> {
    let session = open_session(config, user)?;
    let profile = load_profile(config, &session)?;
    let service = content_service(config)?;

    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(service.analyze_profile(&profile))?;
    println!("{summary}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "brandpost", &mut io::stdout());
}

/// Print the global config file path.
fn cmd_config_path() -> Result<()> {
    let path = Config::global_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}

/// Show or persist configuration.
fn cmd_config(config: &Config, init: bool) -> Result<()> {
    if init {
        config.save()?;
        if let Some(path) = Config::global_config_path() {
            println!("Wrote {}", path.display());
        }
        return Ok(());
    }

    let toml = toml::to_string_pretty(config)?;
    println!("{toml}");

    Ok(())
}
