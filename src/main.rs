use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use lofy_client::config::{Config, CredentialStatus};
use lofy_client::logging::init_tracing;
use lofy_client::notifications::{FetchOutcome, DEFAULT_LIMIT, DEFAULT_PAGE};
use lofy_client::services::{
    DashboardFilter, DashboardQuery, ReportDraft, ReportRange, ReportTarget, TimeWindow,
};
use lofy_client::Lofy;

#[derive(Parser, Debug)]
#[command(name = "lofy", version, about = "Command-line client for the Lofy lost-and-found service")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and LOFY_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mail a one-time login code
    Login { email: String },
    /// Exchange a one-time code for a session
    Verify { email: String, code: String },
    /// Forget the stored token and session
    Logout,
    /// Load the current user from the backend
    Me,
    /// Show the locally persisted session
    Status,
    /// Register a push device token
    DeviceToken { token: String },
    /// Toggle following a thread
    Follow { thread_id: i64 },
    #[command(subcommand)]
    Notifications(NotificationCommand),
    #[command(subcommand)]
    Reports(ReportCommand),
    /// List dashboard posts
    Dashboard(DashboardArgs),
}

#[derive(Subcommand, Debug)]
enum NotificationCommand {
    /// Fetch one page and merge it into the cache
    Fetch {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Replace the cache with the first page
    Refresh {
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Print cached notifications
    List {
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read
    Read { id: i64 },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// List reports created in a window (admin)
    List {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Report a post or a claim
    Send {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long, conflicts_with = "claim", required_unless_present = "claim")]
        post: Option<i64>,
        #[arg(long)]
        claim: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[arg(long)]
    archived: bool,
    #[arg(long)]
    refresh: bool,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
    #[arg(long, group = "filter")]
    building: Option<String>,
    /// today, this_week or this_month
    #[arg(long, group = "filter")]
    time_range: Option<String>,
    /// B or 1-8
    #[arg(long, group = "filter")]
    floor: Option<String>,
}

impl DashboardArgs {
    fn into_query(self) -> Result<DashboardQuery> {
        let filter = match (self.building, self.time_range, self.floor) {
            (Some(building), _, _) => DashboardFilter::Building(building),
            (_, Some(window), _) => DashboardFilter::TimeRange(
                TimeWindow::parse(&window)
                    .with_context(|| format!("Unknown time range: {}", window))?,
            ),
            (_, _, Some(floor)) => DashboardFilter::Floor(floor),
            _ => DashboardFilter::All,
        };
        Ok(DashboardQuery {
            archived: self.archived,
            refresh: self.refresh,
            page: self.page,
            limit: self.limit,
            filter,
        })
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(url) = &cli.api_url {
        config.apply_base_url_override(url);
        config.validate().context("Invalid --api-url")?;
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let app = Lofy::open(config).context("Failed to build HTTP client")?;

    match cli.command {
        Command::Login { email } => {
            app.auth().request_otp(&email).await?;
            println!("A login code was sent to {}", email.trim());
        }
        Command::Verify { email, code } => {
            app.auth().verify_otp(&email, &code).await?;
            let profile = app.users().fetch_current_user().await?;
            println!("Logged in as {} (id {})", profile.alias, profile.id);
        }
        Command::Logout => {
            app.auth().logout()?;
            println!("Logged out");
        }
        Command::Me => {
            let profile = app.users().fetch_current_user().await?;
            print_json(&profile)?;
        }
        Command::Status => {
            let signed_in = matches!(app.credential()?, CredentialStatus::Configured(_));
            print_json(&app.session().snapshot())?;
            println!("token: {}", if signed_in { "stored" } else { "none" });
        }
        Command::DeviceToken { token } => {
            app.users().register_device_token(&token).await?;
            println!("Device token registered");
        }
        Command::Follow { thread_id } => {
            let followed = app.follows().toggle(thread_id).await?;
            let verb = if followed { "Following" } else { "Unfollowed" };
            println!("{} thread {}", verb, thread_id);
        }
        Command::Notifications(cmd) => run_notifications(&app, cmd).await?,
        Command::Reports(cmd) => run_reports(&app, cmd).await?,
        Command::Dashboard(args) => {
            let posts = app.posts().dashboard(&args.into_query()?).await?;
            print_json(&posts)?;
        }
    }

    Ok(())
}

async fn run_notifications(app: &Lofy, cmd: NotificationCommand) -> Result<()> {
    let store = app.notifications();
    match cmd {
        NotificationCommand::Fetch { page, limit } => {
            match store.fetch_notifications(page, limit).await {
                FetchOutcome::Merged(stats) => println!(
                    "Received {} ({} new, {} updated), {} cached",
                    stats.received,
                    stats.added,
                    stats.updated,
                    store.len()
                ),
                FetchOutcome::Replaced { count } => println!("{} cached", count),
                FetchOutcome::Failed => bail!("Fetching notifications failed; cache unchanged"),
            }
        }
        NotificationCommand::Refresh { limit } => match store.refresh_notifications(limit).await {
            FetchOutcome::Failed => bail!("Refreshing notifications failed; cache unchanged"),
            _ => println!("{} cached, {} unread", store.len(), store.unread_count()),
        },
        NotificationCommand::List { unread } => {
            let items: Vec<_> = store
                .notifications()
                .into_iter()
                .filter(|n| !unread || !n.is_read)
                .collect();
            print_json(&items)?;
        }
        NotificationCommand::Read { id } => {
            store.mark_as_read(id).await?;
            println!("Notification {} marked as read", id);
        }
    }
    Ok(())
}

async fn run_reports(app: &Lofy, cmd: ReportCommand) -> Result<()> {
    let service = app.reports();
    match cmd {
        ReportCommand::List { start, end } => {
            let reports = service.list_reports(&ReportRange::new(start, end)?).await?;
            print_json(&reports)?;
        }
        ReportCommand::Send {
            title,
            message,
            post,
            claim,
        } => {
            let target = match (post, claim) {
                (Some(id), _) => ReportTarget::Post(id),
                (None, Some(id)) => ReportTarget::Claim(id),
                (None, None) => bail!("Either --post or --claim is required"),
            };
            let response = service
                .send_report(&ReportDraft {
                    title,
                    message,
                    target,
                })
                .await?;
            print_json(&response)?;
        }
    }
    Ok(())
}
