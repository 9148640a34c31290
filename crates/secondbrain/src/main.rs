use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use secondbrain_client::{ApiClient, ApiConfig, Credentials, PASSWORD_VAR};

mod board;
mod calendar;
mod commands;
mod html;
mod schedule;
mod server;
mod session;
mod text;

use calendar::MonthRef;
use commands::{NoteCommand, ResourceCommand, SessionCommand, TaskCommand};

#[derive(Parser, Debug)]
#[command(name = "secondbrain")]
#[command(about = "Tasks, notes, resources and a study calendar for your Second Brain")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File holding the saved login token
    #[arg(long, default_value = ".secondbrain-session.json", global = true)]
    session: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Generate a static schedule page (no server)
    Build {
        #[arg(long)]
        year: Option<i32>,
        /// Month, 1-12 (values outside roll over into other years)
        #[arg(long, allow_negative_numbers = true)]
        month: Option<i32>,
        /// Output directory for schedule.html
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Print a month calendar with its tasks and study sessions
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        /// Month, 1-12 (values outside roll over into other years)
        #[arg(long, allow_negative_numbers = true)]
        month: Option<i32>,
    },

    /// Log in with SECONDBRAIN_USER / SECONDBRAIN_PASSWORD and save the token
    Login {
        /// Override SECONDBRAIN_USER
        #[arg(long)]
        username: Option<String>,
    },

    /// Create an account and log in with it
    Register {
        #[arg(long)]
        email: String,
        /// Defaults to SECONDBRAIN_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },

    /// Show the logged-in user
    Whoami,

    /// Forget the saved token
    Logout,

    /// Manage tasks
    #[command(subcommand)]
    Tasks(TaskCommand),

    /// Manage notes
    #[command(subcommand)]
    Notes(NoteCommand),

    /// Manage saved resources
    #[command(subcommand)]
    Resources(ResourceCommand),

    /// Manage study sessions
    #[command(subcommand)]
    Sessions(SessionCommand),

    /// Show dashboard counters
    Stats,
}

fn init_tracing(log_level: &str) {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    for quiet in ["hyper=warn", "reqwest=warn", "tower_http=warn"] {
        if let Ok(directive) = quiet.parse() {
            filter = filter.add_directive(directive);
        }
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

fn env_password() -> Result<String> {
    std::env::var(PASSWORD_VAR)
        .with_context(|| format!("{PASSWORD_VAR} environment variable not set"))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Month from optional CLI flags (month one-indexed), defaulting to now.
fn pick_month(year: Option<i32>, month: Option<i32>) -> MonthRef {
    let current = MonthRef::from_date(today());
    MonthRef::from_month1(
        year.unwrap_or(current.year()),
        month.unwrap_or(current.month1() as i32),
    )
}

async fn month_grid(
    client: &ApiClient,
    year: Option<i32>,
    month: Option<i32>,
) -> Result<(MonthRef, Vec<calendar::Cell>)> {
    let month = pick_month(year, month);
    let events = schedule::fetch_events(client)
        .await
        .context("Failed to fetch tasks and study sessions")?;
    Ok((month, calendar::generate_grid(month, &events, today())))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let config = ApiConfig::from_env();
    let session_path = args.session;

    match args.command {
        // Default to serve if no command specified
        None => {
            let client = session::connect(&config, &session_path).await?;
            server::serve(8080, client).await?;
        }
        Some(Commands::Serve { port }) => {
            let client = session::connect(&config, &session_path).await?;
            server::serve(port, client).await?;
        }
        Some(Commands::Build {
            year,
            month,
            output,
        }) => {
            let client = session::connect(&config, &session_path).await?;
            let (month, cells) = month_grid(&client, year, month).await?;
            std::fs::create_dir_all(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            let html_path = output.join("schedule.html");
            html::generate_schedule_html(month, &cells, &html_path)?;
            info!(path = %html_path.display(), month = %month.label(), "HTML saved");
        }
        Some(Commands::Calendar { year, month }) => {
            let client = session::connect(&config, &session_path).await?;
            let (month, cells) = month_grid(&client, year, month).await?;
            print!("{}", text::render_month(month, &cells));
        }
        Some(Commands::Login { username }) => {
            let credentials = match username {
                Some(username) => Credentials {
                    username,
                    password: env_password()?,
                },
                None => Credentials::from_env().context("Failed to load credentials")?,
            };
            let client = ApiClient::new(&config)?;
            session::login(&client, &credentials, &session_path).await?;
            println!("Logged in as {}", credentials.username);
        }
        Some(Commands::Register { email, password }) => {
            let password = match password {
                Some(p) => p,
                None => env_password()?,
            };
            let client = ApiClient::new(&config)?;
            let (user, _) = session::register(&client, &email, &password, &session_path).await?;
            println!("Registered and logged in as {} (id {})", user.email, user.id);
        }
        Some(Commands::Whoami) => {
            let client = session::connect(&config, &session_path).await?;
            let user = client
                .current_user()
                .await
                .context("Failed to fetch user")?;
            println!("{} (id {})", user.email, user.id);
        }
        Some(Commands::Logout) => {
            if session::clear(&session_path)? {
                println!("Logged out");
            } else {
                println!("No saved session");
            }
        }
        Some(Commands::Tasks(command)) => {
            let client = session::connect(&config, &session_path).await?;
            commands::run_tasks(&client, command).await?;
        }
        Some(Commands::Notes(command)) => {
            let client = session::connect(&config, &session_path).await?;
            commands::run_notes(&client, command).await?;
        }
        Some(Commands::Resources(command)) => {
            let client = session::connect(&config, &session_path).await?;
            commands::run_resources(&client, command).await?;
        }
        Some(Commands::Sessions(command)) => {
            let client = session::connect(&config, &session_path).await?;
            commands::run_sessions(&client, command, today()).await?;
        }
        Some(Commands::Stats) => {
            let client = session::connect(&config, &session_path).await?;
            let stats = client.stats().await.context("Failed to fetch stats")?;
            println!("Pending tasks:  {}", stats.pending_tasks);
            println!("Notes created:  {}", stats.notes_created);
            println!("Study hours:    {}", stats.study_hours);
            println!("Focus score:    {}", stats.focus_score);
        }
    }

    Ok(())
}
