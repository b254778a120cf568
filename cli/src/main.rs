//! Terminal front-end for the project API.
//!
//! Mutations run through `ProjectManager`, so the terminal sees the same
//! reload-after-mutation and error-banner behavior as any other front-end.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use project_core::{Config, ErrorNotifier, Project, ProjectApi, ProjectManager, ReqwestTransport};

#[derive(Parser)]
#[command(name = "projects")]
#[command(about = "Manage projects through the project API")]
struct Cli {
    /// API base URL (defaults to $API_BASE_URL, then http://localhost:8080)
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all projects
    List,
    /// Show one project
    Get { id: i64 },
    /// Create a project
    Create(CreateFields),
    /// Change fields of an existing project; omitted fields keep their value
    Update {
        id: i64,
        #[command(flatten)]
        fields: UpdateFields,
    },
    /// Delete a project
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct CreateFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,
}

impl CreateFields {
    fn into_project(self) -> Project {
        Project {
            description: self.description,
            start_date: Some(self.start),
            end_date: Some(self.end),
            ..Project::new(self.name)
        }
    }
}

#[derive(Args)]
struct UpdateFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl UpdateFields {
    /// Overlay the given fields on `current`.
    fn apply_to(self, current: Project) -> Project {
        Project {
            name: self.name.unwrap_or(current.name),
            description: self.description.or(current.description),
            start_date: self.start.or(current.start_date),
            end_date: self.end.or(current.end_date),
            ..current
        }
    }
}

/// Reads y/N from stdin.
fn prompt_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_project(project: &Project) {
    let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
    println!(
        "{:>5}  {:<30}  {} .. {}  {}",
        project.id.map(|id| id.to_string()).unwrap_or_default(),
        project.name,
        date(project.start_date),
        date(project.end_date),
        project.description.as_deref().unwrap_or(""),
    );
}

/// Fail with the banner message if the last action reported an error.
fn check_banner(manager: &ProjectManager<ReqwestTransport>) -> Result<()> {
    let banner = manager.notifier().banner();
    if banner.visible {
        bail!(banner.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match cli.api_base {
        Some(api_base) => Config::new(api_base),
        None => Config::from_env(),
    };
    let api = ProjectApi::from_config(&config);

    match cli.command {
        Command::Get { id } => {
            let project = api
                .get_by_id(id)
                .await
                .with_context(|| format!("failed to fetch project {id}"))?;
            print_project(&project);
        }
        command => {
            let assume_yes = matches!(command, Command::Delete { yes: true, .. });
            let confirm = move |prompt: &str| assume_yes || prompt_on_stdin(prompt);
            let manager = ProjectManager::new(api, ErrorNotifier::new(), confirm);
            run(&manager, command).await?;
            for project in manager.projects() {
                print_project(&project);
            }
        }
    }
    Ok(())
}

async fn run(manager: &ProjectManager<ReqwestTransport>, command: Command) -> Result<()> {
    match command {
        Command::List | Command::Get { .. } => manager.load().await,
        Command::Create(fields) => {
            manager.open_create_modal();
            manager.create(fields.into_project()).await;
        }
        Command::Update { id, fields } => {
            let current = manager
                .api()
                .get_by_id(id)
                .await
                .with_context(|| format!("failed to fetch project {id}"))?;
            manager.open_edit_modal(&current);
            manager.edit(fields.apply_to(current)).await;
        }
        Command::Delete { id, .. } => {
            let target = Project {
                id: Some(id),
                ..Project::default()
            };
            manager.delete(&target).await;
        }
    }
    check_banner(manager)
}
