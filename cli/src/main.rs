#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cura_client::config::ConfigError;
use cura_client::net::types::{Conciseness, FeedbackRequest, Role, Stance, Tone};
use cura_client::routes::History;
use cura_client::session::FileStorage;
use cura_client::upload::UploadFile;
use cura_client::{ApiError, AuthError, ClientConfig, CuraClient, GuardOutcome, Route};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}", .0.display_message())]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not allowed here; redirected to {0}")]
    Redirected(String),
}

#[derive(Parser, Debug)]
#[command(name = "cura", about = "Cura feedback API CLI")]
struct Cli {
    #[arg(long, env = "CURA_API_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CURA_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CURA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CURA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        role: Role,
        #[arg(long)]
        name: String,
    },
    Logout,
    Whoami,
    /// Run the route guard for a page path and print where it lands.
    Open {
        path: String,
    },
    Student(StudentCommand),
    Values(ValuesCommand),
    Teacher(TeacherCommand),
}

#[derive(Args, Debug)]
struct StudentCommand {
    #[command(subcommand)]
    command: StudentSubcommand,
}

#[derive(Subcommand, Debug)]
enum StudentSubcommand {
    Submissions,
    Feedback,
    SubmissionFeedback {
        submission_id: String,
    },
    FollowUp {
        submission_id: String,
        #[arg(long)]
        question: String,
    },
    Upload {
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ValuesCommand {
    #[command(subcommand)]
    command: ValuesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ValuesSubcommand {
    Next {
        /// Fetch a statement even if this week's exercise is done.
        #[arg(long)]
        force: bool,
    },
    Respond {
        statement_id: String,
        #[arg(long)]
        stance: Stance,
        #[arg(long)]
        response: String,
    },
}

#[derive(Args, Debug)]
struct TeacherCommand {
    #[command(subcommand)]
    command: TeacherSubcommand,
}

#[derive(Subcommand, Debug)]
enum TeacherSubcommand {
    Submissions,
    Document {
        document_id: String,
    },
    Generate {
        submission_id: String,
        #[arg(long)]
        notes: String,
        #[arg(long, default_value_t = Conciseness::Detailed)]
        conciseness: Conciseness,
        #[arg(long, default_value_t = Tone::Affirming)]
        tone: Tone,
        #[arg(long)]
        grade: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(session_file) = cli.session_file {
        config = config.with_session_file(session_file);
    }

    tracing::debug!(base_url = %config.base_url, session_file = %config.session_file.display(), "configuration resolved");

    let storage = Arc::new(FileStorage::new(config.session_file.clone()));
    let history = Arc::new(History::new());
    let client = CuraClient::from_config(&config, storage, history)?;

    match cli.command {
        Command::Login { email, password } => {
            let session = client.login(&email, &password).await?;
            print_json(&session.user)
        }
        Command::Signup { email, password, role, name } => {
            let session = client.signup(&email, &password, role, &name).await?;
            print_json(&session.user)
        }
        Command::Logout => {
            client.logout().await;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => match client.session().user() {
            Some(user) => print_json(&user),
            None => {
                println!("not signed in");
                Ok(())
            }
        },
        Command::Open { path } => {
            match client.visit(&Route::parse(&path)) {
                GuardOutcome::Render(route) => println!("render {}", route.path()),
                GuardOutcome::Redirect(route) => println!("redirect {}", route.path()),
            }
            Ok(())
        }
        Command::Student(student) => run_student(&client, student).await,
        Command::Values(cmd) => run_values(&client, cmd).await,
        Command::Teacher(teacher) => run_teacher(&client, teacher).await,
    }
}

async fn run_student(client: &CuraClient, student: StudentCommand) -> Result<(), CliError> {
    match student.command {
        StudentSubcommand::Submissions => {
            require(client, &Route::StudentDashboard)?;
            print_json(&client.api().my_submissions().await?)
        }
        StudentSubcommand::Feedback => {
            require(client, &Route::StudentDashboard)?;
            print_json(&client.api().my_feedback().await?)
        }
        StudentSubcommand::SubmissionFeedback { submission_id } => {
            require(client, &Route::StudentFeedback { submission_id: submission_id.clone() })?;
            print_json(&client.api().feedback_for_submission(&submission_id).await?)
        }
        StudentSubcommand::FollowUp { submission_id, question } => {
            require(client, &Route::StudentFeedback { submission_id: submission_id.clone() })?;
            let answer = client.api().follow_up(&submission_id, &question).await?;
            println!("{answer}");
            Ok(())
        }
        StudentSubcommand::Upload { file } => {
            require(client, &Route::Upload)?;
            let file = UploadFile::from_path(&file)?;
            print_json(&client.upload(Some(&file)).await?)
        }
    }
}

async fn run_values(client: &CuraClient, cmd: ValuesCommand) -> Result<(), CliError> {
    require(client, &Route::StudentDashboard)?;
    match cmd.command {
        ValuesSubcommand::Next { force } => match client.next_value_statement(force).await? {
            Some(statement) => print_json(&statement),
            None => {
                println!("value exercise already completed this week");
                Ok(())
            }
        },
        ValuesSubcommand::Respond { statement_id, stance, response } => {
            print_json(&client.submit_value_response(&statement_id, stance, &response).await?)
        }
    }
}

async fn run_teacher(client: &CuraClient, teacher: TeacherCommand) -> Result<(), CliError> {
    match teacher.command {
        TeacherSubcommand::Submissions => {
            require(client, &Route::TeacherSubmissions)?;
            print_json(&client.api().all_submissions().await?)
        }
        TeacherSubcommand::Document { document_id } => {
            require(client, &Route::GenerateFeedback { submission_id: document_id.clone() })?;
            print_json(&client.api().document(&document_id).await?)
        }
        TeacherSubcommand::Generate { submission_id, notes, conciseness, tone, grade } => {
            require(client, &Route::GenerateFeedback { submission_id: submission_id.clone() })?;
            let mut request = FeedbackRequest::new(submission_id, notes);
            request.conciseness = conciseness;
            request.tone = tone;
            request.grade = grade;
            print_json(&client.api().generate_feedback(&request).await?)
        }
    }
}

/// Refuse a command whose page the current session may not open.
fn require(client: &CuraClient, route: &Route) -> Result<(), CliError> {
    match client.visit(route) {
        GuardOutcome::Render(_) => Ok(()),
        GuardOutcome::Redirect(target) => Err(CliError::Redirected(target.path())),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
