//! notebox command-line client
//!
//! Talks to a notebox server over HTTP and keeps the session token in
//! `<config dir>/notebox/config.json`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notebox::cli::{CliConfig, Client, format_note, search_notes};
use notebox::models::NoteChanges;
use notebox::routes::auth::model::SignupRequest;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notebox")]
#[command(author, version, about = "Personal notes from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the notebox server
    #[arg(global = true, long, env = "NOTEBOX_SERVER", default_value = "http://localhost:8080")]
    server: String,

    /// Path to the client config file
    #[arg(global = true, long, env = "NOTEBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        username: String,
        #[arg(long, env = "NOTEBOX_PASSWORD")]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },

    /// Log in and store the session token
    Login {
        username: String,
        #[arg(long, env = "NOTEBOX_PASSWORD")]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Renew the session token during its last minute
    Refresh,

    /// Show the logged-in account
    Whoami,

    /// Add a note
    Add {
        content: String,
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List all notes, or show one by id
    List { id: Option<i64> },

    /// Find notes whose title or content contains the query
    Search { query: String },

    /// Edit a note
    Update {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(long)]
        archived: Option<bool>,
    },

    /// Delete a note
    Remove { id: i64 },

    /// Delete every note of the logged-in account
    Purge {
        #[arg(long, env = "NOTEBOX_PASSWORD")]
        password: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = match cli.config {
        Some(path) => path,
        None => CliConfig::default_path()?,
    };
    let mut config = CliConfig::load(&config_path)?;

    let mut client = Client::new(&cli.server);
    if let Some(token) = config.credential() {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Signup {
            username,
            password,
            email,
        } => {
            let user = client
                .signup(&SignupRequest {
                    username,
                    password,
                    email,
                    ..SignupRequest::default()
                })
                .await?;
            println!("Created user {} ({})", user.username, user.role);
        }
        Commands::Login { username, password } => {
            let token = client.login(&username, &password).await?;
            config.username = username.trim().to_lowercase();
            config.token = token;
            config.save(&config_path)?;
            println!("Logged in as {}", config.username);
        }
        Commands::Logout => {
            if let Err(e) = client.logout().await {
                tracing::warn!("Server logout failed: {}", e);
            }
            config.clear_session();
            config.save(&config_path)?;
            println!("Logged out");
        }
        Commands::Refresh => {
            let token = client.refresh().await?;
            config.replace_credential(token);
            config.save(&config_path)?;
            println!("Token refreshed");
        }
        Commands::Whoami => {
            let user = client.whoami().await?;
            println!("{} <{}> {}", user.username, user.email.unwrap_or_default(), user.role);
        }
        Commands::Add { content, title } => {
            let note = client.create_note(title, &content).await?;
            println!("Added note:\n{}", format_note(&note));
        }
        Commands::List { id: Some(id) } => {
            println!("{}", format_note(&client.get_note(id).await?));
        }
        Commands::List { id: None } => {
            let notes = client.list_notes().await?;
            if notes.is_empty() {
                println!("No notes yet");
            }
            for note in &notes {
                println!("{}\n", format_note(note));
            }
        }
        Commands::Search { query } => {
            let notes = client.list_notes().await?;
            let found = search_notes(&notes, &query);
            println!("{} notes found:", found.len());
            for note in found {
                println!("{}\n", format_note(note));
            }
        }
        Commands::Update {
            id,
            title,
            content,
            archived,
        } => {
            let note = client
                .update_note(
                    id,
                    &NoteChanges {
                        title,
                        content,
                        archived,
                    },
                )
                .await?;
            println!("Updated note:\n{}", format_note(&note));
        }
        Commands::Remove { id } => {
            let note = client.delete_note(id).await?;
            println!("Removed note #{}", note.id);
        }
        Commands::Purge { password } => {
            let deleted = client.delete_all_notes(&password).await?;
            println!("Deleted {deleted} notes");
        }
        Commands::Version => {
            println!("notebox {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
