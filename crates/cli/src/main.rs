//! Mailcove CLI - session management against a Mailcove backend.
//!
//! # Usage
//!
//! ```bash
//! # Log in and persist the session
//! mc-cli login -u ada -p secret
//!
//! # Show the restored session
//! mc-cli whoami
//!
//! # Register a new account (log in afterwards)
//! mc-cli register -u ada -e ada@example.com -p secret
//!
//! # Tear the session down
//! mc-cli logout
//! ```
//!
//! # Environment Variables
//!
//! - `MAILCOVE_API_BASE_URL` - Base URL of the backend API (required)
//! - `MAILCOVE_SESSION_FILE` - Session file path (default: mailcove-session.json)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mc-cli")]
#[command(author, version, about = "Mailcove session management")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Use the administrator login endpoint
        #[arg(long)]
        admin: bool,
    },
    /// Restore the persisted session and show the authenticated identity
    Whoami,
    /// Register a new account (does not log in)
    Register {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Preferred display name
        #[arg(short, long)]
        nickname: Option<String>,
    },
    /// Notify the backend and clear the persisted session
    Logout,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login {
            username,
            password,
            admin,
        } => commands::auth::login(username, password, admin).await?,
        Commands::Whoami => commands::auth::whoami().await?,
        Commands::Register {
            username,
            email,
            password,
            nickname,
        } => commands::auth::register(username, email, password, nickname).await?,
        Commands::Logout => commands::auth::logout().await?,
    }
    Ok(())
}
