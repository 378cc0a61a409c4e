//! Timeless Strokes CLI - Account bootstrap and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin account (provider account + profile document)
//! ts-cli admin create -e owner@timelessstrokes.com -p <password> -n "Shop Owner" -r admin
//!
//! # Promote an existing profile to admin, acting as a signed-in admin
//! ts-cli admin promote --uid <uid> --as-email owner@timelessstrokes.com --as-password <password>
//! ```
//!
//! Both commands read the six `FIREBASE_*` identifiers from the environment
//! (a `.env` file is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(author, version, about = "Timeless Strokes CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an account and its profile document
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password for the new account
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `user`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    /// Promote (or demote) an existing profile's role
    Promote {
        /// The profile's uid
        #[arg(long)]
        uid: String,

        /// New role (`admin`, `user`)
        #[arg(long, default_value = "admin")]
        role: String,

        /// Email of the admin performing the change
        #[arg(long)]
        as_email: String,

        /// Password of the admin performing the change
        #[arg(long)]
        as_password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                name,
                role,
            } => commands::admin::create(&email, &password, &name, &role).await?,
            AdminAction::Promote {
                uid,
                role,
                as_email,
                as_password,
            } => commands::admin::promote(&uid, &role, &as_email, &as_password).await?,
        },
    }
    Ok(())
}
