//! Crestline CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! crestline-cli migrate
//!
//! # Create a client record (assigns the shared default credential)
//! crestline-cli client create -c CL-10042 -n "Acme Holdings" -e ops@acme.example
//!
//! # Issue a password-setup token and print the link
//! crestline-cli client send-setup -c CL-10042
//!
//! # Create an administrator account
//! crestline-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `client create` - Create client records
//! - `client send-setup` - Issue setup tokens
//! - `admin create` - Create admin users

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "crestline-cli")]
#[command(author, version, about = "Crestline portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage client records
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ClientAction {
    /// Create a new client record
    Create {
        /// External-facing client code
        #[arg(short, long)]
        code: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address (omit to exclude the record from onboarding)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Issue a password-setup token and print the setup link
    SendSetup {
        /// External-facing client code
        #[arg(short, long)]
        code: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Client { action } => match action {
            ClientAction::Create { code, name, email } => {
                commands::clients::create(&code, &name, email.as_deref()).await?;
            }
            ClientAction::SendSetup { code } => {
                commands::clients::send_setup(&code).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
    }
    Ok(())
}
