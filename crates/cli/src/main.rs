//! Flash Pagamentos CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! fp-cli migrate
//!
//! # Import the legacy YAML credentials file
//! fp-cli seed --file config.yaml
//!
//! # Create a user
//! fp-cli user create -u carlos -n "Carlos Lima" -e carlos@example.com -r parceiro
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Import the legacy credentials file into the store
//! - `user create` - Create users (any role; the web form only creates clientes)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fp-cli")]
#[command(author, version, about = "Flash Pagamentos CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import the legacy YAML credentials file
    Seed {
        /// Path to the credentials file
        #[arg(short, long, default_value = "config.yaml")]
        file: String,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prompted for hashing, stored as argon2)
        #[arg(short, long)]
        password: String,

        /// CPF or CNPJ
        #[arg(short, long)]
        cpf_cnpj: String,

        /// Role (`admin`, `parceiro`, `cliente`)
        #[arg(short, long, default_value = "cliente")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fp_cli=info,flash_pagamentos_portal=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file } => commands::seed::run(&file).await,
        Commands::User {
            action:
                UserAction::Create {
                    username,
                    name,
                    email,
                    password,
                    cpf_cnpj,
                    role,
                },
        } => commands::user::create(&username, &name, &email, &password, &cpf_cnpj, &role).await,
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
