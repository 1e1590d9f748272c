//! Loyalty CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! loyalty-cli migrate
//!
//! # Generate unused ids
//! loyalty-cli ids business --count 3
//! loyalty-cli ids class --business BIZ0420
//!
//! # Create a business
//! loyalty-cli business create -n "Cafe Uno" -l Beans
//!
//! # Promote a user
//! loyalty-cli user set-role -u alice -r admin
//!
//! # Seed users and businesses
//! loyalty-cli seed fixtures/dev.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `ids` - Generate unused business, customer, or class ids
//! - `business create` - Create a business
//! - `user set-role` - Change a user's role
//! - `seed` - Seed database from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::ids::IdKind;

#[derive(Parser)]
#[command(name = "loyalty-cli")]
#[command(author, version, about = "Loyalty platform CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Generate unused ids
    Ids {
        /// Id kind
        #[arg(value_enum)]
        kind: IdKind,

        /// Business scope for class ids (`BIZ####`)
        #[arg(short, long)]
        business: Option<String>,

        /// Number of ids to generate
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Skip the uniqueness check against the database
        #[arg(long)]
        offline: bool,
    },
    /// Manage businesses
    Business {
        #[command(subcommand)]
        action: BusinessAction,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed database from a YAML file
    Seed {
        /// Path to the seed file
        file: String,
    },
}

#[derive(Subcommand)]
enum BusinessAction {
    /// Create a new business
    Create {
        /// Business name
        #[arg(short, long)]
        name: String,

        /// Display name for the business's points
        #[arg(short = 'l', long, default_value = "Points")]
        points_label: String,

        /// Owner uid
        #[arg(short, long)]
        owner: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Set a user's role
    SetRole {
        /// User uid
        #[arg(short, long)]
        uid: String,

        /// Role (`customer`, `business`, `admin`)
        #[arg(short, long)]
        role: String,
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
        Commands::Ids {
            kind,
            business,
            count,
            offline,
        } => commands::ids::generate(kind, business.as_deref(), count, offline).await?,
        Commands::Business { action } => match action {
            BusinessAction::Create {
                name,
                points_label,
                owner,
            } => commands::business::create(&name, &points_label, owner.as_deref()).await?,
        },
        Commands::User { action } => match action {
            UserAction::SetRole { uid, role } => {
                commands::user::set_role(&uid, &role).await?;
            }
        },
        Commands::Seed { file } => commands::seed::run(&file).await?,
    }
    Ok(())
}
