//! Shopkart CLI - migrations, user management and a terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! shopkart migrate
//!
//! # Create an administrator
//! shopkart user create -e admin@example.com -n "Admin Name" -r admin
//!
//! # Promote or demote an existing user
//! shopkart user set-role -e ada@example.com -r customer
//!
//! # Log in against a running server and keep the session on disk
//! shopkart login -e ada@example.com
//!
//! # Toggle a product on the wishlist
//! shopkart wishlist toggle 65f1c0ffee0ddba11a5e0042
//!
//! # Forget the stored session
//! shopkart logout
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` / `user set-role` - Manage users directly in the database
//! - `login` / `logout` / `whoami` - Client session
//! - `wishlist list` / `wishlist toggle` - Wishlist through the REST API

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use shopkart_core::{ProductId, Role};

mod commands;

#[derive(Parser)]
#[command(name = "shopkart")]
#[command(author, version, about = "Shopkart CLI tools")]
struct Cli {
    /// Base URL of the Shopkart server
    #[arg(
        long,
        global = true,
        env = "SHOPKART_SERVER_URL",
        default_value = "http://localhost:5000"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users in the database
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Log in and store the session token locally
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "SHOPKART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Discard the stored session token
    Logout,
    /// Show the stored session
    Whoami,
    /// Read or change the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address (login identifier)
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long, env = "SHOPKART_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Role (`customer`, `admin`)
        #[arg(short, long, default_value = "customer")]
        role: Role,
    },
    /// Change the role of an existing user
    SetRole {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// New role (`customer`, `admin`)
        #[arg(short, long)]
        role: Role,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List the products on the wishlist
    List,
    /// Add the product if absent, remove it if present
    Toggle {
        /// Catalog product ID
        product: ProductId,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopkart=info,shopkart_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
                role,
            } => {
                commands::user::create_user(&email, &name, &password, role).await?;
            }
            UserAction::SetRole { email, role } => {
                commands::user::set_role(&email, role).await?;
            }
        },
        Commands::Login { email, password } => {
            commands::session::login(&cli.server, &email, &password).await?;
        }
        Commands::Logout => commands::session::logout().await?,
        Commands::Whoami => commands::session::whoami().await?,
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::session::list_wishlist(&cli.server).await?,
            WishlistAction::Toggle { product } => {
                commands::session::toggle_wishlist(&cli.server, &product).await?;
            }
        },
    }
    Ok(())
}
