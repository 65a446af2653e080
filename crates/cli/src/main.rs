//! Nijitter CLI - terminal front end for the Nijitter REST backend.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and read the timeline
//! nijitter login usagi
//! nijitter timeline --pages 3
//!
//! # Post with an image, reply, like
//! nijitter post "にんじん美味しい" --image lunch.webp
//! nijitter reply 42 "わかる"
//! nijitter like 42
//!
//! # Notifications
//! nijitter notifications watch
//! ```
//!
//! # Environment Variables
//!
//! - `NIJITTER_API_URL` - REST backend base URL
//! - `NIJITTER_IMAGE_URL` - Image host
//! - `NIJITTER_CREDENTIALS` - Credential file
//! - `NIJITTER_PASSWORD` - Password for `login` (prompted if unset)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use nijitter_core::{CarrotId, Handle, NotificationId};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "nijitter")]
#[command(author, version, about = "Nijitter in the terminal")]
struct Cli {
    /// REST backend base URL (overrides `NIJITTER_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<url::Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an email address or user id
    Login {
        email_or_id: String,
        /// Password (prompted if omitted)
        #[arg(long, env = "NIJITTER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Request a verification mail
    Signup { email: String },
    /// Complete a signup with the token from the verification mail
    Verify {
        #[arg(long)]
        token: String,
        /// Handle ([A-Za-z0-9_-])
        #[arg(long)]
        user_id: String,
        /// Display name
        #[arg(long)]
        username: String,
        /// Password (prompted twice if omitted)
        #[arg(long, env = "NIJITTER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Show the global or following timeline
    Timeline {
        /// Show carrots from followed users only
        #[arg(long)]
        following: bool,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show a carrot and its replies
    Carrot {
        id: CarrotId,
        /// Number of reply pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Post a carrot
    Post {
        content: String,
        /// Attach an image (up to 4)
        #[arg(long = "image")]
        images: Vec<std::path::PathBuf>,
    },
    /// Reply to a carrot
    Reply {
        id: CarrotId,
        content: String,
        /// Attach an image (up to 4)
        #[arg(long = "image")]
        images: Vec<std::path::PathBuf>,
    },
    /// Delete one of your carrots
    Delete { id: CarrotId },
    /// Like a carrot
    Like { id: CarrotId },
    /// Remove a like
    Unlike { id: CarrotId },
    /// Print the share link of a carrot
    Share { id: CarrotId },
    /// Follow a user
    Follow { handle: Handle },
    /// Unfollow a user
    Unfollow { handle: Handle },
    /// Show a profile and its carrots
    User {
        handle: Handle,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show your own profile
    Me,
    /// Edit your profile
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// New icon image
        #[arg(long)]
        icon: Option<std::path::PathBuf>,
    },
    /// Delete your account
    DeleteAccount {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Search users and carrots
    Search {
        /// Query; omit to read queries from stdin as you type them
        query: Option<String>,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// List recent notifications
    List,
    /// Open a notification (marks it read)
    Open { id: NotificationId },
    /// Print the unread count
    Unread,
    /// Print the unread count whenever it changes
    Watch,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nijitter=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        render::status(&format!("error: {e}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::new(cli.api_url)?;

    match cli.command {
        Commands::Login {
            email_or_id,
            password,
        } => commands::auth::login(&ctx, &email_or_id, password).await?,
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Signup { email } => commands::auth::signup(&ctx, &email).await?,
        Commands::Verify {
            token,
            user_id,
            username,
            password,
        } => commands::auth::verify(&ctx, &token, &user_id, &username, password).await?,
        Commands::Timeline { following, pages } => {
            commands::feed::timeline(&ctx, following, pages).await?;
        }
        Commands::Carrot { id, pages } => commands::feed::carrot(&ctx, id, pages).await?,
        Commands::User { handle, pages } => commands::feed::user(&ctx, handle, pages).await?,
        Commands::Post { content, images } => {
            commands::carrot::post(&ctx, None, &content, images).await?;
        }
        Commands::Reply {
            id,
            content,
            images,
        } => commands::carrot::post(&ctx, Some(id), &content, images).await?,
        Commands::Delete { id } => commands::carrot::delete(&ctx, id).await?,
        Commands::Like { id } => commands::carrot::set_like(&ctx, id, true).await?,
        Commands::Unlike { id } => commands::carrot::set_like(&ctx, id, false).await?,
        Commands::Share { id } => commands::carrot::share(&ctx, id).await?,
        Commands::Follow { handle } => commands::users::follow(&ctx, &handle, true).await?,
        Commands::Unfollow { handle } => commands::users::follow(&ctx, &handle, false).await?,
        Commands::Me => commands::users::me(&ctx).await?,
        Commands::Profile {
            username,
            bio,
            status,
            icon,
        } => commands::users::edit_profile(&ctx, username, bio, status, icon).await?,
        Commands::DeleteAccount { yes } => commands::users::delete_account(&ctx, yes).await?,
        Commands::Notifications { action } => match action {
            NotificationAction::List => commands::notifications::list(&ctx).await?,
            NotificationAction::Open { id } => commands::notifications::open(&ctx, id).await?,
            NotificationAction::Unread => commands::notifications::unread(&ctx).await?,
            NotificationAction::Watch => commands::notifications::watch(&ctx).await?,
        },
        Commands::Search { query } => match query {
            Some(query) => commands::search::once(&ctx, &query).await?,
            None => commands::search::interactive(&ctx).await?,
        },
    }
    Ok(())
}
