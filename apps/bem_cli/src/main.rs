use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ApiClient, Cursor, Destination, ListLoader, LoginController, Navigator, PushMessaging,
    SessionState, StaticPushMessaging, UnavailablePushMessaging,
};
use shared::domain::Category;
use storage::{KeyValueStore, Storage};
use tracing_subscriber::EnvFilter;

mod config;

const PUSH_REGISTRATION_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "bem", about = "Event-management client")]
struct Cli {
    /// Overrides `base_url` from bem.toml / BEM__BASE_URL.
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the category filters.
    Categories,
    /// Lists events, following pagination for up to `--pages` pages.
    Events {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Signs in with a password and stores the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Device token to register as if notifications were granted.
        #[arg(long)]
        push_token: Option<String>,
    },
    /// Shows the stored session, if any.
    Whoami,
    /// Removes the stored session.
    Logout,
}

/// Terminal stand-in for the app's navigation stack.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn reset_to(&self, route_name: &str, params: &[(&str, &str)]) {
        tracing::info!(route = route_name, ?params, "navigation stack reset");
        println!("-> {route_name}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings()?;
    if let Some(base_url) = cli.base_url {
        settings.client.base_url = base_url;
    }
    let api = ApiClient::new(&settings.client)?;

    match cli.command {
        Command::Categories => {
            for category in Category::ALL {
                println!("{:<12} {}", category.id(), category.label());
            }
        }
        Command::Events {
            query,
            category,
            pages,
        } => list_events(api, settings.client.search_debounce, query, category, pages).await?,
        Command::Login {
            username,
            password,
            push_token,
        } => {
            let store = open_store(&settings.database_url).await?;
            let push: Arc<dyn PushMessaging> = match push_token {
                Some(token) => Arc::new(StaticPushMessaging::authorized(token)),
                None => Arc::new(UnavailablePushMessaging),
            };
            let controller = LoginController::new(
                &settings.client,
                api,
                store,
                Arc::new(SessionState::new()),
                push,
                Arc::new(TerminalNavigator),
            );

            match controller.login(&username, &password).await {
                Ok(success) => {
                    if let Some(message) = controller.status_message() {
                        println!("{message}");
                    }
                    print_destination(success.destination, &success.profile.username);
                    // The process would otherwise exit before the background task runs.
                    if tokio::time::timeout(PUSH_REGISTRATION_GRACE, success.push_registration)
                        .await
                        .is_err()
                    {
                        tracing::warn!("push registration still pending at exit");
                    }
                }
                Err(_) => {
                    let message = controller.status_message().unwrap_or_default();
                    anyhow::bail!("{message}");
                }
            }
        }
        Command::Whoami => {
            let store = open_store(&settings.database_url).await?;
            let session = SessionState::new();
            match session.restore(store.as_ref()).await? {
                Some(profile) => println!(
                    "{} (id {}, role {:?}, staff {})",
                    profile.username, profile.id, profile.role, profile.is_staff
                ),
                None => println!("not logged in"),
            }
        }
        Command::Logout => {
            let store = open_store(&settings.database_url).await?;
            SessionState::new().logout(store.as_ref()).await;
            println!("logged out");
        }
    }

    Ok(())
}

async fn open_store(database_url: &str) -> Result<Arc<dyn KeyValueStore>> {
    let storage = Storage::new(database_url)
        .await
        .with_context(|| format!("failed to open session store at '{database_url}'"))?;
    storage.health_check().await?;
    Ok(Arc::new(storage))
}

async fn list_events(
    api: ApiClient,
    debounce: Duration,
    query: String,
    category: Option<Category>,
    pages: u32,
) -> Result<()> {
    let loader = ListLoader::new(api, debounce);
    loader.set_query(query).await;
    loader.set_category(category).await;
    loader.start().await;

    for _ in 1..pages {
        if loader.state().cursor == Cursor::Exhausted || !loader.load_more().await {
            break;
        }
    }

    let state = loader.state();
    if let Some(error) = &state.last_error {
        eprintln!("{error}");
    }
    let cards = loader.cards();
    if cards.is_empty() {
        println!("No events found");
    }
    for card in cards {
        println!(
            "#{:<6} {:<40} {:<10} {}",
            card.id.0, card.title, card.date, card.location
        );
    }
    if state.cursor != Cursor::Exhausted {
        println!("(more events available)");
    }
    Ok(())
}

fn print_destination(destination: Destination, username: &str) {
    let screen = match destination {
        Destination::StaffScan => "ticket scanner",
        Destination::AdminDashboard => "admin dashboard",
        Destination::EventsList => "event list",
    };
    println!("{username} signed in, opening the {screen}");
}
