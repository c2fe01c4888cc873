mod account;
mod catalog;
mod city;
mod session;

use clap::{Parser, Subcommand};
use pricewise_api::{ApiError, EntityKind};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::account::{AlertCommands, FavoriteCommands};
use crate::city::CityCommands;
use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "pricewise")]
#[command(about = "Compare supermarket prices in your city")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Choose the city searches and prices are scoped to
    City {
        #[command(subcommand)]
        command: CityCommands,
    },
    /// Suggest products in the selected city
    Search {
        /// Query text. Several values are replayed as successive keystrokes
        /// and only the latest one's suggestions are shown.
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show ranked offers and price history for a product
    Product {
        id: String,
        /// History window in days (defaults to PRICEWISE_HISTORY_DAYS)
        #[arg(long)]
        days: Option<u32>,
    },
    /// List supermarkets in the selected city
    Supermarkets {
        /// List supermarkets in every city
        #[arg(long)]
        all: bool,
    },
    /// Show one supermarket's details
    Supermarket { id: String },
    /// Report a price seen in store
    Report {
        product_id: String,
        supermarket_id: String,
        price: Decimal,
        #[arg(long)]
        promotion: bool,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PRICEWISE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PRICEWISE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the logged-in user
    Me,
    /// Forget the stored login
    Logout,
    /// Manage favorite products and supermarkets
    Favorites {
        #[command(subcommand)]
        command: FavoriteCommands,
    },
    /// Manage price alerts
    Alerts {
        #[command(subcommand)]
        command: AlertCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pricewise: run with --help to see available commands");
        return Ok(());
    };

    let config = pricewise_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(config = ?config, "configuration loaded");

    let session = Session::open(config)?;
    let result = dispatch(&session, command).await;
    session.close().await;

    if let Err(err) = result {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            tracing::debug!(error = %api, "request failed");
            anyhow::bail!(api.user_message());
        }
        return Err(err);
    }
    Ok(())
}

async fn dispatch(session: &Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::City { command } => match command {
            CityCommands::List { search } => city::run_city_list(session, search.as_deref()).await,
            CityCommands::Set { id } => city::run_city_set(session, &id).await,
            CityCommands::Show => {
                city::run_city_show(session);
                Ok(())
            }
        },
        Commands::Search { text } => catalog::run_search(session, &text).await,
        Commands::Product { id, days } => catalog::run_product(session, &id, days).await,
        Commands::Supermarkets { all } => catalog::run_supermarkets(session, all).await,
        Commands::Supermarket { id } => catalog::run_supermarket(session, &id).await,
        Commands::Report {
            product_id,
            supermarket_id,
            price,
            promotion,
            photo_url,
        } => {
            catalog::run_report(
                session,
                catalog::PriceReport {
                    product_id,
                    supermarket_id,
                    price,
                    is_promotion: promotion,
                    photo_url,
                },
            )
            .await
        }
        Commands::Login { email, password } => {
            account::run_login(session, email, password).await
        }
        Commands::Register {
            email,
            password,
            name,
            phone,
        } => account::run_register(session, email, password, name, phone).await,
        Commands::Me => account::run_me(session).await,
        Commands::Logout => {
            account::run_logout(session);
            Ok(())
        }
        Commands::Favorites { command } => match command {
            FavoriteCommands::List => account::run_favorites_list(session).await,
            FavoriteCommands::Add { kind, id } => {
                account::run_favorite_add(session, kind, &id).await
            }
            FavoriteCommands::Remove { kind, id } => {
                account::run_favorite_remove(session, kind, &id).await
            }
        },
        Commands::Alerts { command } => match command {
            AlertCommands::List => account::run_alerts_list(session).await,
            AlertCommands::Create {
                product_id,
                target_price,
            } => account::run_alert_create(session, product_id, target_price).await,
            AlertCommands::Delete { id } => account::run_alert_delete(session, &id).await,
        },
    }
}

/// Parses the `product` / `supermarket` argument of favorite commands.
fn parse_entity_kind(raw: &str) -> Result<EntityKind, String> {
    raw.parse()
}
