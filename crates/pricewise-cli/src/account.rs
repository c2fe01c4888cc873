//! Login, favorites and price alert command handlers.
//!
//! Everything except `login` and `register` needs a stored token; without one
//! the client refuses before sending anything.

use clap::Subcommand;
use pricewise_api::{Credentials, EntityKind, NewAlert, Registration, User};
use rust_decimal::Decimal;

use crate::session::Session;

/// Sub-commands available under `favorites`.
#[derive(Debug, Subcommand)]
pub enum FavoriteCommands {
    /// List favorite products and supermarkets
    List,
    /// Add a favorite
    Add {
        /// `product` or `supermarket`
        #[arg(value_parser = crate::parse_entity_kind)]
        kind: EntityKind,
        id: String,
    },
    /// Remove a favorite
    Remove {
        /// `product` or `supermarket`
        #[arg(value_parser = crate::parse_entity_kind)]
        kind: EntityKind,
        id: String,
    },
}

/// Sub-commands available under `alerts`.
#[derive(Debug, Subcommand)]
pub enum AlertCommands {
    /// List active price alerts
    List,
    /// Get notified when a product drops to a target price
    Create {
        product_id: String,
        target_price: Decimal,
    },
    /// Deactivate an alert
    Delete { id: String },
}

fn greet(user: &User) {
    println!("logged in as {} <{}>", user.name, user.email);
}

/// # Errors
///
/// Returns an error if the credentials are rejected or the backend is
/// unreachable.
pub(crate) async fn run_login(
    session: &Session,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let user = session
        .auth
        .login(&session.client, &Credentials { email, password })
        .await?;
    greet(&user);
    Ok(())
}

/// Registers with the selected city, if any, as the home city.
///
/// # Errors
///
/// Returns an error if the backend rejects the registration.
pub(crate) async fn run_register(
    session: &Session,
    email: String,
    password: String,
    name: String,
    phone: Option<String>,
) -> anyhow::Result<()> {
    let registration = Registration {
        email,
        password,
        name,
        phone,
        city_id: session.selection.get().map(|c| c.id),
    };
    let user = session.auth.register(&session.client, &registration).await?;
    greet(&user);
    Ok(())
}

/// # Errors
///
/// Returns an error if not logged in or the token is no longer valid.
pub(crate) async fn run_me(session: &Session) -> anyhow::Result<()> {
    let user = session.client.me().await?;
    println!("{} <{}>", user.name, user.email);
    if let Some(phone) = &user.phone {
        println!("Phone: {phone}");
    }
    if let Some(city_id) = &user.city_id {
        println!("Home city: {city_id}");
    }
    println!("Reputation: {}", user.reputation_score);
    println!(
        "Favorites: {} products, {} supermarkets",
        user.favorites.products.len(),
        user.favorites.supermarkets.len()
    );
    Ok(())
}

pub(crate) fn run_logout(session: &Session) {
    session.auth.logout(&session.client);
    println!("logged out");
}

/// # Errors
///
/// Returns an error if not logged in or the request fails.
pub(crate) async fn run_favorites_list(session: &Session) -> anyhow::Result<()> {
    let favorites = session.client.favorites().await?;
    if favorites.products.is_empty() && favorites.supermarkets.is_empty() {
        println!("no favorites yet");
        return Ok(());
    }

    if !favorites.products.is_empty() {
        println!("{:<26}{:<40}PRICE", "PRODUCT", "NAME");
        for fav in &favorites.products {
            let price = fav
                .current_price
                .map_or_else(|| "-".to_string(), |p| format!("R$ {p:.2}"));
            println!("{:<26}{:<40}{}", fav.product.id, fav.product.display_name, price);
        }
    }
    if !favorites.supermarkets.is_empty() {
        if !favorites.products.is_empty() {
            println!();
        }
        println!("{:<26}NAME", "SUPERMARKET");
        for market in &favorites.supermarkets {
            println!("{:<26}{}", market.id, market.name);
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if not logged in or the backend rejects the request.
pub(crate) async fn run_favorite_add(
    session: &Session,
    kind: EntityKind,
    id: &str,
) -> anyhow::Result<()> {
    let ack = session.client.add_favorite(kind, id).await?;
    println!("{}", ack_text(&ack.message, &format!("added {kind} {id}")));
    Ok(())
}

/// # Errors
///
/// Returns an error if not logged in or the request fails.
pub(crate) async fn run_favorite_remove(
    session: &Session,
    kind: EntityKind,
    id: &str,
) -> anyhow::Result<()> {
    let ack = session.client.remove_favorite(kind, id).await?;
    println!("{}", ack_text(&ack.message, &format!("removed {kind} {id}")));
    Ok(())
}

/// # Errors
///
/// Returns an error if not logged in or the request fails.
pub(crate) async fn run_alerts_list(session: &Session) -> anyhow::Result<()> {
    let alerts = session.client.alerts().await?;
    if alerts.is_empty() {
        println!("no active alerts");
        return Ok(());
    }

    println!("{:<26}{:<40}{:<14}CREATED", "ID", "PRODUCT", "TARGET");
    for alert in &alerts {
        let product = alert
            .product
            .as_ref()
            .map_or(alert.product_id.as_str(), |p| p.display_name.as_str());
        let target = format!("R$ {:.2}", alert.target_price);
        println!(
            "{:<26}{:<40}{:<14}{}",
            alert.id,
            product,
            target,
            alert.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

/// Scopes the alert to the selected city when there is one.
///
/// # Errors
///
/// Returns an error if the target price is not positive, not logged in, or
/// the backend rejects the alert.
pub(crate) async fn run_alert_create(
    session: &Session,
    product_id: String,
    target_price: Decimal,
) -> anyhow::Result<()> {
    if target_price <= Decimal::ZERO {
        anyhow::bail!("target price must be greater than zero");
    }

    let alert = session
        .client
        .create_alert(&NewAlert {
            product_id,
            target_price,
            city_id: session.selection.get().map(|c| c.id),
        })
        .await?;
    println!(
        "alert {} created: R$ {:.2} for {}",
        alert.id, alert.target_price, alert.product_id
    );
    Ok(())
}

/// # Errors
///
/// Returns an error if not logged in or the alert does not exist.
pub(crate) async fn run_alert_delete(session: &Session, id: &str) -> anyhow::Result<()> {
    let ack = session.client.delete_alert(id).await?;
    println!("{}", ack_text(&ack.message, &format!("alert {id} deleted")));
    Ok(())
}

/// Backend acknowledgement, or `fallback` when it sent none.
fn ack_text<'a>(message: &'a str, fallback: &'a str) -> &'a str {
    if message.trim().is_empty() {
        fallback
    } else {
        message
    }
}
