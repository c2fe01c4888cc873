//! Search, product and supermarket command handlers.

use chrono::Local;
use futures::future::join_all;
use pricewise_api::NewOffer;
use pricewise_core::{Offer, PriceTable, SuggestionItem};
use rust_decimal::Decimal;

use crate::session::Session;

/// Placeholder for a missing cell or value.
const GAP: &str = "-";

fn fmt_price(price: Decimal) -> String {
    format!("R$ {price:.2}")
}

fn fmt_age(hours_ago: Option<u32>) -> String {
    match hours_ago {
        Some(0) => "now".to_string(),
        Some(h) if h < 24 => format!("{h}h ago"),
        Some(h) => format!("{}d ago", h / 24),
        None => GAP.to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width.saturating_sub(3)).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Runs each text through the suggestion engine as if typed in order, then
/// prints whatever the engine ended up showing.
///
/// All lookups are started before any completes, so a slow response for an
/// earlier prefix cannot replace the suggestions for the final text.
///
/// # Errors
///
/// Returns an error if no city is selected.
pub(crate) async fn run_search(session: &Session, texts: &[String]) -> anyhow::Result<()> {
    let city = session.require_city()?;
    let engine = session.suggestion_engine();

    join_all(texts.iter().map(|text| engine.query(text, Some(&city)))).await;

    let items = engine.suggestions();
    if items.is_empty() {
        let last = texts.last().map_or("", String::as_str);
        if last.chars().count() < session.config.suggest_min_chars {
            println!(
                "type at least {} characters to see suggestions",
                session.config.suggest_min_chars
            );
        } else {
            println!("no suggestions for \"{last}\" in {city}");
        }
        return Ok(());
    }

    print_suggestions(&items);
    Ok(())
}

fn print_suggestions(items: &[SuggestionItem]) {
    println!(
        "{:<26}{:<40}{:<14}{:<14}STORE",
        "ID", "PRODUCT", "SIZE", "BEST PRICE"
    );
    for item in items {
        let (price, store) = match &item.best_offer {
            Some(best) => (fmt_price(best.price), best.supermarket.name.clone()),
            None => (GAP.to_string(), GAP.to_string()),
        };
        println!(
            "{:<26}{:<40}{:<14}{:<14}{}",
            item.product.id,
            truncate(&item.product.display_name, 38),
            item.product.size,
            price,
            store
        );
    }
}

/// Shows the product page: ranked offers and the pivoted price history.
///
/// # Errors
///
/// Returns an error if no city is selected or the product cannot be loaded.
pub(crate) async fn run_product(
    session: &Session,
    product_id: &str,
    days: Option<u32>,
) -> anyhow::Result<()> {
    let city = session.require_city()?;
    let loader = session.product_loader(days);
    let view = loader
        .load(product_id, Some(&city))
        .await
        .ok_or_else(|| anyhow::anyhow!("product '{product_id}' could not be loaded in {city}"))?;

    let product = &view.product;
    println!("{} ({}, {})", product.display_name, product.brand, product.size);
    println!("Category: {}", product.category);
    println!("City: {}", view.city);
    println!();

    match view.best_offer() {
        Some(best) => println!(
            "Best price: {} at {} ({})",
            fmt_price(best.price),
            store_name(best),
            fmt_age(best.hours_ago)
        ),
        None => println!("No offers in {} yet", view.city),
    }

    if !view.offers.is_empty() {
        println!();
        print_offers(&view.offers);
    }

    println!();
    print_history(&view.history);
    Ok(())
}

fn store_name(offer: &Offer) -> &str {
    offer
        .supermarket
        .as_ref()
        .map_or(offer.supermarket_id.as_str(), |s| s.name.as_str())
}

fn print_offers(offers: &[Offer]) {
    println!("{:<28}{:<14}{:<10}{:<12}STOCK", "STORE", "PRICE", "PROMO", "SEEN");
    for offer in offers {
        println!(
            "{:<28}{:<14}{:<10}{:<12}{}",
            truncate(store_name(offer), 26),
            fmt_price(offer.price),
            if offer.is_promotion { "yes" } else { "" },
            fmt_age(offer.hours_ago),
            offer.stock_status
        );
    }
}

fn print_history(table: &PriceTable) {
    if table.is_empty() {
        println!("No price history for this period");
        return;
    }

    print!("{:<8}", "DAY");
    for column in &table.columns {
        print!("{:<16}", truncate(column, 14));
    }
    println!();
    for row in &table.rows {
        print!("{:<8}", row.label());
        for column in &table.columns {
            let cell = row.price(column).map_or_else(|| GAP.to_string(), fmt_price);
            print!("{cell:<16}");
        }
        println!();
    }
}

/// # Errors
///
/// Returns an error if `all` is false and no city is selected, or the list
/// cannot be fetched.
pub(crate) async fn run_supermarkets(session: &Session, all: bool) -> anyhow::Result<()> {
    let city = if all {
        None
    } else {
        Some(session.require_city()?)
    };
    let supermarkets = session
        .client
        .list_supermarkets(city.as_ref().map(|c| c.id.as_str()))
        .await?;

    if supermarkets.is_empty() {
        println!("no supermarkets found");
        return Ok(());
    }

    println!("{:<26}{:<30}{:<20}ADDRESS", "ID", "NAME", "CHAIN");
    for market in &supermarkets {
        let address = market.address.as_ref().map_or_else(
            || GAP.to_string(),
            |a| format!("{}, {}", a.street, a.neighborhood),
        );
        println!(
            "{:<26}{:<30}{:<20}{}",
            market.id,
            truncate(&market.name, 28),
            market.chain.as_deref().unwrap_or(GAP),
            address
        );
    }
    Ok(())
}

pub(crate) async fn run_supermarket(session: &Session, id: &str) -> anyhow::Result<()> {
    let market = session.client.get_supermarket(id).await?;

    println!("{} ({})", market.name, market.id);
    println!("chain:   {}", market.chain.as_deref().unwrap_or(GAP));
    match &market.address {
        Some(a) => println!(
            "address: {}, {}, {} - {} {}",
            a.street, a.neighborhood, a.city, a.state, a.zip_code
        ),
        None => println!("address: {GAP}"),
    }
    let rating = market.rating.map_or_else(|| GAP.to_string(), |r| format!("{r:.1}"));
    println!("rating:  {rating}");
    Ok(())
}

/// Arguments of `pricewise report`.
#[derive(Debug)]
pub(crate) struct PriceReport {
    pub(crate) product_id: String,
    pub(crate) supermarket_id: String,
    pub(crate) price: Decimal,
    pub(crate) is_promotion: bool,
    pub(crate) photo_url: Option<String>,
}

/// # Errors
///
/// Returns an error if the price is not positive, the user is not logged in,
/// or the backend rejects the report.
pub(crate) async fn run_report(session: &Session, report: PriceReport) -> anyhow::Result<()> {
    if report.price <= Decimal::ZERO {
        anyhow::bail!("price must be greater than zero");
    }

    let offer = session
        .client
        .submit_offer(&NewOffer {
            product_id: report.product_id,
            supermarket_id: report.supermarket_id,
            price: report.price,
            photo_url: report.photo_url,
            is_promotion: report.is_promotion,
        })
        .await?;

    println!(
        "reported {} at {} on {}",
        fmt_price(offer.price),
        store_name(&offer),
        offer
            .observed_at
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M")
    );
    Ok(())
}
