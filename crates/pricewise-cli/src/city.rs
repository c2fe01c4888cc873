//! City selection command handlers.

use clap::Subcommand;

use crate::session::Session;

/// Sub-commands available under `city`.
#[derive(Debug, Subcommand)]
pub enum CityCommands {
    /// List available cities
    List {
        /// Filter by a fragment of the city name
        #[arg(long)]
        search: Option<String>,
    },
    /// Select a city by id
    Set { id: String },
    /// Show the selected city
    Show,
}

/// # Errors
///
/// Returns an error if the city list cannot be fetched.
pub(crate) async fn run_city_list(session: &Session, search: Option<&str>) -> anyhow::Result<()> {
    let cities = session.client.list_cities(search).await?;
    if cities.is_empty() {
        println!("no cities found");
        return Ok(());
    }

    let selected = session.selection.get().map(|c| c.id);
    println!("  {:<26}CITY", "ID");
    for city in &cities {
        let marker = if selected.as_deref() == Some(city.id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!("{marker} {:<26}{city}", city.id);
    }
    Ok(())
}

/// Looks the city up so only cities the backend knows can be selected.
///
/// # Errors
///
/// Returns an error if the city does not exist or cannot be fetched.
pub(crate) async fn run_city_set(session: &Session, id: &str) -> anyhow::Result<()> {
    let city = session.client.get_city(id).await?;
    println!("selected {city}");
    session.selection.set(city);
    Ok(())
}

pub(crate) fn run_city_show(session: &Session) {
    match session.selection.get() {
        Some(city) => println!("{city} ({})", city.id),
        None => println!("no city selected; run `pricewise city list` to see options"),
    }
}
