use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pricewise_api::ApiError;
use pricewise_core::{City, Product, SuggestionItem};
use tokio::sync::watch;

use super::{SuggestionEngine, SuggestionState};
use crate::source::SuggestionSource;

/// Canned search backend. Each query text maps to a delay and either a list
/// of product ids or a failure status.
#[derive(Default)]
struct FakeSource {
    replies: HashMap<String, (Duration, Result<Vec<&'static str>, u16>)>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeSource {
    fn reply(mut self, text: &str, delay_ms: u64, ids: &[&'static str]) -> Self {
        self.replies.insert(
            text.to_owned(),
            (Duration::from_millis(delay_ms), Ok(ids.to_vec())),
        );
        self
    }

    fn fail(mut self, text: &str, delay_ms: u64, status: u16) -> Self {
        self.replies
            .insert(text.to_owned(), (Duration::from_millis(delay_ms), Err(status)));
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl SuggestionSource for FakeSource {
    async fn search(&self, text: &str, city_id: &str) -> Result<Vec<SuggestionItem>, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_owned(), city_id.to_owned()));
        let (delay, reply) = self
            .replies
            .get(text)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(Vec::new())));
        tokio::time::sleep(delay).await;
        match reply {
            Ok(ids) => Ok(ids.into_iter().map(item).collect()),
            Err(status) => Err(ApiError::Status {
                status,
                url: format!("http://backend/api/products/search?q={text}"),
            }),
        }
    }
}

fn item(id: &str) -> SuggestionItem {
    SuggestionItem {
        product: Product {
            id: id.to_owned(),
            display_name: format!("Produto {id}"),
            brand: "Marca".into(),
            size: "1kg".into(),
            category: "Mercearia".into(),
            image_url: None,
            canonical_name: None,
            subcategory: None,
            unit: None,
            ean: None,
        },
        best_offer: None,
    }
}

fn city(id: &str) -> City {
    City {
        id: id.to_owned(),
        name: format!("City {id}"),
        state: "Sao Paulo".into(),
        state_code: Some("SP".into()),
    }
}

fn ids(items: &[SuggestionItem]) -> Vec<&str> {
    items.iter().map(|i| i.product.id.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn no_city_means_no_lookup() {
    let source = Arc::new(FakeSource::default().reply("arroz", 0, &["p1"]));
    let engine = SuggestionEngine::new(Arc::clone(&source));

    let applied = engine.query("arroz", None).await;

    assert!(applied.is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn short_text_means_no_lookup() {
    let source = Arc::new(FakeSource::default());
    let engine = SuggestionEngine::new(Arc::clone(&source));
    let sp = city("c1");

    engine.query("", Some(&sp)).await;
    engine.query("ar", Some(&sp)).await;

    assert_eq!(engine.state(), SuggestionState::Idle);
    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn min_chars_counts_characters_not_bytes() {
    let source = Arc::new(FakeSource::default().reply("pão", 0, &["p9"]));
    let engine = SuggestionEngine::new(Arc::clone(&source));

    let applied = engine.query("pão", Some(&city("c1"))).await;

    assert_eq!(ids(&applied), ["p9"]);
}

#[tokio::test(start_paused = true)]
async fn lookup_uses_text_and_city() {
    let source = Arc::new(FakeSource::default().reply("arroz", 0, &["p1", "p2"]));
    let engine = SuggestionEngine::new(Arc::clone(&source));

    let applied = engine.query("arroz", Some(&city("c7"))).await;

    assert_eq!(ids(&applied), ["p1", "p2"]);
    assert_eq!(ids(&engine.suggestions()), ["p1", "p2"]);
    assert_eq!(source.calls(), [("arroz".to_string(), "c7".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn slow_earlier_response_never_overwrites_later_one() {
    let source = Arc::new(
        FakeSource::default()
            .reply("arr", 200, &["old"])
            .reply("arro", 50, &["new"]),
    );
    let engine = SuggestionEngine::new(Arc::clone(&source));
    let sp = city("c1");

    let (first, second) = tokio::join!(engine.query("arr", Some(&sp)), engine.query("arro", Some(&sp)));

    assert!(first.is_empty());
    assert_eq!(ids(&second), ["new"]);
    assert_eq!(ids(&engine.suggestions()), ["new"]);
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn single_character_race_keeps_latest() {
    let source = Arc::new(
        FakeSource::default()
            .reply("a", 300, &["from-a"])
            .reply("ab", 10, &["from-ab"]),
    );
    let engine = SuggestionEngine::new(Arc::clone(&source)).with_min_chars(1);
    let sp = city("c1");

    tokio::join!(engine.query("a", Some(&sp)), engine.query("ab", Some(&sp)));

    assert_eq!(engine.state(), SuggestionState::Ready(vec![item("from-ab")]));
}

#[tokio::test(start_paused = true)]
async fn loading_while_lookup_is_outstanding() {
    let source = Arc::new(FakeSource::default().reply("feijao", 100, &["p1"]));
    let engine = SuggestionEngine::new(Arc::clone(&source));
    let sp = city("c1");

    let peek = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.is_loading()
    };
    let (_, was_loading) = tokio::join!(engine.query("feijao", Some(&sp)), peek);

    assert!(was_loading);
    assert!(!engine.is_loading());
}

#[tokio::test(start_paused = true)]
async fn failure_clears_suggestions() {
    let source = Arc::new(
        FakeSource::default()
            .reply("arroz", 0, &["p1"])
            .fail("arroz integral", 0, 500),
    );
    let engine = SuggestionEngine::new(Arc::clone(&source));
    let sp = city("c1");

    engine.query("arroz", Some(&sp)).await;
    assert_eq!(ids(&engine.suggestions()), ["p1"]);

    let applied = engine.query("arroz integral", Some(&sp)).await;
    assert!(applied.is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn timeout_clears_suggestions() {
    let source = Arc::new(FakeSource::default().reply("cafe", 60_000, &["p1"]));
    let engine = SuggestionEngine::new(Arc::clone(&source)).with_timeout(Duration::from_secs(5));

    let applied = engine.query("cafe", Some(&city("c1"))).await;

    assert!(applied.is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn empty_result_is_ready_not_idle() {
    let source = Arc::new(FakeSource::default().reply("xyz", 0, &[]));
    let engine = SuggestionEngine::new(Arc::clone(&source));

    engine.query("xyz", Some(&city("c1"))).await;

    assert_eq!(engine.state(), SuggestionState::Ready(Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn shortening_text_clears_and_drops_pending_lookup() {
    let source = Arc::new(FakeSource::default().reply("leite", 100, &["p1"]));
    let engine = SuggestionEngine::new(Arc::clone(&source));
    let sp = city("c1");

    let erase = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.query("le", Some(&sp)).await
    };
    let (applied, _) = tokio::join!(engine.query("leite", Some(&sp)), erase);

    assert!(applied.is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn select_invalidates_in_flight_lookup() {
    let source = Arc::new(FakeSource::default().reply("oleo", 100, &["p1"]));
    let engine = SuggestionEngine::new(Arc::clone(&source));
    let sp = city("c1");

    let pick = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.select(item("chosen"))
    };
    let (applied, chosen) = tokio::join!(engine.query("oleo", Some(&sp)), pick);

    assert_eq!(chosen.product.id, "chosen");
    assert!(applied.is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn city_change_discards_response() {
    let source = Arc::new(FakeSource::default().reply("acucar", 100, &["p1"]));
    let (tx, rx) = watch::channel(Some(city("c1")));
    let engine = SuggestionEngine::new(Arc::clone(&source)).watching(rx);
    let sp = city("c1");

    let switch = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send_replace(Some(city("c2")));
    };
    let (applied, ()) = tokio::join!(engine.query("acucar", Some(&sp)), switch);

    assert!(applied.is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn city_change_is_idle_before_the_response_arrives() {
    let source = Arc::new(FakeSource::default().reply("acucar", 100, &["p1"]));
    let (tx, rx) = watch::channel(Some(city("c1")));
    let engine = SuggestionEngine::new(Arc::clone(&source)).watching(rx);
    let sp = city("c1");

    let switch = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send_replace(Some(city("c2")));
        let state = engine.state();
        let loading = engine.is_loading();
        (state, loading)
    };
    let (applied, (state, loading)) = tokio::join!(engine.query("acucar", Some(&sp)), switch);

    assert_eq!(state, SuggestionState::Idle);
    assert!(!loading);
    assert!(applied.is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn city_change_hides_shown_suggestions() {
    let source = Arc::new(FakeSource::default().reply("acucar", 0, &["p1"]));
    let (tx, rx) = watch::channel(Some(city("c1")));
    let engine = SuggestionEngine::new(Arc::clone(&source)).watching(rx);

    engine.query("acucar", Some(&city("c1"))).await;
    assert_eq!(ids(&engine.suggestions()), ["p1"]);

    tx.send_replace(Some(city("c2")));

    assert!(engine.suggestions().is_empty());
    assert_eq!(engine.state(), SuggestionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn duplicate_products_are_shown_once() {
    let source = Arc::new(FakeSource::default().reply("arroz", 0, &["p1", "p1", "p2"]));
    let engine = SuggestionEngine::new(Arc::clone(&source));

    let applied = engine.query("arroz", Some(&city("c1"))).await;

    assert_eq!(ids(&applied), ["p1", "p2"]);
    assert_eq!(ids(&engine.suggestions()), ["p1", "p2"]);
}

#[tokio::test(start_paused = true)]
async fn unchanged_city_applies_response() {
    let source = Arc::new(FakeSource::default().reply("acucar", 100, &["p1"]));
    let (_tx, rx) = watch::channel(Some(city("c1")));
    let engine = SuggestionEngine::new(Arc::clone(&source)).watching(rx);

    let applied = engine.query("acucar", Some(&city("c1"))).await;

    assert_eq!(ids(&applied), ["p1"]);
}
