//! Best-offer selection.
//!
//! The offers collaborator returns its list sorted by price, but its tie-break
//! is unspecified, so the client re-derives the winner with a total order:
//! price ascending, then freshness (`hours_ago` ascending), then a stable
//! identifier. The promotion flag never participates.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::types::{BestOfferSummary, Offer};

/// Anything that can be ranked as a price offer.
pub trait RankedOffer {
    fn price(&self) -> Decimal;

    /// Observation age in hours; `None` ranks after every known age.
    fn hours_ago(&self) -> Option<u32>;

    /// Final tie-break so equal price and age still order deterministically.
    fn rank_key(&self) -> &str;
}

impl RankedOffer for Offer {
    fn price(&self) -> Decimal {
        self.price
    }

    fn hours_ago(&self) -> Option<u32> {
        self.hours_ago
    }

    fn rank_key(&self) -> &str {
        &self.id
    }
}

impl RankedOffer for BestOfferSummary {
    fn price(&self) -> Decimal {
        self.price
    }

    fn hours_ago(&self) -> Option<u32> {
        self.hours_ago
    }

    fn rank_key(&self) -> &str {
        &self.supermarket.id
    }
}

/// Total order used for best-offer selection.
pub fn compare_offers<T: RankedOffer>(a: &T, b: &T) -> Ordering {
    a.price()
        .cmp(&b.price())
        .then_with(|| {
            let age = |o: &T| o.hours_ago().unwrap_or(u32::MAX);
            age(a).cmp(&age(b))
        })
        .then_with(|| a.rank_key().cmp(b.rank_key()))
}

/// Returns the cheapest offer, preferring the freshest among equal prices.
///
/// Returns `None` for an empty slice. The result does not depend on the order
/// of `offers`.
#[must_use]
pub fn best_offer<T: RankedOffer>(offers: &[T]) -> Option<&T> {
    offers.iter().min_by(|a, b| compare_offers(*a, *b))
}

/// Sorts `offers` so that index 0 is the best offer.
pub fn rank_offers<T: RankedOffer>(offers: &mut [T]) {
    offers.sort_by(compare_offers);
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::Supermarket;

    fn offer(id: &str, price: i64, hours_ago: Option<u32>, is_promotion: bool) -> Offer {
        Offer {
            id: id.to_string(),
            product_id: "p1".to_string(),
            supermarket_id: format!("s-{id}"),
            supermarket: None,
            price: Decimal::new(price, 0),
            is_promotion,
            hours_ago,
            observed_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            stock_status: "available".to_string(),
        }
    }

    #[test]
    fn empty_input_has_no_best_offer() {
        let offers: Vec<Offer> = Vec::new();
        assert!(best_offer(&offers).is_none());
    }

    #[test]
    fn fresher_offer_wins_price_tie() {
        let offers = vec![
            offer("a", 10, Some(1), false),
            offer("b", 8, Some(2), false),
            offer("c", 8, Some(0), false),
        ];
        let best = best_offer(&offers).unwrap();
        assert_eq!(best.id, "c");
        assert_eq!(best.hours_ago, Some(0));
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let base = vec![
            offer("a", 10, Some(1), false),
            offer("b", 8, Some(2), true),
            offer("c", 8, Some(0), false),
            offer("d", 8, Some(0), false),
            offer("e", 12, None, true),
        ];
        let expected = best_offer(&base).unwrap().id.clone();

        let mut rotated = base.clone();
        for _ in 0..rotated.len() {
            rotated.rotate_left(1);
            assert_eq!(best_offer(&rotated).unwrap().id, expected);
        }
        let mut reversed = base;
        reversed.reverse();
        assert_eq!(best_offer(&reversed).unwrap().id, expected);
        assert_eq!(expected, "c");
    }

    #[test]
    fn promotion_does_not_affect_selection() {
        let offers = vec![offer("promo", 9, Some(0), true), offer("plain", 7, Some(5), false)];
        assert_eq!(best_offer(&offers).unwrap().id, "plain");
    }

    #[test]
    fn unknown_age_ranks_after_known_age() {
        let offers = vec![offer("unknown", 5, None, false), offer("old", 5, Some(400), false)];
        assert_eq!(best_offer(&offers).unwrap().id, "old");
    }

    #[test]
    fn rank_offers_puts_best_first() {
        let mut offers = vec![
            offer("a", 10, Some(1), false),
            offer("b", 8, Some(2), false),
            offer("c", 8, Some(0), false),
        ];
        rank_offers(&mut offers);
        let ids: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn summaries_follow_the_same_order() {
        let summary = |id: &str, price: i64, hours: u32| BestOfferSummary {
            price: Decimal::new(price, 0),
            is_promotion: false,
            hours_ago: Some(hours),
            supermarket: Supermarket {
                id: id.to_string(),
                name: id.to_uppercase(),
                chain: None,
                address: None,
                distance_km: None,
                rating: None,
            },
        };
        let summaries = vec![summary("x", 3, 9), summary("y", 3, 2), summary("z", 4, 0)];
        assert_eq!(best_offer(&summaries).unwrap().supermarket.id, "y");
    }
}
