//! Domain types for products and their normalized review records.
//!
//! An [`Opinion`] is one review after extraction and type coercion; it is
//! immutable once built (serialization round-trips aside). A [`Product`]
//! exclusively owns its opinion sequence together with aggregates derived
//! from it — the aggregates are always recomputed via [`Product::analyze`],
//! never edited by hand.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Tri-state reviewer recommendation.
///
/// Modeled as an explicit sum type rather than `bool`/empty-string overloads
/// so "not recommended" and "recommendation unknown" can never be confused.
/// Serializes as `true` / `false` / `null` to keep the persisted record
/// shape flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Recommendation {
    Recommended,
    NotRecommended,
    Unknown,
}

impl From<Option<bool>> for Recommendation {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Recommended,
            Some(false) => Self::NotRecommended,
            None => Self::Unknown,
        }
    }
}

impl From<Recommendation> for Option<bool> {
    fn from(value: Recommendation) -> Self {
        match value {
            Recommendation::Recommended => Some(true),
            Recommendation::NotRecommended => Some(false),
            Recommendation::Unknown => None,
        }
    }
}

/// One normalized review record.
///
/// Field domains (enforced by the scraper's normalizer, not re-checked here):
/// - `stars` lies in 0.0–5.0 in 0.5 steps,
/// - `usefulness` / `uselessness` are non-negative vote counts,
/// - `content` has whitespace runs collapsed to single spaces,
/// - `purchase_date` is `None` when the review had no linked purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    /// Source-assigned identifier, stable and unique within a product.
    pub opinion_id: String,
    pub author: String,
    pub recommendation: Recommendation,
    pub stars: f64,
    pub content: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub verified: bool,
    pub post_date: NaiveDateTime,
    pub purchase_date: Option<NaiveDateTime>,
    pub usefulness: u32,
    pub uselessness: u32,
}

/// A product together with its extracted opinions and derived aggregates.
///
/// Matches the persisted record shape exactly: the aggregate fields are
/// serialized inline next to the opinion list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub opinions_count: usize,
    pub pros_count: usize,
    pub cons_count: usize,
    /// Arithmetic mean of all star ratings; `None` (serialized `null`)
    /// when there are no opinions.
    pub average_score: Option<f64>,
    pub opinions: Vec<Opinion>,
}

impl Product {
    /// Creates an empty product with a freshly allocated opinion sequence.
    #[must_use]
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            opinions_count: 0,
            pros_count: 0,
            cons_count: 0,
            average_score: None,
            opinions: Vec::new(),
        }
    }

    /// Recomputes all aggregate fields from the current opinion sequence.
    pub fn analyze(&mut self) {
        let aggregates = crate::aggregate::analyze(&self.opinions);
        self.opinions_count = aggregates.opinions_count;
        self.pros_count = aggregates.pros_count;
        self.cons_count = aggregates.cons_count;
        self.average_score = aggregates.average_score;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample_opinion(id: &str) -> Opinion {
        Opinion {
            opinion_id: id.to_owned(),
            author: "jan.k".to_owned(),
            recommendation: Recommendation::Recommended,
            stars: 4.5,
            content: "Solidny sprzęt".to_owned(),
            pros: vec!["bateria".to_owned()],
            cons: vec![],
            verified: true,
            post_date: NaiveDate::from_ymd_opt(2021, 2, 17)
                .unwrap()
                .and_hms_opt(9, 0, 21)
                .unwrap(),
            purchase_date: None,
            usefulness: 6,
            uselessness: 0,
        }
    }

    #[test]
    fn recommendation_serializes_as_nullable_bool() {
        assert_eq!(
            serde_json::to_string(&Recommendation::Recommended).unwrap(),
            "true"
        );
        assert_eq!(
            serde_json::to_string(&Recommendation::NotRecommended).unwrap(),
            "false"
        );
        assert_eq!(
            serde_json::to_string(&Recommendation::Unknown).unwrap(),
            "null"
        );
    }

    #[test]
    fn recommendation_round_trips_through_json() {
        for rec in [
            Recommendation::Recommended,
            Recommendation::NotRecommended,
            Recommendation::Unknown,
        ] {
            let json = serde_json::to_string(&rec).unwrap();
            let back: Recommendation = serde_json::from_str(&json).unwrap();
            assert_eq!(back, rec);
        }
    }

    #[test]
    fn opinion_round_trips_through_json() {
        let opinion = sample_opinion("123");
        let json = serde_json::to_string(&opinion).unwrap();
        let back: Opinion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opinion);
    }

    #[test]
    fn new_product_has_empty_independent_opinion_sequence() {
        let a = Product::new("100200", "Laptop A");
        let mut b = Product::new("100201", "Laptop B");
        b.opinions.push(sample_opinion("1"));
        assert!(a.opinions.is_empty());
        assert_eq!(b.opinions.len(), 1);
    }

    #[test]
    fn analyze_updates_aggregate_fields() {
        let mut product = Product::new("100200", "Laptop A");
        product.opinions.push(sample_opinion("1"));
        product.opinions.push(Opinion {
            stars: 3.5,
            pros: vec![],
            cons: vec!["cena".to_owned()],
            ..sample_opinion("2")
        });
        product.analyze();
        assert_eq!(product.opinions_count, 2);
        assert_eq!(product.pros_count, 1);
        assert_eq!(product.cons_count, 1);
        assert_eq!(product.average_score, Some(4.0));
    }

    #[test]
    fn empty_product_serializes_null_average_score() {
        let mut product = Product::new("100200", "Laptop A");
        product.analyze();
        let json = serde_json::to_value(&product).unwrap();
        assert!(json["average_score"].is_null());
        assert_eq!(json["opinions_count"], 0);
    }
}
