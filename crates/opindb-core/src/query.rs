//! In-memory sort/filter engine over a product's opinion sequence.
//!
//! Filter and sort parameters arrive as free-form text from a query-string
//! boundary, so nothing here trusts its input: [`OpinionQuery::parse`]
//! coerces each parameter independently and collects an [`InvalidParam`]
//! entry for every value that fails to parse. A bad bound never corrupts
//! the rest of the request — every successfully parsed filter still
//! applies.
//!
//! [`OpinionQuery::apply`] runs in a fixed order: stable sort first, then
//! recommendation, verified and numeric-bound predicates ANDed together.
//! Each step only narrows the set; the sort never changes membership.

use serde::{Deserialize, Serialize};

use crate::opinion::{Opinion, Recommendation};

/// Fields the opinion list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Stars,
    Usefulness,
    Uselessness,
    PostDate,
    PurchaseDate,
    Author,
}

impl SortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "stars" => Some(Self::Stars),
            "usefulness" => Some(Self::Usefulness),
            "uselessness" => Some(Self::Uselessness),
            "post_date" => Some(Self::PostDate),
            "purchase_date" => Some(Self::PurchaseDate),
            "author" => Some(Self::Author),
            _ => None,
        }
    }
}

/// Recommendation predicate over the tri-state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecommendationFilter {
    #[default]
    All,
    RecommendedOnly,
    NotRecommendedOnly,
    /// Both known values, excluding `Unknown`.
    KnownOnly,
}

impl RecommendationFilter {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "recommended" => Some(Self::RecommendedOnly),
            "not-recommended" => Some(Self::NotRecommendedOnly),
            "known" => Some(Self::KnownOnly),
            _ => None,
        }
    }

    fn matches(self, recommendation: Recommendation) -> bool {
        match self {
            Self::All => true,
            Self::RecommendedOnly => recommendation == Recommendation::Recommended,
            Self::NotRecommendedOnly => recommendation == Recommendation::NotRecommended,
            Self::KnownOnly => recommendation != Recommendation::Unknown,
        }
    }
}

/// Verified-purchase predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifiedFilter {
    #[default]
    All,
    VerifiedOnly,
    UnverifiedOnly,
}

impl VerifiedFilter {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "verified" => Some(Self::VerifiedOnly),
            "unverified" => Some(Self::UnverifiedOnly),
            _ => None,
        }
    }

    fn matches(self, verified: bool) -> bool {
        match self {
            Self::All => true,
            Self::VerifiedOnly => verified,
            Self::UnverifiedOnly => !verified,
        }
    }
}

/// Optional strict bounds on one numeric field. Both bounds are strict
/// (`>` / `<`) and independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericBounds {
    pub greater_than: Option<f64>,
    pub lower_than: Option<f64>,
}

impl NumericBounds {
    fn matches(self, value: f64) -> bool {
        if let Some(bound) = self.greater_than {
            if value <= bound {
                return false;
            }
        }
        if let Some(bound) = self.lower_than {
            if value >= bound {
                return false;
            }
        }
        true
    }
}

/// Raw query parameters exactly as they arrive from the form-like boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub sort: Option<String>,
    pub descending: Option<String>,
    pub recommendation: Option<String>,
    pub verified: Option<String>,
    pub stars_greater_than: Option<String>,
    pub stars_lower_than: Option<String>,
    pub usefulness_greater_than: Option<String>,
    pub usefulness_lower_than: Option<String>,
    pub uselessness_greater_than: Option<String>,
    pub uselessness_lower_than: Option<String>,
}

/// One rejected query parameter, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidParam {
    pub param: &'static str,
    pub value: String,
}

/// A validated, ready-to-apply sort/filter specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpinionQuery {
    pub sort: Option<SortField>,
    pub descending: bool,
    pub recommendation: RecommendationFilter,
    pub verified: VerifiedFilter,
    pub stars: NumericBounds,
    pub usefulness: NumericBounds,
    pub uselessness: NumericBounds,
}

impl OpinionQuery {
    /// Coerces raw text parameters into a query.
    ///
    /// Every parameter is validated independently: a value that fails to
    /// parse is reported as an [`InvalidParam`] and that single filter is
    /// left at its default, while all other filters stay applied.
    #[must_use]
    pub fn parse(params: &QueryParams) -> (Self, Vec<InvalidParam>) {
        let mut invalid = Vec::new();
        let mut query = Self::default();

        let mut reject = |param: &'static str, value: &str| {
            invalid.push(InvalidParam {
                param,
                value: value.to_owned(),
            });
        };

        if let Some(raw) = params.sort.as_deref() {
            match SortField::parse(raw) {
                Some(field) => query.sort = Some(field),
                None => reject("sort", raw),
            }
        }
        if let Some(raw) = params.descending.as_deref() {
            match parse_bool(raw) {
                Some(flag) => query.descending = flag,
                None => reject("descending", raw),
            }
        }
        if let Some(raw) = params.recommendation.as_deref() {
            match RecommendationFilter::parse(raw) {
                Some(filter) => query.recommendation = filter,
                None => reject("recommendation", raw),
            }
        }
        if let Some(raw) = params.verified.as_deref() {
            match VerifiedFilter::parse(raw) {
                Some(filter) => query.verified = filter,
                None => reject("verified", raw),
            }
        }

        let mut bound =
            |param: &'static str, raw: Option<&str>, slot: &mut Option<f64>| {
                if let Some(raw) = raw {
                    match raw.parse::<f64>() {
                        Ok(value) => *slot = Some(value),
                        Err(_) => invalid.push(InvalidParam {
                            param,
                            value: raw.to_owned(),
                        }),
                    }
                }
            };

        bound(
            "stars_greater_than",
            params.stars_greater_than.as_deref(),
            &mut query.stars.greater_than,
        );
        bound(
            "stars_lower_than",
            params.stars_lower_than.as_deref(),
            &mut query.stars.lower_than,
        );
        bound(
            "usefulness_greater_than",
            params.usefulness_greater_than.as_deref(),
            &mut query.usefulness.greater_than,
        );
        bound(
            "usefulness_lower_than",
            params.usefulness_lower_than.as_deref(),
            &mut query.usefulness.lower_than,
        );
        bound(
            "uselessness_greater_than",
            params.uselessness_greater_than.as_deref(),
            &mut query.uselessness.greater_than,
        );
        bound(
            "uselessness_lower_than",
            params.uselessness_lower_than.as_deref(),
            &mut query.uselessness.lower_than,
        );

        (query, invalid)
    }

    /// Applies the query: stable sort, then every filter predicate ANDed.
    #[must_use]
    pub fn apply(&self, opinions: &[Opinion]) -> Vec<Opinion> {
        let mut result: Vec<Opinion> = opinions.to_vec();

        if let Some(field) = self.sort {
            // `sort_by` is stable, so ties retain their prior relative
            // order in both directions.
            result.sort_by(|a, b| {
                let ordering = compare_by(field, a, b);
                if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        result.retain(|opinion| {
            self.recommendation.matches(opinion.recommendation)
                && self.verified.matches(opinion.verified)
                && self.stars.matches(opinion.stars)
                && self.usefulness.matches(f64::from(opinion.usefulness))
                && self.uselessness.matches(f64::from(opinion.uselessness))
        });

        result
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

fn compare_by(field: SortField, a: &Opinion, b: &Opinion) -> std::cmp::Ordering {
    match field {
        SortField::Stars => a.stars.total_cmp(&b.stars),
        SortField::Usefulness => a.usefulness.cmp(&b.usefulness),
        SortField::Uselessness => a.uselessness.cmp(&b.uselessness),
        SortField::PostDate => a.post_date.cmp(&b.post_date),
        // `None` sorts before any date, which puts reviews without a
        // linked purchase first in ascending order.
        SortField::PurchaseDate => a.purchase_date.cmp(&b.purchase_date),
        SortField::Author => a.author.cmp(&b.author),
    }
}
