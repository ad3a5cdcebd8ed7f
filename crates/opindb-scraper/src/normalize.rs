//! Type coercion from a [`RawOpinion`] to a normalized [`Opinion`].
//!
//! Fixed per-field rules; fields are independent and can be coerced in any
//! order. A mandatory numeric field that fails to parse is a hard error for
//! that record — a broken vote counter means a broken extraction and must
//! surface rather than default silently. Whether the caller then skips the
//! record or aborts the crawl is the crawler's policy, not decided here.

use chrono::{NaiveDate, NaiveDateTime};

use opindb_core::{Opinion, Recommendation};

use crate::error::ScrapeError;
use crate::extract::RawOpinion;
use crate::selectors::field;

/// Exact phrase the site renders for a positive recommendation.
const RECOMMENDED_PHRASE: &str = "Polecam";
/// Exact phrase for a negative recommendation.
const NOT_RECOMMENDED_PHRASE: &str = "Nie polecam";

/// Normalizes one raw record into an [`Opinion`].
///
/// # Errors
///
/// Returns [`ScrapeError::MalformedOpinion`] naming the offending field
/// when the opinion id is missing, a vote counter or star rating fails to
/// parse, the rating leaves the 0.0–5.0 half-step domain, or the post date
/// is absent or unparseable.
pub fn normalize_opinion(raw: &RawOpinion) -> Result<Opinion, ScrapeError> {
    let opinion_id = raw.opinion_id.clone();
    if opinion_id.is_empty() {
        return Err(malformed("<unknown>", "opinion_id", "missing fragment id attribute"));
    }

    let usefulness = parse_votes(&opinion_id, field::USEFULNESS, raw.text(field::USEFULNESS))?;
    let uselessness = parse_votes(&opinion_id, field::USELESSNESS, raw.text(field::USELESSNESS))?;
    let stars = parse_stars(&opinion_id, raw.text(field::STARS))?;
    let post_date = parse_datetime(raw.text(field::POST_DATE))
        .ok_or_else(|| malformed(&opinion_id, field::POST_DATE, format!("unparseable date {:?}", raw.text(field::POST_DATE))))?;

    // Purchase date is genuinely optional: an empty attribute means the
    // review had no linked purchase and stays null.
    let purchase_raw = raw.text(field::PURCHASE_DATE);
    let purchase_date = if purchase_raw.is_empty() {
        None
    } else {
        Some(parse_datetime(purchase_raw).ok_or_else(|| {
            malformed(&opinion_id, field::PURCHASE_DATE, format!("unparseable date {purchase_raw:?}"))
        })?)
    };

    Ok(Opinion {
        opinion_id,
        author: raw.text(field::AUTHOR).to_owned(),
        recommendation: parse_recommendation(raw.text(field::RECOMMENDATION)),
        stars,
        content: collapse_whitespace(raw.text(field::CONTENT)),
        pros: raw.list(field::PROS).to_vec(),
        cons: raw.list(field::CONS).to_vec(),
        verified: !raw.text(field::VERIFIED).is_empty(),
        post_date,
        purchase_date,
        usefulness,
        uselessness,
    })
}

fn malformed(
    opinion_id: &str,
    field: &'static str,
    reason: impl Into<String>,
) -> ScrapeError {
    ScrapeError::MalformedOpinion {
        opinion_id: opinion_id.to_owned(),
        field,
        reason: reason.into(),
    }
}

/// Collapses every whitespace run to a single space and trims the edges.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a vote counter. Missing or non-numeric input is a hard error.
fn parse_votes(opinion_id: &str, field: &'static str, raw: &str) -> Result<u32, ScrapeError> {
    raw.parse::<u32>()
        .map_err(|_| malformed(opinion_id, field, format!("expected a vote count, got {raw:?}")))
}

/// Parses a `"4,5/5"`-style rating: left of the slash, decimal comma
/// replaced with a period, then checked against the 0.0–5.0 half-step
/// domain.
fn parse_stars(opinion_id: &str, raw: &str) -> Result<f64, ScrapeError> {
    let value = raw
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| malformed(opinion_id, field::STARS, format!("expected a rating, got {raw:?}")))?;

    let in_domain = (0.0..=5.0).contains(&value) && (value * 2.0).fract() == 0.0;
    if !in_domain {
        return Err(malformed(
            opinion_id,
            field::STARS,
            format!("rating {value} outside the 0.0-5.0 half-step domain"),
        ));
    }
    Ok(value)
}

/// Exact-matches the recommendation phrases; anything else is `Unknown`.
fn parse_recommendation(raw: &str) -> Recommendation {
    match raw {
        RECOMMENDED_PHRASE => Recommendation::Recommended,
        NOT_RECOMMENDED_PHRASE => Recommendation::NotRecommended,
        _ => Recommendation::Unknown,
    }
}

/// Parses the site's `datetime` attribute value, with or without a time
/// component.
fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
