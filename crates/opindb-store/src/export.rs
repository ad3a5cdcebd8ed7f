//! Flat export formats for a product's opinion sequence.
//!
//! CSV rows carry one opinion each with list fields joined by `"; "`;
//! JSONL carries one serialized opinion object per line. Both formats
//! preserve stored order.

use opindb_core::{Opinion, Product, Recommendation};

use crate::error::StoreError;

/// Column order of the CSV export. One column per opinion field.
pub const OPINION_HEADERS: [&str; 12] = [
    "opinion_id",
    "author",
    "recommendation",
    "stars",
    "content",
    "pros",
    "cons",
    "verified",
    "post_date",
    "purchase_date",
    "usefulness",
    "uselessness",
];

const LIST_SEPARATOR: &str = "; ";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders the product's opinions as a CSV document with a header row.
#[must_use]
pub fn csv_document(product: &Product) -> String {
    let mut out = String::new();
    write_row(&mut out, OPINION_HEADERS.iter().map(|h| (*h).to_owned()));
    for opinion in &product.opinions {
        write_row(&mut out, flatten(opinion));
    }
    out
}

/// Renders the product's opinions as one JSON object per line.
///
/// # Errors
///
/// Returns [`StoreError::Serde`] if an opinion fails to serialize.
pub fn jsonl_document(product: &Product) -> Result<String, StoreError> {
    let mut out = String::new();
    for opinion in &product.opinions {
        let line = serde_json::to_string(opinion).map_err(|e| StoreError::Serde {
            context: format!("opinion {}", opinion.opinion_id),
            source: e,
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

fn flatten(opinion: &Opinion) -> impl Iterator<Item = String> {
    let recommendation = match opinion.recommendation {
        Recommendation::Recommended => "true".to_owned(),
        Recommendation::NotRecommended => "false".to_owned(),
        Recommendation::Unknown => String::new(),
    };
    [
        opinion.opinion_id.clone(),
        opinion.author.clone(),
        recommendation,
        opinion.stars.to_string(),
        opinion.content.clone(),
        opinion.pros.join(LIST_SEPARATOR),
        opinion.cons.join(LIST_SEPARATOR),
        opinion.verified.to_string(),
        opinion.post_date.format(DATE_FORMAT).to_string(),
        opinion
            .purchase_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        opinion.usefulness.to_string(),
        opinion.uselessness.to_string(),
    ]
    .into_iter()
}

fn write_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&quote_field(&field));
    }
    out.push('\n');
}

/// Quotes a field when it contains the separator, a quote or a line break,
/// doubling embedded quotes.
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
