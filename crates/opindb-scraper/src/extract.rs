//! Raw field extraction from one review fragment.
//!
//! The extractor is a pure function of the fragment and the selector table:
//! it produces string-typed values only, deferring all coercion to
//! [`crate::normalize`]. A selector with no match never fails — it yields
//! a well-defined empty value (empty string or empty list) so fragments
//! missing optional sub-elements (verification badge, purchase date) pass
//! through cleanly.

use std::collections::BTreeMap;

use scraper::ElementRef;

use crate::selectors::{SelectorTable, ENTRY_ID_ATTR};

/// One extracted field value, before any type coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

impl RawValue {
    fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::List(_) => "",
        }
    }

    fn as_list(&self) -> &[String] {
        match self {
            Self::Text(_) => &[],
            Self::List(items) => items,
        }
    }
}

/// Raw (string-typed) field values for one review, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOpinion {
    /// Site-assigned identifier from the fragment attribute; empty when
    /// the attribute is absent (caught later by normalization).
    pub opinion_id: String,
    fields: BTreeMap<&'static str, RawValue>,
}

impl RawOpinion {
    /// Builds a raw opinion directly from field values. Used by tests and
    /// by re-serialization round-trips.
    #[must_use]
    pub fn from_fields(
        opinion_id: impl Into<String>,
        fields: impl IntoIterator<Item = (&'static str, RawValue)>,
    ) -> Self {
        Self {
            opinion_id: opinion_id.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Single-valued field as text; empty string when absent.
    #[must_use]
    pub fn text(&self, field: &str) -> &str {
        self.fields.get(field).map_or("", RawValue::as_text)
    }

    /// Multi-valued field as a list; empty slice when absent.
    #[must_use]
    pub fn list(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], RawValue::as_list)
    }
}

/// Extracts every table field from one review fragment.
///
/// Pure function of its inputs; performs no I/O and never fails. Missing
/// matches default per field multiplicity, and an absent attribute reads
/// as an empty string.
#[must_use]
pub fn extract_opinion(fragment: ElementRef<'_>, table: &SelectorTable) -> RawOpinion {
    let mut fields = BTreeMap::new();

    for row in table.fields() {
        let value = if row.multiple {
            RawValue::List(
                fragment
                    .select(&row.selector)
                    .map(|el| element_value(el, row.attribute))
                    .collect(),
            )
        } else {
            RawValue::Text(
                fragment
                    .select(&row.selector)
                    .next()
                    .map(|el| element_value(el, row.attribute))
                    .unwrap_or_default(),
            )
        };
        fields.insert(row.field, value);
    }

    RawOpinion {
        opinion_id: fragment
            .value()
            .attr(ENTRY_ID_ATTR)
            .unwrap_or_default()
            .to_owned(),
        fields,
    }
}

fn element_value(el: ElementRef<'_>, attribute: Option<&str>) -> String {
    match attribute {
        Some(attr) => el.value().attr(attr).unwrap_or_default().to_owned(),
        None => el.text().collect::<String>().trim().to_owned(),
    }
}
