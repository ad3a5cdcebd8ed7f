//! Declarative extraction rules for one review fragment.
//!
//! Field extraction is data, not code: [`FIELD_SELECTORS`] maps each field
//! name to a CSS query, an optional attribute to read instead of visible
//! text, and a multi-match flag. The extractor walks this table; per-field
//! behavior never lives in scattered conditionals, which keeps every rule
//! individually testable.
//!
//! The queries target Ceneo review markup. Pros and cons share the item
//! class and are distinguished by the sibling title element of their
//! column, hence the `~` combinator.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;

/// Attribute on a review fragment carrying the site-assigned opinion id.
pub const ENTRY_ID_ATTR: &str = "data-entry-id";

/// Structural marker of one review fragment within a listing page.
const REVIEW_FRAGMENT_QUERY: &str = "div.js_product-review";

/// Product display name on the product page.
const PRODUCT_NAME_QUERY: &str = "h1.product-top__product-info__name";

/// Field names, shared between the extractor and the normalizer.
pub mod field {
    pub const AUTHOR: &str = "author";
    pub const RECOMMENDATION: &str = "recommendation";
    pub const STARS: &str = "stars";
    pub const CONTENT: &str = "content";
    pub const PROS: &str = "pros";
    pub const CONS: &str = "cons";
    pub const VERIFIED: &str = "verified";
    pub const POST_DATE: &str = "post_date";
    pub const PURCHASE_DATE: &str = "purchase_date";
    pub const USEFULNESS: &str = "usefulness";
    pub const USELESSNESS: &str = "uselessness";
}

/// One row of the selector table.
pub struct FieldSelector {
    pub field: &'static str,
    pub query: &'static str,
    /// When set, read this attribute's raw value instead of visible text.
    pub attribute: Option<&'static str>,
    /// When true, collect text from all matching nodes as an ordered list.
    pub multiple: bool,
}

pub const FIELD_SELECTORS: &[FieldSelector] = &[
    FieldSelector {
        field: field::AUTHOR,
        query: "span.user-post__author-name",
        attribute: None,
        multiple: false,
    },
    FieldSelector {
        field: field::RECOMMENDATION,
        query: "span.user-post__author-recomendation > em",
        attribute: None,
        multiple: false,
    },
    FieldSelector {
        field: field::STARS,
        query: "span.user-post__score-count",
        attribute: None,
        multiple: false,
    },
    FieldSelector {
        field: field::CONTENT,
        query: "div.user-post__text",
        attribute: None,
        multiple: false,
    },
    FieldSelector {
        field: field::PROS,
        query: "div.review-feature__title--positives ~ div.review-feature__item",
        attribute: None,
        multiple: true,
    },
    FieldSelector {
        field: field::CONS,
        query: "div.review-feature__title--negatives ~ div.review-feature__item",
        attribute: None,
        multiple: true,
    },
    FieldSelector {
        field: field::VERIFIED,
        query: "div.review-pz",
        attribute: None,
        multiple: false,
    },
    FieldSelector {
        field: field::POST_DATE,
        query: "span.user-post__published > time:nth-child(1)",
        attribute: Some("datetime"),
        multiple: false,
    },
    FieldSelector {
        field: field::PURCHASE_DATE,
        query: "span.user-post__published > time:nth-child(2)",
        attribute: Some("datetime"),
        multiple: false,
    },
    FieldSelector {
        field: field::USEFULNESS,
        query: "span[id^='votes-yes']",
        attribute: None,
        multiple: false,
    },
    FieldSelector {
        field: field::USELESSNESS,
        query: "span[id^='votes-no']",
        attribute: None,
        multiple: false,
    },
];

/// A pre-compiled row of the table.
pub struct CompiledField {
    pub field: &'static str,
    pub selector: Selector,
    pub attribute: Option<&'static str>,
    pub multiple: bool,
}

/// The full selector table with all CSS queries compiled once.
pub struct SelectorTable {
    fields: Vec<CompiledField>,
    fragment: Selector,
    product_name: Selector,
}

impl SelectorTable {
    /// Compiles the standard Ceneo review table.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Selector`] if any query in the static table
    /// fails to compile.
    pub fn standard() -> Result<Self, ScrapeError> {
        let fields = FIELD_SELECTORS
            .iter()
            .map(|row| {
                Ok(CompiledField {
                    field: row.field,
                    selector: compile(row.query)?,
                    attribute: row.attribute,
                    multiple: row.multiple,
                })
            })
            .collect::<Result<Vec<_>, ScrapeError>>()?;

        Ok(Self {
            fields,
            fragment: compile(REVIEW_FRAGMENT_QUERY)?,
            product_name: compile(PRODUCT_NAME_QUERY)?,
        })
    }

    /// Compiled per-field rows, in table order.
    #[must_use]
    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    /// Review fragments of a listing page, in document order.
    pub fn fragments<'a>(&'a self, page: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        page.select(&self.fragment)
    }

    /// Product display name from a product page, if present.
    #[must_use]
    pub fn product_name(&self, page: &Html) -> Option<String> {
        page.select(&self.product_name)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
            .filter(|name| !name.is_empty())
    }
}

fn compile(query: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(query).map_err(|_| ScrapeError::Selector {
        query: query.to_owned(),
    })
}
