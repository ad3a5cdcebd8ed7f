//! Aggregate statistics derived from an opinion sequence.
//!
//! All values are pure functions of the sequence and are recomputed in one
//! pass whenever the sequence changes; nothing here is patched incrementally.

use crate::opinion::Opinion;

/// Derived statistics over a product's opinion sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub opinions_count: usize,
    /// Opinions whose pros list is non-empty.
    pub pros_count: usize,
    /// Opinions whose cons list is non-empty.
    pub cons_count: usize,
    /// Mean star rating; `None` for an empty sequence rather than NaN.
    pub average_score: Option<f64>,
}

/// Computes all aggregates in a single pass over `opinions`.
#[must_use]
pub fn analyze(opinions: &[Opinion]) -> Aggregates {
    let mut pros_count = 0;
    let mut cons_count = 0;
    let mut stars_sum = 0.0;

    for opinion in opinions {
        if !opinion.pros.is_empty() {
            pros_count += 1;
        }
        if !opinion.cons.is_empty() {
            cons_count += 1;
        }
        stars_sum += opinion.stars;
    }

    let average_score = if opinions.is_empty() {
        None
    } else {
        #[allow(clippy::cast_precision_loss)]
        Some(stars_sum / opinions.len() as f64)
    };

    Aggregates {
        opinions_count: opinions.len(),
        pros_count,
        cons_count,
        average_score,
    }
}
