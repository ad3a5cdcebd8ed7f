//! Chart-ready summaries of a product's opinions: a star-rating histogram
//! and a recommendation breakdown, both computed server-side so the front
//! end only renders.

use opindb_core::{Product, Recommendation};
use serde::Serialize;

/// Half-star buckets from 0.0 to 5.0 inclusive.
pub const STAR_BUCKETS: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationBreakdown {
    pub recommended: usize,
    pub not_recommended: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarBucket {
    pub stars: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub product_id: String,
    pub product_name: String,
    pub stars_histogram: Vec<StarBucket>,
    pub recommendation_breakdown: RecommendationBreakdown,
}

/// Builds both chart datasets in one pass over the opinions.
///
/// Every half-star bucket is present even when empty, so the rendered
/// axis is stable across products.
#[must_use]
pub fn chart_data(product: &Product) -> ChartData {
    let mut counts = [0usize; STAR_BUCKETS];
    let mut breakdown = RecommendationBreakdown {
        recommended: 0,
        not_recommended: 0,
        unknown: 0,
    };

    for opinion in &product.opinions {
        // Ratings are normalized to half-star steps upstream.
        let bucket = (opinion.stars * 2.0).round() as usize;
        if let Some(slot) = counts.get_mut(bucket) {
            *slot += 1;
        }
        match opinion.recommendation {
            Recommendation::Recommended => breakdown.recommended += 1,
            Recommendation::NotRecommended => breakdown.not_recommended += 1,
            Recommendation::Unknown => breakdown.unknown += 1,
        }
    }

    let stars_histogram = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| StarBucket {
            stars: i as f64 / 2.0,
            count,
        })
        .collect();

    ChartData {
        product_id: product.product_id.clone(),
        product_name: product.product_name.clone(),
        stars_histogram,
        recommendation_breakdown: breakdown,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use opindb_core::Opinion;

    use super::*;

    fn opinion(stars: f64, recommendation: Recommendation) -> Opinion {
        Opinion {
            opinion_id: "1".to_owned(),
            author: "a".to_owned(),
            recommendation,
            stars,
            content: String::new(),
            pros: vec![],
            cons: vec![],
            verified: false,
            post_date: NaiveDate::from_ymd_opt(2021, 2, 17)
                .unwrap()
                .and_hms_opt(9, 0, 21)
                .unwrap(),
            purchase_date: None,
            usefulness: 0,
            uselessness: 0,
        }
    }

    fn product_with(opinions: Vec<Opinion>) -> Product {
        let mut product = Product::new("100200", "Laptop ABC 15");
        product.opinions = opinions;
        product.analyze();
        product
    }

    #[test]
    fn histogram_has_all_eleven_buckets_even_when_empty() {
        let data = chart_data(&product_with(vec![]));
        assert_eq!(data.stars_histogram.len(), STAR_BUCKETS);
        assert_eq!(data.stars_histogram[0].stars, 0.0);
        assert_eq!(data.stars_histogram[10].stars, 5.0);
        assert!(data.stars_histogram.iter().all(|b| b.count == 0));
    }

    #[test]
    fn ratings_land_in_their_half_star_bucket() {
        let data = chart_data(&product_with(vec![
            opinion(4.5, Recommendation::Recommended),
            opinion(4.5, Recommendation::Recommended),
            opinion(2.0, Recommendation::NotRecommended),
        ]));
        let count_at = |stars: f64| {
            data.stars_histogram
                .iter()
                .find(|b| b.stars == stars)
                .unwrap()
                .count
        };
        assert_eq!(count_at(4.5), 2);
        assert_eq!(count_at(2.0), 1);
        assert_eq!(count_at(5.0), 0);
    }

    #[test]
    fn breakdown_counts_all_three_states() {
        let data = chart_data(&product_with(vec![
            opinion(5.0, Recommendation::Recommended),
            opinion(1.0, Recommendation::NotRecommended),
            opinion(3.0, Recommendation::Unknown),
            opinion(3.5, Recommendation::Unknown),
        ]));
        assert_eq!(
            data.recommendation_breakdown,
            RecommendationBreakdown {
                recommended: 1,
                not_recommended: 1,
                unknown: 2,
            }
        );
    }
}
