//! Testing utilities for homeval.
//!
//! Deterministic synthetic housing tables with the pipeline's column
//! layout, for unit and integration tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::{Column, Frame};

/// Category values used by the synthetic generator.
pub const CATEGORIES: &[&str] = &["<1H OCEAN", "INLAND", "NEAR BAY", "NEAR OCEAN"];

/// Generate a synthetic housing frame.
///
/// Columns match the raw California housing layout: eight numeric
/// attributes, `ocean_proximity`, and the `median_house_value` label. The
/// label is a noisy linear function of income with a per-category offset,
/// so trained models have real signal to pick up. Roughly 5% of
/// `total_bedrooms` values are missing. Deterministic for a fixed seed.
pub fn synthetic_housing_frame(n_rows: usize, seed: u64) -> Frame {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut longitude = Vec::with_capacity(n_rows);
    let mut latitude = Vec::with_capacity(n_rows);
    let mut age = Vec::with_capacity(n_rows);
    let mut rooms = Vec::with_capacity(n_rows);
    let mut bedrooms = Vec::with_capacity(n_rows);
    let mut population = Vec::with_capacity(n_rows);
    let mut households = Vec::with_capacity(n_rows);
    let mut income = Vec::with_capacity(n_rows);
    let mut proximity = Vec::with_capacity(n_rows);
    let mut value = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let inc = rng.gen_range(0.5f32..15.0);
        let cat = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let cat_bump = match cat {
            "INLAND" => -40_000.0,
            "NEAR BAY" | "NEAR OCEAN" => 25_000.0,
            _ => 0.0,
        };
        let noise = rng.gen_range(-15_000.0f32..15_000.0);

        longitude.push(rng.gen_range(-124.0f32..-114.0));
        latitude.push(rng.gen_range(32.0f32..42.0));
        age.push(rng.gen_range(1.0f32..52.0));
        rooms.push(rng.gen_range(200.0f32..6000.0));
        bedrooms.push(if rng.gen_bool(0.05) {
            f32::NAN
        } else {
            rng.gen_range(50.0f32..1200.0)
        });
        population.push(rng.gen_range(100.0f32..4000.0));
        households.push(rng.gen_range(50.0f32..1500.0));
        income.push(inc);
        proximity.push(cat.to_string());
        value.push(60_000.0 + 28_000.0 * inc + cat_bump + noise);
    }

    Frame::new(vec![
        Column::Numeric {
            name: "longitude".into(),
            values: longitude,
        },
        Column::Numeric {
            name: "latitude".into(),
            values: latitude,
        },
        Column::Numeric {
            name: "housing_median_age".into(),
            values: age,
        },
        Column::Numeric {
            name: "total_rooms".into(),
            values: rooms,
        },
        Column::Numeric {
            name: "total_bedrooms".into(),
            values: bedrooms,
        },
        Column::Numeric {
            name: "population".into(),
            values: population,
        },
        Column::Numeric {
            name: "households".into(),
            values: households,
        },
        Column::Numeric {
            name: "median_income".into(),
            values: income,
        },
        Column::Categorical {
            name: "ocean_proximity".into(),
            values: proximity,
        },
        Column::Numeric {
            name: "median_house_value".into(),
            values: value,
        },
    ])
    .expect("synthetic columns share one length")
}
