//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Same seed, same panel, same tables, byte for byte.
//! Any divergence is a blocker. Published numbers must be reproducible.

use minwage_core::{
    dataset::Dataset,
    derived::DerivationConfig,
    synthetic::generate_survey,
    tables::{build_table, TableId},
};

const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;

fn render_all(seed: u64) -> Vec<String> {
    let dataset = Dataset::new(generate_survey(seed, 400), DerivationConfig::default()).unwrap();
    TableId::ALL
        .iter()
        .map(|&id| build_table(id, &dataset).unwrap().render())
        .collect()
}

#[test]
fn same_seed_produces_identical_panels() {
    let a = generate_survey(SEED, 400);
    let b = generate_survey(SEED, 400);
    assert_eq!(a, b, "record streams diverged for the same seed");
}

#[test]
fn same_seed_produces_identical_tables() {
    let a = render_all(SEED);
    let b = render_all(SEED);
    for (i, (left, right)) in a.iter().zip(&b).enumerate() {
        assert_eq!(left, right, "{} diverged", TableId::ALL[i]);
    }
}

#[test]
fn different_seeds_produce_different_panels() {
    let a = generate_survey(1, 100);
    let b = generate_survey(2, 100);
    assert_ne!(a, b, "different seeds should not produce identical panels");
}

/// A longer panel starts with the same stores as a shorter one.
#[test]
fn panel_prefix_is_stable() {
    let short = generate_survey(SEED, 50);
    let long = generate_survey(SEED, 200);
    assert_eq!(short[..], long[..50]);
}
