//! Scatter-grid and random-forest walkthrough on a synthetic dataset.
//!
//! Run with `RUST_LOG=plotfit=debug` to see layout and fitting events.

use ndarray::Array2;
use plotfit::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

fn synthetic_table(n_rows: usize, rng: &mut ChaCha8Rng) -> Result<FeatureTable> {
    let names = ["rooms", "age", "distance", "tax", "crime", "outcome"];
    let mut data = Array2::zeros((n_rows, names.len()));

    for mut row in data.rows_mut() {
        let rooms: f64 = rng.random_range(3.0..9.0);
        let age: f64 = rng.random_range(0.0..100.0);
        let distance: f64 = rng.random_range(1.0..12.0);
        let tax: f64 = rng.random_range(180.0..700.0);
        let crime: f64 = rng.random_range(0.0..20.0);
        let noise: f64 = rng.random_range(-2.0..2.0);
        let outcome = 9.0 * rooms - 0.05 * age - 0.8 * distance - 0.01 * tax - 0.3 * crime + noise;

        row.assign(&ndarray::arr1(&[rooms, age, distance, tax, crime, outcome]));
    }

    FeatureTable::new(names.to_vec(), data)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("plotfit demo");
    println!("============\n");

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let train = synthetic_table(400, &mut rng)?;
    let test = synthetic_table(100, &mut rng)?;

    let config = ScatterGridConfig::new("outcome").with_n_cols(3);
    let grid = scatter_grid(&train, &config)?;
    let path = std::env::temp_dir().join("plotfit_scatter_grid.png");
    grid.save_png(&path)?;
    println!(
        "Scatter grid: {} features on {}x{} cells -> {}",
        grid.layout().n_features(),
        grid.layout().n_rows(),
        grid.layout().n_cols(),
        path.display()
    );

    let forest = ForestConfig::default();
    println!(
        "\nRandom forest: {} trees, max_features={}, max_depth={:?}, seed={}",
        forest.n_trees, forest.max_features, forest.max_depth, forest.seed
    );
    let result = train_test_tables(&train, &test, "outcome", &forest)?;

    println!("\nAs JSON: {}", serde_json::to_string(&result)?);

    Ok(())
}
