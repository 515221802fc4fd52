use std::io;

use equiscope::{Dataset, TrainingSample, ValuationEstimator, COMPARABLES};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Comparables CSV Export ===\n");

    let dataset = Dataset::comparables();
    dataset.write_csv(io::stdout().lock())?;

    // Round trip through CSV with three extra rows, which makes the design full rank.
    let mut samples = COMPARABLES.to_vec();
    samples.extend([
        TrainingSample::new(4.0, 4.0, 2500.0, 18.0, 22.0, 55.0),
        TrainingSample::new(6.0, 3.0, 3000.0, 14.0, 35.0, 65.0),
        TrainingSample::new(8.0, 9.0, 5200.0, 30.0, 45.0, 110.0),
    ]);
    let extended = Dataset::from_samples(&samples)?;
    let csv = extended.to_csv_string()?;
    let reloaded = Dataset::from_csv_reader(csv.as_bytes())?;

    let model = ValuationEstimator::new().with_dataset(reloaded).fit()?;
    println!(
        "\nExtended dataset: {} samples, rank {}, training R² {:.4}",
        extended.n_samples(),
        model.rank(),
        model.training_r2()
    );

    Ok(())
}
