use equiscope::metrics::{mean_absolute_error, mean_squared_error};
use equiscope::report::format_crores;
use equiscope::{
    EstimatorConfig, FEATURE_NAMES, NegativePolicy, QueryVector, SolverPolicy, ValuationEstimator,
    ValuationReport,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Startup Valuation Estimate ===\n");

    let estimator = ValuationEstimator::new();
    let model = estimator.fit()?;

    println!(
        "Comparables: {} samples, {} features",
        estimator.dataset().n_samples(),
        estimator.dataset().n_features()
    );
    println!("Design rank: {} (full rank would be {})", model.rank(), FEATURE_NAMES.len());
    println!("Training R²: {:.4}\n", model.training_r2());

    println!("{:<12} {:>12}", "Feature", "Weight");
    println!("{}", "-".repeat(25));
    for (name, weight) in FEATURE_NAMES.iter().zip(model.weights()) {
        println!("{:<12} {:>12.6}", name, weight);
    }
    println!("{:<12} {:>12.6}\n", "intercept", model.intercept());

    let predictions = estimator
        .dataset()
        .samples()
        .iter()
        .map(|s| model.predict(&QueryVector::from_features(s.features())))
        .collect::<Result<equiscope::Vector, _>>()?;
    let labels = &estimator.dataset().labels;
    println!("MSE on comparables: {:.2e}", mean_squared_error(labels, &predictions)?);
    println!("MAE on comparables: {:.2e}\n", mean_absolute_error(labels, &predictions)?);

    let queries = [
        ("Seed-stage", QueryVector::new(2.0, 1.0, 500.0, 10.0, 15.0)),
        ("Series A", QueryVector::new(4.0, 3.0, 2000.0, 14.0, 25.0)),
        ("Hypergrowth", QueryVector::new(10.0, 10.0, 10000.0, 30.0, 100.0)),
        ("Pre-revenue", QueryVector::new(0.0, 0.0, 0.0, 0.0, 0.0)),
    ];

    for (label, query) in queries {
        let surfaced = ValuationReport::estimate(&model, &query, NegativePolicy::Surface)?;
        let clamped = ValuationReport::estimate(&model, &query, NegativePolicy::ClampToZero)?;
        println!(
            "{:<12} {:>20} (clamped {:>16}){}",
            label,
            surfaced.to_string(),
            clamped.to_string(),
            if surfaced.out_of_distribution { "  [outside comparables]" } else { "" }
        );
    }

    match model.predict(&QueryVector::new(-1.0, 1.0, 500.0, 10.0, 15.0)) {
        Ok(v) => println!("\nunexpected estimate {}", format_crores(v)),
        Err(e) => println!("\nRejected query: {e}"),
    }

    let strict_config = EstimatorConfig::default().solver(SolverPolicy::Strict);
    let strict = ValuationEstimator::with_config(strict_config)?;
    match strict.fit() {
        Ok(_) => println!("Strict fit succeeded"),
        Err(e) => println!("Strict fit: {e}"),
    }

    Ok(())
}
