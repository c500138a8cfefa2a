//! Currency-run walkthrough for the default pairs.
//!
//! Loads a fixed rate snapshot, then prices and simulates each pair with
//! the default scenario inputs.

use currency_run::analysis::inputs::ScenarioInputs;
use currency_run::analysis::{AnalysisConfig, RiskAnalyzer};
use currency_run::core::currency::default_pairs;
use currency_run::core::snapshot::RateSnapshot;
use currency_run::simulation::monte_carlo::SimulationConfig;

const SNAPSHOT: &str = r#"{
    "result": "success",
    "base_code": "USD",
    "conversion_rates": { "USD": 1, "EUR": 0.9091, "GBP": 0.7874, "JPY": 151.25 }
}"#;

fn main() {
    env_logger::init();

    println!("╔══════════════════════════════════════════╗");
    println!("║  currency-run: Default Pairs Walkthrough ║");
    println!("╚══════════════════════════════════════════╝\n");

    let snapshot = match RateSnapshot::from_json(SNAPSHOT) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error loading rates: {}", e);
            return;
        }
    };
    let universe = snapshot.universe();
    let config = AnalysisConfig {
        simulation: SimulationConfig {
            seed: Some(42),
            ..Default::default()
        },
        bins: 30,
        ..Default::default()
    };
    let analyzer = RiskAnalyzer::new(snapshot, config).with_universe(universe);
    let inputs = ScenarioInputs::default();

    for pair in default_pairs() {
        println!("━━━ {} ━━━\n", pair);
        match analyzer.analyze(&pair, &inputs) {
            Ok(report) => println!("{}", report),
            Err(e) => println!("No result available: {}\n", e),
        }
    }
}
