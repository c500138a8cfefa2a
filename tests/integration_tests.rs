use approx::assert_abs_diff_eq;
use currency_run::analysis::inputs::{ScenarioInputs, StrikeSpec};
use currency_run::analysis::{AnalysisConfig, AnalysisError, RiskAnalyzer};
use currency_run::core::currency::{CurrencyPair, FxError};
use currency_run::core::market::{ContractTerms, MarketState, PricingError};
use currency_run::core::snapshot::RateSnapshot;
use currency_run::pricing::black_scholes::{analytic_crash_probability, call_price, price_call};
use currency_run::simulation::monte_carlo::{simulate, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SNAPSHOT: &str = r#"{
    "result": "success",
    "documentation": "https://www.exchangerate-api.com/docs",
    "base_code": "USD",
    "conversion_rates": {
        "USD": 1,
        "EUR": 0.9091,
        "GBP": 0.7874,
        "JPY": 151.25,
        "BRL": 5.02
    }
}"#;

fn reference_scenario() -> (MarketState, ContractTerms) {
    (
        MarketState::new(1.10, 0.02, 0.15).unwrap(),
        ContractTerms::new(1.05, 0.5).unwrap(),
    )
}

/// Million-draw reference run: reproducible under a fixed seed and close
/// to the closed-form probability.
#[test]
fn reference_scenario_price_and_probability() {
    let (market, terms) = reference_scenario();

    let price = call_price(&market, &terms);
    assert_abs_diff_eq!(price.fair_value, 0.0817375, epsilon = 1e-5);

    let mut first_rng = StdRng::seed_from_u64(20_240_601);
    let first = simulate(&market, &terms, 1_000_000, &mut first_rng).unwrap();
    let mut second_rng = StdRng::seed_from_u64(20_240_601);
    let second = simulate(&market, &terms, 1_000_000, &mut second_rng).unwrap();

    assert_abs_diff_eq!(first.crash_probability(), second.crash_probability(), epsilon = 0.002);

    let analytic = analytic_crash_probability(&market, &terms);
    assert_abs_diff_eq!(first.crash_probability(), analytic, epsilon = 0.01);
    assert!(first.terminal_rates().iter().all(|&r| r > 0.0));
}

#[test]
fn invalid_inputs_produce_no_result() {
    let (market, terms) = reference_scenario();
    let mut rng = StdRng::seed_from_u64(1);

    assert!(matches!(
        price_call(1.10, 1.05, 0.5, 0.02, 0.0),
        Err(PricingError::InvalidParameter { name: "volatility", .. })
    ));
    assert!(matches!(
        price_call(1.10, 1.05, 0.0, 0.02, 0.15),
        Err(PricingError::InvalidParameter { name: "maturity", .. })
    ));
    assert!(matches!(
        simulate(&market, &terms, 0, &mut rng),
        Err(PricingError::InvalidParameter { name: "simulations", .. })
    ));
}

#[test]
fn snapshot_pipeline_cross_pair() {
    let snapshot = RateSnapshot::from_json(SNAPSHOT).unwrap();
    let universe = snapshot.universe();
    let config = AnalysisConfig {
        simulation: SimulationConfig {
            simulations: 50_000,
            seed: Some(3),
        },
        ..Default::default()
    };
    let analyzer = RiskAnalyzer::new(snapshot, config).with_universe(universe);

    let pair = CurrencyPair::parse("GBP/JPY").unwrap();
    let report = analyzer.analyze(&pair, &ScenarioInputs::default()).unwrap();

    assert_abs_diff_eq!(report.spot, 151.25 / 0.7874, epsilon = 1e-9);
    assert_abs_diff_eq!(report.strike, report.spot * 0.95, epsilon = 1e-9);
    assert_eq!(report.histogram.total(), 50_000);
    assert!(report.fair_value > 0.0 && report.fair_value < report.spot);
    assert!(report.sampling_gap() < 0.01);
}

#[test]
fn snapshot_pipeline_rejects_unknown_currency() {
    let snapshot = RateSnapshot::from_json(SNAPSHOT).unwrap();
    let universe = snapshot.universe();
    let analyzer = RiskAnalyzer::new(snapshot, AnalysisConfig::default()).with_universe(universe);

    let pair = CurrencyPair::parse("EUR/CHF").unwrap();
    let err = analyzer.analyze(&pair, &ScenarioInputs::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Currency(FxError::UnknownCurrency(_))));
}

#[test]
fn snapshot_without_universe_reports_upstream_unavailable() {
    let snapshot = RateSnapshot::from_json(SNAPSHOT).unwrap();
    let analyzer = RiskAnalyzer::new(snapshot, AnalysisConfig::default());

    let pair = CurrencyPair::parse("EUR/CHF").unwrap();
    let err = analyzer.analyze(&pair, &ScenarioInputs::default()).unwrap_err();
    match err {
        AnalysisError::UpstreamUnavailable { pair: failed, .. } => assert_eq!(failed, pair),
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
}

#[test]
fn report_serialises_to_json() {
    let snapshot = RateSnapshot::from_json(SNAPSHOT).unwrap();
    let config = AnalysisConfig {
        simulation: SimulationConfig {
            simulations: 1_000,
            seed: Some(9),
        },
        bins: 10,
        ..Default::default()
    };
    let analyzer = RiskAnalyzer::new(snapshot, config);
    let inputs = ScenarioInputs {
        strike: StrikeSpec::FractionOfSpot(0.9),
        maturity: 1.0,
        volatility_pct: 25.0,
        ..Default::default()
    };

    let pair = CurrencyPair::parse("USD/BRL").unwrap();
    let report = analyzer.analyze(&pair, &inputs).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["pair"]["base"], "USD");
    assert_eq!(json["pair"]["quote"], "BRL");
    assert_eq!(json["simulations"], 1_000);
    assert_eq!(json["seed"], 9);
    assert_eq!(json["histogram"]["counts"].as_array().unwrap().len(), 10);
}
