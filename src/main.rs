//! currency-run CLI
//!
//! Price FX calls and estimate currency-run probabilities from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Black-Scholes call value
//! currency-run price --spot 1.10 --strike 1.05 --maturity 0.5 --vol 15
//!
//! # Monte Carlo crash probability with a fixed seed
//! currency-run simulate --spot 1.10 --strike 1.05 --simulations 1000000 --seed 42
//!
//! # Full report for a pair, using an ExchangeRate-API snapshot
//! currency-run analyze --pair GBP/JPY --rates latest_usd.json --format json
//! ```

use currency_run::analysis::inputs::{ParameterBounds, ScenarioInputs, StrikeSpec};
use currency_run::analysis::{AnalysisConfig, RiskAnalyzer};
use currency_run::core::currency::{default_pairs, CurrencyPair, FxRateTable};
use currency_run::core::market::{ContractTerms, MarketState};
use currency_run::core::snapshot::RateSnapshot;
use currency_run::pricing::black_scholes::{analytic_crash_probability, call_price};
use currency_run::simulation::histogram::{Histogram, DEFAULT_BINS};
use currency_run::simulation::monte_carlo::{run_simulation, SimulationConfig, DEFAULT_SIMULATIONS};
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!(
        r#"currency-run — FX option pricing and currency-run risk estimation

USAGE:
    currency-run <COMMAND> [OPTIONS]

COMMANDS:
    price       Black-Scholes value of a European call
    simulate    Monte Carlo probability that the rate ends below the strike
    analyze     Price and simulate a pair using a rate snapshot
    currencies  List currencies available in a rate snapshot
    help        Show this message

OPTIONS (price, simulate, analyze):
    --spot <RATE>         Spot rate (required unless --rates is given)
    --strike <RATE>       Absolute strike / run threshold
    --strike-pct <PCT>    Strike as percent of spot (default: 95)
    --maturity <YEARS>    Time to expiry in years (default: 0.5)
    --vol <PCT>           Implied volatility in percent (default: 15)
    --rate <R>            Risk-free rate (default: 0.02)

OPTIONS (simulate, analyze):
    --simulations <N>     Number of draws (default: 100000)
    --seed <N>            Seed for reproducible draws
    --bins <N>            Histogram bins (default: 100)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (analyze, currencies):
    --pair <BASE/QUOTE>   Currency pair (default: EUR/USD)
    --rates <FILE>        ExchangeRate-API JSON snapshot
    --no-bounds           Skip the interactive input ranges

EXAMPLES:
    currency-run price --spot 1.10 --strike 1.05 --maturity 0.5 --vol 15
    currency-run simulate --spot 1.10 --strike 1.05 --seed 42
    currency-run analyze --pair USD/JPY --rates latest_usd.json
    currency-run currencies --rates latest_usd.json"#
    );
}

struct CliOptions {
    spot: Option<f64>,
    strike: Option<f64>,
    strike_pct: Option<f64>,
    maturity: f64,
    vol_pct: f64,
    rate: f64,
    simulations: usize,
    seed: Option<u64>,
    bins: usize,
    format: String,
    pair: Option<String>,
    rates: Option<String>,
    bounds: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        let inputs = ScenarioInputs::default();
        Self {
            spot: None,
            strike: None,
            strike_pct: None,
            maturity: inputs.maturity,
            vol_pct: inputs.volatility_pct,
            rate: inputs.risk_free_rate,
            simulations: DEFAULT_SIMULATIONS,
            seed: None,
            bins: DEFAULT_BINS,
            format: "text".to_string(),
            pair: None,
            rates: None,
            bounds: true,
        }
    }
}

impl CliOptions {
    fn scenario(&self) -> ScenarioInputs {
        let strike = match (self.strike, self.strike_pct) {
            (Some(strike), _) => StrikeSpec::Absolute(strike),
            (None, Some(pct)) => StrikeSpec::FractionOfSpot(pct / 100.0),
            (None, None) => StrikeSpec::default(),
        };
        ScenarioInputs {
            strike,
            maturity: self.maturity,
            volatility_pct: self.vol_pct,
            risk_free_rate: self.rate,
        }
    }

    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            simulation: SimulationConfig {
                simulations: self.simulations,
                seed: self.seed,
            },
            bins: self.bins,
            bounds: if self.bounds {
                ParameterBounds::default()
            } else {
                ParameterBounds::unbounded()
            },
        }
    }

    fn require_spot(&self) -> f64 {
        self.spot.unwrap_or_else(|| {
            eprintln!("Error: --spot <RATE> is required");
            process::exit(1);
        })
    }
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str, expected: &str) -> T {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{} requires {}", flag, expected);
            process::exit(1);
        })
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut opts = CliOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--spot" => {
                i += 1;
                opts.spot = Some(value(args, i, "--spot", "a number"));
            }
            "--strike" => {
                i += 1;
                opts.strike = Some(value(args, i, "--strike", "a number"));
            }
            "--strike-pct" => {
                i += 1;
                opts.strike_pct = Some(value(args, i, "--strike-pct", "a percentage"));
            }
            "--maturity" => {
                i += 1;
                opts.maturity = value(args, i, "--maturity", "a number of years");
            }
            "--vol" => {
                i += 1;
                opts.vol_pct = value(args, i, "--vol", "a percentage");
            }
            "--rate" => {
                i += 1;
                opts.rate = value(args, i, "--rate", "a number");
            }
            "--simulations" => {
                i += 1;
                opts.simulations = value(args, i, "--simulations", "a positive integer");
            }
            "--seed" => {
                i += 1;
                opts.seed = Some(value(args, i, "--seed", "an unsigned integer"));
            }
            "--bins" => {
                i += 1;
                opts.bins = value(args, i, "--bins", "a positive integer");
            }
            "--format" => {
                i += 1;
                opts.format = value(args, i, "--format", "'text' or 'json'");
            }
            "--pair" => {
                i += 1;
                opts.pair = Some(value(args, i, "--pair", "a pair like EUR/USD"));
            }
            "--rates" => {
                i += 1;
                opts.rates = Some(value(args, i, "--rates", "a file path"));
            }
            "--no-bounds" => opts.bounds = false,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if opts.format != "text" && opts.format != "json" {
        eprintln!("--format requires 'text' or 'json'");
        process::exit(1);
    }
    opts
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serialising output: {}", e);
            process::exit(1);
        }
    }
}

fn load_snapshot(path: &str) -> RateSnapshot {
    RateSnapshot::from_file(path).unwrap_or_else(|e| {
        eprintln!("Error loading rates: {}", e);
        process::exit(1);
    })
}

fn market_inputs(opts: &CliOptions) -> (MarketState, ContractTerms) {
    opts.scenario()
        .to_market(opts.require_spot())
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        })
}

fn cmd_price(args: &[String]) {
    let opts = parse_options(args);
    let (market, terms) = market_inputs(&opts);
    let pricing = call_price(&market, &terms);

    if opts.format == "json" {
        print_json(&pricing);
    } else {
        println!("Spot:                     {:.4}", market.spot());
        println!("Strike:                   {:.4}", terms.strike());
        println!("Black-Scholes Call Price: {:.4}", pricing.fair_value);
    }
}

fn cmd_simulate(args: &[String]) {
    let opts = parse_options(args);
    let (market, terms) = market_inputs(&opts);
    let config = opts.config();

    let result = run_simulation(&market, &terms, &config.simulation).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let histogram = Histogram::from_samples(result.terminal_rates(), config.bins)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        })
        .with_marker(terms.strike());
    let analytic = analytic_crash_probability(&market, &terms);

    if opts.format == "json" {
        #[derive(serde::Serialize)]
        struct SimulationOutput {
            simulations: usize,
            seed: Option<u64>,
            threshold: f64,
            crash_probability: f64,
            standard_error: f64,
            analytic_probability: f64,
            histogram: Histogram,
        }

        print_json(&SimulationOutput {
            simulations: result.len(),
            seed: config.simulation.seed,
            threshold: result.threshold(),
            crash_probability: result.crash_probability(),
            standard_error: result.standard_error(),
            analytic_probability: analytic,
            histogram,
        });
    } else {
        println!("Simulations:                   {}", result.len());
        println!(
            "Probability of a Currency Run: {:.2}% (± {:.2}%)",
            result.crash_probability() * 100.0,
            result.standard_error() * 100.0
        );
        println!("Closed-form Probability:       {:.2}%", analytic * 100.0);
        println!();
        print!("{}", histogram);
    }
}

fn cmd_analyze(args: &[String]) {
    let opts = parse_options(args);
    let inputs = opts.scenario();
    let config = opts.config();

    let pair_str = opts.pair.clone().unwrap_or_else(|| default_pairs()[0].to_string());
    let pair = CurrencyPair::parse(&pair_str).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let result = match (&opts.rates, opts.spot) {
        (Some(path), _) => {
            let snapshot = load_snapshot(path);
            let universe = snapshot.universe();
            RiskAnalyzer::new(snapshot, config)
                .with_universe(universe)
                .analyze(&pair, &inputs)
        }
        (None, Some(spot)) => {
            let mut table = FxRateTable::new();
            table
                .set_rate(pair.base.clone(), pair.quote.clone(), spot)
                .unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                });
            RiskAnalyzer::new(table, config).analyze(&pair, &inputs)
        }
        (None, None) => {
            eprintln!("Error: --rates <FILE> or --spot <RATE> is required");
            process::exit(1);
        }
    };

    let report = result.unwrap_or_else(|e| {
        eprintln!("No result available: {}", e);
        process::exit(1);
    });

    if opts.format == "json" {
        print_json(&report);
    } else {
        print!("{}", report);
    }
}

fn cmd_currencies(args: &[String]) {
    let opts = parse_options(args);
    let path = opts.rates.unwrap_or_else(|| {
        eprintln!("Error: --rates <FILE> is required");
        process::exit(1);
    });

    let snapshot = load_snapshot(&path);
    let universe = snapshot.universe();
    if opts.format == "json" {
        print_json(&universe);
    } else {
        println!("Base: {}", snapshot.base());
        let codes: Vec<&str> = universe.codes().map(|c| c.as_str()).collect();
        println!("{} currencies: {}", codes.len(), codes.join(", "));
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "price" => cmd_price(rest),
        "simulate" => cmd_simulate(rest),
        "analyze" => cmd_analyze(rest),
        "currencies" => cmd_currencies(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
