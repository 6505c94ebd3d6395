//! nomin-engine CLI
//!
//! Exercise the issuance engine from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Walk through a scripted multi-issuer scenario
//! nomin-engine demo
//!
//! # Run a randomized scenario under moving rates
//! nomin-engine simulate --issuers 10 --actions 100 --seed 7
//!
//! # Output as JSON
//! nomin-engine simulate --format json
//! ```

use chrono::Utc;
use nomin_engine::core::account::AccountId;
use nomin_engine::core::currency::CurrencyKey;
use nomin_engine::core::fixed::Wad;
use nomin_engine::engine::NominEngine;
use nomin_engine::simulation::scenario::{run_scenario, ScenarioConfig};
use nomin_engine::token::ledger::TokenLedger;
use std::process;

fn print_usage() {
    eprintln!(
        r#"nomin-engine — multi-currency synthetic token issuance engine

USAGE:
    nomin-engine <COMMAND> [OPTIONS]

COMMANDS:
    demo        Walk through a scripted multi-issuer scenario
    simulate    Run a randomized issuance scenario under moving rates
    help        Show this message

OPTIONS (simulate):
    --issuers <N>     Number of issuer accounts (default: 10)
    --actions <N>     Number of issue/burn actions (default: 100)
    --seed <N>        RNG seed (default: 42)
    --format <FORMAT> Output format: text (default) or json

EXAMPLES:
    nomin-engine demo
    nomin-engine simulate --issuers 20 --actions 500
    nomin-engine simulate --seed 7 --format json"#
    );
}

fn cmd_demo() {
    let owner = AccountId::new("owner");
    let alice = AccountId::new("alice");
    let bob = AccountId::new("bob");
    let nusd = CurrencyKey::new("nUSD");
    let naud = CurrencyKey::new("nAUD");

    let mut engine = NominEngine::new(owner.clone(), Wad::from_int(1_000_000));
    let result = (|| -> Result<(), nomin_engine::engine::EngineError> {
        engine.add_nomin(&owner, TokenLedger::new(nusd, "Nomin USD"))?;
        engine.add_nomin(&owner, TokenLedger::new(naud, "Nomin AUD"))?;
        let collateral_key = engine.collateral_key();
        engine.rates_mut().update_rates(
            &[
                (nusd, Wad::ONE),
                (naud, Wad::from_raw(Wad::UNIT / 2)),
                (collateral_key, Wad::from_raw(Wad::UNIT / 10)),
            ],
            Utc::now(),
        );

        engine.transfer_collateral(&owner, &alice, Wad::from_int(10_000))?;
        engine.transfer_collateral(&owner, &bob, Wad::from_int(10_000))?;
        engine.set_issuer(&owner, &alice, true)?;
        engine.set_issuer(&owner, &bob, true)?;

        println!("Collateral: 10,000 HAV each for alice and bob, ratio 0.2\n");

        engine.issue(&alice, nusd, Wad::from_int(10))?;
        println!("alice issues 10 nUSD");
        println!(
            "  alice debt: {} nUSD (sole issuer of the pool)",
            engine.debt_balance_of(&alice, nusd)?
        );

        engine.issue(&bob, naud, Wad::from_int(40))?;
        println!("bob issues 40 nAUD (worth 20 nUSD)");
        println!(
            "  alice debt: {} nUSD (diluted to a third of the pool)",
            engine.debt_balance_of(&alice, nusd)?
        );
        println!("  bob debt:   {} nUSD", engine.debt_balance_of(&bob, nusd)?);
        println!("  pool total: {} nUSD", engine.total_issued(nusd)?);

        let burned = engine.burn(&alice, nusd, Wad::from_int(999))?;
        println!("\nalice burns (clamped to her debt): {} nUSD", burned);
        println!(
            "  alice debt: {} nUSD",
            engine.debt_balance_of(&alice, nusd)?
        );
        println!("  bob debt:   {} nUSD", engine.debt_balance_of(&bob, nusd)?);

        println!(
            "\nbob transferable collateral: {} HAV (rest locked against debt)",
            engine.transferable_collateral(&bob)?
        );
        println!(
            "debt ledger entries: {}",
            engine.accounting().ledger().len()
        );
        Ok(())
    })();

    if let Err(e) = result {
        eprintln!("Demo failed: {}", e);
        process::exit(1);
    }
}

fn cmd_simulate(args: &[String]) {
    let mut config = ScenarioConfig::default();
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--issuers" => {
                i += 1;
                config.issuer_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--issuers requires a number");
                        process::exit(1);
                    });
            }
            "--actions" => {
                i += 1;
                config.actions = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--actions requires a number");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                let seed = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--seed requires a number");
                        process::exit(1);
                    });
                config.seed = seed;
                config.volatility.seed = seed;
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }
    config.volatility.steps = config.actions;

    let result = run_scenario(&config).unwrap_or_else(|e| {
        eprintln!("Simulation failed: {}", e);
        process::exit(1);
    });

    if format == "json" {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Randomized issuance scenario");
        println!("  issuers:           {}", config.issuer_count);
        println!(
            "  actions:           {} attempted, {} succeeded",
            result.actions_attempted, result.actions_succeeded
        );
        println!("  final pool debt:   {} nUSD", result.final_total_debt);
        println!("  sum of balances:   {} nUSD", result.sum_of_balances);
        println!("  truncation residue: {} raw units", result.residue_raw);
        println!("  debt ledger entries: {}", result.ledger_entries);
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
        "demo" => cmd_demo(),
        "simulate" => cmd_simulate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
