use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nomin_engine::core::account::AccountId;
use nomin_engine::core::currency::CurrencyKey;
use nomin_engine::core::fixed::Wad;
use nomin_engine::engine::NominEngine;
use nomin_engine::token::ledger::TokenLedger;

/// Build an engine with `issuer_count` accounts that have each issued,
/// so the debt ledger carries one entry per issuer.
fn engine_with_issuers(issuer_count: usize) -> (NominEngine, Vec<AccountId>) {
    let owner = AccountId::new("owner");
    let mut engine = NominEngine::new(owner.clone(), Wad::from_int(1_000_000_000));
    engine
        .add_nomin(&owner, TokenLedger::new(CurrencyKey::new("nUSD"), "Nomin USD"))
        .unwrap();
    engine.rates_mut().update_rates(
        &[
            (CurrencyKey::new("nUSD"), Wad::ONE),
            (CurrencyKey::new("HAV"), Wad::from_raw(Wad::UNIT / 10)),
        ],
        Utc::now(),
    );

    let issuers: Vec<AccountId> = (0..issuer_count)
        .map(|i| AccountId::new(format!("issuer-{:05}", i)))
        .collect();
    for issuer in &issuers {
        engine
            .transfer_collateral(&owner, issuer, Wad::from_int(100_000))
            .unwrap();
        engine.set_issuer(&owner, issuer, true).unwrap();
        engine
            .issue(issuer, CurrencyKey::new("nUSD"), Wad::from_int(1_000))
            .unwrap();
    }
    (engine, issuers)
}

fn bench_debt_query_10_issuers(c: &mut Criterion) {
    let (engine, issuers) = engine_with_issuers(10);
    let nusd = CurrencyKey::new("nUSD");
    c.bench_function("debt_balance_10_issuers", |b| {
        b.iter(|| engine.debt_balance_of(black_box(&issuers[5]), nusd).unwrap())
    });
}

fn bench_debt_query_1000_issuers(c: &mut Criterion) {
    let (engine, issuers) = engine_with_issuers(1_000);
    let nusd = CurrencyKey::new("nUSD");
    c.bench_function("debt_balance_1000_issuers", |b| {
        b.iter(|| engine.debt_balance_of(black_box(&issuers[500]), nusd).unwrap())
    });
}

fn bench_debt_query_10000_issuers(c: &mut Criterion) {
    let (engine, issuers) = engine_with_issuers(10_000);
    let nusd = CurrencyKey::new("nUSD");
    c.bench_function("debt_balance_10000_issuers", |b| {
        b.iter(|| engine.debt_balance_of(black_box(&issuers[5_000]), nusd).unwrap())
    });
}

fn bench_issue(c: &mut Criterion) {
    let (mut engine, issuers) = engine_with_issuers(1_000);
    let nusd = CurrencyKey::new("nUSD");
    c.bench_function("issue_1000_issuers", |b| {
        b.iter(|| {
            engine
                .issue(black_box(&issuers[0]), nusd, Wad::from_raw(1))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_debt_query_10_issuers,
    bench_debt_query_1000_issuers,
    bench_debt_query_10000_issuers,
    bench_issue
);
criterion_main!(benches);
