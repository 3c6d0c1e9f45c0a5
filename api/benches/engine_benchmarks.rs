//! Benchmarks for the confidential engine
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;

use equity_vault_api::chain::ChainCall;
use equity_vault_api::engine::{ConfidentialEngine, EngineConfig, ProofScheme};

fn runtime() -> Runtime {
    Runtime::new().expect("tokio runtime")
}

fn bench_encrypt_decrypt(c: &mut Criterion) {
    let rt = runtime();
    let engine = ConfidentialEngine::new(&EngineConfig::default());
    let value = rt.block_on(engine.encrypt(1000.0)).unwrap();

    c.bench_function("encrypt (keccak attestation)", |b| {
        b.to_async(&rt).iter(|| async { engine.encrypt(1000.0).await.unwrap() });
    });

    c.bench_function("decrypt", |b| {
        b.to_async(&rt).iter(|| async { engine.decrypt(&value).await.unwrap() });
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let rt = runtime();
    let engine = ConfidentialEngine::new(&EngineConfig::default());
    let a = rt.block_on(engine.encrypt(1000.0)).unwrap();
    let b_value = rt.block_on(engine.encrypt(250.0)).unwrap();

    c.bench_function("add", |b| {
        b.to_async(&rt).iter(|| async { engine.add(&a, &b_value).await.unwrap() });
    });

    c.bench_function("multiply", |b| {
        b.to_async(&rt).iter(|| async { engine.multiply(&a, 0.01).await.unwrap() });
    });
}

fn bench_proofs(c: &mut Criterion) {
    let rt = runtime();

    for scheme in [ProofScheme::Keccak, ProofScheme::Random] {
        let engine = ConfidentialEngine::new(&EngineConfig {
            proof_scheme: scheme,
            ..Default::default()
        });
        let value = rt.block_on(engine.encrypt(500.0)).unwrap();

        c.bench_function(&format!("verify_proof ({})", scheme), |b| {
            b.to_async(&rt)
                .iter(|| async { engine.verify_proof(&value, value.proof()).await });
        });
    }
}

fn bench_calldata(c: &mut Criterion) {
    let rt = runtime();
    let engine = ConfidentialEngine::new(&EngineConfig::default());
    let total = rt.block_on(engine.encrypt(1_000_000.0)).unwrap();
    let rate = rt.block_on(engine.encrypt(5.5)).unwrap();

    c.bench_function("attest + encode createLendingPool", |b| {
        b.to_async(&rt).iter(|| async {
            let call = ChainCall::new("createLendingPool")
                .confidential(engine.attest(&total).await.unwrap())
                .confidential(engine.attest(&rate).await.unwrap())
                .input_proof();
            call.encode().unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_encrypt_decrypt,
    bench_arithmetic,
    bench_proofs,
    bench_calldata
);
criterion_main!(benches);
