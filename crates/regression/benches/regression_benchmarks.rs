//! Benchmarks for empirica-regression operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use empirica_primitives::{Observation, Panel, Period, Symbol};
use empirica_regression::{FamaMacBeth, FamaMacBethConfig};
use rand_distr::{Distribution, Normal};

fn random_panel(n_assets: usize, n_periods: i64) -> Panel {
    let mut rng = rand::thread_rng();
    let dist = Normal::new(0.0, 1.0).unwrap();
    let mut obs = Vec::with_capacity(n_assets * n_periods as usize);
    for t in 0..n_periods {
        for a in 0..n_assets {
            let x: Vec<f64> = (0..3).map(|_| dist.sample(&mut rng)).collect();
            let ret = 0.01 * x[0] + 0.02 * dist.sample(&mut rng);
            obs.push(Observation::new(Symbol::new(format!("S{a:05}")), Period::new(t), x, ret));
        }
    }
    Panel::new(vec!["beta".to_string(), "size".to_string(), "bm".to_string()], obs).unwrap()
}

fn bench_fama_macbeth(c: &mut Criterion) {
    let mut group = c.benchmark_group("fama_macbeth");
    let fmb = FamaMacBeth::with_config(FamaMacBethConfig::new(["beta", "size", "bm"])).unwrap();

    for n_assets in [500, 2000, 5000] {
        let panel = random_panel(n_assets, 120);
        group.bench_with_input(BenchmarkId::from_parameter(n_assets), &panel, |b, panel| {
            b.iter(|| fmb.fit(black_box(panel)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fama_macbeth);
criterion_main!(benches);
