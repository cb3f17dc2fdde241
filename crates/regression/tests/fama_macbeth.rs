//! Fama-MacBeth on a synthetic panel with a planted premium.

use approx::assert_relative_eq;
use empirica_math::StandardError;
use empirica_primitives::{Observation, Panel, Period, Symbol};
use empirica_regression::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

const PREMIUM: f64 = 0.005;

/// r = PREMIUM * beta + noise; size carries no premium.
fn synthetic_panel(n_assets: usize, n_periods: i64, seed: u64) -> Panel {
    let mut rng = StdRng::seed_from_u64(seed);
    let beta_dist = Normal::new(1.0, 0.5).unwrap();
    let size_dist = Normal::new(0.0, 1.0).unwrap();
    let noise = Normal::new(0.0, 0.02).unwrap();

    let mut obs = Vec::with_capacity(n_assets * n_periods as usize);
    for t in 0..n_periods {
        for a in 0..n_assets {
            let beta = beta_dist.sample(&mut rng);
            let size = size_dist.sample(&mut rng);
            obs.push(
                Observation::new(
                    Symbol::new(format!("S{a:04}")),
                    Period::new(t),
                    vec![beta, size],
                    PREMIUM * beta + noise.sample(&mut rng),
                )
                .with_weight(size.exp()),
            );
        }
    }
    Panel::new(vec!["beta".to_string(), "size".to_string()], obs).unwrap()
}

#[test]
fn recovers_planted_premium() {
    let panel = synthetic_panel(300, 120, 42);
    let fmb = FamaMacBeth::with_config(FamaMacBethConfig::new(["beta", "size"])).unwrap();
    let result = fmb.fit(&panel).unwrap();

    assert_eq!(result.n_periods(), 120);
    assert_relative_eq!(result.coefficient("beta").unwrap(), PREMIUM, epsilon = 0.0015);
    assert!(result.t_stat("beta").unwrap() > 4.0);
    assert!(result.t_stat("size").unwrap().abs() < 4.0);
    assert_relative_eq!(result.coefficient("intercept").unwrap(), 0.0, epsilon = 0.0015);
    assert_eq!(result.lags, Some(5));
}

#[test]
fn plain_and_newey_west_agree_on_means() {
    let panel = synthetic_panel(200, 60, 7);
    let plain = FamaMacBeth::with_config(FamaMacBethConfig {
        standard_error: StandardError::Plain,
        ..FamaMacBethConfig::new(["beta"])
    })
    .unwrap()
    .fit(&panel)
    .unwrap();
    let hac = FamaMacBeth::with_config(FamaMacBethConfig::new(["beta"])).unwrap().fit(&panel).unwrap();

    assert_relative_eq!(
        plain.coefficient("beta").unwrap(),
        hac.coefficient("beta").unwrap(),
        epsilon = 1e-14
    );
    assert_eq!(plain.lags, None);
    assert_eq!(hac.lags, Some(4));
}

#[test]
fn panel_estimator_trait_object() {
    let panel = synthetic_panel(300, 60, 3);
    let estimator: Box<dyn PanelEstimator> = Box::new(
        FamaMacBeth::with_config(FamaMacBethConfig {
            winsorize: Some(0.01),
            standardize: true,
            weighted: true,
            ..FamaMacBethConfig::new(["beta", "size"])
        })
        .unwrap(),
    );

    let result = estimator.estimate(&panel).unwrap();
    assert_eq!(result.terms.len(), 3);
    assert!(result.coefficient("beta").unwrap() > 0.0);

    let table = result.to_frame().unwrap();
    assert_eq!(table.shape(), (3, 5));
}
