//! Tests for configuration validation.
//!
//! Invalid settings must be rejected with a `Configuration` error before any
//! sampling or computation happens.

use samplecheck::{BootstrapConfig, BootstrapTwoSampleTest, Criterion, ErrorKind, RunConfig};
use samplecheck_core::ConfigError;

// =============================================================================
// RUN CONFIG
// =============================================================================

#[test]
fn run_config_defaults() {
    let config = RunConfig::default();
    assert_eq!(config.alpha, 1e-3);
    assert_eq!(config.n_samples, 1000);
    assert_eq!(config.print_every, Some(100));
    assert!(config.validate().is_ok());
}

#[test]
fn alpha_bounds_are_exclusive() {
    for alpha in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
        let err = RunConfig::new().alpha(alpha).validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::AlphaOutOfRange(_)),
            "alpha {alpha} gave {err:?}"
        );
    }
    assert!(RunConfig::new().alpha(0.05).validate().is_ok());
}

#[test]
fn n_samples_minimum() {
    assert_eq!(
        RunConfig::new().n_samples(1).validate(),
        Err(ConfigError::TooFewSamples { min: 2, actual: 1 })
    );
    assert!(RunConfig::new().n_samples(2).validate().is_ok());
}

#[test]
fn print_every_zero_rejected() {
    assert_eq!(
        RunConfig::new().print_every(Some(0)).validate(),
        Err(ConfigError::InvalidPrintEvery)
    );
    assert!(RunConfig::new().print_every(None).validate().is_ok());
}

// =============================================================================
// BOOTSTRAP CONFIG
// =============================================================================

#[test]
fn bootstrap_defaults() {
    let config = BootstrapConfig::default();
    assert_eq!(config.n_boots, 1000);
    assert_eq!(config.criterion, Criterion::Ks);
    assert_eq!(config.print_every, Some(100));
}

#[test]
fn bootstrap_needs_two_resamples() {
    for n_boots in [0, 1] {
        let err = BootstrapTwoSampleTest::new(BootstrapConfig::new().n_boots(n_boots)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
    assert!(BootstrapTwoSampleTest::new(BootstrapConfig::new().n_boots(2)).is_ok());
}

#[test]
fn criterion_names_are_case_insensitive() {
    assert_eq!("Cvm".parse::<Criterion>(), Ok(Criterion::Cvm));
    assert_eq!("ks".parse::<Criterion>(), Ok(Criterion::Ks));
    assert!(matches!(
        "anderson".parse::<Criterion>(),
        Err(ConfigError::UnknownCriterion(name)) if name == "anderson"
    ));
}
