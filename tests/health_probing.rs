//! Background probing feeding dispatch ranking.

mod common;

use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use switchyard::config::SwitchyardConfig;
use switchyard::health::HealthTier;
use tokio_util::sync::CancellationToken;

fn probing_config() -> SwitchyardConfig {
    let mut config = test_config();
    config.health_check.interval_seconds = 1;
    config.health_check.window_size = 10;
    config.health_check.min_sample_size = 5;
    config
}

#[tokio::test(start_paused = true)]
async fn failing_probes_rank_provider_out() {
    let p1 = Arc::new(ScriptedProvider::healthy("p1"));
    let p2 = Arc::new(ScriptedProvider::healthy("p2"));
    p1.set_probe_healthy(false);
    let d = dispatcher(vec![entry(&p1, 1), entry(&p2, 2)], &probing_config());

    let token = CancellationToken::new();
    let handle = Arc::clone(d.checker()).start(token.clone());
    tokio::time::sleep(Duration::from_millis(6_500)).await;

    assert!(p1.probes.load(Ordering::SeqCst) >= 5);
    assert_eq!(d.monitor().health_tier("p1"), HealthTier::Unhealthy);
    assert_eq!(d.monitor().health_tier("p2"), HealthTier::Excellent);

    let response = d
        .dispatch(MODEL, user_request("hi"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.first_text().as_deref(), Some("p2"));
    assert_eq!(p1.calls(), 0);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn recovered_probes_restore_priority() {
    let p1 = Arc::new(ScriptedProvider::healthy("p1"));
    let p2 = Arc::new(ScriptedProvider::healthy("p2"));
    p1.set_probe_healthy(false);
    let d = dispatcher(vec![entry(&p1, 1), entry(&p2, 2)], &probing_config());

    let token = CancellationToken::new();
    let handle = Arc::clone(d.checker()).start(token.clone());
    tokio::time::sleep(Duration::from_millis(6_500)).await;
    assert_eq!(d.monitor().health_tier("p1"), HealthTier::Unhealthy);

    // A full window of healthy probes replaces the failures.
    p1.set_probe_healthy(true);
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(d.monitor().health_tier("p1"), HealthTier::Excellent);

    let response = d
        .dispatch(MODEL, user_request("hi"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.first_text().as_deref(), Some("p1"));

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn disabled_provider_is_never_probed() {
    let p1 = Arc::new(ScriptedProvider::healthy("p1"));
    let off = Arc::new(ScriptedProvider::healthy("off"));
    let d = dispatcher(
        vec![entry(&p1, 1), entry_with(&off, |desc| desc.enabled = false)],
        &probing_config(),
    );

    let report = d.trigger_health_check().await;

    assert_eq!(p1.probes.load(Ordering::SeqCst), 1);
    assert_eq!(off.probes.load(Ordering::SeqCst), 0);
    assert_eq!(report["p1"].metrics.total_requests, 1);
    assert_eq!(report["off"].metrics.total_requests, 0);
    assert!(!report["off"].enabled);
}
