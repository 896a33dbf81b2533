use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ingstocks_market_data::{Endpoint, FetchCause, InstrumentRecord, Isin, MarketDataError};
use serde_json::json;

use super::*;
use crate::errors::{Error, SetupError};
use crate::test_support::{header_500, FakeSource};

fn isin() -> Isin {
    Isin::parse("DE0007164600").unwrap()
}

fn poller(source: Arc<FakeSource>) -> Arc<Poller> {
    Arc::new(Poller::new(isin(), Duration::from_secs(60), source))
}

#[tokio::test]
async fn test_initial_state() {
    let poller = poller(FakeSource::new(json!({ "price": 1.0 })));

    let snapshot = poller.snapshot();
    assert!(snapshot.record.is_none());
    assert!(!snapshot.last_refresh_success);
    assert_eq!(poller.last_error(), None);
    assert_eq!(poller.last_success_at(), None);
}

#[tokio::test]
async fn test_refresh_publishes_and_notifies() {
    let source = FakeSource::new(json!({ "price": 182.46, "name": "SAP SE" }));
    let poller = poller(source);
    let listener = CollectingListener::new();
    poller.attach(Arc::new(listener.clone()));

    let record = poller.refresh().await.unwrap();

    assert_eq!(record.price, Some(182.46));
    assert!(poller.last_refresh_success());
    assert!(poller.last_success_at().is_some());
    assert_eq!(listener.len(), 1);
    assert!(Arc::ptr_eq(&listener.records()[0], &record));
    assert!(Arc::ptr_eq(&poller.record().unwrap(), &record));
}

#[tokio::test]
async fn test_closure_listener() {
    let poller = poller(FakeSource::new(json!({ "price": 1.0 })));
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    poller.attach(Arc::new(move |_: &Arc<InstrumentRecord>| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    poller.refresh().await.unwrap();
    poller.refresh().await.unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_keeps_previous_record() {
    let source = FakeSource::new(json!({ "price": 10.0 }));
    let poller = poller(source.clone());
    let listener = CollectingListener::new();
    poller.attach(Arc::new(listener.clone()));
    let first = poller.refresh().await.unwrap();

    source.set_header(Err(header_500()));
    let err = poller.refresh().await.unwrap_err();

    assert_eq!(err.to_string(), "instrumentheader HTTP 500");
    let snapshot = poller.snapshot();
    assert!(!snapshot.last_refresh_success);
    assert!(Arc::ptr_eq(&snapshot.record.unwrap(), &first));
    assert_eq!(poller.last_error().as_deref(), Some("instrumentheader HTTP 500"));
    assert_eq!(listener.len(), 1);
}

#[tokio::test]
async fn test_missing_price_fails_cycle() {
    let source = FakeSource::new(json!({ "price": 10.0 }));
    let poller = poller(source.clone());
    poller.refresh().await.unwrap();

    source.set_header(Ok(json!({ "name": "SAP SE", "price": null })));
    let err = poller.refresh().await.unwrap_err();

    assert_eq!(err.to_string(), "No price in instrumentheader for DE0007164600");
    assert!(!poller.last_refresh_success());
    assert_eq!(poller.record().unwrap().price, Some(10.0));
}

#[tokio::test]
async fn test_key_figures_failure_fails_cycle() {
    let source = FakeSource::new(json!({ "price": 10.0 }));
    source.set_key_figures(Err(MarketDataError::FetchFailed {
        endpoint: Endpoint::KeyFigures,
        cause: FetchCause::Timeout,
    }));
    let poller = poller(source);

    let err = poller.refresh().await.unwrap_err();

    assert_eq!(err.to_string(), "keyfigures timed out");
    assert!(poller.record().is_none());
}

#[tokio::test]
async fn test_recovery_clears_error() {
    let source = FakeSource::new(json!({ "price": 10.0 }));
    source.set_header(Err(header_500()));
    let poller = poller(source.clone());
    assert!(poller.refresh().await.is_err());

    source.set_header(Ok(json!({ "price": 11.0 })));
    poller.refresh().await.unwrap();

    assert!(poller.last_refresh_success());
    assert_eq!(poller.last_error(), None);
}

#[tokio::test]
async fn test_detach_stops_notifications() {
    let poller = poller(FakeSource::new(json!({ "price": 1.0 })));
    let listener = CollectingListener::new();
    let id = poller.attach(Arc::new(listener.clone()));

    poller.refresh().await.unwrap();
    assert!(poller.detach(id));
    assert!(!poller.detach(id));
    poller.refresh().await.unwrap();

    assert_eq!(listener.len(), 1);
    assert_eq!(poller.listener_count(), 0);
}

#[tokio::test]
async fn test_first_refresh_failure_is_not_ready() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    source.set_header(Err(header_500()));
    let poller = poller(source);

    let err = poller.first_refresh().await.unwrap_err();

    assert_eq!(err, SetupError::NotReady("instrumentheader HTTP 500".to_string()));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_shutdown_discards_in_flight_result() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    let gate = source.gate();
    let poller = poller(source.clone());
    let listener = CollectingListener::new();
    poller.attach(Arc::new(listener.clone()));

    let task = {
        let poller = Arc::clone(&poller);
        tokio::spawn(async move { poller.refresh().await })
    };
    while source.calls() == 0 {
        tokio::task::yield_now().await;
    }

    poller.shutdown();
    gate.notify_one();
    let result = task.await.unwrap();

    assert!(matches!(result, Err(Error::Shutdown { .. })));
    assert!(poller.record().is_none());
    assert!(!poller.last_refresh_success());
    assert!(listener.is_empty());
}

#[tokio::test]
async fn test_refresh_after_shutdown_does_not_fetch() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    let poller = poller(source.clone());

    poller.shutdown();

    assert!(matches!(poller.refresh().await, Err(Error::Shutdown { .. })));
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_schedule_ticks_every_interval() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    let poller = poller(source.clone());
    let schedule = RefreshSchedule::spawn(Arc::clone(&poller), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(source.calls(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 1);
    assert!(poller.last_refresh_success());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls(), 2);
    assert!(schedule.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_schedule_keeps_running_after_failures() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    source.set_header(Err(header_500()));
    let poller = poller(source.clone());
    let _schedule = RefreshSchedule::spawn(Arc::clone(&poller), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(121)).await;
    assert_eq!(source.calls(), 2);

    source.set_header(Ok(json!({ "price": 2.0 })));
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(poller.record().unwrap().price, Some(2.0));
}

#[tokio::test(start_paused = true)]
async fn test_stopped_schedule_no_longer_refreshes() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    let poller = poller(source.clone());
    let schedule = RefreshSchedule::spawn(Arc::clone(&poller), Duration::from_secs(60));

    schedule.stop();
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_drops_in_flight_refresh() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    let gate = source.gate();
    let poller = poller(source.clone());
    let schedule = RefreshSchedule::spawn(Arc::clone(&poller), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(source.calls(), 1);

    schedule.stop();
    gate.notify_one();
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(source.calls(), 1);
    assert!(poller.record().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_manual_refresh_resets_ticker() {
    let source = FakeSource::new(json!({ "price": 1.0 }));
    let poller = poller(source.clone());
    let schedule = RefreshSchedule::spawn(Arc::clone(&poller), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(30)).await;
    schedule.request_refresh();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.calls(), 1);

    // Next tick is one full interval after the manual refresh.
    tokio::time::sleep(Duration::from_secs(45)).await;
    assert_eq!(source.calls(), 1);
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(source.calls(), 2);
}
