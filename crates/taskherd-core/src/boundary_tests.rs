use super::*;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskherd_protocols::{job_fn, NoopAlertSink};

#[derive(Default)]
struct RecordingSink {
    alerts: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn alert(&self, summary: &str) -> Result<(), AlertError> {
        self.alerts.lock().push(summary.to_string());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl AlertSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn alert(&self, _summary: &str) -> Result<(), AlertError> {
        Err(AlertError::Delivery("503 Service Unavailable".to_string()))
    }
}

struct PanickingSink;

#[async_trait]
impl AlertSink for PanickingSink {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn alert(&self, _summary: &str) -> Result<(), AlertError> {
        panic!("alert client blew up");
    }
}

struct SlowSink;

#[async_trait]
impl AlertSink for SlowSink {
    fn name(&self) -> &str {
        "slow"
    }

    async fn alert(&self, _summary: &str) -> Result<(), AlertError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

fn production() -> FaultBoundaryConfig {
    FaultBoundaryConfig::new("production", true)
}

fn boundary_with(config: FaultBoundaryConfig, sink: Arc<dyn AlertSink>) -> FaultBoundary {
    FaultBoundary::new(config, sink)
}

fn failing_body() -> Arc<dyn JobBody> {
    job_fn(|| async {
        Err(anyhow::anyhow!("connection refused").context("fetching newsfeed"))
    })
}

#[tokio::test]
async fn test_execute_success() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));
    let body = job_fn(|| async { Ok(()) });

    let outcome = boundary.execute("Heartbeat", body.as_ref()).await;
    assert!(outcome.is_success());

    let stats = boundary.stats("Heartbeat").unwrap();
    assert_eq!(stats.fires, 1);
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.last_state, Some(InvocationState::Succeeded));
    assert!(stats.last_failure.is_none());
    assert_eq!(boundary.total_failures(), 0);
}

#[tokio::test]
async fn test_execute_error_is_caught() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));
    let body = failing_body();

    let outcome = boundary.execute("NewsfeedTask", body.as_ref()).await;
    let FireOutcome::Caught(record) = outcome else {
        panic!("expected a caught failure");
    };
    assert_eq!(record.phase, FailurePhase::Execution);
    assert_eq!(record.job_identity, "NewsfeedTask");
    assert!(record.cause.contains("fetching newsfeed"));
    assert_eq!(record.causal_trace.last().unwrap(), "connection refused");

    let stats = boundary.stats("NewsfeedTask").unwrap();
    assert_eq!(stats.last_state, Some(InvocationState::Caught));
    assert_eq!(stats.failures, 1);
}

#[tokio::test]
async fn test_execute_panic_is_caught() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));
    let body = job_fn(|| async {
        if true {
            panic!("index out of bounds");
        }
        Ok(())
    });

    let outcome = boundary.execute("Broken", body.as_ref()).await;
    let FireOutcome::Caught(record) = outcome else {
        panic!("expected a caught failure");
    };
    assert!(record.cause.contains("panicked"));
    assert!(record.cause.contains("index out of bounds"));
}

#[tokio::test]
async fn test_failure_recorded_once_per_fire() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));
    let body = failing_body();

    for _ in 0..3 {
        let outcome = boundary.execute("NewsfeedTask", body.as_ref()).await;
        let FireOutcome::Caught(record) = outcome else {
            panic!("expected a caught failure");
        };
        assert_eq!(record.causal_trace, vec!["fetching newsfeed", "connection refused"]);
    }

    let stats = boundary.stats("NewsfeedTask").unwrap();
    assert_eq!(stats.fires, 3);
    assert_eq!(stats.failures, 3);
    assert_eq!(boundary.total_failures(), 3);
}

#[tokio::test]
async fn test_next_fire_starts_fresh() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));
    let calls = Arc::new(AtomicU64::new(0));
    let counter = calls.clone();
    let flaky = job_fn(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                anyhow::bail!("first fire fails");
            }
            Ok(())
        }
    });

    assert!(!boundary.execute("Flaky", flaky.as_ref()).await.is_success());
    assert!(boundary.execute("Flaky", flaky.as_ref()).await.is_success());

    let stats = boundary.stats("Flaky").unwrap();
    assert_eq!(stats.last_state, Some(InvocationState::Succeeded));
    assert_eq!(stats.failures, 1);
}

#[tokio::test]
async fn test_alert_only_in_production() {
    let sink = Arc::new(RecordingSink::default());
    let body = failing_body();

    let dev = boundary_with(FaultBoundaryConfig::new("development", false), sink.clone());
    dev.execute("NewsfeedTask", body.as_ref()).await;
    assert!(sink.alerts().is_empty());

    let prod = boundary_with(production(), sink.clone());
    prod.execute("NewsfeedTask", body.as_ref()).await;
    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("[production] job NewsfeedTask failed during execution"));
    assert!(alerts[0].contains("root cause: connection refused"));
}

#[tokio::test]
async fn test_failing_alert_does_not_mask_failure() {
    let boundary = boundary_with(production(), Arc::new(FailingSink));
    let outcome = boundary.execute("NewsfeedTask", failing_body().as_ref()).await;
    assert!(matches!(outcome, FireOutcome::Caught(ref r) if r.cause.contains("fetching newsfeed")));
}

#[tokio::test]
async fn test_panicking_alert_sink_is_contained() {
    let boundary = boundary_with(production(), Arc::new(PanickingSink));
    let outcome = boundary.execute("NewsfeedTask", failing_body().as_ref()).await;
    assert!(!outcome.is_success());

    let err = deliver_alert(&PanickingSink, "x", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::Panicked(ref m) if m.contains("blew up")));
}

#[tokio::test(start_paused = true)]
async fn test_slow_alert_times_out() {
    let err = deliver_alert(&SlowSink, "x", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::Timeout(d) if d == Duration::from_secs(5)));
}

#[test]
fn test_contain_discovery_panic() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));
    let err = boundary
        .contain_discovery("Broken", "jobs/broken.toml", || panic!("bad manifest"))
        .unwrap_err();

    assert_eq!(err.identity_guess, "Broken");
    assert_eq!(err.source_location, "jobs/broken.toml");
    assert!(matches!(err.cause, DiscoveryCause::Panicked(ref m) if m == "bad manifest"));
    assert_eq!(boundary.total_failures(), 1);
}

#[test]
fn test_contain_discovery_passes_through_success() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));
    let job = boundary
        .contain_discovery("Heartbeat", "heartbeat", || {
            Ok(JobDescriptor::new(
                "Heartbeat",
                "heartbeat",
                "every 1m",
                job_fn(|| async { Ok(()) }),
            ))
        })
        .unwrap();
    assert_eq!(job.identity(), "Heartbeat");
    assert_eq!(boundary.total_failures(), 0);
}

#[tokio::test]
async fn test_discovery_alert_requires_flag() {
    let sink = Arc::new(RecordingSink::default());
    let err = DiscoveryError::new("Broken", "jobs/broken.toml", DiscoveryCause::Unresolved);

    let quiet = boundary_with(production(), sink.clone());
    quiet.record_discovery_failure(&err);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(sink.alerts().is_empty());

    let mut config = production();
    config.alert_on_discovery_failure = true;
    let loud = boundary_with(config, sink.clone());
    let record = loud.record_discovery_failure(&err);
    assert_eq!(record.phase, FailurePhase::Discovery);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("failed during discovery"));
}

#[test]
fn test_contain_registration() {
    let boundary = boundary_with(FaultBoundaryConfig::default(), Arc::new(NoopAlertSink));

    let ok: Result<u32, _> = boundary.contain_registration("Report", || Ok(7));
    assert_eq!(ok.unwrap(), 7);

    let err = boundary
        .contain_registration::<u32, _>("Report", || {
            Err(RegistrationError::InvalidRecurrence {
                job_id: "Report".to_string(),
                rule: "every banana".to_string(),
                reason: "unknown unit".to_string(),
            })
        })
        .unwrap_err();
    assert_eq!(err.job_id(), "Report");

    let panicked = boundary
        .contain_registration::<u32, _>("Other", || panic!("engine bug"))
        .unwrap_err();
    assert!(matches!(panicked, RegistrationError::Panicked { ref message, .. } if message == "engine bug"));
    assert_eq!(boundary.total_failures(), 2);
}

#[tokio::test]
async fn test_failure_hook_records_and_alerts() {
    let sink = Arc::new(RecordingSink::default());
    let boundary = boundary_with(production(), sink.clone());

    boundary.on_job_failure("Report", "fire task aborted");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let stats = boundary.stats("Report").unwrap();
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.last_state, Some(InvocationState::Caught));
    assert_eq!(sink.alerts().len(), 1);
    assert!(sink.alerts()[0].contains("fire task aborted"));
}

#[test]
fn test_panic_message() {
    let payload: Box<dyn Any + Send> = Box::new("static str");
    assert_eq!(panic_message(payload.as_ref()), "static str");
    let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
    assert_eq!(panic_message(payload.as_ref()), "owned");
    let payload: Box<dyn Any + Send> = Box::new(42_u8);
    assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
}
