use async_trait::async_trait;
use georemind_core::{
    ArrivalOutcome, ArrivalResolver, CollectingDispatcher, GeofenceEvent, GeofenceTransition,
    IgnoreReason, LogDispatcher, NotificationPayload, ReminderCore, ReminderDataSource, ReminderRecord,
    RepoError, RepoResult, ResolutionSummary,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory source that counts lookups and can fail or panic per id.
/// With `lookup_delay` set, each lookup sleeps and the peak number of
/// overlapping lookups is recorded.
#[derive(Default)]
struct FakeSource {
    reminders: Mutex<HashMap<String, ReminderRecord>>,
    broken_ids: Vec<&'static str>,
    panicking_ids: Vec<&'static str>,
    lookup_delay: Option<Duration>,
    lookups: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeSource {
    fn with(records: Vec<ReminderRecord>) -> Self {
        let source = Self::default();
        {
            let mut map = source.reminders.lock().unwrap();
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        source
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReminderDataSource for FakeSource {
    async fn get_reminders(&self) -> RepoResult<Vec<ReminderRecord>> {
        Ok(self.reminders.lock().unwrap().values().cloned().collect())
    }

    async fn save_reminder(&self, reminder: ReminderRecord) -> RepoResult<()> {
        self.reminders
            .lock()
            .unwrap()
            .insert(reminder.id.clone(), reminder);
        Ok(())
    }

    async fn get_reminder(&self, id: &str) -> RepoResult<ReminderRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        if self.panicking_ids.iter().any(|candidate| *candidate == id) {
            panic!("lookup exploded for {id}");
        }
        if self.broken_ids.iter().any(|candidate| *candidate == id) {
            return Err(RepoError::Store("disk I/O error".to_string()));
        }
        self.reminders
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn delete_all_reminders(&self) -> RepoResult<()> {
        self.reminders.lock().unwrap().clear();
        Ok(())
    }
}

fn milk() -> ReminderRecord {
    ReminderRecord::with_id(
        "r1",
        "Buy milk",
        "2% milk",
        "Corner Store",
        Some(40.0),
        Some(-73.0),
    )
}

fn resolver(
    source: FakeSource,
) -> (
    ArrivalResolver<FakeSource, CollectingDispatcher>,
    Arc<FakeSource>,
    Arc<CollectingDispatcher>,
) {
    let source = Arc::new(source);
    let dispatcher = Arc::new(CollectingDispatcher::new());
    let resolver = ArrivalResolver::new(Arc::clone(&source), Arc::clone(&dispatcher), 2);
    (resolver, source, dispatcher)
}

#[tokio::test]
async fn single_arrival_dispatches_full_payload() {
    let (resolver, _, dispatcher) = resolver(FakeSource::with(vec![milk()]));

    let outcome = resolver.handle_event(&GeofenceEvent::entered(["r1"])).await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Resolved(ResolutionSummary {
            dispatched: 1,
            missing: 0,
            failed: 0,
        })
    );
    assert_eq!(
        dispatcher.drain(),
        vec![NotificationPayload {
            title: "Buy milk".to_string(),
            description: "2% milk".to_string(),
            location_label: "Corner Store".to_string(),
            latitude: Some(40.0),
            longitude: Some(-73.0),
            id: "r1".to_string(),
        }]
    );
}

#[tokio::test]
async fn missing_reminder_on_empty_store_dispatches_nothing() {
    let (resolver, source, dispatcher) = resolver(FakeSource::default());

    let outcome = resolver
        .handle_event(&GeofenceEvent::entered(["missing-id"]))
        .await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Resolved(ResolutionSummary {
            dispatched: 0,
            missing: 1,
            failed: 0,
        })
    );
    assert_eq!(source.lookups(), 1);
    assert!(dispatcher.is_empty());
}

#[tokio::test]
async fn partial_batch_dispatches_only_present_reminder() {
    let mut present = milk();
    present.id = "id-present".to_string();
    let (resolver, _, dispatcher) = resolver(FakeSource::with(vec![present.clone()]));

    let outcome = resolver
        .handle_event(&GeofenceEvent::entered(["id-present", "id-missing"]))
        .await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Resolved(ResolutionSummary {
            dispatched: 1,
            missing: 1,
            failed: 0,
        })
    );
    assert_eq!(dispatcher.drain(), vec![NotificationPayload::from(present)]);
}

#[tokio::test]
async fn error_flagged_event_skips_lookup_and_dispatch() {
    let (resolver, source, dispatcher) = resolver(FakeSource::with(vec![milk()]));
    let mut event = GeofenceEvent::failed(1000);
    event.triggered_region_ids = vec!["r1".to_string()];

    let outcome = resolver.handle_event(&event).await;

    assert_eq!(
        outcome,
        ArrivalOutcome::UpstreamError {
            error_code: Some(1000)
        }
    );
    assert_eq!(source.lookups(), 0);
    assert!(dispatcher.is_empty());
}

#[tokio::test]
async fn exit_and_dwell_transitions_are_ignored() {
    let (resolver, source, dispatcher) = resolver(FakeSource::with(vec![milk()]));

    for transition in [GeofenceTransition::Exit, GeofenceTransition::Dwell] {
        let outcome = resolver
            .handle_event(&GeofenceEvent::transition(transition, ["r1"]))
            .await;
        assert_eq!(
            outcome,
            ArrivalOutcome::Ignored(IgnoreReason::UnhandledTransition(transition))
        );
    }
    assert_eq!(source.lookups(), 0);
    assert!(dispatcher.is_empty());
}

#[tokio::test]
async fn foreign_action_is_ignored() {
    let (resolver, source, _) = resolver(FakeSource::with(vec![milk()]));
    let mut event = GeofenceEvent::entered(["r1"]);
    event.action = "BOOT_COMPLETED".to_string();

    let outcome = resolver.handle_event(&event).await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Ignored(IgnoreReason::UnknownAction("BOOT_COMPLETED".to_string()))
    );
    assert_eq!(source.lookups(), 0);
}

#[tokio::test]
async fn empty_region_list_reports_no_data() {
    let (resolver, source, _) = resolver(FakeSource::with(vec![milk()]));

    let outcome = resolver
        .handle_event(&GeofenceEvent::entered(Vec::<String>::new()))
        .await;

    assert_eq!(outcome, ArrivalOutcome::NoData);
    assert_eq!(source.lookups(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn store_failure_and_panic_do_not_block_siblings() {
    let mut second = milk();
    second.id = "r2".to_string();
    let source = FakeSource {
        broken_ids: vec!["broken"],
        panicking_ids: vec!["boom"],
        ..FakeSource::with(vec![milk(), second])
    };
    let (resolver, source, dispatcher) = resolver(source);

    let outcome = resolver
        .handle_event(&GeofenceEvent::entered(["broken", "r1", "boom", "r2"]))
        .await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Resolved(ResolutionSummary {
            dispatched: 2,
            missing: 0,
            failed: 2,
        })
    );
    assert_eq!(source.lookups(), 4);
    let mut ids: Vec<String> = dispatcher.drain().into_iter().map(|p| p.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["r1", "r2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lookups_never_exceed_the_concurrency_bound() {
    let ids: Vec<String> = (0..8).map(|n| format!("r{n}")).collect();
    let records = ids
        .iter()
        .map(|id| ReminderRecord::with_id(id.as_str(), "Errand", "x", "Shop", Some(1.0), Some(2.0)))
        .collect();
    let source = FakeSource {
        lookup_delay: Some(Duration::from_millis(20)),
        ..FakeSource::with(records)
    };
    let (resolver, source, dispatcher) = resolver(source);

    let outcome = resolver.handle_event(&GeofenceEvent::entered(ids)).await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Resolved(ResolutionSummary {
            dispatched: 8,
            missing: 0,
            failed: 0,
        })
    );
    assert_eq!(source.lookups(), 8);
    assert!(
        source.peak_in_flight() <= 2,
        "peak of {} overlapping lookups exceeds the bound of 2",
        source.peak_in_flight()
    );
    assert!(source.peak_in_flight() >= 1);
    assert_eq!(dispatcher.len(), 8);
}

#[tokio::test]
async fn log_dispatcher_receives_resolved_arrivals() {
    let source = Arc::new(FakeSource::with(vec![milk()]));
    let resolver = ArrivalResolver::new(Arc::clone(&source), Arc::new(LogDispatcher), 1);

    let outcome = resolver
        .handle_event(&GeofenceEvent::entered(["r1", "gone"]))
        .await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Resolved(ResolutionSummary {
            dispatched: 1,
            missing: 1,
            failed: 0,
        })
    );
    assert_eq!(source.lookups(), 2);
}

#[tokio::test]
async fn event_json_wire_format_drives_sqlite_backed_resolver() {
    let core = ReminderCore::open_in_memory(4).unwrap();
    core.service()
        .validate_and_save(georemind_core::ReminderDraft {
            id: Some("r1".to_string()),
            title: Some("Buy milk".to_string()),
            description: Some("2% milk".to_string()),
            location_label: Some("Corner Store".to_string()),
            latitude: Some(40.0),
            longitude: Some(-73.0),
        })
        .await
        .unwrap();
    let dispatcher = Arc::new(CollectingDispatcher::new());
    let resolver = core.resolver(Arc::clone(&dispatcher));

    let event: GeofenceEvent = serde_json::from_str(
        r#"{
            "action": "GEOFENCE_EVENT",
            "hasError": false,
            "errorCode": null,
            "transitionType": "ENTER",
            "triggeredRegionIds": ["r1", "gone"]
        }"#,
    )
    .unwrap();
    let outcome = resolver.handle_event(&event).await;

    assert_eq!(
        outcome,
        ArrivalOutcome::Resolved(ResolutionSummary {
            dispatched: 1,
            missing: 1,
            failed: 0,
        })
    );
    assert_eq!(dispatcher.drain(), vec![NotificationPayload::from(milk())]);
}
