//! Arrival resolution: geofence "entered" events to notifications.
//!
//! # Responsibility
//! - Filter deliveries (action, upstream error, transition kind, empty list).
//! - Look up every triggered region through the repository and dispatch one
//!   notification per resolved reminder.
//!
//! # Invariants
//! - Each region id is resolved in its own task; a miss, a store failure or a
//!   panic in one never affects its siblings.
//! - At most `max_concurrent_lookups` lookups run at once.
//! - Nothing is retried and nothing is propagated to the caller; the returned
//!   outcome is informational.

use super::event::{GeofenceEvent, GeofenceTransition};
use crate::notify::dispatcher::{NotificationDispatcher, NotificationPayload};
use crate::repo::reminder_repo::{ReminderDataSource, RepoError};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Why a delivery was dropped before any lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownAction(String),
    UnhandledTransition(GeofenceTransition),
}

/// Per-event counters for resolved deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub dispatched: usize,
    /// Region ids with no matching reminder.
    pub missing: usize,
    /// Store failures and crashed lookup tasks.
    pub failed: usize,
}

/// What happened to one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalOutcome {
    Ignored(IgnoreReason),
    UpstreamError { error_code: Option<i32> },
    NoData,
    Resolved(ResolutionSummary),
}

enum RegionResolution {
    Dispatched,
    Missing,
    Failed,
}

/// Bridges geofence arrivals to the notification dispatcher.
pub struct ArrivalResolver<D, N> {
    source: Arc<D>,
    dispatcher: Arc<N>,
    lookup_permits: Arc<Semaphore>,
}

impl<D, N> ArrivalResolver<D, N>
where
    D: ReminderDataSource + 'static,
    N: NotificationDispatcher + 'static,
{
    /// `max_concurrent_lookups` is clamped to at least one.
    pub fn new(source: Arc<D>, dispatcher: Arc<N>, max_concurrent_lookups: usize) -> Self {
        Self {
            source,
            dispatcher,
            lookup_permits: Arc::new(Semaphore::new(max_concurrent_lookups.max(1))),
        }
    }

    /// Handles one geofence delivery to completion.
    pub async fn handle_event(&self, event: &GeofenceEvent) -> ArrivalOutcome {
        if !event.is_geofence_action() {
            debug!(
                "event=arrival_handle module=geofence status=skip reason=unknown_action action={}",
                event.action
            );
            return ArrivalOutcome::Ignored(IgnoreReason::UnknownAction(event.action.clone()));
        }

        if event.has_error {
            error!(
                "event=arrival_handle module=geofence status=error error_code={}",
                event
                    .error_code
                    .map_or_else(|| "unknown".to_string(), |code| code.to_string())
            );
            return ArrivalOutcome::UpstreamError {
                error_code: event.error_code,
            };
        }

        if event.transition_type != GeofenceTransition::Enter {
            debug!(
                "event=arrival_handle module=geofence status=skip reason=transition transition={:?}",
                event.transition_type
            );
            return ArrivalOutcome::Ignored(IgnoreReason::UnhandledTransition(
                event.transition_type,
            ));
        }

        if event.triggered_region_ids.is_empty() {
            info!("event=arrival_handle module=geofence status=skip reason=no_data");
            return ArrivalOutcome::NoData;
        }

        let started_at = Instant::now();
        let summary = self.resolve_all(&event.triggered_region_ids).await;
        info!(
            "event=arrival_handle module=geofence status=ok regions={} dispatched={} missing={} failed={} duration_ms={}",
            event.triggered_region_ids.len(),
            summary.dispatched,
            summary.missing,
            summary.failed,
            started_at.elapsed().as_millis()
        );
        ArrivalOutcome::Resolved(summary)
    }

    async fn resolve_all(&self, region_ids: &[String]) -> ResolutionSummary {
        let mut tasks = JoinSet::new();
        for region_id in region_ids {
            let source = Arc::clone(&self.source);
            let dispatcher = Arc::clone(&self.dispatcher);
            let permits = Arc::clone(&self.lookup_permits);
            let region_id = region_id.clone();

            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return RegionResolution::Failed;
                };
                resolve_region(source.as_ref(), dispatcher.as_ref(), &region_id).await
            });
        }

        let mut summary = ResolutionSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(RegionResolution::Dispatched) => summary.dispatched += 1,
                Ok(RegionResolution::Missing) => summary.missing += 1,
                Ok(RegionResolution::Failed) => summary.failed += 1,
                Err(err) => {
                    error!("event=arrival_resolve module=geofence status=error error_code=task_failed error={err}");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

async fn resolve_region<D, N>(source: &D, dispatcher: &N, region_id: &str) -> RegionResolution
where
    D: ReminderDataSource + ?Sized,
    N: NotificationDispatcher + ?Sized,
{
    match source.get_reminder(region_id).await {
        Ok(record) => {
            dispatcher.notify(NotificationPayload::from(record));
            debug!("event=arrival_resolve module=geofence status=ok id={region_id}");
            RegionResolution::Dispatched
        }
        Err(RepoError::NotFound) => {
            warn!("event=arrival_resolve module=geofence status=skip reason=not_found id={region_id}");
            RegionResolution::Missing
        }
        Err(err) => {
            error!("event=arrival_resolve module=geofence status=error id={region_id} error={err}");
            RegionResolution::Failed
        }
    }
}
