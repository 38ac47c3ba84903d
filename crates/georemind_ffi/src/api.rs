//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the reminder repository and arrival handling to Dart via FRB.
//! - Flatten core results into plain envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - DB-backed calls are async on the Dart side; they block an FRB worker
//!   thread, never the UI thread.
//! - One `ReminderCore` is shared per configured database path.

use georemind_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ArrivalOutcome,
    CollectingDispatcher, CoreConfig, GeofenceEvent, GeofenceRegistration, NotificationPayload,
    ReminderCore, ReminderDraft, ReminderRecord, RepoError,
};
use log::warn;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::runtime::Runtime;

static DB_PATH_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);
static ACTIVE_CORE: Mutex<Option<ReminderCore>> = Mutex::new(None);
static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Points subsequent calls at the database file under `path`.
///
/// The host passes its app-private documents path here at startup. The next
/// DB-backed call opens (and migrates) the new file.
///
/// # FFI contract
/// - Sync call, no I/O.
/// - Blank path restores the environment/default location.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> ActionResponse {
    let trimmed = path.trim();
    let next = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
    *lock(&DB_PATH_OVERRIDE) = next;
    *lock(&ACTIVE_CORE) = None;
    ActionResponse::success("Database path configured.")
}

/// Reminder row shape shown by list/detail screens.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Geofence the host must register with the platform client.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceItem {
    pub region_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f32,
    pub expiration_ms: u64,
    pub initial_trigger_on_enter: bool,
}

/// Notification the host must render after an arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderListResponse {
    pub ok: bool,
    pub items: Vec<ReminderItem>,
    /// `true` when the list screen should show its empty state.
    pub no_data: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSaveResponse {
    pub ok: bool,
    pub reminder: Option<ReminderItem>,
    /// Present only for reminders with coordinates.
    pub geofence: Option<GeofenceItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderGetResponse {
    pub ok: bool,
    pub reminder: Option<ReminderItem>,
    /// Distinguishes "gone" from "broken" when `ok == false`.
    pub not_found: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalResponse {
    pub ok: bool,
    pub notifications: Vec<NotificationItem>,
    pub message: String,
}

/// Lists every stored reminder.
///
/// # FFI contract
/// - DB-backed; runs on an FRB worker thread.
/// - Empty store is `ok = true, no_data = true`.
pub fn reminders_list() -> ReminderListResponse {
    let result = run_with_core(|core| async move { core.service().list_reminders().await });
    match result {
        Ok(Ok(list)) => {
            let message = if list.no_data {
                "No reminders.".to_string()
            } else {
                format!("Found {} reminder(s).", list.items.len())
            };
            ReminderListResponse {
                ok: true,
                items: list.items.into_iter().map(ReminderItem::from).collect(),
                no_data: list.no_data,
                message,
            }
        }
        Ok(Err(err)) => list_failure(err.to_string()),
        Err(err) => list_failure(err),
    }
}

/// Validates and saves a reminder, returning the geofence to register.
///
/// # FFI contract
/// - DB-backed; runs on an FRB worker thread.
/// - Validation failures return `ok = false` with a form-level message.
/// - Blank or missing `id` generates a new one.
pub fn reminder_save(
    title: String,
    description: String,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    id: Option<String>,
) -> ReminderSaveResponse {
    let draft = ReminderDraft {
        id,
        title: Some(title),
        description: Some(description),
        location_label: Some(location),
        latitude,
        longitude,
    };
    let result =
        run_with_core(|core| async move { core.service().validate_and_save(draft).await });
    match result {
        Ok(Ok(saved)) => ReminderSaveResponse {
            ok: true,
            reminder: Some(ReminderItem::from(saved.record)),
            geofence: saved.geofence.map(GeofenceItem::from),
            message: "Reminder saved.".to_string(),
        },
        Ok(Err(err)) => save_failure(err.to_string()),
        Err(err) => save_failure(err),
    }
}

/// Loads one reminder by id.
///
/// # FFI contract
/// - DB-backed; runs on an FRB worker thread.
/// - Missing id is `ok = false, not_found = true, message = "Reminder not found"`.
pub fn reminder_get(id: String) -> ReminderGetResponse {
    let result = run_with_core(|core| async move { core.service().get_reminder(&id).await });
    match result {
        Ok(Ok(record)) => ReminderGetResponse {
            ok: true,
            reminder: Some(ReminderItem::from(record)),
            not_found: false,
            message: String::new(),
        },
        Ok(Err(err)) => ReminderGetResponse {
            ok: false,
            reminder: None,
            not_found: matches!(err, RepoError::NotFound),
            message: err.to_string(),
        },
        Err(err) => ReminderGetResponse {
            ok: false,
            reminder: None,
            not_found: false,
            message: err,
        },
    }
}

/// Deletes every reminder (sign-out/reset flows).
///
/// # FFI contract
/// - DB-backed; runs on an FRB worker thread.
/// - Does not unregister platform geofences; the host does that.
pub fn reminders_clear() -> ActionResponse {
    let cleared = run_with_core(|core| async move { core.service().clear_reminders().await });
    match flatten(cleared) {
        Ok(()) => ActionResponse::success("Reminders cleared."),
        Err(err) => ActionResponse::failure(format!("reminders_clear failed: {err}")),
    }
}

/// Resolves a geofence delivery into notifications to render.
///
/// `event_json` uses the camelCase wire format of `GeofenceEvent`.
///
/// # FFI contract
/// - DB-backed; runs on an FRB worker thread.
/// - Malformed JSON is `ok = false`; every well-formed delivery is
///   `ok = true`, possibly with no notifications.
pub fn geofence_handle_event(event_json: String) -> ArrivalResponse {
    let event: GeofenceEvent = match parse_event(&event_json) {
        Ok(event) => event,
        Err(err) => {
            warn!("event=ffi_geofence module=ffi status=error error_code=bad_event error={err}");
            return ArrivalResponse {
                ok: false,
                notifications: Vec::new(),
                message: format!("geofence_handle_event failed: {err}"),
            };
        }
    };

    let dispatcher = Arc::new(CollectingDispatcher::new());
    let sink = Arc::clone(&dispatcher);
    let result = run_with_core(|core| async move {
        core.resolver(sink).handle_event(&event).await
    });

    match result {
        Ok(outcome) => ArrivalResponse {
            ok: true,
            notifications: dispatcher
                .drain()
                .into_iter()
                .map(NotificationItem::from)
                .collect(),
            message: describe_outcome(&outcome),
        },
        Err(err) => ArrivalResponse {
            ok: false,
            notifications: Vec::new(),
            message: format!("geofence_handle_event failed: {err}"),
        },
    }
}

impl From<ReminderRecord> for ReminderItem {
    fn from(record: ReminderRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            location: record.location_label,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

impl From<GeofenceRegistration> for GeofenceItem {
    fn from(registration: GeofenceRegistration) -> Self {
        Self {
            region_id: registration.region_id,
            latitude: registration.latitude,
            longitude: registration.longitude,
            radius_meters: registration.radius_meters,
            expiration_ms: registration.expiration_ms,
            initial_trigger_on_enter: registration.initial_trigger_on_enter,
        }
    }
}

impl From<NotificationPayload> for NotificationItem {
    fn from(payload: NotificationPayload) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            description: payload.description,
            location: payload.location_label,
            latitude: payload.latitude,
            longitude: payload.longitude,
        }
    }
}

fn describe_outcome(outcome: &ArrivalOutcome) -> String {
    match outcome {
        ArrivalOutcome::Resolved(summary) => format!(
            "Resolved: dispatched={} missing={} failed={}.",
            summary.dispatched, summary.missing, summary.failed
        ),
        ArrivalOutcome::NoData => "No triggered regions.".to_string(),
        ArrivalOutcome::UpstreamError { error_code } => match error_code {
            Some(code) => format!("Upstream geofence error {code}."),
            None => "Upstream geofence error.".to_string(),
        },
        ArrivalOutcome::Ignored(reason) => format!("Ignored: {reason:?}."),
    }
}

fn list_failure(message: String) -> ReminderListResponse {
    ReminderListResponse {
        ok: false,
        items: Vec::new(),
        no_data: false,
        message: format!("reminders_list failed: {message}"),
    }
}

fn save_failure(message: String) -> ReminderSaveResponse {
    ReminderSaveResponse {
        ok: false,
        reminder: None,
        geofence: None,
        message,
    }
}

/// Folds a core failure into the bridge's string error.
fn flatten<T, E: std::fmt::Display>(result: Result<Result<T, E>, String>) -> Result<T, String> {
    result.and_then(|inner| inner.map_err(|err| err.to_string()))
}

fn parse_event(raw: &str) -> Result<GeofenceEvent, String> {
    serde_json::from_str(raw).map_err(|err| err.to_string())
}

/// Runs `task` with the shared core on the bridge runtime.
fn run_with_core<F, Fut, T>(task: F) -> Result<T, String>
where
    F: FnOnce(ReminderCore) -> Fut,
    Fut: Future<Output = T>,
{
    let core = active_core()?;
    let runtime = runtime()?;
    Ok(runtime.block_on(task(core)))
}

fn active_core() -> Result<ReminderCore, String> {
    let mut active = lock(&ACTIVE_CORE);
    if let Some(core) = active.as_ref() {
        return Ok(core.clone());
    }

    let config = resolve_config()?;
    let core = ReminderCore::open(&config)
        .map_err(|err| format!("reminder DB open failed: {err}"))?;
    *active = Some(core.clone());
    Ok(core)
}

fn resolve_config() -> Result<CoreConfig, String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(path) = lock(&DB_PATH_OVERRIDE).clone() {
        config.db_path = path;
    }
    Ok(config)
}

fn runtime() -> Result<&'static Runtime, String> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("georemind-ffi")
        .enable_all()
        .build()
        .map_err(|err| format!("runtime start failed: {err}"))?;
    Ok(RUNTIME.get_or_init(|| runtime))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
