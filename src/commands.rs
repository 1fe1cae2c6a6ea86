use std::path::PathBuf;

use chrono::{Local, Utc};

use crate::countdown;
use crate::events::StatePayload;
#[cfg(all(feature = "app", not(test)))]
use crate::events::EVENT_STATE_UPDATED;
use crate::models::{
    CountdownFile, HistoryEntry, PermissionStatus, ReminderConfig, ReminderState, ShoppingFile,
    ShoppingItem, Timestamp,
};
use crate::state::AppState;
use crate::storage::{RecordKey, Storage, StorageError};

#[cfg(all(feature = "app", not(test)))]
use crate::notify::NotificationScheduler;
#[cfg(all(feature = "app", not(test)))]
use crate::scheduler::CountdownTimer;
#[cfg(all(feature = "app", not(test)))]
use std::sync::Mutex;
#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter, Manager, Runtime, State};
#[cfg(all(feature = "app", not(test)))]
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
#[cfg(all(feature = "app", not(test)))]
use tauri_plugin_notification::{NotificationExt, PermissionState};

/// A second acknowledgement landing inside this window is a double tap, not
/// a new completion.
const ACK_DEBOUNCE_MS: i64 = 1_000;

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

trait CommandCtx {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_state_updated(&self, payload: StatePayload);
    fn request_notification_permission(&self) -> PermissionStatus;
    fn schedule_notification(&self, config: &ReminderConfig) -> Result<String, String>;
    fn cancel_notification(&self, handle: &str);
    fn alert_permission_denied(&self);
    fn restart_countdown(&self);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// Writes the current state through to disk and republishes it. The
/// countdown record is skipped while it is still loading, so a startup
/// shopping write can never clobber history already on disk.
fn persist(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    let root = ctx.app_data_dir()?;
    let storage = Storage::new(root);
    storage.ensure_dirs()?;
    storage.write(RecordKey::ShoppingList, &state.shopping_file())?;
    if let Some(countdown_file) = state.countdown_file() {
        storage.write(RecordKey::Countdown, &countdown_file)?;
    }
    let payload = StatePayload {
        items: state.items(),
        reminder: state.reminder(),
    };
    ctx.emit_state_updated(payload);
    Ok(())
}

#[cfg(all(feature = "app", not(test)))]
struct TauriCommandCtx<'a, R: Runtime> {
    app: &'a AppHandle<R>,
}

#[cfg(all(feature = "app", not(test)))]
impl<R: Runtime> CommandCtx for TauriCommandCtx<'_, R> {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError> {
        self.app
            .path()
            .app_data_dir()
            .map_err(|err| StorageError::Io(std::io::Error::other(err.to_string())))
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        let _ = self.app.emit(EVENT_STATE_UPDATED, payload);
    }

    fn request_notification_permission(&self) -> PermissionStatus {
        let notification = self.app.notification();
        let granted = match notification.permission_state() {
            Ok(PermissionState::Granted) => true,
            _ => matches!(
                notification.request_permission(),
                Ok(PermissionState::Granted)
            ),
        };
        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    fn schedule_notification(&self, config: &ReminderConfig) -> Result<String, String> {
        let scheduler = self.app.state::<NotificationScheduler>();
        Ok(scheduler.schedule(self.app.clone(), config))
    }

    fn cancel_notification(&self, handle: &str) {
        self.app.state::<NotificationScheduler>().cancel(handle);
    }

    fn alert_permission_denied(&self) {
        // Dev builds stand in for a sandboxed device: log instead of dialog.
        if cfg!(debug_assertions) {
            log::warn!("acknowledge_reminder: notification permission denied");
            return;
        }
        self.app
            .dialog()
            .message(
                "Notifications are disabled, so no reminder could be scheduled. \
                 Enable them for Taskly in system settings.",
            )
            .title("Notifications disabled")
            .kind(MessageDialogKind::Warning)
            .show(|_| {});
    }

    fn restart_countdown(&self) {
        let state = self.app.state::<AppState>().inner().clone();
        let timer = self.app.state::<Mutex<CountdownTimer>>();
        timer
            .lock()
            .expect("timer poisoned")
            .restart(self.app.clone(), state);
    }
}

fn load_state_impl(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<StatePayload> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    let items = match storage.read::<ShoppingFile>(RecordKey::ShoppingList) {
        Ok(Some(file)) => file.items,
        Ok(None) => Vec::new(),
        Err(error) => {
            log::warn!("load_state: shopping record unreadable, starting empty error={error}");
            Vec::new()
        }
    };
    let reminder = match storage.read::<CountdownFile>(RecordKey::Countdown) {
        Ok(Some(file)) => file.reminder,
        Ok(None) => ReminderState::default(),
        Err(error) => {
            log::warn!("load_state: countdown record unreadable, starting empty error={error}");
            ReminderState::default()
        }
    };
    state.replace_items(items);
    state.set_reminder(Some(reminder));
    ctx.restart_countdown();
    ok(StatePayload {
        items: state.items(),
        reminder: state.reminder(),
    })
}

fn add_shopping_item_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    name: String,
) -> CommandResult<Vec<ShoppingItem>> {
    let now = Utc::now().timestamp_millis();
    if state.add_item(&name, now).is_none() {
        // Blank input: nothing changed, nothing to write.
        return ok(state.items());
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.items())
}

fn toggle_shopping_item_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    item_id: String,
) -> CommandResult<Vec<ShoppingItem>> {
    let now = Utc::now().timestamp_millis();
    if !state.toggle_item(&item_id, now) {
        return ok(state.items());
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.items())
}

fn delete_shopping_item_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    item_id: String,
) -> CommandResult<Vec<ShoppingItem>> {
    if !state.remove_item(&item_id) {
        return ok(state.items());
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.items())
}

fn acknowledge_reminder_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
) -> CommandResult<ReminderState> {
    acknowledge_reminder_at(ctx, state, Utc::now().timestamp_millis())
}

fn acknowledge_reminder_at(
    ctx: &impl CommandCtx,
    state: &AppState,
    now: Timestamp,
) -> CommandResult<ReminderState> {
    let loaded = state.reminder();
    let previous = loaded.clone().unwrap_or_default();

    if let Some(last) = previous.last_completed_at() {
        if now - last < ACK_DEBOUNCE_MS {
            return ok(previous);
        }
    }

    let notification_id = match ctx.request_notification_permission() {
        PermissionStatus::Granted => match ctx.schedule_notification(&state.config()) {
            Ok(handle) => Some(handle),
            Err(error) => {
                log::warn!(
                    "acknowledge_reminder: schedule failed, continuing without a reminder error={error}"
                );
                None
            }
        },
        PermissionStatus::Denied => {
            ctx.alert_permission_denied();
            None
        }
    };

    // The superseded notification goes away even when no replacement was
    // scheduled; cancelling one that already fired is harmless.
    if let Some(old) = previous.current_notification_id.as_deref() {
        ctx.cancel_notification(old);
    }

    let next = previous.acknowledged(now, notification_id.clone());
    state.set_reminder(Some(next.clone()));

    if let Err(error) = persist(ctx, state) {
        // Roll back the record and the notification that now has no
        // acknowledgement backing it.
        state.set_reminder(loaded);
        if let Some(new_handle) = notification_id.as_deref() {
            ctx.cancel_notification(new_handle);
        }
        return err(&format!("storage error: {error:?}"));
    }

    ctx.restart_countdown();
    ok(next)
}

/// History always reflects the record on disk, like the countdown itself
/// after a restart, rather than whatever is in memory.
fn reminder_history_impl(ctx: &impl CommandCtx) -> CommandResult<Vec<HistoryEntry>> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    let reminder = match storage.read::<CountdownFile>(RecordKey::Countdown) {
        Ok(Some(file)) => file.reminder,
        Ok(None) => ReminderState::default(),
        Err(error) => {
            log::warn!("reminder_history: countdown record unreadable error={error}");
            ReminderState::default()
        }
    };
    ok(countdown::history_entries(&reminder, &Local))
}

fn request_notification_permission_impl(ctx: &impl CommandCtx) -> CommandResult<PermissionStatus> {
    ok(ctx.request_notification_permission())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_state(app: AppHandle, state: State<AppState>) -> CommandResult<StatePayload> {
    let ctx = TauriCommandCtx { app: &app };
    load_state_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_shopping_item(
    app: AppHandle,
    state: State<AppState>,
    name: String,
) -> CommandResult<Vec<ShoppingItem>> {
    let ctx = TauriCommandCtx { app: &app };
    add_shopping_item_impl(&ctx, state.inner(), name)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn toggle_shopping_item(
    app: AppHandle,
    state: State<AppState>,
    item_id: String,
) -> CommandResult<Vec<ShoppingItem>> {
    let ctx = TauriCommandCtx { app: &app };
    toggle_shopping_item_impl(&ctx, state.inner(), item_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_shopping_item(
    app: AppHandle,
    state: State<AppState>,
    item_id: String,
) -> CommandResult<Vec<ShoppingItem>> {
    let ctx = TauriCommandCtx { app: &app };
    delete_shopping_item_impl(&ctx, state.inner(), item_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn acknowledge_reminder(app: AppHandle, state: State<AppState>) -> CommandResult<ReminderState> {
    let ctx = TauriCommandCtx { app: &app };
    acknowledge_reminder_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn reminder_history(app: AppHandle) -> CommandResult<Vec<HistoryEntry>> {
    let ctx = TauriCommandCtx { app: &app };
    reminder_history_impl(&ctx)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn request_notification_permission(app: AppHandle) -> CommandResult<PermissionStatus> {
    let ctx = TauriCommandCtx { app: &app };
    request_notification_permission_impl(&ctx)
}
