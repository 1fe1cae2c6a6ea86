use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tauri::{AppHandle, Runtime};
use tauri_plugin_notification::NotificationExt;
use uuid::Uuid;

use crate::models::ReminderConfig;

/// Delivers reminder notifications in-process. The desktop notification API
/// shows immediately and has no pending queue, so each schedule call parks a
/// task that fires when the period elapses; cancelling aborts the task.
pub struct NotificationScheduler {
    pending: Mutex<HashMap<String, tauri::async_runtime::JoinHandle<()>>>,
}

impl NotificationScheduler {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Parks a delivery task and returns its handle. Entries for delivered
    /// notifications are reaped when that handle is next cancelled.
    pub fn schedule<R: Runtime>(&self, app: AppHandle<R>, config: &ReminderConfig) -> String {
        let handle_id = Uuid::new_v4().to_string();
        let delay = Duration::from_millis(config.period_ms.max(0) as u64);
        let title = config.title.clone();
        let body = config.body.clone();
        let task_id = handle_id.clone();
        let task = tauri::async_runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            let shown = app.notification().builder().title(title).body(body).show();
            match shown {
                Ok(()) => log::info!("notify: reminder delivered id={task_id}"),
                Err(error) => log::warn!("notify: delivery failed id={task_id} error={error}"),
            }
        });
        self.pending
            .lock()
            .expect("scheduler poisoned")
            .insert(handle_id.clone(), task);
        handle_id
    }

    /// Idempotent: unknown or already-delivered handles are a no-op.
    pub fn cancel(&self, handle_id: &str) {
        let task = self
            .pending
            .lock()
            .expect("scheduler poisoned")
            .remove(handle_id);
        if let Some(task) = task {
            task.abort();
            log::debug!("notify: reminder cancelled id={handle_id}");
        }
    }
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
