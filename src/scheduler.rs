use std::time::Duration;

use chrono::Utc;
use tauri::{AppHandle, Emitter, Runtime};

use crate::events::{TickPayload, EVENT_COUNTDOWN_TICK};
use crate::state::AppState;

/// Owns the background tick task. `restart` aborts the previous task before
/// spawning, so at most one loop is ever emitting.
pub struct CountdownTimer {
    handle: Option<tauri::async_runtime::JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn restart<R: Runtime>(&mut self, app: AppHandle<R>, state: AppState) {
        self.stop();
        self.handle = Some(tauri::async_runtime::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                // Recomputed from the wall clock each tick, so a suspended
                // machine snaps to the right remaining time on resume.
                let now = Utc::now().timestamp_millis();
                if let Some(status) = state.countdown_status(now) {
                    let _ = app.emit(EVENT_COUNTDOWN_TICK, TickPayload { status });
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
