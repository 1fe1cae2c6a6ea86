// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
mod commands;
mod countdown;
mod events;
mod logging;
mod models;
#[cfg(all(feature = "app", not(test)))]
mod notify;
#[cfg(all(feature = "app", not(test)))]
mod scheduler;
mod state;
mod storage;

#[cfg(all(feature = "app", not(test)))]
use std::sync::Mutex;

#[cfg(all(feature = "app", not(test)))]
use tauri::Manager;

#[cfg(all(feature = "app", not(test)))]
use crate::commands::*;
#[cfg(all(feature = "app", not(test)))]
use crate::models::{CountdownFile, ReminderConfig, ReminderState, ShoppingFile};
#[cfg(all(feature = "app", not(test)))]
use crate::notify::NotificationScheduler;
#[cfg(all(feature = "app", not(test)))]
use crate::scheduler::CountdownTimer;
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::{RecordKey, Storage};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
#[cfg(all(feature = "app", not(test)))]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            if let Err(error) = logging::init_logging(&data_dir) {
                eprintln!("logging unavailable, continuing without file logs: {error}");
            }

            let storage = Storage::new(data_dir);
            storage.ensure_dirs()?;

            let items = match storage.read::<ShoppingFile>(RecordKey::ShoppingList) {
                Ok(Some(file)) => file.items,
                Ok(None) => Vec::new(),
                Err(error) => {
                    log::warn!("startup: shopping record unreadable, starting empty error={error}");
                    Vec::new()
                }
            };
            let reminder = match storage.read::<CountdownFile>(RecordKey::Countdown) {
                Ok(Some(file)) => file.reminder,
                Ok(None) => ReminderState::default(),
                Err(error) => {
                    log::warn!(
                        "startup: countdown record unreadable, starting empty error={error}"
                    );
                    ReminderState::default()
                }
            };
            log::info!(
                "startup: state loaded items={} completions={}",
                items.len(),
                reminder.completed_at_timestamps.len()
            );

            let state = AppState::new(items, Some(reminder), ReminderConfig::default());
            app.manage(state.clone());
            app.manage(NotificationScheduler::new());

            // The timer starts ticking before the webview asks for anything, so
            // the first countdown_tick can land as soon as the page listens.
            let mut timer = CountdownTimer::new();
            timer.restart(app.handle().clone(), state);
            app.manage(Mutex::new(timer));

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_state,
            add_shopping_item,
            toggle_shopping_item,
            delete_shopping_item,
            acknowledge_reminder,
            reminder_history,
            request_notification_permission,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
