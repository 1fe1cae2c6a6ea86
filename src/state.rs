use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::countdown;
use crate::models::{
    CountdownFile, CountdownStatus, ReminderConfig, ReminderState, ShoppingFile, ShoppingItem,
    Timestamp,
};

const SCHEMA_VERSION: u32 = 1;

/// Display order for the shopping list: open items first, most recently
/// touched on top, then completed items with the latest completion on top.
/// The sort is stable, so equal timestamps keep their insertion order.
pub fn order_items(items: &mut [ShoppingItem]) {
    items.sort_by(|a, b| match (a.completed_at, b.completed_at) {
        (Some(a_done), Some(b_done)) => b_done.cmp(&a_done),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => b.updated_at.cmp(&a.updated_at),
    });
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

impl AppState {
    /// `reminder` stays `None` until the persisted record has been loaded;
    /// countdown reads return nothing in that window instead of a default
    /// that would misreport "never acknowledged".
    pub fn new(
        items: Vec<ShoppingItem>,
        reminder: Option<ReminderState>,
        config: ReminderConfig,
    ) -> Self {
        let mut items = items;
        order_items(&mut items);
        Self {
            inner: Arc::new(Mutex::new(AppData {
                items,
                reminder,
                config,
            })),
        }
    }

    pub fn items(&self) -> Vec<ShoppingItem> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.items.clone()
    }

    /// Adds an item with a fresh id, or returns `None` when the trimmed name
    /// is empty.
    pub fn add_item(&self, name: &str, now: Timestamp) -> Option<ShoppingItem> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let item = ShoppingItem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            completed_at: None,
            updated_at: now,
        };
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.items.push(item.clone());
        order_items(&mut guard.items);
        Some(item)
    }

    pub fn remove_item(&self, item_id: &str) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.items.len();
        guard.items.retain(|item| item.id != item_id);
        guard.items.len() != before
    }

    /// Flips an item between open and completed, stamping `now` on both the
    /// completion and the touch time. Unknown ids are a no-op.
    pub fn toggle_item(&self, item_id: &str, now: Timestamp) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let Some(item) = guard.items.iter_mut().find(|item| item.id == item_id) else {
            return false;
        };
        item.completed_at = match item.completed_at {
            Some(_) => None,
            None => Some(now),
        };
        item.updated_at = now;
        order_items(&mut guard.items);
        true
    }

    pub fn replace_items(&self, items: Vec<ShoppingItem>) {
        let mut items = items;
        order_items(&mut items);
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.items = items;
    }

    pub fn reminder(&self) -> Option<ReminderState> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.reminder.clone()
    }

    pub fn set_reminder(&self, reminder: Option<ReminderState>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.reminder = reminder;
    }

    pub fn config(&self) -> ReminderConfig {
        let guard = self.inner.lock().expect("state poisoned");
        guard.config.clone()
    }

    pub fn shopping_file(&self) -> ShoppingFile {
        let guard = self.inner.lock().expect("state poisoned");
        ShoppingFile {
            schema_version: SCHEMA_VERSION,
            items: guard.items.clone(),
        }
    }

    /// `None` while the persisted record is still loading, so a startup
    /// write cannot clobber history that is already on disk.
    pub fn countdown_file(&self) -> Option<CountdownFile> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.reminder.as_ref().map(|reminder| CountdownFile {
            schema_version: SCHEMA_VERSION,
            reminder: reminder.clone(),
        })
    }

    pub fn countdown_status(&self, now: Timestamp) -> Option<CountdownStatus> {
        let guard = self.inner.lock().expect("state poisoned");
        guard
            .reminder
            .as_ref()
            .map(|reminder| countdown::status(reminder, now, guard.config.period_ms))
    }
}

struct AppData {
    items: Vec<ShoppingItem>,
    reminder: Option<ReminderState>,
    config: ReminderConfig,
}
