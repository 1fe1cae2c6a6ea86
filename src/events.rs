use crate::models::{CountdownStatus, ReminderState, ShoppingItem};

pub const EVENT_STATE_UPDATED: &str = "state_updated";
pub const EVENT_COUNTDOWN_TICK: &str = "countdown_tick";

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatePayload {
    pub items: Vec<ShoppingItem>,
    pub reminder: Option<ReminderState>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TickPayload {
    pub status: CountdownStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeParts;

    #[test]
    fn tick_payload_serializes_the_frontend_contract() {
        assert_ne!(EVENT_STATE_UPDATED, EVENT_COUNTDOWN_TICK);

        let payload = TickPayload {
            status: CountdownStatus {
                target_at: 7,
                is_overdue: true,
                parts: TimeParts::default(),
            },
        };
        let value = serde_json::to_value(&payload).expect("serialize tick payload");
        assert_eq!(value["status"]["target_at"], 7);
        assert_eq!(value["status"]["is_overdue"], true);
        assert_eq!(value["status"]["parts"]["seconds"], 0);
    }
}
