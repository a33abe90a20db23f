// 11.0: every successful collateral movement produces an event. used for audit trails and
// notifying external systems. EventPayload lists all event types; attributes() flattens
// one into the (key, value) strings an event sink expects.

use crate::types::{Coin, PositionId, Timestamp};
use serde::{Deserialize, Serialize};

pub const EVENT_TYPE_CDP_DEPOSIT: &str = "cdp_deposit";
pub const EVENT_TYPE_CDP_WITHDRAWAL: &str = "cdp_withdrawal";
pub const ATTRIBUTE_KEY_AMOUNT: &str = "amount";
pub const ATTRIBUTE_KEY_POSITION_ID: &str = "position_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }

    pub fn name(&self) -> &'static str {
        self.payload.name()
    }

    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        self.payload.attributes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    CdpDeposit(CollateralMovedEvent),
    CdpWithdrawal(CollateralMovedEvent),
}

impl EventPayload {
    pub fn name(&self) -> &'static str {
        match self {
            EventPayload::CdpDeposit(_) => EVENT_TYPE_CDP_DEPOSIT,
            EventPayload::CdpWithdrawal(_) => EVENT_TYPE_CDP_WITHDRAWAL,
        }
    }

    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            EventPayload::CdpDeposit(e) | EventPayload::CdpWithdrawal(e) => vec![
                (ATTRIBUTE_KEY_AMOUNT, e.amount.to_string()),
                (ATTRIBUTE_KEY_POSITION_ID, e.position_id.to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralMovedEvent {
    pub position_id: PositionId,
    pub amount: Coin,
}

pub trait EventEmitter {
    fn emit(&mut self, event: Event);
}

// keeps the most recent `max_events`, oldest dropped first
#[derive(Debug)]
pub struct EventCollector {
    events: Vec<Event>,
    max_events: usize,
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::bounded(100_000)
    }
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    pub fn recent(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn named(&self, name: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.name() == name).collect()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventEmitter for EventCollector {
    fn emit(&mut self, event: Event) {
        self.events.push(event);

        if self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
