// 10.0 hooks.rs: notification fired before a position's collateral changes.
// dependent modules (reward accounting etc.) snapshot the position here. no return channel.

use crate::position::Position;
use crate::types::PositionId;

pub trait PositionHooks {
    fn before_position_modified(&mut self, position: &Position);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl PositionHooks for NoopHooks {
    fn before_position_modified(&mut self, _position: &Position) {}
}

// remembers which positions were about to change, in call order
#[derive(Debug, Default, Clone)]
pub struct RecordingHooks {
    calls: Vec<PositionId>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[PositionId] {
        &self.calls
    }
}

impl PositionHooks for RecordingHooks {
    fn before_position_modified(&mut self, position: &Position) {
        self.calls.push(position.id);
    }
}
