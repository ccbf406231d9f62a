// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer event data shared between node hooks and the dispatcher.
//!
//! Events are dispatched child-first with opt-out bubbling: the deepest hit
//! node receives the event, then each ancestor in turn unless a handler calls
//! [`PointerEvent::stop_propagation`]. There is no capture phase.

use crate::types::NodeId;
use kurbo::Point;

/// The kind of pointer transition being reported.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerPhase {
    /// A touch began or a mouse button was pressed.
    Down,
    /// The pointer moved. For a pressed session this is delivered to the
    /// session's begin target; for a hovering mouse it follows the hit test.
    Move,
    /// A touch ended or the mouse button was released.
    Up,
    /// Synthesized after [`Up`](Self::Up) when the pointer never strayed more
    /// than the click threshold from its begin position.
    Click,
}

/// Which input modality produced the event.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerDevice {
    /// The single mouse pointer.
    Mouse,
    /// A touch point, keyed by its platform identifier.
    Touch(u64),
}

/// A pointer event as seen by a node handler.
///
/// The same event value is threaded through every handler on the bubble path;
/// `current` and `local` are rewritten per node, `target` stays fixed at the
/// deepest hit node.
#[derive(Clone, Debug)]
pub struct PointerEvent {
    /// What happened.
    pub phase: PointerPhase,
    /// Which device reported it.
    pub device: PointerDevice,
    /// Position in stage (design-resolution) coordinates.
    pub stage: Point,
    /// Position relative to the top-left corner of `current`.
    pub local: Point,
    /// The deepest node hit by this event.
    pub target: NodeId,
    /// The node whose handlers are currently being invoked.
    pub current: NodeId,
    stop: bool,
}

impl PointerEvent {
    /// Build an event addressed at `target`.
    pub fn new(
        phase: PointerPhase,
        device: PointerDevice,
        stage: Point,
        local: Point,
        target: NodeId,
    ) -> Self {
        Self {
            phase,
            device,
            stage,
            local,
            target,
            current: target,
            stop: false,
        }
    }

    /// Prevent ancestors of `current` from receiving this event.
    ///
    /// Handlers already queued on `current` itself still run.
    pub fn stop_propagation(&mut self) {
        self.stop = true;
    }

    /// Whether a handler opted out of further bubbling.
    pub fn propagation_stopped(&self) -> bool {
        self.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_propagation_is_sticky() {
        let id = NodeId::new(0, 1);
        let mut ev = PointerEvent::new(
            PointerPhase::Down,
            PointerDevice::Mouse,
            Point::new(1.0, 2.0),
            Point::new(1.0, 2.0),
            id,
        );
        assert!(!ev.propagation_stopped());
        ev.stop_propagation();
        assert!(ev.propagation_stopped());
    }
}
