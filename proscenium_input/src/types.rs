// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer reports as handed in by the platform layer.

use kurbo::Point;
use proscenium_scene::PointerDevice;

/// The raw transition reported by the platform.
///
/// Unlike [`PointerPhase`](proscenium_scene::PointerPhase) this includes
/// `Cancel` and excludes `Click`; clicks are synthesized by the dispatcher,
/// never reported raw.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RawPhase {
    /// Contact began or the button was pressed.
    Down,
    /// The pointer moved.
    Move,
    /// Contact ended or the button was released.
    Up,
    /// The platform aborted the interaction (palm rejection, app switch).
    /// Tears the session down without delivering `Up` or `Click`.
    Cancel,
}

/// One raw pointer report.
///
/// `position` is in stage (design-resolution) coordinates; callers map window
/// coordinates through their viewport before handing reports in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawPointer {
    /// Which device reported this.
    pub device: PointerDevice,
    /// What happened.
    pub phase: RawPhase,
    /// Stage-space position.
    pub position: Point,
}

impl RawPointer {
    /// Build a raw report.
    pub fn new(device: PointerDevice, phase: RawPhase, position: Point) -> Self {
        Self {
            device,
            phase,
            position,
        }
    }
}
