// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session tracking and bubbled delivery of raw pointer reports.

use alloc::collections::BTreeMap;

use kurbo::Point;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use proscenium_scene::{NodeId, PointerDevice, PointerEvent, PointerPhase, Scene};

use crate::hit::{hit_test, node_stage_origin};
use crate::types::{RawPhase, RawPointer};

/// How far (per axis, in stage units) a pointer may stray from its press
/// position and still produce a click on release.
const DEFAULT_CLICK_THRESHOLD: f64 = 5.0;

/// A press locked to the node it went down on.
#[derive(Copy, Clone, Debug)]
struct Session {
    begin: Point,
    target: NodeId,
    strayed: bool,
}

impl Session {
    fn new(begin: Point, target: NodeId) -> Self {
        Self {
            begin,
            target,
            strayed: false,
        }
    }

    /// Sticky: once the pointer leaves the threshold box the session can no
    /// longer click, even if it comes back.
    fn track(&mut self, position: Point, threshold: f64) {
        let d = position - self.begin;
        if d.x.abs() > threshold || d.y.abs() > threshold {
            self.strayed = true;
        }
    }
}

/// The mouse is either idle, hovering a node, or pressed. Hovering and
/// pressed are mutually exclusive; a press suspends hover delivery until the
/// release.
#[derive(Copy, Clone, Debug)]
enum MouseState {
    Idle,
    Hover(NodeId),
    Pressed(Session),
}

/// Routes raw pointer reports into bubbled scene events.
///
/// One dispatcher serves one scene root. Touch points are tracked
/// independently by their platform identifier; the mouse has a single state.
/// See the crate docs for the delivery rules.
#[derive(Debug)]
pub struct Dispatcher {
    touches: BTreeMap<u64, Session>,
    mouse: MouseState,
    click_threshold: f64,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// A dispatcher with the default click threshold.
    pub fn new() -> Self {
        Self {
            touches: BTreeMap::new(),
            mouse: MouseState::Idle,
            click_threshold: DEFAULT_CLICK_THRESHOLD,
        }
    }

    /// Override the per-axis click threshold, in stage units.
    pub fn set_click_threshold(&mut self, threshold: f64) {
        self.click_threshold = threshold;
    }

    /// Number of touch points currently in a session.
    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    /// The node the unpressed mouse last hovered, if any.
    pub fn hover_target(&self) -> Option<NodeId> {
        match self.mouse {
            MouseState::Hover(id) => Some(id),
            _ => None,
        }
    }

    /// Whether a mouse press session is in progress.
    pub fn is_mouse_pressed(&self) -> bool {
        matches!(self.mouse, MouseState::Pressed(_))
    }

    /// Drop all sessions without delivering any events. For focus loss and
    /// similar whole-app interruptions.
    pub fn cancel_all(&mut self) {
        self.touches.clear();
        self.mouse = MouseState::Idle;
    }

    /// Route one raw report into the scene rooted at `root`.
    ///
    /// With the `std` feature, a panic from a scene handler is caught here
    /// and logged; the dispatcher and scene stay usable for the next report,
    /// though the interrupted session's handlers may have run partially.
    pub fn dispatch(&mut self, scene: &mut Scene, root: NodeId, raw: RawPointer) {
        #[cfg(feature = "std")]
        {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                self.route(scene, root, raw);
            }));
            if let Err(panic) = result {
                let msg = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<std::string::String>().map(|s| s.as_str()))
                    .unwrap_or("opaque panic payload");
                log::error!("pointer handler panicked during {:?}: {msg}", raw.phase);
            }
        }
        #[cfg(not(feature = "std"))]
        self.route(scene, root, raw);
    }

    /// Route a batch of reports in order.
    pub fn dispatch_batch<I>(&mut self, scene: &mut Scene, root: NodeId, raws: I)
    where
        I: IntoIterator<Item = RawPointer>,
    {
        for raw in raws {
            self.dispatch(scene, root, raw);
        }
    }

    fn route(&mut self, scene: &mut Scene, root: NodeId, raw: RawPointer) {
        match raw.device {
            PointerDevice::Touch(id) => self.route_touch(scene, root, id, raw),
            PointerDevice::Mouse => self.route_mouse(scene, root, raw),
        }
    }

    fn route_touch(&mut self, scene: &mut Scene, root: NodeId, id: u64, raw: RawPointer) {
        match raw.phase {
            RawPhase::Down => {
                if self.touches.remove(&id).is_some() {
                    log::warn!("touch {id} went down twice; replacing its session");
                }
                if let Some((target, _)) = hit_test(scene, root, raw.position) {
                    self.touches.insert(id, Session::new(raw.position, target));
                    bubble(scene, target, PointerPhase::Down, raw.device, raw.position);
                }
            }
            RawPhase::Move => {
                // Moves are delivered to the begin target even off-node.
                if let Some(session) = self.touches.get_mut(&id) {
                    session.track(raw.position, self.click_threshold);
                    let target = session.target;
                    bubble(scene, target, PointerPhase::Move, raw.device, raw.position);
                }
            }
            RawPhase::Up => {
                if let Some(mut session) = self.touches.remove(&id) {
                    session.track(raw.position, self.click_threshold);
                    bubble(scene, session.target, PointerPhase::Up, raw.device, raw.position);
                    if !session.strayed {
                        bubble(scene, session.target, PointerPhase::Click, raw.device, raw.position);
                    }
                }
            }
            RawPhase::Cancel => {
                self.touches.remove(&id);
            }
        }
    }

    fn route_mouse(&mut self, scene: &mut Scene, root: NodeId, raw: RawPointer) {
        match raw.phase {
            RawPhase::Down => {
                if let Some((target, _)) = hit_test(scene, root, raw.position) {
                    self.mouse = MouseState::Pressed(Session::new(raw.position, target));
                    bubble(scene, target, PointerPhase::Down, raw.device, raw.position);
                } else {
                    self.mouse = MouseState::Idle;
                }
            }
            RawPhase::Move => {
                if let MouseState::Pressed(session) = &mut self.mouse {
                    session.track(raw.position, self.click_threshold);
                    let target = session.target;
                    bubble(scene, target, PointerPhase::Move, raw.device, raw.position);
                } else {
                    // Unpressed moves follow the hit test.
                    match hit_test(scene, root, raw.position) {
                        Some((target, _)) => {
                            self.mouse = MouseState::Hover(target);
                            bubble(scene, target, PointerPhase::Move, raw.device, raw.position);
                        }
                        None => self.mouse = MouseState::Idle,
                    }
                }
            }
            RawPhase::Up => {
                if let MouseState::Pressed(mut session) = self.mouse {
                    session.track(raw.position, self.click_threshold);
                    self.mouse = MouseState::Idle;
                    bubble(scene, session.target, PointerPhase::Up, raw.device, raw.position);
                    if !session.strayed {
                        bubble(scene, session.target, PointerPhase::Click, raw.device, raw.position);
                    }
                }
            }
            RawPhase::Cancel => self.mouse = MouseState::Idle,
        }
    }
}

/// Deliver one event from `target` up the parent chain.
///
/// `local` is rewritten per node; `target` stays fixed at the hit node.
/// Handlers may release nodes mid-bubble: a dead `current` ends the walk, and
/// the parent link is re-read from the scene after every emission.
fn bubble(
    scene: &mut Scene,
    target: NodeId,
    phase: PointerPhase,
    device: PointerDevice,
    stage: Point,
) {
    if !scene.is_alive(target) {
        return;
    }
    let mut event = PointerEvent::new(
        phase,
        device,
        stage,
        stage - node_stage_origin(scene, target),
        target,
    );
    let mut current = Some(target);
    while let Some(id) = current {
        if !scene.is_alive(id) {
            break;
        }
        event.current = id;
        event.local = stage - node_stage_origin(scene, id);
        scene.emit_pointer(id, &mut event);
        if event.propagation_stopped() {
            break;
        }
        current = scene.parent(id);
    }
}
