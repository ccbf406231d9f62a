// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stage: scene ownership, frame stepping, and presentation.

use core::f64::consts::FRAC_PI_2;

use kurbo::{Point, Vec2};
use proscenium_input::{Dispatcher, RawPhase, RawPointer};
use proscenium_scene::{Color, NodeFlags, NodeId, NodeInit, PointerDevice, Scene, Surface, visit};

use crate::clock::FrameClock;
use crate::viewport::{FitMode, Orientation, Viewport};

/// A double-buffered presentation target.
///
/// [`Stage::render`] drives it as clear, draw into the back surface, present.
/// Implementations decide what "present" means (swap, flush, copy-out).
pub trait Framebuffer {
    /// Fill the back buffer with a color.
    fn clear(&mut self, color: Color);
    /// The drawing surface over the back buffer.
    fn surface(&mut self) -> &mut dyn Surface;
    /// Make the back buffer visible.
    fn present(&mut self);
}

/// Owns a scene and drives it frame by frame.
///
/// The stage creates a root node sized to the design resolution with its
/// anchor at the top-left corner; applications attach their tree under it.
/// Pointer reports come in as window coordinates and are mapped through the
/// [`Viewport`] before dispatch, so handlers only ever see design units.
pub struct Stage {
    scene: Scene,
    root: NodeId,
    viewport: Viewport,
    dispatcher: Dispatcher,
    clock: FrameClock,
    clear_color: Color,
    running: bool,
}

impl core::fmt::Debug for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stage")
            .field("root", &self.root)
            .field("viewport", &self.viewport)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// A stopped stage at the given design resolution, fit mode, and
    /// orientation.
    pub fn new(
        design_width: f64,
        design_height: f64,
        mode: FitMode,
        orientation: Orientation,
    ) -> Self {
        let mut scene = Scene::new();
        let root = scene.insert(NodeInit {
            width: design_width,
            height: design_height,
            origin_x: 0.0,
            origin_y: 0.0,
            flags: NodeFlags::VISIBLE | NodeFlags::POINTER_ENABLED,
            ..Default::default()
        });
        scene.set_stage_root(Some(root));
        let mut viewport = Viewport::new(design_width, design_height, mode);
        viewport.set_orientation(orientation);
        Self {
            scene,
            root,
            viewport,
            dispatcher: Dispatcher::new(),
            clock: FrameClock::new(),
            clear_color: Color::rgb(0, 0, 0),
            running: false,
        }
    }

    /// The scene this stage drives.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene, for building and reconfiguring the tree.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The design-sized root node applications attach under.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The resolved design-to-container mapping.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Frame timing for the current run.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Set the color the framebuffer is cleared to each frame.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Adopt a new container (window) size.
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.viewport.set_container_size(width, height);
    }

    /// Switch how the design resolution meets the container.
    pub fn set_fit_mode(&mut self, mode: FitMode) {
        self.viewport.set_fit_mode(mode);
    }

    /// Present the stage rotated a quarter turn (or upright again).
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.viewport.set_orientation(orientation);
    }

    /// Whether [`step`](Self::step) currently advances the scene.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start advancing frames. Idempotent.
    pub fn start(&mut self) {
        if self.running {
            log::debug!("stage already running");
            return;
        }
        log::info!("stage started");
        self.running = true;
    }

    /// Stop advancing frames and drop in-flight pointer sessions. Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            log::debug!("stage already stopped");
            return;
        }
        log::info!("stage stopped");
        self.running = false;
        self.dispatcher.cancel_all();
    }

    /// Advance one frame by `dt` seconds: tick the clock, poll pending
    /// textures, and run the update traversal. No-op while stopped.
    pub fn step(&mut self, dt: f64) {
        if !self.running {
            return;
        }
        self.clock.tick(dt);
        self.scene.update(self.root, dt);
    }

    /// Feed one pointer report in window coordinates.
    ///
    /// The position is mapped into design space first; reports are accepted
    /// even while stopped so a paused scene can still respond to input.
    pub fn pointer(&mut self, device: PointerDevice, phase: RawPhase, client: Point) {
        let position = self.viewport.to_design(client);
        self.dispatcher
            .dispatch(&mut self.scene, self.root, RawPointer::new(device, phase, position));
    }

    /// Feed a batch of window-coordinate reports in order.
    pub fn pointer_batch<I>(&mut self, reports: I)
    where
        I: IntoIterator<Item = (PointerDevice, RawPhase, Point)>,
    {
        for (device, phase, client) in reports {
            self.pointer(device, phase, client);
        }
    }

    /// Draw the current frame: clear the back buffer, draw the scene through
    /// the viewport transform, and present. No-op while stopped.
    pub fn render<F: Framebuffer>(&mut self, framebuffer: &mut F) {
        if !self.running {
            return;
        }
        framebuffer.clear(self.clear_color);
        {
            let surface = framebuffer.surface();
            surface.save();
            let (container_width, container_height) = self.viewport.container_size();
            match self.viewport.orientation() {
                Orientation::Upright => {}
                Orientation::RotatedRight => {
                    surface.translate(Vec2::new(container_width, 0.0));
                    surface.rotate(FRAC_PI_2);
                }
                Orientation::RotatedLeft => {
                    surface.translate(Vec2::new(0.0, container_height));
                    surface.rotate(-FRAC_PI_2);
                }
            }
            surface.translate(self.viewport.offset());
            let (sx, sy) = self.viewport.scale();
            surface.scale(sx, sy);
            visit(&self.scene, self.root, surface);
            surface.restore();
        }
        framebuffer.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use proscenium_scene::{DisplayList, PaintOp, PointerPhase};

    /// Records the clear/draw/present protocol around a display list.
    #[derive(Default)]
    struct TestFramebuffer {
        list: DisplayList,
        cleared: Vec<Color>,
        presents: u32,
    }

    impl Framebuffer for TestFramebuffer {
        fn clear(&mut self, color: Color) {
            self.list.clear();
            self.cleared.push(color);
        }
        fn surface(&mut self) -> &mut dyn Surface {
            &mut self.list
        }
        fn present(&mut self) {
            self.presents += 1;
        }
    }

    #[test]
    fn start_and_stop_are_idempotent_and_gate_step() {
        let mut stage = Stage::new(320.0, 480.0, FitMode::ShowAll, Orientation::Upright);
        stage.step(1.0);
        assert_eq!(stage.clock().frames(), 0);

        stage.start();
        stage.start();
        stage.step(0.5);
        assert_eq!(stage.clock().frames(), 1);
        assert_eq!(stage.clock().elapsed(), 0.5);

        stage.stop();
        stage.stop();
        stage.step(0.5);
        assert_eq!(stage.clock().frames(), 1);
    }

    #[test]
    fn step_runs_the_update_traversal() {
        let mut stage = Stage::new(320.0, 480.0, FitMode::ShowAll, Orientation::Upright);
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let sink = ticks.clone();
        let root = stage.root();
        stage
            .scene_mut()
            .set_update_hook(root, Some(Box::new(move |_, _, dt| sink.borrow_mut().push(dt))));

        stage.start();
        stage.step(0.016);
        stage.step(0.032);
        assert_eq!(&*ticks.borrow(), &[0.016, 0.032]);
    }

    #[test]
    fn render_clears_draws_and_presents_in_order() {
        let mut stage = Stage::new(320.0, 480.0, FitMode::ShowAll, Orientation::Upright);
        stage.set_clear_color(Color::rgb(10, 20, 30));
        stage.set_container_size(640.0, 480.0);
        let root = stage.root();
        stage
            .scene_mut()
            .set_background(root, Some(Color::rgb(1, 1, 1)));

        let mut fb = TestFramebuffer::default();
        // Stopped stages do not draw.
        stage.render(&mut fb);
        assert_eq!(fb.presents, 0);

        stage.start();
        stage.render(&mut fb);

        assert_eq!(fb.cleared, [Color::rgb(10, 20, 30)]);
        assert_eq!(fb.presents, 1);
        // The viewport transform precedes the scene's own commands: the
        // letterbox offset lands before any fill.
        let ops = fb.list.ops();
        let offset_at = ops
            .iter()
            .position(|op| matches!(op, PaintOp::Translate(v) if *v == Vec2::new(160.0, 0.0)));
        let fill_at = ops.iter().position(|op| matches!(op, PaintOp::FillRect(..)));
        assert!(offset_at.unwrap() < fill_at.unwrap());
    }

    #[test]
    fn rotated_render_prepends_the_quarter_turn() {
        let mut stage = Stage::new(320.0, 480.0, FitMode::ShowAll, Orientation::RotatedRight);
        stage.set_container_size(480.0, 320.0);
        stage.start();

        let mut fb = TestFramebuffer::default();
        stage.render(&mut fb);
        let ops = fb.list.ops();
        assert!(matches!(ops[1], PaintOp::Translate(v) if v == Vec2::new(480.0, 0.0)));
        assert!(matches!(ops[2], PaintOp::Rotate(r) if r == FRAC_PI_2));
    }

    #[test]
    fn pointer_reports_are_mapped_into_design_space() {
        let mut stage = Stage::new(320.0, 480.0, FitMode::ShowAll, Orientation::Upright);
        stage.set_container_size(640.0, 480.0);

        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = hits.clone();
        let root = stage.root();
        stage.scene_mut().add_pointer_listener(
            root,
            Box::new(move |_, ev| sink.borrow_mut().push((ev.phase, ev.stage))),
        );

        // Window center: past the 160px letterbox margin, design (160, 240).
        stage.pointer(PointerDevice::Mouse, RawPhase::Down, Point::new(320.0, 240.0));
        assert_eq!(
            &*hits.borrow(),
            &[(PointerPhase::Down, Point::new(160.0, 240.0))]
        );
    }

    #[test]
    fn stopping_cancels_pointer_sessions() {
        let mut stage = Stage::new(320.0, 480.0, FitMode::ShowAll, Orientation::Upright);
        let clicks = Rc::new(RefCell::new(0u32));
        let sink = clicks.clone();
        let root = stage.root();
        stage.scene_mut().add_pointer_listener(
            root,
            Box::new(move |_, ev| {
                if ev.phase == PointerPhase::Click {
                    *sink.borrow_mut() += 1;
                }
            }),
        );

        stage.start();
        stage.pointer(PointerDevice::Touch(1), RawPhase::Down, Point::new(10.0, 10.0));
        stage.stop();
        stage.pointer(PointerDevice::Touch(1), RawPhase::Up, Point::new(10.0, 10.0));
        assert_eq!(*clicks.borrow(), 0);
    }
}
