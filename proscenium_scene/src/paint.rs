// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The draw traversal and the paint backend seam.
//!
//! [`visit`] walks a scene subtree front to back in tree order and issues
//! drawing commands against an abstract [`Surface`]. Backends implement
//! `Surface` over their real canvas; [`DisplayList`] is the built-in recording
//! implementation used by the tests and by callers that want to inspect or
//! replay a frame.
//!
//! ## Per-node command order
//!
//! For each visible node, between a `save`/`restore` pair:
//!
//! 1. the blend mode is set;
//! 2. the surface is translated to the node's anchor position;
//! 3. the subtree alpha is multiplied by the node's opacity;
//! 4. scale is applied, with flips folded in as negative factors;
//! 5. rotation is applied, only when the angle is not a whole number of turns;
//! 6. with clipping enabled, the node's shape (circle when the radius is
//!    positive, box otherwise) is pushed as a clip;
//! 7. background, border, and texture are painted, in that order, into the
//!    node's box, which sits at `-origin_px` relative to the anchor;
//! 8. the surface is translated by `-origin_px` and the children are visited
//!    in insertion order, so later siblings paint on top.
//!
//! Invisible nodes and fully transparent nodes skip their entire subtree.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Circle, Point, Rect, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::texture::Texture;
use crate::tree::Scene;
use crate::types::{BlendMode, Color, NodeFlags, NodeId, Stroke};

/// Receiver for the drawing commands produced by [`visit`].
///
/// The transform methods mutate a current-transform state that `save` pushes
/// and `restore` pops, matching the usual 2D canvas model. Implementations do
/// not need to validate pairing; [`visit`] always emits balanced pairs.
pub trait Surface {
    /// Push the current transform, alpha, blend, and clip state.
    fn save(&mut self);
    /// Pop to the most recently saved state.
    fn restore(&mut self);

    /// Translate the current transform.
    fn translate(&mut self, offset: Vec2);
    /// Scale the current transform about its origin.
    fn scale(&mut self, sx: f64, sy: f64);
    /// Rotate the current transform about its origin, in radians.
    fn rotate(&mut self, radians: f64);

    /// Multiply the subtree alpha.
    fn mul_alpha(&mut self, alpha: f64);
    /// Set the compositing mode for subsequent paints.
    fn set_blend_mode(&mut self, blend: BlendMode);

    /// Intersect the clip with a rectangle in current-transform space.
    fn clip_rect(&mut self, rect: Rect);
    /// Intersect the clip with a circle in current-transform space.
    fn clip_circle(&mut self, circle: Circle);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Stroke a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    /// Fill a circle.
    fn fill_circle(&mut self, circle: Circle, color: Color);
    /// Stroke a circle outline.
    fn stroke_circle(&mut self, circle: Circle, stroke: Stroke);
    /// Draw a texture (or the `src` sub-rectangle of it) into `dst`.
    fn draw_image(&mut self, texture: &Arc<dyn Texture>, src: Option<Rect>, dst: Rect);
}

/// Walk the subtree rooted at `root` and emit its drawing commands.
///
/// Nodes whose texture is not yet ready paint their background and border but
/// skip the image. A stale `root` emits nothing.
pub fn visit<S: Surface + ?Sized>(scene: &Scene, root: NodeId, surface: &mut S) {
    let Some(node) = scene.node_opt(root) else {
        return;
    };
    if !node.flags.contains(NodeFlags::VISIBLE) || node.opacity == 0.0 {
        return;
    }

    surface.save();
    surface.set_blend_mode(node.blend);
    surface.translate(Vec2::new(node.x, node.y));
    if node.opacity != 1.0 {
        surface.mul_alpha(node.opacity);
    }
    let sx = if node.flipped_x { -node.scale_x } else { node.scale_x };
    let sy = if node.flipped_y { -node.scale_y } else { node.scale_y };
    if sx != 1.0 || sy != 1.0 {
        surface.scale(sx, sy);
    }
    // Whole turns are identity; skipping them keeps axis-aligned content on
    // the fast unrotated path in backends.
    if node.rotation % 360.0 != 0.0 {
        surface.rotate(node.radians);
    }

    // The box sits at -origin_px relative to the anchor.
    let bounds = Rect::new(
        -node.origin_px.x,
        -node.origin_px.y,
        node.width - node.origin_px.x,
        node.height - node.origin_px.y,
    );
    let circle = || Circle::new(bounds.center(), node.radius);

    if node.flags.contains(NodeFlags::CLIP_OVERFLOW) {
        if node.radius > 0.0 {
            surface.clip_circle(circle());
        } else {
            surface.clip_rect(bounds);
        }
    }

    if let Some(color) = node.background {
        if node.radius > 0.0 {
            surface.fill_circle(circle(), color);
        } else {
            surface.fill_rect(bounds, color);
        }
    }
    if let Some(stroke) = node.border {
        if node.radius > 0.0 {
            surface.stroke_circle(circle(), stroke);
        } else {
            surface.stroke_rect(bounds, stroke);
        }
    }
    if let Some(slot) = &node.texture
        && slot.source.ready()
    {
        surface.draw_image(&slot.source, slot.src_rect, bounds);
    }

    if !node.children.is_empty() {
        surface.translate(-node.origin_px);
        for &child in &node.children {
            visit(scene, child, surface);
        }
    }
    surface.restore();
}

/// One recorded drawing command. See [`DisplayList`].
#[derive(Clone, Debug)]
pub enum PaintOp {
    /// State push.
    Save,
    /// State pop.
    Restore,
    /// Transform translation.
    Translate(Vec2),
    /// Transform scale.
    Scale(f64, f64),
    /// Transform rotation in radians.
    Rotate(f64),
    /// Subtree alpha multiplication.
    MulAlpha(f64),
    /// Compositing mode change.
    SetBlendMode(BlendMode),
    /// Rectangular clip.
    ClipRect(Rect),
    /// Circular clip.
    ClipCircle(Circle),
    /// Rectangle fill.
    FillRect(Rect, Color),
    /// Rectangle outline.
    StrokeRect(Rect, Stroke),
    /// Circle fill.
    FillCircle(Circle, Color),
    /// Circle outline.
    StrokeCircle(Circle, Stroke),
    /// Texture blit into a destination rectangle.
    Image {
        /// The texture handle as attached to the node.
        texture: Arc<dyn Texture>,
        /// Optional source sub-rectangle in texture pixels.
        src: Option<Rect>,
        /// Destination box in current-transform space.
        dst: Rect,
    },
}

/// A [`Surface`] that records commands instead of rasterizing them.
///
/// Useful for testing traversal output and for replaying a frame against a
/// real backend later.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    ops: Vec<PaintOp>,
}

impl DisplayList {
    /// An empty display list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded commands, in emission order.
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Drop all recorded commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Replay every recorded command against another surface.
    pub fn replay<S: Surface + ?Sized>(&self, surface: &mut S) {
        for op in &self.ops {
            match op {
                PaintOp::Save => surface.save(),
                PaintOp::Restore => surface.restore(),
                PaintOp::Translate(v) => surface.translate(*v),
                PaintOp::Scale(sx, sy) => surface.scale(*sx, *sy),
                PaintOp::Rotate(r) => surface.rotate(*r),
                PaintOp::MulAlpha(a) => surface.mul_alpha(*a),
                PaintOp::SetBlendMode(b) => surface.set_blend_mode(*b),
                PaintOp::ClipRect(r) => surface.clip_rect(*r),
                PaintOp::ClipCircle(c) => surface.clip_circle(*c),
                PaintOp::FillRect(r, c) => surface.fill_rect(*r, *c),
                PaintOp::StrokeRect(r, s) => surface.stroke_rect(*r, *s),
                PaintOp::FillCircle(ci, c) => surface.fill_circle(*ci, *c),
                PaintOp::StrokeCircle(ci, s) => surface.stroke_circle(*ci, *s),
                PaintOp::Image { texture, src, dst } => surface.draw_image(texture, *src, *dst),
            }
        }
    }
}

impl Surface for DisplayList {
    fn save(&mut self) {
        self.ops.push(PaintOp::Save);
    }
    fn restore(&mut self) {
        self.ops.push(PaintOp::Restore);
    }
    fn translate(&mut self, offset: Vec2) {
        self.ops.push(PaintOp::Translate(offset));
    }
    fn scale(&mut self, sx: f64, sy: f64) {
        self.ops.push(PaintOp::Scale(sx, sy));
    }
    fn rotate(&mut self, radians: f64) {
        self.ops.push(PaintOp::Rotate(radians));
    }
    fn mul_alpha(&mut self, alpha: f64) {
        self.ops.push(PaintOp::MulAlpha(alpha));
    }
    fn set_blend_mode(&mut self, blend: BlendMode) {
        self.ops.push(PaintOp::SetBlendMode(blend));
    }
    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(PaintOp::ClipRect(rect));
    }
    fn clip_circle(&mut self, circle: Circle) {
        self.ops.push(PaintOp::ClipCircle(circle));
    }
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(PaintOp::FillRect(rect, color));
    }
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.ops.push(PaintOp::StrokeRect(rect, stroke));
    }
    fn fill_circle(&mut self, circle: Circle, color: Color) {
        self.ops.push(PaintOp::FillCircle(circle, color));
    }
    fn stroke_circle(&mut self, circle: Circle, stroke: Stroke) {
        self.ops.push(PaintOp::StrokeCircle(circle, stroke));
    }
    fn draw_image(&mut self, texture: &Arc<dyn Texture>, src: Option<Rect>, dst: Rect) {
        self.ops.push(PaintOp::Image {
            texture: texture.clone(),
            src,
            dst,
        });
    }
}

/// The hit-test side of node shapes, shared with the input dispatcher.
///
/// `point` is relative to the node's top-left corner. A positive radius makes
/// the node a circle centered in its box; otherwise containment is the box
/// itself. Zero-sized boxes contain nothing.
pub fn shape_contains(scene: &Scene, id: NodeId, point: Point) -> bool {
    let Some(node) = scene.node_opt(id) else {
        return false;
    };
    if node.radius > 0.0 {
        let center = Point::new(node.width / 2.0, node.height / 2.0);
        (point - center).hypot() <= node.radius
    } else {
        node.width > 0.0
            && node.height > 0.0
            && point.x >= 0.0
            && point.y >= 0.0
            && point.x < node.width
            && point.y < node.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeInit;
    use alloc::vec::Vec;

    fn boxed(width: f64, height: f64) -> NodeInit {
        NodeInit {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn visit_emits_balanced_saves_and_paint_order() {
        let mut scene = Scene::new();
        let root = scene.insert(boxed(100.0, 100.0));
        let below = scene.insert(boxed(10.0, 10.0));
        let above = scene.insert(boxed(10.0, 10.0));
        scene.set_background(root, Some(Color::rgb(1, 2, 3)));
        scene.set_background(below, Some(Color::rgb(4, 5, 6)));
        scene.set_background(above, Some(Color::rgb(7, 8, 9)));
        scene.add_child(root, below).unwrap();
        scene.add_child(root, above).unwrap();

        let mut list = DisplayList::new();
        visit(&scene, root, &mut list);

        let saves = list
            .ops()
            .iter()
            .filter(|op| matches!(op, PaintOp::Save))
            .count();
        let restores = list
            .ops()
            .iter()
            .filter(|op| matches!(op, PaintOp::Restore))
            .count();
        assert_eq!(saves, 3);
        assert_eq!(restores, 3);

        // Parents paint before children, earlier siblings before later ones.
        let fills: Vec<Color> = list
            .ops()
            .iter()
            .filter_map(|op| match op {
                PaintOp::FillRect(_, c) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(
            fills,
            [Color::rgb(1, 2, 3), Color::rgb(4, 5, 6), Color::rgb(7, 8, 9)]
        );
    }

    #[test]
    fn border_paints_between_background_and_texture() {
        struct ReadyTexture;
        impl Texture for ReadyTexture {
            fn ready(&self) -> bool {
                true
            }
            fn width(&self) -> f64 {
                8.0
            }
            fn height(&self) -> f64 {
                8.0
            }
        }

        let mut scene = Scene::new();
        let n = scene.insert(boxed(40.0, 20.0));
        scene.set_background(n, Some(Color::rgb(1, 2, 3)));
        scene.set_border(
            n,
            Some(Stroke {
                color: Color::rgb(4, 5, 6),
                width: 1.0,
            }),
        );
        scene.set_texture(n, Some(Arc::new(ReadyTexture)), None);

        let mut list = DisplayList::new();
        visit(&scene, n, &mut list);

        let at = |pred: fn(&PaintOp) -> bool| list.ops().iter().position(pred).unwrap();
        let fill = at(|op| matches!(op, PaintOp::FillRect(..)));
        let stroke = at(|op| matches!(op, PaintOp::StrokeRect(..)));
        let image = at(|op| matches!(op, PaintOp::Image { .. }));
        assert!(fill < stroke);
        assert!(stroke < image);
    }

    #[test]
    fn invisible_and_transparent_subtrees_are_skipped() {
        let mut scene = Scene::new();
        let root = scene.insert(boxed(100.0, 100.0));
        let hidden = scene.insert(boxed(10.0, 10.0));
        let clear = scene.insert(boxed(10.0, 10.0));
        scene.set_background(hidden, Some(Color::rgb(1, 1, 1)));
        scene.set_background(clear, Some(Color::rgb(2, 2, 2)));
        scene.add_child(root, hidden).unwrap();
        scene.add_child(root, clear).unwrap();
        scene.set_visible(hidden, false);
        scene.set_opacity(clear, 0.0);

        let mut list = DisplayList::new();
        visit(&scene, root, &mut list);
        assert!(
            !list
                .ops()
                .iter()
                .any(|op| matches!(op, PaintOp::FillRect(..)))
        );
    }

    #[test]
    fn self_paint_is_offset_by_the_anchor() {
        let mut scene = Scene::new();
        // Default centered anchor: the box straddles the anchor position.
        let n = scene.insert(NodeInit {
            width: 40.0,
            height: 20.0,
            x: 100.0,
            y: 50.0,
            background: Some(Color::rgb(9, 9, 9)),
            ..Default::default()
        });

        let mut list = DisplayList::new();
        visit(&scene, n, &mut list);

        let translate = list.ops().iter().find_map(|op| match op {
            PaintOp::Translate(v) => Some(*v),
            _ => None,
        });
        assert_eq!(translate, Some(Vec2::new(100.0, 50.0)));
        let fill = list.ops().iter().find_map(|op| match op {
            PaintOp::FillRect(r, _) => Some(*r),
            _ => None,
        });
        assert_eq!(fill, Some(Rect::new(-20.0, -10.0, 20.0, 10.0)));
    }

    #[test]
    fn whole_turns_skip_the_rotate_command() {
        let mut scene = Scene::new();
        let n = scene.insert(boxed(10.0, 10.0));
        scene.set_rotation(n, 720.0);

        let mut list = DisplayList::new();
        visit(&scene, n, &mut list);
        assert!(!list.ops().iter().any(|op| matches!(op, PaintOp::Rotate(_))));

        scene.set_rotation(n, 45.0);
        list.clear();
        visit(&scene, n, &mut list);
        assert!(list.ops().iter().any(|op| matches!(op, PaintOp::Rotate(_))));
    }

    #[test]
    fn flips_fold_into_scale_sign() {
        let mut scene = Scene::new();
        let n = scene.insert(boxed(10.0, 10.0));
        scene.set_scale(n, 2.0, 3.0);
        scene.set_flipped(n, true, false);

        let mut list = DisplayList::new();
        visit(&scene, n, &mut list);
        let scale = list.ops().iter().find_map(|op| match op {
            PaintOp::Scale(sx, sy) => Some((*sx, *sy)),
            _ => None,
        });
        assert_eq!(scale, Some((-2.0, 3.0)));
    }

    #[test]
    fn clip_uses_circle_when_radius_is_set() {
        let mut scene = Scene::new();
        let n = scene.insert(boxed(40.0, 40.0));
        scene.set_clip_overflow(n, true);

        let mut list = DisplayList::new();
        visit(&scene, n, &mut list);
        assert!(
            list.ops()
                .iter()
                .any(|op| matches!(op, PaintOp::ClipRect(_)))
        );

        scene.set_radius(n, 20.0);
        list.clear();
        visit(&scene, n, &mut list);
        assert!(
            list.ops()
                .iter()
                .any(|op| matches!(op, PaintOp::ClipCircle(c) if c.radius == 20.0))
        );
    }

    #[test]
    fn shape_containment_rect_and_circle() {
        let mut scene = Scene::new();
        let rect = scene.insert(boxed(40.0, 20.0));
        assert!(shape_contains(&scene, rect, Point::new(0.0, 0.0)));
        assert!(shape_contains(&scene, rect, Point::new(39.9, 19.9)));
        assert!(!shape_contains(&scene, rect, Point::new(40.0, 10.0)));
        assert!(!shape_contains(&scene, rect, Point::new(-0.1, 10.0)));

        let circle = scene.insert(boxed(40.0, 40.0));
        scene.set_radius(circle, 20.0);
        assert!(shape_contains(&scene, circle, Point::new(20.0, 20.0)));
        assert!(shape_contains(&scene, circle, Point::new(20.0, 0.5)));
        // Inside the box but outside the circle.
        assert!(!shape_contains(&scene, circle, Point::new(1.0, 1.0)));
    }

    #[test]
    fn zero_sized_box_contains_nothing() {
        let mut scene = Scene::new();
        let n = scene.insert(boxed(0.0, 0.0));
        assert!(!shape_contains(&scene, n, Point::ZERO));
    }
}
