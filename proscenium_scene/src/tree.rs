// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene implementation: node storage, tree structure, and the layout engine.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use kurbo::{Point, Rect, Vec2};

use crate::event::{PointerEvent, PointerPhase};
use crate::texture::Texture;
use crate::types::{
    AlignX, AlignY, BlendMode, Color, Constraints, NodeFlags, NodeId, NodeInit, Stroke, TextureSlot,
};

/// A pointer handler attached to a node.
///
/// Handlers receive the scene mutably so they can reconfigure the tree in
/// response to input; the node they are attached to is `event.current`.
pub type PointerFn = Box<dyn FnMut(&mut Scene, &mut PointerEvent)>;

/// A per-frame update hook attached to a node.
pub type UpdateFn = Box<dyn FnMut(&mut Scene, NodeId, f64)>;

/// Scene-level teardown hook, invoked once per released node.
///
/// This is the seam an external action/tween scheduler uses to stop queued
/// animations targeting a node that is going away.
pub type TeardownFn = Box<dyn FnMut(NodeId)>;

/// Errors surfaced synchronously by tree mutations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The node already has a parent; detach it first.
    #[error("node is already attached to a parent")]
    AlreadyAttached,
    /// Attaching here would make a node its own ancestor.
    #[error("attaching would create a cycle")]
    WouldCycle,
}

/// Dedicated per-phase pointer callbacks.
///
/// These are the "method-style" hooks: at most one per phase, invoked before
/// the generic listener list with the same event data.
#[derive(Default)]
pub(crate) struct PointerHooks {
    down: Option<PointerFn>,
    moved: Option<PointerFn>,
    up: Option<PointerFn>,
    click: Option<PointerFn>,
}

impl PointerHooks {
    fn slot(&mut self, phase: PointerPhase) -> &mut Option<PointerFn> {
        match phase {
            PointerPhase::Down => &mut self.down,
            PointerPhase::Move => &mut self.moved,
            PointerPhase::Up => &mut self.up,
            PointerPhase::Click => &mut self.click,
        }
    }
}

pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) origin_x: f64,
    pub(crate) origin_y: f64,
    /// Anchor in local pixels; always `origin * size`.
    pub(crate) origin_px: Vec2,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) scale_x: f64,
    pub(crate) scale_y: f64,
    /// Rotation in degrees, with the radians value cached alongside.
    pub(crate) rotation: f64,
    pub(crate) radians: f64,
    pub(crate) flipped_x: bool,
    pub(crate) flipped_y: bool,
    pub(crate) opacity: f64,
    pub(crate) background: Option<Color>,
    pub(crate) border: Option<Stroke>,
    pub(crate) radius: f64,
    pub(crate) blend: BlendMode,
    pub(crate) flags: NodeFlags,
    pub(crate) texture: Option<TextureSlot>,
    pub(crate) constraints: Constraints,
    pub(crate) on_stage: bool,
    on_update: Option<UpdateFn>,
    hooks: PointerHooks,
    listeners: Vec<PointerFn>,
}

impl Node {
    fn new(init: NodeInit) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            width: init.width,
            height: init.height,
            origin_x: init.origin_x,
            origin_y: init.origin_y,
            origin_px: Vec2::new(init.width * init.origin_x, init.height * init.origin_y),
            x: init.x,
            y: init.y,
            scale_x: init.scale_x,
            scale_y: init.scale_y,
            rotation: init.rotation,
            radians: init.rotation.to_radians(),
            flipped_x: false,
            flipped_y: false,
            opacity: init.opacity.clamp(0.0, 1.0),
            background: init.background,
            border: init.border,
            radius: init.radius,
            blend: init.blend,
            flags: init.flags,
            texture: None,
            constraints: Constraints::default(),
            on_stage: false,
            on_update: None,
            hooks: PointerHooks::default(),
            listeners: Vec::new(),
        }
    }
}

/// The retained node tree.
///
/// Nodes are stored in generational slots; a released slot is recycled with a
/// bumped generation, so stale [`NodeId`]s never alias a live node and every
/// operation on one is a silent no-op. See the crate docs for the coordinate
/// and layout model.
pub struct Scene {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    stage_root: Option<NodeId>,
    pending_textures: Vec<NodeId>,
    teardown: Option<TeardownFn>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("stage_root", &self.stage_root)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            stage_root: None,
            pending_textures: Vec::new(),
            teardown: None,
        }
    }

    /// Insert a new detached node built from an attribute bag.
    pub fn insert(&mut self, init: NodeInit) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = Some(Node::new(init));
            idx
        } else {
            self.nodes.push(Some(Node::new(init)));
            self.generations.push(0);
            self.nodes.len() - 1
        };
        let generation = self.generations[idx] + 1;
        self.generations[idx] = generation;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let idx = idx as u32;
        NodeId::new(idx, generation)
    }

    /// Whether `id` still refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|_| self.generations[id.idx()] == id.1)
    }

    // --- tree structure ---

    /// Append `child` to `parent`'s children.
    ///
    /// Fails with [`Error::AlreadyAttached`] when `child` already has a
    /// parent. The child's layout constraints are applied against the
    /// parent's current size immediately.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        self.add_child_at(parent, child, usize::MAX)
    }

    /// Insert `child` at `at` within `parent`'s children (clamped to the
    /// current length). Insertion order is paint order, back to front.
    pub fn add_child_at(&mut self, parent: NodeId, child: NodeId, at: usize) -> Result<(), Error> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Ok(());
        }
        if self.node(child).parent.is_some() {
            return Err(Error::AlreadyAttached);
        }
        if parent == child || self.contains(child, parent) {
            return Err(Error::WouldCycle);
        }
        let at = at.min(self.node(parent).children.len());
        self.node_mut(parent).children.insert(at, child);
        self.node_mut(child).parent = Some(parent);
        let staged = self.node(parent).on_stage;
        self.set_staged(child, staged);
        self.resize_x(child);
        self.resize_y(child);
        self.reposition_x(child);
        self.reposition_y(child);
        Ok(())
    }

    /// Detach `child` from `parent` if it is currently a direct child; no-op
    /// otherwise. Clears the child's parent and on-stage references.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return;
        }
        if self.node(child).parent != Some(parent) {
            return;
        }
        self.node_mut(parent).children.retain(|c| *c != child);
        self.node_mut(child).parent = None;
        self.set_staged(child, false);
    }

    /// Detach every child. With `recursive`, children (and their subtrees)
    /// are released as well; otherwise they stay alive, merely detached.
    pub fn remove_all_children(&mut self, id: NodeId, recursive: bool) {
        if !self.is_alive(id) {
            return;
        }
        let kids = self.node(id).children.clone();
        for k in kids {
            if recursive {
                self.release(k, true);
            } else {
                self.remove_child(id, k);
            }
        }
    }

    /// Whether `other` is a direct or transitive descendant of `id`.
    pub fn contains(&self, id: NodeId, other: NodeId) -> bool {
        if !self.is_alive(id) || !self.is_alive(other) {
            return false;
        }
        let mut cur = self.node(other).parent;
        while let Some(p) = cur {
            if p == id {
                return true;
            }
            cur = self.node(p).parent;
        }
        false
    }

    /// Release a node: detach it, tear down its children (released too when
    /// `recursive`, shallow-detached otherwise), drop hooks and listeners,
    /// and free the slot. Idempotent: releasing a stale id is a no-op.
    pub fn release(&mut self, id: NodeId, recursive: bool) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(p) = self.node(id).parent {
            self.node_mut(p).children.retain(|c| *c != id);
        }
        let kids = self.node(id).children.clone();
        for k in kids {
            if recursive {
                self.release(k, true);
            } else {
                self.node_mut(k).parent = None;
                self.set_staged(k, false);
            }
        }
        if let Some(mut f) = self.teardown.take() {
            f(id);
            self.teardown = Some(f);
        }
        self.pending_textures.retain(|p| *p != id);
        if self.stage_root == Some(id) {
            self.stage_root = None;
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Designate the node whose subtree counts as "on stage".
    ///
    /// The on-stage flag propagates to all current and future descendants and
    /// is cleared when a subtree detaches.
    pub fn set_stage_root(&mut self, root: Option<NodeId>) {
        if let Some(old) = self.stage_root.take() {
            if self.is_alive(old) {
                self.set_staged(old, false);
            }
        }
        if let Some(r) = root
            && self.is_alive(r)
        {
            self.stage_root = Some(r);
            self.set_staged(r, true);
        }
    }

    /// The current stage root, if one is set.
    pub fn stage_root(&self) -> Option<NodeId> {
        self.stage_root
    }

    /// Whether the node is part of the stage-rooted subtree.
    pub fn is_on_stage(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(|n| n.on_stage)
    }

    fn set_staged(&mut self, id: NodeId, staged: bool) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        node.on_stage = staged;
        let kids = node.children.clone();
        for k in kids {
            self.set_staged(k, staged);
        }
    }

    // --- geometry and transform ---

    /// Set the content-box width.
    ///
    /// No-op if unchanged, and ignored while both `left` and `right` are set
    /// (the width is then derived from the parent and not independently
    /// settable). Updates the anchor-in-pixels, re-derives the position, and
    /// relayouts children against the new size in one top-down pass.
    pub fn set_width(&mut self, id: NodeId, width: f64) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        if node.constraints.left.is_some() && node.constraints.right.is_some() {
            log::trace!("set_width ignored for {id:?}: width is edge-derived");
            return;
        }
        if node.width == width {
            return;
        }
        self.set_width_raw(id, width);
        self.reposition_x(id);
    }

    /// Set the content-box height. Mirrors [`set_width`](Self::set_width).
    pub fn set_height(&mut self, id: NodeId, height: f64) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        if node.constraints.top.is_some() && node.constraints.bottom.is_some() {
            log::trace!("set_height ignored for {id:?}: height is edge-derived");
            return;
        }
        if node.height == height {
            return;
        }
        self.set_height_raw(id, height);
        self.reposition_y(id);
    }

    /// Set both dimensions at once.
    pub fn set_size(&mut self, id: NodeId, width: f64, height: f64) {
        self.set_width(id, width);
        self.set_height(id, height);
    }

    /// Set the horizontal anchor fraction (0..1) and re-derive the position.
    pub fn set_origin_x(&mut self, id: NodeId, origin: f64) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.origin_x == origin {
            return;
        }
        node.origin_x = origin;
        node.origin_px.x = node.width * origin;
        self.reposition_x(id);
    }

    /// Set the vertical anchor fraction (0..1) and re-derive the position.
    pub fn set_origin_y(&mut self, id: NodeId, origin: f64) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.origin_y == origin {
            return;
        }
        node.origin_y = origin;
        node.origin_px.y = node.height * origin;
        self.reposition_y(id);
    }

    /// Position the anchor in the parent's space.
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) {
        if let Some(node) = self.node_opt_mut(id) {
            node.x = x;
            node.y = y;
        }
    }

    /// Set the scale factors about the anchor.
    pub fn set_scale(&mut self, id: NodeId, sx: f64, sy: f64) {
        if let Some(node) = self.node_opt_mut(id) {
            node.scale_x = sx;
            node.scale_y = sy;
        }
    }

    /// Set the rotation about the anchor, in degrees. The radians value is
    /// cached synchronously.
    pub fn set_rotation(&mut self, id: NodeId, degrees: f64) {
        if let Some(node) = self.node_opt_mut(id) {
            if node.rotation == degrees {
                return;
            }
            node.rotation = degrees;
            node.radians = degrees.to_radians();
        }
    }

    /// Mirror the node at draw time. Flips fold into the scale sign during
    /// the draw traversal only; they do not affect layout or hit testing.
    pub fn set_flipped(&mut self, id: NodeId, flip_x: bool, flip_y: bool) {
        if let Some(node) = self.node_opt_mut(id) {
            node.flipped_x = flip_x;
            node.flipped_y = flip_y;
        }
    }

    // --- paint attributes ---

    /// Set the subtree opacity (clamped to 0..1).
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) {
        if let Some(node) = self.node_opt_mut(id) {
            node.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Show or hide the node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.node_opt_mut(id) {
            node.flags.set(NodeFlags::VISIBLE, visible);
        }
    }

    /// Enable or disable pointer input for the node and its subtree.
    pub fn set_pointer_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.node_opt_mut(id) {
            node.flags.set(NodeFlags::POINTER_ENABLED, enabled);
        }
    }

    /// Clip self-paint and descendants to the node's shape.
    pub fn set_clip_overflow(&mut self, id: NodeId, clip: bool) {
        if let Some(node) = self.node_opt_mut(id) {
            node.flags.set(NodeFlags::CLIP_OVERFLOW, clip);
        }
    }

    /// Set the background fill.
    pub fn set_background(&mut self, id: NodeId, background: Option<Color>) {
        if let Some(node) = self.node_opt_mut(id) {
            node.background = background;
        }
    }

    /// Set the border stroke.
    pub fn set_border(&mut self, id: NodeId, border: Option<Stroke>) {
        if let Some(node) = self.node_opt_mut(id) {
            node.border = border;
        }
    }

    /// Set the shape radius. A positive radius turns the node into a circle
    /// centered in its box for painting, clipping, and hit testing.
    pub fn set_radius(&mut self, id: NodeId, radius: f64) {
        if let Some(node) = self.node_opt_mut(id) {
            node.radius = radius;
        }
    }

    /// Set the compositing mode.
    pub fn set_blend_mode(&mut self, id: NodeId, blend: BlendMode) {
        if let Some(node) = self.node_opt_mut(id) {
            node.blend = blend;
        }
    }

    // --- layout constraints ---

    /// Constrain the node's left edge to an offset from the parent's left.
    ///
    /// Setting any edge disables auto-sizing from the texture and makes edge
    /// constraints dominate alignment on this axis (the alignment is
    /// cleared). With both `left` and `right` set, the width is derived from
    /// the parent and `percent_width` is dropped (last writer wins).
    pub fn set_left(&mut self, id: NodeId, left: Option<f64>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.left == left {
            return;
        }
        node.constraints.left = left;
        if left.is_some() {
            node.flags.remove(NodeFlags::AUTO_SIZE);
            node.constraints.align_x = None;
            if node.constraints.right.is_some() {
                node.constraints.percent_width = None;
            }
        }
        self.resize_x(id);
        self.reposition_x(id);
    }

    /// Constrain the node's right edge. See [`set_left`](Self::set_left).
    pub fn set_right(&mut self, id: NodeId, right: Option<f64>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.right == right {
            return;
        }
        node.constraints.right = right;
        if right.is_some() {
            node.flags.remove(NodeFlags::AUTO_SIZE);
            node.constraints.align_x = None;
            if node.constraints.left.is_some() {
                node.constraints.percent_width = None;
            }
        }
        self.resize_x(id);
        self.reposition_x(id);
    }

    /// Constrain the node's top edge. See [`set_left`](Self::set_left).
    pub fn set_top(&mut self, id: NodeId, top: Option<f64>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.top == top {
            return;
        }
        node.constraints.top = top;
        if top.is_some() {
            node.flags.remove(NodeFlags::AUTO_SIZE);
            node.constraints.align_y = None;
            if node.constraints.bottom.is_some() {
                node.constraints.percent_height = None;
            }
        }
        self.resize_y(id);
        self.reposition_y(id);
    }

    /// Constrain the node's bottom edge. See [`set_left`](Self::set_left).
    pub fn set_bottom(&mut self, id: NodeId, bottom: Option<f64>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.bottom == bottom {
            return;
        }
        node.constraints.bottom = bottom;
        if bottom.is_some() {
            node.flags.remove(NodeFlags::AUTO_SIZE);
            node.constraints.align_y = None;
            if node.constraints.top.is_some() {
                node.constraints.percent_height = None;
            }
        }
        self.resize_y(id);
        self.reposition_y(id);
    }

    /// Size the node's width as a 0..1 fraction of the parent's width.
    ///
    /// Disables auto-sizing. If both opposing edges were deriving the width,
    /// the later-written percent wins and the `right` edge is dropped.
    pub fn set_percent_width(&mut self, id: NodeId, percent: Option<f64>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.percent_width == percent {
            return;
        }
        node.constraints.percent_width = percent;
        if percent.is_some() {
            node.flags.remove(NodeFlags::AUTO_SIZE);
            if node.constraints.left.is_some() && node.constraints.right.is_some() {
                node.constraints.right = None;
            }
        }
        self.resize_x(id);
        self.reposition_x(id);
    }

    /// Size the node's height as a 0..1 fraction of the parent's height.
    /// Mirrors [`set_percent_width`](Self::set_percent_width).
    pub fn set_percent_height(&mut self, id: NodeId, percent: Option<f64>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.percent_height == percent {
            return;
        }
        node.constraints.percent_height = percent;
        if percent.is_some() {
            node.flags.remove(NodeFlags::AUTO_SIZE);
            if node.constraints.top.is_some() && node.constraints.bottom.is_some() {
                node.constraints.bottom = None;
            }
        }
        self.resize_y(id);
        self.reposition_y(id);
    }

    /// Align the node horizontally within its parent.
    ///
    /// Ignored while a `left`/`right` edge constraint governs the axis; edge
    /// constraints dominate alignment deterministically.
    pub fn set_align_x(&mut self, id: NodeId, align: Option<AlignX>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.left.is_some() || node.constraints.right.is_some() {
            log::trace!("set_align_x ignored for {id:?}: edge constraint governs the axis");
            return;
        }
        if node.constraints.align_x == align {
            return;
        }
        node.constraints.align_x = align;
        self.reposition_x(id);
    }

    /// Align the node vertically within its parent. Mirrors
    /// [`set_align_x`](Self::set_align_x).
    pub fn set_align_y(&mut self, id: NodeId, align: Option<AlignY>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.constraints.top.is_some() || node.constraints.bottom.is_some() {
            log::trace!("set_align_y ignored for {id:?}: edge constraint governs the axis");
            return;
        }
        if node.constraints.align_y == align {
            return;
        }
        node.constraints.align_y = align;
        self.reposition_y(id);
    }

    // --- texture ---

    /// Attach or clear the node's texture, with an optional source
    /// sub-rectangle.
    ///
    /// When the node still auto-sizes and the texture is ready, the node
    /// adopts the texture's size (the source rect's size, when one is set)
    /// immediately; a not-yet-ready texture is adopted by a later
    /// [`sync_textures`](Self::sync_textures) pass.
    pub fn set_texture(
        &mut self,
        id: NodeId,
        texture: Option<Arc<dyn Texture>>,
        src_rect: Option<Rect>,
    ) {
        if !self.is_alive(id) {
            return;
        }
        self.pending_textures.retain(|p| *p != id);
        match texture {
            None => {
                self.node_mut(id).texture = None;
            }
            Some(source) => {
                let ready = source.ready();
                self.node_mut(id).texture = Some(TextureSlot {
                    source,
                    src_rect,
                    adopted: false,
                });
                if ready {
                    self.adopt_texture_size(id);
                } else {
                    self.pending_textures.push(id);
                }
            }
        }
    }

    /// Poll pending textures and adopt sizes for the ones that became ready.
    /// Called once per frame tick by the stage before the update traversal.
    pub fn sync_textures(&mut self) {
        let pending = mem::take(&mut self.pending_textures);
        for id in pending {
            let Some(node) = self.node_opt(id) else {
                continue;
            };
            match &node.texture {
                Some(slot) if !slot.adopted => {
                    if slot.source.ready() {
                        self.adopt_texture_size(id);
                    } else {
                        self.pending_textures.push(id);
                    }
                }
                _ => {}
            }
        }
    }

    fn adopt_texture_size(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        let Some(slot) = node.texture.as_mut() else {
            return;
        };
        slot.adopted = true;
        if !node.flags.contains(NodeFlags::AUTO_SIZE) {
            return;
        }
        let (w, h) = match slot.src_rect {
            Some(r) => (r.width(), r.height()),
            None => (slot.source.width(), slot.source.height()),
        };
        self.set_width(id, w);
        self.set_height(id, h);
    }

    // --- hooks and listeners ---

    /// Install or clear the per-frame update hook.
    pub fn set_update_hook(&mut self, id: NodeId, hook: Option<UpdateFn>) {
        if let Some(node) = self.node_opt_mut(id) {
            node.on_update = hook;
        }
    }

    /// Install or clear the dedicated callback for one pointer phase.
    pub fn set_pointer_hook(&mut self, id: NodeId, phase: PointerPhase, hook: Option<PointerFn>) {
        if let Some(node) = self.node_opt_mut(id) {
            *node.hooks.slot(phase) = hook;
        }
    }

    /// Append a generic pointer listener; it receives every phase.
    pub fn add_pointer_listener(&mut self, id: NodeId, listener: PointerFn) {
        if let Some(node) = self.node_opt_mut(id) {
            node.listeners.push(listener);
        }
    }

    /// Drop all generic pointer listeners on the node.
    pub fn clear_pointer_listeners(&mut self, id: NodeId) {
        if let Some(node) = self.node_opt_mut(id) {
            node.listeners.clear();
        }
    }

    /// Install the scene-wide teardown hook invoked for every released node.
    pub fn set_teardown_hook(&mut self, hook: Option<TeardownFn>) {
        self.teardown = hook;
    }

    /// Invoke the node's pointer callbacks for `event`: the dedicated phase
    /// hook first, then every generic listener, all with the same data.
    ///
    /// Handlers may mutate the scene freely; hooks and listeners are taken
    /// out for the duration of their call and restored afterwards (unless the
    /// handler replaced them, or released the node).
    pub fn emit_pointer(&mut self, id: NodeId, event: &mut PointerEvent) {
        if let Some(mut hook) = self
            .node_opt_mut(id)
            .and_then(|n| n.hooks.slot(event.phase).take())
        {
            hook(self, event);
            if let Some(node) = self.node_opt_mut(id) {
                let slot = node.hooks.slot(event.phase);
                if slot.is_none() {
                    *slot = Some(hook);
                }
            }
        }
        let mut listeners = match self.node_opt_mut(id) {
            Some(node) => mem::take(&mut node.listeners),
            None => return,
        };
        for f in listeners.iter_mut() {
            f(self, event);
        }
        if let Some(node) = self.node_opt_mut(id) {
            // Keep listeners added during the callbacks, after the originals.
            listeners.append(&mut node.listeners);
            node.listeners = listeners;
        }
    }

    /// Run the per-frame update traversal from `root`, depth first in tree
    /// order. Each level iterates a snapshot of its children, so a handler
    /// adding or removing siblings cannot corrupt the walk; nodes attached
    /// during the pass are first updated on the next frame.
    pub fn update(&mut self, root: NodeId, dt: f64) {
        self.sync_textures();
        self.update_recursive(root, dt);
    }

    fn update_recursive(&mut self, id: NodeId, dt: f64) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if let Some(mut hook) = node.on_update.take() {
            hook(self, id, dt);
            if let Some(node) = self.node_opt_mut(id)
                && node.on_update.is_none()
            {
                node.on_update = Some(hook);
            }
        }
        let kids = match self.node_opt(id) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for k in kids {
            self.update_recursive(k, dt);
        }
    }

    // --- read access ---

    /// Content-box width, or `0.0` for a stale id.
    pub fn width(&self, id: NodeId) -> f64 {
        self.node_opt(id).map_or(0.0, |n| n.width)
    }

    /// Content-box height, or `0.0` for a stale id.
    pub fn height(&self, id: NodeId) -> f64 {
        self.node_opt(id).map_or(0.0, |n| n.height)
    }

    /// Anchor fractions `(origin_x, origin_y)`.
    pub fn origin(&self, id: NodeId) -> (f64, f64) {
        self.node_opt(id).map_or((0.0, 0.0), |n| (n.origin_x, n.origin_y))
    }

    /// Anchor in local pixels; always `origin * size`.
    pub fn origin_px(&self, id: NodeId) -> Vec2 {
        self.node_opt(id).map_or(Vec2::ZERO, |n| n.origin_px)
    }

    /// Anchor position in the parent's space.
    pub fn position(&self, id: NodeId) -> Point {
        self.node_opt(id).map_or(Point::ZERO, |n| Point::new(n.x, n.y))
    }

    /// Rotation in degrees.
    pub fn rotation(&self, id: NodeId) -> f64 {
        self.node_opt(id).map_or(0.0, |n| n.rotation)
    }

    /// Scale factors `(scale_x, scale_y)`.
    pub fn scale(&self, id: NodeId) -> (f64, f64) {
        self.node_opt(id).map_or((1.0, 1.0), |n| (n.scale_x, n.scale_y))
    }

    /// Subtree opacity in 0..1.
    pub fn opacity(&self, id: NodeId) -> f64 {
        self.node_opt(id).map_or(0.0, |n| n.opacity)
    }

    /// Behavior flags, or empty for a stale id.
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.node_opt(id).map_or(NodeFlags::empty(), |n| n.flags)
    }

    /// Shape radius; positive means the node is a circle.
    pub fn radius(&self, id: NodeId) -> f64 {
        self.node_opt(id).map_or(0.0, |n| n.radius)
    }

    /// Offset of the node's top-left corner in the parent's space:
    /// `(x, y) - origin_px`. Children and self-paint are positioned relative
    /// to this corner.
    pub fn top_left(&self, id: NodeId) -> Vec2 {
        self.node_opt(id)
            .map_or(Vec2::ZERO, |n| Vec2::new(n.x - n.origin_px.x, n.y - n.origin_px.y))
    }

    /// The node's parent, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// The node's children in paint order (back to front). Empty for a stale
    /// id; an empty list and "no children" are equivalent.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| n.children.as_slice())
    }

    // --- internals ---

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (self.generations[id.idx()] == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.generations.get(id.idx()) != Some(&id.1) {
            return None;
        }
        self.nodes.get_mut(id.idx())?.as_mut()
    }

    fn node(&self, id: NodeId) -> &Node {
        self.node_opt(id).expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.node_opt_mut(id).expect("dangling NodeId")
    }

    /// Write the width without the public setter's guards and push the new
    /// size through the children in a single top-down relayout pass.
    fn set_width_raw(&mut self, id: NodeId, width: f64) {
        let node = self.node_mut(id);
        node.width = width;
        node.origin_px.x = width * node.origin_x;
        self.relayout_children(id);
    }

    fn set_height_raw(&mut self, id: NodeId, height: f64) {
        let node = self.node_mut(id);
        node.height = height;
        node.origin_px.y = height * node.origin_y;
        self.relayout_children(id);
    }

    /// Re-derive the node's width from percent/edge constraints against the
    /// parent's current width. No-op for unparented or unconstrained nodes.
    fn resize_x(&mut self, id: NodeId) {
        let Some(pid) = self.node(id).parent else {
            return;
        };
        let pw = self.node(pid).width;
        let c = self.node(id).constraints;
        let new_width = if let (Some(l), Some(r)) = (c.left, c.right) {
            Some((pw - l - r).max(0.0))
        } else {
            c.percent_width.map(|p| pw * p)
        };
        if let Some(w) = new_width
            && w != self.node(id).width
        {
            self.set_width_raw(id, w);
        }
    }

    fn resize_y(&mut self, id: NodeId) {
        let Some(pid) = self.node(id).parent else {
            return;
        };
        let ph = self.node(pid).height;
        let c = self.node(id).constraints;
        let new_height = if let (Some(t), Some(b)) = (c.top, c.bottom) {
            Some((ph - t - b).max(0.0))
        } else {
            c.percent_height.map(|p| ph * p)
        };
        if let Some(h) = new_height
            && h != self.node(id).height
        {
            self.set_height_raw(id, h);
        }
    }

    /// Re-derive `x` from the active edge constraint, or re-apply alignment.
    fn reposition_x(&mut self, id: NodeId) {
        let Some(pid) = self.node(id).parent else {
            return;
        };
        let pw = self.node(pid).width;
        let node = self.node_mut(id);
        let opx = node.origin_px.x;
        let w = node.width;
        match (node.constraints.left, node.constraints.right) {
            (Some(l), _) => node.x = l + opx,
            (None, Some(r)) => node.x = pw - r - w + opx,
            (None, None) => {
                if let Some(a) = node.constraints.align_x {
                    node.x = opx
                        + match a {
                            AlignX::Left => 0.0,
                            AlignX::Center => (pw - w) / 2.0,
                            AlignX::Right => pw - w,
                        };
                }
            }
        }
    }

    fn reposition_y(&mut self, id: NodeId) {
        let Some(pid) = self.node(id).parent else {
            return;
        };
        let ph = self.node(pid).height;
        let node = self.node_mut(id);
        let opy = node.origin_px.y;
        let h = node.height;
        match (node.constraints.top, node.constraints.bottom) {
            (Some(t), _) => node.y = t + opy,
            (None, Some(b)) => node.y = ph - b - h + opy,
            (None, None) => {
                if let Some(a) = node.constraints.align_y {
                    node.y = opy
                        + match a {
                            AlignY::Top => 0.0,
                            AlignY::Center => (ph - h) / 2.0,
                            AlignY::Bottom => ph - h,
                        };
                }
            }
        }
    }

    /// Single top-down relayout: every child re-evaluates its own
    /// percent/edge/alignment constraints against this node's new size.
    fn relayout_children(&mut self, id: NodeId) {
        let kids = self.node(id).children.clone();
        for k in kids {
            self.resize_x(k);
            self.resize_y(k);
            self.reposition_x(k);
            self.reposition_y(k);
        }
    }
}
