// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, flags, alignment, and paint
//! attributes.

use crate::texture::Texture;
use alloc::sync::Arc;
use kurbo::Rect;

/// Identifier for a node in the scene.
///
/// This is a small, copyable handle that stays stable across updates but
/// becomes invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On release, the slot is freed; any existing `NodeId` that pointed to that
///   slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new,
///   distinct `NodeId`.
///
/// Stale ids never alias a different live node because the generation must
/// match. Mutations through a stale id are silent no-ops, which is how the
/// scene realizes release-then-observe safety: a holder of a released id sees
/// "missing", never a half-torn-down node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility, picking, clipping, and auto-sizing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible (drawn, and its subtree participates in hit testing).
        const VISIBLE         = 0b0000_0001;
        /// Node and its subtree respond to pointer/touch input.
        const POINTER_ENABLED = 0b0000_0010;
        /// Self-paint and descendants are clipped to the node's shape.
        const CLIP_OVERFLOW   = 0b0000_0100;
        /// Node adopts its texture's size once the texture is ready.
        /// Cleared by any edge or percent constraint.
        const AUTO_SIZE       = 0b0000_1000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::POINTER_ENABLED | Self::AUTO_SIZE
    }
}

/// Horizontal alignment of a node within its parent.
///
/// Alignment is anchor-relative positioning: the node's box is placed against
/// the parent's box and `x` is rewritten so the anchor lands accordingly.
/// An active `left`/`right` edge constraint takes precedence on this axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AlignX {
    /// Flush with the parent's left edge.
    Left,
    /// Centered horizontally.
    Center,
    /// Flush with the parent's right edge.
    Right,
}

/// Vertical alignment of a node within its parent.
///
/// See [`AlignX`]; the same precedence rule applies against `top`/`bottom`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AlignY {
    /// Flush with the parent's top edge.
    Top,
    /// Centered vertically.
    Center,
    /// Flush with the parent's bottom edge.
    Bottom,
}

/// Compositing mode applied to a node's subtree.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BlendMode {
    /// Source-over compositing.
    #[default]
    Normal,
    /// Additive compositing.
    Add,
    /// Multiplicative compositing.
    Multiply,
    /// Screen compositing.
    Screen,
}

/// A non-premultiplied 8-bit RGBA color.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// An opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Border stroke attributes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in local units.
    pub width: f64,
}

/// Mutually exclusive layout constraint groups, last-writer-wins.
///
/// Edge offsets are measured from the parent's box; percent sizes are 0..1
/// fractions of the parent's size. When both opposing edges of an axis are
/// set, the size on that axis is derived and not independently settable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Constraints {
    pub(crate) top: Option<f64>,
    pub(crate) right: Option<f64>,
    pub(crate) bottom: Option<f64>,
    pub(crate) left: Option<f64>,
    pub(crate) percent_width: Option<f64>,
    pub(crate) percent_height: Option<f64>,
    pub(crate) align_x: Option<AlignX>,
    pub(crate) align_y: Option<AlignY>,
}

/// Texture attachment on a node.
#[derive(Clone)]
pub(crate) struct TextureSlot {
    pub(crate) source: Arc<dyn Texture>,
    pub(crate) src_rect: Option<Rect>,
    /// Whether the node has already adopted this texture's size.
    pub(crate) adopted: bool,
}

/// Initial attribute bag for [`Scene::insert`](crate::Scene::insert).
///
/// Use struct-update syntax to override the handful of attributes you care
/// about. Layout constraints are applied through their setters after the node
/// is attached, because they read the parent's geometry.
#[derive(Clone, Debug)]
pub struct NodeInit {
    /// Content-box width.
    pub width: f64,
    /// Content-box height.
    pub height: f64,
    /// Anchor fraction along x (0..1). Defaults to the center.
    pub origin_x: f64,
    /// Anchor fraction along y (0..1). Defaults to the center.
    pub origin_y: f64,
    /// Anchor position in the parent's space.
    pub x: f64,
    /// Anchor position in the parent's space.
    pub y: f64,
    /// Horizontal scale about the anchor.
    pub scale_x: f64,
    /// Vertical scale about the anchor.
    pub scale_y: f64,
    /// Rotation about the anchor, in degrees.
    pub rotation: f64,
    /// Opacity in 0..1, multiplied down the subtree.
    pub opacity: f64,
    /// Background fill, if any.
    pub background: Option<Color>,
    /// Border stroke, if any.
    pub border: Option<Stroke>,
    /// When positive, the node's shape is a circle of this radius centered in
    /// its box, for painting, clipping, and hit testing alike.
    pub radius: f64,
    /// Compositing mode.
    pub blend: BlendMode,
    /// Behavior flags.
    pub flags: NodeFlags,
}

impl Default for NodeInit {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            origin_x: 0.5,
            origin_y: 0.5,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            background: None,
            border: None,
            radius: 0.0,
            blend: BlendMode::Normal,
            flags: NodeFlags::default(),
        }
    }
}
