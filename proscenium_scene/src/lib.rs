// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proscenium Scene: a retained-mode 2D node tree.
//!
//! This crate is the heart of the Proscenium engine. It manages a tree of
//! sprites ("nodes") with anchor-relative transforms, constraint-based layout,
//! paint attributes, and pointer hooks, and walks that tree to produce an
//! ordered sequence of drawing commands against an abstract [`Surface`].
//!
//! - Nodes live in a [`Scene`]: a generational slab addressed by [`NodeId`].
//!   Released slots are recycled; stale ids fail the generation check and all
//!   operations on them are silent no-ops.
//! - Layout constraints (edge offsets, percent sizes, alignment) are
//!   re-evaluated synchronously whenever a parent resizes. Propagation is a
//!   single top-down pass; constraint cycles are not supported.
//! - Mutations apply immediately. There is no diffing or deferred
//!   reconciliation step.
//!
//! ## Coordinate model
//!
//! Every node has an anchor ("origin") expressed as a 0..1 fraction of its
//! size, defaulting to the center. `x`/`y` position the anchor in the parent's
//! space; rotation and scale pivot around it. Children are positioned relative
//! to the node's top-left corner, not its anchor.
//!
//! ## Minimal usage
//!
//! ```
//! use proscenium_scene::{NodeInit, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.insert(NodeInit {
//!     width: 200.0,
//!     height: 200.0,
//!     origin_x: 0.0,
//!     origin_y: 0.0,
//!     ..Default::default()
//! });
//!
//! let child = scene.insert(NodeInit {
//!     width: 60.0,
//!     height: 60.0,
//!     ..Default::default()
//! });
//! scene.add_child(root, child).unwrap();
//!
//! // Edge constraints derive geometry from the parent.
//! scene.set_left(child, Some(10.0));
//! scene.set_right(child, Some(20.0));
//! assert_eq!(scene.width(child), 170.0);
//!
//! scene.set_width(root, 300.0);
//! assert_eq!(scene.width(child), 270.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod event;
pub mod paint;
pub mod texture;

mod tree;
mod types;

pub use event::{PointerDevice, PointerEvent, PointerPhase};
pub use paint::{DisplayList, PaintOp, Surface, shape_contains, visit};
pub use texture::Texture;
pub use tree::{Error, PointerFn, Scene, TeardownFn, UpdateFn};
pub use types::{AlignX, AlignY, BlendMode, Color, NodeFlags, NodeId, NodeInit, Stroke};
