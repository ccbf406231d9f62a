// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proscenium Input: hit testing and pointer dispatch for the scene tree.
//!
//! The [`Dispatcher`] turns raw platform pointer reports into the scene's
//! bubbled [`PointerEvent`](proscenium_scene::PointerEvent)s:
//!
//! - Hit testing walks the tree last-child-first, so the topmost painted node
//!   under the point wins. A clipping node whose shape misses the point gates
//!   its whole subtree out.
//! - Each touch point runs an independent session locked to the node it went
//!   down on; moves and the release are delivered there even if the finger
//!   strays off the node.
//! - The mouse is either pressed (session semantics, like a touch) or
//!   hovering (moves follow the hit test), never both.
//! - A release that stayed within the click threshold of its press position
//!   synthesizes a `Click` after the `Up`.
//!
//! Events bubble from the hit node to the root; a handler opts out with
//! [`stop_propagation`](proscenium_scene::PointerEvent::stop_propagation).
//! With the `std` feature, a panicking handler is caught at the dispatch
//! boundary and logged instead of unwinding into the caller's frame loop.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod dispatcher;
mod hit;
mod types;

pub use dispatcher::Dispatcher;
pub use hit::{hit_test, node_stage_origin};
pub use types::{RawPhase, RawPointer};
