// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The texture-provider seam.
//!
//! Texture loading and caching are external concerns. The scene only needs a
//! readiness flag and intrinsic dimensions, plus an opaque handle it can pass
//! back to the paint backend via [`Surface::draw_image`](crate::Surface::draw_image).
//!
//! A texture that is not yet ready may still be attached to a node; the node
//! adopts the texture's size on a later frame tick once `ready()` reports
//! true, provided auto-sizing is still active for that node.

/// A drawable pixel source with intrinsic dimensions.
///
/// Implementations are typically thin handles over decoded images or GPU
/// resources owned by the host application.
pub trait Texture {
    /// Whether the pixel data is available for drawing and the dimensions are
    /// final.
    fn ready(&self) -> bool;

    /// Intrinsic width in design units. Only meaningful once [`ready`](Self::ready).
    fn width(&self) -> f64;

    /// Intrinsic height in design units. Only meaningful once [`ready`](Self::ready).
    fn height(&self) -> f64;
}

impl core::fmt::Debug for dyn Texture {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Texture")
            .field("ready", &self.ready())
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
