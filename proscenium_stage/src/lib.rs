// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proscenium Stage: frame driving and resolution fitting.
//!
//! A [`Stage`] owns a scene, a design-sized root node, a [`Viewport`] that
//! maps the fixed design resolution onto whatever container the host
//! provides, and a pointer dispatcher fed through that mapping. The host
//! drives it with three calls per frame: feed pointer reports, [`Stage::step`]
//! with the elapsed time, and [`Stage::render`] into a [`Framebuffer`].
//!
//! Scene logic is written once against the design resolution; the viewport's
//! [`FitMode`] decides how that resolution meets the real container
//! (letterboxing, cropping, stretching, or axis-locked scaling), and
//! [`Orientation`] optionally presents the whole stage rotated a quarter turn
//! with the container's dimensions swapped.
//!
//! This crate is `no_std` and uses `alloc`; the Instant-backed [`Ticker`]
//! needs the `std` feature.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod clock;
mod stage;
mod viewport;

pub use clock::FrameClock;
#[cfg(feature = "std")]
pub use clock::Ticker;
pub use stage::{Framebuffer, Stage};
pub use viewport::{FitMode, Orientation, Viewport};
