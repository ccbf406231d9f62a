// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping the fixed design resolution onto the host container.

use kurbo::{Point, Rect, Vec2};

/// How the design resolution meets a container of a different size or
/// aspect ratio.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FitMode {
    /// Uniform scale so the whole design area is visible; the spare axis is
    /// letterboxed (centered with empty margins).
    #[default]
    ShowAll,
    /// Uniform scale so the whole container is covered; the overflowing axis
    /// is cropped symmetrically.
    NoBorder,
    /// Uniform scale locked to the width; the vertical axis letterboxes or
    /// crops as the aspect ratio dictates.
    FixWidth,
    /// Uniform scale locked to the height; the horizontal axis letterboxes
    /// or crops as the aspect ratio dictates.
    FixHeight,
    /// Independent per-axis scale filling the container exactly, distorting
    /// the aspect ratio.
    ExactFit,
}

/// Quarter-turn presentation of the whole stage.
///
/// A rotated stage is fitted against the container with its dimensions
/// swapped, and pointer positions are un-rotated before hit testing.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Orientation {
    /// No rotation.
    #[default]
    Upright,
    /// Stage rotated a quarter turn counter-clockwise in the container.
    RotatedLeft,
    /// Stage rotated a quarter turn clockwise in the container.
    RotatedRight,
}

/// The resolved design-to-container mapping.
///
/// Scale and offset are recomputed eagerly whenever the container, fit mode,
/// or orientation change; reads never recompute.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    design_width: f64,
    design_height: f64,
    container_width: f64,
    container_height: f64,
    mode: FitMode,
    orientation: Orientation,
    scale_x: f64,
    scale_y: f64,
    offset: Vec2,
}

impl Viewport {
    /// A viewport presenting `design` into an equally sized container.
    pub fn new(design_width: f64, design_height: f64, mode: FitMode) -> Self {
        let mut v = Self {
            design_width,
            design_height,
            container_width: design_width,
            container_height: design_height,
            mode,
            orientation: Orientation::Upright,
            scale_x: 1.0,
            scale_y: 1.0,
            offset: Vec2::ZERO,
        };
        v.refit();
        v
    }

    /// Design resolution `(width, height)`.
    pub fn design_size(&self) -> (f64, f64) {
        (self.design_width, self.design_height)
    }

    /// Container size `(width, height)`, unswapped.
    pub fn container_size(&self) -> (f64, f64) {
        (self.container_width, self.container_height)
    }

    /// The active fit mode.
    pub fn fit_mode(&self) -> FitMode {
        self.mode
    }

    /// The active orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Per-axis design-to-container scale factors.
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    /// Centering offset in presented-container space. Positive on a
    /// letterboxed axis, negative on a cropped one.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Adopt a new container size.
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container_width = width;
        self.container_height = height;
        self.refit();
    }

    /// Switch the fit mode.
    pub fn set_fit_mode(&mut self, mode: FitMode) {
        self.mode = mode;
        self.refit();
    }

    /// Switch the orientation.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.refit();
    }

    /// Container dimensions as the fit sees them, swapped when rotated.
    fn presented_container(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Upright => (self.container_width, self.container_height),
            Orientation::RotatedLeft | Orientation::RotatedRight => {
                (self.container_height, self.container_width)
            }
        }
    }

    fn refit(&mut self) {
        let (cw, ch) = self.presented_container();
        let sx = cw / self.design_width;
        let sy = ch / self.design_height;
        (self.scale_x, self.scale_y) = match self.mode {
            FitMode::ShowAll => {
                let s = sx.min(sy);
                (s, s)
            }
            FitMode::NoBorder => {
                let s = sx.max(sy);
                (s, s)
            }
            FitMode::FixWidth => (sx, sx),
            FitMode::FixHeight => (sy, sy),
            FitMode::ExactFit => (sx, sy),
        };
        // Centering is uniform across modes: zero when an axis fits exactly,
        // positive margin when letterboxed, negative when cropped.
        self.offset = Vec2::new(
            (cw - self.design_width * self.scale_x) / 2.0,
            (ch - self.design_height * self.scale_y) / 2.0,
        );
    }

    /// The part of design space the container actually shows.
    ///
    /// Equals the design rect under `ShowAll` and `ExactFit`; larger on a
    /// letterboxed axis, smaller on a cropped one.
    pub fn visible_rect(&self) -> Rect {
        let (cw, ch) = self.presented_container();
        let x0 = -self.offset.x / self.scale_x;
        let y0 = -self.offset.y / self.scale_y;
        Rect::new(x0, y0, x0 + cw / self.scale_x, y0 + ch / self.scale_y)
    }

    /// Map a container-space point (window coordinates) to design space.
    pub fn to_design(&self, client: Point) -> Point {
        let p = self.unrotate(client);
        Point::new(
            (p.x - self.offset.x) / self.scale_x,
            (p.y - self.offset.y) / self.scale_y,
        )
    }

    /// Map a design-space point back to container space.
    pub fn to_client(&self, design: Point) -> Point {
        let p = Point::new(
            design.x * self.scale_x + self.offset.x,
            design.y * self.scale_y + self.offset.y,
        );
        self.rotate(p)
    }

    /// Container point into presented-frame coordinates.
    fn unrotate(&self, p: Point) -> Point {
        match self.orientation {
            Orientation::Upright => p,
            Orientation::RotatedRight => Point::new(p.y, self.container_width - p.x),
            Orientation::RotatedLeft => Point::new(self.container_height - p.y, p.x),
        }
    }

    /// Presented-frame point back into container coordinates.
    fn rotate(&self, p: Point) -> Point {
        match self.orientation {
            Orientation::Upright => p,
            Orientation::RotatedRight => Point::new(self.container_width - p.y, p.x),
            Orientation::RotatedLeft => Point::new(p.y, self.container_height - p.x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted(mode: FitMode) -> Viewport {
        let mut v = Viewport::new(320.0, 480.0, mode);
        v.set_container_size(640.0, 480.0);
        v
    }

    #[test]
    fn show_all_letterboxes_the_spare_axis() {
        let v = fitted(FitMode::ShowAll);
        assert_eq!(v.scale(), (1.0, 1.0));
        // The design fills the height; the width is centered with margins.
        assert_eq!(v.offset(), Vec2::new(160.0, 0.0));
        let vis = v.visible_rect();
        assert_eq!(vis.width(), 640.0);
        assert_eq!(vis.x0, -160.0);
        assert_eq!(vis.height(), 480.0);
    }

    #[test]
    fn no_border_covers_and_crops_symmetrically() {
        let v = fitted(FitMode::NoBorder);
        assert_eq!(v.scale(), (2.0, 2.0));
        // The cropped axis has a negative centering offset and a smaller
        // visible extent.
        assert_eq!(v.offset(), Vec2::new(0.0, -240.0));
        let vis = v.visible_rect();
        assert_eq!(vis.height(), 240.0);
        assert_eq!(vis.y0, 120.0);
        assert_eq!(vis.y1, 360.0);
    }

    #[test]
    fn fixed_axis_modes_lock_one_scale() {
        let v = fitted(FitMode::FixWidth);
        assert_eq!(v.scale(), (2.0, 2.0));
        let v = fitted(FitMode::FixHeight);
        assert_eq!(v.scale(), (1.0, 1.0));
    }

    #[test]
    fn exact_fit_stretches_per_axis() {
        let v = fitted(FitMode::ExactFit);
        assert_eq!(v.scale(), (2.0, 1.0));
        assert_eq!(v.offset(), Vec2::ZERO);
        assert_eq!(v.visible_rect(), Rect::new(0.0, 0.0, 320.0, 480.0));
    }

    #[test]
    fn round_trips_between_client_and_design() {
        for mode in [
            FitMode::ShowAll,
            FitMode::NoBorder,
            FitMode::FixWidth,
            FitMode::FixHeight,
            FitMode::ExactFit,
        ] {
            let v = fitted(mode);
            let p = Point::new(100.0, 200.0);
            let back = v.to_client(v.to_design(p));
            assert!((back - p).hypot() < 1e-9, "{mode:?}: {back:?}");
        }
    }

    #[test]
    fn show_all_maps_the_letterbox_edge_to_design_zero() {
        let v = fitted(FitMode::ShowAll);
        // The left margin is 160 client pixels wide.
        assert_eq!(v.to_design(Point::new(160.0, 0.0)), Point::new(0.0, 0.0));
        assert_eq!(v.to_design(Point::new(480.0, 480.0)), Point::new(320.0, 480.0));
    }

    #[test]
    fn rotation_swaps_the_fitted_dimensions() {
        let mut v = Viewport::new(320.0, 480.0, FitMode::ShowAll);
        v.set_container_size(480.0, 320.0);
        // Upright, a landscape container squeezes the portrait design.
        assert_eq!(v.scale(), (2.0 / 3.0, 2.0 / 3.0));

        // Rotated, the container presents as 320x480 and fits exactly.
        v.set_orientation(Orientation::RotatedRight);
        assert_eq!(v.scale(), (1.0, 1.0));
        assert_eq!(v.offset(), Vec2::ZERO);
    }

    #[test]
    fn rotated_pointer_positions_are_unrotated() {
        let mut v = Viewport::new(320.0, 480.0, FitMode::ShowAll);
        v.set_container_size(480.0, 320.0);
        v.set_orientation(Orientation::RotatedRight);

        // Design origin sits at the container's top-right corner when the
        // stage is rotated clockwise.
        assert_eq!(v.to_design(Point::new(480.0, 0.0)), Point::new(0.0, 0.0));
        assert_eq!(v.to_design(Point::new(0.0, 320.0)), Point::new(320.0, 480.0));
        let p = Point::new(123.0, 45.0);
        assert!((v.to_client(v.to_design(p)) - p).hypot() < 1e-9);

        v.set_orientation(Orientation::RotatedLeft);
        assert_eq!(v.to_design(Point::new(0.0, 320.0)), Point::new(0.0, 0.0));
        let p = Point::new(123.0, 45.0);
        assert!((v.to_client(v.to_design(p)) - p).hypot() < 1e-9);
    }
}
