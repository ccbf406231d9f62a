// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! How each fit mode maps a 320x480 design onto a 640x480 window.
//!
//! Prints the resolved scale, centering offset, and visible design rect per
//! mode, then steps a running stage a few frames to show the clock.
//!
//! Run:
//! - `cargo run -p proscenium_demos --example stage_fit_modes`

use proscenium_stage::{FitMode, Orientation, Stage, Viewport};

fn main() {
    env_logger::init();

    let modes = [
        FitMode::ShowAll,
        FitMode::NoBorder,
        FitMode::FixWidth,
        FitMode::FixHeight,
        FitMode::ExactFit,
    ];

    println!("design 320x480 into container 640x480:");
    for mode in modes {
        let mut viewport = Viewport::new(320.0, 480.0, mode);
        viewport.set_container_size(640.0, 480.0);
        let (sx, sy) = viewport.scale();
        let off = viewport.offset();
        let vis = viewport.visible_rect();
        println!(
            "  {mode:>9?}: scale {sx:.2}x{sy:.2}  offset ({:+.0},{:+.0})  visible {:.0}x{:.0}",
            off.x,
            off.y,
            vis.width(),
            vis.height(),
        );
    }

    // A stage wires the same viewport to a scene and a frame clock.
    let mut stage = Stage::new(320.0, 480.0, FitMode::ShowAll, Orientation::Upright);
    stage.set_container_size(640.0, 480.0);
    stage.start();
    for _ in 0..120 {
        stage.step(1.0 / 60.0);
    }
    println!(
        "\nstepped {} frames, {:.2}s elapsed, ~{:.0} fps",
        stage.clock().frames(),
        stage.clock().elapsed(),
        stage.clock().fps(),
    );
}
