// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constraint layout on a small node tree.
//!
//! Builds a panel with an edge-stretched header, a percent-sized body, and an
//! aligned badge, then resizes the panel and prints how every box follows.
//!
//! Run:
//! - `cargo run -p proscenium_demos --example scene_layout`

use proscenium_scene::{AlignX, AlignY, NodeId, NodeInit, Scene};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let panel = scene.insert(NodeInit {
        width: 400.0,
        height: 300.0,
        origin_x: 0.0,
        origin_y: 0.0,
        ..Default::default()
    });

    // Header: pinned to both horizontal edges, so its width is derived.
    let header = scene.insert(NodeInit {
        height: 40.0,
        origin_x: 0.0,
        origin_y: 0.0,
        ..Default::default()
    });
    scene.add_child(panel, header).unwrap();
    scene.set_left(header, Some(10.0));
    scene.set_right(header, Some(10.0));
    scene.set_top(header, Some(10.0));

    // Body: half the panel's width, centered.
    let body = scene.insert(NodeInit {
        height: 200.0,
        ..Default::default()
    });
    scene.add_child(panel, body).unwrap();
    scene.set_percent_width(body, Some(0.5));
    scene.set_align_x(body, Some(AlignX::Center));
    scene.set_align_y(body, Some(AlignY::Center));

    // Badge: fixed size, tucked into the bottom-right corner.
    let badge = scene.insert(NodeInit {
        width: 32.0,
        height: 32.0,
        ..Default::default()
    });
    scene.add_child(panel, badge).unwrap();
    scene.set_right(badge, Some(8.0));
    scene.set_bottom(badge, Some(8.0));

    println!("panel at 400x300:");
    print_box(&scene, "header", header);
    print_box(&scene, "body", body);
    print_box(&scene, "badge", badge);

    // One resize; every constraint re-evaluates in the same pass.
    scene.set_size(panel, 640.0, 360.0);
    println!("\npanel at 640x360:");
    print_box(&scene, "header", header);
    print_box(&scene, "body", body);
    print_box(&scene, "badge", badge);
}

fn print_box(scene: &Scene, label: &str, id: NodeId) {
    let tl = scene.top_left(id);
    println!(
        "  {label:>6}: {:>5.1},{:>5.1}  {:.0}x{:.0}",
        tl.x,
        tl.y,
        scene.width(id),
        scene.height(id),
    );
}
