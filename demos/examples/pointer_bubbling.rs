// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing and bubbled pointer delivery.
//!
//! Two overlapping buttons sit on a panel; a tap lands on the topmost one and
//! bubbles to the panel unless the button stops propagation. A quick tap
//! also synthesizes a click, while a drag past the threshold does not.
//!
//! Run:
//! - `cargo run -p proscenium_demos --example pointer_bubbling`

use kurbo::Point;
use proscenium_input::{Dispatcher, RawPhase, RawPointer};
use proscenium_scene::{NodeInit, PointerDevice, Scene};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let panel = scene.insert(NodeInit {
        width: 400.0,
        height: 400.0,
        origin_x: 0.0,
        origin_y: 0.0,
        ..Default::default()
    });
    let lower = scene.insert(NodeInit {
        width: 150.0,
        height: 150.0,
        x: 50.0,
        y: 50.0,
        origin_x: 0.0,
        origin_y: 0.0,
        ..Default::default()
    });
    let upper = scene.insert(NodeInit {
        width: 150.0,
        height: 150.0,
        x: 120.0,
        y: 120.0,
        origin_x: 0.0,
        origin_y: 0.0,
        ..Default::default()
    });
    scene.add_child(panel, lower).unwrap();
    scene.add_child(panel, upper).unwrap();

    for (id, label) in [(panel, "panel"), (lower, "lower"), (upper, "upper")] {
        scene.add_pointer_listener(
            id,
            Box::new(move |_, ev| {
                println!(
                    "  {label:>5} saw {:?} at local ({:.0},{:.0})",
                    ev.phase, ev.local.x, ev.local.y
                );
            }),
        );
    }
    // The lower button keeps its events to itself.
    scene.add_pointer_listener(lower, Box::new(|_, ev| ev.stop_propagation()));

    let mut dispatcher = Dispatcher::new();

    println!("tap on the overlap (topmost wins, bubbles to the panel):");
    tap(&mut dispatcher, &mut scene, panel, Point::new(140.0, 140.0));

    println!("tap on the lower button (propagation stopped):");
    tap(&mut dispatcher, &mut scene, panel, Point::new(60.0, 60.0));

    println!("drag across the stage (no click synthesized):");
    dispatcher.dispatch_batch(
        &mut scene,
        panel,
        [
            RawPointer::new(PointerDevice::Touch(1), RawPhase::Down, Point::new(140.0, 140.0)),
            RawPointer::new(PointerDevice::Touch(1), RawPhase::Move, Point::new(300.0, 140.0)),
            RawPointer::new(PointerDevice::Touch(1), RawPhase::Up, Point::new(300.0, 140.0)),
        ],
    );
}

fn tap(dispatcher: &mut Dispatcher, scene: &mut Scene, root: proscenium_scene::NodeId, at: Point) {
    dispatcher.dispatch_batch(
        scene,
        root,
        [
            RawPointer::new(PointerDevice::Touch(1), RawPhase::Down, at),
            RawPointer::new(PointerDevice::Touch(1), RawPhase::Up, at),
        ],
    );
}
