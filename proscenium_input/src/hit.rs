// Copyright 2025 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point picking against the scene tree.

use kurbo::{Point, Vec2};
use proscenium_scene::{NodeFlags, NodeId, Scene, shape_contains};

/// Find the topmost interactive node under `point`.
///
/// `point` is in the space the root's position lives in; for a stage root
/// that is stage space. Returns the hit node and the point relative to its
/// top-left corner.
///
/// Rules, applied recursively:
///
/// - invisible or pointer-disabled nodes exclude their whole subtree;
/// - a clipping node whose shape does not contain the point excludes its
///   whole subtree, children overflowing the clip included;
/// - children are tried in reverse insertion order (topmost paints last,
///   picks first) and the first hit wins;
/// - the node itself is hit when its shape (circle when the radius is
///   positive, box otherwise) contains the point.
///
/// Picking ignores rotation and scale; containment is evaluated against the
/// laid-out box the same way layout positions it.
pub fn hit_test(scene: &Scene, id: NodeId, point: Point) -> Option<(NodeId, Point)> {
    if !scene.is_alive(id) {
        return None;
    }
    let flags = scene.flags(id);
    if !flags.contains(NodeFlags::VISIBLE) || !flags.contains(NodeFlags::POINTER_ENABLED) {
        return None;
    }
    let local = point - scene.top_left(id);
    let inside = shape_contains(scene, id, local);
    if flags.contains(NodeFlags::CLIP_OVERFLOW) && !inside {
        return None;
    }
    for &child in scene.children(id).iter().rev() {
        if let Some(hit) = hit_test(scene, child, local) {
            return Some(hit);
        }
    }
    inside.then_some((id, local))
}

/// Accumulated stage-space position of the node's top-left corner.
///
/// This is the offset every ancestor's top-left contributes along the parent
/// chain; subtracting it from a stage point yields the node-local position.
pub fn node_stage_origin(scene: &Scene, id: NodeId) -> Vec2 {
    let mut origin = Vec2::ZERO;
    let mut cur = Some(id);
    while let Some(n) = cur {
        origin += scene.top_left(n);
        cur = scene.parent(n);
    }
    origin
}
