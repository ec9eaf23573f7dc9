// File: crates/stream-core/tests/scene.rs
// Purpose: Keyed joins and clocked attribute transitions on the retained scene.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use stream_core::{Attr, AttrValue, Scene, Shape, Timing};

fn keys(ks: &[&str]) -> Vec<String> {
    ks.iter().map(|k| k.to_string()).collect()
}

fn num(scene: &Scene, id: stream_core::NodeId, attr: Attr) -> f64 {
    match scene.attr(id, attr) {
        Some(AttrValue::Num(v)) => v,
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn join_partitions_enter_update_exit() {
    let mut scene = Scene::new();
    let root = scene.surface();
    let first = scene.join(root, "bar", &keys(&["a", "b"]), |_| Shape::rect(0.0, 0.0, 1.0, 1.0));
    assert_eq!(first.enter.len(), 2);
    assert!(first.update.is_empty() && first.exit.is_empty());

    let second = scene.join(root, "bar", &keys(&["b", "c"]), |_| Shape::rect(0.0, 0.0, 1.0, 1.0));
    assert_eq!(second.update, vec![(0, first.enter[1].1)]);
    assert_eq!(second.enter.len(), 1);
    assert_eq!(second.exit, vec![first.enter[0].1]);
    let merged: Vec<usize> = second.merged().into_iter().map(|(i, _)| i).collect();
    assert_eq!(merged, vec![0, 1]);
}

#[test]
fn join_ignores_other_classes_and_duplicate_keys() {
    let mut scene = Scene::new();
    let root = scene.surface();
    scene.append_keyed(root, "label", "a", Shape::Group);
    let j = scene.join(root, "bar", &keys(&["a", "a"]), |_| Shape::Group);
    assert_eq!(j.enter.len(), 1);
    assert_eq!(scene.children(root).len(), 2);
}

#[test]
fn transition_eases_over_duration() {
    let mut scene = Scene::new();
    let id = scene.append(scene.surface(), "bar", Shape::rect(0.0, 0.0, 10.0, 10.0));
    scene.transition(id, Attr::X, AttrValue::Num(100.0), Timing::new(100.0));
    scene.advance(50.0);
    assert!((num(&scene, id, Attr::X) - 50.0).abs() < 1e-9);
    scene.advance(25.0);
    let x = num(&scene, id, Attr::X);
    assert!(x > 75.0 && x < 100.0, "cubic easing is past linear at 3/4: {x}");
    scene.advance(100.0);
    assert_eq!(num(&scene, id, Attr::X), 100.0);
    assert_eq!(scene.pending_transitions(), 0);
}

#[test]
fn delayed_transition_waits() {
    let mut scene = Scene::new();
    let id = scene.append(scene.surface(), "bar", Shape::rect(0.0, 0.0, 10.0, 10.0));
    scene.transition(id, Attr::Width, AttrValue::Num(20.0), Timing::new(100.0).with_delay(50.0));
    scene.advance(40.0);
    assert_eq!(num(&scene, id, Attr::Width), 10.0);
    scene.settle();
    assert_eq!(num(&scene, id, Attr::Width), 20.0);
}

#[test]
fn newer_transition_supersedes() {
    let mut scene = Scene::new();
    let id = scene.append(scene.surface(), "bar", Shape::rect(0.0, 0.0, 10.0, 10.0));
    scene.transition(id, Attr::Y, AttrValue::Num(100.0), Timing::new(300.0));
    scene.advance(100.0);
    scene.transition(id, Attr::Y, AttrValue::Num(-50.0), Timing::new(300.0));
    assert_eq!(scene.pending_transitions(), 1);
    scene.settle();
    assert_eq!(num(&scene, id, Attr::Y), -50.0);
}

#[test]
fn color_transition_reaches_target() {
    let mut scene = Scene::new();
    let id = scene.append(scene.surface(), "bar", Shape::rect(0.0, 0.0, 10.0, 10.0));
    scene.set_fill(id, skia_safe::Color::RED);
    scene.transition(id, Attr::Fill, AttrValue::Color(skia_safe::Color::BLUE), Timing::new(500.0).with_delay(500.0));
    scene.settle();
    assert_eq!(scene.style(id).and_then(|s| s.fill), Some(skia_safe::Color::BLUE));
}

#[test]
fn fade_out_removes_unless_revived() {
    let mut scene = Scene::new();
    let root = scene.surface();
    let j = scene.join(root, "bar", &keys(&["a", "b"]), |_| Shape::Group);
    let (a, b) = (j.enter[0].1, j.enter[1].1);

    let j = scene.join(root, "bar", &keys(&[]), |_| Shape::Group);
    for id in j.exit {
        scene.fade_out_and_remove(id, Timing::new(500.0));
    }
    scene.advance(250.0);
    assert!(scene.get(a).is_some_and(|n| n.is_exiting()));

    // "a" rejoins mid-fade: same node, no duplicate.
    let j = scene.join(root, "bar", &keys(&["a"]), |_| Shape::Group);
    assert_eq!(j.update, vec![(0, a)]);
    assert!(j.enter.is_empty());
    assert!(j.exit.is_empty(), "fading nodes are not exited twice");

    scene.settle();
    assert!(scene.contains(a));
    assert!(!scene.contains(b));
    assert_eq!(scene.children(root), &[a]);
}

#[test]
fn remove_drops_subtree_and_transitions() {
    let mut scene = Scene::new();
    let g = scene.append(scene.surface(), "g", Shape::Group);
    let child = scene.append(g, "bar", Shape::rect(0.0, 0.0, 1.0, 1.0));
    scene.transition(child, Attr::X, AttrValue::Num(5.0), Timing::new(10.0));
    let before = scene.live_count();
    scene.remove(g);
    assert_eq!(scene.live_count(), before - 2);
    assert_eq!(scene.pending_transitions(), 0);
    scene.remove(scene.surface());
    assert!(scene.contains(scene.surface()));
}

#[test]
fn visibility_is_inherited() {
    let mut scene = Scene::new();
    let g = scene.append(scene.overlay(), "tooltip", Shape::Group);
    let t = scene.append(g, "header", Shape::text("x", 0.0, 0.0, 12.0));
    assert!(scene.is_rendered(t));
    scene.set_visible(g, false);
    assert!(!scene.is_rendered(t));
}

#[test]
fn settle_finishes_after_fractional_frame() {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut scene = Scene::new();
        let bar = scene.append(scene.surface(), "bar", Shape::rect(0.0, 0.0, 1.0, 1.0));
        scene.advance(1000.0 / 60.0);
        scene.transition(bar, Attr::Opacity, AttrValue::Num(0.0), Timing::new(500.0));
        scene.transition(bar, Attr::X, AttrValue::Num(7.0), Timing::new(300.0).with_delay(1000.0 / 3.0));
        scene.settle();
        let _ = tx.send((scene.pending_transitions(), num(&scene, bar, Attr::Opacity), num(&scene, bar, Attr::X)));
    });
    let (pending, opacity, x) = rx.recv_timeout(Duration::from_secs(5)).expect("settle returns");
    assert_eq!(pending, 0);
    assert_eq!(opacity, 0.0);
    assert_eq!(x, 7.0);
}

#[test]
fn frame_stepping_reaches_exact_end() {
    let mut scene = Scene::new();
    let bar = scene.append(scene.surface(), "bar", Shape::rect(0.0, 0.0, 1.0, 1.0));
    scene.advance(1000.0 / 60.0);
    scene.transition(bar, Attr::Width, AttrValue::Num(40.0), Timing::new(500.0));
    scene.advance(500.0);
    assert_eq!(scene.pending_transitions(), 0);
    assert_eq!(num(&scene, bar, Attr::Width), 40.0);
}

#[test]
fn non_finite_timing_completes_immediately() {
    let mut scene = Scene::new();
    let bar = scene.append(scene.surface(), "bar", Shape::rect(0.0, 0.0, 1.0, 1.0));
    scene.transition(bar, Attr::X, AttrValue::Num(3.0), Timing::new(f64::NAN).with_delay(f64::INFINITY));
    scene.settle();
    assert_eq!(scene.pending_transitions(), 0);
    assert_eq!(num(&scene, bar, Attr::X), 3.0);
}

#[test]
fn removed_slots_are_reused_and_stale_handles_miss() {
    let mut scene = Scene::new();
    let root = scene.surface();
    let old = scene.append(root, "bar", Shape::Group);
    let cap = scene.capacity();
    scene.remove(old);

    let new = scene.append(root, "bar", Shape::Group);
    assert_eq!(scene.capacity(), cap, "freed slot is recycled");
    assert_ne!(old, new);
    assert!(!scene.contains(old));
    assert!(scene.contains(new));

    // A stale handle neither reads nor writes the recycled node.
    scene.set_translate(old, 9.0, 9.0);
    assert_eq!(scene.style(new).map(|s| s.translate), Some((0.0, 0.0)));
    scene.remove(old);
    assert!(scene.contains(new));
}

#[test]
fn keyed_churn_keeps_arena_bounded() {
    let mut scene = Scene::new();
    let root = scene.surface();
    let mut peak = 0;
    for round in 0..200 {
        let ks: Vec<String> = (round..round + 12).map(|k| format!("tick-{k}")).collect();
        let j = scene.join(root, "tick", &ks, |_| Shape::text("", 0.0, 0.0, 10.0));
        for id in j.exit {
            scene.fade_out_and_remove(id, Timing::new(250.0));
        }
        scene.settle();
        if round == 10 {
            peak = scene.capacity();
        }
    }
    assert_eq!(scene.find_all(root, "tick").len(), 12);
    assert_eq!(scene.capacity(), peak);
}

#[test]
fn order_moves_listed_children_first() {
    let mut scene = Scene::new();
    let root = scene.surface();
    let j = scene.join(root, "bar", &keys(&["a", "b", "c"]), |_| Shape::Group);
    let (a, b, c) = (j.enter[0].1, j.enter[1].1, j.enter[2].1);
    let other = scene.append(root, "label", Shape::Group);

    let overlay = scene.overlay();
    scene.order(root, &[c, a, c, other, overlay]);
    assert_eq!(scene.children(root), &[c, a, other, b]);
}
