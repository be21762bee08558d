//! Tests for widget attachment, resolution and detachment.

use std::sync::Arc;
use std::thread;

use panelkit_common::{ContainerId, ContentKey, PanelError};

use super::*;
use crate::host::testing::RecordingHost;
use crate::host::NoopPlacement;
use crate::widget::WidgetHandle;

fn index() -> WidgetIndex {
    WidgetIndex::new(Arc::new(NoopPlacement))
}

fn session(capacity: usize) -> PanelSession {
    PanelSession::new("alice".into(), capacity, "Menu", ContainerId(1), true)
}

fn noop(content: &str) -> WidgetHandle {
    WidgetHandle::auto(content, |_| Ok(()))
}

#[test]
fn auto_attach_fills_positions_in_call_order() {
    let index = index();
    let s = session(3);

    assert_eq!(index.attach(&s, noop("a")).unwrap(), 0);
    assert_eq!(index.attach(&s, noop("b")).unwrap(), 1);
    assert_eq!(index.attach(&s, noop("c")).unwrap(), 2);

    let err = index.attach(&s, noop("d")).unwrap_err();
    assert_eq!(
        err,
        PanelError::PanelFull {
            panel: s.id(),
            capacity: 3
        }
    );
    assert_eq!(index.positions(&s), vec![0, 1, 2]);
}

#[test]
fn explicit_conflict_is_slot_occupied() {
    let index = index();
    let s = session(9);

    index.attach(&s, WidgetHandle::at(4, "x", |_| Ok(()))).unwrap();
    let err = index
        .attach(&s, WidgetHandle::at(4, "y", |_| Ok(())))
        .unwrap_err();
    assert_eq!(
        err,
        PanelError::SlotOccupied {
            panel: s.id(),
            position: 4
        }
    );
    // Failed attach leaves the set unchanged.
    assert_eq!(index.widget_count(&s), 1);
}

#[test]
fn explicit_conflicts_with_auto_placed_widget() {
    let index = index();
    let s = session(9);

    assert_eq!(index.attach(&s, noop("a")).unwrap(), 0);
    assert!(matches!(
        index.attach(&s, WidgetHandle::at(0, "b", |_| Ok(()))),
        Err(PanelError::SlotOccupied { position: 0, .. })
    ));
}

#[test]
fn auto_skips_explicitly_taken_positions() {
    let index = index();
    let s = session(4);

    index.attach(&s, WidgetHandle::at(0, "x", |_| Ok(()))).unwrap();
    index.attach(&s, WidgetHandle::at(2, "y", |_| Ok(()))).unwrap();
    assert_eq!(index.attach(&s, noop("a")).unwrap(), 1);
    assert_eq!(index.attach(&s, noop("b")).unwrap(), 3);
}

#[test]
fn explicit_position_outside_capacity_is_invalid() {
    let index = index();
    let s = session(9);
    let err = index
        .attach(&s, WidgetHandle::at(9, "x", |_| Ok(())))
        .unwrap_err();
    assert!(matches!(err, PanelError::InvalidArgument(_)));
    assert_eq!(index.widget_count(&s), 0);
}

#[test]
fn resolve_explicit_by_position() {
    let index = index();
    let s = session(9);
    index
        .attach(&s, WidgetHandle::at(5, "compass", |_| Ok(())))
        .unwrap();

    let hit = index.resolve(&s, 5, None).unwrap();
    assert_eq!(hit.position(), 5);
    assert_eq!(hit.content().as_str(), "compass");
    assert!(index.resolve(&s, 4, None).is_none());
}

#[test]
fn resolve_auto_by_content_fallback() {
    let index = index();
    let s = session(9);
    index.attach(&s, noop("apple")).unwrap();
    index.attach(&s, noop("pear")).unwrap();

    // The host reports a different slot than the one we assigned.
    let pear = ContentKey::from("pear");
    let hit = index.resolve(&s, 7, Some(&pear)).unwrap();
    assert_eq!(hit.content(), &pear);
    assert_eq!(hit.position(), 1);

    let plum = ContentKey::from("plum");
    assert!(index.resolve(&s, 7, Some(&plum)).is_none());
    assert!(index.resolve(&s, 7, None).is_none());
}

#[test]
fn auto_widget_resolves_by_assigned_position_without_content() {
    let index = index();
    let s = session(9);
    index.attach(&s, noop("a")).unwrap();
    index.attach(&s, noop("b")).unwrap();

    let hit = index.resolve(&s, 1, None).unwrap();
    assert_eq!(hit.position(), 1);
    assert_eq!(hit.content().as_str(), "b");
    assert!(index.resolve(&s, 2, None).is_none());
}

#[test]
fn disagreeing_content_at_position_falls_back_to_content_match() {
    let index = index();
    let s = session(9);
    index.attach(&s, noop("a")).unwrap();
    index.attach(&s, noop("b")).unwrap();

    // The host shows "a" where "b" was placed.
    let hit = index.resolve(&s, 1, Some(&ContentKey::from("a"))).unwrap();
    assert_eq!(hit.position(), 0);
    assert!(index.resolve(&s, 1, Some(&ContentKey::from("z"))).is_none());
}

#[test]
fn duplicate_content_prefers_position_then_registration_order() {
    let index = index();
    let s = session(9);
    index.attach(&s, noop("gem")).unwrap();
    index.attach(&s, noop("gem")).unwrap();
    let gem = ContentKey::from("gem");

    assert_eq!(index.resolve(&s, 1, Some(&gem)).unwrap().position(), 1);
    assert_eq!(index.resolve(&s, 0, Some(&gem)).unwrap().position(), 0);
    // Unknown position: lowest registration order wins.
    assert_eq!(index.resolve(&s, 8, Some(&gem)).unwrap().position(), 0);
}

#[test]
fn explicit_match_beats_content_match() {
    let index = index();
    let s = session(9);
    index.attach(&s, noop("gem")).unwrap();
    index
        .attach(&s, WidgetHandle::at(3, "stone", |_| Ok(())))
        .unwrap();

    let gem = ContentKey::from("gem");
    let hit = index.resolve(&s, 3, Some(&gem)).unwrap();
    assert_eq!(hit.content().as_str(), "stone");
}

#[test]
fn explicit_widgets_are_not_content_matched() {
    let index = index();
    let s = session(9);
    index
        .attach(&s, WidgetHandle::at(3, "stone", |_| Ok(())))
        .unwrap();
    let stone = ContentKey::from("stone");
    assert!(index.resolve(&s, 4, Some(&stone)).is_none());
}

#[test]
fn detach_session_clears_and_is_idempotent() {
    let index = index();
    let s = session(9);
    index.attach(&s, WidgetHandle::at(0, "a", |_| Ok(()))).unwrap();
    index.attach(&s, noop("b")).unwrap();

    assert_eq!(index.detach_session(&s), 2);
    assert!(index.resolve(&s, 0, None).is_none());
    assert!(index.resolve(&s, 1, Some(&ContentKey::from("b"))).is_none());
    assert_eq!(index.widget_count(&s), 0);
    assert_eq!(index.session_count(), 0);

    assert_eq!(index.detach_session(&s), 0);
}

#[test]
fn live_session_can_be_refilled_after_detach() {
    let index = index();
    let s = session(2);
    index.attach(&s, noop("a")).unwrap();
    index.detach_session(&s);
    assert_eq!(index.attach(&s, noop("b")).unwrap(), 0);
}

#[test]
fn destroyed_session_rejects_attach_and_resolves_nothing() {
    let index = index();
    let s = session(9);
    index.attach(&s, WidgetHandle::at(0, "a", |_| Ok(()))).unwrap();

    assert!(s.retire());
    assert!(index.resolve(&s, 0, None).is_none());
    assert_eq!(
        index.attach(&s, noop("b")).unwrap_err(),
        PanelError::AlreadyClosed(s.id())
    );
}

#[test]
fn sessions_are_independent() {
    let index = index();
    let a = session(1);
    let b = session(1);
    index.attach(&a, noop("x")).unwrap();
    index.attach(&b, noop("y")).unwrap();

    index.detach_session(&a);
    assert!(index.resolve(&a, 0, Some(&ContentKey::from("x"))).is_none());
    assert!(index.resolve(&b, 0, Some(&ContentKey::from("y"))).is_some());
}

#[test]
fn placement_sink_sees_each_successful_attach() {
    let host = Arc::new(RecordingHost::default());
    let index = WidgetIndex::new(host.clone());
    let s = session(2);

    index.attach(&s, noop("a")).unwrap();
    index.attach(&s, WidgetHandle::at(1, "b", |_| Ok(()))).unwrap();
    let _ = index.attach(&s, noop("c"));

    assert_eq!(
        host.placements(),
        vec![
            (ContainerId(1), 0, ContentKey::from("a")),
            (ContainerId(1), 1, ContentKey::from("b")),
        ]
    );
}

#[test]
fn concurrent_auto_attach_never_double_books() {
    let index = Arc::new(index());
    let s = Arc::new(session(64));

    thread::scope(|scope| {
        for t in 0..8 {
            let index = &index;
            let s = &s;
            scope.spawn(move || {
                for i in 0..8 {
                    index.attach(s, noop(&format!("w{t}-{i}"))).unwrap();
                }
            });
        }
    });

    let mut positions = index.positions(&s);
    positions.sort_unstable();
    assert_eq!(positions, (0..64).collect::<Vec<_>>());
    assert!(index.attach(&s, noop("overflow")).is_err());
}

#[test]
fn attach_racing_destroy_leaves_nothing_behind() {
    for _ in 0..50 {
        let index = Arc::new(index());
        let s = Arc::new(session(32));

        thread::scope(|scope| {
            let attacher = {
                let index = &index;
                let s = &s;
                scope.spawn(move || {
                    for i in 0..32 {
                        let _ = index.attach(s, noop(&format!("w{i}")));
                    }
                })
            };
            s.retire();
            index.detach_session(&s);
            attacher.join().unwrap();
        });

        assert_eq!(index.widget_count(&s), 0);
        assert!(index.attach(&s, noop("late")).is_err());
        assert_eq!(index.session_count(), 0);
    }
}
