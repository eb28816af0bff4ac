//! Identity-based ordering and equality of message events.
//!
//! Ordering compares canonical cell identity first, then receipt time, then
//! the copy-required flag. Two events over value-equal messages in different
//! cells are *not* equal; `value_eq` covers that case.

use courier::{MessageEvent, MessageRef, Qualifier, Time};

#[derive(Debug, Clone, Default, PartialEq)]
struct Reading {
    x: i32,
}

fn event(
    message: &MessageRef<Reading>,
    nanos: u64,
    copy_required: bool,
) -> MessageEvent<Reading> {
    MessageEvent::from_parts(
        message.clone(),
        None,
        Time::from_nanos(nanos),
        Qualifier::ReadOnly,
        copy_required,
        None,
    )
}

#[test]
fn cell_identity_dominates_timestamps() {
    let p1 = MessageRef::new(Reading { x: 1 });
    let p2 = MessageRef::new(Reading { x: 2 });

    // Whichever way the two cells order, timestamps cannot flip it.
    let p1_first = event(&p1, 1, true) < event(&p2, 1, true);
    assert_eq!(event(&p1, 999, true) < event(&p2, 1, true), p1_first);
    assert_eq!(event(&p1, 1, true) < event(&p2, 999, true), p1_first);
}

#[test]
fn same_cell_falls_through_to_time_then_flag() {
    let p = MessageRef::new(Reading { x: 1 });
    assert!(event(&p, 1, true) < event(&p, 2, true));
    assert!(event(&p, 1, false) < event(&p, 1, true));
    assert!(event(&p, 1, true) < event(&p, 2, false));
}

#[test]
fn equality_is_identity_based() {
    let p = MessageRef::new(Reading { x: 5 });
    let twin = MessageRef::new(Reading { x: 5 });

    assert_eq!(event(&p, 1, true), event(&p, 1, true));
    assert_ne!(event(&p, 1, true), event(&p, 2, true));
    assert_ne!(event(&p, 1, true), event(&p, 1, false));
    assert_ne!(event(&p, 1, true), event(&twin, 1, true));

    // Value comparison is the additive escape hatch.
    assert!(event(&p, 1, true).value_eq(&event(&twin, 1, true)));
}

#[test]
fn header_and_factory_do_not_affect_equality() {
    let p = MessageRef::new(Reading { x: 5 });
    let with_header = MessageEvent::from_parts(
        p.clone(),
        Some(std::sync::Arc::new(
            [("callerid", "node_a")].into_iter().collect(),
        )),
        Time::from_nanos(1),
        Qualifier::ReadOnly,
        true,
        Some(courier::MessageFactory::default()),
    );
    assert_eq!(with_header, event(&p, 1, true));
}

#[test]
fn sorting_is_total() {
    let cells: Vec<_> = (0..4).map(|x| MessageRef::new(Reading { x })).collect();
    let mut events: Vec<_> = cells
        .iter()
        .flat_map(|c| [event(c, 2, true), event(c, 1, true)])
        .collect();
    events.sort();

    // Events over the same cell end up adjacent, earlier receipt first.
    for pair in events.chunks(2) {
        assert!(pair[0].shared_message().ptr_eq(&pair[1].shared_message()));
        assert!(pair[0].receipt_time() <= pair[1].receipt_time());
    }
}
