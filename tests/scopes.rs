mod common;

use common::*;
use py2wf::action;
use py2wf::error::ErrorKind;

#[test]
fn loop_bindings_vanish_when_the_loop_closes() {
    let err = lower_err(vec![
        assign("x", string("items")),
        for_in(name("i"), name("x"), vec![print_of(vec![name("i")])]),
        print_of(vec![name("i")]),
    ]);
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(err.message.contains("'i'"), "{}", err.message);
}

#[test]
fn inner_bindings_shadow_without_merging() {
    let lowering = lower_ok(vec![
        assign("x", string("outer")),
        assign("items", string("abc")),
        for_in(name("x"), name("items"), vec![print_of(vec![name("x")])]),
        print_of(vec![name("x")]),
    ]);

    let shown = find_all(&lowering, action::SHOW_RESULT);
    assert_eq!(shown.len(), 2);

    // while the loop is open, x is the repeat slot
    let inner = param(shown[0], "Text");
    assert_eq!(inner["Type"], "Variable");
    assert_eq!(inner["VariableName"], "Repeat Item");

    // afterwards the outer binding is intact
    let outer = param(shown[1], "Text");
    assert_eq!(outer["Type"], "ActionOutput");
    assert_eq!(outer["OutputName"], "Text");
}

#[test]
fn sibling_loops_each_get_the_bare_slot() {
    let lowering = lower_ok(vec![
        assign("items", string("abc")),
        for_in(name("a"), name("items"), vec![print_of(vec![name("a")])]),
        for_in(name("b"), name("items"), vec![print_of(vec![name("b")])]),
    ]);

    let shown = find_all(&lowering, action::SHOW_RESULT);
    assert_eq!(shown.len(), 2);
    for record in shown {
        assert_eq!(param(record, "Text")["VariableName"], "Repeat Item");
    }
}

#[test]
fn popped_loop_buffers_splice_in_order() {
    let lowering = lower_ok(vec![
        assign("items", string("abc")),
        print_of(vec![string("before")]),
        for_in(name("i"), name("items"), vec![print_of(vec![name("i")])]),
        print_of(vec![string("after")]),
    ]);

    // before-text, before-print, iterable-text, start, body-print, end,
    // after-text, after-print
    assert_eq!(
        identifiers(&lowering),
        vec![
            action::GET_TEXT,
            action::SHOW_RESULT,
            action::GET_TEXT,
            action::REPEAT_EACH,
            action::SHOW_RESULT,
            action::REPEAT_EACH,
            action::GET_TEXT,
            action::SHOW_RESULT,
        ]
    );
}

#[test]
fn bindings_made_inside_a_loop_do_not_escape() {
    let err = lower_err(vec![
        assign("items", string("abc")),
        for_in(
            name("i"),
            name("items"),
            vec![assign("y", string("inner"))],
        ),
        print_of(vec![name("y")]),
    ]);
    assert_eq!(err.kind, ErrorKind::Name);
}
