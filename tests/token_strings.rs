mod common;

use common::*;
use py2wf::action;
use py2wf::error::ErrorKind;
use py2wf::value::ATTACHMENT_MARKER;

#[test]
fn single_part_interpolation_degenerates_to_the_part() {
    let lowering = lower_ok(vec![
        assign("x", call(name("input"), vec![string("?")])),
        print_of(vec![fstr(vec![fvalue(name("x"))])]),
    ]);

    // no token-string wrapper: the lone part's reference is used directly
    let shown = only(&lowering, action::SHOW_RESULT);
    let text = param(shown, "Text");
    assert_eq!(text["Type"], "ActionOutput");
    assert_eq!(text["OutputName"], "Ask for Input");
}

#[test]
fn multi_part_interpolation_builds_offsets_and_markers() {
    let lowering = lower_ok(vec![
        assign("a", call(name("input"), vec![string("a?")])),
        assign("b", call(name("input"), vec![string("b?")])),
        print_of(vec![fstr(vec![
            fvalue(name("a")),
            string(" and "),
            fvalue(name("b")),
        ])]),
    ]);

    let shown = only(&lowering, action::SHOW_RESULT);
    let text = param(shown, "Text");
    assert_eq!(text["WFSerializationType"], "WFTextTokenString");
    assert_eq!(
        text["Value"]["string"],
        format!("{} and {}", ATTACHMENT_MARKER, ATTACHMENT_MARKER)
    );
    let attachments = text["Value"]["attachmentsByRange"].as_object().unwrap();
    assert_eq!(attachments.len(), 2);
    assert!(attachments.contains_key("{0, 1}"));
    assert!(attachments.contains_key("{6, 1}"));
    assert_eq!(attachments["{0, 1}"]["Type"], "ActionOutput");
}

#[test]
fn literal_fragments_fold_into_the_text() {
    let lowering = lower_ok(vec![
        assign("items", string("abc")),
        for_in(
            name("i"),
            name("items"),
            vec![print_of(vec![fstr(vec![
                string("item: "),
                fvalue(name("i")),
            ])])],
        ),
    ]);

    let shown = only(&lowering, action::SHOW_RESULT);
    let text = param(shown, "Text");
    assert_eq!(
        text["Value"]["string"],
        format!("item: {}", ATTACHMENT_MARKER)
    );
    let attachments = text["Value"]["attachmentsByRange"].as_object().unwrap();
    assert_eq!(attachments["{6, 1}"]["VariableName"], "Repeat Item");
}

#[test]
fn numeric_fragments_format_as_text() {
    let lowering = lower_ok(vec![
        assign("items", string("abc")),
        for_in(
            name("i"),
            name("items"),
            vec![print_of(vec![fstr(vec![
                int(3),
                string("-"),
                fvalue(name("i")),
            ])])],
        ),
    ]);

    let shown = only(&lowering, action::SHOW_RESULT);
    assert_eq!(
        param(shown, "Text")["Value"]["string"],
        format!("3-{}", ATTACHMENT_MARKER)
    );
}

#[test]
fn conversions_in_interpolations_are_unsupported() {
    let err = lower_err(vec![
        assign("x", string("v")),
        print_of(vec![fstr(vec![fvalue_conv(name("x"), 115)])]),
    ]);
    assert_eq!(err.kind, ErrorKind::Unsupported);
    assert!(err.message.contains("f-string"), "{}", err.message);
}

#[test]
fn format_specs_are_unsupported() {
    let err = lower_err(vec![
        assign("x", string("v")),
        print_of(vec![fstr(vec![py2wf::ast::Expr::FormattedValue {
            value: Box::new(name("x")),
            conversion: -1,
            format_spec: Some(Box::new(string(".2f"))),
        }])]),
    ]);
    assert_eq!(err.kind, ErrorKind::Unsupported);
}

#[test]
fn str_result_interpolates_like_any_token_string() {
    // str() wraps without emitting; printing the wrapper delegates to the
    // wrapped constant, which synthesizes a text record
    let lowering = lower_ok(vec![
        assign("x", call(name("str"), vec![int(7)])),
        print_of(vec![name("x")]),
    ]);
    assert_eq!(
        identifiers(&lowering),
        vec![action::NUMBER, action::SHOW_RESULT]
    );
}
