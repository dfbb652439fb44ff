mod common;

use common::*;
use py2wf::codegen;

#[test]
fn artifact_carries_the_host_metadata_defaults() {
    let lowering = lower_ok(vec![assign("x", string("hi")), print_of(vec![name("x")])]);
    let artifact = codegen::synthesize(lowering.actions);
    let wire = serde_json::to_value(&artifact).unwrap();

    assert_eq!(wire["WFWorkflowClientVersion"], "3607.0.2");
    assert_eq!(wire["WFWorkflowMinimumClientVersion"], 900);
    assert_eq!(wire["WFWorkflowMinimumClientVersionString"], "900");
    assert_eq!(wire["WFWorkflowHasOutputFallback"], false);
    assert_eq!(wire["WFWorkflowHasShortcutInputVariables"], false);
    assert_eq!(wire["WFWorkflowIsDisabledOnLockScreen"], false);
    assert_eq!(wire["WFWorkflowIcon"]["WFWorkflowIconGlyphNumber"], 61440);
    assert_eq!(wire["WFWorkflowIcon"]["WFWorkflowIconStartColor"], -615917313);
    assert_eq!(wire["WFWorkflowImportQuestions"], serde_json::json!([]));
    assert_eq!(wire["WFWorkflowTypes"], serde_json::json!([]));
    assert_eq!(wire["WFWorkflowActions"].as_array().unwrap().len(), 2);
}

#[test]
fn records_serialize_identifier_and_parameters_only() {
    let lowering = lower_ok(vec![assign("x", string("hi")), print_of(vec![name("x")])]);
    let artifact = codegen::synthesize(lowering.actions);
    let wire = serde_json::to_value(&artifact).unwrap();

    let record = &wire["WFWorkflowActions"][0];
    assert_eq!(
        record["WFWorkflowActionIdentifier"],
        "is.workflow.actions.gettext"
    );
    assert!(record["WFWorkflowActionParameters"].is_object());
    assert_eq!(record.as_object().unwrap().len(), 2);
}

#[test]
fn repeated_runs_differ_only_in_generated_ids() {
    let body = || {
        vec![
            assign("x", call(name("input"), vec![string("n?")])),
            for_in(
                name("i"),
                call(name("range"), vec![int(3)]),
                vec![print_of(vec![fstr(vec![
                    string("round "),
                    fvalue(name("i")),
                    string(" of "),
                    fvalue(name("x")),
                ])])],
            ),
        ]
    };

    let first = lower_ok(body());
    let second = lower_ok(body());

    assert_eq!(identifiers(&first), identifiers(&second));
    let first = serde_json::to_value(codegen::synthesize(first.actions)).unwrap();
    let second = serde_json::to_value(codegen::synthesize(second.actions)).unwrap();
    assert_ne!(first, second);
    assert_eq!(strip_ids(&first), strip_ids(&second));
}

#[test]
fn generated_ids_are_uppercase_uuids() {
    let lowering = lower_ok(vec![expr_stmt(call(name("input"), vec![string("?")]))]);
    for record in &lowering.actions {
        if let Some(id) = record.parameters.get("UUID") {
            let id = id.as_str().unwrap();
            assert!(is_uuid(id), "{}", id);
            assert_eq!(id, id.to_uppercase());
        }
    }
}
