//! The builtin registry: a static namespace tree of callable actions.
//!
//! The unnamed root module is bound into the global scope when a run starts;
//! `workflow` and `workflow.web` are reachable through `from ... import`.

use std::collections::BTreeMap;

use serde_json::{Value as Json, json};

use crate::action::{self, Action};
use crate::ast;
use crate::error::CompileError;
use crate::lower::CallArgs;
use crate::value::{self, BuilderDef, BuilderFn, Value};
use crate::value_type;

pub fn builtins() -> BTreeMap<String, Value> {
    let mut root = BTreeMap::new();
    root.insert(
        String::new(),
        module(vec![
            ("input", builder("input", &[], ask_for_input)),
            ("print", builder("print", &[], show_result)),
            ("int", builder("int", &[], to_integer)),
            ("float", builder("float", &[], to_number)),
            ("str", builder("str", &[], to_text)),
            ("dict", builder("dict", &[], detect_dictionary)),
            ("exit", builder("exit", &[], exit_workflow)),
        ]),
    );
    root.insert(
        "workflow".to_string(),
        module(vec![
            ("shortcut_input", builder("shortcut_input", &[], shortcut_input)),
            (
                "web",
                module(vec![(
                    "fetch",
                    builder("fetch", &["method", "headers", "json"], fetch_url),
                )]),
            ),
        ]),
    );
    root
}

fn module(children: Vec<(&str, Value)>) -> Value {
    Value::Module(
        children
            .into_iter()
            .map(|(name, child)| (name.to_string(), child))
            .collect(),
    )
}

fn builder(name: &'static str, raw_params: &'static [&'static str], run: BuilderFn) -> Value {
    Value::Builder(BuilderDef {
        name,
        raw_params,
        run,
    })
}

fn ask_for_input(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    let prompt = call.required("prompt", 0)?;
    let prompt_wire = value::token_string(call.actions(), &[prompt])?;
    let mut record = Action::new(action::ASK)
        .with_param("WFAllowsMultilineText", false)
        .with_param("WFAskActionPrompt", prompt_wire);
    let out = record.mark_output("Ask for Input", &value_type::TEXT);
    call.actions().push(record);
    Ok(Some(Value::ActionOutput(out)))
}

fn show_result(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    let parts = call.args.clone();
    let text = value::token_string(call.actions(), &parts)?;
    call.actions()
        .push(Action::new(action::SHOW_RESULT).with_param("Text", text));
    Ok(None)
}

/// Switch a still-open ask prompt to numeric input instead of coercing its
/// output through a separate record. Single-hop: only the record directly
/// producing `value` is considered, and only while it is unrepurposed.
fn repurpose_ask_prompt(
    call: &mut CallArgs<'_>,
    value: &Value,
    allow_decimals: bool,
) -> Option<Value> {
    let Value::ActionOutput(out) = value else {
        return None;
    };
    let record = action::find_by_uuid(call.actions(), &out.uuid)?;
    if record.identifier != action::ASK || record.parameters.contains_key("WFInputType") {
        return None;
    }
    record
        .parameters
        .insert("WFInputType".to_string(), json!("Number"));
    if !allow_decimals {
        record
            .parameters
            .insert("WFAskActionAllowsDecimalNumbers".to_string(), json!(false));
    }
    let out = record.mark_output("Ask for Input", &value_type::NUMBER);
    Some(Value::ActionOutput(out))
}

fn to_integer(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    let input = call.required("value", 0)?;
    if let Some(repurposed) = repurpose_ask_prompt(call, &input, false) {
        return Ok(Some(repurposed));
    }

    let wire = value::token_attachment(call.actions(), &input)?;
    let mut number = Action::new(action::NUMBER).with_param("WFNumberActionNumber", wire);
    let out = number.mark_output("Number", &value_type::NUMBER);
    call.actions().push(number);

    // The host's numeric type has no integer-only mode; truncate toward
    // zero by splitting on the decimal point and keeping the first piece.
    let wire = value::token_attachment(call.actions(), &Value::ActionOutput(out))?;
    let mut split = Action::new(action::SPLIT_TEXT)
        .with_param("WFTextSeparator", "Custom")
        .with_param("WFTextCustomSeparator", ".")
        .with_param("text", wire);
    let out = split.mark_output("Split Text", &value_type::TEXT);
    call.actions().push(split);

    let wire = value::token_attachment(call.actions(), &Value::ActionOutput(out))?;
    let mut first = Action::new(action::ITEM_FROM_LIST).with_param("WFInput", wire);
    let out = first.mark_output("Item from List", &value_type::TEXT);
    call.actions().push(first);

    let wire = value::token_attachment(call.actions(), &Value::ActionOutput(out))?;
    let mut number = Action::new(action::NUMBER).with_param("WFNumberActionNumber", wire);
    let out = number.mark_output("Number", &value_type::NUMBER);
    call.actions().push(number);

    Ok(Some(Value::ActionOutput(out)))
}

fn to_number(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    let input = call.required("value", 0)?;
    if let Some(repurposed) = repurpose_ask_prompt(call, &input, true) {
        return Ok(Some(repurposed));
    }
    let wire = value::token_attachment(call.actions(), &input)?;
    let mut number = Action::new(action::NUMBER).with_param("WFNumberActionNumber", wire);
    let out = number.mark_output("Number", &value_type::NUMBER);
    call.actions().push(number);
    Ok(Some(Value::ActionOutput(out)))
}

fn to_text(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    let input = call.required("value", 0)?;
    Ok(Some(Value::TokenString(vec![input])))
}

fn detect_dictionary(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    let input = call.required("value", 0)?;
    let wire = value::token_attachment(call.actions(), &input)?;
    let mut record = Action::new(action::DETECT_DICTIONARY).with_param("WFInput", wire);
    let out = record.mark_output("Dictionary", &value_type::DICTIONARY);
    call.actions().push(record);
    Ok(Some(Value::ActionOutput(out)))
}

fn exit_workflow(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    // The host operation has no exit-code parameter.
    let _ = call.positional_or_keyword("code", 0);
    call.actions().push(Action::new(action::EXIT));
    Ok(None)
}

fn shortcut_input(_call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    Ok(Some(Value::MagicVariable("Shortcut Input".to_string())))
}

fn fetch_url(call: &mut CallArgs<'_>) -> Result<Option<Value>, CompileError> {
    let url = call.required("url", 0)?;
    let method = match call.raw_arg("method") {
        None => "GET".to_string(),
        Some(ast::Expr::Constant {
            value: ast::Lit::Str(s),
        }) => s.clone(),
        Some(_) => {
            return Err(CompileError::unsupported(
                "fetch() method must be a string literal",
            ));
        }
    };
    let body = call.keyword("body");
    let json_body = call.raw_arg("json").cloned();
    if body.is_some() && json_body.is_some() {
        return Err(CompileError::value(
            "fetch() accepts at most one of 'body' and 'json'",
        ));
    }
    if method == "GET" && (body.is_some() || json_body.is_some()) {
        return Err(CompileError::value("GET requests cannot carry a body"));
    }

    let mut header_items = Vec::new();
    let mut has_content_type = false;
    if let Some(expr) = call.raw_arg("headers").cloned() {
        for (name, wire) in literal_mapping(call, &expr, "headers")? {
            if name.eq_ignore_ascii_case("content-type") {
                has_content_type = true;
            }
            header_items.push(dictionary_item(&name, wire));
        }
    }

    let url_wire = value::token_string(call.actions(), &[url])?;
    let mut record = Action::new(action::DOWNLOAD_URL)
        .with_param("WFURL", url_wire)
        .with_param("WFHTTPMethod", method);

    if let Some(expr) = json_body {
        if has_content_type {
            call.driver
                .notice("fetch() sets the Content-Type header automatically for json bodies");
        } else {
            header_items.push(dictionary_item("Content-Type", json!("application/json")));
        }
        let mut json_items = Vec::new();
        for (name, wire) in literal_mapping(call, &expr, "json")? {
            json_items.push(dictionary_item(&name, wire));
        }
        record = record
            .with_param("WFHTTPBodyType", "JSON")
            .with_param("WFJSONValues", dictionary_field(json_items));
    }
    if let Some(body) = body {
        let wire = value::token_attachment(call.actions(), &body)?;
        record = record
            .with_param("WFHTTPBodyType", "File")
            .with_param("WFRequestVariable", wire);
    }
    if !header_items.is_empty() {
        record = record.with_param("WFHTTPHeaders", dictionary_field(header_items));
    }

    let out = record.mark_output("Contents of URL", &value_type::FILE);
    call.actions().push(record);
    Ok(Some(Value::ActionOutput(out)))
}

/// Lower a raw literal-mapping argument entry by entry: keys must be string
/// literals, values go through the driver individually.
fn literal_mapping(
    call: &mut CallArgs<'_>,
    expr: &ast::Expr,
    param: &str,
) -> Result<Vec<(String, Json)>, CompileError> {
    let ast::Expr::Dict { keys, values } = expr else {
        return Err(CompileError::unsupported(format!(
            "fetch() {} must be a literal mapping",
            param
        )));
    };
    let mut entries = Vec::new();
    for (key, value) in keys.iter().zip(values) {
        let ast::Expr::Constant {
            value: ast::Lit::Str(name),
        } = key
        else {
            return Err(CompileError::unsupported(format!(
                "fetch() {} keys must be string literals",
                param
            )));
        };
        let lowered = call.driver.expr_value(value, "mapping value")?;
        let wire = match &lowered {
            Value::Constant(lit) => json!(lit.as_text()),
            other => value::token_attachment(call.driver.current_buffer_mut(), other)?,
        };
        entries.push((name.clone(), wire));
    }
    Ok(entries)
}

fn dictionary_item(key: &str, value: Json) -> Json {
    json!({
        "WFItemType": 0,
        "WFKey": key,
        "WFValue": value,
    })
}

fn dictionary_field(items: Vec<Json>) -> Json {
    json!({
        "Value": { "WFDictionaryFieldValueItems": items },
        "WFSerializationType": "WFDictionaryFieldValue",
    })
}
