#![allow(dead_code)]

use py2wf::action::Action;
use py2wf::ast::{Expr, ImportName, Keyword, Lit, Module, Stmt};
use py2wf::error::CompileError;
use py2wf::lower::{self, Lowering};
use serde_json::Value as Json;

pub fn lower_body(body: Vec<Stmt>) -> Result<Lowering, CompileError> {
    lower::lower(&Module { body })
}

pub fn lower_ok(body: Vec<Stmt>) -> Lowering {
    lower_body(body).expect("lowering failed")
}

pub fn lower_err(body: Vec<Stmt>) -> CompileError {
    lower_body(body).expect_err("lowering unexpectedly succeeded")
}

// ── statements ──────────────────────────────────────────────────────

pub fn expr_stmt(value: Expr) -> Stmt {
    Stmt::Expr { value, lineno: None }
}

pub fn assign(target: &str, value: Expr) -> Stmt {
    assign_targets(vec![name(target)], value)
}

pub fn assign_targets(targets: Vec<Expr>, value: Expr) -> Stmt {
    Stmt::Assign { targets, value, lineno: None }
}

pub fn import_from(module: &str, names: &[(&str, Option<&str>)], level: u32) -> Stmt {
    Stmt::ImportFrom {
        module: module.to_string(),
        names: names
            .iter()
            .map(|(name, asname)| ImportName {
                name: name.to_string(),
                asname: asname.map(str::to_string),
            })
            .collect(),
        level,
        lineno: None,
    }
}

pub fn for_in(target: Expr, iter: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::For { target, iter, body, orelse: vec![], lineno: None }
}

pub fn for_else(target: Expr, iter: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>) -> Stmt {
    Stmt::For { target, iter, body, orelse, lineno: None }
}

pub fn func_def(name: &str) -> Stmt {
    Stmt::FunctionDef { name: name.to_string(), body: vec![], lineno: None }
}

// ── expressions ─────────────────────────────────────────────────────

pub fn name(id: &str) -> Expr {
    Expr::Name { id: id.to_string() }
}

pub fn string(s: &str) -> Expr {
    Expr::Constant { value: Lit::Str(s.to_string()) }
}

pub fn int(n: i64) -> Expr {
    Expr::Constant { value: Lit::Int(n) }
}

pub fn float(x: f64) -> Expr {
    Expr::Constant { value: Lit::Float(x) }
}

pub fn lit(value: Lit) -> Expr {
    Expr::Constant { value }
}

pub fn call(func: Expr, args: Vec<Expr>) -> Expr {
    call_kw(func, args, vec![])
}

pub fn call_kw(func: Expr, args: Vec<Expr>, keywords: Vec<(&str, Expr)>) -> Expr {
    Expr::Call {
        func: Box::new(func),
        args,
        keywords: keywords
            .into_iter()
            .map(|(arg, value)| Keyword { arg: Some(arg.to_string()), value })
            .collect(),
    }
}

pub fn call_splat_kw(func: Expr, value: Expr) -> Expr {
    Expr::Call {
        func: Box::new(func),
        args: vec![],
        keywords: vec![Keyword { arg: None, value }],
    }
}

pub fn fstr(values: Vec<Expr>) -> Expr {
    Expr::JoinedStr { values }
}

pub fn fvalue(value: Expr) -> Expr {
    fvalue_conv(value, -1)
}

pub fn fvalue_conv(value: Expr, conversion: i32) -> Expr {
    Expr::FormattedValue { value: Box::new(value), conversion, format_spec: None }
}

pub fn tuple(elts: Vec<Expr>) -> Expr {
    Expr::Tuple { elts }
}

pub fn list(elts: Vec<Expr>) -> Expr {
    Expr::List { elts }
}

pub fn dict(pairs: Vec<(Expr, Expr)>) -> Expr {
    let (keys, values) = pairs.into_iter().unzip();
    Expr::Dict { keys, values }
}

pub fn starred(value: Expr) -> Expr {
    Expr::Starred { value: Box::new(value) }
}

pub fn print_of(args: Vec<Expr>) -> Stmt {
    expr_stmt(call(name("print"), args))
}

// ── record inspection ───────────────────────────────────────────────

pub fn identifiers(lowering: &Lowering) -> Vec<&str> {
    lowering.actions.iter().map(|a| a.identifier.as_str()).collect()
}

pub fn param<'a>(action: &'a Action, key: &str) -> &'a Json {
    action
        .parameters
        .get(key)
        .unwrap_or_else(|| panic!("record {} has no parameter {}", action.identifier, key))
}

pub fn find_all<'a>(lowering: &'a Lowering, identifier: &str) -> Vec<&'a Action> {
    lowering
        .actions
        .iter()
        .filter(|a| a.identifier == identifier)
        .collect()
}

pub fn only<'a>(lowering: &'a Lowering, identifier: &str) -> &'a Action {
    let matches = find_all(lowering, identifier);
    assert_eq!(matches.len(), 1, "expected exactly one {} record", identifier);
    matches[0]
}

pub fn is_uuid(s: &str) -> bool {
    s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

/// Replace every generated id in a wire value with a placeholder so two runs
/// can be compared structurally.
pub fn strip_ids(value: &Json) -> Json {
    match value {
        Json::String(s) if is_uuid(s) => Json::String("ID".to_string()),
        Json::Array(items) => Json::Array(items.iter().map(strip_ids).collect()),
        Json::Object(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), strip_ids(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
