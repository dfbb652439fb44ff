//! Compile-time values and their synthesis into wire shapes.
//!
//! Values exist only while a tree is being lowered. Synthesis converts one
//! into the JSON shape the host expects for a parameter slot, appending any
//! records that shape depends on to the buffer it is given. Synthesis is
//! deliberately not memoized: synthesizing the same value twice emits its
//! records twice.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value as Json, json};

use crate::action::{self, Action};
use crate::error::CompileError;
use crate::lower::CallArgs;
use crate::value_type::{self, ValueType};

/// Marks where an attachment sits inside a token string's text.
pub const ATTACHMENT_MARKER: char = '\u{FFFC}';

#[derive(Debug, Clone)]
pub enum Value {
    Constant(Literal),
    /// A named host-level variable not tied to any record.
    MagicVariable(String),
    /// A previously emitted record's output.
    ActionOutput(OutputRef),
    /// Interpolated string: literal fragments and embedded values.
    TokenString(Vec<Value>),
    /// Exactly one value embedded as a single opaque token.
    Attachment(Box<Value>),
    /// Builtin module: attribute lookup only.
    Module(BTreeMap<String, Value>),
    /// Builtin callable; the only invocable value.
    Builder(BuilderDef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Literal {
    pub fn as_text(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            Literal::Int(n) => n.to_string(),
            Literal::Float(x) => x.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputRef {
    pub uuid: String,
    pub name: String,
    pub ty: &'static ValueType,
}

pub type BuilderFn = fn(&mut CallArgs<'_>) -> Result<Option<Value>, CompileError>;

/// A builtin callable registered in the namespace tree.
#[derive(Clone, Copy)]
pub struct BuilderDef {
    pub name: &'static str,
    /// Keyword parameters delivered as raw syntax sub-trees instead of
    /// evaluated values.
    pub raw_params: &'static [&'static str],
    pub run: BuilderFn,
}

impl fmt::Debug for BuilderDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuilderDef({})", self.name)
    }
}

impl Value {
    /// Human name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Constant(_) => "constant",
            Value::MagicVariable(_) => "magic variable",
            Value::ActionOutput(_) => "action output",
            Value::TokenString(_) => "token string",
            Value::Attachment(_) => "attachment",
            Value::Module(_) => "module",
            Value::Builder(_) => "action",
        }
    }

    /// Materialize this value into the host's wire shape, appending any
    /// records it depends on to `actions`.
    pub fn synthesize(&self, actions: &mut Vec<Action>) -> Result<Json, CompileError> {
        match self {
            Value::Constant(lit) => synthesize_literal(lit, actions),
            Value::MagicVariable(name) => Ok(json!({
                "Type": "Variable",
                "VariableName": name,
            })),
            Value::ActionOutput(out) => Ok(output_attachment(out)),
            Value::TokenString(parts) if parts.len() == 1 => parts[0].synthesize(actions),
            Value::TokenString(parts) => {
                let mut text = String::new();
                let mut attachments = Map::new();
                for part in parts {
                    if let Value::Constant(lit) = part {
                        text.push_str(&lit.as_text());
                    } else {
                        let wire = part.synthesize(actions)?;
                        let key = format!("{{{}, 1}}", text.chars().count());
                        attachments.insert(key, wire);
                        text.push(ATTACHMENT_MARKER);
                    }
                }
                Ok(json!({
                    "Value": {
                        "string": text,
                        "attachmentsByRange": attachments,
                    },
                    "WFSerializationType": "WFTextTokenString",
                }))
            }
            Value::Attachment(inner) => Ok(json!({
                "Value": inner.synthesize(actions)?,
                "WFSerializationType": "WFTextTokenAttachment",
            })),
            Value::Module(_) | Value::Builder(_) => Err(CompileError::type_error(format!(
                "{} values cannot be synthesized",
                self.kind_name()
            ))),
        }
    }
}

/// The bare attachment shape for an action output.
pub fn output_attachment(out: &OutputRef) -> Json {
    json!({
        "OutputName": out.name,
        "OutputUUID": out.uuid,
        "Type": "ActionOutput",
    })
}

fn synthesize_literal(lit: &Literal, actions: &mut Vec<Action>) -> Result<Json, CompileError> {
    let mut record = match lit {
        Literal::Str(s) => {
            Action::new(action::GET_TEXT).with_param("WFTextActionText", s.clone())
        }
        Literal::Int(n) => Action::new(action::NUMBER).with_param("WFNumberActionNumber", *n),
        Literal::Float(x) => Action::new(action::NUMBER).with_param("WFNumberActionNumber", *x),
    };
    let out = match lit {
        Literal::Str(_) => record.mark_output("Text", &value_type::TEXT),
        Literal::Int(_) | Literal::Float(_) => record.mark_output("Number", &value_type::NUMBER),
    };
    actions.push(record);
    Ok(output_attachment(&out))
}

/// Coerce `parts` through token-string synthesis, the shape prompt-like
/// parameters take.
pub fn token_string(actions: &mut Vec<Action>, parts: &[Value]) -> Result<Json, CompileError> {
    Value::TokenString(parts.to_vec()).synthesize(actions)
}

/// Embed a single value as an opaque token.
pub fn token_attachment(actions: &mut Vec<Action>, value: &Value) -> Result<Json, CompileError> {
    Value::Attachment(Box::new(value.clone())).synthesize(actions)
}
