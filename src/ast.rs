//! Syntax trees for the recognized grammar subset.
//!
//! The engine does not parse source text; an external front-end hands it a
//! tree serialized as JSON, with nodes tagged by `"kind"` and named after
//! the source language's own node kinds. Everything representable here is
//! *recognized* (it deserializes cleanly) but not everything is *supported*:
//! the lowering driver rejects the shapes outside the subset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Expr {
        value: Expr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lineno: Option<u32>,
    },
    Assign {
        targets: Vec<Expr>,
        value: Expr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lineno: Option<u32>,
    },
    ImportFrom {
        module: String,
        names: Vec<ImportName>,
        #[serde(default)]
        level: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lineno: Option<u32>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        #[serde(default)]
        orelse: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lineno: Option<u32>,
    },
    /// Recognized so the front-end can ship it; lowering always rejects it.
    FunctionDef {
        name: String,
        body: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lineno: Option<u32>,
    },
}

impl Stmt {
    pub fn lineno(&self) -> Option<u32> {
        match self {
            Stmt::Expr { lineno, .. }
            | Stmt::Assign { lineno, .. }
            | Stmt::ImportFrom { lineno, .. }
            | Stmt::For { lineno, .. }
            | Stmt::FunctionDef { lineno, .. } => *lineno,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportName {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Name {
        id: String,
    },
    Constant {
        value: Lit,
    },
    Call {
        func: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        keywords: Vec<Keyword>,
    },
    JoinedStr {
        values: Vec<Expr>,
    },
    FormattedValue {
        value: Box<Expr>,
        #[serde(default = "default_conversion")]
        conversion: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format_spec: Option<Box<Expr>>,
    },
    List {
        elts: Vec<Expr>,
    },
    Tuple {
        elts: Vec<Expr>,
    },
    Dict {
        keys: Vec<Expr>,
        values: Vec<Expr>,
    },
    Starred {
        value: Box<Expr>,
    },
}

fn default_conversion() -> i32 {
    -1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// `None` means a `**kwargs` splat, which lowering rejects.
    pub arg: Option<String>,
    pub value: Expr,
}

/// Constant payloads travel as bare JSON scalars. Bool must precede Int so
/// `true` does not deserialize as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lit {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    None,
}

impl Lit {
    /// The source-language name of the payload kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Lit::Bool(_) => "bool",
            Lit::Int(_) => "int",
            Lit::Float(_) => "float",
            Lit::Str(_) => "str",
            Lit::None => "None",
        }
    }
}
