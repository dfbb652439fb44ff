//! Nested recording buffers with name bindings.
//!
//! A scope is a transparent recording aid: whatever kind of block opens one,
//! popping it splices its buffer into the enclosing scope's buffer in order,
//! so the net record stream is indistinguishable from having appended
//! directly, while block-scoped bindings (loop variables) vanish with it.

use std::collections::BTreeMap;

use crate::action::Action;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    ForEach,
    ForCounter,
}

impl ScopeKind {
    pub fn is_loop(self) -> bool {
        matches!(self, ScopeKind::ForEach | ScopeKind::ForCounter)
    }
}

#[derive(Debug)]
pub struct Scope {
    pub name: Option<String>,
    pub kind: ScopeKind,
    pub actions: Vec<Action>,
    pub variables: BTreeMap<String, Value>,
}

#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    functions: BTreeMap<String, Vec<Action>>,
}

impl ScopeStack {
    /// Create the stack with its one global scope, pre-seeded with
    /// `globals` bindings.
    pub fn new(globals: BTreeMap<String, Value>) -> Self {
        ScopeStack {
            scopes: vec![Scope {
                name: None,
                kind: ScopeKind::Global,
                actions: Vec::new(),
                variables: globals,
            }],
            functions: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, name: Option<String>, kind: ScopeKind) {
        self.scopes.push(Scope {
            name,
            kind,
            actions: Vec::new(),
            variables: BTreeMap::new(),
        });
    }

    /// Pop the innermost scope. Function buffers park in the function table;
    /// every other kind splices into the new top.
    pub fn pop(&mut self) {
        let scope = self.scopes.pop().expect("scope stack underflow");
        assert!(
            scope.kind != ScopeKind::Global,
            "popped the global scope"
        );
        if scope.kind == ScopeKind::Function {
            let name = scope.name.expect("function scope without a name");
            self.functions.insert(name, scope.actions);
        } else {
            self.current_mut().actions.extend(scope.actions);
        }
    }

    /// Bind `name` in the innermost scope, replacing any previous binding
    /// there.
    pub fn bind(&mut self, name: String, value: Value) {
        self.current_mut().variables.insert(name, value);
    }

    /// Innermost-to-outermost lookup; first match wins.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
    }

    pub fn current_buffer_mut(&mut self) -> &mut Vec<Action> {
        &mut self.current_mut().actions
    }

    /// How many loop scopes are open right now.
    pub fn open_loops(&self) -> usize {
        self.scopes.iter().filter(|s| s.kind.is_loop()).count()
    }

    fn current_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("scope stack underflow")
    }

    /// Tear the stack down at the end of a run, returning the global buffer
    /// and the function table.
    pub fn finish(mut self) -> (Vec<Action>, BTreeMap<String, Vec<Action>>) {
        assert!(
            self.scopes.len() == 1,
            "scopes left open at the end of a run"
        );
        let global = self.scopes.pop().expect("scope stack underflow");
        (global.actions, self.functions)
    }
}
