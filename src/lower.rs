//! Lower a syntax tree into a flat record stream.
//!
//! The driver dispatches over node kinds, keeps the scope stack honest, and
//! turns loop constructs into paired start/end marker records. Everything
//! outside the recognized subset aborts the run at the first offending node.

use std::collections::BTreeMap;

use crate::action::{self, Action};
use crate::ast;
use crate::error::CompileError;
use crate::modules;
use crate::scope::{ScopeKind, ScopeStack};
use crate::value::{self, Literal, Value};
use crate::value_type;

/// The result of a successful run: the flattened record stream plus any
/// advisory notices collected along the way.
#[derive(Debug)]
pub struct Lowering {
    pub actions: Vec<Action>,
    pub notices: Vec<String>,
}

/// Lower `module` against the standard builtin registry.
pub fn lower(module: &ast::Module) -> Result<Lowering, CompileError> {
    Lowerer::new(modules::builtins()).run(module)
}

/// One lowering run. Owns the scope stack; must not be reused.
pub struct Lowerer {
    scopes: ScopeStack,
    builtins: BTreeMap<String, Value>,
    notices: Vec<String>,
}

/// What a builder receives when called: the evaluated arguments, any raw
/// sub-trees it asked for, and a handle back into the driver for appending
/// records or recursively lowering argument internals.
pub struct CallArgs<'a> {
    pub builder: &'static str,
    pub driver: &'a mut Lowerer,
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
    pub raw: BTreeMap<String, ast::Expr>,
}

impl CallArgs<'_> {
    /// The in-progress record buffer of the innermost scope.
    pub fn actions(&mut self) -> &mut Vec<Action> {
        self.driver.current_buffer_mut()
    }

    pub fn required(&mut self, name: &str, index: usize) -> Result<Value, CompileError> {
        self.positional_or_keyword(name, index).ok_or_else(|| {
            CompileError::value(format!(
                "{}() is missing the '{}' argument",
                self.builder, name
            ))
        })
    }

    pub fn positional_or_keyword(&mut self, name: &str, index: usize) -> Option<Value> {
        if index < self.args.len() {
            Some(self.args[index].clone())
        } else {
            self.kwargs.remove(name)
        }
    }

    pub fn keyword(&mut self, name: &str) -> Option<Value> {
        self.kwargs.remove(name)
    }

    pub fn raw_arg(&self, name: &str) -> Option<&ast::Expr> {
        self.raw.get(name)
    }
}

impl Lowerer {
    /// The registry is a constructor parameter on purpose: independent runs
    /// must not share namespace state. The unnamed root module's bindings
    /// are in scope from the start; everything else is reachable via import.
    pub fn new(mut builtins: BTreeMap<String, Value>) -> Self {
        let globals = match builtins.remove("") {
            Some(Value::Module(children)) => children,
            _ => BTreeMap::new(),
        };
        Lowerer {
            scopes: ScopeStack::new(globals),
            builtins,
            notices: Vec::new(),
        }
    }

    pub fn run(mut self, module: &ast::Module) -> Result<Lowering, CompileError> {
        for stmt in &module.body {
            self.lower_stmt(stmt)?;
        }
        let (actions, functions) = self.scopes.finish();
        if !functions.is_empty() {
            return Err(CompileError::unsupported("functions are not implemented yet"));
        }
        Ok(Lowering {
            actions,
            notices: self.notices,
        })
    }

    pub fn current_buffer_mut(&mut self) -> &mut Vec<Action> {
        self.scopes.current_buffer_mut()
    }

    /// Record an advisory, non-fatal notice.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    fn lower_stmt(&mut self, stmt: &ast::Stmt) -> Result<(), CompileError> {
        self.lower_stmt_inner(stmt)
            .map_err(|e| e.locate(stmt.lineno()))
    }

    fn lower_stmt_inner(&mut self, stmt: &ast::Stmt) -> Result<(), CompileError> {
        match stmt {
            ast::Stmt::Expr { value, .. } => {
                self.lower_expr(value)?;
                Ok(())
            }
            ast::Stmt::Assign { targets, value, .. } => {
                if targets.len() != 1 {
                    return Err(CompileError::unsupported(
                        "assignments with more than one target are not supported",
                    ));
                }
                let ast::Expr::Name { id } = &targets[0] else {
                    return Err(CompileError::unsupported(
                        "assignment targets other than plain names are not supported",
                    ));
                };
                let value = self.expr_value(value, "assigned value")?;
                self.scopes.bind(id.clone(), value);
                Ok(())
            }
            ast::Stmt::ImportFrom {
                module,
                names,
                level,
                ..
            } => self.lower_import(module, names, *level),
            ast::Stmt::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => self.lower_for(target, iter, body, orelse),
            ast::Stmt::FunctionDef { .. } => Err(CompileError::unsupported(
                "function definitions are not supported yet",
            )),
        }
    }

    /// Lower an expression. Only calls can come back empty (a builder with
    /// no return value).
    fn lower_expr(&mut self, expr: &ast::Expr) -> Result<Option<Value>, CompileError> {
        match expr {
            ast::Expr::Name { id } => self
                .scopes
                .lookup(id)
                .cloned()
                .map(Some)
                .ok_or_else(|| CompileError::name(format!("name '{}' is not found", id))),
            ast::Expr::Constant { value } => match value {
                ast::Lit::Str(s) => Ok(Some(Value::Constant(Literal::Str(s.clone())))),
                ast::Lit::Int(n) => Ok(Some(Value::Constant(Literal::Int(*n)))),
                ast::Lit::Float(x) => Ok(Some(Value::Constant(Literal::Float(*x)))),
                ast::Lit::Bool(_) | ast::Lit::None => Err(CompileError::type_error(format!(
                    "constants of type {} are not supported",
                    value.kind_name()
                ))),
            },
            ast::Expr::Call {
                func,
                args,
                keywords,
            } => self.lower_call(func, args, keywords),
            ast::Expr::JoinedStr { values } => {
                let mut parts = Vec::new();
                for part in values {
                    parts.push(self.expr_value(part, "interpolated value")?);
                }
                Ok(Some(Value::TokenString(parts)))
            }
            ast::Expr::FormattedValue {
                value,
                conversion,
                format_spec,
            } => {
                if *conversion != -1 || format_spec.is_some() {
                    return Err(CompileError::unsupported(
                        "conversions in f-strings are not supported",
                    ));
                }
                self.lower_expr(value)
            }
            ast::Expr::List { elts } => self.lower_list(elts),
            ast::Expr::Tuple { .. } => {
                Err(CompileError::unsupported("Tuple nodes are not supported here"))
            }
            ast::Expr::Dict { .. } => {
                Err(CompileError::unsupported("Dict nodes are not supported here"))
            }
            ast::Expr::Starred { .. } => {
                Err(CompileError::unsupported("starred expressions are not supported"))
            }
        }
    }

    /// Lower an expression that must produce a value.
    pub fn expr_value(&mut self, expr: &ast::Expr, what: &str) -> Result<Value, CompileError> {
        self.lower_expr(expr)?
            .ok_or_else(|| CompileError::type_error(format!("{} produced no value", what)))
    }

    fn lower_call(
        &mut self,
        func: &ast::Expr,
        args: &[ast::Expr],
        keywords: &[ast::Keyword],
    ) -> Result<Option<Value>, CompileError> {
        let callee = self.expr_value(func, "call target")?;
        let Value::Builder(builder) = callee else {
            return Err(CompileError::type_error(format!(
                "{} values cannot be called",
                callee.kind_name()
            )));
        };
        let mut positional = Vec::new();
        for arg in args {
            if let ast::Expr::Starred { .. } = arg {
                return Err(CompileError::unsupported(
                    "starred arguments are not supported",
                ));
            }
            positional.push(self.expr_value(arg, "argument")?);
        }
        let mut kwargs = BTreeMap::new();
        let mut raw = BTreeMap::new();
        for kw in keywords {
            let Some(name) = &kw.arg else {
                return Err(CompileError::unsupported("**kwargs in calls is not supported"));
            };
            if builder.raw_params.contains(&name.as_str()) {
                raw.insert(name.clone(), kw.value.clone());
            } else {
                let value = self.expr_value(&kw.value, "argument")?;
                kwargs.insert(name.clone(), value);
            }
        }
        let mut call = CallArgs {
            builder: builder.name,
            driver: self,
            args: positional,
            kwargs,
            raw,
        };
        (builder.run)(&mut call)
    }

    /// Elements are coerced through token-string synthesis before landing in
    /// the record, so non-text elements become text.
    fn lower_list(&mut self, elts: &[ast::Expr]) -> Result<Option<Value>, CompileError> {
        let mut items = Vec::new();
        for elt in elts {
            let element = self.expr_value(elt, "list element")?;
            items.push(value::token_string(
                self.scopes.current_buffer_mut(),
                &[element],
            )?);
        }
        let mut record = Action::new(action::LIST).with_param("WFItems", items);
        let out = record.mark_output("List", &value_type::ANY);
        self.scopes.current_buffer_mut().push(record);
        Ok(Some(Value::ActionOutput(out)))
    }

    fn lower_import(
        &mut self,
        module: &str,
        names: &[ast::ImportName],
        level: u32,
    ) -> Result<(), CompileError> {
        if level != 0 {
            return Err(CompileError::unsupported("relative imports are not supported"));
        }
        let not_supported =
            || CompileError::module(format!("module '{}' is not supported", module));
        let mut resolved: Option<&Value> = None;
        for part in module.split('.') {
            let children = match resolved {
                None => &self.builtins,
                Some(Value::Module(children)) => children,
                Some(_) => return Err(not_supported()),
            };
            resolved = Some(children.get(part).ok_or_else(not_supported)?);
        }
        let Some(Value::Module(children)) = resolved else {
            return Err(not_supported());
        };
        let mut bindings = Vec::new();
        for alias in names {
            if alias.name == "*" {
                for (key, child) in children {
                    bindings.push((key.clone(), child.clone()));
                }
            } else {
                let child = children.get(&alias.name).ok_or_else(|| {
                    CompileError::module(format!(
                        "module '{}' has no member '{}'",
                        module, alias.name
                    ))
                })?;
                let bound = alias.asname.clone().unwrap_or_else(|| alias.name.clone());
                bindings.push((bound, child.clone()));
            }
        }
        for (name, value) in bindings {
            self.scopes.bind(name, value);
        }
        Ok(())
    }

    fn lower_for(
        &mut self,
        target: &ast::Expr,
        iter: &ast::Expr,
        body: &[ast::Stmt],
        orelse: &[ast::Stmt],
    ) -> Result<(), CompileError> {
        if !orelse.is_empty() {
            return Err(CompileError::unsupported(
                "else: is not supported in for statements",
            ));
        }
        if let ast::Expr::Call {
            func,
            args,
            keywords,
        } = iter
        {
            if let ast::Expr::Name { id } = func.as_ref() {
                if id == "range" {
                    return self.lower_counted_for(target, args, keywords, body);
                }
                if id == "enumerate" {
                    return self.lower_indexed_for(target, args, keywords, body);
                }
            }
        }
        self.lower_generic_for(target, iter, body)
    }

    fn lower_counted_for(
        &mut self,
        target: &ast::Expr,
        args: &[ast::Expr],
        keywords: &[ast::Keyword],
        body: &[ast::Stmt],
    ) -> Result<(), CompileError> {
        if !keywords.is_empty() {
            return Err(CompileError::unsupported(
                "for...range constructs cannot have keyword arguments",
            ));
        }
        let ast::Expr::Name { id: var } = target else {
            return Err(CompileError::unsupported(
                "for...range targets must be a single name",
            ));
        };
        let (start, end) = match args.len() {
            1 => (0, self.range_bound(&args[0])?),
            2 => (self.range_bound(&args[0])?, self.range_bound(&args[1])?),
            3 => {
                return Err(CompileError::unsupported(
                    "for...range with a step is not supported",
                ));
            }
            _ => return Err(CompileError::value("for...range has incorrect arguments")),
        };
        if end - start + 1 < 0 {
            return Err(CompileError::value("for...range has no iterations"));
        }

        let slot = self.loop_slot("Repeat Index");
        let group = action::new_uuid();

        // One arithmetic record materializes end - start + 1 ahead of the
        // start marker.
        let mut math = Action::new(action::MATH)
            .with_param("WFInput", end)
            .with_param("WFMathOperation", "-")
            .with_param("WFMathOperand", start - 1);
        let count = math.mark_output("Calculation Result", &value_type::NUMBER);
        let buffer = self.scopes.current_buffer_mut();
        buffer.push(math);
        let count_wire = value::token_attachment(buffer, &Value::ActionOutput(count))?;

        self.scopes.push(None, ScopeKind::ForCounter);
        self.scopes.bind(var.clone(), Value::MagicVariable(slot));
        self.scopes.current_buffer_mut().push(
            Action::new(action::REPEAT_COUNT)
                .with_param("WFControlFlowMode", 0)
                .with_param("GroupingIdentifier", group.clone())
                .with_param("WFRepeatCount", count_wire),
        );
        for stmt in body {
            self.lower_stmt(stmt)?;
        }
        self.scopes
            .current_buffer_mut()
            .push(end_marker(action::REPEAT_COUNT, &group));
        self.scopes.pop();
        Ok(())
    }

    fn lower_indexed_for(
        &mut self,
        target: &ast::Expr,
        args: &[ast::Expr],
        keywords: &[ast::Keyword],
        body: &[ast::Stmt],
    ) -> Result<(), CompileError> {
        if !keywords.is_empty() {
            return Err(CompileError::unsupported(
                "for...enumerate constructs cannot have keyword arguments",
            ));
        }
        if args.len() != 1 {
            return Err(CompileError::value("enumerate expects exactly one argument"));
        }
        let pair_error = || {
            CompileError::unsupported("for...enumerate targets must be a pair of names")
        };
        let ast::Expr::Tuple { elts } = target else {
            return Err(pair_error());
        };
        if elts.len() != 2 {
            return Err(pair_error());
        }
        let mut names = Vec::new();
        for elt in elts {
            let ast::Expr::Name { id } = elt else {
                return Err(pair_error());
            };
            names.push(id.clone());
        }
        let iterable = self.expr_value(&args[0], "enumerate argument")?;
        let index_slot = self.loop_slot("Repeat Index");
        let item_slot = self.loop_slot("Repeat Item");
        self.lower_each_loop(
            iterable,
            body,
            vec![(names[0].clone(), index_slot), (names[1].clone(), item_slot)],
        )
    }

    fn lower_generic_for(
        &mut self,
        target: &ast::Expr,
        iter: &ast::Expr,
        body: &[ast::Stmt],
    ) -> Result<(), CompileError> {
        let ast::Expr::Name { id } = target else {
            return Err(CompileError::unsupported("for targets must be a single name"));
        };
        let iterable = self.expr_value(iter, "loop iterable")?;
        let item_slot = self.loop_slot("Repeat Item");
        self.lower_each_loop(iterable, body, vec![(id.clone(), item_slot)])
    }

    fn lower_each_loop(
        &mut self,
        iterable: Value,
        body: &[ast::Stmt],
        bindings: Vec<(String, String)>,
    ) -> Result<(), CompileError> {
        let group = action::new_uuid();
        let input = value::token_attachment(self.scopes.current_buffer_mut(), &iterable)?;

        self.scopes.push(None, ScopeKind::ForEach);
        for (name, slot) in bindings {
            self.scopes.bind(name, Value::MagicVariable(slot));
        }
        self.scopes.current_buffer_mut().push(
            Action::new(action::REPEAT_EACH)
                .with_param("WFControlFlowMode", 0)
                .with_param("GroupingIdentifier", group.clone())
                .with_param("WFInput", input),
        );
        for stmt in body {
            self.lower_stmt(stmt)?;
        }
        self.scopes
            .current_buffer_mut()
            .push(end_marker(action::REPEAT_EACH, &group));
        self.scopes.pop();
        Ok(())
    }

    fn range_bound(&mut self, expr: &ast::Expr) -> Result<i64, CompileError> {
        match self.expr_value(expr, "range bound")? {
            Value::Constant(Literal::Int(n)) => Ok(n),
            other => Err(CompileError::unsupported(format!(
                "arguments to for...range must be integer constants, not {}",
                other.kind_name()
            ))),
        }
    }

    /// The host numbers same-kind nested repeat slots; the outermost loop
    /// keeps the bare name, the Nth nested one gets " N".
    fn loop_slot(&self, base: &str) -> String {
        let depth = self.scopes.open_loops();
        if depth == 0 {
            base.to_string()
        } else {
            format!("{} {}", base, depth + 1)
        }
    }
}

fn end_marker(identifier: &str, group: &str) -> Action {
    Action::new(identifier)
        .with_param("WFControlFlowMode", 2)
        .with_param("GroupingIdentifier", group)
}
