//! The script interpreter.
//!
//! A tree-walking evaluator over the AST produced by the parser. Control
//! flow (`break`, `continue`, `return`) is tracked as a pending flow event
//! that loops and calls consume.

use std::rc::Rc;

use indexmap::IndexMap;

use super::ast::{
    DeclKind, Element, Expr, ExprKind, ForEachKind, FunctionBody, FunctionDef, LogicalOp, Program,
    Stmt, TemplatePart, UnaryOp, UpdateOp,
};
use super::library::{self, BuiltinResult, Invoke};
use super::ops;
use super::parser::{parse_expression, parse_program};
use super::scope::Scopes;
use super::value::{Closure, EvalError, EvalResult, Value};

/// Maximum number of iterations of a single loop.
const MAX_ITERATIONS: usize = 1_000_000;

/// Configuration for the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum depth of nested function calls.
    ///
    /// The default of 64 fits the 2 MB stack of an ordinary spawned thread.
    /// Raise it only when the interpreter runs on a larger stack, as the
    /// expander does.
    pub max_recursion_depth: usize,
    /// Maximum iterations of any one loop (infinite loop protection).
    pub max_iterations: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            // Each script call nests several native frames.
            max_recursion_depth: 64,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

impl EvalConfig {
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }
}

/// A failure while running a sequence of declaration blocks, attributed to
/// the block (0-based) that raised it. Spans are relative to that block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockError {
    pub block: usize,
    pub error: EvalError,
}

/// A control flow event that occurred during evaluation.
#[derive(Debug, Clone)]
enum FlowEvent {
    /// Break out of a loop
    Break,
    /// Continue to next iteration
    Continue,
    /// Return from a function
    Return(Value),
}

/// An assignment target, resolved once so compound assignment evaluates
/// the object and index expressions a single time.
enum Place {
    Var(String),
    Property(Value, String),
}

/// The script interpreter.
///
/// Holds the global scope across calls, so declarations made by `run` or
/// `run_blocks` stay visible to later `eval_expression` calls.
pub struct Interpreter {
    /// The scope stack for variable bindings
    scopes: Scopes,
    /// Pending control flow
    flow: Option<FlowEvent>,
    /// Limits
    config: EvalConfig,
    /// Current call depth (for infinite recursion protection)
    current_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoke for Interpreter {
    fn invoke(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult<Value> {
        self.call_value(callee, args)
    }
}

impl Interpreter {
    /// Create an interpreter with the standard library and default limits.
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            scopes: Scopes::with_stdlib(library::globals()),
            flow: None,
            config,
            current_depth: 0,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Look up a binding in the global scope chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.scopes.get(name)
    }

    /// Bind a global variable.
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) -> EvalResult<()> {
        self.scopes.define(name, value)
    }

    /// Run one program in the global scope.
    pub fn run(&mut self, source: &str) -> EvalResult<()> {
        self.run_blocks(&[source]).map_err(|e| e.error)
    }

    /// Run several sources as one program. Function declarations are hoisted
    /// across all of them before any statement executes.
    pub fn run_blocks<S: AsRef<str>>(&mut self, blocks: &[S]) -> Result<(), BlockError> {
        let programs = blocks
            .iter()
            .enumerate()
            .map(|(block, source)| {
                parse_program(source.as_ref()).map_err(|error| BlockError { block, error })
            })
            .collect::<Result<Vec<Program>, _>>()?;

        for (block, program) in programs.iter().enumerate() {
            self.hoist(&program.body)
                .map_err(|error| BlockError { block, error })?;
        }
        for (block, program) in programs.iter().enumerate() {
            log::trace!("running declaration block {}", block);
            self.exec_sequence(&program.body)
                .map_err(|error| BlockError { block, error })?;
        }
        Ok(())
    }

    /// Evaluate one expression in the current global context.
    pub fn eval_expression(&mut self, source: &str) -> EvalResult<Value> {
        let expr = parse_expression(source)?;
        self.eval_expr(&expr)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Bind function declarations of a statement list in the current frame.
    fn hoist(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        for stmt in stmts {
            if let Stmt::Function(def) = stmt {
                let name = def.name.clone().unwrap_or_default();
                let closure = self.make_closure(def);
                self.scopes.define(name, closure)?;
            }
        }
        Ok(())
    }

    fn exec_sequence(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
            if self.flow.is_some() {
                break;
            }
        }
        Ok(())
    }

    fn exec_body(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        self.hoist(stmts)?;
        self.exec_sequence(stmts)
    }

    /// Run statements in a fresh block scope.
    fn exec_block(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        self.scopes.enter();
        let result = self.exec_body(stmts);
        self.scopes.exit();
        result
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Declare { kind, declarators } => {
                for decl in declarators {
                    let value = match &decl.init {
                        Some(init) => self.eval_expr(init)?,
                        None => Value::Undefined,
                    };
                    let name = decl.name.clone();
                    let bound = match kind {
                        DeclKind::Var => self.scopes.define(name, value),
                        DeclKind::Let => self.scopes.define_let(name, value),
                        DeclKind::Const => self.scopes.define_const(name, value),
                    };
                    bound.map_err(|e| e.or_span(decl.span))?;
                }
                Ok(())
            }
            // Bound by `hoist`
            Stmt::Function(_) => Ok(()),
            Stmt::Expr(expr) => self.eval_expr(expr).map(|_| ()),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.exec_stmt(then)
                } else if let Some(otherwise) = otherwise {
                    self.exec_stmt(otherwise)
                } else {
                    Ok(())
                }
            }
            Stmt::While { cond, body } => self.exec_while(cond, body),
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.scopes.enter();
                let result = self.exec_for(init.as_deref(), cond.as_ref(), update.as_ref(), body);
                self.scopes.exit();
                result
            }
            Stmt::ForEach {
                kind,
                name,
                over,
                iterable,
                body,
            } => self.exec_for_each(*kind, name, *over, iterable, body),
            Stmt::Block(stmts) => self.exec_block(stmts),
            Stmt::Return(value, _) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Undefined,
                };
                self.flow = Some(FlowEvent::Return(value));
                Ok(())
            }
            Stmt::Break(_) => {
                self.flow = Some(FlowEvent::Break);
                Ok(())
            }
            Stmt::Continue(_) => {
                self.flow = Some(FlowEvent::Continue);
                Ok(())
            }
            Stmt::Throw(expr) => {
                let value = self.eval_expr(expr)?;
                Err(EvalError::thrown(&value).with_span(expr.span))
            }
            Stmt::Empty => Ok(()),
        }
    }

    fn tick(&self, iterations: &mut usize) -> EvalResult<()> {
        *iterations += 1;
        if *iterations > self.config.max_iterations {
            return Err(EvalError::too_many_iterations(self.config.max_iterations));
        }
        Ok(())
    }

    /// Consume a loop-level flow event. Returns true if the loop must stop.
    fn loop_should_stop(&mut self) -> bool {
        match self.flow.take() {
            Some(FlowEvent::Break) => true,
            Some(FlowEvent::Continue) | None => false,
            Some(ret @ FlowEvent::Return(_)) => {
                self.flow = Some(ret);
                true
            }
        }
    }

    fn exec_while(&mut self, cond: &Expr, body: &Stmt) -> EvalResult<()> {
        let mut iterations = 0;
        while self.eval_expr(cond)?.is_truthy() {
            self.tick(&mut iterations)?;
            self.exec_stmt(body)?;
            if self.loop_should_stop() {
                break;
            }
        }
        Ok(())
    }

    fn exec_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> EvalResult<()> {
        if let Some(init) = init {
            self.exec_stmt(init)?;
        }
        let mut iterations = 0;
        loop {
            if let Some(cond) = cond {
                if !self.eval_expr(cond)?.is_truthy() {
                    break;
                }
            }
            self.tick(&mut iterations)?;
            self.exec_stmt(body)?;
            if self.loop_should_stop() {
                break;
            }
            // Fresh copy of the loop variables for the next iteration, so
            // closures created in the body keep the value they saw.
            if let Some(frame) = self.scopes.exit() {
                self.scopes.enter_with(frame);
            }
            if let Some(update) = update {
                self.eval_expr(update)?;
            }
        }
        Ok(())
    }

    fn exec_for_each(
        &mut self,
        kind: Option<DeclKind>,
        name: &str,
        over: ForEachKind,
        iterable: &Expr,
        body: &Stmt,
    ) -> EvalResult<()> {
        let value = self.eval_expr(iterable)?;
        let items = match over {
            ForEachKind::Of => library::iterate(&value),
            ForEachKind::In => library::own_entries(&value)
                .map(|entries| entries.into_iter().map(|(k, _)| Value::Str(k)).collect()),
        }
        .map_err(|e| e.or_span(iterable.span))?;

        let mut iterations = 0;
        for item in items {
            self.tick(&mut iterations)?;
            let result = match kind {
                Some(kind) => {
                    self.scopes.enter();
                    let bound = match kind {
                        DeclKind::Var => self.scopes.define(name, item),
                        DeclKind::Let => self.scopes.define_let(name, item),
                        DeclKind::Const => self.scopes.define_const(name, item),
                    };
                    let result = bound.and_then(|_| self.exec_stmt(body));
                    self.scopes.exit();
                    result
                }
                None => self
                    .scopes
                    .assign(name, item)
                    .and_then(|_| self.exec_stmt(body)),
            };
            result?;
            if self.loop_should_stop() {
                break;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.eval_expr_inner(expr).map_err(|e| e.or_span(expr.span))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Template(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expr(e) => out.push_str(&self.eval_expr(e)?.display()),
                    }
                }
                Ok(Value::Str(out))
            }
            ExprKind::Ident(name) => self.scopes.get_or_err(name),
            ExprKind::Array(elements) => Ok(Value::array(self.eval_elements(elements)?)),
            ExprKind::Object(entries) => {
                let mut map = IndexMap::new();
                for (key, value) in entries {
                    let value = self.eval_expr(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::object(map))
            }
            ExprKind::Member { object, property } => {
                let object = self.eval_expr(object)?;
                library::get_property(&object, property)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object)?;
                let key = library::property_key(&self.eval_expr(index)?);
                library::get_property(&object, &key)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::Unary { op, operand } => {
                if let (UnaryOp::Typeof, ExprKind::Ident(name)) = (op, &operand.kind) {
                    if !self.scopes.contains(name) {
                        return Ok(Value::from("undefined"));
                    }
                }
                let value = self.eval_expr(operand)?;
                Ok(ops::unary(*op, &value))
            }
            ExprKind::Update { op, prefix, target } => {
                let place = self.place(target)?;
                let old = self.read_place(&place)?.to_number();
                let new = match op {
                    UpdateOp::Inc => old + 1.0,
                    UpdateOp::Dec => old - 1.0,
                };
                self.write_place(&place, Value::Number(new))?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                library::check_string_length(ops::binary(*op, &lhs, &rhs))
            }
            ExprKind::Logical { op, lhs, rhs } => {
                let lhs = self.eval_expr(lhs)?;
                let short_circuit = match op {
                    LogicalOp::And => !lhs.is_truthy(),
                    LogicalOp::Or => lhs.is_truthy(),
                    LogicalOp::Nullish => !lhs.is_nullish(),
                };
                if short_circuit {
                    Ok(lhs)
                } else {
                    self.eval_expr(rhs)
                }
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.eval_expr(then)
                } else {
                    self.eval_expr(otherwise)
                }
            }
            ExprKind::Assign { op, target, value } => {
                let place = self.place(target)?;
                let value = match op {
                    None => self.eval_expr(value)?,
                    Some(op) => {
                        let current = self.read_place(&place)?;
                        let rhs = self.eval_expr(value)?;
                        library::check_string_length(ops::binary(*op, &current, &rhs))?
                    }
                };
                self.write_place(&place, value.clone())?;
                Ok(value)
            }
            ExprKind::Function(def) => Ok(self.make_closure(def)),
        }
    }

    fn eval_elements(&mut self, elements: &[Element]) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Item(expr) => values.push(self.eval_expr(expr)?),
                Element::Spread(expr) => {
                    let spread = self.eval_expr(expr)?;
                    values.extend(library::iterate(&spread).map_err(|e| e.or_span(expr.span))?);
                }
            }
        }
        Ok(values)
    }

    fn place(&mut self, target: &Expr) -> EvalResult<Place> {
        match &target.kind {
            ExprKind::Ident(name) => Ok(Place::Var(name.clone())),
            ExprKind::Member { object, property } => {
                Ok(Place::Property(self.eval_expr(object)?, property.clone()))
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object)?;
                let key = library::property_key(&self.eval_expr(index)?);
                Ok(Place::Property(object, key))
            }
            _ => Err(EvalError::syntax("invalid assignment target").with_span(target.span)),
        }
    }

    fn read_place(&self, place: &Place) -> EvalResult<Value> {
        match place {
            Place::Var(name) => self.scopes.get_or_err(name),
            Place::Property(object, key) => library::get_property(object, key),
        }
    }

    fn write_place(&mut self, place: &Place, value: Value) -> EvalResult<()> {
        match place {
            Place::Var(name) => self.scopes.assign(name, value),
            Place::Property(object, key) => library::set_property(object, key, value),
        }
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn make_closure(&self, def: &Rc<FunctionDef>) -> Value {
        Value::Func(Rc::new(Closure {
            def: def.clone(),
            env: self.scopes.clone(),
        }))
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Element]) -> EvalResult<Value> {
        let (receiver, key) = match &callee.kind {
            ExprKind::Member { object, property } => (self.eval_expr(object)?, property.clone()),
            ExprKind::Index { object, index } => {
                let receiver = self.eval_expr(object)?;
                let key = library::property_key(&self.eval_expr(index)?);
                (receiver, key)
            }
            _ => {
                let function = self.eval_expr(callee)?;
                let args = self.eval_elements(args)?;
                if !function.is_callable() {
                    let what = match &callee.kind {
                        ExprKind::Ident(name) => name.clone(),
                        _ => function.repr(),
                    };
                    return Err(EvalError::not_callable(what));
                }
                return self.call_value(&function, args);
            }
        };
        let args = self.eval_elements(args)?;
        self.call_method(&receiver, &key, args)
    }

    /// `receiver.key(args)`: own callable properties first (`Math.floor`,
    /// functions stored in objects), then built-in methods.
    fn call_method(&mut self, receiver: &Value, key: &str, args: Vec<Value>) -> EvalResult<Value> {
        let property = library::get_property(receiver, key)?;
        if property.is_callable() {
            return self.call_value(&property, args);
        }
        match library::call_method(receiver, key, args, self) {
            BuiltinResult::Ok(value) => Ok(value),
            BuiltinResult::Err(error) => Err(error),
            BuiltinResult::NotFound => Err(EvalError::not_callable(format!(
                "{}.{}",
                receiver.type_name(),
                key
            ))),
        }
    }

    /// Call any callable value with already evaluated arguments.
    pub fn call_value(&mut self, function: &Value, args: Vec<Value>) -> EvalResult<Value> {
        match function {
            Value::Native(native) => library::call_native(*native, args, self),
            Value::Func(closure) => self.call_closure(closure, args),
            other => Err(EvalError::not_callable(other.repr())),
        }
    }

    fn call_closure(&mut self, closure: &Rc<Closure>, args: Vec<Value>) -> EvalResult<Value> {
        if self.current_depth >= self.config.max_recursion_depth {
            return Err(EvalError::recursion_limit(self.config.max_recursion_depth));
        }
        self.current_depth += 1;
        let saved_scopes = std::mem::replace(&mut self.scopes, closure.env.clone());
        let saved_flow = self.flow.take();
        self.scopes.enter();

        let result = self.bind_and_run(closure, args);

        self.scopes = saved_scopes;
        self.flow = saved_flow;
        self.current_depth -= 1;
        result
    }

    fn bind_and_run(&mut self, closure: &Rc<Closure>, args: Vec<Value>) -> EvalResult<Value> {
        let def = &closure.def;
        if let Some(name) = &def.name {
            // Named function expressions can refer to themselves.
            self.scopes.define(name.clone(), Value::Func(closure.clone()))?;
        }
        for (i, param) in def.params.iter().enumerate() {
            let mut value = args.get(i).cloned().unwrap_or_default();
            if matches!(value, Value::Undefined) {
                if let Some(default) = &param.default {
                    value = self.eval_expr(default)?;
                }
            }
            self.scopes.define(param.name.clone(), value)?;
        }
        if let Some(rest) = &def.rest {
            let extra: Vec<Value> = args.into_iter().skip(def.params.len()).collect();
            self.scopes.define(rest.clone(), Value::array(extra))?;
        }

        match &def.body {
            FunctionBody::Expr(expr) => self.eval_expr(expr),
            FunctionBody::Block(stmts) => {
                self.exec_body(stmts)?;
                Ok(match self.flow.take() {
                    Some(FlowEvent::Return(value)) => value,
                    _ => Value::Undefined,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::script::value::EvalErrorKind;
    use pretty_assertions::assert_eq;

    fn eval_with(program: &str, expr: &str) -> Value {
        let mut interp = Interpreter::new();
        interp.run(program).unwrap();
        interp.eval_expression(expr).unwrap()
    }

    fn eval(expr: &str) -> String {
        eval_with("", expr).display()
    }

    #[test]
    fn test_arithmetic_and_strings() {
        assert_eq!(eval("1 + 2 * 3"), "7");
        assert_eq!(eval("2 ** 10"), "1024");
        assert_eq!(eval("'a' + 1 + 2"), "a12");
        assert_eq!(eval("1 + 2 + 'a'"), "3a");
        assert_eq!(eval("7 / 2"), "3.5");
        assert_eq!(eval("`sum: ${1 + 1}`"), "sum: 2");
        assert_eq!(eval("null ?? 'fallback'"), "fallback");
        assert_eq!(eval("0 || 'x'"), "x");
        assert_eq!(eval("typeof missing"), "undefined");
    }

    #[test]
    fn test_declarations_persist_between_calls() {
        let mut interp = Interpreter::new();
        interp.run("const x = 2; let items = [1, 2, 3];").unwrap();
        assert_eq!(interp.eval_expression("x * 2").unwrap(), Value::from(4.0));
        interp.eval_expression("items.push(4)").unwrap();
        assert_eq!(interp.eval_expression("items.length").unwrap(), Value::from(4.0));
    }

    #[test]
    fn test_functions_and_closures() {
        let program = r#"
            function square(x) { return x * x; }
            const add = (a, b = 10) => a + b;
            function counter() {
                let n = 0;
                return () => ++n;
            }
            const next = counter();
            next();
        "#;
        assert_eq!(eval_with(program, "square(4)").display(), "16");
        assert_eq!(eval_with(program, "add(1)").display(), "11");
        assert_eq!(eval_with(program, "next()").display(), "2");
        assert_eq!(eval_with("const f = (...xs) => xs.length;", "f(1, 2, 3)").display(), "3");
    }

    #[test]
    fn test_hoisting_across_blocks() {
        let mut interp = Interpreter::new();
        interp
            .run_blocks(&["const y = double(3);", "function double(n) { return n * 2; }"])
            .unwrap();
        assert_eq!(interp.get("y"), Some(Value::from(6.0)));
    }

    #[test]
    fn test_closure_sees_later_globals() {
        assert_eq!(
            eval_with("const show = () => label; const label = 'late';", "show()").display(),
            "late"
        );
    }

    #[test]
    fn test_loops() {
        let program = r#"
            let total = 0;
            for (let i = 0; i < 10; i++) {
                if (i % 2) continue;
                if (i > 6) break;
                total += i;
            }
            let keys = [];
            for (const k in { a: 1, b: 2 }) keys.push(k);
            let chars = '';
            for (const c of 'xyz') { chars = c + chars; }
            let n = 0;
            while (n < 5) n++;
        "#;
        assert_eq!(eval_with(program, "total").display(), "12");
        assert_eq!(eval_with(program, "keys.join('|')").display(), "a|b");
        assert_eq!(eval_with(program, "chars").display(), "zyx");
        assert_eq!(eval_with(program, "n").display(), "5");
    }

    #[test]
    fn test_let_loop_variables_are_per_iteration() {
        let program = r#"
            const fns = [];
            for (let i = 0; i < 3; i++) { fns.push(() => i); }
        "#;
        assert_eq!(eval_with(program, "fns.map(f => f()).join()").display(), "0,1,2");
    }

    #[test]
    fn test_array_callbacks() {
        let program = "const xs = [5, 1, 4, 2, 3];";
        assert_eq!(eval_with(program, "xs.map(x => x * 2).join(' ')").display(), "10 2 8 4 6");
        assert_eq!(eval_with(program, "xs.filter(x => x > 2).length").display(), "3");
        assert_eq!(eval_with(program, "xs.reduce((a, b) => a + b, 0)").display(), "15");
        assert_eq!(eval_with(program, "xs.slice().sort((a, b) => a - b).join()").display(), "1,2,3,4,5");
        assert_eq!(eval_with(program, "xs.find(x => x > 3)").display(), "5");
        assert_eq!(eval_with(program, "xs.some(x => x > 4)").display(), "true");
        assert_eq!(eval_with(program, "[...xs, 6].length").display(), "6");
    }

    #[test]
    fn test_objects_and_methods() {
        let program = r#"
            const point = { x: 1, y: 2, scale: k => k * 10 };
            point.z = 3;
            point['x'] += 5;
        "#;
        assert_eq!(eval_with(program, "point.x + point.z").display(), "9");
        assert_eq!(eval_with(program, "point.scale(2)").display(), "20");
        assert_eq!(eval_with(program, "Object.keys(point).join()").display(), "x,y,scale,z");
        assert_eq!(eval_with(program, "(3.14159).toFixed(2)").display(), "3.14");
        assert_eq!(eval_with(program, "Math.max(1, 9, 3)").display(), "9");
        assert_eq!(eval_with(program, "Number.isInteger(4)").display(), "true");
    }

    #[test]
    fn test_const_assignment_fails() {
        let mut interp = Interpreter::new();
        interp.run("const x = 1;").unwrap();
        let err = interp.eval_expression("x = 2").unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::ConstAssignment(_)));
    }

    #[test]
    fn test_undefined_variable_has_span() {
        let mut interp = Interpreter::new();
        let err = interp.eval_expression("1 + missing").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::UndefinedVariable("missing".to_string()));
        assert_eq!(err.span.and_then(|s| s.extract("1 + missing")), Some("missing"));
    }

    #[test]
    fn test_block_attribution() {
        let mut interp = Interpreter::new();
        let err = interp
            .run_blocks(&["const a = 1;", "const b = a + ;"])
            .unwrap_err();
        assert_eq!(err.block, 1);
        assert!(err.error.is_syntax_error());

        let mut interp = Interpreter::new();
        let err = interp
            .run_blocks(&["const a = 1;", "const b = 2;", "throw 'boom';"])
            .unwrap_err();
        assert_eq!(err.block, 2);
        assert_eq!(err.error.kind, EvalErrorKind::Thrown("boom".to_string()));
    }

    #[test]
    fn test_iteration_limit() {
        let mut interp = Interpreter::with_config(EvalConfig::default().with_max_iterations(100));
        let err = interp.run("while (true) {}").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TooManyIterations { max_iterations: 100 });
    }

    #[test]
    fn test_recursion_limit() {
        let config = EvalConfig::default().with_max_recursion_depth(16);
        let mut interp = Interpreter::with_config(config);
        interp.run("function down(n) { return down(n + 1); }").unwrap();
        let err = interp.eval_expression("down(0)").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::RecursionLimitExceeded { max_depth: 16 });

        // The interpreter stays usable afterwards
        assert_eq!(interp.eval_expression("1 + 1").unwrap(), Value::from(2.0));
    }

    #[test]
    fn test_not_callable() {
        let mut interp = Interpreter::new();
        interp.run("const n = 3;").unwrap();
        let err = interp.eval_expression("n()").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::NotCallable("n".to_string()));
        let err = interp.eval_expression("[1].frobnicate()").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::NotCallable("array.frobnicate".to_string()));
    }
}
