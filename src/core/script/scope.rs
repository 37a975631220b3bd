//! Scope management for the script interpreter.
//!
//! Frames are reference counted so a closure can hold on to the chain it was
//! defined in: bindings added to the global frame after the closure was
//! created stay visible to it, as in JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::value::{EvalError, EvalResult, Value};

/// A variable binding.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    /// `let`/`const` bindings may not be redeclared in the same frame
    pub lexical: bool,
    /// `const` bindings may not be reassigned
    pub constant: bool,
}

/// A single scope frame containing variable bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Variable bindings in this scope (IndexMap preserves insertion order)
    bindings: IndexMap<String, Binding>,
}

impl Scope {
    /// Create a new empty scope.
    pub fn new() -> Self {
        Self {
            bindings: IndexMap::new(),
        }
    }

    /// Create a scope from plain values (for the global library).
    pub fn from_values(values: IndexMap<String, Value>) -> Self {
        let bindings = values
            .into_iter()
            .map(|(name, value)| {
                (
                    name,
                    Binding {
                        value,
                        lexical: false,
                        constant: false,
                    },
                )
            })
            .collect();
        Self { bindings }
    }

    /// Get a variable from this scope.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(|b| &b.value)
    }

    /// Check if a variable exists in this scope.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Names bound in this scope, in definition order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.bindings.keys()
    }
}

type Frame = Rc<RefCell<Scope>>;

/// A chain of scope frames, innermost last.
#[derive(Debug, Clone)]
pub struct Scopes {
    stack: Vec<Frame>,
}

impl Scopes {
    /// Create a new scope stack with a single empty scope.
    pub fn new() -> Self {
        Self {
            stack: vec![Rc::new(RefCell::new(Scope::new()))],
        }
    }

    /// Create a scope stack whose outermost frame holds the standard library,
    /// with a fresh global frame for user code above it.
    pub fn with_stdlib(stdlib: IndexMap<String, Value>) -> Self {
        Self {
            stack: vec![
                Rc::new(RefCell::new(Scope::from_values(stdlib))),
                Rc::new(RefCell::new(Scope::new())),
            ],
        }
    }

    /// Enter a new scope (push a new frame onto the stack).
    pub fn enter(&mut self) {
        self.stack.push(Rc::new(RefCell::new(Scope::new())));
    }

    /// Enter a new scope seeded with a copy of the given frame contents.
    pub fn enter_with(&mut self, scope: Scope) {
        self.stack.push(Rc::new(RefCell::new(scope)));
    }

    /// Exit the current scope (pop a frame from the stack).
    ///
    /// Returns a copy of the exited scope, or None if only the root remains.
    pub fn exit(&mut self) -> Option<Scope> {
        if self.stack.len() > 1 {
            self.stack.pop().map(|frame| frame.borrow().clone())
        } else {
            None
        }
    }

    /// Declare a `var` or function binding in the current frame. Existing
    /// non-lexical bindings are overwritten.
    pub fn define(&mut self, name: impl Into<String>, value: Value) -> EvalResult<()> {
        self.declare(name.into(), value, false, false)
    }

    /// Declare a `let` binding in the current frame.
    pub fn define_let(&mut self, name: impl Into<String>, value: Value) -> EvalResult<()> {
        self.declare(name.into(), value, true, false)
    }

    /// Declare a `const` binding in the current frame.
    pub fn define_const(&mut self, name: impl Into<String>, value: Value) -> EvalResult<()> {
        self.declare(name.into(), value, true, true)
    }

    fn declare(&mut self, name: String, value: Value, lexical: bool, constant: bool) -> EvalResult<()> {
        let Some(frame) = self.stack.last() else {
            return Ok(());
        };
        let mut scope = frame.borrow_mut();
        if let Some(existing) = scope.bindings.get(&name) {
            if existing.lexical || lexical {
                return Err(EvalError::redeclaration(name));
            }
        }
        scope.bindings.insert(
            name,
            Binding {
                value,
                lexical,
                constant,
            },
        );
        Ok(())
    }

    /// Look up a variable by name, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().get(name).cloned())
    }

    /// Look up a variable or return an error if not found.
    pub fn get_or_err(&self, name: &str) -> EvalResult<Value> {
        self.get(name).ok_or_else(|| EvalError::undefined(name))
    }

    /// Assign to an existing variable (updates in the frame where it was defined).
    pub fn assign(&mut self, name: &str, value: Value) -> EvalResult<()> {
        for frame in self.stack.iter().rev() {
            let mut scope = frame.borrow_mut();
            if let Some(binding) = scope.bindings.get_mut(name) {
                if binding.constant {
                    return Err(EvalError::const_assignment(name));
                }
                binding.value = value;
                return Ok(());
            }
        }
        Err(EvalError::undefined(name))
    }

    /// Check if a variable exists in any scope.
    pub fn contains(&self, name: &str) -> bool {
        self.stack.iter().any(|frame| frame.borrow().contains(name))
    }

    /// Get the current scope depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Snapshot of the current (topmost) frame.
    pub fn current(&self) -> Scope {
        self.stack
            .last()
            .map(|frame| frame.borrow().clone())
            .unwrap_or_default()
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_define_and_get() {
        let mut scopes = Scopes::new();
        scopes.define("x", Value::from(42.0)).unwrap();

        assert_eq!(scopes.get("x"), Some(Value::from(42.0)));
        assert_eq!(scopes.get("y"), None);
    }

    #[test]
    fn test_scope_shadowing() {
        let mut scopes = Scopes::new();
        scopes.define_let("x", Value::from(1.0)).unwrap();

        scopes.enter();
        scopes.define_let("x", Value::from(2.0)).unwrap();
        assert_eq!(scopes.get("x"), Some(Value::from(2.0)));

        scopes.exit();
        assert_eq!(scopes.get("x"), Some(Value::from(1.0)));
    }

    #[test]
    fn test_const_rejects_assignment() {
        let mut scopes = Scopes::new();
        scopes.define_const("x", Value::from(1.0)).unwrap();
        let err = scopes.assign("x", Value::from(2.0)).unwrap_err();
        assert!(matches!(err.kind, super::super::value::EvalErrorKind::ConstAssignment(_)));
    }

    #[test]
    fn test_lexical_redeclaration() {
        let mut scopes = Scopes::new();
        scopes.define_let("x", Value::from(1.0)).unwrap();
        assert!(scopes.define_let("x", Value::from(2.0)).is_err());
        assert!(scopes.define("x", Value::from(2.0)).is_err());

        scopes.define("v", Value::from(1.0)).unwrap();
        assert!(scopes.define("v", Value::from(2.0)).is_ok());
    }

    #[test]
    fn test_shared_frames_see_later_bindings() {
        let mut scopes = Scopes::new();
        let captured = scopes.clone();
        scopes.define("late", Value::from("seen")).unwrap();
        assert_eq!(captured.get("late"), Some(Value::from("seen")));
    }

    #[test]
    fn test_assign_updates_defining_frame() {
        let mut scopes = Scopes::new();
        scopes.define_let("count", Value::from(0.0)).unwrap();
        scopes.enter();
        scopes.assign("count", Value::from(5.0)).unwrap();
        scopes.exit();
        assert_eq!(scopes.get("count"), Some(Value::from(5.0)));
        assert!(scopes.assign("missing", Value::Null).is_err());
    }
}
