//! Evaluation of declaration and expression blocks
//!
//! The pipeline talks to the script engine through [`Evaluator`], so a host
//! can plug in its own engine. [`Interpreter`] is the built-in one.

use crate::core::script::{EvalError, EvalResult, Interpreter, Value};

use super::config::EvaluationStrategy;
use super::extract::ExpressionSlot;

/// A failed declaration program.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationFailure {
    /// Index of the block that raised, when the engine can tell
    pub block: Option<usize>,
    pub error: EvalError,
}

/// Runs the blocks of one document.
pub trait Evaluator {
    /// Execute all declaration blocks, in order, as one program.
    fn declare(&mut self, blocks: &[String]) -> Result<(), DeclarationFailure>;

    /// Evaluate a single expression in the context set up by `declare`.
    fn evaluate(&mut self, expression: &str) -> EvalResult<Value>;
}

impl Evaluator for Interpreter {
    fn declare(&mut self, blocks: &[String]) -> Result<(), DeclarationFailure> {
        self.run_blocks(blocks).map_err(|e| DeclarationFailure {
            block: Some(e.block),
            error: e.error,
        })
    }

    fn evaluate(&mut self, expression: &str) -> EvalResult<Value> {
        self.eval_expression(expression)
    }
}

/// The values of a document's expression blocks, in document order.
///
/// Lazy evaluation runs each expression when its value is pulled; eager
/// evaluation runs them all on construction and stops at the first error.
/// Either way the sequence ends right after the first `Err`.
pub enum Evaluations<'a, E: Evaluator + ?Sized> {
    Lazy {
        evaluator: &'a mut E,
        slots: std::slice::Iter<'a, ExpressionSlot>,
        failed: bool,
    },
    Eager(std::vec::IntoIter<EvalResult<Value>>),
}

impl<'a, E: Evaluator + ?Sized> Evaluations<'a, E> {
    pub fn new(evaluator: &'a mut E, slots: &'a [ExpressionSlot], strategy: EvaluationStrategy) -> Self {
        match strategy {
            EvaluationStrategy::Lazy => Evaluations::Lazy {
                evaluator,
                slots: slots.iter(),
                failed: false,
            },
            EvaluationStrategy::Eager => {
                let mut results = Vec::with_capacity(slots.len());
                for slot in slots {
                    let result = evaluator.evaluate(&slot.source);
                    let failed = result.is_err();
                    results.push(result);
                    if failed {
                        break;
                    }
                }
                Evaluations::Eager(results.into_iter())
            }
        }
    }
}

impl<E: Evaluator + ?Sized> Iterator for Evaluations<'_, E> {
    type Item = EvalResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Evaluations::Lazy {
                evaluator,
                slots,
                failed,
            } => {
                if *failed {
                    return None;
                }
                let slot = slots.next()?;
                log::trace!("evaluating __{}__ (line {})", slot.source, slot.line);
                let result = evaluator.evaluate(&slot.source);
                *failed = result.is_err();
                Some(result)
            }
            Evaluations::Eager(results) => results.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every expression it is asked for.
    #[derive(Default)]
    struct Recording {
        seen: Vec<String>,
    }

    impl Evaluator for Recording {
        fn declare(&mut self, _blocks: &[String]) -> Result<(), DeclarationFailure> {
            Ok(())
        }

        fn evaluate(&mut self, expression: &str) -> EvalResult<Value> {
            self.seen.push(expression.to_string());
            if expression == "bad" {
                Err(EvalError::undefined("bad"))
            } else {
                Ok(Value::from(expression))
            }
        }
    }

    fn slots(sources: &[&str]) -> Vec<ExpressionSlot> {
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| ExpressionSlot {
                source: s.to_string(),
                index: i,
                offset: 0,
                line: 1,
            })
            .collect()
    }

    #[test]
    fn test_lazy_evaluates_on_demand() {
        let slots = slots(&["a", "b", "c"]);
        let mut rec = Recording::default();
        let mut evals = Evaluations::new(&mut rec, &slots, EvaluationStrategy::Lazy);
        assert_eq!(evals.next(), Some(Ok(Value::from("a"))));
        drop(evals);
        assert_eq!(rec.seen, vec!["a"]);
    }

    #[test]
    fn test_eager_evaluates_up_front() {
        let slots = slots(&["a", "b", "c"]);
        let mut rec = Recording::default();
        let evals = Evaluations::new(&mut rec, &slots, EvaluationStrategy::Eager);
        drop(evals);
        assert_eq!(rec.seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_both_stop_after_first_error() {
        for strategy in [EvaluationStrategy::Lazy, EvaluationStrategy::Eager] {
            let slots = slots(&["a", "bad", "c"]);
            let mut rec = Recording::default();
            let results: Vec<_> = Evaluations::new(&mut rec, &slots, strategy).collect();
            assert_eq!(results.len(), 2, "{}", strategy);
            assert!(results[1].is_err());
            assert_eq!(rec.seen, vec!["a", "bad"]);
        }
    }

    #[test]
    fn test_interpreter_declare_attributes_block() {
        let mut interp = Interpreter::new();
        let blocks = vec!["const a = 1;".to_string(), "const b = ;".to_string()];
        let failure = interp.declare(&blocks).unwrap_err();
        assert_eq!(failure.block, Some(1));
        assert!(failure.error.is_syntax_error());
    }

    #[test]
    fn test_interpreter_declarations_visible_to_expressions() {
        let mut interp = Interpreter::new();
        interp
            .declare(&["function sq(n) { return n * n; }".to_string(), "const k = 3;".to_string()])
            .unwrap();
        assert_eq!(interp.evaluate("sq(k)").unwrap(), Value::from(9.0));
    }
}
