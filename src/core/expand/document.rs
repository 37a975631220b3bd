//! Document expansion
//!
//! Drives one document through the pipeline:
//!
//! ```text
//! raw text ─► placeholder scan ─► includes (recursive: expand + rewrite)
//!          ─► extraction ─► declarations ─► expressions ─► substitution
//! ```
//!
//! Nested documents are expanded depth-first and written before their
//! parent continues. Each document gets a fresh evaluator.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::script::Interpreter;
use crate::utils::error::{Diagnostic, DiagnosticKind, ExpandError, ExpandResult};
use crate::utils::vfs::VirtualFileSystem;

use super::config::ExpandConfig;
use super::evaluate::{Evaluations, Evaluator};
use super::extract::extract;
use super::include::{find_includes, rewrite_includes, IncludeDirective};
use super::placeholder::PlaceholderAllocator;
use super::substitute::substitute;

/// Stack of the thread a root document is expanded on.
const EXPANSION_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Builds the evaluator for one document.
pub type EvaluatorFactory = Arc<dyn Fn(&ExpandConfig) -> Box<dyn Evaluator> + Send + Sync>;

/// A declaration block and the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationBlock {
    pub file: String,
    /// Position among that document's own declaration blocks
    pub index: usize,
    pub source: String,
}

/// The result of expanding one document.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
    /// Name of the macro-source document
    pub name: String,
    /// Where the expanded text belongs
    pub output_path: String,
    /// Expanded text
    pub content: String,
    /// Declarations of this document, preceded by those of its expanded
    /// includes
    pub declarations: Vec<DeclarationBlock>,
    /// Warnings of this document and of its expanded includes
    pub warnings: Vec<Diagnostic>,
    /// Output paths of the expanded includes, in expansion order
    pub includes: Vec<String>,
}

/// State of one root expansion.
#[derive(Default)]
struct Session {
    /// Documents currently being expanded, root first
    chain: Vec<String>,
    /// Nested documents already expanded and written
    expanded: HashMap<String, DocumentOutput>,
}

/// Expands macro-source documents.
pub struct Expander {
    vfs: Arc<dyn VirtualFileSystem>,
    config: ExpandConfig,
    evaluator_factory: EvaluatorFactory,
}

impl Expander {
    /// Create an expander using the built-in script engine.
    pub fn new(vfs: Arc<dyn VirtualFileSystem>, config: ExpandConfig) -> Self {
        Self {
            vfs,
            config,
            evaluator_factory: Arc::new(|config: &ExpandConfig| {
                Box::new(Interpreter::with_config(config.eval.clone())) as Box<dyn Evaluator>
            }),
        }
    }

    /// Use a different evaluator for every document.
    pub fn with_evaluator_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ExpandConfig) -> Box<dyn Evaluator> + Send + Sync + 'static,
    {
        self.evaluator_factory = Arc::new(factory);
        self
    }

    /// Expand `source` as if it were the document `name`, without writing
    /// it. Expanded includes are still read and written through the VFS.
    pub fn expand_source(&self, name: &str, source: &str) -> ExpandResult<DocumentOutput> {
        on_expansion_stack(|| {
            let mut session = Session::default();
            session.chain.push(name.to_string());
            self.expand_document(name, source, &mut session)
        })
    }

    /// Read `path`, expand it and write the output next to it.
    pub fn expand_file(&self, path: &str) -> ExpandResult<DocumentOutput> {
        on_expansion_stack(|| self.expand_stored(path, &mut Session::default()))
    }

    /// Expand several root documents independently. A failed document
    /// never stops the others.
    pub fn expand_files<S: AsRef<str>>(&self, paths: &[S]) -> Vec<ExpandResult<DocumentOutput>> {
        paths
            .iter()
            .map(|path| {
                let result = self.expand_file(path.as_ref());
                if let Err(ref e) = result {
                    log::debug!("{} failed: {}", path.as_ref(), e);
                }
                result
            })
            .collect()
    }

    fn expand_stored(&self, path: &str, session: &mut Session) -> ExpandResult<DocumentOutput> {
        let raw = self
            .vfs
            .read_text(path)
            .map_err(|e| ExpandError::io(path, e))?;

        session.chain.push(path.to_string());
        let result = self.expand_document(path, &raw, session);
        session.chain.pop();
        let output = result?;

        self.vfs
            .write_text(&output.output_path, &output.content)
            .map_err(|e| ExpandError::io(path, e))?;
        log::debug!("wrote {}", output.output_path);
        Ok(output)
    }

    fn expand_document(
        &self,
        name: &str,
        raw: &str,
        session: &mut Session,
    ) -> ExpandResult<DocumentOutput> {
        log::debug!("expanding {}", name);

        let mut allocator = PlaceholderAllocator::scan(raw);
        let mut declarations: Vec<DeclarationBlock> = Vec::new();
        let mut warnings = Vec::new();
        let mut includes = Vec::new();

        let directives = find_includes(raw, &self.config);
        let text = if directives.is_empty() {
            raw.to_string()
        } else if self.config.recursive {
            for directive in &directives {
                let nested = self.expand_nested(name, directive, session)?;

                for block in nested.declarations {
                    if !declarations.contains(&block) {
                        declarations.push(block);
                    }
                }
                warnings.extend(nested.warnings);
                for path in nested.includes.into_iter().chain([nested.output_path]) {
                    if !includes.contains(&path) {
                        includes.push(path);
                    }
                }
            }
            rewrite_includes(raw, &directives, &self.config)
        } else {
            warnings.extend(directives.iter().map(|d| unexpanded_include(name, d)));
            raw.to_string()
        };

        let extracted = extract(&text, &mut allocator, &self.config.comment_style);
        log::trace!(
            "{}: {} declaration block(s), {} expression block(s), placeholders from {}",
            name,
            extracted.declarations.len(),
            extracted.expressions.len(),
            extracted.min_index
        );
        declarations.extend(
            extracted
                .declarations
                .iter()
                .enumerate()
                .map(|(index, source)| DeclarationBlock {
                    file: name.to_string(),
                    index,
                    source: source.clone(),
                }),
        );

        let mut evaluator = (self.evaluator_factory)(&self.config);
        let sources: Vec<String> = declarations.iter().map(|b| b.source.clone()).collect();
        if let Err(failure) = evaluator.declare(&sources) {
            let block = failure.block.and_then(|i| declarations.get(i));
            let (source, mut message) = match block {
                Some(block) => (
                    block.source.clone(),
                    failure.error.format_with_source(&block.source),
                ),
                None => (sources.join("\n"), failure.error.to_string()),
            };
            if let Some(block) = block.filter(|b| b.file != name) {
                message = format!("{} (declared in {})", message, block.file);
            }
            return Err(ExpandError::declaration(name, source.trim(), message));
        }

        let values = Evaluations::new(
            evaluator.as_mut(),
            &extracted.expressions,
            self.config.strategy,
        );
        let substitution = substitute(&extracted, name, values)?;
        warnings.extend(substitution.warnings);

        Ok(DocumentOutput {
            name: name.to_string(),
            output_path: self.config.output_path(name),
            content: substitution.text,
            declarations,
            warnings,
            includes,
        })
    }

    /// Expand and write an included document, or reuse it if this root
    /// already did.
    fn expand_nested(
        &self,
        parent: &str,
        directive: &IncludeDirective,
        session: &mut Session,
    ) -> ExpandResult<DocumentOutput> {
        let path = directive.path.as_str();

        if session.chain.iter().any(|p| p == path) {
            let mut chain = session.chain.clone();
            chain.push(path.to_string());
            return Err(ExpandError::IncludeCycle {
                file: parent.to_string(),
                chain,
            });
        }
        if let Some(done) = session.expanded.get(path) {
            log::trace!("{} already expanded", path);
            let mut reused = done.clone();
            reused.warnings.clear();
            return Ok(reused);
        }
        if session.chain.len() >= self.config.max_include_depth {
            let mut chain = session.chain.clone();
            chain.push(path.to_string());
            return Err(ExpandError::IncludeDepth {
                file: parent.to_string(),
                chain,
                max_depth: self.config.max_include_depth,
            });
        }

        let output = self
            .expand_stored(path, session)
            .map_err(|e| ExpandError::include(parent, path, e))?;
        session.expanded.insert(path.to_string(), output.clone());
        Ok(output)
    }
}

fn unexpanded_include(file: &str, directive: &IncludeDirective) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticKind::UnexpectedInclude,
        file,
        format!(
            "\\{}{{{}}} on line {} refers to a macro-source document but recursive mode is off; left unexpanded",
            directive.command, directive.path, directive.line
        ),
    )
    .with_line(directive.line)
}

/// Run `expand` on a thread with [`EXPANSION_STACK_SIZE`] of stack and
/// wait for it. Falls back to the current thread if none can be spawned.
fn on_expansion_stack<T, F>(expand: F) -> T
where
    T: Send,
    F: Fn() -> T + Sync,
{
    std::thread::scope(|scope| {
        let spawned = std::thread::Builder::new()
            .name("plecta-expand".to_string())
            .stack_size(EXPANSION_STACK_SIZE)
            .spawn_scoped(scope, &expand);
        match spawned {
            Ok(handle) => match handle.join() {
                Ok(value) => value,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            Err(e) => {
                log::warn!("cannot spawn expansion thread ({}), expanding inline", e);
                expand()
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expand::config::EvaluationStrategy;
    use crate::core::expand::evaluate::DeclarationFailure;
    use crate::core::script::{EvalResult, Value};
    use crate::utils::vfs::MemoryVfs;
    use pretty_assertions::assert_eq;

    fn expander(vfs: &Arc<MemoryVfs>, config: ExpandConfig) -> Expander {
        Expander::new(vfs.clone(), config)
    }

    #[test]
    fn test_expand_source_does_not_write() {
        let vfs = Arc::new(MemoryVfs::new());
        let out = expander(&vfs, ExpandConfig::default())
            .expand_source("doc.txs", "\n___const x = 2;___\nValue: __x*2__\n")
            .unwrap();
        assert_eq!(out.content, "\n% const x = 2;\nValue: 4\n");
        assert_eq!(out.output_path, "doc.tex");
        assert!(vfs.paths().is_empty());
    }

    #[test]
    fn test_nested_declarations_come_first() {
        let vfs = Arc::new(MemoryVfs::new().with_file("part.txs", "\n___const y = 10;___\n"));
        let out = expander(&vfs, ExpandConfig::recursive())
            .expand_source("main.txs", "\\input{part.txs}\n___const z = y + 1;___\n__z__")
            .unwrap();

        let files: Vec<&str> = out.declarations.iter().map(|b| b.file.as_str()).collect();
        assert_eq!(files, vec!["part.txs", "main.txs"]);
        assert_eq!(out.content, "\\input{part.tex}\n% const z = y + 1;\n11");
        assert_eq!(out.includes, vec!["part.tex".to_string()]);
    }

    #[test]
    fn test_shared_include_is_folded_once() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("common.txs", "\n___const base = 100;___\n")
                .with_file("a.txs", "\\input{common.txs}\n___const a = base + 1;___\n")
                .with_file("b.txs", "\\input{common.txs}\n___const b = base + 2;___\n"),
        );
        let out = expander(&vfs, ExpandConfig::recursive())
            .expand_source("main.txs", "\\input{a.txs}\\input{b.txs}\n__a + b__")
            .unwrap();

        assert!(out.content.ends_with("203"));
        let commons = out
            .declarations
            .iter()
            .filter(|b| b.file == "common.txs")
            .count();
        assert_eq!(commons, 1);
        assert_eq!(
            out.includes,
            vec!["common.tex".to_string(), "a.tex".to_string(), "b.tex".to_string()]
        );
    }

    #[test]
    fn test_include_cycle_is_fatal() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("a.txs", "\\input{b.txs}")
                .with_file("b.txs", "\\input{a.txs}"),
        );
        let err = expander(&vfs, ExpandConfig::recursive())
            .expand_file("a.txs")
            .unwrap_err();

        match err.root_cause() {
            ExpandError::IncludeCycle { file, chain } => {
                assert_eq!(file, "b.txs");
                assert_eq!(chain, &vec!["a.txs".to_string(), "b.txs".to_string(), "a.txs".to_string()]);
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
        assert!(vfs.paths().iter().all(|p| p.ends_with(".txs")));
    }

    #[test]
    fn test_include_depth_limit() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("l1.txs", "\\input{l2.txs}")
                .with_file("l2.txs", "\\input{l3.txs}")
                .with_file("l3.txs", "deep"),
        );
        let config = ExpandConfig::recursive().with_max_include_depth(2);
        let err = expander(&vfs, config).expand_file("l1.txs").unwrap_err();
        assert!(matches!(err.root_cause(), ExpandError::IncludeDepth { max_depth: 2, .. }));
    }

    #[test]
    fn test_declaration_error_names_origin() {
        let vfs = Arc::new(MemoryVfs::new().with_file("part.txs", "\n___const y = 1;___\n"));
        let err = expander(&vfs, ExpandConfig::recursive())
            .expand_source("main.txs", "\\input{part.txs}\n___const y = 2;___\n")
            .unwrap_err();

        assert!(matches!(err, ExpandError::Declaration { .. }));
        assert_eq!(err.block_source(), Some("const y = 2;"));
        assert!(err.message().contains("already been declared"));
    }

    #[test]
    fn test_custom_evaluator_factory() {
        struct Constant;
        impl Evaluator for Constant {
            fn declare(&mut self, _: &[String]) -> Result<(), DeclarationFailure> {
                Ok(())
            }
            fn evaluate(&mut self, _: &str) -> EvalResult<Value> {
                Ok(Value::from(42.0))
            }
        }

        let vfs = Arc::new(MemoryVfs::new());
        let out = expander(&vfs, ExpandConfig::default().with_strategy(EvaluationStrategy::Eager))
            .with_evaluator_factory(|_| Box::new(Constant) as Box<dyn Evaluator>)
            .expand_source("x.txs", "__anything__ __at all__")
            .unwrap();
        assert_eq!(out.content, "42 42");
    }
}
