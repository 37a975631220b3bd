//! Plecta CLI - expand `.txs` documents into `.tex`

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use plecta::{
    Diagnostic, DiagnosticKind, DiagnosticSeverity, DocumentOutput, EvaluationStrategy,
    ExpandConfig, ExpandResult, Expander, RealVfs,
};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::io;
#[cfg(feature = "cli")]
use std::process::{Child, Command, Stdio};
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "plecta")]
#[command(version)]
#[command(about = "Plecta - expand script blocks in .txs documents into plain LaTeX", long_about = None)]
struct Cli {
    /// Documents to expand; arguments without the .txs extension are skipped
    files: Vec<String>,

    /// Expand included .txs documents before the documents including them
    #[arg(short, long)]
    recursive: bool,

    /// Run pdflatex on every expanded document
    #[arg(long)]
    pdf: bool,

    /// When expression blocks are evaluated
    #[arg(short, long, value_enum, default_value_t = Strategy::Lazy)]
    strategy: Strategy,

    /// Write all diagnostics as JSON to this path
    #[arg(long)]
    report: Option<String>,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, ValueEnum)]
enum Strategy {
    /// Evaluate each expression right before it is substituted
    Lazy,
    /// Evaluate all expressions, then substitute
    Eager,
}

#[cfg(feature = "cli")]
impl From<Strategy> for EvaluationStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Lazy => EvaluationStrategy::Lazy,
            Strategy::Eager => EvaluationStrategy::Eager,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DocumentReport {
    name: String,
    output: Option<String>,
    includes: Vec<String>,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct Report {
    documents: Vec<DocumentReport>,
    diagnostics: Vec<Diagnostic>,
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = ExpandConfig::default()
        .with_recursive(cli.recursive)
        .with_strategy(cli.strategy.into());

    let mut diagnostics = Vec::new();
    let (roots, skipped): (Vec<String>, Vec<String>) = cli
        .files
        .into_iter()
        .partition(|arg| config.is_source_path(arg));
    for arg in skipped {
        diagnostics.push(Diagnostic::info(
            DiagnosticKind::SkippedInput,
            arg,
            format!("not a .{} document, skipped", config.source_extension),
        ));
    }

    let expander = Expander::new(Arc::new(RealVfs::new(".")), config);
    let results = expander.expand_files(&roots);

    let documents = collect_results(&roots, results, &mut diagnostics);

    if cli.pdf {
        let outputs: Vec<&str> = documents
            .iter()
            .filter_map(|doc| doc.output.as_deref())
            .collect();
        diagnostics.extend(compile(&outputs));
    }

    for diag in &diagnostics {
        if cli.no_color {
            eprintln!("{}", diag);
        } else {
            eprintln!("{}{}\x1b[0m", diag.color_code(), diag);
        }
    }

    let failed = diagnostics.iter().any(Diagnostic::is_error);

    if let Some(path) = cli.report {
        let report = Report {
            documents,
            diagnostics,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        std::fs::write(&path, json)?;
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn collect_results(
    roots: &[String],
    results: Vec<ExpandResult<DocumentOutput>>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<DocumentReport> {
    roots
        .iter()
        .zip(results)
        .map(|(root, result)| match result {
            Ok(output) => {
                println!("{} -> {}", output.name, output.output_path);
                for include in &output.includes {
                    println!("  {}", include);
                }
                diagnostics.extend(output.warnings);
                DocumentReport {
                    name: output.name,
                    output: Some(output.output_path),
                    includes: output.includes,
                }
            }
            Err(e) => {
                diagnostics.push(e.to_diagnostic());
                DocumentReport {
                    name: root.clone(),
                    output: None,
                    includes: Vec::new(),
                }
            }
        })
        .collect()
}

/// Run pdflatex on every output at once, then wait for all of them.
#[cfg(feature = "cli")]
fn compile(outputs: &[&str]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut running: Vec<(&str, Child)> = Vec::new();

    for &output in outputs {
        let spawned = Command::new("pdflatex")
            .arg("-interaction=nonstopmode")
            .arg(output)
            .stdin(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => running.push((output, child)),
            Err(e) => diagnostics.push(compile_error(output, format!("cannot run pdflatex: {}", e))),
        }
    }

    for (output, mut child) in running {
        match child.wait() {
            Ok(status) if status.success() => log::debug!("compiled {}", output),
            Ok(status) => diagnostics.push(compile_error(output, format!("pdflatex exited with {}", status))),
            Err(e) => diagnostics.push(compile_error(output, format!("waiting for pdflatex: {}", e))),
        }
    }
    diagnostics
}

#[cfg(feature = "cli")]
fn compile_error(output: &str, message: String) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Error,
        kind: DiagnosticKind::Io,
        file: output.to_string(),
        message,
        line: None,
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install plecta --features cli");
    eprintln!("  plecta [-r] [--pdf] FILES...");
}
