//! Integration tests for include handling and multi-document runs

use std::sync::Arc;

use plecta::{
    DiagnosticKind, ExpandConfig, ExpandError, Expander, MemoryVfs, RealVfs, VirtualFileSystem,
};
use pretty_assertions::assert_eq;

fn recursive(vfs: &Arc<MemoryVfs>) -> Expander {
    Expander::new(vfs.clone(), ExpandConfig::recursive())
}

// ============================================================================
// Recursive expansion
// ============================================================================

mod recursive_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_included_declarations_are_visible() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("other.txs", "\n___const y = 10;___\nOther part: __y__\n")
                .with_file("main.txs", "\\input{other.txs}\nResult: __y+1__\n"),
        );
        let out = recursive(&vfs).expand_file("main.txs").unwrap();

        assert_eq!(out.content, "\\input{other.tex}\nResult: 11\n");
        assert_eq!(vfs.read_text("main.tex").unwrap(), out.content);
        assert_eq!(
            vfs.read_text("other.tex").unwrap(),
            "\n% const y = 10;\nOther part: 10\n"
        );
        assert_eq!(out.includes, vec!["other.tex".to_string()]);
    }

    #[test]
    fn test_transitive_includes() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("units.txs", "\n___const cm = v => `${v} cm`;___\n")
                .with_file("sizes.txs", "\\input{units.txs}\n___const width = 12;___\n")
                .with_file("main.txs", "\\input{sizes.txs}\nWidth: __cm(width)__"),
        );
        let out = recursive(&vfs).expand_file("main.txs").unwrap();

        assert_eq!(out.content, "\\input{sizes.tex}\nWidth: 12 cm");
        assert_eq!(
            vfs.read_text("sizes.tex").unwrap(),
            "\\input{units.tex}\n% const width = 12;\n"
        );
        assert_eq!(out.includes, vec!["units.tex".to_string(), "sizes.tex".to_string()]);
    }

    #[test]
    fn test_other_includes_untouched() {
        let vfs = Arc::new(MemoryVfs::new());
        let source = "\\input{table.tex}\n\\include{chapter1}\n__1__";
        let out = recursive(&vfs).expand_source("main.txs", source).unwrap();
        assert_eq!(out.content, "\\input{table.tex}\n\\include{chapter1}\n1");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_nested_warnings_reach_the_parent() {
        let vfs = Arc::new(MemoryVfs::new().with_file("part.txs", "\n\n__[1, 2]__"));
        let out = recursive(&vfs)
            .expand_source("main.txs", "\\input{part.txs}")
            .unwrap();

        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].file, "part.txs");
        assert_eq!(out.warnings[0].line, Some(3));
    }

    #[test]
    fn test_nested_failure_aborts_parent() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("broken.txs", "ok\n__undefinedThing__")
                .with_file("main.txs", "\\input{broken.txs}\n__1__"),
        );
        let err = recursive(&vfs).expand_file("main.txs").unwrap_err();

        assert!(matches!(err, ExpandError::Include { .. }));
        assert_eq!(err.file_name(), "main.txs");
        assert_eq!(err.root_cause().file_name(), "broken.txs");
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.block_source(), Some("undefinedThing"));
        assert!(!vfs.exists("main.tex"));
        assert!(!vfs.exists("broken.tex"));
    }

    #[test]
    fn test_missing_include() {
        let vfs = Arc::new(MemoryVfs::new());
        let err = recursive(&vfs)
            .expand_source("main.txs", "\\input{gone.txs}")
            .unwrap_err();
        assert!(matches!(err.root_cause(), ExpandError::Io { .. }));
        assert_eq!(err.to_diagnostic().kind, DiagnosticKind::IncludeFailed);
    }

    #[test]
    fn test_self_include_is_a_cycle() {
        let vfs = Arc::new(MemoryVfs::new().with_file("loop.txs", "\\input{loop.txs}"));
        let err = recursive(&vfs).expand_file("loop.txs").unwrap_err();
        assert!(matches!(err, ExpandError::IncludeCycle { .. }));
        assert!(err.to_string().contains("loop.txs -> loop.txs"));
    }
}

// ============================================================================
// Non-recursive runs
// ============================================================================

mod non_recursive {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_include_is_reported_not_expanded() {
        let vfs = Arc::new(MemoryVfs::new().with_file("part.txs", "__1__"));
        let out = Expander::new(vfs.clone(), ExpandConfig::default())
            .expand_source("main.txs", "Intro\n\\input{part.txs}\n__2__")
            .unwrap();

        assert_eq!(out.content, "Intro\n\\input{part.txs}\n2");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, DiagnosticKind::UnexpectedInclude);
        assert_eq!(out.warnings[0].line, Some(2));
        assert!(!vfs.exists("part.tex"));
    }
}

// ============================================================================
// Several root documents
// ============================================================================

mod many_roots {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_one_failure_does_not_stop_the_others() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("a.txs", "__'A'__")
                .with_file("b.txs", "__oops(__")
                .with_file("c.txs", "__'C'__"),
        );
        let results = Expander::new(vfs.clone(), ExpandConfig::default())
            .expand_files(&["a.txs", "b.txs", "c.txs"]);

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert_eq!(vfs.read_text("a.tex").unwrap(), "A");
        assert!(!vfs.exists("b.tex"));
        assert_eq!(vfs.read_text("c.tex").unwrap(), "C");
    }

    #[test]
    fn test_roots_do_not_share_declarations() {
        let vfs = Arc::new(
            MemoryVfs::new()
                .with_file("a.txs", "\n___const shared = 1;___\n")
                .with_file("b.txs", "__typeof shared__"),
        );
        let results = Expander::new(vfs.clone(), ExpandConfig::default())
            .expand_files(&["a.txs", "b.txs"]);
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(vfs.read_text("b.tex").unwrap(), "undefined");
    }
}

// ============================================================================
// Real file system
// ============================================================================

mod real_files {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.txs"), "\n___const n = 6;___\n").unwrap();
        std::fs::write(
            dir.path().join("doc.txs"),
            "\\input{part.txs}\n\\section{Result}\n$n^2 = __n ** 2__$\n",
        )
        .unwrap();

        let expander = Expander::new(Arc::new(RealVfs::new(dir.path())), ExpandConfig::recursive());
        let out = expander.expand_file("doc.txs").unwrap();

        let written = std::fs::read_to_string(dir.path().join("doc.tex")).unwrap();
        assert_eq!(written, out.content);
        assert_eq!(written, "\\input{part.tex}\n\\section{Result}\n$n^2 = 36$\n");
        assert!(dir.path().join("part.tex").exists());
    }
}
