//! Integration tests for module loading and analysis sessions.
//!
//! These tests run whole programs through a `Session` backed by in-memory
//! modules and check the diagnostics and the module graph it builds.

use std::cell::Cell;
use std::rc::Rc;

use forge_ast::*;
use forge_driver::{FnSource, MemorySource, ModuleSource, Session};
use forge_sema::{AnalyzerConfig, ErrorKind, Language, ModuleError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn node<T>(value: T) -> Node<T> {
    Node::new(value, Span::default())
}

fn ident(name: &str) -> Node<Ident> {
    node(Ident::new(name))
}

fn ty(name: &str) -> Node<TypeExpr> {
    node(TypeExpr::named(name))
}

fn import(path: &str, alias: Option<&str>) -> Node<ModuleItem> {
    node(ModuleItem::Import(ImportDecl {
        path: path.to_string(),
        alias: alias.map(ident),
    }))
}

fn call(callee: Node<Expr>, args: Vec<Node<Expr>>) -> Node<Stmt> {
    node(Stmt::Expr(node(Expr::Call {
        callee: Box::new(callee),
        args,
    })))
}

fn var(name: &str) -> Node<Expr> {
    node(Expr::Ident(Ident::new(name)))
}

fn int(value: u128) -> Node<Expr> {
    node(Expr::Literal(Literal::Integer { value, suffix: None }))
}

fn routine(name: &str, params: Vec<(&str, Node<TypeExpr>)>, body: Vec<Node<Stmt>>) -> Node<ModuleItem> {
    let routine = RoutineDecl {
        name: ident(name),
        params: params
            .into_iter()
            .map(|(name, type_annotation)| Param { name: ident(name), type_annotation })
            .collect(),
        return_type: None,
        body: Some(node(Block { stmts: body })),
        visibility: Visibility::Public,
        is_usurping: false,
    };
    node(ModuleItem::Decl(node(Decl::Routine(routine))))
}

fn entity(name: &str, type_params: &[&str]) -> Node<ModuleItem> {
    let decl = TypeDecl {
        name: ident(name),
        type_params: type_params.iter().map(|p| ident(p)).collect(),
        fields: vec![],
        visibility: Visibility::Public,
    };
    node(ModuleItem::Decl(node(Decl::Entity(decl))))
}

fn program(items: Vec<Node<ModuleItem>>) -> Program {
    Program {
        items,
        span: Span::default(),
    }
}

fn core_source() -> MemorySource {
    MemorySource::new()
        .with("core/Maybe", program(vec![entity("Maybe", &["T"])]))
        .with("core/Result", program(vec![entity("Result", &["T"])]))
        .with("core/Lookup", program(vec![entity("Lookup", &["T"])]))
}

fn kinds(analysis: &forge_sema::Analysis) -> Vec<ErrorKind> {
    analysis.diagnostics.iter().map(|e| e.kind.clone()).collect()
}

// ============================================================================
// Prelude
// ============================================================================

#[test]
fn test_prelude_through_cache() {
    init_tracing();
    let mut session = Session::new(AnalyzerConfig::default(), core_source());

    let main = program(vec![routine(
        "unwrap_or_zero",
        vec![("value", node(TypeExpr::generic("Maybe", vec![ty("s32")])))],
        vec![],
    )]);
    let analysis = session.check("main.rf", &main);

    assert!(analysis.is_ok(), "{:?}", analysis.diagnostics);
    assert_eq!(session.cache().len(), 3);
    assert_eq!(
        analysis.module_paths().collect::<Vec<_>>(),
        vec!["core/Maybe", "core/Result", "core/Lookup"]
    );
}

#[test]
fn test_strict_prelude_reports_missing_modules() {
    init_tracing();
    let config = AnalyzerConfig::default().with_tolerate_missing_prelude(false);
    let mut session = Session::new(config, MemorySource::new().with("core/Maybe", program(vec![])));

    let analysis = session.check("main", &program(vec![]));
    let missing: Vec<String> = analysis
        .diagnostics
        .iter()
        .filter_map(|err| match &err.kind {
            ErrorKind::ModuleLoadFailure { path, .. } => Some(path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec!["core/Result", "core/Lookup"]);
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_relative_import() {
    init_tracing();
    let source = core_source().with(
        "app/util",
        program(vec![routine("helper", vec![("n", ty("s64"))], vec![])]),
    );
    let mut session = Session::new(AnalyzerConfig::default(), source);

    let main = program(vec![
        import("./util.rf", None),
        routine("main", vec![], vec![call(var("helper"), vec![int(1)])]),
    ]);
    let analysis = session.check("app/main.rf", &main);
    assert!(analysis.is_ok(), "{:?}", analysis.diagnostics);

    let order = session.load_order().unwrap();
    let util = order.iter().position(|p| p == "app/util").unwrap();
    let entry = order.iter().position(|p| p == "app/main").unwrap();
    assert!(util < entry);
    assert_eq!(session.cache().graph().entry(), Some("app/main"));
}

#[test]
fn test_alias_import() {
    init_tracing();
    let source = core_source().with(
        "math/Ops",
        program(vec![routine("square", vec![("n", ty("s64"))], vec![])]),
    );
    let mut session = Session::new(AnalyzerConfig::default(), source);

    let member = |name: &str| {
        node(Expr::Member {
            object: Box::new(var("ops")),
            property: ident(name),
        })
    };
    let main = program(vec![
        import("math/Ops", Some("ops")),
        routine("main", vec![], vec![
            call(member("square"), vec![int(3)]),
            call(member("cube"), vec![int(3)]),
        ]),
    ]);

    let analysis = session.check("main", &main);
    assert_eq!(kinds(&analysis), vec![ErrorKind::UndefinedSymbol("math/Ops.cube".to_string())]);
}

#[test]
fn test_circular_import_is_load_failure() {
    init_tracing();
    let source = core_source()
        .with("app/a", program(vec![import("./b", None)]))
        .with("app/b", program(vec![import("./main", None)]));
    let mut session = Session::new(AnalyzerConfig::default(), source);

    let analysis = session.check("app/main", &program(vec![import("./a", None)]));
    match kinds(&analysis).as_slice() {
        [ErrorKind::ModuleLoadFailure { path, reason }] => {
            assert_eq!(path, "./a");
            assert_eq!(reason, "circular import: app/main -> app/a -> app/b -> app/main");
        }
        other => panic!("Expected one ModuleLoadFailure, got {:?}", other),
    }
    assert!(!session.cache().is_cached("app/a"));
}

#[test]
fn test_missing_import() {
    init_tracing();
    let mut session = Session::new(AnalyzerConfig::default(), core_source());
    let analysis = session.check("main", &program(vec![import("net/Http", None)]));
    assert!(matches!(
        kinds(&analysis).as_slice(),
        [ErrorKind::ModuleLoadFailure { path, .. }] if path == "net/Http"
    ));
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_language_from_entry_extension() {
    init_tracing();
    let mut session = Session::new(AnalyzerConfig::default(), core_source());
    let main = program(vec![routine(
        "main",
        vec![],
        vec![node(Stmt::Danger(node(Block { stmts: vec![] })))],
    )]);

    assert!(session.check("app/main.rf", &main).is_ok());

    let suflae = session.check("app/main.sf", &main);
    assert!(matches!(
        kinds(&suflae).as_slice(),
        [ErrorKind::UnsupportedConstruct { language: Language::Suflae, .. }]
    ));
    assert_eq!(session.config().language, Language::RazorForge);
}

#[test]
fn test_sessions_share_modules_not_state() {
    init_tracing();
    let fetches = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fetches);
    let mut memory = core_source();
    let source = FnSource(move |path: &str| -> Result<Program, ModuleError> {
        counter.set(counter.get() + 1);
        memory.fetch(path)
    });
    let mut session = Session::new(AnalyzerConfig::default(), source);

    let main = program(vec![routine("run", vec![], vec![])]);
    let first = session.check("first", &main);
    let second = session.check("second", &main);

    assert!(first.is_ok(), "{:?}", first.diagnostics);
    assert!(second.is_ok(), "{:?}", second.diagnostics);
    assert_eq!(fetches.get(), 3);
}
