//! AST builders shared by the integration suites
#![allow(dead_code)]

use forge_ast::*;

pub fn span() -> Span {
    Span::default()
}

pub fn node<T>(value: T) -> Node<T> {
    Node::new(value, span())
}

pub fn ident(name: &str) -> Node<Ident> {
    node(Ident::new(name))
}

pub fn ty(name: &str) -> Node<TypeExpr> {
    node(TypeExpr::named(name))
}

pub fn generic(name: &str, args: Vec<Node<TypeExpr>>) -> Node<TypeExpr> {
    node(TypeExpr::generic(name, args))
}

pub fn token_ty(form: AccessForm, inner: &str) -> Node<TypeExpr> {
    generic(form.token_type_name(), vec![ty(inner)])
}

pub fn var(name: &str) -> Node<Expr> {
    node(Expr::Ident(Ident::new(name)))
}

pub fn int(value: u128) -> Node<Expr> {
    node(Expr::Literal(Literal::Integer { value, suffix: None }))
}

pub fn binary(left: Node<Expr>, op: BinaryOp, right: Node<Expr>) -> Node<Expr> {
    node(Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

pub fn member(object: Node<Expr>, property: &str) -> Node<Expr> {
    node(Expr::Member {
        object: Box::new(object),
        property: ident(property),
    })
}

pub fn call(name: &str, args: Vec<Node<Expr>>) -> Node<Expr> {
    node(Expr::Call {
        callee: Box::new(var(name)),
        args,
    })
}

pub fn construct(type_name: &str, fields: Vec<(&str, Node<Expr>)>) -> Node<Expr> {
    node(Expr::Construct {
        type_name: ident(type_name),
        fields: fields
            .into_iter()
            .map(|(name, value)| FieldInit { name: ident(name), value })
            .collect(),
    })
}

pub fn let_(name: &str, init: Node<Expr>) -> Node<Stmt> {
    node(Stmt::VarDecl(VarDecl {
        kind: VarDeclKind::Let,
        name: ident(name),
        type_annotation: None,
        init: Some(init),
        visibility: Visibility::Private,
    }))
}

pub fn var_(name: &str, init: Node<Expr>) -> Node<Stmt> {
    node(Stmt::VarDecl(VarDecl {
        kind: VarDeclKind::Var,
        name: ident(name),
        type_annotation: None,
        init: Some(init),
        visibility: Visibility::Private,
    }))
}

pub fn let_typed(name: &str, annotation: Node<TypeExpr>, init: Node<Expr>) -> Node<Stmt> {
    node(Stmt::VarDecl(VarDecl {
        kind: VarDeclKind::Let,
        name: ident(name),
        type_annotation: Some(annotation),
        init: Some(init),
        visibility: Visibility::Private,
    }))
}

pub fn expr_stmt(expr: Node<Expr>) -> Node<Stmt> {
    node(Stmt::Expr(expr))
}

pub fn assign(target: Node<Expr>, value: Node<Expr>) -> Node<Stmt> {
    node(Stmt::Assign { target, value })
}

pub fn ret(value: Node<Expr>) -> Node<Stmt> {
    node(Stmt::Return(Some(value)))
}

pub fn block(stmts: Vec<Node<Stmt>>) -> Node<Block> {
    node(Block { stmts })
}

pub fn nested(stmts: Vec<Node<Stmt>>) -> Node<Stmt> {
    node(Stmt::Block(Block { stmts }))
}

pub fn access(form: AccessForm, source: &str, token: &str, body: Vec<Node<Stmt>>) -> Node<Stmt> {
    node(Stmt::ScopedAccess(ScopedAccess {
        form,
        source: ident(source),
        token: ident(token),
        body: block(body),
    }))
}

pub fn routine_full(
    name: &str,
    params: Vec<(&str, Node<TypeExpr>)>,
    return_type: Option<Node<TypeExpr>>,
    body: Vec<Node<Stmt>>,
    is_usurping: bool,
) -> Node<ModuleItem> {
    let routine = RoutineDecl {
        name: ident(name),
        params: params
            .into_iter()
            .map(|(name, type_annotation)| Param { name: ident(name), type_annotation })
            .collect(),
        return_type,
        body: Some(block(body)),
        visibility: Visibility::Public,
        is_usurping,
    };
    node(ModuleItem::Decl(node(Decl::Routine(routine))))
}

pub fn routine(name: &str, body: Vec<Node<Stmt>>) -> Node<ModuleItem> {
    routine_full(name, vec![], None, body, false)
}

fn type_decl(name: &str, type_params: &[&str], fields: Vec<(&str, Node<TypeExpr>)>) -> TypeDecl {
    TypeDecl {
        name: ident(name),
        type_params: type_params.iter().map(|p| ident(p)).collect(),
        fields: fields
            .into_iter()
            .map(|(name, type_annotation)| FieldDecl {
                name: ident(name),
                type_annotation,
                visibility: Visibility::Public,
            })
            .collect(),
        visibility: Visibility::Public,
    }
}

pub fn record(name: &str, fields: Vec<(&str, Node<TypeExpr>)>) -> Node<ModuleItem> {
    node(ModuleItem::Decl(node(Decl::Record(type_decl(name, &[], fields)))))
}

pub fn entity(name: &str, type_params: &[&str], fields: Vec<(&str, Node<TypeExpr>)>) -> Node<ModuleItem> {
    node(ModuleItem::Decl(node(Decl::Entity(type_decl(name, type_params, fields)))))
}

pub fn program(items: Vec<Node<ModuleItem>>) -> Program {
    Program { items, span: span() }
}

/// `record Point { x: s32, y: s32 }`
pub fn point() -> Node<ModuleItem> {
    record("Point", vec![("x", ty("s32")), ("y", ty("s32"))])
}

pub fn new_point() -> Node<Expr> {
    construct("Point", vec![("x", int(1)), ("y", int(2))])
}
