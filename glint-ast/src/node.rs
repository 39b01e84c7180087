//! Sum-typed node hierarchy (C3, §3: "AST.").
//!
//! Four top-level categories: `Expression`, `Statement`, `Declaration`,
//! `TypeRef`. Every node carries a stable [`NodeId`] used to look up its
//! source range in a [`glint_diagnostics::SpanMap`] and, later, its
//! resolved [`crate::ty::TypeId`] in the semantic IR. Children are owned
//! directly (`Box`) rather than through arena indices; the arena in
//! [`crate::arena`] owns only the top-level declarations of a
//! compilation unit, which is the granularity at which the parser,
//! symbol table, and code generator actually need stable cross-phase
//! references.

use glint_diagnostics::NodeId;
use serde::{Deserialize, Serialize};

/// A compilation unit: the root of the AST (§3: "Sum-typed node
/// hierarchy rooted at a compilation unit").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDeclKind {
    Type,
    ValueType,
    RefType,
    Static,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_extern: bool,
    pub is_public: bool,
    pub is_private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Declaration {
    Variable(VariableDecl),
    Parameter(ParameterDecl),
    Function(FunctionDecl),
    Constructor(ConstructorDecl),
    Destructor(DestructorDecl),
    MemberVariable(MemberVariableDecl),
    PropertyAccessor(PropertyAccessorDecl),
    EnumCase(EnumCaseDecl),
    Type(TypeDecl),
    Namespace(NamespaceDecl),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    pub id: NodeId,
    pub name: String,
    pub declared_type: Option<TypeRef>,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub id: NodeId,
    pub name: String,
    pub declared_type: TypeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub name: String,
    pub modifiers: Modifiers,
    pub params: Vec<ParameterDecl>,
    pub return_type: Option<TypeRef>,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub id: NodeId,
    pub params: Vec<ParameterDecl>,
    pub base_call_args: Option<Vec<Expression>>,
    pub body: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestructorDecl {
    pub id: NodeId,
    pub body: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberVariableDecl {
    pub id: NodeId,
    pub name: String,
    pub declared_type: TypeRef,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessorKind {
    Get,
    Set,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAccessorDecl {
    pub id: NodeId,
    pub property_name: String,
    pub kind: AccessorKind,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumCaseDecl {
    pub id: NodeId,
    pub name: String,
    pub associated_types: Vec<TypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: NodeId,
    pub name: String,
    pub kind: TypeDeclKind,
    pub generic_params: Vec<String>,
    pub base: Option<String>,
    pub members: Vec<Declaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub id: NodeId,
    pub path: Vec<String>,
    pub is_block_scoped: bool,
    pub members: Vec<Declaration>,
}

/// A type as written in source, prior to symbol resolution — distinct
/// from `crate::ty::Type`, the interned canonical form it resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive { id: NodeId, name: String },
    Named { id: NodeId, path: Vec<String>, type_args: Vec<TypeRef> },
    Pointer { id: NodeId, inner: Box<TypeRef> },
    Array { id: NodeId, inner: Box<TypeRef>, size: Option<Box<Expression>> },
    Function { id: NodeId, params: Vec<TypeRef>, return_type: Box<TypeRef> },
    /// An `Error*` placeholder substituted for a malformed type so the
    /// tree stays well-formed for later passes (§4.2).
    Error { id: NodeId },
}

impl TypeRef {
    pub fn id(&self) -> NodeId {
        match self {
            TypeRef::Primitive { id, .. }
            | TypeRef::Named { id, .. }
            | TypeRef::Pointer { id, .. }
            | TypeRef::Array { id, .. }
            | TypeRef::Function { id, .. }
            | TypeRef::Error { id } => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    Local(VariableDecl),
    Expression { id: NodeId, expr: Expression },
    If {
        id: NodeId,
        condition: Expression,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        id: NodeId,
        condition: Expression,
        body: Block,
    },
    For {
        id: NodeId,
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        post: Option<Box<Statement>>,
        body: Block,
    },
    Return { id: NodeId, value: Option<Expression> },
    Break { id: NodeId },
    Continue { id: NodeId },
    Block(Block),
}

impl Statement {
    pub fn id(&self) -> NodeId {
        match self {
            Statement::Local(decl) => decl.id,
            Statement::Expression { id, .. }
            | Statement::If { id, .. }
            | Statement::While { id, .. }
            | Statement::For { id, .. }
            | Statement::Return { id, .. }
            | Statement::Break { id }
            | Statement::Continue { id } => *id,
            Statement::Block(block) => block.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expression>,
    pub body: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pattern {
    Wildcard,
    Literal(Literal),
    Binding(String),
    EnumCase { name: String, bindings: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    Literal { id: NodeId, value: Literal },
    Name { id: NodeId, path: Vec<String> },
    This { id: NodeId },
    Binary {
        id: NodeId,
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },
    Unary {
        id: NodeId,
        op: UnaryOp,
        operand: Box<Expression>,
    },
    PostfixOp {
        id: NodeId,
        op: PostfixOp,
        operand: Box<Expression>,
    },
    Conditional {
        id: NodeId,
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
    Assignment {
        id: NodeId,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Call {
        id: NodeId,
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    MemberAccess {
        id: NodeId,
        object: Box<Expression>,
        member: String,
    },
    Indexer {
        id: NodeId,
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Cast {
        id: NodeId,
        expr: Box<Expression>,
        target_type: TypeRef,
    },
    New {
        id: NodeId,
        type_name: String,
        args: Vec<Expression>,
    },
    Lambda {
        id: NodeId,
        params: Vec<ParameterDecl>,
        return_type: Option<TypeRef>,
        body: Box<Expression>,
    },
    Range {
        id: NodeId,
        start: Option<Box<Expression>>,
        end: Option<Box<Expression>>,
        inclusive: bool,
    },
    Typeof {
        id: NodeId,
        expr: Box<Expression>,
    },
    Sizeof {
        id: NodeId,
        target_type: TypeRef,
    },
    Match {
        id: NodeId,
        scrutinee: Box<Expression>,
        arms: Vec<MatchArm>,
    },
    If {
        id: NodeId,
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Option<Box<Expression>>,
    },
    Block {
        id: NodeId,
        statements: Vec<Statement>,
        tail: Option<Box<Expression>>,
    },
    /// Placeholder substituted for a malformed expression so later
    /// passes can keep walking a well-formed tree (§4.2).
    Error { id: NodeId },
}

impl Expression {
    pub fn id(&self) -> NodeId {
        match self {
            Expression::Literal { id, .. }
            | Expression::Name { id, .. }
            | Expression::This { id }
            | Expression::Binary { id, .. }
            | Expression::Unary { id, .. }
            | Expression::PostfixOp { id, .. }
            | Expression::Conditional { id, .. }
            | Expression::Assignment { id, .. }
            | Expression::Call { id, .. }
            | Expression::MemberAccess { id, .. }
            | Expression::Indexer { id, .. }
            | Expression::Cast { id, .. }
            | Expression::New { id, .. }
            | Expression::Lambda { id, .. }
            | Expression::Range { id, .. }
            | Expression::Typeof { id, .. }
            | Expression::Sizeof { id, .. }
            | Expression::Match { id, .. }
            | Expression::If { id, .. }
            | Expression::Block { id, .. }
            | Expression::Error { id } => *id,
        }
    }
}

impl Declaration {
    pub fn id(&self) -> NodeId {
        match self {
            Declaration::Variable(d) => d.id,
            Declaration::Parameter(d) => d.id,
            Declaration::Function(d) => d.id,
            Declaration::Constructor(d) => d.id,
            Declaration::Destructor(d) => d.id,
            Declaration::MemberVariable(d) => d.id,
            Declaration::PropertyAccessor(d) => d.id,
            Declaration::EnumCase(d) => d.id,
            Declaration::Type(d) => d.id,
            Declaration::Namespace(d) => d.id,
        }
    }
}
