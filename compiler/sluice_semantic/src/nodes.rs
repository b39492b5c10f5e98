//! Semantic graph nodes.
//!
//! Nodes own their children. Function literals are shared behind [`Arc`]
//! because closures created at runtime keep a reference to their body.
//!
//! Identifier, array, dict, function, object, member, index, binary, unary
//! and call nodes carry a `typ` slot filled by inference. Every other node
//! derives its type from its shape (see [`Expr::type_of`]).

use std::sync::Arc;

use sluice_ir::{BinaryOp, Duration, LogicalOp, Regexp, SourceLocation, Symbol, Time, UnaryOp};
use sluice_types::{BasicType, MonoType};

/// Type held by a typed node before inference has run.
pub fn unassigned() -> MonoType {
    MonoType::new_var(u64::MAX)
}

/// One phase of a program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Package {
    pub loc: SourceLocation,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Expr(ExprStatement),
    Variable(Box<VariableAssgn>),
    Option(Box<OptionStatement>),
    Return(ReturnStatement),
}

impl Statement {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Statement::Expr(s) => &s.loc,
            Statement::Variable(s) => &s.loc,
            Statement::Option(s) => &s.loc,
            Statement::Return(s) => &s.loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprStatement {
    pub loc: SourceLocation,
    pub expression: Expr,
}

/// `id = init`
#[derive(Clone, Debug, PartialEq)]
pub struct VariableAssgn {
    pub loc: SourceLocation,
    pub id: Identifier,
    pub init: Expr,
}

/// `option id = init`
#[derive(Clone, Debug, PartialEq)]
pub struct OptionStatement {
    pub loc: SourceLocation,
    pub id: Identifier,
    pub init: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatement {
    pub loc: SourceLocation,
    pub argument: Expr,
}

/// A name in binding position.
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub loc: SourceLocation,
    pub name: Symbol,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Identifier(IdentifierExpr),
    Array(Box<ArrayExpr>),
    Dict(Box<DictExpr>),
    Function(Arc<FunctionExpr>),
    Logical(Box<LogicalExpr>),
    Object(Box<ObjectExpr>),
    Member(Box<MemberExpr>),
    Index(Box<IndexExpr>),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Call(Box<CallExpr>),
    Conditional(Box<ConditionalExpr>),
    StringExpr(Box<StringExpr>),

    Integer(IntegerLit),
    Uint(UintLit),
    Float(FloatLit),
    StringLit(StringLit),
    Boolean(BooleanLit),
    Duration(DurationLit),
    DateTime(DateTimeLit),
    Regexp(RegexpLit),
}

impl Expr {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Expr::Identifier(e) => &e.loc,
            Expr::Array(e) => &e.loc,
            Expr::Dict(e) => &e.loc,
            Expr::Function(e) => &e.loc,
            Expr::Logical(e) => &e.loc,
            Expr::Object(e) => &e.loc,
            Expr::Member(e) => &e.loc,
            Expr::Index(e) => &e.loc,
            Expr::Binary(e) => &e.loc,
            Expr::Unary(e) => &e.loc,
            Expr::Call(e) => &e.loc,
            Expr::Conditional(e) => &e.loc,
            Expr::StringExpr(e) => &e.loc,
            Expr::Integer(e) => &e.loc,
            Expr::Uint(e) => &e.loc,
            Expr::Float(e) => &e.loc,
            Expr::StringLit(e) => &e.loc,
            Expr::Boolean(e) => &e.loc,
            Expr::Duration(e) => &e.loc,
            Expr::DateTime(e) => &e.loc,
            Expr::Regexp(e) => &e.loc,
        }
    }

    pub fn loc_mut(&mut self) -> &mut SourceLocation {
        match self {
            Expr::Identifier(e) => &mut e.loc,
            Expr::Array(e) => &mut e.loc,
            Expr::Dict(e) => &mut e.loc,
            Expr::Function(e) => &mut Arc::make_mut(e).loc,
            Expr::Logical(e) => &mut e.loc,
            Expr::Object(e) => &mut e.loc,
            Expr::Member(e) => &mut e.loc,
            Expr::Index(e) => &mut e.loc,
            Expr::Binary(e) => &mut e.loc,
            Expr::Unary(e) => &mut e.loc,
            Expr::Call(e) => &mut e.loc,
            Expr::Conditional(e) => &mut e.loc,
            Expr::StringExpr(e) => &mut e.loc,
            Expr::Integer(e) => &mut e.loc,
            Expr::Uint(e) => &mut e.loc,
            Expr::Float(e) => &mut e.loc,
            Expr::StringLit(e) => &mut e.loc,
            Expr::Boolean(e) => &mut e.loc,
            Expr::Duration(e) => &mut e.loc,
            Expr::DateTime(e) => &mut e.loc,
            Expr::Regexp(e) => &mut e.loc,
        }
    }

    /// Replace this node's location.
    #[must_use]
    pub fn at(mut self, loc: SourceLocation) -> Self {
        *self.loc_mut() = loc;
        self
    }

    /// The node's type: its slot for typed nodes, derived otherwise.
    pub fn type_of(&self) -> MonoType {
        match self {
            Expr::Identifier(e) => e.typ.clone(),
            Expr::Array(e) => e.typ.clone(),
            Expr::Dict(e) => e.typ.clone(),
            Expr::Function(e) => e.typ.clone(),
            Expr::Object(e) => e.typ.clone(),
            Expr::Member(e) => e.typ.clone(),
            Expr::Index(e) => e.typ.clone(),
            Expr::Binary(e) => e.typ.clone(),
            Expr::Unary(e) => e.typ.clone(),
            Expr::Call(e) => e.typ.clone(),
            Expr::Conditional(e) => e.alternate.type_of(),
            Expr::Logical(_) | Expr::Boolean(_) => BasicType::Bool.into(),
            Expr::StringExpr(_) | Expr::StringLit(_) => BasicType::String.into(),
            Expr::Integer(_) => BasicType::Int.into(),
            Expr::Uint(_) => BasicType::Uint.into(),
            Expr::Float(_) => BasicType::Float.into(),
            Expr::Duration(_) => BasicType::Duration.into(),
            Expr::DateTime(_) => BasicType::Time.into(),
            Expr::Regexp(_) => BasicType::Regexp.into(),
        }
    }

    /// Binding strength used when printing; atoms and postfix forms bind
    /// tightest.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Conditional(_) | Expr::Function(_) => 0,
            Expr::Logical(e) => e.op.precedence(),
            Expr::Binary(e) => e.op.precedence(),
            Expr::Unary(e) => e.op.precedence(),
            Expr::Call(e) if e.pipe.is_some() => 9,
            _ => 10,
        }
    }
}

/// A name in expression position.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentifierExpr {
    pub loc: SourceLocation,
    pub name: Symbol,
    pub typ: MonoType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayExpr {
    pub loc: SourceLocation,
    pub elements: Vec<Expr>,
    pub typ: MonoType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DictItem {
    pub key: Expr,
    pub val: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DictExpr {
    pub loc: SourceLocation,
    pub elements: Vec<DictItem>,
    pub typ: MonoType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionExpr {
    pub loc: SourceLocation,
    pub params: Vec<FunctionParameter>,
    pub body: FunctionBody,
    pub typ: MonoType,
}

impl FunctionExpr {
    pub fn pipe_param(&self) -> Option<&FunctionParameter> {
        self.params.iter().find(|p| p.is_pipe)
    }

    pub fn param(&self, name: &str) -> Option<&FunctionParameter> {
        self.params.iter().find(|p| p.key.name == name)
    }
}

/// `key`, `key=default` or `key=<-`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionParameter {
    pub loc: SourceLocation,
    pub key: Identifier,
    pub default: Option<Expr>,
    pub is_pipe: bool,
}

impl FunctionParameter {
    pub fn is_required(&self) -> bool {
        !self.is_pipe && self.default.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionBody {
    Expr(Expr),
    Block(Block),
}

/// A function body block; its last statement is a `return`.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub loc: SourceLocation,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogicalExpr {
    pub loc: SourceLocation,
    pub op: LogicalOp,
    pub left: Expr,
    pub right: Expr,
}

/// `{a: x}` or `{r with a: x}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectExpr {
    pub loc: SourceLocation,
    pub with: Option<IdentifierExpr>,
    pub properties: Vec<Property>,
    pub typ: MonoType,
}

/// `key: value`, used by record literals and call arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub loc: SourceLocation,
    pub key: Identifier,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpr {
    pub loc: SourceLocation,
    pub object: Expr,
    pub property: Symbol,
    pub typ: MonoType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpr {
    pub loc: SourceLocation,
    pub array: Expr,
    pub index: Expr,
    pub typ: MonoType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub loc: SourceLocation,
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub typ: MonoType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub loc: SourceLocation,
    pub op: UnaryOp,
    pub argument: Expr,
    pub typ: MonoType,
}

/// `callee(arguments)`, or `pipe |> callee(arguments)`.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub loc: SourceLocation,
    pub callee: Expr,
    pub arguments: Vec<Property>,
    pub pipe: Option<Expr>,
    pub typ: MonoType,
}

impl CallExpr {
    /// Name used for diagnostics and stack entries.
    pub fn callee_name(&self) -> String {
        match &self.callee {
            Expr::Identifier(id) => id.name.to_string(),
            Expr::Member(m) => m.property.to_string(),
            other => other.to_string(),
        }
    }
}

/// `if test then consequent else alternate`
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalExpr {
    pub loc: SourceLocation,
    pub test: Expr,
    pub consequent: Expr,
    pub alternate: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringExpr {
    pub loc: SourceLocation,
    pub parts: Vec<StringExprPart>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StringExprPart {
    Text(String),
    Interpolated(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntegerLit {
    pub loc: SourceLocation,
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UintLit {
    pub loc: SourceLocation,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatLit {
    pub loc: SourceLocation,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLit {
    pub loc: SourceLocation,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BooleanLit {
    pub loc: SourceLocation,
    pub value: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DurationLit {
    pub loc: SourceLocation,
    pub value: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DateTimeLit {
    pub loc: SourceLocation,
    pub value: Time,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegexpLit {
    pub loc: SourceLocation,
    pub value: Regexp,
}
