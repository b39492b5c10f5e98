//! Constructors for semantic graphs.
//!
//! Typed nodes start with the [`unassigned`] placeholder type and receive
//! their real type from inference. Locations default to unknown; use
//! [`Expr::at`] to attach one.

use std::sync::Arc;

use sluice_ir::{BinaryOp, Duration, LogicalOp, Regexp, SourceLocation, Symbol, Time, UnaryOp};

use crate::nodes::{
    unassigned, ArrayExpr, BinaryExpr, Block, BooleanLit, CallExpr, ConditionalExpr, DateTimeLit,
    DictExpr, DictItem, DurationLit, Expr, ExprStatement, FloatLit, FunctionBody, FunctionExpr,
    FunctionParameter, Identifier, IdentifierExpr, IndexExpr, IntegerLit, LogicalExpr, MemberExpr,
    ObjectExpr, OptionStatement, Package, Property, RegexpLit, ReturnStatement, Statement,
    StringExpr, StringExprPart, StringLit, UintLit, UnaryExpr, VariableAssgn,
};

fn no_loc() -> SourceLocation {
    SourceLocation::default()
}

fn identifier(name: &str) -> Identifier {
    Identifier {
        loc: no_loc(),
        name: Symbol::new(name),
    }
}

fn properties(props: Vec<(&str, Expr)>) -> Vec<Property> {
    props
        .into_iter()
        .map(|(key, value)| Property {
            loc: no_loc(),
            key: identifier(key),
            value,
        })
        .collect()
}

// Statements

pub fn package(body: Vec<Statement>) -> Package {
    Package { loc: no_loc(), body }
}

pub fn expr_stmt(expression: Expr) -> Statement {
    Statement::Expr(ExprStatement {
        loc: expression.loc().clone(),
        expression,
    })
}

pub fn var(name: &str, init: Expr) -> Statement {
    Statement::Variable(Box::new(VariableAssgn {
        loc: no_loc(),
        id: identifier(name),
        init,
    }))
}

pub fn option(name: &str, init: Expr) -> Statement {
    Statement::Option(Box::new(OptionStatement {
        loc: no_loc(),
        id: identifier(name),
        init,
    }))
}

pub fn ret(argument: Expr) -> Statement {
    Statement::Return(ReturnStatement {
        loc: no_loc(),
        argument,
    })
}

// Literals

pub fn int(value: i64) -> Expr {
    Expr::Integer(IntegerLit {
        loc: no_loc(),
        value,
    })
}

pub fn uint(value: u64) -> Expr {
    Expr::Uint(UintLit {
        loc: no_loc(),
        value,
    })
}

pub fn float(value: f64) -> Expr {
    Expr::Float(FloatLit {
        loc: no_loc(),
        value,
    })
}

pub fn string(value: &str) -> Expr {
    Expr::StringLit(StringLit {
        loc: no_loc(),
        value: value.to_owned(),
    })
}

pub fn boolean(value: bool) -> Expr {
    Expr::Boolean(BooleanLit {
        loc: no_loc(),
        value,
    })
}

pub fn duration(value: Duration) -> Expr {
    Expr::Duration(DurationLit {
        loc: no_loc(),
        value,
    })
}

pub fn datetime(value: Time) -> Expr {
    Expr::DateTime(DateTimeLit {
        loc: no_loc(),
        value,
    })
}

pub fn regexp(value: Regexp) -> Expr {
    Expr::Regexp(RegexpLit {
        loc: no_loc(),
        value,
    })
}

// Composite expressions

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(ident_expr(name))
}

pub fn ident_expr(name: &str) -> IdentifierExpr {
    IdentifierExpr {
        loc: no_loc(),
        name: Symbol::new(name),
        typ: unassigned(),
    }
}

pub fn array(elements: Vec<Expr>) -> Expr {
    Expr::Array(Box::new(ArrayExpr {
        loc: no_loc(),
        elements,
        typ: unassigned(),
    }))
}

pub fn dict(elements: Vec<(Expr, Expr)>) -> Expr {
    Expr::Dict(Box::new(DictExpr {
        loc: no_loc(),
        elements: elements
            .into_iter()
            .map(|(key, val)| DictItem { key, val })
            .collect(),
        typ: unassigned(),
    }))
}

pub fn object(props: Vec<(&str, Expr)>) -> Expr {
    Expr::Object(Box::new(ObjectExpr {
        loc: no_loc(),
        with: None,
        properties: properties(props),
        typ: unassigned(),
    }))
}

/// `{base with props}`
pub fn with(base: &str, props: Vec<(&str, Expr)>) -> Expr {
    Expr::Object(Box::new(ObjectExpr {
        loc: no_loc(),
        with: Some(ident_expr(base)),
        properties: properties(props),
        typ: unassigned(),
    }))
}

pub fn member(object: Expr, property: &str) -> Expr {
    Expr::Member(Box::new(MemberExpr {
        loc: no_loc(),
        object,
        property: Symbol::new(property),
        typ: unassigned(),
    }))
}

pub fn index(array: Expr, index: Expr) -> Expr {
    Expr::Index(Box::new(IndexExpr {
        loc: no_loc(),
        array,
        index,
        typ: unassigned(),
    }))
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(Box::new(BinaryExpr {
        loc: no_loc(),
        op,
        left,
        right,
        typ: unassigned(),
    }))
}

pub fn unary(op: UnaryOp, argument: Expr) -> Expr {
    Expr::Unary(Box::new(UnaryExpr {
        loc: no_loc(),
        op,
        argument,
        typ: unassigned(),
    }))
}

pub fn logical(op: LogicalOp, left: Expr, right: Expr) -> Expr {
    Expr::Logical(Box::new(LogicalExpr {
        loc: no_loc(),
        op,
        left,
        right,
    }))
}

pub fn and(left: Expr, right: Expr) -> Expr {
    logical(LogicalOp::And, left, right)
}

pub fn or(left: Expr, right: Expr) -> Expr {
    logical(LogicalOp::Or, left, right)
}

pub fn call(callee: Expr, args: Vec<(&str, Expr)>) -> Expr {
    Expr::Call(Box::new(CallExpr {
        loc: no_loc(),
        callee,
        arguments: properties(args),
        pipe: None,
        typ: unassigned(),
    }))
}

/// `piped |> callee(args)`
pub fn pipe(piped: Expr, callee: Expr, args: Vec<(&str, Expr)>) -> Expr {
    Expr::Call(Box::new(CallExpr {
        loc: no_loc(),
        callee,
        arguments: properties(args),
        pipe: Some(piped),
        typ: unassigned(),
    }))
}

pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Expr {
    Expr::Conditional(Box::new(ConditionalExpr {
        loc: no_loc(),
        test,
        consequent,
        alternate,
    }))
}

pub fn interpolate(parts: Vec<StringExprPart>) -> Expr {
    Expr::StringExpr(Box::new(StringExpr {
        loc: no_loc(),
        parts,
    }))
}

pub fn text(s: &str) -> StringExprPart {
    StringExprPart::Text(s.to_owned())
}

pub fn interp(e: Expr) -> StringExprPart {
    StringExprPart::Interpolated(e)
}

// Functions

pub fn param(name: &str) -> FunctionParameter {
    FunctionParameter {
        loc: no_loc(),
        key: identifier(name),
        default: None,
        is_pipe: false,
    }
}

pub fn param_default(name: &str, default: Expr) -> FunctionParameter {
    FunctionParameter {
        default: Some(default),
        ..param(name)
    }
}

/// `name=<-`
pub fn pipe_param(name: &str) -> FunctionParameter {
    FunctionParameter {
        is_pipe: true,
        ..param(name)
    }
}

pub fn function(params: Vec<FunctionParameter>, body: Expr) -> Expr {
    function_with(params, FunctionBody::Expr(body))
}

pub fn block_function(params: Vec<FunctionParameter>, body: Vec<Statement>) -> Expr {
    function_with(
        params,
        FunctionBody::Block(Block {
            loc: no_loc(),
            body,
        }),
    )
}

pub fn function_with(params: Vec<FunctionParameter>, body: FunctionBody) -> Expr {
    Expr::Function(Arc::new(FunctionExpr {
        loc: no_loc(),
        params,
        body,
        typ: unassigned(),
    }))
}

/// Shorthand for the parameter names of a function without defaults.
pub fn params(names: &[&str]) -> Vec<FunctionParameter> {
    names.iter().map(|n| param(n)).collect()
}
