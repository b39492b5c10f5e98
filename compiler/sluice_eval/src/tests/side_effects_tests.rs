//! Tests for side effect collection.

use pretty_assertions::assert_eq;
use sluice_diagnostic::ErrorCode;
use sluice_ir::BinaryOp;
use sluice_semantic::{build::*, Expr};

use super::{run, run_in, values};
use crate::{Interpreter, Value};

fn yield_(v: Expr) -> Expr {
    pipe(v, ident("yield"), vec![])
}

#[test]
fn test_expression_statements_are_side_effects_in_order() {
    let effects = run(vec![
        expr_stmt(int(1)),
        var("x", int(2)),
        expr_stmt(string("b")),
        expr_stmt(ident("x")),
    ])
    .unwrap();
    assert_eq!(
        values(&effects),
        [Value::Int(1), Value::string("b"), Value::Int(2)]
    );
    assert_eq!(effects[1].node.to_string(), "\"b\"");
}

#[test]
fn test_yield_is_recorded_before_the_enclosing_statement() {
    let effects = run(vec![expr_stmt(binary(
        BinaryOp::Add,
        yield_(int(1)),
        int(1),
    ))])
    .unwrap();
    assert_eq!(values(&effects), [Value::Int(1), Value::Int(2)]);
    assert!(matches!(effects[0].node, Expr::Call(_)));
    assert_eq!(effects[0].node.to_string(), "1 |> yield()");
}

#[test]
fn test_yield_inside_a_function_is_recorded_per_call() {
    let effects = run(vec![
        var("f", function(params(&["x"]), yield_(ident("x")))),
        expr_stmt(call(ident("f"), vec![("x", int(1))])),
        expr_stmt(call(ident("f"), vec![("x", int(2))])),
    ])
    .unwrap();
    assert_eq!(
        values(&effects),
        [Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(2)]
    );
}

#[test]
fn test_yield_in_an_assignment_is_still_recorded() {
    let effects = run(vec![var("x", yield_(string("s")))]).unwrap();
    assert_eq!(values(&effects), [Value::string("s")]);
}

#[test]
fn test_errors_discard_the_phase_side_effects() {
    let mut interp = Interpreter::new().unwrap();
    let err = run_in(
        &mut interp,
        vec![
            expr_stmt(yield_(int(1))),
            expr_stmt(int(2)),
            expr_stmt(call(ident("fail"), vec![])),
        ],
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Invalid);

    let effects = run_in(&mut interp, vec![expr_stmt(int(3))]).unwrap();
    assert_eq!(values(&effects), [Value::Int(3)]);
}

#[test]
fn test_failing_pipe_input_is_attributed_to_its_own_call() {
    let mut interp = Interpreter::new().unwrap();
    let err = run_in(
        &mut interp,
        vec![expr_stmt(yield_(call(ident("fail"), vec![])))],
    )
    .unwrap_err();
    assert_eq!(err.call_site().unwrap().function_name, "fail");
    assert!(interp.stack().is_empty());
}
