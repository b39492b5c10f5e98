//! Tests for running a program as a sequence of phases.

use pretty_assertions::assert_eq;
use sluice_diagnostic::{Error, ErrorCode, Result};
use sluice_ir::BinaryOp;
use sluice_semantic::build::*;
use sluice_types::{ArgumentType, BasicType, MonoType};

use super::{run_in, values};
use crate::{Arguments, BuiltinCatalog, CallContext, Interpreter, Value};

#[test]
fn test_bindings_persist_across_phases() {
    let mut interp = Interpreter::new().unwrap();
    run_in(&mut interp, vec![var("x", int(1))]).unwrap();
    let effects = run_in(
        &mut interp,
        vec![expr_stmt(binary(BinaryOp::Add, ident("x"), int(1)))],
    )
    .unwrap();
    assert_eq!(values(&effects), [Value::Int(2)]);
    assert_eq!(interp.checker().lookup_type("x").unwrap().string(), "int");
}

#[test]
fn test_type_errors_leave_no_trace() {
    let mut interp = Interpreter::new().unwrap();
    run_in(&mut interp, vec![var("x", int(1))]).unwrap();

    let err = run_in(
        &mut interp,
        vec![
            var("y", int(2)),
            expr_stmt(binary(BinaryOp::Add, string("a"), int(1))),
        ],
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TypeMismatch);
    assert_eq!(interp.lookup("y"), None);
    assert!(interp.checker().lookup_type("y").is_none());

    let err = run_in(&mut interp, vec![expr_stmt(ident("y"))]).unwrap_err();
    assert_eq!(err.message(), "undefined identifier y");

    let effects = run_in(&mut interp, vec![expr_stmt(ident("x"))]).unwrap();
    assert_eq!(values(&effects), [Value::Int(1)]);
}

#[test]
fn test_runtime_errors_keep_earlier_assignments() {
    let mut interp = Interpreter::new().unwrap();
    let err = run_in(
        &mut interp,
        vec![
            var("a", int(1)),
            var("b", binary(BinaryOp::Div, int(1), int(0))),
        ],
    )
    .unwrap_err();
    assert_eq!(err.message(), "division by zero");
    assert_eq!(interp.lookup("a"), Some(Value::Int(1)));
    assert_eq!(interp.lookup("b"), None);

    let effects = run_in(
        &mut interp,
        vec![expr_stmt(binary(BinaryOp::Add, ident("a"), int(1)))],
    )
    .unwrap();
    assert_eq!(values(&effects), [Value::Int(2)]);
}

#[test]
fn test_uncalled_function_bodies_are_type_checked() {
    let mut interp = Interpreter::new().unwrap();
    let err = run_in(
        &mut interp,
        vec![
            expr_stmt(int(1)),
            var(
                "f",
                function(vec![], binary(BinaryOp::Add, string("a"), int(1))),
            ),
        ],
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TypeMismatch);
    assert_eq!(interp.lookup("f"), None);
}

#[test]
fn test_names_from_later_phases_are_not_visible() {
    let mut interp = Interpreter::new().unwrap();
    let err = run_in(
        &mut interp,
        vec![var(
            "f",
            function(vec![], binary(BinaryOp::Add, ident("later"), int(1))),
        )],
    )
    .unwrap_err();
    assert_eq!(err.message(), "undefined identifier later");

    run_in(&mut interp, vec![var("later", int(1))]).unwrap();
    assert_eq!(interp.lookup("f"), None);
}

#[test]
fn test_options_rebind_for_existing_closures() {
    let mut interp = Interpreter::new().unwrap();
    run_in(
        &mut interp,
        vec![option("o", int(1)), var("f", function(vec![], ident("o")))],
    )
    .unwrap();
    run_in(&mut interp, vec![option("o", int(2))]).unwrap();
    let effects = run_in(&mut interp, vec![expr_stmt(call(ident("f"), vec![]))]).unwrap();
    assert_eq!(values(&effects), [Value::Int(2)]);
}

#[test]
fn test_option_type_cannot_change() {
    let mut interp = Interpreter::new().unwrap();
    run_in(&mut interp, vec![option("o", int(1))]).unwrap();
    let err = run_in(&mut interp, vec![option("o", string("s"))]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TypeMismatch);
    assert_eq!(interp.lookup("o"), Some(Value::Int(1)));
}

#[test]
fn test_defined_values_are_visible_to_later_phases() {
    let mut interp = Interpreter::new().unwrap();
    interp.define("limit", Value::Int(10)).unwrap();
    let effects = run_in(
        &mut interp,
        vec![expr_stmt(binary(BinaryOp::Mul, ident("limit"), int(2)))],
    )
    .unwrap();
    assert_eq!(values(&effects), [Value::Int(20)]);
}

#[test]
fn test_return_outside_a_function_is_rejected() {
    let mut interp = Interpreter::new().unwrap();
    let err = run_in(&mut interp, vec![ret(int(1))]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Invalid);
}

fn double(_: &CallContext<'_>, args: &Arguments) -> Result<Value> {
    match args.required("n")? {
        Value::Int(n) => Ok(Value::Int(n * 2)),
        other => Err(Error::type_mismatch(format!(
            "expected an int, got {}",
            other.type_name()
        ))),
    }
}

#[test]
fn test_custom_builtins() {
    let int_ty = MonoType::from(BasicType::Int);
    let catalog = BuiltinCatalog::standard().with(
        "double",
        MonoType::new_function(&int_ty, &[ArgumentType::required("n", int_ty.clone())]),
        false,
        double,
    );
    let mut interp = Interpreter::builder().builtins(catalog).build().unwrap();
    let effects = run_in(
        &mut interp,
        vec![expr_stmt(call(ident("double"), vec![("n", int(21))]))],
    )
    .unwrap();
    assert_eq!(values(&effects), [Value::Int(42)]);
}

fn pipe_into(v: sluice_semantic::Expr, callee: &str) -> sluice_semantic::Expr {
    pipe(v, ident(callee), vec![])
}

#[test]
fn test_pipe_chains_across_phases() {
    let mut interp = Interpreter::new().unwrap();
    run_in(
        &mut interp,
        vec![
            var(
                "inc",
                function(vec![pipe_param("v")], binary(BinaryOp::Add, ident("v"), int(1))),
            ),
            var(
                "twice",
                function(
                    vec![pipe_param("v")],
                    pipe_into(pipe_into(ident("v"), "inc"), "inc"),
                ),
            ),
        ],
    )
    .unwrap();
    run_in(
        &mut interp,
        vec![var(
            "highest",
            function(vec![pipe_param("t")], pipe_into(ident("t"), "twice")),
        )],
    )
    .unwrap();

    let effects = run_in(&mut interp, vec![expr_stmt(pipe_into(int(5), "highest"))]).unwrap();
    assert_eq!(values(&effects), [Value::Int(7)]);
    assert_eq!(
        interp.checker().lookup_type("highest").unwrap().canonical_string(),
        "(<-t: int) => int"
    );
}

#[test]
fn test_missing_pipe_argument_stops_the_phase_before_it_runs() {
    let mut interp = Interpreter::new().unwrap();
    run_in(
        &mut interp,
        vec![var(
            "inc",
            function(vec![pipe_param("v")], binary(BinaryOp::Add, ident("v"), int(1))),
        )],
    )
    .unwrap();

    let err = run_in(
        &mut interp,
        vec![
            var("before", call(ident("fail"), vec![])),
            expr_stmt(call(ident("inc"), vec![])),
        ],
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingArgument);
    assert_eq!(err.message(), "missing pipe argument \"v\"");
    assert!(err.call_site().is_none());
    assert_eq!(interp.lookup("before"), None);
}
