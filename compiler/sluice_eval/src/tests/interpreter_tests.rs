//! Tests for expression evaluation, calls and the call stack.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sluice_diagnostic::{ErrorCode, Result};
use sluice_ir::{BinaryOp, SourceLocation, UnaryOp};
use sluice_semantic::build::*;
use sluice_types::{BasicType, MonoType};

use super::{eval_last, eval_one, run_err, run_in};
use crate::{Arguments, BuiltinCatalog, CallContext, Interpreter, Value};

fn fail_call() -> sluice_semantic::Expr {
    call(ident("fail"), vec![])
}

#[test]
fn test_arithmetic_follows_the_tree() {
    let e = binary(
        BinaryOp::Add,
        int(1),
        binary(BinaryOp::Mul, int(2), int(3)),
    );
    assert_eq!(eval_one(e), Value::Int(7));
    assert_eq!(
        eval_one(binary(BinaryOp::Sub, uint(5), uint(2))),
        Value::UInt(3)
    );
}

#[test]
fn test_logical_operators_short_circuit() {
    assert_eq!(eval_one(and(boolean(false), fail_call())), Value::Bool(false));
    assert_eq!(eval_one(or(boolean(true), fail_call())), Value::Bool(true));

    let err = run_err(vec![expr_stmt(and(boolean(true), fail_call()))]);
    assert_eq!(err.code(), ErrorCode::Invalid);
    assert_eq!(err.message(), "fail was called");
}

#[test]
fn test_conditionals_evaluate_one_branch() {
    assert_eq!(
        eval_one(conditional(boolean(true), int(1), fail_call())),
        Value::Int(1)
    );
    assert_eq!(
        eval_one(conditional(boolean(false), fail_call(), int(2))),
        Value::Int(2)
    );
}

#[test]
fn test_array_index() {
    let arr = || array(vec![int(1), int(2), int(3)]);
    assert_eq!(eval_one(index(arr(), int(1))), Value::Int(2));

    let err = run_err(vec![expr_stmt(index(arr(), int(3)))]);
    assert_eq!(err.code(), ErrorCode::OutOfRange);
    assert_eq!(err.message(), "cannot access element 3 of array of length 3");

    let err = run_err(vec![expr_stmt(index(arr(), int(-1)))]);
    assert_eq!(err.code(), ErrorCode::OutOfRange);
    assert_eq!(err.message(), "cannot access element -1 of array of length 3");
}

#[test]
fn test_missing_dictionary_key_uses_the_default() {
    let lookup = call(
        ident("get"),
        vec![
            ("dict", dict(vec![])),
            ("key", string("x")),
            ("default", int(7)),
        ],
    );
    assert_eq!(eval_one(binary(BinaryOp::Eq, lookup, int(7))), Value::Bool(true));
}

#[test]
fn test_dictionary_insert_returns_a_new_dictionary() {
    let v = eval_last(vec![
        var("d", dict(vec![(string("a"), int(1))])),
        var(
            "e",
            call(
                ident("insert"),
                vec![("dict", ident("d")), ("key", string("b")), ("value", int(2))],
            ),
        ),
        expr_stmt(array(vec![ident("d"), ident("e")])),
    ]);
    assert_eq!(v.to_string(), "[[\"a\": 1], [\"a\": 1, \"b\": 2]]");
}

#[test]
fn test_blocks_do_not_mutate_the_enclosing_scope() {
    let mut interp = Interpreter::new().unwrap();
    run_in(
        &mut interp,
        vec![
            var("x", int(5)),
            var(
                "f",
                block_function(
                    vec![],
                    vec![
                        var("x", binary(BinaryOp::Add, ident("x"), int(1))),
                        ret(ident("x")),
                    ],
                ),
            ),
            var("y", call(ident("f"), vec![])),
        ],
    )
    .unwrap();
    assert_eq!(interp.lookup("y"), Some(Value::Int(6)));
    assert_eq!(interp.lookup("x"), Some(Value::Int(5)));
}

#[test]
fn test_default_parameters() {
    let f = || {
        function(
            vec![param("a"), param_default("b", int(10))],
            binary(BinaryOp::Add, ident("a"), ident("b")),
        )
    };
    assert_eq!(
        eval_last(vec![
            var("f", f()),
            expr_stmt(call(ident("f"), vec![("a", int(1))])),
        ]),
        Value::Int(11)
    );
    assert_eq!(
        eval_last(vec![
            var("f", f()),
            expr_stmt(call(ident("f"), vec![("b", int(2)), ("a", int(1))])),
        ]),
        Value::Int(3)
    );
}

#[test]
fn test_defaults_see_earlier_parameters() {
    let f = function(
        vec![
            param("a"),
            param_default("b", binary(BinaryOp::Mul, ident("a"), int(2))),
        ],
        binary(BinaryOp::Add, ident("a"), ident("b")),
    );
    assert_eq!(
        eval_last(vec![
            var("f", f),
            expr_stmt(call(ident("f"), vec![("a", int(3))])),
        ]),
        Value::Int(9)
    );
}

#[test]
fn test_closures_capture_their_scope() {
    let make = function(
        params(&["n"]),
        function(params(&["m"]), binary(BinaryOp::Add, ident("n"), ident("m"))),
    );
    assert_eq!(
        eval_last(vec![
            var("make", make),
            var("add2", call(ident("make"), vec![("n", int(2))])),
            var("n", int(100)),
            expr_stmt(call(ident("add2"), vec![("m", int(3))])),
        ]),
        Value::Int(5)
    );
}

#[test]
fn test_closures_see_bindings_from_their_definition() {
    let mut interp = Interpreter::new().unwrap();
    let effects = run_in(
        &mut interp,
        vec![
            var("x", int(1)),
            var("f", function(vec![], ident("x"))),
            var("x", int(2)),
            expr_stmt(call(ident("f"), vec![])),
            expr_stmt(ident("x")),
        ],
    )
    .unwrap();
    assert_eq!(effects[0].value, Value::Int(1));
    assert_eq!(effects[1].value, Value::Int(2));
}

#[test]
fn test_rebinding_a_captured_name_to_another_type() {
    assert_eq!(
        eval_last(vec![
            var("x", int(1)),
            var("f", function(vec![], ident("x"))),
            var("x", string("a")),
            expr_stmt(binary(BinaryOp::Add, call(ident("f"), vec![]), int(1))),
        ]),
        Value::Int(2)
    );
}

#[test]
fn test_redefining_a_function_in_terms_of_itself() {
    assert_eq!(
        eval_last(vec![
            var("f", function(vec![], int(1))),
            var(
                "f",
                function(vec![], binary(BinaryOp::Add, call(ident("f"), vec![]), int(1))),
            ),
            expr_stmt(call(ident("f"), vec![])),
        ]),
        Value::Int(2)
    );
}

#[test]
fn test_local_closures_do_not_keep_call_frames_alive() {
    let mut interp = Interpreter::new().unwrap();
    run_in(
        &mut interp,
        vec![
            var("s", string("kept")),
            var(
                "f",
                block_function(
                    vec![],
                    vec![
                        var("t", ident("s")),
                        var("g", function(vec![], ident("t"))),
                        ret(int(1)),
                    ],
                ),
            ),
        ],
    )
    .unwrap();
    let Some(Value::String(s)) = interp.lookup("s") else {
        panic!("expected s to be a string");
    };

    run_in(&mut interp, vec![expr_stmt(call(ident("f"), vec![]))]).unwrap();
    let after_one = Arc::strong_count(&s);
    for _ in 0..100 {
        run_in(&mut interp, vec![expr_stmt(call(ident("f"), vec![]))]).unwrap();
    }
    assert_eq!(Arc::strong_count(&s), after_one);
}

#[test]
fn test_pipe_parameter() {
    let inc = function(
        vec![pipe_param("v")],
        binary(BinaryOp::Add, ident("v"), int(1)),
    );
    assert_eq!(
        eval_last(vec![
            var("inc", inc),
            expr_stmt(pipe(int(1), ident("inc"), vec![])),
        ]),
        Value::Int(2)
    );
}

#[test]
fn test_piped_value_reaches_defaults_without_a_pipe_parameter() {
    let f = function(
        vec![param("a"), param_default("b", ident("<-"))],
        binary(BinaryOp::Add, ident("a"), ident("b")),
    );
    assert_eq!(
        eval_last(vec![
            var("f", f),
            expr_stmt(pipe(int(2), ident("f"), vec![("a", int(1))])),
        ]),
        Value::Int(3)
    );
}

#[test]
fn test_pipe_is_ignored_when_unused() {
    let f = function(params(&["a"]), ident("a"));
    assert_eq!(
        eval_last(vec![
            var("f", f),
            expr_stmt(pipe(string("ignored"), ident("f"), vec![("a", int(1))])),
        ]),
        Value::Int(1)
    );
}

#[test]
fn test_records_and_with() {
    let mut interp = Interpreter::new().unwrap();
    run_in(
        &mut interp,
        vec![
            var("r", object(vec![("a", int(1)), ("b", int(2))])),
            var("s", with("r", vec![("b", int(3)), ("c", int(4))])),
        ],
    )
    .unwrap();
    assert_eq!(interp.lookup("r").unwrap().to_string(), "{a: 1, b: 2}");
    assert_eq!(interp.lookup("s").unwrap().to_string(), "{a: 1, b: 3, c: 4}");

    assert_eq!(
        eval_last(vec![
            var("r", object(vec![("a", int(1))])),
            expr_stmt(member(with("r", vec![("c", int(4))]), "c")),
        ]),
        Value::Int(4)
    );
}

#[test]
fn test_missing_members_are_null() {
    let record = || call(ident("makeRecord"), vec![("o", object(vec![("a", int(1))]))]);
    assert!(eval_one(member(record(), "b")).is_null());
    assert_eq!(
        eval_one(unary(UnaryOp::Exists, member(record(), "b"))),
        Value::Bool(false)
    );
    assert_eq!(
        eval_one(unary(UnaryOp::Exists, member(record(), "a"))),
        Value::Bool(true)
    );
}

#[test]
fn test_string_interpolation() {
    let s = interpolate(vec![text("x is "), interp(ident("x")), text("!")]);
    assert_eq!(
        eval_last(vec![var("x", int(5)), expr_stmt(s)]),
        Value::string("x is 5!")
    );

    let err = run_err(vec![expr_stmt(interpolate(vec![interp(array(vec![int(1)]))]))]);
    assert_eq!(err.code(), ErrorCode::TypeMismatch);

    let null = member(
        call(ident("makeRecord"), vec![("o", object(vec![("a", int(1))]))]),
        "b",
    );
    let err = run_err(vec![expr_stmt(interpolate(vec![interp(null)]))]);
    assert_eq!(err.code(), ErrorCode::FailedPrecondition);
}

#[test]
fn test_division_by_zero_is_located() {
    let loc = SourceLocation::line(3, 5, 10);
    let err = run_err(vec![expr_stmt(
        binary(BinaryOp::Div, int(1), int(0)).at(loc.clone()),
    )]);
    assert_eq!(err.code(), ErrorCode::Invalid);
    assert_eq!(err.message(), "division by zero");
    assert_eq!(err.location(), Some(&loc));
}

#[test]
fn test_failures_are_attributed_to_the_call_site() {
    let mut interp = Interpreter::builder().file("main.sluice").build().unwrap();
    let err = run_in(
        &mut interp,
        vec![expr_stmt(fail_call().at(SourceLocation::line(1, 1, 7)))],
    )
    .unwrap_err();
    let site = err.call_site().unwrap();
    assert_eq!(site.function_name, "fail");
    assert_eq!(
        err.to_string(),
        "error calling function \"fail\" main.sluice@1:1-1:7: fail was called"
    );
}

#[test]
fn test_attribution_names_the_innermost_call() {
    let err = run_err(vec![
        var("f", function(vec![], fail_call().at(SourceLocation::line(1, 12, 18)))),
        expr_stmt(call(ident("f"), vec![]).at(SourceLocation::line(2, 1, 4))),
    ]);
    let site = err.call_site().unwrap();
    assert_eq!(site.function_name, "fail");
    assert_eq!(site.location, SourceLocation::line(1, 12, 18));
}

#[test]
fn test_call_depth_is_limited() {
    let chain = || {
        vec![
            var("g0", function(vec![], int(0))),
            var("g1", function(vec![], call(ident("g0"), vec![]))),
            var("g2", function(vec![], call(ident("g1"), vec![]))),
            var("g3", function(vec![], call(ident("g2"), vec![]))),
        ]
    };
    let mut interp = Interpreter::builder().max_call_depth(3).build().unwrap();

    let mut ok = chain();
    ok.push(expr_stmt(call(ident("g2"), vec![])));
    let effects = run_in(&mut interp, ok).unwrap();
    assert_eq!(effects[0].value, Value::Int(0));

    let mut too_deep = chain();
    too_deep.push(expr_stmt(call(ident("g3"), vec![])));
    let err = run_in(&mut interp, too_deep).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Invalid);
    assert_eq!(err.message(), "maximum call depth of 3 exceeded calling g0");
    assert_eq!(err.call_site().unwrap().function_name, "g0");
    assert!(interp.stack().is_empty());
}

fn stack_path(ctx: &CallContext<'_>, _: &Arguments) -> Result<Value> {
    let names: Vec<&str> = ctx
        .stack
        .entries()
        .iter()
        .map(|e| e.function_name.as_str())
        .collect();
    Ok(Value::string(names.join(">")))
}

#[test]
fn test_builtins_see_the_live_call_stack() {
    let string_ty = MonoType::from(BasicType::String);
    let catalog = BuiltinCatalog::standard().with(
        "path",
        MonoType::new_function(&string_ty, &[]),
        false,
        stack_path,
    );
    let mut interp = Interpreter::builder().builtins(catalog).build().unwrap();
    let effects = run_in(
        &mut interp,
        vec![
            var("g", function(vec![], call(ident("path"), vec![]))),
            var("f", function(vec![], call(ident("g"), vec![]))),
            expr_stmt(call(ident("f"), vec![])),
            expr_stmt(call(ident("path"), vec![])),
        ],
    )
    .unwrap();
    assert_eq!(effects[0].value, Value::string("f>g>path"));
    assert_eq!(effects[1].value, Value::string("path"));
    assert!(interp.stack().is_empty());
}

#[test]
fn test_stack_is_empty_after_an_error() {
    let mut interp = Interpreter::new().unwrap();
    run_in(
        &mut interp,
        vec![
            var("f", function(params(&["x"]), fail_call())),
            expr_stmt(call(ident("f"), vec![("x", int(1))])),
        ],
    )
    .unwrap_err();
    assert!(interp.stack().is_empty());
}

#[test]
fn test_undefined_names_fail_type_checking() {
    let err = run_err(vec![expr_stmt(ident("nope"))]);
    assert_eq!(err.code(), ErrorCode::Invalid);
    assert_eq!(err.message(), "undefined identifier nope");
}
