use super::*;
use crate::monotype::ArgumentType;
use pretty_assertions::assert_eq;
use sluice_diagnostic::ErrorCode;

fn sym(s: &str) -> Symbol {
    Symbol::new(s)
}

fn fun(engine: &mut UnifyEngine, data: FunctionData) -> Idx {
    engine.pool_mut().function(data)
}

#[test]
fn mismatched_basics_fail_with_readable_message() {
    let engine = &mut UnifyEngine::new();
    let err = engine.unify(Idx::INT, Idx::STRING).unwrap_err();
    assert_eq!(
        err,
        UnifyError::Mismatch {
            expected: Idx::INT,
            found: Idx::STRING
        }
    );
    let diag = engine.describe(&err);
    assert_eq!(diag.code(), ErrorCode::TypeMismatch);
    assert_eq!(diag.message(), "expected int but found string");
}

#[test]
fn variables_bind_and_resolve() {
    let engine = &mut UnifyEngine::new();
    let a = engine.fresh_var();
    let b = engine.fresh_var();
    engine.unify(a, b).unwrap();
    engine.unify(b, Idx::FLOAT).unwrap();
    assert_eq!(engine.resolve(a), Idx::FLOAT);
    assert!(engine.unify(a, Idx::INT).is_err());
}

#[test]
fn occurs_check_rejects_infinite_types() {
    let engine = &mut UnifyEngine::new();
    let a = engine.fresh_var();
    let arr = engine.pool_mut().array(a);
    assert!(matches!(
        engine.unify(a, arr),
        Err(UnifyError::InfiniteType { .. })
    ));
}

#[test]
fn member_constraints_accumulate_on_an_open_row() {
    let engine = &mut UnifyEngine::new();
    let r = engine.fresh_var();

    let t1 = engine.fresh_var();
    let want_a = engine.pool_mut().record(vec![(sym("a"), Idx::INT)], t1);
    engine.unify(r, want_a).unwrap();

    let t2 = engine.fresh_var();
    let want_b = engine.pool_mut().record(vec![(sym("b"), Idx::STRING)], t2);
    engine.unify(r, want_b).unwrap();

    assert_eq!(
        engine.export(r).canonical_string(),
        "{A with a: int, b: string}"
    );
}

#[test]
fn closed_rows_unify_in_any_order() {
    let engine = &mut UnifyEngine::new();
    let ab = engine.pool_mut().record(
        vec![(sym("a"), Idx::INT), (sym("b"), Idx::STRING)],
        Idx::EMPTY_RECORD,
    );
    let ba = engine.pool_mut().record(
        vec![(sym("b"), Idx::STRING), (sym("a"), Idx::INT)],
        Idx::EMPTY_RECORD,
    );
    engine.unify(ab, ba).unwrap();

    let c = engine
        .pool_mut()
        .record(vec![(sym("c"), Idx::INT)], Idx::EMPTY_RECORD);
    assert_eq!(
        engine.unify(ab, c),
        Err(UnifyError::MissingLabel { label: sym("a") })
    );
}

#[test]
fn rows_sharing_a_tail_cannot_disagree() {
    let engine = &mut UnifyEngine::new();
    let r = engine.fresh_var();
    let a = engine.pool_mut().record(vec![(sym("a"), Idx::INT)], r);
    let b = engine.pool_mut().record(vec![(sym("b"), Idx::INT)], r);
    assert_eq!(
        engine.unify(a, b),
        Err(UnifyError::RecursiveRow { label: sym("a") })
    );
}

#[test]
fn generalized_schemes_instantiate_independently() {
    let engine = &mut UnifyEngine::new();
    engine.enter_scope();
    let v = engine.fresh_var();
    let mut data = FunctionData::new(v);
    data.required.push((sym("x"), v));
    let identity = fun(engine, data);
    engine.exit_scope();

    let scheme = engine.generalize(identity);
    assert_eq!(scheme.vars.len(), 1);

    let first = engine.instantiate(&scheme);
    let second = engine.instantiate(&scheme);
    let ret1 = engine.fresh_var();
    let mut call = FunctionData::new(ret1);
    call.required.push((sym("x"), Idx::INT));
    engine.unify_call(first, &call).unwrap();
    assert_eq!(engine.resolve(ret1), Idx::INT);

    let ret2 = engine.fresh_var();
    let mut call = FunctionData::new(ret2);
    call.required.push((sym("x"), Idx::STRING));
    engine.unify_call(second, &call).unwrap();
    assert_eq!(engine.resolve(ret2), Idx::STRING);
}

#[test]
fn escaping_variables_are_not_generalized() {
    let engine = &mut UnifyEngine::new();
    let outer = engine.fresh_var();
    engine.enter_scope();
    let inner = engine.fresh_var();
    engine.unify(inner, outer).unwrap();
    let arr = engine.pool_mut().array(inner);
    engine.exit_scope();
    assert!(engine.generalize(arr).vars.is_empty());
}

fn pipe_fn(engine: &mut UnifyEngine) -> Idx {
    // (<-tables: A, n: int, ?m: int) => A
    let a = engine.fresh_var();
    let mut data = FunctionData::new(a);
    data.pipe = Some((sym("tables"), a));
    data.required.push((sym("n"), Idx::INT));
    data.optional.push((sym("m"), Idx::INT));
    fun(engine, data)
}

fn call_shape(
    engine: &mut UnifyEngine,
    pipe: Option<Idx>,
    args: &[(&str, Idx)],
) -> (FunctionData, Idx) {
    let ret = engine.fresh_var();
    let mut data = FunctionData::new(ret);
    data.pipe = pipe.map(|t| (sym(PIPE_PLACEHOLDER), t));
    data.required = args.iter().map(|(n, t)| (sym(n), *t)).collect();
    (data, ret)
}

#[test]
fn call_binds_pipe_and_named_arguments() {
    let engine = &mut UnifyEngine::new();
    let f = pipe_fn(engine);
    let (call, ret) = call_shape(engine, Some(Idx::STRING), &[("n", Idx::INT)]);
    engine.unify_call(f, &call).unwrap();
    assert_eq!(engine.resolve(ret), Idx::STRING);
}

#[test]
fn call_may_name_the_pipe_parameter() {
    let engine = &mut UnifyEngine::new();
    let f = pipe_fn(engine);
    let (call, ret) = call_shape(engine, None, &[("tables", Idx::FLOAT), ("n", Idx::INT)]);
    engine.unify_call(f, &call).unwrap();
    assert_eq!(engine.resolve(ret), Idx::FLOAT);
}

#[test]
fn call_errors() {
    let engine = &mut UnifyEngine::new();
    let f = pipe_fn(engine);

    let (call, _) = call_shape(engine, Some(Idx::INT), &[]);
    assert_eq!(
        engine.unify_call(f, &call),
        Err(UnifyError::MissingArgument { name: sym("n") })
    );

    let (call, _) = call_shape(engine, None, &[("n", Idx::INT)]);
    assert_eq!(
        engine.unify_call(f, &call),
        Err(UnifyError::MissingPipe { name: sym("tables") })
    );

    let (call, _) = call_shape(engine, Some(Idx::INT), &[("n", Idx::INT), ("tables", Idx::INT)]);
    assert_eq!(
        engine.unify_call(f, &call),
        Err(UnifyError::DuplicateArgument { name: sym("tables") })
    );

    let (call, _) = call_shape(engine, Some(Idx::INT), &[("n", Idx::INT), ("n", Idx::INT)]);
    assert_eq!(
        engine.unify_call(f, &call),
        Err(UnifyError::DuplicateArgument { name: sym("n") })
    );

    let (call, _) = call_shape(engine, Some(Idx::INT), &[("n", Idx::INT), ("zzz", Idx::INT)]);
    assert_eq!(
        engine.unify_call(f, &call),
        Err(UnifyError::UnexpectedArgument { name: sym("zzz") })
    );

    let (call, _) = call_shape(engine, None, &[]);
    assert!(matches!(
        engine.unify_call(Idx::INT, &call),
        Err(UnifyError::NotAFunction { .. })
    ));
}

#[test]
fn piping_into_a_function_without_pipe_is_ignored() {
    let engine = &mut UnifyEngine::new();
    let mut data = FunctionData::new(Idx::INT);
    data.required.push((sym("a"), Idx::INT));
    let add = fun(engine, data);
    let (call, ret) = call_shape(engine, Some(Idx::STRING), &[("a", Idx::INT)]);
    engine.unify_call(add, &call).unwrap();
    assert_eq!(engine.resolve(ret), Idx::INT);
}

#[test]
fn calling_a_variable_binds_it_to_the_call_shape() {
    let engine = &mut UnifyEngine::new();
    let callee = engine.fresh_var();
    let (call, ret) = call_shape(engine, Some(Idx::INT), &[]);
    engine.unify_call(callee, &call).unwrap();

    // (table=<-) => table, supplied later for the variable.
    let t = engine.fresh_var();
    let mut data = FunctionData::new(t);
    data.pipe = Some((sym("table"), t));
    let actual = fun(engine, data);
    engine.unify(callee, actual).unwrap();
    assert_eq!(engine.resolve(ret), Idx::INT);
}

#[test]
fn named_pipes_must_agree() {
    let engine = &mut UnifyEngine::new();
    let mut a = FunctionData::new(Idx::INT);
    a.pipe = Some((sym("a"), Idx::INT));
    let mut b = FunctionData::new(Idx::INT);
    b.pipe = Some((sym("b"), Idx::INT));
    let fa = fun(engine, a);
    let fb = fun(engine, b);
    assert_eq!(
        engine.unify(fa, fb),
        Err(UnifyError::PipeMismatch {
            expected: sym("a"),
            found: sym("b")
        })
    );
}

#[test]
fn imported_schemes_are_fully_polymorphic() {
    let engine = &mut UnifyEngine::new();
    let k = MonoType::new_var(0);
    let v = MonoType::new_var(1);
    let get = MonoType::new_function(
        &v,
        &[
            ArgumentType::required("dict", MonoType::new_dict(&k, &v)),
            ArgumentType::required("key", k.clone()),
            ArgumentType::required("default", v.clone()),
        ],
    );
    let scheme = engine.import_scheme(&get).unwrap();
    assert_eq!(scheme.vars.len(), 2);

    let inst = engine.instantiate(&scheme);
    let dict = engine.pool_mut().dict(Idx::STRING, Idx::INT);
    let (call, ret) = call_shape(
        engine,
        None,
        &[("dict", dict), ("key", Idx::STRING), ("default", Idx::INT)],
    );
    engine.unify_call(inst, &call).unwrap();
    assert_eq!(engine.resolve(ret), Idx::INT);

    let inst = engine.instantiate(&scheme);
    let (call, _) = call_shape(
        engine,
        None,
        &[("dict", dict), ("key", Idx::INT), ("default", Idx::INT)],
    );
    assert!(engine.unify_call(inst, &call).is_err());
}
