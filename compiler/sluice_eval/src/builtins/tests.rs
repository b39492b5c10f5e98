use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sluice_diagnostic::ErrorCode;
use sluice_types::BasicType;

fn sym(s: &str) -> Symbol {
    Symbol::new(s)
}

fn string_int_dict() -> MonoType {
    MonoType::new_dict(&BasicType::String.into(), &BasicType::Int.into())
}

fn call(name: &str, args: Vec<(&str, Value)>, piped: Option<Value>) -> Result<Value> {
    let catalog = BuiltinCatalog::standard();
    let builtin = catalog.get(name).unwrap();
    let args = args.into_iter().map(|(n, v)| (sym(n), v)).collect();
    let arguments = Arguments::bind(&builtin.ty, args, piped)?;
    let stack = CallStack::default();
    let location = SourceLocation::default();
    let ret_type = string_int_dict();
    let ctx = CallContext {
        stack: &stack,
        location: &location,
        ret_type: &ret_type,
    };
    (builtin.func)(&ctx, &arguments)
}

#[test]
fn standard_catalog_contents() {
    let catalog = BuiltinCatalog::standard();
    let names: Vec<&str> = catalog.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        ["get", "insert", "remove", "fail", "yield", "makeRecord"]
    );
    assert!(catalog.get("yield").unwrap().side_effect);
    assert!(!catalog.get("get").unwrap().side_effect);
    assert_eq!(
        catalog.get("get").unwrap().ty.canonical_string(),
        "(default: A, dict: [B: A], key: B) => A"
    );
}

#[test]
fn with_replaces_by_name() {
    let catalog = BuiltinCatalog::standard().with(
        "fail",
        MonoType::new_function(&BasicType::Int.into(), &[]),
        true,
        |_, _| Ok(Value::Int(0)),
    );
    assert_eq!(catalog.len(), 6);
    assert!(catalog.get("fail").unwrap().side_effect);
}

#[test]
fn arguments_are_matched_by_name() {
    let empty = Value::dict(string_int_dict(), vec![]);
    let err = call("get", vec![("dict", empty.clone()), ("key", "k".into())], None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingArgument);
    assert_eq!(err.message(), "missing required argument \"default\"");

    let err = call(
        "remove",
        vec![("dict", empty.clone()), ("key", "k".into()), ("key", "j".into())],
        None,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateArgument);

    let err = call("fail", vec![("why", "k".into())], None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Invalid);
    assert_eq!(err.message(), "unexpected argument \"why\"");
}

#[test]
fn pipe_fills_the_pipe_parameter() {
    assert_eq!(call("yield", vec![], Some(Value::Int(3))).unwrap(), Value::Int(3));

    let err = call("yield", vec![("v", Value::Int(1))], Some(Value::Int(3))).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateArgument);

    let err = call("yield", vec![], None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingArgument);

    // No pipe parameter: the piped value is dropped.
    let err = call("fail", vec![], Some(Value::Int(3))).unwrap_err();
    assert_eq!(err.message(), "fail was called");
}

#[test]
fn get_falls_back_to_the_default() {
    let empty = Value::dict(string_int_dict(), vec![]);
    let got = call(
        "get",
        vec![("dict", empty), ("key", "x".into()), ("default", Value::Int(7))],
        None,
    )
    .unwrap();
    assert_eq!(got, Value::Int(7));
}

#[test]
fn remove_returns_a_new_dictionary() {
    let d = Value::dict(
        string_int_dict(),
        vec![("a".into(), Value::Int(1)), ("b".into(), Value::Int(2))],
    );
    let removed = call("remove", vec![("dict", d.clone()), ("key", "a".into())], None).unwrap();
    assert_eq!(removed.to_string(), "[\"b\": 2]");
    assert_eq!(d.to_string(), "[\"a\": 1, \"b\": 2]");
}

#[test]
fn dict_arguments_are_type_checked() {
    let err = call(
        "get",
        vec![("dict", Value::Int(1)), ("key", "x".into()), ("default", Value::Int(7))],
        None,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TypeMismatch);
}

proptest! {
    #[test]
    fn insert_then_get_returns_the_value(
        entries in prop::collection::vec(("[a-z]{1,4}", any::<i64>()), 0..8),
        key in "[a-z]{1,4}",
        value in any::<i64>(),
    ) {
        let d = Value::dict(
            string_int_dict(),
            entries.into_iter().map(|(k, v)| (Value::string(k), Value::Int(v))).collect(),
        );
        let inserted = call(
            "insert",
            vec![("dict", d), ("key", Value::string(key.as_str())), ("value", Value::Int(value))],
            None,
        )
        .unwrap();
        let got = call(
            "get",
            vec![("dict", inserted), ("key", Value::string(key.as_str())), ("default", Value::Int(0))],
            None,
        )
        .unwrap();
        prop_assert_eq!(got, Value::Int(value));
    }
}
