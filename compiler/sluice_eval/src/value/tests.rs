use super::*;
use pretty_assertions::assert_eq;
use sluice_semantic::{build, Expr};

use crate::scope::Scope;

fn sym(s: &str) -> Symbol {
    Symbol::new(s)
}

fn int_array() -> MonoType {
    MonoType::new_array(&BasicType::Int.into())
}

#[test]
fn scalar_types() {
    assert_eq!(Value::Int(1).ty().string(), "int");
    assert_eq!(Value::UInt(1).ty().string(), "uint");
    assert_eq!(Value::string("s").ty().string(), "string");
    assert_eq!(Value::null(BasicType::Float).ty().string(), "float");
    assert_eq!(
        Value::vector(BasicType::Int, vec![Value::Int(1)]).ty().string(),
        "[int]"
    );
}

#[test]
fn records_derive_their_type() {
    let r = Value::object(vec![
        (sym("a"), Value::Int(1)),
        (sym("b"), Value::string("x")),
        (sym("a"), Value::Float(2.0)),
    ]);
    assert_eq!(r.ty().string(), "{a: float, b: string}");
    assert_eq!(r.to_string(), "{a: 2, b: \"x\"}");
}

#[test]
fn dictionaries_sort_and_dedupe_keys() {
    let ty = MonoType::new_dict(&BasicType::String.into(), &BasicType::Int.into());
    let d = Value::dict(
        ty,
        vec![
            ("b".into(), Value::Int(2)),
            ("a".into(), Value::Int(1)),
            ("b".into(), Value::Int(3)),
        ],
    );
    assert_eq!(d.to_string(), "[\"a\": 1, \"b\": 3]");
    let Value::Dict(dict) = &d else {
        panic!("expected a dictionary");
    };
    assert_eq!(dict.get(&"b".into()), Some(&Value::Int(3)));
    assert_eq!(dict.get(&"c".into()), None);
    assert_eq!(dict.len(), 2);
}

#[test]
fn empty_dictionary_display() {
    let ty = MonoType::new_dict(&BasicType::String.into(), &BasicType::Int.into());
    assert_eq!(Value::dict(ty, vec![]).to_string(), "[:]");
}

#[test]
fn equality_is_structural() {
    let a = Value::array(int_array(), vec![Value::Int(1), Value::Int(2)]);
    let b = Value::array(int_array(), vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(a, b);
    assert_ne!(Value::Int(1), Value::UInt(1));
    assert_eq!(Value::null(BasicType::Int), Value::null(BasicType::String));
    assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}

#[test]
fn functions_are_equal_only_to_themselves() {
    let Expr::Function(expr) = build::function(build::params(&["x"]), build::ident("x"))
    else {
        panic!("expected a function");
    };
    let scope = Scope::new();
    let f = Value::Function(Function::user(Arc::clone(&expr), scope.clone()));
    let g = Value::Function(Function::user(expr, scope));
    assert_eq!(f, f.clone());
    assert_ne!(f, g);
    assert_eq!(f.to_string(), "(x) => x");
}

#[test]
fn scalar_display() {
    assert_eq!(Value::string("plain").to_string(), "plain");
    assert_eq!(Value::Float(1.5).to_string(), "1.5");
    assert_eq!(Value::bytes(vec![0xde, 0xad]).to_string(), "0xdead");
    let t = chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z").unwrap();
    assert_eq!(Value::Time(t).to_string(), "2024-01-02T03:04:05Z");
    assert_eq!(
        Value::array(int_array(), vec![Value::Int(1), Value::Int(2)]).to_string(),
        "[1, 2]"
    );
}

#[test]
fn key_order_is_total() {
    use std::cmp::Ordering;
    assert_eq!(Value::Int(1).compare_keys(&Value::Int(2)), Ordering::Less);
    assert_eq!(
        Value::Float(f64::NAN).compare_keys(&Value::Float(f64::NAN)),
        Ordering::Equal
    );
    assert_eq!(
        Value::Bool(true).compare_keys(&Value::Int(0)),
        Ordering::Less
    );
}
