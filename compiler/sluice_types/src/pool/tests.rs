use super::*;
use crate::monotype::{ArgumentType, PropertyType};
use crate::MonoType;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

#[test]
fn basics_are_pre_interned() {
    let pool = Pool::new();
    for b in BasicType::ALL {
        assert_eq!(pool.export(Idx::of_basic(b)).string(), b.as_str());
    }
    assert_eq!(pool.export(Idx::EMPTY_RECORD).string(), "{}");
}

#[test]
fn rows_export_as_records() {
    let mut pool = Pool::new();
    let closed = pool.record(
        vec![(Symbol::new("a"), Idx::INT), (Symbol::new("b"), Idx::STRING)],
        Idx::EMPTY_RECORD,
    );
    assert_eq!(pool.export(closed).string(), "{a: int, b: string}");

    let tail = pool.fresh_var(Rank::FIRST);
    let open = pool.record(vec![(Symbol::new("x"), Idx::FLOAT)], tail);
    assert_eq!(pool.export(open).string(), "{A with x: float}");
}

#[test]
fn import_then_export_preserves_the_canonical_form() {
    let t = MonoType::new_function(
        &MonoType::new_var(2),
        &[
            ArgumentType::pipe("tables", MonoType::new_var(0)),
            ArgumentType::optional("n", MonoType::new_basic(BasicType::Int)),
            ArgumentType::required(
                "r",
                MonoType::extend_object(&[PropertyType::new("x", MonoType::new_var(1))], Some(5)),
            ),
        ],
    );
    let mut pool = Pool::new();
    let idx = pool
        .import(&t, Rank::FIRST, &mut FxHashMap::default())
        .unwrap();
    assert_eq!(pool.export(idx).canonical_string(), t.canonical_string());
}

#[test]
fn shared_variables_import_once() {
    let t = MonoType::new_dict(&MonoType::new_var(3), &MonoType::new_var(3));
    let mut pool = Pool::new();
    let idx = pool
        .import(&t, Rank::FIRST, &mut FxHashMap::default())
        .unwrap();
    let TypeData::Dict { key, value } = pool.get(idx) else {
        panic!("expected a dict");
    };
    assert_eq!(key, value);
}

#[test]
fn rollback_restores_variables_and_extent() {
    let mut pool = Pool::new();
    let v = pool.fresh_var(Rank::FIRST);
    let snapshot = pool.snapshot();
    let len = pool.len();

    let TypeData::Var(id) = *pool.get(v) else {
        panic!("expected a variable");
    };
    pool.set_var_state(id, VarState::Link { target: Idx::INT });
    let _ = pool.array(Idx::INT);
    assert_eq!(pool.resolve(v), Idx::INT);

    pool.rollback(snapshot);
    assert_eq!(pool.len(), len);
    assert_eq!(pool.resolve(v), v);
}

#[test]
#[should_panic(expected = "outside the pool")]
fn foreign_indices_are_rejected() {
    let pool = Pool::new();
    let _ = pool.get(Idx(Idx::PRE_INTERNED + 100));
}
