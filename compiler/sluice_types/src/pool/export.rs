//! Moving types between the pool and [`MonoType`] buffers.

use rustc_hash::FxHashMap;
use sluice_diagnostic::Result;
use sluice_ir::Symbol;

use super::{FunctionData, Idx, Pool, TypeData, VarState};
use crate::monotype::{Kind, MonoType, Slot, TypeBuilder};
use crate::unify::Rank;

impl Pool {
    /// Follow variable links without compressing them.
    pub fn resolve(&self, mut idx: Idx) -> Idx {
        while let TypeData::Var(id) = self.get(idx) {
            match self.var_state(*id) {
                Some(VarState::Link { target }) => idx = *target,
                _ => break,
            }
        }
        idx
    }

    /// Encode the current solution for `idx` as a [`MonoType`].
    ///
    /// Unbound variables keep their pool variable number.
    pub fn export(&self, idx: Idx) -> MonoType {
        let mut b = TypeBuilder::new();
        let root = self.export_into(&mut b, idx);
        b.finish(root)
    }

    fn export_into(&self, b: &mut TypeBuilder, idx: Idx) -> Slot {
        sluice_stack::ensure_sufficient_stack(|| match self.get(self.resolve(idx)) {
            TypeData::Basic(basic) => b.basic(*basic),
            TypeData::Var(id) => b.var(u64::from(*id)),
            TypeData::Array(elem) => {
                let elem = self.export_into(b, *elem);
                b.array(elem)
            }
            TypeData::Dict { key, value } => {
                let key = self.export_into(b, *key);
                let value = self.export_into(b, *value);
                b.dict(key, value)
            }
            TypeData::EmptyRecord | TypeData::Extend { .. } => self.export_record(b, idx),
            TypeData::Function(f) => {
                let mut args: Vec<(&str, Slot, bool, bool)> = Vec::new();
                if let Some((name, ty)) = &f.pipe {
                    args.push((name.as_str(), self.export_into(b, *ty), true, false));
                }
                for (name, ty) in &f.required {
                    args.push((name.as_str(), self.export_into(b, *ty), false, false));
                }
                for (name, ty) in &f.optional {
                    args.push((name.as_str(), self.export_into(b, *ty), false, true));
                }
                let ret = self.export_into(b, f.ret);
                b.function(ret, &args)
            }
        })
    }

    fn export_record(&self, b: &mut TypeBuilder, row: Idx) -> Slot {
        let mut props: Vec<(&str, Slot)> = Vec::new();
        let mut extends = None;
        let mut row = self.resolve(row);
        loop {
            match self.get(row) {
                TypeData::Extend { label, head, tail } => {
                    props.push((label.as_str(), self.export_into(b, *head)));
                    row = self.resolve(*tail);
                }
                TypeData::Var(id) => {
                    extends = Some(u64::from(*id));
                    break;
                }
                _ => break,
            }
        }
        b.record(&props, extends)
    }

    /// Read `t` into the pool. Variables are looked up in (or added to)
    /// `vars`; new ones are created at `rank`.
    pub fn import(
        &mut self,
        t: &MonoType,
        rank: Rank,
        vars: &mut FxHashMap<u64, Idx>,
    ) -> Result<Idx> {
        sluice_stack::ensure_sufficient_stack(|| {
            Ok(match t.kind() {
                Kind::Basic => Idx::of_basic(t.basic()?),
                Kind::Var => {
                    let num = t.var_num()?;
                    match vars.get(&num) {
                        Some(idx) => *idx,
                        None => {
                            let idx = self.fresh_var(rank);
                            vars.insert(num, idx);
                            idx
                        }
                    }
                }
                Kind::Arr => {
                    let elem = self.import(&t.elem_type()?, rank, vars)?;
                    self.array(elem)
                }
                Kind::Dict => {
                    let key = self.import(&t.key_type()?, rank, vars)?;
                    let value = self.import(&t.value_type()?, rank, vars)?;
                    self.dict(key, value)
                }
                Kind::Record => {
                    let tail = match t.extends()? {
                        Some(tv) => self.import(&tv, rank, vars)?,
                        None => Idx::EMPTY_RECORD,
                    };
                    let mut props = Vec::new();
                    for p in t.properties()? {
                        let ty = self.import(&p.type_of()?, rank, vars)?;
                        props.push((Symbol::new(p.name()?), ty));
                    }
                    self.record(props, tail)
                }
                Kind::Fun => {
                    let ret = self.import(&t.return_type()?, rank, vars)?;
                    let mut data = FunctionData::new(ret);
                    for a in t.arguments()? {
                        let param = (Symbol::new(a.name()?), self.import(&a.type_of()?, rank, vars)?);
                        if a.is_pipe() {
                            data.pipe = Some(param);
                        } else if a.is_optional() {
                            data.optional.push(param);
                        } else {
                            data.required.push(param);
                        }
                    }
                    self.function(data)
                }
            })
        })
    }
}
