//! Rendering and canonicalization.
//!
//! `string()` renders variables by their own number and records/functions in
//! declaration order. `canonical_string()` first renumbers variables in the
//! order a pre-order walk meets them, visiting record properties and
//! function arguments sorted by name, and renders the sorted views. That
//! canonical form is the definition of type equality.

use rustc_hash::FxHashMap;
use sluice_diagnostic::Result;

use super::{Kind, MonoType};

type VarMap = FxHashMap<u64, u64>;

impl MonoType {
    pub fn string(&self) -> String {
        let mut out = String::new();
        write_type(self, &mut out, None);
        out
    }

    pub fn canonical_string(&self) -> String {
        let mut vars = VarMap::default();
        collect_vars(self, &mut vars);
        let mut out = String::new();
        write_type(self, &mut out, Some(&vars));
        out
    }
}

/// Display name of variable `num`: `A`..`J`, then `t10`, `t11`, ...
pub(crate) fn var_name(num: u64) -> String {
    match u8::try_from(num) {
        Ok(n) if n < 10 => char::from(b'A' + n).to_string(),
        _ => format!("t{num}"),
    }
}

fn collect_vars(t: &MonoType, vars: &mut VarMap) {
    // Unreadable parts are skipped here and surface while rendering.
    let _ = sluice_stack::ensure_sufficient_stack(|| collect_vars_inner(t, vars));
}

fn collect_vars_inner(t: &MonoType, vars: &mut VarMap) -> Result<()> {
    match t.kind() {
        Kind::Basic => {}
        Kind::Var => {
            let num = t.var_num()?;
            let next = vars.len() as u64;
            vars.entry(num).or_insert(next);
        }
        Kind::Arr => collect_vars(&t.elem_type()?, vars),
        Kind::Record => {
            for p in t.sorted_properties()? {
                collect_vars(&p.type_of()?, vars);
            }
            if let Some(tv) = t.extends()? {
                collect_vars(&tv, vars);
            }
        }
        Kind::Fun => {
            for a in t.sorted_arguments()? {
                collect_vars(&a.type_of()?, vars);
            }
            collect_vars(&t.return_type()?, vars);
        }
        Kind::Dict => {
            collect_vars(&t.key_type()?, vars);
            collect_vars(&t.value_type()?, vars);
        }
    }
    Ok(())
}

/// Render `t`, replacing any unreadable part with a `<message>` token.
fn write_type(t: &MonoType, out: &mut String, vars: Option<&VarMap>) {
    sluice_stack::ensure_sufficient_stack(|| {
        if let Err(e) = write_inner(t, out, vars) {
            out.push('<');
            out.push_str(e.message());
            out.push('>');
        }
    });
}

fn write_inner(t: &MonoType, out: &mut String, vars: Option<&VarMap>) -> Result<()> {
    let canonical = vars.is_some();
    match t.kind() {
        Kind::Basic => out.push_str(t.basic()?.as_str()),
        Kind::Var => {
            let num = t.var_num()?;
            let num = vars.and_then(|m| m.get(&num).copied()).unwrap_or(num);
            out.push_str(&var_name(num));
        }
        Kind::Arr => {
            out.push('[');
            write_type(&t.elem_type()?, out, vars);
            out.push(']');
        }
        Kind::Dict => {
            out.push('[');
            write_type(&t.key_type()?, out, vars);
            out.push_str(": ");
            write_type(&t.value_type()?, out, vars);
            out.push(']');
        }
        Kind::Record => {
            let props = if canonical {
                t.sorted_properties()?
            } else {
                t.properties()?
            };
            out.push('{');
            if let Some(tv) = t.extends()? {
                write_type(&tv, out, vars);
                out.push_str(" with ");
            }
            for (i, p) in props.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(p.name()?);
                out.push_str(": ");
                write_type(&p.type_of()?, out, vars);
            }
            out.push('}');
        }
        Kind::Fun => {
            let args = if canonical {
                t.sorted_arguments()?
            } else {
                t.arguments()?
            };
            out.push('(');
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let name = a.name()?;
                if a.is_optional() {
                    out.push('?');
                } else if a.is_pipe() && name != sluice_ir::PIPE_PLACEHOLDER {
                    out.push_str("<-");
                }
                out.push_str(name);
                out.push_str(": ");
                write_type(&a.type_of()?, out, vars);
            }
            out.push_str(") => ");
            write_type(&t.return_type()?, out, vars);
        }
    }
    Ok(())
}
