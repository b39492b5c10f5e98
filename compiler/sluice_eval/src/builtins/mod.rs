//! Native builtins and the catalog that registers them.
//!
//! A builtin declares its [`MonoType`]; the interpreter registers that type
//! with the type checker and binds the function in the top-level scope.
//! Arguments are matched by name against the declared parameters before the
//! native implementation runs, so implementations only read them.

use std::sync::Arc;

use sluice_diagnostic::{Error, Result};
use sluice_ir::{SourceLocation, Symbol};
use sluice_types::{ArgumentType, MonoType};

use crate::stack::CallStack;
use crate::value::{BuiltinFn, BuiltinFunction, DictValue, Value};

/// What a builtin can see of the call invoking it.
pub struct CallContext<'a> {
    pub stack: &'a CallStack,
    pub location: &'a SourceLocation,
    /// Type inference assigned to the call expression.
    pub ret_type: &'a MonoType,
}

/// Call arguments matched against a builtin's parameters.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Vec<(Symbol, Value)>,
}

impl Arguments {
    /// Match `args` and the piped value against the parameters of `ty`.
    ///
    /// The piped value fills the pipe parameter, if there is one, and is
    /// ignored otherwise.
    pub(crate) fn bind(
        ty: &MonoType,
        args: Vec<(Symbol, Value)>,
        piped: Option<Value>,
    ) -> Result<Self> {
        let mut params = Vec::new();
        for arg in ty.arguments()? {
            params.push((arg.name()?.to_owned(), arg.is_pipe(), arg.is_optional()));
        }

        let mut values: Vec<(Symbol, Value)> = Vec::with_capacity(params.len());
        for (name, value) in args {
            if !params.iter().any(|(p, _, _)| *p == name.as_str()) {
                return Err(Error::invalid(format!("unexpected argument \"{name}\"")));
            }
            if values.iter().any(|(n, _)| *n == name) {
                return Err(Error::duplicate_argument(name.as_str()));
            }
            values.push((name, value));
        }

        if let (Some(value), Some((pipe, _, _))) = (piped, params.iter().find(|(_, p, _)| *p)) {
            if values.iter().any(|(n, _)| n.as_str() == pipe.as_str()) {
                return Err(Error::duplicate_argument(pipe));
            }
            values.push((Symbol::new(pipe), value));
        }

        for (name, _, optional) in &params {
            if !optional && !values.iter().any(|(n, _)| n.as_str() == name.as_str()) {
                return Err(Error::missing_argument(name));
            }
        }
        Ok(Arguments { values })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }

    pub fn required(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| Error::missing_argument(name))
    }

    pub fn dict(&self, name: &str) -> Result<&DictValue> {
        match self.required(name)? {
            Value::Dict(d) => Ok(d),
            other => Err(Error::type_mismatch(format!(
                "argument \"{name}\" must be a dictionary, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered set of builtins available to an interpreter.
#[derive(Clone, Debug, Default)]
pub struct BuiltinCatalog {
    builtins: Vec<Arc<BuiltinFunction>>,
}

impl BuiltinCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtins every interpreter starts with.
    pub fn standard() -> Self {
        let k = MonoType::new_var(0);
        let v = MonoType::new_var(1);
        let kv = MonoType::new_dict(&k, &v);
        let a = MonoType::new_var(0);

        BuiltinCatalog::new()
            .with(
                "get",
                MonoType::new_function(
                    &v,
                    &[
                        ArgumentType::required("dict", kv.clone()),
                        ArgumentType::required("key", k.clone()),
                        ArgumentType::required("default", v.clone()),
                    ],
                ),
                false,
                dict_get,
            )
            .with(
                "insert",
                MonoType::new_function(
                    &kv,
                    &[
                        ArgumentType::required("dict", kv.clone()),
                        ArgumentType::required("key", k.clone()),
                        ArgumentType::required("value", v.clone()),
                    ],
                ),
                false,
                dict_insert,
            )
            .with(
                "remove",
                MonoType::new_function(
                    &kv,
                    &[
                        ArgumentType::required("dict", kv.clone()),
                        ArgumentType::required("key", k),
                    ],
                ),
                false,
                dict_remove,
            )
            .with("fail", MonoType::new_function(&a, &[]), false, fail)
            .with(
                "yield",
                MonoType::new_function(&a, &[ArgumentType::pipe("v", a.clone())]),
                true,
                yield_value,
            )
            .with(
                "makeRecord",
                MonoType::new_function(&v, &[ArgumentType::required("o", a.clone())]),
                false,
                make_record,
            )
    }

    /// Add a builtin, replacing any existing one with the same name.
    #[must_use]
    pub fn with(mut self, name: &str, ty: MonoType, side_effect: bool, func: BuiltinFn) -> Self {
        let builtin = Arc::new(BuiltinFunction {
            name: Symbol::new(name),
            ty,
            side_effect,
            func,
        });
        match self.builtins.iter_mut().find(|b| b.name == name) {
            Some(slot) => *slot = builtin,
            None => self.builtins.push(builtin),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<BuiltinFunction>> {
        self.builtins.iter().find(|b| b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BuiltinFunction>> {
        self.builtins.iter()
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }
}

fn dict_get(_: &CallContext<'_>, args: &Arguments) -> Result<Value> {
    let dict = args.dict("dict")?;
    let key = args.required("key")?;
    match dict.get(key) {
        Some(v) => Ok(v.clone()),
        None => args.required("default").cloned(),
    }
}

fn dict_insert(ctx: &CallContext<'_>, args: &Arguments) -> Result<Value> {
    let dict = args.dict("dict")?;
    let key = args.required("key")?.clone();
    let value = args.required("value")?.clone();
    let dict = dict.insert(ctx.ret_type.clone(), key, value);
    Ok(Value::Dict(Arc::new(dict)))
}

fn dict_remove(ctx: &CallContext<'_>, args: &Arguments) -> Result<Value> {
    let dict = args.dict("dict")?;
    let key = args.required("key")?;
    Ok(Value::Dict(Arc::new(dict.remove(ctx.ret_type.clone(), key))))
}

fn fail(_: &CallContext<'_>, _: &Arguments) -> Result<Value> {
    Err(Error::invalid("fail was called"))
}

/// The interpreter records the result of every side-effecting call, so
/// yielding is returning the piped value.
fn yield_value(_: &CallContext<'_>, args: &Arguments) -> Result<Value> {
    args.required("v").cloned()
}

fn make_record(_: &CallContext<'_>, args: &Arguments) -> Result<Value> {
    args.required("o").cloned()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests unwrap successful builtin calls")]
mod tests;
