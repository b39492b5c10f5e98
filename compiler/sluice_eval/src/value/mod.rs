//! Runtime values.
//!
//! Scalars are stored inline. Composite values sit behind `Arc` and are
//! immutable once built: operations that "modify" a dictionary or record
//! return a new value. Construct composites with the factory methods on
//! [`Value`] so their cached types stay consistent with their contents.
//!
//! Every value knows its [`MonoType`]. Arrays and dictionaries carry the
//! type assigned by inference because an empty collection has no element to
//! derive it from; records derive theirs from their properties.

mod composite;
mod function;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use sluice_ir::{Duration, Regexp, Symbol, Time};
use sluice_types::{BasicType, MonoType};

pub use composite::{ArrayValue, DictValue, ObjectValue, VectorValue};
pub use function::{BuiltinFn, BuiltinFunction, Function, UserFunction};

#[derive(Clone, Debug)]
pub enum Value {
    /// An absent value of a known type.
    Null(MonoType),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(Arc<str>),
    Duration(Duration),
    Time(Time),
    Regexp(Regexp),
    Bytes(Arc<[u8]>),

    Array(Arc<ArrayValue>),
    Object(Arc<ObjectValue>),
    Dict(Arc<DictValue>),
    Function(Function),
    /// A typed column of scalars produced by builtins.
    Vector(Arc<VectorValue>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Bytes(b.into())
    }

    pub fn null(ty: BasicType) -> Self {
        Value::Null(ty.into())
    }

    /// An array of type `ty`, which must be an array type.
    pub fn array(ty: MonoType, elements: Vec<Value>) -> Self {
        Value::Array(Arc::new(ArrayValue { ty, elements }))
    }

    /// A record with properties in the given order.
    pub fn object(properties: Vec<(Symbol, Value)>) -> Self {
        Value::Object(Arc::new(ObjectValue::new(properties)))
    }

    /// A dictionary of type `ty`; later duplicates of a key replace earlier
    /// ones.
    pub fn dict(ty: MonoType, entries: Vec<(Value, Value)>) -> Self {
        Value::Dict(Arc::new(DictValue::new(ty, entries)))
    }

    pub fn vector(elem: BasicType, values: Vec<Value>) -> Self {
        Value::Vector(Arc::new(VectorValue { elem, values }))
    }

    pub fn ty(&self) -> MonoType {
        match self {
            Value::Null(ty) => ty.clone(),
            Value::Bool(_) => BasicType::Bool.into(),
            Value::Int(_) => BasicType::Int.into(),
            Value::UInt(_) => BasicType::Uint.into(),
            Value::Float(_) => BasicType::Float.into(),
            Value::String(_) => BasicType::String.into(),
            Value::Duration(_) => BasicType::Duration.into(),
            Value::Time(_) => BasicType::Time.into(),
            Value::Regexp(_) => BasicType::Regexp.into(),
            Value::Bytes(_) => BasicType::Bytes.into(),
            Value::Array(a) => a.ty.clone(),
            Value::Object(o) => o.ty().clone(),
            Value::Dict(d) => d.ty.clone(),
            Value::Function(f) => f.ty(),
            Value::Vector(v) => MonoType::new_array(&MonoType::from(v.elem)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Name of this value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null(_) => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Duration(_) => "duration",
            Value::Time(_) => "time",
            Value::Regexp(_) => "regexp",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Object(_) => "record",
            Value::Dict(_) => "dictionary",
            Value::Function(_) => "function",
            Value::Vector(_) => "vector",
        }
    }

    /// Total order used to keep dictionary keys sorted.
    ///
    /// Values of the same scalar kind compare naturally (floats by
    /// `total_cmp`); anything else falls back to variant order, then to the
    /// rendered form.
    pub fn compare_keys(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::UInt(a), Value::UInt(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Duration(a), Value::Duration(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            (Value::Regexp(a), Value::Regexp(b)) => a.as_str().cmp(b.as_str()),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            _ => self
                .variant_rank()
                .cmp(&other.variant_rank())
                .then_with(|| self.to_string().cmp(&other.to_string())),
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Value::Null(_) => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::UInt(_) => 3,
            Value::Float(_) => 4,
            Value::String(_) => 5,
            Value::Duration(_) => 6,
            Value::Time(_) => 7,
            Value::Regexp(_) => 8,
            Value::Bytes(_) => 9,
            Value::Array(_) => 10,
            Value::Object(_) => 11,
            Value::Dict(_) => 12,
            Value::Function(_) => 13,
            Value::Vector(_) => 14,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

/// Structural equality. Functions are equal only to themselves and two nulls
/// are equal whatever their type.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null(_), Value::Null(_)) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b) == Some(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Regexp(a), Value::Regexp(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.elements == b.elements,
            (Value::Object(a), Value::Object(b)) => a.properties() == b.properties(),
            (Value::Dict(a), Value::Dict(b)) => a.entries() == b.entries(),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Vector(a), Value::Vector(b)) => a.elem == b.elem && a.values == b.values,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

/// Strings render without quotes at the top level and quoted inside
/// composites.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Duration(d) => write!(f, "{d}"),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)),
            Value::Regexp(r) => write!(f, "{r}"),
            Value::Bytes(b) => {
                f.write_str("0x")?;
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Array(a) => {
                f.write_str("[")?;
                for (i, el) in a.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    el.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Value::Object(o) => {
                f.write_str("{")?;
                for (i, (name, value)) in o.properties().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: ")?;
                    value.fmt_nested(f)?;
                }
                f.write_str("}")
            }
            Value::Dict(d) => {
                if d.is_empty() {
                    return f.write_str("[:]");
                }
                f.write_str("[")?;
                for (i, (k, v)) in d.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.fmt_nested(f)?;
                    f.write_str(": ")?;
                    v.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Value::Function(func) => write!(f, "{func}"),
            Value::Vector(v) => {
                write!(f, "vector<{}>[", v.elem.as_str())?;
                for (i, el) in v.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    el.fmt_nested(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests build values from known-good input")]
mod tests;
