//! Buffer-backed monotypes.
//!
//! A [`MonoType`] is a view (`buffer`, `offset`) into an immutable byte
//! buffer. Cloning a `MonoType` or reading a child type never copies bytes;
//! only composing a new type through a [`TypeBuilder`] does.
//!
//! # Encoding
//!
//! Nodes are written children-first, so every reference points backwards.
//! References are stored as the distance from the referring node's tag byte
//! back to the referenced node, which keeps a buffer prefix self-contained:
//! copying the bytes up to the end of a node copies its whole subtree with
//! every reference still valid. All integers are little-endian.
//!
//! | Tag    | Layout after the tag byte                                          |
//! |--------|--------------------------------------------------------------------|
//! | Basic  | `scalar: u8`                                                       |
//! | Var    | `num: u64`                                                         |
//! | Arr    | `elem: u32`                                                        |
//! | Dict   | `key: u32`, `value: u32`                                           |
//! | Record | `extends: u32` (0 = closed), `count: u32`, `count × (name: u32, type: u32)` |
//! | Fun    | `retn: u32`, `count: u32`, `count × (name: u32, type: u32, flags: u8)`     |
//!
//! Names are `len: u32` followed by UTF-8 bytes.

mod builder;
mod format;

pub use builder::{Slot, TypeBuilder};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use sluice_diagnostic::{Error, Result};
use sluice_ir::Symbol;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub(crate) enum Tag {
    Basic = 1,
    Var = 2,
    Arr = 3,
    Record = 4,
    Fun = 5,
    Dict = 6,
}

impl Tag {
    fn from_u8(b: u8) -> Option<Tag> {
        Some(match b {
            1 => Tag::Basic,
            2 => Tag::Var,
            3 => Tag::Arr,
            4 => Tag::Record,
            5 => Tag::Fun,
            6 => Tag::Dict,
            _ => return None,
        })
    }
}

pub(crate) const ARG_PIPE: u8 = 0b01;
pub(crate) const ARG_OPTIONAL: u8 = 0b10;

const HEADER: usize = 9;
const RECORD_ENTRY: usize = 8;
const FUN_ENTRY: usize = 9;

/// The shape a [`MonoType`] has.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Basic,
    Var,
    Arr,
    Record,
    Fun,
    Dict,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Basic => "basic",
            Kind::Var => "variable",
            Kind::Arr => "array",
            Kind::Record => "record",
            Kind::Fun => "function",
            Kind::Dict => "dictionary",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BasicType {
    Bool = 0,
    Int = 1,
    Uint = 2,
    Float = 3,
    String = 4,
    Duration = 5,
    Time = 6,
    Regexp = 7,
    Bytes = 8,
}

impl BasicType {
    pub const ALL: [BasicType; 9] = [
        BasicType::Bool,
        BasicType::Int,
        BasicType::Uint,
        BasicType::Float,
        BasicType::String,
        BasicType::Duration,
        BasicType::Time,
        BasicType::Regexp,
        BasicType::Bytes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BasicType::Bool => "bool",
            BasicType::Int => "int",
            BasicType::Uint => "uint",
            BasicType::Float => "float",
            BasicType::String => "string",
            BasicType::Duration => "duration",
            BasicType::Time => "time",
            BasicType::Regexp => "regexp",
            BasicType::Bytes => "bytes",
        }
    }

    fn from_u8(b: u8) -> Option<BasicType> {
        BasicType::ALL.get(usize::from(b)).copied()
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Raw reads. Every read is bounds-checked; a bad buffer is an internal error.

#[cold]
fn truncated() -> Error {
    Error::internal("type buffer is truncated")
}

fn read_u8(buf: &[u8], at: usize) -> Result<u8> {
    buf.get(at).copied().ok_or_else(truncated)
}

fn read_u32(buf: &[u8], at: usize) -> Result<u32> {
    let bytes: [u8; 4] = buf
        .get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(truncated)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_u64(buf: &[u8], at: usize) -> Result<u64> {
    let bytes: [u8; 8] = buf
        .get(at..at + 8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(truncated)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Follow the backward reference stored at `at` for the node at `node`.
fn read_ref(buf: &[u8], node: u32, at: usize) -> Result<u32> {
    let delta = read_u32(buf, at)?;
    if delta == 0 || delta > node {
        return Err(Error::internal(format!(
            "type buffer reference at {at} points outside the buffer"
        )));
    }
    Ok(node - delta)
}

fn read_name(buf: &[u8], pos: u32) -> Result<&str> {
    let start = pos as usize + 4;
    let len = read_u32(buf, pos as usize)? as usize;
    let bytes = buf.get(start..start + len).ok_or_else(truncated)?;
    std::str::from_utf8(bytes).map_err(|_| Error::internal("type buffer name is not UTF-8"))
}

fn read_tag(buf: &[u8], pos: u32) -> Result<Tag> {
    let b = read_u8(buf, pos as usize)?;
    Tag::from_u8(b).ok_or_else(|| Error::internal(format!("unknown type tag {b} at {pos}")))
}

/// One node's end offset, exclusive.
fn node_end(buf: &[u8], pos: u32, tag: Tag) -> Result<usize> {
    let pos = pos as usize;
    Ok(match tag {
        Tag::Basic => pos + 2,
        Tag::Var | Tag::Dict => pos + 9,
        Tag::Arr => pos + 5,
        Tag::Record => pos + HEADER + read_u32(buf, pos + 5)? as usize * RECORD_ENTRY,
        Tag::Fun => pos + HEADER + read_u32(buf, pos + 5)? as usize * FUN_ENTRY,
    })
}

/// An immutable monomorphic type.
///
/// Equality is defined by [`MonoType::canonical_string`]: two types are
/// equal when they render identically after renumbering type variables in
/// first-occurrence order.
#[derive(Clone)]
pub struct MonoType {
    buf: Arc<[u8]>,
    pos: u32,
    tag: Tag,
}

impl MonoType {
    /// Adopt an externally produced buffer with its root node at `root`.
    ///
    /// The whole tree reachable from `root` is validated, so accessors on
    /// the result only fail for kind or index errors.
    pub fn from_buffer(buf: impl Into<Arc<[u8]>>, root: u32) -> Result<MonoType> {
        let buf = buf.into();
        let t = MonoType::at(&buf, root)?;
        t.validate()?;
        Ok(t)
    }

    fn at(buf: &Arc<[u8]>, pos: u32) -> Result<MonoType> {
        let tag = read_tag(buf, pos)?;
        node_end(buf, pos, tag).and_then(|end| {
            if end > buf.len() {
                Err(truncated())
            } else {
                Ok(())
            }
        })?;
        Ok(MonoType {
            buf: Arc::clone(buf),
            pos,
            tag,
        })
    }

    fn child(&self, at: usize) -> Result<MonoType> {
        let pos = read_ref(&self.buf, self.pos, at)?;
        MonoType::at(&self.buf, pos)
    }

    fn validate(&self) -> Result<()> {
        sluice_stack::ensure_sufficient_stack(|| match self.kind() {
            Kind::Basic => self.basic().map(|_| ()),
            Kind::Var => self.var_num().map(|_| ()),
            Kind::Arr => self.elem_type()?.validate(),
            Kind::Dict => {
                self.key_type()?.validate()?;
                self.value_type()?.validate()
            }
            Kind::Record => {
                for p in self.properties()? {
                    p.name()?;
                    p.type_of()?.validate()?;
                }
                match self.extends()? {
                    Some(tv) => tv.validate(),
                    None => Ok(()),
                }
            }
            Kind::Fun => {
                for a in self.arguments()? {
                    a.name()?;
                    a.type_of()?.validate()?;
                }
                self.return_type()?.validate()
            }
        })
    }

    /// The encoded bytes this type is a view into.
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    /// Offset of this type's root node inside [`MonoType::buffer`].
    pub fn offset(&self) -> u32 {
        self.pos
    }

    /// End of this type's subtree inside the buffer.
    pub(crate) fn encoded_end(&self) -> usize {
        node_end(&self.buf, self.pos, self.tag).unwrap_or(self.buf.len())
    }

    pub(crate) fn tag(&self) -> Tag {
        self.tag
    }

    pub fn kind(&self) -> Kind {
        match self.tag {
            Tag::Basic => Kind::Basic,
            Tag::Var => Kind::Var,
            Tag::Arr => Kind::Arr,
            Tag::Record => Kind::Record,
            Tag::Fun => Kind::Fun,
            Tag::Dict => Kind::Dict,
        }
    }

    fn expect_kind(&self, kind: Kind, what: &str) -> Result<()> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(Error::type_mismatch(format!(
                "cannot read {what} of {} type {}, expected {kind} type",
                self.kind(),
                self.string()
            )))
        }
    }

    fn field(&self, offset: usize) -> usize {
        self.pos as usize + offset
    }

    pub fn basic(&self) -> Result<BasicType> {
        self.expect_kind(Kind::Basic, "basic type")?;
        let b = read_u8(&self.buf, self.field(1))?;
        BasicType::from_u8(b).ok_or_else(|| Error::internal(format!("unknown basic type {b}")))
    }

    pub fn var_num(&self) -> Result<u64> {
        self.expect_kind(Kind::Var, "variable number")?;
        read_u64(&self.buf, self.field(1))
    }

    pub fn elem_type(&self) -> Result<MonoType> {
        self.expect_kind(Kind::Arr, "element type")?;
        self.child(self.field(1))
    }

    pub fn key_type(&self) -> Result<MonoType> {
        self.expect_kind(Kind::Dict, "key type")?;
        self.child(self.field(1))
    }

    pub fn value_type(&self) -> Result<MonoType> {
        self.expect_kind(Kind::Dict, "value type")?;
        self.child(self.field(5))
    }

    pub fn return_type(&self) -> Result<MonoType> {
        self.expect_kind(Kind::Fun, "return type")?;
        self.child(self.field(1))
    }

    pub fn num_arguments(&self) -> Result<usize> {
        self.expect_kind(Kind::Fun, "arguments")?;
        Ok(read_u32(&self.buf, self.field(5))? as usize)
    }

    pub fn argument(&self, i: usize) -> Result<Argument> {
        let n = self.num_arguments()?;
        if i >= n {
            return Err(Error::out_of_range(format!(
                "argument index {i} out of range [0, {n})"
            )));
        }
        let entry = self.field(HEADER + i * FUN_ENTRY);
        Ok(Argument {
            buf: Arc::clone(&self.buf),
            name: read_ref(&self.buf, self.pos, entry)?,
            ty: read_ref(&self.buf, self.pos, entry + 4)?,
            flags: read_u8(&self.buf, entry + 8)?,
        })
    }

    /// Arguments in declaration order.
    pub fn arguments(&self) -> Result<Vec<Argument>> {
        (0..self.num_arguments()?).map(|i| self.argument(i)).collect()
    }

    /// Arguments sorted by name.
    pub fn sorted_arguments(&self) -> Result<Vec<Argument>> {
        let mut args = self.arguments()?;
        for a in &args {
            a.name()?;
        }
        args.sort_by(|a, b| a.name().unwrap_or_default().cmp(b.name().unwrap_or_default()));
        Ok(args)
    }

    /// The argument marked pipe, if any.
    pub fn pipe_argument(&self) -> Result<Option<Argument>> {
        Ok(self.arguments()?.into_iter().find(Argument::is_pipe))
    }

    pub fn num_properties(&self) -> Result<usize> {
        self.expect_kind(Kind::Record, "properties")?;
        Ok(read_u32(&self.buf, self.field(5))? as usize)
    }

    pub fn property(&self, i: usize) -> Result<Property> {
        let n = self.num_properties()?;
        if i >= n {
            return Err(Error::out_of_range(format!(
                "property index {i} out of range [0, {n})"
            )));
        }
        let entry = self.field(HEADER + i * RECORD_ENTRY);
        Ok(Property {
            buf: Arc::clone(&self.buf),
            name: read_ref(&self.buf, self.pos, entry)?,
            ty: read_ref(&self.buf, self.pos, entry + 4)?,
        })
    }

    /// Properties in insertion order, duplicates included.
    pub fn properties(&self) -> Result<Vec<Property>> {
        (0..self.num_properties()?).map(|i| self.property(i)).collect()
    }

    /// Properties sorted by name. Duplicate names keep their relative order.
    pub fn sorted_properties(&self) -> Result<Vec<Property>> {
        let mut props = self.properties()?;
        for p in &props {
            p.name()?;
        }
        props.sort_by(|a, b| a.name().unwrap_or_default().cmp(b.name().unwrap_or_default()));
        Ok(props)
    }

    /// The row variable of an open record; `None` for a closed record.
    pub fn extends(&self) -> Result<Option<MonoType>> {
        self.expect_kind(Kind::Record, "extends")?;
        if read_u32(&self.buf, self.field(1))? == 0 {
            return Ok(None);
        }
        self.child(self.field(1)).map(Some)
    }

    // Construction. Each call is one builder session.

    pub fn new_basic(basic: BasicType) -> MonoType {
        let mut b = TypeBuilder::new();
        let root = b.basic(basic);
        b.finish(root)
    }

    pub fn new_var(num: u64) -> MonoType {
        let mut b = TypeBuilder::new();
        let root = b.var(num);
        b.finish(root)
    }

    pub fn new_array(elem: &MonoType) -> MonoType {
        let mut b = TypeBuilder::new();
        let elem = b.copy(elem);
        let root = b.array(elem);
        b.finish(root)
    }

    pub fn new_dict(key: &MonoType, value: &MonoType) -> MonoType {
        let mut b = TypeBuilder::new();
        let key = b.copy(key);
        let value = b.copy(value);
        let root = b.dict(key, value);
        b.finish(root)
    }

    pub fn new_function(retn: &MonoType, args: &[ArgumentType]) -> MonoType {
        let mut b = TypeBuilder::new();
        let slots: Vec<_> = args
            .iter()
            .map(|a| (a.name.as_str(), b.copy(&a.ty), a.pipe, a.optional))
            .collect();
        let retn = b.copy(retn);
        let root = b.function(retn, &slots);
        b.finish(root)
    }

    pub fn new_object(props: &[PropertyType]) -> MonoType {
        Self::extend_object(props, None)
    }

    /// An object type, open over the row variable `extends` when given.
    pub fn extend_object(props: &[PropertyType], extends: Option<u64>) -> MonoType {
        let mut b = TypeBuilder::new();
        let slots: Vec<_> = props
            .iter()
            .map(|p| (p.name.as_str(), b.copy(&p.ty)))
            .collect();
        let root = b.record(&slots, extends);
        b.finish(root)
    }
}

impl From<BasicType> for MonoType {
    fn from(basic: BasicType) -> Self {
        MonoType::new_basic(basic)
    }
}

impl PartialEq for MonoType {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.buf, &other.buf) && self.pos == other.pos)
            || self.canonical_string() == other.canonical_string()
    }
}

impl Eq for MonoType {}

impl Hash for MonoType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_string().hash(state);
    }
}

impl fmt::Display for MonoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}

impl fmt::Debug for MonoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonoType({})", self.string())
    }
}

/// A function argument, read in place from its function type's buffer.
#[derive(Clone)]
pub struct Argument {
    buf: Arc<[u8]>,
    name: u32,
    ty: u32,
    flags: u8,
}

impl Argument {
    pub fn name(&self) -> Result<&str> {
        read_name(&self.buf, self.name)
    }

    pub fn type_of(&self) -> Result<MonoType> {
        MonoType::at(&self.buf, self.ty)
    }

    pub fn is_pipe(&self) -> bool {
        self.flags & ARG_PIPE != 0
    }

    pub fn is_optional(&self) -> bool {
        self.flags & ARG_OPTIONAL != 0
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name().unwrap_or("<invalid>"))
            .field("pipe", &self.is_pipe())
            .field("optional", &self.is_optional())
            .finish_non_exhaustive()
    }
}

/// A record property, read in place from its record type's buffer.
#[derive(Clone)]
pub struct Property {
    buf: Arc<[u8]>,
    name: u32,
    ty: u32,
}

impl Property {
    pub fn name(&self) -> Result<&str> {
        read_name(&self.buf, self.name)
    }

    pub fn type_of(&self) -> Result<MonoType> {
        MonoType::at(&self.buf, self.ty)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name().unwrap_or("<invalid>"))
            .finish_non_exhaustive()
    }
}

/// Input to [`MonoType::new_function`].
#[derive(Clone, Debug)]
pub struct ArgumentType {
    pub name: Symbol,
    pub ty: MonoType,
    pub pipe: bool,
    pub optional: bool,
}

impl ArgumentType {
    pub fn required(name: impl Into<Symbol>, ty: MonoType) -> Self {
        ArgumentType {
            name: name.into(),
            ty,
            pipe: false,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<Symbol>, ty: MonoType) -> Self {
        ArgumentType {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    pub fn pipe(name: impl Into<Symbol>, ty: MonoType) -> Self {
        ArgumentType {
            pipe: true,
            ..Self::required(name, ty)
        }
    }
}

/// Input to [`MonoType::new_object`] and [`MonoType::extend_object`].
#[derive(Clone, Debug)]
pub struct PropertyType {
    pub name: Symbol,
    pub ty: MonoType,
}

impl PropertyType {
    pub fn new(name: impl Into<Symbol>, ty: MonoType) -> Self {
        PropertyType {
            name: name.into(),
            ty,
        }
    }
}
