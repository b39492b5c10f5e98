//! Type construction sessions.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use sluice_diagnostic::{Error, Result};

use super::{
    read_name, read_ref, read_tag, read_u32, read_u64, read_u8, BasicType, MonoType, Tag,
    ARG_OPTIONAL, ARG_PIPE, FUN_ENTRY, HEADER, RECORD_ENTRY,
};

/// A node written into a [`TypeBuilder`].
///
/// Only meaningful for the builder that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pos: u32,
    tag: Tag,
}

/// An append-only arena for one type-construction session.
///
/// Constituents are written first and composite nodes refer back to them.
/// Existing [`MonoType`]s enter a session through [`TypeBuilder::copy`],
/// which re-encodes their subtree; no reference into another buffer is
/// ever kept. [`TypeBuilder::finish`] seals the arena into an immutable
/// buffer shared by the resulting type and every view read from it.
#[derive(Default)]
pub struct TypeBuilder {
    bytes: Vec<u8>,
}

impl TypeBuilder {
    pub fn new() -> Self {
        TypeBuilder::default()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "type buffers stay far below 4 GiB"
    )]
    fn pos(&self) -> u32 {
        self.bytes.len() as u32
    }

    fn push_u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    /// Store a backward reference from the node at `node` to `target`.
    fn push_ref(&mut self, node: u32, target: u32) {
        self.push_u32(node.saturating_sub(target));
    }

    fn name(&mut self, s: &str) -> u32 {
        let pos = self.pos();
        #[expect(clippy::cast_possible_truncation, reason = "names are short")]
        self.push_u32(s.len() as u32);
        self.bytes.extend_from_slice(s.as_bytes());
        pos
    }

    fn open(&mut self, tag: Tag) -> Slot {
        let pos = self.pos();
        self.bytes.push(tag as u8);
        Slot { pos, tag }
    }

    pub fn basic(&mut self, basic: BasicType) -> Slot {
        let slot = self.open(Tag::Basic);
        self.bytes.push(basic as u8);
        slot
    }

    pub fn var(&mut self, num: u64) -> Slot {
        let slot = self.open(Tag::Var);
        self.bytes.extend_from_slice(&num.to_le_bytes());
        slot
    }

    pub fn array(&mut self, elem: Slot) -> Slot {
        let slot = self.open(Tag::Arr);
        self.push_ref(slot.pos, elem.pos);
        slot
    }

    pub fn dict(&mut self, key: Slot, value: Slot) -> Slot {
        let slot = self.open(Tag::Dict);
        self.push_ref(slot.pos, key.pos);
        self.push_ref(slot.pos, value.pos);
        slot
    }

    /// A record of `(name, type)` pairs, open over row variable `extends`.
    pub fn record(&mut self, props: &[(&str, Slot)], extends: Option<u64>) -> Slot {
        let names: Vec<u32> = props.iter().map(|(name, _)| self.name(name)).collect();
        let extends = extends.map(|num| self.var(num));
        let slot = self.open(Tag::Record);
        match extends {
            Some(tv) => self.push_ref(slot.pos, tv.pos),
            None => self.push_u32(0),
        }
        #[expect(clippy::cast_possible_truncation, reason = "bounded by buffer size")]
        self.push_u32(props.len() as u32);
        for (name, (_, ty)) in names.into_iter().zip(props) {
            self.push_ref(slot.pos, name);
            self.push_ref(slot.pos, ty.pos);
        }
        slot
    }

    /// A function from `(name, type, is_pipe, is_optional)` arguments to `retn`.
    pub fn function(&mut self, retn: Slot, args: &[(&str, Slot, bool, bool)]) -> Slot {
        let names: Vec<u32> = args.iter().map(|(name, ..)| self.name(name)).collect();
        let slot = self.open(Tag::Fun);
        self.push_ref(slot.pos, retn.pos);
        #[expect(clippy::cast_possible_truncation, reason = "bounded by buffer size")]
        self.push_u32(args.len() as u32);
        for (name, &(_, ty, pipe, optional)) in names.into_iter().zip(args) {
            self.push_ref(slot.pos, name);
            self.push_ref(slot.pos, ty.pos);
            let mut flags = 0;
            if pipe {
                flags |= ARG_PIPE;
            }
            if optional {
                flags |= ARG_OPTIONAL;
            }
            self.bytes.push(flags);
        }
        slot
    }

    /// Copy `t` into this session.
    ///
    /// Only the nodes reachable from `t` are written, children first, with
    /// references rebased onto this arena. A node shared within `t` is
    /// written once. A malformed subtree is appended verbatim instead, so
    /// reading the copy reports the same error as reading `t`.
    pub fn copy(&mut self, t: &MonoType) -> Slot {
        let mark = self.bytes.len();
        let mut copied = FxHashMap::default();
        match self.copy_node(&t.buf, t.pos, &mut copied) {
            Ok(slot) => slot,
            Err(_) => {
                self.bytes.truncate(mark);
                let base = self.pos();
                let end = t.encoded_end().min(t.buf.len());
                self.bytes.extend_from_slice(&t.buf[..end]);
                Slot {
                    pos: base + t.pos,
                    tag: t.tag(),
                }
            }
        }
    }

    fn copy_node(
        &mut self,
        buf: &[u8],
        pos: u32,
        copied: &mut FxHashMap<u32, Slot>,
    ) -> Result<Slot> {
        if let Some(&slot) = copied.get(&pos) {
            return Ok(slot);
        }
        let slot =
            sluice_stack::ensure_sufficient_stack(|| self.copy_node_inner(buf, pos, copied))?;
        copied.insert(pos, slot);
        Ok(slot)
    }

    fn copy_node_inner(
        &mut self,
        buf: &[u8],
        pos: u32,
        copied: &mut FxHashMap<u32, Slot>,
    ) -> Result<Slot> {
        let at = pos as usize;
        match read_tag(buf, pos)? {
            Tag::Basic => {
                let b = read_u8(buf, at + 1)?;
                let basic = BasicType::from_u8(b)
                    .ok_or_else(|| Error::internal(format!("unknown basic type {b}")))?;
                Ok(self.basic(basic))
            }
            Tag::Var => Ok(self.var(read_u64(buf, at + 1)?)),
            Tag::Arr => {
                let elem = self.copy_node(buf, read_ref(buf, pos, at + 1)?, copied)?;
                Ok(self.array(elem))
            }
            Tag::Dict => {
                let key = self.copy_node(buf, read_ref(buf, pos, at + 1)?, copied)?;
                let value = self.copy_node(buf, read_ref(buf, pos, at + 5)?, copied)?;
                Ok(self.dict(key, value))
            }
            Tag::Record => {
                let extends = match read_u32(buf, at + 1)? {
                    0 => None,
                    _ => {
                        let tv = read_ref(buf, pos, at + 1)?;
                        if read_tag(buf, tv)? != Tag::Var {
                            return Err(Error::internal("record row is not a type variable"));
                        }
                        Some(read_u64(buf, tv as usize + 1)?)
                    }
                };
                let count = read_u32(buf, at + 5)? as usize;
                let mut props = Vec::with_capacity(count);
                for i in 0..count {
                    let entry = at + HEADER + i * RECORD_ENTRY;
                    let name = read_name(buf, read_ref(buf, pos, entry)?)?;
                    let ty = self.copy_node(buf, read_ref(buf, pos, entry + 4)?, copied)?;
                    props.push((name, ty));
                }
                Ok(self.record(&props, extends))
            }
            Tag::Fun => {
                let count = read_u32(buf, at + 5)? as usize;
                let mut args = Vec::with_capacity(count);
                for i in 0..count {
                    let entry = at + HEADER + i * FUN_ENTRY;
                    let name = read_name(buf, read_ref(buf, pos, entry)?)?;
                    let ty = self.copy_node(buf, read_ref(buf, pos, entry + 4)?, copied)?;
                    let flags = read_u8(buf, entry + 8)?;
                    args.push((name, ty, flags & ARG_PIPE != 0, flags & ARG_OPTIONAL != 0));
                }
                let retn = self.copy_node(buf, read_ref(buf, pos, at + 1)?, copied)?;
                Ok(self.function(retn, &args))
            }
        }
    }

    pub fn finish(self, root: Slot) -> MonoType {
        MonoType {
            buf: Arc::from(self.bytes),
            pos: root.pos,
            tag: root.tag,
        }
    }
}
