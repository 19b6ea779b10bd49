// Licensed under the Apache-2.0 license

//! The attribute list.
//!
//! Fields live in a fixed-capacity arena and are linked in encoding order.
//! Links are arena indices, so a `FieldRef` stays valid until the field it
//! names is removed.

use crate::{
    dn::EncodedDn,
    error::AttributeError,
    field_id::FieldId,
    oid::EncodedOid,
    table::EntryRef,
    ENCODING_FIFO_SIZE, ITERATIONS_LARGE, MAX_ATTRIBUTE_FIELDS, MAX_FIELD_DATA_SIZE,
};
use arrayvec::ArrayVec;
use bitflags::bitflags;

/// Index of a field in its list's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldRef(usize);

impl FieldRef {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldFlags(u16);

bitflags! {
    impl FieldFlags: u16 {
        const CRITICAL = 1 << 0;
        /// Field can't be deleted
        const LOCKED = 1 << 1;
        /// Unrecognised attribute held as an OID and encoded value
        const BLOB = 1 << 2;
        /// Value was supplied pre-encoded and isn't type checked
        const BLOB_PAYLOAD = 1 << 3;
        const MULTIVALUED = 1 << 4;
        /// Value equals the table default and isn't encoded
        const DEFAULT_VALUE = 1 << 5;
        /// Decoded but not acted on, see `ComplianceLevel`
        const IGNORED = 1 << 6;
    }
}

/// One wrapper level recorded by the validation pass: the table entry that
/// writes the wrapper and the size of what it wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoEntry {
    pub size: usize,
    pub entry: EntryRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Integer-like types, booleans, bit masks and CHOICE selectors
    Integer(i64),
    /// Seconds since the Unix epoch
    Time(i64),
    Dn(EncodedDn),
    /// Strings, OIDs (complete DER) and blobs
    Bytes(ArrayVec<u8, MAX_FIELD_DATA_SIZE>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Integer(0)
    }
}

impl FieldValue {
    pub fn from_bytes(bytes: &[u8]) -> Result<FieldValue, AttributeError> {
        let mut data = ArrayVec::new();
        data.try_extend_from_slice(bytes)
            .map_err(|_| AttributeError::ValueTooLarge)?;
        Ok(FieldValue::Bytes(data))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<i64> {
        match self {
            FieldValue::Time(time) => Some(*time),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_dn(&self) -> Option<&EncodedDn> {
        match self {
            FieldValue::Dn(dn) => Some(dn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttributeField {
    pub attribute_id: FieldId,
    pub field_id: FieldId,
    /// GeneralName component for sub-typed fields
    pub sub_field_id: FieldId,
    /// Table entry matched by the validation pass
    pub entry: Option<EntryRef>,
    pub encoded_size: usize,
    pub flags: FieldFlags,
    /// Wrappers written before the value, innermost first
    pub fifo: ArrayVec<FifoEntry, ENCODING_FIFO_SIZE>,
    /// Number of `fifo` entries not yet written
    pub fifo_pos: usize,
    pub value: FieldValue,
    /// OID of a blob attribute
    pub oid: Option<EncodedOid>,
    prev: Option<FieldRef>,
    next: Option<FieldRef>,
}

impl AttributeField {
    pub fn new(attribute_id: FieldId, field_id: FieldId) -> AttributeField {
        AttributeField {
            attribute_id,
            field_id,
            sub_field_id: FieldId::NONE,
            entry: None,
            encoded_size: 0,
            flags: FieldFlags::empty(),
            fifo: ArrayVec::new(),
            fifo_pos: 0,
            value: FieldValue::default(),
            oid: None,
            prev: None,
            next: None,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.flags.contains(FieldFlags::BLOB)
    }

    pub fn is_critical(&self) -> bool {
        self.flags.contains(FieldFlags::CRITICAL)
    }

    pub fn is_locked(&self) -> bool {
        self.flags.contains(FieldFlags::LOCKED)
    }

    pub fn prev(&self) -> Option<FieldRef> {
        self.prev
    }

    pub fn next(&self) -> Option<FieldRef> {
        self.next
    }

    /// Whether `other` belongs to the same attribute. Each blob is an
    /// attribute of its own.
    pub fn same_attribute(&self, other: &AttributeField) -> bool {
        if self.is_blob() || other.is_blob() {
            return self.is_blob() && other.is_blob() && self.oid == other.oid;
        }
        self.attribute_id == other.attribute_id
    }

    /// Clear everything the validation pass records
    pub(crate) fn reset_encoding_info(&mut self) {
        self.entry = None;
        self.encoded_size = 0;
        self.fifo.clear();
        self.fifo_pos = 0;
        self.flags.remove(FieldFlags::DEFAULT_VALUE);
    }
}

pub struct AttributeList {
    slots: ArrayVec<Option<AttributeField>, MAX_ATTRIBUTE_FIELDS>,
    head: Option<FieldRef>,
    tail: Option<FieldRef>,
    len: usize,
}

impl Default for AttributeList {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeList {
    pub fn new() -> AttributeList {
        AttributeList {
            slots: ArrayVec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<FieldRef> {
        self.head
    }

    pub fn tail(&self) -> Option<FieldRef> {
        self.tail
    }

    pub fn get(&self, field_ref: FieldRef) -> Option<&AttributeField> {
        self.slots.get(field_ref.0).and_then(Option::as_ref)
    }

    /// Like [`AttributeList::get`], for references that must be live
    pub fn field(&self, field_ref: FieldRef) -> Result<&AttributeField, AttributeError> {
        self.get(field_ref).ok_or(AttributeError::InternalError)
    }

    pub fn field_mut(&mut self, field_ref: FieldRef) -> Result<&mut AttributeField, AttributeError> {
        self.slots
            .get_mut(field_ref.0)
            .and_then(Option::as_mut)
            .ok_or(AttributeError::InternalError)
    }

    pub fn next(&self, field_ref: FieldRef) -> Option<FieldRef> {
        self.get(field_ref).and_then(|field| field.next)
    }

    pub fn prev(&self, field_ref: FieldRef) -> Option<FieldRef> {
        self.get(field_ref).and_then(|field| field.prev)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    fn allocate(&mut self, field: AttributeField) -> Result<FieldRef, AttributeError> {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(field);
            return Ok(FieldRef(index));
        }
        self.slots
            .try_push(Some(field))
            .map_err(|_| AttributeError::ListFull)?;

        Ok(FieldRef(self.slots.len() - 1))
    }

    /// Link `field` in after `after`, or at the head of the list
    pub fn insert_after(
        &mut self,
        after: Option<FieldRef>,
        mut field: AttributeField,
    ) -> Result<FieldRef, AttributeError> {
        let next = match after {
            Some(after) => self.field(after)?.next,
            None => self.head,
        };
        field.prev = after;
        field.next = next;
        let new_ref = self.allocate(field)?;

        match after {
            Some(after) => self.field_mut(after)?.next = Some(new_ref),
            None => self.head = Some(new_ref),
        }
        match next {
            Some(next) => self.field_mut(next)?.prev = Some(new_ref),
            None => self.tail = Some(new_ref),
        }
        self.len += 1;

        Ok(new_ref)
    }

    pub fn push_back(&mut self, field: AttributeField) -> Result<FieldRef, AttributeError> {
        self.insert_after(self.tail, field)
    }

    /// Unlink and return a field
    pub fn remove(&mut self, field_ref: FieldRef) -> Result<AttributeField, AttributeError> {
        let field = self
            .slots
            .get_mut(field_ref.0)
            .and_then(Option::take)
            .ok_or(AttributeError::InternalError)?;

        match field.prev {
            Some(prev) => self.field_mut(prev)?.next = field.next,
            None => self.head = field.next,
        }
        match field.next {
            Some(next) => self.field_mut(next)?.prev = field.prev,
            None => self.tail = field.prev,
        }
        self.len -= 1;

        Ok(field)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// First field of the attribute that `field_ref` belongs to
    pub fn attribute_head(&self, field_ref: FieldRef) -> Result<FieldRef, AttributeError> {
        let field = self.field(field_ref)?;
        let mut head = field_ref;
        for _ in 0..ITERATIONS_LARGE {
            match self.prev(head) {
                Some(prev) if self.field(prev)?.same_attribute(field) => head = prev,
                _ => return Ok(head),
            }
        }

        Err(AttributeError::IterationLimit)
    }

    /// The field after the last field of the attribute starting at `head`
    pub fn next_attribute(&self, head: FieldRef) -> Result<Option<FieldRef>, AttributeError> {
        let field = self.field(head)?;
        let mut cursor = self.next(head);
        for _ in 0..ITERATIONS_LARGE {
            match cursor {
                Some(next) if self.field(next)?.same_attribute(field) => cursor = self.next(next),
                _ => return Ok(cursor),
            }
        }

        Err(AttributeError::IterationLimit)
    }

    pub fn set_locked(&mut self, field_ref: FieldRef, locked: bool) -> Result<(), AttributeError> {
        self.field_mut(field_ref)?
            .flags
            .set(FieldFlags::LOCKED, locked);
        Ok(())
    }

    /// Mark every field of an attribute critical or not
    pub fn set_critical(&mut self, field_ref: FieldRef, critical: bool) -> Result<(), AttributeError> {
        let mut cursor = Some(self.attribute_head(field_ref)?);
        let end = self.next_attribute(self.attribute_head(field_ref)?)?;
        while let Some(current) = cursor {
            if Some(current) == end {
                break;
            }
            self.field_mut(current)?
                .flags
                .set(FieldFlags::CRITICAL, critical);
            cursor = self.next(current);
        }

        Ok(())
    }

    /// Reset what a previous validation pass recorded. The list must be in
    /// attribute order with blobs last.
    pub(crate) fn reset_encoding_info(&mut self) -> Result<(), AttributeError> {
        let mut cursor = self.head;
        let mut last: Option<(FieldId, bool)> = None;
        for _ in 0..=MAX_ATTRIBUTE_FIELDS {
            let Some(current) = cursor else {
                return Ok(());
            };
            let field = self.field_mut(current)?;
            field.reset_encoding_info();
            let is_blob = field.is_blob();
            if let Some((last_id, last_blob)) = last {
                if (last_blob && !is_blob) || (!is_blob && field.field_id < last_id) {
                    return Err(AttributeError::InternalError);
                }
            }
            last = Some((field.field_id, is_blob));
            cursor = field.next;
        }

        Err(AttributeError::IterationLimit)
    }
}

pub struct Iter<'a> {
    list: &'a AttributeList,
    cursor: Option<FieldRef>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (FieldRef, &'a AttributeField);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.cursor?;
        let field = self.list.get(current)?;
        self.cursor = field.next;
        self.remaining -= 1;

        Some((current, field))
    }
}
