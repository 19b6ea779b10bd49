// Licensed under the Apache-2.0 license

//! Attribute type tables.
//!
//! Each table is a `'static` array describing the ASN.1 structure of every
//! recognised attribute as a flat sequence of entries. A constructed entry
//! opens a nesting level, and `seq_end` on a later entry closes that many
//! levels. The validation pass walks these entries in lock step with the
//! attribute list, so the order of entries is the order of encoding.

#[cfg(feature = "cms")]
pub mod cms;
pub mod extensions;
pub mod general_name;

use crate::{
    asn1::{
        validate_der, BIT_STRING_TAG, BMP_STRING_TAG, BOOL_TAG, CONSTRUCTED, CONTEXT_SPECIFIC,
        ENUMERATED_TAG, GENERALIZE_TIME_TAG, IA5_STRING_TAG, INTEGER_TAG, NULL_TAG,
        NUMERIC_STRING_TAG, OCTET_STRING_TAG, OID_TAG, PRINTABLE_STRING_TAG, SEQUENCE_TAG,
        SET_OF_TAG, UTC_TIME_TAG, UTF8_STRING_TAG,
    },
    config::ComplianceLevel,
    error::{AttributeError, ErrorType},
    field_id::FieldId,
    list::AttributeField,
    oid::validate_oid,
    AttributeKind, ObjectKind, ATTRIBUTE_STACK_SIZE, ITERATIONS_LARGE, MAX_FIELD_DATA_SIZE,
};
use bitflags::bitflags;
use core::fmt;

/// ASN.1 primitive types plus the pseudo-types the encoder interprets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Boolean,
    Integer,
    Enumerated,
    /// Named-bit BIT STRING held as a bit mask
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Utf8String,
    NumericString,
    PrintableString,
    Ia5String,
    BmpString,
    UtcTime,
    GeneralizedTime,
    Sequence,
    Set,
    /// Fixed OID taken from the table, the field carries no value
    Identifier,
    /// Pre-encoded element of any type
    BlobAny,
    BlobBitString,
    BlobSequence,
    /// One of several OIDs, selected by the field's value
    Choice,
    Dn,
    /// Field whose structure is described by a sub-table (GeneralName)
    Subtyped,
    /// DirectoryString/DisplayText, the string type is picked on encode
    TextString,
}

impl FieldType {
    /// Universal tag of a primitive type, `None` for pseudo-types whose
    /// tag comes from elsewhere
    pub const fn universal_tag(&self) -> Option<u8> {
        match self {
            FieldType::Boolean => Some(BOOL_TAG),
            FieldType::Integer => Some(INTEGER_TAG),
            FieldType::Enumerated => Some(ENUMERATED_TAG),
            FieldType::BitString => Some(BIT_STRING_TAG),
            FieldType::OctetString => Some(OCTET_STRING_TAG),
            FieldType::Null => Some(NULL_TAG),
            FieldType::ObjectIdentifier => Some(OID_TAG),
            FieldType::Utf8String => Some(UTF8_STRING_TAG),
            FieldType::NumericString => Some(NUMERIC_STRING_TAG),
            FieldType::PrintableString => Some(PRINTABLE_STRING_TAG),
            FieldType::Ia5String => Some(IA5_STRING_TAG),
            FieldType::BmpString => Some(BMP_STRING_TAG),
            FieldType::UtcTime => Some(UTC_TIME_TAG),
            FieldType::GeneralizedTime => Some(GENERALIZE_TIME_TAG),
            FieldType::Sequence => Some(SEQUENCE_TAG),
            FieldType::Set => Some(SET_OF_TAG),
            _ => None,
        }
    }

    /// SEQUENCE and SET entries open a nesting level
    pub const fn is_constructed(&self) -> bool {
        matches!(self, FieldType::Sequence | FieldType::Set)
    }

    pub const fn is_blob(&self) -> bool {
        matches!(
            self,
            FieldType::BlobAny | FieldType::BlobBitString | FieldType::BlobSequence
        )
    }

    /// Types whose values are held as integers
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Boolean
                | FieldType::Integer
                | FieldType::Enumerated
                | FieldType::BitString
                | FieldType::Null
                | FieldType::Identifier
                | FieldType::Choice
        )
    }

    pub const fn is_string(&self) -> bool {
        matches!(
            self,
            FieldType::OctetString
                | FieldType::Utf8String
                | FieldType::NumericString
                | FieldType::PrintableString
                | FieldType::Ia5String
                | FieldType::BmpString
                | FieldType::TextString
        )
    }
}

/// How an entry's tag is written. An explicit tag wraps the complete
/// encoding, an implicit one replaces the universal tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggingMode {
    Default,
    Implicit(u8),
    Explicit(u8),
}

impl TaggingMode {
    /// Tag of the outermost element an entry produces, given the tag it
    /// would have untagged
    pub const fn outer_tag(&self, universal: u8) -> u8 {
        match self {
            TaggingMode::Default => universal,
            TaggingMode::Implicit(tag) => CONTEXT_SPECIFIC | (universal & CONSTRUCTED) | *tag,
            TaggingMode::Explicit(tag) => CONTEXT_SPECIFIC | CONSTRUCTED | *tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeInfoFlags(u32);

bitflags! {
    impl TypeInfoFlags: u32 {
        // Objects an attribute may appear in
        const CERT = 1 << 0;
        const ATTRCERT = 1 << 1;
        const CRL = 1 << 2;
        /// CRL entries
        const REVINFO = 1 << 3;
        const CERTREQ = 1 << 4;
        const REVREQ = 1 << 5;
        const OCSPREQ = 1 << 6;
        const OCSPRESP = 1 << 7;
        const RTCS = 1 << 8;
        const PKIUSER = 1 << 9;
        const CMS = 1 << 10;

        const ATTR_START = 1 << 16;
        const ATTR_END = 1 << 17;
        const CRITICAL = 1 << 18;
        /// Request-only attribute that isn't carried into the certificate
        const NO_COPY = 1 << 19;
    }
}

impl TypeInfoFlags {
    pub const fn for_object(object: ObjectKind) -> TypeInfoFlags {
        match object {
            ObjectKind::Certificate => TypeInfoFlags::CERT,
            ObjectKind::AttributeCertificate => TypeInfoFlags::ATTRCERT,
            ObjectKind::Crl => TypeInfoFlags::CRL,
            ObjectKind::CrlEntry => TypeInfoFlags::REVINFO,
            ObjectKind::CertRequest | ObjectKind::CrmfRequest => TypeInfoFlags::CERTREQ,
            ObjectKind::RevocationRequest => TypeInfoFlags::REVREQ,
            ObjectKind::OcspRequest => TypeInfoFlags::OCSPREQ,
            ObjectKind::OcspResponse => TypeInfoFlags::OCSPRESP,
            ObjectKind::RtcsRequest | ObjectKind::RtcsResponse => TypeInfoFlags::RTCS,
            ObjectKind::PkiUser => TypeInfoFlags::PKIUSER,
            ObjectKind::CmsAttributes => TypeInfoFlags::CMS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodingFlags(u32);

bitflags! {
    impl EncodingFlags: u32 {
        const OPTIONAL = 1 << 0;
        /// Field has a default value that isn't encoded
        const DEFAULT = 1 << 1;
        const EXPLICIT = 1 << 2;
        /// SEQUENCE { OID, value } group selected by the OID
        const IDENTIFIER = 1 << 3;
        /// SEQUENCE/SET OF container, repeated fields restart inside it
        const SETOF = 1 << 4;
        /// Constructed wrapper written even when it ends up empty
        const EMPTY_OK = 1 << 5;
        /// Entry written from the table rather than from a field
        const NONENCODING = 1 << 6;
        const MULTIVALUED = 1 << 7;
        /// Certificate request attribute written outside extensionRequest
        const SPECIAL_ENCODING = 1 << 8;
    }
}

/// Additional check on a field's value beyond its type and range
pub type Validator = fn(&AttributeField) -> Result<(), ErrorType>;

#[derive(Clone, Copy)]
pub enum Extra {
    None,
    SubTable(&'static [AttributeTypeEntry]),
    Validator(Validator),
}

#[derive(Clone, Copy)]
pub struct AttributeTypeEntry {
    /// Complete DER OID for attribute starts and identifiers, or the fixed
    /// encoding written by a non-encoding blob
    pub oid: Option<&'static [u8]>,
    pub field_id: FieldId,
    pub field_type: FieldType,
    pub tagging: TaggingMode,
    pub type_info: TypeInfoFlags,
    pub compliance: ComplianceLevel,
    pub encoding: EncodingFlags,
    /// Number of nesting levels closed after this entry
    pub seq_end: u8,
    /// Value bounds for numeric types, length bounds otherwise
    pub range: (i64, i64),
    /// Default for DEFAULT fields, encoded length for fixed blobs
    pub default_value: i64,
    pub extra: Extra,
    pub description: &'static str,
}

impl AttributeTypeEntry {
    pub const fn new(field_id: FieldId, field_type: FieldType) -> Self {
        Self {
            oid: None,
            field_id,
            field_type,
            tagging: TaggingMode::Default,
            type_info: TypeInfoFlags::empty(),
            compliance: ComplianceLevel::Standard,
            encoding: EncodingFlags::empty(),
            seq_end: 0,
            range: (0, 0),
            default_value: 0,
            extra: Extra::None,
            description: "",
        }
    }

    pub const fn oid(mut self, oid: &'static [u8]) -> Self {
        self.oid = Some(oid);
        self
    }

    /// First entry of an attribute valid in the objects `valid_in`
    pub const fn start(mut self, oid: &'static [u8], valid_in: TypeInfoFlags) -> Self {
        self.oid = Some(oid);
        self.type_info = self
            .type_info
            .union(valid_in)
            .union(TypeInfoFlags::ATTR_START);
        self
    }

    pub const fn end(mut self) -> Self {
        self.type_info = self.type_info.union(TypeInfoFlags::ATTR_END);
        self
    }

    pub const fn critical(mut self) -> Self {
        self.type_info = self.type_info.union(TypeInfoFlags::CRITICAL);
        self
    }

    pub const fn no_copy(mut self) -> Self {
        self.type_info = self.type_info.union(TypeInfoFlags::NO_COPY);
        self
    }

    pub const fn implicit(mut self, tag: u8) -> Self {
        self.tagging = TaggingMode::Implicit(tag);
        self
    }

    pub const fn explicit(mut self, tag: u8) -> Self {
        self.tagging = TaggingMode::Explicit(tag);
        self.encoding = self.encoding.union(EncodingFlags::EXPLICIT);
        self
    }

    pub const fn compliance(mut self, level: ComplianceLevel) -> Self {
        self.compliance = level;
        self
    }

    pub const fn flags(mut self, flags: EncodingFlags) -> Self {
        self.encoding = self.encoding.union(flags);
        self
    }

    pub const fn optional(self) -> Self {
        self.flags(EncodingFlags::OPTIONAL)
    }

    pub const fn multivalued(self) -> Self {
        self.flags(EncodingFlags::MULTIVALUED)
    }

    pub const fn setof(self) -> Self {
        self.flags(EncodingFlags::SETOF)
    }

    pub const fn identifier(self) -> Self {
        self.flags(EncodingFlags::IDENTIFIER)
    }

    pub const fn nonencoding(self) -> Self {
        self.flags(EncodingFlags::NONENCODING)
    }

    pub const fn empty_ok(self) -> Self {
        self.flags(EncodingFlags::EMPTY_OK)
    }

    pub const fn special(self) -> Self {
        self.flags(EncodingFlags::SPECIAL_ENCODING)
    }

    /// Optional field that isn't encoded when it holds `value`
    pub const fn default_value(mut self, value: i64) -> Self {
        self.default_value = value;
        self.flags(EncodingFlags::OPTIONAL.union(EncodingFlags::DEFAULT))
    }

    /// Non-encoding blob that always writes `data`
    pub const fn fixed(mut self, data: &'static [u8]) -> Self {
        self.oid = Some(data);
        self.default_value = data.len() as i64;
        self.nonencoding()
    }

    pub const fn seq_end(mut self, levels: u8) -> Self {
        self.seq_end = levels;
        self
    }

    pub const fn range(mut self, low: i64, high: i64) -> Self {
        self.range = (low, high);
        self
    }

    pub const fn sub_table(mut self, table: &'static [AttributeTypeEntry]) -> Self {
        self.extra = Extra::SubTable(table);
        self
    }

    pub const fn validator(mut self, validator: Validator) -> Self {
        self.extra = Extra::Validator(validator);
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn is_start(&self) -> bool {
        self.type_info.contains(TypeInfoFlags::ATTR_START)
    }

    pub fn is_end(&self) -> bool {
        self.type_info.contains(TypeInfoFlags::ATTR_END)
    }

    pub fn is_optional(&self) -> bool {
        self.encoding.contains(EncodingFlags::OPTIONAL)
    }

    pub fn has_default(&self) -> bool {
        self.encoding.contains(EncodingFlags::DEFAULT)
    }

    pub fn is_multivalued(&self) -> bool {
        self.encoding.contains(EncodingFlags::MULTIVALUED)
    }

    pub fn is_nonencoding(&self) -> bool {
        self.encoding.contains(EncodingFlags::NONENCODING)
    }

    /// Non-encoding blob that absorbs unrecognised members of an
    /// identifier group
    pub fn is_catch_all(&self) -> bool {
        self.field_type.is_blob() && self.is_nonencoding() && self.oid.is_none()
    }

    /// A SEQUENCE or SET OF whose members may repeat
    pub fn is_setof_container(&self) -> bool {
        self.field_type.is_constructed() && self.encoding.contains(EncodingFlags::SETOF)
    }

    pub fn get_sub_table(&self) -> Option<&'static [AttributeTypeEntry]> {
        match self.extra {
            Extra::SubTable(table) => Some(table),
            _ => None,
        }
    }

    pub fn get_validator(&self) -> Option<Validator> {
        match self.extra {
            Extra::Validator(validator) => Some(validator),
            _ => None,
        }
    }

    /// Length of the table-supplied OID, or zero
    pub fn oid_len(&self) -> usize {
        self.oid.map_or(0, |oid| oid.len())
    }
}

/// Back reference to a table entry, the table slice plus the entry's index
#[derive(Clone, Copy)]
pub struct EntryRef {
    table: &'static [AttributeTypeEntry],
    index: usize,
}

impl EntryRef {
    pub fn new(table: &'static [AttributeTypeEntry], index: usize) -> Option<EntryRef> {
        if index < table.len() {
            Some(EntryRef { table, index })
        } else {
            None
        }
    }

    pub fn entry(&self) -> &'static AttributeTypeEntry {
        &self.table[self.index]
    }

    pub fn table(&self) -> &'static [AttributeTypeEntry] {
        self.table
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&self) -> Option<EntryRef> {
        EntryRef::new(self.table, self.index + 1)
    }
}

impl PartialEq for EntryRef {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.table.as_ptr(), other.table.as_ptr()) && self.index == other.index
    }
}

impl Eq for EntryRef {}

impl fmt::Debug for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.entry();
        write!(
            f,
            "EntryRef({}, {:?}, {:?})",
            self.index, entry.field_id, entry.field_type
        )
    }
}

pub fn attribute_table(kind: AttributeKind) -> &'static [AttributeTypeEntry] {
    match kind {
        AttributeKind::Certificate => extensions::EXTENSION_TABLE,
        #[cfg(feature = "cms")]
        AttributeKind::Cms => cms::CMS_ATTRIBUTE_TABLE,
        #[cfg(not(feature = "cms"))]
        AttributeKind::Cms => &[],
    }
}

/// The attribute ID of a start entry, resolving `FOLLOWS`
pub fn start_attribute_id(table: &'static [AttributeTypeEntry], index: usize) -> Option<FieldId> {
    let entry = table.get(index)?;
    if entry.field_id == FieldId::FOLLOWS {
        table.get(index + 1).map(|next| next.field_id)
    } else {
        Some(entry.field_id)
    }
}

/// Find the start entry of the attribute identified by `oid`
pub fn oid_to_attribute(kind: AttributeKind, oid: &[u8]) -> Result<Option<EntryRef>, AttributeError> {
    let table = attribute_table(kind);
    for (index, entry) in table.iter().enumerate() {
        if index >= ITERATIONS_LARGE {
            return Err(AttributeError::IterationLimit);
        }
        if entry.is_start() && entry.oid == Some(oid) {
            return Ok(EntryRef::new(table, index));
        }
    }

    Ok(None)
}

/// Find the start entry of the attribute `attribute_id`
pub fn attribute_start(kind: AttributeKind, attribute_id: FieldId) -> Option<EntryRef> {
    let table = attribute_table(kind);
    table
        .iter()
        .enumerate()
        .take(ITERATIONS_LARGE)
        .find(|(index, entry)| {
            entry.is_start() && start_attribute_id(table, *index) == Some(attribute_id)
        })
        .and_then(|(index, _)| EntryRef::new(table, index))
}

/// Find the entry for `field_id`, or for `sub_field_id` within the
/// sub-table of `field_id` when one is given. Also returns the ID of the
/// attribute the field belongs to.
pub fn field_id_to_attribute(
    kind: AttributeKind,
    field_id: FieldId,
    sub_field_id: FieldId,
) -> Option<(EntryRef, FieldId)> {
    if field_id == FieldId::NONE || field_id == FieldId::FOLLOWS {
        return None;
    }

    let table = attribute_table(kind);
    let mut attribute_id = FieldId::NONE;
    for (index, entry) in table.iter().enumerate().take(ITERATIONS_LARGE) {
        if entry.is_start() {
            attribute_id = start_attribute_id(table, index)?;
        }
        if entry.field_id != field_id {
            continue;
        }
        if sub_field_id == FieldId::NONE {
            return Some((EntryRef::new(table, index)?, attribute_id));
        }

        let sub_table = entry.get_sub_table()?;
        let sub_index = sub_table
            .iter()
            .position(|sub_entry| sub_entry.field_id == sub_field_id)?;
        return Some((EntryRef::new(sub_table, sub_index)?, attribute_id));
    }

    None
}

/// Index one past the last entry nested inside the constructed entry at
/// `index`. An entry that closes more levels than are open, or the end of
/// the attribute, closes the container.
pub fn container_end(table: &[AttributeTypeEntry], index: usize) -> usize {
    let mut depth: i32 = 1;
    for (offset, entry) in table.iter().enumerate().skip(index + 1) {
        if entry.field_type.is_constructed() {
            depth += 1;
        }
        depth -= i32::from(entry.seq_end);
        if depth <= 0 || entry.is_end() {
            return offset + 1;
        }
    }

    table.len()
}

/// Index of the entry after `index` at the same nesting level
pub fn next_sibling(table: &[AttributeTypeEntry], index: usize) -> usize {
    match table.get(index) {
        Some(entry) if entry.field_type.is_constructed() => container_end(table, index),
        _ => index + 1,
    }
}

/// Check the structural invariants of every compiled-in table
pub fn check_tables() -> Result<(), AttributeError> {
    check_table(attribute_table(AttributeKind::Certificate))?;
    #[cfg(feature = "cms")]
    check_table(attribute_table(AttributeKind::Cms))?;

    Ok(())
}

fn check_table(table: &'static [AttributeTypeEntry]) -> Result<(), AttributeError> {
    let mut in_attribute = false;
    let mut last_attribute_id = FieldId::NONE;

    for (index, entry) in table.iter().enumerate() {
        if entry.is_start() {
            if in_attribute || entry.oid.is_none() {
                return Err(AttributeError::TableInconsistency);
            }
            let attribute_id =
                start_attribute_id(table, index).ok_or(AttributeError::TableInconsistency)?;
            if attribute_id <= last_attribute_id {
                return Err(AttributeError::TableInconsistency);
            }
            last_attribute_id = attribute_id;
            in_attribute = true;
        } else if !in_attribute {
            return Err(AttributeError::TableInconsistency);
        }
        check_entry(table, index)?;
        if entry.is_end() {
            check_nesting(table, index)?;
            in_attribute = false;
        }
    }
    if in_attribute {
        return Err(AttributeError::TableInconsistency);
    }

    Ok(())
}

fn check_sub_table(table: &'static [AttributeTypeEntry]) -> Result<(), AttributeError> {
    match table.last() {
        Some(last) if last.is_end() => (),
        _ => return Err(AttributeError::TableInconsistency),
    }
    for (index, entry) in table.iter().enumerate() {
        if entry.is_start() || (entry.is_end() && index != table.len() - 1) {
            return Err(AttributeError::TableInconsistency);
        }
        check_entry(table, index)?;
    }

    check_nesting(table, table.len() - 1)
}

/// The open levels at the end of an attribute, plus an identifier group
/// and a CHOICE marker, must fit in the validation stack
fn check_nesting(table: &'static [AttributeTypeEntry], end: usize) -> Result<(), AttributeError> {
    let start = table[..end]
        .iter()
        .rposition(|entry| entry.is_start())
        .unwrap_or(0);
    let mut depth: usize = 0;
    for entry in &table[start..=end] {
        if entry.field_type.is_constructed() {
            depth += 1;
            if depth + 3 > ATTRIBUTE_STACK_SIZE {
                return Err(AttributeError::TableInconsistency);
            }
        }
        depth = depth.saturating_sub(entry.seq_end as usize);
    }

    Ok(())
}

fn check_entry(table: &'static [AttributeTypeEntry], index: usize) -> Result<(), AttributeError> {
    let entry = &table[index];

    if entry.field_id == FieldId::FOLLOWS {
        match table.get(index + 1) {
            Some(next) if next.field_id != FieldId::NONE && next.field_id != FieldId::FOLLOWS => (),
            _ => return Err(AttributeError::TableInconsistency),
        }
    }

    if entry.encoding.contains(EncodingFlags::IDENTIFIER) {
        // Either an OID-selected group or a non-encoding catch-all
        match table.get(index + 1) {
            Some(next) if next.field_type == FieldType::Identifier && next.oid.is_some() => (),
            Some(next) if next.is_nonencoding() && next.oid.is_none() => (),
            _ => return Err(AttributeError::TableInconsistency),
        }
    }

    match entry.field_type {
        FieldType::Subtyped | FieldType::Choice => {
            check_sub_table(entry.get_sub_table().ok_or(AttributeError::TableInconsistency)?)?
        }
        FieldType::Identifier => {
            validate_oid(entry.oid.ok_or(AttributeError::TableInconsistency)?)
                .map_err(|_| AttributeError::TableInconsistency)?;
        }
        _ if entry.field_type.is_blob() && entry.is_nonencoding() => {
            if let Some(data) = entry.oid {
                validate_der(data).map_err(|_| AttributeError::TableInconsistency)?;
                if data.len() as i64 != entry.default_value {
                    return Err(AttributeError::TableInconsistency);
                }
            }
        }
        _ => {
            if let Some(oid) = entry.oid {
                validate_oid(oid).map_err(|_| AttributeError::TableInconsistency)?;
            }
        }
    }

    if entry.has_default()
        && (entry.default_value < entry.range.0 || entry.default_value > entry.range.1)
    {
        return Err(AttributeError::TableInconsistency);
    }
    if (entry.field_type.is_string() || entry.field_type.is_blob())
        && entry.range.1 > MAX_FIELD_DATA_SIZE as i64
    {
        return Err(AttributeError::TableInconsistency);
    }

    Ok(())
}
