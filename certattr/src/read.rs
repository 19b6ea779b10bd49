// Licensed under the Apache-2.0 license

//! The decoder.
//!
//! Each attribute is matched to its table start entry by OID and its value
//! is read by walking the entries recursively alongside the data. SEQUENCE
//! and SET entries descend into their contents, SET OF containers repeat
//! their members while data remains, and optional entries whose tag isn't
//! next are skipped. Fields at their DEFAULT value aren't encoded, so they
//! aren't added.

use crate::{
    add::AttributeValue,
    asn1::{
        decode_bit_string, decode_bool, decode_integer, DerReader, Tlv, BIT_STRING_TAG,
        BMP_STRING_TAG, BOOL_TAG, CONSTRUCTED, IA5_STRING_TAG, OCTET_STRING_TAG, OID_TAG,
        PRINTABLE_STRING_TAG, SEQUENCE_TAG, SET_OF_TAG, T61_STRING_TAG, UTF8_STRING_TAG,
        VISIBLE_STRING_TAG,
    },
    config::{AttributeConfig, EncodingOptions},
    error::AttributeError,
    field_id::FieldId,
    list::{AttributeList, FieldFlags},
    lookup::{find_attribute, find_attribute_by_oid},
    oid::{validate_oid, OidDisplay},
    table::{
        container_end, next_sibling, oid_to_attribute, start_attribute_id, AttributeTypeEntry,
        EncodingFlags, EntryRef, FieldType, TaggingMode, TypeInfoFlags,
    },
    time::{decode_generalized_time, decode_utc_time},
    write::{is_attribute_form, wrapper_tags, OID_EXTENSION_REQUEST},
    AttributeKind, ObjectKind, ITERATIONS_LARGE, MAX_ATTRIBUTE_FIELDS, MAX_FIELD_DATA_SIZE,
};
use arrayvec::ArrayVec;
use core::ops::Range;
use log::{debug, trace, warn};

/// String types accepted for a DirectoryString or DisplayText
const TEXT_TAGS: [u8; 6] = [
    PRINTABLE_STRING_TAG,
    IA5_STRING_TAG,
    UTF8_STRING_TAG,
    BMP_STRING_TAG,
    T61_STRING_TAG,
    VISIBLE_STRING_TAG,
];

/// Converted text and retagged OIDs
type Scratch = ArrayVec<u8, MAX_FIELD_DATA_SIZE>;

/// Whether `tag` can start the untagged encoding of `entry`
fn matches_untagged(entry: &AttributeTypeEntry, tag: u8) -> bool {
    match entry.field_type {
        FieldType::TextString => TEXT_TAGS.contains(&tag),
        FieldType::BlobAny => true,
        FieldType::BlobSequence | FieldType::Dn => tag == SEQUENCE_TAG,
        FieldType::BlobBitString => tag == BIT_STRING_TAG,
        FieldType::Choice | FieldType::Identifier => tag == OID_TAG,
        field_type => field_type.universal_tag() == Some(tag),
    }
}

/// Whether the next element in `r` is an encoding of `entry`
fn is_present(r: &DerReader, entry: &AttributeTypeEntry) -> bool {
    let Some(tag) = r.peek_tag() else {
        return false;
    };
    match entry.tagging {
        TaggingMode::Default => matches_untagged(entry, tag),
        tagging => {
            let constructed = entry.field_type.is_constructed()
                || matches!(entry.field_type, FieldType::Dn | FieldType::BlobSequence);
            tag == tagging.outer_tag(if constructed { CONSTRUCTED } else { 0 })
        }
    }
}

fn push_char(text: &mut Scratch, c: char) -> Result<(), AttributeError> {
    let mut buffer = [0u8; 4];
    text.try_extend_from_slice(c.encode_utf8(&mut buffer).as_bytes())
        .map_err(|_| AttributeError::ValueTooLarge)
}

/// UTF-16BE to UTF-8
fn bmp_to_utf8<'b>(content: &[u8], text: &'b mut Scratch) -> Result<&'b [u8], AttributeError> {
    if content.len() % 2 != 0 {
        return Err(AttributeError::BadEncoding);
    }
    let units = content
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    for c in char::decode_utf16(units) {
        push_char(text, c.map_err(|_| AttributeError::BadEncoding)?)?;
    }

    Ok(text.as_slice())
}

/// T61 strings are treated as Latin-1
fn latin1_to_utf8<'b>(content: &[u8], text: &'b mut Scratch) -> Result<&'b [u8], AttributeError> {
    for &byte in content {
        push_char(text, char::from(byte))?;
    }

    Ok(text.as_slice())
}

/// The encoding of `tlv` with its implicit tag replaced by `universal`
fn untagged<'b>(tlv: &Tlv<'b>, universal: u8, scratch: &'b mut Scratch) -> Result<&'b [u8], AttributeError> {
    if tlv.tag == universal {
        return Ok(tlv.encoded);
    }
    let rest = tlv.encoded.get(1..).ok_or(AttributeError::BadEncoding)?;
    scratch
        .try_push(universal)
        .map_err(|_| AttributeError::ValueTooLarge)?;
    scratch
        .try_extend_from_slice(rest)
        .map_err(|_| AttributeError::ValueTooLarge)?;

    Ok(scratch.as_slice())
}

/// Convert a primitive element to the value `add_field` takes for `entry`
fn decode_value<'b>(
    entry: &AttributeTypeEntry,
    tlv: &Tlv<'b>,
    scratch: &'b mut Scratch,
) -> Result<AttributeValue<'b>, AttributeError> {
    let content = tlv.content;
    let value = match entry.field_type {
        FieldType::Boolean => AttributeValue::Integer(i64::from(decode_bool(content)?)),
        FieldType::Integer | FieldType::Enumerated => AttributeValue::Integer(
            i64::try_from(decode_integer(content)?).map_err(|_| AttributeError::BadEncoding)?,
        ),
        FieldType::BitString => AttributeValue::Integer(
            i64::try_from(decode_bit_string(content)?).map_err(|_| AttributeError::BadEncoding)?,
        ),
        FieldType::Null => {
            if !content.is_empty() {
                return Err(AttributeError::BadEncoding);
            }
            AttributeValue::Unused
        }
        FieldType::OctetString
        | FieldType::Utf8String
        | FieldType::NumericString
        | FieldType::PrintableString
        | FieldType::Ia5String => AttributeValue::Bytes(content),
        FieldType::BmpString => AttributeValue::Bytes(bmp_to_utf8(content, scratch)?),
        FieldType::TextString => match tlv.tag {
            BMP_STRING_TAG => AttributeValue::Bytes(bmp_to_utf8(content, scratch)?),
            T61_STRING_TAG => AttributeValue::Bytes(latin1_to_utf8(content, scratch)?),
            _ => AttributeValue::Bytes(content),
        },
        FieldType::UtcTime => AttributeValue::Time(decode_utc_time(content)?),
        FieldType::GeneralizedTime => AttributeValue::Time(decode_generalized_time(content)?),
        FieldType::ObjectIdentifier => AttributeValue::Bytes(untagged(tlv, OID_TAG, scratch)?),
        FieldType::BlobBitString => AttributeValue::Bytes(untagged(tlv, BIT_STRING_TAG, scratch)?),
        FieldType::BlobSequence => AttributeValue::Bytes(untagged(tlv, SEQUENCE_TAG, scratch)?),
        FieldType::BlobAny => AttributeValue::Bytes(tlv.encoded),
        FieldType::Dn => AttributeValue::Dn(tlv.encoded),
        FieldType::Identifier
        | FieldType::Choice
        | FieldType::Sequence
        | FieldType::Set
        | FieldType::Subtyped => return Err(AttributeError::InternalError),
    };

    Ok(value)
}

/// Reads the fields of one attribute into the list
struct FieldReader<'l> {
    kind: AttributeKind,
    list: &'l mut AttributeList,
    /// Flags given to every field, the attribute's criticality
    flags: FieldFlags,
    fields: usize,
    max_fields: usize,
}

impl FieldReader<'_> {
    fn add(&mut self, field_id: FieldId, sub_field_id: FieldId, value: AttributeValue) -> Result<(), AttributeError> {
        if self.fields >= self.max_fields {
            debug!("[read] more than {} fields in attribute", self.max_fields);
            return Err(AttributeError::BadEncoding);
        }
        self.list
            .add_field(self.kind, field_id, sub_field_id, value, self.flags)?;
        self.fields += 1;

        Ok(())
    }

    /// Add a field for `entry`, as a component of `parent` inside a
    /// sub-table
    fn add_entry(
        &mut self,
        entry: &AttributeTypeEntry,
        parent: Option<FieldId>,
        value: AttributeValue,
    ) -> Result<(), AttributeError> {
        match parent {
            Some(parent) => self.add(parent, entry.field_id, value),
            None => self.add(entry.field_id, FieldId::NONE, value),
        }
    }

    /// Read the entries `range` of `table` from `r`
    fn read_entries(
        &mut self,
        r: &mut DerReader,
        table: &'static [AttributeTypeEntry],
        range: Range<usize>,
        parent: Option<FieldId>,
    ) -> Result<(), AttributeError> {
        let mut index = range.start;
        while index < range.end {
            let entry = &table[index];

            if entry.encoding.contains(EncodingFlags::IDENTIFIER) {
                let mut end = index;
                while end < range.end && table[end].encoding.contains(EncodingFlags::IDENTIFIER) {
                    end = container_end(table, end);
                }
                self.read_identified_item(r, table, index..end, parent)?;
                index = end;
                continue;
            }

            match entry.field_type {
                FieldType::Identifier => {
                    let end = (index..range.end)
                        .find(|&i| {
                            table[i].field_type != FieldType::Identifier && !table[i].is_catch_all()
                        })
                        .unwrap_or(range.end);
                    self.read_identifiers(r, &table[index..end], parent)?;
                    index = end;
                }
                FieldType::Sequence | FieldType::Set => {
                    index = self.read_constructed(r, table, index, parent)?;
                }
                FieldType::Subtyped => {
                    self.read_general_name(r, entry)?;
                    index += 1;
                }
                FieldType::Choice => {
                    self.read_choice(r, entry, parent)?;
                    index += 1;
                }
                _ if entry.is_nonencoding() => {
                    if is_present(r, entry) {
                        r.read_tlv()?;
                    }
                    index += 1;
                }
                _ => {
                    self.read_field(r, entry, parent)?;
                    index += 1;
                }
            }
        }

        Ok(())
    }

    /// Read a SEQUENCE or SET entry. Returns the index of the entry after
    /// it.
    fn read_constructed(
        &mut self,
        r: &mut DerReader,
        table: &'static [AttributeTypeEntry],
        index: usize,
        parent: Option<FieldId>,
    ) -> Result<usize, AttributeError> {
        let entry = &table[index];
        let end = container_end(table, index);
        if !is_present(r, entry) {
            if entry.is_optional() {
                return Ok(end);
            }
            debug!("[read] {} absent", entry.description);
            return Err(AttributeError::BadEncoding);
        }
        trace!("[read] {}", entry.description);

        let tlv = r.read_tlv()?;
        let content = match entry.tagging {
            TaggingMode::Explicit(_) => {
                let universal = entry
                    .field_type
                    .universal_tag()
                    .ok_or(AttributeError::TableInconsistency)?;
                let mut outer = DerReader::new(tlv.content);
                let content = outer.read_expected(universal)?;
                if !outer.is_empty() {
                    return Err(AttributeError::BadEncoding);
                }
                content
            }
            _ => tlv.content,
        };

        let mut inner = DerReader::new(content);
        let members = index + 1..end;
        if !entry.is_setof_container() {
            self.read_entries(&mut inner, table, members, parent)?;
            if !inner.is_empty() {
                return Err(AttributeError::BadEncoding);
            }
            return Ok(end);
        }

        // SIZE (1..MAX)
        if inner.is_empty() && !entry.encoding.contains(EncodingFlags::EMPTY_OK) {
            return Err(AttributeError::BadEncoding);
        }
        for _ in 0..ITERATIONS_LARGE {
            if inner.is_empty() {
                return Ok(end);
            }
            let before = inner.remaining().len();
            self.read_entries(&mut inner, table, members.clone(), parent)?;
            if inner.remaining().len() == before {
                debug!("[read] unrecognised member of {}", entry.description);
                return Err(AttributeError::BadEncoding);
            }
        }

        Err(AttributeError::BadEncoding)
    }

    /// Read one `SEQUENCE { OID, ... }` item, choosing among the identifier
    /// groups `groups` by its OID
    fn read_identified_item(
        &mut self,
        r: &mut DerReader,
        table: &'static [AttributeTypeEntry],
        groups: Range<usize>,
        parent: Option<FieldId>,
    ) -> Result<(), AttributeError> {
        if r.peek_tag() != Some(SEQUENCE_TAG) {
            return Ok(());
        }
        let mut item = DerReader::new(r.read_expected(SEQUENCE_TAG)?);
        let oid = item.read_tlv()?;
        if oid.tag != OID_TAG {
            return Err(AttributeError::BadEncoding);
        }

        let mut group = groups.start;
        while group < groups.end {
            let end = container_end(table, group);
            let identifier = table.get(group + 1).ok_or(AttributeError::TableInconsistency)?;
            if identifier.is_catch_all() {
                debug!("[read] skipping unrecognised item {}", OidDisplay(oid.encoded));
                return Ok(());
            }
            if identifier.oid == Some(oid.encoded) {
                trace!("[read] {}", table[group].description);
                if identifier.field_id != FieldId::NONE {
                    self.add_entry(identifier, parent, AttributeValue::Unused)?;
                }
                self.read_entries(&mut item, table, group + 2..end, parent)?;
                if !item.is_empty() {
                    return Err(AttributeError::BadEncoding);
                }
                return Ok(());
            }
            group = end;
        }

        debug!("[read] no item for {}", OidDisplay(oid.encoded));
        Err(AttributeError::BadEncoding)
    }

    /// Read a run of OIDs, each selecting one of the identifier entries in
    /// `entries`
    fn read_identifiers(
        &mut self,
        r: &mut DerReader,
        entries: &'static [AttributeTypeEntry],
        parent: Option<FieldId>,
    ) -> Result<(), AttributeError> {
        let catch_all = entries.iter().any(|entry| entry.is_catch_all());
        for _ in 0..ITERATIONS_LARGE {
            if r.peek_tag() != Some(OID_TAG) {
                return Ok(());
            }
            let oid = r.read_tlv()?;
            match entries
                .iter()
                .find(|entry| entry.field_type == FieldType::Identifier && entry.oid == Some(oid.encoded))
            {
                Some(entry) => self.add_entry(entry, parent, AttributeValue::Unused)?,
                None if catch_all => {
                    debug!("[read] skipping unrecognised {}", OidDisplay(oid.encoded));
                }
                None => return Err(AttributeError::BadEncoding),
            }
        }

        Err(AttributeError::BadEncoding)
    }

    fn read_choice(
        &mut self,
        r: &mut DerReader,
        entry: &AttributeTypeEntry,
        parent: Option<FieldId>,
    ) -> Result<(), AttributeError> {
        if r.peek_tag() != Some(OID_TAG) {
            if entry.is_optional() {
                return Ok(());
            }
            return Err(AttributeError::BadEncoding);
        }
        let oid = r.read_tlv()?;
        let alternatives = entry
            .get_sub_table()
            .ok_or(AttributeError::TableInconsistency)?;
        let selected = alternatives
            .iter()
            .find(|alternative| alternative.oid == Some(oid.encoded))
            .ok_or(AttributeError::BadEncoding)?;

        self.add_entry(
            entry,
            parent,
            AttributeValue::Integer(i64::from(selected.field_id.0)),
        )
    }

    /// Read a GeneralName, selecting the alternative by its tag
    fn read_general_name(&mut self, r: &mut DerReader, entry: &AttributeTypeEntry) -> Result<(), AttributeError> {
        let alternatives = entry
            .get_sub_table()
            .ok_or(AttributeError::TableInconsistency)?;
        let parent = Some(entry.field_id);

        let mut index = 0;
        while index < alternatives.len() {
            let alternative = &alternatives[index];
            if is_present(r, alternative) {
                if alternative.field_type.is_constructed() {
                    self.read_constructed(r, alternatives, index, parent)?;
                } else {
                    self.read_field(r, alternative, parent)?;
                }
                return Ok(());
            }
            index = next_sibling(alternatives, index);
        }

        if entry.is_optional() || r.is_empty() {
            return Ok(());
        }
        debug!("[read] unsupported name form in {}", entry.description);
        Err(AttributeError::BadEncoding)
    }

    /// Read a primitive field
    fn read_field(
        &mut self,
        r: &mut DerReader,
        entry: &AttributeTypeEntry,
        parent: Option<FieldId>,
    ) -> Result<(), AttributeError> {
        if !is_present(r, entry) {
            if entry.is_optional() || entry.has_default() {
                return Ok(());
            }
            debug!("[read] {} absent", entry.description);
            return Err(AttributeError::BadEncoding);
        }

        let mut tlv = r.read_tlv()?;
        if let TaggingMode::Explicit(_) = entry.tagging {
            let mut outer = DerReader::new(tlv.content);
            tlv = outer.read_tlv()?;
            if !outer.is_empty() || !matches_untagged(entry, tlv.tag) {
                return Err(AttributeError::BadEncoding);
            }
        }

        let mut scratch = Scratch::new();
        let value = decode_value(entry, &tlv, &mut scratch)?;
        self.add_entry(entry, parent, value)
    }

    /// An attribute whose fields are all at their defaults encodes as an
    /// empty SEQUENCE, give it its first DEFAULT field so that it doesn't
    /// vanish
    fn add_default(&mut self, start: EntryRef) -> Result<(), AttributeError> {
        let table = start.table();
        let members = start.index() + 1..container_end(table, start.index());
        let default = table
            .get(members)
            .unwrap_or_default()
            .iter()
            .find(|entry| entry.has_default() && entry.field_id != FieldId::NONE);
        match default {
            Some(entry) => self.add(entry.field_id, FieldId::NONE, AttributeValue::Integer(entry.default_value)),
            None => Ok(()),
        }
    }
}

/// Reads the attribute units of one object
struct AttributeReader<'l> {
    kind: AttributeKind,
    object: ObjectKind,
    config: &'l AttributeConfig,
    list: &'l mut AttributeList,
}

impl AttributeReader<'_> {
    fn read_units(&mut self, body: &[u8], attribute_form: bool) -> Result<(), AttributeError> {
        let mut r = DerReader::new(body);
        for _ in 0..ITERATIONS_LARGE {
            if r.is_empty() {
                return Ok(());
            }
            let unit = r.read_tlv()?;
            self.read_unit(&unit, attribute_form)?;
        }

        Err(AttributeError::BadEncoding)
    }

    /// Read `SEQUENCE { OID, [critical,] OCTET STRING }` or
    /// `SEQUENCE { OID, SET }`
    fn read_unit(&mut self, unit: &Tlv, attribute_form: bool) -> Result<(), AttributeError> {
        if unit.tag != SEQUENCE_TAG {
            return Err(AttributeError::BadEncoding);
        }
        let mut r = DerReader::new(unit.content);
        let oid = r.read_tlv()?;
        if oid.tag != OID_TAG {
            return Err(AttributeError::BadEncoding);
        }
        validate_oid(oid.encoded)?;

        let mut critical = false;
        if !attribute_form && r.peek_tag() == Some(BOOL_TAG) {
            critical = decode_bool(r.read_expected(BOOL_TAG)?)?;
        }
        let payload = r.read_expected(if attribute_form {
            SET_OF_TAG
        } else {
            OCTET_STRING_TAG
        })?;
        if !r.is_empty() {
            return Err(AttributeError::BadEncoding);
        }

        if self.object == ObjectKind::CertRequest && attribute_form {
            if oid.encoded == OID_EXTENSION_REQUEST {
                let mut set = DerReader::new(payload);
                let extensions = set.read_expected(SEQUENCE_TAG)?;
                if !set.is_empty() {
                    return Err(AttributeError::BadEncoding);
                }
                return self.read_units(extensions, false);
            }
            if oid_to_attribute(self.kind, oid.encoded)?.is_none() {
                warn!("[read] skipping request attribute {}", OidDisplay(oid.encoded));
                return Ok(());
            }
        }

        self.read_attribute(oid.encoded, critical, payload)
    }

    fn push_blob(
        &mut self,
        oid: &[u8],
        payload: &[u8],
        critical: bool,
        flags: FieldFlags,
    ) -> Result<(), AttributeError> {
        if find_attribute_by_oid(self.list, oid).is_some() {
            return Err(AttributeError::AttributePresent(FieldId::NONE));
        }
        let flags = if critical {
            flags | FieldFlags::CRITICAL
        } else {
            flags
        };
        self.list.push_blob(oid, payload, flags)?;

        Ok(())
    }

    fn read_attribute(&mut self, oid: &[u8], critical: bool, payload: &[u8]) -> Result<(), AttributeError> {
        let Some(start) = oid_to_attribute(self.kind, oid)? else {
            if critical
                && !self
                    .config
                    .options
                    .contains(EncodingOptions::ALLOW_UNKNOWN_CRITICAL)
            {
                warn!("[read] unrecognised critical attribute {}", OidDisplay(oid));
                return Err(AttributeError::PermissionDenied);
            }
            // All defaults, but there's no telling what they are
            if payload.is_empty() {
                return Ok(());
            }
            debug!("[read] unrecognised attribute {} kept as a blob", OidDisplay(oid));
            return self.push_blob(oid, payload, critical, FieldFlags::empty());
        };

        let entry = start.entry();
        if !entry
            .type_info
            .intersects(TypeInfoFlags::for_object(self.object))
        {
            warn!(
                "[read] {} isn't valid in {:?}, kept as a blob",
                entry.description, self.object
            );
            return self.push_blob(oid, payload, critical, FieldFlags::empty());
        }
        if entry.compliance > self.config.compliance {
            warn!(
                "[read] {} needs compliance level {:?}, ignored",
                entry.description, entry.compliance
            );
            return self.push_blob(oid, payload, critical, FieldFlags::IGNORED);
        }

        let attribute_id = start_attribute_id(start.table(), start.index())
            .ok_or(AttributeError::TableInconsistency)?;
        if find_attribute(self.list, attribute_id).is_some() {
            return Err(AttributeError::AttributePresent(attribute_id));
        }

        let flags = if critical && !entry.type_info.contains(TypeInfoFlags::CRITICAL) {
            FieldFlags::CRITICAL
        } else {
            FieldFlags::empty()
        };
        let mut fields = FieldReader {
            kind: self.kind,
            list: &mut *self.list,
            flags,
            fields: 0,
            max_fields: (5 + payload.len() / 3).min(MAX_ATTRIBUTE_FIELDS),
        };
        let mut r = DerReader::new(payload);
        fields.read_entries(&mut r, start.table(), start.index()..start.index() + 1, None)?;
        if !r.is_empty() {
            return Err(AttributeError::BadEncoding);
        }
        if fields.fields == 0 {
            fields.add_default(start)?;
        }
        debug!("[read] {}: {} fields", entry.description, fields.fields);

        Ok(())
    }
}

/// Decode an attribute block wrapped for `object`, as written by
/// [`crate::write_attributes`], into a new list
pub fn read_attributes(
    kind: AttributeKind,
    der: &[u8],
    object: ObjectKind,
    config: &AttributeConfig,
) -> Result<AttributeList, AttributeError> {
    let mut list = AttributeList::new();
    if der.is_empty() {
        return Ok(list);
    }

    let mut body = der;
    for &tag in wrapper_tags(object) {
        let mut r = DerReader::new(body);
        body = r.read_expected(tag)?;
        if !r.is_empty() {
            return Err(AttributeError::BadEncoding);
        }
    }

    let attribute_form = object == ObjectKind::CertRequest || is_attribute_form(kind, object);
    let mut reader = AttributeReader {
        kind,
        object,
        config,
        list: &mut list,
    };
    reader.read_units(body, attribute_form)?;

    Ok(list)
}
