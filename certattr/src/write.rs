// Licensed under the Apache-2.0 license

//! The size and write passes.
//!
//! Both run over a list that [`check_attributes`] has annotated: every
//! field carries its matched table entry and a FIFO of the wrappers to
//! write before its value, outermost last. Sizes are taken from those
//! annotations, so the size pass never has to encode anything.

use crate::{
    add::is_printable,
    asn1::{
        DerWriter, BOOL_TAG, BOOL_SIZE, CONSTRUCTED, CONTEXT_SPECIFIC, IA5_STRING_TAG,
        OCTET_STRING_TAG, PRINTABLE_STRING_TAG, SEQUENCE_TAG, SET_OF_TAG, UTF8_STRING_TAG,
    },
    check::{check_attributes, validate_for_object},
    config::AttributeConfig,
    error::AttributeError,
    field_id::FieldId,
    list::{AttributeField, AttributeList, FieldFlags, FieldRef},
    oid::{EncodedOid, OidDisplay},
    table::{attribute_start, AttributeTypeEntry, EncodingFlags, FieldType, TaggingMode, TypeInfoFlags},
    time::{encode_generalized_time, encode_utc_time, GENERALIZED_TIME_SIZE, UTC_TIME_SIZE},
    AttributeKind, ObjectKind, ITERATIONS_LARGE, MAX_OID_SIZE,
};
use arrayvec::ArrayVec;
use log::debug;

/// pkcs-9-at-extensionRequest 1.2.840.113549.1.9.14
pub(crate) const OID_EXTENSION_REQUEST: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x0E,
];

/// Largest SEQUENCE header plus an OID, what CMS attributes are sorted by
const PREFIX_SIZE: usize = 4 + MAX_OID_SIZE;

type Prefix = ArrayVec<u8, PREFIX_SIZE>;

fn structure(size: usize) -> Result<usize, AttributeError> {
    DerWriter::get_structure_size(size, true)
}

/// The field's value is checked where the value is set, a mismatch here
/// means the list was changed behind the validation pass
fn value_error(field: &AttributeField) -> AttributeError {
    if field.sub_field_id != FieldId::NONE {
        AttributeError::InvalidValue(field.sub_field_id)
    } else {
        AttributeError::InvalidValue(field.field_id)
    }
}

fn integer_value(field: &AttributeField) -> Result<u64, AttributeError> {
    field
        .value
        .as_integer()
        .and_then(|value| u64::try_from(value).ok())
        .ok_or_else(|| value_error(field))
}

fn bytes_value(field: &AttributeField) -> Result<&[u8], AttributeError> {
    field.value.as_bytes().ok_or_else(|| value_error(field))
}

fn bmp_units(field: &AttributeField) -> Result<core::str::EncodeUtf16<'_>, AttributeError> {
    let text = core::str::from_utf8(bytes_value(field)?).map_err(|_| value_error(field))?;
    Ok(text.encode_utf16())
}

/// Tag of a primitive value, the entry's implicit tag if it has one
fn tag_for(entry: &AttributeTypeEntry, universal: u8) -> u8 {
    match entry.tagging {
        TaggingMode::Implicit(_) => entry.tagging.outer_tag(universal),
        _ => universal,
    }
}

/// The narrowest string type `text` can be written as
fn text_string_tag(text: &[u8]) -> u8 {
    if text.iter().all(|&c| is_printable(c)) {
        PRINTABLE_STRING_TAG
    } else if text.is_ascii() {
        IA5_STRING_TAG
    } else {
        UTF8_STRING_TAG
    }
}

/// Encoded size of a field's value, tag and length included but without
/// any explicit tag
fn calculate_field_size(field: &AttributeField, entry: &AttributeTypeEntry) -> Result<usize, AttributeError> {
    if field.flags.contains(FieldFlags::BLOB_PAYLOAD) {
        return Ok(bytes_value(field)?.len());
    }

    match entry.field_type {
        FieldType::Boolean => structure(BOOL_SIZE),
        FieldType::Null => structure(0),
        FieldType::Integer | FieldType::Enumerated => {
            DerWriter::get_integer_size(integer_value(field)?, true)
        }
        FieldType::BitString => DerWriter::get_bit_string_size(integer_value(field)?, true),
        FieldType::BmpString => structure(bmp_units(field)?.count() * 2),
        FieldType::OctetString
        | FieldType::Utf8String
        | FieldType::NumericString
        | FieldType::PrintableString
        | FieldType::Ia5String
        | FieldType::TextString => structure(bytes_value(field)?.len()),
        FieldType::UtcTime => structure(UTC_TIME_SIZE),
        FieldType::GeneralizedTime => structure(GENERALIZED_TIME_SIZE),
        FieldType::ObjectIdentifier
        | FieldType::BlobAny
        | FieldType::BlobBitString
        | FieldType::BlobSequence => Ok(bytes_value(field)?.len()),
        FieldType::Identifier => Ok(entry.oid_len()),
        FieldType::Dn => field
            .value
            .as_dn()
            .map(|dn| dn.encoded_len())
            .ok_or_else(|| value_error(field)),
        FieldType::Choice => Ok(0),
        FieldType::Sequence | FieldType::Set | FieldType::Subtyped => {
            Err(AttributeError::InternalError)
        }
    }
}

/// Encoded size of a field matched against `entry`
pub(crate) fn sizeof_attribute_field(
    field: &AttributeField,
    entry: &AttributeTypeEntry,
) -> Result<usize, AttributeError> {
    let size = calculate_field_size(field, entry)?;
    match entry.tagging {
        TaggingMode::Explicit(_) => structure(size),
        _ => Ok(size),
    }
}

/// Encoded size of a wrapper layer written by `entry` around `size`
/// bytes of content
pub(crate) fn wrapped_size(entry: &AttributeTypeEntry, size: usize) -> Result<usize, AttributeError> {
    if entry.field_type.is_constructed() {
        let inner = structure(size)?;
        return match entry.tagging {
            TaggingMode::Explicit(_) => structure(inner),
            _ => Ok(inner),
        };
    }

    match entry.field_type {
        FieldType::Identifier => Ok(size + entry.oid_len()),
        field_type if field_type.is_blob() => {
            let fixed =
                usize::try_from(entry.default_value).map_err(|_| AttributeError::TableInconsistency)?;
            Ok(size + fixed)
        }
        _ => Ok(size),
    }
}

/// Write the part of a wrapper layer that precedes its content
fn write_layer(w: &mut DerWriter, entry: &AttributeTypeEntry, size: usize) -> Result<usize, AttributeError> {
    if entry.field_type.is_constructed() {
        let universal = entry
            .field_type
            .universal_tag()
            .ok_or(AttributeError::TableInconsistency)?;
        return match entry.tagging {
            TaggingMode::Explicit(_) => {
                let mut bytes_written = w.encode_header(entry.tagging.outer_tag(universal), structure(size)?)?;
                bytes_written += w.encode_header(universal, size)?;
                Ok(bytes_written)
            }
            _ => w.encode_header(entry.tagging.outer_tag(universal), size),
        };
    }

    match entry.field_type {
        // An identifier OID or a fixed parameter value from the table
        FieldType::Identifier => w.encode_bytes(entry.oid.ok_or(AttributeError::TableInconsistency)?),
        field_type if field_type.is_blob() && entry.is_nonencoding() => {
            w.encode_bytes(entry.oid.ok_or(AttributeError::TableInconsistency)?)
        }
        FieldType::Choice => Ok(0),
        _ => Err(AttributeError::InternalError),
    }
}

/// Write a value held in its complete encoding, swapping in the entry's
/// implicit tag
fn write_encoded(w: &mut DerWriter, entry: &AttributeTypeEntry, encoded: &[u8]) -> Result<usize, AttributeError> {
    let (&tag, rest) = encoded.split_first().ok_or(AttributeError::InternalError)?;
    let mut bytes_written = w.encode_byte(tag_for(entry, tag))?;
    bytes_written += w.encode_bytes(rest)?;

    Ok(bytes_written)
}

fn write_value(
    w: &mut DerWriter,
    field: &AttributeField,
    entry: &AttributeTypeEntry,
) -> Result<usize, AttributeError> {
    if field.flags.contains(FieldFlags::DEFAULT_VALUE) || entry.is_nonencoding() {
        return Ok(0);
    }

    let mut bytes_written = 0;
    if let TaggingMode::Explicit(_) = entry.tagging {
        bytes_written += w.encode_header(
            entry.tagging.outer_tag(CONSTRUCTED),
            calculate_field_size(field, entry)?,
        )?;
    }
    if field.flags.contains(FieldFlags::BLOB_PAYLOAD) {
        return Ok(bytes_written + write_encoded(w, entry, bytes_value(field)?)?);
    }

    let universal = entry.field_type.universal_tag().unwrap_or(0);
    let tag = tag_for(entry, universal);
    bytes_written += match entry.field_type {
        FieldType::Boolean => w.encode_bool(tag, integer_value(field)? != 0)?,
        FieldType::Integer | FieldType::Enumerated => w.encode_integer(tag, integer_value(field)?)?,
        FieldType::BitString => w.encode_bit_string(tag, integer_value(field)?)?,
        FieldType::Null => w.encode_null(tag)?,
        FieldType::OctetString
        | FieldType::Utf8String
        | FieldType::NumericString
        | FieldType::PrintableString
        | FieldType::Ia5String => w.encode_primitive(tag, bytes_value(field)?)?,
        FieldType::TextString => {
            let text = bytes_value(field)?;
            w.encode_primitive(tag_for(entry, text_string_tag(text)), text)?
        }
        FieldType::BmpString => {
            let mut written = w.encode_header(tag, bmp_units(field)?.count() * 2)?;
            for unit in bmp_units(field)? {
                written += w.encode_bytes(&unit.to_be_bytes())?;
            }
            written
        }
        FieldType::UtcTime => {
            let time = field.value.as_time().ok_or_else(|| value_error(field))?;
            w.encode_primitive(tag, &encode_utc_time(time)?)?
        }
        FieldType::GeneralizedTime => {
            let time = field.value.as_time().ok_or_else(|| value_error(field))?;
            w.encode_primitive(tag, &encode_generalized_time(time)?)?
        }
        FieldType::ObjectIdentifier
        | FieldType::BlobAny
        | FieldType::BlobBitString
        | FieldType::BlobSequence => write_encoded(w, entry, bytes_value(field)?)?,
        FieldType::Identifier => w.encode_bytes(entry.oid.ok_or(AttributeError::TableInconsistency)?)?,
        FieldType::Dn => {
            let dn = field.value.as_dn().ok_or_else(|| value_error(field))?;
            write_encoded(w, entry, dn.as_bytes())?
        }
        // Marks the alternatives of a CHOICE, the selected one writes
        FieldType::Choice => 0,
        FieldType::Sequence | FieldType::Set | FieldType::Subtyped => {
            return Err(AttributeError::InternalError)
        }
    };

    Ok(bytes_written)
}

/// Write one field: the wrappers recorded in its FIFO, outermost first,
/// then its value
pub fn write_attribute_field(w: &mut DerWriter, field: &mut AttributeField) -> Result<usize, AttributeError> {
    let start = w.offset();

    field.fifo_pos = field.fifo.len();
    while field.fifo_pos > 0 {
        field.fifo_pos -= 1;
        let layer = field.fifo[field.fifo_pos];
        write_layer(w, layer.entry.entry(), layer.size)?;
    }
    let entry = field.entry.ok_or(AttributeError::InternalError)?;
    write_value(w, field, entry.entry())?;

    Ok(w.offset() - start)
}

/// One encoded attribute: `SEQUENCE { OID, [critical,] OCTET STRING }` for
/// extensions or `SEQUENCE { OID, SET }` for attributes
#[derive(Debug, Clone)]
struct AttributeUnit {
    head: FieldRef,
    /// First field of the next attribute
    end: Option<FieldRef>,
    oid: EncodedOid,
    critical: bool,
    attribute_form: bool,
    /// Certificate request attribute written outside extensionRequest
    special: bool,
    blob: bool,
    payload: usize,
}

impl AttributeUnit {
    fn content_size(&self) -> Result<usize, AttributeError> {
        let wrapped = structure(self.payload)?;
        let critical = if self.critical && !self.attribute_form {
            structure(BOOL_SIZE)?
        } else {
            0
        };

        Ok(self.oid.len() + critical + wrapped)
    }

    fn total(&self) -> Result<usize, AttributeError> {
        structure(self.content_size()?)
    }

    fn write_header(&self, w: &mut DerWriter) -> Result<usize, AttributeError> {
        let mut bytes_written = w.encode_header(SEQUENCE_TAG, self.content_size()?)?;
        bytes_written += w.encode_bytes(&self.oid)?;
        if self.attribute_form {
            bytes_written += w.encode_header(SET_OF_TAG, self.payload)?;
        } else {
            if self.critical {
                bytes_written += w.encode_bool(BOOL_TAG, true)?;
            }
            bytes_written += w.encode_header(OCTET_STRING_TAG, self.payload)?;
        }

        Ok(bytes_written)
    }

    /// The SEQUENCE header and OID, enough to put distinct attributes in
    /// DER SET OF order
    fn prefix(&self) -> Result<Prefix, AttributeError> {
        let mut buffer = [0u8; PREFIX_SIZE];
        let mut w = DerWriter::new(&mut buffer);
        let len = w.encode_header(SEQUENCE_TAG, self.content_size()?)? + w.encode_bytes(&self.oid)?;

        let mut prefix = Prefix::new();
        prefix
            .try_extend_from_slice(&buffer[..len])
            .map_err(|_| AttributeError::InternalError)?;
        Ok(prefix)
    }
}

pub(crate) fn is_attribute_form(kind: AttributeKind, object: ObjectKind) -> bool {
    kind == AttributeKind::Cms
        || matches!(object, ObjectKind::RtcsRequest | ObjectKind::RtcsResponse)
}

/// Describe the attribute starting at `head`, or `None` if it writes
/// nothing
fn attribute_unit(
    kind: AttributeKind,
    list: &AttributeList,
    head: FieldRef,
    object: ObjectKind,
    config: &AttributeConfig,
) -> Result<Option<AttributeUnit>, AttributeError> {
    let field = list.field(head)?;
    let end = list.next_attribute(head)?;

    if field.is_blob() {
        if !config.sign_unrecognised() {
            return Ok(None);
        }
        return Ok(Some(AttributeUnit {
            head,
            end,
            oid: field.oid.clone().ok_or(AttributeError::InternalError)?,
            critical: field.is_critical(),
            attribute_form: is_attribute_form(kind, object),
            special: false,
            blob: true,
            payload: bytes_value(field)?.len(),
        }));
    }

    let start = attribute_start(kind, field.attribute_id).ok_or(AttributeError::InternalError)?;
    let start_entry = start.entry();
    let payload = if start_entry.field_type.is_constructed() || start_entry.field_type == FieldType::Choice {
        // The outermost wrapper is recorded on the first field unless
        // everything inside it was left out
        match field.fifo.last() {
            Some(outer) if outer.entry == start => {
                if outer.size == 0
                    && start_entry.field_type.is_constructed()
                    && !start_entry.encoding.contains(EncodingFlags::EMPTY_OK)
                {
                    return Ok(None);
                }
                wrapped_size(start_entry, outer.size)?
            }
            _ => return Ok(None),
        }
    } else {
        if field.flags.contains(FieldFlags::DEFAULT_VALUE) {
            return Ok(None);
        }
        if field.entry.is_none() {
            return Err(AttributeError::InternalError);
        }
        field.encoded_size
    };

    let mut oid = EncodedOid::new();
    oid.try_extend_from_slice(start_entry.oid.ok_or(AttributeError::TableInconsistency)?)
        .map_err(|_| AttributeError::TableInconsistency)?;
    let special = start_entry.encoding.contains(EncodingFlags::SPECIAL_ENCODING);

    Ok(Some(AttributeUnit {
        head,
        end,
        oid,
        critical: start_entry.type_info.contains(TypeInfoFlags::CRITICAL) || field.is_critical(),
        attribute_form: special || is_attribute_form(kind, object),
        special,
        blob: false,
        payload,
    }))
}

/// Call `f` for every attribute that writes something, in list order
fn for_each_unit(
    kind: AttributeKind,
    list: &AttributeList,
    object: ObjectKind,
    config: &AttributeConfig,
    mut f: impl FnMut(AttributeUnit) -> Result<(), AttributeError>,
) -> Result<(), AttributeError> {
    let mut cursor = list.head();
    for _ in 0..ITERATIONS_LARGE {
        let Some(head) = cursor else {
            return Ok(());
        };
        let unit = attribute_unit(kind, list, head, object, config)?;
        cursor = list.next_attribute(head)?;
        if let Some(unit) = unit {
            f(unit)?;
        }
    }

    Err(AttributeError::IterationLimit)
}

fn write_unit(w: &mut DerWriter, list: &mut AttributeList, unit: &AttributeUnit) -> Result<usize, AttributeError> {
    let start = w.offset();
    unit.write_header(w)?;

    let payload_start = w.offset();
    if unit.blob {
        w.encode_bytes(bytes_value(list.field(unit.head)?)?)?;
    } else {
        let mut cursor = Some(unit.head);
        for _ in 0..ITERATIONS_LARGE {
            let Some(current) = cursor.filter(|current| Some(*current) != unit.end) else {
                break;
            };
            let field = list.field_mut(current)?;
            write_attribute_field(w, field)?;
            cursor = field.next();
        }
    }
    if w.offset() - payload_start != unit.payload {
        return Err(AttributeError::InternalError);
    }
    debug!(
        "[write] attribute {} payload {}",
        OidDisplay(&unit.oid),
        unit.payload
    );

    Ok(w.offset() - start)
}

/// Write the attributes selected by `filter` in list order
fn write_units(
    w: &mut DerWriter,
    kind: AttributeKind,
    list: &mut AttributeList,
    object: ObjectKind,
    config: &AttributeConfig,
    filter: impl Fn(&AttributeUnit) -> bool,
) -> Result<usize, AttributeError> {
    let start = w.offset();
    let mut cursor = list.head();
    for _ in 0..ITERATIONS_LARGE {
        let Some(head) = cursor else {
            return Ok(w.offset() - start);
        };
        let unit = attribute_unit(kind, list, head, object, config)?;
        cursor = list.next_attribute(head)?;
        if let Some(unit) = unit.filter(|unit| filter(unit)) {
            write_unit(w, list, &unit)?;
        }
    }

    Err(AttributeError::IterationLimit)
}

/// Write attributes in DER SET OF order by repeatedly picking the smallest
/// encoding greater than the last one written
fn write_sorted_units(
    w: &mut DerWriter,
    kind: AttributeKind,
    list: &mut AttributeList,
    object: ObjectKind,
    config: &AttributeConfig,
) -> Result<usize, AttributeError> {
    let start = w.offset();
    let mut last: Option<Prefix> = None;
    for _ in 0..ITERATIONS_LARGE {
        let mut next: Option<(Prefix, AttributeUnit)> = None;
        for_each_unit(kind, list, object, config, |unit| {
            let prefix = unit.prefix()?;
            let after_last = last.as_ref().map_or(true, |last| prefix > *last);
            let smallest = next.as_ref().map_or(true, |(best, _)| prefix < *best);
            if after_last && smallest {
                next = Some((prefix, unit));
            }
            Ok(())
        })?;

        let Some((prefix, unit)) = next else {
            return Ok(w.offset() - start);
        };
        write_unit(w, list, &unit)?;
        last = Some(prefix);
    }

    Err(AttributeError::IterationLimit)
}

fn extension_request_size(size: usize) -> Result<usize, AttributeError> {
    structure(OID_EXTENSION_REQUEST.len() + structure(structure(size)?)?)
}

/// Sizes of the attributes written outside and inside extensionRequest
fn split_sizes(
    kind: AttributeKind,
    list: &AttributeList,
    object: ObjectKind,
    config: &AttributeConfig,
) -> Result<(usize, usize), AttributeError> {
    let mut special = 0;
    let mut standard = 0;
    for_each_unit(kind, list, object, config, |unit| {
        if object == ObjectKind::CertRequest && unit.special {
            special += unit.total()?;
        } else {
            standard += unit.total()?;
        }
        Ok(())
    })?;

    Ok((special, standard))
}

/// Size of the encoded attributes without the object's wrapper. The list
/// must have been through [`check_attributes`].
pub fn sizeof_attributes(
    kind: AttributeKind,
    list: &AttributeList,
    object: ObjectKind,
    config: &AttributeConfig,
) -> Result<usize, AttributeError> {
    let (special, standard) = split_sizes(kind, list, object, config)?;
    let size = match object {
        ObjectKind::CertRequest if standard > 0 => special + extension_request_size(standard)?,
        _ => special + standard,
    };
    debug!("[write] attributes for {:?}: {} bytes", object, size);

    Ok(size)
}

/// Tags of the wrappers around an object's attributes, outermost first
pub(crate) fn wrapper_tags(object: ObjectKind) -> &'static [u8] {
    const SEQUENCE: u8 = SEQUENCE_TAG;
    const TAG_0: u8 = CONTEXT_SPECIFIC | CONSTRUCTED;
    match object {
        ObjectKind::Certificate => &[TAG_0 | 3, SEQUENCE],
        ObjectKind::Crl => &[TAG_0, SEQUENCE],
        ObjectKind::OcspRequest => &[TAG_0 | 2, SEQUENCE],
        ObjectKind::OcspResponse => &[TAG_0 | 1, SEQUENCE],
        ObjectKind::AttributeCertificate | ObjectKind::PkiUser | ObjectKind::CrlEntry => &[SEQUENCE],
        ObjectKind::CrmfRequest | ObjectKind::RevocationRequest => &[],
        ObjectKind::CmsAttributes | ObjectKind::RtcsResponse | ObjectKind::CertRequest => &[TAG_0],
        ObjectKind::RtcsRequest => &[SET_OF_TAG],
    }
}

/// Size of `content` bytes of attributes once wrapped for `object`. Empty
/// attributes are left out, except in a certificate request where the
/// attributes field is mandatory.
pub fn encoded_attributes_size(object: ObjectKind, content: usize) -> Result<usize, AttributeError> {
    if content == 0 && object != ObjectKind::CertRequest {
        return Ok(0);
    }
    wrapper_tags(object)
        .iter()
        .try_fold(content, |size, _| structure(size))
}

/// Write the attributes in `list`, wrapped for `object`. The list must
/// have been through [`check_attributes`]. Returns the number of bytes
/// written, which is also what [`sizeof_attributes`] and
/// [`encoded_attributes_size`] give.
pub fn write_attributes(
    w: &mut DerWriter,
    kind: AttributeKind,
    list: &mut AttributeList,
    object: ObjectKind,
    config: &AttributeConfig,
) -> Result<usize, AttributeError> {
    let content = sizeof_attributes(kind, list, object, config)?;
    let total = encoded_attributes_size(object, content)?;
    if total == 0 {
        return Ok(0);
    }
    let start = w.offset();

    // Each wrapper holds the ones inside it
    let tags = wrapper_tags(object);
    let mut sizes = ArrayVec::<usize, 2>::new();
    let mut size = content;
    for _ in tags.iter().rev() {
        sizes
            .try_push(size)
            .map_err(|_| AttributeError::InternalError)?;
        size = structure(size)?;
    }
    for (tag, size) in tags.iter().zip(sizes.iter().rev()) {
        w.encode_header(*tag, *size)?;
    }

    match object {
        ObjectKind::CmsAttributes | ObjectKind::RtcsRequest | ObjectKind::RtcsResponse => {
            write_sorted_units(w, kind, list, object, config)?;
        }
        ObjectKind::CertRequest => {
            let (_, standard) = split_sizes(kind, list, object, config)?;
            write_units(w, kind, list, object, config, |unit| unit.special)?;
            if standard > 0 {
                w.encode_header(
                    SEQUENCE_TAG,
                    OID_EXTENSION_REQUEST.len() + structure(structure(standard)?)?,
                )?;
                w.encode_bytes(OID_EXTENSION_REQUEST)?;
                w.encode_header(SET_OF_TAG, structure(standard)?)?;
                w.encode_header(SEQUENCE_TAG, standard)?;
                write_units(w, kind, list, object, config, |unit| !unit.special)?;
            }
        }
        _ => {
            write_units(w, kind, list, object, config, |_| true)?;
        }
    }

    let written = w.offset() - start;
    if written != total {
        debug!("[write] wrote {} bytes, sized {}", written, total);
        return Err(AttributeError::InternalError);
    }

    Ok(written)
}

/// Validate `list` for `object` and encode it into `buffer`. Returns the
/// encoded length.
pub fn encode_attributes(
    list: &mut AttributeList,
    object: ObjectKind,
    config: &AttributeConfig,
    buffer: &mut [u8],
) -> Result<usize, AttributeError> {
    let kind = object.attribute_kind();
    check_attributes(kind, list)?;
    validate_for_object(list, object)?;

    let mut w = DerWriter::new(buffer);
    write_attributes(&mut w, kind, list, object, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        add::AttributeValue,
        asn1::DerReader,
        config::EncodingOptions,
        field_id,
    };
    use rand::seq::SliceRandom;
    use rand::thread_rng;
    use x509_parser::nom::Parser;
    use x509_parser::prelude::*;

    const OID_UNKNOWN: [u8; 6] = [0x06, 0x04, 0x2A, 0x03, 0x04, 0x05];

    fn add(list: &mut AttributeList, field_id: FieldId, sub_field_id: FieldId, value: AttributeValue) -> FieldRef {
        list.add_field(
            attribute_kind(field_id),
            field_id,
            sub_field_id,
            value,
            FieldFlags::empty(),
        )
        .unwrap()
    }

    fn attribute_kind(field_id: FieldId) -> AttributeKind {
        if field_id >= field_id::CMS_CONTENT_TYPE {
            AttributeKind::Cms
        } else {
            AttributeKind::Certificate
        }
    }

    fn encode(list: &mut AttributeList, object: ObjectKind, config: &AttributeConfig) -> Vec<u8> {
        let mut buffer = [0u8; 1024];
        let len = encode_attributes(list, object, config, &mut buffer).unwrap();
        buffer[..len].to_vec()
    }

    fn encode_bare(list: &mut AttributeList) -> Vec<u8> {
        encode(list, ObjectKind::CrmfRequest, &AttributeConfig::default())
    }

    fn parse_extension(der: &[u8]) -> X509Extension<'_> {
        let mut parser = X509ExtensionParser::new().with_deep_parse_extensions(true);
        let (rem, ext) = parser.parse(der).unwrap();
        assert!(rem.is_empty());
        ext
    }

    #[test]
    fn test_basic_constraints() {
        let mut list = AttributeList::new();
        let ca = add(&mut list, field_id::CA, FieldId::NONE, AttributeValue::Integer(1));
        let der = encode_bare(&mut list);
        assert_eq!(
            der,
            vec![
                0x30, 0x0F, 0x06, 0x03, 0x55, 0x1D, 0x13, 0x01, 0x01, 0xFF, 0x04, 0x05, 0x30,
                0x03, 0x01, 0x01, 0xFF
            ]
        );
        let ext = parse_extension(&der);
        assert!(ext.critical);
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => {
                assert!(bc.ca);
                assert_eq!(bc.path_len_constraint, None);
            }
            _ => panic!("Wrong extension"),
        }

        // cA at its default leaves an empty SEQUENCE
        list.field_mut(ca).unwrap().value = crate::list::FieldValue::Integer(0);
        assert_eq!(
            encode_bare(&mut list),
            vec![0x30, 0x0C, 0x06, 0x03, 0x55, 0x1D, 0x13, 0x01, 0x01, 0xFF, 0x04, 0x02, 0x30, 0x00]
        );

        // Inside a certificate's [3] { SEQUENCE }
        list.field_mut(ca).unwrap().value = crate::list::FieldValue::Integer(1);
        let der = encode(&mut list, ObjectKind::Certificate, &AttributeConfig::default());
        assert_eq!(&der[..4], &[0xA3, 0x13, 0x30, 0x11]);
        assert_eq!(der.len(), 21);
    }

    #[test]
    fn test_key_usage() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
        let der = encode_bare(&mut list);
        assert_eq!(
            der,
            vec![0x30, 0x0E, 0x06, 0x03, 0x55, 0x1D, 0x0F, 0x01, 0x01, 0xFF, 0x04, 0x04, 0x03, 0x02, 0x05, 0xA0]
        );

        let ext = parse_extension(&der);
        let (_, key_usage) = KeyUsage::from_der(ext.value).unwrap();
        assert!(key_usage.digital_signature());
        assert!(key_usage.key_encipherment());
        assert!(!key_usage.non_repudiation());
    }

    #[test]
    fn test_key_usage_order_independent() {
        let mut alone = AttributeList::new();
        add(&mut alone, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
        let alone = encode_bare(&mut alone);

        for key_usage_first in [true, false] {
            let mut list = AttributeList::new();
            if key_usage_first {
                add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
            }
            add(
                &mut list,
                field_id::SUBJECT_ALT_NAME,
                field_id::DNS_NAME,
                AttributeValue::Bytes(b"www.example.com"),
            );
            if !key_usage_first {
                add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
            }
            let der = encode_bare(&mut list);
            assert_eq!(&der[..alone.len()], &alone[..]);
        }
    }

    #[test]
    fn test_size_matches_write() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x1FF));
        add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::RFC822_NAME,
            AttributeValue::Bytes(b"user@example.com"),
        );
        add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::IP_ADDRESS,
            AttributeValue::Bytes(&[192, 168, 0, 1]),
        );
        add(&mut list, field_id::PATH_LEN_CONSTRAINT, FieldId::NONE, AttributeValue::Integer(3));
        add(
            &mut list,
            field_id::CERTPOLICY_ID,
            FieldId::NONE,
            AttributeValue::Bytes(b"1.2.3.4"),
        );
        add(
            &mut list,
            field_id::CHALLENGE_PASSWORD,
            FieldId::NONE,
            AttributeValue::Bytes("Gr\u{fc}\u{df}e".as_bytes()),
        );
        add(&mut list, field_id::EXTKEY_SERVER_AUTH, FieldId::NONE, AttributeValue::Unused);
        add(&mut list, field_id::EXTKEY_CLIENT_AUTH, FieldId::NONE, AttributeValue::Unused);

        let kind = AttributeKind::Certificate;
        let config = AttributeConfig::default();
        check_attributes(kind, &mut list).unwrap();
        for object in [ObjectKind::Certificate, ObjectKind::CertRequest, ObjectKind::CrmfRequest] {
            let content = sizeof_attributes(kind, &list, object, &config).unwrap();
            let expected = encoded_attributes_size(object, content).unwrap();

            let mut null = DerWriter::null();
            let counted = write_attributes(&mut null, kind, &mut list, object, &config).unwrap();
            assert_eq!(counted, expected);

            let mut buffer = [0u8; 1024];
            let mut w = DerWriter::new(&mut buffer);
            let written = write_attributes(&mut w, kind, &mut list, object, &config).unwrap();
            assert_eq!(written, expected);
            assert!(crate::asn1::validate_der(&buffer[..written]).is_ok());
        }
    }

    #[test]
    fn test_subject_alt_name() {
        let mut list = AttributeList::new();
        add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"www.example.com"),
        );
        add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"example.com"),
        );
        let der = encode_bare(&mut list);
        assert_eq!(&der[..2], &[0x30, 0x27]);

        let ext = parse_extension(&der);
        assert!(!ext.critical);
        match ext.parsed_extension() {
            ParsedExtension::SubjectAlternativeName(san) => {
                assert_eq!(
                    san.general_names,
                    vec![
                        GeneralName::DNSName("www.example.com"),
                        GeneralName::DNSName("example.com")
                    ]
                );
            }
            _ => panic!("Wrong extension"),
        }
    }

    #[test]
    fn test_crl_distribution_point_nesting() {
        let uri = b"http://crl.example.com/ca.crl";
        let mut list = AttributeList::new();
        add(
            &mut list,
            field_id::CRLDIST_FULL_NAME,
            field_id::UNIFORM_RESOURCE_IDENTIFIER,
            AttributeValue::Bytes(uri),
        );
        add(&mut list, field_id::CRLDIST_REASONS, FieldId::NONE, AttributeValue::Integer(0x06));
        let der = encode_bare(&mut list);

        let mut expected = vec![0x30, 0x29, 0x30, 0x27, 0xA0, 0x21, 0xA0, 0x1F, 0x86, 0x1D];
        expected.extend_from_slice(uri);
        expected.extend_from_slice(&[0x81, 0x02, 0x05, 0x60]);
        let ext = parse_extension(&der);
        assert_eq!(ext.value, &expected[..]);
    }

    #[test]
    fn test_certificate_policies() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::CERTPOLICY_ID, FieldId::NONE, AttributeValue::Bytes(b"1.2.3.4"));
        add(
            &mut list,
            field_id::CERTPOLICY_ID,
            FieldId::NONE,
            AttributeValue::Bytes(b"2.5.29.32.0"),
        );
        let der = encode_bare(&mut list);
        let ext = parse_extension(&der);
        assert_eq!(
            ext.value,
            &[
                0x30, 0x0F, 0x30, 0x05, 0x06, 0x03, 0x2A, 0x03, 0x04, 0x30, 0x06, 0x06, 0x04, 0x55,
                0x1D, 0x20, 0x00
            ]
        );
    }

    #[test]
    fn test_all_default_attribute_omitted() {
        let mut list = AttributeList::new();
        let user_certs = add(
            &mut list,
            field_id::ISSUINGDIST_USER_CERTS_ONLY,
            FieldId::NONE,
            AttributeValue::Integer(0),
        );
        let config = AttributeConfig::default();
        assert!(encode(&mut list, ObjectKind::Crl, &config).is_empty());

        list.field_mut(user_certs).unwrap().value = crate::list::FieldValue::Integer(1);
        let der = encode(&mut list, ObjectKind::Crl, &config);
        assert_eq!(&der[..4], &[0xA0, 0x13, 0x30, 0x11]);
        assert_eq!(
            &der[4..],
            &[
                0x30, 0x0F, 0x06, 0x03, 0x55, 0x1D, 0x1C, 0x01, 0x01, 0xFF, 0x04, 0x05, 0x30, 0x03,
                0x81, 0x01, 0xFF
            ]
        );
    }

    #[test]
    fn test_authority_info_access() {
        let mut list = AttributeList::new();
        for uri in [&b"http://ocsp.example.com"[..], b"http://ocsp.example.org"] {
            add(
                &mut list,
                field_id::AUTHINFO_OCSP,
                field_id::UNIFORM_RESOURCE_IDENTIFIER,
                AttributeValue::Bytes(uri),
            );
        }
        let der = encode_bare(&mut list);
        let ext = parse_extension(&der);
        assert_eq!(&ext.value[..4], &[0x30, 0x4A, 0x30, 0x23]);
        match ext.parsed_extension() {
            ParsedExtension::AuthorityInfoAccess(aia) => {
                assert_eq!(aia.accessdescs.len(), 2);
                for (desc, uri) in aia
                    .accessdescs
                    .iter()
                    .zip(["http://ocsp.example.com", "http://ocsp.example.org"])
                {
                    assert_eq!(desc.access_method.to_id_string(), "1.3.6.1.5.5.7.48.1");
                    assert_eq!(desc.access_location, GeneralName::URI(uri));
                }
            }
            _ => panic!("Wrong extension"),
        }
    }

    #[test]
    fn test_hold_instruction() {
        let mut list = AttributeList::new();
        add(
            &mut list,
            field_id::HOLD_INSTRUCTION_CODE,
            FieldId::NONE,
            AttributeValue::Integer(field_id::HOLD_INSTRUCTION_REJECT),
        );
        let der = encode(&mut list, ObjectKind::CrlEntry, &AttributeConfig::default());
        assert_eq!(
            der,
            vec![
                0x30, 0x12, 0x30, 0x10, 0x06, 0x03, 0x55, 0x1D, 0x17, 0x04, 0x09, 0x06, 0x07, 0x2A,
                0x86, 0x48, 0xCE, 0x38, 0x02, 0x03
            ]
        );
    }

    #[test]
    fn test_cert_request() {
        let config = AttributeConfig::default();
        let mut list = AttributeList::new();
        // The attributes field of a request is never left out
        assert_eq!(encode(&mut list, ObjectKind::CertRequest, &config), vec![0xA0, 0x00]);

        add(
            &mut list,
            field_id::CHALLENGE_PASSWORD,
            FieldId::NONE,
            AttributeValue::Bytes(b"secret"),
        );
        add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
        let der = encode(&mut list, ObjectKind::CertRequest, &config);

        let mut expected = vec![
            0xA0, 0x38, 0x30, 0x15, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09,
            0x07, 0x31, 0x08, 0x13, 0x06,
        ];
        expected.extend_from_slice(b"secret");
        expected.extend_from_slice(&[0x30, 0x1F]);
        expected.extend_from_slice(OID_EXTENSION_REQUEST);
        expected.extend_from_slice(&[0x31, 0x12, 0x30, 0x10]);
        expected.extend_from_slice(&[
            0x30, 0x0E, 0x06, 0x03, 0x55, 0x1D, 0x0F, 0x01, 0x01, 0xFF, 0x04, 0x04, 0x03, 0x02,
            0x05, 0xA0,
        ]);
        assert_eq!(der, expected);
    }

    #[test]
    fn test_blob_needs_sign_unrecognised() {
        let kind = AttributeKind::Certificate;
        let mut list = AttributeList::new();
        list.add_blob_attribute(kind, &OID_UNKNOWN, &[0x05, 0x00], false)
            .unwrap();
        assert!(encode_bare(&mut list).is_empty());

        let config = AttributeConfig::new(
            EncodingOptions::SIGN_UNRECOGNISED,
            Default::default(),
        );
        assert_eq!(
            encode(&mut list, ObjectKind::CrmfRequest, &config),
            vec![0x30, 0x0A, 0x06, 0x04, 0x2A, 0x03, 0x04, 0x05, 0x04, 0x02, 0x05, 0x00]
        );

        let blob = list.head().unwrap();
        list.set_critical(blob, true).unwrap();
        assert_eq!(
            encode(&mut list, ObjectKind::CrmfRequest, &config),
            vec![
                0x30, 0x0D, 0x06, 0x04, 0x2A, 0x03, 0x04, 0x05, 0x01, 0x01, 0xFF, 0x04, 0x02, 0x05,
                0x00
            ]
        );
    }

    #[test]
    fn test_cms_order() {
        let digest = [0xABu8; 32];
        let mut adds: Vec<(FieldId, AttributeValue)> = vec![
            (
                field_id::CMS_CONTENT_TYPE,
                AttributeValue::Integer(field_id::CONTENT_DATA),
            ),
            (field_id::CMS_MESSAGE_DIGEST, AttributeValue::Bytes(&digest)),
            (field_id::CMS_SIGNING_TIME, AttributeValue::Time(1_700_000_000)),
            (field_id::SMIMECAP_AES128, AttributeValue::Unused),
            (field_id::SMIMECAP_CAST128, AttributeValue::Unused),
        ];

        let config = AttributeConfig::default();
        let mut first: Option<Vec<u8>> = None;
        let mut rng = thread_rng();
        for _ in 0..8 {
            adds.shuffle(&mut rng);
            let mut list = AttributeList::new();
            for (field_id, value) in &adds {
                add(&mut list, *field_id, FieldId::NONE, *value);
            }
            let der = encode(&mut list, ObjectKind::CmsAttributes, &config);
            match &first {
                Some(first) => assert_eq!(&der, first),
                None => first = Some(der),
            }
        }

        // SET OF members in ascending order
        let der = first.unwrap();
        let mut reader = DerReader::new(&der);
        let set = reader.read_tlv().unwrap();
        assert_eq!(set.tag, 0xA0);
        assert!(reader.is_empty());
        let mut members = DerReader::new(set.content);
        let mut previous: Option<&[u8]> = None;
        let mut count = 0;
        while !members.is_empty() {
            let member = members.read_tlv().unwrap().encoded;
            if let Some(previous) = previous {
                assert!(member > previous);
            }
            previous = Some(member);
            count += 1;
        }
        assert_eq!(count, 4);
        // contentType (30 18) sorts ahead of signingTime (30 1C)
        assert_eq!(&set.content[..2], &[0x30, 0x18]);
    }

    #[test]
    fn test_smime_capabilities() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::SMIMECAP_3DES, FieldId::NONE, AttributeValue::Unused);
        add(&mut list, field_id::SMIMECAP_CAST128, FieldId::NONE, AttributeValue::Unused);
        let der = encode(&mut list, ObjectKind::CmsAttributes, &AttributeConfig::default());

        // SEQUENCE { SEQUENCE { des-ede3-cbc }, SEQUENCE { cast5-cbc, 128 } }
        let mut value = vec![0x30, 0x1D, 0x30, 0x0A];
        value.extend_from_slice(&[0x06, 0x08, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x03, 0x07]);
        value.extend_from_slice(&[0x30, 0x0F]);
        value.extend_from_slice(&[0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF6, 0x7D, 0x07, 0x42, 0x0A]);
        value.extend_from_slice(&[0x02, 0x02, 0x00, 0x80]);
        assert!(der.ends_with(&value));
        assert_eq!(&der[der.len() - value.len() - 2..der.len() - value.len()], &[0x31, 0x1F]);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
        let mut buffer = [0u8; 10];
        assert_eq!(
            encode_attributes(
                &mut list,
                ObjectKind::CrmfRequest,
                &AttributeConfig::default(),
                &mut buffer
            ),
            Err(AttributeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_wrong_object() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::CRL_NUMBER, FieldId::NONE, AttributeValue::Integer(7));
        let mut buffer = [0u8; 64];
        assert_eq!(
            encode_attributes(
                &mut list,
                ObjectKind::Certificate,
                &AttributeConfig::default(),
                &mut buffer
            ),
            Err(AttributeError::AttributePresent(field_id::CRL_NUMBER))
        );
    }
}
