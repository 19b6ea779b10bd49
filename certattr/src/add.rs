// Licensed under the Apache-2.0 license

//! Adding fields to and deleting fields from an attribute list.

use crate::{
    asn1::{validate_der, BIT_STRING_TAG, OID_TAG, SEQUENCE_TAG},
    dn::EncodedDn,
    error::AttributeError,
    field_id::FieldId,
    list::{AttributeField, AttributeList, FieldFlags, FieldRef, FieldValue},
    lookup::{find_attribute_by_oid, find_attribute_field},
    oid::{oid_from_text, validate_oid, EncodedOid},
    table::{field_id_to_attribute, oid_to_attribute, start_attribute_id, AttributeTypeEntry, FieldType},
    time::{encode_generalized_time, UTC_TIME_MAX, UTC_TIME_MIN},
    AttributeKind, MAX_FIELD_DATA_SIZE,
};

/// A value handed to [`AttributeList::add_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// For fields whose presence is the value, such as identifiers
    Unused,
    /// Integers, booleans, bit masks and CHOICE selectors
    Integer(i64),
    /// Seconds since the Unix epoch
    Time(i64),
    /// Strings, OIDs (DER or dotted text) and pre-encoded blobs
    Bytes(&'a [u8]),
    /// A DER-encoded Name
    Dn(&'a [u8]),
}

/// Flags a caller may set on a new field
const CALLER_FLAGS: FieldFlags = FieldFlags::CRITICAL
    .union(FieldFlags::LOCKED)
    .union(FieldFlags::BLOB_PAYLOAD)
    .union(FieldFlags::MULTIVALUED);

fn in_range(entry: &AttributeTypeEntry, value: i64) -> bool {
    value >= entry.range.0 && value <= entry.range.1
}

fn check_length(entry: &AttributeTypeEntry, len: usize, locus: FieldId) -> Result<(), AttributeError> {
    let upper = if entry.range.1 > 0 {
        entry.range.1
    } else {
        MAX_FIELD_DATA_SIZE as i64
    };
    if (len as i64) < entry.range.0 || len as i64 > upper {
        return Err(AttributeError::InvalidSize(locus));
    }

    Ok(())
}

pub(crate) fn is_printable(c: u8) -> bool {
    c.is_ascii_alphanumeric() || b" '()+,-./:=?".contains(&c)
}

fn check_charset(field_type: FieldType, text: &[u8], locus: FieldId) -> Result<(), AttributeError> {
    let valid = match field_type {
        FieldType::NumericString => text.iter().all(|&c| c.is_ascii_digit() || c == b' '),
        FieldType::PrintableString => text.iter().all(|&c| is_printable(c)),
        FieldType::Ia5String => text.is_ascii(),
        FieldType::BmpString => core::str::from_utf8(text)
            .map(|s| s.chars().all(|c| (c as u32) <= 0xFFFF))
            .unwrap_or(false),
        FieldType::Utf8String | FieldType::TextString => core::str::from_utf8(text).is_ok(),
        _ => true,
    };
    if !valid {
        return Err(AttributeError::InvalidValue(locus));
    }

    Ok(())
}

/// Type and range check `value` against `entry`, converting it to the form
/// held in the list
fn make_value(
    entry: &AttributeTypeEntry,
    value: AttributeValue,
    locus: FieldId,
) -> Result<FieldValue, AttributeError> {
    let invalid = AttributeError::InvalidValue(locus);

    match (entry.field_type, value) {
        (FieldType::Identifier | FieldType::Null, AttributeValue::Unused) => {
            Ok(FieldValue::Integer(0))
        }
        (FieldType::Boolean, AttributeValue::Integer(value)) => {
            Ok(FieldValue::Integer(i64::from(value != 0)))
        }
        (
            FieldType::Integer | FieldType::Enumerated | FieldType::BitString | FieldType::Choice,
            AttributeValue::Integer(value),
        ) => {
            if !in_range(entry, value) {
                return Err(invalid);
            }
            Ok(FieldValue::Integer(value))
        }
        (FieldType::UtcTime, AttributeValue::Time(time)) => {
            if !(UTC_TIME_MIN..=UTC_TIME_MAX).contains(&time) {
                return Err(invalid);
            }
            Ok(FieldValue::Time(time))
        }
        (FieldType::GeneralizedTime, AttributeValue::Time(time)) => {
            encode_generalized_time(time).map_err(|_| invalid)?;
            Ok(FieldValue::Time(time))
        }
        (field_type, AttributeValue::Bytes(text)) if field_type.is_string() => {
            check_length(entry, text.len(), locus)?;
            check_charset(field_type, text, locus)?;
            FieldValue::from_bytes(text)
        }
        (FieldType::ObjectIdentifier, AttributeValue::Bytes(oid)) => {
            if oid.first() == Some(&OID_TAG) {
                validate_oid(oid).map_err(|_| invalid)?;
                FieldValue::from_bytes(oid)
            } else {
                FieldValue::from_bytes(&oid_from_text(oid, locus)?)
            }
        }
        (field_type, AttributeValue::Bytes(blob)) if field_type.is_blob() => {
            check_length(entry, blob.len(), locus)?;
            validate_der(blob).map_err(|_| invalid)?;
            let tag_ok = match field_type {
                FieldType::BlobBitString => blob.first() == Some(&BIT_STRING_TAG),
                FieldType::BlobSequence => blob.first() == Some(&SEQUENCE_TAG),
                _ => true,
            };
            if !tag_ok {
                return Err(invalid);
            }
            FieldValue::from_bytes(blob)
        }
        (FieldType::Dn, AttributeValue::Dn(dn)) => {
            Ok(FieldValue::Dn(EncodedDn::from_der(dn).map_err(|_| invalid)?))
        }
        _ => Err(invalid),
    }
}

impl AttributeList {
    /// Add a field, keeping the list in encoding order. `sub_field_id`
    /// selects the GeneralName component of a sub-typed field and is
    /// `FieldId::NONE` otherwise.
    pub fn add_field(
        &mut self,
        kind: AttributeKind,
        field_id: FieldId,
        sub_field_id: FieldId,
        value: AttributeValue,
        flags: FieldFlags,
    ) -> Result<FieldRef, AttributeError> {
        let (parent, attribute_id) = field_id_to_attribute(kind, field_id, FieldId::NONE)
            .ok_or(AttributeError::UnknownField(field_id))?;
        let parent = parent.entry();
        let is_subtyped = parent.field_type == FieldType::Subtyped;
        if is_subtyped != (sub_field_id != FieldId::NONE) {
            return Err(AttributeError::UnknownField(field_id));
        }
        let entry = if is_subtyped {
            field_id_to_attribute(kind, field_id, sub_field_id)
                .ok_or(AttributeError::UnknownField(sub_field_id))?
                .0
                .entry()
        } else {
            parent
        };
        if entry.field_type.is_constructed() || entry.field_type == FieldType::Subtyped {
            return Err(AttributeError::UnknownField(field_id));
        }

        let multivalued = entry.is_multivalued()
            || parent.is_multivalued()
            || flags.contains(FieldFlags::MULTIVALUED);
        if !multivalued && find_attribute_field(self, field_id, sub_field_id).is_some() {
            return Err(AttributeError::AttributePresent(field_id));
        }

        let locus = if is_subtyped { sub_field_id } else { field_id };
        let mut field = AttributeField::new(attribute_id, field_id);
        field.sub_field_id = sub_field_id;
        field.flags = flags.intersection(CALLER_FLAGS);
        field.flags.set(FieldFlags::MULTIVALUED, multivalued);

        if flags.contains(FieldFlags::BLOB_PAYLOAD) {
            let AttributeValue::Bytes(blob) = value else {
                return Err(AttributeError::InvalidValue(locus));
            };
            validate_der(blob).map_err(|_| AttributeError::InvalidValue(locus))?;
            field.value = FieldValue::from_bytes(blob)?;
        } else {
            field.value = make_value(entry, value, locus)?;
            if let Some(validator) = entry.get_validator() {
                validator(&field)
                    .map_err(|error_type| AttributeError::CustomValidationFailed(locus, error_type))?;
            }
        }

        let after = self
            .iter()
            .filter(|(_, existing)| {
                !existing.is_blob()
                    && (existing.field_id < field_id
                        || (existing.field_id == field_id && existing.sub_field_id <= sub_field_id))
            })
            .last()
            .map(|(field_ref, _)| field_ref);

        self.insert_after(after, field)
    }

    /// Add an unrecognised attribute as its OID and encoded value
    pub fn add_blob_attribute(
        &mut self,
        kind: AttributeKind,
        oid: &[u8],
        data: &[u8],
        critical: bool,
    ) -> Result<FieldRef, AttributeError> {
        validate_oid(oid)?;
        if let Some(start) = oid_to_attribute(kind, oid)? {
            let attribute_id =
                start_attribute_id(start.table(), start.index()).unwrap_or(FieldId::NONE);
            return Err(AttributeError::AttributePresent(attribute_id));
        }
        if find_attribute_by_oid(self, oid).is_some() {
            return Err(AttributeError::AttributePresent(FieldId::NONE));
        }
        validate_der(data)?;

        let flags = if critical {
            FieldFlags::CRITICAL
        } else {
            FieldFlags::empty()
        };
        self.push_blob(oid, data, flags)
    }

    /// Append a blob without checking it against the table, used for
    /// recognised attributes that are carried undecoded
    pub(crate) fn push_blob(
        &mut self,
        oid: &[u8],
        data: &[u8],
        flags: FieldFlags,
    ) -> Result<FieldRef, AttributeError> {
        let mut field = AttributeField::new(FieldId::NONE, FieldId::NONE);
        field.flags = flags | FieldFlags::BLOB;
        let mut encoded_oid = EncodedOid::new();
        encoded_oid
            .try_extend_from_slice(oid)
            .map_err(|_| AttributeError::ValueTooLarge)?;
        field.oid = Some(encoded_oid);
        field.value = FieldValue::from_bytes(data)?;

        self.push_back(field)
    }

    /// Delete one field. Returns where a cursor on the field should move
    /// to: the following field, or the preceding one at the end of the list.
    pub fn delete_field(&mut self, field_ref: FieldRef) -> Result<Option<FieldRef>, AttributeError> {
        let field = self.field(field_ref)?;
        if field.is_locked() {
            return Err(AttributeError::PermissionDenied);
        }
        let cursor = field.next().or(field.prev());
        self.remove(field_ref)?;

        Ok(cursor)
    }

    /// Delete every instance of `field_id`
    pub fn delete_composite_field(&mut self, field_id: FieldId) -> Result<(), AttributeError> {
        let mut found = false;
        for (_, field) in self.iter() {
            if !field.is_blob() && field.field_id == field_id {
                if field.is_locked() {
                    return Err(AttributeError::PermissionDenied);
                }
                found = true;
            }
        }
        if !found {
            return Err(AttributeError::NotFound);
        }

        let mut cursor = self.head();
        while let Some(current) = cursor {
            cursor = self.next(current);
            let field = self.field(current)?;
            if !field.is_blob() && field.field_id == field_id {
                self.remove(current)?;
            }
        }

        Ok(())
    }

    /// Delete the whole attribute `field_ref` belongs to. Returns the
    /// field that followed it, or the one before it.
    pub fn delete_attribute(&mut self, field_ref: FieldRef) -> Result<Option<FieldRef>, AttributeError> {
        let head = self.attribute_head(field_ref)?;
        let end = self.next_attribute(head)?;

        let mut cursor = Some(head);
        while let Some(current) = cursor.filter(|current| Some(*current) != end) {
            if self.field(current)?.is_locked() {
                return Err(AttributeError::PermissionDenied);
            }
            cursor = self.next(current);
        }

        let before = self.prev(head);
        let mut cursor = Some(head);
        while let Some(current) = cursor.filter(|current| Some(*current) != end) {
            cursor = self.next(current);
            self.remove(current)?;
        }

        Ok(end.or(before))
    }

    pub fn delete_all(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dn::tests::TEST_DN, error::ErrorType, field_id, lookup::find_attribute};

    const KIND: AttributeKind = AttributeKind::Certificate;
    const OID_UNKNOWN: [u8; 6] = [0x06, 0x04, 0x2A, 0x03, 0x04, 0x05];

    fn add(list: &mut AttributeList, field_id: FieldId, value: AttributeValue) -> Result<FieldRef, AttributeError> {
        list.add_field(KIND, field_id, FieldId::NONE, value, FieldFlags::empty())
    }

    fn add_name(list: &mut AttributeList, sub_field_id: FieldId, name: &[u8]) -> Result<FieldRef, AttributeError> {
        list.add_field(
            KIND,
            field_id::SUBJECT_ALT_NAME,
            sub_field_id,
            AttributeValue::Bytes(name),
            FieldFlags::empty(),
        )
    }

    fn ids(list: &AttributeList) -> Vec<(FieldId, FieldId)> {
        list.iter()
            .map(|(_, field)| (field.field_id, field.sub_field_id))
            .collect()
    }

    #[test]
    fn test_add_keeps_order() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::CA, AttributeValue::Integer(1)).unwrap();
        list.add_blob_attribute(KIND, &OID_UNKNOWN, &[0x05, 0x00], false)
            .unwrap();
        add_name(&mut list, field_id::UNIFORM_RESOURCE_IDENTIFIER, b"http://www.example.com").unwrap();
        add(&mut list, field_id::KEY_USAGE, AttributeValue::Integer(0x05)).unwrap();
        add_name(&mut list, field_id::DNS_NAME, b"a.example.com").unwrap();
        add_name(&mut list, field_id::DNS_NAME, b"b.example.com").unwrap();

        assert_eq!(
            ids(&list),
            vec![
                (field_id::KEY_USAGE, FieldId::NONE),
                (field_id::SUBJECT_ALT_NAME, field_id::DNS_NAME),
                (field_id::SUBJECT_ALT_NAME, field_id::DNS_NAME),
                (field_id::SUBJECT_ALT_NAME, field_id::UNIFORM_RESOURCE_IDENTIFIER),
                (field_id::CA, FieldId::NONE),
                (FieldId::NONE, FieldId::NONE),
            ]
        );

        // Repeated names keep the order they were added in
        let first = find_attribute(&list, field_id::SUBJECT_ALT_NAME).unwrap();
        assert_eq!(
            list.field(first).unwrap().value.as_bytes(),
            Some(&b"a.example.com"[..])
        );
        assert!(list.field(first).unwrap().flags.contains(FieldFlags::MULTIVALUED));
        assert_eq!(
            list.field(first).unwrap().attribute_id,
            field_id::SUBJECT_ALT_NAME
        );
        let ca = find_attribute_field(&list, field_id::CA, FieldId::NONE).unwrap();
        assert_eq!(
            list.field(ca).unwrap().attribute_id,
            field_id::BASIC_CONSTRAINTS
        );
    }

    #[test]
    fn test_add_rejects_unknown() {
        let mut list = AttributeList::new();
        assert_eq!(
            add(&mut list, FieldId(4242), AttributeValue::Integer(1)),
            Err(AttributeError::UnknownField(FieldId(4242)))
        );
        // A GeneralName needs its component
        assert_eq!(
            add(&mut list, field_id::SUBJECT_ALT_NAME, AttributeValue::Bytes(b"x")),
            Err(AttributeError::UnknownField(field_id::SUBJECT_ALT_NAME))
        );
        // Only sub-typed fields take a component
        assert_eq!(
            list.add_field(
                KIND,
                field_id::HOLD_INSTRUCTION_CODE,
                FieldId(2),
                AttributeValue::Unused,
                FieldFlags::empty()
            ),
            Err(AttributeError::UnknownField(field_id::HOLD_INSTRUCTION_CODE))
        );
        // Wrappers aren't fields
        assert_eq!(
            add(&mut list, field_id::BASIC_CONSTRAINTS, AttributeValue::Unused),
            Err(AttributeError::UnknownField(field_id::BASIC_CONSTRAINTS))
        );
        assert!(list.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::KEY_USAGE, AttributeValue::Integer(1)).unwrap();
        assert_eq!(
            add(&mut list, field_id::KEY_USAGE, AttributeValue::Integer(2)),
            Err(AttributeError::AttributePresent(field_id::KEY_USAGE))
        );
        add(&mut list, field_id::CERTPOLICY_ID, AttributeValue::Bytes(b"1.2.3.4")).unwrap();
        add(&mut list, field_id::CERTPOLICY_ID, AttributeValue::Bytes(b"1.2.3.5")).unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_add_checks_values() {
        let mut list = AttributeList::new();
        assert_eq!(
            add(&mut list, field_id::PATH_LEN_CONSTRAINT, AttributeValue::Integer(65)),
            Err(AttributeError::InvalidValue(field_id::PATH_LEN_CONSTRAINT))
        );
        assert_eq!(
            add(&mut list, field_id::SUBJECT_KEY_IDENTIFIER, AttributeValue::Bytes(b"")),
            Err(AttributeError::InvalidSize(field_id::SUBJECT_KEY_IDENTIFIER))
        );
        assert_eq!(
            add(&mut list, field_id::CRL_NUMBER, AttributeValue::Bytes(b"1")),
            Err(AttributeError::InvalidValue(field_id::CRL_NUMBER))
        );
        assert_eq!(
            add_name(&mut list, field_id::DNS_NAME, "b\u{fc}cher.example".as_bytes()),
            Err(AttributeError::InvalidValue(field_id::DNS_NAME))
        );
        assert_eq!(
            add_name(&mut list, field_id::DNS_NAME, b"bad_name.example.com"),
            Err(AttributeError::CustomValidationFailed(
                field_id::DNS_NAME,
                ErrorType::AttrValue
            ))
        );
        assert_eq!(
            add(&mut list, field_id::CRL_REASON, AttributeValue::Integer(7)),
            Err(AttributeError::CustomValidationFailed(
                field_id::CRL_REASON,
                ErrorType::AttrValue
            ))
        );
        assert_eq!(
            add(&mut list, field_id::EXTKEY_SERVER_AUTH, AttributeValue::Integer(1)),
            Err(AttributeError::InvalidValue(field_id::EXTKEY_SERVER_AUTH))
        );
        assert_eq!(
            add_name(&mut list, field_id::DIRECTORY_NAME, b"CN=Test"),
            Err(AttributeError::InvalidValue(field_id::DIRECTORY_NAME))
        );
        assert!(list.is_empty());

        // Booleans are normalised, OIDs may be given as text
        let ca = add(&mut list, field_id::CA, AttributeValue::Integer(5)).unwrap();
        assert_eq!(list.field(ca).unwrap().value, FieldValue::Integer(1));
        let policy =
            add(&mut list, field_id::CERTPOLICY_ID, AttributeValue::Bytes(b"2.5.29.32.0")).unwrap();
        assert_eq!(
            list.field(policy).unwrap().value.as_bytes(),
            Some(&[0x06, 0x04, 0x55, 0x1D, 0x20, 0x00][..])
        );
        let name = list
            .add_field(
                KIND,
                field_id::SUBJECT_ALT_NAME,
                field_id::DIRECTORY_NAME,
                AttributeValue::Dn(&TEST_DN),
                FieldFlags::empty(),
            )
            .unwrap();
        assert_eq!(
            list.field(name).unwrap().value.as_dn().unwrap().as_bytes(),
            &TEST_DN
        );
    }

    #[test]
    fn test_blob_payload() {
        let mut list = AttributeList::new();
        // Pre-encoded values skip the type checks but must be DER
        let field = list
            .add_field(
                KIND,
                field_id::KEY_USAGE,
                FieldId::NONE,
                AttributeValue::Bytes(&[0x03, 0x02, 0x05, 0xA0]),
                FieldFlags::BLOB_PAYLOAD,
            )
            .unwrap();
        assert!(list.field(field).unwrap().flags.contains(FieldFlags::BLOB_PAYLOAD));
        assert_eq!(
            list.add_field(
                KIND,
                field_id::CRL_NUMBER,
                FieldId::NONE,
                AttributeValue::Bytes(&[0x02, 0x05, 0x01]),
                FieldFlags::BLOB_PAYLOAD,
            ),
            Err(AttributeError::InvalidValue(field_id::CRL_NUMBER))
        );
    }

    #[test]
    fn test_add_blob_attribute() {
        let mut list = AttributeList::new();
        let blob = list
            .add_blob_attribute(KIND, &OID_UNKNOWN, &[0x05, 0x00], true)
            .unwrap();
        let field = list.field(blob).unwrap();
        assert!(field.is_blob() && field.is_critical());
        assert_eq!(field.oid.as_deref(), Some(&OID_UNKNOWN[..]));

        assert_eq!(
            list.add_blob_attribute(KIND, &OID_UNKNOWN, &[0x05, 0x00], false),
            Err(AttributeError::AttributePresent(FieldId::NONE))
        );
        assert_eq!(
            list.add_blob_attribute(KIND, &[0x06, 0x03, 0x55, 0x1D, 0x13], &[0x30, 0x00], false),
            Err(AttributeError::AttributePresent(field_id::BASIC_CONSTRAINTS))
        );
        assert_eq!(
            list.add_blob_attribute(KIND, &[0x06, 0x03, 0x2A, 0x03, 0x05], &[0x30, 0x05], false),
            Err(AttributeError::BadEncoding)
        );
        assert_eq!(
            list.add_blob_attribute(KIND, &[0x04, 0x01, 0x2A], &[0x05, 0x00], false),
            Err(AttributeError::BadEncoding)
        );
    }

    #[test]
    fn test_delete() {
        let mut list = AttributeList::new();
        let ku = add(&mut list, field_id::KEY_USAGE, AttributeValue::Integer(1)).unwrap();
        let dns1 = add_name(&mut list, field_id::DNS_NAME, b"a.example.com").unwrap();
        add_name(&mut list, field_id::DNS_NAME, b"b.example.com").unwrap();
        let ca = add(&mut list, field_id::CA, AttributeValue::Integer(1)).unwrap();
        let path = add(&mut list, field_id::PATH_LEN_CONSTRAINT, AttributeValue::Integer(0)).unwrap();

        list.set_locked(ku, true).unwrap();
        assert_eq!(list.delete_field(ku), Err(AttributeError::PermissionDenied));
        list.set_locked(ku, false).unwrap();

        assert_eq!(list.delete_field(path).unwrap(), Some(ca));
        assert_eq!(list.delete_field(ku).unwrap(), Some(dns1));

        list.delete_composite_field(field_id::SUBJECT_ALT_NAME).unwrap();
        assert_eq!(
            list.delete_composite_field(field_id::SUBJECT_ALT_NAME),
            Err(AttributeError::NotFound)
        );
        assert_eq!(ids(&list), vec![(field_id::CA, FieldId::NONE)]);

        let ku = add(&mut list, field_id::KEY_USAGE, AttributeValue::Integer(1)).unwrap();
        add(&mut list, field_id::PATH_LEN_CONSTRAINT, AttributeValue::Integer(3)).unwrap();
        assert_eq!(list.delete_attribute(ca).unwrap(), Some(ku));
        assert_eq!(ids(&list), vec![(field_id::KEY_USAGE, FieldId::NONE)]);

        list.delete_all();
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
    }
}
