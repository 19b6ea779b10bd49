// Licensed under the Apache-2.0 license

//! Field lookups and per-field properties.

use crate::{
    error::AttributeError,
    field_id::FieldId,
    list::{AttributeField, AttributeList, FieldFlags, FieldRef},
    table::field_id_to_attribute,
    AttributeKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult {
    NotFound,
    Field(FieldRef),
    /// The field is absent but has a table default
    DefaultValue,
    /// The ID names an attribute, and fields of it are present
    CompleteAttributePresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeProperty {
    Critical,
    Blob,
    DefaultValue,
    Ignored,
    Locked,
    /// The field is the whole attribute rather than a component of it
    CompleteAttribute,
    Multivalued,
}

/// Find the first instance of a field. `FieldId::NONE` as the sub-field
/// matches any GeneralName component.
pub fn find_attribute_field(
    list: &AttributeList,
    field_id: FieldId,
    sub_field_id: FieldId,
) -> Option<FieldRef> {
    if field_id == FieldId::NONE {
        return None;
    }
    list.iter()
        .find(|(_, field)| {
            !field.is_blob()
                && field.field_id == field_id
                && (sub_field_id == FieldId::NONE || field.sub_field_id == sub_field_id)
        })
        .map(|(field_ref, _)| field_ref)
}

/// Look a field up, telling an absent field with a default value and an
/// attribute ID whose attribute is present apart from a plain miss
pub fn find_attribute_field_ex(
    kind: AttributeKind,
    list: &AttributeList,
    field_id: FieldId,
) -> LookupResult {
    if let Some(field_ref) = find_attribute_field(list, field_id, FieldId::NONE) {
        return LookupResult::Field(field_ref);
    }

    let Some((entry, attribute_id)) = field_id_to_attribute(kind, field_id, FieldId::NONE) else {
        return LookupResult::NotFound;
    };
    // Defaults only apply inside an attribute that's actually there
    if find_attribute(list, attribute_id).is_none() {
        return LookupResult::NotFound;
    }
    if entry.entry().has_default() {
        return LookupResult::DefaultValue;
    }
    if field_id == attribute_id {
        return LookupResult::CompleteAttributePresent;
    }

    LookupResult::NotFound
}

/// First field of the attribute `attribute_id`
pub fn find_attribute(list: &AttributeList, attribute_id: FieldId) -> Option<FieldRef> {
    list.iter()
        .find(|(_, field)| !field.is_blob() && field.attribute_id == attribute_id)
        .map(|(field_ref, _)| field_ref)
}

/// The next instance of the field at `field_ref` within its attribute
pub fn find_next_field_instance(list: &AttributeList, field_ref: FieldRef) -> Option<FieldRef> {
    let field = list.get(field_ref)?;
    let mut cursor = list.next(field_ref);
    while let Some(current) = cursor {
        let next = list.get(current)?;
        if !next.same_attribute(field) {
            return None;
        }
        if next.field_id == field.field_id && next.sub_field_id == field.sub_field_id {
            return Some(current);
        }
        cursor = next.next();
    }

    None
}

/// Find a blob attribute by its DER OID
pub fn find_attribute_by_oid(list: &AttributeList, oid: &[u8]) -> Option<FieldRef> {
    list.iter()
        .find(|(_, field)| field.is_blob() && field.oid.as_deref() == Some(oid))
        .map(|(field_ref, _)| field_ref)
}

/// The default of a DEFAULT field, `None` if the field has no default
pub fn get_default_field_value(kind: AttributeKind, field_id: FieldId) -> Option<i64> {
    let (entry, _) = field_id_to_attribute(kind, field_id, FieldId::NONE)?;
    let entry = entry.entry();
    entry.has_default().then_some(entry.default_value)
}

/// The IDs of the recognised attributes in the list, in list order
pub fn attribute_ids(list: &AttributeList) -> impl Iterator<Item = FieldId> + '_ {
    let mut previous = None;
    list.iter().filter_map(move |(_, field)| {
        if field.is_blob() || previous == Some(field.attribute_id) {
            return None;
        }
        previous = Some(field.attribute_id);
        previous
    })
}

/// The fields of the attribute containing `field_ref`, starting from its
/// first field
pub fn attribute_fields(
    list: &AttributeList,
    field_ref: FieldRef,
) -> Result<impl Iterator<Item = (FieldRef, &AttributeField)> + '_, AttributeError> {
    let head = list.attribute_head(field_ref)?;
    let first = list.field(head)?;

    Ok(list
        .iter()
        .skip_while(move |(current, _)| *current != head)
        .take_while(move |(_, field)| field.same_attribute(first)))
}

pub fn attribute_property(
    list: &AttributeList,
    field_ref: FieldRef,
    property: AttributeProperty,
) -> Result<bool, AttributeError> {
    let field = list.field(field_ref)?;
    let value = match property {
        AttributeProperty::Critical => field.flags.contains(FieldFlags::CRITICAL),
        AttributeProperty::Blob => field.is_blob(),
        AttributeProperty::DefaultValue => field.flags.contains(FieldFlags::DEFAULT_VALUE),
        AttributeProperty::Ignored => field.flags.contains(FieldFlags::IGNORED),
        AttributeProperty::Locked => field.is_locked(),
        AttributeProperty::CompleteAttribute => {
            !field.is_blob() && field.field_id == field.attribute_id
        }
        AttributeProperty::Multivalued => field.flags.contains(FieldFlags::MULTIVALUED),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{add::AttributeValue, field_id};

    const OID_UNKNOWN: [u8; 6] = [0x06, 0x04, 0x2A, 0x03, 0x04, 0x05];

    fn sample_list() -> AttributeList {
        let mut list = AttributeList::new();
        let kind = AttributeKind::Certificate;
        list.add_field(
            kind,
            field_id::PATH_LEN_CONSTRAINT,
            FieldId::NONE,
            AttributeValue::Integer(2),
            FieldFlags::empty(),
        )
        .unwrap();
        list.add_field(
            kind,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"a.example.com"),
            FieldFlags::empty(),
        )
        .unwrap();
        list.add_field(
            kind,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"b.example.com"),
            FieldFlags::empty(),
        )
        .unwrap();
        list.add_blob_attribute(kind, &OID_UNKNOWN, &[0x05, 0x00], false)
            .unwrap();
        list
    }

    #[test]
    fn test_find_attribute_field() {
        let list = sample_list();
        let first = find_attribute_field(&list, field_id::SUBJECT_ALT_NAME, FieldId::NONE).unwrap();
        assert_eq!(
            find_attribute_field(&list, field_id::SUBJECT_ALT_NAME, field_id::DNS_NAME),
            Some(first)
        );
        assert!(find_attribute_field(&list, field_id::SUBJECT_ALT_NAME, field_id::RFC822_NAME)
            .is_none());

        let second = find_next_field_instance(&list, first).unwrap();
        assert_eq!(
            list.field(second).unwrap().value.as_bytes(),
            Some(&b"b.example.com"[..])
        );
        assert!(find_next_field_instance(&list, second).is_none());
        assert!(find_attribute_by_oid(&list, &OID_UNKNOWN).is_some());
    }

    #[test]
    fn test_find_attribute_field_ex() {
        let kind = AttributeKind::Certificate;
        let list = sample_list();

        assert!(matches!(
            find_attribute_field_ex(kind, &list, field_id::PATH_LEN_CONSTRAINT),
            LookupResult::Field(_)
        ));
        assert_eq!(
            find_attribute_field_ex(kind, &list, field_id::CA),
            LookupResult::DefaultValue
        );
        assert_eq!(
            find_attribute_field_ex(kind, &list, field_id::BASIC_CONSTRAINTS),
            LookupResult::CompleteAttributePresent
        );
        assert_eq!(
            find_attribute_field_ex(kind, &list, field_id::KEY_USAGE),
            LookupResult::NotFound
        );
        assert_eq!(get_default_field_value(kind, field_id::CA), Some(0));
        assert_eq!(get_default_field_value(kind, field_id::KEY_USAGE), None);
    }

    #[test]
    fn test_find_attribute_field_ex_without_parent() {
        let kind = AttributeKind::Certificate;
        let empty = AttributeList::new();
        assert_eq!(
            find_attribute_field_ex(kind, &empty, field_id::CA),
            LookupResult::NotFound
        );
        assert_eq!(
            find_attribute_field_ex(kind, &empty, field_id::BASIC_CONSTRAINTS),
            LookupResult::NotFound
        );

        let mut list = AttributeList::new();
        list.add_field(
            kind,
            field_id::KEY_USAGE,
            FieldId::NONE,
            AttributeValue::Integer(0x05),
            FieldFlags::empty(),
        )
        .unwrap();
        assert!(matches!(
            find_attribute_field_ex(kind, &list, field_id::KEY_USAGE),
            LookupResult::Field(_)
        ));
        assert_eq!(
            find_attribute_field_ex(kind, &list, field_id::CA),
            LookupResult::NotFound
        );
        assert_eq!(
            find_attribute_field_ex(kind, &list, field_id::BASIC_CONSTRAINTS),
            LookupResult::NotFound
        );
    }

    #[test]
    fn test_properties() {
        let list = sample_list();
        let blob = find_attribute_by_oid(&list, &OID_UNKNOWN).unwrap();
        assert!(attribute_property(&list, blob, AttributeProperty::Blob).unwrap());
        assert!(!attribute_property(&list, blob, AttributeProperty::Critical).unwrap());

        let path = find_attribute(&list, field_id::BASIC_CONSTRAINTS).unwrap();
        assert!(!attribute_property(&list, path, AttributeProperty::CompleteAttribute).unwrap());
        let san = find_attribute(&list, field_id::SUBJECT_ALT_NAME).unwrap();
        assert!(attribute_property(&list, san, AttributeProperty::CompleteAttribute).unwrap());
    }

    #[test]
    fn test_enumeration() {
        let list = sample_list();
        let ids: Vec<FieldId> = attribute_ids(&list).collect();
        assert_eq!(ids, vec![field_id::SUBJECT_ALT_NAME, field_id::BASIC_CONSTRAINTS]);

        let san = find_attribute(&list, field_id::SUBJECT_ALT_NAME).unwrap();
        let second = find_next_field_instance(&list, san).unwrap();
        let names: Vec<&[u8]> = attribute_fields(&list, second)
            .unwrap()
            .filter_map(|(_, field)| field.value.as_bytes())
            .collect();
        assert_eq!(names, vec![&b"a.example.com"[..], &b"b.example.com"[..]]);

        let blob = find_attribute_by_oid(&list, &OID_UNKNOWN).unwrap();
        assert_eq!(attribute_fields(&list, blob).unwrap().count(), 1);
    }
}
