// Licensed under the Apache-2.0 license

//! GeneralName, shared by every attribute that carries names.
//!
//! GeneralName ::= CHOICE {
//!     otherName                 [0]  OtherName,
//!     rfc822Name                [1]  IA5String,
//!     dNSName                   [2]  IA5String,
//!     x400Address               [3]  ORAddress,
//!     directoryName             [4]  Name,
//!     ediPartyName              [5]  EDIPartyName,
//!     uniformResourceIdentifier [6]  IA5String,
//!     iPAddress                 [7]  OCTET STRING,
//!     registeredID              [8]  OBJECT IDENTIFIER }
//!
//! x400Address is not supported.

use super::{AttributeTypeEntry, FieldType};
use crate::{error::ErrorType, field_id, field_id::FieldId, list::AttributeField};

pub const GENERAL_NAME_TABLE: &[AttributeTypeEntry] = &[
    // OtherName ::= SEQUENCE {
    //     type-id    OBJECT IDENTIFIER,
    //     value      [0] EXPLICIT ANY DEFINED BY type-id }
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(0)
        .optional()
        .describe("generalName.otherName"),
    AttributeTypeEntry::new(field_id::OTHERNAME_TYPEID, FieldType::ObjectIdentifier)
        .optional()
        .describe("generalName.otherName.type-id"),
    AttributeTypeEntry::new(field_id::OTHERNAME_VALUE, FieldType::BlobAny)
        .explicit(0)
        .optional()
        .range(2, 128)
        .seq_end(1)
        .describe("generalName.otherName.value"),
    AttributeTypeEntry::new(field_id::RFC822_NAME, FieldType::Ia5String)
        .implicit(1)
        .optional()
        .range(3, 128)
        .validator(check_rfc822)
        .describe("generalName.rfc822Name"),
    AttributeTypeEntry::new(field_id::DNS_NAME, FieldType::Ia5String)
        .implicit(2)
        .optional()
        .range(1, 128)
        .validator(check_dns)
        .describe("generalName.dNSName"),
    AttributeTypeEntry::new(field_id::DIRECTORY_NAME, FieldType::Dn)
        .explicit(4)
        .optional()
        .describe("generalName.directoryName"),
    // EDIPartyName ::= SEQUENCE {
    //     nameAssigner  [0] DirectoryString OPTIONAL,
    //     partyName     [1] DirectoryString }
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(5)
        .optional()
        .describe("generalName.ediPartyName"),
    AttributeTypeEntry::new(field_id::EDIPARTY_NAME_ASSIGNER, FieldType::TextString)
        .explicit(0)
        .optional()
        .range(1, 64)
        .describe("generalName.ediPartyName.nameAssigner"),
    AttributeTypeEntry::new(field_id::EDIPARTY_PARTY_NAME, FieldType::TextString)
        .explicit(1)
        .optional()
        .range(1, 64)
        .seq_end(1)
        .describe("generalName.ediPartyName.partyName"),
    AttributeTypeEntry::new(field_id::UNIFORM_RESOURCE_IDENTIFIER, FieldType::Ia5String)
        .implicit(6)
        .optional()
        .range(8, 255)
        .validator(check_url)
        .describe("generalName.uniformResourceIdentifier"),
    AttributeTypeEntry::new(field_id::IP_ADDRESS, FieldType::OctetString)
        .implicit(7)
        .optional()
        .range(4, 16)
        .describe("generalName.iPAddress"),
    AttributeTypeEntry::new(field_id::REGISTERED_ID, FieldType::ObjectIdentifier)
        .implicit(8)
        .optional()
        .end()
        .describe("generalName.registeredID"),
];

fn is_host_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.'
}

/// local-part@domain, neither part empty
fn check_rfc822(field: &AttributeField) -> Result<(), ErrorType> {
    let value = field.value.as_bytes().ok_or(ErrorType::AttrValue)?;
    let at = value
        .iter()
        .position(|&c| c == b'@')
        .ok_or(ErrorType::AttrValue)?;
    let (local, domain) = (&value[..at], &value[at + 1..]);
    if local.is_empty() || domain.is_empty() || !domain.iter().all(|&c| is_host_char(c)) {
        return Err(ErrorType::AttrValue);
    }

    Ok(())
}

/// Dotted labels with an optional leading wildcard label
fn check_dns(field: &AttributeField) -> Result<(), ErrorType> {
    let value = field.value.as_bytes().ok_or(ErrorType::AttrValue)?;
    let value = value.strip_prefix(b"*.").unwrap_or(value);
    for label in value.split(|&c| c == b'.') {
        if label.is_empty()
            || label.len() > 63
            || label.starts_with(b"-")
            || !label.iter().all(|&c| c.is_ascii_alphanumeric() || c == b'-')
        {
            return Err(ErrorType::AttrValue);
        }
    }

    Ok(())
}

/// scheme://host with a non-empty host
pub(crate) fn check_url(field: &AttributeField) -> Result<(), ErrorType> {
    let value = field.value.as_bytes().ok_or(ErrorType::AttrValue)?;
    let separator = value
        .windows(3)
        .position(|window| window == b"://")
        .ok_or(ErrorType::AttrValue)?;
    let (scheme, rest) = (&value[..separator], &value[separator + 3..]);
    if scheme.is_empty()
        || !scheme.iter().all(|c| c.is_ascii_alphabetic())
        || rest.is_empty()
        || rest.iter().any(|c| c.is_ascii_whitespace())
    {
        return Err(ErrorType::AttrValue);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::FieldValue;

    fn text_field(text: &[u8]) -> AttributeField {
        let mut field = AttributeField::new(field_id::SUBJECT_ALT_NAME, field_id::SUBJECT_ALT_NAME);
        field.value = FieldValue::from_bytes(text).unwrap();
        field
    }

    #[test]
    fn test_rfc822() {
        assert!(check_rfc822(&text_field(b"user@example.com")).is_ok());
        assert!(check_rfc822(&text_field(b"@example.com")).is_err());
        assert!(check_rfc822(&text_field(b"user@")).is_err());
        assert!(check_rfc822(&text_field(b"user.example.com")).is_err());
    }

    #[test]
    fn test_dns() {
        assert!(check_dns(&text_field(b"www.example.com")).is_ok());
        assert!(check_dns(&text_field(b"*.example.com")).is_ok());
        assert!(check_dns(&text_field(b"www..example.com")).is_err());
        assert!(check_dns(&text_field(b"-bad.example.com")).is_err());
        assert!(check_dns(&text_field(b"under_score.com")).is_err());
    }

    #[test]
    fn test_url() {
        assert!(check_url(&text_field(b"http://crl.example.com/ca.crl")).is_ok());
        assert!(check_url(&text_field(b"ldap://ldap.example.com")).is_ok());
        assert!(check_url(&text_field(b"crl.example.com")).is_err());
        assert!(check_url(&text_field(b"http://")).is_err());
        assert!(check_url(&text_field(b"ht tp://x")).is_err());
    }
}
