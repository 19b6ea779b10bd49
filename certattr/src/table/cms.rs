// Licensed under the Apache-2.0 license

//! CMS authenticated attributes (RFC 5652, RFC 8551).

use super::{AttributeTypeEntry, FieldType, TypeInfoFlags};
use crate::field_id::{self, FieldId};

const OID_CONTENT_TYPE: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x03,
];
const OID_MESSAGE_DIGEST: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x04,
];
const OID_SIGNING_TIME: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x05,
];
const OID_SIGNING_DESCRIPTION: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x0D,
];
const OID_SMIME_CAPABILITIES: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x0F,
];

// Content types, 1.2.840.113549.1.7.x and id-ct 1.2.840.113549.1.9.16.1.x
const OID_CT_DATA: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x01,
];
const OID_CT_SIGNED_DATA: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02,
];
const OID_CT_ENVELOPED_DATA: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x03,
];
const OID_CT_DIGESTED_DATA: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x05,
];
const OID_CT_ENCRYPTED_DATA: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x06,
];
const OID_CT_COMPRESSED_DATA: &[u8] = &[
    0x06, 0x0B, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x10, 0x01, 0x09,
];
const OID_CT_TST_INFO: &[u8] = &[
    0x06, 0x0B, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x10, 0x01, 0x04,
];

const OID_DES_EDE3_CBC: &[u8] = &[0x06, 0x08, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x03, 0x07];
const OID_AES128_CBC: &[u8] = &[
    0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x01, 0x02,
];
const OID_CAST5_CBC: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF6, 0x7D, 0x07, 0x42, 0x0A,
];
const OID_SHA256: &[u8] = &[
    0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
];
const OID_PREFER_SIGNED_DATA: &[u8] = &[
    0x06, 0x0A, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x0F, 0x01,
];
const OID_CANNOT_DECRYPT_ANY: &[u8] = &[
    0x06, 0x0A, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x0F, 0x02,
];

/// CAST5 parameters, a 128-bit key: INTEGER 128
const CAST5_KEY_LENGTH: &[u8] = &[0x02, 0x02, 0x00, 0x80];

/// The contentType CHOICE, selected by `CONTENT_*`
pub const CONTENT_TYPE_TABLE: &[AttributeTypeEntry] = &[
    AttributeTypeEntry::new(FieldId(1), FieldType::Identifier)
        .oid(OID_CT_DATA)
        .optional()
        .describe("contentType.data"),
    AttributeTypeEntry::new(FieldId(2), FieldType::Identifier)
        .oid(OID_CT_SIGNED_DATA)
        .optional()
        .describe("contentType.signedData"),
    AttributeTypeEntry::new(FieldId(3), FieldType::Identifier)
        .oid(OID_CT_ENVELOPED_DATA)
        .optional()
        .describe("contentType.envelopedData"),
    AttributeTypeEntry::new(FieldId(4), FieldType::Identifier)
        .oid(OID_CT_DIGESTED_DATA)
        .optional()
        .describe("contentType.digestedData"),
    AttributeTypeEntry::new(FieldId(5), FieldType::Identifier)
        .oid(OID_CT_ENCRYPTED_DATA)
        .optional()
        .describe("contentType.encryptedData"),
    AttributeTypeEntry::new(FieldId(6), FieldType::Identifier)
        .oid(OID_CT_COMPRESSED_DATA)
        .optional()
        .describe("contentType.compressedData"),
    AttributeTypeEntry::new(FieldId(7), FieldType::Identifier)
        .oid(OID_CT_TST_INFO)
        .optional()
        .end()
        .describe("contentType.tSTInfo"),
];

pub static CMS_ATTRIBUTE_TABLE: &[AttributeTypeEntry] = &[
    // ContentType ::= OBJECT IDENTIFIER
    AttributeTypeEntry::new(field_id::CMS_CONTENT_TYPE, FieldType::Choice)
        .start(OID_CONTENT_TYPE, TypeInfoFlags::CMS)
        .range(field_id::CONTENT_DATA, field_id::CONTENT_TST_INFO)
        .sub_table(CONTENT_TYPE_TABLE)
        .end()
        .describe("contentType"),
    // MessageDigest ::= OCTET STRING
    AttributeTypeEntry::new(field_id::CMS_MESSAGE_DIGEST, FieldType::OctetString)
        .start(OID_MESSAGE_DIGEST, TypeInfoFlags::CMS)
        .range(16, 64)
        .end()
        .describe("messageDigest"),
    // SigningTime ::= Time
    AttributeTypeEntry::new(field_id::CMS_SIGNING_TIME, FieldType::UtcTime)
        .start(OID_SIGNING_TIME, TypeInfoFlags::CMS)
        .end()
        .describe("signingTime"),
    AttributeTypeEntry::new(field_id::CMS_SIGNING_DESCRIPTION, FieldType::Utf8String)
        .start(OID_SIGNING_DESCRIPTION, TypeInfoFlags::CMS)
        .range(1, 200)
        .end()
        .describe("signingDescription"),
    // SMIMECapabilities ::= SEQUENCE OF SMIMECapability
    //
    // SMIMECapability ::= SEQUENCE {
    //     capabilityID OBJECT IDENTIFIER,
    //     parameters ANY DEFINED BY capabilityID OPTIONAL }
    AttributeTypeEntry::new(field_id::CMS_SMIME_CAPABILITIES, FieldType::Sequence)
        .start(OID_SMIME_CAPABILITIES, TypeInfoFlags::CMS)
        .setof()
        .describe("sMIMECapabilities"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("sMIMECapabilities.capability (3DES)"),
    AttributeTypeEntry::new(field_id::SMIMECAP_3DES, FieldType::Identifier)
        .oid(OID_DES_EDE3_CBC)
        .nonencoding()
        .seq_end(1)
        .describe("sMIMECapabilities.capability.3DES"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("sMIMECapabilities.capability (AES-128)"),
    AttributeTypeEntry::new(field_id::SMIMECAP_AES128, FieldType::Identifier)
        .oid(OID_AES128_CBC)
        .nonencoding()
        .seq_end(1)
        .describe("sMIMECapabilities.capability.AES-128"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("sMIMECapabilities.capability (CAST-128)"),
    AttributeTypeEntry::new(field_id::SMIMECAP_CAST128, FieldType::Identifier)
        .oid(OID_CAST5_CBC)
        .nonencoding()
        .describe("sMIMECapabilities.capability.CAST-128"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::BlobAny)
        .fixed(CAST5_KEY_LENGTH)
        .seq_end(1)
        .describe("sMIMECapabilities.capability.CAST-128.parameters"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("sMIMECapabilities.capability (SHA-256)"),
    AttributeTypeEntry::new(field_id::SMIMECAP_SHA256, FieldType::Identifier)
        .oid(OID_SHA256)
        .nonencoding()
        .seq_end(1)
        .describe("sMIMECapabilities.capability.SHA-256"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("sMIMECapabilities.capability (preferSignedData)"),
    AttributeTypeEntry::new(field_id::SMIMECAP_PREFER_SIGNED_DATA, FieldType::Identifier)
        .oid(OID_PREFER_SIGNED_DATA)
        .nonencoding()
        .seq_end(1)
        .describe("sMIMECapabilities.capability.preferSignedData"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("sMIMECapabilities.capability (canNotDecryptAny)"),
    AttributeTypeEntry::new(field_id::SMIMECAP_CANNOT_DECRYPT_ANY, FieldType::Identifier)
        .oid(OID_CANNOT_DECRYPT_ANY)
        .nonencoding()
        .seq_end(1)
        .describe("sMIMECapabilities.capability.canNotDecryptAny"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("sMIMECapabilities.capability (catchAll)"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::BlobAny)
        .optional()
        .nonencoding()
        .seq_end(2)
        .end()
        .describe("sMIMECapabilities.catchAll"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{table::oid_to_attribute, AttributeKind};

    #[test]
    fn test_content_type_selectors() {
        // Selector values are the sub-table field IDs
        for (index, entry) in CONTENT_TYPE_TABLE.iter().enumerate() {
            assert_eq!(
                FieldId::from_selector(field_id::CONTENT_DATA + index as i64),
                entry.field_id
            );
        }
    }

    #[test]
    fn test_cms_lookup() {
        let entry = oid_to_attribute(AttributeKind::Cms, OID_SIGNING_TIME)
            .unwrap()
            .unwrap();
        assert_eq!(entry.entry().field_id, field_id::CMS_SIGNING_TIME);
        assert!(oid_to_attribute(AttributeKind::Certificate, OID_SIGNING_TIME)
            .unwrap()
            .is_none());
    }
}
