// Licensed under the Apache-2.0 license

//! Field identifiers.
//!
//! Attribute IDs ascend in the same order as the attributes appear in the
//! tables, and each field of an attribute has a larger ID than the attribute
//! itself. The attribute list relies on this to keep its entries sorted.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FieldId(pub u16);

impl FieldId {
    pub const NONE: FieldId = FieldId(0);
    /// Placed on a wrapper entry whose ID is carried by the entry after it
    pub const FOLLOWS: FieldId = FieldId(u16::MAX);

    /// Maps a CHOICE selector value onto the ID of its sub-table entry
    pub const fn from_selector(value: i64) -> FieldId {
        if value > 0 && value < FIRST_GENERAL_NAME.0 as i64 {
            FieldId(value as u16)
        } else {
            FieldId::NONE
        }
    }

    pub const fn is_general_name(&self) -> bool {
        self.0 >= FIRST_GENERAL_NAME.0 && self.0 <= LAST_GENERAL_NAME.0
    }
}

// GeneralName components
pub const OTHERNAME_TYPEID: FieldId = FieldId(100);
pub const OTHERNAME_VALUE: FieldId = FieldId(101);
pub const RFC822_NAME: FieldId = FieldId(102);
pub const DNS_NAME: FieldId = FieldId(103);
pub const DIRECTORY_NAME: FieldId = FieldId(104);
pub const EDIPARTY_NAME_ASSIGNER: FieldId = FieldId(105);
pub const EDIPARTY_PARTY_NAME: FieldId = FieldId(106);
pub const UNIFORM_RESOURCE_IDENTIFIER: FieldId = FieldId(107);
pub const IP_ADDRESS: FieldId = FieldId(108);
pub const REGISTERED_ID: FieldId = FieldId(109);

pub const FIRST_GENERAL_NAME: FieldId = OTHERNAME_TYPEID;
pub const LAST_GENERAL_NAME: FieldId = REGISTERED_ID;

// PKCS #9 attributes carried in a certificate request
pub const CHALLENGE_PASSWORD: FieldId = FieldId(1000);

// X.509 extensions
pub const AUTHORITY_INFO_ACCESS: FieldId = FieldId(1010);
pub const AUTHINFO_OCSP: FieldId = FieldId(1011);
pub const AUTHINFO_CA_ISSUERS: FieldId = FieldId(1012);

pub const SUBJECT_KEY_IDENTIFIER: FieldId = FieldId(1020);

pub const KEY_USAGE: FieldId = FieldId(1030);

pub const PRIVATE_KEY_USAGE_PERIOD: FieldId = FieldId(1040);
pub const PRIVATEKEY_NOT_BEFORE: FieldId = FieldId(1041);
pub const PRIVATEKEY_NOT_AFTER: FieldId = FieldId(1042);

pub const SUBJECT_ALT_NAME: FieldId = FieldId(1050);

pub const ISSUER_ALT_NAME: FieldId = FieldId(1060);

pub const BASIC_CONSTRAINTS: FieldId = FieldId(1070);
pub const CA: FieldId = FieldId(1071);
pub const PATH_LEN_CONSTRAINT: FieldId = FieldId(1072);

pub const CRL_NUMBER: FieldId = FieldId(1080);

pub const CRL_REASON: FieldId = FieldId(1090);

pub const HOLD_INSTRUCTION_CODE: FieldId = FieldId(1100);

pub const INVALIDITY_DATE: FieldId = FieldId(1110);

pub const DELTA_CRL_INDICATOR: FieldId = FieldId(1120);

pub const ISSUING_DIST_POINT: FieldId = FieldId(1130);
pub const ISSUINGDIST_FULL_NAME: FieldId = FieldId(1131);
pub const ISSUINGDIST_USER_CERTS_ONLY: FieldId = FieldId(1132);
pub const ISSUINGDIST_CA_CERTS_ONLY: FieldId = FieldId(1133);
pub const ISSUINGDIST_SOME_REASONS_ONLY: FieldId = FieldId(1134);
pub const ISSUINGDIST_INDIRECT_CRL: FieldId = FieldId(1135);

pub const CERTIFICATE_ISSUER: FieldId = FieldId(1140);

pub const NAME_CONSTRAINTS: FieldId = FieldId(1150);
pub const PERMITTED_SUBTREES: FieldId = FieldId(1151);
pub const EXCLUDED_SUBTREES: FieldId = FieldId(1152);

pub const CRL_DIST_POINT: FieldId = FieldId(1160);
pub const CRLDIST_FULL_NAME: FieldId = FieldId(1161);
pub const CRLDIST_REASONS: FieldId = FieldId(1162);
pub const CRLDIST_CRL_ISSUER: FieldId = FieldId(1163);

pub const CERTIFICATE_POLICIES: FieldId = FieldId(1170);
pub const CERTPOLICY_ID: FieldId = FieldId(1171);
pub const CERTPOLICY_CPS_URI: FieldId = FieldId(1172);
pub const CERTPOLICY_ORGANIZATION: FieldId = FieldId(1173);
pub const CERTPOLICY_NOTICE_NUMBERS: FieldId = FieldId(1174);
pub const CERTPOLICY_EXPLICIT_TEXT: FieldId = FieldId(1175);

pub const POLICY_MAPPINGS: FieldId = FieldId(1180);
pub const ISSUER_DOMAIN_POLICY: FieldId = FieldId(1181);
pub const SUBJECT_DOMAIN_POLICY: FieldId = FieldId(1182);

pub const AUTHORITY_KEY_IDENTIFIER: FieldId = FieldId(1190);
pub const AUTHORITY_KEY_ID: FieldId = FieldId(1191);
pub const AUTHORITY_CERT_ISSUER: FieldId = FieldId(1192);
pub const AUTHORITY_CERT_SERIAL: FieldId = FieldId(1193);

pub const POLICY_CONSTRAINTS: FieldId = FieldId(1200);
pub const REQUIRE_EXPLICIT_POLICY: FieldId = FieldId(1201);
pub const INHIBIT_POLICY_MAPPING: FieldId = FieldId(1202);

pub const EXT_KEY_USAGE: FieldId = FieldId(1210);
pub const EXTKEY_SERVER_AUTH: FieldId = FieldId(1211);
pub const EXTKEY_CLIENT_AUTH: FieldId = FieldId(1212);
pub const EXTKEY_CODE_SIGNING: FieldId = FieldId(1213);
pub const EXTKEY_EMAIL_PROTECTION: FieldId = FieldId(1214);
pub const EXTKEY_TIME_STAMPING: FieldId = FieldId(1215);
pub const EXTKEY_OCSP_SIGNING: FieldId = FieldId(1216);
pub const EXTKEY_ANY_KEY_USAGE: FieldId = FieldId(1217);

// CMS authenticated attributes
pub const CMS_CONTENT_TYPE: FieldId = FieldId(2000);
pub const CMS_MESSAGE_DIGEST: FieldId = FieldId(2010);
pub const CMS_SIGNING_TIME: FieldId = FieldId(2020);
pub const CMS_SIGNING_DESCRIPTION: FieldId = FieldId(2030);
pub const CMS_SMIME_CAPABILITIES: FieldId = FieldId(2040);
pub const SMIMECAP_3DES: FieldId = FieldId(2041);
pub const SMIMECAP_AES128: FieldId = FieldId(2042);
pub const SMIMECAP_CAST128: FieldId = FieldId(2043);
pub const SMIMECAP_SHA256: FieldId = FieldId(2044);
pub const SMIMECAP_PREFER_SIGNED_DATA: FieldId = FieldId(2045);
pub const SMIMECAP_CANNOT_DECRYPT_ANY: FieldId = FieldId(2046);

// Values of the holdInstructionCode CHOICE
pub const HOLD_INSTRUCTION_NONE: i64 = 1;
pub const HOLD_INSTRUCTION_CALL_ISSUER: i64 = 2;
pub const HOLD_INSTRUCTION_REJECT: i64 = 3;
pub const HOLD_INSTRUCTION_PICKUP_TOKEN: i64 = 4;

// Values of the contentType CHOICE
pub const CONTENT_DATA: i64 = 1;
pub const CONTENT_SIGNED_DATA: i64 = 2;
pub const CONTENT_ENVELOPED_DATA: i64 = 3;
pub const CONTENT_DIGESTED_DATA: i64 = 4;
pub const CONTENT_ENCRYPTED_DATA: i64 = 5;
pub const CONTENT_COMPRESSED_DATA: i64 = 6;
pub const CONTENT_TST_INFO: i64 = 7;

// cRLReason values
pub const CRL_REASON_UNSPECIFIED: i64 = 0;
pub const CRL_REASON_KEY_COMPROMISE: i64 = 1;
pub const CRL_REASON_CA_COMPROMISE: i64 = 2;
pub const CRL_REASON_AFFILIATION_CHANGED: i64 = 3;
pub const CRL_REASON_SUPERSEDED: i64 = 4;
pub const CRL_REASON_CESSATION_OF_OPERATION: i64 = 5;
pub const CRL_REASON_CERTIFICATE_HOLD: i64 = 6;
pub const CRL_REASON_REMOVE_FROM_CRL: i64 = 8;
pub const CRL_REASON_PRIVILEGE_WITHDRAWN: i64 = 9;
pub const CRL_REASON_AA_COMPROMISE: i64 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector() {
        assert_eq!(FieldId::from_selector(HOLD_INSTRUCTION_REJECT), FieldId(3));
        assert_eq!(FieldId::from_selector(0), FieldId::NONE);
        assert_eq!(FieldId::from_selector(100), FieldId::NONE);
        assert_eq!(FieldId::from_selector(-1), FieldId::NONE);
    }

    #[test]
    fn test_general_name_range() {
        assert!(DNS_NAME.is_general_name());
        assert!(REGISTERED_ID.is_general_name());
        assert!(!CA.is_general_name());
        assert!(!FieldId::FOLLOWS.is_general_name());
    }
}
