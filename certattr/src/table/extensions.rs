// Licensed under the Apache-2.0 license

//! X.509 v3 extensions (RFC 5280) and the PKCS #9 attributes carried in
//! certificate requests. Attributes are ordered by attribute ID.

use super::{
    general_name::{check_url, GENERAL_NAME_TABLE},
    AttributeTypeEntry, FieldType, TypeInfoFlags,
};
use crate::{
    config::ComplianceLevel,
    error::ErrorType,
    field_id::{self, FieldId},
    list::AttributeField,
};

const OID_CHALLENGE_PASSWORD: &[u8] = &[
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x07,
];
const OID_AUTHORITY_INFO_ACCESS: &[u8] =
    &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x01, 0x01];
const OID_AD_OCSP: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01];
const OID_AD_CA_ISSUERS: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x02];

const OID_SUBJECT_KEY_IDENTIFIER: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x0E];
const OID_KEY_USAGE: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x0F];
const OID_PRIVATE_KEY_USAGE_PERIOD: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x10];
const OID_SUBJECT_ALT_NAME: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x11];
const OID_ISSUER_ALT_NAME: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x12];
const OID_BASIC_CONSTRAINTS: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x13];
const OID_CRL_NUMBER: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x14];
const OID_CRL_REASON: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x15];
const OID_HOLD_INSTRUCTION_CODE: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x17];
const OID_INVALIDITY_DATE: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x18];
const OID_DELTA_CRL_INDICATOR: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x1B];
const OID_ISSUING_DIST_POINT: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x1C];
const OID_CERTIFICATE_ISSUER: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x1D];
const OID_NAME_CONSTRAINTS: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x1E];
const OID_CRL_DIST_POINTS: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x1F];
const OID_CERTIFICATE_POLICIES: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x20];
const OID_POLICY_MAPPINGS: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x21];
const OID_AUTHORITY_KEY_IDENTIFIER: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x23];
const OID_POLICY_CONSTRAINTS: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x24];
const OID_EXT_KEY_USAGE: &[u8] = &[0x06, 0x03, 0x55, 0x1D, 0x25];

const OID_QT_CPS: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x02, 0x01];
const OID_QT_UNOTICE: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x02, 0x02];

const OID_KP_SERVER_AUTH: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x01];
const OID_KP_CLIENT_AUTH: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x02];
const OID_KP_CODE_SIGNING: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x03];
const OID_KP_EMAIL_PROTECTION: &[u8] =
    &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x04];
const OID_KP_TIME_STAMPING: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x08];
const OID_KP_OCSP_SIGNING: &[u8] = &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x09];
const OID_ANY_EXTENDED_KEY_USAGE: &[u8] = &[0x06, 0x04, 0x55, 0x1D, 0x25, 0x00];

// id-holdinstruction 1.2.840.10040.2.x
const OID_HOLD_NONE: &[u8] = &[0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x38, 0x02, 0x01];
const OID_HOLD_CALL_ISSUER: &[u8] = &[0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x38, 0x02, 0x02];
const OID_HOLD_REJECT: &[u8] = &[0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x38, 0x02, 0x03];
const OID_HOLD_PICKUP_TOKEN: &[u8] = &[0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x38, 0x02, 0x04];

const CERT_AND_REQUEST: TypeInfoFlags = TypeInfoFlags::CERT.union(TypeInfoFlags::CERTREQ);
const REVOCATION: TypeInfoFlags = TypeInfoFlags::REVINFO.union(TypeInfoFlags::REVREQ);

/// Largest key usage value, decipherOnly is bit 8
const KEY_USAGE_MAX: i64 = 0x1FF;
const REASON_FLAGS_MAX: i64 = 0x1FF;
const MAX_PATH_LENGTH: i64 = 64;
const MAX_TEXT_SIZE: i64 = 200;
const MAX_URL_SIZE: i64 = 255;

/// The holdInstructionCode CHOICE, selected by `HOLD_INSTRUCTION_*`
pub const HOLD_INSTRUCTION_TABLE: &[AttributeTypeEntry] = &[
    AttributeTypeEntry::new(FieldId(1), FieldType::Identifier)
        .oid(OID_HOLD_NONE)
        .optional()
        .describe("holdInstructionCode.none"),
    AttributeTypeEntry::new(FieldId(2), FieldType::Identifier)
        .oid(OID_HOLD_CALL_ISSUER)
        .optional()
        .describe("holdInstructionCode.callIssuer"),
    AttributeTypeEntry::new(FieldId(3), FieldType::Identifier)
        .oid(OID_HOLD_REJECT)
        .optional()
        .describe("holdInstructionCode.reject"),
    AttributeTypeEntry::new(FieldId(4), FieldType::Identifier)
        .oid(OID_HOLD_PICKUP_TOKEN)
        .optional()
        .end()
        .describe("holdInstructionCode.pickupToken"),
];

pub static EXTENSION_TABLE: &[AttributeTypeEntry] = &[
    // challengePassword ATTRIBUTE ::= { DirectoryString }
    AttributeTypeEntry::new(field_id::CHALLENGE_PASSWORD, FieldType::TextString)
        .start(OID_CHALLENGE_PASSWORD, TypeInfoFlags::CERTREQ)
        .no_copy()
        .special()
        .range(1, MAX_TEXT_SIZE)
        .end()
        .describe("challengePassword"),
    // AuthorityInfoAccessSyntax ::= SEQUENCE SIZE (1..MAX) OF AccessDescription
    //
    // AccessDescription ::= SEQUENCE {
    //     accessMethod    OBJECT IDENTIFIER,
    //     accessLocation  GeneralName }
    AttributeTypeEntry::new(field_id::AUTHORITY_INFO_ACCESS, FieldType::Sequence)
        .start(OID_AUTHORITY_INFO_ACCESS, CERT_AND_REQUEST)
        .setof()
        .describe("authorityInfoAccess"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("authorityInfoAccess.accessDescription (ocsp)"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Identifier)
        .oid(OID_AD_OCSP)
        .describe("authorityInfoAccess.ocsp"),
    AttributeTypeEntry::new(field_id::AUTHINFO_OCSP, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(1)
        .sub_table(GENERAL_NAME_TABLE)
        .describe("authorityInfoAccess.ocsp.accessLocation"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("authorityInfoAccess.accessDescription (caIssuers)"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Identifier)
        .oid(OID_AD_CA_ISSUERS)
        .describe("authorityInfoAccess.caIssuers"),
    AttributeTypeEntry::new(field_id::AUTHINFO_CA_ISSUERS, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(1)
        .sub_table(GENERAL_NAME_TABLE)
        .describe("authorityInfoAccess.caIssuers.accessLocation"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("authorityInfoAccess.accessDescription (catchAll)"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::BlobAny)
        .optional()
        .nonencoding()
        .seq_end(2)
        .end()
        .describe("authorityInfoAccess.catchAll"),
    // SubjectKeyIdentifier ::= OCTET STRING
    AttributeTypeEntry::new(field_id::SUBJECT_KEY_IDENTIFIER, FieldType::OctetString)
        .start(OID_SUBJECT_KEY_IDENTIFIER, CERT_AND_REQUEST)
        .range(1, 64)
        .end()
        .describe("subjectKeyIdentifier"),
    // KeyUsage ::= BIT STRING
    AttributeTypeEntry::new(field_id::KEY_USAGE, FieldType::BitString)
        .start(
            OID_KEY_USAGE,
            CERT_AND_REQUEST.union(TypeInfoFlags::PKIUSER),
        )
        .critical()
        .range(1, KEY_USAGE_MAX)
        .end()
        .describe("keyUsage"),
    // PrivateKeyUsagePeriod ::= SEQUENCE {
    //     notBefore       [0]     GeneralizedTime OPTIONAL,
    //     notAfter        [1]     GeneralizedTime OPTIONAL }
    AttributeTypeEntry::new(field_id::PRIVATE_KEY_USAGE_PERIOD, FieldType::Sequence)
        .start(OID_PRIVATE_KEY_USAGE_PERIOD, TypeInfoFlags::CERT)
        .describe("privateKeyUsagePeriod"),
    AttributeTypeEntry::new(field_id::PRIVATEKEY_NOT_BEFORE, FieldType::GeneralizedTime)
        .implicit(0)
        .optional()
        .describe("privateKeyUsagePeriod.notBefore"),
    AttributeTypeEntry::new(field_id::PRIVATEKEY_NOT_AFTER, FieldType::GeneralizedTime)
        .implicit(1)
        .optional()
        .end()
        .describe("privateKeyUsagePeriod.notAfter"),
    // SubjectAltName ::= GeneralNames
    AttributeTypeEntry::new(FieldId::FOLLOWS, FieldType::Sequence)
        .start(
            OID_SUBJECT_ALT_NAME,
            CERT_AND_REQUEST.union(TypeInfoFlags::PKIUSER),
        )
        .setof()
        .describe("subjectAltName"),
    AttributeTypeEntry::new(field_id::SUBJECT_ALT_NAME, FieldType::Subtyped)
        .multivalued()
        .sub_table(GENERAL_NAME_TABLE)
        .end()
        .describe("subjectAltName.generalName"),
    // IssuerAltName ::= GeneralNames
    AttributeTypeEntry::new(FieldId::FOLLOWS, FieldType::Sequence)
        .start(
            OID_ISSUER_ALT_NAME,
            CERT_AND_REQUEST.union(TypeInfoFlags::CRL),
        )
        .setof()
        .describe("issuerAltName"),
    AttributeTypeEntry::new(field_id::ISSUER_ALT_NAME, FieldType::Subtyped)
        .multivalued()
        .sub_table(GENERAL_NAME_TABLE)
        .end()
        .describe("issuerAltName.generalName"),
    // BasicConstraints ::= SEQUENCE {
    //     cA                      BOOLEAN DEFAULT FALSE,
    //     pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
    AttributeTypeEntry::new(field_id::BASIC_CONSTRAINTS, FieldType::Sequence)
        .start(
            OID_BASIC_CONSTRAINTS,
            CERT_AND_REQUEST
                .union(TypeInfoFlags::ATTRCERT)
                .union(TypeInfoFlags::PKIUSER),
        )
        .critical()
        .empty_ok()
        .describe("basicConstraints"),
    AttributeTypeEntry::new(field_id::CA, FieldType::Boolean)
        .range(0, 1)
        .default_value(0)
        .describe("basicConstraints.cA"),
    AttributeTypeEntry::new(field_id::PATH_LEN_CONSTRAINT, FieldType::Integer)
        .optional()
        .range(0, MAX_PATH_LENGTH)
        .end()
        .describe("basicConstraints.pathLenConstraint"),
    // CRLNumber ::= INTEGER (0..MAX)
    AttributeTypeEntry::new(field_id::CRL_NUMBER, FieldType::Integer)
        .start(OID_CRL_NUMBER, TypeInfoFlags::CRL)
        .range(0, i32::MAX as i64)
        .end()
        .describe("cRLNumber"),
    // CRLReason ::= ENUMERATED
    AttributeTypeEntry::new(field_id::CRL_REASON, FieldType::Enumerated)
        .start(OID_CRL_REASON, REVOCATION)
        .range(field_id::CRL_REASON_UNSPECIFIED, field_id::CRL_REASON_AA_COMPROMISE)
        .validator(check_crl_reason)
        .end()
        .describe("cRLReason"),
    // HoldInstructionCode ::= OBJECT IDENTIFIER
    AttributeTypeEntry::new(field_id::HOLD_INSTRUCTION_CODE, FieldType::Choice)
        .start(OID_HOLD_INSTRUCTION_CODE, REVOCATION)
        .range(
            field_id::HOLD_INSTRUCTION_NONE,
            field_id::HOLD_INSTRUCTION_PICKUP_TOKEN,
        )
        .sub_table(HOLD_INSTRUCTION_TABLE)
        .end()
        .describe("holdInstructionCode"),
    // InvalidityDate ::= GeneralizedTime
    AttributeTypeEntry::new(field_id::INVALIDITY_DATE, FieldType::GeneralizedTime)
        .start(OID_INVALIDITY_DATE, REVOCATION)
        .end()
        .describe("invalidityDate"),
    // BaseCRLNumber ::= CRLNumber
    AttributeTypeEntry::new(field_id::DELTA_CRL_INDICATOR, FieldType::Integer)
        .start(OID_DELTA_CRL_INDICATOR, TypeInfoFlags::CRL)
        .critical()
        .range(0, i32::MAX as i64)
        .end()
        .describe("deltaCRLIndicator"),
    // IssuingDistributionPoint ::= SEQUENCE {
    //     distributionPoint          [0] DistributionPointName OPTIONAL,
    //     onlyContainsUserCerts      [1] BOOLEAN DEFAULT FALSE,
    //     onlyContainsCACerts        [2] BOOLEAN DEFAULT FALSE,
    //     onlySomeReasons            [3] ReasonFlags OPTIONAL,
    //     indirectCRL                [4] BOOLEAN DEFAULT FALSE }
    AttributeTypeEntry::new(field_id::ISSUING_DIST_POINT, FieldType::Sequence)
        .start(OID_ISSUING_DIST_POINT, TypeInfoFlags::CRL)
        .critical()
        .describe("issuingDistributionPoint"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(0)
        .optional()
        .describe("issuingDistributionPoint.distributionPoint"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(0)
        .setof()
        .describe("issuingDistributionPoint.distributionPoint.fullName"),
    AttributeTypeEntry::new(field_id::ISSUINGDIST_FULL_NAME, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(2)
        .sub_table(GENERAL_NAME_TABLE)
        .describe("issuingDistributionPoint.distributionPoint.fullName.generalName"),
    AttributeTypeEntry::new(field_id::ISSUINGDIST_USER_CERTS_ONLY, FieldType::Boolean)
        .implicit(1)
        .range(0, 1)
        .default_value(0)
        .describe("issuingDistributionPoint.onlyContainsUserCerts"),
    AttributeTypeEntry::new(field_id::ISSUINGDIST_CA_CERTS_ONLY, FieldType::Boolean)
        .implicit(2)
        .range(0, 1)
        .default_value(0)
        .describe("issuingDistributionPoint.onlyContainsCACerts"),
    AttributeTypeEntry::new(field_id::ISSUINGDIST_SOME_REASONS_ONLY, FieldType::BitString)
        .implicit(3)
        .optional()
        .range(0, REASON_FLAGS_MAX)
        .describe("issuingDistributionPoint.onlySomeReasons"),
    AttributeTypeEntry::new(field_id::ISSUINGDIST_INDIRECT_CRL, FieldType::Boolean)
        .implicit(4)
        .range(0, 1)
        .default_value(0)
        .end()
        .describe("issuingDistributionPoint.indirectCRL"),
    // CertificateIssuer ::= GeneralNames
    AttributeTypeEntry::new(FieldId::FOLLOWS, FieldType::Sequence)
        .start(OID_CERTIFICATE_ISSUER, TypeInfoFlags::REVINFO)
        .critical()
        .setof()
        .describe("certificateIssuer"),
    AttributeTypeEntry::new(field_id::CERTIFICATE_ISSUER, FieldType::Subtyped)
        .multivalued()
        .sub_table(GENERAL_NAME_TABLE)
        .end()
        .describe("certificateIssuer.generalName"),
    // NameConstraints ::= SEQUENCE {
    //     permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
    //     excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
    //
    // GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree
    //
    // GeneralSubtree ::= SEQUENCE {
    //     base                    GeneralName,
    //     minimum         [0]     BaseDistance DEFAULT 0,
    //     maximum         [1]     BaseDistance OPTIONAL }
    AttributeTypeEntry::new(field_id::NAME_CONSTRAINTS, FieldType::Sequence)
        .start(OID_NAME_CONSTRAINTS, TypeInfoFlags::CERT)
        .critical()
        .compliance(ComplianceLevel::PkixPartial)
        .describe("nameConstraints"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(0)
        .optional()
        .setof()
        .describe("nameConstraints.permittedSubtrees"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .describe("nameConstraints.permittedSubtrees.generalSubtree"),
    AttributeTypeEntry::new(field_id::PERMITTED_SUBTREES, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(2)
        .sub_table(GENERAL_NAME_TABLE)
        .describe("nameConstraints.permittedSubtrees.generalSubtree.base"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(1)
        .optional()
        .setof()
        .describe("nameConstraints.excludedSubtrees"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .describe("nameConstraints.excludedSubtrees.generalSubtree"),
    AttributeTypeEntry::new(field_id::EXCLUDED_SUBTREES, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(2)
        .sub_table(GENERAL_NAME_TABLE)
        .end()
        .describe("nameConstraints.excludedSubtrees.generalSubtree.base"),
    // CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
    //
    // DistributionPoint ::= SEQUENCE {
    //     distributionPoint       [0]     DistributionPointName OPTIONAL,
    //     reasons                 [1]     ReasonFlags OPTIONAL,
    //     cRLIssuer               [2]     GeneralNames OPTIONAL }
    //
    // DistributionPointName ::= CHOICE {
    //     fullName                [0]     GeneralNames,
    //     nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
    AttributeTypeEntry::new(field_id::CRL_DIST_POINT, FieldType::Sequence)
        .start(OID_CRL_DIST_POINTS, CERT_AND_REQUEST.union(TypeInfoFlags::ATTRCERT))
        .setof()
        .describe("cRLDistributionPoints"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .describe("cRLDistributionPoints.distributionPoint"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(0)
        .optional()
        .describe("cRLDistributionPoints.distributionPoint.distributionPoint"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(0)
        .setof()
        .describe("cRLDistributionPoints.distributionPoint.distributionPoint.fullName"),
    AttributeTypeEntry::new(field_id::CRLDIST_FULL_NAME, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(2)
        .sub_table(GENERAL_NAME_TABLE)
        .describe("cRLDistributionPoints.distributionPoint.fullName.generalName"),
    AttributeTypeEntry::new(field_id::CRLDIST_REASONS, FieldType::BitString)
        .implicit(1)
        .optional()
        .multivalued()
        .range(0, REASON_FLAGS_MAX)
        .describe("cRLDistributionPoints.distributionPoint.reasons"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(2)
        .optional()
        .setof()
        .describe("cRLDistributionPoints.distributionPoint.cRLIssuer"),
    AttributeTypeEntry::new(field_id::CRLDIST_CRL_ISSUER, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(2)
        .sub_table(GENERAL_NAME_TABLE)
        .end()
        .describe("cRLDistributionPoints.distributionPoint.cRLIssuer.generalName"),
    // certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation
    //
    // PolicyInformation ::= SEQUENCE {
    //     policyIdentifier   CertPolicyId,
    //     policyQualifiers   SEQUENCE SIZE (1..MAX) OF
    //                             PolicyQualifierInfo OPTIONAL }
    //
    // PolicyQualifierInfo ::= SEQUENCE {
    //     policyQualifierId  PolicyQualifierId,
    //     qualifier          ANY DEFINED BY policyQualifierId }
    //
    // UserNotice ::= SEQUENCE {
    //     noticeRef        NoticeReference OPTIONAL,
    //     explicitText     DisplayText OPTIONAL }
    //
    // NoticeReference ::= SEQUENCE {
    //     organization     DisplayText,
    //     noticeNumbers    SEQUENCE OF INTEGER }
    AttributeTypeEntry::new(field_id::CERTIFICATE_POLICIES, FieldType::Sequence)
        .start(OID_CERTIFICATE_POLICIES, CERT_AND_REQUEST)
        .setof()
        .describe("certificatePolicies"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .describe("certificatePolicies.policyInformation"),
    AttributeTypeEntry::new(field_id::CERTPOLICY_ID, FieldType::ObjectIdentifier)
        .multivalued()
        .describe("certificatePolicies.policyInformation.policyIdentifier"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .optional()
        .setof()
        .describe("certificatePolicies.policyInformation.policyQualifiers"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("certificatePolicies.policyInformation.policyQualifier (cps)"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Identifier)
        .oid(OID_QT_CPS)
        .describe("certificatePolicies.policyInformation.policyQualifier.cps"),
    AttributeTypeEntry::new(field_id::CERTPOLICY_CPS_URI, FieldType::Ia5String)
        .optional()
        .multivalued()
        .range(1, MAX_URL_SIZE)
        .validator(check_url)
        .seq_end(1)
        .describe("certificatePolicies.policyInformation.policyQualifier.cPSuri"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .identifier()
        .describe("certificatePolicies.policyInformation.policyQualifier (userNotice)"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Identifier)
        .oid(OID_QT_UNOTICE)
        .describe("certificatePolicies.policyInformation.policyQualifier.unotice"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .describe("certificatePolicies.policyInformation.policyQualifier.userNotice"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .optional()
        .describe("certificatePolicies.policyInformation.policyQualifier.userNotice.noticeRef"),
    AttributeTypeEntry::new(field_id::CERTPOLICY_ORGANIZATION, FieldType::TextString)
        .optional()
        .multivalued()
        .range(1, MAX_TEXT_SIZE)
        .describe("certificatePolicies.policyInformation.policyQualifier.userNotice.noticeRef.organization"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .setof()
        .describe("certificatePolicies.policyInformation.policyQualifier.userNotice.noticeRef.noticeNumbers"),
    AttributeTypeEntry::new(field_id::CERTPOLICY_NOTICE_NUMBERS, FieldType::Integer)
        .optional()
        .multivalued()
        .range(1, 1024)
        .seq_end(2)
        .describe("certificatePolicies.policyInformation.policyQualifier.userNotice.noticeRef.noticeNumbers.noticeNumber"),
    AttributeTypeEntry::new(field_id::CERTPOLICY_EXPLICIT_TEXT, FieldType::TextString)
        .optional()
        .multivalued()
        .range(1, MAX_TEXT_SIZE)
        .seq_end(3)
        .end()
        .describe("certificatePolicies.policyInformation.policyQualifier.userNotice.explicitText"),
    // PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE {
    //     issuerDomainPolicy      CertPolicyId,
    //     subjectDomainPolicy     CertPolicyId }
    AttributeTypeEntry::new(field_id::POLICY_MAPPINGS, FieldType::Sequence)
        .start(OID_POLICY_MAPPINGS, TypeInfoFlags::CERT)
        .compliance(ComplianceLevel::PkixPartial)
        .setof()
        .describe("policyMappings"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .describe("policyMappings.policyMapping"),
    AttributeTypeEntry::new(field_id::ISSUER_DOMAIN_POLICY, FieldType::ObjectIdentifier)
        .describe("policyMappings.policyMapping.issuerDomainPolicy"),
    AttributeTypeEntry::new(field_id::SUBJECT_DOMAIN_POLICY, FieldType::ObjectIdentifier)
        .seq_end(1)
        .end()
        .describe("policyMappings.policyMapping.subjectDomainPolicy"),
    // AuthorityKeyIdentifier ::= SEQUENCE {
    //     keyIdentifier             [0] KeyIdentifier           OPTIONAL,
    //     authorityCertIssuer       [1] GeneralNames            OPTIONAL,
    //     authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL }
    AttributeTypeEntry::new(field_id::AUTHORITY_KEY_IDENTIFIER, FieldType::Sequence)
        .start(
            OID_AUTHORITY_KEY_IDENTIFIER,
            TypeInfoFlags::CERT.union(TypeInfoFlags::CRL),
        )
        .describe("authorityKeyIdentifier"),
    AttributeTypeEntry::new(field_id::AUTHORITY_KEY_ID, FieldType::OctetString)
        .implicit(0)
        .optional()
        .range(1, 64)
        .describe("authorityKeyIdentifier.keyIdentifier"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::Sequence)
        .implicit(1)
        .optional()
        .setof()
        .describe("authorityKeyIdentifier.authorityCertIssuer"),
    AttributeTypeEntry::new(field_id::AUTHORITY_CERT_ISSUER, FieldType::Subtyped)
        .optional()
        .multivalued()
        .seq_end(1)
        .sub_table(GENERAL_NAME_TABLE)
        .describe("authorityKeyIdentifier.authorityCertIssuer.generalName"),
    AttributeTypeEntry::new(field_id::AUTHORITY_CERT_SERIAL, FieldType::Integer)
        .implicit(2)
        .optional()
        .range(0, i64::MAX)
        .end()
        .describe("authorityKeyIdentifier.authorityCertSerialNumber"),
    // PolicyConstraints ::= SEQUENCE {
    //     requireExplicitPolicy           [0] SkipCerts OPTIONAL,
    //     inhibitPolicyMapping            [1] SkipCerts OPTIONAL }
    AttributeTypeEntry::new(field_id::POLICY_CONSTRAINTS, FieldType::Sequence)
        .start(OID_POLICY_CONSTRAINTS, TypeInfoFlags::CERT)
        .critical()
        .compliance(ComplianceLevel::PkixPartial)
        .describe("policyConstraints"),
    AttributeTypeEntry::new(field_id::REQUIRE_EXPLICIT_POLICY, FieldType::Integer)
        .implicit(0)
        .optional()
        .range(0, MAX_PATH_LENGTH)
        .describe("policyConstraints.requireExplicitPolicy"),
    AttributeTypeEntry::new(field_id::INHIBIT_POLICY_MAPPING, FieldType::Integer)
        .implicit(1)
        .optional()
        .range(0, MAX_PATH_LENGTH)
        .end()
        .describe("policyConstraints.inhibitPolicyMapping"),
    // ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
    AttributeTypeEntry::new(field_id::EXT_KEY_USAGE, FieldType::Sequence)
        .start(OID_EXT_KEY_USAGE, CERT_AND_REQUEST)
        .describe("extKeyUsage"),
    AttributeTypeEntry::new(field_id::EXTKEY_SERVER_AUTH, FieldType::Identifier)
        .oid(OID_KP_SERVER_AUTH)
        .optional()
        .describe("extKeyUsage.serverAuth"),
    AttributeTypeEntry::new(field_id::EXTKEY_CLIENT_AUTH, FieldType::Identifier)
        .oid(OID_KP_CLIENT_AUTH)
        .optional()
        .describe("extKeyUsage.clientAuth"),
    AttributeTypeEntry::new(field_id::EXTKEY_CODE_SIGNING, FieldType::Identifier)
        .oid(OID_KP_CODE_SIGNING)
        .optional()
        .describe("extKeyUsage.codeSigning"),
    AttributeTypeEntry::new(field_id::EXTKEY_EMAIL_PROTECTION, FieldType::Identifier)
        .oid(OID_KP_EMAIL_PROTECTION)
        .optional()
        .describe("extKeyUsage.emailProtection"),
    AttributeTypeEntry::new(field_id::EXTKEY_TIME_STAMPING, FieldType::Identifier)
        .oid(OID_KP_TIME_STAMPING)
        .optional()
        .describe("extKeyUsage.timeStamping"),
    AttributeTypeEntry::new(field_id::EXTKEY_OCSP_SIGNING, FieldType::Identifier)
        .oid(OID_KP_OCSP_SIGNING)
        .optional()
        .describe("extKeyUsage.ocspSigning"),
    AttributeTypeEntry::new(field_id::EXTKEY_ANY_KEY_USAGE, FieldType::Identifier)
        .oid(OID_ANY_EXTENDED_KEY_USAGE)
        .optional()
        .describe("extKeyUsage.anyExtendedKeyUsage"),
    AttributeTypeEntry::new(FieldId::NONE, FieldType::BlobAny)
        .optional()
        .nonencoding()
        .end()
        .describe("extKeyUsage.catchAll"),
];

/// Value 7 is unused in the CRLReason enumeration
fn check_crl_reason(field: &AttributeField) -> Result<(), ErrorType> {
    match field.value.as_integer() {
        Some(7) | None => Err(ErrorType::AttrValue),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::FieldValue;

    #[test]
    fn test_crl_reason() {
        let mut field = AttributeField::new(field_id::CRL_REASON, field_id::CRL_REASON);
        field.value = FieldValue::Integer(field_id::CRL_REASON_KEY_COMPROMISE);
        assert!(check_crl_reason(&field).is_ok());
        field.value = FieldValue::Integer(7);
        assert_eq!(check_crl_reason(&field), Err(ErrorType::AttrValue));
    }

    #[test]
    fn test_attribute_order() {
        // Single-entry attributes carry their own ID on the start entry
        for entry in EXTENSION_TABLE.iter().filter(|entry| entry.is_start()) {
            if entry.field_id != FieldId::FOLLOWS {
                assert!(entry.oid.is_some(), "{}", entry.description);
            }
        }
        let first = &EXTENSION_TABLE[0];
        assert_eq!(first.field_id, field_id::CHALLENGE_PASSWORD);
        assert!(first.is_start() && first.is_end());
    }
}
