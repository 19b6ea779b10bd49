/*++
Licensed under the Apache-2.0 license.

Abstract:
    Table-driven X.509 / CMS attribute encoding library.
--*/
#![cfg_attr(not(test), no_std)]

pub use check::{check_attributes, validate_for_object};
pub use config::{AttributeConfig, ComplianceLevel, EncodingOptions};
pub use error::{AttributeError, ErrorClass, ErrorType};
pub use field_id::FieldId;
pub use list::{AttributeField, AttributeList, FieldFlags, FieldRef, FieldValue};
pub use lookup::LookupResult;
pub use read::read_attributes;
pub use write::{encoded_attributes_size, sizeof_attributes, write_attributes};

pub mod add;
pub mod asn1;
pub mod check;
pub mod compare;
pub mod config;
pub mod cursor;
pub mod dn;
pub mod error;
pub mod field_id;
pub mod list;
pub mod lookup;
pub mod oid;
pub mod read;
pub mod table;
pub mod time;
pub mod write;

include!(concat!(env!("OUT_DIR"), "/arbitrary_max_attribute_fields.rs"));

/// Largest DER-encoded OID (tag and length included) held in a field
pub const MAX_OID_SIZE: usize = 32;
pub const MAX_FIELD_DATA_SIZE: usize = 256;
pub const MAX_DN_SIZE: usize = 256;
/// Wrapper levels a single field can carry into the write pass
pub const ENCODING_FIFO_SIZE: usize = 10;
/// Nesting depth of the validation pass
pub const ATTRIBUTE_STACK_SIZE: usize = 10;

const ITERATIONS_MED: usize = 50;
const ITERATIONS_LARGE: usize = 1000;

/// The two attribute tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// X.509 extensions plus certificate request attributes
    Certificate,
    /// CMS authenticated attributes
    Cms,
}

/// The object an attribute block is being encoded for. Selects the
/// wrapper written around the block and which attributes are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Certificate,
    AttributeCertificate,
    Crl,
    CrlEntry,
    /// PKCS #10 request: special attributes plus an extensionRequest
    CertRequest,
    /// CRMF request, attributes written without a wrapper
    CrmfRequest,
    RevocationRequest,
    OcspRequest,
    OcspResponse,
    RtcsRequest,
    RtcsResponse,
    PkiUser,
    CmsAttributes,
}

impl ObjectKind {
    /// The table an object's attributes are looked up in
    pub const fn attribute_kind(&self) -> AttributeKind {
        match self {
            ObjectKind::CmsAttributes => AttributeKind::Cms,
            _ => AttributeKind::Certificate,
        }
    }
}
