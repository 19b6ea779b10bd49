// Licensed under the Apache-2.0 license

//! Distinguished names are carried as opaque, already-encoded values. Only
//! the outer structure is checked:
//!
//! Name ::= SEQUENCE OF RelativeDistinguishedName
//!
//! RelativeDistinguishedName ::=
//!     SET SIZE (1..MAX) OF AttributeTypeAndValue
//!
//! AttributeTypeAndValue ::= SEQUENCE {
//!     type     AttributeType,
//!     value    AttributeValue }

use crate::{
    asn1::{DerReader, OID_TAG, SEQUENCE_TAG, SET_OF_TAG},
    error::AttributeError,
    MAX_DN_SIZE,
};
use arrayvec::ArrayVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDn(ArrayVec<u8, MAX_DN_SIZE>);

impl EncodedDn {
    pub fn from_der(der: &[u8]) -> Result<EncodedDn, AttributeError> {
        let mut reader = DerReader::new(der);
        let rdns = reader.read_expected(SEQUENCE_TAG)?;
        if !reader.is_empty() {
            return Err(AttributeError::BadEncoding);
        }

        let mut rdns = DerReader::new(rdns);
        while !rdns.is_empty() {
            let mut rdn = DerReader::new(rdns.read_expected(SET_OF_TAG)?);
            if rdn.is_empty() {
                return Err(AttributeError::BadEncoding);
            }
            while !rdn.is_empty() {
                let mut atv = DerReader::new(rdn.read_expected(SEQUENCE_TAG)?);
                atv.read_expected(OID_TAG)?;
                atv.read_tlv()?;
                if !atv.is_empty() {
                    return Err(AttributeError::BadEncoding);
                }
            }
        }

        let mut encoded = ArrayVec::new();
        encoded
            .try_extend_from_slice(der)
            .map_err(|_| AttributeError::ValueTooLarge)?;

        Ok(EncodedDn(encoded))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// CN=Test CA, C=US
    pub const TEST_DN: [u8; 33] = [
        0x30, 0x1F, 0x31, 0x10, 0x30, 0x0E, 0x06, 0x03, 0x55, 0x04, 0x03, 0x0C, 0x07, b'T', b'e',
        b's', b't', b' ', b'C', b'A', 0x31, 0x0B, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04, 0x06, 0x13,
        0x02, b'U', b'S',
    ];

    #[test]
    fn test_encoded_dn() {
        let dn = EncodedDn::from_der(&TEST_DN).unwrap();
        assert_eq!(dn.as_bytes(), &TEST_DN);
        assert_eq!(dn.encoded_len(), TEST_DN.len());

        // Empty name is a valid SEQUENCE OF
        assert!(EncodedDn::from_der(&[0x30, 0x00]).is_ok());
        // Empty RDN
        assert!(EncodedDn::from_der(&[0x30, 0x02, 0x31, 0x00]).is_err());
        // Not a SEQUENCE
        assert!(EncodedDn::from_der(&[0x31, 0x00]).is_err());
        // Trailing data after the name
        assert!(EncodedDn::from_der(&[0x30, 0x00, 0x00]).is_err());
    }
}
