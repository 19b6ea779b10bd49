// Licensed under the Apache-2.0 license

//! OBJECT IDENTIFIER helpers. OIDs are held in their complete DER form
//! (tag, length and body) throughout the crate.

use crate::{
    asn1::{DerReader, OID_TAG},
    error::AttributeError,
    field_id::FieldId,
    MAX_OID_SIZE,
};
use arrayvec::ArrayVec;
use core::fmt;

pub type EncodedOid = ArrayVec<u8, MAX_OID_SIZE>;

/// Smallest valid encoding: tag, length and a single body byte
const MIN_OID_SIZE: usize = 3;

/// Check that `oid` is a complete DER OID that fits in a field
pub fn validate_oid(oid: &[u8]) -> Result<(), AttributeError> {
    if oid.len() < MIN_OID_SIZE || oid.len() > MAX_OID_SIZE {
        return Err(AttributeError::BadEncoding);
    }
    let mut reader = DerReader::new(oid);
    let body = reader.read_expected(OID_TAG)?;
    if !reader.is_empty() {
        return Err(AttributeError::BadEncoding);
    }

    // Each arc must be minimally encoded and the final arc terminated
    let mut arc_start = true;
    for &byte in body {
        if arc_start && byte == 0x80 {
            return Err(AttributeError::BadEncoding);
        }
        arc_start = byte & 0x80 == 0;
    }
    if !arc_start {
        return Err(AttributeError::BadEncoding);
    }

    Ok(())
}

fn push_arc(body: &mut ArrayVec<u8, MAX_OID_SIZE>, arc: u64) -> Result<(), AttributeError> {
    let mut groups = [0u8; 10];
    let mut count = 0;
    let mut value = arc;
    loop {
        groups[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        body.try_push(groups[i] | continuation)
            .map_err(|_| AttributeError::ValueTooLarge)?;
    }

    Ok(())
}

/// Convert dotted text ("2.5.29.19") to a DER OID, reporting failures
/// against `field_id`
pub fn oid_from_text(text: &[u8], field_id: FieldId) -> Result<EncodedOid, AttributeError> {
    let mut arcs = [0u64; MAX_OID_SIZE];
    let mut arc_count = 0;

    for component in text.split(|&c| c == b'.') {
        if component.is_empty() || component.len() > 19 || arc_count >= arcs.len() {
            return Err(AttributeError::InvalidValue(field_id));
        }
        let mut value = 0u64;
        for &c in component {
            if !c.is_ascii_digit() {
                return Err(AttributeError::InvalidValue(field_id));
            }
            value = value * 10 + (c - b'0') as u64;
        }
        arcs[arc_count] = value;
        arc_count += 1;
    }
    if arc_count < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] > 39) {
        return Err(AttributeError::InvalidValue(field_id));
    }

    let mut body = ArrayVec::<u8, MAX_OID_SIZE>::new();
    push_arc(&mut body, arcs[0] * 40 + arcs[1])
        .map_err(|_| AttributeError::InvalidValue(field_id))?;
    for &arc in &arcs[2..arc_count] {
        push_arc(&mut body, arc).map_err(|_| AttributeError::InvalidValue(field_id))?;
    }
    if body.len() + 2 > MAX_OID_SIZE {
        return Err(AttributeError::InvalidSize(field_id));
    }

    let mut oid = EncodedOid::new();
    oid.push(OID_TAG);
    oid.push(body.len() as u8);
    oid.try_extend_from_slice(&body)
        .map_err(|_| AttributeError::InvalidSize(field_id))?;

    Ok(oid)
}

/// Displays a DER OID in dotted form
pub struct OidDisplay<'a>(pub &'a [u8]);

impl fmt::Display for OidDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.0.get(2..) {
            Some(body) if validate_oid(self.0).is_ok() => body,
            _ => return write!(f, "<invalid OID>"),
        };

        let mut first = true;
        let mut value = 0u64;
        for &byte in body {
            value = (value << 7) | (byte & 0x7F) as u64;
            if byte & 0x80 != 0 {
                continue;
            }
            if first {
                let (root, second) = match value {
                    0..=39 => (0, value),
                    40..=79 => (1, value - 40),
                    _ => (2, value - 80),
                };
                write!(f, "{root}.{second}")?;
                first = false;
            } else {
                write!(f, ".{value}")?;
            }
            value = 0;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_from_text() {
        // RFC 5280 2.5.29.19
        let oid = oid_from_text(b"2.5.29.19", FieldId::NONE).unwrap();
        assert_eq!(oid.as_slice(), &[0x06, 0x03, 0x55, 0x1D, 0x13]);

        let oid = oid_from_text(b"1.2.840.113549.1.9.3", FieldId::NONE).unwrap();
        assert_eq!(
            oid.as_slice(),
            &[0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x03]
        );
        let parsed = asn1::parse_single::<asn1::ObjectIdentifier>(&oid).unwrap();
        assert_eq!(parsed.to_string(), "1.2.840.113549.1.9.3");
        assert_eq!(OidDisplay(&oid).to_string(), "1.2.840.113549.1.9.3");

        for bad in [&b"1"[..], b"1..2", b"3.1", b"1.40", b"1.2.x", b""] {
            assert_eq!(
                oid_from_text(bad, FieldId(5)),
                Err(AttributeError::InvalidValue(FieldId(5)))
            );
        }
    }

    #[test]
    fn test_validate_oid() {
        assert!(validate_oid(&[0x06, 0x03, 0x55, 0x1D, 0x13]).is_ok());
        // Unterminated final arc
        assert!(validate_oid(&[0x06, 0x02, 0x55, 0x9D]).is_err());
        // Non-minimal arc
        assert!(validate_oid(&[0x06, 0x03, 0x55, 0x80, 0x01]).is_err());
        // Wrong tag
        assert!(validate_oid(&[0x04, 0x03, 0x55, 0x1D, 0x13]).is_err());
        // Trailing data
        assert!(validate_oid(&[0x06, 0x01, 0x55, 0x00]).is_err());
    }
}
