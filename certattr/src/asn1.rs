// Licensed under the Apache-2.0 license

//! DER primitives.
//!
//! Attributes are encoded twice, once to learn their size and once for
//! real, so `DerWriter` can run without a backing buffer and only count.

use crate::error::AttributeError;

pub const BOOL_TAG: u8 = 0x1;
pub const INTEGER_TAG: u8 = 0x2;
pub const BIT_STRING_TAG: u8 = 0x3;
pub const OCTET_STRING_TAG: u8 = 0x4;
pub const NULL_TAG: u8 = 0x5;
pub const OID_TAG: u8 = 0x6;
pub const ENUMERATED_TAG: u8 = 0xA;
pub const UTF8_STRING_TAG: u8 = 0xC;
pub const NUMERIC_STRING_TAG: u8 = 0x12;
pub const PRINTABLE_STRING_TAG: u8 = 0x13;
pub const T61_STRING_TAG: u8 = 0x14;
pub const IA5_STRING_TAG: u8 = 0x16;
pub const UTC_TIME_TAG: u8 = 0x17;
pub const GENERALIZE_TIME_TAG: u8 = 0x18;
pub const VISIBLE_STRING_TAG: u8 = 0x1A;
pub const BMP_STRING_TAG: u8 = 0x1E;
pub const SEQUENCE_TAG: u8 = 0x30;
pub const SET_OF_TAG: u8 = 0x31;

// Constants for setting tag bits
pub const CONTEXT_SPECIFIC: u8 = 0x80; // Used for Implicit/Explicit tags
pub const CONSTRUCTED: u8 = 0x20; // SET{OF} and SEQUENCE{OF} have this bit set
const TAG_NUMBER_MASK: u8 = 0x1F;

pub const BOOL_SIZE: usize = 1;

/// Bounds-checked DER writer. A writer created with [`DerWriter::null`]
/// has no buffer and only tracks how many bytes would have been written.
pub struct DerWriter<'a> {
    buffer: Option<&'a mut [u8]>,
    offset: usize,
}

impl<'a> DerWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> DerWriter<'a> {
        DerWriter {
            buffer: Some(buffer),
            offset: 0,
        }
    }

    pub fn null() -> DerWriter<'a> {
        DerWriter {
            buffer: None,
            offset: 0,
        }
    }

    /// Number of bytes written so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_null(&self) -> bool {
        self.buffer.is_none()
    }

    /// Calculate the number of bytes the ASN.1 size field will be
    pub fn get_size_width(size: usize) -> Result<usize, AttributeError> {
        if size <= 127 {
            Ok(1)
        } else if size <= 255 {
            Ok(2)
        } else if size <= 65535 {
            Ok(3)
        } else {
            Err(AttributeError::ValueTooLarge)
        }
    }

    /// Get the size of an ASN.1 structure
    /// If tagged, includes the tag and size
    pub fn get_structure_size(data_size: usize, tagged: bool) -> Result<usize, AttributeError> {
        let size = if tagged {
            1 + Self::get_size_width(data_size)? + data_size
        } else {
            data_size
        };

        Ok(size)
    }

    /// Calculate the number of bytes the ASN.1 INTEGER will be
    /// If `tagged`, include the tag and size fields
    pub fn get_integer_bytes_size(integer: &[u8], tagged: bool) -> Result<usize, AttributeError> {
        let mut len = integer.len();
        for (i, &byte) in integer.iter().enumerate() {
            if byte == 0 && i != integer.len() - 1 {
                len -= 1;
            } else if (byte & 0x80) != 0 {
                len += 1;
                break;
            } else {
                break;
            }
        }

        Self::get_structure_size(len, tagged)
    }

    /// Calculate the number of bytes the ASN.1 INTEGER will be
    /// If `tagged`, include the tag and size fields
    pub fn get_integer_size(integer: u64, tagged: bool) -> Result<usize, AttributeError> {
        let bytes = integer.to_be_bytes();
        Self::get_integer_bytes_size(&bytes, tagged)
    }

    /// Calculate the number of bytes an ASN.1 raw bytes field will be.
    /// Can be used for OCTET STRING, OID, UTF8 STRING, etc.
    /// If `tagged`, include the tag and size fields
    pub fn get_bytes_size(bytes: &[u8], tagged: bool) -> Result<usize, AttributeError> {
        Self::get_structure_size(bytes.len(), tagged)
    }

    /// Calculate the number of bytes a named-bit BIT STRING will be. Bit `n`
    /// of `bits` is named bit `n`; trailing zero bits are not encoded.
    /// If `tagged`, include the tag and size fields
    pub fn get_bit_string_size(bits: u64, tagged: bool) -> Result<usize, AttributeError> {
        let significant = (u64::BITS - bits.leading_zeros()) as usize;
        Self::get_structure_size(1 + significant.div_ceil(8), tagged)
    }

    /// Write all of `bytes` to the buffer
    pub fn encode_bytes(&mut self, bytes: &[u8]) -> Result<usize, AttributeError> {
        let size = bytes.len();

        if let Some(buffer) = self.buffer.as_deref_mut() {
            buffer
                .get_mut(self.offset..self.offset + size)
                .ok_or(AttributeError::BufferTooSmall)?
                .copy_from_slice(bytes);
        }
        self.offset += size;

        Ok(size)
    }

    /// Write a single `byte` to the buffer
    pub fn encode_byte(&mut self, byte: u8) -> Result<usize, AttributeError> {
        self.encode_bytes(&[byte])
    }

    /// DER-encodes the tag field of an ASN.1 type
    pub fn encode_tag_field(&mut self, tag: u8) -> Result<usize, AttributeError> {
        self.encode_byte(tag)
    }

    /// DER-encodes the size field of an ASN.1 type
    pub fn encode_size_field(&mut self, size: usize) -> Result<usize, AttributeError> {
        let size_width = Self::get_size_width(size)?;

        if size_width == 1 {
            self.encode_byte(size as u8)?;
        } else {
            let rem = size_width - 1;
            self.encode_byte(0x80 | rem as u8)?;

            for i in (0..rem).rev() {
                self.encode_byte((size >> (i * 8)) as u8)?;
            }
        }

        Ok(size_width)
    }

    /// DER-encodes the tag and size of a structure whose contents follow
    pub fn encode_header(&mut self, tag: u8, size: usize) -> Result<usize, AttributeError> {
        let mut bytes_written = self.encode_tag_field(tag)?;
        bytes_written += self.encode_size_field(size)?;

        Ok(bytes_written)
    }

    /// DER-encodes a big-endian integer buffer as an INTEGER-like type
    /// tagged with `tag`
    pub fn encode_integer_bytes(&mut self, tag: u8, integer: &[u8]) -> Result<usize, AttributeError> {
        let mut bytes_written = self.encode_tag_field(tag)?;

        let size = Self::get_integer_bytes_size(integer, false)?;
        bytes_written += self.encode_size_field(size)?;

        // Compute where to start reading from integer (strips leading zeros)
        let integer_offset = integer.len().saturating_sub(size);

        // If size got larger it is because a null byte needs to be prepended
        if size > integer.len() {
            bytes_written += self.encode_byte(0)?;
        }

        if integer_offset >= integer.len() {
            return Err(AttributeError::InternalError);
        }
        bytes_written += self.encode_bytes(&integer[integer_offset..])?;

        Ok(bytes_written)
    }

    /// DER-encodes `integer` as an INTEGER-like type tagged with `tag`
    pub fn encode_integer(&mut self, tag: u8, integer: u64) -> Result<usize, AttributeError> {
        self.encode_integer_bytes(tag, &integer.to_be_bytes())
    }

    pub fn encode_bool(&mut self, tag: u8, value: bool) -> Result<usize, AttributeError> {
        let mut bytes_written = self.encode_header(tag, BOOL_SIZE)?;
        bytes_written += self.encode_byte(if value { 0xFF } else { 0x00 })?;

        Ok(bytes_written)
    }

    pub fn encode_null(&mut self, tag: u8) -> Result<usize, AttributeError> {
        self.encode_header(tag, 0)
    }

    /// DER-encodes `bits` as a named-bit BIT STRING, see
    /// [`DerWriter::get_bit_string_size`]
    pub fn encode_bit_string(&mut self, tag: u8, bits: u64) -> Result<usize, AttributeError> {
        let significant = (u64::BITS - bits.leading_zeros()) as usize;
        let octets = significant.div_ceil(8);
        let unused = (octets * 8 - significant) as u8;

        let mut bytes_written = self.encode_header(tag, 1 + octets)?;
        bytes_written += self.encode_byte(unused)?;
        for octet in 0..octets {
            let mut byte = 0u8;
            for bit in 0..8 {
                if bits & (1 << (octet * 8 + bit)) != 0 {
                    byte |= 0x80 >> bit;
                }
            }
            bytes_written += self.encode_byte(byte)?;
        }

        Ok(bytes_written)
    }

    /// DER-encodes `bytes` as a primitive value tagged with `tag`. Used for
    /// OCTET STRING, the string types and time values.
    pub fn encode_primitive(&mut self, tag: u8, bytes: &[u8]) -> Result<usize, AttributeError> {
        let mut bytes_written = self.encode_header(tag, bytes.len())?;
        bytes_written += self.encode_bytes(bytes)?;

        Ok(bytes_written)
    }
}

/// A decoded tag-length-value triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    pub tag: u8,
    pub content: &'a [u8],
    /// The complete encoding, tag and length included
    pub encoded: &'a [u8],
}

impl Tlv<'_> {
    pub fn is_constructed(&self) -> bool {
        self.tag & CONSTRUCTED != 0
    }
}

/// Bounds-checked DER reader over a borrowed buffer. Only definite-length
/// encodings with single-byte tags are accepted.
pub struct DerReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> DerReader<'a> {
        DerReader { data, offset: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or_default()
    }

    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn read_byte(&mut self) -> Result<u8, AttributeError> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or(AttributeError::BadEncoding)?;
        self.offset += 1;
        Ok(byte)
    }

    fn read_length(&mut self) -> Result<usize, AttributeError> {
        let first = self.read_byte()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }

        // Indefinite lengths and lengths wider than our size fields are
        // never valid DER for attribute data
        let width = (first & 0x7F) as usize;
        if width == 0 || width > 2 {
            return Err(AttributeError::BadEncoding);
        }
        let mut length = 0usize;
        for _ in 0..width {
            length = (length << 8) | self.read_byte()? as usize;
        }
        if DerWriter::get_size_width(length)? != width + 1 {
            return Err(AttributeError::BadEncoding);
        }

        Ok(length)
    }

    pub fn read_tlv(&mut self) -> Result<Tlv<'a>, AttributeError> {
        let start = self.offset;
        let tag = self.read_byte()?;
        if tag & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
            return Err(AttributeError::BadEncoding);
        }
        let length = self.read_length()?;
        let content_start = self.offset;
        let content = self
            .data
            .get(content_start..content_start + length)
            .ok_or(AttributeError::BadEncoding)?;
        self.offset += length;

        Ok(Tlv {
            tag,
            content,
            encoded: &self.data[start..self.offset],
        })
    }

    /// Read an element that must carry `tag` and return its contents
    pub fn read_expected(&mut self, tag: u8) -> Result<&'a [u8], AttributeError> {
        let tlv = self.read_tlv()?;
        if tlv.tag != tag {
            return Err(AttributeError::BadEncoding);
        }

        Ok(tlv.content)
    }
}

/// Decode the contents of a non-negative INTEGER
pub fn decode_integer(content: &[u8]) -> Result<u64, AttributeError> {
    let (&first, _) = content.split_first().ok_or(AttributeError::BadEncoding)?;
    if first & 0x80 != 0 {
        return Err(AttributeError::BadEncoding);
    }
    let digits = if first == 0 && content.len() > 1 {
        &content[1..]
    } else {
        content
    };
    if digits.len() > 8 {
        return Err(AttributeError::BadEncoding);
    }

    Ok(digits
        .iter()
        .fold(0u64, |value, &byte| (value << 8) | byte as u64))
}

/// DER booleans only: TRUE must be 0xFF
pub fn decode_bool(content: &[u8]) -> Result<bool, AttributeError> {
    match content {
        [0x00] => Ok(false),
        [0xFF] => Ok(true),
        _ => Err(AttributeError::BadEncoding),
    }
}

/// Decode the contents of a named-bit BIT STRING into a bit mask, the
/// inverse of [`DerWriter::encode_bit_string`]
pub fn decode_bit_string(content: &[u8]) -> Result<u64, AttributeError> {
    let (&unused, octets) = content.split_first().ok_or(AttributeError::BadEncoding)?;
    if unused > 7 || octets.len() > 8 || (octets.is_empty() && unused != 0) {
        return Err(AttributeError::BadEncoding);
    }

    let mut bits = 0u64;
    for (octet, &byte) in octets.iter().enumerate() {
        for bit in 0..8 {
            if byte & (0x80 >> bit) != 0 {
                bits |= 1 << (octet * 8 + bit);
            }
        }
    }

    Ok(bits)
}

/// Check that `bytes` is exactly one well-formed DER element, descending
/// into constructed contents
pub fn validate_der(bytes: &[u8]) -> Result<(), AttributeError> {
    let mut reader = DerReader::new(bytes);
    validate_element(&mut reader, 0)?;
    if !reader.is_empty() {
        return Err(AttributeError::BadEncoding);
    }

    Ok(())
}

const MAX_VALIDATION_DEPTH: usize = 16;

fn validate_element(reader: &mut DerReader, depth: usize) -> Result<(), AttributeError> {
    if depth > MAX_VALIDATION_DEPTH {
        return Err(AttributeError::BadEncoding);
    }
    let tlv = reader.read_tlv()?;
    if tlv.is_constructed() {
        let mut contents = DerReader::new(tlv.content);
        while !contents.is_empty() {
            validate_element(&mut contents, depth + 1)?;
        }
    }

    Ok(())
}
