// Licensed under the Apache-2.0 license

use crate::field_id::FieldId;

/// Classifies a data error against the field that caused it, so a caller
/// can report which field was wrong and in what way.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorType {
    /// A required field is missing
    AttrAbsent,
    /// A field is present that shouldn't be
    AttrPresent,
    /// A field has an invalid value
    AttrValue,
    /// A field has an invalid length
    AttrSize,
}

/// Data errors are caused by what the caller put into the list or handed
/// to the decoder. Resource errors are capacity limits. Internal errors
/// indicate a broken table or a bug and are never produced by data alone.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorClass {
    Data,
    Resource,
    Internal,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u16)]
pub enum AttributeError {
    RequiredFieldAbsent(FieldId) = 0x1,
    ConflictingChoiceValue(FieldId) = 0x2,
    CustomValidationFailed(FieldId, ErrorType) = 0x3,
    InvalidValue(FieldId) = 0x4,
    InvalidSize(FieldId) = 0x5,
    AttributePresent(FieldId) = 0x6,
    UnknownField(FieldId) = 0x7,
    PermissionDenied = 0x8,
    BadEncoding = 0x9,
    NotFound = 0xA,
    BufferTooSmall = 0x100,
    ListFull = 0x101,
    ValueTooLarge = 0x102,
    TableInconsistency = 0x1000,
    StackOverflow = 0x1001,
    FifoOverflow = 0x1002,
    IterationLimit = 0x1003,
    InternalError = 0x1004,
}

impl AttributeError {
    pub fn discriminant(&self) -> u16 {
        // SAFETY: Because `Self` is marked `repr(u16)`, its layout is a `repr(C)` `union`
        // between `repr(C)` structs, each of which has the `u16` discriminant as its first
        // field, so we can read the discriminant without offsetting the pointer.
        unsafe { *<*const _>::from(self).cast::<u16>() }
    }

    pub fn get_error_detail(&self) -> Option<u32> {
        self.locus().map(|field_id| u32::from(field_id.0))
    }

    pub fn class(&self) -> ErrorClass {
        match self.discriminant() {
            0x0..=0xFF => ErrorClass::Data,
            0x100..=0xFFF => ErrorClass::Resource,
            _ => ErrorClass::Internal,
        }
    }

    /// The field an error is attributed to, if any
    pub fn locus(&self) -> Option<FieldId> {
        match self {
            AttributeError::RequiredFieldAbsent(field_id) => Some(*field_id),
            AttributeError::ConflictingChoiceValue(field_id) => Some(*field_id),
            AttributeError::CustomValidationFailed(field_id, _) => Some(*field_id),
            AttributeError::InvalidValue(field_id) => Some(*field_id),
            AttributeError::InvalidSize(field_id) => Some(*field_id),
            AttributeError::AttributePresent(field_id) => Some(*field_id),
            AttributeError::UnknownField(field_id) => Some(*field_id),
            _ => None,
        }
    }

    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            AttributeError::RequiredFieldAbsent(_) => Some(ErrorType::AttrAbsent),
            AttributeError::ConflictingChoiceValue(_) => Some(ErrorType::AttrPresent),
            AttributeError::CustomValidationFailed(_, error_type) => Some(*error_type),
            AttributeError::InvalidValue(_) => Some(ErrorType::AttrValue),
            AttributeError::InvalidSize(_) => Some(ErrorType::AttrSize),
            AttributeError::AttributePresent(_) => Some(ErrorType::AttrPresent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminant() {
        assert_eq!(AttributeError::RequiredFieldAbsent(FieldId(7)).discriminant(), 0x1);
        assert_eq!(
            AttributeError::CustomValidationFailed(FieldId(7), ErrorType::AttrValue).discriminant(),
            0x3
        );
        assert_eq!(AttributeError::ListFull.discriminant(), 0x101);
        assert_eq!(AttributeError::FifoOverflow.discriminant(), 0x1002);
    }

    #[test]
    fn test_class_and_locus() {
        let err = AttributeError::InvalidSize(FieldId(1072));
        assert_eq!(err.class(), ErrorClass::Data);
        assert_eq!(err.locus(), Some(FieldId(1072)));
        assert_eq!(err.get_error_detail(), Some(1072));
        assert_eq!(err.error_type(), Some(ErrorType::AttrSize));

        assert_eq!(AttributeError::BufferTooSmall.class(), ErrorClass::Resource);
        assert_eq!(AttributeError::StackOverflow.class(), ErrorClass::Internal);
        assert_eq!(AttributeError::TableInconsistency.locus(), None);
        assert_eq!(AttributeError::IterationLimit.get_error_detail(), None);
    }
}
