// Licensed under the Apache-2.0 license

//! Attribute equality. Fields flagged as holding their default value are
//! not encoded, so they are ignored here as well.

use crate::{
    error::AttributeError,
    list::{AttributeField, AttributeList, FieldFlags, FieldRef},
    ITERATIONS_LARGE,
};

fn is_significant(field: &AttributeField) -> bool {
    !field.flags.contains(FieldFlags::DEFAULT_VALUE)
}

fn same_field(a: &AttributeField, b: &AttributeField) -> bool {
    a.is_blob() == b.is_blob()
        && a.attribute_id == b.attribute_id
        && a.field_id == b.field_id
        && a.sub_field_id == b.sub_field_id
        && a.is_critical() == b.is_critical()
        && a.value == b.value
        && a.oid == b.oid
}

/// Next field of the attribute ending before `end` that isn't a default
fn next_significant(
    list: &AttributeList,
    mut cursor: Option<FieldRef>,
    end: Option<FieldRef>,
) -> Result<Option<FieldRef>, AttributeError> {
    for _ in 0..ITERATIONS_LARGE {
        match cursor {
            Some(current) if Some(current) != end => {
                if is_significant(list.field(current)?) {
                    return Ok(Some(current));
                }
                cursor = list.next(current);
            }
            _ => return Ok(None),
        }
    }

    Err(AttributeError::IterationLimit)
}

/// Compare the attribute containing `a_ref` in `a_list` with the one
/// containing `b_ref` in `b_list`, field by field
pub fn compare_attributes(
    a_list: &AttributeList,
    a_ref: FieldRef,
    b_list: &AttributeList,
    b_ref: FieldRef,
) -> Result<bool, AttributeError> {
    let a_head = a_list.attribute_head(a_ref)?;
    let b_head = b_list.attribute_head(b_ref)?;
    let a_end = a_list.next_attribute(a_head)?;
    let b_end = b_list.next_attribute(b_head)?;

    let mut a_cursor = next_significant(a_list, Some(a_head), a_end)?;
    let mut b_cursor = next_significant(b_list, Some(b_head), b_end)?;
    for _ in 0..ITERATIONS_LARGE {
        match (a_cursor, b_cursor) {
            (None, None) => return Ok(true),
            (Some(a), Some(b)) => {
                if !same_field(a_list.field(a)?, b_list.field(b)?) {
                    return Ok(false);
                }
                a_cursor = next_significant(a_list, a_list.next(a), a_end)?;
                b_cursor = next_significant(b_list, b_list.next(b), b_end)?;
            }
            _ => return Ok(false),
        }
    }

    Err(AttributeError::IterationLimit)
}

/// Whether two lists hold the same attributes with the same values
pub fn compare_attribute_lists(a: &AttributeList, b: &AttributeList) -> bool {
    let mut a_fields = a.iter().map(|(_, field)| field).filter(|f| is_significant(f));
    let mut b_fields = b.iter().map(|(_, field)| field).filter(|f| is_significant(f));
    loop {
        match (a_fields.next(), b_fields.next()) {
            (None, None) => return true,
            (Some(a), Some(b)) if same_field(a, b) => continue,
            _ => return false,
        }
    }
}
