// Licensed under the Apache-2.0 license

//! Cursor movement over the attribute list at three granularities: whole
//! attributes, runs of one field ID within an attribute, and instances of
//! one field.

use crate::list::{AttributeField, AttributeList, FieldRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Group,
    Attribute,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    First,
    Last,
    Next,
    Previous,
}

/// The runs of fields that movement steps over or stays within
#[derive(Clone, Copy)]
enum Unit {
    /// All fields of one attribute
    Group,
    /// Fields of one attribute sharing a field ID
    FieldRun,
    /// Fields sharing a field ID and GeneralName component
    InstanceRun,
    Single,
}

fn same_unit(unit: Unit, a: &AttributeField, b: &AttributeField) -> bool {
    match unit {
        Unit::Group => a.same_attribute(b),
        Unit::FieldRun => a.same_attribute(b) && a.field_id == b.field_id,
        Unit::InstanceRun => {
            a.same_attribute(b) && a.field_id == b.field_id && a.sub_field_id == b.sub_field_id
        }
        Unit::Single => false,
    }
}

/// The unit a step moves over and the unit it stays within
fn units(granularity: Granularity) -> (Unit, Option<Unit>) {
    match granularity {
        Granularity::Group => (Unit::Group, None),
        Granularity::Attribute => (Unit::FieldRun, Some(Unit::Group)),
        Granularity::Instance => (Unit::Single, Some(Unit::InstanceRun)),
    }
}

/// First field of the unit containing `field_ref`
fn unit_start(list: &AttributeList, field_ref: FieldRef, unit: Unit) -> FieldRef {
    let Some(field) = list.get(field_ref) else {
        return field_ref;
    };
    let mut start = field_ref;
    while let Some(prev) = list.prev(start) {
        match list.get(prev) {
            Some(prev_field) if same_unit(unit, prev_field, field) => start = prev,
            _ => break,
        }
    }

    start
}

/// First field after the unit containing `field_ref`
fn unit_end(list: &AttributeList, field_ref: FieldRef, unit: Unit) -> Option<FieldRef> {
    let field = list.get(field_ref)?;
    let mut cursor = list.next(field_ref);
    while let Some(current) = cursor {
        match list.get(current) {
            Some(next) if same_unit(unit, next, field) => cursor = list.next(current),
            _ => break,
        }
    }

    cursor
}

fn within(list: &AttributeList, a: FieldRef, b: FieldRef, bound: Option<Unit>) -> bool {
    match (bound, list.get(a), list.get(b)) {
        (None, _, _) => true,
        (Some(bound), Some(a), Some(b)) => same_unit(bound, a, b),
        _ => false,
    }
}

/// Move `cursor` by one unit of `granularity`, or to the first/last unit.
/// Movement below the group level stays within the enclosing unit.
/// Returns `None` when there is nowhere to move to.
pub fn move_cursor(
    list: &AttributeList,
    cursor: Option<FieldRef>,
    granularity: Granularity,
    direction: Direction,
) -> Option<FieldRef> {
    let (unit, bound) = units(granularity);

    let Some(cursor) = cursor else {
        // Without a position only whole-list movement makes sense
        return match (granularity, direction) {
            (Granularity::Group, Direction::First) => list.head(),
            (Granularity::Group, Direction::Last) => {
                list.tail().map(|tail| unit_start(list, tail, Unit::Group))
            }
            _ => None,
        };
    };
    list.get(cursor)?;

    match direction {
        Direction::First => Some(match bound {
            Some(bound) => unit_start(list, cursor, bound),
            None => list.head()?,
        }),
        Direction::Last => {
            let last = match bound {
                Some(bound) => match unit_end(list, cursor, bound) {
                    Some(end) => list.prev(end)?,
                    None => list.tail()?,
                },
                None => list.tail()?,
            };
            Some(unit_start(list, last, unit))
        }
        Direction::Next => {
            let next = unit_end(list, cursor, unit)?;
            within(list, cursor, next, bound).then_some(next)
        }
        Direction::Previous => {
            let start = unit_start(list, cursor, unit);
            let prev = list.prev(start)?;
            within(list, cursor, prev, bound).then(|| unit_start(list, prev, unit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{add::AttributeValue, field_id, field_id::FieldId, list::FieldFlags, AttributeKind};

    fn add(list: &mut AttributeList, field_id: FieldId, sub_field_id: FieldId, value: AttributeValue) -> FieldRef {
        list.add_field(
            AttributeKind::Certificate,
            field_id,
            sub_field_id,
            value,
            FieldFlags::empty(),
        )
        .unwrap()
    }

    #[test]
    fn test_move_cursor() {
        let mut list = AttributeList::new();
        let ku = add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(1));
        let dns1 = add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"a.example.com"),
        );
        let dns2 = add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"b.example.com"),
        );
        let uri = add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::UNIFORM_RESOURCE_IDENTIFIER,
            AttributeValue::Bytes(b"http://www.example.com"),
        );
        let ca = add(&mut list, field_id::CA, FieldId::NONE, AttributeValue::Integer(1));
        let path = add(
            &mut list,
            field_id::PATH_LEN_CONSTRAINT,
            FieldId::NONE,
            AttributeValue::Integer(0),
        );

        use Direction::*;
        use Granularity::*;
        assert_eq!(move_cursor(&list, None, Group, First), Some(ku));
        assert_eq!(move_cursor(&list, None, Group, Last), Some(ca));
        assert_eq!(move_cursor(&list, None, Instance, Next), None);

        assert_eq!(move_cursor(&list, Some(ku), Group, Next), Some(dns1));
        assert_eq!(move_cursor(&list, Some(dns2), Group, Next), Some(ca));
        assert_eq!(move_cursor(&list, Some(ca), Group, Next), None);
        assert_eq!(move_cursor(&list, Some(uri), Group, Previous), Some(ku));
        assert_eq!(move_cursor(&list, Some(path), Group, Previous), Some(dns1));

        // Fields within basicConstraints
        assert_eq!(move_cursor(&list, Some(ca), Attribute, Next), Some(path));
        assert_eq!(move_cursor(&list, Some(path), Attribute, Next), None);
        assert_eq!(move_cursor(&list, Some(path), Attribute, First), Some(ca));
        assert_eq!(move_cursor(&list, Some(ca), Attribute, Last), Some(path));

        // Instances of the subjectAltName DNS name
        assert_eq!(move_cursor(&list, Some(dns1), Instance, Next), Some(dns2));
        assert_eq!(move_cursor(&list, Some(dns2), Instance, Next), None);
        assert_eq!(move_cursor(&list, Some(dns2), Instance, Previous), Some(dns1));
        assert_eq!(move_cursor(&list, Some(dns1), Instance, Last), Some(dns2));
    }
}
