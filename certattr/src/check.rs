// Licensed under the Apache-2.0 license

//! The validation pass.
//!
//! Walks each attribute's table entries in lock step with its fields. Every
//! constructed entry is pushed on a stack, and when a later entry closes it
//! the wrapper is recorded in the FIFO of the first field it contains,
//! together with the size of what it wraps. The write pass then only has to
//! replay each field's FIFO.

use crate::{
    error::AttributeError,
    field_id::FieldId,
    list::{AttributeField, AttributeList, FieldFlags, FieldRef, FifoEntry},
    table::{
        attribute_start, AttributeTypeEntry, EncodingFlags, EntryRef, FieldType, TypeInfoFlags,
    },
    write::{sizeof_attribute_field, wrapped_size},
    AttributeKind, ObjectKind, ATTRIBUTE_STACK_SIZE, ITERATIONS_LARGE, ITERATIONS_MED,
};
use arrayvec::ArrayVec;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChoiceState {
    None,
    Start,
    Done,
}

/// An open wrapper. `owner` is the field whose FIFO receives it.
#[derive(Debug, Clone, Copy)]
struct StackEntry {
    owner: Option<FieldRef>,
    entry: EntryRef,
    size: usize,
}

enum ComponentPresence {
    Present,
    /// The group ends at `stop`, whose nesting count closes `surplus`
    /// levels beyond the group itself
    Absent { stop: usize, surplus: usize },
}

/// Position within one table. Saved and restored around a descent into a
/// sub-table.
#[derive(Clone, Copy)]
struct Level {
    table: &'static [AttributeTypeEntry],
    index: usize,
    /// Field whose sub-table is being walked, `FieldId::NONE` at the top
    subtype_parent: FieldId,
    /// Only one alternative of the sub-table may match
    single_alternative: bool,
    matched_alternative: Option<usize>,
    choice_state: ChoiceState,
    /// Stack depth on entry to this level
    stack_marker: usize,
    /// Current field and the next instance of it, which re-runs the
    /// enclosing SET OF once the current field is consumed
    restart: Option<(FieldRef, FieldRef)>,
}

struct CheckState {
    cursor: Option<FieldRef>,
    attribute_id: FieldId,
    stack: ArrayVec<StackEntry, ATTRIBUTE_STACK_SIZE>,
    level: Level,
}

impl CheckState {
    fn new(start: EntryRef, head: FieldRef, attribute_id: FieldId) -> CheckState {
        CheckState {
            cursor: Some(head),
            attribute_id,
            stack: ArrayVec::new(),
            level: Level {
                table: start.table(),
                index: start.index(),
                subtype_parent: FieldId::NONE,
                single_alternative: false,
                matched_alternative: None,
                choice_state: ChoiceState::None,
                stack_marker: 0,
                restart: None,
            },
        }
    }

    fn entry(&self) -> Result<EntryRef, AttributeError> {
        EntryRef::new(self.level.table, self.level.index).ok_or(AttributeError::TableInconsistency)
    }

    /// Index of the alternative being matched in a sub-table: the first
    /// entry opened at this level, or the current entry
    fn alternative(&self) -> usize {
        match self.stack.get(self.level.stack_marker) {
            Some(open) => open.entry.index(),
            None => self.level.index,
        }
    }
}

/// The field at the cursor, if it belongs to the attribute being checked
fn current_field<'a>(
    list: &'a AttributeList,
    state: &CheckState,
) -> Option<(FieldRef, &'a AttributeField)> {
    let field_ref = state.cursor?;
    let field = list.get(field_ref)?;
    (!field.is_blob() && field.attribute_id == state.attribute_id).then_some((field_ref, field))
}

/// The ID the field is matched against `entry` with. Inside a sub-table
/// this is the GeneralName component, or for a CHOICE the selected entry.
fn match_id(state: &CheckState, field: &AttributeField, entry: &AttributeTypeEntry) -> FieldId {
    let parent = state.level.subtype_parent;
    if parent == FieldId::NONE || parent != field.field_id {
        return field.field_id;
    }
    if entry.field_type == FieldType::Identifier {
        FieldId::from_selector(field.value.as_integer().unwrap_or(0))
    } else {
        field.sub_field_id
    }
}

fn push(list: &AttributeList, state: &mut CheckState, entry: EntryRef) -> Result<(), AttributeError> {
    let owner = current_field(list, state).map(|(field_ref, _)| field_ref);
    state
        .stack
        .try_push(StackEntry {
            owner,
            entry,
            size: 0,
        })
        .map_err(|_| AttributeError::StackOverflow)?;
    trace!(
        "[check] push {} at depth {}",
        entry.entry().description,
        state.stack.len()
    );

    Ok(())
}

/// Close `count` stack levels. Closed wrappers that contain something are
/// recorded in their owner's FIFO and their encoded size is added to the
/// enclosing level.
///
/// A relative count is in nesting levels, so popping a non-constructed
/// entry (an identifier OID or a fixed value) doesn't use it up. An
/// absolute count is in stack entries.
fn update_stacked_info(
    list: &mut AttributeList,
    state: &mut CheckState,
    count: usize,
    relative: bool,
) -> Result<(), AttributeError> {
    let mut count = count;
    for _ in 0..ITERATIONS_MED {
        if count == 0 {
            return Ok(());
        }
        if state.stack.len() <= state.level.stack_marker {
            return Err(AttributeError::TableInconsistency);
        }
        let closed = state.stack.pop().ok_or(AttributeError::InternalError)?;
        let entry = closed.entry.entry();
        count -= 1;
        if relative && !entry.field_type.is_constructed() {
            count += 1;
        }
        trace!(
            "[check] pop {} size {} at depth {}",
            entry.description,
            closed.size,
            state.stack.len()
        );

        let Some(owner) = closed.owner else {
            continue;
        };
        let owner = list.field_mut(owner)?;
        if closed.size == 0 && !owner.flags.contains(FieldFlags::DEFAULT_VALUE) && !entry.is_nonencoding() {
            continue;
        }
        owner
            .fifo
            .try_push(FifoEntry {
                size: closed.size,
                entry: closed.entry,
            })
            .map_err(|_| AttributeError::FifoOverflow)?;

        if let Some(parent) = state.stack.last_mut() {
            parent.size += wrapped_size(entry, closed.size)?;
        }
    }

    Err(AttributeError::IterationLimit)
}

/// Look ahead from an identifier group for an entry matching the field at
/// the cursor, stopping where the group closes
fn check_component_present(
    list: &AttributeList,
    state: &CheckState,
) -> Result<ComponentPresence, AttributeError> {
    let field_id = current_field(list, state).map(|(_, field)| field.field_id);
    let table = state.level.table;

    let mut nest: i32 = 0;
    for (index, entry) in table
        .iter()
        .enumerate()
        .skip(state.level.index)
        .take(ITERATIONS_MED)
    {
        if entry.field_type.is_constructed() {
            nest += 1;
        }
        if entry.field_id != FieldId::NONE && Some(entry.field_id) == field_id {
            return Ok(ComponentPresence::Present);
        }
        nest -= i32::from(entry.seq_end);
        if nest <= 0 || entry.is_end() {
            return Ok(ComponentPresence::Absent {
                stop: index,
                surplus: usize::try_from(-nest).unwrap_or(0),
            });
        }
    }

    Err(AttributeError::TableInconsistency)
}

/// SEQUENCE { OID, value } selected by the OID. Returns whether the
/// caller should skip closing levels for the current entry.
fn check_identifier(
    list: &mut AttributeList,
    state: &mut CheckState,
    entry: EntryRef,
) -> Result<bool, AttributeError> {
    match check_component_present(list, state)? {
        ComponentPresence::Absent { stop, surplus } => {
            state.level.index = stop;
            if surplus > 0 {
                update_stacked_info(list, state, surplus, true)?;
            }
            Ok(true)
        }
        ComponentPresence::Present => {
            push(list, state, entry)?;
            state.level.index += 1;
            let oid = state.entry()?;
            push(list, state, oid)?;

            // The OID alone, or with a fixed parameter, is the whole field
            let mut last = oid;
            let mut end_of_field = oid.entry().seq_end > 0;
            if !end_of_field {
                if let Some(fixed) = oid.next().filter(|next| next.entry().is_nonencoding()) {
                    state.level.index += 1;
                    push(list, state, fixed)?;
                    last = fixed;
                    end_of_field = true;
                }
            }
            if end_of_field {
                let field_ref = state.cursor.ok_or(AttributeError::InternalError)?;
                let field = list.field_mut(field_ref)?;
                field.entry = Some(last);
                field.encoded_size = 0;
                state.cursor = list.next(field_ref);
            }

            Ok(false)
        }
    }
}

/// Descend into the sub-table of a sub-typed or CHOICE field
fn check_subtyped(
    list: &mut AttributeList,
    state: &mut CheckState,
    entry_ref: EntryRef,
    field_id: FieldId,
) -> Result<(), AttributeError> {
    let entry = entry_ref.entry();
    let start_cursor = state.cursor;
    if entry.field_type == FieldType::Choice {
        push(list, state, entry_ref)?;
        state.level.choice_state = ChoiceState::Start;
    }
    let sub_table = entry
        .get_sub_table()
        .ok_or(AttributeError::TableInconsistency)?;
    let single_alternative = !state
        .stack
        .last()
        .is_some_and(|top| top.entry.entry().is_setof_container());

    let saved = state.level;
    state.level = Level {
        table: sub_table,
        index: 0,
        subtype_parent: field_id,
        single_alternative,
        matched_alternative: None,
        choice_state: saved.choice_state,
        stack_marker: state.stack.len(),
        restart: None,
    };
    trace!("[check] entering sub-table of {}", entry.description);
    let result = check_attribute(list, state);
    state.level = saved;
    trace!("[check] leaving sub-table of {}", entry.description);
    result?;

    if state.cursor == start_cursor && !entry.is_optional() {
        return Err(AttributeError::TableInconsistency);
    }

    Ok(())
}

/// Check the current table entry against the field at the cursor.
/// Returns whether the entry's closing levels have already been dealt with.
fn check_attribute_entry(list: &mut AttributeList, state: &mut CheckState) -> Result<bool, AttributeError> {
    let entry_ref = state.entry()?;
    let entry = entry_ref.entry();

    let candidate = current_field(list, state).map(|(field_ref, field)| {
        (field_ref, field.field_id, match_id(state, field, entry))
    });
    if let Some((field_ref, parent_id, field_id)) = candidate {
        let other_alternative = state.level.single_alternative
            && state
                .level
                .matched_alternative
                .is_some_and(|matched| matched != state.alternative());
        if field_id != FieldId::NONE && field_id == entry.field_id && !other_alternative {
            if matches!(entry.field_type, FieldType::Subtyped | FieldType::Choice) {
                check_subtyped(list, state, entry_ref, parent_id)?;
                return Ok(false);
            }

            let field = list.field_mut(field_ref)?;
            if let Some(validator) = entry.get_validator() {
                validator(field)
                    .map_err(|error_type| AttributeError::CustomValidationFailed(field_id, error_type))?;
            }
            field.entry = Some(entry_ref);
            if entry.has_default() && field.value.as_integer() == Some(entry.default_value) {
                field.flags |= FieldFlags::DEFAULT_VALUE;
            } else {
                let size = sizeof_attribute_field(field, entry)?;
                field.encoded_size = size;
                if let Some(top) = state.stack.last_mut() {
                    top.size += size;
                }
                state.level.choice_state = match state.level.choice_state {
                    ChoiceState::None => ChoiceState::None,
                    ChoiceState::Start => ChoiceState::Done,
                    ChoiceState::Done => return Err(AttributeError::ConflictingChoiceValue(field_id)),
                };
                state.level.matched_alternative = Some(state.alternative());
            }
            state.cursor = list.next(field_ref);

            return Ok(false);
        }
    }

    if entry.encoding.contains(EncodingFlags::IDENTIFIER) {
        return check_identifier(list, state, entry_ref);
    }
    if entry.field_type.is_constructed() || (entry.is_nonencoding() && !entry.is_catch_all()) {
        push(list, state, entry_ref)?;
        return Ok(false);
    }
    if !entry.is_optional() {
        let field_id = if entry.field_id == FieldId::NONE {
            state.attribute_id
        } else {
            entry.field_id
        };
        return Err(AttributeError::RequiredFieldAbsent(field_id));
    }

    Ok(false)
}

/// Remember where to restart if the field at the cursor is followed by
/// another instance of itself
fn arm_restart(list: &AttributeList, state: &mut CheckState) -> Result<(), AttributeError> {
    if state.level.restart.is_some() {
        return Ok(());
    }
    let Some((current, field)) = current_field(list, state) else {
        return Ok(());
    };
    let Some(next) = field.next() else {
        return Ok(());
    };
    let next_field = list.field(next)?;
    let repeated = !next_field.is_blob()
        && next_field.attribute_id == field.attribute_id
        && next_field.field_id == field.field_id
        && (state.level.subtype_parent == FieldId::NONE
            || next_field.sub_field_id == field.sub_field_id);
    if repeated {
        state.level.restart = Some((current, next));
    }

    Ok(())
}

/// Once the armed field has been consumed, rewind to the start of the
/// innermost SET OF open at this level. Returns whether it rewound.
fn restart_instance(list: &mut AttributeList, state: &mut CheckState) -> Result<bool, AttributeError> {
    let Some((from, next)) = state.level.restart else {
        return Ok(false);
    };
    if state.cursor != Some(next) {
        if state.cursor != Some(from) {
            state.level.restart = None;
        }
        return Ok(false);
    }
    state.level.restart = None;

    let container = state
        .stack
        .iter()
        .enumerate()
        .skip(state.level.stack_marker)
        .rev()
        .find(|(_, open)| open.entry.entry().is_setof_container())
        .map(|(position, open)| (position, open.entry.index()));
    let Some((position, index)) = container else {
        return Ok(false);
    };
    let open = state.stack.len() - (position + 1);
    update_stacked_info(list, state, open, false)?;
    state.level.index = index + 1;
    trace!("[check] restarting at {}", state.entry()?.entry().description);

    Ok(true)
}

/// Walk the entries of the current level until its end entry
fn check_attribute(list: &mut AttributeList, state: &mut CheckState) -> Result<(), AttributeError> {
    for _ in 0..ITERATIONS_LARGE {
        arm_restart(list, state)?;
        let skip = check_attribute_entry(list, state)?;
        if restart_instance(list, state)? {
            continue;
        }

        // Entry lookup again, an identifier group moves the index on
        let entry = state.entry()?.entry();
        if !skip && entry.seq_end > 0 {
            update_stacked_info(list, state, usize::from(entry.seq_end), true)?;
        }
        if entry.is_end() {
            state.level.choice_state = ChoiceState::None;
            let open = state.stack.len().saturating_sub(state.level.stack_marker);
            return update_stacked_info(list, state, open, false);
        }
        state.level.index += 1;
    }

    Err(AttributeError::IterationLimit)
}

/// Validate every recognised attribute in `list` against its table and
/// record what the size and write passes need. Run again after any change
/// to the list.
pub fn check_attributes(kind: AttributeKind, list: &mut AttributeList) -> Result<(), AttributeError> {
    list.reset_encoding_info()?;

    let mut cursor = list.head();
    for _ in 0..ITERATIONS_LARGE {
        let Some(head) = cursor else {
            return Ok(());
        };
        let field = list.field(head)?;
        // Blobs sort last and carry no structure
        if field.is_blob() {
            return Ok(());
        }
        let attribute_id = field.attribute_id;
        let start = attribute_start(kind, attribute_id).ok_or(AttributeError::InternalError)?;
        trace!("[check] attribute {}", start.entry().description);

        let mut state = CheckState::new(start, head, attribute_id);
        check_attribute(list, &mut state)?;

        // Anything left of this attribute matched nothing in its table
        if let Some(leftover) = state.cursor {
            let field = list.field(leftover)?;
            if !field.is_blob() && field.attribute_id == attribute_id {
                return Err(AttributeError::InvalidValue(field.field_id));
            }
        }
        cursor = state.cursor;
    }

    Err(AttributeError::IterationLimit)
}

/// Reject recognised attributes that can't appear in `object`
pub fn validate_for_object(list: &AttributeList, object: ObjectKind) -> Result<(), AttributeError> {
    let allowed = TypeInfoFlags::for_object(object);
    let mut cursor = list.head();
    for _ in 0..ITERATIONS_LARGE {
        let Some(head) = cursor else {
            return Ok(());
        };
        let field = list.field(head)?;
        if !field.is_blob() {
            let start = attribute_start(object.attribute_kind(), field.attribute_id)
                .ok_or(AttributeError::UnknownField(field.attribute_id))?;
            if !start.entry().type_info.intersects(allowed) {
                return Err(AttributeError::AttributePresent(field.attribute_id));
            }
        }
        cursor = list.next_attribute(head)?;
    }

    Err(AttributeError::IterationLimit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        add::AttributeValue, error::ErrorType, field_id, list::FieldValue,
        lookup::find_attribute_field,
    };

    const KIND: AttributeKind = AttributeKind::Certificate;

    fn add(list: &mut AttributeList, field_id: FieldId, sub_field_id: FieldId, value: AttributeValue) -> FieldRef {
        list.add_field(KIND, field_id, sub_field_id, value, FieldFlags::empty())
            .unwrap()
    }

    /// Descriptions of a field's wrappers, outermost first
    fn wrappers(list: &AttributeList, field_ref: FieldRef) -> Vec<(&'static str, usize)> {
        list.field(field_ref)
            .unwrap()
            .fifo
            .iter()
            .rev()
            .map(|layer| (layer.entry.entry().description, layer.size))
            .collect()
    }

    #[test]
    fn test_basic_constraints() {
        let mut list = AttributeList::new();
        let ca = add(&mut list, field_id::CA, FieldId::NONE, AttributeValue::Integer(1));
        check_attributes(KIND, &mut list).unwrap();

        let field = list.field(ca).unwrap();
        assert_eq!(field.encoded_size, 3);
        assert!(!field.flags.contains(FieldFlags::DEFAULT_VALUE));
        assert_eq!(wrappers(&list, ca), vec![("basicConstraints", 3)]);

        // The default is recorded but not sized
        list.field_mut(ca).unwrap().value = FieldValue::Integer(0);
        check_attributes(KIND, &mut list).unwrap();
        let field = list.field(ca).unwrap();
        assert!(field.flags.contains(FieldFlags::DEFAULT_VALUE));
        assert_eq!(field.encoded_size, 0);
        assert_eq!(wrappers(&list, ca), vec![("basicConstraints", 0)]);
    }

    #[test]
    fn test_check_is_idempotent() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
        let dns = add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"www.example.com"),
        );
        add(
            &mut list,
            field_id::SUBJECT_ALT_NAME,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"example.com"),
        );

        check_attributes(KIND, &mut list).unwrap();
        let first = wrappers(&list, dns);
        check_attributes(KIND, &mut list).unwrap();
        assert_eq!(wrappers(&list, dns), first);
        // Both names inside one GeneralNames: 17 + 13
        assert_eq!(first, vec![("subjectAltName", 30)]);
    }

    #[test]
    fn test_crl_distribution_point_nesting() {
        let mut list = AttributeList::new();
        let uri = add(
            &mut list,
            field_id::CRLDIST_FULL_NAME,
            field_id::UNIFORM_RESOURCE_IDENTIFIER,
            AttributeValue::Bytes(b"http://crl.example.com/ca.crl"),
        );
        let reasons = add(
            &mut list,
            field_id::CRLDIST_REASONS,
            FieldId::NONE,
            AttributeValue::Integer(0x06),
        );
        check_attributes(KIND, &mut list).unwrap();

        // [6] uri is 31 bytes, reasons 4
        assert_eq!(
            wrappers(&list, uri),
            vec![
                ("cRLDistributionPoints", 41),
                ("cRLDistributionPoints.distributionPoint", 39),
                ("cRLDistributionPoints.distributionPoint.distributionPoint", 33),
                (
                    "cRLDistributionPoints.distributionPoint.distributionPoint.fullName",
                    31
                ),
            ]
        );
        assert!(list.field(reasons).unwrap().fifo.is_empty());
        assert_eq!(list.field(reasons).unwrap().encoded_size, 4);
    }

    #[test]
    fn test_name_constraints_restart() {
        let mut list = AttributeList::new();
        let p1 = add(
            &mut list,
            field_id::PERMITTED_SUBTREES,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"example.com"),
        );
        let p2 = add(
            &mut list,
            field_id::PERMITTED_SUBTREES,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"example.org"),
        );
        let e1 = add(
            &mut list,
            field_id::EXCLUDED_SUBTREES,
            field_id::DNS_NAME,
            AttributeValue::Bytes(b"bad.example.com"),
        );
        check_attributes(KIND, &mut list).unwrap();

        // Each name gets its own GeneralSubtree
        assert_eq!(
            wrappers(&list, p1),
            vec![
                ("nameConstraints", 53),
                ("nameConstraints.permittedSubtrees", 30),
                ("nameConstraints.permittedSubtrees.generalSubtree", 13),
            ]
        );
        assert_eq!(
            wrappers(&list, p2),
            vec![("nameConstraints.permittedSubtrees.generalSubtree", 13)]
        );
        assert_eq!(
            wrappers(&list, e1),
            vec![
                ("nameConstraints.excludedSubtrees", 19),
                ("nameConstraints.excludedSubtrees.generalSubtree", 17),
            ]
        );
    }

    #[test]
    fn test_identifier_groups() {
        let mut list = AttributeList::new();
        let ocsp = add(
            &mut list,
            field_id::AUTHINFO_OCSP,
            field_id::UNIFORM_RESOURCE_IDENTIFIER,
            AttributeValue::Bytes(b"http://ocsp.example.com"),
        );
        check_attributes(KIND, &mut list).unwrap();

        // accessLocation is 25 bytes, the OID 10
        assert_eq!(
            wrappers(&list, ocsp),
            vec![
                ("authorityInfoAccess", 37),
                ("authorityInfoAccess.accessDescription (ocsp)", 35),
                ("authorityInfoAccess.ocsp", 25),
            ]
        );
    }

    #[test]
    fn test_hold_instruction_choice() {
        let mut list = AttributeList::new();
        let hold = add(
            &mut list,
            field_id::HOLD_INSTRUCTION_CODE,
            FieldId::NONE,
            AttributeValue::Integer(field_id::HOLD_INSTRUCTION_REJECT),
        );
        check_attributes(KIND, &mut list).unwrap();

        let field = list.field(hold).unwrap();
        assert_eq!(field.encoded_size, 9);
        assert_eq!(
            field.entry.unwrap().entry().description,
            "holdInstructionCode.reject"
        );
        assert_eq!(wrappers(&list, hold), vec![("holdInstructionCode", 9)]);
    }

    #[test]
    fn test_required_field_absent() {
        let mut list = AttributeList::new();
        add(
            &mut list,
            field_id::ISSUER_DOMAIN_POLICY,
            FieldId::NONE,
            AttributeValue::Bytes(b"1.2.3.4"),
        );
        assert_eq!(
            check_attributes(KIND, &mut list),
            Err(AttributeError::RequiredFieldAbsent(
                field_id::SUBJECT_DOMAIN_POLICY
            ))
        );
    }

    #[test]
    fn test_leftover_field() {
        // A second cA can only get in by bypassing add_field
        let mut list = AttributeList::new();
        let ca = add(&mut list, field_id::CA, FieldId::NONE, AttributeValue::Integer(1));
        let copy = list.field(ca).unwrap().clone();
        list.insert_after(Some(ca), copy).unwrap();
        assert_eq!(
            check_attributes(KIND, &mut list),
            Err(AttributeError::InvalidValue(field_id::CA))
        );
    }

    #[test]
    fn test_validator_rerun() {
        let mut list = AttributeList::new();
        let reason = add(
            &mut list,
            field_id::CRL_REASON,
            FieldId::NONE,
            AttributeValue::Integer(field_id::CRL_REASON_SUPERSEDED),
        );
        list.field_mut(reason).unwrap().value = FieldValue::Integer(7);
        assert_eq!(
            check_attributes(KIND, &mut list),
            Err(AttributeError::CustomValidationFailed(
                field_id::CRL_REASON,
                ErrorType::AttrValue
            ))
        );
    }

    #[test]
    fn test_validate_for_object() {
        let mut list = AttributeList::new();
        add(&mut list, field_id::KEY_USAGE, FieldId::NONE, AttributeValue::Integer(0x05));
        validate_for_object(&list, ObjectKind::Certificate).unwrap();
        validate_for_object(&list, ObjectKind::CertRequest).unwrap();

        add(&mut list, field_id::CRL_NUMBER, FieldId::NONE, AttributeValue::Integer(5));
        assert_eq!(
            validate_for_object(&list, ObjectKind::Certificate),
            Err(AttributeError::AttributePresent(field_id::CRL_NUMBER))
        );
        assert_eq!(
            validate_for_object(&list, ObjectKind::Crl),
            Err(AttributeError::AttributePresent(field_id::KEY_USAGE))
        );
        assert!(find_attribute_field(&list, field_id::CRL_NUMBER, FieldId::NONE).is_some());
    }
}
