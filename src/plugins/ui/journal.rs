//! The patrol journal panel: sorted trip rows, in-place editing, add and
//! delete flows, and the running totals.
//!
//! Every mutation goes through the auth gate as a [`PatrolAction`]; the
//! approved actions arrive here as messages and are applied in one place,
//! in mutation -> persist -> totals order, so the view never shows stale
//! aggregates.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::catalog::{match_trail_name, Catalog};
use crate::plugins::auth::{AuthGate, PatrolAction, PatrolActionApproved};
use crate::plugins::core::{
    apply_text_input, EventLog, InputBindings, InputFocus, Selection,
};
use crate::plugins::persistence::{persist_trips, Storage};
use crate::trips::{
    format_trip_date, today_iso, TripLog, TripRecord, TripSort, TripSortKey, TripTotals,
};

use super::components::{JournalListText, TotalsText};

/// Keyboard cursor into the sorted journal rows.
#[derive(Resource, Default)]
pub struct JournalCursor {
    pub index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EditField {
    #[default]
    Date,
    Trail,
    Partners,
    Trees,
}

impl EditField {
    fn next(self) -> EditField {
        match self {
            EditField::Date => EditField::Trail,
            EditField::Trail => EditField::Partners,
            EditField::Partners => EditField::Trees,
            EditField::Trees => EditField::Date,
        }
    }

    fn label(self) -> &'static str {
        match self {
            EditField::Date => "date",
            EditField::Trail => "trail",
            EditField::Partners => "partners",
            EditField::Trees => "trees",
        }
    }
}

/// The one row being edited, if any, with its draft field values.
#[derive(Resource, Default)]
pub struct EditState {
    active: Option<u64>,
    field: EditField,
    date: String,
    trail: String,
    partners: String,
    trees: String,
}

impl EditState {
    pub fn active(&self) -> Option<u64> {
        self.active
    }

    fn begin(&mut self, record: &TripRecord) {
        self.active = Some(record.id);
        self.field = EditField::Date;
        self.date = record.date.clone();
        self.trail = record.trail.clone();
        self.partners = record.partners.clone();
        self.trees = record.trees_cleared.clone();
    }

    fn finish(&mut self) {
        *self = EditState::default();
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.field {
            EditField::Date => &mut self.date,
            EditField::Trail => &mut self.trail,
            EditField::Partners => &mut self.partners,
            EditField::Trees => &mut self.trees,
        }
    }

    fn to_record(&self, id: u64) -> TripRecord {
        TripRecord {
            id,
            date: self.date.clone(),
            trail: self.trail.clone(),
            partners: self.partners.clone(),
            trees_cleared: self.trees.clone(),
        }
    }
}

// =============================================================================
// Input Systems
// =============================================================================

pub fn handle_sort_keys(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut sort: ResMut<TripSort>,
    mut log: ResMut<EventLog>,
) {
    let pressed = [
        (bindings.sort_date, TripSortKey::Date),
        (bindings.sort_trail, TripSortKey::Trail),
        (bindings.sort_trees, TripSortKey::Trees),
    ]
    .into_iter()
    .find(|(binding, _)| input.just_pressed(*binding));

    let Some((_, key)) = pressed else {
        return;
    };

    if sort.key == key {
        sort.descending = !sort.descending;
    } else {
        sort.key = key;
    }

    let direction = if sort.descending { "desc" } else { "asc" };
    log.push(format!("Sort: {:?} {}", sort.key, direction).to_lowercase());
}

pub fn handle_journal_nav(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    trips: Res<TripLog>,
    mut cursor: ResMut<JournalCursor>,
) {
    if trips.is_empty() {
        return;
    }

    if input.just_pressed(bindings.list_up) && cursor.index > 0 {
        cursor.index -= 1;
    }

    if input.just_pressed(bindings.list_down) && cursor.index + 1 < trips.len() {
        cursor.index += 1;
    }
}

/// Enter on a row jumps the map to the best catalog match for its trail
/// text. No match, no movement.
#[allow(clippy::too_many_arguments)]
pub fn handle_journal_activate(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    catalog: Res<Catalog>,
    trips: Res<TripLog>,
    sort: Res<TripSort>,
    cursor: Res<JournalCursor>,
    focus: Res<InputFocus>,
    mut selection: ResMut<Selection>,
    mut log: ResMut<EventLog>,
) {
    // The Enter that saved an edit belongs to the edit.
    if focus.is_changed() {
        return;
    }

    if !input.just_pressed(bindings.activate) {
        return;
    }

    let sorted = trips.sorted(sort.key, sort.descending);
    let Some(row) = sorted.get(cursor.index.min(sorted.len().saturating_sub(1))) else {
        return;
    };

    match match_trail_name(&catalog.trails, &row.trail) {
        Some(trail) => {
            if selection.trail_id.as_deref() != Some(trail.id) {
                selection.trail_id = Some(trail.id.to_string());
                log.push(format!("Jumped to {}", trail.name));
            }
        }
        None => {
            info!("No catalog match for trip trail '{}'", row.trail);
        }
    }
}

pub fn handle_add_request(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut gate: ResMut<AuthGate>,
    mut focus: ResMut<InputFocus>,
    mut approved: MessageWriter<PatrolActionApproved>,
) {
    if !input.just_pressed(bindings.add_trip) {
        return;
    }

    match gate.request(PatrolAction::AddTrip) {
        Some(action) => {
            approved.write(PatrolActionApproved { action });
        }
        None => {
            *focus = InputFocus::Secret;
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_edit_request(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    trips: Res<TripLog>,
    sort: Res<TripSort>,
    cursor: Res<JournalCursor>,
    mut gate: ResMut<AuthGate>,
    mut focus: ResMut<InputFocus>,
    mut approved: MessageWriter<PatrolActionApproved>,
) {
    if !input.just_pressed(bindings.edit_trip) {
        return;
    }

    let sorted = trips.sorted(sort.key, sort.descending);
    let Some(row) = sorted.get(cursor.index.min(sorted.len().saturating_sub(1))) else {
        return;
    };

    match gate.request(PatrolAction::EditTrip(row.id)) {
        Some(action) => {
            approved.write(PatrolActionApproved { action });
        }
        None => {
            *focus = InputFocus::Secret;
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_delete_request(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    trips: Res<TripLog>,
    sort: Res<TripSort>,
    cursor: Res<JournalCursor>,
    mut gate: ResMut<AuthGate>,
    mut focus: ResMut<InputFocus>,
    mut approved: MessageWriter<PatrolActionApproved>,
) {
    if !input.just_pressed(bindings.delete_trip) {
        return;
    }

    let sorted = trips.sorted(sort.key, sort.descending);
    let Some(row) = sorted.get(cursor.index.min(sorted.len().saturating_sub(1))) else {
        return;
    };

    match gate.request(PatrolAction::DeleteTrip(row.id)) {
        Some(action) => {
            approved.write(PatrolActionApproved { action });
        }
        None => {
            *focus = InputFocus::Secret;
        }
    }
}

/// Applies approved journal mutations. The collection is persisted before
/// the totals are recomputed so an interrupted session never shows totals
/// ahead of the stored data.
pub fn apply_approved_actions(
    mut approved: MessageReader<PatrolActionApproved>,
    storage: Res<Storage>,
    mut trips: ResMut<TripLog>,
    mut totals: ResMut<TripTotals>,
    mut edit: ResMut<EditState>,
    mut focus: ResMut<InputFocus>,
    mut log: ResMut<EventLog>,
) {
    for message in approved.read() {
        match message.action {
            PatrolAction::AddTrip => {
                let id = trips.add_blank(&today_iso());
                if let Err(error) = persist_trips(&storage, &trips) {
                    error!("Trip save failed: {}", error);
                    log.push(format!("Trip save failed: {}", error));
                }
                *totals = trips.totals();

                if let Some(record) = trips.get(id) {
                    edit.begin(record);
                    *focus = InputFocus::Edit;
                }
                log.push("Trip added".to_string());
            }
            PatrolAction::EditTrip(id) => {
                if let Some(record) = trips.get(id) {
                    edit.begin(record);
                    *focus = InputFocus::Edit;
                }
            }
            PatrolAction::DeleteTrip(id) => {
                if trips.remove(id) {
                    if let Err(error) = persist_trips(&storage, &trips) {
                        error!("Trip save failed: {}", error);
                        log.push(format!("Trip save failed: {}", error));
                    }
                    *totals = trips.totals();
                    log.push("Trip deleted".to_string());
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_edit_entry(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    storage: Res<Storage>,
    mut trips: ResMut<TripLog>,
    mut totals: ResMut<TripTotals>,
    mut edit: ResMut<EditState>,
    mut focus: ResMut<InputFocus>,
    mut log: ResMut<EventLog>,
) {
    // Skip the frame that moved focus here, so the keypress that started
    // the edit is not typed into a field.
    if focus.is_changed() {
        return;
    }

    let Some(id) = edit.active() else {
        *focus = InputFocus::None;
        return;
    };

    if input.just_pressed(bindings.next_field) {
        edit.field = edit.field.next();
        return;
    }

    if input.just_pressed(bindings.dismiss) {
        edit.finish();
        *focus = InputFocus::None;
        log.push("Edit cancelled".to_string());
        return;
    }

    if input.just_pressed(bindings.activate) {
        let record = edit.to_record(id);
        if trips.update(id, record) {
            if let Err(error) = persist_trips(&storage, &trips) {
                error!("Trip save failed: {}", error);
                log.push(format!("Trip save failed: {}", error));
            }
            *totals = trips.totals();
            log.push("Trip saved".to_string());
        }
        edit.finish();
        *focus = InputFocus::None;
        return;
    }

    apply_text_input(edit.buffer_mut(), &input);
}

// =============================================================================
// Panel Updates
// =============================================================================

fn journal_row(record: &TripRecord, marked: bool) -> String {
    let cursor = if marked { ">" } else { " " };
    let mut row = format!(
        "{} {}  {}",
        cursor,
        format_trip_date(&record.date),
        if record.trail.is_empty() {
            "(no trail)"
        } else {
            &record.trail
        }
    );

    if !record.partners.is_empty() {
        row.push_str(&format!("\n     with {}", record.partners));
    }
    if !record.trees_cleared.is_empty() {
        row.push_str(&format!("\n     {} trees cleared", record.trees_cleared));
    }

    row
}

fn edit_block(edit: &EditState) -> String {
    let fields = [
        (EditField::Date, &edit.date),
        (EditField::Trail, &edit.trail),
        (EditField::Partners, &edit.partners),
        (EditField::Trees, &edit.trees),
    ];

    let mut block = String::from("* editing (Tab next field, Enter save, Esc cancel)\n");
    for (field, value) in fields {
        let marker = if field == edit.field { ">" } else { " " };
        block.push_str(&format!("  {} {}: {}_\n", marker, field.label(), value));
    }

    block.trim_end().to_string()
}

pub fn update_journal_list(
    trips: Res<TripLog>,
    sort: Res<TripSort>,
    edit: Res<EditState>,
    mut cursor: ResMut<JournalCursor>,
    mut texts: Query<&mut Text, With<JournalListText>>,
) {
    let Some(mut text) = texts.iter_mut().next() else {
        return;
    };

    let sorted = trips.sorted(sort.key, sort.descending);
    if sorted.is_empty() {
        text.0 = "No patrol trips yet (N to add)".to_string();
        return;
    }

    if cursor.index >= sorted.len() {
        cursor.index = sorted.len() - 1;
    }

    let mut body = String::from("Patrol trips (N add, E edit, X delete):\n");
    for (index, record) in sorted.iter().enumerate() {
        if edit.active() == Some(record.id) {
            body.push_str(&edit_block(&edit));
        } else {
            body.push_str(&journal_row(record, index == cursor.index));
        }
        body.push('\n');
    }

    text.0 = body.trim_end().to_string();
}

pub fn update_totals_text(
    totals: Res<TripTotals>,
    sort: Res<TripSort>,
    mut texts: Query<&mut Text, With<TotalsText>>,
) {
    if let Some(mut text) = texts.iter_mut().next() {
        let direction = if sort.descending { "desc" } else { "asc" };
        text.0 = format!(
            "{} trips | {} trees cleared | sort {:?} {}",
            totals.trips, totals.trees, sort.key, direction
        )
        .to_lowercase();
    }
}
