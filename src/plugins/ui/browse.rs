//! Trail browsing: the search box, filter tags, keyboard-driven list, and
//! the selected-trail detail card.

use bevy::prelude::*;
use bevy::ui::Node as UiNode;

use crate::catalog::{filter_trails, Catalog, DifficultyTag, Trail};
use crate::plugins::core::{
    apply_text_input, EventLog, InputBindings, InputFocus, Selection, TrailFilter,
};

use super::components::{
    DetailPanelRoot, DetailText, SearchText, TagsText, TrailCountText, TrailListText,
};

/// Keyboard cursor into the filtered trail list.
#[derive(Resource, Default)]
pub struct ListCursor {
    pub index: usize,
}

const LIST_ROWS: usize = 12;

// =============================================================================
// Input Systems
// =============================================================================

pub fn handle_focus_search(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut focus: ResMut<InputFocus>,
) {
    if input.just_pressed(bindings.focus_search) {
        *focus = InputFocus::Search;
    }
}

pub fn handle_search_entry(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut filter: ResMut<TrailFilter>,
    mut focus: ResMut<InputFocus>,
    mut cursor: ResMut<ListCursor>,
) {
    // Skip the frame that moved focus here, so the keypress that focused
    // the box is not typed into it.
    if focus.is_changed() {
        return;
    }

    if input.just_pressed(bindings.activate) || input.just_pressed(bindings.dismiss) {
        *focus = InputFocus::None;
        return;
    }

    // Only touch the filter when a key actually lands, so camera refits
    // track membership changes rather than frames.
    let mut search = filter.search.clone();
    if apply_text_input(&mut search, &input) {
        filter.search = search;
        cursor.index = 0;
    }
}

pub fn handle_clear_search(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut filter: ResMut<TrailFilter>,
    mut cursor: ResMut<ListCursor>,
) {
    if input.just_pressed(bindings.clear_search) && !filter.search.is_empty() {
        filter.search.clear();
        cursor.index = 0;
    }
}

pub fn handle_list_nav(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    mut cursor: ResMut<ListCursor>,
) {
    let count = filter_trails(&catalog.trails, &filter.search, filter.tag).len();
    if count == 0 {
        return;
    }

    if input.just_pressed(bindings.list_up) && cursor.index > 0 {
        cursor.index -= 1;
    }

    if input.just_pressed(bindings.list_down) && cursor.index + 1 < count {
        cursor.index += 1;
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_list_activate(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    cursor: Res<ListCursor>,
    focus: Res<InputFocus>,
    mut selection: ResMut<Selection>,
    mut log: ResMut<EventLog>,
) {
    // The Enter that released the search box belongs to the box.
    if focus.is_changed() {
        return;
    }

    if !input.just_pressed(bindings.activate) {
        return;
    }

    let filtered = filter_trails(&catalog.trails, &filter.search, filter.tag);
    let Some(trail) = filtered.get(cursor.index.min(filtered.len().saturating_sub(1))) else {
        return;
    };

    if selection.trail_id.as_deref() != Some(trail.id) {
        selection.trail_id = Some(trail.id.to_string());
        log.push(format!("Selected {}", trail.name));
    }
}

// =============================================================================
// Panel Updates
// =============================================================================

pub fn update_search_text(
    filter: Res<TrailFilter>,
    focus: Res<InputFocus>,
    mut texts: Query<&mut Text, With<SearchText>>,
) {
    if let Some(mut text) = texts.iter_mut().next() {
        let focused = *focus == InputFocus::Search;
        text.0 = match (filter.search.is_empty(), focused) {
            (true, false) => "Search: (press / to type)".to_string(),
            (true, true) => "Search: _".to_string(),
            (false, true) => format!("Search: {}_", filter.search),
            (false, false) => format!("Search: {}", filter.search),
        };
    }
}

pub fn update_tags_text(filter: Res<TrailFilter>, mut texts: Query<&mut Text, With<TagsText>>) {
    if let Some(mut text) = texts.iter_mut().next() {
        let tags = [
            DifficultyTag::All,
            DifficultyTag::Easy,
            DifficultyTag::Moderate,
            DifficultyTag::Difficult,
            DifficultyTag::Trips,
        ];

        let body = tags
            .iter()
            .enumerate()
            .map(|(index, tag)| {
                if *tag == filter.tag {
                    format!("[{} {}]", index + 1, tag.label())
                } else {
                    format!(" {} {} ", index + 1, tag.label())
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        text.0 = body;
    }
}

fn list_row(trail: &Trail, marked: bool, selected: bool) -> String {
    let cursor = if marked { ">" } else { " " };
    let star = if selected { "*" } else { " " };
    format!(
        "{}{} {}  ({}, {})",
        cursor,
        star,
        trail.name,
        trail.difficulty.label(),
        trail.length
    )
}

pub fn update_trail_list(
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    selection: Res<Selection>,
    mut cursor: ResMut<ListCursor>,
    mut texts: Query<&mut Text, With<TrailListText>>,
) {
    let Some(mut text) = texts.iter_mut().next() else {
        return;
    };

    let filtered = filter_trails(&catalog.trails, &filter.search, filter.tag);
    if filtered.is_empty() {
        text.0 = "No trails match".to_string();
        return;
    }

    if cursor.index >= filtered.len() {
        cursor.index = filtered.len() - 1;
    }

    // Window the list around the cursor so long result sets stay readable.
    let start = cursor.index.saturating_sub(LIST_ROWS / 2);
    let start = start.min(filtered.len().saturating_sub(LIST_ROWS));
    let end = (start + LIST_ROWS).min(filtered.len());

    let mut body = String::new();
    if start > 0 {
        body.push_str(&format!("  ... {} above\n", start));
    }
    for (index, trail) in filtered[start..end].iter().enumerate() {
        let absolute = start + index;
        let selected = selection.trail_id.as_deref() == Some(trail.id);
        body.push_str(&list_row(trail, absolute == cursor.index, selected));
        body.push('\n');
    }
    if end < filtered.len() {
        body.push_str(&format!("  ... {} more\n", filtered.len() - end));
    }

    text.0 = body.trim_end().to_string();
}

pub fn update_trail_count(
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    mut texts: Query<&mut Text, With<TrailCountText>>,
) {
    if let Some(mut text) = texts.iter_mut().next() {
        let count = filter_trails(&catalog.trails, &filter.search, filter.tag).len();
        text.0 = format!("{} trails", count);
    }
}

const DETAIL_FEATURES_SHOWN: usize = 3;

fn detail_body(trail: &Trail) -> String {
    let mut body = format!(
        "{}\n{} | {}\nGain {} | Trailhead {}\nSeason: {}\n\n{}",
        trail.name,
        trail.difficulty.label(),
        trail.length,
        trail.elevation_gain,
        trail.trailhead_elevation,
        trail.season,
        trail.description
    );

    if !trail.features.is_empty() {
        let shown = trail
            .features
            .iter()
            .take(DETAIL_FEATURES_SHOWN)
            .copied()
            .collect::<Vec<_>>()
            .join(" | ");
        body.push_str(&format!("\n\n{}", shown));
        if trail.features.len() > DETAIL_FEATURES_SHOWN {
            body.push_str(&format!(" (+{} more)", trail.features.len() - DETAIL_FEATURES_SHOWN));
        }
    }

    if trail.permit_required {
        body.push_str("\n\n! Permit required");
    }

    body
}

pub fn update_detail_panel(
    catalog: Res<Catalog>,
    selection: Res<Selection>,
    mut roots: Query<&mut UiNode, With<DetailPanelRoot>>,
    mut texts: Query<&mut Text, With<DetailText>>,
) {
    let selected = selection
        .trail_id
        .as_deref()
        .and_then(|id| catalog.by_id(id));

    let display = if selected.is_some() {
        Display::Flex
    } else {
        Display::None
    };

    for mut node in roots.iter_mut() {
        node.display = display;
    }

    if let (Some(trail), Some(mut text)) = (selected, texts.iter_mut().next()) {
        text.0 = detail_body(trail);
    }
}
