//! Application lifecycle, input bindings, shared browse state, and the
//! keyboard text-entry helpers used by every editable field.

use bevy::prelude::*;

use crate::catalog::{filter_trails, Catalog, DifficultyTag};

pub struct CorePlugin;

#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Boot,
    Loading,
    Ready,
}

/// Rolling status feed rendered in the bottom panel; everything pushed here
/// is also traced.
#[derive(Resource, Debug)]
pub struct EventLog {
    entries: Vec<String>,
    max_entries: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 8,
        }
    }
}

impl EventLog {
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub focus_search: KeyCode,
    pub clear_search: KeyCode,
    pub tag_all: KeyCode,
    pub tag_easy: KeyCode,
    pub tag_moderate: KeyCode,
    pub tag_difficult: KeyCode,
    pub tag_trips: KeyCode,
    pub list_up: KeyCode,
    pub list_down: KeyCode,
    pub activate: KeyCode,
    pub dismiss: KeyCode,
    pub cycle_layer: KeyCode,
    pub reframe: KeyCode,
    pub add_trip: KeyCode,
    pub edit_trip: KeyCode,
    pub delete_trip: KeyCode,
    pub sort_date: KeyCode,
    pub sort_trail: KeyCode,
    pub sort_trees: KeyCode,
    pub next_field: KeyCode,
    pub remember_device: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            focus_search: KeyCode::Slash,
            clear_search: KeyCode::KeyC,
            tag_all: KeyCode::Digit1,
            tag_easy: KeyCode::Digit2,
            tag_moderate: KeyCode::Digit3,
            tag_difficult: KeyCode::Digit4,
            tag_trips: KeyCode::Digit5,
            list_up: KeyCode::ArrowUp,
            list_down: KeyCode::ArrowDown,
            activate: KeyCode::Enter,
            dismiss: KeyCode::Escape,
            cycle_layer: KeyCode::KeyL,
            reframe: KeyCode::KeyH,
            add_trip: KeyCode::KeyN,
            edit_trip: KeyCode::KeyE,
            delete_trip: KeyCode::KeyX,
            sort_date: KeyCode::KeyD,
            sort_trail: KeyCode::KeyT,
            sort_trees: KeyCode::KeyR,
            next_field: KeyCode::Tab,
            remember_device: KeyCode::Tab,
        }
    }
}

/// The selected trail, if any. Views read it; intents flow back through
/// systems that write it.
#[derive(Resource, Debug, Default)]
pub struct Selection {
    pub trail_id: Option<String>,
}

/// Search text plus the active difficulty tag.
#[derive(Resource, Debug, Default)]
pub struct TrailFilter {
    pub search: String,
    pub tag: DifficultyTag,
}

/// Which text field consumes keystrokes. While any field is focused, the
/// single-key bindings stand down.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    None,
    Search,
    Secret,
    Edit,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .init_resource::<EventLog>()
            .insert_resource(InputBindings::default())
            .init_resource::<Selection>()
            .init_resource::<TrailFilter>()
            .init_resource::<InputFocus>()
            .init_resource::<Catalog>()
            .add_systems(OnEnter(AppState::Boot), transition_to_loading)
            .add_systems(
                Update,
                (
                    handle_tag_input.run_if(focus_is_none),
                    handle_clear_selection.run_if(focus_is_none),
                    clear_hidden_selection,
                )
                    .run_if(in_state(AppState::Ready)),
            );
    }
}

fn transition_to_loading(mut next_state: ResMut<NextState<AppState>>) {
    next_state.set(AppState::Loading);
}

// =============================================================================
// Run Conditions
// =============================================================================

pub fn focus_is_none(focus: Res<InputFocus>) -> bool {
    *focus == InputFocus::None
}

pub fn focus_is_search(focus: Res<InputFocus>) -> bool {
    *focus == InputFocus::Search
}

pub fn focus_is_secret(focus: Res<InputFocus>) -> bool {
    *focus == InputFocus::Secret
}

pub fn focus_is_edit(focus: Res<InputFocus>) -> bool {
    *focus == InputFocus::Edit
}

pub fn journal_is_open(filter: Res<TrailFilter>) -> bool {
    filter.tag == DifficultyTag::Trips
}

pub fn browse_is_open(filter: Res<TrailFilter>) -> bool {
    filter.tag != DifficultyTag::Trips
}

// =============================================================================
// Systems
// =============================================================================

fn handle_tag_input(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut filter: ResMut<TrailFilter>,
) {
    let pressed = [
        (bindings.tag_all, DifficultyTag::All),
        (bindings.tag_easy, DifficultyTag::Easy),
        (bindings.tag_moderate, DifficultyTag::Moderate),
        (bindings.tag_difficult, DifficultyTag::Difficult),
        (bindings.tag_trips, DifficultyTag::Trips),
    ]
    .into_iter()
    .find(|(key, _)| input.just_pressed(*key));

    if let Some((_, tag)) = pressed {
        if filter.tag != tag {
            filter.tag = tag;
            info!("Filter tag: {}", tag.label());
        }
    }
}

fn handle_clear_selection(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    focus: Res<InputFocus>,
    mut selection: ResMut<Selection>,
) {
    // The Escape that released a text field belongs to the field, not to
    // the selection.
    if focus.is_changed() {
        return;
    }

    if input.just_pressed(bindings.dismiss) && selection.trail_id.is_some() {
        selection.trail_id = None;
    }
}

/// A filter change that hides the selected trail clears the selection
/// rather than leaving it pointing at a hidden record.
fn clear_hidden_selection(
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    mut selection: ResMut<Selection>,
    mut log: ResMut<EventLog>,
) {
    if !filter.is_changed() {
        return;
    }

    let Some(id) = selection.trail_id.clone() else {
        return;
    };

    let still_visible = filter_trails(&catalog.trails, &filter.search, filter.tag)
        .iter()
        .any(|trail| trail.id == id);

    if !still_visible {
        selection.trail_id = None;
        log.push("Selection cleared by filter".to_string());
    }
}

// =============================================================================
// Text Entry
// =============================================================================

pub fn shift_pressed(input: &ButtonInput<KeyCode>) -> bool {
    input.pressed(KeyCode::ShiftLeft) || input.pressed(KeyCode::ShiftRight)
}

/// Maps a pressed key to the character it types into a text field. Only the
/// characters the journal and search fields need are mapped.
pub fn key_to_char(key: KeyCode, shift: bool) -> Option<char> {
    let lower = match key {
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        KeyCode::Digit0 => '0',
        KeyCode::Digit1 => '1',
        KeyCode::Digit2 => '2',
        KeyCode::Digit3 => '3',
        KeyCode::Digit4 => '4',
        KeyCode::Digit5 => '5',
        KeyCode::Digit6 => '6',
        KeyCode::Digit7 => '7',
        KeyCode::Digit8 => '8',
        KeyCode::Digit9 => '9',
        KeyCode::Space => ' ',
        KeyCode::Minus => '-',
        KeyCode::Period => '.',
        KeyCode::Comma => ',',
        KeyCode::Quote => '\'',
        _ => return None,
    };

    if shift && lower.is_ascii_alphabetic() {
        Some(lower.to_ascii_uppercase())
    } else {
        Some(lower)
    }
}

const MAX_FIELD_LEN: usize = 80;

/// Applies this frame's keystrokes to a text buffer. Returns true when the
/// buffer changed.
pub fn apply_text_input(buffer: &mut String, input: &ButtonInput<KeyCode>) -> bool {
    let shift = shift_pressed(input);
    let mut changed = false;

    for key in input.get_just_pressed() {
        if *key == KeyCode::Backspace {
            if buffer.pop().is_some() {
                changed = true;
            }
            continue;
        }

        if let Some(ch) = key_to_char(*key, shift) {
            if buffer.len() < MAX_FIELD_LEN {
                buffer.push(ch);
                changed = true;
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;

    #[test]
    fn event_log_push_trims_oldest_entries() {
        let mut log = EventLog::default();
        for index in 0..12 {
            log.push(format!("entry-{}", index));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries.first().map(String::as_str), Some("entry-4"));
        assert_eq!(log.latest(), Some("entry-11"));
    }

    #[test]
    fn default_focus_is_none() {
        assert_eq!(InputFocus::default(), InputFocus::None);
    }

    #[test]
    fn tag_bindings_are_number_row() {
        let bindings = InputBindings::default();
        assert_eq!(bindings.tag_all, KeyCode::Digit1);
        assert_eq!(bindings.tag_trips, KeyCode::Digit5);
    }

    #[test]
    fn handle_tag_input_switches_tag() {
        let mut world = World::default();
        world.insert_resource(ButtonInput::<KeyCode>::default());
        world.insert_resource(InputBindings::default());
        world.insert_resource(TrailFilter::default());

        {
            let mut input = world.resource_mut::<ButtonInput<KeyCode>>();
            input.press(KeyCode::Digit4);
        }

        let mut system_state: SystemState<(
            Res<ButtonInput<KeyCode>>,
            Res<InputBindings>,
            ResMut<TrailFilter>,
        )> = SystemState::new(&mut world);
        let (input, bindings, filter) = system_state.get_mut(&mut world);
        handle_tag_input(input, bindings, filter);
        system_state.apply(&mut world);

        let filter = world.resource::<TrailFilter>();
        assert_eq!(filter.tag, DifficultyTag::Difficult);
    }

    #[test]
    fn dismiss_clears_selection() {
        let mut world = World::default();
        world.insert_resource(ButtonInput::<KeyCode>::default());
        world.insert_resource(InputBindings::default());
        world.insert_resource(InputFocus::None);
        world.insert_resource(Selection {
            trail_id: Some("greyrock".to_string()),
        });

        let mut system_state: SystemState<(
            Res<ButtonInput<KeyCode>>,
            Res<InputBindings>,
            Res<InputFocus>,
            ResMut<Selection>,
        )> = SystemState::new(&mut world);

        // Warm-up run so the initial focus state does not read as changed.
        {
            let (input, bindings, focus, selection) = system_state.get_mut(&mut world);
            handle_clear_selection(input, bindings, focus, selection);
            system_state.apply(&mut world);
        }

        {
            let mut input = world.resource_mut::<ButtonInput<KeyCode>>();
            input.press(KeyCode::Escape);
        }

        let (input, bindings, focus, selection) = system_state.get_mut(&mut world);
        handle_clear_selection(input, bindings, focus, selection);
        system_state.apply(&mut world);

        assert!(world.resource::<Selection>().trail_id.is_none());
    }

    #[test]
    fn hidden_selection_is_cleared_when_filter_excludes_it() {
        let mut world = World::default();
        world.insert_resource(Catalog::default());
        world.insert_resource(TrailFilter {
            search: "hewlett".to_string(),
            tag: DifficultyTag::Difficult,
        });
        world.insert_resource(Selection {
            trail_id: Some("hewlett-gulch".to_string()),
        });
        world.insert_resource(EventLog::default());

        let mut system_state: SystemState<(
            Res<Catalog>,
            Res<TrailFilter>,
            ResMut<Selection>,
            ResMut<EventLog>,
        )> = SystemState::new(&mut world);
        let (catalog, filter, selection, log) = system_state.get_mut(&mut world);
        clear_hidden_selection(catalog, filter, selection, log);
        system_state.apply(&mut world);

        assert!(world.resource::<Selection>().trail_id.is_none());
    }

    #[test]
    fn visible_selection_survives_filter_change() {
        let mut world = World::default();
        world.insert_resource(Catalog::default());
        world.insert_resource(TrailFilter {
            search: "hewlett".to_string(),
            tag: DifficultyTag::Easy,
        });
        world.insert_resource(Selection {
            trail_id: Some("hewlett-gulch".to_string()),
        });
        world.insert_resource(EventLog::default());

        let mut system_state: SystemState<(
            Res<Catalog>,
            Res<TrailFilter>,
            ResMut<Selection>,
            ResMut<EventLog>,
        )> = SystemState::new(&mut world);
        let (catalog, filter, selection, log) = system_state.get_mut(&mut world);
        clear_hidden_selection(catalog, filter, selection, log);
        system_state.apply(&mut world);

        assert_eq!(
            world.resource::<Selection>().trail_id.as_deref(),
            Some("hewlett-gulch")
        );
    }

    #[test]
    fn key_to_char_maps_letters_and_digits() {
        assert_eq!(key_to_char(KeyCode::KeyG, false), Some('g'));
        assert_eq!(key_to_char(KeyCode::KeyG, true), Some('G'));
        assert_eq!(key_to_char(KeyCode::Digit7, false), Some('7'));
        assert_eq!(key_to_char(KeyCode::Digit7, true), Some('7'));
        assert_eq!(key_to_char(KeyCode::Minus, false), Some('-'));
        assert_eq!(key_to_char(KeyCode::Space, false), Some(' '));
        assert_eq!(key_to_char(KeyCode::F5, false), None);
    }

    #[test]
    fn apply_text_input_appends_and_backspaces() {
        let mut input = ButtonInput::<KeyCode>::default();
        input.press(KeyCode::KeyH);
        let mut buffer = String::new();
        assert!(apply_text_input(&mut buffer, &input));
        assert_eq!(buffer, "h");

        input.clear();
        input.press(KeyCode::Backspace);
        assert!(apply_text_input(&mut buffer, &input));
        assert!(buffer.is_empty());

        input.clear();
        input.press(KeyCode::Backspace);
        assert!(!apply_text_input(&mut buffer, &input));
    }
}
