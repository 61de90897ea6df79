//! The patrol password gate over journal mutations.
//!
//! This is a casual deterrent, not a security boundary: the shared word
//! ships inside the binary and anyone inspecting it can read it. It keeps
//! drive-by visitors from editing the crew's journal, nothing more. Do not
//! grow it into a real authentication scheme.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy::ui::Node as UiNode;
use std::path::Path;

use crate::compat::{NodeBundle, TextBundle, TextStyle};
use crate::plugins::core::{
    apply_text_input, focus_is_secret, AppState, EventLog, InputBindings, InputFocus,
};
use crate::plugins::persistence::{persist_remembered, Storage};
use crate::plugins::ui::FONT_PATH;

/// The shared patrol word.
const SHARED_SECRET: &str = "crosscut";

pub struct AuthPlugin;

impl Plugin for AuthPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AuthGate>()
            .add_message::<PatrolActionApproved>()
            .add_systems(Startup, setup_auth_panel)
            .add_systems(
                Update,
                (
                    handle_prompt_input.run_if(focus_is_secret),
                    update_auth_panel,
                )
                    .run_if(in_state(AppState::Ready)),
            );
    }
}

/// A journal mutation that needs the gate's approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatrolAction {
    AddTrip,
    EditTrip(u64),
    DeleteTrip(u64),
}

/// Emitted once per approved action; the journal executes these.
#[derive(Message)]
pub struct PatrolActionApproved {
    pub action: PatrolAction,
}

#[derive(Resource, Debug, Default)]
pub struct AuthGate {
    pub authenticated: bool,
    pub remembered_device: bool,
    pub remember: bool,
    pub prompt_open: bool,
    pub secret_entry: String,
    pub error: Option<String>,
    pending: Option<PatrolAction>,
}

impl AuthGate {
    /// Returns the action when already authenticated. Otherwise queues it
    /// as the single pending action and opens the prompt.
    pub fn request(&mut self, action: PatrolAction) -> Option<PatrolAction> {
        if self.authenticated {
            return Some(action);
        }

        self.pending = Some(action);
        self.prompt_open = true;
        self.error = None;
        self.secret_entry.clear();
        None
    }

    /// Resolves a prompt submission. A correct entry authenticates the
    /// session and releases the pending action exactly once; a wrong entry
    /// keeps the pending action so the user can retry.
    pub fn submit(&mut self, entry_matches: bool) -> Option<PatrolAction> {
        if entry_matches {
            self.authenticated = true;
            self.prompt_open = false;
            self.error = None;
            self.secret_entry.clear();
            self.pending.take()
        } else {
            self.error = Some("Incorrect password".to_string());
            self.secret_entry.clear();
            None
        }
    }

    /// Cancel discards the pending action; nothing executes later.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.prompt_open = false;
        self.secret_entry.clear();
        self.error = None;
    }

    pub fn pending(&self) -> Option<PatrolAction> {
        self.pending
    }
}

// =============================================================================
// Systems
// =============================================================================

#[derive(Component)]
struct AuthPanelRoot;

#[derive(Component)]
struct AuthPromptText;

fn setup_auth_panel(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font_on_disk = Path::new("assets").join(FONT_PATH);
    if !font_on_disk.exists() {
        info!("Prompt font not found at {}", font_on_disk.display());
        return;
    }

    let font = asset_server.load(FONT_PATH);

    commands
        .spawn((
            AuthPanelRoot,
            NodeBundle {
                node: UiNode {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(32.0),
                    top: Val::Percent(34.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    display: Display::None,
                    ..default()
                },
                background_color: Color::srgba(0.08, 0.1, 0.12, 0.92).into(),
                z_index: ZIndex(20),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                AuthPromptText,
                TextBundle::from_section(
                    "Patrol password:",
                    TextStyle {
                        font,
                        font_size: 15.0,
                        color: Color::srgb(0.92, 0.93, 0.95),
                    },
                ),
            ));
        });
}

fn handle_prompt_input(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    storage: Res<Storage>,
    mut gate: ResMut<AuthGate>,
    mut focus: ResMut<InputFocus>,
    mut approved: MessageWriter<PatrolActionApproved>,
    mut log: ResMut<EventLog>,
) {
    // Skip the frame that moved focus here, so the keypress that opened the
    // prompt is not typed into it.
    if focus.is_changed() {
        return;
    }

    if input.just_pressed(bindings.remember_device) {
        gate.remember = !gate.remember;
        return;
    }

    if input.just_pressed(bindings.dismiss) {
        gate.cancel();
        *focus = InputFocus::None;
        log.push("Journal unlock cancelled".to_string());
        return;
    }

    if input.just_pressed(bindings.activate) {
        let matches = gate.secret_entry == SHARED_SECRET;
        let released = gate.submit(matches);

        if matches {
            *focus = InputFocus::None;
            log.push("Journal unlocked".to_string());

            if gate.remember {
                gate.remembered_device = true;
                if let Err(error) = persist_remembered(&storage, true) {
                    error!("Remember-device save failed: {}", error);
                    log.push(format!("Remember-device save failed: {}", error));
                }
            }
        } else {
            log.push("Incorrect password".to_string());
        }

        if let Some(action) = released {
            approved.write(PatrolActionApproved { action });
        }
        return;
    }

    apply_text_input(&mut gate.secret_entry, &input);
}

fn update_auth_panel(
    gate: Res<AuthGate>,
    mut roots: Query<&mut UiNode, With<AuthPanelRoot>>,
    mut texts: Query<&mut Text, With<AuthPromptText>>,
) {
    let display = if gate.prompt_open {
        Display::Flex
    } else {
        Display::None
    };

    for mut node in roots.iter_mut() {
        node.display = display;
    }

    if !gate.prompt_open {
        return;
    }

    if let Some(mut text) = texts.iter_mut().next() {
        let masked = "*".repeat(gate.secret_entry.chars().count());
        let remember = if gate.remember { "yes" } else { "no" };
        let mut body = format!(
            "Patrol password: {}_\nRemember this device: {} (Tab)\nEnter unlock | Esc cancel",
            masked, remember
        );
        if let Some(error) = &gate.error {
            body.push('\n');
            body.push_str(error);
        }
        text.0 = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_while_authenticated_passes_straight_through() {
        let mut gate = AuthGate {
            authenticated: true,
            ..default()
        };
        let released = gate.request(PatrolAction::AddTrip);
        assert_eq!(released, Some(PatrolAction::AddTrip));
        assert!(!gate.prompt_open);
        assert!(gate.pending().is_none());
    }

    #[test]
    fn request_while_locked_queues_and_opens_prompt() {
        let mut gate = AuthGate::default();
        let released = gate.request(PatrolAction::DeleteTrip(3));
        assert_eq!(released, None);
        assert!(gate.prompt_open);
        assert_eq!(gate.pending(), Some(PatrolAction::DeleteTrip(3)));
    }

    #[test]
    fn correct_secret_releases_pending_action_exactly_once() {
        let mut gate = AuthGate::default();
        gate.request(PatrolAction::AddTrip);

        let first = gate.submit(true);
        assert_eq!(first, Some(PatrolAction::AddTrip));
        assert!(gate.authenticated);
        assert!(!gate.prompt_open);

        // Nothing left to release on a second submit.
        assert_eq!(gate.submit(true), None);
    }

    #[test]
    fn wrong_secret_keeps_pending_action_for_retry() {
        let mut gate = AuthGate::default();
        gate.request(PatrolAction::EditTrip(7));

        let released = gate.submit(false);
        assert_eq!(released, None);
        assert!(!gate.authenticated);
        assert!(gate.prompt_open);
        assert_eq!(gate.pending(), Some(PatrolAction::EditTrip(7)));
        assert_eq!(gate.error.as_deref(), Some("Incorrect password"));

        // Retry with the right word succeeds.
        assert_eq!(gate.submit(true), Some(PatrolAction::EditTrip(7)));
    }

    #[test]
    fn cancel_discards_pending_action() {
        let mut gate = AuthGate::default();
        gate.request(PatrolAction::AddTrip);
        gate.cancel();

        assert!(gate.pending().is_none());
        assert!(!gate.prompt_open);
        assert!(!gate.authenticated);

        // Authenticating afterwards releases nothing.
        assert_eq!(gate.submit(true), None);
    }

    #[test]
    fn later_request_replaces_pending_action() {
        let mut gate = AuthGate::default();
        gate.request(PatrolAction::AddTrip);
        gate.request(PatrolAction::DeleteTrip(1));
        assert_eq!(gate.pending(), Some(PatrolAction::DeleteTrip(1)));
        assert_eq!(gate.submit(true), Some(PatrolAction::DeleteTrip(1)));
    }
}
