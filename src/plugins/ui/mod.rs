//! Panels and input for the two side views:
//! - Browse: search box, difficulty tags, trail list, detail card
//! - Journal: patrol trips, in-place editing, totals
//! plus the always-on HUD (header, status feed, layer attribution, hover
//! label).

mod browse;
mod components;
mod hud;
mod journal;
pub mod panel;

use bevy::prelude::*;
use bevy::text::Font;
use bevy::ui::Node as UiNode;
use std::path::Path;

use crate::plugins::core::{
    browse_is_open, focus_is_edit, focus_is_none, focus_is_search, journal_is_open, AppState,
    TrailFilter,
};

use components::{BrowseUi, JournalUi};

pub use journal::EditState;

/// Single UI face used across panels and map labels.
pub const FONT_PATH: &str = "fonts/Overpass-Regular.ttf";

/// Loads the shared font when it is present on disk; panels and labels are
/// skipped entirely without it.
pub fn marker_font(asset_server: &AssetServer) -> Option<Handle<Font>> {
    let font_on_disk = Path::new("assets").join(FONT_PATH);
    if !font_on_disk.exists() {
        return None;
    }
    Some(asset_server.load(FONT_PATH))
}

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<browse::ListCursor>()
            .init_resource::<journal::JournalCursor>()
            .init_resource::<journal::EditState>()
            .add_systems(Startup, hud::setup_hud)
            .add_systems(
                Update,
                (
                    hud::update_header,
                    hud::update_status_panel,
                    hud::update_attribution,
                    hud::update_hover_label,
                    browse::update_detail_panel,
                    sync_view_visibility,
                    journal::apply_approved_actions,
                )
                    .run_if(in_state(AppState::Ready)),
            )
            .add_systems(
                Update,
                (
                    (
                        browse::handle_focus_search,
                        browse::handle_clear_search,
                        browse::handle_list_nav,
                        browse::handle_list_activate,
                    )
                        .run_if(focus_is_none),
                    browse::handle_search_entry.run_if(focus_is_search),
                    browse::update_search_text,
                    browse::update_tags_text,
                    browse::update_trail_list,
                    browse::update_trail_count,
                )
                    .run_if(in_state(AppState::Ready))
                    .run_if(browse_is_open),
            )
            .add_systems(
                Update,
                (
                    (
                        journal::handle_sort_keys,
                        journal::handle_journal_nav,
                        journal::handle_journal_activate,
                        journal::handle_add_request,
                        journal::handle_edit_request,
                        journal::handle_delete_request,
                    )
                        .run_if(focus_is_none),
                    journal::handle_edit_entry.run_if(focus_is_edit),
                    journal::update_journal_list,
                    journal::update_totals_text,
                )
                    .run_if(in_state(AppState::Ready))
                    .run_if(journal_is_open),
            );
    }
}

/// Shows the browse panels or the journal panels depending on the active
/// tag; everything else stays put.
fn sync_view_visibility(
    filter: Res<TrailFilter>,
    mut elements: Query<(&mut UiNode, Option<&BrowseUi>, Option<&JournalUi>)>,
) {
    let journal_open = filter.tag == crate::catalog::DifficultyTag::Trips;

    let browse_display = if journal_open {
        Display::None
    } else {
        Display::Flex
    };
    let journal_display = if journal_open {
        Display::Flex
    } else {
        Display::None
    };

    for (mut node, browse, journal) in elements.iter_mut() {
        if browse.is_some() {
            node.display = browse_display;
        }
        if journal.is_some() {
            node.display = journal_display;
        }
    }
}
