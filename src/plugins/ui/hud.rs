//! Static panel setup and the always-on HUD update systems.

use bevy::prelude::*;
use bevy::ui::Node as UiNode;
use std::path::Path;

use crate::catalog::Catalog;
use crate::compat::{NodeBundle, TextBundle, TextStyle};
use crate::plugins::core::EventLog;
use crate::plugins::map::{HoveredTrail, TileLayerSet};
use crate::trips::TripTotals;

use super::components::{
    AttributionText, BrowseUi, DetailPanelRoot, DetailText, HeaderText, HelpText, HoverLabelText,
    JournalListText, JournalUi, SearchText, StatusText, TagsText, TotalsText, TrailCountText,
    TrailListText,
};
use super::panel::{PanelConfig, PanelPosition};
use super::FONT_PATH;

const INK: Color = Color::srgb(0.15, 0.18, 0.2);
const INK_SOFT: Color = Color::srgb(0.35, 0.4, 0.42);
const PANEL_BG: Color = Color::srgba(0.98, 0.98, 0.97, 0.92);

pub fn setup_hud(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font_on_disk = Path::new("assets").join(FONT_PATH);

    if !font_on_disk.exists() {
        info!("HUD font not found at {}", font_on_disk.display());
        return;
    }

    let font = asset_server.load(FONT_PATH);

    // Header (top-left)
    commands.spawn((
        HeaderText,
        TextBundle::from_section(
            "Canyon Lakes Trails",
            TextStyle {
                font: font.clone(),
                font_size: 19.0,
                color: INK,
            },
        )
        .with_node(panel_node(
            PanelConfig::at(PanelPosition::TopLeft)
                .with_background(PANEL_BG)
                .with_padding(8.0),
        )),
    ));

    commands.spawn((
        HelpText,
        TextBundle::from_section(
            "1-5 filter tags | / search | C clear | Up/Down + Enter select | Esc deselect | L layer | H reframe",
            TextStyle {
                font: font.clone(),
                font_size: 12.0,
                color: INK_SOFT,
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(66.0),
            ..default()
        }),
    ));

    // Search box and tags (top-right, browse view)
    commands.spawn((
        SearchText,
        BrowseUi,
        TextBundle::from_section(
            "Search: --",
            TextStyle {
                font: font.clone(),
                font_size: 14.0,
                color: INK,
            },
        )
        .with_node(panel_node(
            PanelConfig::at(PanelPosition::TopRight)
                .with_background(PANEL_BG)
                .with_padding(8.0)
                .with_width(330.0),
        )),
    ));

    commands.spawn((
        TagsText,
        BrowseUi,
        TextBundle::from_section(
            "Tags: --",
            TextStyle {
                font: font.clone(),
                font_size: 13.0,
                color: INK_SOFT,
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            right: Val::Px(14.0),
            top: Val::Px(52.0),
            width: Val::Px(330.0),
            ..default()
        }),
    ));

    // Trail list (right, browse view)
    commands.spawn((
        TrailListText,
        BrowseUi,
        TextBundle::from_section(
            "Trails: --",
            TextStyle {
                font: font.clone(),
                font_size: 13.0,
                color: INK,
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            right: Val::Px(14.0),
            top: Val::Px(78.0),
            width: Val::Px(330.0),
            ..default()
        })
        .with_background_color(PANEL_BG),
    ));

    commands.spawn((
        TrailCountText,
        BrowseUi,
        TextBundle::from_section(
            "-- trails",
            TextStyle {
                font: font.clone(),
                font_size: 12.0,
                color: INK_SOFT,
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            right: Val::Px(14.0),
            bottom: Val::Px(38.0),
            ..default()
        }),
    ));

    // Journal list and totals (right, journal view)
    commands.spawn((
        JournalListText,
        JournalUi,
        TextBundle::from_section(
            "Patrol trips: --",
            TextStyle {
                font: font.clone(),
                font_size: 13.0,
                color: INK,
            },
        )
        .with_node(panel_node(
            PanelConfig::at(PanelPosition::TopRight)
                .with_background(PANEL_BG)
                .with_padding(8.0)
                .with_width(360.0),
        )),
    ));

    commands.spawn((
        TotalsText,
        JournalUi,
        TextBundle::from_section(
            "Totals: --",
            TextStyle {
                font: font.clone(),
                font_size: 13.0,
                color: INK,
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            right: Val::Px(14.0),
            bottom: Val::Px(38.0),
            ..default()
        }),
    ));

    // Selected-trail detail card (left overlay)
    commands
        .spawn((
            DetailPanelRoot,
            NodeBundle {
                node: UiNode {
                    position_type: PositionType::Absolute,
                    left: Val::Px(14.0),
                    top: Val::Px(96.0),
                    width: Val::Px(340.0),
                    padding: UiRect::all(Val::Px(10.0)),
                    display: Display::None,
                    ..default()
                },
                background_color: PANEL_BG.into(),
                z_index: ZIndex(5),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                DetailText,
                TextBundle::from_section(
                    "--",
                    TextStyle {
                        font: font.clone(),
                        font_size: 13.0,
                        color: INK,
                    },
                ),
            ));
        });

    // Status feed (bottom-left)
    commands.spawn((
        StatusText,
        TextBundle::from_section(
            "Status: --",
            TextStyle {
                font: font.clone(),
                font_size: 12.0,
                color: INK_SOFT,
            },
        )
        .with_node(panel_node(
            PanelConfig::at(PanelPosition::BottomLeft)
                .with_background(PANEL_BG)
                .with_padding(6.0),
        )),
    ));

    // Active layer attribution (bottom-right)
    commands.spawn((
        AttributionText,
        TextBundle::from_section(
            "--",
            TextStyle {
                font: font.clone(),
                font_size: 11.0,
                color: INK_SOFT,
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            right: Val::Px(14.0),
            bottom: Val::Px(14.0),
            ..default()
        }),
    ));

    // Cursor-following trail name
    commands.spawn((
        HoverLabelText,
        TextBundle::from_section(
            "",
            TextStyle {
                font,
                font_size: 12.0,
                color: INK,
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            display: Display::None,
            ..default()
        })
        .with_background_color(PANEL_BG)
        .with_z_index(ZIndex(10)),
    ));
}

fn panel_node(config: PanelConfig) -> UiNode {
    let mut node = UiNode::default();
    config.apply_to_node(&mut node);
    node
}

// =============================================================================
// Update Systems
// =============================================================================

pub fn update_header(
    catalog: Res<Catalog>,
    totals: Res<TripTotals>,
    mut texts: Query<&mut Text, With<HeaderText>>,
) {
    if let Some(mut text) = texts.iter_mut().next() {
        text.0 = format!(
            "Canyon Lakes Trails\nRoosevelt National Forest | {} hiking trails | {} patrol trips",
            catalog.trails.len(),
            totals.trips
        );
    }
}

pub fn update_status_panel(log: Res<EventLog>, mut texts: Query<&mut Text, With<StatusText>>) {
    if let Some(mut text) = texts.iter_mut().next() {
        let entries = log.entries();
        if entries.is_empty() {
            text.0 = "Status: --".to_string();
        } else {
            let mut body = String::new();
            for entry in entries {
                body.push_str("- ");
                body.push_str(entry);
                body.push('\n');
            }
            text.0 = body.trim_end().to_string();
        }
    }
}

pub fn update_attribution(
    layers: Res<TileLayerSet>,
    mut texts: Query<&mut Text, With<AttributionText>>,
) {
    if let Some(mut text) = texts.iter_mut().next() {
        let layer = layers.active();
        text.0 = format!("{} | {}", layer.name, layer.attribution);
    }
}

pub fn update_hover_label(
    hovered: Res<HoveredTrail>,
    mut labels: Query<(&mut Text, &mut UiNode), With<HoverLabelText>>,
) {
    if let Some((mut text, mut node)) = labels.iter_mut().next() {
        match (&hovered.name, hovered.screen_pos) {
            (Some(name), Some(pos)) => {
                text.0 = name.clone();
                node.display = Display::Flex;
                node.left = Val::Px(pos.x + 14.0);
                node.top = Val::Px(pos.y + 14.0);
            }
            _ => {
                node.display = Display::None;
            }
        }
    }
}
