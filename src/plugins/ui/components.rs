//! Shared UI markers for the panel update systems.

use bevy::prelude::*;

// =============================================================================
// View Markers
// =============================================================================

/// UI visible while browsing trails (every tag except Trips).
#[derive(Component)]
pub struct BrowseUi;

/// UI visible while the patrol journal is open.
#[derive(Component)]
pub struct JournalUi;

// =============================================================================
// HUD Components
// =============================================================================

#[derive(Component)]
pub struct HeaderText;

#[derive(Component)]
pub struct HelpText;

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct AttributionText;

#[derive(Component)]
pub struct HoverLabelText;

// =============================================================================
// Browse Panel Components
// =============================================================================

#[derive(Component)]
pub struct SearchText;

#[derive(Component)]
pub struct TagsText;

#[derive(Component)]
pub struct TrailListText;

#[derive(Component)]
pub struct TrailCountText;

#[derive(Component)]
pub struct DetailPanelRoot;

#[derive(Component)]
pub struct DetailText;

// =============================================================================
// Journal Panel Components
// =============================================================================

#[derive(Component)]
pub struct JournalListText;

#[derive(Component)]
pub struct TotalsText;
