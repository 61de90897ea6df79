//! Map view: tile-layer selection, difficulty-keyed markers, cursor
//! picking, and the camera.
//!
//! All camera motion funnels through a single intent resource. Selection
//! and filter changes recompute the intent once; one dispatcher turns the
//! intent into an animation. The two behaviors (fly-to a selected trail,
//! fit the filtered set) can therefore never race on the camera.

use bevy::camera::{OrthographicProjection, Projection};
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::catalog::{filter_trails, Catalog, Difficulty, Trail};
use crate::compat::{Camera2dBundle, SpriteBundle, Text2dBundle, TextStyle};
use crate::geo::{
    bounds_world_center, bounds_world_size, frame_points, project, GeoBounds, LatLon,
    DISTRICT_BOUNDS,
};
use crate::plugins::core::{
    focus_is_none, AppState, EventLog, InputBindings, Selection, TrailFilter,
};
use crate::plugins::ui::marker_font;

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileLayerSet>()
            .init_resource::<CameraIntent>()
            .init_resource::<CameraAnimation>()
            .init_resource::<HoveredTrail>()
            .add_message::<ReframeRequest>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    (recompute_camera_intent, dispatch_camera_intent).chain(),
                    animate_camera,
                    sync_trail_markers,
                    update_hovered_trail,
                    handle_marker_click,
                    apply_layer_backdrop,
                    draw_district_frame,
                )
                    .run_if(in_state(AppState::Ready)),
            )
            .add_systems(
                Update,
                (handle_layer_cycle, handle_reframe)
                    .run_if(in_state(AppState::Ready))
                    .run_if(focus_is_none),
            );
    }
}

// =============================================================================
// Constants
// =============================================================================

/// Camera scale when flying to a single trail (smaller = closer).
pub const FLY_TO_SCALE: f32 = 0.35;
const FLY_TO_SECONDS: f32 = 2.0;
const FIT_SECONDS: f32 = 1.2;

/// Window-edge margin kept clear when fitting bounds, in pixels.
const FIT_MARGIN_PX: f32 = 48.0;

/// Scale clamp when fitting bounds. The lower bound is the maximum zoom-in,
/// so one lonely search result does not fill the window with a single
/// marker.
const FIT_SCALE_MIN: f32 = 0.25;
const FIT_SCALE_MAX: f32 = 2.5;

const MARKER_PICK_RADIUS: f32 = 16.0;
const MARKER_LABEL_SIZE: f32 = 11.0;

// =============================================================================
// Tile Layers
// =============================================================================

/// A named tile source. Fetching and compositing tiles belongs to the map
/// renderer collaborator; the application only selects among sources and
/// surfaces the attribution.
#[derive(Clone, Copy, Debug)]
pub struct TileLayer {
    pub name: &'static str,
    pub url_template: &'static str,
    pub attribution: &'static str,
}

#[derive(Resource)]
pub struct TileLayerSet {
    layers: Vec<TileLayer>,
    active: usize,
}

impl Default for TileLayerSet {
    fn default() -> Self {
        Self {
            layers: vec![
                TileLayer {
                    name: "Street Map",
                    url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
                    attribution: "(c) OpenStreetMap contributors",
                },
                TileLayer {
                    name: "Satellite",
                    url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
                    attribution: "(c) Esri, Maxar, Earthstar Geographics",
                },
                TileLayer {
                    name: "Terrain",
                    url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
                    attribution: "(c) OpenTopoMap contributors",
                },
                TileLayer {
                    name: "Dark Mode",
                    url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
                    attribution: "(c) OpenStreetMap contributors, (c) CARTO",
                },
            ],
            active: 2,
        }
    }
}

impl TileLayerSet {
    pub fn active(&self) -> &TileLayer {
        &self.layers[self.active]
    }

    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.layers.iter().position(|layer| layer.name == name) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    pub fn cycle(&mut self) {
        self.active = (self.active + 1) % self.layers.len();
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }
}

/// Map backdrop tint per layer, standing in for the tiles themselves.
fn backdrop_color(layer_name: &str) -> Color {
    match layer_name {
        "Street Map" => Color::srgb(0.91, 0.92, 0.89),
        "Satellite" => Color::srgb(0.16, 0.22, 0.18),
        "Terrain" => Color::srgb(0.85, 0.84, 0.76),
        "Dark Mode" => Color::srgb(0.09, 0.10, 0.12),
        _ => Color::srgb(0.85, 0.84, 0.76),
    }
}

fn frame_line_color(layer_name: &str) -> Color {
    match layer_name {
        "Satellite" | "Dark Mode" => Color::srgba(0.85, 0.88, 0.9, 0.25),
        _ => Color::srgba(0.25, 0.3, 0.3, 0.3),
    }
}

// =============================================================================
// Markers
// =============================================================================

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MarkerVariant {
    Easy,
    Moderate,
    Difficult,
    VeryDifficult,
    Selected,
}

/// Render parameters for one marker variant. The anchor offset lifts the
/// sprite so its base sits on the trailhead coordinate.
#[derive(Clone, Copy, Debug)]
pub struct MarkerSpec {
    pub color: Color,
    pub size: Vec2,
    pub anchor_offset: Vec2,
}

pub fn variant_for(difficulty: Difficulty) -> MarkerVariant {
    match difficulty {
        Difficulty::Easy => MarkerVariant::Easy,
        Difficulty::Moderate => MarkerVariant::Moderate,
        Difficulty::Difficult => MarkerVariant::Difficult,
        Difficulty::VeryDifficult => MarkerVariant::VeryDifficult,
    }
}

pub fn marker_spec(variant: MarkerVariant) -> MarkerSpec {
    let (color, width, height) = match variant {
        MarkerVariant::Easy => (Color::srgb(0.18, 0.65, 0.35), 12.0, 19.0),
        MarkerVariant::Moderate => (Color::srgb(0.25, 0.5, 0.9), 12.0, 19.0),
        MarkerVariant::Difficult => (Color::srgb(0.9, 0.55, 0.2), 12.0, 19.0),
        MarkerVariant::VeryDifficult => (Color::srgb(0.85, 0.25, 0.2), 12.0, 19.0),
        MarkerVariant::Selected => (Color::srgb(0.55, 0.35, 0.85), 15.0, 24.0),
    };

    MarkerSpec {
        color,
        size: Vec2::new(width, height),
        anchor_offset: Vec2::new(0.0, height * 0.5),
    }
}

#[derive(Component)]
struct TrailMarker;

#[derive(Component)]
struct TrailMarkerLabel;

/// The marker set currently on the map: the selected trail alone while a
/// selection exists, otherwise every trail passing the filter.
pub fn visible_trails<'a>(
    catalog: &'a Catalog,
    filter: &TrailFilter,
    selection: &Selection,
) -> Vec<&'a Trail> {
    if let Some(id) = &selection.trail_id {
        if let Some(trail) = catalog.by_id(id) {
            return vec![trail];
        }
    }

    filter_trails(&catalog.trails, &filter.search, filter.tag)
}

// =============================================================================
// Camera
// =============================================================================

/// What the camera should be showing, recomputed once per relevant state
/// change and consumed by a single dispatcher.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub enum CameraIntent {
    #[default]
    Idle,
    FlyTo(LatLon),
    FitBounds(GeoBounds),
}

#[derive(Resource, Debug, Default)]
pub struct CameraAnimation {
    from_center: Vec2,
    to_center: Vec2,
    from_scale: f32,
    to_scale: f32,
    elapsed: f32,
    duration: f32,
    active: bool,
}

/// Forced refresh: re-issues the current intent even when nothing changed.
#[derive(Message)]
pub struct ReframeRequest;

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2dBundle {
            projection: Projection::Orthographic(OrthographicProjection {
                scale: 1.0,
                ..OrthographicProjection::default_2d()
            }),
            camera: Camera {
                order: 0,
                ..default()
            },
            ..default()
        },
        Name::new("MapCamera"),
    ));
}

fn recompute_camera_intent(
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    selection: Res<Selection>,
    mut reframe: MessageReader<ReframeRequest>,
    mut intent: ResMut<CameraIntent>,
) {
    let forced = reframe.read().count() > 0;
    if !forced && !filter.is_changed() && !selection.is_changed() {
        return;
    }

    let next = match &selection.trail_id {
        Some(id) => match catalog.by_id(id) {
            Some(trail) => CameraIntent::FlyTo(trail.coordinate),
            None => CameraIntent::Idle,
        },
        None => {
            let coordinates: Vec<LatLon> = filter_trails(&catalog.trails, &filter.search, filter.tag)
                .iter()
                .map(|trail| trail.coordinate)
                .collect();
            CameraIntent::FitBounds(frame_points(&coordinates))
        }
    };

    if *intent != next {
        *intent = next;
    } else if forced {
        intent.set_changed();
    }
}

/// Scale needed to fit `bounds` inside the window with a fixed pixel
/// margin, clamped so fitting never zooms in past the cap.
pub fn fit_scale(bounds: &GeoBounds, window_width: f32, window_height: f32) -> f32 {
    let size = bounds_world_size(bounds);
    let usable_width = (window_width - 2.0 * FIT_MARGIN_PX).max(1.0);
    let usable_height = (window_height - 2.0 * FIT_MARGIN_PX).max(1.0);
    let scale = (size.x / usable_width).max(size.y / usable_height);
    scale.clamp(FIT_SCALE_MIN, FIT_SCALE_MAX)
}

fn dispatch_camera_intent(
    intent: Res<CameraIntent>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Transform, &Projection), With<Camera2d>>,
    mut animation: ResMut<CameraAnimation>,
) {
    if !intent.is_changed() {
        return;
    }

    let (to_center, to_scale, duration) = match &*intent {
        CameraIntent::Idle => return,
        CameraIntent::FlyTo(coordinate) => (project(*coordinate), FLY_TO_SCALE, FLY_TO_SECONDS),
        CameraIntent::FitBounds(bounds) => {
            let (width, height) = match windows.single() {
                Ok(window) => (window.width(), window.height()),
                Err(_) => (1280.0, 800.0),
            };
            (
                bounds_world_center(bounds),
                fit_scale(bounds, width, height),
                FIT_SECONDS,
            )
        }
    };

    let (from_center, from_scale) = match cameras.single() {
        Ok((transform, projection)) => {
            let scale = match projection {
                Projection::Orthographic(orthographic) => orthographic.scale,
                _ => to_scale,
            };
            (
                Vec2::new(transform.translation.x, transform.translation.y),
                scale,
            )
        }
        Err(_) => (to_center, to_scale),
    };

    *animation = CameraAnimation {
        from_center,
        to_center,
        from_scale,
        to_scale,
        elapsed: 0.0,
        duration,
        active: true,
    };
}

fn animate_camera(
    time: Res<Time>,
    mut animation: ResMut<CameraAnimation>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
) {
    if !animation.active {
        return;
    }

    animation.elapsed += time.delta_secs();
    let duration = animation.duration.max(f32::EPSILON);
    let t = (animation.elapsed / duration).clamp(0.0, 1.0);

    let center = animation.from_center.lerp(animation.to_center, t);
    let scale = animation.from_scale + (animation.to_scale - animation.from_scale) * t;

    for (mut transform, mut projection) in cameras.iter_mut() {
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        if let Projection::Orthographic(orthographic) = &mut *projection {
            orthographic.scale = scale;
        }
    }

    if t >= 1.0 {
        animation.active = false;
    }
}

// =============================================================================
// Systems
// =============================================================================

fn sync_trail_markers(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    selection: Res<Selection>,
    markers: Query<Entity, With<TrailMarker>>,
    labels: Query<Entity, With<TrailMarkerLabel>>,
) {
    if !filter.is_changed() && !selection.is_changed() {
        return;
    }

    for entity in markers.iter() {
        commands.entity(entity).despawn();
    }
    for entity in labels.iter() {
        commands.entity(entity).despawn();
    }

    let selected = selection.trail_id.as_deref();
    let font = marker_font(&asset_server);

    for trail in visible_trails(&catalog, &filter, &selection) {
        let variant = if selected == Some(trail.id) {
            MarkerVariant::Selected
        } else {
            variant_for(trail.difficulty)
        };
        let spec = marker_spec(variant);
        let world = project(trail.coordinate);

        commands.spawn((
            TrailMarker,
            SpriteBundle {
                sprite: Sprite {
                    color: spec.color,
                    custom_size: Some(spec.size),
                    ..default()
                },
                transform: Transform::from_xyz(
                    world.x + spec.anchor_offset.x,
                    world.y + spec.anchor_offset.y,
                    1.0,
                ),
                ..default()
            },
        ));

        if let Some(font) = &font {
            let mut bundle = Text2dBundle::from_section(
                trail.name,
                TextStyle {
                    font: font.clone(),
                    font_size: MARKER_LABEL_SIZE,
                    color: Color::srgba(0.15, 0.18, 0.2, 0.9),
                },
            );
            bundle.transform = Transform::from_xyz(world.x, world.y + spec.size.y + 7.0, 2.0);
            commands.spawn((TrailMarkerLabel, bundle));
        }
    }
}

#[derive(Resource, Default)]
pub struct HoveredTrail {
    pub trail_id: Option<String>,
    pub name: Option<String>,
    pub screen_pos: Option<Vec2>,
}

impl HoveredTrail {
    fn clear(&mut self) {
        self.trail_id = None;
        self.name = None;
        self.screen_pos = None;
    }
}

fn update_hovered_trail(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    catalog: Res<Catalog>,
    filter: Res<TrailFilter>,
    selection: Res<Selection>,
    mut hovered: ResMut<HoveredTrail>,
) {
    let window = match windows.single() {
        Ok(window) => window,
        Err(_) => {
            hovered.clear();
            return;
        }
    };

    let cursor = match window.cursor_position() {
        Some(cursor) => cursor,
        None => {
            hovered.clear();
            return;
        }
    };

    let (camera, camera_transform) = match cameras.single() {
        Ok(pair) => pair,
        Err(_) => {
            hovered.clear();
            return;
        }
    };

    let world_pos = match camera.viewport_to_world_2d(camera_transform, cursor) {
        Ok(world_pos) => world_pos,
        Err(_) => {
            hovered.clear();
            return;
        }
    };

    let nearest = nearest_trail(
        &visible_trails(&catalog, &filter, &selection),
        world_pos,
        MARKER_PICK_RADIUS,
    );

    match nearest {
        Some(trail) => {
            hovered.trail_id = Some(trail.id.to_string());
            hovered.name = Some(trail.name.to_string());
            hovered.screen_pos = Some(cursor);
        }
        None => hovered.clear(),
    }
}

fn handle_marker_click(
    mouse: Res<ButtonInput<MouseButton>>,
    hovered: Res<HoveredTrail>,
    catalog: Res<Catalog>,
    mut selection: ResMut<Selection>,
    mut log: ResMut<EventLog>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }

    let Some(id) = hovered.trail_id.clone() else {
        return;
    };

    if selection.trail_id.as_deref() != Some(id.as_str()) {
        if let Some(trail) = catalog.by_id(&id) {
            log.push(format!("Selected {}", trail.name));
        }
        selection.trail_id = Some(id);
    }
}

fn nearest_trail<'a>(trails: &[&'a Trail], world_pos: Vec2, radius: f32) -> Option<&'a Trail> {
    let mut closest = None;
    let mut closest_dist = f32::MAX;

    for trail in trails {
        let dist = project(trail.coordinate).distance(world_pos);
        if dist <= radius && dist < closest_dist {
            closest = Some(*trail);
            closest_dist = dist;
        }
    }

    closest
}

fn handle_layer_cycle(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut layers: ResMut<TileLayerSet>,
    mut log: ResMut<EventLog>,
) {
    if input.just_pressed(bindings.cycle_layer) {
        layers.cycle();
        let layer = layers.active();
        info!("Tile layer: {}", layer.name);
        log.push(format!("Layer: {}", layer.name));
    }
}

fn handle_reframe(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut reframe: MessageWriter<ReframeRequest>,
    mut log: ResMut<EventLog>,
) {
    if input.just_pressed(bindings.reframe) {
        reframe.write(ReframeRequest);
        log.push("Reframed view".to_string());
    }
}

fn apply_layer_backdrop(layers: Res<TileLayerSet>, mut clear_color: ResMut<ClearColor>) {
    if layers.is_changed() {
        clear_color.0 = backdrop_color(layers.active().name);
    }
}

/// District outline and graticule, drawn where the tile collaborator would
/// composite its imagery.
fn draw_district_frame(mut gizmos: Gizmos, layers: Res<TileLayerSet>) {
    let color = frame_line_color(layers.active().name);

    let sw = project(LatLon::new(DISTRICT_BOUNDS.south, DISTRICT_BOUNDS.west));
    let ne = project(LatLon::new(DISTRICT_BOUNDS.north, DISTRICT_BOUNDS.east));
    let nw = Vec2::new(sw.x, ne.y);
    let se = Vec2::new(ne.x, sw.y);

    gizmos.line_2d(sw, se, color);
    gizmos.line_2d(se, ne, color);
    gizmos.line_2d(ne, nw, color);
    gizmos.line_2d(nw, sw, color);

    let divisions = 5;
    for i in 1..divisions {
        let t = i as f32 / divisions as f32;
        let x = sw.x + (ne.x - sw.x) * t;
        let y = sw.y + (ne.y - sw.y) * t;
        gizmos.line_2d(Vec2::new(x, sw.y), Vec2::new(x, ne.y), color.with_alpha(0.12));
        gizmos.line_2d(Vec2::new(sw.x, y), Vec2::new(ne.x, y), color.with_alpha(0.12));
    }
}
