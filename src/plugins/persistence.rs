//! Durable local storage: the trips collection, the remembered-device
//! flag, and app settings.
//!
//! Storage is a directory of small key files. The trip collection is the
//! only user-owned data and uses the fixed JSON wire format; settings ride
//! along as RON. Anything unreadable falls back to defaults without taking
//! the app down.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::plugins::auth::AuthGate;
use crate::plugins::core::{AppState, EventLog};
use crate::plugins::map::TileLayerSet;
use crate::trips::{
    deserialize_trips, serialize_trips, TripLog, TripSort, TripSortKey, TripTotals,
};

pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Storage>()
            .init_resource::<TripLog>()
            .init_resource::<TripTotals>()
            .init_resource::<TripSort>()
            .add_systems(
                OnEnter(AppState::Loading),
                (load_stored_state, enter_ready).chain(),
            )
            .add_systems(
                Update,
                save_settings_on_change.run_if(in_state(AppState::Ready)),
            );
    }
}

pub const TRIPS_KEY: &str = "trips.json";
pub const REMEMBERED_KEY: &str = "device-remembered";
pub const SETTINGS_KEY: &str = "settings.ron";

/// One durable key per file under the storage root.
#[derive(Resource)]
pub struct Storage {
    root: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
        }
    }
}

impl Storage {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Missing keys read as `None`; only an unreadable existing file is an
    /// error.
    pub fn read_key(&self, key: &str) -> Result<Option<String>, String> {
        let path = self.key_path(key);

        if !path.exists() {
            return Ok(None);
        }

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) => Err(format!("Read error for {}: {}", key, error)),
        }
    }

    pub fn write_key(&self, key: &str, contents: &str) -> Result<(), String> {
        let path = self.key_path(key);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        if let Err(error) = fs::create_dir_all(dir) {
            return Err(format!("Create dir error: {}", error));
        }

        match fs::write(&path, contents) {
            Ok(_) => Ok(()),
            Err(error) => Err(format!("Write error for {}: {}", key, error)),
        }
    }
}

/// Persisted app preferences. Not user data; losing this file only resets
/// the layer and sort choices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub tile_layer: String,
    pub sort_key: TripSortKey,
    pub sort_descending: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_layer: "Terrain".to_string(),
            sort_key: TripSortKey::Date,
            sort_descending: true,
        }
    }
}

pub fn persist_trips(storage: &Storage, trips: &TripLog) -> Result<(), String> {
    let serialized = serialize_trips(trips)?;
    storage.write_key(TRIPS_KEY, &serialized)
}

pub fn persist_remembered(storage: &Storage, remembered: bool) -> Result<(), String> {
    storage.write_key(REMEMBERED_KEY, if remembered { "true" } else { "false" })
}

fn persist_settings(storage: &Storage, settings: &Settings) -> Result<(), String> {
    let config = ron::ser::PrettyConfig::default();
    match ron::ser::to_string_pretty(settings, config) {
        Ok(serialized) => storage.write_key(SETTINGS_KEY, &serialized),
        Err(error) => Err(format!("Settings serialize error: {}", error)),
    }
}

// =============================================================================
// Systems
// =============================================================================

#[allow(clippy::too_many_arguments)]
fn load_stored_state(
    storage: Res<Storage>,
    mut trips: ResMut<TripLog>,
    mut totals: ResMut<TripTotals>,
    mut sort: ResMut<TripSort>,
    mut layers: ResMut<TileLayerSet>,
    mut auth: ResMut<AuthGate>,
    mut log: ResMut<EventLog>,
) {
    // Trip journal, falling back to the seed collection on first run or
    // unreadable data. The seed is persisted right away so the next load
    // sees the same records.
    let loaded = match storage.read_key(TRIPS_KEY) {
        Ok(Some(contents)) => match deserialize_trips(&contents) {
            Ok(parsed) => {
                info!("Loaded {} trips from {}", parsed.len(), TRIPS_KEY);
                Some(parsed)
            }
            Err(error) => {
                error!("Trip load failed: {}", error);
                log.push(format!("Trip load failed: {}", error));
                None
            }
        },
        Ok(None) => None,
        Err(error) => {
            error!("Trip load failed: {}", error);
            log.push(format!("Trip load failed: {}", error));
            None
        }
    };

    *trips = match loaded {
        Some(parsed) => parsed,
        None => {
            let seeded = TripLog::seed();
            match persist_trips(&storage, &seeded) {
                Ok(_) => log.push(format!("Seeded journal ({} trips)", seeded.len())),
                Err(error) => {
                    error!("Seed persist failed: {}", error);
                    log.push(format!("Seed persist failed: {}", error));
                }
            }
            seeded
        }
    };
    *totals = trips.totals();

    // Remembered device skips the patrol password prompt.
    match storage.read_key(REMEMBERED_KEY) {
        Ok(Some(flag)) if flag.trim() == "true" => {
            auth.authenticated = true;
            auth.remembered_device = true;
            log.push("Device remembered, journal unlocked".to_string());
        }
        Ok(_) => {}
        Err(error) => {
            error!("Remembered-device read failed: {}", error);
        }
    }

    // Preferences.
    let settings = match storage.read_key(SETTINGS_KEY) {
        Ok(Some(contents)) => match ron::de::from_str::<Settings>(&contents) {
            Ok(settings) => settings,
            Err(error) => {
                error!("Settings parse failed: {}", error);
                Settings::default()
            }
        },
        Ok(None) => Settings::default(),
        Err(error) => {
            error!("Settings read failed: {}", error);
            Settings::default()
        }
    };

    if !layers.select_by_name(&settings.tile_layer) {
        info!("Unknown tile layer '{}', keeping default", settings.tile_layer);
    }
    sort.key = settings.sort_key;
    sort.descending = settings.sort_descending;
}

fn enter_ready(mut next_state: ResMut<NextState<AppState>>, mut log: ResMut<EventLog>) {
    log.push("Ready".to_string());
    next_state.set(AppState::Ready);
}

fn save_settings_on_change(
    storage: Res<Storage>,
    layers: Res<TileLayerSet>,
    sort: Res<TripSort>,
    mut log: ResMut<EventLog>,
) {
    if !layers.is_changed() && !sort.is_changed() {
        return;
    }

    let settings = Settings {
        tile_layer: layers.active().name.to_string(),
        sort_key: sort.key,
        sort_descending: sort.descending,
    };

    if let Err(error) = persist_settings(&storage, &settings) {
        error!("Settings save failed: {}", error);
        log.push(format!("Settings save failed: {}", error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_storage(tag: &str) -> Storage {
        let root = std::env::temp_dir().join(format!(
            "canyonlakes-trails-test-{}-{}",
            std::process::id(),
            tag
        ));
        let _ = fs::remove_dir_all(&root);
        Storage::at(root)
    }

    #[test]
    fn missing_key_reads_as_none() {
        let storage = scratch_storage("missing");
        assert_eq!(storage.read_key("nothing-here"), Ok(None));
    }

    #[test]
    fn write_then_read_round_trips() {
        let storage = scratch_storage("roundtrip");
        storage.write_key("sample", "contents").unwrap();
        assert_eq!(
            storage.read_key("sample"),
            Ok(Some("contents".to_string()))
        );
        let _ = fs::remove_dir_all(storage.root);
    }

    #[test]
    fn trips_persist_and_reload_identically() {
        let storage = scratch_storage("trips");
        let log = TripLog::seed();
        persist_trips(&storage, &log).unwrap();

        let contents = storage.read_key(TRIPS_KEY).unwrap().unwrap();
        let reloaded = deserialize_trips(&contents).unwrap();
        assert_eq!(reloaded.to_stored(), log.to_stored());
        let _ = fs::remove_dir_all(storage.root);
    }

    #[test]
    fn remembered_flag_is_boolean_as_string() {
        let storage = scratch_storage("remember");
        persist_remembered(&storage, true).unwrap();
        assert_eq!(
            storage.read_key(REMEMBERED_KEY),
            Ok(Some("true".to_string()))
        );
        persist_remembered(&storage, false).unwrap();
        assert_eq!(
            storage.read_key(REMEMBERED_KEY),
            Ok(Some("false".to_string()))
        );
        let _ = fs::remove_dir_all(storage.root);
    }

    #[test]
    fn settings_round_trip_through_ron() {
        let settings = Settings {
            tile_layer: "Dark Mode".to_string(),
            sort_key: TripSortKey::Trees,
            sort_descending: false,
        };
        let serialized =
            ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let parsed: Settings = ron::de::from_str(&serialized).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn settings_default_matches_first_run_experience() {
        let settings = Settings::default();
        assert_eq!(settings.tile_layer, "Terrain");
        assert_eq!(settings.sort_key, TripSortKey::Date);
        assert!(settings.sort_descending);
    }
}
