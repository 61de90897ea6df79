//! The patrol trip log: records, sorting, aggregation, and the JSON wire
//! format used for durable storage.
//!
//! Records carry a stable in-memory id assigned at creation or load time.
//! Every edit and delete targets that id, so two trips logged on the same
//! day for the same trail stay independently editable. The id never leaves
//! the process; the persisted format is the plain four-field record.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// One logged patrol trip. All fields besides `id` are free text owned by
/// the user; `trees_cleared` is parsed leniently when aggregated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripRecord {
    pub id: u64,
    pub date: String,
    pub trail: String,
    pub partners: String,
    pub trees_cleared: String,
}

/// Sort column for the journal view. Dates compare as raw ISO strings,
/// which orders correctly because the stored format is zero-padded
/// `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripSortKey {
    Date,
    Trail,
    Trees,
}

/// Current journal sort preference; persisted with the app settings.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripSort {
    pub key: TripSortKey,
    pub descending: bool,
}

impl Default for TripSort {
    fn default() -> Self {
        Self {
            key: TripSortKey::Date,
            descending: true,
        }
    }
}

/// Aggregates over the whole log, recomputed after every mutation.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TripTotals {
    pub trips: usize,
    pub trees: i64,
}

/// Sole owner of the trip collection. Other components read through the
/// resource; nothing else touches the durable store directly.
#[derive(Resource, Default)]
pub struct TripLog {
    records: Vec<TripRecord>,
    next_id: u64,
}

impl TripLog {
    pub fn seed() -> Self {
        let mut log = TripLog::default();
        for (date, trail, partners, trees) in SEED_TRIPS {
            log.push(date, trail, partners, trees);
        }
        log
    }

    fn push(&mut self, date: &str, trail: &str, partners: &str, trees: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(TripRecord {
            id,
            date: date.to_string(),
            trail: trail.to_string(),
            partners: partners.to_string(),
            trees_cleared: trees.to_string(),
        });
        id
    }

    /// Appends a blank record seeded with the given date and returns its
    /// id so the caller can put it straight into edit mode.
    pub fn add_blank(&mut self, date: &str) -> u64 {
        self.push(date, "", "", "")
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&TripRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Replaces the fields of the record with the given id. The id itself
    /// never changes. Returns false when no such record exists.
    pub fn update(&mut self, id: u64, updated: TripRecord) -> bool {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.date = updated.date;
                record.trail = updated.trail;
                record.partners = updated.partners;
                record.trees_cleared = updated.trees_cleared;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    /// Sorted copy of the log. The sort is stable, so records that compare
    /// equal keep their insertion order in either direction.
    pub fn sorted(&self, key: TripSortKey, descending: bool) -> Vec<TripRecord> {
        let mut view = self.records.clone();
        view.sort_by(|a, b| {
            let ordering = match key {
                TripSortKey::Date => a.date.cmp(&b.date),
                TripSortKey::Trail => a.trail.to_lowercase().cmp(&b.trail.to_lowercase()),
                TripSortKey::Trees => {
                    parse_trees(&a.trees_cleared).cmp(&parse_trees(&b.trees_cleared))
                }
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        view
    }

    pub fn totals(&self) -> TripTotals {
        TripTotals {
            trips: self.records.len(),
            trees: self
                .records
                .iter()
                .map(|record| parse_trees(&record.trees_cleared))
                .sum(),
        }
    }

    pub fn from_stored(stored: Vec<StoredTrip>) -> Self {
        let mut log = TripLog::default();
        for trip in stored {
            log.push(&trip.date, &trip.trail, &trip.partners, &trip.trees_cleared);
        }
        log
    }

    pub fn to_stored(&self) -> Vec<StoredTrip> {
        self.records
            .iter()
            .map(|record| StoredTrip {
                date: record.date.clone(),
                trail: record.trail.clone(),
                partners: record.partners.clone(),
                trees_cleared: record.trees_cleared.clone(),
            })
            .collect()
    }
}

/// Wire format for one persisted trip. Field names are fixed by the
/// existing stored data, including the camelCase `treesCleared`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTrip {
    pub date: String,
    pub trail: String,
    pub partners: String,
    pub trees_cleared: String,
}

/// First-run journal contents, persisted immediately so later loads are
/// stable.
const SEED_TRIPS: [(&str, &str, &str, &str); 4] = [
    ("2024-05-18", "Young Gulch", "S. Alvarez", "7"),
    ("2024-06-16", "Hewlett Gulch", "M. Okafor, J. Pruett", "12"),
    ("2024-07-04", "Greyrock Trail", "", "3"),
    ("2024-09-21", "Mount McConnel", "D. Whitfield", ""),
];

pub fn serialize_trips(log: &TripLog) -> Result<String, String> {
    serde_json::to_string_pretty(&log.to_stored())
        .map_err(|error| format!("Trip serialize error: {}", error))
}

pub fn deserialize_trips(contents: &str) -> Result<TripLog, String> {
    let stored: Vec<StoredTrip> = serde_json::from_str(contents)
        .map_err(|error| format!("Trip parse error: {}", error))?;
    Ok(TripLog::from_stored(stored))
}

/// Lenient integer parse for the trees-cleared field: leading digits count,
/// anything blank or non-numeric counts as zero.
pub fn parse_trees(text: &str) -> i64 {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Today's date as zero-padded `YYYY-MM-DD` in local time, the seed value
/// for newly added records.
pub fn today_iso() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// `2024-06-16` rendered as `Jun 16, 2024` for the journal rows. Anything
/// that does not split into a zero-padded ISO date renders unchanged.
pub fn format_trip_date(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3 {
        return date.to_string();
    }

    let month = match parts[1] {
        "01" => "Jan",
        "02" => "Feb",
        "03" => "Mar",
        "04" => "Apr",
        "05" => "May",
        "06" => "Jun",
        "07" => "Jul",
        "08" => "Aug",
        "09" => "Sep",
        "10" => "Oct",
        "11" => "Nov",
        "12" => "Dec",
        _ => return date.to_string(),
    };

    let day = parts[2].trim_start_matches('0');
    if day.is_empty() || parts[0].len() != 4 {
        return date.to_string();
    }

    format!("{} {}, {}", month, day, parts[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(entries: &[(&str, &str, &str, &str)]) -> TripLog {
        let mut log = TripLog::default();
        for (date, trail, partners, trees) in entries {
            log.push(date, trail, partners, trees);
        }
        log
    }

    #[test]
    fn seed_log_has_stable_ids() {
        let log = TripLog::seed();
        let ids: Vec<u64> = log.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn add_blank_seeds_date_and_returns_fresh_id() {
        let mut log = TripLog::seed();
        let id = log.add_blank("2025-03-02");
        let record = log.get(id).unwrap();
        assert_eq!(record.date, "2025-03-02");
        assert_eq!(record.trail, "");
        assert_eq!(record.partners, "");
        assert_eq!(record.trees_cleared, "");
        assert!(log.records().iter().filter(|r| r.id == id).count() == 1);
    }

    #[test]
    fn newest_date_sorts_to_head_descending() {
        let mut log = TripLog::seed();
        let id = log.add_blank("2025-01-01");
        let sorted = log.sorted(TripSortKey::Date, true);
        assert_eq!(sorted.first().map(|r| r.id), Some(id));
    }

    #[test]
    fn date_sort_ascending_is_chronological() {
        let log = TripLog::seed();
        let sorted = log.sorted(TripSortKey::Date, false);
        let dates: Vec<&str> = sorted.iter().map(|r| r.date.as_str()).collect();
        let mut expected = dates.clone();
        expected.sort();
        assert_eq!(dates, expected);
    }

    #[test]
    fn trail_sort_is_case_insensitive() {
        let log = log_with(&[
            ("2024-01-01", "young gulch", "", ""),
            ("2024-01-02", "Big South", "", ""),
            ("2024-01-03", "GREYROCK TRAIL", "", ""),
        ]);
        let sorted = log.sorted(TripSortKey::Trail, false);
        let trails: Vec<&str> = sorted.iter().map(|r| r.trail.as_str()).collect();
        assert_eq!(trails, vec!["Big South", "GREYROCK TRAIL", "young gulch"]);
    }

    #[test]
    fn trees_sort_compares_parsed_integers() {
        let log = log_with(&[
            ("2024-01-01", "a", "", "9"),
            ("2024-01-02", "b", "", "41"),
            ("2024-01-03", "c", "", ""),
        ]);
        let sorted = log.sorted(TripSortKey::Trees, true);
        let trees: Vec<&str> = sorted.iter().map(|r| r.trees_cleared.as_str()).collect();
        assert_eq!(trees, vec!["41", "9", ""]);
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let log = log_with(&[
            ("2024-06-16", "Hewlett Gulch", "first", "1"),
            ("2024-06-16", "Hewlett Gulch", "second", "2"),
        ]);
        for descending in [false, true] {
            let sorted = log.sorted(TripSortKey::Date, descending);
            assert_eq!(sorted[0].partners, "first");
            assert_eq!(sorted[1].partners, "second");
        }
    }

    #[test]
    fn update_targets_only_the_given_id() {
        // Two records share date and trail text; editing the one displayed
        // second must leave the first untouched.
        let mut log = log_with(&[
            ("2024-06-16", "Hewlett Gulch", "first crew", "5"),
            ("2024-06-16", "Hewlett Gulch", "second crew", "6"),
        ]);
        let sorted = log.sorted(TripSortKey::Date, true);
        let second_id = sorted[1].id;

        let mut edited = sorted[1].clone();
        edited.trees_cleared = "99".to_string();
        assert!(log.update(second_id, edited));

        let first = &log.records()[0];
        let second = &log.records()[1];
        assert_eq!(first.partners, "first crew");
        assert_eq!(first.trees_cleared, "5");
        assert_eq!(second.partners, "second crew");
        assert_eq!(second.trees_cleared, "99");
    }

    #[test]
    fn remove_targets_only_the_given_id() {
        let mut log = log_with(&[
            ("2024-06-16", "Hewlett Gulch", "first crew", "5"),
            ("2024-06-16", "Hewlett Gulch", "second crew", "6"),
        ]);
        let sorted = log.sorted(TripSortKey::Date, true);
        assert!(log.remove(sorted[1].id));
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].partners, "first crew");
    }

    #[test]
    fn update_unknown_id_is_a_noop() {
        let mut log = TripLog::seed();
        let before: Vec<TripRecord> = log.records().to_vec();
        let draft = before[0].clone();
        assert!(!log.update(999, draft));
        assert_eq!(log.records(), before.as_slice());
    }

    #[test]
    fn totals_sum_parsed_trees() {
        let log = log_with(&[
            ("2024-01-01", "a", "", "2"),
            ("2024-01-02", "b", "", ""),
            ("2024-01-03", "c", "", "41"),
        ]);
        let totals = log.totals();
        assert_eq!(totals.trips, 3);
        assert_eq!(totals.trees, 43);
    }

    #[test]
    fn parse_trees_handles_blank_and_garbage() {
        assert_eq!(parse_trees(""), 0);
        assert_eq!(parse_trees("   "), 0);
        assert_eq!(parse_trees("a dozen"), 0);
        assert_eq!(parse_trees("12"), 12);
        assert_eq!(parse_trees(" 8 "), 8);
        assert_eq!(parse_trees("15 or so"), 15);
    }

    #[test]
    fn round_trip_preserves_order_and_fields() {
        let log = TripLog::seed();
        let serialized = serialize_trips(&log).unwrap();
        let reloaded = deserialize_trips(&serialized).unwrap();
        assert_eq!(reloaded.to_stored(), log.to_stored());
    }

    #[test]
    fn stored_format_uses_camel_case_trees_field() {
        let log = log_with(&[("2024-06-16", "Hewlett Gulch", "", "12")]);
        let serialized = serialize_trips(&log).unwrap();
        assert!(serialized.contains("\"treesCleared\""));
        assert!(!serialized.contains("trees_cleared"));
        assert!(!serialized.contains("\"id\""));
    }

    #[test]
    fn deserialize_rejects_malformed_payload() {
        assert!(deserialize_trips("not json").is_err());
        assert!(deserialize_trips("{\"date\":\"x\"}").is_err());
    }

    #[test]
    fn today_iso_is_zero_padded() {
        let today = today_iso();
        assert_eq!(today.len(), 10);
        let parts: Vec<&str> = today.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 2);
    }

    #[test]
    fn format_trip_date_renders_month_names() {
        assert_eq!(format_trip_date("2024-06-16"), "Jun 16, 2024");
        assert_eq!(format_trip_date("2024-01-05"), "Jan 5, 2024");
        assert_eq!(format_trip_date("2024-12-31"), "Dec 31, 2024");
    }

    #[test]
    fn format_trip_date_passes_through_non_iso_text() {
        assert_eq!(format_trip_date(""), "");
        assert_eq!(format_trip_date("mid June"), "mid June");
        assert_eq!(format_trip_date("2024-13-01"), "2024-13-01");
    }

    #[test]
    fn trip_sort_default_is_newest_first() {
        let sort = TripSort::default();
        assert_eq!(sort.key, TripSortKey::Date);
        assert!(sort.descending);
    }
}
