//! The fixed trail catalog for the Canyon Lakes Ranger District, plus the
//! search/filter engine and the free-text trail-name matcher.

use bevy::prelude::*;

use crate::geo::LatLon;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
    VeryDifficult,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Difficult => "Difficult",
            Difficulty::VeryDifficult => "Very Difficult",
        }
    }
}

/// The side-panel filter tag. `Trips` swaps the panel over to the patrol
/// journal and filters the map like `All` so every marker stays visible.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum DifficultyTag {
    #[default]
    All,
    Easy,
    Moderate,
    Difficult,
    Trips,
}

impl DifficultyTag {
    pub fn label(self) -> &'static str {
        match self {
            DifficultyTag::All => "All",
            DifficultyTag::Easy => "Easy",
            DifficultyTag::Moderate => "Moderate",
            DifficultyTag::Difficult => "Difficult",
            DifficultyTag::Trips => "Trips",
        }
    }

    pub fn allows(self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyTag::All | DifficultyTag::Trips => true,
            DifficultyTag::Easy => difficulty == Difficulty::Easy,
            DifficultyTag::Moderate => difficulty == Difficulty::Moderate,
            DifficultyTag::Difficult => difficulty == Difficulty::Difficult,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    pub id: &'static str,
    pub name: &'static str,
    pub difficulty: Difficulty,
    pub length: &'static str,
    pub elevation_gain: &'static str,
    pub trailhead_elevation: &'static str,
    pub coordinate: LatLon,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub season: &'static str,
    pub permit_required: bool,
}

#[derive(Resource)]
pub struct Catalog {
    pub trails: Vec<Trail>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            trails: district_trails(),
        }
    }
}

impl Catalog {
    pub fn by_id(&self, id: &str) -> Option<&Trail> {
        self.trails.iter().find(|trail| trail.id == id)
    }
}

/// The full catalog, in display order. Reference data only; nothing in the
/// application mutates these records.
pub fn district_trails() -> Vec<Trail> {
    vec![
        Trail {
            id: "greyrock",
            name: "Greyrock Trail",
            difficulty: Difficulty::Difficult,
            length: "6.7 mi round trip",
            elevation_gain: "2,009 ft",
            trailhead_elevation: "5,560 ft",
            coordinate: LatLon::new(40.6964, -105.2859),
            description: "Classic Poudre Canyon climb to a granite dome with \
                          sweeping views of the plains and the Mummy Range. \
                          Steep switchbacks and slab scrambling near the summit.",
            features: &["Summit views", "Rock scrambling", "Meadow loop option"],
            season: "Apr - Nov",
            permit_required: false,
        },
        Trail {
            id: "greyrock-meadows",
            name: "Greyrock Meadows",
            difficulty: Difficulty::Moderate,
            length: "7.2 mi loop",
            elevation_gain: "1,750 ft",
            trailhead_elevation: "5,560 ft",
            coordinate: LatLon::new(40.6975, -105.2958),
            description: "Gentler western approach to Greyrock through open \
                          park-like meadows, usually combined with the summit \
                          trail for a loop.",
            features: &["Meadows", "Wildflowers", "Loop hike"],
            season: "Apr - Nov",
            permit_required: false,
        },
        Trail {
            id: "hewlett-gulch",
            name: "Hewlett Gulch",
            difficulty: Difficulty::Easy,
            length: "8.5 mi out and back",
            elevation_gain: "900 ft",
            trailhead_elevation: "5,780 ft",
            coordinate: LatLon::new(40.6902, -105.3052),
            description: "Mellow gulch walk with repeated creek crossings and \
                          strong wildflower displays in regrowth from the old \
                          burn. Popular with trail runners.",
            features: &["Creek crossings", "Wildflowers", "Burn-area regrowth"],
            season: "Year-round",
            permit_required: false,
        },
        Trail {
            id: "young-gulch",
            name: "Young Gulch",
            difficulty: Difficulty::Moderate,
            length: "9.4 mi out and back",
            elevation_gain: "1,250 ft",
            trailhead_elevation: "5,990 ft",
            coordinate: LatLon::new(40.6598, -105.3555),
            description: "Rebuilt after flood and fire damage, the trail winds \
                          up a narrow gulch crossing the creek dozens of times \
                          between granite walls.",
            features: &["Creek crossings", "Canyon walls", "Rebuilt tread"],
            season: "May - Oct",
            permit_required: false,
        },
        Trail {
            id: "mount-mcconnel",
            name: "Mount McConnel",
            difficulty: Difficulty::Moderate,
            length: "4.1 mi loop",
            elevation_gain: "1,240 ft",
            trailhead_elevation: "6,720 ft",
            coordinate: LatLon::new(40.6788, -105.4687),
            description: "Compact wilderness loop above the Poudre with summit \
                          views up-canyon. The upper section climbs through \
                          fire-scarred ponderosa.",
            features: &["Wilderness loop", "River overlooks", "Summit register"],
            season: "May - Nov",
            permit_required: false,
        },
        Trail {
            id: "kreutzer",
            name: "Kreutzer Nature Trail",
            difficulty: Difficulty::Easy,
            length: "2.7 mi loop",
            elevation_gain: "520 ft",
            trailhead_elevation: "6,720 ft",
            coordinate: LatLon::new(40.6793, -105.4703),
            description: "Interpretive loop on the lower slopes of Mount \
                          McConnel, signed for the district's first forest \
                          ranger. Good first hike for families.",
            features: &["Interpretive signs", "Family friendly", "River views"],
            season: "May - Nov",
            permit_required: false,
        },
        Trail {
            id: "dadd-gulch",
            name: "Dadd Gulch",
            difficulty: Difficulty::Easy,
            length: "4.8 mi out and back",
            elevation_gain: "950 ft",
            trailhead_elevation: "6,360 ft",
            coordinate: LatLon::new(40.6921, -105.5292),
            description: "Quiet drainage walk on an old stock driveway, shaded \
                          by aspen and narrowleaf cottonwood. Reliable shoulder \
                          season choice.",
            features: &["Aspen", "Quiet drainage", "Horse friendly"],
            season: "Apr - Nov",
            permit_required: false,
        },
        Trail {
            id: "browns-lake",
            name: "Browns Lake",
            difficulty: Difficulty::Moderate,
            length: "8.4 mi out and back",
            elevation_gain: "1,100 ft",
            trailhead_elevation: "10,480 ft",
            coordinate: LatLon::new(40.6550, -105.6210),
            description: "High start on Crown Point Road, crossing alpine \
                          tundra before dropping to a pair of cirque lakes \
                          below Crown Point.",
            features: &["Alpine tundra", "Cirque lakes", "Fishing"],
            season: "Jul - Sep",
            permit_required: true,
        },
        Trail {
            id: "emmaline-lake",
            name: "Emmaline Lake",
            difficulty: Difficulty::Difficult,
            length: "11.4 mi out and back",
            elevation_gain: "2,550 ft",
            trailhead_elevation: "8,960 ft",
            coordinate: LatLon::new(40.6289, -105.6492),
            description: "Long valley approach past Cirque Meadows to a rocky \
                          lake basin beneath the Mummy Range headwall. Upper \
                          basin holds snow into July.",
            features: &["Cirque Meadows", "Alpine lake", "Waterfalls"],
            season: "Jul - Sep",
            permit_required: true,
        },
        Trail {
            id: "big-south",
            name: "Big South",
            difficulty: Difficulty::Difficult,
            length: "13.5 mi out and back",
            elevation_gain: "1,900 ft",
            trailhead_elevation: "8,440 ft",
            coordinate: LatLon::new(40.6424, -105.8095),
            description: "Follows the wild upper Poudre through a deep granite \
                          canyon along the wilderness boundary. Rough tread and \
                          several talus crossings.",
            features: &["Wild river", "Granite canyon", "Backpacking"],
            season: "Jun - Oct",
            permit_required: true,
        },
        Trail {
            id: "mount-margaret",
            name: "Mount Margaret",
            difficulty: Difficulty::Easy,
            length: "7.4 mi out and back",
            elevation_gain: "550 ft",
            trailhead_elevation: "7,860 ft",
            coordinate: LatLon::new(40.8031, -105.5013),
            description: "Rolling Red Feather Lakes country through meadows and \
                          granite outcrops to a low summit overlooking the Lone \
                          Pine valley. Mostly level walking.",
            features: &["Meadows", "Granite outcrops", "Mountain biking"],
            season: "Year-round",
            permit_required: false,
        },
        Trail {
            id: "dowdy-lake",
            name: "Dowdy Lake Shoreline",
            difficulty: Difficulty::Easy,
            length: "2.5 mi loop",
            elevation_gain: "120 ft",
            trailhead_elevation: "8,120 ft",
            coordinate: LatLon::new(40.8097, -105.5686),
            description: "Flat shoreline circuit of the largest Red Feather \
                          lake, weaving between granite knobs and lakeside \
                          campsites.",
            features: &["Lakeshore", "Family friendly", "Fishing"],
            season: "Year-round",
            permit_required: false,
        },
        Trail {
            id: "lady-moon",
            name: "Lady Moon",
            difficulty: Difficulty::Easy,
            length: "5.1 mi loop",
            elevation_gain: "480 ft",
            trailhead_elevation: "8,040 ft",
            coordinate: LatLon::new(40.7870, -105.5160),
            description: "Easy loop across historic ranch meadows named for a \
                          colorful homesteader, linking with the Mount Margaret \
                          trail network.",
            features: &["Ranch history", "Meadows", "Loop hike"],
            season: "Year-round",
            permit_required: false,
        },
        Trail {
            id: "north-lone-pine",
            name: "North Lone Pine",
            difficulty: Difficulty::Moderate,
            length: "7.0 mi out and back",
            elevation_gain: "1,050 ft",
            trailhead_elevation: "8,300 ft",
            coordinate: LatLon::new(40.8434, -105.5750),
            description: "Lightly traveled descent into the North Lone Pine \
                          drainage through mixed conifer, with granite domes \
                          above the creek.",
            features: &["Solitude", "Granite domes", "Creek"],
            season: "May - Nov",
            permit_required: false,
        },
        Trail {
            id: "stormy-peaks",
            name: "Stormy Peaks",
            difficulty: Difficulty::VeryDifficult,
            length: "11.5 mi out and back",
            elevation_gain: "3,340 ft",
            trailhead_elevation: "9,060 ft",
            coordinate: LatLon::new(40.5651, -105.5871),
            description: "Sustained climb out of Pingree Park over the Stormy \
                          Peaks pass into the park boundary country. Exposed \
                          above treeline for the final two miles.",
            features: &["Alpine pass", "Exposed ridgeline", "Backpacking"],
            season: "Jul - Sep",
            permit_required: true,
        },
        Trail {
            id: "signal-mountain",
            name: "Signal Mountain",
            difficulty: Difficulty::VeryDifficult,
            length: "12.0 mi out and back",
            elevation_gain: "3,150 ft",
            trailhead_elevation: "8,020 ft",
            coordinate: LatLon::new(40.5858, -105.4514),
            description: "Relentless ridge climb from the Pennock Pass road to \
                          a double summit with the best unbroken view of the \
                          district's high country.",
            features: &["Double summit", "Ridge walking", "Solitude"],
            season: "Jun - Oct",
            permit_required: false,
        },
    ]
}

/// Filter engine. Pure function of its inputs: keeps catalog order, never
/// re-ranks. A record passes when the tag allows its difficulty and the
/// query (if any) substring-matches its name, difficulty label, or any
/// feature tag, case-insensitively.
pub fn filter_trails<'a>(trails: &'a [Trail], query: &str, tag: DifficultyTag) -> Vec<&'a Trail> {
    let needle = query.trim().to_lowercase();

    trails
        .iter()
        .filter(|trail| tag.allows(trail.difficulty))
        .filter(|trail| {
            if needle.is_empty() {
                return true;
            }

            trail.name.to_lowercase().contains(&needle)
                || trail.difficulty.label().to_lowercase().contains(&needle)
                || trail
                    .features
                    .iter()
                    .any(|feature| feature.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Best-effort match from a trip record's free-text trail name to a catalog
/// entry, for map centering. First match wins, in catalog order:
/// exact equality, then either-contains-the-other, then any token longer
/// than two characters appearing in the catalog name. All comparisons are
/// case-insensitive. Blank text matches nothing.
pub fn match_trail_name<'a>(trails: &'a [Trail], text: &str) -> Option<&'a Trail> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(trail) = trails
        .iter()
        .find(|trail| trail.name.to_lowercase() == needle)
    {
        return Some(trail);
    }

    if let Some(trail) = trails.iter().find(|trail| {
        let name = trail.name.to_lowercase();
        name.contains(&needle) || needle.contains(&name)
    }) {
        return Some(trail);
    }

    trails.iter().find(|trail| {
        let name = trail.name.to_lowercase();
        needle
            .split_whitespace()
            .filter(|token| token.len() > 2)
            .any(|token| name.contains(token))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Trail> {
        district_trails()
    }

    #[test]
    fn catalog_ids_are_unique() {
        let trails = sample();
        for (i, a) in trails.iter().enumerate() {
            for b in &trails[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn catalog_coordinates_inside_district() {
        use crate::geo::DISTRICT_BOUNDS;
        for trail in sample() {
            assert!(
                DISTRICT_BOUNDS.contains(trail.coordinate),
                "{} lies outside the district frame",
                trail.name
            );
        }
    }

    #[test]
    fn filter_empty_query_all_tag_returns_everything() {
        let trails = sample();
        let filtered = filter_trails(&trails, "", DifficultyTag::All);
        assert_eq!(filtered.len(), trails.len());
    }

    #[test]
    fn filter_preserves_catalog_order() {
        let trails = sample();
        let filtered = filter_trails(&trails, "", DifficultyTag::Easy);
        let mut last_index = 0;
        for trail in filtered {
            let index = trails.iter().position(|t| t.id == trail.id).unwrap();
            assert!(index >= last_index);
            last_index = index;
        }
    }

    #[test]
    fn filter_is_a_subsequence_of_the_catalog() {
        let trails = sample();
        let filtered = filter_trails(&trails, "lake", DifficultyTag::All);
        let mut catalog_iter = trails.iter();
        for wanted in &filtered {
            assert!(catalog_iter.any(|t| t.id == wanted.id));
        }
    }

    #[test]
    fn filter_query_matches_name_case_insensitively() {
        let trails = sample();
        let filtered = filter_trails(&trails, "GREYROCK", DifficultyTag::All);
        assert!(filtered.iter().any(|t| t.id == "greyrock"));
        assert!(filtered.iter().any(|t| t.id == "greyrock-meadows"));
    }

    #[test]
    fn filter_query_matches_difficulty_label() {
        let trails = sample();
        let filtered = filter_trails(&trails, "very difficult", DifficultyTag::All);
        assert!(!filtered.is_empty());
        assert!(filtered
            .iter()
            .all(|t| t.difficulty == Difficulty::VeryDifficult));
    }

    #[test]
    fn filter_query_matches_feature_tags() {
        let trails = sample();
        let filtered = filter_trails(&trails, "wildflower", DifficultyTag::All);
        assert!(filtered.iter().any(|t| t.id == "hewlett-gulch"));
    }

    #[test]
    fn filter_tag_and_query_combine() {
        let trails = sample();
        let both = filter_trails(&trails, "creek", DifficultyTag::Moderate);
        assert!(both.iter().all(|t| t.difficulty == Difficulty::Moderate));
        assert!(both.iter().any(|t| t.id == "young-gulch"));
        assert!(!both.iter().any(|t| t.id == "hewlett-gulch"));
    }

    #[test]
    fn filter_mismatched_tag_hides_matching_name() {
        let trails = sample();
        let filtered = filter_trails(&trails, "hewlett", DifficultyTag::Difficult);
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_trips_tag_behaves_like_all() {
        let trails = sample();
        let all = filter_trails(&trails, "", DifficultyTag::All);
        let trips = filter_trails(&trails, "", DifficultyTag::Trips);
        assert_eq!(all.len(), trips.len());
    }

    #[test]
    fn filter_is_idempotent_for_fixed_inputs() {
        let trails = sample();
        let first: Vec<&str> = filter_trails(&trails, "gulch", DifficultyTag::All)
            .iter()
            .map(|t| t.id)
            .collect();
        let second: Vec<&str> = filter_trails(&trails, "gulch", DifficultyTag::All)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn tag_allows_matches_difficulty() {
        assert!(DifficultyTag::All.allows(Difficulty::VeryDifficult));
        assert!(DifficultyTag::Trips.allows(Difficulty::Easy));
        assert!(DifficultyTag::Easy.allows(Difficulty::Easy));
        assert!(!DifficultyTag::Easy.allows(Difficulty::Moderate));
        assert!(!DifficultyTag::Difficult.allows(Difficulty::VeryDifficult));
    }

    #[test]
    fn difficulty_labels_match_display_strings() {
        assert_eq!(Difficulty::Easy.label(), "Easy");
        assert_eq!(Difficulty::VeryDifficult.label(), "Very Difficult");
    }

    #[test]
    fn match_exact_name_wins() {
        let trails = sample();
        let found = match_trail_name(&trails, "hewlett gulch").unwrap();
        assert_eq!(found.id, "hewlett-gulch");
    }

    #[test]
    fn match_containment_either_direction() {
        let trails = sample();
        let found = match_trail_name(&trails, "Greyrock").unwrap();
        assert_eq!(found.id, "greyrock");

        let found = match_trail_name(&trails, "the Mount McConnel summit loop").unwrap();
        assert_eq!(found.id, "mount-mcconnel");
    }

    #[test]
    fn match_token_fallback() {
        let trails = sample();
        let found = match_trail_name(&trails, "cleared logs near emmaline").unwrap();
        assert_eq!(found.id, "emmaline-lake");
    }

    #[test]
    fn match_token_ignores_short_tokens() {
        let trails = sample();
        // "mt" is two characters; only "margaret" should drive the match.
        let found = match_trail_name(&trails, "mt margaret").unwrap();
        assert_eq!(found.id, "mount-margaret");
    }

    #[test]
    fn match_blank_text_is_none() {
        let trails = sample();
        assert!(match_trail_name(&trails, "").is_none());
        assert!(match_trail_name(&trails, "   ").is_none());
    }

    #[test]
    fn match_unknown_text_is_none() {
        let trails = sample();
        assert!(match_trail_name(&trails, "zzzz nowhere ridge").is_none());
    }

    #[test]
    fn match_ties_break_by_catalog_order() {
        let trails = sample();
        // "gulch" token matches several entries; Hewlett Gulch is first in
        // catalog order among them.
        let found = match_trail_name(&trails, "gulch brushing").unwrap();
        assert_eq!(found.id, "hewlett-gulch");
    }

    #[test]
    fn catalog_by_id_lookup() {
        let catalog = Catalog::default();
        assert!(catalog.by_id("greyrock").is_some());
        assert!(catalog.by_id("missing").is_none());
    }
}
