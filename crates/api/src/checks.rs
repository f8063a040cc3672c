//! Consistency checks for tournament settings.
//!
//! Every check is a pure function over the proposed values: it returns `None`
//! when the values are acceptable or `Some(message)` with a human-readable
//! explanation of the first violated rule. Resolvers merge partial updates
//! into the current record, run the relevant checks, and reject the write on
//! the first message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

pub const TEAM_SIZE_MAX: i32 = 8;
pub const MULTIPLIER_MIN: f64 = 0.1;
pub const MULTIPLIER_MAX: f64 = 5.0;
pub const MODPOOL_MAP_COUNT_MAX: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMod {
    EZ,
    NF,
    HT,
    HD,
    HR,
    SD,
    PF,
    DT,
    NC,
    FL,
}

impl GameMod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMod::EZ => "EZ",
            GameMod::NF => "NF",
            GameMod::HT => "HT",
            GameMod::HD => "HD",
            GameMod::HR => "HR",
            GameMod::SD => "SD",
            GameMod::PF => "PF",
            GameMod::DT => "DT",
            GameMod::NC => "NC",
            GameMod::FL => "FL",
        }
    }
}

/// Mod pairs that cannot be enabled together.
const INCOMPATIBLE_MODS: &[(GameMod, GameMod)] = &[
    (GameMod::EZ, GameMod::HR),
    (GameMod::DT, GameMod::HT),
    (GameMod::NC, GameMod::HT),
    (GameMod::DT, GameMod::NC),
    (GameMod::SD, GameMod::NF),
    (GameMod::PF, GameMod::NF),
    (GameMod::SD, GameMod::PF),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModMultiplier {
    pub mods: Vec<GameMod>,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentLink {
    pub label: String,
    pub url: String,
}

/// A labeled date range shown on the tournament page (e.g. "Screening phase").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateWindow {
    pub label: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFieldKind {
    ShortText,
    LongText,
    Number,
    Select,
    Checkbox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    pub kind: FormFieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub options: Vec<String>,
}

pub fn team_size(min: i32, max: i32) -> Option<String> {
    if min < 1 {
        return Some("Minimum team size must be at least 1".into());
    }
    if max > TEAM_SIZE_MAX {
        return Some(format!("Maximum team size can't exceed {TEAM_SIZE_MAX}"));
    }
    if min > max {
        return Some(format!(
            "Minimum team size ({min}) can't be greater than the maximum ({max})"
        ));
    }
    None
}

pub fn rank_range(lower: Option<i32>, upper: Option<i32>) -> Option<String> {
    match (lower, upper) {
        (None, None) => None,
        (Some(_), None) | (None, Some(_)) => {
            Some("A rank range needs both a lower and an upper bound".into())
        }
        (Some(lower), Some(upper)) => {
            if lower < 1 {
                return Some("The lower rank bound must be at least 1".into());
            }
            if lower > upper {
                return Some(format!(
                    "The lower rank bound ({lower}) can't be greater than the upper bound ({upper})"
                ));
            }
            None
        }
    }
}

/// Named milestones in their required chronological order. Absent dates are
/// skipped; every present pair must be ordered.
pub fn date_order(milestones: &[(&str, Option<DateTime<Utc>>)]) -> Option<String> {
    let present: Vec<(&str, DateTime<Utc>)> = milestones
        .iter()
        .filter_map(|(label, at)| at.map(|at| (*label, at)))
        .collect();

    for pair in present.windows(2) {
        let (earlier_label, earlier) = pair[0];
        let (later_label, later) = pair[1];
        if earlier > later {
            return Some(format!("{earlier_label} must come before {later_label}"));
        }
    }

    None
}

pub fn other_dates(windows: &[DateWindow]) -> Option<String> {
    let mut labels = HashSet::new();

    for window in windows {
        if window.label.trim().is_empty() {
            return Some("Date labels can't be empty".into());
        }
        if !labels.insert(window.label.to_lowercase()) {
            return Some(format!("Duplicate date label: \"{}\"", window.label));
        }
        if window.from > window.to {
            return Some(format!(
                "\"{}\" ends before it starts",
                window.label
            ));
        }
    }

    None
}

pub fn links(links: &[TournamentLink]) -> Option<String> {
    let mut labels = HashSet::new();

    for link in links {
        if link.label.trim().is_empty() {
            return Some("Link labels can't be empty".into());
        }
        if !labels.insert(link.label.to_lowercase()) {
            return Some(format!("Duplicate link label: \"{}\"", link.label));
        }
        if Url::parse(&link.url).is_err() {
            return Some(format!("\"{}\" is not a valid URL", link.url));
        }
    }

    None
}

/// Valid mod combination: non-empty, no duplicates, no contradictory pairs.
pub fn mod_combination(mods: &[GameMod]) -> Option<String> {
    if mods.is_empty() {
        return Some("A mod multiplier needs at least one mod".into());
    }

    let mut seen = HashSet::new();
    for game_mod in mods {
        if !seen.insert(*game_mod) {
            return Some(format!("Duplicate mod: {}", game_mod.as_str()));
        }
    }

    for (a, b) in INCOMPATIBLE_MODS {
        if seen.contains(a) && seen.contains(b) {
            return Some(format!(
                "{} and {} can't be combined",
                a.as_str(),
                b.as_str()
            ));
        }
    }

    None
}

pub fn mod_multipliers(multipliers: &[ModMultiplier]) -> Option<String> {
    let mut combos = HashSet::new();

    for rule in multipliers {
        if let Some(message) = mod_combination(&rule.mods) {
            return Some(message);
        }

        // Order-insensitive: HD+HR and HR+HD are the same rule.
        let mut key: Vec<&str> = rule.mods.iter().map(GameMod::as_str).collect();
        key.sort_unstable();
        if !combos.insert(key.join("")) {
            let combo: Vec<&str> = rule.mods.iter().map(GameMod::as_str).collect();
            return Some(format!(
                "Duplicate multiplier for mod combination {}",
                combo.join("")
            ));
        }

        if !(MULTIPLIER_MIN..=MULTIPLIER_MAX).contains(&rule.multiplier) {
            return Some(format!(
                "Multipliers must be between {MULTIPLIER_MIN} and {MULTIPLIER_MAX}"
            ));
        }
    }

    None
}

/// Categories are keyed by the modpool naming convention (NM, HD, ... TB).
pub const MODPOOL_CATEGORIES: &[&str] = &["NM", "HD", "HR", "DT", "FM", "EZ", "FL", "TB"];

pub fn modpools(pools: &[(String, i32)]) -> Option<String> {
    let mut categories = HashSet::new();

    for (category, map_count) in pools {
        if !MODPOOL_CATEGORIES.contains(&category.as_str()) {
            return Some(format!("Unknown modpool category: \"{category}\""));
        }
        if !categories.insert(category.clone()) {
            return Some(format!("Duplicate modpool category: {category}"));
        }
        if *map_count < 1 || *map_count > MODPOOL_MAP_COUNT_MAX {
            return Some(format!(
                "Modpools must hold between 1 and {MODPOOL_MAP_COUNT_MAX} maps"
            ));
        }
        if category == "TB" && *map_count != 1 {
            return Some("The tiebreaker pool holds exactly one map".into());
        }
    }

    None
}

pub fn form_fields(fields: &[FormField]) -> Option<String> {
    let mut ids = HashSet::new();
    let mut labels = HashSet::new();

    for field in fields {
        if field.id.trim().is_empty() || field.label.trim().is_empty() {
            return Some("Form fields need an id and a label".into());
        }
        if !ids.insert(field.id.clone()) {
            return Some(format!("Duplicate form field id: \"{}\"", field.id));
        }
        if !labels.insert(field.label.to_lowercase()) {
            return Some(format!("Duplicate form field label: \"{}\"", field.label));
        }

        match field.kind {
            FormFieldKind::Select => {
                if field.options.is_empty() {
                    return Some(format!(
                        "Select field \"{}\" needs at least one option",
                        field.label
                    ));
                }
                let mut options = HashSet::new();
                for option in &field.options {
                    if !options.insert(option.to_lowercase()) {
                        return Some(format!(
                            "Select field \"{}\" has a duplicate option: \"{option}\"",
                            field.label
                        ));
                    }
                }
            }
            FormFieldKind::Number => {
                if let (Some(min), Some(max)) = (field.min, field.max) {
                    if min > max {
                        return Some(format!(
                            "Number field \"{}\" has its minimum above its maximum",
                            field.label
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    None
}

/// Validate a submitted answer map against the form's field definitions.
pub fn form_answers(
    fields: &[FormField],
    answers: &serde_json::Map<String, serde_json::Value>,
) -> Option<String> {
    for key in answers.keys() {
        if !fields.iter().any(|field| &field.id == key) {
            return Some(format!("Unknown form field: \"{key}\""));
        }
    }

    for field in fields {
        let answer = answers.get(&field.id);

        let Some(answer) = answer.filter(|value| !value.is_null()) else {
            if field.required {
                return Some(format!("\"{}\" is required", field.label));
            }
            continue;
        };

        match field.kind {
            FormFieldKind::ShortText | FormFieldKind::LongText => {
                if !answer.is_string() {
                    return Some(format!("\"{}\" expects text", field.label));
                }
            }
            FormFieldKind::Number => {
                let Some(value) = answer.as_f64() else {
                    return Some(format!("\"{}\" expects a number", field.label));
                };
                if field.min.is_some_and(|min| value < min)
                    || field.max.is_some_and(|max| value > max)
                {
                    return Some(format!("\"{}\" is out of bounds", field.label));
                }
            }
            FormFieldKind::Select => {
                let Some(value) = answer.as_str() else {
                    return Some(format!("\"{}\" expects one of its options", field.label));
                };
                if !field.options.iter().any(|option| option == value) {
                    return Some(format!(
                        "\"{value}\" is not an option for \"{}\"",
                        field.label
                    ));
                }
            }
            FormFieldKind::Checkbox => {
                if !answer.is_boolean() {
                    return Some(format!("\"{}\" expects true or false", field.label));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn team_size_bounds() {
        assert!(team_size(1, 4).is_none());
        assert!(team_size(3, 3).is_none());
        assert!(team_size(4, 2).is_some());
        assert!(team_size(0, 4).is_some());
        assert!(team_size(1, 9).is_some());
    }

    #[test]
    fn rank_range_bounds() {
        assert!(rank_range(None, None).is_none());
        assert!(rank_range(Some(1000), Some(50000)).is_none());
        assert!(rank_range(Some(50000), Some(1000)).is_some());
        assert!(rank_range(Some(1000), None).is_some());
        assert!(rank_range(Some(0), Some(1000)).is_some());
    }

    #[test]
    fn milestones_must_be_chronological() {
        assert!(date_order(&[
            ("Publication", Some(at(1))),
            ("Player registrations opening", Some(at(5))),
            ("Player registrations closing", Some(at(10))),
        ])
        .is_none());

        let message = date_order(&[
            ("Publication", Some(at(5))),
            ("Player registrations opening", Some(at(1))),
        ])
        .unwrap();
        assert!(message.contains("Publication must come before"));

        // Absent milestones don't block the ones around them.
        assert!(date_order(&[
            ("Publication", Some(at(1))),
            ("Staff registrations opening", None),
            ("Conclusion", Some(at(20))),
        ])
        .is_none());
    }

    #[test]
    fn date_window_ordering_and_labels() {
        let ok = vec![
            DateWindow {
                label: "Screening".into(),
                from: at(1),
                to: at(3),
            },
            DateWindow {
                label: "Seeding".into(),
                from: at(3),
                to: at(5),
            },
        ];
        assert!(other_dates(&ok).is_none());

        let inverted = vec![DateWindow {
            label: "Screening".into(),
            from: at(5),
            to: at(2),
        }];
        assert!(other_dates(&inverted).is_some());

        let duplicated = vec![
            DateWindow {
                label: "Screening".into(),
                from: at(1),
                to: at(2),
            },
            DateWindow {
                label: "screening".into(),
                from: at(3),
                to: at(4),
            },
        ];
        assert!(other_dates(&duplicated).unwrap().contains("Duplicate"));
    }

    #[test]
    fn link_labels_unique_and_urls_parse() {
        let ok = vec![
            TournamentLink {
                label: "Discord".into(),
                url: "https://discord.gg/abc".into(),
            },
            TournamentLink {
                label: "Forum post".into(),
                url: "https://osu.ppy.sh/community/forums/topics/1".into(),
            },
        ];
        assert!(links(&ok).is_none());

        let duplicated = vec![
            TournamentLink {
                label: "Discord".into(),
                url: "https://discord.gg/abc".into(),
            },
            TournamentLink {
                label: "discord".into(),
                url: "https://discord.gg/def".into(),
            },
        ];
        assert!(links(&duplicated).unwrap().contains("Duplicate link label"));

        let invalid = vec![TournamentLink {
            label: "Discord".into(),
            url: "not a url".into(),
        }];
        assert!(links(&invalid).unwrap().contains("not a valid URL"));
    }

    #[test]
    fn ez_hr_cannot_coexist() {
        let message = mod_combination(&[GameMod::EZ, GameMod::HR]).unwrap();
        assert!(message.contains("EZ") && message.contains("HR"));
    }

    #[test]
    fn speed_mods_cannot_coexist() {
        assert!(mod_combination(&[GameMod::DT, GameMod::HT]).is_some());
        assert!(mod_combination(&[GameMod::NC, GameMod::HT]).is_some());
        assert!(mod_combination(&[GameMod::HD, GameMod::HR]).is_none());
    }

    #[test]
    fn duplicate_mods_rejected() {
        assert!(mod_combination(&[GameMod::HD, GameMod::HD]).is_some());
        assert!(mod_combination(&[]).is_some());
    }

    #[test]
    fn multiplier_rules() {
        let ok = vec![
            ModMultiplier {
                mods: vec![GameMod::HD],
                multiplier: 1.06,
            },
            ModMultiplier {
                mods: vec![GameMod::HD, GameMod::HR],
                multiplier: 1.12,
            },
        ];
        assert!(mod_multipliers(&ok).is_none());

        // Same combination in a different order counts as a duplicate.
        let duplicated = vec![
            ModMultiplier {
                mods: vec![GameMod::HD, GameMod::HR],
                multiplier: 1.1,
            },
            ModMultiplier {
                mods: vec![GameMod::HR, GameMod::HD],
                multiplier: 1.2,
            },
        ];
        assert!(mod_multipliers(&duplicated).unwrap().contains("Duplicate"));

        let out_of_bounds = vec![ModMultiplier {
            mods: vec![GameMod::FL],
            multiplier: 9.0,
        }];
        assert!(mod_multipliers(&out_of_bounds).is_some());
    }

    #[test]
    fn modpool_categories() {
        assert!(modpools(&[("NM".into(), 5), ("HD".into(), 3), ("TB".into(), 1)]).is_none());
        assert!(modpools(&[("NM".into(), 5), ("NM".into(), 2)])
            .unwrap()
            .contains("Duplicate"));
        assert!(modpools(&[("XX".into(), 2)]).unwrap().contains("Unknown"));
        assert!(modpools(&[("TB".into(), 2)]).is_some());
        assert!(modpools(&[("NM".into(), 0)]).is_some());
    }

    fn select_field() -> FormField {
        FormField {
            id: "playstyle".into(),
            label: "Playstyle".into(),
            kind: FormFieldKind::Select,
            required: true,
            min: None,
            max: None,
            options: vec!["Mouse".into(), "Tablet".into()],
        }
    }

    #[test]
    fn form_field_definitions() {
        assert!(form_fields(&[select_field()]).is_none());

        let mut no_options = select_field();
        no_options.options.clear();
        assert!(form_fields(&[no_options]).unwrap().contains("option"));

        let duplicated = vec![select_field(), select_field()];
        assert!(form_fields(&duplicated).unwrap().contains("Duplicate"));

        let inverted_bounds = FormField {
            id: "hours".into(),
            label: "Weekly hours".into(),
            kind: FormFieldKind::Number,
            required: false,
            min: Some(10.0),
            max: Some(2.0),
            options: vec![],
        };
        assert!(form_fields(&[inverted_bounds]).is_some());
    }

    #[test]
    fn form_answer_validation() {
        let fields = vec![
            select_field(),
            FormField {
                id: "hours".into(),
                label: "Weekly hours".into(),
                kind: FormFieldKind::Number,
                required: false,
                min: Some(0.0),
                max: Some(100.0),
                options: vec![],
            },
        ];

        let valid: serde_json::Map<String, serde_json::Value> = serde_json::from_value(
            serde_json::json!({"playstyle": "Tablet", "hours": 12}),
        )
        .unwrap();
        assert!(form_answers(&fields, &valid).is_none());

        let missing_required: serde_json::Map<String, serde_json::Value> =
            serde_json::from_value(serde_json::json!({"hours": 12})).unwrap();
        assert!(form_answers(&fields, &missing_required)
            .unwrap()
            .contains("required"));

        let bad_option: serde_json::Map<String, serde_json::Value> =
            serde_json::from_value(serde_json::json!({"playstyle": "Keyboard"})).unwrap();
        assert!(form_answers(&fields, &bad_option).is_some());

        let out_of_bounds: serde_json::Map<String, serde_json::Value> = serde_json::from_value(
            serde_json::json!({"playstyle": "Mouse", "hours": 9000}),
        )
        .unwrap();
        assert!(form_answers(&fields, &out_of_bounds)
            .unwrap()
            .contains("out of bounds"));

        let unknown_field: serde_json::Map<String, serde_json::Value> = serde_json::from_value(
            serde_json::json!({"playstyle": "Mouse", "stamina": 5}),
        )
        .unwrap();
        assert!(form_answers(&fields, &unknown_field)
            .unwrap()
            .contains("Unknown"));
    }
}
