//! Meditation content types.
//!
//! Items are grouped into one [`MeditationsDoc`] per calendar month. The
//! month an item belongs to is derived from its `day`, so the document that
//! stores an item is always addressable from the item alone.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used by the `day` field.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Slot a meditation is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeditationType {
    /// Morning session.
    Morning,
    /// Evening session.
    Evening,
    /// Anything else (collections, extras). Unknown values read as this.
    #[default]
    #[serde(other)]
    Other,
}

impl MeditationType {
    /// Returns the wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeditationType::Morning => "morning",
            MeditationType::Evening => "evening",
            MeditationType::Other => "other",
        }
    }
}

/// One piece of meditation content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationItem {
    /// Identifier, unique within its month document.
    pub id: String,

    /// Calendar day in `YYYY-MM-DD` form. Decides the owning month document.
    pub day: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub about: String,

    /// Relative path to the audio asset.
    #[serde(default)]
    pub audio: String,

    /// Relative path to the cover image.
    #[serde(default)]
    pub cover: String,

    #[serde(rename = "type", default)]
    pub kind: MeditationType,
}

impl MeditationItem {
    /// Creates an item with empty text fields.
    pub fn new(id: impl Into<String>, day: impl Into<String>, kind: MeditationType) -> Self {
        Self {
            id: id.into(),
            day: day.into(),
            title: String::new(),
            text: String::new(),
            about: String::new(),
            audio: String::new(),
            cover: String::new(),
            kind,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Parses `day` into a date, if it is a valid calendar day.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.day, DAY_FORMAT).ok()
    }

    /// Returns the month document this item belongs to.
    pub fn month_key(&self) -> Option<MonthKey> {
        MonthKey::from_day(&self.day)
    }
}

/// Address of a month document: one calendar month of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Creates a key, rejecting months outside `1..=12` and years outside
    /// `1..=9999` (the range a four-digit file name can express).
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// Returns the key for the month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Derives the key from a `YYYY-MM-DD` day string.
    pub fn from_day(day: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(day, DAY_FORMAT).ok()?;
        Self::new(date.year(), date.month())
    }

    /// File name of the month document, e.g. `2025-09.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self)
    }

    /// Parses a file name produced by [`MonthKey::file_name`].
    pub fn parse_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".json")?;
        let (year, month) = stem.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// All meditation items of one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationsDoc {
    #[serde(default)]
    pub items: Vec<MeditationItem>,

    /// Incremented on every write of the document.
    #[serde(default)]
    pub revision: u64,
}

impl MeditationsDoc {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds an item by ID.
    pub fn get(&self, id: &str) -> Option<&MeditationItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Replaces the item with the same ID in place, or appends it.
    ///
    /// Returns `true` if an existing item was replaced.
    pub fn upsert(&mut self, item: MeditationItem) -> bool {
        match self.items.iter().position(|existing| existing.id == item.id) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => {
                self.items.push(item);
                false
            }
        }
    }

    /// Removes every item with the given ID. Returns `true` if any was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Returns the first item of the given type.
    pub fn first_of(&self, kind: MeditationType) -> Option<&MeditationItem> {
        self.items.iter().find(|item| item.kind == kind)
    }
}

/// Exact-day morning and evening matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayPick<'a> {
    pub morning: Option<&'a MeditationItem>,
    pub evening: Option<&'a MeditationItem>,
}

/// Picks the items whose `day` equals `date` for the morning and evening slots.
///
/// A slot is `None` when no item of that type is scheduled for exactly that
/// day, even if other days have items.
pub fn pick_today(items: &[MeditationItem], date: NaiveDate) -> TodayPick<'_> {
    let day = date.format(DAY_FORMAT).to_string();
    let find = |kind: MeditationType| {
        items
            .iter()
            .find(|item| item.day == day && item.kind == kind)
    };
    TodayPick {
        morning: find(MeditationType::Morning),
        evening: find(MeditationType::Evening),
    }
}

/// Today's items with the "never show an empty slot" fallback applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodaySelection<'a> {
    pub morning: Option<&'a MeditationItem>,
    pub evening: Option<&'a MeditationItem>,
}

impl<'a> TodaySelection<'a> {
    /// Selects today's items, falling back per slot to the first item of the
    /// same type in the document when nothing is scheduled for `date`.
    pub fn resolve(doc: &'a MeditationsDoc, date: NaiveDate) -> Self {
        let exact = pick_today(&doc.items, date);
        Self {
            morning: exact
                .morning
                .or_else(|| doc.first_of(MeditationType::Morning)),
            evening: exact
                .evening
                .or_else(|| doc.first_of(MeditationType::Evening)),
        }
    }

    /// Returns the selected item for a slot.
    pub fn slot(&self, kind: MeditationType) -> Option<&'a MeditationItem> {
        match kind {
            MeditationType::Morning => self.morning,
            MeditationType::Evening => self.evening,
            MeditationType::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
    }

    #[test]
    fn test_item_deserializes_with_missing_text_fields() {
        let json = r#"{"id":"x1","day":"2025-09-03","type":"morning","title":"T"}"#;
        let item: MeditationItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "x1");
        assert_eq!(item.kind, MeditationType::Morning);
        assert_eq!(item.title, "T");
        assert!(item.audio.is_empty());
    }

    #[test]
    fn test_unknown_type_reads_as_other() {
        let json = r#"{"id":"x2","day":"2025-09-03","type":"afternoon"}"#;
        let item: MeditationItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, MeditationType::Other);
    }

    #[test]
    fn test_item_serializes_type_field() {
        let item = MeditationItem::new("x1", "2025-09-03", MeditationType::Evening);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "evening");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_month_key_from_day() {
        assert_eq!(
            MonthKey::from_day("2025-09-03"),
            Some(MonthKey { year: 2025, month: 9 })
        );
        assert_eq!(MonthKey::from_day("2025-13-01"), None);
        assert_eq!(MonthKey::from_day("2025-02-30"), None);
        assert_eq!(MonthKey::from_day("not a day"), None);
    }

    #[test]
    fn test_month_key_bounds() {
        assert!(MonthKey::new(2025, 0).is_none());
        assert!(MonthKey::new(2025, 13).is_none());
        assert!(MonthKey::new(0, 1).is_none());
        assert!(MonthKey::new(2025, 12).is_some());
    }

    #[test]
    fn test_month_key_file_name() {
        let key = MonthKey::new(2025, 9).unwrap();
        assert_eq!(key.file_name(), "2025-09.json");
        assert_eq!(MonthKey::parse_file_name("2025-09.json"), Some(key));
        assert_eq!(MonthKey::parse_file_name("2025-9.json"), None);
        assert_eq!(MonthKey::parse_file_name("2025-09.txt"), None);
        assert_eq!(MonthKey::parse_file_name("../etc.json"), None);
    }

    #[test]
    fn test_doc_upsert_replaces_in_place() {
        let mut doc = MeditationsDoc::new();
        doc.upsert(MeditationItem::new("a", "2025-09-01", MeditationType::Morning));
        doc.upsert(MeditationItem::new("b", "2025-09-01", MeditationType::Evening));
        doc.upsert(MeditationItem::new("c", "2025-09-02", MeditationType::Morning));

        let replaced = doc.upsert(
            MeditationItem::new("b", "2025-09-05", MeditationType::Evening).with_title("new"),
        );

        assert!(replaced);
        assert_eq!(doc.items.len(), 3);
        assert_eq!(doc.items[1].id, "b");
        assert_eq!(doc.items[1].title, "new");
        assert_eq!(doc.items[1].day, "2025-09-05");
    }

    #[test]
    fn test_doc_remove_absent_is_noop() {
        let mut doc = MeditationsDoc::new();
        doc.upsert(MeditationItem::new("a", "2025-09-01", MeditationType::Morning));
        let before = doc.clone();

        assert!(!doc.remove("missing"));
        assert_eq!(doc, before);
        assert!(doc.remove("a"));
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_doc_without_revision_defaults_to_zero() {
        let doc: MeditationsDoc = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert_eq!(doc.revision, 0);
    }

    #[test]
    fn test_pick_today_exact_match() {
        let items = vec![
            MeditationItem::new("m1", "2025-09-03", MeditationType::Morning),
            MeditationItem::new("e1", "2025-09-03", MeditationType::Evening),
            MeditationItem::new("m2", "2025-09-04", MeditationType::Morning),
        ];

        let pick = pick_today(&items, date("2025-09-03"));
        assert_eq!(pick.morning.map(|i| i.id.as_str()), Some("m1"));
        assert_eq!(pick.evening.map(|i| i.id.as_str()), Some("e1"));

        let pick = pick_today(&items, date("2025-09-04"));
        assert_eq!(pick.morning.map(|i| i.id.as_str()), Some("m2"));
        assert!(pick.evening.is_none());
    }

    #[test]
    fn test_pick_today_no_match_for_other_days() {
        let items = vec![
            MeditationItem::new("m1", "2025-09-03", MeditationType::Morning),
            MeditationItem::new("o1", "2025-09-10", MeditationType::Other),
        ];

        let pick = pick_today(&items, date("2025-09-10"));
        assert!(pick.morning.is_none());
        assert!(pick.evening.is_none());
    }

    #[test]
    fn test_today_selection_falls_back_to_first_of_type() {
        let mut doc = MeditationsDoc::new();
        doc.upsert(MeditationItem::new("m1", "2025-09-01", MeditationType::Morning));
        doc.upsert(MeditationItem::new("m2", "2025-09-02", MeditationType::Morning));
        doc.upsert(MeditationItem::new("e2", "2025-09-02", MeditationType::Evening));

        let selection = TodaySelection::resolve(&doc, date("2025-09-02"));
        assert_eq!(selection.morning.map(|i| i.id.as_str()), Some("m2"));
        assert_eq!(selection.evening.map(|i| i.id.as_str()), Some("e2"));

        let selection = TodaySelection::resolve(&doc, date("2025-09-20"));
        assert_eq!(selection.morning.map(|i| i.id.as_str()), Some("m1"));
        assert_eq!(selection.evening.map(|i| i.id.as_str()), Some("e2"));
        assert_eq!(
            selection.slot(MeditationType::Evening).map(|i| i.id.as_str()),
            Some("e2")
        );
    }

    #[test]
    fn test_today_selection_empty_doc() {
        let doc = MeditationsDoc::new();
        let selection = TodaySelection::resolve(&doc, date("2025-09-02"));
        assert!(selection.morning.is_none());
        assert!(selection.evening.is_none());
    }
}
