use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    /// Sowing date, stored as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub watered: bool,
    pub pesticide: bool,
    pub fertilizer: bool,
    #[serde(default)]
    pub moved: bool,
}

impl Plant {
    pub fn new(name: String, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            date,
            watered: false,
            pesticide: false,
            fertilizer: false,
            moved: false,
        }
    }

    /// Whole days since sowing, floor-divided. The sowing date counts from
    /// midnight UTC, so a plant sown later than `now` has a negative age.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        let sown = self.date.and_time(chrono::NaiveTime::MIN).and_utc();
        let elapsed = now - sown;
        elapsed.num_seconds().div_euclid(86_400)
    }

    pub fn mark(&mut self, action: CareAction) {
        match action {
            CareAction::Water => self.watered = true,
            CareAction::Pesticide => self.pesticide = true,
            CareAction::Fertilizer => self.fertilizer = true,
            CareAction::Move => self.moved = true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CareAction {
    Water,
    Pesticide,
    Fertilizer,
    Move,
}

impl CareAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CareAction::Water => "water",
            CareAction::Pesticide => "pesticide",
            CareAction::Fertilizer => "fertilizer",
            CareAction::Move => "move",
        }
    }
}

impl fmt::Display for CareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    /// Creation time as a local display string.
    pub date: String,
    pub plant_id: Uuid,
    pub action: CareAction,
    pub repeat_days: Option<u32>,
    /// Never set; the done-today marker decides whether a card is handled.
    #[serde(default)]
    pub done: bool,
}

impl Notification {
    pub fn new(
        title: String,
        message: String,
        plant_id: Uuid,
        action: CareAction,
        repeat_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            message,
            date: now.with_timezone(&Local).format("%d/%m/%Y, %H.%M.%S").to_string(),
            plant_id,
            action,
            repeat_days,
            done: false,
        }
    }
}

/// Desktop notification permission, mirroring the browser's three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "granted" => Permission::Granted,
            "denied" => Permission::Denied,
            _ => Permission::Default,
        }
    }
}

/// Capitalizes the first character and lowercases the rest.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn capitalize_only_first_letter() {
        assert_eq!(capitalize("tOMAT ceri"), "Tomat ceri");
        assert_eq!(capitalize("cabai"), "Cabai");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn age_is_floor_of_elapsed_days() {
        let plant = Plant::new("Tomat".into(), NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 23, 59, 0).unwrap();
        assert_eq!(plant.age_days(now), 14);
        let early = Utc.with_ymd_and_hms(2026, 10, 15, 0, 0, 0).unwrap();
        assert_eq!(plant.age_days(early), 14);
        let before = Utc.with_ymd_and_hms(2026, 9, 30, 12, 0, 0).unwrap();
        assert_eq!(plant.age_days(before), -1);
    }

    #[test]
    fn plant_without_moved_flag_deserializes() {
        let json = r#"{
            "id": "7f1c0c3e-9d0a-4f53-8a4e-0b8e4c2f6a11",
            "name": "Cabai",
            "date": "2026-10-01",
            "watered": true,
            "pesticide": false,
            "fertilizer": false
        }"#;
        let plant: Plant = serde_json::from_str(json).unwrap();
        assert!(plant.watered);
        assert!(!plant.moved);
    }

    #[test]
    fn action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CareAction::Fertilizer).unwrap(), "\"fertilizer\"");
        let action: CareAction = serde_json::from_str("\"move\"").unwrap();
        assert_eq!(action, CareAction::Move);
    }
}
