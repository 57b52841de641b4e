use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// ========================================
/// Schedule records as exchanged with the REST API
/// ========================================

/// Candidate values per template variable, keyed by variable name.
pub type PromptVariables = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    /// Accepts full names and three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == needle || (needle.len() == 3 && d.as_str().starts_with(&needle)))
            .ok_or_else(|| format!("unknown weekday: {s}"))
    }
}

impl TryFrom<String> for Weekday {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    #[default]
    Daily,
    Weekly,
}

impl FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(ScheduleType::Daily),
            "weekly" => Ok(ScheduleType::Weekly),
            other => Err(format!("unknown schedule type: {other}")),
        }
    }
}

/// When a schedule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Recurrence {
    Daily {
        time: String,
        timezone: String,
    },
    Weekly {
        time: String,
        timezone: String,
        #[serde(default)]
        days: BTreeSet<Weekday>,
    },
}

impl Recurrence {
    pub fn time(&self) -> &str {
        match self {
            Recurrence::Daily { time, .. } | Recurrence::Weekly { time, .. } => time,
        }
    }

    pub fn timezone(&self) -> &str {
        match self {
            Recurrence::Daily { timezone, .. } | Recurrence::Weekly { timezone, .. } => timezone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub id: String,
    pub emails: Vec<String>,
    pub email_title: String,
    pub prompt: String,
    #[serde(default)]
    pub prompt_variables: PromptVariables,
    pub schedule: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Body of a non-2xx API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn weekly_record_uses_camel_case_and_tagged_schedule() {
        let rec = ScheduleRecord {
            id: "1".into(),
            emails: vec!["bob@x.com".into()],
            email_title: "Hi {{name}}".into(),
            prompt: "Greet {{name}}".into(),
            prompt_variables: PromptVariables::from([("name".to_string(), vec!["Bob".to_string()])]),
            schedule: Recurrence::Weekly {
                time: "09:00".into(),
                timezone: "UTC".into(),
                days: BTreeSet::from([Weekday::Friday, Weekday::Monday]),
            },
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            v,
            json!({
                "id": "1",
                "emails": ["bob@x.com"],
                "emailTitle": "Hi {{name}}",
                "prompt": "Greet {{name}}",
                "promptVariables": { "name": ["Bob"] },
                "schedule": { "type": "weekly", "time": "09:00", "timezone": "UTC", "days": ["monday", "friday"] },
                "endDate": "2024-03-01"
            })
        );
    }

    #[test]
    fn daily_record_from_backend_tolerates_days_and_missing_variables() {
        let v = json!({
            "id": "42",
            "emails": ["ann@x.com"],
            "emailTitle": "Daily digest",
            "prompt": "Say hi",
            "schedule": { "type": "daily", "time": "07:30", "timezone": "Europe/Paris", "days": [] }
        });
        let rec: ScheduleRecord = serde_json::from_value(v).unwrap();
        assert!(matches!(rec.schedule, Recurrence::Daily { .. }));
        assert_eq!(rec.schedule.time(), "07:30");
        assert!(rec.prompt_variables.is_empty());
        assert!(rec.start_date.is_none());
    }

    #[test]
    fn weekly_days_decode_capitalised_and_abbreviated_names() {
        let v = json!({ "type": "weekly", "time": "08:00", "timezone": "UTC", "days": ["Monday", "fri", "MONDAY"] });
        let rec: Recurrence = serde_json::from_value(v).unwrap();
        match rec {
            Recurrence::Weekly { days, .. } => {
                assert_eq!(days, BTreeSet::from([Weekday::Monday, Weekday::Friday]))
            }
            other => panic!("expected weekly, got {other:?}"),
        }

        let bad = json!({ "type": "weekly", "time": "08:00", "timezone": "UTC", "days": ["funday"] });
        let err = serde_json::from_value::<Recurrence>(bad).unwrap_err();
        assert!(err.to_string().contains("unknown weekday: funday"));
        assert_eq!(serde_json::to_value(Weekday::Tuesday).unwrap(), json!("tuesday"));
    }

    #[test]
    fn weekday_parses_names_and_abbreviations() {
        assert_eq!("Monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("sun".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("funday".parse::<Weekday>().is_err());
        assert!("m".parse::<Weekday>().is_err());
    }
}
