use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::{ids::RecordId, time::format_duration};

use super::namespace::Namespace;

/// One stored item of a list namespace. The payload is flattened, so on disk a record is a single
/// JSON object: `{"id": .., "createdAt": .., "updatedAt": .., ...payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<P> {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: P,
}

/// Payload stored as a list of [Record]s under a fixed namespace.
pub trait RecordPayload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const NAMESPACE: Namespace;
}

/// Single-object value stored wholesale under a fixed namespace.
pub trait Setting: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    const NAMESPACE: Namespace;
}

/// A day of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(with = "report_date")]
    pub date: NaiveDate,
    /// Minutes worked.
    pub duration: u32,
    /// Number of study sessions. Not a duration despite the stored name.
    #[serde(default)]
    pub study_hours: u32,
    #[serde(default)]
    pub observations: String,
}

impl RecordPayload for Report {
    const NAMESPACE: Namespace = Namespace::Reports;
}

/// Partial [Report] for updates; only the fields that are set get merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    #[serde(skip_serializing_if = "Option::is_none", with = "report_date::option")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

impl ReportPatch {
    pub fn is_empty(&self) -> bool {
        *self == ReportPatch::default()
    }
}

/// Reports carry a plain calendar date. Older data may hold a full timestamp instead, which is
/// mapped to the local calendar date it points at.
mod report_date {
    use chrono::{DateTime, Local, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(D::Error::custom)
    }

    pub fn parse(s: &str) -> Result<NaiveDate, String> {
        if let Ok(date) = NaiveDate::parse_from_str(s, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(s)
            .map(|v| v.with_timezone(&Local).date_naive())
            .map_err(|e| format!("invalid report date {s:?}: {e}"))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::Serializer;

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// Monthly goal, kept in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    #[serde(default)]
    pub monthly_hours: u32,
}

impl Goals {
    pub fn from_hours_and_minutes(hours: u32, minutes: u32) -> Self {
        Self {
            monthly_hours: hours.saturating_mul(60).saturating_add(minutes),
        }
    }

    pub fn formatted(&self) -> String {
        format_duration(self.monthly_hours)
    }
}

impl Setting for Goals {
    const NAMESPACE: Namespace = Namespace::Goals;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl PersonalInfo {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }
}

impl Setting for PersonalInfo {
    const NAMESPACE: Namespace = Namespace::PersonalInfo;
}

/// Weekdays are indexed from Sunday, matching the stored representation.
const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Set of weekdays the user usually works on, one bit per day (bit 0 = Sunday). Serialized as an
/// ascending array of indices, 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WorkDays(u8);

impl WorkDays {
    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut value = Self::default();
        for day in days {
            value.insert(day);
        }
        value
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_sunday()
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Days in Sunday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        SUNDAY_FIRST.into_iter().filter(|day| self.contains(*day))
    }
}

impl Display for WorkDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let days = self.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        write!(f, "{}", days.join(", "))
    }
}

impl Serialize for WorkDays {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|v| v.num_days_from_sunday()))
    }
}

impl<'de> Deserialize<'de> for WorkDays {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let indices = Vec::<u8>::deserialize(deserializer)?;
        let mut days = WorkDays::default();
        for index in indices {
            let day = SUNDAY_FIRST.get(index as usize).ok_or_else(|| {
                serde::de::Error::custom(format!("weekday index {index} is outside 0..=6"))
            })?;
            days.insert(*day);
        }
        Ok(days)
    }
}

impl Setting for WorkDays {
    const NAMESPACE: Namespace = Namespace::WorkDays;
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use super::*;

    #[test]
    fn record_is_flat_on_disk() {
        let record = Record {
            id: RecordId::new("abc123"),
            created_at: "2024-04-01T10:00:00Z".parse().unwrap(),
            updated_at: "2024-04-01T10:00:00Z".parse().unwrap(),
            payload: Report {
                date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                duration: 90,
                study_hours: 2,
                observations: "".into(),
            },
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "abc123");
        assert_eq!(value["date"], "2024-04-01");
        assert_eq!(value["studyHours"], 2);
        assert!(value.get("payload").is_none());

        let parsed: Record<Report> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn report_date_accepts_timestamps() {
        let parsed: Report = serde_json::from_str(
            r#"{"date":"2024-04-05T12:00:00.000Z","duration":30,"studyHours":0,"observations":""}"#,
        )
        .unwrap();
        // Noon UTC is the same calendar day in every timezone up to +/-11h.
        assert_eq!(parsed.date.to_string().get(..7), Some("2024-04"));
        assert_eq!(parsed.duration, 30);
    }

    #[test]
    fn report_patch_only_serializes_set_fields() {
        let patch = ReportPatch {
            duration: Some(45),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"duration":45}"#);
        assert!(ReportPatch::default().is_empty());
    }

    #[test]
    fn goals_are_kept_in_minutes() {
        let goals = Goals::from_hours_and_minutes(15, 0);
        assert_eq!(goals.monthly_hours, 900);
        assert_eq!(goals.formatted(), "15:00");
        assert_eq!(Goals::from_hours_and_minutes(20, 30).formatted(), "20:30");
        assert_eq!(serde_json::to_string(&goals).unwrap(), r#"{"monthlyHours":900}"#);
    }

    #[test]
    fn personal_info_is_trimmed() {
        let info = PersonalInfo::new("  Ana ", " ana@example.com\n");
        assert_eq!(info.name, "Ana");
        assert_eq!(info.email, "ana@example.com");
    }

    #[test]
    fn work_days_serialize_as_sorted_indices() {
        let days = WorkDays::from_weekdays([Weekday::Fri, Weekday::Sun, Weekday::Wed, Weekday::Fri]);
        assert_eq!(days.iter().count(), 3);
        assert_eq!(serde_json::to_string(&days).unwrap(), "[0,3,5]");

        let parsed: WorkDays = serde_json::from_str("[5,3,3,0]").unwrap();
        assert_eq!(parsed, days);
        assert!(serde_json::from_str::<WorkDays>("[7]").is_err());
    }

    #[test]
    fn work_days_membership() {
        let mut days = WorkDays::default();
        assert!(days.is_empty());
        days.insert(Weekday::Mon);
        assert!(days.contains(Weekday::Mon));
        assert!(!days.contains(Weekday::Tue));
        assert_eq!(
            WorkDays::from_weekdays([Weekday::Sat, Weekday::Sun]).to_string(),
            "Sun, Sat"
        );
    }
}
