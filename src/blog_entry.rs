use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    #[serde(default)]
    pub author: String,
}

/// Body of a create request. Identity, creation time and author are assigned
/// by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBlogEntry {
    pub title: String,
    pub content: String,
    pub hashtags: Vec<String>,
}

/// One editable row of the hashtag list on the create screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDraft {
    pub name: String,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn to_iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Re-renders an existing creation time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
/// Missing or unparseable input falls back to `now`.
pub fn normalize_time_created(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let time = raw.and_then(parse_timestamp).unwrap_or(now);
    to_iso(time)
}

/// Label shown under an entry: the calendar date in `tz`, then the UTC
/// time of day.
pub fn created_label<Tz>(raw: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match raw.and_then(parse_timestamp) {
        Some(time) => format!(
            "{} {} UTC",
            time.with_timezone(tz).format("%-m/%-d/%Y"),
            time.format("%H:%M")
        ),
        None => "Invalid Date".to_string(),
    }
}

impl BlogEntry {
    /// Builds the replacement sent on save: empty tags stripped, creation
    /// time normalized, id and author untouched.
    pub fn to_replacement(&self, now: DateTime<Utc>) -> BlogEntry {
        BlogEntry {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            hashtags: crate::tags::non_empty(&self.hashtags),
            time_created: Some(normalize_time_created(self.time_created.as_deref(), now)),
            author: self.author.clone(),
        }
    }
}

impl NewBlogEntry {
    pub fn from_draft(title: &str, content: &str, tags: &[TagDraft]) -> Self {
        let names: Vec<String> = tags.iter().map(|tag| tag.name.clone()).collect();
        NewBlogEntry {
            title: title.to_string(),
            content: content.to_string(),
            hashtags: crate::tags::non_empty(&names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap()
    }

    #[test]
    fn normalize_keeps_existing_iso_timestamp() {
        let raw = "2023-05-01T10:00:00.000Z";
        assert_eq!(normalize_time_created(Some(raw), fixed_now()), raw);
    }

    #[test]
    fn normalize_adds_millis_to_backend_instant() {
        assert_eq!(
            normalize_time_created(Some("2023-05-01T10:00:00Z"), fixed_now()),
            "2023-05-01T10:00:00.000Z"
        );
        assert_eq!(
            normalize_time_created(Some("2023-05-01T12:00:00+02:00"), fixed_now()),
            "2023-05-01T10:00:00.000Z"
        );
    }

    #[test]
    fn normalize_truncates_sub_millisecond_precision() {
        assert_eq!(
            normalize_time_created(Some("2023-05-01T10:00:00.123456789Z"), fixed_now()),
            "2023-05-01T10:00:00.123Z"
        );
    }

    #[test]
    fn normalize_accepts_naive_timestamp_as_utc() {
        assert_eq!(
            normalize_time_created(Some("2023-05-01T10:00:00.5"), fixed_now()),
            "2023-05-01T10:00:00.500Z"
        );
    }

    #[test]
    fn normalize_falls_back_to_now() {
        assert_eq!(
            normalize_time_created(None, fixed_now()),
            "2024-02-03T04:05:06.000Z"
        );
        assert_eq!(
            normalize_time_created(Some("yesterday"), fixed_now()),
            "2024-02-03T04:05:06.000Z"
        );
    }

    #[test]
    fn created_label_uses_local_date_and_utc_time() {
        let raw = Some("2023-01-01T23:30:00.000Z");
        assert_eq!(created_label(raw, &Utc), "1/1/2023 23:30 UTC");

        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(created_label(raw, &east), "1/2/2023 23:30 UTC");
    }

    #[test]
    fn created_label_reports_invalid_dates() {
        assert_eq!(created_label(None, &Utc), "Invalid Date");
        assert_eq!(created_label(Some("soon"), &Utc), "Invalid Date");
    }

    #[test]
    fn entry_uses_camel_case_wire_names() {
        let json = r#"{"id":"42","title":"T","content":"C","hashtags":["x"],"timeCreated":"2023-01-01T00:00:00.000Z","author":"bob"}"#;
        let entry: BlogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "42");
        assert_eq!(entry.time_created.as_deref(), Some("2023-01-01T00:00:00.000Z"));
        assert_eq!(entry.author, "bob");

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["timeCreated"], "2023-01-01T00:00:00.000Z");
        assert!(value.get("time_created").is_none());
    }

    #[test]
    fn entry_tolerates_missing_optional_fields() {
        let entry: BlogEntry = serde_json::from_str(r#"{"id":"7","title":"only"}"#).unwrap();
        assert!(entry.time_created.is_none());
        assert!(entry.hashtags.is_empty());
        assert_eq!(entry.author, "");
    }

    #[test]
    fn replacement_preserves_identity_and_strips_empty_tags() {
        let entry = BlogEntry {
            id: "1".into(),
            title: "T".into(),
            content: "C".into(),
            hashtags: vec!["a".into(), "".into(), "b".into()],
            time_created: Some("2023-05-01T10:00:00Z".into()),
            author: "alice".into(),
        };
        let replacement = entry.to_replacement(fixed_now());
        assert_eq!(replacement.id, "1");
        assert_eq!(replacement.author, "alice");
        assert_eq!(replacement.hashtags, vec!["a", "b"]);
        assert_eq!(
            replacement.time_created.as_deref(),
            Some("2023-05-01T10:00:00.000Z")
        );
    }

    #[test]
    fn new_entry_from_draft_filters_empty_tags() {
        let tags: Vec<TagDraft> = ["a", "", "b", ""]
            .iter()
            .map(|name| TagDraft {
                name: name.to_string(),
            })
            .collect();
        let entry = NewBlogEntry::from_draft("T", "C", &tags);
        assert_eq!(entry.hashtags, vec!["a", "b"]);
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("timeCreated").is_none());
    }
}
