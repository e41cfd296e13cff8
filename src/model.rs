use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Literal shown for any field the server could not provide.
pub const PLACEHOLDER: &str = "N/A";

/// Literal shown for fields of rows still waiting on the server.
pub const PENDING: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    Success,
    Error,
    Fetching,
    #[default]
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Error => "Error",
            Status::Fetching => "Fetching",
            Status::Unknown => "Unknown",
        }
    }

    fn from_wire(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("success") {
            Status::Success
        } else if s.eq_ignore_ascii_case("error") {
            Status::Error
        } else if s.eq_ignore_ascii_case("fetching") {
            Status::Fetching
        } else {
            Status::Unknown
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Status::from_wire(&s),
            _ => Status::Unknown,
        })
    }
}

/// One server-produced outcome for one submitted URL.
///
/// Decoding never fails on a single field: `"N/A"`, `null`, blank strings and
/// values of the wrong type all become `None`. Encoding writes `None` back as
/// `"N/A"` so JSON exports look like the server's own payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrapeResult {
    #[serde(default, deserialize_with = "de_input_url")]
    pub input_url: String,

    #[serde(default, deserialize_with = "de_text", serialize_with = "ser_text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "de_count", serialize_with = "ser_count")]
    pub duration_seconds: Option<u64>,

    #[serde(default, deserialize_with = "de_text", serialize_with = "ser_text")]
    pub duration_hhmmss: Option<String>,

    #[serde(default, deserialize_with = "de_count", serialize_with = "ser_count")]
    pub views: Option<u64>,

    #[serde(default, deserialize_with = "de_text", serialize_with = "ser_text")]
    pub upload_date: Option<String>,

    #[serde(default, deserialize_with = "de_text", serialize_with = "ser_text")]
    pub channel_url: Option<String>,

    #[serde(default, deserialize_with = "de_text", serialize_with = "ser_text")]
    pub channel_name: Option<String>,

    #[serde(default, deserialize_with = "de_count", serialize_with = "ser_count")]
    pub subscribers: Option<u64>,

    #[serde(default)]
    pub status: Status,

    #[serde(default, deserialize_with = "de_text")]
    pub error: Option<String>,
}

impl ScrapeResult {
    /// A row standing in for `url` while the batch request is in flight.
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            input_url: url.into(),
            status: Status::Fetching,
            ..Self::default()
        }
    }

    /// The formatted duration, derived from the seconds when the server left it out.
    pub fn duration_text(&self) -> Option<String> {
        self.duration_hhmmss
            .clone()
            .or_else(|| self.duration_seconds.map(seconds_to_hhmmss))
    }
}

/// `HH:MM:SS` when the duration reaches an hour, `MM:SS` otherwise.
pub fn seconds_to_hhmmss(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default, deserialize_with = "de_results")]
    pub results: Vec<ScrapeResult>,
}

fn de_input_url<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == PLACEHOLDER {
                None
            } else {
                Some(s)
            }
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    })
}

// Each record is decoded on its own so one malformed entry keeps its slot.
fn de_results<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ScrapeResult>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::from_value(v).unwrap_or_else(|e| {
                log::warn!("Result record {} is malformed: {}", i, e);
                ScrapeResult::default()
            })
        })
        .collect())
}

fn ser_text<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(PLACEHOLDER))
}

fn ser_count<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(n) => serializer.serialize_u64(*n),
        None => serializer.serialize_str(PLACEHOLDER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_full_success_record() {
        let r: ScrapeResult = serde_json::from_value(json!({
            "input_url": "https://vk.com/video-1_2",
            "title": "Clip",
            "duration_seconds": 184,
            "duration_hhmmss": "03:04",
            "views": 1200,
            "upload_date": "01-02-2024 10:00",
            "channel_url": "https://vk.com/club1",
            "channel_name": "Club",
            "subscribers": 77,
            "status": "Success",
            "error": null
        }))
        .unwrap();

        assert_eq!(r.title.as_deref(), Some("Clip"));
        assert_eq!(r.duration_seconds, Some(184));
        assert_eq!(r.views, Some(1200));
        assert_eq!(r.subscribers, Some(77));
        assert_eq!(r.status, Status::Success);
        assert_eq!(r.error, None);
    }

    #[test]
    fn placeholder_strings_and_wrong_types_become_absent() {
        let r: ScrapeResult = serde_json::from_value(json!({
            "input_url": "u",
            "title": "N/A",
            "duration_seconds": "N/A",
            "views": -5,
            "upload_date": "   ",
            "subscribers": 3.5,
            "status": "Error",
            "error": "timed out"
        }))
        .unwrap();

        assert_eq!(r.title, None);
        assert_eq!(r.duration_seconds, None);
        assert_eq!(r.views, None);
        assert_eq!(r.upload_date, None);
        assert_eq!(r.subscribers, None);
        assert_eq!(r.channel_url, None);
        assert_eq!(r.status, Status::Error);
        assert_eq!(r.error.as_deref(), Some("timed out"));
    }

    #[test]
    fn digit_strings_are_accepted_as_counts() {
        let r: ScrapeResult = serde_json::from_value(json!({ "views": "42" })).unwrap();
        assert_eq!(r.views, Some(42));
    }

    #[test]
    fn unknown_or_missing_status_is_unknown() {
        let r: ScrapeResult = serde_json::from_value(json!({ "status": "Suspended" })).unwrap();
        assert_eq!(r.status, Status::Unknown);
        let r: ScrapeResult = serde_json::from_value(json!({ "status": null })).unwrap();
        assert_eq!(r.status, Status::Unknown);
        let r: ScrapeResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(r.status, Status::Unknown);
        assert_eq!(r.input_url, "");
    }

    #[test]
    fn response_without_results_is_empty() {
        let resp: ScrapeResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.results.is_empty());
        let resp: ScrapeResponse = serde_json::from_str(r#"{"results": null}"#).unwrap();
        assert!(resp.results.is_empty());
    }

    #[test]
    fn malformed_record_keeps_its_position() {
        let resp: ScrapeResponse = serde_json::from_value(json!({
            "results": [{ "input_url": "a" }, "garbage", { "input_url": "c" }]
        }))
        .unwrap();
        assert_eq!(resp.results.len(), 3);
        assert_eq!(resp.results[1], ScrapeResult::default());
        assert_eq!(resp.results[2].input_url, "c");
    }

    #[test]
    fn absent_fields_encode_as_placeholder() {
        let value = serde_json::to_value(ScrapeResult::pending("u")).unwrap();
        assert_eq!(value["title"], json!("N/A"));
        assert_eq!(value["views"], json!("N/A"));
        assert_eq!(value["status"], json!("Fetching"));
        assert_eq!(value["error"], Value::Null);
    }

    #[test]
    fn formats_durations_like_the_server() {
        assert_eq!(seconds_to_hhmmss(0), "00:00");
        assert_eq!(seconds_to_hhmmss(184), "03:04");
        assert_eq!(seconds_to_hhmmss(3600), "01:00:00");
        assert_eq!(seconds_to_hhmmss(45296), "12:34:56");
    }

    #[test]
    fn duration_text_falls_back_to_seconds() {
        let r = ScrapeResult {
            duration_seconds: Some(65),
            ..ScrapeResult::default()
        };
        assert_eq!(r.duration_text().as_deref(), Some("01:05"));

        let r = ScrapeResult {
            duration_seconds: Some(65),
            duration_hhmmss: Some("1:05".to_string()),
            ..ScrapeResult::default()
        };
        assert_eq!(r.duration_text().as_deref(), Some("1:05"));
    }
}
