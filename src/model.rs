use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{errors::AppError, Result};

/// User selected query parameters. Unset fields are not sent to the service
/// and are written to the URL fragment with an empty value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub collab: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub formatting: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

impl Filters {
    /// Overwrite every field that is set in `other`.
    pub fn merge(&mut self, other: &Filters) {
        if let Some(collab) = &other.collab {
            self.collab = Some(collab.clone());
        }
        if let Some(date) = &other.date {
            self.date = Some(date.clone());
        }
        if let Some(formatting) = &other.formatting {
            self.formatting = Some(formatting.clone());
        }
    }

    /// All fields in their canonical order, set or not.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 3] {
        [
            ("collab", self.collab.as_deref()),
            ("date", self.date.as_deref()),
            ("formatting", self.formatting.as_deref()),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Institution {
    #[serde(default)]
    pub cite: String,
    #[serde(default)]
    pub city: Option<String>,
}

/// The author list for one formatting mode.
///
/// Fields holding markup (`authors`, `format_text`, `intro_text`, the
/// institution citations, the thanks entries and `acks`) are produced and
/// sanitized by the author list service and rendered without escaping.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AuthorsPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub formatting: String,
    #[serde(default)]
    pub intro_text: Option<String>,
    #[serde(default)]
    pub acks: Option<Vec<String>>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub insts: BTreeMap<String, Institution>,
    #[serde(default)]
    pub sorted_insts: Vec<String>,
    #[serde(default)]
    pub thanks: BTreeMap<String, String>,
    #[serde(default)]
    pub sorted_thanks: Vec<String>,
    #[serde(default)]
    pub authors_by_inst: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub format_text: Option<String>,
    #[serde(default)]
    pub wrap: bool,
    #[serde(default)]
    pub formatting_options: Map<String, Value>,
}

impl AuthorsPayload {
    /// All acknowledgements concatenated, each prefixed with a space.
    pub fn acknowledgements_text(&self) -> String {
        self.acks
            .iter()
            .flatten()
            .map(|ack| format!(" {ack}"))
            .collect()
    }
}

/// A response of the author list service, tagged with the formatting key
/// the payload was stored under.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AuthorsResponse {
    pub active_format: String,
    pub payload: AuthorsPayload,
}

impl AuthorsResponse {
    /// Convert the raw `{ formatting: payload }` mapping the service returns.
    ///
    /// The service is expected to populate exactly one key. If there are
    /// more, the first one in document order is used.
    pub fn from_map(map: Map<String, Value>) -> Result<Self> {
        if map.len() > 1 {
            warn!(
                "Author list response contains {} formats, only the first one is used",
                map.len()
            );
        }
        let (active_format, payload) = map.into_iter().next().ok_or(AppError::EmptyResponse)?;
        let payload: AuthorsPayload = serde_json::from_value(payload)?;
        Ok(Self {
            active_format,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn acknowledgements_concatenated() {
        let payload = AuthorsPayload {
            acks: Some(vec!["x".into(), "y".into()]),
            ..Default::default()
        };
        assert_eq!(" x y", payload.acknowledgements_text());
        assert_eq!("", AuthorsPayload::default().acknowledgements_text());
    }

    #[test]
    fn response_uses_first_key() {
        let map = as_map(json!({
            "web-institution": {"title": "IceCube", "date": "2020-01-01", "formatting": "web-institution"},
            "web": {"title": "Other", "date": "2021-01-01", "formatting": "web"},
        }));
        let response = AuthorsResponse::from_map(map).unwrap();
        assert_eq!("web-institution", response.active_format);
        assert_eq!("IceCube", response.payload.title);
    }

    #[test]
    fn empty_response_rejected() {
        let result = AuthorsResponse::from_map(Map::new());
        assert!(matches!(result, Err(AppError::EmptyResponse)));
    }

    #[test]
    fn web_payload_fields() {
        let map = as_map(json!({
            "web": {
                "title": "IceCube",
                "date": "2020-01-01",
                "formatting": "web",
                "authors": "A. Author<sup>1</sup>",
                "insts": {"inst1": {"cite": "University A, City", "city": "City"}},
                "sorted_insts": ["inst1"],
                "thanks": {"t1": "also at B"},
                "sorted_thanks": ["t1"],
                "acks": ["We thank C."],
                "wrap": false,
                "unknown_field": 42,
            }
        }));
        let payload = AuthorsResponse::from_map(map).unwrap().payload;
        assert_eq!(Some("A. Author<sup>1</sup>".to_string()), payload.authors);
        assert_eq!("University A, City", payload.insts["inst1"].cite);
        assert_eq!(vec!["t1".to_string()], payload.sorted_thanks);
        assert_eq!(" We thank C.", payload.acknowledgements_text());
    }

    #[test]
    fn empty_filter_values_unset() {
        let filters: Filters =
            serde_json::from_value(json!({"collab": "", "date": "2020-01-01"})).unwrap();
        assert_eq!(None, filters.collab);
        assert_eq!(Some("2020-01-01".to_string()), filters.date);
        assert_eq!(None, filters.formatting);
    }

    #[test]
    fn merge_overrides_set_fields() {
        let mut filters = Filters {
            collab: Some("IceCube".into()),
            date: None,
            formatting: Some("web".into()),
        };
        filters.merge(&Filters {
            collab: None,
            date: Some("2020-01-01".into()),
            formatting: Some("arxiv".into()),
        });
        assert_eq!(
            [
                ("collab", Some("IceCube")),
                ("date", Some("2020-01-01")),
                ("formatting", Some("arxiv"))
            ],
            filters.entries()
        );
    }
}
