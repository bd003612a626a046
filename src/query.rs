use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::model::Filters;

/// Characters that are percent-encoded in query keys and values. Everything
/// except the unreserved marks `- _ . ! ~ * ' ( )` and alphanumerics.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Null,
    Single(String),
    Many(Vec<String>),
}

impl From<Option<String>> for QueryValue {
    fn from(value: Option<String>) -> Self {
        value.map(QueryValue::Single).unwrap_or(QueryValue::Null)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        QueryValue::Many(value)
    }
}

/// An ordered list of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, QueryValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<QueryValue>,
    {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Serialize to `key=value` pairs joined by `&`.
    ///
    /// Null entries are skipped and array values are expanded to one pair
    /// per element, repeating the key. Pairs keep the insertion order.
    pub fn serialize(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            let values: &[String] = match value {
                QueryValue::Null => continue,
                QueryValue::Single(v) => std::slice::from_ref(v),
                QueryValue::Many(v) => v,
            };
            let key = utf8_percent_encode(key, COMPONENT);
            for v in values {
                pairs.push(format!("{}={}", key, utf8_percent_encode(v, COMPONENT)));
            }
        }
        pairs.join("&")
    }
}

impl From<&Filters> for QueryParams {
    fn from(filters: &Filters) -> Self {
        let mut params = QueryParams::new();
        params
            .push("collab", filters.collab.clone())
            .push("date", filters.date.clone())
            .push("formatting", filters.formatting.clone());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, BTreeSet};

    fn decode(query: &str) -> BTreeMap<String, BTreeSet<String>> {
        let mut result: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            result.entry(k.to_string()).or_default().insert(v.to_string());
        }
        result
    }

    #[test]
    fn array_repeats_key() {
        let mut params = QueryParams::new();
        params.push("a", vec!["x".to_string(), "y".to_string()]);
        assert_eq!("a=x&a=y", params.serialize());
    }

    #[test]
    fn null_values_skipped() {
        let mut params = QueryParams::new();
        params
            .push("collab", QueryValue::Null)
            .push("formatting", "web")
            .push("date", QueryValue::Null);
        assert_eq!("formatting=web", params.serialize());
    }

    #[test]
    fn keys_and_values_encoded() {
        let mut params = QueryParams::new();
        params
            .push("a b", "IceCube Gen2 & friends")
            .push("mark", "it's (ok)!*~");
        assert_eq!(
            "a%20b=IceCube%20Gen2%20%26%20friends&mark=it's%20(ok)!*~",
            params.serialize()
        );
    }

    #[test]
    fn empty_params() {
        assert_eq!("", QueryParams::new().serialize());
        assert_eq!("", QueryParams::from(&Filters::default()).serialize());
    }

    #[test]
    fn decoding_recovers_values() {
        let mut params = QueryParams::new();
        params
            .push("collab", "IceCube-PINGU")
            .push("date", "2020-01-01")
            .push("skip", QueryValue::Null)
            .push("tags", vec!["Foo Bar".to_string(), "a=b&c".to_string()]);

        let decoded = decode(&params.serialize());

        let mut expected: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        expected.insert("collab".into(), ["IceCube-PINGU".to_string()].into());
        expected.insert("date".into(), ["2020-01-01".to_string()].into());
        expected.insert(
            "tags".into(),
            ["Foo Bar".to_string(), "a=b&c".to_string()].into(),
        );
        assert_eq!(expected, decoded);
    }

    #[test]
    fn filters_in_fixed_order() {
        let filters = Filters {
            collab: Some("IceCube".into()),
            date: Some("2020-01-01".into()),
            formatting: Some("web".into()),
        };
        assert_eq!(
            "collab=IceCube&date=2020-01-01&formatting=web",
            QueryParams::from(&filters).serialize()
        );
    }
}
