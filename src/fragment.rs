//! Reading and writing the widget state kept in the URL fragment.
//!
//! The fragment has the form `collab=<raw>&date=<raw>&formatting=<raw>&tag=<tag>`.
//! Filter values are stored as they appear (no percent decoding) and the tag
//! only has its first space encoded as `+`.

use crate::model::Filters;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentState {
    pub filters: Filters,
    pub tag: Option<String>,
}

/// Extract the recognized filters and the tag from a URL fragment.
///
/// A leading `#` is ignored. Segments without `=` and unknown keys are
/// skipped, later segments override earlier ones.
pub fn parse(fragment: &str) -> FragmentState {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut result = FragmentState::default();
    for segment in fragment.split('&') {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        match key {
            "collab" => result.filters.collab = Some(value.to_string()),
            "date" => result.filters.date = Some(value.to_string()),
            "formatting" => result.filters.formatting = Some(value.to_string()),
            "tag" => result.tag = Some(value.replacen('+', " ", 1)),
            _ => {}
        }
    }
    result
}

/// Build the fragment (without `#`) for the given filters and tag.
///
/// Every filter gets a segment, unset ones with an empty value. An empty
/// tag is omitted.
pub fn write(filters: &Filters, tag: Option<&str>) -> String {
    let mut segments: Vec<String> = filters
        .entries()
        .into_iter()
        .map(|(k, v)| format!("{k}={}", v.unwrap_or_default()))
        .collect();
    if let Some(tag) = tag.filter(|t| !t.is_empty()) {
        segments.push(format!("tag={}", tag.replacen(' ', "+", 1)));
    }
    segments.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collab_and_tag() {
        let state = parse("collab=IceCube&tag=Foo+Bar");
        assert_eq!(Some("IceCube".to_string()), state.filters.collab);
        assert_eq!(None, state.filters.date);
        assert_eq!(Some("Foo Bar".to_string()), state.tag);
    }

    #[test]
    fn only_first_plus_decoded() {
        let state = parse("#tag=A+B+C");
        assert_eq!(Some("A B+C".to_string()), state.tag);
    }

    #[test]
    fn values_stay_encoded() {
        let state = parse("date=2020-01-01&formatting=web%2Dinstitution&collab=a=b");
        assert_eq!(Some("2020-01-01".to_string()), state.filters.date);
        assert_eq!(
            Some("web%2Dinstitution".to_string()),
            state.filters.formatting
        );
        assert_eq!(Some("a=b".to_string()), state.filters.collab);
    }

    #[test]
    fn unknown_and_malformed_segments_ignored() {
        let state = parse("foo=bar&collab&&date=2021-05-01&=x");
        assert_eq!(
            Filters {
                collab: None,
                date: Some("2021-05-01".to_string()),
                formatting: None,
            },
            state.filters
        );
        assert_eq!(None, state.tag);
        assert_eq!(FragmentState::default(), parse(""));
    }

    #[test]
    fn write_without_tag() {
        let filters = Filters {
            collab: Some("IceCube".into()),
            date: Some("2020-01-01".into()),
            formatting: Some("web".into()),
        };
        assert_eq!(
            "collab=IceCube&date=2020-01-01&formatting=web",
            write(&filters, None)
        );
        assert_eq!(
            "collab=IceCube&date=2020-01-01&formatting=web",
            write(&filters, Some(""))
        );
    }

    #[test]
    fn empty_date_keeps_segment() {
        let filters = Filters {
            collab: Some("IceCube".into()),
            date: None,
            formatting: Some("web".into()),
        };
        let fragment = write(&filters, None);
        assert_eq!("collab=IceCube&date=&formatting=web", fragment);

        // Reading the fragment back yields an empty date, which the service
        // treats like a missing one
        assert_eq!(Some(String::new()), parse(&fragment).filters.date);
    }

    #[test]
    fn write_with_tag() {
        let filters = Filters {
            collab: Some("IceCube Gen2".into()),
            date: None,
            formatting: Some("web".into()),
        };
        assert_eq!(
            "collab=IceCube Gen2&date=&formatting=web&tag=Foo+Bar Baz",
            write(&filters, Some("Foo Bar Baz"))
        );
    }
}
