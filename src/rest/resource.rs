//! Root resource wire format
//!
//! The server answers `GET /` with a HAL document:
//!
//! ```json
//! {
//!   "apiRevision": 14,
//!   "_links": {
//!     "dashboard": { "href": "http://localhost:9393/dashboard" },
//!     "streams/definitions": { "href": "http://localhost:9393/streams/definitions" }
//!   }
//! }
//! ```
//!
//! Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// The server's capability document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RootResource {
    /// Protocol revision spoken by the server
    #[serde(rename = "apiRevision")]
    pub api_revision: i32,

    #[serde(rename = "_links", default, deserialize_with = "deserialize_links")]
    links: BTreeMap<String, String>,
}

impl RootResource {
    /// Create a root resource without links
    pub fn new(api_revision: i32) -> Self {
        Self {
            api_revision,
            links: BTreeMap::new(),
        }
    }

    /// Add a link relation
    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.insert(rel.into(), href.into());
        self
    }

    /// Relation name to href
    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.links
    }

    /// Look up a single relation
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).map(String::as_str)
    }
}

#[derive(Deserialize)]
struct Link {
    href: String,
}

/// HAL allows a relation to map to one link object or an array of them
#[derive(Deserialize)]
#[serde(untagged)]
enum LinkValue {
    One(Link),
    Many(Vec<Link>),
}

fn deserialize_links<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, LinkValue>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|(rel, value)| {
            let href = match value {
                LinkValue::One(link) => Some(link.href),
                LinkValue::Many(links) => links.into_iter().next().map(|l| l.href),
            }?;
            Some((rel, href))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hal_document() {
        let json = r#"{
            "apiRevision": 14,
            "_links": {
                "dashboard": { "href": "http://localhost:9393/dashboard" },
                "streams/definitions": { "href": "http://localhost:9393/streams/definitions", "templated": false }
            }
        }"#;

        let root: RootResource = serde_json::from_str(json).unwrap();
        assert_eq!(root.api_revision, 14);
        assert_eq!(root.links().len(), 2);
        assert_eq!(root.link("dashboard"), Some("http://localhost:9393/dashboard"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"apiRevision": 3, "build": {"version": "1.0"}, "_links": {}, "_embedded": null}"#;
        let root: RootResource = serde_json::from_str(json).unwrap();
        assert_eq!(root.api_revision, 3);
        assert!(root.links().is_empty());
    }

    #[test]
    fn test_link_arrays_use_first_href() {
        let json = r#"{
            "apiRevision": 14,
            "_links": {
                "jobs": [{ "href": "http://a/jobs" }, { "href": "http://b/jobs" }],
                "empty": []
            }
        }"#;
        let root: RootResource = serde_json::from_str(json).unwrap();
        assert_eq!(root.link("jobs"), Some("http://a/jobs"));
        assert_eq!(root.link("empty"), None);
    }

    #[test]
    fn test_missing_links_and_null_links() {
        let root: RootResource = serde_json::from_str(r#"{"apiRevision": 1}"#).unwrap();
        assert!(root.links().is_empty());

        let root: RootResource =
            serde_json::from_str(r#"{"apiRevision": 1, "_links": null}"#).unwrap();
        assert!(root.links().is_empty());
    }

    #[test]
    fn test_revision_is_required() {
        let result = serde_json::from_str::<RootResource>(r#"{"_links": {}}"#);
        assert!(result.is_err());
    }
}
