//! Wire types for AI-generated learning plans.
//!
//! A plan is a flat, ordered list of [`PlanNode`]s. The planning service is
//! not strict about types: node ids arrive as strings or numbers, resource
//! kinds are free-form strings, and optional fields are frequently absent.
//! All of that looseness is absorbed here, at the deserialization boundary,
//! so the rest of the crate only sees string ids and closed enums.

use serde::{Deserialize, Deserializer, Serialize};

/// One topic node of a flat plan, as returned by the planning service.
///
/// Identity is by `id`, coerced to a string on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub topic: String,
    /// Scheduled study day, carried through untouched when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Ids of nodes that should be completed before this one.
    #[serde(default, deserialize_with = "deserialize_id_list")]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl PlanNode {
    /// A minimal node with just an id and a topic, used for user-added
    /// graph nodes that have no upstream plan entry.
    pub fn bare(id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            date: None,
            prerequisites: Vec::new(),
            materials: Vec::new(),
            resources: Vec::new(),
        }
    }
}

/// A learning resource attached to a plan node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub title: String,
    pub url: String,
}

impl Resource {
    /// Build a resource from a single free-text line (one line per resource
    /// in the add-node form). The kind is inferred from the text the same
    /// way the planning backend infers it from URLs; anything unrecognized
    /// is a generic link.
    pub fn from_line(line: &str) -> Self {
        let lower = line.to_ascii_lowercase();
        let kind = if lower.contains("youtube") || lower.contains("youtu.be") {
            ResourceKind::Youtube
        } else if lower.contains("wiki") || lower.contains("article") {
            ResourceKind::Article
        } else if lower.ends_with(".pdf") {
            ResourceKind::Pdf
        } else {
            ResourceKind::Other
        };
        Self {
            kind,
            title: line.to_owned(),
            url: line.to_owned(),
        }
    }

    /// One-line display form, used when flattening suggested resources.
    pub fn display_line(&self) -> String {
        if self.title == self.url {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.url)
        }
    }
}

/// How a resource is rendered. Unknown kinds fall back to [`Self::Other`],
/// which renders as a generic link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceKind {
    Youtube,
    Article,
    Pdf,
    Other,
}

impl From<String> for ResourceKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "youtube" => Self::Youtube,
            "article" => Self::Article,
            "pdf" => Self::Pdf,
            _ => Self::Other,
        }
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Youtube => "youtube",
            ResourceKind::Article => "article",
            ResourceKind::Pdf => "pdf",
            ResourceKind::Other => "other",
        }
        .to_owned()
    }
}

// ---------------------------------------------------------------------------
// Id coercion
// ---------------------------------------------------------------------------

/// A plan id as it appears on the wire: string or number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(f) => f.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawId>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_and_numeric_ids_coerce_to_string() {
        let json = r#"[
            {"id": 1, "topic": "Intro", "prerequisites": []},
            {"id": "2", "topic": "Basics", "prerequisites": [1]},
            {"id": 3, "topic": "Advanced", "prerequisites": ["2"]}
        ]"#;
        let plan: Vec<PlanNode> = serde_json::from_str(json).unwrap();
        assert_eq!(plan[0].id, "1");
        assert_eq!(plan[1].id, "2");
        assert_eq!(plan[1].prerequisites, vec!["1"]);
        assert_eq!(plan[2].prerequisites, vec!["2"]);
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let json = r#"{"id": "a", "topic": "X"}"#;
        let node: PlanNode = serde_json::from_str(json).unwrap();
        assert!(node.prerequisites.is_empty());
        assert!(node.materials.is_empty());
        assert!(node.resources.is_empty());
        assert!(node.date.is_none());
    }

    #[test]
    fn unknown_resource_kind_falls_back_to_other() {
        let json = r#"{"type": "podcast", "title": "Ep 1", "url": "https://example.com"}"#;
        let res: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(res.kind, ResourceKind::Other);

        let known = r#"{"type": "youtube", "title": "Video", "url": "https://youtu.be/x"}"#;
        let res: Resource = serde_json::from_str(known).unwrap();
        assert_eq!(res.kind, ResourceKind::Youtube);
    }

    #[test]
    fn resource_kind_roundtrips_as_lowercase_string() {
        let res = Resource {
            kind: ResourceKind::Pdf,
            title: "Notes".to_owned(),
            url: "https://example.com/notes.pdf".to_owned(),
        };
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["type"], "pdf");
    }

    #[test]
    fn resource_from_line_infers_kind() {
        assert_eq!(
            Resource::from_line("https://www.youtube.com/watch?v=abc").kind,
            ResourceKind::Youtube
        );
        assert_eq!(
            Resource::from_line("https://en.wikipedia.org/wiki/Rust").kind,
            ResourceKind::Article
        );
        assert_eq!(
            Resource::from_line("https://example.com/book.pdf").kind,
            ResourceKind::Pdf
        );
        assert_eq!(
            Resource::from_line("some free-form note").kind,
            ResourceKind::Other
        );
    }
}
