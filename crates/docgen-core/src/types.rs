use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::DocGenError;

/// Kind of project document the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DocumentType {
    #[default]
    #[serde(rename = "frs")]
    Frs,
    #[serde(rename = "design")]
    DesignDocument,
}

const FRS_SECTIONS: [&str; 7] = [
    "Introduction",
    "Purpose",
    "Scope",
    "Definitions, Acronyms, Abbreviations",
    "Functional Requirements",
    "Non-Functional Requirements",
    "Assumptions and Constraints",
];

const DESIGN_SECTIONS: [&str; 7] = [
    "Overview",
    "Architecture Description",
    "Module Design",
    "Database Design",
    "Interface Design",
    "Security Considerations",
    "Assumptions and Limitations",
];

impl DocumentType {
    /// Both document types, in the order the UI offers them.
    pub const ALL: [DocumentType; 2] = [DocumentType::Frs, DocumentType::DesignDocument];

    /// Human readable label, also used as the exported document title.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Frs => "Functional Requirement Specification (FRS)",
            DocumentType::DesignDocument => "Design Document",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            DocumentType::Frs => "frs",
            DocumentType::DesignDocument => "design",
        }
    }

    /// Section outline the language model is asked to follow.
    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            DocumentType::Frs => &FRS_SECTIONS,
            DocumentType::DesignDocument => &DESIGN_SECTIONS,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentType {
    type Err = DocGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "frs"
            | "functional requirement specification"
            | "functional requirement specification (frs)" => Ok(DocumentType::Frs),
            "design" | "design-document" | "design document" => Ok(DocumentType::DesignDocument),
            other => Err(DocGenError::invalid_input(format!(
                "Unknown document type '{}'. Expected one of: frs, design",
                other
            ))),
        }
    }
}

/// One page of text extracted from a corpus PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    pub source: PathBuf,
    /// Zero-based page index within `source`.
    pub page: u32,
}

/// A piece of a [`SourceDocument`] small enough to embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub id: Uuid,
    pub content: String,
    pub source: PathBuf,
    pub page: u32,
    pub chunk_index: usize,
}

impl TextChunk {
    pub fn new(content: String, source: PathBuf, page: u32, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source,
            page,
            chunk_index,
        }
    }
}

/// A chunk returned by a nearest-neighbour search, with its squared L2 distance
/// to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slugs_and_labels() {
        assert_eq!("frs".parse::<DocumentType>().unwrap(), DocumentType::Frs);
        assert_eq!(
            "Functional Requirement Specification (FRS)"
                .parse::<DocumentType>()
                .unwrap(),
            DocumentType::Frs
        );
        assert_eq!(
            " Design Document ".parse::<DocumentType>().unwrap(),
            DocumentType::DesignDocument
        );
        assert!("memo".parse::<DocumentType>().is_err());
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for doc_type in DocumentType::ALL {
            assert_eq!(doc_type.label().parse::<DocumentType>().unwrap(), doc_type);
            assert_eq!(doc_type.slug().parse::<DocumentType>().unwrap(), doc_type);
        }
    }

    #[test]
    fn each_type_has_seven_sections() {
        assert_eq!(DocumentType::Frs.sections().len(), 7);
        assert_eq!(DocumentType::Frs.sections()[4], "Functional Requirements");
        assert_eq!(DocumentType::DesignDocument.sections()[3], "Database Design");
    }

    #[test]
    fn serializes_as_slug() {
        let json = serde_json::to_string(&DocumentType::DesignDocument).unwrap();
        assert_eq!(json, "\"design\"");
        let back: DocumentType = serde_json::from_str("\"frs\"").unwrap();
        assert_eq!(back, DocumentType::Frs);
    }

    #[test]
    fn default_is_frs() {
        assert_eq!(DocumentType::default(), DocumentType::Frs);
        assert_eq!(DocumentType::ALL[0], DocumentType::Frs);
    }
}
