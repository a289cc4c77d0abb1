use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A citation attached to an answer. The backend emits either a structured
/// record or a bare text label; both deserialize here and render through the
/// single `Display` impl so neither shape loses information.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Source {
    Document {
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        page: Option<u32>,
    },
    Label(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Document { filename, page } => {
                let filename = filename.as_deref().unwrap_or("Unknown");
                match page {
                    Some(page) => write!(f, "{} (Page {})", filename, page),
                    None => write!(f, "{}", filename),
                }
            }
            Source::Label(label) => write!(f, "{}", label),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// One data frame's payload on the streamed path. Fields arrive piecemeal;
/// unknown fields from newer servers are ignored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ChunkPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DocumentMeta {
    pub file_id: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The document list endpoint has returned both a bare array and a wrapped
/// object across backend versions. Accept either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DocumentList {
    Bare(Vec<DocumentMeta>),
    Wrapped { documents: Vec<DocumentMeta> },
}

impl DocumentList {
    pub fn into_vec(self) -> Vec<DocumentMeta> {
        match self {
            DocumentList::Bare(docs) => docs,
            DocumentList::Wrapped { documents } => documents,
        }
    }
}

/// Error body shape used by the backend for non-success statuses.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod test {
    use super::{ChunkPayload, DocumentList, QueryResponse, Source};

    #[test]
    fn test_source_shapes() {
        let structured: Source =
            serde_json::from_str(r#"{"filename": "report.pdf", "page": 3}"#).expect("parses");
        assert_eq!(structured.to_string(), "report.pdf (Page 3)");

        let no_page: Source = serde_json::from_str(r#"{"filename": "notes.docx"}"#).expect("parses");
        assert_eq!(no_page.to_string(), "notes.docx");

        let anonymous: Source = serde_json::from_str(r#"{"page": 2}"#).expect("parses");
        assert_eq!(anonymous.to_string(), "Unknown (Page 2)");

        let label: Source = serde_json::from_str(r#""section 2, appendix""#).expect("parses");
        assert_eq!(label.to_string(), "section 2, appendix");
    }

    #[test]
    fn test_document_list_shapes() {
        let bare = r#"[{"file_id": "abc", "filename": "a.pdf", "uploaded_at": "2024-03-01T12:00:00Z"}]"#;
        let wrapped = format!(r#"{{"documents": {}}}"#, bare);

        let from_bare = serde_json::from_str::<DocumentList>(bare)
            .expect("parses")
            .into_vec();
        let from_wrapped = serde_json::from_str::<DocumentList>(&wrapped)
            .expect("parses")
            .into_vec();
        assert_eq!(from_bare, from_wrapped);
        assert_eq!(from_bare[0].filename, "a.pdf");
    }

    #[test]
    fn test_chunk_payload_ignores_unknown_fields() {
        let chunk: ChunkPayload =
            serde_json::from_str(r#"{"token": "hi", "model": "gemini", "latency_ms": 12}"#)
                .expect("parses");
        assert_eq!(chunk.token.as_deref(), Some("hi"));
        assert!(chunk.sources.is_none());
        assert!(chunk.error.is_none());
    }

    #[test]
    fn test_query_response_defaults() {
        let resp: QueryResponse = serde_json::from_str("{}").expect("parses");
        assert!(resp.answer.is_empty());
        assert!(resp.sources.is_empty());
    }
}
