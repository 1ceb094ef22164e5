use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Document formats the backend accepts for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    /// Map a file extension (without the dot) onto a supported kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "text" | "md" | "markdown" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse the `type` label reported by the upload endpoint. The backend
    /// answers with either a short label or a MIME type.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "pdf" | "application/pdf" => Some(Self::Pdf),
            "docx"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "text" | "txt" | "md" | "markdown" | "text/plain" | "text/markdown" => {
                Some(Self::Text)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-confirmed identity of an uploaded document. A later upload
/// replaces it, it is never mutated in place.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: String,
    pub kind: DocumentKind,
    pub chunk_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used in exported transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub ordinal: u64,
    pub role: Role,
    pub content: String,
    pub bound_document_id: Option<String>,
    /// Synthetic message standing in for a failed upload or answer.
    pub error: bool,
    /// Bound to a document that is no longer the active one.
    pub superseded: bool,
}

impl Message {
    pub fn is_bound_to(&self, document_id: &str) -> bool {
        self.bound_document_id.as_deref() == Some(document_id)
    }
}

/// A message before the transcript assigns its ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub bound_document_id: Option<String>,
    pub error: bool,
    pub superseded: bool,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            bound_document_id: None,
            error: false,
            superseded: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            ..Self::user(content)
        }
    }

    pub fn bound_to(mut self, document_id: impl Into<String>) -> Self {
        self.bound_document_id = Some(document_id.into());
        self
    }

    pub fn failed(mut self) -> Self {
        self.error = true;
        self
    }

    pub fn superseded(mut self, superseded: bool) -> Self {
        self.superseded = superseded;
        self
    }
}

/// A file picked for upload. Not yet validated: `FileCenter::select`
/// decides whether it is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file into memory.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, bytes })
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_file_name(&self.name)
    }
}
