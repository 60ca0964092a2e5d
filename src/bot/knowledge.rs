//! Knowledge store: reference files included as context in every request.

use crate::bot::attachment::{AttachmentKind, EncodedFile};

/// A stored reference file.
#[derive(Debug, Clone)]
pub struct KnowledgeFile {
    pub id: u64,
    pub name: String,
    pub kind: AttachmentKind,
    pub base64: String,
    pub mime_type: String,
}

/// Ordered collection of knowledge files.
///
/// The store is unbounded and unfiltered: every file it holds rides along on
/// every subsequent generation request, in insertion order.
pub struct KnowledgeStore {
    files: Vec<KnowledgeFile>,
    next_id: u64,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            next_id: 1,
        }
    }

    /// Encode and store a file, returning the new entry.
    pub fn add(&mut self, name: &str, data: &[u8], mime_type: &str) -> &KnowledgeFile {
        let encoded = EncodedFile::from_bytes(data, mime_type);
        let file = KnowledgeFile {
            id: self.next_id,
            name: name.to_string(),
            kind: encoded.kind,
            base64: encoded.base64,
            mime_type: encoded.mime_type,
        };
        self.next_id += 1;
        self.files.push(file);
        self.files.last().expect("file was just pushed")
    }

    /// Remove a file by id.
    pub fn remove(&mut self, id: u64) -> Option<KnowledgeFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    pub fn files(&self) -> &[KnowledgeFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}
