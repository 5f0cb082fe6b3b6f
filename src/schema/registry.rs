//! Source of the schema documents a builder session starts from

use super::types::SchemaDocument;
use std::collections::BTreeMap;

/// Read-only view of every content type and component known to the application
pub trait ModelRegistry: Send + Sync {
    fn get(&self, uid: &str) -> Option<&SchemaDocument>;

    /// All documents, ordered by uid
    fn list(&self) -> Vec<&SchemaDocument>;
}

/// Registry backed by a map of documents
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    documents: BTreeMap<String, SchemaDocument>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents<I: IntoIterator<Item = SchemaDocument>>(documents: I) -> Self {
        let mut registry = Self::new();
        for document in documents {
            registry.insert(document);
        }
        registry
    }

    /// Add or replace a document
    pub fn insert(&mut self, document: SchemaDocument) {
        self.documents.insert(document.uid.clone(), document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ModelRegistry for InMemoryRegistry {
    fn get(&self, uid: &str) -> Option<&SchemaDocument> {
        self.documents.get(uid)
    }

    fn list(&self) -> Vec<&SchemaDocument> {
        self.documents.values().collect()
    }
}
