// ./infrastructure/src/persistence/in_memory_repository.rs
use application::{ApplicationError, DocumentRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domain::{Document, SearchRequest};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

// --- Document Repository Implementation ---

/// In-memory document store keyed by document id.
///
/// Search is a full scan over the stored map; there is no index and no
/// ordering guarantee on the results.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRepository {
    // Document ID -> Document
    documents: Arc<DashMap<String, Arc<Document>>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    #[instrument(skip(self, document))]
    async fn put(&self, id: &str, document: &Document) -> Result<(), ApplicationError> {
        debug!(doc_id = %id, "Saving document to in-memory store");
        self.documents
            .insert(id.to_string(), Arc::new(document.clone()));
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
        debug!(doc_id = %id, "Getting document from in-memory store");
        let doc = self.documents.get(id).map(|doc_ref| (**doc_ref).clone());
        Ok(doc)
    }

    #[instrument(skip(self, request))]
    async fn find_matching(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<Document>, ApplicationError> {
        debug!("Scanning in-memory store for matching documents");
        let matches: Vec<Document> = self
            .documents
            .iter()
            .filter(|entry| {
                let doc = entry.value();
                matches_title_prefixes(doc, &request.title_prefixes)
                    && matches_contents(doc, &request.contains_contents)
                    && matches_author_ids(doc, &request.author_ids)
                    && matches_created_from(doc, request.created_from)
                    && matches_created_to(doc, request.created_to)
            })
            .map(|entry| (**entry.value()).clone())
            .collect();
        trace!(hits = matches.len(), "Scan finished");
        Ok(matches)
    }
}

// Each criterion is vacuously true when absent or empty; otherwise the
// document field must be present and satisfy at least one listed value.

fn matches_title_prefixes(document: &Document, prefixes: &Option<Vec<String>>) -> bool {
    let prefixes = match prefixes {
        Some(prefixes) if !prefixes.is_empty() => prefixes,
        _ => return true,
    };
    match &document.title {
        Some(title) => prefixes.iter().any(|prefix| title.starts_with(prefix)),
        None => false,
    }
}

fn matches_contents(document: &Document, substrings: &Option<Vec<String>>) -> bool {
    let substrings = match substrings {
        Some(substrings) if !substrings.is_empty() => substrings,
        _ => return true,
    };
    match &document.content {
        Some(content) => substrings.iter().any(|s| content.contains(s.as_str())),
        None => false,
    }
}

fn matches_author_ids(document: &Document, author_ids: &Option<Vec<String>>) -> bool {
    let author_ids = match author_ids {
        Some(author_ids) if !author_ids.is_empty() => author_ids,
        _ => return true,
    };
    match &document.author {
        Some(author) => author_ids.iter().any(|id| *id == author.id),
        None => false,
    }
}

fn matches_created_from(document: &Document, created_from: Option<DateTime<Utc>>) -> bool {
    let Some(from) = created_from else {
        return true;
    };
    // Inclusive lower bound
    match document.created {
        Some(created) => created >= from,
        None => false,
    }
}

fn matches_created_to(document: &Document, created_to: Option<DateTime<Utc>>) -> bool {
    let Some(to) = created_to else {
        return true;
    };
    // Inclusive upper bound
    match document.created {
        Some(created) => created <= to,
        None => false,
    }
}
