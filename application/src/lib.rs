use async_trait::async_trait;
use chrono::Utc;
use domain::{Document, SearchRequest};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Storage error: {0}")]
    Storage(String),
}

// --- Infrastructure Interface (Trait) ---

/// Interface for storing and retrieving documents.
///
/// Implementations are plain keyed storage: identity assignment and
/// timestamp defaulting happen in [`DocumentService`], before a document
/// reaches this trait.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts or replaces the entry stored under `id`.
    async fn put(&self, id: &str, document: &Document) -> Result<(), ApplicationError>;
    /// Retrieves a document by its id.
    async fn get(&self, id: &str) -> Result<Option<Document>, ApplicationError>;
    /// Returns every stored document matching the request criteria.
    async fn find_matching(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<Document>, ApplicationError>;
}

// --- Application Service (Use Cases) ---

/// Service owning the repository contract: upsert with identity assignment,
/// multi-criteria search, and point lookup.
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
}

impl DocumentService {
    pub fn new(repository: Arc<dyn DocumentRepository>) -> Self {
        Self { repository }
    }

    /// Upserts a document.
    ///
    /// An absent or empty id is replaced with a freshly generated UUID; an
    /// absent `created` is stamped with the current time. The check is on the
    /// incoming document only: re-saving an existing id with `created: None`
    /// stamps a new timestamp rather than restoring the stored one. The
    /// returned document is re-read from storage so callers always observe
    /// the persisted state.
    #[instrument(skip(self, document))]
    pub async fn save(&self, mut document: Document) -> Result<Document, ApplicationError> {
        let id = match document.id.take() {
            Some(id) if !id.is_empty() => id,
            _ => {
                let generated = Uuid::new_v4().to_string();
                debug!(doc_id = %generated, "Generated id for document without one");
                generated
            }
        };
        document.id = Some(id.clone());

        if document.created.is_none() {
            document.created = Some(Utc::now());
        }

        self.repository.put(&id, &document).await?;
        info!(doc_id = %id, "Document saved");

        // Return the stored state, not the in-flight copy.
        self.repository.get(&id).await?.ok_or_else(|| {
            ApplicationError::Storage(format!("document '{}' missing right after save", id))
        })
    }

    /// Returns every stored document matching the request.
    ///
    /// All five criteria are optional; absent criteria match everything, so
    /// an empty request returns the full collection. An unsatisfiable
    /// request (e.g. created_from after created_to) yields an empty list,
    /// not an error.
    #[instrument(skip(self, request))]
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError> {
        let matches = self.repository.find_matching(request).await?;
        info!(hits = matches.len(), "Search finished");
        Ok(matches)
    }

    /// Looks up a document by id. Unknown ids yield `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
        let found = self.repository.get(id).await?;
        if found.is_none() {
            warn!(doc_id = %id, "Document not found");
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal repository double: a plain mutex-guarded map whose
    /// `find_matching` ignores criteria and returns everything. Criteria
    /// evaluation is covered by the in-memory repository's own tests.
    #[derive(Default)]
    struct FakeRepository {
        documents: Mutex<HashMap<String, Document>>,
    }

    #[async_trait]
    impl DocumentRepository for FakeRepository {
        async fn put(&self, id: &str, document: &Document) -> Result<(), ApplicationError> {
            self.documents
                .lock()
                .unwrap()
                .insert(id.to_string(), document.clone());
            Ok(())
        }

        async fn get(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
            Ok(self.documents.lock().unwrap().get(id).cloned())
        }

        async fn find_matching(
            &self,
            _request: &SearchRequest,
        ) -> Result<Vec<Document>, ApplicationError> {
            Ok(self.documents.lock().unwrap().values().cloned().collect())
        }
    }

    fn service() -> DocumentService {
        DocumentService::new(Arc::new(FakeRepository::default()))
    }

    #[tokio::test]
    async fn save_generates_id_and_created_when_absent() {
        let service = service();
        let before = Utc::now();

        let saved = service
            .save(Document {
                id: Some(String::new()),
                title: Some("Title".to_string()),
                content: Some("Content".to_string()),
                ..Document::default()
            })
            .await
            .unwrap();

        let id = saved.id.expect("id must be generated");
        assert!(!id.is_empty(), "generated id must not be empty");
        let created = saved.created.expect("created must be stamped");
        assert!(created >= before && created <= Utc::now());
    }

    #[tokio::test]
    async fn save_generates_distinct_ids() {
        let service = service();
        let first = service.save(Document::default()).await.unwrap();
        let second = service.save(Document::default()).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn save_keeps_explicit_id() {
        let service = service();
        let saved = service
            .save(Document {
                id: Some("doc-123".to_string()),
                ..Document::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.id.as_deref(), Some("doc-123"));
    }

    #[tokio::test]
    async fn save_keeps_supplied_created() {
        let service = service();
        let created = Utc::now() - Duration::hours(2);
        let saved = service
            .save(Document {
                created: Some(created),
                ..Document::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.created, Some(created));
    }

    #[tokio::test]
    async fn save_returns_the_stored_state() {
        let service = service();
        let saved = service
            .save(Document {
                title: Some("Title".to_string()),
                ..Document::default()
            })
            .await
            .unwrap();

        let id = saved.id.clone().unwrap();
        let fetched = service.find_by_id(&id).await.unwrap();
        assert_eq!(fetched, Some(saved));
    }

    #[tokio::test]
    async fn resave_with_same_id_replaces_in_place() {
        let service = service();
        let original = service
            .save(Document {
                id: Some("doc-1".to_string()),
                title: Some("Original".to_string()),
                ..Document::default()
            })
            .await
            .unwrap();

        let updated = service
            .save(Document {
                id: Some("doc-1".to_string()),
                title: Some("Updated".to_string()),
                created: original.created,
                ..Document::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.id.as_deref(), Some("doc-1"));
        assert_eq!(updated.title.as_deref(), Some("Updated"));

        let all = service.search(&SearchRequest::any()).await.unwrap();
        assert_eq!(all.len(), 1, "re-save must not create a duplicate entry");
    }

    #[tokio::test]
    async fn resave_without_created_stamps_a_fresh_timestamp() {
        // The created guard is on the incoming document only, so a fresh
        // object reusing an old id gets restamped instead of inheriting the
        // stored timestamp.
        let service = service();
        let old = Utc::now() - Duration::hours(1);
        service
            .save(Document {
                id: Some("doc-1".to_string()),
                created: Some(old),
                ..Document::default()
            })
            .await
            .unwrap();

        let resaved = service
            .save(Document {
                id: Some("doc-1".to_string()),
                ..Document::default()
            })
            .await
            .unwrap();

        let restamped = resaved.created.expect("created must be stamped");
        assert!(restamped > old);
    }

    #[tokio::test]
    async fn find_by_id_misses_for_unknown_id() {
        let service = service();
        let found = service.find_by_id("never-saved").await.unwrap();
        assert_eq!(found, None);
    }
}
