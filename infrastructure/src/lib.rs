// Module declarations
pub mod persistence;

// Re-export the implementation
pub use persistence::InMemoryDocumentRepository;
