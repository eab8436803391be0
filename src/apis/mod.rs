pub mod documents;
pub mod records;

// Re-export all APIs
pub use documents::{
    DocumentApi, LinkFailure, LinkedUploadOutcome, Rollback, WorkflowState, DOCUMENTS,
    DOCUMENT_LINK,
};
pub use records::RecordApi;
