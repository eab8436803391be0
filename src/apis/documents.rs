use crate::{
    client::LandaxClient,
    error::{LandaxError, LandaxResult},
    models::{created_document_id, DocumentLink, DocumentOptions, Record, RecordId},
    query::QueryParams,
};
use log::{debug, error, info, warn};
use reqwest::{
    multipart::{Form, Part},
    Method, Response, StatusCode,
};
use std::{fmt, path::Path};

pub const DOCUMENTS: &str = "Documents";
pub const DOCUMENT_LINK: &str = "DocumentLink";

const CREATE_DOCUMENT: &str = "Documents/CreateDocument";
const GET_CONTENT: &str = "Documents/GetContent";
const PUSH_CONTENT: &str = "Documents/PushContent";

/// Stages of a linked upload.
///
/// `Pending -> Uploaded -> Linked` on success,
/// `Pending -> Uploaded -> LinkFailed -> RolledBack` when the link is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Pending,
    Uploaded,
    Linked,
    LinkFailed,
    RolledBack,
}

/// Why the DocumentLink could not be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFailure {
    Status { status: u16, body: String },
    Transport(String),
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => write!(f, "HTTP {} - {}", status, body),
            Self::Transport(reason) => write!(f, "transport error: {}", reason),
        }
    }
}

/// Result of deleting an orphaned upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rollback {
    Deleted,
    /// The service reported the document as already missing
    AlreadyGone,
    Failed(String),
}

/// Outcome of [`DocumentApi::upload_linked`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedUploadOutcome {
    Linked {
        document_id: RecordId,
    },
    /// Nothing was created
    UploadRejected {
        status: u16,
        body: String,
    },
    LinkRejected {
        document_id: RecordId,
        failure: LinkFailure,
        rollback: Rollback,
    },
}

impl LinkedUploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Linked { .. })
    }

    pub fn document_id(&self) -> Option<RecordId> {
        match self {
            Self::Linked { document_id } | Self::LinkRejected { document_id, .. } => Some(*document_id),
            Self::UploadRejected { .. } => None,
        }
    }

    pub fn final_state(&self) -> WorkflowState {
        match self {
            Self::Linked { .. } => WorkflowState::Linked,
            Self::UploadRejected { .. } => WorkflowState::Pending,
            Self::LinkRejected {
                rollback: Rollback::Failed(_),
                ..
            } => WorkflowState::LinkFailed,
            Self::LinkRejected { .. } => WorkflowState::RolledBack,
        }
    }
}

fn transition(filename: &str, from: WorkflowState, to: WorkflowState) {
    debug!("Document {}: {:?} -> {:?}", filename, from, to);
}

/// Set `key` in `options`, warning when the caller had supplied it
fn force_option(options: &mut DocumentOptions, key: &str, value: i64, operation: &str) {
    if options.contains_key(key) {
        warn!(
            "{} does not support the {} option in document options. It will be overridden.",
            operation, key
        );
    }
    options.insert(key.to_string(), value.into());
}

/// The `document` part of an upload: `options` with `FolderId` and, for
/// linked uploads, `ModuleId` forced. `operation` names the caller in warnings.
fn document_options(
    options: DocumentOptions,
    folder_id: RecordId,
    module_id: Option<u32>,
    operation: &str,
) -> DocumentOptions {
    let mut document = options;
    force_option(&mut document, "FolderId", folder_id, operation);
    if let Some(module_id) = module_id {
        force_option(&mut document, "ModuleId", i64::from(module_id), operation);
    }
    document
}

/// Document API operations
pub struct DocumentApi<'a> {
    client: &'a LandaxClient,
}

impl<'a> DocumentApi<'a> {
    pub fn new(client: &'a LandaxClient) -> Self {
        Self { client }
    }

    /// Upload a file into a folder.
    ///
    /// `options` is sent as the `document` JSON part with `FolderId` forced to
    /// `folder_id`. The service answers 200 on success; the raw response is
    /// returned and [`created_document_id`] reads the new id from its body.
    ///
    /// # Arguments
    /// * `data` - File contents
    /// * `filename` - Name of the file in Landax
    /// * `folder_id` - Folder to upload into
    /// * `options` - Document fields, e.g. `IsTemplate`, `Number`
    pub async fn upload(
        &self,
        data: impl Into<Vec<u8>>,
        filename: &str,
        folder_id: RecordId,
        options: DocumentOptions,
    ) -> LandaxResult<Response> {
        let document = document_options(options, folder_id, None, "upload");
        self.create_document(data.into(), filename, &document, None).await
    }

    /// Upload a file together with a `documentLink` object in one request
    pub async fn upload_with_link(
        &self,
        data: impl Into<Vec<u8>>,
        filename: &str,
        folder_id: RecordId,
        options: DocumentOptions,
        document_link: &Record,
    ) -> LandaxResult<Response> {
        let document = document_options(options, folder_id, None, "upload_with_link");
        self.create_document(data.into(), filename, &document, Some(document_link))
            .await
    }

    /// Upload a file from disk under its own file name
    pub async fn upload_from_file(
        &self,
        path: impl AsRef<Path>,
        folder_id: RecordId,
        options: DocumentOptions,
    ) -> LandaxResult<Response> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                LandaxError::invalid_param(format!("path has no file name: {}", path.display()))
            })?
            .to_string();
        let data = tokio::fs::read(path).await?;

        self.upload(data, &filename, folder_id, options).await
    }

    async fn create_document(
        &self,
        data: Vec<u8>,
        filename: &str,
        document: &DocumentOptions,
        document_link: Option<&Record>,
    ) -> LandaxResult<Response> {
        info!("Uploading document {} ({} bytes)", filename, data.len());
        let url = self.client.url(CREATE_DOCUMENT, &QueryParams::new())?;

        let mut form = Form::new()
            .text("document", serde_json::to_string(document)?)
            .part("fileData", Part::bytes(data).file_name(filename.to_string()));
        if let Some(link) = document_link {
            form = form.text("documentLink", serde_json::to_string(link)?);
        }

        let req = self.client.request(Method::POST, &url).multipart(form);
        self.client.send(req).await
    }

    /// Link a document to an object of another module.
    /// The service answers 201 on success; the raw response is returned.
    ///
    /// # Arguments
    /// * `document_id` - Document to link
    /// * `folder_id` - Folder of the document
    /// * `object_field` - DocumentLink field for the object, e.g. `CoworkerId`
    /// * `object_id` - Object to link to
    pub async fn link(
        &self,
        document_id: RecordId,
        folder_id: RecordId,
        object_field: &str,
        object_id: RecordId,
    ) -> LandaxResult<Response> {
        let link = DocumentLink {
            folder_id,
            document_id,
            object_field: object_field.to_string(),
            object_id,
        };
        self.client.records().create(DOCUMENT_LINK, &link).await
    }

    /// Upload a document and link it to `linked_object_id` in `module_name`.
    ///
    /// Module lookup misses are returned as errors before anything is sent.
    /// Service refusals come back as an outcome: when the link is refused
    /// the uploaded document is deleted again, and a failing delete is only
    /// logged.
    ///
    /// An `Err` returned after the upload step (the upload body cannot be
    /// read, or carries no document id) may leave the uploaded document on
    /// the server, since there is no id to roll back with.
    pub async fn upload_linked(
        &self,
        data: impl Into<Vec<u8>>,
        filename: &str,
        folder_id: RecordId,
        module_name: &str,
        linked_object_id: RecordId,
        options: DocumentOptions,
    ) -> LandaxResult<LinkedUploadOutcome> {
        let module = match self.client.module_registry().resolve(module_name) {
            Ok(module) => module,
            Err(e) => {
                error!("Cannot upload linked document {}: {}", filename, e);
                return Err(e);
            }
        };

        let document = document_options(
            options,
            folder_id,
            Some(module.module_id),
            "upload_linked",
        );

        let response = self
            .create_document(data.into(), filename, &document, None)
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            error!("Error uploading document with filename {}: {}", filename, body);
            return Ok(LinkedUploadOutcome::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }

        let document_id = created_document_id(&body).map_err(|e| {
            error!("Uploaded {} but could not read its id: {}", filename, e);
            e
        })?;
        transition(filename, WorkflowState::Pending, WorkflowState::Uploaded);

        let failure = match self
            .link(document_id, folder_id, &module.link_field, linked_object_id)
            .await
        {
            Ok(response) if response.status() == StatusCode::CREATED => {
                transition(filename, WorkflowState::Uploaded, WorkflowState::Linked);
                info!(
                    "Document {} ({}) linked to {} {}",
                    document_id, filename, module.link_field, linked_object_id
                );
                return Ok(LinkedUploadOutcome::Linked { document_id });
            }
            Ok(response) => LinkFailure::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            },
            Err(e) => LinkFailure::Transport(e.to_string()),
        };

        error!("Error linking document with filename {}: {}", filename, failure);
        transition(filename, WorkflowState::Uploaded, WorkflowState::LinkFailed);

        info!("Deleting document with filename {} since the link failed.", filename);
        let rollback = self.roll_back(document_id).await;
        if !matches!(rollback, Rollback::Failed(_)) {
            transition(filename, WorkflowState::LinkFailed, WorkflowState::RolledBack);
        }

        Ok(LinkedUploadOutcome::LinkRejected {
            document_id,
            failure,
            rollback,
        })
    }

    async fn roll_back(&self, document_id: RecordId) -> Rollback {
        match self.client.records().delete(DOCUMENTS, document_id).await {
            Ok(None) => Rollback::AlreadyGone,
            Ok(Some(response)) if response.status().is_success() => Rollback::Deleted,
            Ok(Some(response)) => {
                let reason = format!("HTTP {}", response.status());
                error!("Could not delete orphaned document {}: {}", document_id, reason);
                Rollback::Failed(reason)
            }
            Err(e) => {
                error!("Could not delete orphaned document {}: {}", document_id, e);
                Rollback::Failed(e.to_string())
            }
        }
    }

    /// All documents in a folder
    pub async fn list(&self, folder_id: RecordId) -> LandaxResult<Vec<Record>> {
        let params = QueryParams::new().filter(format!("FolderId eq {}", folder_id));
        self.client.records().get_all(DOCUMENTS, params).await
    }

    /// Download the original content of a document
    pub async fn content(&self, document_id: RecordId) -> LandaxResult<bytes::Bytes> {
        info!("Getting content of document {}", document_id);
        let params = QueryParams::new()
            .param("documentid", document_id)
            .param("original", "True")
            .param("encode", "raw");
        let url = self.client.url(GET_CONTENT, &params)?;
        let req = self.client.request(Method::GET, &url);

        self.client.execute_bytes(req).await
    }

    /// Replace the content of an existing document; returns the raw response
    pub async fn push_content(
        &self,
        document_id: RecordId,
        data: impl Into<Vec<u8>>,
    ) -> LandaxResult<Response> {
        info!("Pushing content to document {}", document_id);
        let params = QueryParams::new().param("documentid", document_id);
        let url = self.client.url(PUSH_CONTENT, &params)?;
        let req = self.client.request(Method::POST, &url).body(data.into());

        self.client.send(req).await
    }
}
