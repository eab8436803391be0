use crate::error::{LandaxError, LandaxResult};
use log::warn;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// One entity instance as returned by the service. No local schema.
pub type Record = serde_json::Map<String, Value>;

/// Server-assigned record key
pub type RecordId = i64;

/// Options object sent as the `document` part of a document upload
pub type DocumentOptions = Record;

/// Join record associating a document with an object of another module.
///
/// Serializes to exactly three fields:
/// `{"FolderId": .., "DocumentId": .., <object_field>: <object_id>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub folder_id: RecordId,
    pub document_id: RecordId,
    pub object_field: String,
    pub object_id: RecordId,
}

impl Serialize for DocumentLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("FolderId", &self.folder_id)?;
        map.serialize_entry("DocumentId", &self.document_id)?;
        map.serialize_entry(&self.object_field, &self.object_id)?;
        map.end()
    }
}

/// Error body from the API, either the OData shape or the Web API shape
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ODataError>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ODataError {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.error.and_then(|e| e.message).or(self.message)
    }
}

#[derive(Debug, Deserialize)]
struct CreateDocumentResponse {
    value: CreatedDocument,
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    document: Record,
}

/// Read the new document's id from a `CreateDocument` response body,
/// found at `value.document.Id`.
pub fn created_document_id(body: &str) -> LandaxResult<RecordId> {
    let response: CreateDocumentResponse = serde_json::from_str(body)?;
    response
        .value
        .document
        .get("Id")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            LandaxError::InvalidResponse(format!("no value.document.Id in response: {}", body))
        })
}

/// Index records by the value of `key`.
///
/// Later records overwrite earlier ones with the same key. Records without
/// the key are skipped.
pub fn index_records(records: Vec<Record>, key: &str) -> HashMap<String, Record> {
    let mut indexed = HashMap::with_capacity(records.len());

    for record in records {
        let index = match record.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                warn!("Record has no {} field, skipping", key);
                continue;
            }
            Some(other) => other.to_string(),
        };
        if indexed.contains_key(&index) {
            warn!("{} already present, overwriting", index);
        }
        indexed.insert(index, record);
    }

    indexed
}
