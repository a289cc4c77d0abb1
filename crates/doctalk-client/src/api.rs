use std::fmt;

use bytes::Bytes;
use futures::StreamExt;
use thiserror::Error;

use shared::request::QueryRequest;
use shared::response::{DocumentList, DocumentMeta, ErrorDetail, QueryResponse};

use crate::constants;
use crate::upload::{UploadProgress, UploadTask};

// Upload bodies are streamed in pieces so the transport can report progress
// as it drains them.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Shown when a failure carries no server-reported detail.
pub const GENERIC_FAILURE: &str = "Failed to get response. Please try again.";

/// A non-success status from the backend, with the response `detail` when
/// one could be read.
#[derive(Clone, Debug)]
pub struct ApiErrorMessage {
    pub code: u16,
    pub message: Option<String>,
}

impl fmt::Display for ApiErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} ({})", message, self.code),
            None => write!(f, "request failed with status {}", self.code),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("RequestError: {0}")]
    RequestError(#[from] serde_json::Error),
    #[error("{0}")]
    ClientError(ApiErrorMessage),
    #[error("{0}")]
    ServerError(String),
    #[error("Received malformed data: {0}")]
    StreamError(#[from] std::io::Error),
}

impl ApiError {
    /// The one line shown in the transcript when a turn fails. Server-reported
    /// detail is preferred verbatim; transport noise gets the generic string.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ClientError(msg) => {
                msg.message.clone().unwrap_or_else(|| GENERIC_FAILURE.into())
            }
            ApiError::ServerError(detail) => detail.clone(),
            _ => GENERIC_FAILURE.into(),
        }
    }
}

/// REST client for everything outside the streamed answer path: single-shot
/// queries, the document library, and uploads.
pub struct ApiClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(token: Option<String>, endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| constants::HTTP_ENDPOINT.into()),
            token,
        }
    }

    /// Ask a question and wait for the whole answer as one response. Used
    /// when end-to-end streaming cannot be relied on; the conversation does
    /// not care which path produced the answer.
    pub async fn query(&self, question: &str) -> Result<QueryResponse, ApiError> {
        let body = QueryRequest {
            question: question.to_string(),
        };
        let res = self
            .request(reqwest::Method::POST, "/query/")
            .json(&body)
            .send()
            .await?;
        let res = Self::check_status(res).await?;
        Ok(res.json::<QueryResponse>().await?)
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentMeta>, ApiError> {
        let res = self
            .request(reqwest::Method::GET, "/documents/")
            .send()
            .await?;
        let res = Self::check_status(res).await?;
        Ok(res.json::<DocumentList>().await?.into_vec())
    }

    pub async fn delete_document(&self, file_id: &str) -> Result<(), ApiError> {
        let res = self
            .request(reqwest::Method::DELETE, &format!("/documents/{}", file_id))
            .send()
            .await?;
        Self::check_status(res).await?;
        Ok(())
    }

    /// Upload one document as multipart form data. The body is handed to the
    /// transport in pieces; every piece drained produces one notification
    /// through [`UploadProgress`] and then `on_progress` with the bounded
    /// percentage, which the caller records on its [`UploadTask`].
    pub async fn upload_document(
        &self,
        file: &UploadTask,
        mut on_progress: impl FnMut(u8) + Send + 'static,
    ) -> Result<(), ApiError> {
        let total = file.data.len() as u64;
        let mut tracker = UploadProgress::new();
        let mut sent: u64 = 0;

        let pieces: Vec<Bytes> = file
            .data
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(Bytes::copy_from_slice)
            .collect();
        let counted = futures::stream::iter(pieces.into_iter().map(Ok::<Bytes, std::io::Error>))
            .inspect(move |piece| {
                if let Ok(piece) = piece {
                    sent += piece.len() as u64;
                    on_progress(tracker.update(sent, total));
                }
            });

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(counted),
            total,
        )
        .file_name(file.filename.clone())
        .mime_str(&file.mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let res = self
            .request(reqwest::Method::POST, "/documents/upload")
            .multipart(form)
            .send()
            .await?;
        Self::check_status(res).await?;
        Ok(())
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.endpoint, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    pub(crate) async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let message = res.json::<ErrorDetail>().await.ok().map(|d| d.detail);
        Err(ApiError::ClientError(ApiErrorMessage {
            code: status.as_u16(),
            message,
        }))
    }
}
