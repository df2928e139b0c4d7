//! Typed client for the todo backend.
//!
//! Every call performs exactly one request through a [`Transport`] and comes
//! back as an [`ApiResponse`]. Nothing is returned as `Err`: transport,
//! status and decoding failures all end up in the envelope's `error` string.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::envelope::{ApiResponse, DEFAULT_ERROR};
use crate::model::{
    AuthResponse, CategoryCreate, CategoryList, CategoryPayload, Credentials, ListParams,
    Registration, TaskCreate, TaskUpdate, TodoList, TodoPayload,
};

pub const CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse JSON: {0}")]
    Decode(String),

    #[error("Failed to serialize request: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Sends one HTTP request. Implementations set `Content-Type` to
/// [`CONTENT_TYPE`] on every request.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

pub struct ApiClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, transport }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn register(&self, registration: &Registration) -> ApiResponse<AuthResponse> {
        self.request_with_body(Method::Post, "/auth/register", registration)
            .await
    }

    pub async fn login(&self, credentials: &Credentials) -> ApiResponse<AuthResponse> {
        self.request_with_body(Method::Post, "/auth/login", credentials)
            .await
    }

    pub async fn logout(&self) -> ApiResponse<()> {
        self.request(Method::Post, "/auth/logout", None).await
    }

    pub async fn list_todos(&self, params: &ListParams) -> ApiResponse<TodoList> {
        let endpoint = format!("/todos?{}", params.to_query());
        self.request(Method::Get, &endpoint, None).await
    }

    pub async fn get_todo(&self, id: &str) -> ApiResponse<TodoPayload> {
        self.request(Method::Get, &format!("/todos/{}", id), None)
            .await
    }

    pub async fn create_todo(&self, todo: &TaskCreate) -> ApiResponse<TodoPayload> {
        self.request_with_body(Method::Post, "/todos", todo).await
    }

    pub async fn update_todo(&self, id: &str, update: &TaskUpdate) -> ApiResponse<TodoPayload> {
        self.request_with_body(Method::Put, &format!("/todos/{}", id), update)
            .await
    }

    pub async fn toggle_todo(&self, id: &str) -> ApiResponse<TodoPayload> {
        self.request(Method::Patch, &format!("/todos/{}/toggle", id), None)
            .await
    }

    pub async fn delete_todo(&self, id: &str) -> ApiResponse<()> {
        self.request(Method::Delete, &format!("/todos/{}", id), None)
            .await
    }

    pub async fn list_categories(&self) -> ApiResponse<CategoryList> {
        self.request(Method::Get, "/categories", None).await
    }

    pub async fn create_category(&self, category: &CategoryCreate) -> ApiResponse<CategoryPayload> {
        self.request_with_body(Method::Post, "/categories", category)
            .await
    }

    async fn request_with_body<B, D>(&self, method: Method, endpoint: &str, body: &B) -> ApiResponse<D>
    where
        B: Serialize,
        D: DeserializeOwned,
    {
        match serde_json::to_string(body) {
            Ok(body) => self.request(method, endpoint, Some(body)).await,
            Err(e) => ApiResponse::failure(ClientError::Encode(e.to_string()).to_string()),
        }
    }

    async fn request<D: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<String>,
    ) -> ApiResponse<D> {
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            body,
        };

        tracing::debug!(method = method.as_str(), url = %request.url, "api request");

        match self.execute(request).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = %e, "api request failed");
                let message = e.to_string();
                if message.is_empty() {
                    ApiResponse::failure("Network error")
                } else {
                    ApiResponse::failure(message)
                }
            }
        }
    }

    async fn execute<D: DeserializeOwned>(&self, request: HttpRequest) -> Result<ApiResponse<D>, ClientError> {
        let response = self.transport.send(request).await?;
        let value: serde_json::Value = serde_json::from_str(&response.body)?;

        if !response.is_success() {
            let message = ["error", "message", "detail"]
                .iter()
                .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
                .unwrap_or(DEFAULT_ERROR)
                .to_string();
            return Err(ClientError::Status {
                status: response.status,
                message,
            });
        }

        Ok(serde_json::from_value(value)?)
    }
}
