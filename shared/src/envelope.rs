use serde::{Deserialize, Serialize};

pub const DEFAULT_ERROR: &str = "An error occurred";

/// The `{success, data?, message?, error?}` wrapper every backend response
/// comes in, and every `ApiClient` call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Collapses the envelope into a plain result. A successful envelope with
    /// no payload is an error for callers that need one.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| DEFAULT_ERROR.to_string())),
        }
    }

    /// Like `into_result`, for operations whose success carries no payload.
    pub fn into_unit(self) -> Result<(), String> {
        if self.success {
            Ok(())
        } else {
            Err(self.error.unwrap_or_else(|| DEFAULT_ERROR.to_string()))
        }
    }
}
