//! Authorization outcomes and HTTP status classification.

use std::fmt;

use tracing::error;

use crate::http::{HttpMethod, HttpResponse};

/// A remote user's relationship to the application, as reported by Carrot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    NotCreated,
    NotAuthorized,
    /// The response could not be classified.
    #[default]
    Undetermined,
    ReadOnly,
    Authorized,
}

impl AuthorizationStatus {
    pub const fn message(self) -> &'static str {
        match self {
            AuthorizationStatus::NotCreated => "Carrot user does not exist.",
            AuthorizationStatus::NotAuthorized => "Carrot user has not authorized application.",
            AuthorizationStatus::Undetermined => "Carrot user status unknown.",
            AuthorizationStatus::ReadOnly => {
                "Carrot user has not granted 'publish_actions' permission."
            }
            AuthorizationStatus::Authorized => "Carrot user authorized.",
        }
    }

    /// Map a Carrot status code, or `None` when the code has no meaning.
    pub fn from_status_code(status: u16) -> Option<Self> {
        match status {
            200 | 201 => Some(AuthorizationStatus::Authorized),
            401 => Some(AuthorizationStatus::ReadOnly),
            405 => Some(AuthorizationStatus::NotAuthorized),
            422 => Some(AuthorizationStatus::NotCreated),
            _ => None,
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of a signed request. Only a successful GET carries a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedResponse {
    Status(AuthorizationStatus),
    Body(String),
}

impl SignedResponse {
    /// The status, treating a returned body as `Authorized`.
    pub fn status(&self) -> AuthorizationStatus {
        match self {
            SignedResponse::Status(status) => *status,
            SignedResponse::Body(_) => AuthorizationStatus::Authorized,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            SignedResponse::Body(body) => Some(body),
            SignedResponse::Status(_) => None,
        }
    }
}

impl From<AuthorizationStatus> for SignedResponse {
    fn from(status: AuthorizationStatus) -> Self {
        SignedResponse::Status(status)
    }
}

/// Classify a response, reporting unmapped codes to the diagnostic sink.
pub(crate) fn classify(response: &HttpResponse, context: &'static str) -> AuthorizationStatus {
    match AuthorizationStatus::from_status_code(response.status) {
        Some(status) => status,
        None => {
            error!(status = response.status, body = %response.body, "{context}");
            AuthorizationStatus::Undetermined
        }
    }
}

/// Classify the response to a signed request.
pub(crate) fn classify_signed(method: HttpMethod, response: HttpResponse) -> SignedResponse {
    let status = classify(&response, "error posting signed request to Carrot");
    match (method, status) {
        (HttpMethod::Get, AuthorizationStatus::Authorized) => SignedResponse::Body(response.body),
        _ => SignedResponse::Status(status),
    }
}
