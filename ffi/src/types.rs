//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use carrot_core::{AuthorizationStatus, HttpMethod, SignedResponse};

/// Opaque handle to a `CarrotClient`. C callers receive a pointer to this
/// and pass it back into every FFI function. The host executes requests, so
/// the client carries no transport.
pub struct FfiCarrotClient {
    pub(crate) inner: carrot_core::CarrotClient<()>,
}

/// Move a Rust string onto the C heap. Interior NULs yield an empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `url` is absolute and already carries the `http`/`https` scheme chosen
/// from the configured hostname. `body` is set for GET requests too and
/// must be sent as the request body.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: carrot_core::HttpRequest) -> *mut Self {
        let url = c_string(req.url());
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to a `carrot_parse_*` function. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCarrotResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    InvalidArg = 2,
    Panic = 3,
}

/// `AuthorizationStatus` as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiAuthorizationStatus {
    NotCreated = 0,
    NotAuthorized = 1,
    Undetermined = 2,
    ReadOnly = 3,
    Authorized = 4,
}

impl From<AuthorizationStatus> for FfiAuthorizationStatus {
    fn from(s: AuthorizationStatus) -> Self {
        match s {
            AuthorizationStatus::NotCreated => FfiAuthorizationStatus::NotCreated,
            AuthorizationStatus::NotAuthorized => FfiAuthorizationStatus::NotAuthorized,
            AuthorizationStatus::Undetermined => FfiAuthorizationStatus::Undetermined,
            AuthorizationStatus::ReadOnly => FfiAuthorizationStatus::ReadOnly,
            AuthorizationStatus::Authorized => FfiAuthorizationStatus::Authorized,
        }
    }
}

impl From<FfiAuthorizationStatus> for AuthorizationStatus {
    fn from(s: FfiAuthorizationStatus) -> Self {
        match s {
            FfiAuthorizationStatus::NotCreated => AuthorizationStatus::NotCreated,
            FfiAuthorizationStatus::NotAuthorized => AuthorizationStatus::NotAuthorized,
            FfiAuthorizationStatus::Undetermined => AuthorizationStatus::Undetermined,
            FfiAuthorizationStatus::ReadOnly => AuthorizationStatus::ReadOnly,
            FfiAuthorizationStatus::Authorized => AuthorizationStatus::Authorized,
        }
    }
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok` and `status` holds the classification;
/// `body` is non-null only for a successful signed GET. On failure
/// `error_message` is a human-readable C string and `status` is
/// `Undetermined`.
#[repr(C)]
pub struct FfiCarrotResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub status: FfiAuthorizationStatus,
    pub body: *mut c_char,
}

impl FfiCarrotResult {
    fn boxed(error_code: FfiErrorCode, error_message: *mut c_char, status: FfiAuthorizationStatus, body: *mut c_char) -> *mut Self {
        Box::into_raw(Box::new(FfiCarrotResult {
            error_code,
            error_message,
            status,
            body,
        }))
    }

    pub(crate) fn ok_status(status: AuthorizationStatus) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), status.into(), std::ptr::null_mut())
    }

    pub(crate) fn from_signed(response: SignedResponse) -> *mut Self {
        match response {
            SignedResponse::Status(status) => Self::ok_status(status),
            SignedResponse::Body(body) => Self::boxed(
                FfiErrorCode::Ok,
                std::ptr::null_mut(),
                FfiAuthorizationStatus::Authorized,
                c_string(body),
            ),
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            FfiAuthorizationStatus::Undetermined,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for an argument that is not valid UTF-8.
    pub(crate) fn invalid_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::InvalidArg,
            c_string(format!("invalid argument: {name}")),
            FfiAuthorizationStatus::Undetermined,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg),
            FfiAuthorizationStatus::Undetermined,
            std::ptr::null_mut(),
        )
    }
}
