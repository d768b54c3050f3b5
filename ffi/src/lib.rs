//! C-ABI wrapper around `carrot-core`.
//!
//! # Overview
//! Exposes the Carrot request builders and response classifiers through
//! `extern "C"` functions so a game engine with a C FFI can sign requests
//! and interpret responses while keeping its own HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `carrot_build_*` / `carrot_parse_*` mirror the core API 1:1; the host
//!   executes the request in between, sending `body` for GET requests too.
//! - Properties cross the boundary as JSON object strings; null means empty.
//! - The C caller owns all returned pointers and must call the matching
//!   `carrot_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use carrot_core::{Action, CarrotClient, ClientConfig, HttpResponse, Properties, RequestStamp};

use types::*;

/// Borrow a C string argument. `None` for null or non-UTF-8 input.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Parse an optional JSON object argument. Null yields an empty map.
///
/// # Safety
/// Same contract as `str_arg`.
unsafe fn properties_arg(ptr: *const c_char) -> Option<Properties> {
    if ptr.is_null() {
        return Some(Properties::new());
    }
    let text = unsafe { str_arg(ptr) }?;
    match serde_json::from_str::<serde_json::Value>(text).ok()? {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Assemble an `Action` from C arguments; `object_instance_id` may be null.
///
/// # Safety
/// Same contract as `str_arg` for every pointer.
unsafe fn action_arg(
    action_id: *const c_char,
    object_instance_id: *const c_char,
    action_properties: *const c_char,
    object_properties: *const c_char,
) -> Option<Action> {
    let mut action = Action::new(unsafe { str_arg(action_id) }?);
    if !object_instance_id.is_null() {
        action = action.with_object_instance(unsafe { str_arg(object_instance_id) }?);
    }
    Some(
        action
            .with_action_properties(unsafe { properties_arg(action_properties) }?)
            .with_object_properties(unsafe { properties_arg(object_properties) }?),
    )
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client for `app_id` / `app_secret`.
///
/// `hostname` may be null to use the default Carrot host. Returns null if
/// `app_id` or `app_secret` is null or not UTF-8, or if a panic occurs.
/// The caller must free the returned pointer with `carrot_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_client_new(
    app_id: *const c_char,
    app_secret: *const c_char,
    hostname: *const c_char,
) -> *mut FfiCarrotClient {
    catch_unwind(|| {
        let (Some(app_id), Some(app_secret)) = (unsafe { str_arg(app_id) }, unsafe { str_arg(app_secret) }) else {
            return std::ptr::null_mut();
        };
        let config = if hostname.is_null() {
            ClientConfig::new(app_id, app_secret)
        } else {
            match unsafe { str_arg(hostname) } {
                Some(host) => ClientConfig::with_hostname(app_id, app_secret, host),
                None => return std::ptr::null_mut(),
            }
        };
        let inner = CarrotClient::with_transport(config, ());
        Box::into_raw(Box::new(FfiCarrotClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `carrot_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_client_free(client: *mut FfiCarrotClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the unsigned user validation request.
///
/// Returns null if any argument is null or not UTF-8.
/// The caller must free the returned pointer with `carrot_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_build_validate_user(
    client: *const FfiCarrotClient,
    user_id: *const c_char,
    access_token: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(user_id), Some(token)) = (unsafe { str_arg(user_id) }, unsafe { str_arg(access_token) }) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(client.inner.build_validate_user(user_id, token))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed achievement post.
///
/// Returns null if any argument is null or not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_build_post_achievement(
    client: *const FfiCarrotClient,
    user_id: *const c_char,
    achievement_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(user_id), Some(achievement)) = (unsafe { str_arg(user_id) }, unsafe { str_arg(achievement_id) })
        else {
            return std::ptr::null_mut();
        };
        match client.inner.build_post_achievement(user_id, achievement, &RequestStamp::now()) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed high score post.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_build_post_high_score(
    client: *const FfiCarrotClient,
    user_id: *const c_char,
    score: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(user_id) = (unsafe { str_arg(user_id) }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_post_high_score(user_id, score, &RequestStamp::now()) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed action post.
///
/// `object_instance_id`, `action_properties` and `object_properties` may be
/// null. Properties must be JSON objects. Returns null on invalid input.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_build_post_action(
    client: *const FfiCarrotClient,
    user_id: *const c_char,
    action_id: *const c_char,
    object_instance_id: *const c_char,
    action_properties: *const c_char,
    object_properties: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(user_id) = (unsafe { str_arg(user_id) }) else {
            return std::ptr::null_mut();
        };
        let Some(action) =
            (unsafe { action_arg(action_id, object_instance_id, action_properties, object_properties) })
        else {
            return std::ptr::null_mut();
        };
        match client.inner.build_post_action(user_id, &action, &RequestStamp::now()) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed like post.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_build_post_like(
    client: *const FfiCarrotClient,
    user_id: *const c_char,
    object: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(user_id), Some(object)) = (unsafe { str_arg(user_id) }, unsafe { str_arg(object) }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_post_like(user_id, object, &RequestStamp::now()) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed tweet GET. Arguments as for `carrot_build_post_action`.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_build_get_tweet(
    client: *const FfiCarrotClient,
    user_id: *const c_char,
    action_id: *const c_char,
    object_instance_id: *const c_char,
    action_properties: *const c_char,
    object_properties: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(user_id) = (unsafe { str_arg(user_id) }) else {
            return std::ptr::null_mut();
        };
        let Some(action) =
            (unsafe { action_arg(action_id, object_instance_id, action_properties, object_properties) })
        else {
            return std::ptr::null_mut();
        };
        match client.inner.build_get_tweet(user_id, &action, &RequestStamp::now()) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Option<HttpResponse> {
    let body = if resp.body.is_null() {
        ""
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_str().ok()?
    };
    Some(HttpResponse::new(resp.status, body))
}

/// Shared argument checks for the `carrot_parse_*` functions.
fn parse_with(
    client: *const FfiCarrotClient,
    response: *const FfiHttpResponse,
    classify: impl FnOnce(&CarrotClient<()>, HttpResponse) -> *mut FfiCarrotResult,
) -> *mut FfiCarrotResult {
    if client.is_null() {
        return FfiCarrotResult::null_arg("client");
    }
    if response.is_null() {
        return FfiCarrotResult::null_arg("response");
    }
    let client = unsafe { &*client };
    match ffi_response_to_core(unsafe { &*response }) {
        Some(core_resp) => classify(&client.inner, core_resp),
        None => FfiCarrotResult::invalid_arg("response.body"),
    }
}

/// Classify the response to a user validation request.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_parse_validate_user(
    client: *const FfiCarrotClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCarrotResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| {
            FfiCarrotResult::ok_status(c.parse_validate_user(&resp))
        })
    })
    .unwrap_or_else(|_| FfiCarrotResult::panic("panic in carrot_parse_validate_user"))
}

/// Classify the response to a signed POST.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_parse_signed_post(
    client: *const FfiCarrotClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCarrotResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| FfiCarrotResult::ok_status(c.parse_signed_post(resp)))
    })
    .unwrap_or_else(|_| FfiCarrotResult::panic("panic in carrot_parse_signed_post"))
}

/// Classify the response to a signed GET. On success `body` holds the raw
/// response text.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_parse_signed_get(
    client: *const FfiCarrotClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCarrotResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| FfiCarrotResult::from_signed(c.parse_signed_get(resp)))
    })
    .unwrap_or_else(|_| FfiCarrotResult::panic("panic in carrot_parse_signed_get"))
}

/// Human-readable message for `status`. Free with `carrot_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_status_message(status: FfiAuthorizationStatus) -> *mut c_char {
    catch_unwind(|| c_string(carrot_core::AuthorizationStatus::from(status).message()))
        .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `carrot_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiCarrotResult` returned by any `carrot_parse_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_free_result(result: *mut FfiCarrotResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.body.is_null() {
            drop(unsafe { CString::from_raw(result.body) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn carrot_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn new_client(hostname: &str) -> *mut FfiCarrotClient {
        let app_id = CString::new("42").unwrap();
        let secret = CString::new("s3cr3t").unwrap();
        let host = CString::new(hostname).unwrap();
        carrot_client_new(app_id.as_ptr(), secret.as_ptr(), host.as_ptr())
    }

    fn read(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client("localhost:8080");
        assert!(!client.is_null());
        carrot_client_free(client);
    }

    #[test]
    fn client_new_null_secret_returns_null() {
        let app_id = CString::new("42").unwrap();
        let client = carrot_client_new(app_id.as_ptr(), std::ptr::null(), std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_new_null_hostname_uses_default() {
        let app_id = CString::new("42").unwrap();
        let secret = CString::new("s3cr3t").unwrap();
        let client = carrot_client_new(app_id.as_ptr(), secret.as_ptr(), std::ptr::null());
        let user = CString::new("user1").unwrap();
        let object = CString::new("game").unwrap();
        let req = carrot_build_post_like(client, user.as_ptr(), object.as_ptr());
        assert_eq!(read(unsafe { (*req).url }), "https://gocarrot.com/me/like.json");

        carrot_free_request(req);
        carrot_client_free(client);
    }

    #[test]
    fn client_free_null_is_safe() {
        carrot_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_validate_user_returns_form_post() {
        let client = new_client("localhost:8080");
        let user = CString::new("user1").unwrap();
        let token = CString::new("tok").unwrap();
        let req = carrot_build_validate_user(client, user.as_ptr(), token.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Post);
        assert_eq!(read(req_ref.url), "http://localhost:8080/games/42/users.json");
        assert_eq!(read(req_ref.body), "access_token=tok&api_key=user1");
        assert_eq!(req_ref.headers_len, 1);
        let header = unsafe { &*req_ref.headers };
        assert_eq!(read(header.key), "content-type");
        assert_eq!(read(header.value), "application/x-www-form-urlencoded");

        carrot_free_request(req);
        carrot_client_free(client);
    }

    #[test]
    fn build_null_client_returns_null() {
        let user = CString::new("user1").unwrap();
        let req = carrot_build_post_high_score(std::ptr::null(), user.as_ptr(), 10);
        assert!(req.is_null());
    }

    #[test]
    fn build_high_score_is_signed() {
        let client = new_client("localhost:8080");
        let user = CString::new("user1").unwrap();
        let req = carrot_build_post_high_score(client, user.as_ptr(), 100);
        let req_ref = unsafe { &*req };
        assert_eq!(read(req_ref.url), "http://localhost:8080/me/scores.json");
        let body = read(req_ref.body);
        assert!(body.contains("value=100"));
        assert!(body.contains("&sig="));

        carrot_free_request(req);
        carrot_client_free(client);
    }

    #[test]
    fn build_action_with_null_optionals() {
        let client = new_client("localhost:8080");
        let user = CString::new("user1").unwrap();
        let action = CString::new("cook").unwrap();
        let req = carrot_build_post_action(
            client,
            user.as_ptr(),
            action.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            std::ptr::null(),
        );
        assert!(!req.is_null());
        let body = read(unsafe { (*req).body });
        assert!(body.contains("action_properties=%7B%7D"));
        assert!(!body.contains("object_instance_id"));

        carrot_free_request(req);
        carrot_client_free(client);
    }

    #[test]
    fn build_action_rejects_non_object_properties() {
        let client = new_client("localhost:8080");
        let user = CString::new("user1").unwrap();
        let action = CString::new("cook").unwrap();
        let props = CString::new("[1,2]").unwrap();
        let req = carrot_build_post_action(
            client,
            user.as_ptr(),
            action.as_ptr(),
            std::ptr::null(),
            props.as_ptr(),
            std::ptr::null(),
        );
        assert!(req.is_null());
        carrot_client_free(client);
    }

    #[test]
    fn build_get_tweet_is_get_with_body() {
        let client = new_client("localhost:8080");
        let user = CString::new("user1").unwrap();
        let action = CString::new("cook").unwrap();
        let instance = CString::new("pie-1").unwrap();
        let props = CString::new(r#"{"name":"Pie"}"#).unwrap();
        let req = carrot_build_get_tweet(
            client,
            user.as_ptr(),
            action.as_ptr(),
            instance.as_ptr(),
            std::ptr::null(),
            props.as_ptr(),
        );
        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Get);
        assert_eq!(read(req_ref.url), "http://localhost:8080/me/tweet.json");
        let body = read(req_ref.body);
        assert!(body.contains("object_instance_id=pie-1"));
        assert!(body.contains("object_properties=%7B%22name%22%3A%22Pie%22%7D"));

        carrot_free_request(req);
        carrot_client_free(client);
    }

    #[test]
    fn parse_validate_user_table() {
        let client = new_client("localhost:8080");
        let body = CString::new("").unwrap();
        for (code, expected) in [
            (200, FfiAuthorizationStatus::Authorized),
            (201, FfiAuthorizationStatus::Authorized),
            (401, FfiAuthorizationStatus::ReadOnly),
            (405, FfiAuthorizationStatus::NotAuthorized),
            (422, FfiAuthorizationStatus::NotCreated),
            (500, FfiAuthorizationStatus::Undetermined),
        ] {
            let resp = FfiHttpResponse {
                status: code,
                body: body.as_ptr(),
            };
            let result = carrot_parse_validate_user(client, &resp);
            let r = unsafe { &*result };
            assert_eq!(r.error_code, FfiErrorCode::Ok);
            assert_eq!(r.status, expected, "status {code}");
            assert!(r.body.is_null());
            carrot_free_result(result);
        }
        carrot_client_free(client);
    }

    #[test]
    fn parse_signed_get_success_carries_body() {
        let client = new_client("localhost:8080");
        let body = CString::new("user1 just did cook").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = carrot_parse_signed_get(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.status, FfiAuthorizationStatus::Authorized);
        assert_eq!(read(r.body), "user1 just did cook");

        carrot_free_result(result);
        carrot_client_free(client);
    }

    #[test]
    fn parse_signed_get_read_only_has_no_body() {
        let client = new_client("localhost:8080");
        let resp = FfiHttpResponse {
            status: 401,
            body: std::ptr::null(),
        };
        let result = carrot_parse_signed_get(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.status, FfiAuthorizationStatus::ReadOnly);
        assert!(r.body.is_null());

        carrot_free_result(result);
        carrot_client_free(client);
    }

    #[test]
    fn parse_signed_post_success() {
        let client = new_client("localhost:8080");
        let resp = FfiHttpResponse {
            status: 201,
            body: std::ptr::null(),
        };
        let result = carrot_parse_signed_post(client, &resp);
        assert_eq!(unsafe { &*result }.status, FfiAuthorizationStatus::Authorized);
        carrot_free_result(result);
        carrot_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
        };
        let result = carrot_parse_signed_post(std::ptr::null(), &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(read(r.error_message), "null argument: client");

        carrot_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client("localhost:8080");
        let result = carrot_parse_validate_user(client, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        carrot_free_result(result);
        carrot_client_free(client);
    }

    #[test]
    fn status_message_matches_core() {
        let msg = carrot_status_message(FfiAuthorizationStatus::NotCreated);
        assert_eq!(read(msg), "Carrot user does not exist.");
        carrot_free_string(msg);
    }

    #[test]
    fn free_request_null_is_safe() {
        carrot_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        carrot_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        carrot_free_string(std::ptr::null_mut());
    }
}
