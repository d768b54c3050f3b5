//! Carrot request signing.
//!
//! A signed request is described by its parameters sorted by key. The
//! signature is HMAC-SHA256 over
//!
//! ```text
//! METHOD\nhost-without-port\n/endpoint\nk1=v1&k2=v2...
//! ```
//!
//! with raw (unencoded) values, base64 encoded. The wire body repeats the
//! sorted pairs with form-encoded values and appends `sig`.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;
use uuid::Uuid;

use crate::http::HttpMethod;

type HmacSha256 = Hmac<Sha256>;

/// Request parameters. `BTreeMap` keeps keys unique and iterates in byte
/// order, which is the canonical order.
pub type RequestParameters = BTreeMap<String, String>;

/// Per-request freshness values included in every signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStamp {
    pub request_date: u64,
    pub request_id: Uuid,
}

impl RequestStamp {
    /// The current unix time and a fresh v4 UUID.
    pub fn now() -> Self {
        let request_date = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        RequestStamp {
            request_date,
            request_id: Uuid::new_v4(),
        }
    }
}

/// `k=v` pairs joined by `&` in key order, values unencoded.
pub fn canonical_string(params: &RequestParameters) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// The newline-joined string that gets signed.
pub fn signature_base_string(method: HttpMethod, host: &str, endpoint: &str, canonical: &str) -> String {
    format!("{}\n{host}\n{endpoint}\n{canonical}", method.as_str())
}

/// Base64 of HMAC-SHA256(`secret`, `message`).
pub fn sign(secret: &[u8], message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let digest = mac.finalize().into_bytes();
    STANDARD.encode(digest).trim_end().to_string()
}

/// Sorted parameters plus their signature, ready to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub params: RequestParameters,
    pub signature: String,
}

impl SignedEnvelope {
    /// Sign `params` for `method` against `host` (port already stripped) and
    /// `endpoint`.
    pub fn seal(
        secret: &[u8],
        method: HttpMethod,
        host: &str,
        endpoint: &str,
        params: RequestParameters,
    ) -> Self {
        let base = signature_base_string(method, host, endpoint, &canonical_string(&params));
        let signature = sign(secret, &base);
        SignedEnvelope { params, signature }
    }

    /// Form-encoded body: the sorted pairs followed by `sig`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.params)
            .append_pair("sig", &self.signature)
            .finish()
    }
}

/// Base parameters for `user_id` merged with `extra`; keys in `extra` win.
pub fn signed_parameters(
    user_id: &str,
    app_id: &str,
    stamp: &RequestStamp,
    extra: RequestParameters,
) -> RequestParameters {
    let mut params = RequestParameters::new();
    params.insert("api_key".to_string(), user_id.to_string());
    params.insert("game_id".to_string(), app_id.to_string());
    params.insert("request_date".to_string(), stamp.request_date.to_string());
    params.insert("request_id".to_string(), stamp.request_id.to_string());
    params.extend(extra);
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"s3cr3t";

    fn stamp() -> RequestStamp {
        RequestStamp {
            request_date: 1_350_000_000,
            request_id: "6f1c2e1a-3b4d-4c5e-8f90-a1b2c3d4e5f6".parse().unwrap(),
        }
    }

    fn params(extra: &[(&str, &str)]) -> RequestParameters {
        let extra = extra.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        signed_parameters("user1", "42", &stamp(), extra)
    }

    #[test]
    fn canonical_string_is_sorted_and_unencoded() {
        let canonical = canonical_string(&params(&[("achievement_id", "first kill")]));
        assert_eq!(
            canonical,
            "achievement_id=first kill&api_key=user1&game_id=42&request_date=1350000000\
             &request_id=6f1c2e1a-3b4d-4c5e-8f90-a1b2c3d4e5f6"
        );
    }

    #[test]
    fn canonical_string_uses_byte_order() {
        let mut p = RequestParameters::new();
        p.insert("b".into(), "2".into());
        p.insert("B".into(), "1".into());
        p.insert("_".into(), "3".into());
        assert_eq!(canonical_string(&p), "B=1&_=3&b=2");
    }

    #[test]
    fn known_signature() {
        let envelope = SignedEnvelope::seal(
            SECRET,
            HttpMethod::Post,
            "localhost",
            "/me/scores.json",
            params(&[("value", "100")]),
        );
        assert_eq!(envelope.signature, "hBAC74J/TA1rCDi930UNhAwRu6M5PKqQ+GvlpU5LPKA=");
        assert_eq!(
            envelope.encode(),
            "api_key=user1&game_id=42&request_date=1350000000\
             &request_id=6f1c2e1a-3b4d-4c5e-8f90-a1b2c3d4e5f6&value=100\
             &sig=hBAC74J%2FTA1rCDi930UNhAwRu6M5PKqQ%2BGvlpU5LPKA%3D"
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let seal = || {
            SignedEnvelope::seal(SECRET, HttpMethod::Post, "gocarrot.com", "/me/like.json", params(&[("object", "x")]))
        };
        assert_eq!(seal(), seal());
    }

    #[test]
    fn any_value_change_changes_signature() {
        let base = params(&[("value", "100")]);
        let original = SignedEnvelope::seal(SECRET, HttpMethod::Post, "h", "/me/scores.json", base.clone()).signature;
        for key in base.keys() {
            let mut changed = base.clone();
            changed.get_mut(key).unwrap().push('x');
            let sig = SignedEnvelope::seal(SECRET, HttpMethod::Post, "h", "/me/scores.json", changed).signature;
            assert_ne!(sig, original, "changing {key} must change the signature");
        }
    }

    #[test]
    fn boundaries_are_unambiguous() {
        let a = signature_base_string(HttpMethod::Post, "gocarrot.com", "/me/x", "a=1");
        let b = signature_base_string(HttpMethod::Post, "gocarrot.com/me", "/x", "a=1");
        assert_ne!(a, b);
        assert_ne!(sign(SECRET, &a), sign(SECRET, &b));
    }

    #[test]
    fn method_is_part_of_signature() {
        let p = params(&[]);
        let get = SignedEnvelope::seal(SECRET, HttpMethod::Get, "h", "/me/tweet.json", p.clone());
        let post = SignedEnvelope::seal(SECRET, HttpMethod::Post, "h", "/me/tweet.json", p);
        assert_ne!(get.signature, post.signature);
    }

    #[test]
    fn extra_parameters_override_base() {
        let p = params(&[("api_key", "someone-else")]);
        assert_eq!(p["api_key"], "someone-else");
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn stamps_differ_per_call() {
        assert_ne!(RequestStamp::now().request_id, RequestStamp::now().request_id);
    }
}
