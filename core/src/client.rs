//! Carrot request builders, response classifiers and executing client.
//!
//! # Design
//! `CarrotClient` holds an immutable `ClientConfig` and a `Transport`. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that classifies an `HttpResponse`; both are free of
//! I/O. The executing methods (`validate_user`, `post_*`, `get_tweet`) run the
//! pair through the transport with a fresh `RequestStamp`.

use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::signing::{signed_parameters, RequestParameters, RequestStamp, SignedEnvelope};
use crate::status::{classify, classify_signed, AuthorizationStatus, SignedResponse};
use crate::transport::Transport;
#[cfg(feature = "ureq")]
use crate::transport::UreqTransport;
use crate::types::{compact_json, Action};

pub const ACHIEVEMENTS_ENDPOINT: &str = "/me/achievements.json";
pub const SCORES_ENDPOINT: &str = "/me/scores.json";
pub const ACTIONS_ENDPOINT: &str = "/me/actions.json";
pub const LIKE_ENDPOINT: &str = "/me/like.json";
pub const TWEET_ENDPOINT: &str = "/me/tweet.json";

/// Client for the Carrot API.
///
/// Holds no mutable state, so `&CarrotClient` can be shared between threads
/// as long as the transport can. `T` is the transport; a client that only
/// builds and parses can use `()`.
#[derive(Debug, Clone)]
pub struct CarrotClient<T> {
    config: ClientConfig,
    transport: T,
}

#[cfg(feature = "ureq")]
impl CarrotClient<UreqTransport> {
    /// Client against the default Carrot host.
    pub fn new(app_id: &str, app_secret: &str) -> Self {
        Self::with_transport(ClientConfig::new(app_id, app_secret), UreqTransport::new())
    }

    /// Client against an explicit `host[:port]`.
    pub fn with_hostname(app_id: &str, app_secret: &str, hostname: &str) -> Self {
        Self::with_transport(
            ClientConfig::with_hostname(app_id, app_secret, hostname),
            UreqTransport::new(),
        )
    }
}

impl<T> CarrotClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        CarrotClient { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_validate_user(&self, user_id: &str, access_token: &str) -> HttpRequest {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("access_token", access_token)
            .append_pair("api_key", user_id)
            .finish();
        HttpRequest::form(
            HttpMethod::Post,
            self.config.scheme(),
            self.config.hostname(),
            format!("/games/{}/users.json", self.config.app_id()),
            body,
        )
    }

    pub fn build_post_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        stamp: &RequestStamp,
    ) -> Result<HttpRequest> {
        let params = RequestParameters::from([("achievement_id".to_string(), achievement_id.to_string())]);
        Ok(self.build_signed_request(HttpMethod::Post, user_id, ACHIEVEMENTS_ENDPOINT, params, stamp))
    }

    pub fn build_post_high_score(&self, user_id: &str, score: i64, stamp: &RequestStamp) -> Result<HttpRequest> {
        let params = RequestParameters::from([("value".to_string(), score.to_string())]);
        Ok(self.build_signed_request(HttpMethod::Post, user_id, SCORES_ENDPOINT, params, stamp))
    }

    pub fn build_post_action(&self, user_id: &str, action: &Action, stamp: &RequestStamp) -> Result<HttpRequest> {
        let params = action_parameters(action)?;
        Ok(self.build_signed_request(HttpMethod::Post, user_id, ACTIONS_ENDPOINT, params, stamp))
    }

    pub fn build_post_like(&self, user_id: &str, object: &str, stamp: &RequestStamp) -> Result<HttpRequest> {
        let params = RequestParameters::from([("object".to_string(), object.to_string())]);
        Ok(self.build_signed_request(HttpMethod::Post, user_id, LIKE_ENDPOINT, params, stamp))
    }

    pub fn build_get_tweet(&self, user_id: &str, action: &Action, stamp: &RequestStamp) -> Result<HttpRequest> {
        let params = action_parameters(action)?;
        Ok(self.build_signed_request(HttpMethod::Get, user_id, TWEET_ENDPOINT, params, stamp))
    }

    /// Build a signed request against `endpoint`.
    ///
    /// The envelope travels in the body for GET as well as POST; Carrot reads
    /// signed parameters from the form body regardless of method.
    pub fn build_signed_request(
        &self,
        method: HttpMethod,
        user_id: &str,
        endpoint: &str,
        extra: RequestParameters,
        stamp: &RequestStamp,
    ) -> HttpRequest {
        let params = signed_parameters(user_id, self.config.app_id(), stamp, extra);
        let envelope = SignedEnvelope::seal(
            self.config.app_secret(),
            method,
            self.config.host_without_port(),
            endpoint,
            params,
        );
        HttpRequest::form(
            method,
            self.config.scheme(),
            self.config.hostname(),
            endpoint.to_string(),
            envelope.encode(),
        )
    }

    pub fn parse_validate_user(&self, response: &HttpResponse) -> AuthorizationStatus {
        classify(response, "error validating Carrot user")
    }

    pub fn parse_signed_post(&self, response: HttpResponse) -> AuthorizationStatus {
        classify_signed(HttpMethod::Post, response).status()
    }

    /// A successful GET yields the raw response body.
    pub fn parse_signed_get(&self, response: HttpResponse) -> SignedResponse {
        classify_signed(HttpMethod::Get, response)
    }
}

impl<T: Transport> CarrotClient<T> {
    /// Check whether `user_id` has authorized the application.
    pub fn validate_user(&self, user_id: &str, access_token: &str) -> Result<AuthorizationStatus> {
        let response = self.transport.execute(self.build_validate_user(user_id, access_token))?;
        Ok(self.parse_validate_user(&response))
    }

    pub fn post_achievement(&self, user_id: &str, achievement_id: &str) -> Result<AuthorizationStatus> {
        let request = self.build_post_achievement(user_id, achievement_id, &RequestStamp::now())?;
        Ok(self.parse_signed_post(self.transport.execute(request)?))
    }

    pub fn post_high_score(&self, user_id: &str, score: i64) -> Result<AuthorizationStatus> {
        let request = self.build_post_high_score(user_id, score, &RequestStamp::now())?;
        Ok(self.parse_signed_post(self.transport.execute(request)?))
    }

    pub fn post_action(&self, user_id: &str, action: &Action) -> Result<AuthorizationStatus> {
        let request = self.build_post_action(user_id, action, &RequestStamp::now())?;
        Ok(self.parse_signed_post(self.transport.execute(request)?))
    }

    pub fn post_like(&self, user_id: &str, object: &str) -> Result<AuthorizationStatus> {
        let request = self.build_post_like(user_id, object, &RequestStamp::now())?;
        Ok(self.parse_signed_post(self.transport.execute(request)?))
    }

    pub fn get_tweet(&self, user_id: &str, action: &Action) -> Result<SignedResponse> {
        let request = self.build_get_tweet(user_id, action, &RequestStamp::now())?;
        Ok(self.parse_signed_get(self.transport.execute(request)?))
    }
}

/// Parameters shared by actions and tweets.
fn action_parameters(action: &Action) -> Result<RequestParameters> {
    let mut params = RequestParameters::new();
    params.insert("action_id".to_string(), action.action_id.clone());
    params.insert("action_properties".to_string(), compact_json(&action.action_properties)?);
    params.insert("object_properties".to_string(), compact_json(&action.object_properties)?);
    if let Some(instance) = &action.object_instance_id {
        params.insert("object_instance_id".to_string(), instance.clone());
    }
    Ok(params)
}
