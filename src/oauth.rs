//! OAuth1 request signing.
//!
//! A [`Signer`] turns a request descriptor plus a credential snapshot into
//! a fully-formed [`SignedRequest`]: resolved URL, `Authorization` header
//! carrying the HMAC-SHA1 signature, and body bytes. Signing is a pure
//! function of (descriptor, credentials, nonce, timestamp); the
//! [`Signer::sign_at`] entry point takes a fixed nonce and timestamp so
//! signatures can be reproduced byte-for-byte in tests.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng as _, distr::Alphanumeric};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use sha1::Sha1;
use url::Url;

use crate::error::Result;
use crate::request::Request;

/// Everything outside RFC 3986 unreserved gets escaped. OAuth signatures
/// are computed over exactly this encoding, so the same set is used for
/// query strings and form bodies.
const STRICT_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes a string per RFC 3986 (strict, OAuth-compatible).
pub(crate) fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, STRICT_ENCODE).to_string()
}

/// OAuth1 credential snapshot used to sign a single request.
///
/// The token pair is absent until the client is authorized; signing without
/// it uses an empty token secret, which is how the connect flow's own
/// requests are signed.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Consumer key identifying the API client.
    pub consumer_key: String,
    /// Consumer secret for the API client.
    pub consumer_secret: String,
    /// Auth token, present once authorized.
    pub token: Option<String>,
    /// Auth token secret, present once authorized.
    pub token_secret: Option<String>,
}

impl Credentials {
    /// Creates anonymous credentials from a consumer key/secret pair.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
            token_secret: None,
        }
    }

    /// Adds an auth token and token secret.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self.token_secret = Some(secret.into());
        self
    }

    /// True when both token and token secret are present.
    pub fn is_authorized(&self) -> bool {
        self.token.is_some() && self.token_secret.is_some()
    }
}

/// A ready-to-send request: method, absolute URL, headers, body bytes.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Vec<u8>>,
}

impl SignedRequest {
    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Resolved absolute URL, with GET parameters merged into the query.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers, including the `Authorization` header.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body bytes, when the request carries a body.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Computes signed requests from descriptors and a credential snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Signer<'a> {
    base_url: &'a Url,
    credentials: &'a Credentials,
}

impl<'a> Signer<'a> {
    /// Creates a signer over a base URL and credential snapshot.
    pub fn new(base_url: &'a Url, credentials: &'a Credentials) -> Self {
        Self {
            base_url,
            credentials,
        }
    }

    /// Signs a descriptor with a fresh random nonce and the current Unix
    /// time, so every signed request is unique even for identical
    /// descriptors.
    pub fn sign<S>(&self, request: &Request<S>) -> Result<SignedRequest> {
        self.sign_at(request, &nonce(), unix_timestamp())
    }

    /// Signs a descriptor with an explicit nonce and timestamp. Given the
    /// same inputs the output is byte-identical; never mutates the
    /// descriptor.
    pub fn sign_at<S>(
        &self,
        request: &Request<S>,
        nonce: &str,
        timestamp: u64,
    ) -> Result<SignedRequest> {
        let mut url = self.base_url.join(request.path())?;
        let method = request.method().clone();
        let is_get = method == Method::GET;
        let form_body = !is_get && request.body().is_none();

        let pairs: Vec<(String, String)> = request
            .params()
            .encoded_pairs()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let mut oauth: Vec<(String, String)> = vec![
            (
                "oauth_consumer_key".into(),
                self.credentials.consumer_key.clone(),
            ),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
            ("oauth_version".into(), "1.0".into()),
        ];
        if let Some(token) = &self.credentials.token {
            oauth.push(("oauth_token".into(), token.clone()));
        }

        // Parameters covered by the signature: oauth protocol parameters
        // plus the query string (GET) or form body (other methods). A raw
        // JSON body stays outside the base string.
        let mut signed: Vec<(String, String)> = oauth
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        if is_get || form_body {
            signed.extend(
                pairs
                    .iter()
                    .map(|(k, v)| (percent_encode(k), percent_encode(v))),
            );
        }
        signed.sort();
        let normalized = signed
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.as_str(),
            percent_encode(url.as_str()),
            percent_encode(&normalized)
        );
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.credentials.consumer_secret),
            percent_encode(self.credentials.token_secret.as_deref().unwrap_or(""))
        );
        let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
            .expect("HMAC-SHA1 accepts keys of any length");
        mac.update(base_string.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        oauth.push(("oauth_signature".into(), signature));
        oauth.sort();
        let authorization = format!(
            "OAuth {}",
            oauth
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&authorization)
                .expect("percent-encoded header value is valid ASCII"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let encoded_pairs = || {
            pairs
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        };

        if is_get && !pairs.is_empty() {
            url.set_query(Some(&encoded_pairs()));
        }

        let body = if let Some(json) = request.body() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Some(serde_json::to_vec(json).expect("JSON value serialization cannot fail"))
        } else if form_body && !pairs.is_empty() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
            Some(encoded_pairs().into_bytes())
        } else {
            None
        };

        Ok(SignedRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// Fresh random nonce for one request.
fn nonce() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Current Unix time in seconds.
fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{DictionaryRequest, ListRequest, Params};

    fn fixture_credentials() -> Credentials {
        Credentials::new("ck", "cs").with_token("tok", "ts")
    }

    fn base_url() -> Url {
        Url::parse("https://api.mailindex.io/2.0/").unwrap()
    }

    #[test]
    fn get_request_matches_recorded_fixture() {
        let mut params = Params::new();
        params.insert("subject", "invoice");
        params.insert("limit", 10_u64);
        let request = ListRequest::new(Method::GET, "accounts/42/messages", params);

        let url = base_url();
        let credentials = fixture_credentials();
        let signed = Signer::new(&url, &credentials)
            .sign_at(&request, "abc123", 1_700_000_000)
            .unwrap();

        assert_eq!(
            signed.url().as_str(),
            "https://api.mailindex.io/2.0/accounts/42/messages?limit=10&subject=invoice"
        );
        assert_eq!(
            signed.headers()[AUTHORIZATION],
            "OAuth oauth_consumer_key=\"ck\", oauth_nonce=\"abc123\", \
             oauth_signature=\"x9cBbplypa0dKxZtQHPJ9bwTzRk%3D\", \
             oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1700000000\", \
             oauth_token=\"tok\", oauth_version=\"1.0\""
        );
        assert!(signed.body().is_none());
    }

    #[test]
    fn post_form_parameters_are_signed_and_sent_as_body() {
        let mut params = Params::new();
        params.insert("dst_folder", "Archive");
        let request = DictionaryRequest::new(Method::POST, "accounts/42/messages/5", params);

        let url = base_url();
        let credentials = fixture_credentials();
        let signed = Signer::new(&url, &credentials)
            .sign_at(&request, "abc123", 1_700_000_000)
            .unwrap();

        assert_eq!(
            signed.url().as_str(),
            "https://api.mailindex.io/2.0/accounts/42/messages/5"
        );
        assert_eq!(signed.body(), Some(b"dst_folder=Archive".as_slice()));
        assert_eq!(
            signed.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        let authorization = signed.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(authorization.contains("oauth_signature=\"13H6qzG%2FvBekooEy5FvxcVSW%2BYc%3D\""));
    }

    #[test]
    fn signing_is_deterministic_for_fixed_nonce_and_timestamp() {
        let mut params = Params::new();
        params.insert("subject", "invoice");
        let request = ListRequest::new(Method::GET, "accounts/42/messages", params);

        let url = base_url();
        let credentials = fixture_credentials();
        let signer = Signer::new(&url, &credentials);
        let first = signer.sign_at(&request, "nonce-1", 1_700_000_123).unwrap();
        let second = signer.sign_at(&request, "nonce-1", 1_700_000_123).unwrap();

        assert_eq!(first.url(), second.url());
        assert_eq!(first.headers()[AUTHORIZATION], second.headers()[AUTHORIZATION]);
        assert_eq!(first.body(), second.body());
    }

    #[test]
    fn fresh_nonce_makes_identical_descriptors_sign_differently() {
        let request = DictionaryRequest::new(Method::GET, "accounts/42", Params::new());
        let url = base_url();
        let credentials = fixture_credentials();
        let signer = Signer::new(&url, &credentials);

        let first = signer.sign(&request).unwrap();
        let second = signer.sign(&request).unwrap();
        assert_ne!(
            first.headers()[AUTHORIZATION],
            second.headers()[AUTHORIZATION]
        );
    }

    #[test]
    fn anonymous_credentials_sign_without_a_token() {
        let request = DictionaryRequest::new(Method::POST, "connect_tokens", Params::new());
        let url = base_url();
        let credentials = Credentials::new("ck", "cs");
        let signed = Signer::new(&url, &credentials)
            .sign_at(&request, "abc123", 1_700_000_000)
            .unwrap();

        let authorization = signed.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(!authorization.contains("oauth_token"));
    }

    #[test]
    fn raw_json_body_wins_over_form_parameters() {
        let mut params = Params::new();
        params.insert("ignored", "yes");
        let mut request = DictionaryRequest::new(Method::PUT, "accounts/42/x", params);
        request.set_body(serde_json::json!([{"name": "Archive"}]));

        let url = base_url();
        let credentials = fixture_credentials();
        let signed = Signer::new(&url, &credentials)
            .sign_at(&request, "abc123", 1_700_000_000)
            .unwrap();

        assert_eq!(signed.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(signed.body(), Some(br#"[{"name":"Archive"}]"#.as_slice()));
    }

    #[test]
    fn signing_does_not_mutate_the_descriptor() {
        let mut params = Params::new();
        params.insert("subject", "invoice");
        let request = ListRequest::new(Method::GET, "accounts/42/messages", params);
        let before = request.params().clone();

        let url = base_url();
        let credentials = fixture_credentials();
        let _ = Signer::new(&url, &credentials)
            .sign_at(&request, "abc123", 1_700_000_000)
            .unwrap();

        assert_eq!(request.params(), &before);
    }

    #[test]
    fn strict_encoding_covers_oauth_reserved_characters() {
        assert_eq!(percent_encode("a b+c/d=e"), "a%20b%2Bc%2Fd%3De");
        assert_eq!(percent_encode("safe-._~"), "safe-._~");
    }
}
