//! Request descriptors: typed, parameter-carrying representations of one
//! API call each.
//!
//! A [`Request`] pins down the HTTP method, the (already account-scoped)
//! path, the parameter map, and (through its shape marker) the top-level
//! JSON structure its response must have. Constructing a descriptor never
//! performs I/O; descriptors stay mutable until they are handed to a
//! [`Session`](crate::Session) for execution.

mod endpoints;
mod params;
mod search;

pub use endpoints::{
    ContactListRequest, FileListRequest, FolderMessagesRequest, MessageListRequest,
    MessageRequest, MessageUpdateRequest, SourceCreateRequest, SourceListRequest,
    SourceModifyRequest, ThreadListRequest, ThreadRequest, WebhookCreateRequest,
};
pub use params::{AccountStatus, MessageFlags, ParamValue, Params, SortOrder};
pub use search::SearchFilters;

use std::marker::PhantomData;

use reqwest::Method;
use serde_json::Value;

use crate::error::{Error, Result};

mod sealed {
    pub trait Sealed {}
}

/// Declares the top-level JSON shape a request's response must decode to.
///
/// Implemented only by the shape markers in this module; the `Raw` marker
/// deliberately has no implementation, so raw descriptors cannot reach
/// [`Session::execute`](crate::Session::execute) and are downloaded to a
/// file instead.
pub trait ResponseShape: sealed::Sealed {
    /// The decoded result type.
    type Output;

    /// Human-readable shape name used in mismatch errors.
    const EXPECTED: &'static str;

    /// Decodes a parsed JSON body, failing with
    /// [`Error::ShapeMismatch`] when the top-level structure is wrong.
    fn decode(value: Value) -> Result<Self::Output>;
}

/// Names the top-level type of a JSON value for mismatch errors.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shape marker: the response is a single JSON object.
#[derive(Debug, Clone, Copy)]
pub enum Dictionary {}

impl sealed::Sealed for Dictionary {}

impl ResponseShape for Dictionary {
    type Output = serde_json::Map<String, Value>;

    const EXPECTED: &'static str = "object";

    fn decode(value: Value) -> Result<Self::Output> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(Error::ShapeMismatch {
                expected: Self::EXPECTED,
                found: json_type_name(&other),
            }),
        }
    }
}

/// Shape marker: the response is a JSON array, optionally paginated via
/// `limit`/`offset` parameters.
#[derive(Debug, Clone, Copy)]
pub enum List {}

impl sealed::Sealed for List {}

impl ResponseShape for List {
    type Output = Vec<Value>;

    const EXPECTED: &'static str = "array";

    fn decode(value: Value) -> Result<Self::Output> {
        match value {
            Value::Array(items) => Ok(items),
            other => Err(Error::ShapeMismatch {
                expected: Self::EXPECTED,
                found: json_type_name(&other),
            }),
        }
    }
}

/// Shape marker: the response is a single JSON string.
#[derive(Debug, Clone, Copy)]
pub enum Text {}

impl sealed::Sealed for Text {}

impl ResponseShape for Text {
    type Output = String;

    const EXPECTED: &'static str = "string";

    fn decode(value: Value) -> Result<Self::Output> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::ShapeMismatch {
                expected: Self::EXPECTED,
                found: json_type_name(&other),
            }),
        }
    }
}

/// Shape marker: unparsed bytes. Raw descriptors can only be saved to a
/// file via [`Session::download_to_file`](crate::Session::download_to_file).
#[derive(Debug, Clone, Copy)]
pub enum Raw {}

impl sealed::Sealed for Raw {}

/// A request whose response is a single JSON object.
pub type DictionaryRequest = Request<Dictionary>;
/// A request whose response is a JSON array.
pub type ListRequest = Request<List>;
/// A request whose response is a single JSON string.
pub type TextRequest = Request<Text>;
/// A request whose response is unparsed bytes (file download only).
pub type RawRequest = Request<Raw>;

/// One API call: method, account-scoped path, parameters, optional raw
/// JSON body, and a declared response shape.
///
/// Method and path are fixed at construction. Parameters are sent as the
/// URL query string for GET requests and as a form-encoded body otherwise.
/// When a raw [`body`](Request::set_body) is set it wins over form
/// parameters and is serialized as JSON with a JSON content type; query
/// parameters on a GET are unaffected since body and query are mutually
/// exclusive by method.
#[derive(Debug, Clone)]
pub struct Request<S> {
    method: Method,
    path: String,
    params: Params,
    body: Option<Value>,
    _shape: PhantomData<S>,
}

impl<S> Request<S> {
    pub(crate) fn new(method: Method, path: impl Into<String>, params: Params) -> Self {
        Self {
            method,
            path: path.into(),
            params,
            body: None,
            _shape: PhantomData,
        }
    }

    /// HTTP method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API base URL, e.g. `accounts/42/messages`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parameters sent with this request.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Mutable access to the parameters. Descriptors must not be mutated
    /// once handed to a session for execution.
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Sets a single parameter.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(name, value);
    }

    /// Raw JSON body, when one is set.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Sets a raw JSON body. Form parameters are dropped from the network
    /// body once this is set.
    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dictionary_rejects_array() {
        let err = Dictionary::decode(json!([1, 2])).unwrap_err();
        match err {
            Error::ShapeMismatch { expected, found } => {
                assert_eq!(expected, "object");
                assert_eq!(found, "array");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn list_rejects_object() {
        let err = List::decode(json!({"a": 1})).unwrap_err();
        match err {
            Error::ShapeMismatch { expected, found } => {
                assert_eq!(expected, "array");
                assert_eq!(found, "object");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn text_rejects_object() {
        let err = Text::decode(json!({"success": true})).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                expected: "string",
                found: "object"
            }
        ));
    }

    #[test]
    fn text_accepts_string() {
        let value = Text::decode(json!("https://example.com/file")).unwrap();
        assert_eq!(value, "https://example.com/file");
    }

    #[test]
    fn raw_body_coexists_with_params() {
        let mut params = Params::new();
        params.insert("limit", 5_u64);
        let mut request = DictionaryRequest::new(Method::PUT, "accounts/1/thing", params);
        request.set_body(json!([{"name": "Archive"}]));
        assert!(request.body().is_some());
        assert_eq!(request.params().len(), 1);
    }
}
