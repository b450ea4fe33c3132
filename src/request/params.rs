//! Request parameter values and their wire encodings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A single request parameter value.
///
/// The set of accepted types is closed: anything an endpoint accepts is one
/// of these cases, and each case owns its wire encoding. Dates are sent as
/// Unix epoch seconds, booleans as the `1`/`0` tokens the API expects, and
/// address lists as a single comma-joined string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A plain string value.
    Str(String),
    /// An integral or floating-point number.
    Number(serde_json::Number),
    /// A boolean, encoded as `1` or `0`.
    Bool(bool),
    /// A point in time, encoded as Unix epoch seconds.
    Date(DateTime<Utc>),
    /// A list of strings, encoded comma-joined (e.g. address filters).
    List(Vec<String>),
}

impl ParamValue {
    /// The string sent on the wire for this value.
    pub fn encode(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Date(d) => d.timestamp().to_string(),
            Self::List(items) => items.join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u16> for ParamValue {
    fn from(value: u16) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(ToString::to_string).collect())
    }
}

/// An ordered parameter map.
///
/// Parameters are kept sorted by name so query strings and form bodies come
/// out deterministic. Absent optional parameters are simply never inserted;
/// nothing is ever encoded as empty or null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, replacing any previous value under the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Inserts a parameter only when the value is present.
    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<impl Into<ParamValue>>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Removes a parameter by name.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.0.remove(name)
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// True when no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of parameters set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates `(name, encoded value)` pairs in name order.
    pub fn encoded_pairs(&self) -> impl Iterator<Item = (&str, String)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.encode()))
    }

    /// Merges all parameters from `other` into this map.
    pub fn extend(&mut self, other: Params) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Sort order for endpoints returning ascending or descending results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest or smallest first.
    Ascending,
    /// Newest or largest first.
    Descending,
}

impl SortOrder {
    /// The token sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl From<SortOrder> for ParamValue {
    fn from(value: SortOrder) -> Self {
        Self::Str(value.as_str().to_string())
    }
}

/// Connection status of a mail source, as reported and filtered by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    /// The stored credentials were rejected by the mail server.
    InvalidCredentials,
    /// The mail server could not be reached.
    ConnectionImpossible,
    /// The account does not expose an all-mail view.
    NoAccessToAllMail,
    /// The source is syncing normally.
    Ok,
    /// The source is temporarily disabled.
    TempDisabled,
    /// The source is disabled.
    Disabled,
}

impl AccountStatus {
    /// The token sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::ConnectionImpossible => "CONNECTION_IMPOSSIBLE",
            Self::NoAccessToAllMail => "NO_ACCESS_TO_ALL_MAIL",
            Self::Ok => "OK",
            Self::TempDisabled => "TEMP_DISABLED",
            Self::Disabled => "DISABLED",
        }
    }
}

impl From<AccountStatus> for ParamValue {
    fn from(value: AccountStatus) -> Self {
        Self::Str(value.as_str().to_string())
    }
}

/// IMAP flags to set or unset on a message.
///
/// Each field is tri-state: `Some(true)` sets the flag, `Some(false)` unsets
/// it, `None` leaves it untouched (and sends nothing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageFlags {
    /// Message has been read.
    pub seen: Option<bool>,
    /// Message has been answered.
    pub answered: Option<bool>,
    /// Message is flagged for urgent/special attention.
    pub flagged: Option<bool>,
    /// Message is marked for later removal.
    pub deleted: Option<bool>,
    /// Message has not completed composition.
    pub draft: Option<bool>,
}

impl MessageFlags {
    /// Creates an empty flag set that touches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the set flags into `params` as `flag_<name>` parameters.
    pub(crate) fn apply(&self, params: &mut Params) {
        params.insert_opt("flag_seen", self.seen);
        params.insert_opt("flag_answered", self.answered);
        params.insert_opt("flag_flagged", self.flagged);
        params.insert_opt("flag_deleted", self.deleted);
        params.insert_opt("flag_draft", self.draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bool_encodes_as_numeric_tokens() {
        assert_eq!(ParamValue::Bool(true).encode(), "1");
        assert_eq!(ParamValue::Bool(false).encode(), "0");
    }

    #[test]
    fn date_encodes_as_epoch_seconds() {
        let date = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(ParamValue::Date(date).encode(), "1700000000");
    }

    #[test]
    fn date_round_trip_is_idempotent() {
        let date = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let encoded = ParamValue::Date(date).encode();
        let reparsed = Utc
            .timestamp_opt(encoded.parse::<i64>().unwrap(), 0)
            .unwrap();
        assert_eq!(ParamValue::Date(reparsed).encode(), encoded);
    }

    #[test]
    fn list_encodes_comma_joined() {
        let value: ParamValue = ["a@example.com", "b@example.com"].as_slice().into();
        assert_eq!(value.encode(), "a@example.com,b@example.com");
    }

    #[test]
    fn absent_optionals_are_not_encoded() {
        let mut params = Params::new();
        params.insert_opt("present", Some("yes"));
        params.insert_opt("absent", None::<&str>);
        assert_eq!(params.len(), 1);
        assert!(params.get("absent").is_none());
    }

    #[test]
    fn pairs_come_out_in_name_order() {
        let mut params = Params::new();
        params.insert("subject", "invoice");
        params.insert("limit", 10_u64);
        let pairs: Vec<_> = params.encoded_pairs().collect();
        assert_eq!(
            pairs,
            vec![("limit", "10".to_string()), ("subject", "invoice".to_string())]
        );
    }

    #[test]
    fn message_flags_only_write_set_fields() {
        let flags = MessageFlags {
            seen: Some(true),
            deleted: Some(false),
            ..MessageFlags::new()
        };
        let mut params = Params::new();
        flags.apply(&mut params);
        assert_eq!(params.get("flag_seen"), Some(&ParamValue::Bool(true)));
        assert_eq!(params.get("flag_deleted"), Some(&ParamValue::Bool(false)));
        assert!(params.get("flag_answered").is_none());
    }
}
