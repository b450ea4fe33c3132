//! Shared search filters for message, file, and thread listings.

use chrono::{DateTime, Utc};

use super::params::{ParamValue, Params, SortOrder};

/// Address and date-range filters accepted by every search-style listing.
///
/// The `to`/`from`/`cc`/`bcc` filters take either a single address or a
/// list; a list is sent comma-joined and treated as an OR combination by
/// the API, while distinct filters combine as AND. Build a filter set once
/// and attach it to a listing request with its `filters` method.
///
/// ```
/// use mailindex_client::{SearchFilters, SortOrder};
///
/// let filters = SearchFilters::new()
///     .from("billing@example.com")
///     .sort_order(SortOrder::Descending);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    params: Params,
}

impl SearchFilters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest messages exchanged with this address or top-level domain:
    /// received from it, sent to it, or sent by anyone to both it and the
    /// mailbox owner.
    #[must_use]
    pub fn email(mut self, address: impl Into<String>) -> Self {
        self.params.insert("email", address.into());
        self
    }

    /// Address(es) messages have been sent to.
    #[must_use]
    pub fn to(mut self, addresses: impl Into<ParamValue>) -> Self {
        self.params.insert("to", addresses);
        self
    }

    /// Address(es) messages have been received from.
    #[must_use]
    pub fn from(mut self, addresses: impl Into<ParamValue>) -> Self {
        self.params.insert("from", addresses);
        self
    }

    /// Address(es) CC'ed on the messages.
    #[must_use]
    pub fn cc(mut self, addresses: impl Into<ParamValue>) -> Self {
        self.params.insert("cc", addresses);
        self
    }

    /// Address(es) BCC'ed on the messages.
    #[must_use]
    pub fn bcc(mut self, addresses: impl Into<ParamValue>) -> Self {
        self.params.insert("bcc", addresses);
        self
    }

    /// Only messages indexed before this time. This is the indexing time,
    /// not the message date.
    #[must_use]
    pub fn indexed_before(mut self, date: DateTime<Utc>) -> Self {
        self.params.insert("indexed_before", date);
        self
    }

    /// Only messages indexed after this time.
    #[must_use]
    pub fn indexed_after(mut self, date: DateTime<Utc>) -> Self {
        self.params.insert("indexed_after", date);
        self
    }

    /// Only messages whose `Date:` header is before this time.
    #[must_use]
    pub fn date_before(mut self, date: DateTime<Utc>) -> Self {
        self.params.insert("date_before", date);
        self
    }

    /// Only messages whose `Date:` header is after this time.
    #[must_use]
    pub fn date_after(mut self, date: DateTime<Utc>) -> Self {
        self.params.insert("date_after", date);
        self
    }

    /// Sort order of the returned results.
    #[must_use]
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.params.insert("sort_order", order);
        self
    }

    /// Merges the filters into a request's parameter map.
    pub(crate) fn apply(self, params: &mut Params) {
        params.extend(self.params);
    }
}
