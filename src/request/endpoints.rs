//! Endpoint-specific request builders.
//!
//! Each builder wraps a base [`Request`](super::Request) and exposes the
//! parameter set its endpoint accepts. Builders are created by the
//! [`Client`](crate::Client) endpoint constructors; call
//! [`request`](MessageListRequest::request) (or convert with `From`) to
//! hand the finished descriptor to a session.

use chrono::{DateTime, Utc};

use super::params::{AccountStatus, MessageFlags, SortOrder};
use super::search::SearchFilters;
use super::{Dictionary, DictionaryRequest, List, ListRequest, Request};

macro_rules! builder_plumbing {
    ($name:ident, $shape:ty) => {
        impl $name {
            pub(crate) fn new(inner: Request<$shape>) -> Self {
                Self { inner }
            }

            /// Borrows the underlying descriptor for execution.
            pub fn request(&self) -> &Request<$shape> {
                &self.inner
            }

            /// Consumes the builder, returning the underlying descriptor.
            pub fn into_request(self) -> Request<$shape> {
                self.inner
            }
        }

        impl From<$name> for Request<$shape> {
            fn from(builder: $name) -> Self {
                builder.inner
            }
        }
    };
}

/// A listing of messages in the account.
///
/// Address filters are OR-combined within one filter and AND-combined
/// across filters.
#[derive(Debug, Clone)]
pub struct MessageListRequest {
    inner: ListRequest,
}

builder_plumbing!(MessageListRequest, List);

impl MessageListRequest {
    /// Messages whose subject matches this search string. Wrap the string
    /// in `/` to use a regular expression instead of simple matching.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.inner.set_param("subject", subject.into());
        self
    }

    /// Filter by complete folder name (with hierarchy delimiter) or a
    /// symbolic folder name such as `\Starred` (RFC 6154).
    #[must_use]
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.inner.set_param("folder", folder.into());
        self
    }

    /// Filter messages by the account source label.
    #[must_use]
    pub fn source(mut self, label: impl Into<String>) -> Self {
        self.inner.set_param("source", label.into());
        self
    }

    /// Include thread size in the result.
    #[must_use]
    pub fn include_thread_size(mut self, include: bool) -> Self {
        self.inner.set_param("include_thread_size", include);
        self
    }

    /// Include message bodies. Bodies are fetched from the mail server, so
    /// expect a performance hit.
    #[must_use]
    pub fn include_body(mut self, include: bool) -> Self {
        self.inner.set_param("include_body", include);
        self
    }

    /// `0` (default), `1` for parsed headers, or `raw` for one unparsed
    /// string.
    #[must_use]
    pub fn include_headers(mut self, mode: impl Into<String>) -> Self {
        self.inner.set_param("include_headers", mode.into());
        self
    }

    /// Include IMAP flags of messages in the result.
    #[must_use]
    pub fn include_flags(mut self, include: bool) -> Self {
        self.inner.set_param("include_flags", include);
        self
    }

    /// With `include_body`, restrict body parts to this MIME type (for
    /// example `text/html`).
    #[must_use]
    pub fn body_type(mut self, mime: impl Into<String>) -> Self {
        self.inner.set_param("body_type", mime.into());
        self
    }

    /// Include raw message sources in the result.
    #[must_use]
    pub fn include_source(mut self, include: bool) -> Self {
        self.inner.set_param("include_source", include);
        self
    }

    /// Attach shared address/date filters.
    #[must_use]
    pub fn filters(mut self, filters: SearchFilters) -> Self {
        filters.apply(self.inner.params_mut());
        self
    }

    /// Maximum number of results (API maximum is 100).
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner.set_param("limit", limit);
        self
    }

    /// Zero-based offset to start the list at.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.inner.set_param("offset", offset);
        self
    }
}

/// File, contact and other information about a single message.
#[derive(Debug, Clone)]
pub struct MessageRequest {
    inner: DictionaryRequest,
}

builder_plumbing!(MessageRequest, Dictionary);

impl MessageRequest {
    /// Include the message body. Fetched from the mail server on demand.
    #[must_use]
    pub fn include_body(mut self, include: bool) -> Self {
        self.inner.set_param("include_body", include);
        self
    }

    /// `0` (default), `1` for parsed headers, or `raw`.
    #[must_use]
    pub fn include_headers(mut self, mode: impl Into<String>) -> Self {
        self.inner.set_param("include_headers", mode.into());
        self
    }

    /// Include IMAP flags.
    #[must_use]
    pub fn include_flags(mut self, include: bool) -> Self {
        self.inner.set_param("include_flags", include);
        self
    }

    /// With `include_body`, restrict body parts to this MIME type.
    #[must_use]
    pub fn body_type(mut self, mime: impl Into<String>) -> Self {
        self.inner.set_param("body_type", mime.into());
        self
    }

    /// Include the raw message source.
    #[must_use]
    pub fn include_source(mut self, include: bool) -> Self {
        self.inner.set_param("include_source", include);
        self
    }

    /// Include thread size.
    #[must_use]
    pub fn include_thread_size(mut self, include: bool) -> Self {
        self.inner.set_param("include_thread_size", include);
        self
    }
}

/// Copy or move a message between folders, optionally across sources,
/// updating flags along the way.
#[derive(Debug, Clone)]
pub struct MessageUpdateRequest {
    inner: DictionaryRequest,
}

builder_plumbing!(MessageUpdateRequest, Dictionary);

impl MessageUpdateRequest {
    /// Label of the source the message should be copied to. Required when
    /// moving across sources; for a move within one source the destination
    /// folder alone is enough.
    #[must_use]
    pub fn dst_source(mut self, label: impl Into<String>) -> Self {
        self.inner.set_param("dst_source", label.into());
        self
    }

    /// Move instead of copy (the default is copy).
    #[must_use]
    pub fn move_message(mut self, move_it: bool) -> Self {
        self.inner.set_param("move", move_it);
        self
    }

    /// Flags to add or remove on the message being updated.
    #[must_use]
    pub fn flags(mut self, flags: MessageFlags) -> Self {
        flags.apply(self.inner.params_mut());
        self
    }
}

/// A single thread, or the thread a message belongs to.
#[derive(Debug, Clone)]
pub struct ThreadRequest {
    inner: DictionaryRequest,
}

builder_plumbing!(ThreadRequest, Dictionary);

impl ThreadRequest {
    /// Include message bodies.
    #[must_use]
    pub fn include_body(mut self, include: bool) -> Self {
        self.inner.set_param("include_body", include);
        self
    }

    /// `0` (default), `1` for parsed headers, or `raw`.
    #[must_use]
    pub fn include_headers(mut self, mode: impl Into<String>) -> Self {
        self.inner.set_param("include_headers", mode.into());
        self
    }

    /// Include IMAP flags.
    #[must_use]
    pub fn include_flags(mut self, include: bool) -> Self {
        self.inner.set_param("include_flags", include);
        self
    }

    /// With `include_body`, restrict body parts to this MIME type.
    #[must_use]
    pub fn body_type(mut self, mime: impl Into<String>) -> Self {
        self.inner.set_param("body_type", mime.into());
        self
    }

    /// Include raw message sources.
    #[must_use]
    pub fn include_source(mut self, include: bool) -> Self {
        self.inner.set_param("include_source", include);
        self
    }

    /// Maximum number of messages in the `messages` property (API maximum
    /// is 100).
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner.set_param("limit", limit);
        self
    }

    /// Zero-based offset into the thread's messages.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.inner.set_param("offset", offset);
        self
    }
}

/// A listing of threads in the account.
#[derive(Debug, Clone)]
pub struct ThreadListRequest {
    inner: ListRequest,
}

builder_plumbing!(ThreadListRequest, List);

impl ThreadListRequest {
    /// Threads whose subject matches this search string.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.inner.set_param("subject", subject.into());
        self
    }

    /// Filter by folder name or symbolic folder name.
    #[must_use]
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.inner.set_param("folder", folder.into());
        self
    }

    /// Threads with at least one message dated before this time.
    #[must_use]
    pub fn active_before(mut self, date: DateTime<Utc>) -> Self {
        self.inner.set_param("active_before", date);
        self
    }

    /// Threads with at least one message dated after this time.
    #[must_use]
    pub fn active_after(mut self, date: DateTime<Utc>) -> Self {
        self.inner.set_param("active_after", date);
        self
    }

    /// Threads whose first message is dated before this time.
    #[must_use]
    pub fn started_before(mut self, date: DateTime<Utc>) -> Self {
        self.inner.set_param("started_before", date);
        self
    }

    /// Threads whose first message is dated after this time.
    #[must_use]
    pub fn started_after(mut self, date: DateTime<Utc>) -> Self {
        self.inner.set_param("started_after", date);
        self
    }

    /// Attach shared address/date filters.
    #[must_use]
    pub fn filters(mut self, filters: SearchFilters) -> Self {
        filters.apply(self.inner.params_mut());
        self
    }

    /// Maximum number of results.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner.set_param("limit", limit);
        self
    }

    /// Zero-based offset.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.inner.set_param("offset", offset);
        self
    }
}

/// The account's contacts, sorted and filtered.
#[derive(Debug, Clone)]
pub struct ContactListRequest {
    inner: DictionaryRequest,
}

builder_plumbing!(ContactListRequest, Dictionary);

impl ContactListRequest {
    /// Name or email address to look for.
    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.inner.set_param("search", query.into());
        self
    }

    /// Only contacts seen in at least one email dated before this time.
    #[must_use]
    pub fn active_before(mut self, date: DateTime<Utc>) -> Self {
        self.inner.set_param("active_before", date);
        self
    }

    /// Only contacts seen in at least one email dated after this time.
    #[must_use]
    pub fn active_after(mut self, date: DateTime<Utc>) -> Self {
        self.inner.set_param("active_after", date);
        self
    }

    /// Sort field: `email`, `count`, `received_count` or `sent_count`.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.inner.set_param("sort_by", field.into());
        self
    }

    /// Sort order of the returned results.
    #[must_use]
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.inner.set_param("sort_order", order);
        self
    }

    /// Maximum number of results (API maximum is 250).
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner.set_param("limit", limit);
        self
    }

    /// Zero-based offset.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.inner.set_param("offset", offset);
        self
    }
}

/// Details of files found as email attachments.
#[derive(Debug, Clone)]
pub struct FileListRequest {
    inner: ListRequest,
}

builder_plumbing!(FileListRequest, List);

impl FileListRequest {
    /// Filter files by name. Shell wildcards (`*`, `?`, `[]`) work, as do
    /// regular expressions wrapped in `/`: `/\.jpe?g$/` matches anything
    /// ending in .jpg or .jpeg.
    #[must_use]
    pub fn file_name(mut self, pattern: impl Into<String>) -> Self {
        self.inner.set_param("file_name", pattern.into());
        self
    }

    /// Minimum file size in bytes.
    #[must_use]
    pub fn file_size_min(mut self, bytes: u64) -> Self {
        self.inner.set_param("file_size_min", bytes);
        self
    }

    /// Maximum file size in bytes.
    #[must_use]
    pub fn file_size_max(mut self, bytes: u64) -> Self {
        self.inner.set_param("file_size_max", bytes);
        self
    }

    /// Filter files by the account source label.
    #[must_use]
    pub fn source(mut self, label: impl Into<String>) -> Self {
        self.inner.set_param("source", label.into());
        self
    }

    /// Group occurrences of the same document, using the same algorithm as
    /// file revisions but restricted to the filtered results.
    #[must_use]
    pub fn group_by_revisions(mut self, group: bool) -> Self {
        self.inner.set_param("group_by_revisions", group);
        self
    }

    /// Attach shared address/date filters.
    #[must_use]
    pub fn filters(mut self, filters: SearchFilters) -> Self {
        filters.apply(self.inner.params_mut());
        self
    }

    /// Maximum number of results.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner.set_param("limit", limit);
        self
    }

    /// Zero-based offset.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.inner.set_param("offset", offset);
        self
    }
}

/// Messages in one folder, refreshed from the mail server rather than the
/// index. Expect a slower response than the account-wide listing.
#[derive(Debug, Clone)]
pub struct FolderMessagesRequest {
    inner: ListRequest,
}

builder_plumbing!(FolderMessagesRequest, List);

impl FolderMessagesRequest {
    /// Include thread size in the result.
    #[must_use]
    pub fn include_thread_size(mut self, include: bool) -> Self {
        self.inner.set_param("include_thread_size", include);
        self
    }

    /// Include message bodies.
    #[must_use]
    pub fn include_body(mut self, include: bool) -> Self {
        self.inner.set_param("include_body", include);
        self
    }

    /// With `include_body`, restrict body parts to this MIME type.
    #[must_use]
    pub fn body_type(mut self, mime: impl Into<String>) -> Self {
        self.inner.set_param("body_type", mime.into());
        self
    }

    /// `0` (default), `1` for parsed headers, or `raw`.
    #[must_use]
    pub fn include_headers(mut self, mode: impl Into<String>) -> Self {
        self.inner.set_param("include_headers", mode.into());
        self
    }

    /// Include IMAP flags.
    #[must_use]
    pub fn include_flags(mut self, include: bool) -> Self {
        self.inner.set_param("include_flags", include);
        self
    }

    /// `true` restricts the list to messages with `\Seen` set, `false` to
    /// messages without it (i.e. unread messages).
    #[must_use]
    pub fn flag_seen(mut self, seen: bool) -> Self {
        self.inner.set_param("flag_seen", seen);
        self
    }

    /// Run the refresh job asynchronously on the server.
    #[must_use]
    pub fn asynchronous(mut self, run_async: bool) -> Self {
        self.inner.set_param("async", run_async);
        self
    }

    /// Maximum number of results.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner.set_param("limit", limit);
        self
    }

    /// Zero-based offset.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.inner.set_param("offset", offset);
        self
    }
}

/// The mail sources assigned to the account.
#[derive(Debug, Clone)]
pub struct SourceListRequest {
    inner: ListRequest,
}

builder_plumbing!(SourceListRequest, List);

impl SourceListRequest {
    /// Only sources whose status has this value.
    #[must_use]
    pub fn status(mut self, status: AccountStatus) -> Self {
        self.inner.set_param("status", status);
        self
    }

    /// `false` lists sources that are not working correctly, `true` the
    /// opposite.
    #[must_use]
    pub fn status_ok(mut self, ok: bool) -> Self {
        self.inner.set_param("status_ok", ok);
        self
    }
}

/// Create a new mail source under the account.
///
/// It is usually preferred to connect a new mailbox through the
/// authorization flow; this request exists for servers that are configured
/// directly.
#[derive(Debug, Clone)]
pub struct SourceCreateRequest {
    inner: DictionaryRequest,
}

builder_plumbing!(SourceCreateRequest, Dictionary);

impl SourceCreateRequest {
    /// Password for the IMAP server. Ignored when provider parameters are
    /// set.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.inner.set_param("password", password.into());
        self
    }

    /// OAuth2 refresh token obtained from the mailbox provider.
    #[must_use]
    pub fn provider_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.inner.set_param("provider_refresh_token", token.into());
        self
    }

    /// OAuth2 client id the refresh token was obtained with.
    #[must_use]
    pub fn provider_consumer_key(mut self, key: impl Into<String>) -> Self {
        self.inner.set_param("provider_consumer_key", key.into());
        self
    }

    /// IP address of the end user requesting the source to be created.
    #[must_use]
    pub fn origin_ip(mut self, ip: impl Into<String>) -> Self {
        self.inner.set_param("origin_ip", ip.into());
        self
    }

    /// Filter out messages flagged as deleted (off by default).
    #[must_use]
    pub fn expunge_on_deleted_flag(mut self, expunge: bool) -> Self {
        self.inner.set_param("expunge_on_deleted_flag", expunge);
        self
    }

    /// Sync every folder, including ones filtered out by default such as
    /// Drafts.
    #[must_use]
    pub fn sync_all_folders(mut self, sync_all: bool) -> Self {
        self.inner.set_param("sync_all_folders", sync_all);
        self
    }

    /// Explicit folder selection, e.g. `All,Trash`.
    #[must_use]
    pub fn sync_folders(mut self, folders: impl Into<String>) -> Self {
        self.inner.set_param("sync_folders", folders.into());
        self
    }

    /// Turn on syncing of the `seen` and `flagged` IMAP flags.
    #[must_use]
    pub fn sync_flags(mut self, sync: bool) -> Self {
        self.inner.set_param("sync_flags", sync);
        self
    }

    /// Show every attachment, including ones filtered out by default such
    /// as signature images.
    #[must_use]
    pub fn raw_file_list(mut self, raw: bool) -> Self {
        self.inner.set_param("raw_file_list", raw);
        self
    }

    /// URL to POST to once the initial sync completes.
    #[must_use]
    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.inner.set_param("callback_url", url.into());
        self
    }

    /// URL to POST to when the source's connection status changes.
    #[must_use]
    pub fn status_callback_url(mut self, url: impl Into<String>) -> Self {
        self.inner.set_param("status_callback_url", url.into());
        self
    }
}

/// Modify a mail source on the account.
#[derive(Debug, Clone)]
pub struct SourceModifyRequest {
    inner: DictionaryRequest,
}

builder_plumbing!(SourceModifyRequest, Dictionary);

impl SourceModifyRequest {
    /// Set to `true` to re-enable a `TEMP_DISABLED` or `DISABLED` source.
    #[must_use]
    pub fn status(mut self, enabled: bool) -> Self {
        self.inner.set_param("status", enabled);
        self
    }

    /// Open a connection and reset the status to what the mail server
    /// reports. Don't combine with other parameters.
    #[must_use]
    pub fn force_status_check(mut self, force: bool) -> Self {
        self.inner.set_param("force_status_check", force);
        self
    }

    /// New password for the IMAP server.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.inner.set_param("password", password.into());
        self
    }

    /// OAuth2 refresh token obtained from the mailbox provider.
    #[must_use]
    pub fn provider_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.inner.set_param("provider_refresh_token", token.into());
        self
    }

    /// OAuth2 client id the refresh token was obtained with.
    #[must_use]
    pub fn provider_consumer_key(mut self, key: impl Into<String>) -> Self {
        self.inner.set_param("provider_consumer_key", key.into());
        self
    }

    /// URL to POST to when the source's connection status changes.
    #[must_use]
    pub fn status_callback_url(mut self, url: impl Into<String>) -> Self {
        self.inner.set_param("status_callback_url", url.into());
        self
    }

    /// Filter out messages flagged as deleted.
    #[must_use]
    pub fn expunge_on_deleted_flag(mut self, expunge: bool) -> Self {
        self.inner.set_param("expunge_on_deleted_flag", expunge);
        self
    }

    /// Sync every folder.
    #[must_use]
    pub fn sync_all_folders(mut self, sync_all: bool) -> Self {
        self.inner.set_param("sync_all_folders", sync_all);
        self
    }
}

/// Create a webhook firing on new messages matching its filters.
#[derive(Debug, Clone)]
pub struct WebhookCreateRequest {
    inner: DictionaryRequest,
}

builder_plumbing!(WebhookCreateRequest, Dictionary);

impl WebhookCreateRequest {
    /// Only messages sent to this address or domain.
    #[must_use]
    pub fn filter_to(mut self, address: impl Into<String>) -> Self {
        self.inner.set_param("filter_to", address.into());
        self
    }

    /// Only messages received from this address or domain.
    #[must_use]
    pub fn filter_from(mut self, address: impl Into<String>) -> Self {
        self.inner.set_param("filter_from", address.into());
        self
    }

    /// Only messages with this address or domain CC'ed.
    #[must_use]
    pub fn filter_cc(mut self, address: impl Into<String>) -> Self {
        self.inner.set_param("filter_cc", address.into());
        self
    }

    /// Only messages whose subject matches this string or `/`-wrapped
    /// regular expression.
    #[must_use]
    pub fn filter_subject(mut self, subject: impl Into<String>) -> Self {
        self.inner.set_param("filter_subject", subject.into());
        self
    }

    /// Also fire when a message is added to this folder.
    #[must_use]
    pub fn filter_folder_added(mut self, folder: impl Into<String>) -> Self {
        self.inner.set_param("filter_folder_added", folder.into());
        self
    }

    /// Also fire when a message is removed from this folder.
    #[must_use]
    pub fn filter_folder_removed(mut self, folder: impl Into<String>) -> Self {
        self.inner.set_param("filter_folder_removed", folder.into());
        self
    }

    /// Include the message body in webhook payloads.
    #[must_use]
    pub fn include_body(mut self, include: bool) -> Self {
        self.inner.set_param("include_body", include);
        self
    }

    /// With `include_body`, restrict body parts to this MIME type.
    #[must_use]
    pub fn body_type(mut self, mime: impl Into<String>) -> Self {
        self.inner.set_param("body_type", mime.into());
        self
    }
}
