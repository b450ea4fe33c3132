//! Mailindex API client: credential state, path resolution, and typed
//! request construction.

use std::path::Path;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::oauth::{Credentials, SignedRequest, Signer, percent_encode};
use crate::request::{
    ContactListRequest, DictionaryRequest, FileListRequest, FolderMessagesRequest, ListRequest,
    MessageFlags, MessageListRequest, MessageRequest, MessageUpdateRequest, Params, RawRequest,
    Request, ResponseShape, SourceCreateRequest, SourceListRequest, SourceModifyRequest,
    TextRequest, ThreadListRequest, ThreadRequest, WebhookCreateRequest,
};
use crate::session::Session;
use crate::store::{CredentialStore, StoredCredentials};

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.mailindex.io/2.0/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Email providers the connect flow can pre-select for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    /// Any IMAP server, configured manually.
    GenericImap,
    /// Gmail / Google Apps.
    Gmail,
    /// Yahoo Mail.
    Yahoo,
    /// AOL Mail.
    Aol,
    /// Hotmail / Outlook.com.
    Hotmail,
}

impl ProviderType {
    /// The provider hint sent with the connect-token request; generic IMAP
    /// sends none and lets the user fill in server settings.
    fn as_param(self) -> Option<&'static str> {
        match self {
            Self::GenericImap => None,
            Self::Gmail => Some("gmail"),
            Self::Yahoo => Some("yahoo"),
            Self::Aol => Some("aol"),
            Self::Hotmail => Some("hotmail"),
        }
    }
}

/// Client for the Mailindex email-indexing API.
///
/// A `Client` owns the OAuth consumer credentials, the (optional) token
/// pair and account id of the authorized user, and the [`Session`] that
/// executes requests. Endpoint methods build typed request descriptors and
/// never touch the network; pass descriptors to [`Client::execute`] /
/// [`Client::download`] (or sign them yourself with
/// [`Client::signed_request`]) to run them.
///
/// Authorization moves the client from anonymous to authorized via the
/// connect-token flow: [`Client::begin_authorization`], then
/// [`Client::fetch_account_for_connect_token`], then
/// [`Client::complete_authorization`] with the fetched response.
///
/// # Examples
/// ```no_run
/// # use mailindex_client::Client;
/// # #[tokio::main]
/// # async fn main() -> Result<(), mailindex_client::Error> {
/// let client = Client::builder("consumer-key", "consumer-secret")
///     .credentials("token", "token-secret", "42")
///     .build()?;
///
/// let request = client.get_messages()?.subject("invoice").limit(10);
/// let messages = client.execute(request.request()).await?;
/// println!("{} messages", messages.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    base_url: Url,
    credentials: Credentials,
    account_id: Option<String>,
    timeout: Duration,
    session: Session,
    store: Option<Box<dyn CredentialStore>>,
}

impl Client {
    /// Creates a client with the default base URL and timeout and no
    /// token pair.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(consumer_key, consumer_secret).build()
    }

    /// Creates a builder for configuring base URL, timeout, credentials,
    /// and a credential store.
    pub fn builder(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(consumer_key, consumer_secret)
    }

    /// The account id requests are scoped to, once one is known.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// True when a token and token secret are present.
    pub fn is_authorized(&self) -> bool {
        self.credentials.is_authorized()
    }

    /// The per-execution timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The session executing this client's requests.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Builds an `accounts/<id>/...` path from percent-encoded components.
    ///
    /// # Errors
    ///
    /// [`Error::Precondition`] when no account id is set yet; nothing
    /// reaches the network in that case.
    pub fn account_path(&self, components: &[&str]) -> Result<String> {
        let account_id = self.account_id.as_deref().ok_or_else(|| {
            Error::Precondition("no account id set; authorize the client first".to_string())
        })?;
        let mut path = format!("accounts/{}", percent_encode(account_id));
        for component in components {
            path.push('/');
            path.push_str(&percent_encode(component));
        }
        Ok(path)
    }

    // ---- Generic request constructors -----------------------------------

    /// A request for an arbitrary path whose response is a JSON object.
    pub fn dictionary_request(
        &self,
        method: Method,
        path: impl Into<String>,
        params: Params,
    ) -> DictionaryRequest {
        Request::new(method, path, params)
    }

    /// A request for an arbitrary path whose response is a JSON array.
    pub fn list_request(
        &self,
        method: Method,
        path: impl Into<String>,
        params: Params,
    ) -> ListRequest {
        Request::new(method, path, params)
    }

    /// A request for an arbitrary path whose response is a JSON string.
    pub fn text_request(
        &self,
        method: Method,
        path: impl Into<String>,
        params: Params,
    ) -> TextRequest {
        Request::new(method, path, params)
    }

    /// A request for an arbitrary path whose response is unparsed bytes,
    /// for downloading to a file.
    pub fn raw_request(
        &self,
        method: Method,
        path: impl Into<String>,
        params: Params,
    ) -> RawRequest {
        Request::new(method, path, params)
    }

    // ---- Account --------------------------------------------------------

    /// The current account's details.
    pub fn get_account(&self) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(Method::GET, self.account_path(&[])?, Params::new()))
    }

    /// Modify the current account's info.
    pub fn update_account(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        params.insert_opt("first_name", first_name);
        params.insert_opt("last_name", last_name);
        Ok(self.dictionary_request(Method::POST, self.account_path(&[])?, params))
    }

    /// Delete the current account.
    pub fn delete_account(&self) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(Method::DELETE, self.account_path(&[])?, Params::new()))
    }

    // ---- Contacts -------------------------------------------------------

    /// The account's contacts.
    pub fn get_contacts(&self) -> Result<ContactListRequest> {
        Ok(ContactListRequest::new(self.dictionary_request(
            Method::GET,
            self.account_path(&["contacts"])?,
            Params::new(),
        )))
    }

    /// The contact with the given email address.
    pub fn get_contact(&self, email: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::GET,
            self.account_path(&["contacts", email])?,
            Params::new(),
        ))
    }

    /// Latest attachments exchanged with a contact: files attached to
    /// email received from them, sent to them, or sent by anyone to both
    /// them and the mailbox owner.
    pub fn get_contact_files(&self, email: &str) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["contacts", email, "files"])?,
            Params::new(),
        ))
    }

    /// Latest messages exchanged with a contact.
    pub fn get_contact_messages(&self, email: &str) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["contacts", email, "messages"])?,
            Params::new(),
        ))
    }

    /// Latest threads exchanged with a contact.
    pub fn get_contact_threads(&self, email: &str) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["contacts", email, "threads"])?,
            Params::new(),
        ))
    }

    // ---- Email addresses ------------------------------------------------

    /// The email addresses configured on the account.
    pub fn get_email_addresses(&self) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["email_addresses"])?,
            Params::new(),
        ))
    }

    /// Associate a new email address with the account.
    pub fn add_email_address(&self, email: &str) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        params.insert("email_address", email);
        Ok(self.dictionary_request(
            Method::POST,
            self.account_path(&["email_addresses"])?,
            params,
        ))
    }

    /// Update an email address; `primary` makes it the account's primary
    /// address.
    pub fn update_email_address(&self, email: &str, primary: bool) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        params.insert("primary", primary);
        Ok(self.dictionary_request(
            Method::POST,
            self.account_path(&["email_addresses", email])?,
            params,
        ))
    }

    /// Disassociate an email address from the account.
    pub fn delete_email_address(&self, email: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::DELETE,
            self.account_path(&["email_addresses", email])?,
            Params::new(),
        ))
    }

    // ---- Files ----------------------------------------------------------

    /// Details of files found as email attachments.
    pub fn get_files(&self) -> Result<FileListRequest> {
        Ok(FileListRequest::new(self.list_request(
            Method::GET,
            self.account_path(&["files"])?,
            Params::new(),
        )))
    }

    /// Details about one file.
    pub fn get_file(&self, file_id: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::GET,
            self.account_path(&["files", file_id])?,
            Params::new(),
        ))
    }

    /// Files that can be compared with the given file.
    pub fn get_file_changes(&self, file_id: &str) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["files", file_id, "changes"])?,
            Params::new(),
        ))
    }

    /// A public-facing URL the file can be downloaded from.
    pub fn get_file_content_url(&self, file_id: &str) -> Result<TextRequest> {
        let mut params = Params::new();
        params.insert("as_link", true);
        Ok(self.text_request(
            Method::GET,
            self.account_path(&["files", file_id, "content"])?,
            params,
        ))
    }

    /// The contents of one file, for download via [`Client::download`].
    pub fn get_file_content(&self, file_id: &str) -> Result<RawRequest> {
        Ok(self.raw_request(
            Method::GET,
            self.account_path(&["files", file_id, "content"])?,
            Params::new(),
        ))
    }

    /// Files related to the given file, based on name similarity.
    pub fn get_related_files(&self, file_id: &str) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["files", file_id, "related"])?,
            Params::new(),
        ))
    }

    /// Revisions of the given file attached to other emails in the
    /// mailbox.
    pub fn get_file_revisions(&self, file_id: &str) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["files", file_id, "revisions"])?,
            Params::new(),
        ))
    }

    // ---- Messages -------------------------------------------------------

    /// List email messages for the account.
    pub fn get_messages(&self) -> Result<MessageListRequest> {
        Ok(MessageListRequest::new(self.list_request(
            Method::GET,
            self.account_path(&["messages"])?,
            Params::new(),
        )))
    }

    /// File, contact, and other information about one message.
    ///
    /// `message_id` can be the message id or email message id of the
    /// message; a provider message id prefixed with `gm-` also works.
    pub fn get_message(&self, message_id: &str) -> Result<MessageRequest> {
        Ok(MessageRequest::new(self.dictionary_request(
            Method::GET,
            self.account_path(&["messages", message_id])?,
            Params::new(),
        )))
    }

    /// Copy or move a message into `destination_folder`, optionally across
    /// sources.
    pub fn update_message(
        &self,
        message_id: &str,
        destination_folder: &str,
    ) -> Result<MessageUpdateRequest> {
        let mut params = Params::new();
        params.insert("dst_folder", destination_folder);
        Ok(MessageUpdateRequest::new(self.dictionary_request(
            Method::POST,
            self.account_path(&["messages", message_id])?,
            params,
        )))
    }

    /// Delete a message from the source mail server. For providers with
    /// label semantics the message is moved to the trash folder instead.
    pub fn delete_message(&self, message_id: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::DELETE,
            self.account_path(&["messages", message_id])?,
            Params::new(),
        ))
    }

    /// Text portions of a message body, fetched from the mail server on
    /// demand. Attachments are not included; list them via the message's
    /// `files` property and download with [`Client::get_file_content`].
    pub fn get_message_body(
        &self,
        message_id: &str,
        body_type: Option<&str>,
    ) -> Result<ListRequest> {
        let mut params = Params::new();
        params.insert_opt("type", body_type);
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["messages", message_id, "body"])?,
            params,
        ))
    }

    /// Current IMAP flags of a message. Never cached; fetched from the
    /// mail server on each call.
    pub fn get_message_flags(&self, message_id: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::GET,
            self.account_path(&["messages", message_id, "flags"])?,
            Params::new(),
        ))
    }

    /// Add or remove IMAP flags on a message.
    pub fn update_message_flags(
        &self,
        message_id: &str,
        flags: MessageFlags,
    ) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        flags.apply(&mut params);
        Ok(self.dictionary_request(
            Method::POST,
            self.account_path(&["messages", message_id, "flags"])?,
            params,
        ))
    }

    /// Folders (or provider labels) a message appears in.
    pub fn get_message_folders(&self, message_id: &str) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["messages", message_id, "folders"])?,
            Params::new(),
        ))
    }

    /// Add the message to a folder and/or remove it from one, without
    /// touching its other folders.
    pub fn update_message_folders(
        &self,
        message_id: &str,
        add_to_folder: Option<&str>,
        remove_from_folder: Option<&str>,
    ) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        params.insert_opt("add", add_to_folder);
        params.insert_opt("remove", remove_from_folder);
        Ok(self.dictionary_request(
            Method::POST,
            self.account_path(&["messages", message_id, "folders"])?,
            params,
        ))
    }

    /// Overwrite the full set of folders a message should appear in.
    /// Provide plain folder names and/or symbolic names (special-use
    /// attributes, where the server supports them).
    pub fn set_message_folders(
        &self,
        message_id: &str,
        folder_names: &[&str],
        symbolic_folder_names: &[&str],
    ) -> Result<DictionaryRequest> {
        let mut request = self.dictionary_request(
            Method::PUT,
            self.account_path(&["messages", message_id, "folders"])?,
            Params::new(),
        );
        request.set_body(folder_body(folder_names, symbolic_folder_names));
        Ok(request)
    }

    /// Complete headers of a message, parsed into arrays. Fetched from the
    /// mail server on demand.
    pub fn get_message_headers(&self, message_id: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::GET,
            self.account_path(&["messages", message_id, "headers"])?,
            Params::new(),
        ))
    }

    /// Complete headers of a message as one raw unparsed string.
    pub fn get_message_headers_raw(&self, message_id: &str) -> Result<TextRequest> {
        let mut params = Params::new();
        params.insert("raw", true);
        Ok(self.text_request(
            Method::GET,
            self.account_path(&["messages", message_id, "headers"])?,
            params,
        ))
    }

    /// The raw RFC 822 source of a message, including attachments, with no
    /// parsing or decoding. Download it with [`Client::download`].
    pub fn get_message_source(&self, message_id: &str) -> Result<RawRequest> {
        Ok(self.raw_request(
            Method::GET,
            self.account_path(&["messages", message_id, "source"])?,
            Params::new(),
        ))
    }

    /// Other messages in the same thread as the given message.
    pub fn get_message_thread(&self, message_id: &str) -> Result<ThreadRequest> {
        Ok(ThreadRequest::new(self.dictionary_request(
            Method::GET,
            self.account_path(&["messages", message_id, "thread"])?,
            Params::new(),
        )))
    }

    // ---- Sources --------------------------------------------------------

    /// Mail sources assigned to the account. Data from multiple sources is
    /// merged into one set; create separate accounts to query sources
    /// independently.
    pub fn get_sources(&self) -> Result<SourceListRequest> {
        Ok(SourceListRequest::new(self.list_request(
            Method::GET,
            self.account_path(&["sources"])?,
            Params::new(),
        )))
    }

    /// Create a new source under the account. It is usually preferred to
    /// connect a mailbox via [`Client::begin_authorization`] instead.
    pub fn create_source(
        &self,
        email: &str,
        server: &str,
        username: &str,
        use_ssl: bool,
        port: u16,
        source_type: &str,
    ) -> Result<SourceCreateRequest> {
        let mut params = Params::new();
        params.insert("email", email);
        params.insert("server", server);
        params.insert("username", username);
        params.insert("use_ssl", use_ssl);
        params.insert("port", port);
        params.insert("type", source_type);
        Ok(SourceCreateRequest::new(self.dictionary_request(
            Method::POST,
            self.account_path(&["sources"])?,
            params,
        )))
    }

    /// Parameters and status for one source. `"0"` works as an alias for
    /// the account's first source.
    pub fn get_source(&self, label: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::GET,
            self.account_path(&["sources", label])?,
            Params::new(),
        ))
    }

    /// Modify a source.
    pub fn update_source(&self, label: &str) -> Result<SourceModifyRequest> {
        Ok(SourceModifyRequest::new(self.dictionary_request(
            Method::POST,
            self.account_path(&["sources", label])?,
            Params::new(),
        )))
    }

    /// Delete a source.
    pub fn delete_source(&self, label: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::DELETE,
            self.account_path(&["sources", label])?,
            Params::new(),
        ))
    }

    /// Folders existing in a source. Extended counts (unseen messages) and
    /// an index bypass both hit the mail server, so expect slower
    /// responses when set.
    pub fn get_source_folders(
        &self,
        label: &str,
        include_extended_counts: bool,
        no_cache: bool,
    ) -> Result<ListRequest> {
        let mut params = Params::new();
        if include_extended_counts {
            params.insert("include_extended_counts", true);
        }
        if no_cache {
            params.insert("no_cache", true);
        }
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["sources", label, "folders"])?,
            params,
        ))
    }

    /// IMAP attributes and other information for one folder. The folder
    /// path uses `/` as the hierarchy delimiter unless `delimiter` says
    /// otherwise.
    pub fn get_source_folder(
        &self,
        label: &str,
        folder_path: &str,
        include_extended_counts: bool,
        delimiter: Option<&str>,
    ) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        if include_extended_counts {
            params.insert("include_extended_counts", true);
        }
        params.insert_opt("delim", delimiter);
        Ok(self.dictionary_request(
            Method::GET,
            self.folder_path(label, folder_path)?,
            params,
        ))
    }

    /// Create a folder on a source. Hierarchy delimiters are translated
    /// for the target server; `delimiter` overrides the default `/`.
    pub fn create_source_folder(
        &self,
        label: &str,
        folder_path: &str,
        delimiter: Option<&str>,
    ) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        params.insert_opt("delim", delimiter);
        Ok(self.dictionary_request(Method::PUT, self.folder_path(label, folder_path)?, params))
    }

    /// Permanently remove a folder from the source, clearing all messages
    /// in it. This cannot be undone.
    pub fn delete_source_folder(
        &self,
        label: &str,
        folder_path: &str,
    ) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::DELETE,
            self.folder_path(label, folder_path)?,
            Params::new(),
        ))
    }

    /// Run an `EXPUNGE` on the mail server for one folder, permanently
    /// removing messages flagged for deletion.
    pub fn expunge_folder(&self, label: &str, folder_path: &str) -> Result<DictionaryRequest> {
        let path = format!("{}/expunge", self.folder_path(label, folder_path)?);
        Ok(self.dictionary_request(Method::POST, path, Params::new()))
    }

    /// Messages in one folder, refreshed from the mail server before the
    /// response is sent. Don't expect a response in less than a second.
    pub fn get_folder_messages(
        &self,
        label: &str,
        folder_path: &str,
    ) -> Result<FolderMessagesRequest> {
        let path = format!("{}/messages", self.folder_path(label, folder_path)?);
        Ok(FolderMessagesRequest::new(self.list_request(
            Method::GET,
            path,
            Params::new(),
        )))
    }

    /// Timestamps for the last sync of one source with its origin mailbox.
    pub fn get_source_sync_status(&self, label: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::GET,
            self.account_path(&["sources", label, "sync"])?,
            Params::new(),
        ))
    }

    /// Start a sync job for one source.
    pub fn force_source_sync(&self, label: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::POST,
            self.account_path(&["sources", label, "sync"])?,
            Params::new(),
        ))
    }

    // ---- Sync -----------------------------------------------------------

    /// Sync status for all sources of the account.
    pub fn get_sync_status(&self) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(Method::GET, self.account_path(&["sync"])?, Params::new()))
    }

    /// Start a sync job for every source on the account.
    pub fn force_sync(&self) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(Method::POST, self.account_path(&["sync"])?, Params::new()))
    }

    // ---- Threads --------------------------------------------------------

    /// List threads on the account.
    pub fn get_threads(&self) -> Result<ThreadListRequest> {
        Ok(ThreadListRequest::new(self.list_request(
            Method::GET,
            self.account_path(&["threads"])?,
            Params::new(),
        )))
    }

    /// Files, contacts, and messages on one thread. `thread_id` is a
    /// provider thread id prefixed with `gm-`; for other mailboxes use
    /// [`Client::get_message_thread`] on any message in the thread.
    pub fn get_thread(&self, thread_id: &str) -> Result<ThreadRequest> {
        Ok(ThreadRequest::new(self.dictionary_request(
            Method::GET,
            self.account_path(&["threads", thread_id])?,
            Params::new(),
        )))
    }

    /// Delete a thread.
    pub fn delete_thread(&self, thread_id: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::DELETE,
            self.account_path(&["threads", thread_id])?,
            Params::new(),
        ))
    }

    /// Add the thread to a folder and/or remove it from one, leaving its
    /// other folders alone.
    pub fn update_thread_folders(
        &self,
        thread_id: &str,
        add_to_folder: Option<&str>,
        remove_from_folder: Option<&str>,
    ) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        params.insert_opt("add", add_to_folder);
        params.insert_opt("remove", remove_from_folder);
        Ok(self.dictionary_request(
            Method::POST,
            self.account_path(&["threads", thread_id, "folders"])?,
            params,
        ))
    }

    /// Overwrite the folders (or labels) applied to a thread.
    pub fn set_thread_folders(
        &self,
        thread_id: &str,
        folder_names: &[&str],
        symbolic_folder_names: &[&str],
    ) -> Result<DictionaryRequest> {
        let mut request = self.dictionary_request(
            Method::PUT,
            self.account_path(&["threads", thread_id, "folders"])?,
            Params::new(),
        );
        request.set_body(folder_body(folder_names, symbolic_folder_names));
        Ok(request)
    }

    // ---- Webhooks -------------------------------------------------------

    /// Webhooks configured on the account.
    pub fn get_webhooks(&self) -> Result<ListRequest> {
        Ok(self.list_request(
            Method::GET,
            self.account_path(&["webhooks"])?,
            Params::new(),
        ))
    }

    /// Create a webhook. `callback_url` receives matching events;
    /// `failure_notif_url` is notified when the webhook fails.
    pub fn create_webhook(
        &self,
        callback_url: &str,
        failure_notif_url: &str,
    ) -> Result<WebhookCreateRequest> {
        let mut params = Params::new();
        params.insert("callback_url", callback_url);
        params.insert("failure_notif_url", failure_notif_url);
        Ok(WebhookCreateRequest::new(self.dictionary_request(
            Method::POST,
            self.account_path(&["webhooks"])?,
            params,
        )))
    }

    /// Properties of one webhook.
    pub fn get_webhook(&self, webhook_id: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::GET,
            self.account_path(&["webhooks", webhook_id])?,
            Params::new(),
        ))
    }

    /// Pause or resume a webhook.
    pub fn update_webhook(&self, webhook_id: &str, active: bool) -> Result<DictionaryRequest> {
        let mut params = Params::new();
        params.insert("active", active);
        Ok(self.dictionary_request(
            Method::POST,
            self.account_path(&["webhooks", webhook_id])?,
            params,
        ))
    }

    /// Delete a webhook.
    pub fn delete_webhook(&self, webhook_id: &str) -> Result<DictionaryRequest> {
        Ok(self.dictionary_request(
            Method::DELETE,
            self.account_path(&["webhooks", webhook_id])?,
            Params::new(),
        ))
    }

    // ---- Discovery ------------------------------------------------------

    /// Attempt to discover mail settings for an email address, useful for
    /// pre-populating source creation forms. The only supported source
    /// type is `IMAP`.
    pub fn discover_source_settings(&self, source_type: &str, email: &str) -> DictionaryRequest {
        let mut params = Params::new();
        params.insert("source_type", source_type);
        params.insert("email", email);
        self.dictionary_request(Method::GET, "discovery", params)
    }

    // ---- Authorization --------------------------------------------------

    /// Begin connecting a new mailbox by creating a connect token. The
    /// service redirects the user's browser back to `callback_url` with
    /// the token once they have authenticated; intercepting that redirect
    /// is the UI's concern.
    pub fn begin_authorization(
        &self,
        provider: ProviderType,
        callback_url: &str,
        params: Params,
    ) -> DictionaryRequest {
        let mut params = params;
        params.insert("callback_url", callback_url);
        params.insert_opt("provider", provider.as_param());
        self.dictionary_request(Method::POST, "connect_tokens", params)
    }

    /// The URL the user's browser should be sent to, read from a
    /// connect-token creation response.
    pub fn redirect_url(response: &serde_json::Map<String, Value>) -> Option<Url> {
        response
            .get("browser_redirect_url")
            .and_then(Value::as_str)
            .and_then(|raw| Url::parse(raw).ok())
    }

    /// Fetch the account created for a connect token. Feed the response to
    /// [`Client::complete_authorization`].
    pub fn fetch_account_for_connect_token(&self, token: &str) -> DictionaryRequest {
        self.get_connect_token(token)
    }

    /// Connect tokens created with this consumer key.
    pub fn get_connect_tokens(&self) -> ListRequest {
        self.list_request(Method::GET, "connect_tokens", Params::new())
    }

    /// Properties of one connect token.
    pub fn get_connect_token(&self, token: &str) -> DictionaryRequest {
        self.dictionary_request(
            Method::GET,
            format!("connect_tokens/{}", percent_encode(token)),
            Params::new(),
        )
    }

    /// Delete a connect token.
    pub fn delete_connect_token(&self, token: &str) -> DictionaryRequest {
        self.dictionary_request(
            Method::DELETE,
            format!("connect_tokens/{}", percent_encode(token)),
            Params::new(),
        )
    }

    /// Complete authorization from a connect-token fetch response,
    /// transitioning the client to authorized.
    ///
    /// Reads the token, token secret, and account id from the response's
    /// `account` object. Returns `false` and leaves all state unchanged
    /// when any of them is missing. With `save_credentials` the new
    /// credentials are also handed to the configured store, keyed by
    /// consumer key.
    pub fn complete_authorization(
        &mut self,
        response: &serde_json::Map<String, Value>,
        save_credentials: bool,
    ) -> bool {
        let Some(account) = response.get("account").and_then(Value::as_object) else {
            return false;
        };
        let token = account.get("access_token").and_then(Value::as_str);
        let secret = account.get("access_token_secret").and_then(Value::as_str);
        let account_id = account.get("id").and_then(value_as_id);
        let (Some(token), Some(secret), Some(account_id)) = (token, secret, account_id) else {
            return false;
        };

        self.credentials.token = Some(token.to_string());
        self.credentials.token_secret = Some(secret.to_string());
        self.account_id = Some(account_id.clone());
        debug!(account_id = %account_id, "client authorized");

        if save_credentials {
            if let Some(store) = &self.store {
                let stored = StoredCredentials {
                    token: token.to_string(),
                    token_secret: secret.to_string(),
                    account_id,
                };
                if let Err(error) = store.save(&self.credentials.consumer_key, &stored) {
                    warn!("failed to persist credentials: {error}");
                }
            }
        }
        true
    }

    /// Drop the token pair and account id, returning the client to
    /// anonymous, and forget any stored credentials for this consumer key.
    pub fn clear_credentials(&mut self) {
        self.credentials.token = None;
        self.credentials.token_secret = None;
        self.account_id = None;
        if let Some(store) = &self.store {
            if let Err(error) = store.clear(&self.credentials.consumer_key) {
                warn!("failed to clear stored credentials: {error}");
            }
        }
    }

    // ---- Execution ------------------------------------------------------

    /// Sign a descriptor with the current credentials, producing a
    /// ready-to-send request. Uses a fresh nonce and the current time, so
    /// two calls for the same descriptor produce distinct requests.
    pub fn signed_request<S>(&self, request: &Request<S>) -> Result<SignedRequest> {
        Signer::new(&self.base_url, &self.credentials).sign(request)
    }

    /// Sign and execute a descriptor, decoding the response into the shape
    /// the descriptor declares.
    pub async fn execute<S: ResponseShape>(&self, request: &Request<S>) -> Result<S::Output> {
        let signed = self.signed_request(request)?;
        self.session.execute::<S>(signed).await
    }

    /// Sign a descriptor and stream its response body to `destination`.
    /// See [`Session::download_to_file`] for the full contract.
    pub async fn download<S, F>(
        &self,
        request: &Request<S>,
        destination: &Path,
        progress: F,
    ) -> Result<()>
    where
        F: FnMut(u64, u64, Option<u64>),
    {
        let signed = self.signed_request(request)?;
        self.session
            .download_to_file(signed, destination, progress)
            .await
    }

    /// Path to a folder resource, with each hierarchy segment encoded
    /// separately so `/` keeps its delimiter role.
    fn folder_path(&self, label: &str, folder_path: &str) -> Result<String> {
        let mut components = vec!["sources", label, "folders"];
        components.extend(folder_path.split('/'));
        self.account_path(&components)
    }
}

/// JSON body for folder-list assignment: one object per folder name.
///
/// Sent as a raw JSON body rather than form parameters, which keeps the
/// folder list out of the signature base entirely; form-encoded folder
/// lists are known to trip server-side signature validation.
fn folder_body(folder_names: &[&str], symbolic_folder_names: &[&str]) -> Value {
    let mut folders: Vec<Value> = folder_names
        .iter()
        .map(|name| serde_json::json!({"name": name}))
        .collect();
    folders.extend(
        symbolic_folder_names
            .iter()
            .map(|name| serde_json::json!({"symbolic_name": name})),
    );
    Value::Array(folders)
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builder for configuring a [`Client`].
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug)]
pub struct ClientBuilder {
    consumer_key: String,
    consumer_secret: String,
    base_url: String,
    timeout: Duration,
    token: Option<String>,
    token_secret: Option<String>,
    account_id: Option<String>,
    store: Option<Box<dyn CredentialStore>>,
}

impl ClientBuilder {
    fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
            token_secret: None,
            account_id: None,
            store: None,
        }
    }

    /// Override the API base URL. Useful for testing against a local
    /// server.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-execution timeout (default: 60 seconds).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use an already-obtained token, token secret, and account id instead
    /// of running the connect flow or restoring from a store.
    #[must_use]
    pub fn credentials(
        mut self,
        token: impl Into<String>,
        token_secret: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        self.token = Some(token.into());
        self.token_secret = Some(token_secret.into());
        self.account_id = Some(account_id.into());
        self
    }

    /// Attach a credential store. Credentials previously saved under this
    /// consumer key are restored at build time unless explicit credentials
    /// were provided.
    #[must_use]
    pub fn store(mut self, store: impl CredentialStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Build the client. No network I/O is performed.
    ///
    /// # Errors
    ///
    /// [`Error::Url`] when the base URL does not parse.
    pub fn build(self) -> Result<Client> {
        let mut base = self.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let mut credentials = Credentials::new(self.consumer_key, self.consumer_secret);
        let mut account_id = self.account_id;
        if let (Some(token), Some(secret)) = (self.token, self.token_secret) {
            credentials = credentials.with_token(token, secret);
        } else if let Some(store) = &self.store {
            match store.load(&credentials.consumer_key) {
                Ok(Some(saved)) => {
                    debug!(account_id = %saved.account_id, "restored stored credentials");
                    credentials = credentials.with_token(saved.token, saved.token_secret);
                    account_id = Some(saved.account_id);
                }
                Ok(None) => {}
                Err(error) => warn!("failed to load stored credentials: {error}"),
            }
        }

        Ok(Client {
            base_url,
            credentials,
            account_id,
            timeout: self.timeout,
            session: Session::new(self.timeout),
            store: self.store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn authorized_client() -> Client {
        Client::builder("ck", "cs")
            .credentials("tok", "ts", "42")
            .build()
            .unwrap()
    }

    fn connect_response() -> serde_json::Map<String, Value> {
        json!({
            "token": "ct-1",
            "account": {
                "id": "42",
                "access_token": "tok",
                "access_token_secret": "ts"
            }
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn account_path_requires_an_account_id() {
        let client = Client::new("ck", "cs").unwrap();
        let error = client.account_path(&["messages"]).unwrap_err();
        assert!(matches!(error, Error::Precondition(_)));
    }

    #[test]
    fn account_path_encodes_components() {
        let client = authorized_client();
        let path = client.account_path(&["messages", "id with spaces"]).unwrap();
        assert_eq!(path, "accounts/42/messages/id%20with%20spaces");
    }

    #[test]
    fn endpoint_constructors_fail_without_account() {
        let client = Client::new("ck", "cs").unwrap();
        assert!(client.get_messages().is_err());
        assert!(client.get_contacts().is_err());
        assert!(client.get_file_content("f1").is_err());
    }

    #[test]
    fn folder_paths_keep_hierarchy_delimiters() {
        let client = authorized_client();
        let request = client
            .create_source_folder("0", "base folder/my folder", None)
            .unwrap();
        assert_eq!(
            request.path(),
            "accounts/42/sources/0/folders/base%20folder/my%20folder"
        );
    }

    #[test]
    fn complete_authorization_transitions_to_authorized() {
        let mut client = Client::new("ck", "cs").unwrap();
        assert!(!client.is_authorized());

        assert!(client.complete_authorization(&connect_response(), false));
        assert!(client.is_authorized());
        assert_eq!(client.account_id(), Some("42"));
    }

    #[test]
    fn complete_authorization_rejects_incomplete_responses() {
        let mut client = Client::new("ck", "cs").unwrap();
        let response = json!({"account": {"id": "42", "access_token": "tok"}})
            .as_object()
            .unwrap()
            .clone();

        assert!(!client.complete_authorization(&response, false));
        assert!(!client.is_authorized());
        assert_eq!(client.account_id(), None);
    }

    #[test]
    fn credentials_round_trip_through_the_store() {
        let store = std::sync::Arc::new(MemoryStore::new());

        #[derive(Debug)]
        struct Shared(std::sync::Arc<MemoryStore>);
        impl CredentialStore for Shared {
            fn save(&self, key: &str, credentials: &StoredCredentials) -> Result<()> {
                self.0.save(key, credentials)
            }
            fn load(&self, key: &str) -> Result<Option<StoredCredentials>> {
                self.0.load(key)
            }
            fn clear(&self, key: &str) -> Result<()> {
                self.0.clear(key)
            }
        }

        let mut client = Client::builder("ck", "cs")
            .store(Shared(store.clone()))
            .build()
            .unwrap();
        assert!(client.complete_authorization(&connect_response(), true));

        // A fresh client with the same consumer key restores the session.
        let restored = Client::builder("ck", "cs")
            .store(Shared(store.clone()))
            .build()
            .unwrap();
        assert!(restored.is_authorized());
        assert_eq!(restored.account_id(), Some("42"));

        client.clear_credentials();
        assert!(!client.is_authorized());
        assert_eq!(store.load("ck").unwrap(), None);
    }

    #[test]
    fn begin_authorization_carries_callback_and_provider() {
        let client = Client::new("ck", "cs").unwrap();
        let request = client.begin_authorization(
            ProviderType::Gmail,
            "https://app.example.com/connect",
            Params::new(),
        );
        assert_eq!(request.path(), "connect_tokens");
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.params().get("callback_url").unwrap().encode(),
            "https://app.example.com/connect"
        );
        assert_eq!(request.params().get("provider").unwrap().encode(), "gmail");

        let generic = client.begin_authorization(
            ProviderType::GenericImap,
            "https://app.example.com/connect",
            Params::new(),
        );
        assert!(generic.params().get("provider").is_none());
    }

    #[test]
    fn redirect_url_reads_the_browser_redirect_field() {
        let response = json!({"browser_redirect_url": "https://connect.example.com/t/1"})
            .as_object()
            .unwrap()
            .clone();
        let url = Client::redirect_url(&response).unwrap();
        assert_eq!(url.as_str(), "https://connect.example.com/t/1");

        assert!(Client::redirect_url(&serde_json::Map::new()).is_none());
    }

    #[test]
    fn set_folders_builds_a_raw_json_body() {
        let client = authorized_client();
        let request = client
            .set_message_folders("m1", &["Archive"], &["\\Starred"])
            .unwrap();
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(
            request.body().unwrap(),
            &json!([{"name": "Archive"}, {"symbolic_name": "\\Starred"}])
        );
    }

    #[test]
    fn builder_normalizes_base_url() {
        let client = Client::builder("ck", "cs")
            .base_url("https://localhost:8080/v2")
            .credentials("t", "s", "1")
            .build()
            .unwrap();
        let request = client.get_account().unwrap();
        let signed = client.signed_request(&request).unwrap();
        assert_eq!(signed.url().as_str(), "https://localhost:8080/v2/accounts/1");
    }
}
