//! # Mailindex Client
//! Asynchronous client for the Mailindex email-indexing REST API, covering request
//! construction, OAuth1 signing, typed response decoding, and streaming file downloads
//! through [`Client`] and [`Session`].
//!
//! ## Audience and uses
//! For Rust applications that index, search, and fetch a user's email through the
//! Mailindex service: build typed request descriptors with [`Client`] endpoint methods,
//! execute them with [`Client::execute`], and save attachments or raw message sources to
//! disk with [`Client::download`]. Requests are signed per call with OAuth1 (HMAC-SHA1),
//! and each descriptor declares the JSON shape its response must have.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, so ensure the
//! chosen Tokio features (`rt-multi-thread` or `current_thread`) are available in your
//! application. Descriptor construction, signing, and error mapping are synchronous and
//! never block.
//!
//! ## Out of scope
//! No retries, no response caching, no rate limiting, and no pagination management
//! beyond the `limit`/`offset` parameters the API exposes. Durable credential storage
//! is a [`CredentialStore`] implementation supplied by the application.
//!
//! ## Errors
//! Transport failures surface as [`Error::Transport`], undecodable success bodies as
//! [`Error::MalformedResponse`], wrong top-level shapes as [`Error::ShapeMismatch`],
//! and server-reported problems as [`Error::Api`] / [`Error::Authorization`] /
//! [`Error::Server`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use mailindex_client::{Client, SearchFilters, SortOrder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailindex_client::Error> {
//!     let client = Client::builder("consumer-key", "consumer-secret")
//!         .credentials("token", "token-secret", "account-id")
//!         .build()?;
//!
//!     let request = client
//!         .get_messages()?
//!         .subject("invoice")
//!         .filters(SearchFilters::new().sort_order(SortOrder::Descending))
//!         .limit(10);
//!     for message in client.execute(request.request()).await? {
//!         println!("{}", message["subject"]);
//!     }
//!
//!     let source = client.get_message_source("message-id")?;
//!     client
//!         .download(&source, "message.eml".as_ref(), |_, read, total| {
//!             println!("{read}/{total:?} bytes");
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod oauth;
mod request;
mod session;
mod store;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, ProviderType};
pub use error::{Error, Result};
pub use oauth::{Credentials, SignedRequest, Signer};
pub use request::{
    AccountStatus, ContactListRequest, Dictionary, DictionaryRequest, FileListRequest,
    FolderMessagesRequest, List, ListRequest, MessageFlags, MessageListRequest, MessageRequest,
    MessageUpdateRequest, ParamValue, Params, Raw, RawRequest, Request, ResponseShape,
    SearchFilters, SortOrder, SourceCreateRequest, SourceListRequest, SourceModifyRequest, Text,
    TextRequest, ThreadListRequest, ThreadRequest, WebhookCreateRequest,
};
pub use session::{Session, error_for_response};
pub use store::{CredentialStore, MemoryStore, StoredCredentials};
