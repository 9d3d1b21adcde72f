//! Connection management for the menu document store.

use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, Tls, TlsOptions};
use mongodb::{Client, Collection, Database};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::{Config, TlsMode};

/// Collection names probed when the configured collection does not exist.
const COMMON_COLLECTION_NAMES: &[&str] = &["menu", "menudata", "menuitems", "items", "products"];

/// Outcome of a successful connection: a cheaply clonable collection handle
/// plus the name the discovery logic actually settled on.
#[derive(Clone)]
pub struct ResolvedCollection {
    pub collection: Collection<Document>,
    pub name: String,
}

/// Errors surfaced to request handlers.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("no database configured")]
    NotConfigured,

    /// Transport-level failure after all attempts, carrying the last
    /// failure reason for diagnostics.
    #[error("{0}")]
    Unavailable(String),
}

/// Per-attempt failure, internal to the retry loop.
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    #[error("no collections found in database \"{0}\"")]
    NoCollections(String),
}

#[derive(Default)]
struct ConnState {
    client: Option<Client>,
    collection: Option<Collection<Document>>,
    resolved_name: Option<String>,
    last_error: Option<String>,
}

/// Lazily-initialized, process-wide handle to the menu collection.
///
/// The first request to need the database establishes the connection;
/// concurrent requests arriving during establishment wait on the same
/// attempt and then read the cached handle.
pub struct MenuStore {
    config: Arc<Config>,
    state: Mutex<ConnState>,
}

impl MenuStore {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            state: Mutex::new(ConnState::default()),
        }
    }

    /// Return the cached collection handle, establishing it first if needed.
    ///
    /// `force` drops any cached client and reconnects from scratch. Retries
    /// up to the configured attempt count with linearly increasing backoff;
    /// after exhaustion the cache stays empty and the last failure reason is
    /// retained for [`MenuStore::last_error`].
    pub async fn ensure_connected(
        &self,
        force: bool,
    ) -> Result<ResolvedCollection, ConnectionError> {
        if self.config.mongodb_uri.is_empty() {
            return Err(ConnectionError::NotConfigured);
        }

        // Held across the whole attempt: concurrent cold-start callers park
        // here and pick up the cached handle instead of dialing twice.
        let mut state = self.state.lock().await;

        if !force {
            if let (Some(collection), Some(name)) =
                (state.collection.as_ref(), state.resolved_name.as_ref())
            {
                return Ok(ResolvedCollection {
                    collection: collection.clone(),
                    name: name.clone(),
                });
            }
        }

        state.client = None;
        state.collection = None;
        state.resolved_name = None;

        let mut last_error = String::from("no connection attempt was made");
        for attempt in 1..=self.config.max_connect_attempts {
            tracing::debug!(
                attempt,
                server_selection_timeout_ms = self.config.server_selection_timeout_ms,
                "Connecting to menu database"
            );
            match self.try_connect().await {
                Ok((client, collection, name)) => {
                    tracing::info!(collection = %name, attempt, "Connected to menu database");
                    state.client = Some(client);
                    state.collection = Some(collection.clone());
                    state.resolved_name = Some(name.clone());
                    state.last_error = None;
                    return Ok(ResolvedCollection { collection, name });
                }
                Err(err) => {
                    last_error = err.to_string();
                    state.last_error = Some(last_error.clone());
                    tracing::warn!(
                        attempt,
                        error = %last_error,
                        "Database connection attempt failed"
                    );
                    if attempt < self.config.max_connect_attempts {
                        tokio::time::sleep(retry_delay(attempt, self.config.retry_base_delay_ms))
                            .await;
                    }
                }
            }
        }

        tracing::error!(error = %last_error, "Database connection failed after all attempts");
        Err(ConnectionError::Unavailable(last_error))
    }

    /// Last recorded connection failure, for the diagnostics endpoint.
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Collection names visible through the cached client, if any.
    pub async fn collection_names(&self) -> Option<Vec<String>> {
        let client = self.state.lock().await.client.clone()?;
        client
            .database(&self.config.db_name)
            .list_collection_names()
            .await
            .ok()
    }

    async fn try_connect(&self) -> Result<(Client, Collection<Document>, String), AttemptError> {
        let mut options = ClientOptions::parse(&self.config.mongodb_uri).await?;
        apply_connection_options(&mut options, &self.config);

        let client = Client::with_options(options)?;

        // Liveness probe; server selection happens here, not at construction.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        // A reachable database with nothing to resolve counts as a failed
        // attempt; the client is released on the error path before retrying.
        let db = client.database(&self.config.db_name);
        let (collection, name) = self.resolve_collection(&db).await?;
        Ok((client, collection, name))
    }

    /// Resolve which collection holds menu documents.
    ///
    /// Precedence: the configured name if it exists, then the first match
    /// from a fixed list of common names, then the first collection present.
    async fn resolve_collection(
        &self,
        db: &Database,
    ) -> Result<(Collection<Document>, String), AttemptError> {
        let names = db.list_collection_names().await?;

        if !self.config.collection.is_empty() {
            if names.iter().any(|n| n == &self.config.collection) {
                tracing::info!(collection = %self.config.collection, "Using configured collection");
                return Ok((
                    db.collection(&self.config.collection),
                    self.config.collection.clone(),
                ));
            }
            tracing::warn!(
                collection = %self.config.collection,
                db = %self.config.db_name,
                "Configured collection not found"
            );
        }

        for candidate in COMMON_COLLECTION_NAMES {
            if names.iter().any(|n| n == candidate) {
                tracing::info!(collection = candidate, "Auto-detected menu collection");
                return Ok((db.collection(candidate), (*candidate).to_string()));
            }
        }

        if let Some(first) = names.first() {
            tracing::info!(collection = %first, "Falling back to first collection");
            return Ok((db.collection(first), first.clone()));
        }

        Err(AttemptError::NoCollections(self.config.db_name.clone()))
    }
}

/// Overlay config-driven settings onto URI-parsed client options.
///
/// TLS is left to the connection string in auto mode, but the allow-invalid
/// override applies regardless of where TLS was switched on, so it still
/// works with `mongodb+srv` URIs that enable TLS implicitly.
fn apply_connection_options(options: &mut ClientOptions, config: &Config) {
    options.server_selection_timeout =
        Some(Duration::from_millis(config.server_selection_timeout_ms));
    match config.tls {
        TlsMode::Auto => {
            if config.tls_allow_invalid {
                let mut tls_options = match options.tls.take() {
                    Some(Tls::Enabled(existing)) => existing,
                    _ => TlsOptions::default(),
                };
                tls_options.allow_invalid_certificates = Some(true);
                options.tls = Some(Tls::Enabled(tls_options));
            }
        }
        TlsMode::Enabled => {
            let mut tls_options = TlsOptions::default();
            if config.tls_allow_invalid {
                tls_options.allow_invalid_certificates = Some(true);
            }
            options.tls = Some(Tls::Enabled(tls_options));
        }
        TlsMode::Disabled => {
            options.tls = Some(Tls::Disabled);
        }
    }
}

/// Delay before the next connection attempt: attempt index × base delay.
pub fn retry_delay(attempt: u32, base_ms: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempt)))
}
