//! Session token access and admin identity resolution
//!
//! The bearer token is written by a login flow that lives elsewhere; this
//! module only reads it (through a legacy chain of storage keys), decodes its
//! payload opportunistically and caches the admin identity it finds. The
//! [`Session`] is passed explicitly to every gateway call and is the only
//! place that clears the token after an authentication failure.

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Claims searched for the admin identity, in priority order
pub const IDENTITY_CLAIMS: &[&str] = &[
    "email",
    "sub",
    "adminEmail",
    "admin_email",
    "userEmail",
    "username",
];

/// Decoded token payload
pub type Claims = Map<String, Value>;

/// Client-side key/value storage the session reads from
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `pairs`
    pub fn with_values<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Storage persisted as a flat JSON object in a file
///
/// The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Error::Storage(format!("{}: {e}", path.display()))),
        };
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<()> {
        let text = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, text)
            .map_err(|e| Error::Storage(format!("{}: {e}", self.path.display())))
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// Explicit session context shared by the gateway and the shell
#[derive(Debug)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    token_keys: Vec<String>,
    identity_cache_key: String,
    decodes: AtomicUsize,
}

impl Session {
    /// Create a session over `store` using the configured key names
    pub fn new(store: Arc<dyn TokenStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            token_keys: config.token_keys.clone(),
            identity_cache_key: config.identity_cache_key.clone(),
            decodes: AtomicUsize::new(0),
        }
    }

    /// Create a session over an in-memory store with default key names
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), &SessionConfig::default())
    }

    /// The raw bearer token, or `""` when none is stored
    ///
    /// Reads the first non-empty value among the token keys and strips a
    /// case-insensitive `Bearer ` prefix and surrounding whitespace.
    pub fn auth_token(&self) -> String {
        self.token_keys
            .iter()
            .filter_map(|key| self.store.get(key))
            .map(|raw| strip_bearer(&raw).to_string())
            .find(|token| !token.is_empty())
            .unwrap_or_default()
    }

    /// Whether a token is available
    pub fn is_authenticated(&self) -> bool {
        !self.auth_token().is_empty()
    }

    /// The admin identity claim, or `""` when it cannot be determined
    ///
    /// A cached value wins. Otherwise the token is decoded and the first
    /// non-empty claim from [`IDENTITY_CLAIMS`] is cached and returned.
    pub fn resolve_admin_identity(&self) -> String {
        if let Some(cached) = self.store.get(&self.identity_cache_key)
            && !cached.trim().is_empty()
        {
            return cached;
        }

        let token = self.auth_token();
        if token.is_empty() {
            return String::new();
        }

        self.decodes.fetch_add(1, Ordering::Relaxed);
        let Some(claims) = decode_token_claims(&token) else {
            debug!("Token payload could not be decoded");
            return String::new();
        };
        log_if_expired(&claims);

        let Some(identity) = identity_from_claims(&claims) else {
            debug!("Token carries none of the identity claims");
            return String::new();
        };

        if let Err(e) = self.store.set(&self.identity_cache_key, &identity) {
            warn!("Failed to cache admin identity: {e}");
        }
        identity
    }

    /// How many times the token payload has been decoded
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }

    /// Store a new token under the highest-priority key, dropping any cached identity
    ///
    /// # Errors
    ///
    /// Returns an error if the token is blank or storage fails.
    pub fn set_token(&self, token: &str) -> Result<()> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return Err(Error::validation("token", "must not be empty"));
        }
        let key = self
            .token_keys
            .first()
            .ok_or_else(|| Error::configuration("no token keys configured"))?;
        self.store.remove(&self.identity_cache_key)?;
        self.store.set(key, token)
    }

    /// Forget the token and the cached identity
    ///
    /// # Errors
    ///
    /// Returns the first storage failure; every key is still attempted.
    pub fn invalidate(&self) -> Result<()> {
        let mut first_error = None;
        for key in self.token_keys.iter().chain(std::iter::once(&self.identity_cache_key)) {
            if let Err(e) = self.store.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        debug!("Session invalidated");
        first_error.map_or(Ok(()), Err)
    }
}

/// Strip a case-insensitive `Bearer` prefix and surrounding whitespace
///
/// A bare `Bearer` scheme with nothing after it is no token at all.
pub fn strip_bearer(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("bearer") {
        return "";
    }
    match (trimmed.get(..6), trimmed.get(6..)) {
        (Some(prefix), Some(rest))
            if prefix.eq_ignore_ascii_case("bearer") && rest.starts_with(char::is_whitespace) =>
        {
            rest.trim()
        }
        _ => trimmed,
    }
}

/// Decode the payload segment of a `header.payload.signature` token
///
/// Returns `None` for anything other than exactly three segments, a payload
/// that is not base64url, or a payload that is not a JSON object. The
/// signature is not checked.
pub fn decode_token_claims(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };
    if payload.is_empty() {
        return None;
    }

    // Tolerate padding and the standard alphabet alongside base64url.
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;

    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

/// First non-empty identity claim
pub fn identity_from_claims(claims: &Claims) -> Option<String> {
    IDENTITY_CLAIMS.iter().find_map(|name| {
        let text = match claims.get(*name)? {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        (!text.trim().is_empty()).then_some(text)
    })
}

fn log_if_expired(claims: &Claims) {
    if let Some(exp) = claims.get("exp").and_then(Value::as_i64) {
        let now = chrono::Utc::now().timestamp();
        if exp < now {
            warn!(expired_at = exp, "Session token has expired");
        }
    }
}
