#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence gateway for Number Rush progress.
//!
//! Progress lives in two places. A local key/value store keeps the automatic
//! snapshot under [`LOCAL_SAVE_KEY`] and per-code fallback copies under
//! [`fallback_key`]. A remote JSON collection shared between devices maps
//! save codes to [`RemoteEntry`] values; writes fetch the whole collection,
//! merge one entry and put the whole collection back.
//!
//! The remote half is split into free functions ([`push_remote`],
//! [`fetch_remote`]) that only need a [`RemoteStore`], and resolution steps
//! ([`PersistenceGateway::resolve_save`], [`PersistenceGateway::resolve_load`])
//! that apply the local fallback policy. Adapters may run the former on a
//! worker thread and feed the result back into the latter.

mod local;
mod remote;

use std::time::{SystemTime, UNIX_EPOCH};

use number_rush_core::{Gold, SaveCode, SaveSnapshot};
use thiserror::Error;
use tracing::{info, warn};

pub use local::{FileStore, KeyValueStore, MemoryStore};
pub use remote::{
    DisabledRemote, HttpRemoteStore, RemoteCollection, RemoteConfig, RemoteEntry, RemoteStore,
};

/// Key of the automatic local snapshot.
pub const LOCAL_SAVE_KEY: &str = "number_rush_save";

/// Key of the local copy kept when a remote save under `code` fails.
#[must_use]
pub fn fallback_key(code: &SaveCode) -> String {
    format!("save_code_{code}")
}

/// Errors raised by the storage backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The remote could not be reached or answered with something unusable.
    #[error("remote storage unavailable: {reason}")]
    RemoteUnavailable {
        /// Human readable cause.
        reason: String,
    },
    /// The remote rejected the request.
    #[error("remote storage answered {status}: {message}")]
    RemoteStatus {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },
    /// Stored data could not be decoded.
    #[error("data stored under `{key}` is corrupt")]
    Corrupt {
        /// Key or save code of the entry.
        key: String,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The local store could not be read or written.
    #[error("failed to access local storage for `{key}`")]
    Io {
        /// Key or path that was accessed.
        key: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// A snapshot could not be serialized.
    #[error("failed to encode save data")]
    Encode(#[source] serde_json::Error),
}

/// Result of saving under a save code.
#[derive(Debug)]
pub enum RemoteSave {
    /// The entry now lives in the shared collection.
    Remote,
    /// The remote write failed; a local copy was written instead.
    LocalFallback {
        /// Why the remote write failed.
        cause: PersistenceError,
    },
}

/// Result of loading a save code.
#[derive(Debug)]
pub enum RemoteLoad {
    /// The shared collection held the code.
    Remote(SaveSnapshot),
    /// The shared collection was read and does not contain the code.
    NotFound,
    /// The remote read failed and a local fallback copy was used.
    LocalFallback {
        /// Snapshot read from the fallback copy.
        snapshot: SaveSnapshot,
        /// Why the remote read failed.
        cause: PersistenceError,
    },
    /// The shared collection holds the code but its entry cannot be decoded.
    Corrupt(PersistenceError),
    /// The remote read failed and no fallback copy exists.
    Unavailable(PersistenceError),
}

/// Milliseconds since the Unix epoch, or zero when the clock is before it.
#[must_use]
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Merges `snapshot` into the shared collection under `code`.
///
/// Nothing is written when the collection cannot be fetched first. Entries
/// under other codes are carried over untouched.
pub fn push_remote<R>(
    remote: &R,
    code: &SaveCode,
    snapshot: &SaveSnapshot,
    timestamp: u64,
) -> Result<(), PersistenceError>
where
    R: RemoteStore + ?Sized,
{
    let mut collection = remote.fetch()?;
    let entry = RemoteEntry {
        level: snapshot.level,
        gold: snapshot.gold,
        timestamp,
    };
    let value = serde_json::to_value(entry).map_err(PersistenceError::Encode)?;
    let _ = collection.insert(code.as_str().to_owned(), value);
    remote.replace(&collection)
}

/// Reads the entry stored under `code`, or `None` when the code is absent.
///
/// Remote entries carry no high score; the returned snapshot reports zero.
pub fn fetch_remote<R>(remote: &R, code: &SaveCode) -> Result<Option<SaveSnapshot>, PersistenceError>
where
    R: RemoteStore + ?Sized,
{
    let collection = remote.fetch()?;
    let Some(value) = collection.get(code.as_str()) else {
        return Ok(None);
    };
    let entry: RemoteEntry =
        serde_json::from_value(value.clone()).map_err(|source| PersistenceError::Corrupt {
            key: code.to_string(),
            source,
        })?;
    Ok(Some(SaveSnapshot::new(entry.level, entry.gold, Gold::ZERO)))
}

/// Local and remote storage bound together with the fallback policy.
#[derive(Debug)]
pub struct PersistenceGateway<L, R> {
    local: L,
    remote: R,
}

impl<L, R> PersistenceGateway<L, R>
where
    L: KeyValueStore,
    R: RemoteStore,
{
    /// Creates a gateway over the provided stores.
    pub fn new(local: L, remote: R) -> Self {
        Self { local, remote }
    }

    /// Local store backing the gateway.
    pub fn local(&self) -> &L {
        &self.local
    }

    /// Remote store backing the gateway.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Writes the automatic snapshot.
    pub fn save_local(&mut self, snapshot: &SaveSnapshot) -> Result<(), PersistenceError> {
        write_snapshot(&mut self.local, LOCAL_SAVE_KEY, snapshot)
    }

    /// Reads the automatic snapshot. Absent or unreadable data yields `None`.
    pub fn load_local(&self) -> Option<SaveSnapshot> {
        read_snapshot(&self.local, LOCAL_SAVE_KEY)
    }

    /// Saves under `code`, falling back to a local copy when the remote fails.
    pub fn save_remote(
        &mut self,
        code: &SaveCode,
        snapshot: &SaveSnapshot,
    ) -> Result<RemoteSave, PersistenceError> {
        let pushed = push_remote(&self.remote, code, snapshot, unix_millis());
        self.resolve_save(code, snapshot, pushed)
    }

    /// Applies the fallback policy to the outcome of [`push_remote`].
    ///
    /// Fails only when the remote failed and the local copy could not be
    /// written either.
    pub fn resolve_save(
        &mut self,
        code: &SaveCode,
        snapshot: &SaveSnapshot,
        pushed: Result<(), PersistenceError>,
    ) -> Result<RemoteSave, PersistenceError> {
        match pushed {
            Ok(()) => {
                info!(%code, level = snapshot.level.get(), "progress saved remotely");
                Ok(RemoteSave::Remote)
            }
            Err(cause) => {
                warn!(%code, error = %cause, "remote save failed, keeping a local copy");
                write_snapshot(&mut self.local, &fallback_key(code), snapshot)?;
                Ok(RemoteSave::LocalFallback { cause })
            }
        }
    }

    /// Loads `code`, falling back to a local copy when the remote fails.
    pub fn load_remote(&self, code: &SaveCode) -> RemoteLoad {
        self.resolve_load(code, fetch_remote(&self.remote, code))
    }

    /// Applies the fallback policy to the outcome of [`fetch_remote`].
    ///
    /// A code missing from a readable collection is reported as
    /// [`RemoteLoad::NotFound`] and an undecodable entry as
    /// [`RemoteLoad::Corrupt`], both without consulting the local copy.
    pub fn resolve_load(
        &self,
        code: &SaveCode,
        fetched: Result<Option<SaveSnapshot>, PersistenceError>,
    ) -> RemoteLoad {
        match fetched {
            Ok(Some(snapshot)) => RemoteLoad::Remote(snapshot),
            Ok(None) => RemoteLoad::NotFound,
            Err(cause @ PersistenceError::Corrupt { .. }) => {
                warn!(%code, error = %cause, "shared entry is unreadable");
                RemoteLoad::Corrupt(cause)
            }
            Err(cause) => {
                warn!(%code, error = %cause, "remote load failed, trying the local copy");
                match read_snapshot(&self.local, &fallback_key(code)) {
                    Some(snapshot) => RemoteLoad::LocalFallback { snapshot, cause },
                    None => RemoteLoad::Unavailable(cause),
                }
            }
        }
    }
}

fn write_snapshot<L>(
    local: &mut L,
    key: &str,
    snapshot: &SaveSnapshot,
) -> Result<(), PersistenceError>
where
    L: KeyValueStore + ?Sized,
{
    let encoded = serde_json::to_string(snapshot).map_err(PersistenceError::Encode)?;
    local.set(key, &encoded)
}

fn read_snapshot<L>(local: &L, key: &str) -> Option<SaveSnapshot>
where
    L: KeyValueStore + ?Sized,
{
    let raw = match local.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            warn!(key, %error, "failed to read saved progress");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(error) => {
            warn!(key, %error, "ignoring corrupt saved progress");
            None
        }
    }
}
