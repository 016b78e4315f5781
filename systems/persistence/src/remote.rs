use std::sync::Arc;
use std::time::Duration;

use number_rush_core::{Gold, Level};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::PersistenceError;

/// Whole shared collection: save code to [`RemoteEntry`] JSON.
pub type RemoteCollection = Map<String, Value>;

/// Entry stored under one save code in the shared collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Saved level.
    pub level: Level,
    /// Saved gold balance.
    pub gold: Gold,
    /// Milliseconds since the Unix epoch at which the entry was written.
    pub timestamp: u64,
}

/// Store holding every save code in a single JSON document.
///
/// Implementations replace the whole document on write; callers merge.
pub trait RemoteStore {
    /// Reads the whole collection.
    fn fetch(&self) -> Result<RemoteCollection, PersistenceError>;

    /// Overwrites the whole collection.
    fn replace(&self, collection: &RemoteCollection) -> Result<(), PersistenceError>;
}

impl<T> RemoteStore for Arc<T>
where
    T: RemoteStore + ?Sized,
{
    fn fetch(&self) -> Result<RemoteCollection, PersistenceError> {
        (**self).fetch()
    }

    fn replace(&self, collection: &RemoteCollection) -> Result<(), PersistenceError> {
        (**self).replace(collection)
    }
}

/// Remote used when no shared storage is configured. Every call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledRemote;

impl RemoteStore for DisabledRemote {
    fn fetch(&self) -> Result<RemoteCollection, PersistenceError> {
        Err(disabled())
    }

    fn replace(&self, _collection: &RemoteCollection) -> Result<(), PersistenceError> {
        Err(disabled())
    }
}

fn disabled() -> PersistenceError {
    PersistenceError::RemoteUnavailable {
        reason: "no remote store is configured".to_owned(),
    }
}

/// Connection details of a JSON bin service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Service root, e.g. `https://api.jsonbin.io/v3`.
    pub base_url: String,
    /// Identifier of the bin holding the collection.
    pub bin_id: String,
    /// Header carrying the secret.
    pub auth_header: String,
    /// Secret sent with every request.
    pub secret: String,
    /// Upper bound for a single request.
    pub timeout: Duration,
}

impl RemoteConfig {
    fn bin_url(&self) -> String {
        format!(
            "{}/b/{}",
            self.base_url.trim_end_matches('/'),
            self.bin_id.trim_matches('/')
        )
    }
}

/// [`RemoteStore`] backed by a JSON bin reached over HTTPS.
#[derive(Debug)]
pub struct HttpRemoteStore {
    agent: ureq::Agent,
    url: String,
    auth_header: String,
    secret: String,
}

impl HttpRemoteStore {
    /// Creates a client for the configured bin.
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            agent,
            url: config.bin_url(),
            auth_header: config.auth_header,
            secret: config.secret,
        }
    }

    /// Address requests are sent to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RemoteStore for HttpRemoteStore {
    fn fetch(&self) -> Result<RemoteCollection, PersistenceError> {
        debug!(url = %self.url, "fetching remote collection");
        let response = self
            .agent
            .get(&self.url)
            .set(&self.auth_header, &self.secret)
            .call()
            .map_err(request_error)?;
        let body = response
            .into_string()
            .map_err(|error| PersistenceError::RemoteUnavailable {
                reason: format!("failed to read response body: {error}"),
            })?;
        parse_envelope(&body)
    }

    fn replace(&self, collection: &RemoteCollection) -> Result<(), PersistenceError> {
        debug!(url = %self.url, entries = collection.len(), "replacing remote collection");
        let body = serde_json::to_string(collection).map_err(PersistenceError::Encode)?;
        let _ = self
            .agent
            .put(&self.url)
            .set(&self.auth_header, &self.secret)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(request_error)?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct Envelope {
    record: Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts the collection from a `{ "record": {...}, "metadata": {...} }` body.
fn parse_envelope(body: &str) -> Result<RemoteCollection, PersistenceError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|error| PersistenceError::RemoteUnavailable {
            reason: format!("malformed response: {error}"),
        })?;
    match envelope.record {
        Value::Object(collection) => Ok(collection),
        other => Err(PersistenceError::RemoteUnavailable {
            reason: format!("record is not an object: {other}"),
        }),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|body| body.message)
        .unwrap_or_else(|_| "no message".to_owned())
}

fn request_error(error: ureq::Error) -> PersistenceError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            PersistenceError::RemoteStatus {
                status,
                message: error_message(&body),
            }
        }
        ureq::Error::Transport(transport) => PersistenceError::RemoteUnavailable {
            reason: transport.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_yields_record_object() {
        let body = r#"{"record":{"abc":{"level":2,"gold":30,"timestamp":1}},"metadata":{"id":"x"}}"#;
        let collection = parse_envelope(body).expect("valid envelope");
        assert_eq!(collection.len(), 1);
        let entry: RemoteEntry =
            serde_json::from_value(collection["abc"].clone()).expect("entry");
        assert_eq!(entry.level, Level::clamped(2));
        assert_eq!(entry.gold, Gold::new(30));
    }

    #[test]
    fn non_object_record_is_a_failed_fetch() {
        for body in [r#"{"record":[]}"#, r#"{"record":null}"#, r#"{"record":"x"}"#] {
            assert!(matches!(
                parse_envelope(body),
                Err(PersistenceError::RemoteUnavailable { .. })
            ));
        }
    }

    #[test]
    fn malformed_body_is_a_failed_fetch() {
        assert!(matches!(
            parse_envelope("<html>"),
            Err(PersistenceError::RemoteUnavailable { .. })
        ));
    }

    #[test]
    fn error_message_prefers_service_text() {
        assert_eq!(error_message(r#"{"message":"Bin not found"}"#), "Bin not found");
        assert_eq!(error_message(""), "no message");
    }

    #[test]
    fn bin_url_joins_without_duplicate_slashes() {
        let config = RemoteConfig {
            base_url: "https://api.jsonbin.io/v3/".to_owned(),
            bin_id: "abc123".to_owned(),
            auth_header: "X-Master-Key".to_owned(),
            secret: "s".to_owned(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(HttpRemoteStore::new(config).url(), "https://api.jsonbin.io/v3/b/abc123");
    }

    #[test]
    fn disabled_remote_always_fails() {
        assert!(DisabledRemote.fetch().is_err());
        assert!(DisabledRemote.replace(&RemoteCollection::new()).is_err());
    }
}
