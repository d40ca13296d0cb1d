//! Embedded key-value store for user preferences

use fjall::Keyspace;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use tokio::task;

use crate::{Result, WeatherSenseError};

pub struct PreferenceStore {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn join_error(err: task::JoinError) -> WeatherSenseError {
    WeatherSenseError::storage(format!("store task failed: {err}"))
}

impl PreferenceStore {
    /// Open (or create) the store under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("preferences", fjall::KeyspaceCreateOptions::default)?;
        Ok(PreferenceStore { store: items })
    }

    /// Stores a serializable value under `key`, replacing any previous value.
    #[tracing::instrument(name = "put_preference", level = "debug", skip(self))]
    pub async fn put<T: Serialize + Debug + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let bytes = postcard::to_stdvec(value)?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(join_error)??;
        Ok(())
    }

    /// Retrieves a value. Returns `None` when the key is missing or holds undecodable bytes.
    #[tracing::instrument(name = "query_preference", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes))
                .await
                .map_err(join_error)??;

        match maybe_bytes {
            Some(bytes) => match postcard::from_bytes(&bytes) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    tracing::warn!("Ignoring undecodable value for '{}': {}", key, e);
                    Ok(None)
                }
            },
            None => {
                tracing::debug!("Key not found");
                Ok(None)
            }
        }
    }

    /// Removes a key from the store.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(join_error)??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, UnitSystem};

    #[tokio::test]
    async fn test_put_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();

        store.put("units", &UnitSystem::Imperial).await.unwrap();
        let units: Option<UnitSystem> = store.get("units").await.unwrap();
        assert_eq!(units, Some(UnitSystem::Imperial));

        store.remove("units").await.unwrap();
        let units: Option<UnitSystem> = store.get("units").await.unwrap();
        assert_eq!(units, None);
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();
        let paris = Location::with_country(48.85, 2.35, "Paris".to_string(), "FR".to_string());
        let oslo = Location::new(59.91, 10.75, "Oslo".to_string());

        store.put("last_location", &paris).await.unwrap();
        store.put("last_location", &oslo).await.unwrap();

        let loaded: Option<Location> = store.get("last_location").await.unwrap();
        assert_eq!(loaded, Some(oslo));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();
        let value: Option<String> = store.get("nothing").await.unwrap();
        assert!(value.is_none());
    }
}
