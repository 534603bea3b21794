//! Persisted user preferences (dark mode, temperature unit)

use anyhow::{Context, Result};
use fjall::Keyspace;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use tokio::task;

use crate::models::TemperatureUnit;

const DARK_MODE_KEY: &str = "dark_mode";
const TEMPERATURE_UNIT_KEY: &str = "temperature_unit";

/// Snapshot of all preference flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub dark_mode: bool,
    pub unit: TemperatureUnit,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            unit: TemperatureUnit::Celsius,
        }
    }
}

pub struct PreferenceStore {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PreferenceStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path)
            .open()
            .with_context(|| format!("Failed to open preference store at {}", path.display()))?;
        let items = db.keyspace("preferences", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { store: items })
    }

    #[tracing::instrument(name = "put_preference", level = "debug", skip(self))]
    async fn put<T: Serialize + Send + Debug + 'static>(&self, key: &str, value: T) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let bytes = postcard::to_stdvec(&value)?;
        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    #[tracing::instrument(name = "query_preference", level = "debug", skip(self))]
    async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;
        match maybe_bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => {
                tracing::debug!("Preference not set");
                Ok(None)
            }
        }
    }

    /// Dark mode is on unless explicitly turned off
    pub async fn dark_mode(&self) -> Result<bool> {
        Ok(self.get::<bool>(DARK_MODE_KEY).await?.unwrap_or(true))
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.put(DARK_MODE_KEY, enabled).await
    }

    pub async fn temperature_unit(&self) -> Result<TemperatureUnit> {
        Ok(self
            .get::<TemperatureUnit>(TEMPERATURE_UNIT_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn set_temperature_unit(&self, unit: TemperatureUnit) -> Result<()> {
        self.put(TEMPERATURE_UNIT_KEY, unit).await
    }

    pub async fn load(&self) -> Result<Preferences> {
        Ok(Preferences {
            dark_mode: self.dark_mode().await?,
            unit: self.temperature_unit().await?,
        })
    }
}
