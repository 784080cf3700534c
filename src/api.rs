use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageRef {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub name: String,
    pub language: LanguageRef,
}

impl LocalizedName {
    pub fn new(language: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            language: LanguageRef {
                name: language.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: serde_json::Value,
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub abilities: Vec<PokemonAbilitySlot>,
    #[serde(default)]
    pub moves: Vec<PokemonMoveSlot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonTypeSlot {
    #[serde(rename = "type")]
    pub type_info: NamedResource,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonAbilitySlot {
    pub ability: NamedResource,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonMoveSlot {
    #[serde(rename = "move")]
    pub move_info: NamedResource,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub names: Vec<LocalizedName>,
}

/// Any ability, move or type resource; only its names matter here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub name: String,
    #[serde(default)]
    pub names: Vec<LocalizedName>,
}

impl PokemonRecord {
    pub fn sprite_front_default(&self) -> Option<String> {
        pointer_string(&self.sprites, "/front_default")
    }
}

pub fn localized_name<'a>(names: &'a [LocalizedName], language: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|entry| entry.language.name == language)
        .map(|entry| entry.name.as_str())
}

/// Remote collection the catalog is read from.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn pokemon(&self, id: u32) -> Result<PokemonRecord, FetchError>;
    async fn species(&self, id: u32) -> Result<SpeciesRecord, FetchError>;
    async fn resource(&self, url: &str) -> Result<ResourceRecord, FetchError>;
    /// Raw image bytes behind a sprite URL.
    async fn sprite(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct PokeApiClient {
    client: reqwest::Client,
    base: String,
    timeout: Duration,
}

impl PokeApiClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base = base.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Network {
                url: base.clone(),
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    pub fn pokemon_url(&self, id: u32) -> String {
        format!("{}/pokemon/{id}", self.base)
    }

    pub fn species_url(&self, id: u32) -> String {
        format!("{}/pokemon-species/{id}", self.base)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::trace!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.request_error(url, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(url, status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| self.request_error(url, err))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::trace!(url, "GET bytes");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.request_error(url, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(url, status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.request_error(url, err))?;
        Ok(bytes.to_vec())
    }

    fn request_error(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            return FetchError::Timeout {
                operation: format!("GET {url}"),
                seconds: self.timeout.as_secs(),
            };
        }
        FetchError::from_reqwest(url, err)
    }
}

#[async_trait]
impl CatalogApi for PokeApiClient {
    async fn pokemon(&self, id: u32) -> Result<PokemonRecord, FetchError> {
        self.get_json(&self.pokemon_url(id)).await
    }

    async fn species(&self, id: u32) -> Result<SpeciesRecord, FetchError> {
        self.get_json(&self.species_url(id)).await
    }

    async fn resource(&self, url: &str) -> Result<ResourceRecord, FetchError> {
        self.get_json(url).await
    }

    async fn sprite(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.get_bytes(url).await
    }
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}
