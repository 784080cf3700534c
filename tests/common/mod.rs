//! In-memory catalog and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use pokedex_ko::api::{
    CatalogApi, LocalizedName, NamedResource, PokemonAbilitySlot, PokemonMoveSlot, PokemonRecord,
    PokemonTypeSlot, ResourceRecord, SpeciesRecord,
};
use pokedex_ko::error::FetchError;
use pokedex_ko::state::{CatalogItem, CatalogPage};

pub const BASE: &str = "https://api.test";

#[derive(Default)]
pub struct MockCatalog {
    pokemon: HashMap<u32, PokemonRecord>,
    species: HashMap<u32, SpeciesRecord>,
    resources: HashMap<String, ResourceRecord>,
    sprites: HashMap<String, Vec<u8>>,
    broken_species: HashSet<u32>,
    broken_urls: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockCatalog {
    /// A catalog holding ids `1..=count`, each with a Korean species name.
    pub fn with_count(count: u32) -> Self {
        let mut mock = Self::default();
        for id in 1..=count {
            mock.add(id, &format!("mon-{id}"), &[("ko", &format!("몬{id}"))]);
        }
        mock
    }

    pub fn add(&mut self, id: u32, name: &str, names: &[(&str, &str)]) -> &mut Self {
        self.pokemon.insert(
            id,
            PokemonRecord {
                id,
                name: name.to_string(),
                height: 4,
                weight: 60,
                sprites: serde_json::json!({ "front_default": sprite_url(id) }),
                types: Vec::new(),
                abilities: Vec::new(),
                moves: Vec::new(),
            },
        );
        self.species.insert(
            id,
            SpeciesRecord {
                id,
                name: name.to_string(),
                names: names
                    .iter()
                    .map(|(lang, text)| LocalizedName::new(lang, text))
                    .collect(),
            },
        );
        self
    }

    /// Attach a type, ability or move reference to pokemon `id` and register
    /// its resource with the given names.
    pub fn link(&mut self, id: u32, kind: &str, name: &str, names: &[(&str, &str)]) -> &mut Self {
        let url = format!("{BASE}/{kind}/{name}/");
        let resource = NamedResource {
            name: name.to_string(),
            url: url.clone(),
        };
        if let Some(record) = self.pokemon.get_mut(&id) {
            match kind {
                "type" => record.types.push(PokemonTypeSlot {
                    type_info: resource,
                }),
                "ability" => record.abilities.push(PokemonAbilitySlot { ability: resource }),
                _ => record.moves.push(PokemonMoveSlot {
                    move_info: resource,
                }),
            }
        }
        self.resources.insert(
            url,
            ResourceRecord {
                name: name.to_string(),
                names: names
                    .iter()
                    .map(|(lang, text)| LocalizedName::new(lang, text))
                    .collect(),
            },
        );
        self
    }

    /// Serve `bytes` for pokemon `id`'s front sprite.
    pub fn sprite_bytes(&mut self, id: u32, bytes: Vec<u8>) -> &mut Self {
        self.sprites.insert(sprite_url(id), bytes);
        self
    }

    pub fn break_species(&mut self, id: u32) -> &mut Self {
        self.broken_species.insert(id);
        self
    }

    pub fn break_url(&mut self, url: &str) -> &mut Self {
        self.broken_urls.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

pub fn sprite_url(id: u32) -> String {
    format!("{BASE}/sprites/{id}.png")
}

fn reset(url: String) -> FetchError {
    FetchError::Network {
        url,
        message: "connection reset".into(),
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn pokemon(&self, id: u32) -> Result<PokemonRecord, FetchError> {
        let url = format!("{BASE}/pokemon/{id}");
        self.record(url.clone());
        self.pokemon
            .get(&id)
            .cloned()
            .ok_or(FetchError::NotFound { url })
    }

    async fn species(&self, id: u32) -> Result<SpeciesRecord, FetchError> {
        let url = format!("{BASE}/pokemon-species/{id}");
        self.record(url.clone());
        if self.broken_species.contains(&id) {
            return Err(reset(url));
        }
        self.species
            .get(&id)
            .cloned()
            .ok_or(FetchError::NotFound { url })
    }

    async fn resource(&self, url: &str) -> Result<ResourceRecord, FetchError> {
        self.record(url.to_string());
        if self.broken_urls.contains(url) {
            return Err(reset(url.to_string()));
        }
        self.resources
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }

    async fn sprite(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.record(url.to_string());
        if self.broken_urls.contains(url) {
            return Err(reset(url.to_string()));
        }
        self.sprites
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }
}

pub fn item(id: u32, display_name: &str) -> CatalogItem {
    CatalogItem {
        id,
        name: format!("mon-{id}"),
        display_name: display_name.to_string(),
        sprite_url: None,
        types: Vec::new(),
        abilities: Vec::new(),
        moves: Vec::new(),
    }
}

/// Page `number` holding `count` generated items.
pub fn page(number: u32, requested: u32, count: u32) -> CatalogPage {
    let start = (number - 1) * requested + 1;
    CatalogPage {
        number,
        requested,
        items: (start..start + count)
            .map(|id| item(id, &format!("몬{id}")))
            .collect(),
    }
}

pub fn named_page(number: u32, requested: u32, names: &[&str]) -> CatalogPage {
    let start = (number - 1) * requested + 1;
    CatalogPage {
        number,
        requested,
        items: names
            .iter()
            .enumerate()
            .map(|(offset, name)| item(start + offset as u32, name))
            .collect(),
    }
}
