//! Page loading for the list screen and record assembly for the detail screen.

use std::future::Future;
use std::time::Duration;

use futures_util::future::{try_join, try_join_all};
use tokio::sync::Semaphore;

use crate::api::{localized_name, CatalogApi, NamedResource, PokemonRecord, SpeciesRecord};
use crate::error::FetchError;
use crate::sprite::{decode_sprite, SpriteData};
use crate::state::{CatalogItem, CatalogPage, DetailRecord, Label, ResourceRef};

const LABEL_CONCURRENCY: usize = 12;

/// Identifiers covered by a 1-based page. A page starting past `u32::MAX`
/// is empty.
pub fn page_ids(page: u32, page_size: u32) -> std::ops::RangeInclusive<u32> {
    let start = page
        .saturating_sub(1)
        .checked_mul(page_size)
        .and_then(|skipped| skipped.checked_add(1));
    match start {
        Some(start) => start..=page.saturating_mul(page_size),
        #[allow(clippy::reversed_empty_ranges)]
        None => 1..=0,
    }
}

/// Fetch one page of items, one identifier at a time.
///
/// Any failure discards the whole page. A missing item ends the collection:
/// the page comes back short with whatever preceded the gap.
pub async fn load_page(
    api: &dyn CatalogApi,
    language: &str,
    page: u32,
    page_size: u32,
) -> Result<CatalogPage, FetchError> {
    let mut items = Vec::new();
    for id in page_ids(page, page_size) {
        let pokemon = match api.pokemon(id).await {
            Ok(pokemon) => pokemon,
            Err(err) if err.is_not_found() => {
                tracing::debug!(page, id, "collection ended");
                break;
            }
            Err(err) => return Err(err),
        };
        let species = api.species(id).await?;
        items.push(catalog_item(pokemon, &species, language)?);
    }
    tracing::debug!(page, count = items.len(), "page loaded");
    Ok(CatalogPage {
        number: page,
        requested: page_size,
        items,
    })
}

fn catalog_item(
    pokemon: PokemonRecord,
    species: &SpeciesRecord,
    language: &str,
) -> Result<CatalogItem, FetchError> {
    let display_name = primary_name(species, language)?;
    let sprite_url = pokemon.sprite_front_default();
    Ok(CatalogItem {
        id: pokemon.id,
        name: pokemon.name,
        display_name,
        sprite_url,
        types: pokemon
            .types
            .into_iter()
            .map(|slot| resource_ref(slot.type_info))
            .collect(),
        abilities: pokemon
            .abilities
            .into_iter()
            .map(|slot| resource_ref(slot.ability))
            .collect(),
        moves: pokemon
            .moves
            .into_iter()
            .map(|slot| resource_ref(slot.move_info))
            .collect(),
    })
}

fn resource_ref(resource: NamedResource) -> ResourceRef {
    ResourceRef {
        name: resource.name,
        url: resource.url,
    }
}

fn primary_name(species: &SpeciesRecord, language: &str) -> Result<String, FetchError> {
    localized_name(&species.names, language)
        .map(str::to_string)
        .ok_or_else(|| FetchError::MissingLocalization {
            resource: format!("pokemon-species/{}", species.id),
            language: language.to_string(),
        })
}

/// Assemble the detail record for `id`.
///
/// The species must carry a name in `language`; types, abilities and moves
/// without one fall back to their API name.
pub async fn load_detail(
    api: &dyn CatalogApi,
    language: &str,
    id: u32,
) -> Result<DetailRecord, FetchError> {
    let (pokemon, species) = try_join(api.pokemon(id), api.species(id)).await?;
    let display_name = primary_name(&species, language)?;

    let semaphore = Semaphore::new(LABEL_CONCURRENCY);
    let types: Vec<&NamedResource> = pokemon.types.iter().map(|slot| &slot.type_info).collect();
    let abilities: Vec<&NamedResource> =
        pokemon.abilities.iter().map(|slot| &slot.ability).collect();
    let moves: Vec<&NamedResource> = pokemon.moves.iter().map(|slot| &slot.move_info).collect();

    let ((types, abilities), moves) = try_join(
        try_join(
            resolve_labels(api, &semaphore, language, &types),
            resolve_labels(api, &semaphore, language, &abilities),
        ),
        resolve_labels(api, &semaphore, language, &moves),
    )
    .await?;

    tracing::debug!(
        id,
        types = types.len(),
        abilities = abilities.len(),
        moves = moves.len(),
        "detail assembled"
    );

    Ok(DetailRecord {
        id: pokemon.id,
        sprite_url: pokemon.sprite_front_default(),
        name: pokemon.name,
        display_name,
        height: pokemon.height,
        weight: pokemon.weight,
        types,
        abilities,
        moves,
    })
}

async fn resolve_labels(
    api: &dyn CatalogApi,
    semaphore: &Semaphore,
    language: &str,
    resources: &[&NamedResource],
) -> Result<Vec<Label>, FetchError> {
    try_join_all(
        resources
            .iter()
            .map(|resource| resolve_label(api, semaphore, language, resource)),
    )
    .await
}

async fn resolve_label(
    api: &dyn CatalogApi,
    semaphore: &Semaphore,
    language: &str,
    resource: &NamedResource,
) -> Result<Label, FetchError> {
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|err| FetchError::Network {
            url: resource.url.clone(),
            message: err.to_string(),
        })?;
    let record = api.resource(&resource.url).await?;
    Ok(match localized_name(&record.names, language) {
        Some(name) => Label::Localized(name.to_string()),
        None => {
            tracing::trace!(resource = %resource.name, language, "label fallback");
            Label::Fallback(resource.name.clone())
        }
    })
}

/// Fetch and decode the sprite shown on the detail screen.
pub async fn load_sprite(api: &dyn CatalogApi, url: &str) -> Result<SpriteData, FetchError> {
    let bytes = api.sprite(url).await?;
    let sprite = decode_sprite(&bytes, url)?;
    tracing::debug!(url, width = sprite.width(), height = sprite.height(), "sprite decoded");
    Ok(sprite)
}

/// Run `fut` under a deadline, turning expiry into [`FetchError::Timeout`].
pub async fn with_deadline<T, F>(
    deadline: Duration,
    operation: impl Into<String>,
    fut: F,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            let operation = operation.into();
            tracing::warn!(%operation, seconds = deadline.as_secs(), "deadline expired");
            Err(FetchError::Timeout {
                operation,
                seconds: deadline.as_secs(),
            })
        }
    }
}
