//! Species id → display name, for log output only.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use pokecull_core::SpeciesId;

pub const DEFAULT_POKEDEX_URL: &str = "https://raw.githubusercontent.com/giginet/pokedex/master/dex";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

pub trait SpeciesNames {
    /// `None` when the name is unknown or the lookup failed.
    fn name(&self, species: SpeciesId) -> Option<String>;
}

/// Fixed table, also used when lookups are disabled.
#[derive(Debug, Clone, Default)]
pub struct StaticNames(pub HashMap<SpeciesId, String>);

impl SpeciesNames for StaticNames {
    fn name(&self, species: SpeciesId) -> Option<String> {
        self.0.get(&species).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct DexEntry {
    name: String,
}

/// HTTP lookup over per-species JSON documents, cached for the run.
#[derive(Debug)]
pub struct PokedexClient {
    client: Client,
    base_url: String,
    cache: Mutex<HashMap<SpeciesId, Option<String>>>,
}

impl PokedexClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(DEFAULT_POKEDEX_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(LOOKUP_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn url_for(&self, species: SpeciesId) -> String {
        format!("{}/dex{}.json", self.base_url, species)
    }

    fn fetch(&self, species: SpeciesId) -> Option<String> {
        let url = self.url_for(species);
        let response = match self.client.get(&url).send() {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(%url, status = response.status().as_u16(), "name lookup failed");
                return None;
            }
            Err(e) => {
                debug!(%url, error = %e, "name lookup failed");
                return None;
            }
        };
        match response.json::<DexEntry>() {
            Ok(entry) => Some(entry.name),
            Err(e) => {
                debug!(%url, error = %e, "name lookup returned unexpected document");
                None
            }
        }
    }
}

impl SpeciesNames for PokedexClient {
    fn name(&self, species: SpeciesId) -> Option<String> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&species) {
                return hit.clone();
            }
        }
        let name = self.fetch(species);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(species, name.clone());
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_species_number() {
        let client = PokedexClient::with_base_url("https://example.invalid/dex/").unwrap();
        assert_eq!(client.url_for(SpeciesId::new(16)), "https://example.invalid/dex/dex16.json");
    }

    #[test]
    fn cached_answers_skip_the_network() {
        let client = PokedexClient::with_base_url("http://127.0.0.1:9").unwrap();
        client
            .cache
            .lock()
            .unwrap()
            .insert(SpeciesId::new(25), Some("ピカチュウ".to_string()));
        assert_eq!(client.name(SpeciesId::new(25)).as_deref(), Some("ピカチュウ"));
    }

    #[test]
    fn dex_entry_reads_name() {
        let entry: DexEntry = serde_json::from_str(r#"{"id":16,"name":"ポッポ","types":[]}"#).unwrap();
        assert_eq!(entry.name, "ポッポ");
    }

    #[test]
    fn static_names() {
        let names = StaticNames(HashMap::from([(SpeciesId::new(1), "Bulbasaur".to_string())]));
        assert_eq!(names.name(SpeciesId::new(1)).as_deref(), Some("Bulbasaur"));
        assert_eq!(names.name(SpeciesId::new(2)), None);
    }
}
