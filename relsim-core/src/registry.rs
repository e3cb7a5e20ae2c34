//! Name lookups for AIs, mechanism collections and generation methods.
//!
//! Saved universes and settings files refer to these by name. Unknown names
//! resolve to a harmless fallback instead of failing, so an old save still
//! loads after something was renamed. [`Registry::unknown_names`] lets the
//! turn controller warn about them once.

use crate::ai::default_ai::default_reasoner;
use crate::ai::{Ai, EmptyAi, UtilityAi, EMPTY_AI_NAME};
use crate::generate::GenerateUniverseMethod;
use crate::mechanism::MechanismLists;
use crate::state::UniverseData;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const DEFAULT_AI_NAME: &str = "default";
pub const DEFAULT_COLLECTION_NAME: &str = "default";
pub const EMPTY_COLLECTION_NAME: &str = "empty";

pub struct Registry {
    ais: FxHashMap<String, Arc<dyn Ai>>,
    collections: FxHashMap<String, MechanismLists>,
    generators: FxHashMap<String, GenerateUniverseMethod>,
    empty_ai: Arc<dyn Ai>,
    empty_collection: MechanismLists,
}

impl Registry {
    /// Registry with nothing but the fallbacks.
    pub fn empty() -> Self {
        Self {
            ais: FxHashMap::default(),
            collections: FxHashMap::default(),
            generators: FxHashMap::default(),
            empty_ai: Arc::new(EmptyAi),
            empty_collection: MechanismLists::empty(),
        }
    }

    pub fn register_ai(&mut self, ai: Arc<dyn Ai>) {
        self.ais.insert(ai.name().to_string(), ai);
    }

    pub fn register_collection(&mut self, name: &str, lists: MechanismLists) {
        self.collections.insert(name.to_string(), lists);
    }

    pub fn register_generator(&mut self, name: &str, method: GenerateUniverseMethod) {
        self.generators.insert(name.to_string(), method);
    }

    /// Unknown names get the AI that issues nothing. Looked up every turn,
    /// so misses are only logged at debug; see [`Registry::unknown_names`].
    pub fn ai(&self, name: &str) -> Arc<dyn Ai> {
        match self.ais.get(name) {
            Some(ai) => ai.clone(),
            None => {
                log::debug!("Unknown AI '{}', using '{}'", name, EMPTY_AI_NAME);
                self.empty_ai.clone()
            }
        }
    }

    /// Unknown names get the empty collection.
    pub fn mechanisms(&self, name: &str) -> &MechanismLists {
        match self.collections.get(name) {
            Some(lists) => lists,
            None => {
                log::debug!(
                    "Unknown mechanism collection '{}', using '{}'",
                    name,
                    EMPTY_COLLECTION_NAME
                );
                &self.empty_collection
            }
        }
    }

    /// Unknown names fall back to random generation.
    pub fn generator(&self, name: &str) -> GenerateUniverseMethod {
        match self.generators.get(name) {
            Some(method) => *method,
            None => {
                log::warn!("Unknown generation method '{}', using random", name);
                GenerateUniverseMethod::Random
            }
        }
    }

    /// AI and collection names used by `data` that aren't registered, each
    /// reported once however many players use it.
    pub fn unknown_names(&self, data: &UniverseData) -> BTreeSet<String> {
        let mut unknown: BTreeSet<String> = data
            .players
            .values()
            .map(|p| &p.internal.ai.ai_name)
            .filter(|name| !self.ais.contains_key(name.as_str()))
            .cloned()
            .collect();
        let collection = &data.settings.mechanism_collection_name;
        if !self.collections.contains_key(collection.as_str()) {
            unknown.insert(collection.clone());
        }
        unknown
    }

    pub fn ai_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ais.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    /// Every built-in AI, collection and generation method.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_ai(Arc::new(UtilityAi::new(DEFAULT_AI_NAME, default_reasoner)));
        registry.register_ai(Arc::new(EmptyAi));
        registry.register_collection(
            DEFAULT_COLLECTION_NAME,
            MechanismLists::default_collection(),
        );
        registry.register_collection(EMPTY_COLLECTION_NAME, MechanismLists::empty());
        registry.register_generator("random", GenerateUniverseMethod::Random);
        registry
    }
}
