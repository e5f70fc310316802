use crate::definition::BehaviorDefinition;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::sync::Arc;

/// Definitions a script hands to the harness. Nothing is discovered
/// implicitly: only what is registered here gets simulated.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: Vec<Arc<BehaviorDefinition>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(mut self, definition: BehaviorDefinition) -> Self {
        self.definitions.push(Arc::new(definition));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<BehaviorDefinition>> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BehaviorDefinition>> {
        self.definitions.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Picks the definition a new user instance runs, proportionally to each
    /// definition's weight. `None` when nothing is registered.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Arc<BehaviorDefinition>> {
        let index = WeightedIndex::new(self.definitions.iter().map(|d| d.weight())).ok()?;
        self.definitions.get(index.sample(rng))
    }
}
