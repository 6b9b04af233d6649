use crate::core::models::domain::DomainUnit;
use crate::core::models::template::Template;
use std::collections::HashMap;

/// Completed selections keyed by [`DomainUnit::cache_key`].
///
/// The cache is owned by the caller and passed in explicitly; nothing in the engine
/// keeps selections alive on its own.
#[derive(Debug, Default, Clone)]
pub struct TemplateCache {
    data: HashMap<String, Template>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unit: &DomainUnit) -> Option<&Template> {
        self.data.get(&unit.cache_key())
    }

    pub fn insert(&mut self, unit: &DomainUnit, template: Template) {
        self.data.insert(unit.cache_key(), template);
    }

    pub fn invalidate(&mut self, unit: &DomainUnit) -> Option<Template> {
        self.data.remove(&unit.cache_key())
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
