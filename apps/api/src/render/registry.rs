//! Template lookup by id. Unknown ids resolve to the default template, never an error.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::render::template::{Template, TemplateMeta};
use crate::render::templates::{Classic, Minimal, PrimeAts, Professional};

pub const DEFAULT_TEMPLATE_ID: &str = "professional";

pub struct TemplateRegistry {
    templates: HashMap<&'static str, Arc<dyn Template>>,
    aliases: HashMap<&'static str, &'static str>,
    /// Registration order, for listing.
    order: Vec<&'static str>,
    default: Arc<dyn Template>,
}

impl TemplateRegistry {
    /// Creates a registry holding only `default`.
    pub fn new(default: Arc<dyn Template>) -> Self {
        let mut registry = Self {
            templates: HashMap::new(),
            aliases: HashMap::new(),
            order: Vec::new(),
            default: default.clone(),
        };
        registry.register(default);
        registry
    }

    /// The bundled template set.
    pub fn builtin() -> Self {
        let mut registry = Self::new(Arc::new(Professional));
        registry.alias("modern", DEFAULT_TEMPLATE_ID);
        registry.register(Arc::new(PrimeAts));
        registry.register(Arc::new(Minimal));
        registry.register(Arc::new(Classic));
        registry
    }

    pub fn register(&mut self, template: Arc<dyn Template>) {
        let id = template.id();
        if self.templates.insert(id, template).is_none() {
            self.order.push(id);
        }
    }

    pub fn alias(&mut self, alias: &'static str, target: &'static str) {
        self.aliases.insert(alias, target);
    }

    /// Looks up `id` (or an alias), falling back to the default template.
    pub fn resolve(&self, id: &str) -> Arc<dyn Template> {
        let canonical = self.aliases.get(id).copied().unwrap_or(id);
        match self.templates.get(canonical) {
            Some(template) => template.clone(),
            None => {
                debug!("unknown template '{id}', using '{}'", self.default.id());
                self.default.clone()
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        let canonical = self.aliases.get(id).copied().unwrap_or(id);
        self.templates.contains_key(canonical)
    }

    pub fn list(&self) -> Vec<TemplateMeta> {
        self.order
            .iter()
            .filter_map(|id| self.templates.get(id))
            .map(|template| *template.meta())
            .collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_and_unknown_resolve_to_default() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.resolve("modern").id(), "professional");
        assert_eq!(registry.resolve("does-not-exist").id(), "professional");
        assert_eq!(registry.resolve("").id(), "professional");
        assert_eq!(registry.resolve("prime-ats").id(), "prime-ats");
        assert!(registry.contains("modern"));
        assert!(!registry.contains("creative"));
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let ids: Vec<&str> = TemplateRegistry::builtin().list().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["professional", "prime-ats", "minimal", "classic"]);
    }
}
