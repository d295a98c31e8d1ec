use crate::filter::{builtin, Filter};
use crate::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps filter names to their implementations
///
/// Stacks only carry names; a registry turns them into runnable filters when a
/// pipeline is built. Registering an existing name replaces its implementation,
/// which is how tests substitute filters.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in filter
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Registers a filter under `name`, returning the implementation it replaces
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F) -> Option<Arc<dyn Filter>>
    where
        F: Filter + 'static,
    {
        self.register_arc(name, Arc::new(filter))
    }

    pub fn register_arc(
        &mut self,
        name: impl Into<String>,
        filter: Arc<dyn Filter>,
    ) -> Option<Arc<dyn Filter>> {
        self.filters.insert(name.into(), filter)
    }

    /// Looks up the implementation registered under `name`
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<dyn Filter>)` - The registered implementation
    /// * `Err(ConfigError::UnknownFilter)` - Nothing is registered under that name
    pub fn resolve(&self, name: &str) -> ConfigResult<Arc<dyn Filter>> {
        self.filters
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownFilter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperOptions;
    use crate::filter::{test_support, Document, FilterError, PageContext};
    use crate::page::PageRecord;

    fn marker(value: &'static str) -> impl Filter {
        move |_: &mut Document, _: &mut PageContext, out: &mut PageRecord| {
            out.fields.insert("marker".to_string(), value.to_string());
            Ok::<(), FilterError>(())
        }
    }

    #[test]
    fn test_builtin_names_registered() {
        let registry = FilterRegistry::with_builtin();
        for name in [
            "container",
            "clean_html",
            "normalize_urls",
            "internal_urls",
            "entries",
            "title",
            "inner_html",
            "clean_text",
            "attribution",
        ] {
            assert!(registry.contains(name), "{}", name);
        }
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::new();
        assert!(matches!(
            registry.resolve("nope"),
            Err(ConfigError::UnknownFilter(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_register_replaces_implementation() {
        let mut registry = FilterRegistry::new();
        assert!(registry.register("mark", marker("first")).is_none());
        assert!(registry.register("mark", marker("second")).is_some());

        let filter = registry.resolve("mark").unwrap();
        let mut doc = Document::default();
        let mut ctx = test_support::context("", ScraperOptions::default());
        let mut out = PageRecord::default();
        filter.apply(&mut doc, &mut ctx, &mut out).unwrap();

        assert_eq!(out.fields["marker"], "second");
    }
}
