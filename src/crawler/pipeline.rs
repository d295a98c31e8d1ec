//! Pipeline executor: HTML-phase filters, then text-phase filters

use crate::filter::{Document, Filter, FilterError, FilterRegistry, FilterStack, PageContext};
use crate::page::PageRecord;
use crate::ConfigResult;
use std::fmt;
use std::sync::Arc;

/// Filters resolved from a pair of stacks, ready to run
#[derive(Clone)]
pub struct Pipeline {
    html_filters: Vec<(String, Arc<dyn Filter>)>,
    text_filters: Vec<(String, Arc<dyn Filter>)>,
}

impl Pipeline {
    /// Resolves every name of both stacks against `registry`
    ///
    /// Fails with `ConfigError::UnknownFilter` on the first name that has no
    /// registered implementation.
    pub fn build(
        registry: &FilterRegistry,
        html_filters: &FilterStack,
        text_filters: &FilterStack,
    ) -> ConfigResult<Self> {
        Ok(Self {
            html_filters: resolve_stack(registry, html_filters)?,
            text_filters: resolve_stack(registry, text_filters)?,
        })
    }

    /// Runs the pipeline over one page
    ///
    /// Errors, including the ignore signal, are returned untouched.
    pub fn run(
        &self,
        html: String,
        context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        let mut doc = Document::new(html);

        for (name, filter) in self.html_filters.iter().chain(self.text_filters.iter()) {
            tracing::trace!("Applying filter {} to {}", name, context.url);
            filter.apply(&mut doc, context, output)?;
        }

        Ok(())
    }

    /// Filter names in execution order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.html_filters
            .iter()
            .chain(self.text_filters.iter())
            .map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn resolve_stack(
    registry: &FilterRegistry,
    stack: &FilterStack,
) -> ConfigResult<Vec<(String, Arc<dyn Filter>)>> {
    stack
        .iter()
        .map(|name| Ok((name.to_string(), registry.resolve(name)?)))
        .collect()
}
