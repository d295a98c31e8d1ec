//! Page records produced by the pipeline

use crate::url::history_key;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// One index entry extracted from a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    /// Element id the entry points at; None for the page itself
    pub anchor: Option<String>,
}

impl Entry {
    pub fn new(name: impl Into<String>, anchor: Option<String>) -> Self {
        Self {
            name: name.into(),
            anchor,
        }
    }
}

/// The result of processing one response
///
/// Built by the filters of one pipeline run and handed to the caller once
/// complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub subpath: String,
    pub entries: Vec<Entry>,
    /// Absolute internal URLs, unique ignoring case, in discovery order
    pub internal_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    /// Fields contributed by site-specific filters
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(skip)]
    internal_url_keys: HashSet<String>,
}

impl PageRecord {
    pub fn new(subpath: impl Into<String>) -> Self {
        Self {
            subpath: subpath.into(),
            ..Default::default()
        }
    }

    /// Records an internal URL, returning false if it was already present
    pub fn add_internal_url(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if !self.internal_url_keys.insert(history_key(&url)) {
            return false;
        }
        self.internal_urls.push(url);
        true
    }

    pub fn add_entry(&mut self, name: impl Into<String>, anchor: Option<String>) {
        self.entries.push(Entry::new(name, anchor));
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }
}
