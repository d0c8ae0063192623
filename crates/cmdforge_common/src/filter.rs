//! Filter state held by a browsing session
//!
//! Mirrors what the user has picked in the sidebar and search bar, and owns
//! the "nothing selected yet" gate on top of the query pipeline.

use crate::catalog::{Catalog, Subcategory, Template};
use crate::query;

/// What a session should display for its current filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visible<'a> {
    /// No category, subcategory, query or tag chosen yet
    NothingSelected,
    /// Filters are set but nothing survives them
    NoMatches,
    Templates(Vec<&'a Template>),
}

impl<'a> Visible<'a> {
    /// The templates to show; empty for both non-`Templates` states
    pub fn templates(&self) -> &[&'a Template] {
        match self {
            Visible::Templates(templates) => templates,
            _ => &[],
        }
    }

    pub fn into_templates(self) -> Vec<&'a Template> {
        match self {
            Visible::Templates(templates) => templates,
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub search_query: String,
    /// Selection order is kept for chip display
    pub selected_tags: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choosing a category always drops the subcategory selection
    pub fn select_category(&mut self, category_id: impl Into<String>) {
        self.category_id = Some(category_id.into());
        self.subcategory_id = None;
    }

    pub fn select_subcategory(&mut self, subcategory_id: impl Into<String>) {
        self.subcategory_id = Some(subcategory_id.into());
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
    }

    /// Add the tag if absent, otherwise remove it. Returns true when added.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.selected_tags.iter().position(|t| t == tag) {
            self.selected_tags.remove(pos);
            false
        } else {
            self.selected_tags.push(tag.to_string());
            true
        }
    }

    pub fn clear_tags(&mut self) {
        self.selected_tags.clear();
    }

    /// Back to the landing state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_unselected(&self) -> bool {
        self.category_id.is_none()
            && self.subcategory_id.is_none()
            && self.search_query.is_empty()
            && self.selected_tags.is_empty()
    }

    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Visible<'a> {
        if self.is_unselected() {
            return Visible::NothingSelected;
        }

        let templates = query::compose(
            catalog,
            self.category_id.as_deref(),
            self.subcategory_id.as_deref(),
            &self.search_query,
            &self.selected_tags,
        );

        if templates.is_empty() {
            Visible::NoMatches
        } else {
            Visible::Templates(templates)
        }
    }

    /// The selected subcategory record, when both levels are selected
    pub fn current_subcategory<'a>(&self, catalog: &'a Catalog) -> Option<&'a Subcategory> {
        let category = self.category_id.as_deref()?;
        let subcategory = self.subcategory_id.as_deref()?;
        catalog.subcategory(category, subcategory)
    }

    pub fn is_category_selected(&self, category_id: &str) -> bool {
        self.category_id.as_deref() == Some(category_id)
    }
}
