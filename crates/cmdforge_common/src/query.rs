//! Query Engine - narrow the catalog by category, text and tags
//!
//! Every stage keeps catalog order and only ever drops templates. Callers
//! compose them as category -> search -> tags (see `compose`).

use crate::catalog::{Catalog, Template};
use tracing::debug;

/// Templates in a category, or a category/subcategory pair.
///
/// No category means no filter at all: the whole catalog is returned, so the
/// result can feed search and tag filtering on its own. A subcategory without
/// a category is ignored here, as in the UI the subcategory is only
/// reachable through its category.
pub fn filter_by_category<'a>(
    catalog: &'a Catalog,
    category_id: Option<&str>,
    subcategory_id: Option<&str>,
) -> Vec<&'a Template> {
    let templates = catalog.templates().iter();
    match (category_id, subcategory_id) {
        (None, _) => templates.collect(),
        (Some(category), None) => templates.filter(|t| t.category_id == category).collect(),
        (Some(category), Some(sub)) => templates
            .filter(|t| t.category_id == category && t.subcategory_id == sub)
            .collect(),
    }
}

/// Case-insensitive substring search.
///
/// A template matches when the query occurs in its title, description,
/// command text, or inside any one of its tags (substring, same as the other
/// fields: "shell" matches the tag "powershell"). An empty query matches
/// everything.
pub fn search<'a>(query: &str, within: &[&'a Template]) -> Vec<&'a Template> {
    if query.is_empty() {
        return within.to_vec();
    }

    let needle = query.to_lowercase();
    within
        .iter()
        .copied()
        .filter(|t| matches_query(t, &needle))
        .collect()
}

fn matches_query(template: &Template, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&template.title)
        || contains(&template.description)
        || contains(&template.template)
        || template.tags.iter().any(|tag| contains(tag))
}

/// Keep templates carrying every selected tag (AND). No tags keeps all.
pub fn filter_by_tags<'a, S: AsRef<str>>(
    selected_tags: &[S],
    within: &[&'a Template],
) -> Vec<&'a Template> {
    within
        .iter()
        .copied()
        .filter(|t| selected_tags.iter().all(|tag| t.has_tag(tag.as_ref())))
        .collect()
}

/// Category/subcategory, then search, then tags.
///
/// This is the pipeline only; the "nothing selected yet" gate lives in
/// `FilterState::visible`.
pub fn compose<'a, S: AsRef<str>>(
    catalog: &'a Catalog,
    category_id: Option<&str>,
    subcategory_id: Option<&str>,
    query: &str,
    selected_tags: &[S],
) -> Vec<&'a Template> {
    let by_category = filter_by_category(catalog, category_id, subcategory_id);
    let by_search = search(query, &by_category);
    let result = filter_by_tags(selected_tags, &by_search);

    debug!(
        category = category_id.unwrap_or("-"),
        subcategory = subcategory_id.unwrap_or("-"),
        query,
        tags = selected_tags.len(),
        by_category = by_category.len(),
        by_search = by_search.len(),
        result = result.len(),
        "query composed"
    );

    result
}
