//! Catalog Store - categories, subcategories and command templates
//!
//! The catalog is loaded once (built-in TOML payload or a user file given at
//! startup) and is read-only afterwards. Ordering is always the authored
//! order; nothing here sorts.

use crate::error::CatalogError;
use crate::render::Placeholder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, error};

/// Embedded catalog payload
const BUILTIN_CATALOG: &str = include_str!("data/catalog.toml");

/// Process-wide catalog, set once at startup
static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Symbolic icon tag shown next to a category name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryIcon {
    Terminal,
    TrendingUp,
    Globe,
}

impl CategoryIcon {
    /// Resolve an authored icon tag. Unknown tags fall back to `Terminal`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "TrendingUp" => CategoryIcon::TrendingUp,
            "Globe" => CategoryIcon::Globe,
            _ => CategoryIcon::Terminal,
        }
    }

    /// ASCII glyph for terminal display
    pub fn glyph(&self) -> &'static str {
        match self {
            CategoryIcon::Terminal => ">_",
            CategoryIcon::TrendingUp => "/^",
            CategoryIcon::Globe => "(@)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subcategory {
    /// Unique within the parent category only
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub info_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    pub fn icon_kind(&self) -> CategoryIcon {
        CategoryIcon::from_tag(&self.icon)
    }

    pub fn subcategory(&self, id: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }
}

/// Optional flag a user may append to a rendered template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtraOption {
    pub param: String,
    pub description: String,
}

/// A parameterized command
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    /// Globally unique identifier (e.g., "nc-listener")
    pub id: String,

    pub title: String,

    pub description: String,

    /// Command text with {{NAME}} placeholders
    pub template: String,

    /// Case-sensitive labels, authored order
    #[serde(default)]
    pub tags: Vec<String>,

    pub category_id: String,

    pub subcategory_id: String,

    #[serde(default)]
    pub extra_options: Vec<ExtraOption>,

    /// Rendered text is something to open in a browser, not a shell command
    #[serde(default)]
    pub is_browser: bool,
}

impl Template {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_extra_options(&self) -> bool {
        !self.extra_options.is_empty()
    }

    pub fn extra_option(&self, param: &str) -> Option<&ExtraOption> {
        self.extra_options.iter().find(|o| o.param == param)
    }
}

/// A `{{NAME}}` token in a template that is not part of the vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken {
    pub template_id: String,
    pub token: String,
}

/// Immutable collection of categories and templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    templates: Vec<Template>,
}

impl Catalog {
    /// Build a catalog from records, running the integrity pass
    pub fn new(categories: Vec<Category>, templates: Vec<Template>) -> Result<Self, CatalogError> {
        let catalog = Self {
            categories,
            templates,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog shipped inside the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse and validate a TOML catalog payload
    pub fn from_toml_str(payload: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(payload)?;
        catalog.validate()?;
        debug!(
            categories = catalog.categories.len(),
            templates = catalog.templates.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Read, parse and validate a catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let payload = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&payload)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn subcategory(&self, category_id: &str, subcategory_id: &str) -> Option<&Subcategory> {
        self.category(category_id)?.subcategory(subcategory_id)
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Union of all template tags, first-seen order, without duplicates
    pub fn all_tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut tags = Vec::new();
        for template in &self.templates {
            for tag in &template.tags {
                if seen.insert(tag.as_str()) {
                    tags.push(tag.as_str());
                }
            }
        }
        tags
    }

    /// Check id uniqueness and category/subcategory references.
    ///
    /// Returns the first violation found, walking categories then templates
    /// in catalog order.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }
            let mut sub_ids = HashSet::new();
            for sub in &category.subcategories {
                if !sub_ids.insert(sub.id.as_str()) {
                    return Err(CatalogError::DuplicateSubcategory {
                        category: category.id.clone(),
                        subcategory: sub.id.clone(),
                    });
                }
            }
        }

        let mut template_ids = HashSet::new();
        for template in &self.templates {
            if !template_ids.insert(template.id.as_str()) {
                return Err(CatalogError::DuplicateTemplate(template.id.clone()));
            }

            let category = self.category(&template.category_id).ok_or_else(|| {
                CatalogError::UnknownCategory {
                    template: template.id.clone(),
                    category: template.category_id.clone(),
                }
            })?;
            if category.subcategory(&template.subcategory_id).is_none() {
                return Err(CatalogError::UnknownSubcategory {
                    template: template.id.clone(),
                    category: template.category_id.clone(),
                    subcategory: template.subcategory_id.clone(),
                });
            }

            let mut params = HashSet::new();
            for option in &template.extra_options {
                if !params.insert(option.param.as_str()) {
                    return Err(CatalogError::DuplicateExtraOption {
                        template: template.id.clone(),
                        param: option.param.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Placeholder-shaped tokens outside the five-token vocabulary.
    ///
    /// These render as literal text, which is allowed, but usually means the
    /// payload was authored against a token the renderer does not know.
    pub fn unknown_tokens(&self) -> Vec<UnknownToken> {
        let mut found = Vec::new();
        for template in &self.templates {
            for name in crate::render::token_names(&template.template) {
                if Placeholder::from_name(name).is_none() {
                    found.push(UnknownToken {
                        template_id: template.id.clone(),
                        token: format!("{{{{{}}}}}", name),
                    });
                }
            }
        }
        found
    }
}

/// Install the process-wide catalog.
///
/// Only the first call wins. A later call hands the rejected catalog back.
pub fn install(catalog: Catalog) -> Result<&'static Catalog, Catalog> {
    CATALOG.set(catalog)?;
    Ok(global())
}

/// The process-wide catalog, falling back to the built-in payload
pub fn global() -> &'static Catalog {
    CATALOG.get_or_init(|| {
        Catalog::builtin().unwrap_or_else(|e| {
            error!("built-in catalog failed to load: {}", e);
            Catalog::default()
        })
    })
}

pub fn get_all_categories() -> &'static [Category] {
    global().categories()
}

pub fn get_all_templates() -> &'static [Template] {
    global().templates()
}

pub fn get_all_tags() -> Vec<&'static str> {
    global().all_tags()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn template(id: &str, category: &str, sub: &str, tags: &[&str]) -> Template {
        Template {
            id: id.to_string(),
            title: format!("{} title", id),
            description: format!("{} description", id),
            template: format!("{} {{{{RHOST}}}}", id),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category_id: category.to_string(),
            subcategory_id: sub.to_string(),
            extra_options: vec![],
            is_browser: false,
        }
    }

    pub(crate) fn category(id: &str, subs: &[&str]) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_uppercase(),
            icon: "Terminal".to_string(),
            subcategories: subs
                .iter()
                .map(|s| Subcategory {
                    id: s.to_string(),
                    name: s.to_string(),
                    info_url: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.categories().is_empty());
        assert!(!catalog.templates().is_empty());
        assert!(catalog.unknown_tokens().is_empty());
    }

    #[test]
    fn test_builtin_catalog_uses_every_placeholder() {
        let catalog = Catalog::builtin().unwrap();
        for placeholder in Placeholder::ALL {
            assert!(
                catalog
                    .templates()
                    .iter()
                    .any(|t| t.template.contains(placeholder.token())),
                "no template uses {}",
                placeholder.token()
            );
        }
    }

    #[test]
    fn test_all_tags_first_seen_order() {
        let catalog = Catalog::new(
            vec![category("net", &["scan"])],
            vec![
                template("t1", "net", "scan", &["a", "b"]),
                template("t2", "net", "scan", &["b", "c"]),
            ],
        )
        .unwrap();
        assert_eq!(catalog.all_tags(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let catalog = Catalog::new(
            vec![category("net", &["scan"])],
            vec![
                template("t1", "net", "scan", &["Linux"]),
                template("t2", "net", "scan", &["linux"]),
            ],
        )
        .unwrap();
        assert_eq!(catalog.all_tags(), vec!["Linux", "linux"]);
    }

    #[test]
    fn test_subcategory_ids_may_repeat_across_categories() {
        let result = Catalog::new(
            vec![category("a", &["linux"]), category("b", &["linux"])],
            vec![template("t1", "b", "linux", &[])],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_duplicate_template_rejected() {
        let err = Catalog::new(
            vec![category("net", &["scan"])],
            vec![
                template("t1", "net", "scan", &[]),
                template("t1", "net", "scan", &[]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTemplate(id) if id == "t1"));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let err = Catalog::new(vec![category("net", &[]), category("net", &[])], vec![])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCategory(_)));
    }

    #[test]
    fn test_duplicate_subcategory_rejected() {
        let err = Catalog::new(vec![category("net", &["scan", "scan"])], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSubcategory { .. }));
    }

    #[test]
    fn test_dangling_references_rejected() {
        let err = Catalog::new(
            vec![category("net", &["scan"])],
            vec![template("t1", "web", "scan", &[])],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory { .. }));

        // Subcategory exists, but under another category
        let err = Catalog::new(
            vec![category("net", &["scan"]), category("web", &["dirs"])],
            vec![template("t1", "net", "dirs", &[])],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownSubcategory { .. }));
        assert!(err.is_integrity());
    }

    #[test]
    fn test_duplicate_extra_option_rejected() {
        let mut t = template("t1", "net", "scan", &[]);
        t.extra_options = vec![
            ExtraOption {
                param: "-v".to_string(),
                description: "verbose".to_string(),
            },
            ExtraOption {
                param: "-v".to_string(),
                description: "again".to_string(),
            },
        ];
        let err = Catalog::new(vec![category("net", &["scan"])], vec![t]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateExtraOption { .. }));
    }

    #[test]
    fn test_unknown_tokens_reported() {
        let mut t = template("t1", "net", "scan", &[]);
        t.template = "curl {{URL}} -H {{TOKEN}}".to_string();
        let catalog = Catalog::new(vec![category("net", &["scan"])], vec![t]).unwrap();
        let unknown = catalog.unknown_tokens();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].token, "{{TOKEN}}");
    }

    #[test]
    fn test_parse_error_is_not_integrity() {
        let err = Catalog::from_toml_str("[[categories]\nid = ").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(!err.is_integrity());
    }

    #[test]
    fn test_icon_fallback() {
        assert_eq!(CategoryIcon::from_tag("Globe"), CategoryIcon::Globe);
        assert_eq!(CategoryIcon::from_tag("Skull"), CategoryIcon::Terminal);
    }

    #[test]
    fn test_is_browser_defaults_false() {
        let catalog = Catalog::builtin().unwrap();
        let nmap = catalog.template("nmap-default").unwrap();
        assert!(!nmap.is_browser);
        assert!(catalog.template("robots-txt").unwrap().is_browser);
    }
}
