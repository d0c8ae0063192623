//! cmdforge common - catalog, query engine and renderer
//!
//! The data engine behind cmdforgectl: a read-only catalog of command
//! templates, pure filter and search functions over it, placeholder
//! substitution, and the per-card state that appends optional flags.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extras;
pub mod filter;
pub mod query;
pub mod render;

pub use catalog::{
    get_all_categories, get_all_tags, get_all_templates, Catalog, Category, CategoryIcon,
    ExtraOption, Subcategory, Template,
};
pub use config::Config;
pub use error::{CatalogError, ClipboardError, ConfigError};
pub use extras::{ClipboardSink, CopyOutcome, ExtraParameterSet, PanelState, TemplateCard};
pub use filter::{FilterState, Visible};
pub use query::{compose, filter_by_category, filter_by_tags, search};
pub use render::{render, InputValues, Placeholder};
