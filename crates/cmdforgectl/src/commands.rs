//! Command handlers for cmdforgectl.
//!
//! Handlers write to a caller-supplied writer; `main` passes stdout.

use anyhow::{anyhow, Context, Result};
use cmdforge_common::catalog::{self, UnknownToken};
use cmdforge_common::{
    render as render_template, Catalog, ClipboardSink, FilterState, InputValues, Template,
    TemplateCard, Visible,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::CtlError;
use crate::output::{self, Painter};

/// Resolve the catalog for this run: an external file replaces the built-in
/// payload for the whole process.
pub fn load_catalog(path: Option<&Path>) -> Result<&'static Catalog> {
    let catalog = match path {
        Some(path) => {
            let loaded = Catalog::load(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            info!(path = %path.display(), templates = loaded.templates().len(), "external catalog loaded");
            catalog::install(loaded).map_err(|_| anyhow!("catalog was already loaded"))?
        }
        None => {
            // Load explicitly so a broken payload fails here instead of in
            // the global's empty fallback.
            let builtin = Catalog::builtin().context("loading built-in catalog")?;
            catalog::install(builtin).unwrap_or_else(|_| catalog::global())
        }
    };

    warn_unknown_tokens(&catalog.unknown_tokens());
    Ok(catalog)
}

fn warn_unknown_tokens(tokens: &[UnknownToken]) {
    for token in tokens {
        warn!(template = %token.template_id, token = %token.token, "unknown placeholder, left as literal text");
    }
}

/// Handle `categories`
pub fn categories(out: &mut dyn Write, painter: &Painter, catalog: &Catalog) -> Result<()> {
    output::write_categories(out, painter, catalog.categories())?;
    Ok(())
}

/// Handle `tags`; `None` shows every tag
pub fn tags(out: &mut dyn Write, catalog: &Catalog, limit: Option<usize>) -> Result<()> {
    let tags = catalog.all_tags();
    let shown = match limit {
        Some(limit) => &tags[..tags.len().min(limit)],
        None => &tags[..],
    };
    for tag in shown {
        writeln!(out, "{}", tag)?;
    }
    Ok(())
}

/// One template in `list --json`
#[derive(Debug, Serialize)]
pub struct ListedTemplate<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub category_id: &'a str,
    pub subcategory_id: &'a str,
    pub tags: &'a [String],
    pub command: String,
    pub is_browser: bool,
}

/// `list --json` payload
#[derive(Debug, Serialize)]
pub struct ListReport<'a> {
    /// "nothing_selected", "no_matches" or "templates"
    pub status: &'static str,
    pub templates: Vec<ListedTemplate<'a>>,
}

impl<'a> ListReport<'a> {
    pub fn new(visible: &Visible<'a>, inputs: &InputValues) -> Self {
        let status = match visible {
            Visible::NothingSelected => "nothing_selected",
            Visible::NoMatches => "no_matches",
            Visible::Templates(_) => "templates",
        };
        let templates = visible
            .templates()
            .iter()
            .copied()
            .map(|t| ListedTemplate {
                id: &t.id,
                title: &t.title,
                description: &t.description,
                category_id: &t.category_id,
                subcategory_id: &t.subcategory_id,
                tags: &t.tags,
                command: render_template(&t.template, inputs),
                is_browser: t.is_browser,
            })
            .collect();
        Self { status, templates }
    }
}

/// Handle `list`
pub fn list(
    out: &mut dyn Write,
    painter: &Painter,
    catalog: &Catalog,
    filters: &FilterState,
    inputs: &InputValues,
    json: bool,
) -> Result<()> {
    let visible = filters.visible(catalog);
    debug!(shown = visible.templates().len(), "list");

    if json {
        let report = ListReport::new(&visible, inputs);
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    match &visible {
        Visible::NothingSelected => output::write_nothing_selected(out, painter)?,
        Visible::NoMatches => output::write_no_matches(out, painter)?,
        Visible::Templates(templates) => {
            output::write_selection_heading(out, painter, catalog, filters, templates.len())?;
            for (index, template) in templates.iter().enumerate() {
                let rendered = render_template(&template.template, inputs);
                output::write_card(out, painter, index + 1, template, &rendered, None, false)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Look up a template and build its card with the requested extras.
/// Every extra must be one of the template's options.
pub fn prepare_card<'c>(
    catalog: &'c Catalog,
    template_id: &str,
    extras: &[String],
) -> Result<(&'c Template, TemplateCard)> {
    let template = catalog
        .template(template_id)
        .ok_or_else(|| CtlError::UnknownTemplate(template_id.to_string()))?;

    let mut card = TemplateCard::new(template);
    for param in extras {
        if template.extra_option(param).is_none() {
            let available: Vec<&str> = template
                .extra_options
                .iter()
                .map(|o| o.param.as_str())
                .collect();
            return Err(CtlError::UnknownExtraOption {
                template: template.id.clone(),
                param: param.clone(),
                available: if available.is_empty() {
                    "none".to_string()
                } else {
                    available.join(", ")
                },
            }
            .into());
        }
        card.add_param(param);
    }
    Ok((template, card))
}

/// Handle `render`. With a sink the command is also copied; the command is
/// printed either way so a failed copy still leaves it on screen.
#[allow(clippy::too_many_arguments)]
pub fn render(
    out: &mut dyn Write,
    notice: &mut dyn Write,
    painter: &Painter,
    catalog: &Catalog,
    template_id: &str,
    inputs: &InputValues,
    extras: &[String],
    sink: Option<&mut dyn ClipboardSink>,
) -> Result<()> {
    let (template, mut card) = prepare_card(catalog, template_id, extras)?;
    let rendered = render_template(&template.template, inputs);

    let Some(sink) = sink else {
        writeln!(out, "{}", card.current_command(&rendered))?;
        return Ok(());
    };

    let outcome = card.copy(&rendered, sink, Instant::now());
    writeln!(out, "{}", outcome.text)?;
    match outcome.error {
        None => {
            writeln!(notice, "{}", painter.added("Copied!"))?;
            Ok(())
        }
        Some(e) => Err(CtlError::ClipboardFailed(e).into()),
    }
}

/// Handle `validate`: load (which runs the integrity pass) and report
/// unknown placeholder tokens.
pub fn validate(out: &mut dyn Write, painter: &Painter, path: Option<&Path>) -> Result<()> {
    let (catalog, source) = match path {
        Some(path) => (
            Catalog::load(path).with_context(|| format!("validating {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (
            Catalog::builtin().context("validating built-in catalog")?,
            "built-in catalog".to_string(),
        ),
    };

    writeln!(
        out,
        "{} {}: {} categories, {} templates, {} tags",
        painter.added("OK"),
        source,
        catalog.categories().len(),
        catalog.templates().len(),
        catalog.all_tags().len()
    )?;

    for token in catalog.unknown_tokens() {
        writeln!(
            out,
            "{} {} uses unknown placeholder {}",
            painter.warn("warning:"),
            token.template_id,
            token.token
        )?;
    }
    Ok(())
}
