//! Output formatting - terminal rendering of catalog data
//!
//! Everything writes to a caller-supplied writer so the session can be
//! driven from tests. Color is applied through `Painter`, which degrades to
//! plain text when color is off.

use cmdforge_common::render::{placeholder_segments, Segment};
use cmdforge_common::{
    Catalog, Category, FilterState, InputValues, PanelState, Placeholder, Subcategory, Template,
    TemplateCard,
};
use owo_colors::OwoColorize;
use std::io::{self, Write};

pub const THIN_SEPARATOR: &str = "----------------------------------------";

/// Category whose selection shows the wordlist path input
pub const WORDLIST_CATEGORY: &str = "web-enumeration";

#[derive(Debug, Clone, Copy)]
pub struct Painter {
    pub color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Unfilled `{{TOKEN}}` in a rendered command
    pub fn placeholder(&self, text: &str) -> String {
        if self.color {
            text.black().on_yellow().to_string()
        } else {
            text.to_string()
        }
    }

    /// Appended extra parameters and selected chips
    pub fn added(&self, text: &str) -> String {
        if self.color {
            text.bright_green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn accent(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warn(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Pad styled text to `width` columns measured on its plain form; `{:<N}`
/// would count escape bytes.
pub fn padded(styled: &str, plain: &str, width: usize) -> String {
    let fill = width.saturating_sub(plain.chars().count());
    format!("{}{}", styled, " ".repeat(fill))
}

/// Rendered command with unfilled placeholders highlighted and extra
/// parameters colored
pub fn highlight_command(painter: &Painter, rendered: &str, card: Option<&TemplateCard>) -> String {
    let mut line = String::new();
    for segment in placeholder_segments(rendered) {
        match segment {
            Segment::Text(text) => line.push_str(text),
            Segment::Placeholder(token) => line.push_str(&painter.placeholder(token)),
        }
    }
    if let Some(card) = card {
        if !card.params().is_empty() {
            line.push(' ');
            line.push_str(&painter.added(&card.params().joined()));
        }
    }
    line
}

pub fn write_categories(out: &mut dyn Write, painter: &Painter, categories: &[Category]) -> io::Result<()> {
    for category in categories {
        writeln!(
            out,
            "{} {} {}",
            painter.accent(category.icon_kind().glyph()),
            painter.heading(&category.name),
            painter.dim(&format!("({})", category.id))
        )?;
        for sub in &category.subcategories {
            match &sub.info_url {
                Some(url) => writeln!(out, "    {:<24} {}  {}", sub.id, sub.name, painter.dim(url))?,
                None => writeln!(out, "    {:<24} {}", sub.id, sub.name)?,
            }
        }
    }
    Ok(())
}

/// Tag chips, selected ones marked
pub fn write_tag_chips(
    out: &mut dyn Write,
    painter: &Painter,
    tags: &[&str],
    selected: &[String],
) -> io::Result<()> {
    let chips: Vec<String> = tags
        .iter()
        .map(|tag| {
            if selected.iter().any(|s| s == tag) {
                painter.added(&format!("[{}]", tag))
            } else {
                format!(" {} ", tag)
            }
        })
        .collect();
    writeln!(out, "Tags: {}", chips.join(" "))
}

/// Input panel; the wordlist field only shows for web enumeration
pub fn write_inputs(
    out: &mut dyn Write,
    painter: &Painter,
    inputs: &InputValues,
    show_wordlist: bool,
) -> io::Result<()> {
    for placeholder in Placeholder::ALL {
        if placeholder == Placeholder::WordlistPath && !show_wordlist {
            continue;
        }
        let value = inputs.get(placeholder);
        let shown = if value.is_empty() {
            painter.dim("(empty)")
        } else {
            value.to_string()
        };
        writeln!(out, "  {:<14} {}", placeholder.field(), shown)?;
    }
    Ok(())
}

/// Subcategory title, template count and info link
pub fn write_subcategory_heading(
    out: &mut dyn Write,
    painter: &Painter,
    subcategory: &Subcategory,
    count: usize,
) -> io::Result<()> {
    writeln!(out)?;
    match &subcategory.info_url {
        Some(url) => writeln!(
            out,
            "{}  {}",
            painter.heading(&subcategory.name),
            painter.accent(&format!("More info: {}", url))
        )?,
        None => writeln!(out, "{}", painter.heading(&subcategory.name))?,
    }
    writeln!(
        out,
        "{}",
        painter.dim(&format!(
            "{} template{}",
            count,
            if count == 1 { "" } else { "s" }
        ))
    )
}

/// One template card
pub fn write_card(
    out: &mut dyn Write,
    painter: &Painter,
    index: usize,
    template: &Template,
    rendered: &str,
    card: Option<&TemplateCard>,
    copied: bool,
) -> io::Result<()> {
    let marker = if copied {
        format!("  {}", painter.added("Copied!"))
    } else {
        String::new()
    };
    writeln!(
        out,
        "[{}] {}  {}{}",
        index,
        painter.heading(&template.title),
        painter.dim(&template.id),
        marker
    )?;
    writeln!(out, "    {}", painter.dim(&template.description))?;

    let prompt = if template.is_browser { "Browser:" } else { "$" };
    writeln!(out, "    {} {}", painter.accent(prompt), highlight_command(painter, rendered, card))?;

    if !template.tags.is_empty() {
        writeln!(out, "    {}", painter.dim(&template.tags.join(", ")))?;
    }

    if template.has_extra_options() {
        let expanded = card.map(|c| c.panel() == PanelState::Expanded).unwrap_or(false);
        if expanded {
            writeln!(out, "    Extra Parameters:")?;
            for option in &template.extra_options {
                let added = card.map(|c| c.params().contains(&option.param)).unwrap_or(false);
                let (mark, param) = if added {
                    ("x", painter.added(&option.param))
                } else {
                    ("+", painter.accent(&option.param))
                };
                writeln!(
                    out,
                    "      [{}] {} {}",
                    mark,
                    padded(&param, &option.param, 18),
                    painter.dim(&option.description)
                )?;
            }
        } else {
            writeln!(
                out,
                "    {}",
                painter.dim(&format!("+ {} extra option(s)", template.extra_options.len()))
            )?;
        }
    }

    Ok(())
}

pub fn write_nothing_selected(out: &mut dyn Write, painter: &Painter) -> io::Result<()> {
    writeln!(out, "{}", painter.dim("Select a category to view commands."))
}

pub fn write_no_matches(out: &mut dyn Write, painter: &Painter) -> io::Result<()> {
    writeln!(out, "No templates found matching your criteria.")?;
    writeln!(out, "{}", painter.dim("Try adjusting your filters or search query."))
}

/// Heading shown above the cards when a subcategory is selected
pub fn write_selection_heading(
    out: &mut dyn Write,
    painter: &Painter,
    catalog: &Catalog,
    filters: &FilterState,
    count: usize,
) -> io::Result<()> {
    if let Some(subcategory) = filters.current_subcategory(catalog) {
        write_subcategory_heading(out, painter, subcategory, count)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn error_line(painter: &Painter, message: &str) -> String {
    format!("[ERROR] {}", painter.error(message))
}

/// Display an error on stderr
pub fn display_error(painter: &Painter, message: &str) {
    eprintln!("{}", error_line(painter, message));
}
