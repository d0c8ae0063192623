//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Args, Parser, Subcommand};
use cmdforge_common::{FilterState, InputValues};
use std::path::PathBuf;

/// cmdforge CLI
#[derive(Parser, Debug)]
#[command(name = "cmdforgectl")]
#[command(about = "cmdforge - command template catalog", long_about = None)]
#[command(version = env!("CMDFORGE_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Catalog file to use instead of the built-in one
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand (if not provided, starts the interactive session)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Values substituted into placeholders
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Listener address ({{LHOST}})
    #[arg(long)]
    pub lhost: Option<String>,

    /// Target address ({{RHOST}})
    #[arg(long)]
    pub rhost: Option<String>,

    /// Port ({{PORT}})
    #[arg(long)]
    pub port: Option<String>,

    /// Target URL ({{URL}})
    #[arg(long)]
    pub url: Option<String>,

    /// Wordlist path ({{WORDLIST_PATH}})
    #[arg(long)]
    pub wordlist: Option<String>,
}

impl InputArgs {
    /// Flags given on the command line; absent flags are empty
    pub fn to_values(&self) -> InputValues {
        InputValues {
            lhost: self.lhost.clone().unwrap_or_default(),
            rhost: self.rhost.clone().unwrap_or_default(),
            port: self.port.clone().unwrap_or_default(),
            url: self.url.clone().unwrap_or_default(),
            wordlist_path: self.wordlist.clone().unwrap_or_default(),
        }
    }
}

/// Category, search and tag selection
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Category id
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Subcategory id within the category
    #[arg(long, short = 's')]
    pub subcategory: Option<String>,

    /// Case-insensitive text search
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// Required tag (repeatable, all must match)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
}

impl FilterArgs {
    pub fn to_state(&self) -> FilterState {
        let mut state = FilterState::new();
        if let Some(category) = &self.category {
            state.select_category(category.as_str());
        }
        if let Some(subcategory) = &self.subcategory {
            state.select_subcategory(subcategory.as_str());
        }
        if let Some(query) = &self.search {
            state.set_search(query.as_str());
        }
        for tag in &self.tags {
            if !state.selected_tags.contains(tag) {
                state.toggle_tag(tag);
            }
        }
        state
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List categories and their subcategories
    Categories,

    /// List tags in catalog order
    Tags {
        /// Show at most this many tags (defaults to the configured chip limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Show every tag
        #[arg(long, conflicts_with = "limit")]
        all: bool,
    },

    /// Show templates matching the filters, rendered with the given inputs
    List {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        inputs: InputArgs,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Render one template and print the final command
    Render {
        /// Template id (see `list`)
        template_id: String,

        #[command(flatten)]
        inputs: InputArgs,

        /// Extra parameter to append (repeatable, must be one of the template's options)
        #[arg(long = "extra", short = 'x', allow_hyphen_values = true)]
        extras: Vec<String>,

        /// Also copy the command to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Check a catalog file for duplicate ids and dangling references
    Validate {
        /// Catalog file (defaults to --catalog, the configured catalog, or the built-in one)
        path: Option<PathBuf>,
    },
}
