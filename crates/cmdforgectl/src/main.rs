//! cmdforgectl - browse, fill in and copy command templates

use anyhow::{Context, Result};
use clap::Parser;
use cmdforge_common::{ClipboardSink, Config};
use std::io::{self, IsTerminal};
use tracing::debug;

use cmdforgectl::cli::{Cli, Commands};
use cmdforgectl::clipboard::SystemClipboard;
use cmdforgectl::commands;
use cmdforgectl::errors::exit_code;
use cmdforgectl::logging;
use cmdforgectl::output::{display_error, Painter};
use cmdforgectl::repl;
use cmdforgectl::session::Session;

fn main() {
    let cli = Cli::parse();
    logging::init();

    let no_color = cli.no_color;

    if let Err(e) = run(cli) {
        let color = !no_color
            && io::stderr().is_terminal()
            && Config::load().map(|c| c.ui.color).unwrap_or(true);
        display_error(&Painter::new(color), &format!("{:#}", e));
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    let painter = Painter::new(config.ui.color && !cli.no_color && io::stdout().is_terminal());
    let catalog_path = cli.catalog.or_else(|| config.catalog_path.clone());
    debug!(catalog = ?catalog_path, "starting");

    let mut stdout = io::stdout();

    // validate reports on a catalog without making it the active one
    if let Some(Commands::Validate { path }) = &cli.command {
        let path = path.as_deref().or(catalog_path.as_deref());
        return commands::validate(&mut stdout, &painter, path);
    }

    let catalog = commands::load_catalog(catalog_path.as_deref())?;

    match cli.command {
        Some(Commands::Categories) => commands::categories(&mut stdout, &painter, catalog),
        Some(Commands::Tags { limit, all }) => {
            let limit = if all {
                None
            } else {
                Some(limit.unwrap_or(config.ui.tag_chip_limit))
            };
            commands::tags(&mut stdout, catalog, limit)
        }
        Some(Commands::List {
            filters,
            inputs,
            json,
        }) => {
            let inputs = config.inputs.clone().overlay(&inputs.to_values());
            commands::list(&mut stdout, &painter, catalog, &filters.to_state(), &inputs, json)
        }
        Some(Commands::Render {
            template_id,
            inputs,
            extras,
            copy,
        }) => {
            let inputs = config.inputs.clone().overlay(&inputs.to_values());
            let mut clipboard = SystemClipboard::new();
            let sink = if copy {
                Some(&mut clipboard as &mut dyn ClipboardSink)
            } else {
                None
            };
            commands::render(
                &mut stdout,
                &mut io::stderr(),
                &painter,
                catalog,
                &template_id,
                &inputs,
                &extras,
                sink,
            )
        }
        Some(Commands::Validate { .. }) => Ok(()),
        None => {
            let mut session = Session::new(catalog, config.inputs.clone());
            repl::run(
                &mut session,
                &painter,
                &mut SystemClipboard::new(),
                config.ui.tag_chip_limit,
            )
        }
    }
}
