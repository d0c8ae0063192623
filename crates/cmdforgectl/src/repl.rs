//! REPL - interactive browsing session
//!
//! Line-oriented stand-in for the sidebar/search/card UI: pick categories,
//! search, toggle tags, fill inputs, open a card's extra options and copy
//! the final command.

use anyhow::Result;
use cmdforge_common::{render, ClipboardSink, Placeholder, Template, Visible};
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing::debug;

use crate::output::{self, Painter, THIN_SEPARATOR};
use crate::session::Session;

const HELP: &str = "\
Commands:
  categories            list categories and subcategories
  cat <id>              select a category
  sub <id>              select a subcategory of the current category
  search [text]         search titles, descriptions, commands and tags (no text clears)
  tag <tag>             toggle a tag filter
  tags                  show tag chips
  clear                 clear tag filters
  home                  reset all filters
  set <field> [value]   set lhost, rhost, port, url or wordlist (no value clears)
  reset                 clear every input value
  inputs                show input values
  show                  redraw the current view
  extras <n>            open/close extra options of card n
  add <n> <param>       append an extra option to card n (param or option number)
  rm <n> <param>        remove an extra option from card n
  copy <n>              copy card n's command to the clipboard
  help                  this text
  quit                  leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Categories,
    Category(String),
    Subcategory(String),
    Search(String),
    Tag(String),
    Tags,
    ClearTags,
    Home,
    Set(Placeholder, String),
    ResetInputs,
    Inputs,
    Show,
    Extras(usize),
    Add(usize, String),
    Remove(usize, String),
    Copy(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn card_number(arg: Option<&str>) -> Result<usize, String> {
    let arg = arg.ok_or("missing card number")?;
    arg.parse::<usize>()
        .map_err(|_| format!("'{}' is not a card number", arg))
}

fn required(arg: &str, what: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("missing {}", what))
    } else {
        Ok(arg.to_string())
    }
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "categories" => ReplCommand::Categories,
        "cat" | "category" => ReplCommand::Category(required(rest, "category id")?),
        "sub" | "subcategory" => ReplCommand::Subcategory(required(rest, "subcategory id")?),
        "search" | "/" => ReplCommand::Search(rest.to_string()),
        "tag" => ReplCommand::Tag(required(rest, "tag")?),
        "tags" => ReplCommand::Tags,
        "clear" => ReplCommand::ClearTags,
        "home" => ReplCommand::Home,
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            let placeholder = Placeholder::from_field(&required(field, "field")?)
                .ok_or_else(|| format!("unknown field '{}'", field))?;
            ReplCommand::Set(placeholder, value.to_string())
        }
        "reset" => ReplCommand::ResetInputs,
        "inputs" => ReplCommand::Inputs,
        "show" | "ls" => ReplCommand::Show,
        "extras" => ReplCommand::Extras(card_number(Some(rest).filter(|r| !r.is_empty()))?),
        "add" | "rm" => {
            let (number, param) = match rest.split_once(char::is_whitespace) {
                Some((number, param)) => (number, param.trim()),
                None => (rest, ""),
            };
            let number = card_number(Some(number).filter(|n| !n.is_empty()))?;
            let param = required(param, "parameter")?;
            if word == "add" {
                ReplCommand::Add(number, param)
            } else {
                ReplCommand::Remove(number, param)
            }
        }
        "copy" => ReplCommand::Copy(card_number(Some(rest).filter(|r| !r.is_empty()))?),
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };

    Ok(Some(command))
}

/// Redraw inputs, tag chips and the visible cards
pub fn write_view(
    out: &mut dyn Write,
    session: &Session<'_>,
    painter: &Painter,
    chip_limit: usize,
) -> io::Result<()> {
    let catalog = session.catalog();

    writeln!(out, "{}", painter.dim(THIN_SEPARATOR))?;
    output::write_inputs(out, painter, session.inputs(), session.shows_wordlist_path())?;
    write_chips(out, session, painter, chip_limit)?;

    match session.visible() {
        Visible::NothingSelected => output::write_nothing_selected(out, painter)?,
        Visible::NoMatches => output::write_no_matches(out, painter)?,
        Visible::Templates(templates) => {
            output::write_selection_heading(out, painter, catalog, session.filters(), templates.len())?;
            let now = Instant::now();
            for (index, (template, card)) in session.cards().iter().enumerate() {
                let rendered = session.rendered(template);
                output::write_card(
                    out,
                    painter,
                    index + 1,
                    template,
                    &rendered,
                    Some(card),
                    card.is_copied(now),
                )?;
            }
        }
    }
    Ok(())
}

fn write_chips(
    out: &mut dyn Write,
    session: &Session<'_>,
    painter: &Painter,
    chip_limit: usize,
) -> io::Result<()> {
    let tags = session.catalog().all_tags();
    let shown = &tags[..tags.len().min(chip_limit)];
    output::write_tag_chips(out, painter, shown, &session.filters().selected_tags)
}

/// Resolve "2" to the second extra option, anything else is taken verbatim
fn resolve_param(template: &Template, param: &str) -> String {
    if let Ok(n) = param.parse::<usize>() {
        if let Some(option) = n.checked_sub(1).and_then(|i| template.extra_options.get(i)) {
            return option.param.clone();
        }
    }
    param.to_string()
}

pub fn execute(
    command: ReplCommand,
    session: &mut Session<'_>,
    painter: &Painter,
    sink: &mut dyn ClipboardSink,
    out: &mut dyn Write,
    chip_limit: usize,
) -> io::Result<Flow> {
    debug!(?command, "repl command");
    let catalog = session.catalog();

    match command {
        ReplCommand::Categories => output::write_categories(out, painter, catalog.categories())?,
        ReplCommand::Category(id) => {
            if catalog.category(&id).is_none() {
                writeln!(out, "{}", painter.warn(&format!("No category '{}'", id)))?;
                return Ok(Flow::Continue);
            }
            session.update_filters(|f| f.select_category(id));
            write_view(out, session, painter, chip_limit)?;
        }
        ReplCommand::Subcategory(id) => {
            let known = match session.filters().category_id.as_deref() {
                Some(category) => catalog.subcategory(category, &id).is_some(),
                None => false,
            };
            if !known {
                writeln!(
                    out,
                    "{}",
                    painter.warn(&format!("No subcategory '{}' in the selected category", id))
                )?;
                return Ok(Flow::Continue);
            }
            session.update_filters(|f| f.select_subcategory(id));
            write_view(out, session, painter, chip_limit)?;
        }
        ReplCommand::Search(query) => {
            session.update_filters(|f| f.set_search(query));
            write_view(out, session, painter, chip_limit)?;
        }
        ReplCommand::Tag(tag) => {
            session.update_filters(|f| {
                f.toggle_tag(&tag);
            });
            write_view(out, session, painter, chip_limit)?;
        }
        ReplCommand::Tags => write_chips(out, session, painter, chip_limit)?,
        ReplCommand::ClearTags => {
            session.update_filters(|f| f.clear_tags());
            write_view(out, session, painter, chip_limit)?;
        }
        ReplCommand::Home => {
            session.update_filters(|f| f.reset());
            write_view(out, session, painter, chip_limit)?;
        }
        ReplCommand::Set(placeholder, value) => {
            session.inputs_mut().set(placeholder, value);
            write_view(out, session, painter, chip_limit)?;
        }
        ReplCommand::ResetInputs => {
            session.inputs_mut().clear();
            write_view(out, session, painter, chip_limit)?;
            writeln!(out, "{}", painter.added("Inputs cleared"))?;
        }
        ReplCommand::Inputs => {
            output::write_inputs(out, painter, session.inputs(), session.shows_wordlist_path())?
        }
        ReplCommand::Show => write_view(out, session, painter, chip_limit)?,
        ReplCommand::Extras(number) => {
            let toggled = match session.card_mut(number) {
                Some((template, card)) if template.has_extra_options() => {
                    card.toggle_panel();
                    true
                }
                Some(_) => {
                    writeln!(out, "{}", painter.dim("No extra options for this template"))?;
                    false
                }
                None => {
                    write_no_card(out, painter, number)?;
                    false
                }
            };
            if toggled {
                write_view(out, session, painter, chip_limit)?;
            }
        }
        ReplCommand::Add(number, param) => {
            let added = match session.card_mut(number) {
                Some((template, card)) => {
                    let param = resolve_param(template, &param);
                    if template.extra_option(&param).is_some() {
                        card.add_param(&param);
                        true
                    } else {
                        let available: Vec<&str> =
                            template.extra_options.iter().map(|o| o.param.as_str()).collect();
                        writeln!(
                            out,
                            "{}",
                            painter.warn(&format!(
                                "'{}' is not an extra option of {} (available: {})",
                                param,
                                template.id,
                                available.join(" | ")
                            ))
                        )?;
                        false
                    }
                }
                None => {
                    write_no_card(out, painter, number)?;
                    false
                }
            };
            if added {
                write_view(out, session, painter, chip_limit)?;
            }
        }
        ReplCommand::Remove(number, param) => {
            let found = match session.card_mut(number) {
                Some((template, card)) => {
                    let param = resolve_param(template, &param);
                    card.remove_param(&param);
                    true
                }
                None => {
                    write_no_card(out, painter, number)?;
                    false
                }
            };
            if found {
                write_view(out, session, painter, chip_limit)?;
            }
        }
        ReplCommand::Copy(number) => {
            let inputs = session.inputs().clone();
            match session.card_mut(number) {
                Some((template, card)) => {
                    let rendered = render(&template.template, &inputs);
                    let outcome = card.copy(&rendered, sink, Instant::now());
                    writeln!(out, "{}", outcome.text)?;
                    if outcome.is_acknowledged() {
                        writeln!(out, "{}", painter.added("Copied!"))?;
                    } else {
                        writeln!(
                            out,
                            "{}",
                            painter.warn("Clipboard unavailable, copy the command above by hand")
                        )?;
                    }
                }
                None => write_no_card(out, painter, number)?,
            }
        }
        ReplCommand::Help => writeln!(out, "{}", HELP)?,
        ReplCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

fn write_no_card(out: &mut dyn Write, painter: &Painter, number: usize) -> io::Result<()> {
    writeln!(out, "{}", painter.warn(&format!("No card {} on screen", number)))
}

/// Run the session on stdin/stdout until `quit` or end of input
pub fn run(
    session: &mut Session<'_>,
    painter: &Painter,
    sink: &mut dyn ClipboardSink,
    chip_limit: usize,
) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout();

    writeln!(out, "{}", painter.heading(&format!("cmdforge {}", env!("CMDFORGE_VERSION"))))?;
    writeln!(out, "{}", painter.dim("Type 'help' for commands, 'quit' to leave."))?;
    write_view(&mut out, session, painter, chip_limit)?;

    let mut line = String::new();
    loop {
        write!(out, "{} ", painter.accent("cmdforge>"))?;
        out.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => {
                if execute(command, session, painter, sink, &mut out, chip_limit)? == Flow::Quit {
                    break;
                }
            }
            Err(message) => writeln!(out, "{}", painter.warn(&message))?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdforge_common::{Catalog, ClipboardError, InputValues};

    #[derive(Default)]
    struct FakeSink {
        copied: Vec<String>,
        broken: bool,
    }

    impl ClipboardSink for FakeSink {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.broken {
                return Err(ClipboardError::Unavailable("fake".to_string()));
            }
            self.copied.push(text.to_string());
            Ok(())
        }
    }

    fn run_line(session: &mut Session<'_>, sink: &mut FakeSink, line: &str) -> (Flow, String) {
        let command = parse_command(line).unwrap().unwrap();
        let mut out = Vec::new();
        let flow = execute(command, session, &Painter::plain(), sink, &mut out, 12).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("cat network"),
            Ok(Some(ReplCommand::Category("network".to_string())))
        );
        assert_eq!(parse_command("search"), Ok(Some(ReplCommand::Search(String::new()))));
        assert_eq!(
            parse_command("set rhost 10.0.0.5"),
            Ok(Some(ReplCommand::Set(Placeholder::Rhost, "10.0.0.5".to_string())))
        );
        assert_eq!(
            parse_command("add 2 -sV -sC"),
            Ok(Some(ReplCommand::Add(2, "-sV -sC".to_string())))
        );
        assert_eq!(parse_command("q"), Ok(Some(ReplCommand::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("cat").is_err());
        assert!(parse_command("copy x").is_err());
        assert!(parse_command("set colour red").is_err());
        assert!(parse_command("launch").is_err());
    }

    #[test]
    fn test_session_flow() {
        let catalog = Catalog::builtin().unwrap();
        let mut session = Session::new(&catalog, InputValues::default());
        let mut sink = FakeSink::default();

        let (_, text) = run_line(&mut session, &mut sink, "show");
        assert!(text.contains("Select a category to view commands."));

        run_line(&mut session, &mut sink, "cat network");
        run_line(&mut session, &mut sink, "set rhost 10.0.0.5");
        let (_, text) = run_line(&mut session, &mut sink, "extras 1");
        assert!(text.contains("Extra Parameters:"));

        // Option numbers resolve to the option's param
        run_line(&mut session, &mut sink, "add 1 1");
        run_line(&mut session, &mut sink, "add 1 -A");
        run_line(&mut session, &mut sink, "add 1 -v");

        let (_, text) = run_line(&mut session, &mut sink, "copy 1");
        assert!(text.contains("nmap -sC -sV 10.0.0.5 -v -A"));
        assert!(text.contains("Copied!"));
        assert_eq!(sink.copied, vec!["nmap -sC -sV 10.0.0.5 -v -A".to_string()]);
    }

    #[test]
    fn test_add_rejects_unknown_option() {
        let catalog = Catalog::builtin().unwrap();
        let mut session = Session::new(&catalog, InputValues::default());
        let mut sink = FakeSink::default();

        run_line(&mut session, &mut sink, "cat network");
        let (_, text) = run_line(&mut session, &mut sink, "add 1 --script=evil");
        assert!(text.contains("is not an extra option"));
        assert!(session.cards()[0].1.params().is_empty());
    }

    #[test]
    fn test_failed_copy_still_shows_command() {
        let catalog = Catalog::builtin().unwrap();
        let mut session = Session::new(&catalog, InputValues::default());
        let mut sink = FakeSink {
            broken: true,
            ..Default::default()
        };

        run_line(&mut session, &mut sink, "cat network");
        let (flow, text) = run_line(&mut session, &mut sink, "copy 1");
        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("nmap -sC -sV {{RHOST}}"));
        assert!(!text.contains("Copied!"));
        assert!(!session.cards()[0].1.is_copied(Instant::now()));
    }

    #[test]
    fn test_reset_clears_inputs() {
        let catalog = Catalog::builtin().unwrap();
        let mut session = Session::new(&catalog, InputValues::default());
        let mut sink = FakeSink::default();

        run_line(&mut session, &mut sink, "cat reverse-shells");
        run_line(&mut session, &mut sink, "set lhost 10.10.14.2");
        run_line(&mut session, &mut sink, "set port 9001");
        let (_, text) = run_line(&mut session, &mut sink, "reset");

        assert!(session.inputs().is_empty());
        assert!(text.contains("Inputs cleared"));
        assert!(text.contains("nc -lvnp {{PORT}}"));
        assert_eq!(parse_command("reset"), Ok(Some(ReplCommand::ResetInputs)));
    }

    #[test]
    fn test_missing_card_and_quit() {
        let catalog = Catalog::builtin().unwrap();
        let mut session = Session::new(&catalog, InputValues::default());
        let mut sink = FakeSink::default();

        let (_, text) = run_line(&mut session, &mut sink, "copy 3");
        assert!(text.contains("No card 3"));
        let (flow, _) = run_line(&mut session, &mut sink, "quit");
        assert_eq!(flow, Flow::Quit);
    }
}
