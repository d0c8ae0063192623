//! Extra-Parameter Accumulator and per-card state
//!
//! Each displayed template owns a `TemplateCard`: whether its options panel
//! is open, which optional flags the user appended, and whether a copy was
//! acknowledged recently. Cards are never shared; dropping one discards its
//! parameters.

use crate::catalog::Template;
use crate::error::ClipboardError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long the "copied" acknowledgment stays up
pub const COPY_ACK_WINDOW: Duration = Duration::from_secs(2);

/// Ordered set of appended flag strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraParameterSet {
    params: Vec<String>,
}

impl ExtraParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless already present. Returns true when the set changed.
    pub fn add(&mut self, param: &str) -> bool {
        if self.contains(param) {
            return false;
        }
        self.params.push(param.to_string());
        true
    }

    /// Remove if present. Returns true when the set changed.
    pub fn remove(&mut self, param: &str) -> bool {
        match self.params.iter().position(|p| p == param) {
            Some(pos) => {
                self.params.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, param: &str) -> bool {
        self.params.iter().any(|p| p == param)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(String::as_str)
    }

    /// Appended flags joined by single spaces
    pub fn joined(&self) -> String {
        self.params.join(" ")
    }

    /// The rendered command with accumulated flags appended in insertion order
    pub fn current_command(&self, rendered: &str) -> String {
        if self.params.is_empty() {
            rendered.to_string()
        } else {
            format!("{} {}", rendered, self.joined())
        }
    }
}

/// Options panel of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
}

impl PanelState {
    pub fn toggled(self) -> Self {
        match self {
            PanelState::Collapsed => PanelState::Expanded,
            PanelState::Expanded => PanelState::Collapsed,
        }
    }
}

/// Destination of the copy action
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Result of a copy; `text` is exactly what the sink received
#[derive(Debug)]
pub struct CopyOutcome {
    pub text: String,
    pub error: Option<ClipboardError>,
}

impl CopyOutcome {
    pub fn is_acknowledged(&self) -> bool {
        self.error.is_none()
    }
}

/// State owned by one displayed template
#[derive(Debug, Clone)]
pub struct TemplateCard {
    template_id: String,
    has_extra_options: bool,
    panel: PanelState,
    params: ExtraParameterSet,
    copied_at: Option<Instant>,
}

impl TemplateCard {
    pub fn new(template: &Template) -> Self {
        Self {
            template_id: template.id.clone(),
            has_extra_options: template.has_extra_options(),
            panel: PanelState::Collapsed,
            params: ExtraParameterSet::new(),
            copied_at: None,
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    /// Open or close the options panel. Cards without extra options have no
    /// panel and stay collapsed.
    pub fn toggle_panel(&mut self) -> PanelState {
        if self.has_extra_options {
            self.panel = self.panel.toggled();
        }
        self.panel
    }

    pub fn params(&self) -> &ExtraParameterSet {
        &self.params
    }

    pub fn add_param(&mut self, param: &str) -> bool {
        let added = self.params.add(param);
        if added {
            debug!(template = %self.template_id, param, "extra parameter added");
        }
        added
    }

    pub fn remove_param(&mut self, param: &str) -> bool {
        let removed = self.params.remove(param);
        if removed {
            debug!(template = %self.template_id, param, "extra parameter removed");
        }
        removed
    }

    /// The option row's +/x button. Returns true when the param is now added.
    pub fn toggle_param(&mut self, param: &str) -> bool {
        if self.params.contains(param) {
            self.remove_param(param);
            false
        } else {
            self.add_param(param);
            true
        }
    }

    pub fn current_command(&self, rendered: &str) -> String {
        self.params.current_command(rendered)
    }

    /// Hand the current command to the clipboard.
    ///
    /// A failed write is logged and leaves the acknowledgment unset; nothing
    /// is retried.
    pub fn copy(
        &mut self,
        rendered: &str,
        sink: &mut dyn ClipboardSink,
        now: Instant,
    ) -> CopyOutcome {
        let text = self.current_command(rendered);
        match sink.write_text(&text) {
            Ok(()) => {
                self.copied_at = Some(now);
                CopyOutcome { text, error: None }
            }
            Err(e) => {
                warn!(template = %self.template_id, "clipboard write failed: {}", e);
                CopyOutcome {
                    text,
                    error: Some(e),
                }
            }
        }
    }

    /// True within `COPY_ACK_WINDOW` of the last successful copy
    pub fn is_copied(&self, now: Instant) -> bool {
        match self.copied_at {
            Some(at) => now.saturating_duration_since(at) < COPY_ACK_WINDOW,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ExtraOption, Template};
    use crate::render::{render, InputValues};

    #[derive(Default)]
    struct RecordingSink {
        written: Vec<String>,
        fail: bool,
    }

    impl ClipboardSink for RecordingSink {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Unavailable("test".to_string()));
            }
            self.written.push(text.to_string());
            Ok(())
        }
    }

    fn nmap() -> Template {
        Template {
            id: "nmap-default".to_string(),
            title: "Nmap".to_string(),
            description: "scan".to_string(),
            template: "nmap {{RHOST}}".to_string(),
            tags: vec!["nmap".to_string()],
            category_id: "network".to_string(),
            subcategory_id: "port-scanning".to_string(),
            extra_options: vec![
                ExtraOption {
                    param: "-v".to_string(),
                    description: "Verbose".to_string(),
                },
                ExtraOption {
                    param: "-A".to_string(),
                    description: "Aggressive".to_string(),
                },
            ],
            is_browser: false,
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = ExtraParameterSet::new();
        assert!(set.add("-v"));
        assert!(set.add("-A"));
        assert!(!set.add("-v"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["-v", "-A"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = ExtraParameterSet::new();
        assert!(!set.remove("-v"));
        set.add("-A");
        assert!(!set.remove("-v"));
        assert_eq!(set.len(), 1);
        assert!(set.remove("-A"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_readd_goes_to_end() {
        let mut set = ExtraParameterSet::new();
        set.add("-v");
        set.add("-A");
        set.remove("-v");
        set.add("-v");
        assert_eq!(set.joined(), "-A -v");
    }

    #[test]
    fn test_current_command() {
        let values = InputValues {
            rhost: "10.0.0.5".to_string(),
            ..Default::default()
        };
        let rendered = render("nmap {{RHOST}}", &values);

        let mut set = ExtraParameterSet::new();
        assert_eq!(set.current_command(&rendered), "nmap 10.0.0.5");

        set.add("-v");
        set.add("-A");
        assert_eq!(set.current_command(&rendered), "nmap 10.0.0.5 -v -A");
    }

    #[test]
    fn test_panel_toggles_only_with_options() {
        let mut card = TemplateCard::new(&nmap());
        assert_eq!(card.panel(), PanelState::Collapsed);
        assert_eq!(card.toggle_panel(), PanelState::Expanded);
        assert_eq!(card.toggle_panel(), PanelState::Collapsed);

        let mut bare = nmap();
        bare.extra_options.clear();
        let mut card = TemplateCard::new(&bare);
        assert_eq!(card.toggle_panel(), PanelState::Collapsed);
    }

    #[test]
    fn test_toggle_param() {
        let mut card = TemplateCard::new(&nmap());
        assert!(card.toggle_param("-v"));
        assert!(!card.toggle_param("-v"));
        assert!(card.params().is_empty());
    }

    #[test]
    fn test_copy_writes_current_command_and_acknowledges() {
        let mut card = TemplateCard::new(&nmap());
        card.add_param("-v");
        let mut sink = RecordingSink::default();
        let start = Instant::now();

        let outcome = card.copy("nmap 10.0.0.5", &mut sink, start);
        assert!(outcome.is_acknowledged());
        assert_eq!(outcome.text, "nmap 10.0.0.5 -v");
        assert_eq!(sink.written, vec!["nmap 10.0.0.5 -v"]);

        assert!(card.is_copied(start + Duration::from_millis(1999)));
        assert!(!card.is_copied(start + COPY_ACK_WINDOW));
    }

    #[test]
    fn test_failed_copy_is_not_acknowledged() {
        let mut card = TemplateCard::new(&nmap());
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let now = Instant::now();

        let outcome = card.copy("nmap {{RHOST}}", &mut sink, now);
        assert!(!outcome.is_acknowledged());
        assert_eq!(outcome.text, "nmap {{RHOST}}");
        assert!(!card.is_copied(now));
    }
}
