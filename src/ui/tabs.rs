//! Tab buttons and the panels they reveal.

use tracing::debug;

use crate::TARGET_UI;

pub const TAB_ANALYZE_URL: &str = "url-tab";
pub const TAB_ANALYZE_TEXT: &str = "text-tab";
pub const TAB_COMPARE: &str = "compare-tab";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabButton {
    pub key: String,
    pub label: String,
}

/// Keeps exactly one tab button active. The active panel is the one whose
/// id equals the active button's key, if such a panel exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabController {
    buttons: Vec<TabButton>,
    panels: Vec<String>,
    active_button: usize,
    active_panel: Option<usize>,
}

/// A tab button as the page template sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub key: String,
    pub label: String,
    pub active: bool,
}

impl TabController {
    /// Builds a controller with the first button active. Returns `None` when
    /// there are no buttons to activate.
    pub fn new(buttons: Vec<TabButton>, panels: Vec<String>) -> Option<Self> {
        let first = buttons.first()?.key.clone();
        let mut controller = Self {
            buttons,
            panels,
            active_button: 0,
            active_panel: None,
        };
        controller.activate(&first);
        Some(controller)
    }

    /// Activates the button with `key`. Unknown keys leave the state as is.
    pub fn activate(&mut self, key: &str) -> bool {
        let Some(button) = self.buttons.iter().position(|b| b.key == key) else {
            debug!(target: TARGET_UI, "Ignoring unknown tab '{}'", key);
            return false;
        };
        self.active_button = button;
        self.active_panel = self.panels.iter().position(|p| p == key);
        if self.active_panel.is_none() {
            debug!(target: TARGET_UI, "Tab '{}' has no panel", key);
        }
        true
    }

    pub fn active_key(&self) -> &str {
        &self.buttons[self.active_button].key
    }

    pub fn active_panel(&self) -> Option<&str> {
        self.active_panel.map(|i| self.panels[i].as_str())
    }

    pub fn is_panel_active(&self, id: &str) -> bool {
        self.active_panel() == Some(id)
    }

    pub fn buttons(&self) -> Vec<TabView> {
        self.buttons
            .iter()
            .enumerate()
            .map(|(i, button)| TabView {
                key: button.key.clone(),
                label: button.label.clone(),
                active: i == self.active_button,
            })
            .collect()
    }
}

impl Default for TabController {
    fn default() -> Self {
        let tabs = [
            (TAB_ANALYZE_URL, "Analyze URL"),
            (TAB_ANALYZE_TEXT, "Analyze Text"),
            (TAB_COMPARE, "Compare Sources"),
        ];
        Self {
            buttons: tabs
                .iter()
                .map(|(key, label)| TabButton {
                    key: key.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            panels: tabs.iter().map(|(key, _)| key.to_string()).collect(),
            active_button: 0,
            active_panel: Some(0),
        }
    }
}
