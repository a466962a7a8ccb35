//! The page view-model: visibility of each panel, the rendered results,
//! pending alerts and request bookkeeping.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::tabs::TabController;
use super::views::{AnalysisView, ComparisonView};
use crate::TARGET_UI;

/// A group of loading indicator and results panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Analyze,
    Compare,
}

impl Context {
    pub fn as_str(self) -> &'static str {
        match self {
            Context::Analyze => "analyze",
            Context::Compare => "compare",
        }
    }

    pub fn loading_id(self) -> String {
        format!("{}-loading", self.as_str())
    }

    pub fn results_id(self) -> String {
        format!("{}-results", self.as_str())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analyze" => Ok(Context::Analyze),
            "compare" => Ok(Context::Compare),
            other => Err(format!("unknown context: {}", other)),
        }
    }
}

/// Identifies one request issued for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub context: Context,
    pub seq: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Panel {
    loading: bool,
    results: bool,
    /// Sequence number of the newest request issued.
    issued: u64,
    /// Sequence number of the newest request whose outcome was applied.
    settled: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub tabs: TabController,
    pub analysis: Option<AnalysisView>,
    pub comparison: Option<ComparisonView>,
    alerts: Vec<String>,
    analyze: Panel,
    compare: Panel,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tabs: TabController::default(),
            analysis: None,
            comparison: None,
            alerts: Vec::new(),
            analyze: Panel::default(),
            compare: Panel::default(),
        }
    }
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    fn panel(&self, context: Context) -> &Panel {
        match context {
            Context::Analyze => &self.analyze,
            Context::Compare => &self.compare,
        }
    }

    fn panel_mut(&mut self, context: Context) -> &mut Panel {
        match context {
            Context::Analyze => &mut self.analyze,
            Context::Compare => &mut self.compare,
        }
    }

    pub fn show_loading(&mut self, context: Context) {
        self.panel_mut(context).loading = true;
    }

    pub fn hide_loading(&mut self, context: Context) {
        self.panel_mut(context).loading = false;
    }

    pub fn show_results(&mut self, context: Context) {
        self.panel_mut(context).results = true;
    }

    pub fn hide_results(&mut self, context: Context) {
        self.panel_mut(context).results = false;
    }

    pub fn is_loading(&self, context: Context) -> bool {
        self.panel(context).loading
    }

    pub fn results_visible(&self, context: Context) -> bool {
        self.panel(context).results
    }

    /// Starts a request: shows the loading indicator, optionally hides the
    /// previous results, and hands out the next sequence number.
    pub fn begin(&mut self, context: Context, hide_results: bool) -> Ticket {
        let panel = self.panel_mut(context);
        panel.issued += 1;
        panel.loading = true;
        if hide_results {
            panel.results = false;
        }
        let ticket = Ticket {
            context,
            seq: panel.issued,
        };
        debug!(target: TARGET_UI, "Issued {} request #{}", context, ticket.seq);
        ticket
    }

    /// Claims the right to apply a response. Returns `false` when a newer
    /// response for the same context has already been applied.
    pub fn settle(&mut self, ticket: &Ticket) -> bool {
        let panel = self.panel_mut(ticket.context);
        if ticket.seq <= panel.settled {
            debug!(
                target: TARGET_UI,
                "Discarding stale {} response #{} (already showing #{})",
                ticket.context,
                ticket.seq,
                panel.settled
            );
            return false;
        }
        panel.settled = ticket.seq;
        true
    }

    /// Ends a request. The loading indicator stays up while a newer request
    /// for the context is still outstanding.
    pub fn finish(&mut self, ticket: &Ticket) {
        let panel = self.panel_mut(ticket.context);
        if ticket.seq >= panel.issued {
            panel.loading = false;
        }
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}
