use super::*;

/// Radio checked as a fallback when the fragment names no radio.
pub const DEFAULT_SELECTION_ID: &str = "response-1";

/// Keeps the URL fragment and the checked radio in agreement: the fragment
/// picks the initial selection, and every radio `change` event afterwards
/// rewrites the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSync {
    default_id: String,
}

impl SelectionSync {
    pub fn new() -> Self {
        Self::with_default(DEFAULT_SELECTION_ID)
    }

    /// Same behavior with a different fallback id.
    pub fn with_default(default_id: impl Into<String>) -> Self {
        Self {
            default_id: default_id.into(),
        }
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }
}

impl Default for SelectionSync {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// Applies the fragment to the page's radios once, then registers a
    /// single delegated `change` listener at the document root. Delegation
    /// means radios inserted later are covered too. Installing twice leaves
    /// one listener; every lookup that misses is a silent no-op.
    pub fn install(&mut self, sync: SelectionSync) {
        self.apply_initial_selection(&sync);
        let added = self.listeners.add(
            self.dom.root,
            "change",
            Listener {
                capture: false,
                handler: Handler::FragmentSync,
            },
        );
        if !added {
            self.trace_line("[sync] change listener already installed".to_string());
        }
    }

    fn apply_initial_selection(&mut self, sync: &SelectionSync) {
        let candidate = self.fragment();

        if let Some(target) = self.dom.by_id(&candidate) {
            if is_radio_input(&self.dom, target) {
                self.dom.check_radio(target);
                let label = self.event_node_label(target);
                self.trace_line(format!("[sync] init fragment={candidate} selected={label}"));
                return;
            }
        }

        let Some(fallback) = self.dom.by_id(sync.default_id()) else {
            self.trace_line(format!("[sync] init fragment={candidate} selected=none"));
            return;
        };
        // The fallback is marked checked whatever its type, mirroring a bare
        // `checked = true` property assignment; group exclusivity only
        // applies when it really is a radio.
        if is_radio_input(&self.dom, fallback) {
            self.dom.check_radio(fallback);
        } else {
            self.dom.set_checked_flag(fallback, true);
        }
        let label = self.event_node_label(fallback);
        self.trace_line(format!(
            "[sync] init fragment={candidate} selected={label} (default)"
        ));
    }

    /// The delegated change handler: a change whose originating target is a
    /// radio writes that radio's id into the fragment; everything else is
    /// ignored. A radio without an id clears the fragment, as assigning an
    /// empty string to `location.hash` does.
    pub(crate) fn run_fragment_sync(&mut self, event: &EventState) -> Result<()> {
        if event.event_type != "change" {
            return Ok(());
        }
        if !is_radio_input(&self.dom, event.target) {
            return Ok(());
        }

        let id = self.dom.attr(event.target, "id").unwrap_or_default();
        if self.trace {
            let label = self.event_node_label(event.target);
            self.trace_line(format!("[sync] change target={label} fragment={id}"));
        }
        self.navigate_fragment(&id)
    }
}
