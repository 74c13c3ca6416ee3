use super::*;

pub(crate) const DEFAULT_PAGE_URL: &str = "https://survey.local/";

const ACTION_STACK_BYTES: usize = 32 * 1024 * 1024;

/// A loaded document plus its location and history. Construction parses the
/// HTML; a constructed page corresponds to a document whose structure is
/// fully available, so installing a synchronizer on it runs the one-shot
/// load behavior immediately.
#[derive(Debug, Clone)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) document_url: String,
    pub(crate) history: History,
    pub(crate) trace: bool,
    pub(crate) trace_logs: Vec<String>,
    pub(crate) trace_log_limit: usize,
    pub(crate) trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_url(DEFAULT_PAGE_URL, html)
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        let dom = parse_document(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            document_url: url.to_string(),
            history: History::new(url),
            trace: false,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        })
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Current fragment identifier with the leading `#` stripped. Empty when
    /// the URL carries no fragment.
    pub fn fragment(&self) -> String {
        let hash = self.current_location_parts().hash;
        hash.strip_prefix('#').unwrap_or(&hash).to_string()
    }

    pub fn set_fragment(&mut self, fragment: &str) -> Result<()> {
        self.navigate_fragment(fragment)
    }

    pub(crate) fn current_location_parts(&self) -> LocationParts {
        LocationParts::parse(&self.document_url).unwrap_or_else(LocationParts::about_blank)
    }

    /// Rewrites the fragment, as assigning `location.hash` does: no-op when
    /// the resulting URL is unchanged, otherwise a new history entry and a
    /// `hashchange` event at the document root.
    pub(crate) fn navigate_fragment(&mut self, fragment: &str) -> Result<()> {
        let from = self.document_url.clone();
        let mut next = self.current_location_parts();
        next.hash = ensure_hash_prefix(fragment);
        let to = next.href();
        if to == from {
            self.trace_line(format!("[nav] fragment unchanged url={to}"));
            return Ok(());
        }

        self.document_url = to.clone();
        self.history.push(&to);
        self.history
            .record(NavigationKind::FragmentSet, from.clone(), to.clone());
        self.trace_line(format!("[nav] fragment from={from} to={to}"));
        if is_hash_only_navigation(&from, &to) {
            self.dispatch_event(self.dom.root, "hashchange")?;
        }
        Ok(())
    }

    /// Steps back one history entry. Returns false when there is none.
    pub fn back(&mut self) -> Result<bool> {
        let from = self.document_url.clone();
        let Some(to) = self.history.back() else {
            return Ok(false);
        };
        self.finish_history_traversal(NavigationKind::HistoryBack, from, to)?;
        Ok(true)
    }

    /// Steps forward one history entry. Returns false when there is none.
    pub fn forward(&mut self) -> Result<bool> {
        let from = self.document_url.clone();
        let Some(to) = self.history.forward() else {
            return Ok(false);
        };
        self.finish_history_traversal(NavigationKind::HistoryForward, from, to)?;
        Ok(true)
    }

    fn finish_history_traversal(
        &mut self,
        kind: NavigationKind,
        from: String,
        to: String,
    ) -> Result<()> {
        self.document_url = to.clone();
        self.history.record(kind, from.clone(), to.clone());
        self.trace_line(format!("[nav] history from={from} to={to}"));
        if is_hash_only_navigation(&from, &to) {
            self.dispatch_event(self.dom.root, "hashchange")?;
        }
        Ok(())
    }

    pub fn history_length(&self) -> usize {
        self.history.entries.len()
    }

    /// Every navigation the page performed, oldest first.
    pub fn navigations(&self) -> &[Navigation] {
        &self.history.navigations
    }

    /// Clicks an element. Radios and checkboxes activate the way a browser
    /// activates them: state flips first, then `input` and `change` fire.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        stacker::grow(ACTION_STACK_BYTES, || {
            self.dispatch_event(target, "click")?;

            if is_checkbox_input(&self.dom, target) {
                let next = !self.dom.checked(target);
                self.dom.set_checked_flag(target, next);
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }

            if is_radio_input(&self.dom, target) && !self.dom.checked(target) {
                self.dom.check_radio(target);
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }

            Ok(())
        })
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: tag,
            });
        }

        let kind = self
            .dom
            .attr(target, "type")
            .unwrap_or_else(|| "text".into())
            .to_ascii_lowercase();
        if kind != "checkbox" && kind != "radio" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: format!("input[type={kind}]"),
            });
        }

        stacker::grow(ACTION_STACK_BYTES, || {
            if self.dom.checked(target) != checked {
                if kind == "radio" && checked {
                    self.dom.check_radio(target);
                } else {
                    self.dom.set_checked_flag(target, checked);
                }
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }
            Ok(())
        })
    }

    /// Dispatches an arbitrary event at the selected element.
    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(ACTION_STACK_BYTES, || self.dispatch_event(target, event))
    }

    /// Replaces an element's children with a parsed HTML fragment. Radios
    /// inserted this way take part in fragment synchronization without any
    /// further wiring; the change listener lives at the document root.
    pub fn set_inner_html(&mut self, selector: &str, html: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(ACTION_STACK_BYTES, || {
            self.dom.clear_children(target);
            parse_fragment_into(&mut self.dom, target, html)
        })
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_fragment(&self, expected: &str) -> Result<()> {
        let actual = self.fragment();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: "location.hash".to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.document_url.clone(),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) {
        self.trace_log_limit = max_entries.max(1);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if !self.trace {
            return;
        }
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }

    /// Synchronous capture -> target -> bubble dispatch over the ancestor
    /// path. Listeners run to completion before the call returns.
    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<()> {
        let mut event = EventState::new(event_type, target);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        if path.len() >= 2 {
            for node in &path[..path.len() - 1] {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, true)?;
            }
        }

        event.current_target = target;
        self.invoke_listeners(target, &mut event, true)?;
        self.invoke_listeners(target, &mut event, false)?;

        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().rev() {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, false)?;
            }
        }

        if self.trace {
            let label = self.event_node_label(target);
            self.trace_line(format!("[event] done {event_type} target={label}"));
        }
        Ok(())
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        for listener in self.listeners.get(node_id, &event.event_type, capture) {
            if self.trace {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.event_node_label(event.target);
                let current_label = self.event_node_label(event.current_target);
                self.trace_line(format!(
                    "[event] {} target={} current={} phase={}",
                    event.event_type, target_label, current_label, phase
                ));
            }
            self.execute_handler(&listener.handler, event)?;
        }
        Ok(())
    }

    fn execute_handler(&mut self, handler: &Handler, event: &EventState) -> Result<()> {
        match handler {
            Handler::FragmentSync => self.run_fragment_sync(event),
        }
    }

    pub(crate) fn event_node_label(&self, node_id: NodeId) -> String {
        match self.dom.element(node_id) {
            Some(element) => match element.attrs.get("id") {
                Some(id) => format!("{}#{}", element.tag_name, id),
                None => element.tag_name.clone(),
            },
            None => match self.dom.nodes[node_id.0].node_type {
                NodeType::Document => "document".to_string(),
                _ => "#text".to_string(),
            },
        }
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
