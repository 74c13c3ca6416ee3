//! Deterministic URL-fragment and radio-selection synchronization.
//!
//! A [`Page`] hosts a parsed in-memory DOM, a modeled location with history,
//! and a synchronous event pipeline. Installing a [`SelectionSync`] checks
//! the radio named by the current fragment (falling back to a default), and
//! from then on every radio `change` event rewrites the fragment to the
//! newly selected radio's id.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

mod dom;
mod events;
mod html;
mod location;
mod page;
mod selector;
mod sync;


pub use location::{Navigation, NavigationKind};
pub use page::Page;
pub use sync::{DEFAULT_SELECTION_ID, SelectionSync};

pub(crate) use dom::{Dom, NodeId, NodeType, is_checkbox_input, is_radio_input};
pub(crate) use events::{EventState, Handler, Listener, ListenerStore};
pub(crate) use html::{parse_document, parse_fragment_into};
pub(crate) use location::{History, LocationParts, ensure_hash_prefix, is_hash_only_navigation};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}
