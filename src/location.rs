use super::*;

/// Decomposed document URL. `search` keeps its `?` and `hash` its `#`;
/// both are empty when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocationParts {
    pub(crate) scheme: String,
    pub(crate) has_authority: bool,
    pub(crate) hostname: String,
    pub(crate) port: String,
    pub(crate) pathname: String,
    pub(crate) opaque_path: String,
    pub(crate) search: String,
    pub(crate) hash: String,
}

impl LocationParts {
    pub(crate) fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let scheme_end = trimmed.find(':')?;
        let scheme = trimmed[..scheme_end].to_ascii_lowercase();
        if !is_valid_url_scheme(&scheme) {
            return None;
        }

        let rest = &trimmed[scheme_end + 1..];
        if let Some(without_slashes) = rest.strip_prefix("//") {
            let authority_end = without_slashes
                .find(|ch| ['/', '?', '#'].contains(&ch))
                .unwrap_or(without_slashes.len());
            let (hostname, port) = split_hostname_and_port(&without_slashes[..authority_end]);
            let (pathname, search, hash) = split_tail(&without_slashes[authority_end..]);
            Some(Self {
                scheme,
                has_authority: true,
                hostname,
                port,
                pathname: if pathname.is_empty() {
                    "/".to_string()
                } else {
                    pathname
                },
                opaque_path: String::new(),
                search,
                hash,
            })
        } else {
            let (opaque_path, search, hash) = split_tail(rest);
            Some(Self {
                scheme,
                has_authority: false,
                hostname: String::new(),
                port: String::new(),
                pathname: String::new(),
                opaque_path,
                search,
                hash,
            })
        }
    }

    pub(crate) fn about_blank() -> Self {
        Self {
            scheme: "about".to_string(),
            has_authority: false,
            hostname: String::new(),
            port: String::new(),
            pathname: String::new(),
            opaque_path: "blank".to_string(),
            search: String::new(),
            hash: String::new(),
        }
    }

    fn host(&self) -> String {
        if self.port.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}:{}", self.hostname, self.port)
        }
    }

    pub(crate) fn href(&self) -> String {
        if self.has_authority {
            format!(
                "{}://{}{}{}{}",
                self.scheme,
                self.host(),
                self.pathname,
                self.search,
                self.hash
            )
        } else {
            format!(
                "{}:{}{}{}",
                self.scheme, self.opaque_path, self.search, self.hash
            )
        }
    }
}

fn is_valid_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn split_hostname_and_port(authority: &str) -> (String, String) {
    match authority.rsplit_once(':') {
        Some((hostname, port)) if !hostname.contains(':') => {
            (hostname.to_string(), port.to_string())
        }
        _ => (authority.to_string(), String::new()),
    }
}

fn split_tail(tail: &str) -> (String, String, String) {
    let (before_hash, hash) = match tail.find('#') {
        Some(at) => (&tail[..at], &tail[at..]),
        None => (tail, ""),
    };
    let (path, search) = match before_hash.find('?') {
        Some(at) => (&before_hash[..at], &before_hash[at..]),
        None => (before_hash, ""),
    };
    (path.to_string(), search.to_string(), hash.to_string())
}

pub(crate) fn ensure_hash_prefix(value: &str) -> String {
    if value.is_empty() || value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{value}")
    }
}

/// True when `from` and `to` name the same document and differ only in the
/// fragment. Writing the fragment is a same-document navigation; anything
/// else would replace the document.
pub(crate) fn is_hash_only_navigation(from: &str, to: &str) -> bool {
    let Some(from_parts) = LocationParts::parse(from) else {
        return false;
    };
    let Some(to_parts) = LocationParts::parse(to) else {
        return false;
    };
    from_parts.hash != to_parts.hash
        && LocationParts {
            hash: String::new(),
            ..from_parts
        } == LocationParts {
            hash: String::new(),
            ..to_parts
        }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    FragmentSet,
    HistoryBack,
    HistoryForward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub kind: NavigationKind,
    pub from: String,
    pub to: String,
}

/// Session history: one entry per document URL, plus a log of every
/// navigation the page performed.
#[derive(Debug, Clone)]
pub(crate) struct History {
    pub(crate) entries: Vec<String>,
    pub(crate) index: usize,
    pub(crate) navigations: Vec<Navigation>,
}

impl History {
    pub(crate) fn new(initial_url: &str) -> Self {
        Self {
            entries: vec![initial_url.to_string()],
            index: 0,
            navigations: Vec::new(),
        }
    }

    /// Pushes a new entry, discarding any forward entries.
    pub(crate) fn push(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url.to_string());
        self.index = self.entries.len() - 1;
    }

    pub(crate) fn back(&mut self) -> Option<String> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    pub(crate) fn forward(&mut self) -> Option<String> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub(crate) fn record(&mut self, kind: NavigationKind, from: String, to: String) {
        self.navigations.push(Navigation { kind, from, to });
    }
}
