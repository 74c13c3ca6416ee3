use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PseudoClass {
    Checked,
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrCondition>,
    pub(crate) pseudo_classes: Vec<PseudoClass>,
}

impl SelectorStep {
    fn id_only(&self) -> Option<&str> {
        if !self.universal
            && self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

/// One compound selector plus its relation to the part on its left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    pub(crate) combinator: Option<Combinator>,
}

pub(crate) fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(trimmed, selector)? {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending = Some(Combinator::Child);
            continue;
        }

        let step = parse_step(&token, selector)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }

    if pending.is_some() || parts.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(parts)
}

fn tokenize(trimmed: &str, original: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for ch in trimmed.chars() {
        if let Some(active) = quote {
            current.push(ch);
            if ch == active {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' if in_brackets => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                if in_brackets {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                in_brackets = true;
                current.push(ch);
            }
            ']' => {
                if !in_brackets {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                in_brackets = false;
                current.push(ch);
            }
            '>' if !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(">".to_string());
            }
            _ if ch.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if in_brackets || quote.is_some() {
        return Err(Error::UnsupportedSelector(original.into()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_step(token: &str, original: &str) -> Result<SelectorStep> {
    let mut step = SelectorStep::default();
    let chars: Vec<char> = token.chars().collect();
    let mut i = 0;

    if chars.first() == Some(&'*') {
        step.universal = true;
        i += 1;
    } else if chars.first().map(|ch| is_ident_char(*ch)).unwrap_or(false) {
        let name = read_ident(&chars, &mut i);
        step.tag = Some(name.to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let name = read_ident(&chars, &mut i);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                step.id = Some(name);
            }
            '.' => {
                i += 1;
                let name = read_ident(&chars, &mut i);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                step.classes.push(name);
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|ch| *ch == ']')
                    .ok_or_else(|| Error::UnsupportedSelector(original.to_string()))?;
                let body: String = chars[i + 1..i + close].iter().collect();
                step.attrs.push(parse_attr_condition(&body, original)?);
                i += close + 1;
            }
            ':' => {
                i += 1;
                let name = read_ident(&chars, &mut i);
                let pseudo = match name.as_str() {
                    "checked" => PseudoClass::Checked,
                    "disabled" => PseudoClass::Disabled,
                    _ => return Err(Error::UnsupportedSelector(original.into())),
                };
                step.pseudo_classes.push(pseudo);
            }
            _ => return Err(Error::UnsupportedSelector(original.into())),
        }
    }

    if !step.universal
        && step.tag.is_none()
        && step.id.is_none()
        && step.classes.is_empty()
        && step.attrs.is_empty()
        && step.pseudo_classes.is_empty()
    {
        return Err(Error::UnsupportedSelector(original.into()));
    }
    Ok(step)
}

fn parse_attr_condition(body: &str, original: &str) -> Result<AttrCondition> {
    let body = body.trim();
    match body.split_once('=') {
        None => {
            if body.is_empty() || !body.chars().all(is_ident_char) {
                return Err(Error::UnsupportedSelector(original.into()));
            }
            Ok(AttrCondition::Exists {
                key: body.to_ascii_lowercase(),
            })
        }
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() || !key.chars().all(is_ident_char) {
                return Err(Error::UnsupportedSelector(original.into()));
            }
            Ok(AttrCondition::Eq {
                key: key.to_ascii_lowercase(),
                value: unquote(value.trim()).to_string(),
            })
        }
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')
}

fn read_ident(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && is_ident_char(chars[*i]) {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

impl Dom {
    /// First element in tree order matching the selector chain, or `None`.
    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let parts = parse_selector_chain(selector)?;
        if parts.len() == 1 {
            if let Some(id) = parts[0].step.id_only() {
                return Ok(self.by_id(id));
            }
        }

        for node in self.all_element_nodes() {
            if self.matches_chain(node, &parts) {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    fn matches_chain(&self, node: NodeId, parts: &[SelectorPart]) -> bool {
        self.matches_from(node, parts, parts.len() - 1)
    }

    fn matches_from(&self, node: NodeId, parts: &[SelectorPart], idx: usize) -> bool {
        if !self.matches_step(node, &parts[idx].step) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match parts[idx].combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => self
                .parent(node)
                .map(|parent| self.matches_from(parent, parts, idx - 1))
                .unwrap_or(false),
            Combinator::Descendant => {
                let mut ancestor = self.parent(node);
                while let Some(candidate) = ancestor {
                    if self.matches_from(candidate, parts, idx - 1) {
                        return true;
                    }
                    ancestor = self.parent(candidate);
                }
                false
            }
        }
    }

    fn matches_step(&self, node: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }
        for class in &step.classes {
            let found = element
                .attrs
                .get("class")
                .map(|value| value.split_whitespace().any(|token| token == class))
                .unwrap_or(false);
            if !found {
                return false;
            }
        }
        for condition in &step.attrs {
            let matched = match condition {
                AttrCondition::Exists { key } => element.attrs.contains_key(key),
                AttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
            };
            if !matched {
                return false;
            }
        }
        for pseudo in &step.pseudo_classes {
            let matched = match pseudo {
                PseudoClass::Checked => element.checked,
                PseudoClass::Disabled => element.disabled,
            };
            if !matched {
                return false;
            }
        }
        true
    }
}
