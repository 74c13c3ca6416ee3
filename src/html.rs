use super::*;

pub(crate) fn parse_document(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let root = dom.root;
    parse_fragment_into(&mut dom, root, html)?;
    Ok(dom)
}

/// Parses `html` and appends the resulting nodes under `parent`. End tags
/// never close elements above `parent`.
pub(crate) fn parse_fragment_into(dom: &mut Dom, parent: NodeId, html: &str) -> Result<()> {
    let mut scan = Scanner::new(html);
    let mut stack = vec![parent];

    while !scan.at_end() {
        if scan.eat("<!--") {
            if !scan.skip_through("-->") {
                return Err(Error::HtmlParse("unclosed HTML comment".into()));
            }
            continue;
        }

        if scan.peek() == Some(b'<') {
            if scan.looking_at("</") {
                let tag = scan.end_tag()?;
                while stack.len() > 1 {
                    let top = stack
                        .pop()
                        .ok_or_else(|| Error::HtmlParse("invalid open element stack".into()))?;
                    if dom
                        .tag_name(top)
                        .map(|t| t.eq_ignore_ascii_case(&tag))
                        .unwrap_or(false)
                    {
                        break;
                    }
                }
                continue;
            }

            let (tag, attrs, self_closing) = scan.start_tag()?;
            let open = *stack
                .last()
                .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
            let node = dom.create_element(open, tag.clone(), attrs);

            if is_raw_text_tag(&tag) {
                let body = scan.raw_text_until_end_tag(&tag)?;
                if !body.is_empty() {
                    dom.create_text(node, body);
                }
                continue;
            }

            if !self_closing && !is_void_tag(&tag) {
                stack.push(node);
            }
            continue;
        }

        let text = scan.text_run();
        if !text.is_empty() {
            let open = *stack
                .last()
                .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
            dom.create_text(open, text.to_string());
        }
    }

    Ok(())
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn looking_at(&self, needle: &str) -> bool {
        self.src[self.pos..].starts_with(needle)
    }

    fn eat(&mut self, needle: &str) -> bool {
        if self.looking_at(needle) {
            self.pos += needle.len();
            true
        } else {
            false
        }
    }

    fn skip_through(&mut self, needle: &str) -> bool {
        match self.src[self.pos..].find(needle) {
            Some(at) => {
                self.pos += at + needle.len();
                true
            }
            None => false,
        }
    }

    fn skip_ws(&mut self) {
        while self
            .peek()
            .map(|b| b.is_ascii_whitespace())
            .unwrap_or(false)
        {
            self.pos += 1;
        }
    }

    fn ident(&mut self, accept: fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().map(accept).unwrap_or(false) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Consumes `<tag attr=value ...>` with the cursor on `<`.
    fn start_tag(&mut self) -> Result<(String, HashMap<String, String>, bool)> {
        if !self.eat("<") {
            return Err(Error::HtmlParse("expected '<'".into()));
        }
        self.skip_ws();

        let tag = self.ident(is_tag_byte).to_ascii_lowercase();
        if tag.is_empty() {
            return Err(Error::HtmlParse("empty tag name".into()));
        }

        let mut attrs = HashMap::new();
        let mut self_closing = false;

        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(Error::HtmlParse(format!("unclosed <{tag}> start tag"))),
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') if self.looking_at("/>") => {
                    self.pos += 2;
                    self_closing = true;
                    break;
                }
                Some(_) => {}
            }

            let name = self.ident(is_attr_name_byte).to_ascii_lowercase();
            if name.is_empty() {
                return Err(Error::HtmlParse(format!(
                    "invalid attribute in <{tag}> start tag"
                )));
            }

            self.skip_ws();
            let value = if self.eat("=") {
                self.skip_ws();
                self.attr_value()?
            } else {
                String::new()
            };
            attrs.insert(name, value);
        }

        Ok((tag, attrs, self_closing))
    }

    fn attr_value(&mut self) -> Result<String> {
        match self.peek() {
            None => Err(Error::HtmlParse("missing attribute value".into())),
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().map(|b| b != quote).unwrap_or(false) {
                    self.pos += 1;
                }
                if self.at_end() {
                    return Err(Error::HtmlParse("unclosed attribute value".into()));
                }
                let value = self.src[start..self.pos].to_string();
                self.pos += 1;
                Ok(value)
            }
            Some(_) => {
                let start = self.pos;
                while self
                    .peek()
                    .map(|b| !b.is_ascii_whitespace() && b != b'>')
                    .unwrap_or(false)
                {
                    self.pos += 1;
                }
                Ok(self.src[start..self.pos].to_string())
            }
        }
    }

    /// Consumes `</tag>` with the cursor on `<` and returns the tag name.
    fn end_tag(&mut self) -> Result<String> {
        if !self.eat("</") {
            return Err(Error::HtmlParse("expected end tag".into()));
        }
        self.skip_ws();
        let tag = self.ident(is_tag_byte).to_ascii_lowercase();
        if !self.skip_through(">") {
            return Err(Error::HtmlParse(format!("unclosed </{tag}> end tag")));
        }
        Ok(tag)
    }

    fn text_run(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().map(|b| b != b'<').unwrap_or(false) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Consumes everything up to and including `</tag>`, returning the raw
    /// body. Script and style contents stay inert text.
    fn raw_text_until_end_tag(&mut self, tag: &str) -> Result<String> {
        let lower = self.src[self.pos..].to_ascii_lowercase();
        let needle = format!("</{tag}");
        let Some(at) = lower.find(&needle) else {
            return Err(Error::HtmlParse(format!("unclosed <{tag}> element")));
        };
        let body = self.src[self.pos..self.pos + at].to_string();
        self.pos += at;
        self.end_tag()?;
        Ok(body)
    }
}

fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn is_attr_name_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'' | b'<')
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}
