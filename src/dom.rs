//! HTML document tree: parsing, body lookup, and serialization.
//!
//! Rendered templates come back as markup strings. Merging needs a real
//! tree (find a `body`, splice children into another document), and the
//! PDF handoff needs to turn the spliced tree back into markup. The parser
//! is a small hand-written recursive descent over the controlled XHTML our
//! templates produce; it keeps every tag it sees and never fails, so
//! structural problems surface as lookup results rather than parse errors.

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element carrying its tag name, attributes, and children.
///
/// Tag names are stored lowercased. Attributes keep their source order so
/// a parse/serialize round trip is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search for the first element named `name`, including self.
    pub fn find(&self, name: &str) -> Option<&ElementNode> {
        if self.name == name {
            return Some(self);
        }
        find_in_nodes(&self.children, name)
    }

    /// Mutable variant of [`ElementNode::find`].
    pub fn find_mut(&mut self, name: &str) -> Option<&mut ElementNode> {
        if self.name == name {
            return Some(self);
        }
        find_in_nodes_mut(&mut self.children, name)
    }

    /// Concatenated text content of the subtree, segments joined by spaces.
    pub fn text(&self) -> String {
        let mut segments = Vec::new();
        collect_text(&self.children, &mut segments);
        segments.join(" ")
    }
}

fn find_in_nodes<'a>(nodes: &'a [DomNode], name: &str) -> Option<&'a ElementNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if let Some(found) = e.find(name) {
                return Some(found);
            }
        }
    }
    None
}

fn find_in_nodes_mut<'a>(nodes: &'a mut [DomNode], name: &str) -> Option<&'a mut ElementNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if let Some(found) = e.find_mut(name) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_text(nodes: &[DomNode], segments: &mut Vec<String>) {
    for node in nodes {
        match node {
            DomNode::Text(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    segments.push(trimmed.to_string());
                }
            }
            DomNode::Element(e) => collect_text(&e.children, segments),
        }
    }
}

/// A parsed HTML document: the forest of top-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlDocument {
    pub roots: Vec<DomNode>,
}

impl HtmlDocument {
    /// Parse a markup string. Parsing is lenient and always produces a tree;
    /// comments, doctypes, and processing instructions are dropped.
    pub fn parse(html: &str) -> Self {
        let mut parser = Parser::new(html);
        Self {
            roots: parser.parse_nodes(),
        }
    }

    /// The first `body` element in document order, at any depth.
    pub fn body(&self) -> Option<&ElementNode> {
        find_in_nodes(&self.roots, "body")
    }

    /// Mutable variant of [`HtmlDocument::body`].
    pub fn body_mut(&mut self) -> Option<&mut ElementNode> {
        find_in_nodes_mut(&mut self.roots, "body")
    }

    /// Consume the document and take the children of its `body` element.
    /// Returns `None` when the document has no `body`.
    pub fn into_body_children(mut self) -> Option<Vec<DomNode>> {
        self.body_mut().map(|body| std::mem::take(&mut body.children))
    }

    /// Concatenated text content of the whole document.
    pub fn text(&self) -> String {
        let mut segments = Vec::new();
        collect_text(&self.roots, &mut segments);
        segments.join(" ")
    }

    /// Serialize the tree back to markup, entity-escaping text and
    /// attribute values.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.roots {
            write_node(&mut out, node);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Parser: simple recursive descent over HTML
// ---------------------------------------------------------------------------

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace_preserve();
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.skip_comment();
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // Skip doctype / processing instructions
            while !self.eof() && !self.starts_with(">") {
                self.advance(1);
            }
            if !self.eof() {
                self.advance(1); // skip '>'
            }
            return None;
        }
        if self.starts_with("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        let text = &self.input[start..self.pos];
        DomNode::Text(decode_entities(text))
    }

    fn parse_element(&mut self) -> DomNode {
        // Consume '<'
        self.advance(1);
        let name = self.parse_name().to_ascii_lowercase();
        let mut elem = ElementNode::new(name);

        // Parse attributes
        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let before = self.pos;
            let (key, value) = self.parse_attribute();
            if self.pos == before {
                // A character that cannot start an attribute name; skip
                // it so the tag scan always makes progress.
                self.advance(1);
                continue;
            }
            if !key.is_empty() {
                elem.attributes.push((key, value));
            }
        }

        // Void tags carry no children
        let void = is_void(&elem.name);
        if self.starts_with("/>") {
            self.advance(2);
            return DomNode::Element(elem);
        }
        if self.starts_with(">") {
            self.advance(1);
        }
        if void {
            return DomNode::Element(elem);
        }

        // Parse children
        elem.children = self.parse_nodes();

        // Consume closing tag
        if self.starts_with("</") {
            self.advance(2);
            self.parse_name();
            self.skip_whitespace();
            if self.starts_with(">") {
                self.advance(1);
            }
        }

        DomNode::Element(elem)
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_name();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.advance(1); // skip '='
        self.skip_whitespace();
        let value = self.parse_attr_value();
        (key, value)
    }

    fn parse_attr_value(&mut self) -> String {
        if self.starts_with("\"") {
            self.parse_quoted('"')
        } else if self.starts_with("'") {
            self.parse_quoted('\'')
        } else {
            let start = self.pos;
            while let Some(c) = self.peek() {
                // A `/` belongs to the value unless it closes the tag.
                if c.is_whitespace() || c == '>' || self.starts_with("/>") {
                    break;
                }
                self.advance(1);
            }
            self.input[start..self.pos].to_string()
        }
    }

    fn parse_quoted(&mut self, quote: char) -> String {
        self.advance(1); // opening quote
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                break;
            }
            self.advance(1);
        }
        let val = self.input[start..self.pos].to_string();
        if !self.eof() {
            self.advance(1); // closing quote
        }
        decode_entities(&val)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance(1);
        }
    }

    fn skip_whitespace_preserve(&mut self) {
        // Skip runs of pure whitespace between elements.
        let saved = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance(1);
        }
        // If we reached a tag or EOF, keep the skip. Otherwise revert.
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    fn skip_comment(&mut self) {
        self.advance(4); // skip <!--
        while !self.eof() && !self.starts_with("-->") {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(3);
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self, n: usize) {
        // Advance by `n` characters (not bytes).
        for _ in 0..n {
            if let Some(c) = self.input[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }
        }
    }
}

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
    ("&nbsp;", '\u{00A0}'),
];

// Single pass, so decoded output is never re-scanned: `&amp;lt;` is
// `&lt;`, not `<`.
fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some(&(entity, ch)) => {
                out.push(ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

/// Elements that never carry children and serialize self-closed.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn write_node(out: &mut String, node: &DomNode) {
    match node {
        DomNode::Text(t) => out.push_str(&escape_text(t)),
        DomNode::Element(e) => write_element(out, e),
    }
}

fn write_element(out: &mut String, elem: &ElementNode) {
    out.push('<');
    out.push_str(&elem.name);
    for (key, value) in &elem.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    if is_void(&elem.name) {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &elem.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&elem.name);
    out.push('>');
}

// `>` stays raw: it is valid in text and inline CSS relies on it.
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
