//! Small tree + selector layer over the `scraper` parser.
//!
//! The playtime heuristics only need a handful of operations (css selection,
//! own text, siblings, parents, inner markup); keeping them here means the
//! extraction code never touches the parser types directly.
//!
//! A [`Page`] is not `Send`, so parse it, read what you need, and drop it
//! before the next `.await`.

use scraper::{ElementRef, Html, Selector};

/// Elements whose contents are data, not readable text.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, thiserror::Error)]
#[error("invalid selector {:?}: {}", css, reason)]
pub struct SelectorError {
    css: String,
    reason: String,
}

/// A compiled css selector.
#[derive(Debug, Clone)]
pub struct Query {
    inner: Selector,
}

impl Query {
    pub fn parse(css: &str) -> Result<Query, SelectorError> {
        Selector::parse(css)
            .map(|inner| Query { inner })
            .map_err(|e| SelectorError {
                css: css.to_owned(),
                reason: e.to_string(),
            })
    }
}

/// A parsed html document along with the address it was loaded from.
pub struct Page {
    html: Html,
    url: Option<String>,
}

impl Page {
    pub fn parse(body: &str, url: Option<String>) -> Page {
        Page {
            html: Html::parse_document(body),
            url,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The `<html>` element.
    pub fn root(&self) -> Node<'_> {
        Node(self.html.root_element())
    }

    pub fn body(&self) -> Option<Node<'_>> {
        self.root().children().find(|n| n.name() == "body")
    }

    pub fn select_first(&self, query: &Query) -> Option<Node<'_>> {
        self.html.select(&query.inner).next().map(Node)
    }

    pub fn select(&self, query: &Query) -> Vec<Node<'_>> {
        self.html.select(&query.inner).map(Node).collect()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("url", &self.url).finish()
    }
}

/// An element inside a [`Page`].
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    pub fn name(&self) -> &'a str {
        self.0.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// Text of the direct text children only, whitespace collapsed. Script
    /// and style bodies have no own text.
    pub fn own_text(&self) -> String {
        if RAW_TEXT_ELEMENTS.contains(&self.name()) {
            return String::new();
        }
        let raw = self
            .0
            .children()
            .filter_map(|child| child.value().as_text().map(|t| &**t))
            .collect::<Vec<_>>()
            .join(" ");
        normalize_ws(&raw)
    }

    /// All text under this element, whitespace collapsed.
    pub fn text(&self) -> String {
        normalize_ws(&self.0.text().collect::<Vec<_>>().join(" "))
    }

    pub fn inner_html(&self) -> String {
        self.0.inner_html()
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.0.parent().and_then(ElementRef::wrap).map(Node)
    }

    pub fn next_sibling(&self) -> Option<Node<'a>> {
        self.0.next_siblings().find_map(ElementRef::wrap).map(Node)
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.0.children().filter_map(ElementRef::wrap).map(Node)
    }

    /// This element followed by every element beneath it, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.0.descendants().filter_map(ElementRef::wrap).map(Node)
    }

    pub fn matches(&self, query: &Query) -> bool {
        query.inner.matches(&self.0)
    }

    /// Elements matching `query` within this subtree, this element included.
    pub fn select(&self, query: &Query) -> Vec<Node<'a>> {
        let mut found = Vec::new();
        if self.matches(query) {
            found.push(*self);
        }
        found.extend(self.0.select(&query.inner).map(Node));
        found
    }

    pub fn select_first(&self, query: &Query) -> Option<Node<'a>> {
        if self.matches(query) {
            return Some(*self);
        }
        self.0.select(&query.inner).next().map(Node)
    }
}

impl<'a> std::fmt::Debug for Node<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Node").field(&self.name()).finish()
    }
}

/// Collapse runs of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
