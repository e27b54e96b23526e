//! Snapshot of a frame's document: element tree, layout for hit testing and
//! viewport size.
//!
//! HTML is parsed with `scraper` and copied into an `ego_tree` arena of
//! [`PageNode`]s. Only elements survive the copy, and anchor hrefs are resolved
//! against the document URL up front, so the snapshot is `Send` and can live
//! inside a frame tracker task.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeMut, NodeRef, Tree};
use queue_core::{CursorPosition, Viewport};
use scraper::{Html, Node};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, pos: CursorPosition) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x.saturating_add(self.width)
            && pos.y < self.y.saturating_add(self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    pub tag: String,
    pub element_id: Option<String>,
    /// Resolved target for `<a href>` elements.
    pub href: Option<String>,
}

impl PageNode {
    fn document() -> Self {
        Self {
            tag: "#document".to_string(),
            element_id: None,
            href: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageDocument {
    url: Option<Url>,
    tree: Tree<PageNode>,
    ids: HashMap<String, NodeId>,
    // Later entries sit on top.
    layout: Vec<(Rect, NodeId)>,
    viewport: Viewport,
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::blank()
    }
}

impl PageDocument {
    /// Empty document (`about:blank`).
    pub fn blank() -> Self {
        Self {
            url: None,
            tree: Tree::new(PageNode::document()),
            ids: HashMap::new(),
            layout: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn parse(html: &str, document_url: Option<&str>) -> Self {
        let url = document_url.and_then(|raw| Url::parse(raw).ok());
        let source = Html::parse_document(html);
        let mut tree = Tree::new(PageNode::document());
        let mut ids = HashMap::new();
        {
            let mut root = tree.root_mut();
            for child in source.tree.root().children() {
                copy_element(child, &mut root, url.as_ref(), &mut ids);
            }
        }
        Self {
            url,
            tree,
            ids,
            layout: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// First element carrying `id="..."`.
    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.ids.get(element_id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&PageNode> {
        self.tree.get(id).map(|node| node.value())
    }

    /// Gives `node` a box for hit testing; the most recent placement is on top.
    pub fn place(&mut self, node: NodeId, rect: Rect) {
        self.layout.push((rect, node));
    }

    pub fn element_at(&self, pos: CursorPosition) -> Option<NodeId> {
        self.layout
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, id)| *id)
    }

    /// Walks from `node` up its ancestry to the first anchor with an href.
    pub fn nearest_anchor_href(&self, node: NodeId) -> Option<String> {
        let node = self.tree.get(node)?;
        std::iter::once(node)
            .chain(node.ancestors())
            .find_map(|candidate| candidate.value().href.clone())
    }

    pub fn anchor_href_at(&self, pos: CursorPosition) -> Option<String> {
        self.element_at(pos)
            .and_then(|node| self.nearest_anchor_href(node))
    }
}

fn copy_element(
    source: NodeRef<'_, Node>,
    parent: &mut NodeMut<'_, PageNode>,
    base: Option<&Url>,
    ids: &mut HashMap<String, NodeId>,
) {
    let Some(element) = source.value().as_element() else {
        return;
    };
    let tag = element.name().to_ascii_lowercase();
    let href = if tag == "a" {
        element.attr("href").map(|raw| resolve_href(raw, base))
    } else {
        None
    };
    let element_id = element.id().map(str::to_string);
    let mut node = parent.append(PageNode {
        tag,
        element_id: element_id.clone(),
        href,
    });
    if let Some(element_id) = element_id {
        ids.entry(element_id).or_insert(node.id());
    }
    for child in source.children() {
        copy_element(child, &mut node, base, ids);
    }
}

// Unresolvable references keep the raw attribute text.
fn resolve_href(raw: &str, base: Option<&Url>) -> String {
    let trimmed = raw.trim();
    let resolved = match base {
        Some(base) => base.join(trimmed),
        None => Url::parse(trimmed),
    };
    resolved.map(String::from).unwrap_or_else(|_| raw.to_string())
}
