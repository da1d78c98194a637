//! Tag representation
//!
//! Tags live in the document's registry in completion order and refer to
//! their children by [`TagId`]. A [`TagRef`] pairs a tag with its document
//! so the tree can be walked without handing out the registry itself.

use super::document::Document;
use crate::index::Offset;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

/// Compact tag identifier (index into the registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub(crate) u32);

impl TagId {
    /// Position of the tag in completion order
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Attribute name to value; both borrow from the source.
///
/// A bare attribute (`<input disabled>`) maps its name to itself.
pub type Attributes<'a> = HashMap<&'a str, &'a str>;

/// A parsed tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub(crate) name: &'a str,
    pub(crate) namespace: Option<&'a str>,
    pub(crate) attributes: Attributes<'a>,
    pub(crate) span: Offset,
    pub(crate) body: Offset,
    pub(crate) children: Vec<TagId>,
}

impl<'a> Tag<'a> {
    pub(crate) fn new(name: &'a str, namespace: Option<&'a str>, start: usize) -> Self {
        Tag {
            name,
            namespace,
            attributes: HashMap::new(),
            span: Offset::empty_at(start),
            body: Offset::empty_at(start),
            children: Vec::new(),
        }
    }

    /// The synthetic tag holding the top-level tags
    pub(crate) fn root(len: usize) -> Self {
        Tag {
            name: "root",
            namespace: None,
            attributes: HashMap::new(),
            span: Offset::new(0, len),
            body: Offset::new(0, len),
            children: Vec::new(),
        }
    }

    /// Local name (after the namespace prefix, if any)
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Namespace prefix, if the tag was written as `prefix:name`
    #[inline]
    pub fn namespace(&self) -> Option<&'a str> {
        self.namespace
    }

    /// Name as written in the start tag, prefix included
    pub fn qualified_name(&self) -> String {
        match self.namespace {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.to_string(),
        }
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes<'a> {
        &self.attributes
    }

    /// Get attribute value by name
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes.get(name).copied()
    }

    /// Inner content range; empty for self-closing and void tags
    #[inline]
    pub fn body(&self) -> Offset {
        self.body
    }

    /// Range of the whole tag, from its `<` to just past its end
    #[inline]
    pub fn span(&self) -> Offset {
        self.span
    }

    #[inline]
    pub fn child_ids(&self) -> &[TagId] {
        &self.children
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A tag together with the document that owns it
#[derive(Clone, Copy)]
pub struct TagRef<'d, 'a> {
    doc: &'d Document<'a>,
    tag: &'d Tag<'a>,
}

impl<'d, 'a> TagRef<'d, 'a> {
    #[inline]
    pub(crate) fn new(doc: &'d Document<'a>, tag: &'d Tag<'a>) -> Self {
        TagRef { doc, tag }
    }

    #[inline]
    pub fn tag(&self) -> &'d Tag<'a> {
        self.tag
    }

    /// Direct children in document order
    pub fn children(&self) -> impl Iterator<Item = TagRef<'d, 'a>> + 'd {
        let doc = self.doc;
        self.tag
            .children
            .iter()
            .filter_map(move |&id| doc.get(id))
    }

    /// Inner content as text
    pub fn body_text(&self) -> &'a str {
        self.tag.body.as_str(self.doc.source()).unwrap_or_default()
    }

    /// Whole tag text, from `<` to the end of its closing tag
    pub fn outer_text(&self) -> &'a str {
        self.tag.span.as_str(self.doc.source()).unwrap_or_default()
    }

    /// Namespace value bound to this tag's prefix
    pub fn namespace_uri(&self) -> Option<&'a str> {
        self.tag
            .namespace
            .and_then(|prefix| self.doc.namespaces().resolve(prefix))
    }

    /// All descendants named `name`, in pre-order
    pub fn find_all(&self, name: &str) -> Vec<TagRef<'d, 'a>> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect(&self, name: &str, found: &mut Vec<TagRef<'d, 'a>>) {
        for child in self.children() {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }
}

impl<'a> Deref for TagRef<'_, 'a> {
    type Target = Tag<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.tag
    }
}

impl fmt::Debug for TagRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tag.fmt(f)
    }
}

impl PartialEq for TagRef<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tag, other.tag)
    }
}
