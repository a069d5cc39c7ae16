//! Read access to parsed `lfm` documents.
//!
//! Paths are `/`-separated element names relative to the element they are
//! resolved against. A segment may select among siblings by attribute with
//! `name attr=value`, e.g. `image size=large`.

use crate::error::{MissingField, TransportError};
use xmltree::{Element, XMLNode};

/// An owned, parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct WsDocument {
    root: Element,
}

impl WsDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, TransportError> {
        Element::parse(bytes)
            .map(|root| Self { root })
            .map_err(|e| TransportError::Parse(e.to_string()))
    }

    pub fn from_element(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> WsElement<'_> {
        WsElement { element: &self.root }
    }
}

/// Borrowed view of one element.
#[derive(Debug, Clone, Copy)]
pub struct WsElement<'a> {
    element: &'a Element,
}

impl<'a> WsElement<'a> {
    pub fn name(&self) -> &'a str {
        &self.element.name
    }

    /// Resolves `path` to a descendant element.
    pub fn child(&self, path: &str) -> Result<WsElement<'a>, MissingField> {
        let mut current = self.element;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = select(current, segment).ok_or_else(|| MissingField::new(path))?;
        }
        Ok(WsElement { element: current })
    }

    /// Direct child elements called `name`, in document order.
    pub fn children(&self, name: &'a str) -> impl Iterator<Item = WsElement<'a>> + 'a {
        let element: &'a Element = self.element;
        element
            .children
            .iter()
            .filter_map(XMLNode::as_element)
            .filter(move |e| e.name == name)
            .map(|element| WsElement { element })
    }

    /// Trimmed text content; empty text counts as missing.
    pub fn text(&self) -> Result<String, MissingField> {
        self.element
            .get_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MissingField::new(self.element.name.clone()))
    }

    /// Text of the element at `path`.
    pub fn field(&self, path: &str) -> Result<String, MissingField> {
        self.child(path)?
            .text()
            .map_err(|_| MissingField::new(path))
    }

    /// Like [`field`](Self::field) for values the caller can do without.
    pub fn optional_field(&self, path: &str) -> Option<String> {
        self.field(path).ok()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.element.attributes.get(name).map(String::as_str)
    }
}

fn select<'e>(parent: &'e Element, segment: &str) -> Option<&'e Element> {
    match segment.split_once(' ') {
        Some((tag, filter)) => {
            let (attr, value) = filter.split_once('=').unwrap_or((filter, ""));
            parent
                .children
                .iter()
                .filter_map(XMLNode::as_element)
                .find(|e| {
                    e.name == tag && e.attributes.get(attr).map(String::as_str) == Some(value)
                })
        }
        None => parent.get_child(segment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIST: &str = r#"<lfm status="ok">
        <artist>
            <name>Cher</name>
            <mbid></mbid>
            <image size="small">http://img/s.jpg</image>
            <image size="large">http://img/l.jpg</image>
            <similar>
                <artist><name>Madonna</name></artist>
                <artist><name>Kylie Minogue</name></artist>
            </similar>
        </artist>
    </lfm>"#;

    fn doc() -> WsDocument {
        WsDocument::parse(ARTIST.as_bytes()).unwrap()
    }

    #[test]
    fn test_field_resolves_nested_path() {
        let doc = doc();
        let lfm = doc.root();
        assert_eq!(lfm.name(), "lfm");
        assert_eq!(lfm.attribute("status"), Some("ok"));
        assert_eq!(lfm.field("artist/name").unwrap(), "Cher");
    }

    #[test]
    fn test_empty_and_absent_fields_are_missing() {
        let doc = doc();
        let lfm = doc.root();

        assert_eq!(
            lfm.field("artist/mbid").unwrap_err(),
            MissingField::new("artist/mbid")
        );
        assert!(lfm.field("artist/bio/summary").is_err());
        assert_eq!(lfm.optional_field("artist/bio"), None);
    }

    #[test]
    fn test_attribute_selector() {
        let doc = doc();
        let artist = doc.root().child("artist").unwrap();
        assert_eq!(artist.field("image size=large").unwrap(), "http://img/l.jpg");
        assert!(artist.child("image size=mega").is_err());
    }

    #[test]
    fn test_children_are_direct_only() {
        let doc = doc();
        let similar = doc.root().child("artist/similar").unwrap();
        let names: Vec<String> = similar
            .children("artist")
            .map(|a| a.field("name").unwrap())
            .collect();
        assert_eq!(names, vec!["Madonna", "Kylie Minogue"]);

        assert_eq!(doc.root().children("name").count(), 0);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = WsDocument::parse(b"<lfm status=\"ok\"><unclosed></lfm>");
        assert!(matches!(result, Err(TransportError::Parse(_))));
    }
}
