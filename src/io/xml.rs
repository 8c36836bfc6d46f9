//! ElementTree-style navigation helpers over `roxmltree` documents.
//! The Muscate and Sen2Cor schemas are walked by slash-separated element
//! paths, indexed element children, and attribute lookups; these helpers keep
//! that navigation in one place for both extractors.
use std::path::Path;

use roxmltree::{Document, Node};

use super::MetadataError;
use crate::types::Dialect;

/// Read a metadata document into memory, dropping any DTD declaration
/// (roxmltree rejects DTDs by default).
pub fn load_document_text(path: &Path) -> Result<String, MetadataError> {
    let text = std::fs::read_to_string(path)?;
    if text.contains("<!DOCTYPE") {
        return Ok(text
            .lines()
            .filter(|l| !l.trim_start().starts_with("<!DOCTYPE"))
            .collect::<Vec<_>>()
            .join("\n"));
    }
    Ok(text)
}

/// Detect the metadata dialect from the document root tag.
pub fn detect_dialect(text: &str) -> Result<Dialect, MetadataError> {
    let doc = Document::parse(text)?;
    let root_tag = doc.root_element().tag_name().name().to_string();
    if root_tag.contains("Muscate_Metadata_Document") {
        Ok(Dialect::Muscate)
    } else if root_tag.contains("Level-2A_User_Product") {
        Ok(Dialect::Sen2cor)
    } else {
        Err(MetadataError::UnsupportedFormat(root_tag))
    }
}

/// Element children only, in document order.
pub fn element_children<'a, 'd>(node: Node<'a, 'd>) -> impl Iterator<Item = Node<'a, 'd>> {
    node.children().filter(|n| n.is_element())
}

/// First descendant reached by walking `path` one child tag at a time.
pub fn find<'a, 'd>(node: Node<'a, 'd>, path: &str) -> Option<Node<'a, 'd>> {
    let mut cur = node;
    for seg in path.split('/') {
        cur = element_children(cur).find(|n| n.has_tag_name(seg))?;
    }
    Some(cur)
}

/// All descendants reached by walking `path`, expanding every matching child
/// at each step.
pub fn find_all<'a, 'd>(node: Node<'a, 'd>, path: &str) -> Vec<Node<'a, 'd>> {
    let mut nodes = vec![node];
    for seg in path.split('/') {
        nodes = nodes
            .iter()
            .flat_map(|n| element_children(*n).filter(|c| c.has_tag_name(seg)))
            .collect();
    }
    nodes
}

pub fn require<'a, 'd>(
    node: Node<'a, 'd>,
    path: &'static str,
) -> Result<Node<'a, 'd>, MetadataError> {
    find(node, path).ok_or(MetadataError::MissingElement(path))
}

/// Trimmed text content of the element, empty if none.
pub fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

pub fn require_text<'a>(
    node: Node<'a, '_>,
    path: &'static str,
) -> Result<&'a str, MetadataError> {
    Ok(text(require(node, path)?))
}

pub fn attr_string(node: Node, name: &'static str) -> Result<String, MetadataError> {
    node.attribute(name)
        .map(String::from)
        .ok_or(MetadataError::MissingAttribute(name))
}

pub fn parse_f64(field: &'static str, value: &str) -> Result<f64, MetadataError> {
    value.parse().map_err(|_| MetadataError::Number {
        field,
        value: value.to_string(),
    })
}

pub fn parse_u32(field: &'static str, value: &str) -> Result<u32, MetadataError> {
    value.parse().map_err(|_| MetadataError::Number {
        field,
        value: value.to_string(),
    })
}
