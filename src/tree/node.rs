//! In-memory tree nodes
//!
//! An owned copy of a parsed blob. Answers the same queries as the `fdtget`
//! backend without spawning a process per call.

use super::path::{normalize_node_path, segment_matches, segments};
use super::{blob, PropertyValue, TreeAccessor};
use crate::error::AccessorError;
use std::path::Path;

/// Property stored as raw bytes, in blob order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub data: Vec<u8>,
}

/// Tree node: name (empty for the root), properties and children in blob order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FitNode {
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<FitNode>,
}

impl FitNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Read and parse a blob file.
    pub fn load(path: &Path) -> Result<Self, AccessorError> {
        let data = std::fs::read(path)?;
        blob::parse(&data)
    }

    /// Serialize to the flattened device-tree binary format.
    pub fn to_dtb(&self) -> Vec<u8> {
        blob::serialize(self)
    }

    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.set_property(name, value.to_raw());
        self
    }

    pub fn with_string(self, name: impl Into<String>, value: &str) -> Self {
        self.with_property(name, PropertyValue::String(value.to_string()))
    }

    pub fn with_bytes(self, name: impl Into<String>, value: &[u8]) -> Self {
        self.with_property(name, PropertyValue::Bytes(value.to_vec()))
    }

    pub fn with_child(mut self, child: FitNode) -> Self {
        self.children.push(child);
        self
    }

    /// Replace or append a raw property.
    pub fn set_property(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.data = data,
            None => self.properties.push(Property { name, data }),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Resolve an absolute node path.
    pub fn find(&self, path: &str) -> Option<&FitNode> {
        segments(path).into_iter().try_fold(self, |node, segment| {
            node.children
                .iter()
                .find(|c| c.name == segment)
                .or_else(|| node.children.iter().find(|c| segment_matches(segment, &c.name)))
        })
    }

    /// Mutable variant of [`FitNode::find`], exact names only.
    pub fn find_mut(&mut self, path: &str) -> Option<&mut FitNode> {
        segments(path).into_iter().try_fold(self, |node, segment| {
            node.children.iter_mut().find(|c| c.name == segment)
        })
    }

    fn node(&self, path: &str) -> Result<&FitNode, AccessorError> {
        self.find(path)
            .ok_or_else(|| AccessorError::NodeNotFound(normalize_node_path(path)))
    }

    fn raw(&self, node: &str, property: &str) -> Result<&[u8], AccessorError> {
        self.node(node)?
            .property(property)
            .map(|p| p.data.as_slice())
            .ok_or_else(|| AccessorError::PropertyNotFound {
                node: normalize_node_path(node),
                property: property.to_string(),
            })
    }
}

impl TreeAccessor for FitNode {
    fn list_children(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        Ok(self
            .node(path)?
            .children
            .iter()
            .map(|c| c.name.clone())
            .collect())
    }

    fn get_property(&self, node: &str, property: &str) -> Result<String, AccessorError> {
        let rendered = PropertyValue::from_raw(self.raw(node, property)?).render();
        Ok(rendered.trim_end_matches('\n').to_string())
    }

    fn get_property_hex(&self, node: &str, property: &str) -> Result<String, AccessorError> {
        Ok(hex::encode(self.raw(node, property)?))
    }

    fn get_property_value(
        &self,
        node: &str,
        property: &str,
    ) -> Result<PropertyValue, AccessorError> {
        Ok(PropertyValue::from_raw(self.raw(node, property)?))
    }
}
