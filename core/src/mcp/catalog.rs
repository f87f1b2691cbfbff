//! Tool catalog discovered once per connection

use super::protocol::ToolDescriptor;
use std::collections::HashMap;

/// Ordered, name-unique set of tool descriptors
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Build a catalog keeping server order; later duplicates are dropped
    pub fn from_descriptors(descriptors: Vec<ToolDescriptor>) -> Self {
        let mut catalog = Self::default();
        for descriptor in descriptors {
            if catalog.index.contains_key(&descriptor.name) {
                tracing::warn!(
                    "Tool server advertised '{}' more than once; keeping the first",
                    descriptor.name
                );
                continue;
            }
            catalog
                .index
                .insert(descriptor.name.clone(), catalog.tools.len());
            catalog.tools.push(descriptor);
        }
        catalog
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
