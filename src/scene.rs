use crate::element::{Element, ElementId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Element collection keyed by id.
///
/// Ids are handed out in increasing order, so iterating the map yields
/// elements in insertion order no matter which ones were removed. Elements
/// are shared between history snapshots; replacing one only swaps its `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: BTreeMap<ElementId, Arc<Element>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id).map(Arc::as_ref)
    }

    /// Adds `element`, or replaces the element with the same id in place.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id, Arc::new(element));
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Arc<Element>> {
        self.elements.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.values().map(Arc::as_ref)
    }
}
