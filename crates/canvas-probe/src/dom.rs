//! Synthetic DOM
//!
//! The canvas has no inspectable children, so the layout table is expanded
//! into one [`SyntheticElement`] per widget once the canvas size is known.

use crate::element::SyntheticElement;
use crate::geometry::{PixelRect, Size};
use crate::layout::LayoutTable;
use crate::result::{ProbeError, ProbeResult};
use serde::Serialize;
use std::collections::HashMap;

/// Widgets of one canvas, in layout order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntheticDom {
    canvas: Size,
    elements: Vec<SyntheticElement>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SyntheticDom {
    /// Create an empty DOM for a canvas size
    #[must_use]
    pub fn new(canvas: Size) -> Self {
        Self {
            canvas,
            elements: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Canvas size the DOM was resolved against
    #[must_use]
    pub const fn canvas_size(&self) -> Size {
        self.canvas
    }

    /// Insert an element, replacing one with the same id
    pub fn insert(&mut self, element: SyntheticElement) {
        if let Some(&i) = self.index.get(element.id()) {
            self.elements[i] = element;
        } else {
            let _ = self
                .index
                .insert(element.id().to_string(), self.elements.len());
            self.elements.push(element);
        }
    }

    /// Look up an element
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SyntheticElement> {
        self.index.get(id).map(|&i| &self.elements[i])
    }

    /// Look up an element, failing on unknown ids
    pub fn find_element_by_id(&self, id: &str) -> ProbeResult<&SyntheticElement> {
        self.get(id).ok_or_else(|| ProbeError::UnknownWidget { id: id.to_string() })
    }

    /// Identifiers in layout order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(SyntheticElement::id)
    }

    /// Elements in layout order
    pub fn iter(&self) -> std::slice::Iter<'_, SyntheticElement> {
        self.elements.iter()
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the DOM has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Pixel rectangles of every positioned element
    #[must_use]
    pub fn rects(&self) -> Vec<(String, PixelRect)> {
        self.elements
            .iter()
            .filter_map(|el| el.rect().ok().map(|r| (el.id().to_string(), r)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a SyntheticDom {
    type Item = &'a SyntheticElement;
    type IntoIter = std::slice::Iter<'a, SyntheticElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazily built synthetic DOM
///
/// Built once from the canvas size reported on first use and kept until
/// [`DomCache::invalidate`] or [`DomCache::rebuild`] is called. A canvas resize
/// is not detected.
#[derive(Debug, Clone)]
pub struct DomCache {
    table: LayoutTable,
    dom: Option<SyntheticDom>,
}

impl DomCache {
    /// Create an empty cache over a layout table
    #[must_use]
    pub fn new(table: LayoutTable) -> Self {
        Self { table, dom: None }
    }

    /// Layout table the DOM is built from
    #[must_use]
    pub const fn table(&self) -> &LayoutTable {
        &self.table
    }

    /// Whether the DOM has been built
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.dom.is_some()
    }

    /// Cached DOM, if built
    #[must_use]
    pub const fn cached(&self) -> Option<&SyntheticDom> {
        self.dom.as_ref()
    }

    /// Return the cached DOM or build it from the size `canvas_size` reports
    pub fn get_or_build<F>(&mut self, canvas_size: F) -> ProbeResult<&SyntheticDom>
    where
        F: FnOnce() -> ProbeResult<Size>,
    {
        let dom = match self.dom.take() {
            Some(dom) => dom,
            None => self.build(canvas_size()?),
        };
        Ok(self.dom.insert(dom))
    }

    /// Drop the cached DOM; the next access rebuilds it
    pub fn invalidate(&mut self) {
        if self.dom.take().is_some() {
            tracing::debug!(table = %self.table.name, "synthetic DOM invalidated");
        }
    }

    /// Rebuild the DOM for a new canvas size
    pub fn rebuild(&mut self, canvas: Size) -> &SyntheticDom {
        let dom = self.build(canvas);
        self.dom.insert(dom)
    }

    fn build(&self, canvas: Size) -> SyntheticDom {
        let dom = self.table.resolve(canvas);
        tracing::debug!(
            table = %self.table.name,
            canvas = %canvas,
            elements = dom.len(),
            "synthetic DOM built"
        );
        dom
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use std::cell::Cell;

    mod dom_tests {
        use super::*;

        #[test]
        fn test_insert_replaces_same_id() {
            let mut dom = SyntheticDom::new(Size::new(10, 10));
            dom.insert(SyntheticElement::new("a"));
            dom.insert(SyntheticElement::positioned("a", Point::new(1, 1), Size::new(2, 2)));
            assert_eq!(dom.len(), 1);
            assert!(dom.get("a").unwrap().is_positioned());
        }

        #[test]
        fn test_find_unknown_widget() {
            let dom = LayoutTable::online_calculator().resolve(Size::new(400, 600));
            let err = dom.find_element_by_id("btn_minus").unwrap_err();
            assert!(matches!(err, ProbeError::UnknownWidget { ref id } if id == "btn_minus"));
        }

        #[test]
        fn test_rects_skip_unpositioned() {
            let mut dom = SyntheticDom::new(Size::new(10, 10));
            dom.insert(SyntheticElement::new("a"));
            dom.insert(SyntheticElement::positioned("b", Point::new(1, 1), Size::new(2, 2)));
            assert_eq!(dom.rects(), vec![("b".to_string(), PixelRect::new(1, 1, 2, 2))]);
        }

        #[test]
        fn test_serializes_elements_in_order() {
            let dom = LayoutTable::livecode().resolve(Size::new(320, 480));
            let json = serde_json::to_value(&dom).unwrap();
            assert_eq!(json["canvas"]["width"], 320);
            assert_eq!(json["elements"][0]["id"], "keypad");
            assert_eq!(json["elements"][1]["id"], "display");
        }
    }

    mod cache_tests {
        use super::*;

        #[test]
        fn test_built_once() {
            let mut cache = DomCache::new(LayoutTable::livecode());
            let calls = Cell::new(0);
            let size = || {
                calls.set(calls.get() + 1);
                Ok(Size::new(320, 480))
            };
            assert!(!cache.is_built());
            let _ = cache.get_or_build(size).unwrap();
            let _ = cache.get_or_build(size).unwrap();
            assert_eq!(calls.get(), 1);
            assert!(cache.is_built());
        }

        #[test]
        fn test_stale_until_invalidated() {
            let mut cache = DomCache::new(LayoutTable::livecode());
            let _ = cache.get_or_build(|| Ok(Size::new(320, 480))).unwrap();
            let dom = cache.get_or_build(|| Ok(Size::new(640, 960))).unwrap();
            assert_eq!(dom.canvas_size(), Size::new(320, 480));

            cache.invalidate();
            let dom = cache.get_or_build(|| Ok(Size::new(640, 960))).unwrap();
            assert_eq!(dom.canvas_size(), Size::new(640, 960));
        }

        #[test]
        fn test_rebuild() {
            let mut cache = DomCache::new(LayoutTable::livecode());
            let _ = cache.get_or_build(|| Ok(Size::new(320, 480))).unwrap();
            let dom = cache.rebuild(Size::new(160, 240));
            assert_eq!(dom.get("display").unwrap().size().unwrap(), Size::new(160, 40));
        }

        #[test]
        fn test_size_error_leaves_cache_empty() {
            let mut cache = DomCache::new(LayoutTable::livecode());
            let result = cache.get_or_build(|| Err(ProbeError::driver("no canvas")));
            assert!(result.is_err());
            assert!(!cache.is_built());
        }
    }
}
