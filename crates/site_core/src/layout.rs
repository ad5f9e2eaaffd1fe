use std::sync::{Mutex, PoisonError};

use shared::domain::SectionId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Whether the horizontal line `offset` pixels below the viewport top
    /// passes through this rectangle (edges inclusive).
    pub fn spans(&self, offset: f64) -> bool {
        self.top <= offset && self.bottom >= offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

pub trait SectionLayout: Send + Sync {
    /// Current bounding rectangle of the section element, `None` when the
    /// element is not mounted.
    fn bounding_rect(&self, section: SectionId) -> Option<Rect>;

    /// Scrolls the section element into view. Returns `false` when the element
    /// is not mounted.
    fn scroll_into_view(&self, section: SectionId, behavior: ScrollBehavior) -> bool;
}

/// Headless page model: sections stacked top to bottom with fixed heights and
/// a single scroll offset. Smooth scrolling lands where instant scrolling does.
pub struct StackedLayout {
    sections: Vec<(SectionId, f64, f64)>,
    scroll_y: Mutex<f64>,
}

impl StackedLayout {
    pub fn new(heights: impl IntoIterator<Item = (SectionId, f64)>) -> Self {
        let mut top = 0.0;
        let sections = heights
            .into_iter()
            .map(|(section, height)| {
                let entry = (section, top, height.max(0.0));
                top += height.max(0.0);
                entry
            })
            .collect();
        Self {
            sections,
            scroll_y: Mutex::new(0.0),
        }
    }

    pub fn scroll_to(&self, y: f64) {
        *self.scroll_y.lock().unwrap_or_else(PoisonError::into_inner) = y.max(0.0);
    }

    pub fn scroll_y(&self) -> f64 {
        *self.scroll_y.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn section_top(&self, section: SectionId) -> Option<f64> {
        self.sections
            .iter()
            .find(|(id, _, _)| *id == section)
            .map(|(_, top, _)| *top)
    }

    pub fn document_height(&self) -> f64 {
        self.sections.iter().map(|(_, _, height)| height).sum()
    }
}

impl SectionLayout for StackedLayout {
    fn bounding_rect(&self, section: SectionId) -> Option<Rect> {
        let scroll_y = self.scroll_y();
        self.sections
            .iter()
            .find(|(id, _, _)| *id == section)
            .map(|(_, top, height)| Rect::new(top - scroll_y, top + height - scroll_y))
    }

    fn scroll_into_view(&self, section: SectionId, _behavior: ScrollBehavior) -> bool {
        match self.section_top(section) {
            Some(top) => {
                self.scroll_to(top);
                true
            }
            None => false,
        }
    }
}
