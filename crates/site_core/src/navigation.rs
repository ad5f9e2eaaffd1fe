use std::sync::Arc;

use shared::domain::SectionId;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::{
    events::SiteEvent,
    layout::{ScrollBehavior, SectionLayout},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub section: SectionId,
    pub label: &'static str,
    pub active: bool,
}

pub struct NavigationController {
    layout: Arc<dyn SectionLayout>,
    active: watch::Receiver<SectionId>,
    mobile_menu: watch::Sender<bool>,
    events: broadcast::Sender<SiteEvent>,
}

impl NavigationController {
    pub fn new(
        layout: Arc<dyn SectionLayout>,
        active: watch::Receiver<SectionId>,
        events: broadcast::Sender<SiteEvent>,
    ) -> Self {
        let (mobile_menu, _) = watch::channel(false);
        Self {
            layout,
            active,
            mobile_menu,
            events,
        }
    }

    /// Click handler for a nav link carrying a DOM section id. Unknown ids
    /// are ignored.
    pub fn scroll_to_section(&self, section_id: &str) -> bool {
        match SectionId::parse(section_id) {
            Some(section) => self.scroll_to(section),
            None => {
                debug!(section_id, "nav: ignoring unknown section id");
                false
            }
        }
    }

    /// Smooth-scrolls to `section` and collapses the mobile panel. Leaves the
    /// panel alone when the section element is missing.
    pub fn scroll_to(&self, section: SectionId) -> bool {
        if !self.layout.scroll_into_view(section, ScrollBehavior::Smooth) {
            debug!(section = %section, "nav: section element not mounted");
            return false;
        }
        self.close_mobile_menu();
        true
    }

    pub fn active_section(&self) -> SectionId {
        *self.active.borrow()
    }

    pub fn is_active(&self, section: SectionId) -> bool {
        self.active_section() == section
    }

    pub fn links(&self) -> Vec<NavLink> {
        let active = self.active_section();
        SectionId::ALL
            .iter()
            .map(|section| NavLink {
                section: *section,
                label: section.nav_label(),
                active: *section == active,
            })
            .collect()
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        *self.mobile_menu.borrow()
    }

    pub fn subscribe_mobile_menu(&self) -> watch::Receiver<bool> {
        self.mobile_menu.subscribe()
    }

    pub fn toggle_mobile_menu(&self) -> bool {
        let open = !self.is_mobile_menu_open();
        self.set_mobile_menu(open);
        open
    }

    pub fn close_mobile_menu(&self) {
        self.set_mobile_menu(false);
    }

    fn set_mobile_menu(&self, open: bool) {
        let changed = self.mobile_menu.send_if_modified(|current| {
            if *current == open {
                return false;
            }
            *current = open;
            true
        });
        if changed {
            let _ = self.events.send(SiteEvent::MobileMenuToggled(open));
        }
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
