//! Interaction core of the lead-capture site: scroll spy, navigation, and the
//! contact and collaboration form submission state machines.

use std::sync::Arc;

use shared::domain::FormKind;
use tokio::sync::broadcast;
use tracing::info;

pub mod api;
pub mod config;
pub mod events;
pub mod form_store;
pub mod layout;
pub mod navigation;
pub mod scroll;
pub mod status;
pub mod submission;

pub use api::{ApiFailure, HttpLeadApi, LeadApi, SubmissionReceipt};
pub use config::{load_settings, Settings};
pub use events::{ScrollEvent, SiteEvent};
pub use form_store::FormStore;
pub use layout::{Rect, ScrollBehavior, SectionLayout, StackedLayout};
pub use navigation::{NavLink, NavigationController};
pub use scroll::ScrollObserver;
pub use status::{StatusKind, SubmissionStatus};
pub use submission::{SubmissionController, SubmitError, SubmitOutcome};

pub struct SiteController {
    settings: Settings,
    events: broadcast::Sender<SiteEvent>,
    scroll: Arc<ScrollObserver>,
    navigation: NavigationController,
    contact: Arc<SubmissionController>,
    collaboration: Arc<SubmissionController>,
}

impl SiteController {
    pub fn new(
        settings: Settings,
        layout: Arc<dyn SectionLayout>,
        api: Arc<dyn LeadApi>,
    ) -> Self {
        let (events, _) = events::event_channel();
        let scroll = ScrollObserver::new(
            Arc::clone(&layout),
            settings.scroll_reference_offset,
            events.clone(),
        );
        let navigation = NavigationController::new(layout, scroll.subscribe(), events.clone());
        let contact = SubmissionController::new(
            FormKind::Contact,
            Arc::clone(&api),
            settings.status_clear_delay,
            events.clone(),
        );
        let collaboration = SubmissionController::new(
            FormKind::Collaboration,
            api,
            settings.status_clear_delay,
            events.clone(),
        );

        Self {
            settings,
            events,
            scroll,
            navigation,
            contact,
            collaboration,
        }
    }

    pub fn connect(settings: Settings, layout: Arc<dyn SectionLayout>) -> Result<Self, ApiFailure> {
        let api = HttpLeadApi::from_settings(&settings)?;
        Ok(Self::new(settings, layout, Arc::new(api)))
    }

    pub fn start(&self, scroll_events: broadcast::Receiver<ScrollEvent>) -> bool {
        let started = self.scroll.start(scroll_events);
        if started {
            info!(backend_url = %self.settings.backend_url, "site: shell started");
        }
        started
    }

    /// Detaches the scroll observer, drops in-flight submissions and pending
    /// status timers, and closes the mobile panel.
    pub async fn shutdown(&self) {
        self.scroll.stop();
        self.contact.abandon().await;
        self.collaboration.abandon().await;
        self.navigation.close_mobile_menu();
        info!("site: shell stopped");
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scroll(&self) -> &Arc<ScrollObserver> {
        &self.scroll
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn form(&self, kind: FormKind) -> &Arc<SubmissionController> {
        match kind {
            FormKind::Contact => &self.contact,
            FormKind::Collaboration => &self.collaboration,
        }
    }

    pub fn contact(&self) -> &Arc<SubmissionController> {
        &self.contact
    }

    pub fn collaboration(&self) -> &Arc<SubmissionController> {
        &self.collaboration
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SiteEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
