use std::sync::{Arc, Mutex, PoisonError};

use shared::domain::SectionId;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, trace};

use crate::{
    events::{ScrollEvent, SiteEvent},
    layout::SectionLayout,
};

pub struct ScrollObserver {
    layout: Arc<dyn SectionLayout>,
    reference_offset: f64,
    active: watch::Sender<SectionId>,
    events: broadcast::Sender<SiteEvent>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ScrollObserver {
    pub fn new(
        layout: Arc<dyn SectionLayout>,
        reference_offset: f64,
        events: broadcast::Sender<SiteEvent>,
    ) -> Arc<Self> {
        let (active, _) = watch::channel(SectionId::default());
        Arc::new(Self {
            layout,
            reference_offset,
            active,
            events,
            listener: Mutex::new(None),
        })
    }

    pub fn active_section(&self) -> SectionId {
        *self.active.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SectionId> {
        self.active.subscribe()
    }

    pub fn reference_offset(&self) -> f64 {
        self.reference_offset
    }

    /// The first section in `SectionId::ALL` order whose rectangle spans the
    /// reference line wins, even if a later section sits higher on screen.
    /// When nothing spans the line the previous section stays active.
    pub fn on_scroll(&self) -> SectionId {
        let matched = SectionId::ALL.iter().copied().find(|section| {
            self.layout
                .bounding_rect(*section)
                .is_some_and(|rect| rect.spans(self.reference_offset))
        });

        let Some(section) = matched else {
            trace!("scroll: no section spans the reference line");
            return self.active_section();
        };

        let changed = self.active.send_if_modified(|current| {
            if *current == section {
                return false;
            }
            *current = section;
            true
        });
        if changed {
            debug!(section = %section, "scroll: active section changed");
            let _ = self.events.send(SiteEvent::ActiveSectionChanged(section));
        }
        section
    }

    /// Runs `on_scroll` for every notification on `scroll_events` until
    /// `stop` is called or the sender side closes. Returns `false` when a
    /// listener is already running.
    pub fn start(self: &Arc<Self>, mut scroll_events: broadcast::Receiver<ScrollEvent>) -> bool {
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if listener.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("scroll: observer already started");
            return false;
        }

        let observer = Arc::downgrade(self);
        *listener = Some(tokio::spawn(async move {
            loop {
                match scroll_events.recv().await {
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        trace!(skipped, "scroll: coalescing lagged notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                let Some(observer) = observer.upgrade() else {
                    break;
                };
                observer.on_scroll();
            }
            debug!("scroll: listener exited");
        }));
        info!(
            reference_offset = self.reference_offset,
            "scroll: observer started"
        );
        true
    }

    pub fn stop(&self) -> bool {
        let task = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match task {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                info!("scroll: observer stopped");
                was_running
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ScrollObserver {
    fn drop(&mut self) {
        if let Some(task) = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/scroll_tests.rs"]
mod tests;
