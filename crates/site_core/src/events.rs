use shared::domain::{FormKind, SectionId};
use tokio::sync::broadcast;

use crate::status::SubmissionStatus;

pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum SiteEvent {
    ActiveSectionChanged(SectionId),
    MobileMenuToggled(bool),
    SubmissionStatusChanged {
        form: FormKind,
        status: SubmissionStatus,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollEvent;

pub fn event_channel() -> (broadcast::Sender<SiteEvent>, broadcast::Receiver<SiteEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
