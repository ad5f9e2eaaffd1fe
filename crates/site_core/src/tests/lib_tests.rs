use super::*;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use shared::domain::{FormField, SectionId};

use crate::test_support::{sample_contact_record, spawn_lead_server, TestLeadApi};

fn page() -> Arc<StackedLayout> {
    Arc::new(StackedLayout::new([
        (SectionId::Home, 800.0),
        (SectionId::Why, 600.0),
        (SectionId::HowItWorks, 700.0),
        (SectionId::Institutions, 500.0),
        (SectionId::Contact, 900.0),
    ]))
}

fn settings() -> Settings {
    Settings {
        status_clear_delay: Duration::from_secs(30),
        ..Settings::default()
    }
}

#[tokio::test]
async fn nav_click_updates_active_section_through_scroll_events() {
    let layout = page();
    let site = SiteController::new(settings(), layout.clone(), Arc::new(TestLeadApi::new()));
    let (scroll_tx, scroll_rx) = broadcast::channel(16);
    let mut events = site.subscribe_events();

    assert!(site.start(scroll_rx));
    assert!(!site.start(scroll_tx.subscribe()));

    site.navigation().toggle_mobile_menu();
    assert!(site.navigation().scroll_to_section("contact"));
    scroll_tx.send(ScrollEvent).expect("observer listening");

    let mut seen = Vec::new();
    while !seen.contains(&SiteEvent::ActiveSectionChanged(SectionId::Contact)) {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event in time")
            .expect("event stream open");
        seen.push(event);
    }

    assert_eq!(
        seen[..2],
        [
            SiteEvent::MobileMenuToggled(true),
            SiteEvent::MobileMenuToggled(false),
        ]
    );
    assert!(site.navigation().is_active(SectionId::Contact));
    assert_eq!(site.scroll().active_section(), SectionId::Contact);
}

#[tokio::test]
async fn forms_share_one_event_stream_but_not_state() {
    let (server_url, server) = spawn_lead_server(
        StatusCode::OK,
        json!({"success": true, "message": "Thanks, we'll be in touch."}),
    )
    .await
    .expect("spawn server");
    let site = SiteController::connect(
        Settings {
            backend_url: server_url,
            ..settings()
        },
        page(),
    )
    .expect("connect");
    let mut events = site.subscribe_events();

    for field in FormField::ALL {
        site.contact()
            .form()
            .set_field(*field, sample_contact_record().get(*field));
    }
    site.collaboration()
        .form()
        .set_field(FormField::Email, "partner@abc.edu");

    site.form(FormKind::Contact).submit().await.expect("submit");

    assert!(site.contact().form().snapshot().is_empty());
    assert_eq!(
        site.collaboration().form().snapshot().email,
        "partner@abc.edu"
    );
    assert!(site.collaboration().status().is_idle());

    let mut forms = Vec::new();
    while let Ok(SiteEvent::SubmissionStatusChanged { form, .. }) = events.try_recv() {
        forms.push(form);
    }
    assert_eq!(forms, vec![FormKind::Contact, FormKind::Contact]);
    assert_eq!(server.received.lock().await.len(), 1);
}

#[tokio::test]
async fn shutdown_detaches_observer_and_clears_transient_state() {
    let site = SiteController::new(settings(), page(), Arc::new(TestLeadApi::new()));
    let (_scroll_tx, scroll_rx) = broadcast::channel(16);
    site.start(scroll_rx);

    for field in FormField::ALL {
        site.collaboration()
            .form()
            .set_field(*field, sample_contact_record().get(*field));
    }
    site.collaboration().submit().await.expect("submit");
    assert_eq!(site.collaboration().status().kind, StatusKind::Success);
    site.navigation().toggle_mobile_menu();

    site.shutdown().await;

    assert!(!site.scroll().is_running());
    assert!(site.collaboration().status().is_idle());
    assert!(!site.navigation().is_mobile_menu_open());
}
