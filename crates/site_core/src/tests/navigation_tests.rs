use super::*;

use crate::{events::event_channel, layout::StackedLayout, scroll::ScrollObserver};

fn page_without_contact() -> Arc<StackedLayout> {
    Arc::new(StackedLayout::new([
        (SectionId::Home, 800.0),
        (SectionId::Why, 600.0),
        (SectionId::HowItWorks, 700.0),
        (SectionId::Institutions, 500.0),
    ]))
}

fn controller(
    layout: Arc<StackedLayout>,
) -> (
    Arc<ScrollObserver>,
    NavigationController,
    broadcast::Receiver<SiteEvent>,
) {
    let (events, rx) = event_channel();
    let observer = ScrollObserver::new(layout.clone(), 100.0, events.clone());
    let nav = NavigationController::new(layout, observer.subscribe(), events);
    (observer, nav, rx)
}

#[test]
fn scroll_to_section_moves_viewport_and_closes_menu() {
    let layout = page_without_contact();
    let (_observer, nav, _rx) = controller(layout.clone());

    assert!(nav.toggle_mobile_menu());
    assert!(nav.is_mobile_menu_open());

    assert!(nav.scroll_to_section("how-it-works"));
    assert_eq!(layout.scroll_y(), 1400.0);
    assert!(!nav.is_mobile_menu_open());
}

#[test]
fn unknown_or_unmounted_section_is_a_no_op() {
    let layout = page_without_contact();
    let (_observer, nav, _rx) = controller(layout.clone());
    layout.scroll_to(300.0);
    nav.toggle_mobile_menu();

    assert!(!nav.scroll_to_section("pricing"));
    assert!(!nav.scroll_to_section("contact"));

    assert_eq!(layout.scroll_y(), 300.0);
    assert!(nav.is_mobile_menu_open());
}

#[test]
fn links_highlight_the_observed_section() {
    let layout = page_without_contact();
    let (observer, nav, _rx) = controller(layout.clone());

    let links = nav.links();
    assert_eq!(links.len(), SectionId::ALL.len());
    assert_eq!(links[0].label, "Home");
    assert!(links[0].active);
    assert_eq!(links.iter().filter(|link| link.active).count(), 1);

    nav.scroll_to(SectionId::Institutions);
    observer.on_scroll();

    assert!(nav.is_active(SectionId::Institutions));
    let active: Vec<_> = nav
        .links()
        .into_iter()
        .filter(|link| link.active)
        .map(|link| link.label)
        .collect();
    assert_eq!(active, vec!["For Institutions"]);
}

#[test]
fn mobile_menu_toggle_publishes_changes() {
    let (_observer, nav, mut rx) = controller(page_without_contact());
    let menu = nav.subscribe_mobile_menu();

    assert!(nav.toggle_mobile_menu());
    assert!(!nav.toggle_mobile_menu());
    nav.close_mobile_menu();

    assert!(!*menu.borrow());
    assert_eq!(
        rx.try_recv().expect("open event"),
        SiteEvent::MobileMenuToggled(true)
    );
    assert_eq!(
        rx.try_recv().expect("close event"),
        SiteEvent::MobileMenuToggled(false)
    );
    assert!(rx.try_recv().is_err());
}
