use masonry_dom::{Document, LayoutEvent, LayoutHost, LayoutSubscriber as _, NodeKey};
use masonry_layout::{LayoutConfig, WaterfallInjector, WaterfallProps};
use tokio::sync::mpsc;

struct Gallery {
    doc: Document,
    events: mpsc::UnboundedReceiver<LayoutEvent>,
    container: NodeKey,
    images: Vec<NodeKey>,
}

/// A 610px gallery of three cards: two with pending 2:1 images, one 40px text card.
fn gallery() -> Gallery {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, events) = Document::with_channel();
    let container = doc.append_element(NodeKey::ROOT, "section").unwrap();
    doc.resize(container, 610.0).unwrap();

    let mut images = Vec::new();
    for _ in 0..2 {
        let card = doc.append_element(container, "figure").unwrap();
        images.push(doc.append_image(card, 400.0, 200.0, false).unwrap());
    }
    let text = doc.append_element(container, "p").unwrap();
    doc.set_height(text, Some(40.0)).unwrap();

    Gallery {
        doc,
        events,
        container,
        images,
    }
}

fn injector() -> WaterfallInjector {
    WaterfallInjector::new(LayoutConfig::new(&[800.0, 0.0], &[3, 2], 10.0))
}

#[test]
fn attach_listens_for_pending_images() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);

    let state = injector.container(gallery.container).unwrap();
    assert_eq!(state.pending_images(), gallery.images.as_slice());
    for image in &gallery.images {
        assert_eq!(gallery.doc.load_listener(*image), Some(gallery.container));
    }
    // Unloaded figures are zero-height but still add a gap to their column.
    assert_eq!(gallery.doc.style(gallery.container, "height"), Some("60px"));
}

#[test]
fn image_loads_trigger_one_coalesced_reflow() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);

    for image in gallery.images.clone() {
        gallery.doc.complete_image(image).unwrap();
    }
    let reflowed = injector.pump(&mut gallery.doc, &mut gallery.events).unwrap();
    assert_eq!(reflowed, 1);

    let state = injector.container(gallery.container).unwrap();
    assert!(state.pending_images().is_empty());
    assert_eq!(state.reflow_count(), 2);
    let outcome = state.last_outcome().unwrap();
    assert_eq!(outcome.column_heights, vec![210.0, 160.0]);
    assert_eq!(gallery.doc.style(gallery.container, "height"), Some("210px"));
}

#[test]
fn resize_across_breakpoint_changes_columns() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);

    gallery.doc.resize(gallery.container, 920.0).unwrap();
    gallery.doc.resize(gallery.container, 930.0).unwrap();
    assert_eq!(injector.pump(&mut gallery.doc, &mut gallery.events).unwrap(), 1);

    let outcome = injector
        .container(gallery.container)
        .and_then(|state| state.last_outcome())
        .unwrap();
    assert_eq!(outcome.column_count, 3);
    assert!((outcome.item_width - 303.333_33).abs() < 0.01);
}

#[test]
fn nothing_pending_means_no_reflow() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);
    assert_eq!(injector.pump(&mut gallery.doc, &mut gallery.events).unwrap(), 0);
}

#[test]
fn detach_disconnects_observers_and_listeners() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);
    injector.detach(&mut gallery.doc);

    assert!(injector.attached().is_empty());
    assert!(!gallery.doc.is_observed(gallery.container));
    for image in &gallery.images {
        assert_eq!(gallery.doc.load_listener(*image), None);
    }

    gallery.doc.resize(gallery.container, 300.0).unwrap();
    assert_eq!(injector.pump(&mut gallery.doc, &mut gallery.events).unwrap(), 0);
    // Styles from the earlier pass stay in place.
    assert_eq!(gallery.doc.style(gallery.container, "position"), Some("relative"));
}

#[test]
fn disabling_disconnects_and_enabling_relays() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);

    injector.set_enabled(&mut gallery.doc, false);
    assert!(!gallery.doc.is_observed(gallery.container));
    assert!(injector.container(gallery.container).is_none());
    assert_eq!(injector.attached(), &[gallery.container]);

    for image in gallery.images.clone() {
        gallery.doc.complete_image(image).unwrap();
    }
    assert_eq!(injector.pump(&mut gallery.doc, &mut gallery.events).unwrap(), 0);

    injector.set_enabled(&mut gallery.doc, true);
    assert!(gallery.doc.is_observed(gallery.container));
    assert_eq!(gallery.doc.style(gallery.container, "height"), Some("210px"));
}

#[test]
fn new_config_reflows_immediately() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);

    injector.set_config(&mut gallery.doc, LayoutConfig::new(&[0.0], &[1], 0.0));
    let outcome = injector
        .container(gallery.container)
        .and_then(|state| state.last_outcome())
        .unwrap();
    assert_eq!(outcome.column_count, 1);
    assert_eq!(gallery.doc.width(gallery.images[0]), Some(610.0));
}

#[test]
fn removed_container_is_forgotten_on_frame() {
    let mut gallery = gallery();
    let mut injector = injector();
    injector.attach(&mut gallery.doc, &[gallery.container]);

    gallery.doc.resize(gallery.container, 700.0).unwrap();
    gallery.doc.remove(gallery.container).unwrap();
    assert_eq!(injector.pump(&mut gallery.doc, &mut gallery.events).unwrap(), 0);
    assert!(injector.container(gallery.container).is_none());
    assert!(injector.attached().is_empty());
    assert!(!injector.is_pending(gallery.container));
    assert!(!gallery.doc.contains(gallery.container));

    // A later event for the same key is ignored.
    injector
        .handle_event(LayoutEvent::Resized {
            node: gallery.container,
        })
        .unwrap();
    assert_eq!(injector.run_frame(&mut gallery.doc), 0);
}

#[test]
fn props_drive_a_disabled_injector() {
    let mut gallery = gallery();
    let props = WaterfallProps::from_json(r#"{"isActive": false, "gap": 12}"#).unwrap();
    let mut injector = props.build_injector();

    assert_eq!(injector.attach(&mut gallery.doc, &[gallery.container]), 0);
    assert_eq!(gallery.doc.style(gallery.container, "height"), None);
}
