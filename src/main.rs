/// Headless Placemark demo for native builds.
///
/// Plays one scripted session against the in-memory map and dialogs:
/// annotate, save, edit, delete. Pass an image path to upload it as the
/// first location's logo.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::rc::Rc;

    use placemark::controller::{AnnotationEvent, MapAnnotationController};
    use placemark::dialog::DialogConfig;
    use placemark::form::{AlertSink, FormDialog};
    use placemark::headless::{HeadlessDialogs, HeadlessMap, OpenedDialog, RecordingAlerts};
    use placemark::map::MapEvent;
    use placemark::model::{Coordinates, LocationType};
    use placemark::popup::PopupAction;
    use placemark::validation::{FileBlob, FileValidationPipeline, ImageCrateDecoder, LocalReader};
    use placemark::AppConfig;

    let config_path = AppConfig::default_path();
    let (config, first_run) = match &config_path {
        Some(path) => AppConfig::load_or_default(path),
        None => (AppConfig::default(), false),
    };
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let alerts = Rc::new(RecordingAlerts::default());
    let host = |opened: OpenedDialog, config: &AppConfig| -> (DialogConfig, FormDialog<LocalReader, ImageCrateDecoder>) {
        let sink: Rc<dyn AlertSink> = alerts.clone();
        let pipeline = FileValidationPipeline::new(LocalReader, ImageCrateDecoder).with_limits(config.logo);
        (
            opened.config.clone(),
            FormDialog::new(opened.config, opened.closer, pipeline, sink),
        )
    };

    let dialogs = HeadlessDialogs::new();
    let mut controller = MapAnnotationController::new(dialogs.clone(), config.controller_settings());
    if let Err(e) = controller.handle_event(MapEvent::Ready(HeadlessMap::from_config(&config.map))) {
        eprintln!("Map failed to start: {}", e);
        return;
    }

    // Double-click near the map center
    let at = Coordinates::new(config.map.center.lat + 0.001, config.map.center.lon - 0.002);
    if let Err(e) = controller.handle_event(MapEvent::AnnotateTrigger(at)) {
        eprintln!("Annotate failed: {}", e);
        return;
    }
    let Some(opened) = dialogs.take_next() else {
        eprintln!("No dialog was opened");
        return;
    };
    let (_, mut dialog) = host(opened, &config);
    dialog.form_mut().set_name("Corner Cafe");
    dialog.form_mut().set_location_type(Some(LocationType::Business));

    if let Some(path) = std::env::args().nth(1) {
        match FileBlob::from_path(&path) {
            Ok(blob) => {
                let outcome = pollster::block_on(dialog.form_mut().upload_logo(vec![blob]));
                match outcome {
                    Some(outcome) if outcome.is_accepted() => println!("Logo {} accepted", path),
                    Some(_) => println!("Logo {} rejected", path),
                    None => println!("Logo upload of {} was abandoned", path),
                }
            }
            Err(e) => eprintln!("Could not open {}: {}", path, e),
        }
    }

    if let Err(e) = dialog.save() {
        eprintln!("Could not save: {}", e);
        return;
    }
    controller.poll_sessions();

    let created = controller.drain_events().into_iter().find_map(|event| match event {
        AnnotationEvent::MarkerCreated(id) => Some(id),
        _ => None,
    });
    let Some(id) = created else {
        eprintln!("No marker was created");
        return;
    };

    if let Some(overlay) = controller.map().and_then(|map| map.overlay_for(id)) {
        println!("{} at {}", id, overlay.coordinates);
        println!("glyph: {}", overlay.glyph.html());
        println!("popup: {}", overlay.popup.to_html());
    }

    // Open the edit dialog from the popup, then cancel it
    if let Err(e) = controller.handle_popup_action(PopupAction::Edit(id)) {
        eprintln!("Edit failed: {}", e);
    }
    if let Some(opened) = dialogs.take_next() {
        let (edit_config, mut dialog) = host(opened, &config);
        println!(
            "edit dialog {} wide, seeded with {:?}",
            edit_config.width,
            dialog.form().name()
        );
        dialog.cancel();
    }
    controller.poll_sessions();

    if let Err(e) = controller.handle_popup_action(PopupAction::Delete(id)) {
        eprintln!("Delete failed: {}", e);
    }

    for event in controller.drain_events() {
        println!("event: {:?}", event);
    }
    for message in alerts.messages() {
        println!("alert: {}", message);
    }

    controller.teardown();

    if let Some(path) = config_path.filter(|_| first_run) {
        match config.save_to(&path) {
            Ok(()) => println!("Wrote default configuration to {}", path.display()),
            Err(e) => eprintln!("Could not write default config: {}", e),
        }
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
