//! Pointer and keyboard activation of the trigger surface.

use eframe::egui;

use super::TriggerSource;

/// First `Enter` or `Space` press in this frame's events.
///
/// Auto-repeat is accepted; the controller latch makes it harmless.
pub fn key_trigger(events: &[egui::Event]) -> Option<TriggerSource> {
    events.iter().find_map(|event| match event {
        egui::Event::Key {
            key: egui::Key::Enter,
            pressed: true,
            ..
        } => Some(TriggerSource::Enter),
        egui::Event::Key {
            key: egui::Key::Space,
            pressed: true,
            ..
        } => Some(TriggerSource::Space),
        _ => None,
    })
}

/// `Escape` pressed this frame: close the window.
pub fn close_requested(events: &[egui::Event]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            egui::Event::Key {
                key: egui::Key::Escape,
                pressed: true,
                ..
            }
        )
    })
}

/// Click on the full-window surface.
pub fn surface_trigger(response: &egui::Response) -> Option<TriggerSource> {
    response.clicked().then_some(TriggerSource::Pointer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: egui::Key, pressed: bool) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_enter_and_space_trigger() {
        assert_eq!(key_trigger(&[key(egui::Key::Enter, true)]), Some(TriggerSource::Enter));
        assert_eq!(key_trigger(&[key(egui::Key::Space, true)]), Some(TriggerSource::Space));
    }

    #[test]
    fn test_release_and_other_keys_ignored() {
        let events = [
            key(egui::Key::Enter, false),
            key(egui::Key::A, true),
            key(egui::Key::Escape, true),
        ];
        assert_eq!(key_trigger(&events), None);
        assert_eq!(key_trigger(&[]), None);
    }

    #[test]
    fn test_first_qualifying_key_wins() {
        let events = [
            egui::Event::Text(" ".into()),
            key(egui::Key::Space, true),
            key(egui::Key::Enter, true),
        ];
        assert_eq!(key_trigger(&events), Some(TriggerSource::Space));
    }

    #[test]
    fn test_escape_closes_without_triggering() {
        let events = [key(egui::Key::Escape, true)];
        assert!(close_requested(&events));
        assert_eq!(key_trigger(&events), None);
        assert!(!close_requested(&[key(egui::Key::Escape, false), key(egui::Key::Enter, true)]));
    }
}
