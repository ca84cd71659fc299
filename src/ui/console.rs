use crate::logger;
use crate::models::ui_event::UiEvent;
use crate::ui::interface::EventSink;

/// Writes every notification as a JSON line through the logger.
///
/// Countdown ticks and token moves are frequent, so they go out at DEBUG;
/// scores and the final result are logged at INFO.
#[derive(Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for ConsoleUi {
    fn publish(&self, event: UiEvent) {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(error) => {
                logger!(ERROR, "[UI] Unable to serialize {:?} ({error})", event);
                return;
            }
        };

        match event {
            UiEvent::SetScore { .. } | UiEvent::AnnounceWinners { .. } | UiEvent::Dispose => {
                logger!(INFO, "[UI] {json}")
            }
            _ => logger!(DEBUG, "[UI] {json}"),
        }
    }
}
