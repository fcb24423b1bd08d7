use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tauri::{AppHandle, Emitter};

pub const FOCUS_STATE_CHANGED: &str = "focus-state-changed";
pub const TIMER_TICK: &str = "timer-tick";
pub const SESSION_COMPLETED: &str = "session-completed";
pub const CONTROLS_VISIBILITY_CHANGED: &str = "controls-visibility-changed";
pub const AUDIO_STATE_CHANGED: &str = "audio-state-changed";
pub const TOAST: &str = "toast";

/// Transient notification rendered by the frontend as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub is_error: bool,
}

impl Toast {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            is_error: false,
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            is_error: true,
        }
    }
}

/// Outbound port for everything the backend pushes at the webview.
///
/// The controller, audio engine and visibility tracker only ever talk to this
/// trait, so they can run (and be tested) without a window.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: &str, payload: Value);

    fn toast(&self, toast: Toast) {
        match serde_json::to_value(&toast) {
            Ok(payload) => self.emit(TOAST, payload),
            Err(err) => log::error!("Failed to serialize toast payload: {}", err),
        }
    }
}

/// Serialize-and-emit helper; a payload that cannot serialize is a bug worth
/// logging, never worth crashing the ticker over.
pub fn emit_payload<T: serde::Serialize>(sink: &dyn EventSink, event: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.emit(event, value),
        Err(err) => log::error!("Failed to serialize {} payload: {}", event, err),
    }
}

pub struct TauriEventSink {
    app_handle: AppHandle,
}

impl TauriEventSink {
    pub fn new(app_handle: AppHandle) -> Arc<dyn EventSink> {
        Arc::new(Self { app_handle })
    }
}

impl EventSink for TauriEventSink {
    fn emit(&self, event: &str, payload: Value) {
        if let Err(err) = self.app_handle.emit(event, payload) {
            log::error!("Failed to emit {}: {}", event, err);
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every emission so tests can assert on the event stream.
    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingSink {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn toasts(&self) -> Vec<Toast> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(name, _)| name == TOAST)
                .map(|(_, payload)| serde_json::from_value(payload.clone()).unwrap())
                .collect()
        }

        pub fn events_named(&self, name: &str) -> Vec<Value> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(event, _)| event == name)
                .map(|(_, payload)| payload.clone())
                .collect()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &str, payload: Value) {
            self.events.lock().unwrap().push((event.to_string(), payload));
        }
    }
}
