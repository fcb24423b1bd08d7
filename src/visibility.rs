use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::events::{self, emit_payload, EventSink};

/// How long the pointer has to stay away before on-screen controls hide.
const HIDE_DELAY: Duration = Duration::from_secs(3);

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct VisibilityChangedEvent {
    show_controls: bool,
}

/// Shows controls as soon as the pointer moves, hides them three seconds
/// after it leaves. A pending hide is cancelled by new activity.
#[derive(Clone)]
pub struct ControlsVisibility {
    visible: Arc<Mutex<bool>>,
    hide_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    events: Arc<dyn EventSink>,
    hide_delay: Duration,
}

impl ControlsVisibility {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            visible: Arc::new(Mutex::new(false)),
            hide_task: Arc::new(Mutex::new(None)),
            events,
            hide_delay: HIDE_DELAY,
        }
    }

    pub async fn is_visible(&self) -> bool {
        *self.visible.lock().await
    }

    pub async fn pointer_activity(&self) {
        if let Some(handle) = self.hide_task.lock().await.take() {
            handle.abort();
        }

        let mut visible = self.visible.lock().await;
        if !*visible {
            *visible = true;
            emit_payload(
                self.events.as_ref(),
                events::CONTROLS_VISIBILITY_CHANGED,
                &VisibilityChangedEvent {
                    show_controls: true,
                },
            );
        }
    }

    pub async fn pointer_idle(&self) {
        let mut guard = self.hide_task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let visible = self.visible.clone();
        let events = self.events.clone();
        let hide_delay = self.hide_delay;
        let handle = tokio::spawn(async move {
            time::sleep(hide_delay).await;
            let mut visible = visible.lock().await;
            if *visible {
                *visible = false;
                emit_payload(
                    events.as_ref(),
                    events::CONTROLS_VISIBILITY_CHANGED,
                    &VisibilityChangedEvent {
                        show_controls: false,
                    },
                );
            }
        });

        *guard = Some(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testing::RecordingSink;

    fn tracker() -> (ControlsVisibility, Arc<RecordingSink>) {
        let sink = RecordingSink::new();
        let events: Arc<dyn EventSink> = sink.clone();
        (ControlsVisibility::new(events), sink)
    }

    async fn advance(duration: Duration) {
        tokio::task::yield_now().await;
        time::advance(duration).await;
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn controls_hide_exactly_three_seconds_after_idle() {
        let (tracker, _sink) = tracker();
        tracker.pointer_activity().await;
        assert!(tracker.is_visible().await);

        tracker.pointer_idle().await;
        advance(Duration::from_millis(2_999)).await;
        assert!(tracker.is_visible().await);

        advance(Duration::from_millis(1)).await;
        assert!(!tracker.is_visible().await);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_cancels_a_pending_hide() {
        let (tracker, _sink) = tracker();
        tracker.pointer_activity().await;
        tracker.pointer_idle().await;

        advance(Duration::from_secs(2)).await;
        tracker.pointer_activity().await;

        // The first three-second window no longer applies.
        advance(Duration::from_secs(2)).await;
        assert!(tracker.is_visible().await);

        // A new idle start opens a fresh window.
        tracker.pointer_idle().await;
        advance(Duration::from_secs(3)).await;
        assert!(!tracker.is_visible().await);
    }

    #[tokio::test(start_paused = true)]
    async fn visibility_changes_are_emitted_once_per_transition() {
        let (tracker, sink) = tracker();
        tracker.pointer_activity().await;
        tracker.pointer_activity().await;
        tracker.pointer_idle().await;
        advance(Duration::from_secs(3)).await;

        let changes = sink.events_named(events::CONTROLS_VISIBILITY_CHANGED);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0]["showControls"], true);
        assert_eq!(changes[1]["showControls"], false);
    }
}
