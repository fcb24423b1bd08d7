use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use log::info;
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};
use uuid::Uuid;

use crate::{
    events::{self, emit_payload, EventSink, Toast},
    settings::SettingsStore,
};

use super::{
    format_countdown, BreakLength, FocusMode, SessionTimer, TickOutcome, DISCONNECTION_SECS,
    POMODORO_SECS,
};

/// How long the movement feedback flag stays up after the last detected
/// pointer/keyboard event.
const MOVEMENT_FLASH: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FocusSnapshot {
    pub mode: FocusMode,
    pub session_id: Option<String>,
    pub duration_secs: u32,
    pub remaining_secs: u32,
    pub progress_percent: f64,
    pub is_active: bool,
    pub display_time: String,
    pub break_length: Option<BreakLength>,
    pub has_recent_movement: bool,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct SessionCompletedEvent {
    session_id: String,
    mode: FocusMode,
}

#[derive(Default)]
struct FocusState {
    mode: FocusMode,
    session_id: Option<String>,
    timer: Option<SessionTimer>,
    break_length: Option<BreakLength>,
    has_recent_movement: bool,
}

impl FocusState {
    fn snapshot(&self) -> FocusSnapshot {
        match &self.timer {
            Some(timer) => FocusSnapshot {
                mode: self.mode,
                session_id: self.session_id.clone(),
                duration_secs: timer.duration_secs,
                remaining_secs: timer.remaining_secs,
                progress_percent: timer.progress_percent(),
                is_active: timer.is_active,
                display_time: format_countdown(timer.remaining_secs),
                break_length: self.break_length,
                has_recent_movement: self.has_recent_movement,
            },
            None => FocusSnapshot {
                mode: self.mode,
                session_id: None,
                duration_secs: 0,
                remaining_secs: 0,
                progress_percent: 0.0,
                is_active: false,
                display_time: format_countdown(0),
                break_length: None,
                has_recent_movement: false,
            },
        }
    }

    fn begin(&mut self, mode: FocusMode, duration_secs: u32) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.mode = mode;
        self.session_id = Some(session_id.clone());
        self.timer = Some(SessionTimer::new(duration_secs, true));
        self.break_length = None;
        self.has_recent_movement = false;
        session_id
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The Idle / Pomodoro / Break / Disconnection state machine. Owns the single
/// active `SessionTimer` and the one-second ticker task driving it.
#[derive(Clone)]
pub struct FocusController {
    state: Arc<Mutex<FocusState>>,
    settings: Arc<SettingsStore>,
    events: Arc<dyn EventSink>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    movement_flash: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl FocusController {
    pub fn new(settings: Arc<SettingsStore>, events: Arc<dyn EventSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FocusState::default())),
            settings,
            events,
            ticker: Arc::new(Mutex::new(None)),
            movement_flash: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    pub async fn snapshot(&self) -> FocusSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Start a fresh 25-minute pomodoro from Idle. Rejected with a toast (no
    /// error, no transition) when the task note is empty.
    pub async fn start_pomodoro(&self) -> Result<FocusSnapshot> {
        let session_id = {
            let mut state = self.state.lock().await;
            if state.mode != FocusMode::Idle {
                return Err(anyhow!("a focus session is already active"));
            }
            if !self.has_task() {
                return Ok(state.snapshot());
            }
            state.begin(FocusMode::Pomodoro, POMODORO_SECS)
        };

        self.spawn_ticker().await;
        self.events.toast(Toast::info(
            "Pomodoro Started",
            "25 minutes of focus time. You can do it!",
        ));
        info!("Pomodoro session {} started", session_id);
        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    /// Start the 2-minute stillness challenge from Idle. Movement reports are
    /// only honored while this mode is active.
    pub async fn start_disconnection(&self) -> Result<FocusSnapshot> {
        let session_id = {
            let mut state = self.state.lock().await;
            if state.mode != FocusMode::Idle {
                return Err(anyhow!("a focus session is already active"));
            }
            if !self.has_task() {
                return Ok(state.snapshot());
            }
            state.begin(FocusMode::Disconnection, DISCONNECTION_SECS)
        };

        self.spawn_ticker().await;
        self.events.toast(Toast::info(
            "Disconnection Mode",
            "Stay still and relax. Any movement will reset the timer.",
        ));
        info!("Disconnection session {} started", session_id);
        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    /// Switch the running pomodoro (or break) to a short/long break without
    /// passing through Idle.
    pub async fn choose_break(&self, length: BreakLength) -> Result<FocusSnapshot> {
        {
            let mut state = self.state.lock().await;
            if !matches!(state.mode, FocusMode::Pomodoro | FocusMode::Break) {
                return Err(anyhow!("no pomodoro in progress to break from"));
            }
            let timer = state
                .timer
                .as_mut()
                .ok_or_else(|| anyhow!("missing session timer"))?;
            timer.reset(length.secs());
            timer.start();
            state.mode = FocusMode::Break;
            state.break_length = Some(length);
        }

        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    /// The "25m" control: a fresh pomodoro under a fresh session id, without
    /// passing through Idle. The running ticker carries over.
    pub async fn restart_pomodoro(&self) -> Result<FocusSnapshot> {
        let session_id = {
            let mut state = self.state.lock().await;
            if !matches!(state.mode, FocusMode::Pomodoro | FocusMode::Break) {
                return Err(anyhow!("no pomodoro in progress to restart"));
            }
            state.begin(FocusMode::Pomodoro, POMODORO_SECS)
        };

        self.events.toast(Toast::info(
            "Pomodoro Started",
            "25 minutes of focus time. You can do it!",
        ));
        info!("Pomodoro session {} started", session_id);
        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    pub async fn toggle_timer(&self) -> Result<FocusSnapshot> {
        {
            let mut state = self.state.lock().await;
            let timer = state
                .timer
                .as_mut()
                .ok_or_else(|| anyhow!("no focus session to toggle"))?;
            timer.toggle();
        }

        self.emit_state_changed().await;
        Ok(self.snapshot().await)
    }

    /// Abandon the current session. Always lands in Idle; no toast.
    pub async fn cancel(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.mode == FocusMode::Idle {
                return Ok(());
            }
            if let Some(session_id) = &state.session_id {
                info!("Focus session {} cancelled", session_id);
            }
            state.clear();
        }

        self.cancel_ticker().await;
        self.cancel_movement_flash().await;
        self.emit_state_changed().await;
        Ok(())
    }

    /// Pointer/keyboard activity reported by the webview. Inside Disconnection
    /// mode this rewinds the countdown to full and raises the movement flag
    /// for one second; everywhere else it is a no-op.
    pub async fn report_movement(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.mode != FocusMode::Disconnection {
                return Ok(());
            }
            let timer = state
                .timer
                .as_mut()
                .ok_or_else(|| anyhow!("missing session timer"))?;
            timer.reset(DISCONNECTION_SECS);
            timer.start();
            state.has_recent_movement = true;
        }

        self.emit_state_changed().await;
        self.arm_movement_flash().await;
        Ok(())
    }

    fn has_task(&self) -> bool {
        if self.settings.task().trim().is_empty() {
            self.events.toast(Toast::error(
                "Task Missing",
                "Please enter what you'll be focusing on first.",
            ));
            return false;
        }
        true
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let events = self.events.clone();
        let movement_flash = self.movement_flash.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The first tick of a tokio interval resolves immediately; the
            // countdown starts one full interval later.
            interval.tick().await;
            loop {
                interval.tick().await;

                enum Effect {
                    Tick(FocusSnapshot),
                    Finish {
                        mode: FocusMode,
                        session_id: Option<String>,
                        snapshot: FocusSnapshot,
                    },
                }

                let effect = {
                    let mut guard = state.lock().await;
                    if guard.mode == FocusMode::Idle {
                        break;
                    }
                    let Some(timer) = guard.timer.as_mut() else {
                        break;
                    };
                    match timer.tick() {
                        TickOutcome::Skipped => None,
                        TickOutcome::Ticked => Some(Effect::Tick(guard.snapshot())),
                        TickOutcome::Completed => {
                            let mode = guard.mode;
                            let session_id = guard.session_id.clone();
                            guard.clear();
                            Some(Effect::Finish {
                                mode,
                                session_id,
                                snapshot: guard.snapshot(),
                            })
                        }
                    }
                };

                match effect {
                    None => {}
                    Some(Effect::Tick(snapshot)) => {
                        emit_payload(events.as_ref(), events::TIMER_TICK, &snapshot);
                    }
                    Some(Effect::Finish {
                        mode,
                        session_id,
                        snapshot,
                    }) => {
                        if let Some(flash) = movement_flash.lock().await.take() {
                            flash.abort();
                        }

                        let toast = if mode == FocusMode::Break {
                            Toast::info(
                                "Break Over",
                                "Break finished. Ready for another round of focus?",
                            )
                        } else {
                            Toast::info(
                                "Good Job!",
                                "Focus session completed. Take a well-deserved break.",
                            )
                        };
                        events.toast(toast);
                        emit_payload(events.as_ref(), events::FOCUS_STATE_CHANGED, &snapshot);

                        if let Some(session_id) = session_id {
                            info!("Focus session {} completed", session_id);
                            emit_payload(
                                events.as_ref(),
                                events::SESSION_COMPLETED,
                                &SessionCompletedEvent { session_id, mode },
                            );
                        }
                        break;
                    }
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn cancel_movement_flash(&self) {
        if let Some(handle) = self.movement_flash.lock().await.take() {
            handle.abort();
        }
    }

    /// (Re)arm the one-second task that lowers `has_recent_movement`.
    async fn arm_movement_flash(&self) {
        let mut guard = self.movement_flash.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            time::sleep(MOVEMENT_FLASH).await;
            let snapshot = {
                let mut guard = state.lock().await;
                if guard.mode != FocusMode::Disconnection || !guard.has_recent_movement {
                    return;
                }
                guard.has_recent_movement = false;
                guard.snapshot()
            };
            emit_payload(events.as_ref(), events::FOCUS_STATE_CHANGED, &snapshot);
        });

        *guard = Some(handle);
    }

    async fn emit_state_changed(&self) {
        let snapshot = self.snapshot().await;
        emit_payload(self.events.as_ref(), events::FOCUS_STATE_CHANGED, &snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testing::RecordingSink;
    use crate::timer::SHORT_BREAK_SECS;
    use tempfile::TempDir;

    struct Harness {
        controller: FocusController,
        sink: Arc<RecordingSink>,
        settings: Arc<SettingsStore>,
        _dir: TempDir,
    }

    fn harness() -> Harness {
        let dir = TempDir::new().expect("temp dir");
        let settings =
            Arc::new(SettingsStore::new(dir.path().join("settings.json")).expect("settings"));
        let sink = RecordingSink::new();
        let events: Arc<dyn EventSink> = sink.clone();
        let controller = FocusController::new(settings.clone(), events);
        Harness {
            controller,
            sink,
            settings,
            _dir: dir,
        }
    }

    /// Step simulated time one second at a time so every interval tick is
    /// observed by the ticker task before the next one fires.
    async fn advance_secs(n: u32) {
        for _ in 0..n {
            tokio::task::yield_now().await;
            time::advance(Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_task_rejects_pomodoro_start() {
        let h = harness();
        let snapshot = h.controller.start_pomodoro().await.expect("start");
        assert_eq!(snapshot.mode, FocusMode::Idle);

        let toasts = h.sink.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "Task Missing");
        assert!(toasts[0].is_error);
    }

    #[tokio::test(start_paused = true)]
    async fn pomodoro_runs_down_and_completes() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");

        let snapshot = h.controller.start_pomodoro().await.expect("start");
        assert_eq!(snapshot.mode, FocusMode::Pomodoro);
        assert_eq!(snapshot.remaining_secs, POMODORO_SECS);
        assert_eq!(snapshot.display_time, "25:00");
        assert_eq!(h.sink.toasts()[0].title, "Pomodoro Started");

        advance_secs(1).await;
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.remaining_secs, POMODORO_SECS - 1);
        assert_eq!(snapshot.display_time, "24:59");

        advance_secs(POMODORO_SECS - 1).await;
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.mode, FocusMode::Idle);
        assert!(snapshot.session_id.is_none());

        let toasts = h.sink.toasts();
        assert_eq!(toasts.last().unwrap().title, "Good Job!");
        assert_eq!(h.sink.events_named(events::SESSION_COMPLETED).len(), 1);

        // The ticker is gone: more time produces no further ticks.
        let ticks = h.sink.events_named(events::TIMER_TICK).len();
        advance_secs(5).await;
        assert_eq!(h.sink.events_named(events::TIMER_TICK).len(), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn break_switch_resets_without_passing_through_idle() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        advance_secs(10).await;

        let snapshot = h
            .controller
            .choose_break(BreakLength::Short)
            .await
            .expect("break");
        assert_eq!(snapshot.mode, FocusMode::Break);
        assert_eq!(snapshot.remaining_secs, SHORT_BREAK_SECS);
        assert_eq!(snapshot.display_time, "05:00");
        assert!((snapshot.progress_percent - 100.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.break_length, Some(BreakLength::Short));

        // Break countdown keeps running on the same ticker.
        advance_secs(2).await;
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.remaining_secs, SHORT_BREAK_SECS - 2);
    }

    #[tokio::test(start_paused = true)]
    async fn break_completion_announces_break_over() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        h.controller
            .choose_break(BreakLength::Short)
            .await
            .expect("break");

        advance_secs(SHORT_BREAK_SECS).await;
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.mode, FocusMode::Idle);
        assert_eq!(h.sink.toasts().last().unwrap().title, "Break Over");
    }

    #[tokio::test(start_paused = true)]
    async fn restart_clears_break_memory_and_reannounces() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        let first = h.controller.start_pomodoro().await.expect("start");
        h.controller
            .choose_break(BreakLength::Long)
            .await
            .expect("break");

        let snapshot = h.controller.restart_pomodoro().await.expect("restart");
        assert_eq!(snapshot.mode, FocusMode::Pomodoro);
        assert_eq!(snapshot.remaining_secs, POMODORO_SECS);
        assert_eq!(snapshot.break_length, None);

        // A restart is a fresh session, not a rewound one.
        assert!(snapshot.session_id.is_some());
        assert_ne!(snapshot.session_id, first.session_id);

        let started = h
            .sink
            .toasts()
            .iter()
            .filter(|t| t.title == "Pomodoro Started")
            .count();
        assert_eq!(started, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restarted_session_completes_under_its_own_id() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        advance_secs(5).await;
        let restarted = h.controller.restart_pomodoro().await.expect("restart");

        advance_secs(POMODORO_SECS).await;
        let completed = h.sink.events_named(events::SESSION_COMPLETED);
        assert_eq!(completed.len(), 1);
        assert_eq!(
            completed[0]["sessionId"].as_str(),
            restarted.session_id.as_deref()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_pauses_and_resumes_the_countdown() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        advance_secs(2).await;

        let snapshot = h.controller.toggle_timer().await.expect("toggle");
        assert!(!snapshot.is_active);
        let frozen = snapshot.remaining_secs;

        advance_secs(5).await;
        assert_eq!(h.controller.snapshot().await.remaining_secs, frozen);

        h.controller.toggle_timer().await.expect("toggle");
        advance_secs(1).await;
        assert_eq!(h.controller.snapshot().await.remaining_secs, frozen - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_the_session_silently() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        advance_secs(3).await;

        let toasts_before = h.sink.toasts().len();
        h.controller.cancel().await.expect("cancel");
        assert_eq!(h.controller.snapshot().await.mode, FocusMode::Idle);
        assert_eq!(h.sink.toasts().len(), toasts_before);
        assert!(h.sink.events_named(events::SESSION_COMPLETED).is_empty());

        // Cancelling again from Idle is a no-op.
        h.controller.cancel().await.expect("cancel idle");

        let ticks = h.sink.events_named(events::TIMER_TICK).len();
        advance_secs(5).await;
        assert_eq!(h.sink.events_named(events::TIMER_TICK).len(), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn movement_rewinds_disconnection_and_flag_clears_after_a_second() {
        let h = harness();
        h.settings.update_task("Sit still".into()).expect("task");
        h.controller.start_disconnection().await.expect("start");
        advance_secs(30).await;
        assert_eq!(
            h.controller.snapshot().await.remaining_secs,
            DISCONNECTION_SECS - 30
        );

        h.controller.report_movement().await.expect("movement");
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.remaining_secs, DISCONNECTION_SECS);
        assert!((snapshot.progress_percent - 100.0).abs() < f64::EPSILON);
        assert!(snapshot.has_recent_movement);

        advance_secs(1).await;
        assert!(!h.controller.snapshot().await.has_recent_movement);
    }

    #[tokio::test(start_paused = true)]
    async fn movement_outside_disconnection_is_a_no_op() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        advance_secs(5).await;

        h.controller.report_movement().await.expect("movement");
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.remaining_secs, POMODORO_SECS - 5);
        assert!(!snapshot.has_recent_movement);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_while_active_is_rejected() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        assert!(h.controller.start_pomodoro().await.is_err());
        assert!(h.controller.start_disconnection().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn active_session_rejection_wins_over_missing_task() {
        let h = harness();
        h.settings.update_task("Write report".into()).expect("task");
        h.controller.start_pomodoro().await.expect("start");
        h.settings.update_task("".into()).expect("clear");

        let toasts_before = h.sink.toasts().len();
        assert!(h.controller.start_pomodoro().await.is_err());
        assert!(h.controller.start_disconnection().await.is_err());

        // No "Task Missing" toast; the session stays untouched.
        assert_eq!(h.sink.toasts().len(), toasts_before);
        assert_eq!(h.controller.snapshot().await.mode, FocusMode::Pomodoro);
    }

    #[tokio::test(start_paused = true)]
    async fn break_controls_require_a_running_session() {
        let h = harness();
        assert!(h.controller.choose_break(BreakLength::Short).await.is_err());
        assert!(h.controller.restart_pomodoro().await.is_err());
        assert!(h.controller.toggle_timer().await.is_err());
    }
}
