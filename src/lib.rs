mod audio;
mod clock;
mod events;
mod settings;
mod timer;
mod visibility;
mod weather;

use std::sync::Arc;

use audio::{catalog::SoundOption, AudioEngineHandle, AudioSnapshot};
use clock::ClockInfo;
use events::TauriEventSink;
use settings::SettingsStore;
use tauri::{Manager, State};
use timer::{
    commands::{
        cancel_focus, choose_break, get_focus_state, report_movement, restart_pomodoro,
        start_disconnection, start_pomodoro, toggle_timer,
    },
    FocusController,
};
use visibility::ControlsVisibility;
use weather::{WeatherData, WeatherService};

pub(crate) struct AppState {
    pub(crate) audio: AudioEngineHandle,
    pub(crate) focus: FocusController,
    pub(crate) settings: Arc<SettingsStore>,
    pub(crate) weather: WeatherService,
    pub(crate) controls: ControlsVisibility,
}

#[tauri::command]
fn toggle_audio_playback(state: State<AppState>) -> Result<(), String> {
    state.audio.toggle_playback()
}

#[tauri::command]
fn set_audio_volume(volume: f32, state: State<AppState>) -> Result<f32, String> {
    state.audio.set_volume(volume)
}

#[tauri::command]
fn change_sound(sound_id: String, state: State<AppState>) -> Result<(), String> {
    state.audio.change_sound(&sound_id)
}

#[tauri::command]
fn get_audio_state(state: State<AppState>) -> Result<AudioSnapshot, String> {
    Ok(state.audio.snapshot())
}

#[tauri::command]
fn list_sounds() -> Vec<SoundOption> {
    audio::catalog::SOUND_OPTIONS.to_vec()
}

#[tauri::command]
fn get_task(state: State<AppState>) -> Result<String, String> {
    Ok(state.settings.task())
}

#[tauri::command]
fn set_task(task: String, state: State<AppState>) -> Result<(), String> {
    state.settings.update_task(task).map_err(|e| e.to_string())
}

#[tauri::command]
fn get_clock() -> ClockInfo {
    clock::current()
}

#[tauri::command]
async fn fetch_weather(
    latitude: f64,
    longitude: f64,
    state: State<'_, AppState>,
) -> Result<WeatherData, String> {
    Ok(state.weather.fetch(latitude, longitude).await)
}

#[tauri::command]
async fn pointer_activity(state: State<'_, AppState>) -> Result<(), String> {
    state.controls.pointer_activity().await;
    Ok(())
}

#[tauri::command]
async fn pointer_idle(state: State<'_, AppState>) -> Result<(), String> {
    state.controls.pointer_idle().await;
    Ok(())
}

#[tauri::command]
async fn get_controls_visible(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.controls.is_visible().await)
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Stillpoint starting up...");

    tauri::Builder::default()
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings = Arc::new(SettingsStore::new(settings_path)?);

                let events = TauriEventSink::new(app.handle().clone());

                app.manage(AppState {
                    audio: AudioEngineHandle::new(events.clone()),
                    focus: FocusController::new(settings.clone(), events.clone()),
                    settings,
                    weather: WeatherService::new(),
                    controls: ControlsVisibility::new(events),
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            toggle_audio_playback,
            set_audio_volume,
            change_sound,
            get_audio_state,
            list_sounds,
            get_task,
            set_task,
            get_clock,
            fetch_weather,
            pointer_activity,
            pointer_idle,
            get_controls_visible,
            get_focus_state,
            start_pomodoro,
            start_disconnection,
            choose_break,
            restart_pomodoro,
            toggle_timer,
            cancel_focus,
            report_movement,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
