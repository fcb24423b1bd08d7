use tauri::State;

use crate::timer::{BreakLength, FocusController, FocusSnapshot};
use crate::AppState;

fn controller_from_state(state: &State<'_, AppState>) -> FocusController {
    state.focus.clone()
}

#[tauri::command]
pub async fn get_focus_state(state: State<'_, AppState>) -> Result<FocusSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn start_pomodoro(state: State<'_, AppState>) -> Result<FocusSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.start_pomodoro().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn start_disconnection(state: State<'_, AppState>) -> Result<FocusSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .start_disconnection()
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn choose_break(
    state: State<'_, AppState>,
    length: BreakLength,
) -> Result<FocusSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .choose_break(length)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn restart_pomodoro(state: State<'_, AppState>) -> Result<FocusSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .restart_pomodoro()
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_timer(state: State<'_, AppState>) -> Result<FocusSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.toggle_timer().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn cancel_focus(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.cancel().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn report_movement(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.report_movement().await.map_err(|e| e.to_string())
}
