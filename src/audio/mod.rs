pub mod catalog;
pub mod forest;
pub mod rain;
pub mod waves;

use catalog::SoundOption;

use crate::events::{self, emit_payload, EventSink, Toast};
use log::warn;
use rodio::{OutputStream, Sink};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

pub const DEFAULT_VOLUME: f32 = 0.3;

enum AudioCommand {
    Toggle,
    SetVolume(f32),
    Switch(&'static SoundOption),
    Stop,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioSnapshot {
    pub is_playing: bool,
    pub volume: f32,
    pub current_sound_id: String,
}

pub fn clamp_volume(volume: f32) -> f32 {
    volume.clamp(0.0, 1.0)
}

/// Owner of the single audio output. All playback-affecting operations go
/// through one command channel consumed by a dedicated thread, so they are
/// processed strictly one at a time — a toggle issued while a previous
/// toggle/switch is still settling waits its turn instead of racing it.
pub struct AudioEngineHandle {
    tx: Mutex<Option<Sender<AudioCommand>>>,
    is_playing: Arc<AtomicBool>,
    volume: Mutex<f32>,
    current: Mutex<&'static SoundOption>,
    events: Arc<dyn EventSink>,
}

impl AudioEngineHandle {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            tx: Mutex::new(None),
            is_playing: Arc::new(AtomicBool::new(false)),
            volume: Mutex::new(DEFAULT_VOLUME),
            current: Mutex::new(catalog::default_sound()),
            events,
        }
    }

    pub fn snapshot(&self) -> AudioSnapshot {
        AudioSnapshot {
            is_playing: self.is_playing.load(Ordering::SeqCst),
            volume: *self.volume.lock().unwrap(),
            current_sound_id: self.current.lock().unwrap().id.to_string(),
        }
    }

    /// Pause if playing, otherwise start. `is_playing` flips to true only
    /// once the output has actually begun; a failed start leaves it false and
    /// surfaces an "Audio Issue" toast instead.
    pub fn toggle_playback(&self) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Toggle).map_err(|e| e.to_string())
    }

    /// Out-of-range input is clamped, never rejected. Returns the volume
    /// actually applied.
    pub fn set_volume(&self, volume: f32) -> Result<f32, String> {
        let clamped = clamp_volume(volume);
        *self.volume.lock().map_err(|e| e.to_string())? = clamped;

        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::SetVolume(clamped))
            .map_err(|e| e.to_string())?;
        Ok(clamped)
    }

    /// Select another catalog sound. If something was playing, the new source
    /// starts without a separate toggle. Unknown ids are a no-op.
    pub fn change_sound(&self, id: &str) -> Result<(), String> {
        let Some(option) = catalog::find(id) else {
            warn!("Ignoring unknown sound id {:?}", id);
            return Ok(());
        };

        *self.current.lock().map_err(|e| e.to_string())? = option;

        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Switch(option))
            .map_err(|e| e.to_string())
    }

    pub fn stop(&self) -> Result<(), String> {
        if let Ok(Some(tx)) = self.tx.lock().map(|guard| guard.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
        Ok(())
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let is_playing = Arc::clone(&self.is_playing);
        let events = self.events.clone();
        let initial_volume = *self.volume.lock().map_err(|e| e.to_string())?;
        let initial_sound = *self.current.lock().map_err(|e| e.to_string())?;

        // Dedicated thread holding the non-Send stream and sink.
        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;
                let mut playing = false;
                let mut volume = initial_volume;
                let mut current = initial_sound;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                    sound: &SoundOption,
                    volume: f32,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to open audio output: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        new_sink.set_volume(volume);
                        new_sink.append(catalog::build_source(sound.id));
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                let emit_state =
                    |events: &Arc<dyn EventSink>, playing: bool, volume: f32, sound: &SoundOption| {
                        emit_payload(
                            events.as_ref(),
                            events::AUDIO_STATE_CHANGED,
                            &AudioSnapshot {
                                is_playing: playing,
                                volume,
                                current_sound_id: sound.id.to_string(),
                            },
                        );
                    };

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Toggle => {
                            if playing {
                                if let Some(ref s) = sink {
                                    s.pause();
                                }
                                playing = false;
                                is_playing.store(false, Ordering::SeqCst);
                            } else {
                                match ensure_sink(&mut _stream, &mut sink, current, volume) {
                                    Ok(()) => {
                                        if let Some(ref s) = sink {
                                            s.play();
                                        }
                                        playing = true;
                                        is_playing.store(true, Ordering::SeqCst);
                                    }
                                    Err(err) => {
                                        warn!("Playback failed: {}", err);
                                        is_playing.store(false, Ordering::SeqCst);
                                        events.toast(Toast::error("Audio Issue", &err));
                                    }
                                }
                            }
                            emit_state(&events, playing, volume, current);
                        }
                        AudioCommand::SetVolume(v) => {
                            volume = v;
                            if let Some(ref s) = sink {
                                s.set_volume(v);
                            }
                        }
                        AudioCommand::Switch(option) => {
                            current = option;
                            let was_playing = playing;

                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            playing = false;
                            is_playing.store(false, Ordering::SeqCst);

                            if was_playing {
                                match ensure_sink(&mut _stream, &mut sink, current, volume) {
                                    Ok(()) => {
                                        if let Some(ref s) = sink {
                                            s.play();
                                        }
                                        playing = true;
                                        is_playing.store(true, Ordering::SeqCst);
                                    }
                                    Err(err) => {
                                        warn!("Playback failed after switch: {}", err);
                                        events.toast(Toast::error("Audio Issue", &err));
                                    }
                                }
                            }
                            emit_state(&events, playing, volume, current);
                        }
                        AudioCommand::Stop => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            playing = false;
                            is_playing.store(false, Ordering::SeqCst);
                            emit_state(&events, playing, volume, current);
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }
}
