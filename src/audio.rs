//! Event-to-audio dispatch
//!
//! The simulation never touches audio directly; it emits `GameEvent`s and
//! the host drains them through `dispatch` into an `AudioSink`. Themes are
//! long-running loops, effects are one-shots.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sfx {
    /// A tank fired
    Fire,
    /// Tank, tile or bullet explosion
    Explosion,
    /// Power-up collected
    Pickup,
    /// Pause toggled
    Pause,
}

/// Looping or long-form music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Stage intro jingle
    Stage,
    /// Main battle loop, deferred past the intro
    Battle,
    /// Run-over sting
    GameOver,
}

/// Host-implemented audio output
pub trait AudioSink {
    fn play_sfx(&mut self, sfx: Sfx);
    /// Start a theme; `looped` themes replace any current loop
    fn play_theme(&mut self, theme: Theme, looped: bool);
    /// Stop whatever loop is playing
    fn stop_loop(&mut self);
    fn set_sfx_volume(&mut self, volume: f32);
    fn set_music_volume(&mut self, volume: f32);
}

/// Sink that swallows everything; the headless runner's default
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sfx(&mut self, _sfx: Sfx) {}
    fn play_theme(&mut self, _theme: Theme, _looped: bool) {}
    fn stop_loop(&mut self) {}
    fn set_sfx_volume(&mut self, _volume: f32) {}
    fn set_music_volume(&mut self, _volume: f32) {}
}

/// Push current volume settings into the sink
pub fn apply_settings(sink: &mut impl AudioSink, settings: &Settings) {
    sink.set_sfx_volume(settings.effective_sfx_volume());
    sink.set_music_volume(settings.effective_music_volume());
}

/// Map one tick's drained events onto the sink
pub fn dispatch(events: &[GameEvent], sink: &mut impl AudioSink) {
    for event in events {
        match event {
            GameEvent::Fired => sink.play_sfx(Sfx::Fire),
            GameEvent::Explosion | GameEvent::EnemyDestroyed { .. } | GameEvent::PlayerDied { .. } => {
                sink.play_sfx(Sfx::Explosion)
            }
            GameEvent::PowerUpCollected(_) => sink.play_sfx(Sfx::Pickup),
            GameEvent::PauseToggled => sink.play_sfx(Sfx::Pause),
            GameEvent::RunStarted => {
                sink.stop_loop();
                sink.play_theme(Theme::Stage, false);
            }
            GameEvent::BattleThemeDue => sink.play_theme(Theme::Battle, true),
            GameEvent::StageCleared { .. } => {
                sink.stop_loop();
                sink.play_theme(Theme::Stage, false);
            }
            GameEvent::GameOver => {
                sink.stop_loop();
                sink.play_theme(Theme::GameOver, false);
            }
        }
    }
}
