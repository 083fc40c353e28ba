//! Tank Battle entry point
//!
//! Headless runner: drives the simulation at a fixed timestep with the
//! autopilot enabled and logs a summary. A renderer front end plugs in
//! through `StageRuntime::draw_list` and the event stream.

use std::time::Instant;

use tank_battle::audio::{self, NullAudio};
use tank_battle::consts::{MAX_SUBSTEPS, SIM_DT};
use tank_battle::format_score;
use tank_battle::settings::Settings;
use tank_battle::sim::{GamePhase, StageRuntime, TickInput, tick};

/// Demo run length in simulated seconds
const DEMO_DURATION: f32 = 120.0;

fn seed_from_env() -> u64 {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TANK_BATTLE_SEED").ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            nanos ^ u64::from(std::process::id())
        })
}

fn main() {
    env_logger::init();

    let settings_path = Settings::default_path();
    let settings = Settings::load(&settings_path);
    let seed = seed_from_env();
    log::info!("Tank Battle (headless) starting, seed {seed}");

    let mut runtime = StageRuntime::new(seed);
    let mut sink = NullAudio;
    audio::apply_settings(&mut sink, &settings);

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut simulated = 0.0f32;
    let mut accumulator = 0.0f32;
    let mut last = Instant::now();
    while simulated < DEMO_DURATION {
        let now = Instant::now();
        accumulator += now.duration_since(last).as_secs_f32();
        last = now;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut runtime, &input, SIM_DT);
            let events = runtime.take_events();
            audio::dispatch(&events, &mut sink);
            accumulator -= SIM_DT;
            simulated += SIM_DT;
            substeps += 1;
        }

        if runtime.phase == GamePhase::Playing && settings.show_fps {
            log::trace!(
                "t={simulated:.1} score={} enemies={} bullets={}",
                runtime.score,
                runtime.live_enemy_count(),
                runtime.bullets.len()
            );
        }

        std::thread::sleep(std::time::Duration::from_micros(500));
    }

    log::info!(
        "demo finished: stage {}, score {}, hi-score {}",
        runtime.stage_index + 1,
        format_score(runtime.score),
        format_score(runtime.hi_score)
    );
    settings.save(&settings_path);
}
