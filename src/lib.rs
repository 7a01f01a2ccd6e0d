// src/lib.rs
//! Falling-box rigid body simulation.
//!
//! Oriented cuboids fall under gravity onto a floor plane and onto each
//! other. Contacts are found with a bisected time-of-impact search, a corner
//! test against the floor and a separating axis test between boxes, then
//! resolved with averaged impulses (restitution plus Coulomb friction).
//! Settled bodies are frozen until the world is reset.

pub mod app;
pub mod body;
pub mod config;
pub mod contact;
pub mod debug;
pub mod error;
pub mod floor;
pub mod input;
pub mod integrator;
pub mod math;
pub mod resolver;
pub mod sat;
pub mod scene;
pub mod sleep;
pub mod time;
pub mod toi;
pub mod world;

pub use app::{App, FrameReport, LogSink, RenderSink};
pub use body::{BodyId, RigidBody};
pub use config::{Config, FrameConfig, SceneConfig, SimConfig};
pub use contact::{ContactFeature, ContactManifold, ContactPoint};
pub use error::{Error, Result};
pub use input::{InputSnapshot, InputState, RawInput};
pub use scene::{BodyDesc, Scene};
pub use sleep::BodyState;
pub use time::{Clock, SystemClock};
pub use world::{BodyInstance, StepStats, World};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "BOXFALL_CONFIG";

/// Config from `BOXFALL_CONFIG`, or the defaults when it is unset.
pub fn load_config() -> Result<Config> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let config = Config::load(&path)?;
            log::info!("loaded config from {}", std::path::Path::new(&path).display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Headless demo: drop the configured scene and run until it settles or
/// the frame limit is reached.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native() -> Result<()> {
    let config = load_config()?;
    log::info!(
        "dropping {} bodies (seed {}), step {:.4}s",
        config.scene.body_count,
        config.scene.seed,
        config.sim.step_size
    );

    let mut app = App::new(&config, SystemClock::new(), LogSink::new(60))?;
    let frames = app.run_headless();

    let (fps, ms) = app.frame_timer().averaged();
    log::info!(
        "finished after {} frames ({} of {} resting), {:.1} fps / {:.3} ms",
        frames,
        app.world().resting_count(),
        app.world().len(),
        fps,
        ms
    );
    Ok(())
}
