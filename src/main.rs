//! Nutshell entry point
//!
//! Headless demo: loads the config, then lets the autopilot play for a fixed
//! number of frames against the recording renderer.
//!
//! Usage: `nutshell [config.json] [acorn_drop|stealth] [frames]`

use nutshell::platform::KeyboardState;
use nutshell::renderer::RecordingRenderer;
use nutshell::sim::autopilot;
use nutshell::{GameConfig, GameMode, GameSession};

const DEFAULT_CONFIG: &str = "nutshell.json";
const DEFAULT_FRAMES: u64 = 60 * 30;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = args.first().map(String::as_str).unwrap_or(DEFAULT_CONFIG);
    let mut config = GameConfig::load_or_default(config_path);
    if let Some(mode) = args.get(1) {
        match mode.parse::<GameMode>() {
            Ok(mode) => config.mode = mode,
            Err(e) => log::warn!("{e}, keeping {}", config.mode.as_str()),
        }
    }
    let frames = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    log::info!("{} starting ({})", config.title, config.mode.as_str());
    let mut renderer = RecordingRenderer::new().with_textures(config.textures.iter().cloned());
    let mut session = GameSession::new(config);
    let mut input = KeyboardState::new();

    let ran = session.run(&mut input, &mut renderer, Some(frames), autopilot);

    let state = session.state();
    log::info!(
        "Ran {ran} frames: {:?}, level {}, score {}",
        state.phase,
        state.level + 1,
        state.score
    );
    log::info!("Frames presented: {}", renderer.frames_presented());
}
