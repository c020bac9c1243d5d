use std::rc::Rc;

use engine::{FrameKeyError, LoopConfig, SceneKey, SceneMachine};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::assets::build_catalog;
use super::editor::grid::CompiledGrid;
use super::editor::EditorScene;
use super::level::LevelScene;
use super::script::ScriptedInput;

const FRAME_LIMIT_ENV_VAR: &str = "MAKER_FRAME_LIMIT";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error("asset catalog could not be built: {0}")]
    Catalog(#[from] FrameKeyError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scenes: SceneMachine<CompiledGrid>,
    pub(crate) input: ScriptedInput,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Maker Startup ===");

    let library = Rc::new(build_catalog()?);
    let scenes = SceneMachine::new(
        Box::new(EditorScene::new(Rc::clone(&library))),
        Box::new(LevelScene::new(library)),
        SceneKey::Editor,
    );
    let config = LoopConfig {
        frame_limit: parse_frame_limit(std::env::var(FRAME_LIMIT_ENV_VAR).ok().as_deref()),
        ..LoopConfig::default()
    };
    let input = ScriptedInput::demo();
    info!(frames = input.len(), "input_script_ready");

    Ok(AppWiring {
        config,
        scenes,
        input,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Unset or blank means no limit; anything unparsable is reported and ignored.
fn parse_frame_limit(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(limit) => Some(limit),
        Err(err) => {
            warn!(value = raw, error = %err, "frame_limit_ignored");
            None
        }
    }
}
