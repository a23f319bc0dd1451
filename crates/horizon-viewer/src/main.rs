use anyhow::Result;

use horizon_engine::device::GpuInit;
use horizon_engine::logging::{init_logging, LoggingConfig};
use horizon_engine::time::fps_title;
use horizon_engine::window::{Runtime, RuntimeConfig};
use horizon_scene::{SceneApp, SceneConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let scene = SceneConfig::from_env();
    log::info!(
        "horizon viewer: {} stars, {} ridge tops; WASD to fly, R to reload shaders, Esc to quit",
        scene.stars.count,
        scene.ridge.tops
    );

    let runtime = RuntimeConfig {
        title: fps_title(0.0),
        ..RuntimeConfig::default()
    };

    let result = Runtime::run(runtime, GpuInit::default(), SceneApp::new(scene));
    if let Err(e) = &result {
        log::error!("horizon viewer stopped: {e:#}");
    }
    result
}
