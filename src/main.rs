//! Run a particle-network backdrop in a window.
//!
//! ```text
//! constellation [canvas-id] [config.json]
//! ```

use constellation::{AppError, Backdrop, NetworkConfig};

fn run() -> Result<(), AppError> {
    let mut args = std::env::args().skip(1);
    let canvas_id = args.next().unwrap_or_else(|| "network-canvas".to_string());

    let mut backdrop =
        Backdrop::new(canvas_id.clone()).with_title(format!("constellation - {}", canvas_id));
    if let Some(path) = args.next() {
        let config = NetworkConfig::load(&path)?;
        log::info!("loaded config from {}", path);
        backdrop = backdrop.with_config(config);
    }
    backdrop.run()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
