// Podium video player: playback sessions over a platform media engine

mod config;
mod pip;
mod registry;
mod session;

#[cfg(test)]
mod testing;

pub use config::{SessionConfig, VideoPlayerOptions};
pub use pip::PipController;
pub use registry::PlayerRegistry;
pub use session::{PlayerSession, SessionResources};

// Re-export core types so hosts only depend on this crate
pub use podium_video_core::*;

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize logging for the platform. Safe to call more than once.
pub fn init_logging() {
    INIT_LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(log::LevelFilter::Debug)
                    .with_tag("PodiumVideoPlayer"),
            );
        }

        #[cfg(not(target_os = "android"))]
        {
            let _ = env_logger::builder()
                .is_test(false)
                .filter_level(log::LevelFilter::Info)
                .try_init();
        }
    });
}

/// Create a standalone session outside any registry
pub fn create_session(config: SessionConfig, resources: SessionResources) -> Result<PlayerSession> {
    init_logging();
    log::info!("Creating video player for {}", config.data_source);
    PlayerSession::new(config, resources)
}
