pub mod domain;
pub mod playback_config;
pub mod playback_logger;
pub mod video_player;
