pub const DEFAULT_VOLUME: f32 = 1.0;
pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 1.0;

/// Directory under the platform config dir holding `CONFIG_FILE_NAME`.
pub const CONFIG_DIR_NAME: &str = "vidsync";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Fraction of a frame forgiven when flooring a time to a frame index, so
/// float round-off never lands one frame short of an exact boundary.
pub const FRAME_EPSILON: f64 = 1e-6;
