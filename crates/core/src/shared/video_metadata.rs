use std::path::PathBuf;
use std::time::Duration;

use crate::shared::constants::FRAME_EPSILON;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: u64,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Stream length derived from frame count and rate; zero when the
    /// rate is unknown.
    pub fn duration(&self) -> Duration {
        if self.fps > 0.0 {
            Duration::from_secs_f64(self.total_frames as f64 / self.fps)
        } else {
            Duration::ZERO
        }
    }

    /// Width over height of the decoded frames.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Converts a frame index to its presentation time.
    pub fn frame_to_time(&self, frame: u64) -> Duration {
        if self.fps > 0.0 {
            Duration::from_secs_f64(frame as f64 / self.fps)
        } else {
            Duration::ZERO
        }
    }

    /// Converts a presentation time to the frame shown at that instant.
    pub fn time_to_frame(&self, time: Duration) -> u64 {
        (time.as_secs_f64() * self.fps + FRAME_EPSILON).floor().max(0.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metadata(fps: f64, total_frames: u64) -> VideoMetadata {
        VideoMetadata {
            width: 1920,
            height: 1080,
            fps,
            total_frames,
            codec: "h264".to_string(),
            source_path: Some(PathBuf::from("/tmp/test.mp4")),
        }
    }

    #[test]
    fn test_construction() {
        let meta = metadata(30.0, 900);
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.height, 1080);
        assert_eq!(meta.fps, 30.0);
        assert_eq!(meta.total_frames, 900);
        assert_eq!(meta.codec, "h264");
        assert_eq!(meta.source_path, Some(PathBuf::from("/tmp/test.mp4")));
    }

    #[test]
    fn test_duration() {
        assert_eq!(metadata(30.0, 90).duration(), Duration::from_secs(3));
        assert_eq!(metadata(0.0, 90).duration(), Duration::ZERO);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_relative_eq!(metadata(30.0, 1).aspect_ratio(), 16.0 / 9.0);
    }

    #[test]
    fn test_frame_time_conversions() {
        let meta = metadata(30.0, 90);
        assert_eq!(meta.frame_to_time(45), Duration::from_millis(1500));
        assert_eq!(meta.time_to_frame(Duration::from_millis(1500)), 45);
        // 33ms is still inside frame 0 at 30fps
        assert_eq!(meta.time_to_frame(Duration::from_millis(33)), 0);
    }
}
