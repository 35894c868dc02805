//! Wall-clock synchronized video playback.
//!
//! A [`playback::video_player::VideoPlayer`] maps elapsed real time to the
//! frame that should be on screen and pulls the decoder forward to it,
//! dropping frames when the host polls slower than the video's frame rate.

pub mod playback;
pub mod presentation;
pub mod shared;
pub mod video;

#[cfg(test)]
mod test_support;
