pub mod frame_cursor;
pub mod playback_state;
pub mod presentation_clock;
pub mod time_source;
