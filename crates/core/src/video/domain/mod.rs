pub mod audio_player;
pub mod frame_decoder;
pub mod surface;
