pub mod ffmpeg_decoder;
pub mod image_surface;
pub mod null_audio_player;
