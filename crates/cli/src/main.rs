use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::de::DeserializeOwned;

use vidsync_core::playback::domain::presentation_clock::PausePolicy;
use vidsync_core::playback::domain::time_source::SystemTimeSource;
use vidsync_core::playback::playback_config::PlaybackConfig;
use vidsync_core::playback::playback_logger::StatsPlaybackLogger;
use vidsync_core::playback::video_player::VideoPlayer;
use vidsync_core::presentation::frame_scaler::ResizeFilter;
use vidsync_core::shared::timecode::Timecode;
use vidsync_core::video::infrastructure::ffmpeg_decoder::FfmpegDecoder;
use vidsync_core::video::infrastructure::image_surface::ImageSurface;
use vidsync_core::video::infrastructure::null_audio_player::NullAudioPlayer;

/// Headless wall-clock video player.
///
/// Polls a video at a fixed host rate the way a render loop would, dropping
/// frames whenever the host is slower than the video.
#[derive(Parser)]
#[command(name = "vidsync")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Restart from the first frame on end of stream.
    #[arg(long = "loop")]
    looped: bool,

    /// Start position as HH:MM:SS or HH:MM:SS:mmm.
    #[arg(long)]
    seek: Option<String>,

    /// Stop after this many seconds of wall-clock time (default: until the end).
    #[arg(long)]
    duration: Option<f64>,

    /// Host render rate in polls per second.
    #[arg(long, default_value = "60")]
    poll_rate: f64,

    /// Pause once this many seconds have elapsed.
    #[arg(long)]
    pause_at: Option<f64>,

    /// How long to stay paused, in seconds.
    #[arg(long, default_value = "1.0")]
    pause_for: f64,

    /// What time spent paused does on resume: reanchor or catchup.
    #[arg(long, value_parser = parse_name::<PausePolicy>)]
    pause_policy: Option<PausePolicy>,

    /// Write the last displayed frame to this image file.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Display width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Display height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Letterbox instead of stretching when the display size differs.
    #[arg(long)]
    keep_aspect: bool,

    /// Resize filter: nearest, triangle, catmullrom or lanczos3.
    #[arg(long, value_parser = parse_name::<ResizeFilter>)]
    filter: Option<ResizeFilter>,

    /// Audio volume (0.0-1.0).
    #[arg(long)]
    volume: Option<f32>,

    /// Start muted.
    #[arg(long)]
    mute: bool,

    /// Config file (default: the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to the config file and exit.
    #[arg(long)]
    save_config: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    if cli.save_config {
        let path = cli
            .config
            .clone()
            .or_else(PlaybackConfig::default_path)
            .ok_or("No config directory available on this platform")?;
        config.save(&path)?;
        log::info!("Config written to {}", path.display());
        return Ok(());
    }

    let mut player = VideoPlayer::open(
        &cli.input,
        Box::new(FfmpegDecoder::new()),
        Box::new(NullAudioPlayer::new()),
        Box::new(SystemTimeSource::new()),
        config,
    )?
    .with_logger(Box::new(StatsPlaybackLogger::new()));

    match (cli.width, cli.height) {
        (Some(w), Some(h)) => player.set_size(w, h)?,
        (Some(w), None) => player.set_width(w)?,
        (None, Some(h)) => player.set_height(h)?,
        (None, None) => {}
    }

    player.play(cli.looped)?;
    if let Some(seek) = &cli.seek {
        let position: Timecode = seek.parse()?;
        player.seek_time(position.into())?;
    }

    run_loop(&cli, &mut player);
    eprintln!();

    log::info!(
        "Stopped at frame {}/{} ({}, {} remaining)",
        player.current_frame(),
        player.total_frames(),
        Timecode::from(player.current_time()),
        Timecode::from(player.remaining_time()),
    );

    if let Some(path) = &cli.snapshot {
        let (w, h) = player.size();
        let mut surface = ImageSurface::new(w, h);
        player.draw_to(&mut surface, (0, 0));
        surface.save(path)?;
        log::info!("Snapshot written to {}", path.display());
    }

    player.stop();
    player.logger().summary();
    Ok(())
}

/// Polls the player at the host rate until the run ends.
fn run_loop(cli: &Cli, player: &mut VideoPlayer) {
    let tick = Duration::from_secs_f64(1.0 / cli.poll_rate);
    let started = Instant::now();
    let total = player.total_frames();
    let mut pause_pending = cli.pause_at;
    let mut resume_at = None;

    loop {
        let elapsed = started.elapsed().as_secs_f64();
        if cli.duration.is_some_and(|limit| elapsed >= limit) {
            break;
        }

        if let Some(at) = pause_pending {
            if elapsed >= at {
                log::info!("Pausing for {:.1}s", cli.pause_for);
                player.pause();
                pause_pending = None;
                resume_at = Some(elapsed + cli.pause_for);
            }
        }
        if let Some(at) = resume_at {
            if elapsed >= at {
                player.resume();
                resume_at = None;
            }
        }

        player.poll();
        if player.is_ended() {
            break;
        }
        eprint!(
            "\rFrame {}/{total} {}",
            player.current_frame(),
            Timecode::from(player.current_time())
        );
        thread::sleep(tick);
    }
}

fn build_config(cli: &Cli) -> Result<PlaybackConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) if path.exists() => PlaybackConfig::load(path)?,
        Some(_) => PlaybackConfig::default(),
        None => PlaybackConfig::load_or_default(),
    };

    if let Some(policy) = cli.pause_policy {
        config.pause_policy = policy;
    }
    if let Some(filter) = cli.filter {
        config.resize_filter = filter;
    }
    if let Some(volume) = cli.volume {
        config.volume = volume;
    }
    if cli.keep_aspect {
        config.keep_aspect_ratio = true;
    }
    if cli.mute {
        config.muted = true;
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !(cli.poll_rate > 0.0 && cli.poll_rate <= 1000.0) {
        return Err(format!(
            "Poll rate must be between 0 and 1000 Hz, got {}",
            cli.poll_rate
        )
        .into());
    }
    if let Some(d) = cli.duration {
        if !(d > 0.0) {
            return Err(format!("Duration must be positive, got {d}").into());
        }
    }
    if cli.looped && cli.duration.is_none() {
        return Err("--loop needs --duration to know when to stop".into());
    }
    if let Some(at) = cli.pause_at {
        if at < 0.0 {
            return Err(format!("Pause time must not be negative, got {at}").into());
        }
    }
    if cli.pause_for < 0.0 {
        return Err(format!("Pause length must not be negative, got {}", cli.pause_for).into());
    }
    if cli.width == Some(0) || cli.height == Some(0) {
        return Err("Display width and height must be positive".into());
    }
    if let Some(v) = cli.volume {
        if !(0.0..=1.0).contains(&v) {
            return Err(format!("Volume must be between 0.0 and 1.0, got {v}").into());
        }
    }
    if let Some(seek) = &cli.seek {
        seek.parse::<Timecode>()?;
    }
    Ok(())
}

/// Parses a flag value by the name the config file uses for it.
fn parse_name<T: DeserializeOwned>(name: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(name.to_string())).map_err(|e| e.to_string())
}
