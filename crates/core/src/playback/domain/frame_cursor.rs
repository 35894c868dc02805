use crate::shared::frame::Frame;
use crate::video::domain::frame_decoder::{DecodeError, FrameDecoder};

/// Result of moving the cursor toward a target frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The target did not move past the drawn frame; nothing was decoded.
    Idle,
    /// The cursor reached the target. `dropped` frames were decoded but
    /// never shown.
    Advanced { decoded: u64, dropped: u64 },
    /// The decoder ran out after `decoded` frames. `error` is set when the
    /// stream stopped for a reason other than a clean end of stream.
    EndOfStream {
        decoded: u64,
        error: Option<DecodeError>,
    },
}

/// Tracks the last displayed frame and pulls the decoder forward to a
/// target, dropping frames the host polled too slowly to show.
#[derive(Debug, Clone)]
pub struct FrameCursor {
    draw_frame: u64,
    frame: Frame,
}

impl FrameCursor {
    pub fn new(initial: Frame) -> Self {
        Self {
            draw_frame: 0,
            frame: initial,
        }
    }

    /// Index of the last frame displayed.
    pub fn draw_frame(&self) -> u64 {
        self.draw_frame
    }

    /// The cached buffer for the last frame displayed.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Moves the cursor without decoding; used when the decoder was
    /// repositioned directly.
    pub fn jump_to(&mut self, frame_index: u64) {
        self.draw_frame = frame_index;
    }

    /// Back to frame 0 with a fresh buffer, for a newly loaded stream.
    pub fn reset(&mut self, initial: Frame) {
        self.draw_frame = 0;
        self.frame = initial;
    }

    /// Consumes `target - draw_frame` frames from `decoder`. All but the
    /// last are skipped; the last replaces the cached buffer. If the stream
    /// ends first, the last frame it produced becomes the cached buffer.
    pub fn advance_to(&mut self, target: u64, decoder: &mut dyn FrameDecoder) -> Advance {
        if target <= self.draw_frame {
            return Advance::Idle;
        }

        let delta = target - self.draw_frame;
        let mut decoded = 0;
        for step in 1..=delta {
            let result = if step == delta {
                decoder.read_next_frame().map(|frame| self.frame = frame)
            } else {
                decoder.skip_frame()
            };

            if let Err(err) = result {
                // Every step before the failing one was a skip
                if decoded > 0 {
                    if let Some(frame) = decoder.take_skipped_frame() {
                        self.frame = frame;
                    }
                }
                self.draw_frame = (self.draw_frame + decoded).saturating_sub(1);
                let error = (!err.is_end_of_stream()).then_some(err);
                return Advance::EndOfStream { decoded, error };
            }
            decoded += 1;
        }

        self.draw_frame = target;
        Advance::Advanced {
            decoded,
            dropped: decoded - 1,
        }
    }
}
