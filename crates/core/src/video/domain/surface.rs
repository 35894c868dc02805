use crate::shared::frame::Frame;

/// Host-side drawing target for decoded frames.
pub trait Surface {
    /// Copies `frame` so its top-left corner lands at `position`. Pixels
    /// falling outside the surface are clipped.
    fn blit(&mut self, frame: &Frame, position: (i64, i64));
}
