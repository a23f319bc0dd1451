/// Maximum title length in bytes, matching the fixed title buffer of the viewer.
pub const TITLE_CAPACITY: usize = 20;

/// Fixed-capacity ring of frame durations (seconds).
///
/// Writing past capacity overwrites the oldest sample. Averages only consider
/// filled slots, so the figure is meaningful from the first frame on.
#[derive(Debug, Clone)]
pub struct FrameTimes<const N: usize> {
    samples: [f32; N],
    next: usize,
    len: usize,
}

impl<const N: usize> FrameTimes<N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        assert!(N > 0, "FrameTimes capacity must be non-zero");
        Self {
            samples: [0.0; N],
            next: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, seconds: f32) {
        self.samples[self.next] = seconds;
        self.next = (self.next + 1) % N;
        self.len = (self.len + 1).min(N);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Samples in write order, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        let start = if self.len < N { 0 } else { self.next };
        (0..self.len).map(move |i| self.samples[(start + i) % N])
    }

    /// Mean frame duration in seconds, `None` before the first sample.
    pub fn average(&self) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        Some(self.samples().sum::<f32>() / self.len as f32)
    }

    /// Smoothed frames per second, `None` until a non-zero duration is recorded.
    pub fn average_fps(&self) -> Option<f32> {
        self.average().filter(|&avg| avg > 0.0).map(|avg| avg.recip())
    }
}

impl<const N: usize> Default for FrameTimes<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats the window title for an FPS figure, never exceeding [`TITLE_CAPACITY`].
pub fn fps_title(fps: f32) -> String {
    let mut title = format!("fps: {fps:.0}");
    // Output is ASCII, so any byte index is a char boundary.
    title.truncate(TITLE_CAPACITY);
    title
}
