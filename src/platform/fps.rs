//! Frame rate tracking over a sliding window of frame timestamps

/// Frames kept in the window
const WINDOW: usize = 60;

#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; WINDOW],
    frame_index: usize,
    recorded: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frame_times: [0.0; WINDOW],
            frame_index: 0,
            recorded: 0,
            fps: 0,
        }
    }

    /// Record a frame timestamp (ms) and return the updated rate
    pub fn record(&mut self, time: f64) -> u32 {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % WINDOW;
        self.recorded = (self.recorded + 1).min(WINDOW);

        // Oldest sample sits at the write cursor once the window is full
        let oldest = if self.recorded == WINDOW {
            self.frame_times[self.frame_index]
        } else {
            self.frame_times[0]
        };
        let intervals = (self.recorded - 1) as f64;
        let elapsed = time - oldest;
        if intervals > 0.0 && elapsed > 0.0 {
            self.fps = (intervals * 1000.0 / elapsed).round() as u32;
        }
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frames recorded since creation, saturating at the window size
    pub fn samples(&self) -> usize {
        self.recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_sixty() {
        let mut fps = FpsCounter::new();
        for i in 0..200 {
            fps.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(fps.fps(), 60);
        assert_eq!(fps.samples(), WINDOW);
    }

    #[test]
    fn test_partial_window() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.record(0.0), 0);
        for i in 1..10 {
            fps.record(i as f64 * 32.0);
        }
        // 9 intervals of 32 ms
        assert_eq!(fps.fps(), 31);
    }
}
