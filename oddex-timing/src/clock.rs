use std::time::{Duration, Instant};

/// Monotonic, resettable clock. Routines reset one at `begin` so component
/// onsets read as seconds into the routine; a second, never-reset instance
/// serves as the session-global clock.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in seconds (PsychoPy `Clock.getTime`).
    pub fn seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn nanos(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    /// Shift the epoch into the past, making the clock read `d` later
    /// (PsychoPy `Clock.add`). Headless drivers use this to step through
    /// component onsets without waiting in real time.
    pub fn rewind(&mut self, d: Duration) {
        self.start -= d;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling window of frame-to-frame intervals, used to estimate the real
/// refresh rate of the display at startup.
#[derive(Debug, Clone)]
pub struct FrameTimes {
    samples: Vec<Duration>,
    max_samples: usize,
    last_frame: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct RefreshStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub effective_fps: f64,
}

impl FrameTimes {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
            last_frame: None,
        }
    }

    /// Record the boundary of a frame; the first call only arms the clock.
    pub fn mark_frame(&mut self) {
        let now = Instant::now();
        if let Some(prev) = self.last_frame.replace(now) {
            if self.samples.len() >= self.max_samples {
                self.samples.remove(0);
            }
            self.samples.push(now - prev);
        }
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len()
    }

    pub fn stats(&self) -> RefreshStats {
        if self.samples.is_empty() {
            return RefreshStats {
                average_frame_time_ns: 0.0,
                jitter_ns: 0.0,
                effective_fps: 0.0,
            };
        }
        let times: Vec<f64> = self.samples.iter().map(|d| d.as_nanos() as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        RefreshStats {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

/// Sleep with sub-millisecond accuracy where the platform allows it. Used
/// to pace redraws when the compositor gives us no vsync signal.
pub fn precise_sleep(duration: Duration) {
    #[cfg(target_os = "linux")]
    linux_sleep(duration);
    #[cfg(not(target_os = "linux"))]
    std::thread::sleep(duration);
}

#[cfg(target_os = "linux")]
fn linux_sleep(duration: Duration) {
    use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

    let req = timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };

    unsafe {
        clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
    }
}
