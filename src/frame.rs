//! Game-time frames and their text rendering.
//!
//! Brood War advances game state in frames. On the fastest speed one
//! frame lasts 42 ms, and the renderer runs at 23.81 frames per second;
//! both constants appear here because durations use the millisecond form
//! while per-minute rates (APM) use the FPS form.

use serde::Serialize;
use std::fmt;

/// Milliseconds of game time per frame on the fastest speed.
pub const FRAME_MS: u64 = 42;

/// Render rate in frames per second, used for per-minute rates.
pub const FRAMES_PER_SECOND: f64 = 23.81;

/// A frame index into a replay's command stream.
///
/// Wraps a u32. Frames are totally ordered and convert exactly to
/// milliseconds (`frame * 42`); time strings quantize to whole seconds
/// with `seconds = floor(ms / 1000)`.
///
/// # Example
///
/// ```
/// use bwrep_parser::frame::Frame;
///
/// let frame = Frame::new(100);
/// assert_eq!(frame.to_ms(), 4200);
/// assert_eq!(frame.time_string(), "0:04");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Frame(pub u32);

impl Frame {
    /// Creates a frame from its raw index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Frame(value)
    }

    /// Returns the raw frame index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Converts the frame to milliseconds of game time.
    #[must_use]
    pub const fn to_ms(&self) -> u64 {
        self.0 as u64 * FRAME_MS
    }

    /// Converts the frame to whole seconds of game time.
    #[must_use]
    pub const fn to_seconds(&self) -> u64 {
        self.to_ms() / 1000
    }

    /// Converts the frame to game minutes, for per-minute rates.
    #[must_use]
    pub fn to_minutes(&self) -> f64 {
        f64::from(self.0) / FRAMES_PER_SECOND / 60.0
    }

    /// Renders the frame as a time string.
    ///
    /// Times under one hour format as `m:ss`, longer games as
    /// `h:mm:ss`.
    ///
    /// # Example
    ///
    /// ```
    /// use bwrep_parser::frame::Frame;
    ///
    /// assert_eq!(Frame::new(0).time_string(), "0:00");
    /// assert_eq!(Frame::new(1440).time_string(), "1:00");
    /// assert_eq!(Frame::new(90_000).time_string(), "1:03:00");
    /// ```
    #[must_use]
    pub fn time_string(&self) -> String {
        let total_seconds = self.to_seconds();
        let seconds = total_seconds % 60;
        let minutes = (total_seconds / 60) % 60;
        let hours = total_seconds / 3600;

        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }

    /// Parses a `m:ss` or `h:mm:ss` time string back into a frame.
    ///
    /// The string quantizes time to whole seconds, so the recovered
    /// frame is the first frame whose time string equals the input;
    /// rendering it again reproduces the string exactly.
    ///
    /// Returns `None` for strings outside the grammar.
    ///
    /// # Example
    ///
    /// ```
    /// use bwrep_parser::frame::Frame;
    ///
    /// let frame = Frame::from_time_str("1:00").unwrap();
    /// assert_eq!(frame.time_string(), "1:00");
    /// assert!(Frame::from_time_str("nonsense").is_none());
    /// ```
    #[must_use]
    pub fn from_time_str(s: &str) -> Option<Frame> {
        let parts: Vec<&str> = s.split(':').collect();
        let total_seconds: u64 = match parts.as_slice() {
            [m, ss] => {
                if ss.len() != 2 {
                    return None;
                }
                let minutes: u64 = m.parse().ok()?;
                let seconds: u64 = ss.parse().ok()?;
                if seconds >= 60 {
                    return None;
                }
                minutes * 60 + seconds
            }
            [h, mm, ss] => {
                if mm.len() != 2 || ss.len() != 2 {
                    return None;
                }
                let hours: u64 = h.parse().ok()?;
                let minutes: u64 = mm.parse().ok()?;
                let seconds: u64 = ss.parse().ok()?;
                if minutes >= 60 || seconds >= 60 {
                    return None;
                }
                hours * 3600 + minutes * 60 + seconds
            }
            _ => return None,
        };

        // First frame landing inside the named second.
        let ms = total_seconds * 1000;
        let frame = ms.div_ceil(FRAME_MS);
        u32::try_from(frame).ok().map(Frame)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time_string())
    }
}

impl From<u32> for Frame {
    fn from(value: u32) -> Self {
        Frame(value)
    }
}
