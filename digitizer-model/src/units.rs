use std::fmt;

/// A strongly-typed byte size.
///
/// Base-2 (KiB, MiB, GiB), matching how capture file growth is reported.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const ZERO: Self = Self(0);
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0 as f64;
        if bytes >= Self::GIB {
            write!(f, "{:.2} GiB", bytes / Self::GIB)
        } else if bytes >= Self::MIB {
            write!(f, "{:.1} MiB", bytes / Self::MIB)
        } else if bytes >= Self::KIB {
            write!(f, "{:.1} KiB", bytes / Self::KIB)
        } else {
            write!(f, "{} B", self.0)
        }
    }
}

/// A position or length on a capture's timeline, in seconds.
///
/// `Display` renders a zero-padded `HH:MM:SS` clock (elapsed capture time);
/// [`Timecode::precise`] keeps tenths for scene boundaries.
#[derive(Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Timecode(f64);

impl Timecode {
    pub fn from_secs(seconds: f64) -> Self {
        Self(if seconds.is_finite() { seconds.max(0.0) } else { 0.0 })
    }

    fn parts(self) -> (u64, u64, f64) {
        let total = self.0;
        let hours = (total / 3600.0).floor() as u64;
        let minutes = ((total % 3600.0) / 60.0).floor() as u64;
        let seconds = total % 60.0;
        (hours, minutes, seconds)
    }

    /// `M:SS.s`, or `H:MM:SS.s` past the hour.
    pub fn precise(self) -> String {
        let (hours, minutes, seconds) = self.parts();
        // Round first so 59.96 does not render as "60.0".
        let tenths = (seconds * 10.0).round() / 10.0;
        let (minutes, tenths) = if tenths >= 60.0 {
            (minutes + 1, 0.0)
        } else {
            (minutes, tenths)
        };
        let (hours, minutes) = if minutes >= 60 {
            (hours + 1, 0)
        } else {
            (hours, minutes)
        };
        if hours > 0 {
            format!("{hours}:{minutes:02}:{tenths:04.1}")
        } else {
            format!("{minutes}:{tenths:04.1}")
        }
    }
}

impl fmt::Debug for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, seconds) = self.parts();
        write!(f, "{hours:02}:{minutes:02}:{:02}", seconds.floor() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_size_picks_largest_unit() {
        assert_eq!(ByteSize::from_bytes(512).to_string(), "512 B");
        assert_eq!(ByteSize::from_bytes(1536).to_string(), "1.5 KiB");
        assert_eq!(
            ByteSize::from_bytes(100 * 1024 * 1024).to_string(),
            "100.0 MiB"
        );
        assert_eq!(
            ByteSize::from_bytes(3 * 1024 * 1024 * 1024).to_string(),
            "3.00 GiB"
        );
        assert!(ByteSize::from_bytes(0).is_zero());
        assert!(!ByteSize::from_bytes(1).is_zero());
    }

    #[test]
    fn elapsed_clock_is_zero_padded() {
        assert_eq!(Timecode::from_secs(0.0).to_string(), "00:00:00");
        assert_eq!(Timecode::from_secs(3725.9).to_string(), "01:02:05");
        assert_eq!(Timecode::from_secs(-4.0).to_string(), "00:00:00");
    }

    #[test]
    fn precise_keeps_tenths_and_carries() {
        assert_eq!(Timecode::from_secs(45.5).precise(), "0:45.5");
        assert_eq!(Timecode::from_secs(119.96).precise(), "2:00.0");
        assert_eq!(Timecode::from_secs(3600.0).precise(), "1:00:00.0");
    }
}
