use serde::Serialize;
use std::path::Path;

/// Raw counters gathered from one session log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionScan {
    pub timestamps: Vec<i64>,
    pub prompt_count: u64,
    pub sonnet_count: u64,
    pub opus_count: u64,
    /// Lines that were not JSON objects or could not be decoded
    pub skipped_lines: usize,
}

/// Per-session reduction of a scanned log. Built once per file version and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub project: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_hours: f64,
    pub prompt_count: u64,
    pub sonnet_response_count: u64,
    pub opus_response_count: u64,
}

impl SessionSummary {
    pub fn from_scan(path: &Path, scan: &SessionScan) -> Self {
        let session_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let project = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (start_time, end_time) = match (scan.timestamps.iter().min(), scan.timestamps.iter().max()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0, 0),
        };
        let duration_hours = (end_time - start_time) as f64 / 3600.0;

        SessionSummary {
            session_id,
            project,
            start_time,
            end_time,
            duration_hours,
            prompt_count: scan.prompt_count,
            sonnet_response_count: scan.sonnet_count,
            opus_response_count: scan.opus_count,
        }
    }

    pub fn total_responses(&self) -> u64 {
        self.sonnet_response_count + self.opus_response_count
    }

    /// Split `duration_hours` across model families by response share.
    /// Sessions without tracked responses attribute nothing.
    pub fn apportioned_hours(&self) -> (f64, f64) {
        let total = self.total_responses();
        if total == 0 {
            return (0.0, 0.0);
        }
        let total = total as f64;
        (
            self.duration_hours * self.sonnet_response_count as f64 / total,
            self.duration_hours * self.opus_response_count as f64 / total,
        )
    }
}

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// On-disk size of the active session transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionSize(u64);

/// Size bands: under 5 MB, 5 MB up to 15 MB, then 15 MB and above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLevel {
    Normal,
    Warning,
    Critical,
}

impl SessionSize {
    const WARNING_BYTES: u64 = 5 * MIB;
    const CRITICAL_BYTES: u64 = 15 * MIB;

    pub fn new(bytes: u64) -> Self {
        SessionSize(bytes)
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(SessionSize(std::fs::metadata(path)?.len()))
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }

    pub fn level(&self) -> SizeLevel {
        if self.0 < Self::WARNING_BYTES {
            SizeLevel::Normal
        } else if self.0 < Self::CRITICAL_BYTES {
            SizeLevel::Warning
        } else {
            SizeLevel::Critical
        }
    }

    /// Whole kilobytes below 1 MB, one decimal of megabytes from there.
    pub fn format_display(&self) -> String {
        if self.0 >= MIB {
            format!("{:.1}MB", self.0 as f64 / MIB as f64)
        } else {
            format!("{}KB", self.0 / KIB)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_size_levels() {
        assert_eq!(SessionSize::new(4 * MIB).level(), SizeLevel::Normal);
        assert_eq!(SessionSize::new(5 * MIB - 1).level(), SizeLevel::Normal);
        assert_eq!(SessionSize::new(5 * MIB).level(), SizeLevel::Warning);
        assert_eq!(SessionSize::new(15 * MIB - 1).level(), SizeLevel::Warning);
        assert_eq!(SessionSize::new(15 * MIB).level(), SizeLevel::Critical);
        assert_eq!(SessionSize::new(40 * MIB).level(), SizeLevel::Critical);
    }

    #[test]
    fn test_size_display_units() {
        assert_eq!(SessionSize::new(0).format_display(), "0KB");
        assert_eq!(SessionSize::new(512 * KIB).format_display(), "512KB");
        assert_eq!(SessionSize::new(MIB - 1).format_display(), "1023KB");
        assert_eq!(SessionSize::new(MIB).format_display(), "1.0MB");
        assert_eq!(SessionSize::new(2 * MIB + 512 * KIB).format_display(), "2.5MB");
    }

    #[test]
    fn test_size_from_file() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(&[0u8; 2048]).unwrap();
        temp.flush().unwrap();
        assert_eq!(SessionSize::from_file(temp.path()).unwrap().bytes(), 2048);
        assert!(SessionSize::from_file(&temp.path().join("missing")).is_err());
    }
}
