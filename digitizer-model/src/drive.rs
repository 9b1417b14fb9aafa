use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStatus {
    #[default]
    Empty,
    DiscDetected,
    Ripping,
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriveStatus::Empty => "empty",
            DriveStatus::DiscDetected => "disc_detected",
            DriveStatus::Ripping => "ripping",
        };
        f.write_str(label)
    }
}

/// Response body of `GET /api/drive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveState {
    pub status: DriveStatus,
}
