use thiserror::Error;

/// Transport state reported by the player. Anything the bus reports that we
/// do not recognize collapses to `Unknown` rather than failing the poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    Playing,
    Paused,
    Stopped,
    #[default]
    Unknown,
}

impl PlayerStatus {
    pub fn from_mpris(s: &str) -> Self {
        match s {
            "Playing" => PlayerStatus::Playing,
            "Paused" => PlayerStatus::Paused,
            "Stopped" => PlayerStatus::Stopped,
            _ => PlayerStatus::Unknown,
        }
    }

    pub fn is_playing(self) -> bool {
        self == PlayerStatus::Playing
    }
}

/// One poll's worth of playback state. Immutable once produced; the loop
/// replaces it wholesale every tick and never patches fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub status: PlayerStatus,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub position_secs: f64,
    /// None when the player does not report a track length.
    pub length_secs: Option<f64>,
}

impl PlaybackSnapshot {
    /// Build a snapshot, clamping position into `0.0..=length` so the
    /// position <= length invariant holds regardless of what the bus said.
    pub fn new(
        status: PlayerStatus,
        title: String,
        artist: String,
        album: String,
        position_secs: f64,
        length_secs: Option<f64>,
    ) -> Self {
        let length_secs = length_secs.filter(|l| *l >= 0.0);
        let mut position_secs = position_secs.max(0.0);
        if let Some(len) = length_secs {
            position_secs = position_secs.min(len);
        }
        Self {
            status,
            title,
            artist,
            album,
            position_secs,
            length_secs,
        }
    }
}

/// What a poll produced. `NoPlayer` is a normal outcome, not an error: no
/// compatible player is advertising playback right now.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Track(PlaybackSnapshot),
    NoPlayer,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("bus unreachable: {0}")]
    BusUnreachable(String),
    #[error("player query failed: {0}")]
    QueryFailed(String),
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

/// A synchronous, bounded-latency source of playback snapshots. The update
/// loop owns exactly one of these and polls it once per tick.
pub trait PlaybackSource: Send {
    fn poll(&mut self) -> Result<PollOutcome, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_clamps_position_to_length() {
        let s = PlaybackSnapshot::new(
            PlayerStatus::Playing,
            "t".into(),
            "a".into(),
            "b".into(),
            400.0,
            Some(180.0),
        );
        assert_eq!(s.position_secs, 180.0);
    }

    #[test]
    fn test_snapshot_negative_position_clamps_to_zero() {
        let s = PlaybackSnapshot::new(
            PlayerStatus::Paused,
            "t".into(),
            "a".into(),
            "b".into(),
            -3.0,
            None,
        );
        assert_eq!(s.position_secs, 0.0);
    }

    #[test]
    fn test_status_from_mpris() {
        assert_eq!(PlayerStatus::from_mpris("Playing"), PlayerStatus::Playing);
        assert_eq!(PlayerStatus::from_mpris("Paused"), PlayerStatus::Paused);
        assert_eq!(PlayerStatus::from_mpris("Stopped"), PlayerStatus::Stopped);
        assert_eq!(PlayerStatus::from_mpris("Buffering"), PlayerStatus::Unknown);
    }
}
