/*
 *  mpris.rs
 *
 *  inkbeat - now playing, on paper
 *
 *  MPRIS playback source: discovers the active media player on the session
 *  bus and reads status/metadata/position from it each poll.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::HashMap;

use log::{debug, info, warn};
use zbus::blocking::{Connection, Proxy, fdo::DBusProxy};
use zbus::zvariant::OwnedValue;

use crate::playback::{PlaybackSnapshot, PlaybackSource, PlayerStatus, PollOutcome, SourceError};

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

/// Players we try first, in order, before scanning the bus for anything
/// advertising the MPRIS interface.
const PREFERRED_PLAYERS: &[&str] = &[
    "org.mpris.MediaPlayer2.spotifyd",
    "org.mpris.MediaPlayer2.spotify",
    "org.mpris.MediaPlayer2.vlc",
    "org.mpris.MediaPlayer2.mpd",
    "org.mpris.MediaPlayer2.mopidy",
];

/// MPRIS-over-D-Bus implementation of [`PlaybackSource`].
///
/// The session bus connection is established lazily and the active player is
/// re-discovered after any query failure, so a bus or player that comes and
/// goes shows up as per-tick outcomes rather than a broken source.
pub struct MprisSource {
    conn: Option<Connection>,
    player: Option<String>,
}

impl MprisSource {
    pub fn new() -> Self {
        Self {
            conn: None,
            player: None,
        }
    }

    fn connection(&mut self) -> Result<&Connection, SourceError> {
        if self.conn.is_none() {
            let conn = Connection::session()
                .map_err(|e| SourceError::BusUnreachable(e.to_string()))?;
            debug!("Connected to session bus");
            self.conn = Some(conn);
        }
        Ok(self.conn.as_ref().unwrap())
    }

    /// Find an active MPRIS player: preferred names first, then any bus name
    /// under the MPRIS prefix.
    fn find_player(conn: &Connection) -> Result<Option<String>, SourceError> {
        let dbus = DBusProxy::new(conn)
            .map_err(|e| SourceError::BusUnreachable(e.to_string()))?;
        let names = dbus
            .list_names()
            .map_err(|e| SourceError::BusUnreachable(e.to_string()))?;

        for preferred in PREFERRED_PLAYERS {
            if names.iter().any(|n| n.as_str() == *preferred) {
                info!("Connected to media player: {preferred}");
                return Ok(Some((*preferred).to_string()));
            }
        }
        for name in &names {
            if name.as_str().starts_with(MPRIS_PREFIX) {
                info!("Connected to media player: {}", name.as_str());
                return Ok(Some(name.as_str().to_string()));
            }
        }
        Ok(None)
    }

    fn query(conn: &Connection, player: &str) -> Result<PlaybackSnapshot, SourceError> {
        let proxy = Proxy::new(conn, player, MPRIS_PATH, PLAYER_INTERFACE)
            .map_err(|e| SourceError::QueryFailed(e.to_string()))?;

        let status: String = proxy
            .get_property("PlaybackStatus")
            .map_err(|e| SourceError::QueryFailed(e.to_string()))?;
        let metadata: HashMap<String, OwnedValue> = proxy
            .get_property("Metadata")
            .map_err(|e| SourceError::MalformedReply(e.to_string()))?;
        // Some players refuse Position when stopped; treat that as zero.
        let position_us: i64 = proxy.get_property("Position").unwrap_or(0);

        let length_us = meta_length_us(&metadata);
        Ok(PlaybackSnapshot::new(
            PlayerStatus::from_mpris(&status),
            meta_string(&metadata, "xesam:title"),
            meta_artist(&metadata),
            meta_string(&metadata, "xesam:album"),
            position_us as f64 / 1_000_000.0,
            length_us.filter(|l| *l > 0).map(|l| l as f64 / 1_000_000.0),
        ))
    }
}

impl Default for MprisSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSource for MprisSource {
    fn poll(&mut self) -> Result<PollOutcome, SourceError> {
        let conn = self.connection()?.clone();

        if self.player.is_none() {
            self.player = Self::find_player(&conn)?;
        }
        let Some(player) = self.player.clone() else {
            return Ok(PollOutcome::NoPlayer);
        };

        match Self::query(&conn, &player) {
            Ok(snapshot) => Ok(PollOutcome::Track(snapshot)),
            Err(e) => {
                // Player likely went away; rediscover next tick.
                warn!("Query to {player} failed, dropping player: {e}");
                self.player = None;
                Err(e)
            }
        }
    }
}

fn meta_string(meta: &HashMap<String, OwnedValue>, key: &str) -> String {
    meta.get(key)
        .and_then(|v| v.downcast_ref::<&str>().ok())
        .unwrap_or_default()
        .to_string()
}

/// xesam:artist is a list of strings; join them the way players display it.
fn meta_artist(meta: &HashMap<String, OwnedValue>) -> String {
    let Some(v) = meta.get("xesam:artist") else {
        return String::new();
    };
    // OwnedValue may carry fds, so it is try_clone rather than Clone
    if let Ok(owned) = v.try_clone() {
        if let Ok(artists) = <Vec<String>>::try_from(owned) {
            return artists.join(", ");
        }
    }
    // Some players put a plain string where the list belongs.
    v.downcast_ref::<&str>().unwrap_or_default().to_string()
}

/// mpris:length is specified as int64 microseconds but shows up as u64 or
/// double from some players.
fn meta_length_us(meta: &HashMap<String, OwnedValue>) -> Option<i64> {
    let v = meta.get("mpris:length")?;
    if let Ok(n) = v.downcast_ref::<i64>() {
        return Some(n);
    }
    if let Ok(n) = v.downcast_ref::<u64>() {
        return i64::try_from(n).ok();
    }
    if let Ok(f) = v.downcast_ref::<f64>() {
        return Some(f as i64);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbus::zvariant::Value;

    fn owned(v: Value<'_>) -> OwnedValue {
        OwnedValue::try_from(v).unwrap()
    }

    #[test]
    fn test_meta_string_missing_key_is_empty() {
        let meta = HashMap::new();
        assert_eq!(meta_string(&meta, "xesam:title"), "");
    }

    #[test]
    fn test_meta_string_reads_str() {
        let mut meta = HashMap::new();
        meta.insert("xesam:title".to_string(), owned(Value::from("Test Track")));
        assert_eq!(meta_string(&meta, "xesam:title"), "Test Track");
    }

    #[test]
    fn test_meta_artist_joins_list() {
        let mut meta = HashMap::new();
        meta.insert(
            "xesam:artist".to_string(),
            owned(Value::from(vec!["A", "B"])),
        );
        assert_eq!(meta_artist(&meta), "A, B");
    }

    #[test]
    fn test_meta_artist_accepts_plain_string() {
        let mut meta = HashMap::new();
        meta.insert("xesam:artist".to_string(), owned(Value::from("Solo")));
        assert_eq!(meta_artist(&meta), "Solo");
    }

    #[test]
    fn test_meta_length_accepts_i64_and_u64() {
        let mut meta = HashMap::new();
        meta.insert("mpris:length".to_string(), owned(Value::from(30_000_000i64)));
        assert_eq!(meta_length_us(&meta), Some(30_000_000));

        meta.insert("mpris:length".to_string(), owned(Value::from(31_000_000u64)));
        assert_eq!(meta_length_us(&meta), Some(31_000_000));
    }
}
