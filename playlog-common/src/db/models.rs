//! Record models and the document validation boundary
//!
//! Source documents deserialize into typed structs at a single boundary;
//! missing or ill-typed required fields surface as
//! [`Error::MalformedRecord`](crate::Error::MalformedRecord) instead of
//! failing deep inside field access.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One song metadata document: a single JSON object per file describing one
/// song and its artist. Extra fields in the source (num_songs, ...) are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SongDocument {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
    pub year: i64,
    pub duration: f64,
}

impl SongDocument {
    pub fn song_record(&self) -> SongRecord {
        SongRecord {
            song_id: self.song_id.clone(),
            title: self.title.clone(),
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        }
    }

    pub fn artist_record(&self) -> ArtistRecord {
        ArtistRecord {
            artist_id: self.artist_id.clone(),
            name: self.artist_name.clone(),
            location: self.artist_location.clone(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

/// One raw event from a log document (JSON lines, one event per line).
///
/// Only page and ts are required at parse time: events other than NextSong
/// carry nulls for the song/user fields, and they must still parse so the
/// page filter can discard them.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEvent {
    pub page: String,
    pub ts: i64,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    // The source logs carry userId as either a JSON string ("88") or a
    // number; accept both.
    #[serde(rename = "userId", default, deserialize_with = "opt_user_id")]
    pub user_id: Option<i64>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<i64>,
    pub location: Option<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
}

/// A validated NextSong playback event with every required field present.
#[derive(Debug, Clone)]
pub struct NextSongEvent {
    pub ts: i64,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
    pub session_id: i64,
    pub location: String,
    pub user_agent: String,
}

impl NextSongEvent {
    /// Validate a raw NextSong event into its fully-required form.
    pub fn from_event(event: LogEvent) -> Result<Self> {
        Ok(Self {
            ts: event.ts,
            song: require(event.song, "song")?,
            artist: require(event.artist, "artist")?,
            length: require(event.length, "length")?,
            user_id: require(event.user_id, "userId")?,
            first_name: require(event.first_name, "firstName")?,
            last_name: require(event.last_name, "lastName")?,
            gender: require(event.gender, "gender")?,
            level: require(event.level, "level")?,
            session_id: require(event.session_id, "sessionId")?,
            location: require(event.location, "location")?,
            user_agent: require(event.user_agent, "userAgent")?,
        })
    }

    pub fn user_record(&self) -> UserRecord {
        UserRecord {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            level: self.level.clone(),
        }
    }

    /// Build the songplay fact row with the resolved (or unresolved)
    /// song/artist pair.
    pub fn songplay_record(&self, resolved: Option<(String, String)>) -> SongplayRecord {
        let (song_id, artist_id) = match resolved {
            Some((song_id, artist_id)) => (Some(song_id), Some(artist_id)),
            None => (None, None),
        };
        SongplayRecord {
            start_time: self.ts,
            user_id: self.user_id,
            level: self.level.clone(),
            song_id,
            artist_id,
            session_id: self.session_id,
            location: self.location.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

fn require<T>(field: Option<T>, name: &str) -> Result<T> {
    field.ok_or_else(|| Error::MalformedRecord(format!("NextSong event missing field '{name}'")))
}

fn opt_user_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        Int(i64),
        Str(String),
    }

    match Option::<StringOrInt>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrInt::Int(id)) => Ok(Some(id)),
        Some(StringOrInt::Str(s)) if s.is_empty() => Ok(None),
        Some(StringOrInt::Str(s)) => s
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid userId: {s:?}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One time-dimension row, derived from an event's epoch-millisecond
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    /// Epoch milliseconds, kept verbatim from the event
    pub start_time: i64,
    pub hour: u32,
    pub day: u32,
    /// ISO 8601 week number
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// Weekday name ("Friday")
    pub weekday: String,
}

impl TimeRecord {
    /// Decompose an epoch-millisecond timestamp in UTC.
    ///
    /// Pure function of the timestamp; the reference timezone is fixed to
    /// UTC.
    pub fn from_epoch_millis(ts: i64) -> Result<Self> {
        let instant: DateTime<Utc> = DateTime::from_timestamp_millis(ts)
            .ok_or_else(|| Error::MalformedRecord(format!("timestamp out of range: {ts}")))?;

        Ok(Self {
            start_time: ts,
            hour: instant.hour(),
            day: instant.day(),
            week: instant.iso_week().week(),
            month: instant.month(),
            year: instant.year(),
            weekday: instant.format("%A").to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongplayRecord {
    pub start_time: i64,
    pub user_id: i64,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: String,
    pub user_agent: String,
}
