//! Display views derived from a [`ProfileSnapshot`] on demand.
//!
//! Each view looks up its attribute independently. When the attribute is
//! absent, wrong-typed, or an encoded list that fails to parse, the view is
//! filled with a fixed placeholder dataset and marked
//! [`DataSource::Placeholder`] so the UI can label it.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::normalizer::{Attributes, ProfileSnapshot};
use crate::value::{display_text, is_truthy};

/// Maximum number of list entries shown.
pub const MAX_LIST_ENTRIES: usize = 10;

const TRACK_KEYS: &[&str] = &["tracks", "topTracks"];
const ARTIST_KEYS: &[&str] = &["artists", "topArtists"];

const UNKNOWN_TRACK: &str = "Unknown Track";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_PLAYS: &str = "--";
const UNKNOWN_GENRE: &str = "Various Genres";

/// (label, attribute key, placeholder value)
const STAT_FIELDS: &[(&str, &str, &str)] = &[
    ("Tracks Analyzed", "totalTracks", "50+"),
    ("Artists", "totalArtists", "25+"),
    ("Hours Listened", "totalHours", "100+"),
    ("Top Genre", "topGenre", "Electronic"),
];

const PLACEHOLDER_TRACKS: &[(&str, &str, &str)] = &[
    ("Verified Track 1", "Artist Name", "1,234"),
    ("Verified Track 2", "Artist Name", "987"),
    ("Verified Track 3", "Artist Name", "756"),
];

const PLACEHOLDER_ARTISTS: &[(&str, &str)] = &[
    ("Verified Artist 1", "Electronic"),
    ("Verified Artist 2", "Hip Hop"),
    ("Verified Artist 3", "Indie"),
];

/// Whether a view shows disclosed data or the placeholder dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Verified,
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
    pub source: DataSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub plays: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub name: String,
    pub genre: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListView<T> {
    pub entries: Vec<T>,
    pub source: DataSource,
}

/// Every derived view for one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub proof: String,
    pub stats: Vec<Stat>,
    pub tracks: ListView<Track>,
    pub artists: ListView<Artist>,
}

impl DisplayModel {
    pub fn derive(snapshot: &ProfileSnapshot) -> Self {
        let attrs = snapshot.attributes();
        Self {
            proof: snapshot.short_hash(),
            stats: stats(attrs),
            tracks: top_tracks(attrs),
            artists: top_artists(attrs),
        }
    }
}

/// Overview statistics; each stat falls back on its own.
pub fn stats(attrs: &Attributes) -> Vec<Stat> {
    STAT_FIELDS
        .iter()
        .map(|&(label, key, fallback)| match attrs.get(key).and_then(display_text) {
            Some(value) => Stat {
                label,
                value,
                source: DataSource::Verified,
            },
            None => Stat {
                label,
                value: fallback.to_string(),
                source: DataSource::Placeholder,
            },
        })
        .collect()
}

pub fn top_tracks(attrs: &Attributes) -> ListView<Track> {
    match list_attribute(attrs, TRACK_KEYS) {
        Some(items) => ListView {
            entries: items.iter().take(MAX_LIST_ENTRIES).map(track_from).collect(),
            source: DataSource::Verified,
        },
        None => ListView {
            entries: PLACEHOLDER_TRACKS
                .iter()
                .map(|&(name, artist, plays)| Track {
                    name: name.to_string(),
                    artist: artist.to_string(),
                    plays: plays.to_string(),
                })
                .collect(),
            source: DataSource::Placeholder,
        },
    }
}

pub fn top_artists(attrs: &Attributes) -> ListView<Artist> {
    match list_attribute(attrs, ARTIST_KEYS) {
        Some(items) => ListView {
            entries: items.iter().take(MAX_LIST_ENTRIES).map(artist_from).collect(),
            source: DataSource::Verified,
        },
        None => ListView {
            entries: PLACEHOLDER_ARTISTS
                .iter()
                .map(|&(name, genre)| Artist {
                    name: name.to_string(),
                    genre: genre.to_string(),
                })
                .collect(),
            source: DataSource::Placeholder,
        },
    }
}

/// The first present attribute among `keys`, as a non-empty list.
///
/// Lists may arrive JSON-encoded in a string.
fn list_attribute(attrs: &Attributes, keys: &[&str]) -> Option<Vec<Value>> {
    let (key, value) = keys
        .iter()
        .find_map(|&k| attrs.get(k).filter(|v| is_truthy(v)).map(|v| (k, v)))?;

    let items = match value {
        Value::Array(items) => items.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                debug!(key, "encoded attribute is not a list");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "encoded list attribute failed to parse");
                return None;
            }
        },
        _ => {
            debug!(key, "list attribute has unexpected type");
            return None;
        }
    };

    (!items.is_empty()).then_some(items)
}

fn field_text(entry: &Value, field: &str) -> Option<String> {
    entry.get(field).and_then(display_text)
}

fn track_from(entry: &Value) -> Track {
    if let Value::String(name) = entry {
        return Track {
            name: name.clone(),
            artist: UNKNOWN_ARTIST.to_string(),
            plays: UNKNOWN_PLAYS.to_string(),
        };
    }
    Track {
        name: field_text(entry, "name").unwrap_or_else(|| UNKNOWN_TRACK.to_string()),
        artist: field_text(entry, "artist").unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        plays: field_text(entry, "plays").unwrap_or_else(|| UNKNOWN_PLAYS.to_string()),
    }
}

fn artist_from(entry: &Value) -> Artist {
    if let Value::String(name) = entry {
        return Artist {
            name: name.clone(),
            genre: UNKNOWN_GENRE.to_string(),
        };
    }
    Artist {
        name: field_text(entry, "name").unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        genre: field_text(entry, "genre").unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
    }
}
