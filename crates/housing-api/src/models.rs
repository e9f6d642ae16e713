// Wire types for the housing API, identity API and sample document.
//
// Field names follow the server's camelCase JSON. Nothing here validates
// business rules: the server is the authority on capacity and occupancy.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Identifiers ─────────────────────────────────────────────────────

/// Floor or room number. The server sends either integers or strings
/// (`4`, `"4b"`, `"401"`) and they are displayed as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl Identifier {
    /// Compare against user input regardless of the wire representation.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            Self::Number(n) => raw.trim().parse::<i64>().is_ok_and(|r| r == *n),
            Self::Text(s) => s == raw.trim(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

// ── Floors & rooms ──────────────────────────────────────────────────

/// `{ "floors": [...] }`, returned by `rooms`, `reserve`,
/// `deleteReservation`, and the static sample document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorsResponse {
    pub floors: Vec<Floor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub number: Identifier,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub number: Identifier,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub occupants: Occupants,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgpath: Option<RoomShape>,
}

/// Occupancy as sent by the server: a bare count or the occupant names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Occupants {
    Count(u32),
    Names(Vec<String>),
}

impl Default for Occupants {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl Occupants {
    pub fn count(&self) -> u32 {
        match self {
            Self::Count(n) => *n,
            Self::Names(names) => u32::try_from(names.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Occupancy relative to capacity. `Overfull` is a server-side discrepancy
/// the client only displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Empty,
    Partial,
    Full,
    Overfull,
}

impl Room {
    pub fn occupancy(&self) -> Occupancy {
        let occupants = self.occupants.count();
        if occupants == 0 {
            Occupancy::Empty
        } else if occupants > self.capacity {
            Occupancy::Overfull
        } else if occupants == self.capacity {
            Occupancy::Full
        } else {
            Occupancy::Partial
        }
    }

    /// Occupant names from either `occupantNames` or a name-list `occupants`.
    pub fn names(&self) -> &[String] {
        match (&self.occupant_names, &self.occupants) {
            (Some(names), _) | (None, Occupants::Names(names)) => names,
            (None, Occupants::Count(_)) => &[],
        }
    }
}

/// Background outline of a room: a numeric shape id or literal SVG path data.
/// Carried through unchanged; the client does not draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomShape {
    Id(u32),
    Path(String),
}

// ── Reservation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub room_number: Identifier,
}

// ── Admin ───────────────────────────────────────────────────────────

/// A named admin collection (`"student list"`, `"room list"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminList {
    pub key: String,
    #[serde(default)]
    pub strings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStatus {
    pub is_open: bool,
}

// ── Identity ────────────────────────────────────────────────────────

/// `oauth2.userinfo.get` response (only the fields the client reads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Userinfo {
    #[serde(default)]
    pub email: Option<String>,
}
