use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::message::Message;

/// Title given to every freshly created session.
pub const DEFAULT_SESSION_TITLE: &str = "Sesi Kamus Baru";

/// Format used when writing a parsed `created` timestamp.
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const CREATED_PARSE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Creation time of a session.
///
/// Values that fail to parse on load are kept verbatim in `Unparsed` (strings)
/// or `Raw` (any other JSON value) and written back unchanged, so a malformed
/// field never costs the user a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    At(NaiveDateTime),
    Unparsed(String),
    Raw(serde_json::Value),
}

impl Created {
    /// Current local time, truncated to microseconds so it survives a
    /// write/read cycle through [`CREATED_FORMAT`] unchanged.
    pub fn now() -> Self {
        Self::At(Local::now().naive_local().trunc_subsecs(6))
    }

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        for fmt in CREATED_PARSE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Self::At(dt);
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::At(dt.naive_local());
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Self::At(dt);
            }
        }
        Self::Unparsed(raw.to_string())
    }

    /// Strings are parsed; any other JSON value is kept as-is.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(raw) => Self::parse(&raw),
            other => Self::Raw(other),
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::At(dt) => Some(*dt),
            Self::Unparsed(_) | Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for Created {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(dt) => write!(f, "{}", dt.format(CREATED_FORMAT)),
            Self::Unparsed(raw) => f.write_str(raw),
            Self::Raw(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for Created {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Raw(value) => value.serialize(serializer),
            _ => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for Created {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::from_value(serde_json::Value::deserialize(deserializer)?))
    }
}

/// One independent conversation thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub title: String,
    /// `None` only for records loaded from a file that never had the field.
    pub created: Option<Created>,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            created: Some(Created::now()),
            messages: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Messages shown in the transcript: everything except system entries.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_system())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk shape of a session; the id is the key of the surrounding map.
#[derive(Serialize)]
struct RecordRef<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<&'a Created>,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct Record {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default)]
    created: Option<serde_json::Value>,
    #[serde(default)]
    messages: Vec<Message>,
}

fn default_title() -> String {
    DEFAULT_SESSION_TITLE.to_string()
}

impl Record {
    fn into_session(self, id: String) -> Session {
        let created = match self.created {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(Created::from_value(value)),
        };
        Session {
            id,
            title: self.title,
            created,
            messages: self.messages,
        }
    }
}

/// Session id → session, in insertion order.
///
/// Serialized as a JSON object keyed by session id, preserving order on both
/// read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMap {
    sessions: Vec<Session>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn first(&self) -> Option<&Session> {
        self.sessions.first()
    }

    /// Insert a session. An existing entry with the same id is replaced in
    /// place, keeping its position.
    pub fn insert(&mut self, session: Session) {
        match self.position(&session.id) {
            Some(idx) => self.sessions[idx] = session,
            None => self.sessions.push(session),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Session> {
        self.position(id).map(|idx| self.sessions.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }
}

impl FromIterator<Session> for SessionMap {
    fn from_iter<I: IntoIterator<Item = Session>>(iter: I) -> Self {
        let mut map = Self::new();
        for session in iter {
            map.insert(session);
        }
        map
    }
}

impl<'a> IntoIterator for &'a SessionMap {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for SessionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sessions.len()))?;
        for session in &self.sessions {
            let record = RecordRef {
                title: &session.title,
                created: session.created.as_ref(),
                messages: &session.messages,
            };
            map.serialize_entry(&session.id, &record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SessionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SessionMapVisitor;

        impl<'de> Visitor<'de> for SessionMapVisitor {
            type Value = SessionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of session id to session record")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = SessionMap::new();
                while let Some((id, record)) = access.next_entry::<String, Record>()? {
                    map.insert(record.into_session(id));
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(SessionMapVisitor)
    }
}
