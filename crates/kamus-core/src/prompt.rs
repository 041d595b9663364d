//! Translation directions and the system prompt that carries them.

use crate::model::{Message, Role};

/// Instructions sent as the leading system message of every session.
pub const BASE_PROMPT: &str = "
Kamu adalah Kamus Bahasa Interaktif. Tugasmu:
- Menerjemahkan kata/kalimat antar Bahasa Indonesia, Cirebon, dan Sunda
- Jika input hanya 1 kata: tampilkan artinya, sinonim, contoh kalimat, dan konteks
- Jika ada kesalahan ketik, tawarkan saran kata yang benar
";

/// Which way the dictionary should translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    AutoDetect,
    IndonesianToCirebonese,
    IndonesianToSundanese,
    CireboneseToIndonesian,
    SundaneseToIndonesian,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::AutoDetect,
        Direction::IndonesianToCirebonese,
        Direction::IndonesianToSundanese,
        Direction::CireboneseToIndonesian,
        Direction::SundaneseToIndonesian,
    ];

    /// Label shown in the UI and embedded in the system prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AutoDetect => "Deteksi Otomatis",
            Self::IndonesianToCirebonese => "Indonesia ➜ Cirebon",
            Self::IndonesianToSundanese => "Indonesia ➜ Sunda",
            Self::CireboneseToIndonesian => "Cirebon ➜ Indonesia",
            Self::SundaneseToIndonesian => "Sunda ➜ Indonesia",
        }
    }

    /// Stable identifier used in form values and config files.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::AutoDetect => "auto-detect",
            Self::IndonesianToCirebonese => "id-cirebon",
            Self::IndonesianToSundanese => "id-sunda",
            Self::CireboneseToIndonesian => "cirebon-id",
            Self::SundaneseToIndonesian => "sunda-id",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    /// Accepts either the slug or the exact label.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.slug() == s || d.label() == s)
            .ok_or_else(|| format!("unknown translation direction: {s}"))
    }
}

/// Full system prompt for a direction.
pub fn system_prompt(direction: Direction) -> String {
    format!("{BASE_PROMPT}\n\nArah terjemahan: {}", direction.label())
}

/// Make sure `messages` starts with a system entry, prepending one built
/// from `prompt` if not. Lists that already start with a system entry are
/// returned untouched, so applying this twice is the same as applying it once.
pub fn ensure_system_prompt(mut messages: Vec<Message>, prompt: &str) -> Vec<Message> {
    let has_prompt = messages.first().is_some_and(|m| m.role == Role::System);
    if !has_prompt {
        messages.insert(0, Message::system(prompt));
    }
    messages
}

/// Replace the content of the leading system entry with `prompt`, inserting
/// one if the list has none. Returns `true` when anything changed.
pub fn apply_system_prompt(messages: &mut Vec<Message>, prompt: &str) -> bool {
    match messages.first_mut() {
        Some(first) if first.role == Role::System => {
            if first.content == prompt {
                return false;
            }
            first.content = prompt.to_string();
            true
        }
        _ => {
            messages.insert(0, Message::system(prompt));
            true
        }
    }
}
