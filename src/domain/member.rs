use crate::error::SplitError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// A participant in the shared ledger.
///
/// The set is closed: every known member has a variant, and anything that
/// cannot be recognized is accounted under [`Member::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Member {
    Hong,
    Binh,
    Minh,
    Thang,
    Tuan,
    Quan,
    Hai,
    Other,
}

impl Member {
    pub const COUNT: usize = 8;

    pub const ALL: [Member; Member::COUNT] = [
        Member::Hong,
        Member::Binh,
        Member::Minh,
        Member::Thang,
        Member::Tuan,
        Member::Quan,
        Member::Hai,
        Member::Other,
    ];

    /// Stable identifier used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Member::Hong => "hong",
            Member::Binh => "binh",
            Member::Minh => "minh",
            Member::Thang => "thang",
            Member::Tuan => "tuan",
            Member::Quan => "quan",
            Member::Hai => "hai",
            Member::Other => "other",
        }
    }

    /// Name as people write it in spreadsheets.
    pub fn display_name(&self) -> &'static str {
        match self {
            Member::Hong => "Hồng",
            Member::Binh => "Bình",
            Member::Minh => "Minh",
            Member::Thang => "Thắng",
            Member::Tuan => "Tuấn",
            Member::Quan => "Quân",
            Member::Hai => "Hải",
            Member::Other => "Other",
        }
    }

    /// Looks up a free-text name.
    ///
    /// Matches the exact display name, or the identifier ignoring ASCII case.
    /// Returns `None` for anything else; see [`Member::normalize`] for the
    /// lossy variant.
    pub fn from_name(name: &str) -> Option<Member> {
        let name = name.trim();
        Member::ALL
            .into_iter()
            .find(|m| m.display_name() == name || m.as_str().eq_ignore_ascii_case(name))
    }

    /// Maps a free-text name to a member, falling back to [`Member::Other`].
    pub fn normalize(name: &str) -> Member {
        Member::from_name(name).unwrap_or(Member::Other)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Member {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Member::from_name(s)
            .ok_or_else(|| SplitError::validation(format!("Unknown member '{}'", s.trim())))
    }
}

/// A value for every member, initialized to `T::default()`.
///
/// Backed by a fixed array so there is no "absent key" state: a member that
/// never appears in any expense simply holds the default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberMap<T> {
    values: [T; Member::COUNT],
}

impl<T: Default + Copy> Default for MemberMap<T> {
    fn default() -> Self {
        Self {
            values: [T::default(); Member::COUNT],
        }
    }
}

impl<T> MemberMap<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Member, &T)> {
        Member::ALL.into_iter().zip(self.values.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl<T> Index<Member> for MemberMap<T> {
    type Output = T;

    fn index(&self, member: Member) -> &Self::Output {
        &self.values[member.index()]
    }
}

impl<T> IndexMut<Member> for MemberMap<T> {
    fn index_mut(&mut self, member: Member) -> &mut Self::Output {
        &mut self.values[member.index()]
    }
}

impl<T: Serialize> Serialize for MemberMap<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Member::COUNT))?;
        for (member, value) in self.iter() {
            map.serialize_entry(member.as_str(), value)?;
        }
        map.end()
    }
}
