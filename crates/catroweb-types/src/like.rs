use std::fmt;

use serde::{Deserialize, Serialize};

/// Reaction a user can leave on a program.
///
/// The discriminants are what gets stored in `program_like.type`; the set is
/// closed and the schema enforces it with a CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeType {
    ThumbsUp = 1,
    Smile = 2,
    Love = 3,
    Wow = 4,
}

impl LikeType {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::ThumbsUp),
            2 => Some(Self::Smile),
            3 => Some(Self::Love),
            4 => Some(Self::Wow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "thumbs_up",
            Self::Smile => "smile",
            Self::Love => "love",
            Self::Wow => "wow",
        }
    }
}

impl fmt::Display for LikeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_match_discriminants() {
        for t in [LikeType::ThumbsUp, LikeType::Smile, LikeType::Love, LikeType::Wow] {
            assert_eq!(LikeType::from_i64(t.as_i64()), Some(t));
        }
        assert_eq!(LikeType::from_i64(0), None);
        assert_eq!(LikeType::from_i64(5), None);
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(LikeType::ThumbsUp.to_string(), "thumbs_up");
        assert_eq!(LikeType::Wow.to_string(), "wow");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&LikeType::ThumbsUp).unwrap();
        assert_eq!(json, "\"thumbs_up\"");
        assert!(serde_json::from_str::<LikeType>("\"sad\"").is_err());
    }
}
