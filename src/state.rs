use serde::{Deserialize, Serialize};
use std::fmt;

/// Which animation the cat is showing. The panel wire name for `Bounce` is `dvd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatState {
    #[default]
    Idle,
    Typing,
    #[serde(rename = "dvd")]
    Bounce,
}

impl CatState {
    pub fn label(self) -> &'static str {
        match self {
            CatState::Idle => "Idle",
            CatState::Typing => "coding murmurcat murmuring...",
            CatState::Bounce => "OIIAI!",
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            CatState::Idle => "idle",
            CatState::Typing => "typing",
            CatState::Bounce => "dvd",
        }
    }

    pub fn is_active(self) -> bool {
        self != CatState::Idle
    }
}

impl fmt::Display for CatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
