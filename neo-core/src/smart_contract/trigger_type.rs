use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution phase a script runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TriggerType {
    /// System script run before any transaction of a block.
    OnPersist = 0x01,
    /// System script run after every transaction of a block.
    PostPersist = 0x02,
    /// A transaction script.
    Application = 0x40,
}

impl TriggerType {
    /// True for the two protocol-mandated block phases.
    pub fn is_system(self) -> bool {
        matches!(self, Self::OnPersist | Self::PostPersist)
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnPersist => "OnPersist",
            Self::PostPersist => "PostPersist",
            Self::Application => "Application",
        };
        f.write_str(name)
    }
}
