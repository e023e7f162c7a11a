//! Arena identifiers.

use slotmap::{Key, KeyData};

slotmap::new_key_type! {
    /// Stable handle of a shape node inside a shape tree arena.
    pub struct NodeId;
}

impl NodeId {
    /// Raw value, useful for logging and script files.
    pub fn as_u64(self) -> u64 {
        self.data().as_ffi()
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(KeyData::from_ffi(value))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.as_u64())
    }
}
