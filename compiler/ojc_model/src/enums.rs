//! Enum declarations.

use serde::{Deserialize, Serialize};

/// An enum; anonymous enums only contribute their members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    pub name: Option<String>,
    pub unsigned: bool,
    /// Members in declaration order, values already filled in.
    pub members: Vec<(String, i64)>,
}

impl Enum {
    pub fn new(name: Option<String>, unsigned: bool, members: Vec<(String, i64)>) -> Self {
        Enum {
            name,
            unsigned,
            members,
        }
    }

    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| *value)
    }
}
