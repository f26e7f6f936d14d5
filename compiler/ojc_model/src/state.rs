//! Persisted model snapshots.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Class, Enum, Protocol, SymbolState};

/// Everything a dependent compile needs from this one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub classes: Vec<Class>,
    pub protocols: Vec<Protocol>,
    pub consts: BTreeMap<String, String>,
    pub enums: Vec<Enum>,
    pub types: BTreeMap<String, String>,
    pub selectors: BTreeSet<String>,
    pub globals: BTreeSet<String>,
    pub squeezed: BTreeSet<String>,
    pub symbols: SymbolState,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to encode model state: {0}")]
    Encode(String),
    #[error("failed to decode model state: {0}")]
    Decode(String),
}

impl ModelState {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StateError> {
        bincode::serialize(self).map_err(|e| StateError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        bincode::deserialize(bytes).map_err(|e| StateError::Decode(e.to_string()))
    }
}
