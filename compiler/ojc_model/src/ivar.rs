//! Instance variables.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ivar {
    pub name: String,
    pub class_name: String,
    pub type_name: String,
    /// Created to back a property.
    pub synthesized: bool,
}

impl Ivar {
    pub fn new(
        name: impl Into<String>,
        class_name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Ivar {
            name: name.into(),
            class_name: class_name.into(),
            type_name: type_name.into(),
            synthesized: false,
        }
    }
}
