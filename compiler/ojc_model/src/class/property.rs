//! Declared properties.

use bitflags::bitflags;
use ojc_ir::ast::PropertyAttribute;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Attribute flags from a `@property (...)` list.
    ///
    /// Only `READONLY` affects code generation; the memory-policy flags are
    /// kept so persisted state round-trips what was declared.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
    pub struct PropertyFlags: u8 {
        const READONLY = 1 << 0;
        const COPY = 1 << 1;
        const STRONG = 1 << 2;
        const WEAK = 1 << 3;
        const ATOMIC = 1 << 4;
        const NONATOMIC = 1 << 5;
    }
}

/// How a property obtains its backing storage and accessors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Synthesis {
    /// No directive; synthesized onto `_name` during prepare.
    Automatic,
    /// `@synthesize name` or `@synthesize name = ivar`.
    Explicit,
    /// `@dynamic name`: accessors are provided elsewhere.
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub type_name: String,
    pub flags: PropertyFlags,
    pub getter: String,
    /// `None` for readonly properties.
    pub setter: Option<String>,
    /// Backing ivar; `None` until synthesis decides, and for dynamic properties.
    pub ivar: Option<String>,
    pub synthesis: Synthesis,
    pub generates_getter: bool,
    pub generates_setter: bool,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        attributes: &[PropertyAttribute],
    ) -> Self {
        let name = name.into();
        let mut flags = PropertyFlags::empty();
        let mut getter = None;
        let mut setter = None;

        for attribute in attributes {
            match attribute {
                PropertyAttribute::ReadOnly => flags.insert(PropertyFlags::READONLY),
                PropertyAttribute::ReadWrite => flags.remove(PropertyFlags::READONLY),
                PropertyAttribute::Copy => flags.insert(PropertyFlags::COPY),
                PropertyAttribute::Strong => flags.insert(PropertyFlags::STRONG),
                PropertyAttribute::Weak => flags.insert(PropertyFlags::WEAK),
                PropertyAttribute::Atomic => flags.insert(PropertyFlags::ATOMIC),
                PropertyAttribute::NonAtomic => flags.insert(PropertyFlags::NONATOMIC),
                PropertyAttribute::Getter(name) => getter = Some(name.clone()),
                PropertyAttribute::Setter(name) => setter = Some(name.clone()),
            }
        }

        let setter = if flags.contains(PropertyFlags::READONLY) {
            None
        } else {
            Some(setter.unwrap_or_else(|| setter_name(&name)))
        };

        Property {
            getter: getter.unwrap_or_else(|| name.clone()),
            setter,
            name,
            type_name: type_name.into(),
            flags,
            ivar: None,
            synthesis: Synthesis::Automatic,
            generates_getter: false,
            generates_setter: false,
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.flags.contains(PropertyFlags::READONLY)
    }
}

/// `count` → `setCount:`.
fn setter_name(property: &str) -> String {
    let mut chars = property.chars();
    let mut out = String::from("set");
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
    }
    out.push_str(chars.as_str());
    out.push(':');
    out
}
