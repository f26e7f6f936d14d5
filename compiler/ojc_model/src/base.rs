//! Fixed names known to the runtime base object.

/// Selectors implemented by the runtime base object. These are always
/// considered known and keep their plain names in output.
pub const BASE_OBJECT_SELECTORS: &[&str] = &[
    "alloc",
    "class",
    "className",
    "copy",
    "description",
    "hash",
    "init",
    "instancesRespondToSelector:",
    "isEqual:",
    "isKindOfClass:",
    "isMemberOfClass:",
    "isSubclassOfClass:",
    "mutableCopy",
    "new",
    "performSelector:",
    "performSelector:withObject:",
    "performSelector:withObject:withObject:",
    "respondsToSelector:",
    "superclass",
    "toString",
    "valueOf",
];

/// Base-object selectors that classes may not define themselves.
pub const RESERVED_SELECTORS: &[&str] = &[
    "alloc",
    "class",
    "className",
    "instancesRespondToSelector:",
    "isKindOfClass:",
    "isMemberOfClass:",
    "isSubclassOfClass:",
    "performSelector:",
    "performSelector:withObject:",
    "performSelector:withObject:withObject:",
    "respondsToSelector:",
    "superclass",
];

pub fn is_base_object_selector(selector: &str) -> bool {
    BASE_OBJECT_SELECTORS.contains(&selector)
}

pub fn is_reserved_selector(selector: &str) -> bool {
    RESERVED_SELECTORS.contains(&selector)
}

/// Canonical base types every model starts with.
pub(crate) const BASE_TYPES: &[&str] = &["Array", "Boolean", "Number", "Object", "String", "Symbol"];

pub(crate) const BOOLEAN_ALIASES: &[&str] = &["boolean", "BOOL", "Bool", "bool"];

pub(crate) const NUMBER_ALIASES: &[&str] =
    &["number", "double", "float", "int", "char", "short", "long"];
