use super::Value;

/// A host object that exposes named suffixes (`ship:altitude`).
///
/// Suffix names arrive lower-cased. Implementations use interior mutability
/// for `set_suffix` since values are shared through `Rc`.
pub trait Structure {
    fn type_name(&self) -> &str;

    /// `None` when the object has no such suffix.
    fn get_suffix(&self, name: &str) -> Option<Value>;

    /// Returns `false` when the suffix does not exist or is read-only.
    fn set_suffix(&self, _name: &str, _value: Value) -> bool {
        false
    }

    fn describe(&self) -> String {
        self.type_name().to_string()
    }
}
