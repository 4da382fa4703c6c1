use std::collections::BTreeMap;


/// Collects named field values for a submit handler.
///
/// Purely a collection boundary: fields are untyped strings, nothing is
/// validated, and submitting forwards a flat field-name to value mapping.
#[derive(Clone, Debug, Default)]
pub struct Form {
    fields: BTreeMap<String, String>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current value of one named field, replacing any previous
    /// value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Forwards the collected fields to `handler`.
    pub fn submit(&self, handler: impl FnOnce(&BTreeMap<String, String>)) {
        handler(&self.fields);
    }
}
