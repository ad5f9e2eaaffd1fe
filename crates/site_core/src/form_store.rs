use std::sync::Arc;

use shared::domain::{FormField, FormKind, FormRecord};
use tokio::sync::watch;

pub struct FormStore {
    record: watch::Sender<Arc<FormRecord>>,
}

impl FormStore {
    pub fn new() -> Self {
        let (record, _) = watch::channel(Arc::new(FormRecord::default()));
        Self { record }
    }

    pub fn snapshot(&self) -> Arc<FormRecord> {
        Arc::clone(&self.record.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FormRecord>> {
        self.record.subscribe()
    }

    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        self.record
            .send_modify(|current| *current = Arc::new(current.with_field(field, value)));
    }

    /// Input-event variant keyed by the input's `name` attribute. Returns
    /// `false` for names that are not form fields.
    pub fn set_field_by_name(&self, name: &str, value: impl Into<String>) -> bool {
        match FormField::parse(name) {
            Some(field) => {
                self.set_field(field, value);
                true
            }
            None => false,
        }
    }

    pub fn reset(&self) {
        self.record.send_replace(Arc::new(FormRecord::default()));
    }

    pub fn missing_required(&self, kind: FormKind) -> Vec<FormField> {
        self.record.borrow().missing_required(kind)
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/form_store_tests.rs"]
mod tests;
