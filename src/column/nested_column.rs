use std::sync::Arc;

use serde_json::Value;

use crate::column::utils;

/// Column of structured (object/array) values from JSON ingestion.
///
/// No transform understands these; the materializer drops them with a
/// notice. Kept only so a loaded dataset round-trips its schema faithfully
/// until materialization.
#[derive(Debug, Clone)]
pub struct NestedColumn {
    pub(crate) data: Arc<[Value]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
}

impl NestedColumn {
    /// Create a column from optional JSON values; `None` becomes null.
    pub fn from_options(values: Vec<Option<Value>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(|v| v.is_none()).collect();
        let data: Vec<Value> = values
            .into_iter()
            .map(|v| v.unwrap_or(Value::Null))
            .collect();
        Self {
            data: data.into(),
            null_mask: utils::create_bitmask(&nulls),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_null(&self, index: usize) -> bool {
        match &self.null_mask {
            Some(mask) => utils::is_set(mask, index),
            None => false,
        }
    }

    pub fn null_count(&self) -> usize {
        match &self.null_mask {
            Some(mask) => utils::count_set(mask, self.data.len()),
            None => 0,
        }
    }

    /// Get the value at the specified index; `None` for nulls or out of
    /// range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        if index >= self.data.len() || self.is_null(index) {
            return None;
        }
        Some(&self.data[index])
    }
}
