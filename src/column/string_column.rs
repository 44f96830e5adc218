use std::sync::Arc;

use crate::column::utils;

/// Structure representing a String column
#[derive(Debug, Clone)]
pub struct StringColumn {
    pub(crate) data: Arc<[String]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
}

impl StringColumn {
    /// Create a new StringColumn without nulls
    pub fn new(data: Vec<String>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
        }
    }

    /// Create a StringColumn with NULL values
    pub fn with_nulls(data: Vec<String>, nulls: Vec<bool>) -> Self {
        let null_mask = utils::create_bitmask(&nulls);
        Self {
            data: data.into(),
            null_mask,
        }
    }

    /// Create a column from optional values; `None` becomes null.
    pub fn from_options(values: Vec<Option<String>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(|v| v.is_none()).collect();
        let data: Vec<String> = values.into_iter().map(|v| v.unwrap_or_default()).collect();
        Self::with_nulls(data, nulls)
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

    /// Get data at the specified index; `None` for nulls or out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        if index >= self.data.len() || self.is_null(index) {
            return None;
        }
        Some(&self.data[index])
    }

    /// Iterate values in row order
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        (0..self.data.len()).map(move |i| self.get(i))
    }
}
