use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::column::utils;

/// Convert epoch milliseconds to a naive datetime.
pub fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Convert a naive datetime to epoch milliseconds.
pub fn datetime_to_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

/// 1970-01-01 00:00:00, the default fill for missing datetimes.
pub fn unix_epoch() -> NaiveDateTime {
    chrono::DateTime::UNIX_EPOCH.naive_utc()
}

/// Structure representing a Datetime column.
///
/// Values are stored as epoch milliseconds; accessors convert to
/// `chrono::NaiveDateTime`.
#[derive(Debug, Clone)]
pub struct DatetimeColumn {
    pub(crate) data: Arc<[i64]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
}

impl DatetimeColumn {
    /// Create a column from naive datetimes without nulls
    pub fn new(values: Vec<NaiveDateTime>) -> Self {
        let data: Vec<i64> = values.into_iter().map(datetime_to_millis).collect();
        Self {
            data: data.into(),
            null_mask: None,
        }
    }

    /// Create a column from raw epoch-millisecond values and null flags
    pub fn from_millis(data: Vec<i64>, nulls: Vec<bool>) -> Self {
        let null_mask = utils::create_bitmask(&nulls);
        Self {
            data: data.into(),
            null_mask,
        }
    }

    /// Create a column from optional datetimes; `None` becomes null.
    pub fn from_options(values: Vec<Option<NaiveDateTime>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(|v| v.is_none()).collect();
        let data: Vec<i64> = values
            .into_iter()
            .map(|v| v.map(datetime_to_millis).unwrap_or(0))
            .collect();
        Self::from_millis(data, nulls)
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

    /// Get the datetime at the specified index; `None` for nulls or out of
    /// range.
    pub fn get(&self, index: usize) -> Option<NaiveDateTime> {
        self.get_millis(index).and_then(millis_to_datetime)
    }

    /// Get the raw epoch milliseconds at the specified index.
    pub fn get_millis(&self, index: usize) -> Option<i64> {
        if index >= self.data.len() || self.is_null(index) {
            return None;
        }
        Some(self.data[index])
    }

    /// Iterate values in row order
    pub fn iter(&self) -> impl Iterator<Item = Option<NaiveDateTime>> + '_ {
        (0..self.data.len()).map(move |i| self.get(i))
    }
}
