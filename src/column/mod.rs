mod common;
mod datetime_column;
mod float64_column;
mod int64_column;
mod nested_column;
mod string_column;

pub use common::{utils, Cell, Column, ColumnType};
pub use datetime_column::{datetime_to_millis, millis_to_datetime, unix_epoch, DatetimeColumn};
pub use float64_column::Float64Column;
pub use int64_column::Int64Column;
pub use nested_column::NestedColumn;
pub use string_column::StringColumn;
