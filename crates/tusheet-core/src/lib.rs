//! Core types: task records, month partitions, identifier tag, serial conversion

pub mod identifier;
pub mod partition;
pub mod serial;
pub mod task;
pub mod tracing;
pub mod uid;

pub use identifier::{APP_VERSION, identifier_cell_value, parse_identifier};
pub use partition::{is_month_partition, month_partition_name};
pub use serial::{CellValue, date_to_string, time_to_string};
pub use task::{HEADER_ROW, SpreadsheetInfo, Task};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use uid::generate_uid;
