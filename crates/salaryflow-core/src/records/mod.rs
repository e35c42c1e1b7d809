mod export;
mod store;

pub use export::{display_time, export_filename, records_to_csv, CSV_HEADER};
pub use store::{Record, RecordStore, SortOrder, LATEST_CAPACITY};
