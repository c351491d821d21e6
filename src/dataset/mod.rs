pub mod generate;
pub mod naming;
pub mod record;

pub use generate::{generate_dataset, write_dataset};
pub use naming::{dataset_file_name, latest_dataset, list_datasets, parse_generated_at};
pub use record::{generate_records, Record, COLUMNS, ROWS_PER_FILE};
