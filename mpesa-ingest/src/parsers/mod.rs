pub mod csv_dir;
pub mod tabula_json;

pub use csv_dir::{read_csv_dir, read_csv_table};
pub use tabula_json::{parse_tabula_json, read_tabula_json};
