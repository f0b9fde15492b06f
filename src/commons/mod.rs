pub mod basic_functions;

pub use basic_functions::{normalize_id, normalize_id_str, sentence_case};

use std::path::PathBuf;

pub const TEMP_PATH: &str = "./temp";

pub fn get_temp_path() -> PathBuf {
    PathBuf::from(TEMP_PATH)
}
