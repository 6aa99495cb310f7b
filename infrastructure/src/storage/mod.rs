//! Storage adapters implementing [`StateStore`](schatphone_application::StateStore)

mod json_file;

pub use json_file::JsonFileStore;
