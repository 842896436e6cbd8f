// Database module for the Audoji engine
// SQLite persistence: connection manager, migrations, models and repositories

mod manager;
mod migrations;
pub mod models;

mod audio_files_repo;
mod categories_repo;
mod segments_repo;
mod selections_repo;

pub use manager::DatabaseManager;
