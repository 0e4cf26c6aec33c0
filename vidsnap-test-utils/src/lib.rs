pub mod db;
pub mod fixtures;
pub mod temp;

pub use db::TestDb;
pub use temp::TempDir;
