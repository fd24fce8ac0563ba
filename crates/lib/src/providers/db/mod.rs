pub mod sqlite;
pub mod storage;

pub use storage::RecordStore;
