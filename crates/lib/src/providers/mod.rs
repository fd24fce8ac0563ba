pub mod ai;
pub mod db;
pub mod object;
