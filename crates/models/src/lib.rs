pub mod db;
pub mod errors;
pub mod movie;
pub mod review;
pub mod user;
