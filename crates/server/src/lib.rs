pub mod errors;
pub mod inputs;
pub mod routes;
pub mod startup;

pub use startup::run;
