pub mod capture;
pub mod label;
pub mod snapshot_model;
