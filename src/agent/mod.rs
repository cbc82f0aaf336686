pub mod agent;
pub mod agent_model;
pub mod coordinator;
pub mod error;
