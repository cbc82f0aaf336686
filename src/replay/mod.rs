pub mod apply;
pub mod locator;
pub mod pacing;
pub mod replay;
pub mod strategy;
