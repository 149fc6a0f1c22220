pub mod ai;
pub mod factory;
