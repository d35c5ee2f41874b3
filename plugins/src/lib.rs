pub mod checks;
pub mod editor;
pub mod factory;
pub mod http;
pub mod planner;
pub mod process;
pub mod repo;
pub mod search;
pub mod services;
