pub mod agent;
pub mod cluster;
pub mod command;
pub mod observer;
pub mod runtime;

pub mod test_utils;
