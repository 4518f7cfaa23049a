pub mod agenda;
pub mod cmds;
pub mod config;
pub mod context;
pub mod datekey;
pub mod error;
pub mod planner;
pub mod schedule;
pub mod storage;
pub mod theme;
