#![allow(dead_code)]

pub mod fake_tool;
pub mod segment_server;
