pub mod config;
pub mod logging;

pub mod archive;
pub mod augment;
pub mod catalog;
pub mod checksum;
pub mod error;
pub mod fetch;
pub mod http;
pub mod install;
pub mod jobs;
pub mod mirrors;
pub mod patch;
pub mod pipeline;
pub mod service;
pub mod storage;
