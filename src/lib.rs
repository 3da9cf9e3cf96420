pub mod bridge;
pub mod config;
pub mod export;
pub mod qbxml;
