pub mod clear;
pub mod config;
pub mod context;
pub mod movies;
