pub mod catalog;
pub mod loadtest;
