pub mod document;
pub mod operations;
