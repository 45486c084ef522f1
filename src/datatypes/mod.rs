pub mod column;
pub mod document;
