// XML marshaling for GMP requests and responses.

pub mod document;
pub mod element;

pub use document::{Document, Node};
pub use element::{Element, Params, params};
