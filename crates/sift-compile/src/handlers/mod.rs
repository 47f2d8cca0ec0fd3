//! Node handlers.
//!
//! Each handler compiles one kind of syntax-tree node into a [`crate::Fragment`]. Words and
//! phrase handlers combine their text fragment with the statement matches of the entities
//! recognized for the node.

mod entities;
mod phrase;
mod text;
mod words;

pub use entities::EntitiesHandler;
pub use phrase::PhraseHandler;
pub use text::TextHandler;
pub use words::WordsHandler;
