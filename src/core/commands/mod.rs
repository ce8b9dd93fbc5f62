// Core command module - the dispatch contract and invocation parsing.
// Concrete commands live in the Discord layer; nothing here knows about them.

pub mod command_dispatch;
pub mod command_parser;

pub use command_dispatch::*;
pub use command_parser::parse_invocation;
