//! Interactive console front end: menu parsing, rendering, and the
//! input loop that drives a negotiation.

pub mod menu;
pub mod render;
pub mod shell;

pub use menu::MenuAction;
pub use render::{alignment_text, Painter};
pub use shell::Console;
