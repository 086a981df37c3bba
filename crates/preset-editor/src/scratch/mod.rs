//! Editing a single prompt's text in a separate scratch document.
//!
//! A scratch document is a Markdown file seeded with the prompt's name as a
//! header and its content as the body ([`format`]). The [`ScratchRegistry`]
//! tracks which prompt each open scratch file belongs to, and the
//! [`sweeper`] reclaims files the host has stopped using.

pub mod format;
mod registry;
pub mod sweeper;

pub use format::{extract_content, render};
pub use registry::{ScratchLink, ScratchRegistry, SweepReport};
pub use sweeper::{SweeperHandle, spawn_sweeper};
