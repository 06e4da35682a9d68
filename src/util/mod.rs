//! Helpers for the terminal front end.
//!
//! - **Instance URLs**: turning user input into the base URL the client expects
//! - **Text**: sanitizing remote text and fitting it to the terminal width

mod instance_url;
mod text;

pub use instance_url::{normalize_instance_url, InstanceUrlError};
pub use text::{display_width, strip_control_chars, truncate_to_width, wrap_to_width};
