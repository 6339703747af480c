//! Utility functions for common operations.
//!
//! - **URL validation**: which links may be opened, which endpoints may receive writes
//! - **HTTP bodies**: size-capped response reads shared by every client
//! - **Text processing**: terminal-safe rendering of page data
//!
//! # Examples
//!
//! ```
//! use linkpage::util::{strip_control_chars, validate_url_for_open};
//!
//! assert!(validate_url_for_open("https://example.com").is_ok());
//! assert_eq!(strip_control_chars("\u{1b}[1mBOLD"), "BOLD");
//! ```

mod http;
mod text;
mod url_validator;

pub use http::{read_limited_text, BodyError};
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_endpoint, validate_url_for_open, UrlValidationError};
