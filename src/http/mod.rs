//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the handler: response builders, MIME
//! mapping, path decoding and conditional request evaluation.

pub mod conditional;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_403_response, build_404_response, build_405_response,
    build_file_response, build_html_response, build_redirect_response,
};
