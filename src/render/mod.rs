//! Rendering module for writing documents to output formats.

mod docx;
mod json;
mod options;
mod text;

pub use docx::{to_docx, write_docx, write_docx_to_writer};
pub use json::{to_json, JsonFormat};
pub use options::{PageSize, RenderOptions};
pub use text::to_text;
