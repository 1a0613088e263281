//! Document model types for rendered manuscript content.
//!
//! This module defines the intermediate representation (IR) that bridges
//! markup parsing and document serialization. The assembler produces it,
//! and the DOCX, JSON and text writers consume it.

mod block;
mod document;
mod paragraph;
mod resource;
mod table;

pub use block::Block;
pub use document::{Document, Metadata};
pub use paragraph::{Alignment, ListInfo, ListMarker, Paragraph, ParagraphStyle, TextRun, TextStyle};
pub use resource::Resource;
pub use table::{Table, TableCell, TableRow};
