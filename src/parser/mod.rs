//! Manuscript markup parsing.

mod assembler;
mod block;
mod companion;
mod image;
mod inline;
mod options;
mod source;
mod symbols;
mod table;

pub use assembler::{Assembly, AssemblyStats, DocumentAssembler, FigureRef};
pub use block::{classify, decode_image_path, SourceBlock};
pub use companion::{figures_document, tables_document, title_page_document};
pub use image::{ImageResolver, ResolvedImage};
pub use inline::{format_inline, strip_markup};
pub use options::{FigureMode, ParseOptions};
pub use source::SourceDocument;
pub use symbols::normalize_symbols;
pub use table::{is_separator_row, TableAccumulator};
