//! Export module for RefScrn
//!
//! Writes the exported selection to disk or to the system clipboard.

mod clipboard;
mod file;

pub use clipboard::{copy_image, copy_text};
pub use file::{default_file_name, default_save_dir, save_image, ExportFormat};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("Nothing to export")]
    Empty,
}

pub type ExportResult<T> = Result<T, ExportError>;
