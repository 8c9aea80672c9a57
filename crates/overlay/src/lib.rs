//! Overlay core for RefScrn
//!
//! Selection, annotation and export logic for the frozen screenshot overlay.
//! Nothing in here touches the OS or the GUI toolkit.

pub mod annotation;
pub mod assist;
pub mod chrome;
pub mod controller;
pub mod dpi;
pub mod geometry;
pub mod pipeline;
pub mod render;
pub mod selection;

pub use controller::{Command, OverlayController, OverlayKey, PointerButton, ToolbarAction};
pub use dpi::DpiContext;
pub use geometry::{Point, Rectangle};
pub use pipeline::{CapturePipeline, ExportImage};
pub use render::{RasterRenderer, WindowRenderer};
pub use selection::{CursorHint, Handle, HitTarget, SelectionModel};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Render failed: {0}")]
    Render(String),

    #[error("Crop failed: {0}")]
    Crop(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type OverlayResult<T> = Result<T, OverlayError>;
