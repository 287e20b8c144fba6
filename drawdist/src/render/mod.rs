//! Turning an assembled `Diagram` into a document.

use trail::Diagram;

use crate::error::DrawError;

pub use tikz::TikzRenderer;

pub mod tikz;

/// Renders a diagram into the text of one output document. Writing it anywhere is up to the
/// caller.
pub trait DiagramRenderer {
    fn render(&self, diagram: &Diagram) -> Result<String, DrawError>;

    /// File extension of the produced document.
    fn extension(&self) -> &'static str;
}
