//! # wipctl-renderer
//!
//! Tera-based Markdown rendering of workspace reports.
//!
//! ```rust,no_run
//! use wipctl_core::report::{Operation, Report};
//! use wipctl_renderer::ReportRenderer;
//!
//! fn show(report: &Report) {
//!     if let Ok(renderer) = ReportRenderer::new() {
//!         if let Ok(markdown) = renderer.render(report) {
//!             println!("{markdown}");
//!         }
//!     }
//! }
//! # let _ = show(&Report::new(Operation::Push, ".", false));
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{outcome_icon, ReportContext};
pub use engine::{template_name, ReportRenderer};
pub use error::RenderError;
