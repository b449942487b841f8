//! Markdown to paginated PDF and DOCX documents.
//!
//! The crate has three layers:
//!
//! - [`Assembler`] classifies markdown into blocks, renders diagrams, lays
//!   out tables and drives one [`ElementSink`] per document
//! - [`DocumentBackend`] implementations turn a [`RenderRequest`] into bytes,
//!   either through an element sink (genpdf, docx-rs) or an external
//!   converter (`weasyprint`, `pandoc`)
//! - [`Orchestrator`] tries the backends for a format in priority order,
//!   skipping those whose [`BackendCapabilities`] flag is off and accepting
//!   only output that passes [`RenderArtifact::validate`]
//!
//! [`Pipeline`] wires all of this from a [`press_config::Config`].

mod artifact;
mod assembler;
mod backend;
mod capabilities;
pub mod docx;
mod error;
mod orchestrator;
pub mod pdf;
mod pipeline;
mod request;
mod sink;

pub use artifact::{OutputFormat, RenderArtifact};
pub use assembler::Assembler;
pub use backend::DocumentBackend;
pub use capabilities::BackendCapabilities;
pub use error::{BackendFailure, DocumentError, RenderError};
pub use orchestrator::Orchestrator;
pub use pipeline::{Pipeline, build_diagram_chain};
pub use request::{RenderRequest, document_title};
pub use sink::{ElementSink, LayoutCell, LayoutRow, LayoutTable};
