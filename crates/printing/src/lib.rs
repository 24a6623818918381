//! Page layout, PDF rendering and print spooling shared by GUI/CLI components.

pub mod layout;
pub mod pdf;
pub mod platform;

pub use layout::{layout_single_page, paginate, PageLayout, PageSetup, PlacedLine, POINTS_PER_MM};
pub use pdf::{export_single_page, render_pages, render_paginated, PdfError};
pub use platform::{print_text, PrintError, PrintSpooler, PrintSummary, SpoolRequest, SystemSpooler};
