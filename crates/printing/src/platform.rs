use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use log::{debug, info};
use thiserror::Error;

use crate::layout::{paginate, PageSetup};
use crate::pdf::{render_pages, PdfError};

/// 列印流程中的錯誤。 / Errors raised while printing.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("printing is not supported on this platform")]
    Unsupported,
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("failed to stage the print file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Spooler {
        program: &'static str,
        status: String,
        stderr: String,
    },
}

/// A rendered document handed to the spooler.
/// 交給列印佇列的已渲染文件。
#[derive(Debug, Clone, Copy)]
pub struct SpoolRequest<'a> {
    pub job_name: &'a str,
    pub document: &'a Path,
    pub pages: u32,
}

/// Abstraction over the platform print queue.
/// 平台列印佇列的抽象介面。
pub trait PrintSpooler {
    fn spool(&self, request: &SpoolRequest<'_>) -> Result<(), PrintError>;
}

/// Outcome of a successful print request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintSummary {
    pub pages: u32,
}

/// Spools PDF files through the system `lp`/`lpr` command.
/// 透過系統 `lp`/`lpr` 指令送出 PDF。
#[derive(Debug, Clone, Copy)]
pub struct SystemSpooler {
    program: Option<&'static str>,
}

impl SystemSpooler {
    pub fn detect() -> Self {
        let program = if cfg!(target_os = "macos") {
            Some("lpr")
        } else if cfg!(unix) {
            Some("lp")
        } else {
            None
        };
        Self { program }
    }

    pub fn program(&self) -> Option<&'static str> {
        self.program
    }
}

impl Default for SystemSpooler {
    fn default() -> Self {
        Self::detect()
    }
}

impl PrintSpooler for SystemSpooler {
    fn spool(&self, request: &SpoolRequest<'_>) -> Result<(), PrintError> {
        let program = self.program.ok_or(PrintError::Unsupported)?;
        let title_flag = if program == "lpr" { "-T" } else { "-t" };
        debug!(
            "spooling {} ({} pages) via {program}",
            request.document.display(),
            request.pages
        );
        let output = Command::new(program)
            .arg(title_flag)
            .arg(request.job_name)
            .arg(request.document)
            .output()
            .map_err(|source| PrintError::Launch { program, source })?;
        if !output.status.success() {
            return Err(PrintError::Spooler {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Paginates the text, renders it to a temporary PDF and hands it to the spooler.
///
/// The temporary file is removed once the spooler returns, on success or failure.
pub fn print_text(
    text: &str,
    setup: &PageSetup,
    spooler: &dyn PrintSpooler,
) -> Result<PrintSummary, PrintError> {
    let pages = paginate(text, setup);
    let bytes = render_pages(&pages, setup)?;

    let mut staged = tempfile::Builder::new()
        .prefix("textpad-print-")
        .suffix(".pdf")
        .tempfile()?;
    staged.write_all(&bytes)?;
    staged.flush()?;

    let summary = PrintSummary {
        pages: pages.len() as u32,
    };
    spooler.spool(&SpoolRequest {
        job_name: setup.title.as_str(),
        document: staged.path(),
        pages: summary.pages,
    })?;
    info!("sent {} page(s) to the printer", summary.pages);
    Ok(summary)
}
