//! Body output destinations.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::STDOUT_OUTPUT_MARKER;
use crate::error_handling::{CurlError, Stage};

/// Where the response body goes.
pub enum OutputSink<'a> {
    /// The caller's primary stream. `newline` appends a line break after the
    /// body.
    Primary {
        out: &'a mut (dyn Write + Send),
        newline: bool,
    },
    File { path: PathBuf, out: BufWriter<File> },
}

impl<'a> OutputSink<'a> {
    /// Opens the destination for `output_file`.
    ///
    /// `None` and `-` both select the primary stream; only `None` gets the
    /// trailing newline.
    pub fn open(
        output_file: Option<&Path>,
        primary: &'a mut (dyn Write + Send),
    ) -> Result<Self, CurlError> {
        match output_file {
            None => Ok(OutputSink::Primary {
                out: primary,
                newline: true,
            }),
            Some(path) if path.as_os_str() == STDOUT_OUTPUT_MARKER => Ok(OutputSink::Primary {
                out: primary,
                newline: false,
            }),
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    CurlError::output(
                        Stage::Rendering,
                        format!("failed to create output file {}", path.display()),
                        e,
                    )
                })?;
                Ok(OutputSink::File {
                    path: path.to_path_buf(),
                    out: BufWriter::new(file),
                })
            }
        }
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), CurlError> {
        let result = match self {
            OutputSink::Primary { out, .. } => out.write_all(chunk),
            OutputSink::File { out, .. } => out.write_all(chunk),
        };
        result.map_err(|e| self.error(e))
    }

    /// Writes the trailing newline (primary only) and flushes.
    pub fn finish(mut self) -> Result<(), CurlError> {
        let result = match &mut self {
            OutputSink::Primary { out, newline } => {
                let written = if *newline { writeln!(out) } else { Ok(()) };
                written.and_then(|_| out.flush())
            }
            OutputSink::File { out, .. } => out.flush(),
        };
        result.map_err(|e| self.error(e))
    }

    fn error(&self, e: std::io::Error) -> CurlError {
        let context = match self {
            OutputSink::Primary { .. } => "failed to write response body".to_string(),
            OutputSink::File { path, .. } => {
                format!("failed to write response body to {}", path.display())
            }
        };
        CurlError::output(Stage::Rendering, context, e)
    }
}
