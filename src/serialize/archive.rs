//! ZIP bundles for multi-page PNG and SVG exports.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::SheetError;

/// In-memory archive of `page-1.{ext}`, `page-2.{ext}`, ...
///
/// Entries carry a fixed timestamp so identical pages give identical archives.
pub struct PageArchive {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    extension: &'static str,
    options: SimpleFileOptions,
    entries: usize,
}

impl PageArchive {
    pub fn new(extension: &'static str) -> Self {
        // PNG payloads are already deflated.
        let method = if extension == "png" {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            extension,
            options: SimpleFileOptions::default()
                .compression_method(method)
                .last_modified_time(DateTime::default()),
            entries: 0,
        }
    }

    /// Append the next page.
    pub fn add(&mut self, data: &[u8]) -> Result<(), SheetError> {
        self.zip
            .start_file(entry_name(self.entries, self.extension), self.options)?;
        self.zip.write_all(data)?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn finish(self) -> Result<Vec<u8>, SheetError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

/// Archive entry name for the zero-based page `index`.
pub fn entry_name(index: usize, extension: &str) -> String {
    format!("page-{}.{}", index + 1, extension)
}
