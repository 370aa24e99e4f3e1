//! Output archive packaging.

use std::io::{Cursor, Write};

use zip::write::{FileOptions, ZipWriter};

use crate::error::PackageError;

/// File name of the markup inside the archive.
pub const ARCHIVE_HTML_NAME: &str = "email_template.html";

/// Build the downloadable ZIP archive in memory: the generated markup plus
/// every slice file.
pub fn build_archive(html: &str, slices: &[(String, Vec<u8>)]) -> Result<Vec<u8>, PackageError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(ARCHIVE_HTML_NAME, FileOptions::default())?;
    zip.write_all(html.as_bytes())?;

    for (name, data) in slices {
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
