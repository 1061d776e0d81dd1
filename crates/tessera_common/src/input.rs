//! Opening input files, transparently decompressing `.gz` files.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Returns `true` if the path names a gzip-compressed file.
fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Opens `path` for buffered reading, decompressing when it ends in `.gz`.
pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads an entire (possibly compressed) input file into a string.
pub fn read_input_to_string(path: &Path) -> io::Result<String> {
    let mut reader = open_input(path)?;
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(content)
}

/// Reads an entire (possibly compressed) input file into bytes.
pub fn read_input_bytes(path: &Path) -> io::Result<Vec<u8>> {
    let mut reader = open_input(path)?;
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    Ok(content)
}
