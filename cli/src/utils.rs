use std::fs;
use std::io::{self, Read};

use tracing::debug;

use crate::error::Result;

/// Read input from a file or stdin
///
/// If `file` is `Some`, reads from the specified file path.
/// If `file` is `None`, reads from stdin.
pub(crate) fn read_input(file: Option<&str>) -> Result<String> {
    let buffer = match file {
        Some(path) => fs::read(path)?,
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };
    debug!(source = file.unwrap_or("-"), bytes = buffer.len(), "read input");
    Ok(String::from_utf8(buffer)?)
}
