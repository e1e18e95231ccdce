use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout, decimals kept as strings.
pub fn print_json(value: &Value) {
    let mut stdout = io::stdout().lock();
    let written = serde_json::to_writer_pretty(&mut stdout, value)
        .map_err(io::Error::from)
        .and_then(|_| writeln!(stdout));
    if let Err(e) = written {
        eprintln!("JSON serialization error: {}", e);
    }
}
