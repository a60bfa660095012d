//! Snapshot input acquisition.

use std::io::Read;

/// Environment variable the snapshot can be passed in.
pub const SNAPSHOT_ENV: &str = "SNAPSHOT";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pick the snapshot from the flag, then the environment, then stdin.
///
/// `stdin` is only consulted when neither of the first two sources yields
/// content; callers pass `None` when stdin is attached to a terminal.
pub fn read_snapshot<R: Read>(
    flag: Option<String>,
    env: Option<String>,
    stdin: Option<R>,
) -> std::io::Result<Option<String>> {
    if let Some(raw) = non_empty(flag) {
        return Ok(Some(raw));
    }
    if let Some(raw) = non_empty(env) {
        return Ok(Some(raw));
    }
    if let Some(mut reader) = stdin {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        return Ok(non_empty(Some(raw)));
    }
    Ok(None)
}
