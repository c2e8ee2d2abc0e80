use crate::remote::{RemoteFs, TransportError};

/// Read `[start, end)` of `path` in chunks of at most `chunk` bytes.
///
/// Stops early when the remote side returns less than asked, so the result may
/// be shorter than `end - start`.
pub(crate) async fn read_tail(
    fs: &dyn RemoteFs,
    path: &str,
    start: u64,
    end: u64,
    chunk: u64,
) -> Result<Vec<u8>, TransportError> {
    let mut bytes = Vec::with_capacity(end.saturating_sub(start).min(chunk) as usize);
    let mut offset = start;

    while offset < end {
        let want = (end - offset).min(chunk.max(1));
        let part = fs.read_range(path, offset, want).await?;
        if part.is_empty() {
            break;
        }
        offset += part.len() as u64;
        let short = (part.len() as u64) < want;
        bytes.extend_from_slice(&part);
        if short {
            break;
        }
    }

    Ok(bytes)
}

/// Number of leading bytes that form complete lines.
///
/// With `hold_partial` the bytes after the last newline are left for the next
/// run, since the game may still be writing that line.
pub(crate) fn consumable_len(bytes: &[u8], hold_partial: bool) -> usize {
    if !hold_partial {
        return bytes.len();
    }
    bytes
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1)
}
