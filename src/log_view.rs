use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads up to `max_lines` lines from the start of the file and returns them
/// newest first.
pub async fn tail_newest_first(path: &Path, max_lines: usize) -> io::Result<String> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut slice = Vec::new();
    while slice.len() < max_lines {
        match lines.next_line().await? {
            Some(line) => slice.push(line),
            None => break,
        }
    }

    slice.reverse();
    Ok(slice.join("\n"))
}
