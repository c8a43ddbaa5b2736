use serde::{Deserialize, Serialize};

/// A paragraph-level unit of a source document.
///
/// `id` is the zero-based position at segmentation time; ids within one
/// document are exactly `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: usize,
    pub text: String,
}

/// Split text into sections at blank lines.
///
/// A line holding only whitespace is a paragraph break. Each block is
/// trimmed and empty blocks are dropped. Used for stored and inline text
/// alike.
pub fn segment(raw_text: &str) -> Vec<Section> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw_text.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut blocks);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut blocks);

    blocks
        .into_iter()
        .enumerate()
        .map(|(id, text)| Section { id, text })
        .collect()
}

fn flush(lines: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let block = lines.join("\n");
    lines.clear();
    let trimmed = block.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
}
