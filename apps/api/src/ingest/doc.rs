//! Legacy Word 97–2003 (`.doc`) extraction.
//!
//! The binary format stores the document text as one contiguous run inside the
//! OLE compound file, either as UTF-16LE or as 8-bit characters, with `\r` as
//! the paragraph mark (Word may also mix both encodings piece by piece). We
//! recover it by scanning for printable runs in both encodings and merging
//! them in file order. Pairs of binary bytes read as UTF-16 land mostly in
//! CJK, Hangul or private-use ranges, so wide runs only accept Latin script
//! and general punctuation. Tables and images are not detectable this way.

use crate::ingest::models::ExtractedContent;
use crate::ingest::text::meaningful_chars;
use crate::ingest::IngestError;

/// Size of the compound file header sector.
const OLE_HEADER_LEN: usize = 512;
const MIN_RUN_CHARS: usize = 4;
/// Share of letters/spaces a run needs to count as prose rather than binary noise.
const MIN_PROSE_RATIO: f64 = 0.6;
const MIN_TEXT_CHARS: usize = 50;
/// Last code point of Latin Extended-B.
const LATIN_END: char = '\u{024F}';
/// Dashes, quotes, bullets and ellipsis.
const PUNCTUATION: std::ops::RangeInclusive<char> = '\u{2010}'..='\u{2044}';

pub fn extract_doc(bytes: &[u8]) -> Result<ExtractedContent, IngestError> {
    if bytes.len() <= OLE_HEADER_LEN {
        return Err(IngestError::Unreadable(
            "DOC file is truncated".to_string(),
        ));
    }
    let body = &bytes[OLE_HEADER_LEN..];

    let mut runs = collect_runs(
        utf16_chars(body).map(|c| c.filter(|&c| is_wide_text_char(c))),
        2,
    );
    runs.extend(collect_runs(
        body.iter().map(|&b| Some(b as char).filter(|_| b < 0x80)),
        1,
    ));
    runs.sort_by_key(|(offset, _)| *offset);

    let text = runs
        .into_iter()
        .map(|(_, run)| run)
        .collect::<Vec<_>>()
        .join("\n");
    if meaningful_chars(&text) < MIN_TEXT_CHARS {
        return Err(IngestError::Unreadable(
            "DOC file contains no recoverable text".to_string(),
        ));
    }
    Ok(ExtractedContent::from_plain_text(text, None))
}

fn utf16_chars(body: &[u8]) -> impl Iterator<Item = Option<char>> + '_ {
    body.chunks_exact(2).map(|pair| {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        char::from_u32(unit as u32)
    })
}

fn is_text_char(c: char) -> bool {
    c == '\r' || c == '\n' || c == '\t' || !c.is_control()
}

fn is_wide_text_char(c: char) -> bool {
    c <= LATIN_END || PUNCTUATION.contains(&c)
}

/// Splits a character stream into printable runs keyed by their byte offset;
/// `\r` paragraph marks become line breaks.
fn collect_runs(
    chars: impl Iterator<Item = Option<char>>,
    unit_width: usize,
) -> Vec<(usize, String)> {
    let mut runs = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    for (i, c) in chars.enumerate() {
        match c {
            Some(c) if is_text_char(c) => {
                if current.is_empty() {
                    start = i * unit_width;
                }
                current.push(if c == '\r' { '\n' } else { c });
            }
            _ => flush_run(&mut current, start, &mut runs),
        }
    }
    flush_run(&mut current, start, &mut runs);
    runs
}

fn flush_run(current: &mut String, start: usize, runs: &mut Vec<(usize, String)>) {
    let run = std::mem::take(current);
    let trimmed = run.trim();
    let len = trimmed.chars().count();
    if len < MIN_RUN_CHARS {
        return;
    }
    let prose = trimmed
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .count();
    if (prose as f64) / (len as f64) >= MIN_PROSE_RATIO {
        runs.push((start, trimmed.to_string()));
    }
}
