pub const SEGMENT_DELIMITER: &str = "---";

pub const DEFAULT_CHUNK_CHARS: usize = 500;

pub fn split_text(text: &str, max_chunk_chars: usize) -> Vec<String> {
    if text.contains(SEGMENT_DELIMITER) {
        return text
            .split(SEGMENT_DELIMITER)
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect();
    }

    let width = max_chunk_chars.max(1);
    let mut chunks = Vec::new();
    for paragraph in text.split("\n\n") {
        let trimmed = paragraph.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().count() <= width {
            chunks.push(trimmed.to_string());
            continue;
        }
        let chars: Vec<char> = trimmed.chars().collect();
        for window in chars.chunks(width) {
            let piece: String = window.iter().collect();
            let piece = piece.trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_overrides_width_limit() {
        let text = "first part --- second part that runs much longer than ten characters --- third";
        let chunks = split_text(text, 10);
        assert_eq!(
            chunks,
            vec![
                "first part",
                "second part that runs much longer than ten characters",
                "third",
            ]
        );
    }

    #[test]
    fn delimiter_pieces_are_trimmed_and_empties_dropped() {
        let chunks = split_text("---  a  ------ b ---", 500);
        assert_eq!(chunks, vec!["a", "b"]);
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "Hva er PEX?\n\nSvar: Et fleksibelt plastrør.\n\n\n\nSiste avsnitt.";
        let chunks = split_text(text, 500);
        assert_eq!(
            chunks,
            vec!["Hva er PEX?", "Svar: Et fleksibelt plastrør.", "Siste avsnitt."]
        );
    }

    #[test]
    fn long_paragraph_is_windowed() {
        let text = "x".repeat(1200);
        let chunks = split_text(&text, 500);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 500);
        assert_eq!(chunks[1].chars().count(), 500);
        assert_eq!(chunks[2].chars().count(), 200);
    }

    #[test]
    fn windows_count_characters_not_bytes() {
        let text = "æøå".repeat(300);
        let chunks = split_text(&text, 500);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 500);
        assert_eq!(chunks[1].chars().count(), 400);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(split_text("", 500).is_empty());
        assert!(split_text("   \n\n \t \n\n  ", 500).is_empty());
    }

    #[test]
    fn zero_width_is_clamped() {
        let chunks = split_text("abc", 0);
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }
}
