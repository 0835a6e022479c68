pub const ANSWER_LABEL: &str = "Svar:";

pub fn clean_answer(text: &str) -> String {
    match text.split_once(ANSWER_LABEL) {
        Some((_, rest)) => rest.trim().to_string(),
        None => text.trim().to_string(),
    }
}

pub fn truncate_answer(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }
    let window = &chars[..max_chars];
    match window.iter().rposition(|c| matches!(c, '.' | '?' | '!')) {
        Some(idx) => window[..=idx].iter().collect(),
        None => window.iter().collect(),
    }
}
