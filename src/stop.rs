//! Stop-sequence truncation

/// Truncate `text` at the earliest occurrence of any stop sequence.
///
/// Scans for the first occurrence of every stop sequence and cuts the text
/// just before the smallest matching index. Text without a match, or an
/// empty stop list, comes back unchanged. Total for all string inputs; an
/// empty stop sequence matches at index 0 and truncates everything.
pub fn enforce_stop_sequences(text: &str, stop: &[String]) -> String {
    let earliest = stop
        .iter()
        .filter_map(|sequence| text.find(sequence.as_str()))
        .min();

    match earliest {
        Some(index) => text[..index].to_string(),
        None => text.to_string(),
    }
}
