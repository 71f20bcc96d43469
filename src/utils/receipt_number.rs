/// Next sequential receipt number after `last`, zero-padded to `width`.
///
/// Non-numeric or missing predecessors restart the sequence at 1.
pub fn next_receipt_number(last: Option<&str>, width: usize) -> String {
    let next = last
        .and_then(|code| code.trim().parse::<u64>().ok())
        .map_or(1, |n| n.saturating_add(1));
    format!("{next:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_continues_from_last_numeric_code() {
        assert_eq!(next_receipt_number(Some("000041"), 6), "000042");
        assert_eq!(next_receipt_number(Some("999999"), 6), "1000000");
    }

    #[test]
    fn test_sequence_restarts_on_missing_or_free_text_code() {
        assert_eq!(next_receipt_number(None, 6), "000001");
        assert_eq!(next_receipt_number(Some("A-17"), 6), "000001");
        assert_eq!(next_receipt_number(Some(""), 4), "0001");
    }
}
