use flood_core::{EpochMillis, format_note_timestamp};

/// Appends `[HH:MM dd/MM - author]: body` to a newline-delimited log.
///
/// Blank bodies are ignored. Returns whether a line was written.
pub fn append_note(log: &mut Option<String>, author: &str, at_ms: EpochMillis, body: &str) -> bool {
    let body = body.trim();
    if body.is_empty() {
        return false;
    }
    let line = format!("[{} - {}]: {}", format_note_timestamp(at_ms), author.trim(), body);
    match log {
        Some(existing) if !existing.is_empty() => {
            existing.push('\n');
            existing.push_str(&line);
        }
        _ => *log = Some(line),
    }
    true
}

pub fn append_optional_note(
    log: &mut Option<String>,
    author: &str,
    at_ms: EpochMillis,
    body: Option<&str>,
) -> bool {
    body.is_some_and(|body| append_note(log, author, at_ms, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: EpochMillis = 1_725_804_300_000;

    #[test]
    fn first_note_starts_the_log() {
        let mut log = None;
        assert!(append_note(&mut log, "Lan", AT, "  verified by phone "));
        assert_eq!(log.as_deref(), Some("[14:05 08/09 - Lan]: verified by phone"));
    }

    #[test]
    fn later_notes_never_replace_earlier_ones() {
        let mut log = Some("[14:05 08/09 - Lan]: verified by phone".to_string());
        append_note(&mut log, "Team Alpha", AT + 60_000, "boat launched");
        let lines: Vec<&str> = log.as_deref().unwrap_or_default().lines().collect();
        assert_eq!(
            lines,
            vec![
                "[14:05 08/09 - Lan]: verified by phone",
                "[14:06 08/09 - Team Alpha]: boat launched",
            ]
        );
    }

    #[test]
    fn blank_notes_are_skipped() {
        let mut log = None;
        assert!(!append_note(&mut log, "Lan", AT, "   "));
        assert!(!append_optional_note(&mut log, "Lan", AT, None));
        assert_eq!(log, None);
    }
}
