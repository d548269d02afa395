//! Log sanitization: redacts clinical values and secrets from formatted logs.
//!
//! The application never logs raw measurements on purpose, but a stray
//! `{:?}` of a [`ClinicalRecord`](crate::domain::ClinicalRecord) would print
//! `age: 45, resting_bp: 130, ...`. Every log line passes through
//! [`SanitizingMakeWriter`] so such slips are redacted before reaching the
//! sink. Covered:
//! - clinical key/value pairs (age, blood pressure, cholesterol, heart rate,
//!   oxygen stress)
//! - e-mail addresses and phone numbers
//! - key material (signing seeds, long hex/base64 tokens)
//!
//! Input is capped at `CARDIOFORM_SANITIZE_MAX_BYTES` (default 16 KiB).

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<RedactionRules> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

pub const SANITIZE_MAX_BYTES_ENV: &str = "CARDIOFORM_SANITIZE_MAX_BYTES";

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct RedactionRules {
    set: RegexSet,
    rules: Vec<Rule>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var(SANITIZE_MAX_BYTES_ENV)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn rules() -> &'static RedactionRules {
    PATTERNS.get_or_init(|| {
        // Clinical keys as they appear in Debug output, form labels and
        // snake_case feature names. `$1` keeps the key for readability.
        let table: Vec<(&'static str, &'static str)> = vec![
            (
                r"(?i)\b(age)\b\s*[:=]\s*-?\d+(?:\.\d+)?",
                "$1=[REDACTED]",
            ),
            (
                r"(?i)\b(resting[_ ]?(?:bp|blood[_ ]pressure)|blood[_ ]pressure|bp)\b\s*[:=]\s*-?\d+(?:\.\d+)?",
                "$1=[REDACTED]",
            ),
            (
                r"(?i)\b(cholesterol|chol)\b\s*[:=]\s*-?\d+(?:\.\d+)?",
                "$1=[REDACTED]",
            ),
            (
                r"(?i)\b(max[_ ]?(?:heart[_ ]rate|hr)|heart[_ ]rate)\b\s*[:=]\s*-?\d+(?:\.\d+)?",
                "$1=[REDACTED]",
            ),
            (
                r"(?i)\b((?:heart[_ ])?oxygen[_ ]stress(?:[_ ]score)?|oldpeak)\b\s*[:=]\s*-?\d+(?:\.\d+)?",
                "$1=[REDACTED]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
                "[REDACTED-PHONE]",
            ),
            (
                r"(?i)\b(?:seed|secret|private[_-]?key|signing[_-]?key|token)\b\s*[:=]\s*[A-Za-z0-9+/]{32,}={0,2}",
                "[REDACTED-SECRET]",
            ),
            (r"\b[0-9a-fA-F]{32,}\b", "[REDACTED-KEY]"),
        ];

        // Literal patterns; failure to compile is a programming error.
        let set = RegexSet::new(table.iter().map(|(p, _)| *p)).expect("valid regex set");
        let rules = table
            .into_iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("valid regex"),
                replacement,
            })
            .collect();

        RedactionRules { set, rules }
    })
}

/// Redact clinical values and secrets from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let rules = rules();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in rules.set.matches(prefix).into_iter() {
        let rule = &rules.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// `MakeWriter` wrapper that sanitizes each formatted log line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let sanitized = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not grow the buffer forever.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClinicalRecord;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_redacts_record_debug_output() {
        let line = format!("{:?}", ClinicalRecord::default());
        let sanitized = sanitize(&line);
        assert!(!sanitized.contains("45"), "{sanitized}");
        assert!(!sanitized.contains("130"), "{sanitized}");
        assert!(!sanitized.contains("240"), "{sanitized}");
        assert!(!sanitized.contains("150"), "{sanitized}");
        assert!(sanitized.contains("oxygen_stress=[REDACTED]"), "{sanitized}");
    }

    #[test]
    fn test_redacts_form_labels() {
        let sanitized = sanitize("Resting BP: 145, Cholesterol: 233, Max Heart Rate: 150");
        assert_eq!(
            sanitized,
            "Resting BP=[REDACTED], Cholesterol=[REDACTED], Max Heart Rate=[REDACTED]"
        );
    }

    #[test]
    fn test_keeps_aggregate_output() {
        let line = "assessment complete tier=High svm=\"Heart Disease\" probability=0.9772";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_redacts_contact_details() {
        let sanitized = sanitize("contact patient@hospital.org or 555-123-4567");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_redacts_key_material() {
        let sanitized = sanitize("seed=QWxhZGRpbjpvcGVuIHNlc2FtZSB3aXRoIGxvbmcgc2VjcmV0IHZhbHVl");
        assert!(sanitized.contains("[REDACTED-SECRET]"));

        let digest = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        assert!(sanitize(&format!("hash {digest}")).contains("[REDACTED-KEY]"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("héllo world", 2);
        assert_eq!(sanitized, "h [TRUNCATED]");
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .map_err(|_| std::io::Error::other("poisoned"))?
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_writer_sanitizes_split_lines() {
        let capture = Capture::default();
        let make = SanitizingMakeWriter::new(capture.clone());
        {
            let mut writer = make.make_writer();
            writer.write_all(b"INFO cholest").expect("write");
            writer.write_all(b"erol=300 done\nsecond").expect("write");
            writer.flush().expect("flush");
        }
        let out = String::from_utf8(capture.0.lock().expect("lock").clone()).expect("utf8");
        assert_eq!(out, "INFO cholesterol=[REDACTED] done\nsecond");
    }
}
