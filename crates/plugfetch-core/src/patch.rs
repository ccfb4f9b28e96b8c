//! Directive patcher: comments out call-like directive lines.
//!
//! Works line by line and keeps every line terminator (`\n`, `\r\n`, lone `\r`)
//! exactly as found. Only lines whose first non-whitespace text is the
//! directive gain the comment marker; everything else is passed through.

/// Directive token and the marker used to disable it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectivePatch {
    directive: String,
    marker: String,
}

impl Default for DirectivePatch {
    fn default() -> Self {
        DirectivePatch::new("setManifestid(", "--")
    }
}

impl DirectivePatch {
    pub fn new(directive: impl Into<String>, marker: impl Into<String>) -> Self {
        DirectivePatch {
            directive: directive.into(),
            marker: marker.into(),
        }
    }

    /// Rewrite `line` if it is an active directive; `None` if it passes through.
    fn patch_line(&self, line: &str) -> Option<String> {
        let body = line.trim_start();
        if !body.starts_with(&self.directive) || body.starts_with(&self.marker) {
            return None;
        }
        let indent = line.len() - body.len();
        let mut out = String::with_capacity(line.len() + self.marker.len());
        out.push_str(&line[..indent]);
        out.push_str(&self.marker);
        out.push_str(body);
        Some(out)
    }

    /// Comment out every active directive line in `text`. Idempotent.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 64);
        for line in lines_with_endings(text) {
            match self.patch_line(line) {
                Some(patched) => out.push_str(&patched),
                None => out.push_str(line),
            }
        }
        out
    }

    /// Number of lines `apply` would rewrite.
    pub fn count_active(&self, text: &str) -> usize {
        lines_with_endings(text)
            .filter(|line| self.patch_line(line).is_some())
            .count()
    }
}

/// Split `text` into lines, each keeping its terminator. A trailing fragment
/// without terminator is yielded as the last line.
pub fn lines_with_endings(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let bytes = rest.as_bytes();
        let end = match bytes.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') => i + 2,
            Some(i) => i + 1,
            None => rest.len(),
        };
        let (line, tail) = rest.split_at(end);
        rest = tail;
        Some(line)
    })
}
