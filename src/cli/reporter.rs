//! Terminal rendering of transform diagnostics.

use crate::diagnostics::TransformError;

/// Renders diagnostics for stderr, red-highlighted when attached to a
/// terminal.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, err: &TransformError) -> String {
        err.render(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Position;

    #[test]
    fn plain_rendering_has_no_escape_codes() {
        let err = TransformError::syntax("a.js", Position { line: 2, col: 1 }, "expected ';'");
        let reporter = Reporter::new(false);
        assert_eq!(reporter.render(&err), "error: expected ';' (a.js:2:2)");
    }

    #[test]
    fn colored_rendering_highlights_the_tag() {
        let err = TransformError::syntax("a.js", Position { line: 1, col: 0 }, "boom");
        let reporter = Reporter::new(true);
        let rendered = reporter.render(&err);
        assert!(rendered.starts_with("\x1b[31merror\x1b[0m"));
        assert!(rendered.contains("(a.js:1:1)"));
    }
}
