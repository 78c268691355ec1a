//! HTML rendering for the index page and failure reports.
//!
//! Pages are assembled by plain string concatenation. Output depends only on
//! the inputs, never on the clock, so reruns produce identical bytes.

use std::fmt::Write as _;

use nbreport_shared::{RunResult, slash_path};

/// Index page written when discovery found nothing.
pub const EMPTY_INDEX: &str = "<html><body><h1>No notebooks found</h1></body></html>\n";

const INDEX_HEAD: &str = "<html><head><meta charset=\"utf-8\"><title>Notebook Index</title>\
<style>.ok{color:#1a7f37}.failed{color:#cf222e}</style></head><body>";

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the index page listing every outcome in run order.
pub fn render_index(run: &RunResult) -> String {
    if run.is_empty() {
        return EMPTY_INDEX.to_string();
    }

    let mut html = String::from(INDEX_HEAD);
    html.push_str("<h1>Notebooks</h1>");
    let _ = write!(
        html,
        "<p>{} succeeded, {} failed</p>",
        run.succeeded(),
        run.failed()
    );
    html.push_str("<ul>\n");

    for outcome in run.outcomes() {
        let (class, marker) = if outcome.succeeded() {
            ("ok", "\u{2713}")
        } else {
            ("failed", "\u{2717}")
        };
        let href = escape(&slash_path(outcome.report_path()));
        let label = escape(&slash_path(outcome.source_path()));
        let _ = writeln!(
            html,
            "<li class=\"{class}\">{marker} <a href=\"{href}\">{label}</a></li>"
        );
    }

    html.push_str("</ul></body></html>\n");
    html
}

/// Render the report written in place of a notebook that failed to execute.
pub fn render_failure_page(source: &str, detail: &str) -> String {
    let source = escape(source);
    format!(
        "<html><head><meta charset=\"utf-8\"><title>Execution failed: {source}</title></head>\
<body><h1>Execution failed for {source}</h1><pre>{}</pre></body></html>\n",
        escape(detail)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbreport_shared::{Document, Outcome};
    use std::path::Path;

    fn run() -> RunResult {
        let a = Document::new(Path::new("."), "a/x.ipynb");
        let b = Document::new(Path::new("."), "b/y.ipynb");
        [
            Outcome::success(&a, 10),
            Outcome::failure(&b, "converter exited with status 1", 4),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn empty_run_renders_placeholder() {
        let html = render_index(&RunResult::new());
        assert!(html.contains("No notebooks found"));
        assert!(!html.contains("<ul>"));
    }

    #[test]
    fn index_lists_every_outcome_with_status() {
        let html = render_index(&run());

        assert!(html.contains("<li class=\"ok\">\u{2713} <a href=\"a/x.html\">a/x.ipynb</a></li>"));
        assert!(
            html.contains("<li class=\"failed\">\u{2717} <a href=\"b/y.html\">b/y.ipynb</a></li>")
        );
        assert!(html.contains("1 succeeded, 1 failed"));
        assert_eq!(html.matches("<li ").count(), 2);
    }

    #[test]
    fn index_is_deterministic() {
        assert_eq!(render_index(&run()), render_index(&run()));
    }

    #[test]
    fn index_escapes_names() {
        let doc = Document::new(Path::new("."), "a&b/<x>.ipynb");
        let run: RunResult = [Outcome::success(&doc, 1)].into_iter().collect();
        let html = render_index(&run);
        assert!(html.contains("a&amp;b/&lt;x&gt;.ipynb"));
    }

    #[test]
    fn failure_page_embeds_escaped_detail() {
        let html = render_failure_page("a/x.ipynb", "NameError: name 'x' is not defined\n<tb>");
        assert!(html.contains("<h1>Execution failed for a/x.ipynb</h1>"));
        assert!(html.contains("NameError: name &#39;x&#39; is not defined"));
        assert!(html.contains("&lt;tb&gt;"));
    }
}
