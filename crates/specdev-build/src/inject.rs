//! Live-reload script injection into generated HTML.

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Marker id carried by the injected script tag.
const SCRIPT_ID: &str = "live-reload-script";

/// Matches a previously injected fragment, across lines.
static INJECTED_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"(?s)<script id="{SCRIPT_ID}">.*?</script>\n?"#)).unwrap()
});

/// Injection error.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// Reading or rewriting the output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rewrite `output_file` so it carries exactly one live-reload script.
///
/// Any previously injected fragment is stripped first, then a fresh one is
/// inserted immediately before the last `</body>`, or appended when the
/// document has none. The rewritten file is flushed to disk before this
/// returns, so a reload notification sent afterwards never races the write.
///
/// # Errors
///
/// Returns [`InjectError::Io`] when the file cannot be read or rewritten.
pub fn inject_live_reload(output_file: &Path, reload_port: u16) -> Result<(), InjectError> {
    let html = std::fs::read_to_string(output_file)?;
    let html = strip_injected_script(&html);
    let injected = insert_script(&html, reload_port);

    let mut file = std::fs::File::create(output_file)?;
    file.write_all(injected.as_bytes())?;
    file.sync_all()?;

    tracing::debug!(path = %output_file.display(), "live reload script injected");
    Ok(())
}

/// Remove any fragment left over from an earlier injection.
fn strip_injected_script(html: &str) -> Cow<'_, str> {
    INJECTED_SCRIPT.replace_all(html, "")
}

/// Insert the reload fragment before the last `</body>`, or append it.
fn insert_script(html: &str, reload_port: u16) -> String {
    let script_tag = reload_fragment(reload_port);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 1);
        result.push_str(&html[..pos]);
        result.push_str(&script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result;
    }

    let mut result = html.to_owned();
    result.push('\n');
    result.push_str(&script_tag);
    result
}

/// Client script: dial the reload socket and reload on its signal.
fn reload_fragment(reload_port: u16) -> String {
    format!(
        r#"<script id="{SCRIPT_ID}">
  (() => {{
    const socket = new WebSocket("ws://" + window.location.hostname + ":{reload_port}/");
    socket.onopen = () => console.log("live reload connected");
    socket.onmessage = (event) => {{
      if (event.data === "reload") {{
        window.location.reload();
      }}
    }};
    socket.onerror = () => console.log("live reload connection failed");
  }})();
</script>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "<html><head><title>API</title></head>\n<body>\n<h1>Docs</h1>\n</body></html>\n";

    fn fragment_count(html: &str) -> usize {
        html.matches(SCRIPT_ID).count()
    }

    #[test]
    fn test_fragment_lands_before_closing_body() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, PAGE).unwrap();

        inject_live_reload(&file, 3005).unwrap();

        let html = std::fs::read_to_string(&file).unwrap();
        assert_eq!(fragment_count(&html), 1);
        let script_pos = html.find(SCRIPT_ID).unwrap();
        let body_pos = html.find("</body>").unwrap();
        assert!(script_pos < body_pos, "script must precede </body>");
        assert!(html.contains("<h1>Docs</h1>"), "page content is preserved");
    }

    #[test]
    fn test_appends_when_document_has_no_body_tag() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<p>bare fragment</p>").unwrap();

        inject_live_reload(&file, 3005).unwrap();

        let html = std::fs::read_to_string(&file).unwrap();
        assert!(html.starts_with("<p>bare fragment</p>\n<script"));
        assert_eq!(fragment_count(&html), 1);
    }

    #[test]
    fn test_double_injection_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, PAGE).unwrap();

        inject_live_reload(&file, 3005).unwrap();
        let first = std::fs::read_to_string(&file).unwrap();

        inject_live_reload(&file, 3005).unwrap();
        let second = std::fs::read_to_string(&file).unwrap();

        assert_eq!(fragment_count(&second), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reinjection_updates_the_port() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, PAGE).unwrap();

        inject_live_reload(&file, 3005).unwrap();
        inject_live_reload(&file, 4005).unwrap();

        let html = std::fs::read_to_string(&file).unwrap();
        assert_eq!(fragment_count(&html), 1);
        assert!(html.contains(":4005/"));
        assert!(!html.contains(":3005/"));
    }

    #[test]
    fn test_insertion_targets_the_last_body_tag() {
        let html = "<body><pre>&lt;/body&gt; is written </body> here</pre></body></html>";
        let result = insert_script(html, 3005);

        // The fragment sits before the final </body>, leaving the earlier one alone
        let last_body = result.rfind("</body>").unwrap();
        let script = result.find(SCRIPT_ID).unwrap();
        let first_body = result.find("</body>").unwrap();
        assert!(first_body < script);
        assert!(script < last_body);
    }

    #[test]
    fn test_strip_removes_a_multiline_fragment() {
        let html = format!("<body>\n{}\n</body>", reload_fragment(3005));
        let stripped = strip_injected_script(&html);
        assert_eq!(fragment_count(&stripped), 0);
        assert!(stripped.contains("<body>"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = inject_live_reload(&dir.path().join("absent.html"), 3005);
        assert!(matches!(result, Err(InjectError::Io(_))));
    }
}
