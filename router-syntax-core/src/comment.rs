/// Turn comment text into `#` lines, one per physical line of `text`.
///
/// Embedded `\n`, `\r\n` and lone `\r` each start a new comment line, so text
/// taken from a policy can never end a comment early. Trailing line breaks
/// are dropped; empty text yields a bare `#`.
pub(crate) fn comment_lines(text: &str) -> Vec<String> {
    text.trim_end_matches(['\n', '\r'])
        .replace("\r\n", "\n")
        .split(['\n', '\r'])
        .map(|line| {
            if line.is_empty() {
                "#".to_string()
            } else {
                format!("# {line}")
            }
        })
        .collect()
}
