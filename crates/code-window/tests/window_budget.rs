use context_code_window::{
    build_windows, extract_window, split_lines, LexicalEncoder, Position, TokenEncoder,
    WindowConfig, WorkspaceFile,
};

const SOURCE: &str = include_str!("../src/window.rs");

#[test]
fn query_window_fits_budget_at_every_cursor() {
    let lines = split_lines(SOURCE);
    let encoder = LexicalEncoder::new();

    for max_tokens in [8, 64, 128, 512] {
        for line in (0..lines.len()).step_by(7) {
            let window = extract_window(Position::new(line, 0), &lines, max_tokens, &encoder);
            let tokens = encoder.count(&window);
            assert!(
                tokens <= max_tokens,
                "cursor line {line}: {tokens} tokens > {max_tokens}"
            );
        }
    }
}

#[test]
fn query_window_contains_cursor_line_when_it_fits() {
    let lines = split_lines(SOURCE);
    let encoder = LexicalEncoder::new();
    let cursor = lines
        .iter()
        .position(|l| l.contains("pub fn extract_window<"))
        .expect("marker line present");

    let window = extract_window(Position::new(cursor, 0), &lines, 128, &encoder);
    assert!(window.contains("pub fn extract_window<"));
}

#[test]
fn index_of_own_source_has_unique_chunks() {
    let files = vec![
        WorkspaceFile::new("window.rs", SOURCE),
        WorkspaceFile::new("copy/window.rs", SOURCE),
    ];
    let chunks = build_windows(&files, &WindowConfig::default());
    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|c| c.locations.len() % 2 == 0));
}
