use nextedit_code_chunker::{query_chunk, ChunkerConfig, Language, LineChunker};

const SOURCE: &str = r"import { Tracker } from './tracker'

export function recordEdit(tracker: Tracker, path: string) {
    const prior = tracker.read(path)
    tracker.record(path, prior)
}

export function flush(tracker: Tracker) {
    tracker.clear()
}
";

#[test]
fn continuation_of_every_chunk_is_the_following_text() {
    let chunker = LineChunker::new(ChunkerConfig::with_chunk_lines(3)).expect("valid config");
    let chunks = chunker.chunk_str(SOURCE, "src/edits.ts");

    // head chunk + ceil(10 / 3) line chunks
    assert_eq!(chunks.len(), 5);
    for pair in chunks[1..].windows(2) {
        assert_eq!(pair[0].continuation_text, pair[1].text);
        assert_eq!(pair[0].end_line + 1, pair[1].start_line);
    }
    let last = chunks.last().expect("chunks");
    assert_eq!(last.continuation_text, last.text);
    assert!(chunks.iter().all(|c| c.source_file == "src/edits.ts"));
}

#[test]
fn query_chunk_only_sees_text_before_cursor() {
    let query = query_chunk(SOURCE, 4, 10, 3);
    assert!(query.ends_with("    tracke"));
    assert!(query.contains("recordEdit"));
    assert!(!query.contains("flush"));
    assert_eq!(Language::from_path("src/edits.ts"), Language::TypeScript);
}
