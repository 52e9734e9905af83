//! Integration tests for SSE frame decoding and transcript accumulation

use healthscope_core::protocol::ProtocolFrame;
use healthscope_core::streaming::{EventFrameParser, IncrementalAccumulator, LatencyTimer};
use proptest::prelude::*;

fn data_line(text: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}]
        })
    )
}

fn body(fragments: &[&str], terminated: bool) -> String {
    let mut body = String::from("data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n");
    for fragment in fragments {
        body.push_str(&data_line(fragment));
    }
    if terminated {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

/// Feed `bytes` split at `cuts` (sorted, in range) and flush at EOF
fn parse_with_cuts(bytes: &[u8], cuts: &[usize]) -> Vec<ProtocolFrame> {
    let mut parser = EventFrameParser::new();
    let mut frames = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        frames.extend(parser.feed(&bytes[start..cut]));
        start = cut;
    }
    frames.extend(parser.feed(&bytes[start..]));
    frames.extend(parser.finish());
    frames
}

fn run_accumulator(frames: Vec<ProtocolFrame>) -> (Vec<String>, String) {
    let mut accumulator = IncrementalAccumulator::new(LatencyTimer::start());
    let mut sink = Vec::new();
    for frame in frames {
        accumulator.on_frame(frame, &mut |text: &str| sink.push(text.to_string()));
    }
    (sink, accumulator.finalize().into_text())
}

#[tokio::test]
async fn test_hello_in_two_fragments() {
    let input = body(&["Hel", "lo"], true);
    let frames = parse_with_cuts(input.as_bytes(), &[]);

    assert_eq!(
        frames,
        vec![ProtocolFrame::delta("Hel"), ProtocolFrame::delta("lo"), ProtocolFrame::Done]
    );

    let (sink, text) = run_accumulator(frames);
    assert_eq!(sink, vec!["Hel", "lo"]);
    assert_eq!(text, "Hello");
}

#[test]
fn test_frame_split_mid_prefix_and_mid_json() {
    let input = body(&["abc"], true);
    let bytes = input.as_bytes();
    let second_line = input.find(&data_line("abc")).unwrap();

    // Cut inside "data:" and again inside the JSON payload
    let frames = parse_with_cuts(bytes, &[second_line + 3, second_line + 20]);
    assert_eq!(frames, vec![ProtocolFrame::delta("abc"), ProtocolFrame::Done]);
}

#[test]
fn test_many_frames_in_one_chunk() {
    let fragments: Vec<String> = (0..50).map(|i| format!("t{} ", i)).collect();
    let refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
    let input = body(&refs, true);

    let frames = parse_with_cuts(input.as_bytes(), &[]);
    assert_eq!(frames.len(), 51);
    assert_eq!(frames.last(), Some(&ProtocolFrame::Done));
}

#[tokio::test]
async fn test_eof_without_done_is_complete_transcript() {
    let input = body(&["no ", "terminator"], false);
    let frames = parse_with_cuts(input.as_bytes(), &[5, 40]);

    assert!(!frames.contains(&ProtocolFrame::Done));
    let (_, text) = run_accumulator(frames);
    assert_eq!(text, "no terminator");
}

#[tokio::test]
async fn test_malformed_frame_does_not_change_transcript() {
    let clean = body(&["one ", "two ", "three"], true);
    let dirty = clean.replacen(
        &data_line("two "),
        &format!("data: {{not json\n\n{}", data_line("two ")),
        1,
    );

    let (clean_sink, clean_text) = run_accumulator(parse_with_cuts(clean.as_bytes(), &[]));
    let dirty_frames = parse_with_cuts(dirty.as_bytes(), &[]);
    assert!(dirty_frames
        .iter()
        .any(|frame| matches!(frame, ProtocolFrame::Malformed { .. })));

    let (dirty_sink, dirty_text) = run_accumulator(dirty_frames);
    assert_eq!(clean_sink, dirty_sink);
    assert_eq!(clean_text, dirty_text);
}

#[test]
fn test_crlf_line_endings() {
    let input = body(&["win", "dows"], true).replace('\n', "\r\n");
    let frames = parse_with_cuts(input.as_bytes(), &[1, 2, 3]);
    assert_eq!(
        frames,
        vec![ProtocolFrame::delta("win"), ProtocolFrame::delta("dows"), ProtocolFrame::Done]
    );
}

#[test]
fn test_nothing_after_done() {
    let mut input = body(&["before"], true);
    input.push_str(&data_line("after"));
    input.push_str("data: {broken\n");

    let frames = parse_with_cuts(input.as_bytes(), &[]);
    assert_eq!(frames, vec![ProtocolFrame::delta("before"), ProtocolFrame::Done]);
}

proptest! {
    #[test]
    fn prop_byte_at_a_time_matches_single_chunk(
        fragments in prop::collection::vec("[a-zA-Z0-9 .,!?éü✓]{1,12}", 0..12),
        terminated in any::<bool>(),
    ) {
        let refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
        let input = body(&refs, terminated);
        let bytes = input.as_bytes();

        let whole = parse_with_cuts(bytes, &[]);
        let every_byte: Vec<usize> = (1..bytes.len()).collect();
        let single_bytes = parse_with_cuts(bytes, &every_byte);

        prop_assert_eq!(&whole, &single_bytes);

        let deltas: Vec<String> = whole
            .into_iter()
            .filter_map(|frame| match frame {
                ProtocolFrame::Delta { text } => Some(text),
                _ => None,
            })
            .collect();
        prop_assert_eq!(deltas, fragments);
    }

    #[test]
    fn prop_arbitrary_split_points(
        fragments in prop::collection::vec("[a-z ]{1,8}", 1..8),
        raw_cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
        let input = body(&refs, true);
        let bytes = input.as_bytes();

        let mut cuts: Vec<usize> = raw_cuts.iter().map(|index| index.index(bytes.len())).collect();
        cuts.sort_unstable();
        cuts.dedup();

        prop_assert_eq!(parse_with_cuts(bytes, &cuts), parse_with_cuts(bytes, &[]));
    }
}
