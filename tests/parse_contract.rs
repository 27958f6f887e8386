//! End-to-end behaviour of the parse pipeline, in process and through the
//! C ABI.

use serde_json::Value;
use statedb_parser::abi::{free_parse_result, parse_command_len, OwnedParseResult};
use statedb_parser::protocols::resp::parser::encode_command;
use statedb_parser::{parse, ErrorKind, ParseError};

/// Small deterministic xorshift generator for payload fuzzing
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> usize {
        (self.next() % n) as usize
    }

    fn printable(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| (b' ' + self.below(95) as u8) as char)
            .collect()
    }
}

#[test]
fn set_command_end_to_end() {
    let input = b"*3\r\n$3\r\nSET\r\n$5\r\nmykey\r\n$7\r\nmyvalue\r\n";

    let outcome = parse(input);
    assert_eq!(
        outcome.json(),
        Some(r#"{"command":"SET","args":["mykey","myvalue"]}"#)
    );

    let result = OwnedParseResult::parse(input).unwrap();
    assert!(result.success());
    assert!(result.error().is_none());
    assert_eq!(
        result.json().unwrap().to_str().unwrap(),
        r#"{"command":"SET","args":["mykey","myvalue"]}"#
    );
}

#[test]
fn ping_command_end_to_end() {
    let result = OwnedParseResult::parse(b"*1\r\n$4\r\nPING\r\n").unwrap();
    assert!(result.success());
    assert_eq!(
        result.json().unwrap().to_str().unwrap(),
        r#"{"command":"PING","args":[]}"#
    );
}

#[test]
fn missing_array_marker_end_to_end() {
    let result = OwnedParseResult::parse(b"hello").unwrap();
    assert!(!result.success());
    assert!(result.json().is_none());
    let err = result.error().unwrap().to_str().unwrap();
    assert!(err.contains("expected '*'"), "{}", err);
}

#[test]
fn empty_array_is_empty_command() {
    let result = OwnedParseResult::parse(b"*0\r\n").unwrap();
    assert!(!result.success());
    assert!(result.json().is_none());
    assert!(result
        .error()
        .unwrap()
        .to_str()
        .unwrap()
        .contains("empty command"));
}

#[test]
fn verb_case_is_preserved() {
    let outcome = parse(b"*2\r\n$3\r\ngEt\r\n$1\r\nk\r\n");
    assert_eq!(outcome.json(), Some(r#"{"command":"gEt","args":["k"]}"#));
}

#[test]
fn declared_length_past_buffer_end_is_truncated() {
    // The sentinel tail completes the command, so reading past the slice
    // would turn the failure into a success.
    let full = b"*1\r\n$5\r\nhello\r\n";
    for cut in 0..full.len() {
        let outcome = parse(&full[..cut]);
        assert!(!outcome.is_success(), "cut at {} parsed", cut);
        assert_eq!(outcome.error().map(ParseError::kind), Some(ErrorKind::Syntax));
    }
    assert!(parse(full).is_success());

    match parse(&full[..10]).error() {
        Some(ParseError::Truncated {
            needed: 7,
            available: 2,
            ..
        }) => {}
        other => panic!("unexpected: {:?}", other),
    }

    unsafe {
        let raw = parse_command_len(full.as_ptr(), 10);
        assert!(!raw.is_null());
        assert!(!(*raw).success);
        assert!((*raw).json_result.is_null());
        free_parse_result(raw);
    }
}

#[test]
fn trailing_second_command_is_ignored() {
    let outcome = parse(b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nQUIT\r\n");
    assert_eq!(outcome.json(), Some(r#"{"command":"PING","args":[]}"#));
}

#[test]
fn printable_payloads_round_trip() {
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);

    for _ in 0..500 {
        let count = 1 + rng.below(8);
        let parts: Vec<String> = (0..count)
            .map(|_| {
                let len = rng.below(33);
                rng.printable(len)
            })
            .collect();

        let buffer = encode_command(parts.as_slice());
        let outcome = parse(&buffer);
        let json = outcome.json().unwrap_or_else(|| {
            panic!("failed on {:?}: {:?}", parts, outcome.error())
        });

        let value: Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["command"], parts[0].as_str());
        let args = value["args"].as_array().unwrap();
        assert_eq!(args.len(), count - 1);
        for (arg, expected) in args.iter().zip(&parts[1..]) {
            assert_eq!(arg, expected.as_str());
        }

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
    }
}

#[test]
fn handles_move_between_threads() {
    let result = OwnedParseResult::parse(b"*1\r\n$4\r\nPING\r\n").unwrap();
    let success = std::thread::spawn(move || result.success()).join().unwrap();
    assert!(success);
}
