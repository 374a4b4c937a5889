use std::sync::Arc;
use std::thread;

use medi_hl7::{Delimiters, Hl7Error, Location, Message};
use pretty_assertions::assert_eq;

fn init_test_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

fn fixture() -> Vec<u8> {
    std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/testdata/msg.hl7"))
        .expect("fixture message")
}

#[test]
fn test_new_message() {
    let too_short: [&[u8]; 3] = [b"", b"MSH", b"MSH|^~\\"];
    for data in too_short {
        let err = Message::new(data).unwrap_err();
        assert!(
            matches!(err, Hl7Error::HeaderTooShort { got } if got == data.len()),
            "unexpected error for {data:?}: {err}"
        );
    }

    let minimal = Message::new("MSH|^~\\&").unwrap();
    assert_eq!(
        minimal.delimiters(),
        &Delimiters {
            field: b'|',
            component: b'^',
            repetition: b'~',
            escape: b'\\',
            subcomponent: b'&',
        }
    );

    let custom = Message::new("MSH.....").unwrap();
    let d = custom.delimiters();
    assert!([d.field, d.component, d.repetition, d.escape, d.subcomponent]
        .iter()
        .all(|&b| b == b'.'));
    let segment = custom.read_segment().unwrap().expect("header segment");
    assert_eq!(segment.segment_type(), "MSH");
}

#[test]
fn test_message_parse_counts() {
    let cases = [
        ("one segment", "MSH|^~\\&", 1),
        ("two segments", "MSH|^~\\&\rMSH|^~\\&", 2),
        ("two segments, crlf", "MSH|^~\\&\r\nMSH|^~\\&", 2),
    ];
    for (name, data, count) in cases {
        let mut msg = Message::new(data).unwrap();
        let index = msg.parse().unwrap();
        assert_eq!(index.tags().collect::<Vec<_>>(), vec!["MSH"], "{name}");
        assert_eq!(index.lookup("MSH").len(), count, "{name}");
        assert_eq!(index.len(), count, "{name}");
    }
}

#[test]
fn test_message_read_segment() {
    let cases = [
        ("one segment", "MSH|^~\\&", 1),
        ("two segments", "MSH|^~\\&\rMSH|^~\\&", 2),
        ("two segments, extra whitespace", "MSH|^~\\&\r\nMSH|^~\\&", 2),
    ];
    for (name, data, count) in cases {
        let msg = Message::new(data).unwrap();
        for _ in 0..count {
            assert!(msg.read_segment().unwrap().is_some(), "{name}");
        }
        for _ in 0..3 {
            assert!(msg.read_segment().unwrap().is_none(), "{name}");
        }
    }
}

#[test]
fn test_get_segment_from_fixture() {
    init_test_logger();
    let mut msg = Message::new(fixture()).unwrap();
    msg.parse().unwrap();

    let pid = &msg.segment("PID")[0];
    assert_eq!(pid.get(5, 0, 0, 0).unwrap(), "SMITH");
    assert_eq!(pid.get(5, 0, 1, 0).unwrap(), "CURTIS");

    assert_eq!(msg.find("MSH.0").unwrap(), "MSH");
    assert_eq!(msg.find("MSH.1").unwrap(), "^~\\&");
    assert_eq!(msg.find("MSH.2").unwrap(), "CERNER");
    assert_eq!(msg.find("MSH.4").unwrap(), "PriorityHealth");
    assert_eq!(msg.find("MSH.8.1").unwrap(), "R01");
    assert_eq!(msg.find("PID.11.2").unwrap(), "ANN ARBOR");
    assert_eq!(msg.find("PV1.8.1").unwrap(), "WELBY");
    assert_eq!(msg.find("OBX.3.1").unwrap(), "GLUCOSE");
    assert_eq!(msg.find("NTE.3").unwrap(), "Specimen received \\ processed");

    let second_obx = &msg.segment("OBX")[1];
    assert_eq!(
        second_obx.get(5, 0, 0, 0).unwrap(),
        "Fasting & post-prandial values differ"
    );
}

#[test]
fn test_absent_segments() {
    let mut msg = Message::new(fixture()).unwrap();
    msg.parse().unwrap();
    assert!(msg.segment("IN1").is_empty());
    assert!(msg.is_absent("IN1"));
    assert!(!msg.is_absent("OBX"));

    let loc = Location::parse("IN1.3").unwrap();
    assert!(matches!(msg.get(&loc), Err(Hl7Error::SegmentNotFound { tag }) if tag == "IN1"));
}

#[test]
fn test_lazy_reads_then_parse_sees_remainder() {
    let mut msg = Message::new(fixture()).unwrap();
    let header = msg.read_segment().unwrap().unwrap();
    assert_eq!(header.segment_type(), "MSH");

    let index = msg.parse().unwrap();
    assert!(index.is_absent("MSH"));
    assert_eq!(index.lookup("OBX").len(), 2);
}

#[test]
fn test_concurrent_reads_do_not_interleave() {
    let mut input = String::from("MSH|^~\\&\r");
    for i in 0..200 {
        input.push_str(&format!("OBX|{i}|NM|CODE{i}||{i}\r"));
    }
    let msg = Arc::new(Message::new(input).unwrap());

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let msg = Arc::clone(&msg);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(segment) = msg.read_segment().unwrap() {
                    seen.push(segment);
                }
                seen
            })
        })
        .collect();

    let mut ids: Vec<usize> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .filter(|s| s.segment_type() == "OBX")
        .map(|s| {
            let id = s.get(1, 0, 0, 0).unwrap();
            assert_eq!(s.get(3, 0, 0, 0).unwrap(), format!("CODE{id}"));
            id.parse().unwrap()
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..200).collect::<Vec<_>>());
}

#[test]
fn test_parsed_index_is_shareable() {
    let mut msg = Message::new(fixture()).unwrap();
    msg.parse().unwrap();
    let msg = Arc::new(msg);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let msg = Arc::clone(&msg);
            thread::spawn(move || msg.find("PID.5.1").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "CURTIS");
    }
}

#[cfg(feature = "serde")]
#[test]
fn test_location_serializes() {
    let loc = Location::parse("PID.5.1").unwrap();
    let json = serde_json::to_string(&loc).unwrap();
    assert_eq!(
        json,
        r#"{"segment":"PID","field":5,"component":1,"subcomponent":0}"#
    );
    assert_eq!(serde_json::from_str::<Location>(&json).unwrap(), loc);
}
