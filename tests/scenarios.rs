use std::io;
use std::io::{Cursor, Read, Write};

use ppmac::{Config, Decoder, Encoder, Error};

fn compress_with(config: Config, input: &[u8]) -> Vec<u8> {
    Encoder::new(config)
        .unwrap()
        .compress(Cursor::new(input), vec![])
        .unwrap()
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "device gone"))
    }
}

fn decompress_with(config: Config, input: &[u8]) -> Result<Vec<u8>, Error> {
    Decoder::new(config)?.decompress(Cursor::new(input), vec![])
}

#[test]
fn aaaabbbccd_order_3() {
    let config = Config::with_order(3);
    let compressed = compress_with(config, b"AAAABBBCCD");
    let decompressed = decompress_with(config, &compressed).unwrap();
    assert_eq!(&b"AAAABBBCCD"[..], &decompressed[..]);
}

#[test]
fn empty_input() {
    let config = Config::default();
    let compressed = compress_with(config, b"");
    // Only the EOF symbol in the order -1 table (about 8 bits) plus the
    // final bit.
    assert!(!compressed.is_empty());
    assert!(compressed.len() <= 2);
    let decompressed = decompress_with(config, &compressed).unwrap();
    assert!(decompressed.is_empty());
}

#[test]
fn flat_model_codes_all_symbols_alike() {
    let config = Config::with_order(-1);
    let same = compress_with(config, b"AAAA");
    let different = compress_with(config, b"ABCD");
    // Five symbols of log2(257) bits each.
    assert_eq!(5, same.len());
    assert_eq!(same.len(), different.len());
    assert_eq!(&b"AAAA"[..], &decompress_with(config, &same).unwrap()[..]);
    assert_eq!(&b"ABCD"[..], &decompress_with(config, &different).unwrap()[..]);
}

#[test]
fn all_byte_values() {
    let mut input: Vec<u8> = (0..=255).collect();
    input.extend((0..=255).rev());
    input.extend((0..=255).map(|b: u8| b.wrapping_mul(97)));
    for order in -1..=4 {
        let config = Config::with_order(order);
        let compressed = compress_with(config, &input);
        assert_eq!(input, decompress_with(config, &compressed).unwrap());
    }
}

#[test]
fn long_runs() {
    let mut input = vec![0u8; 20_000];
    input.extend(vec![0xffu8; 20_000]);
    let config = Config::default();
    let compressed = compress_with(config, &input);
    assert!(compressed.len() < 200);
    assert_eq!(input, decompress_with(config, &compressed).unwrap());
}

#[test]
fn small_precision() {
    let config = Config {
        precision: 16,
        order: 2,
        ..Config::default()
    };
    let input = b"she sells sea shells by the sea shore";
    let compressed = compress_with(config, &input[..]);
    assert_eq!(&input[..], &decompress_with(config, &compressed).unwrap()[..]);
}

#[test]
fn deterministic() {
    let input = b"The banana goat in the banana boat can hand bananas to the banana man.";
    let config = Config::default();
    assert_eq!(compress_with(config, &input[..]), compress_with(config, &input[..]));
}

#[test]
fn missing_input() {
    for order in -1..=3 {
        match decompress_with(Config::with_order(order), b"") {
            Err(Error::UnexpectedEof) => {}
            r => panic!("unexpected result {:?}", r),
        }
    }
}

#[test]
fn input_without_final_bit() {
    // Every valid stream ends with the one bit written when the
    // encoder is finished.
    match decompress_with(Config::default(), &[0u8; 3]) {
        Err(Error::UnexpectedEof) => {}
        r => panic!("unexpected result {:?}", r),
    }
}

#[test]
fn every_truncation_is_detected() {
    // At 11 bits the frequency totals reach their limit quickly, so a
    // cut stream cannot keep producing symbols for long.
    let input = b"The banana goat in the banana boat can hand bananas to the banana man.";
    for &order in &[0, 2] {
        let config = Config {
            precision: 11,
            order,
            ..Config::default()
        };
        let compressed = compress_with(config, &input[..]);
        for len in 0..compressed.len() {
            match decompress_with(config, &compressed[..len]) {
                Err(Error::UnexpectedEof) => {}
                r => panic!("order {}, {} bytes: unexpected result {:?}", order, len, r),
            }
        }
    }
}

#[test]
fn truncation_reported_when_totals_overflow() {
    // Cut to one byte, this stream decodes symbols from zero padding
    // until a context total exceeds the precision limit.
    for order in 0..=3 {
        let config = Config {
            precision: 11,
            order,
            ..Config::default()
        };
        let compressed = compress_with(config, b"AAAABBBCCD");
        for len in 0..compressed.len() {
            match decompress_with(config, &compressed[..len]) {
                Err(Error::UnexpectedEof) => {}
                r => panic!("order {}, {} bytes: unexpected result {:?}", order, len, r),
            }
        }
    }
}

#[test]
fn trailing_data_is_corrupt() {
    let config = Config::default();
    let mut compressed = compress_with(config, b"AAAABBBCCD");
    compressed.extend_from_slice(&[0; 8]);
    match decompress_with(config, &compressed) {
        Err(Error::CorruptInput) => {}
        r => panic!("unexpected result {:?}", r),
    }
}

#[test]
fn total_exceeding_precision_is_fatal() {
    // With 11 bits the largest codable total is 512.  The root context
    // starts at 1 and grows by one per byte.
    let config = Config {
        precision: 11,
        order: 0,
        ..Config::default()
    };
    let input = vec![b'A'; 600];
    let result = Encoder::new(config)
        .unwrap()
        .compress(Cursor::new(&input[..]), vec![]);
    match result {
        Err(Error::TotalTooLarge { total: 513, max: 512 }) => {}
        r => panic!("unexpected result {:?}", r.map(|v| v.len())),
    }
}

#[test]
fn write_errors_are_propagated() {
    let config = Config::default();
    match Encoder::new(config).unwrap().compress(Cursor::new(&b"hello"[..]), FailingWriter) {
        Err(Error::Io(e)) => assert_eq!("disk full", e.to_string()),
        Err(e) => panic!("unexpected error {:?}", e),
        Ok(_) => panic!("expected an error"),
    }

    let compressed = compress_with(config, b"hello");
    match Decoder::new(config).unwrap().decompress(Cursor::new(&compressed[..]), FailingWriter) {
        Err(Error::Io(e)) => assert_eq!("disk full", e.to_string()),
        Err(e) => panic!("unexpected error {:?}", e),
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn read_errors_are_propagated() {
    let config = Config::default();
    match Encoder::new(config).unwrap().compress(FailingReader, vec![]) {
        Err(Error::Io(e)) => assert_eq!("device gone", e.to_string()),
        r => panic!("unexpected result {:?}", r),
    }
    match Decoder::new(config).unwrap().decompress(FailingReader, vec![]) {
        Err(Error::Io(e)) => assert_eq!("device gone", e.to_string()),
        r => panic!("unexpected result {:?}", r),
    }
}
