//! Property tests for canonical encoding.

use proptest::{collection::vec, prelude::*};
use rlpkit::{decode, encode, head_size, int_size, Bytes, Value};

fn value() -> impl Strategy<Value = Value> {
    let leaf = vec(any::<u8>(), 0..80).prop_map(|b| Value::Bytes(b.into()));
    leaf.prop_recursive(4, 64, 8, |inner| vec(inner, 0..8).prop_map(Value::List))
}

proptest! {
    #[test]
    fn uint_round_trip(x in any::<u64>()) {
        let encoded = encode(x).unwrap();
        prop_assert_eq!(encoded.len(), int_size(x));
        prop_assert_eq!(decode::<u64>(&encoded).unwrap(), x);
    }

    #[test]
    fn u128_round_trip(x in any::<u128>()) {
        let encoded = encode(x).unwrap();
        prop_assert_eq!(decode::<u128>(&encoded).unwrap(), x);
    }

    #[test]
    fn bytes_use_minimal_heads(b in vec(any::<u8>(), 0..300)) {
        let encoded = encode(Bytes::from(b.clone())).unwrap();
        let expected_len = match b[..] {
            [single] if single < 0x80 => 1,
            _ => head_size(b.len()) + b.len(),
        };
        prop_assert_eq!(encoded.len(), expected_len);
        prop_assert_eq!(decode::<Bytes>(&encoded).unwrap(), b);
    }

    #[test]
    fn strings_round_trip(s in ".{0,100}") {
        let encoded = encode(&s).unwrap();
        prop_assert_eq!(decode::<String>(&encoded).unwrap(), s);
    }

    #[test]
    fn lists_round_trip(items in vec(any::<u64>(), 0..64)) {
        let encoded = encode(&items).unwrap();
        prop_assert_eq!(decode::<Vec<u64>>(&encoded).unwrap(), items);
    }

    #[test]
    fn trees_round_trip(tree in value()) {
        let encoded = encode(&tree).unwrap();
        prop_assert_eq!(decode::<Value>(&encoded).unwrap(), tree);
    }

    #[test]
    fn streamed_encoding_matches(tree in value()) {
        let expected = encode(&tree).unwrap();
        let (size, mut reader) = rlpkit::encode_to_reader(&tree).unwrap();
        let mut streamed = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut streamed).unwrap();
        prop_assert_eq!(size, expected.len());
        prop_assert_eq!(streamed, expected);
    }

    /// Every input that decodes re-encodes to the same bytes.
    #[test]
    fn decoding_is_canonical(input in vec(any::<u8>(), 0..64)) {
        if let Ok(tree) = decode::<Value>(&input) {
            prop_assert_eq!(encode(&tree).unwrap(), input);
        }
    }

    #[test]
    fn count_matches_concatenation(trees in vec(value(), 0..6)) {
        let mut input = Vec::new();
        for tree in &trees {
            input.extend(encode(tree).unwrap());
        }
        prop_assert_eq!(rlpkit::count_values(&input).unwrap(), trees.len());
    }
}
