//! Benchmark for sparse bit-set JSON encoding.
//!
//! Builds a collection of large, mostly empty sets for every loading flag
//! from a fixed-seed RNG and compares the sparse wire form against a dense
//! one-boolean-per-bit encoding.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use bitset_json::codec::{decode_flagged, encode_flagged};
use bitset_json::{BitIndexed, BitSet, Capacity, Flag, FlaggedCollection, LoadingFlag, SparseSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::Value;

const CAPACITY: usize = 10_000;
const SETS_PER_FLAG: usize = 200;
/// Expected set bits per set.
const BITS_PER_SET: usize = 25;
const ITERATIONS: u32 = 5;
const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

fn build_collection(rng: &mut StdRng) -> FlaggedCollection<LoadingFlag> {
    let mut collection = FlaggedCollection::default();
    for &flag in LoadingFlag::ALL {
        let sets = (0..SETS_PER_FLAG)
            .map(|_| {
                let mut set = BitSet::with_capacity(CAPACITY);
                for _ in 0..rng.gen_range(0..BITS_PER_SET * 2) {
                    set.insert(rng.gen_range(0..CAPACITY));
                }
                set
            })
            .collect();
        collection.insert(flag, sets);
    }
    collection
}

fn dense_json(collection: &FlaggedCollection<LoadingFlag>) -> String {
    let dense: BTreeMap<String, Vec<Vec<bool>>> = collection
        .iter()
        .map(|(flag, sets)| {
            let sets = sets
                .iter()
                .map(|set| (0..set.size()).map(|i| set.test(i)).collect())
                .collect();
            (flag.code().to_string(), sets)
        })
        .collect();
    serde_json::to_string(&dense).unwrap()
}

fn streamed_json(collection: &FlaggedCollection<LoadingFlag>) -> String {
    let streamed: BTreeMap<String, Vec<SparseSet<'_, BitSet>>> = collection
        .iter()
        .map(|(flag, sets)| (flag.code().to_string(), sets.iter().map(SparseSet).collect()))
        .collect();
    serde_json::to_string(&streamed).unwrap()
}

fn time<T>(mut f: impl FnMut() -> T) -> (T, Duration) {
    let mut result = f();
    let start = Instant::now();
    for _ in 0..ITERATIONS {
        result = f();
    }
    (result, start.elapsed() / ITERATIONS)
}

#[derive(Serialize)]
struct Timings {
    encode_us: u128,
    serialize_us: u128,
    stream_us: u128,
    parse_us: u128,
    decode_us: u128,
}

#[derive(Serialize)]
struct Report {
    flags: usize,
    sets: usize,
    capacity: usize,
    bits_set: usize,
    sparse_bytes: usize,
    dense_bytes: usize,
    ratio: f64,
    timings: Timings,
}

fn main() {
    let mut rng = StdRng::seed_from_u64(SEED);

    let start = Instant::now();
    let collection = build_collection(&mut rng);
    let bits_set: usize = collection.values().flatten().map(BitSet::count).sum();
    eprintln!(
        "Built {} sets ({} bits set) in {:?}",
        collection.values().map(Vec::len).sum::<usize>(),
        bits_set,
        start.elapsed()
    );

    let (value, encode) = time(|| encode_flagged(&collection));
    let (text, serialize) = time(|| value.to_string());
    let (streamed, stream) = time(|| streamed_json(&collection));
    let (parsed, parse) = time(|| serde_json::from_str::<Value>(&text).unwrap());
    let (decoded, decode) = time(|| decode_flagged::<LoadingFlag>(&parsed, Capacity::Exact(CAPACITY)));

    let decoded = match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            eprintln!("Decode failed: {}", e);
            std::process::exit(1);
        }
    };
    assert_eq!(decoded, collection, "roundtrip mismatch");
    assert_eq!(streamed.len(), text.len(), "streamed and value encodings differ in size");

    eprintln!("Encoding dense form for comparison...");
    let dense = dense_json(&collection);

    let report = Report {
        flags: collection.len(),
        sets: collection.values().map(Vec::len).sum(),
        capacity: CAPACITY,
        bits_set,
        sparse_bytes: text.len(),
        dense_bytes: dense.len(),
        ratio: dense.len() as f64 / text.len() as f64,
        timings: Timings {
            encode_us: encode.as_micros(),
            serialize_us: serialize.as_micros(),
            stream_us: stream.as_micros(),
            parse_us: parse.as_micros(),
            decode_us: decode.as_micros(),
        },
    };
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}
