//! Simple decoder to inspect flagged-collection JSON files.

use std::fs;

use bitset_json::{BitSet, Capacity, LoadingFlag, from_json_str};

fn format_set(set: &BitSet) -> String {
    let preview: Vec<String> = set.iter().take(12).map(|i| i.to_string()).collect();
    if set.count() > 12 {
        format!("[{}, ...] ({} of {})", preview.join(", "), set.count(), set.size())
    } else {
        format!("[{}] ({} of {})", preview.join(", "), set.count(), set.size())
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../../data/loading_flags.json".to_string());
    let capacity = match std::env::args().nth(2) {
        Some(n) => Capacity::Exact(n.parse().expect("capacity must be an integer")),
        None => Capacity::Inferred,
    };

    println!("Reading: {}", path);

    let text = fs::read_to_string(&path).expect("Failed to read file");
    println!("File size: {} bytes", text.len());

    let collection = match from_json_str::<LoadingFlag>(&text, capacity) {
        Ok(collection) => collection,
        Err(e) => {
            eprintln!("Failed to decode ({}): {}", e.code().code(), e);
            std::process::exit(1);
        }
    };

    let mut flags: Vec<_> = collection.keys().copied().collect();
    flags.sort();

    println!("\n=== Flags ({}) ===", flags.len());
    for flag in flags {
        let sets = &collection[&flag];
        let bits: usize = sets.iter().map(BitSet::count).sum();
        println!("\n{} (code {}): {} sets, {} bits set", flag, flag as u32, sets.len(), bits);
        for (i, set) in sets.iter().enumerate() {
            println!("  [{}] {}", i, format_set(set));
        }
    }
}
