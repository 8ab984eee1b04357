use lzkit::codec::Format;
use lzkit::{Algorithm, Lz77, Lzw, Symbol, WindowConfig, FIRST_FREE_ENTRY, MIN_MATCH, RESERVED_ENTRY};
use proptest::prelude::*;

/// Inputs from a tiny alphabet, so matches and dictionary hits are frequent.
fn repetitive() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..4000)
}

fn window_config() -> impl Strategy<Value = WindowConfig> {
    (1u32..300, MIN_MATCH..40, 0usize..100).prop_map(|(distance, length, buffer)| {
        WindowConfig::new()
            .with_max_distance(distance)
            .with_max_length(length)
            .with_buffer_len(buffer)
    })
}

fn symbol() -> impl Strategy<Value = Symbol> {
    prop_oneof![
        any::<u8>().prop_map(Symbol::Literal),
        (any::<u32>(), any::<u32>())
            .prop_map(|(distance, length)| Symbol::BackRef { distance, length }),
        any::<u32>().prop_map(Symbol::DictRef),
        Just(Symbol::Reset),
    ]
}

/// Check every back-reference against the bytes it stands for.
fn check_references(data: &[u8], symbols: &[Symbol], config: WindowConfig) -> Result<(), TestCaseError> {
    let mut position = 0usize;
    for symbol in symbols {
        match *symbol {
            Symbol::Literal(byte) => {
                prop_assert_eq!(data[position], byte);
                position += 1;
            }
            Symbol::BackRef { distance, length } => {
                prop_assert!(distance >= 1 && distance <= config.max_distance);
                prop_assert!(distance as usize <= position);
                prop_assert!(length >= MIN_MATCH && length <= config.max_length);
                let (distance, length) = (distance as usize, length as usize);
                for i in 0..length {
                    prop_assert_eq!(data[position + i], data[position + i - distance]);
                }
                position += length;
            }
            other => prop_assert!(false, "unexpected {}", other),
        }
    }
    prop_assert_eq!(position, data.len());
    Ok(())
}

/// Rebuild the dictionary from the stream alone and check every reference against the source.
///
/// Each reference after the first of a run adds one entry, the previous sequence plus the first
/// byte of this one, numbered right after the last entry added. A stream that skipped or reused
/// a number would refer to the wrong bytes.
fn check_insertions(data: &[u8], symbols: &[Symbol], max_entries: u32) -> Result<(), TestCaseError> {
    let mut position = 0usize;
    // Sequence of entry `FIRST_FREE_ENTRY + i` at index `i`.
    let mut entries: Vec<Vec<u8>> = Vec::new();
    let mut previous: Option<Vec<u8>> = None;
    for symbol in symbols {
        let entry = match *symbol {
            Symbol::Reset => {
                entries.clear();
                previous = None;
                continue;
            }
            Symbol::DictRef(entry) => entry,
            other => return Err(TestCaseError::fail(format!("unexpected {}", other))),
        };

        let next_free = FIRST_FREE_ENTRY + entries.len() as u32;
        let sequence = if entry < RESERVED_ENTRY {
            vec![entry as u8]
        } else if entry == next_free {
            // The entry this very reference defines.
            let prefix = match &previous {
                Some(prefix) => prefix,
                None => return Err(TestCaseError::fail("first reference of a run is undefined")),
            };
            let mut sequence = prefix.clone();
            sequence.push(prefix[0]);
            sequence
        } else {
            prop_assert!(
                (FIRST_FREE_ENTRY..next_free).contains(&entry),
                "entry {} with {} defined",
                entry,
                next_free
            );
            entries[(entry - FIRST_FREE_ENTRY) as usize].clone()
        };

        prop_assert!(position + sequence.len() <= data.len());
        prop_assert_eq!(&data[position..position + sequence.len()], &sequence[..]);
        position += sequence.len();

        if let Some(mut added) = previous.take() {
            added.push(sequence[0]);
            entries.push(added);
            prop_assert!(FIRST_FREE_ENTRY + entries.len() as u32 <= max_entries);
        }
        previous = Some(sequence);
    }
    prop_assert_eq!(position, data.len());
    Ok(())
}

#[test]
fn insertion_model_matches_the_known_stream() {
    let data = b"TOBEORNOTTOBEORTOBEORNOT";
    let symbols = Lzw::new().compress_to_vec(data).unwrap();
    check_insertions(data, &symbols, 4096).unwrap();

    // Renumbering one reference breaks the model even though it stays in range.
    let mut skewed = symbols.clone();
    for symbol in skewed.iter_mut() {
        if *symbol == Symbol::DictRef(259) {
            *symbol = Symbol::DictRef(258);
        }
    }
    assert!(check_insertions(data, &skewed, 4096).is_err());
}

proptest! {
    #[test]
    fn lz77_roundtrips_arbitrary_bytes(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        let symbols = Lz77::new().compress_to_vec(&data).unwrap();
        prop_assert_eq!(Lz77::new().decompress_to_vec(&symbols).unwrap(), data);
    }

    #[test]
    fn lz77_references_are_valid(data in repetitive(), config in window_config()) {
        let lz77 = Lz77::with_config(config).unwrap();
        let symbols = lz77.compress_to_vec(&data).unwrap();
        check_references(&data, &symbols, config)?;
        prop_assert_eq!(lz77.decompress_to_vec(&symbols).unwrap(), data);
    }

    #[test]
    fn lzw_roundtrips(data in repetitive(), max_entries in 258u32..600) {
        let lzw = Lzw::with_max_entries(max_entries).unwrap();
        let symbols = lzw.compress_to_vec(&data).unwrap();
        prop_assert_eq!(lzw.decompress_to_vec(&symbols).unwrap(), data);
    }

    #[test]
    fn lzw_entries_grow_one_by_one(data in repetitive(), max_entries in 258u32..600) {
        let symbols = Lzw::with_max_entries(max_entries).unwrap().compress_to_vec(&data).unwrap();
        check_insertions(&data, &symbols, max_entries)?;
    }

    #[test]
    fn wire_formats_preserve_symbols(
        symbols in prop::collection::vec(symbol(), 0..200),
        name in "[a-z0-9<>&\"']{1,20}",
    ) {
        for &format in Format::ALL.iter() {
            let mut wire = Vec::new();
            let mut writer = format.writer(&mut wire);
            writer.set_algorithm(&name).unwrap();
            for &symbol in &symbols {
                writer.write_symbol(symbol).unwrap();
            }
            writer.finish().unwrap();
            drop(writer);

            let mut reader = lzkit::codec::open(&wire[..]).unwrap();
            prop_assert_eq!(reader.algorithm(), Some(name.as_str()));
            let mut back = Vec::new();
            while let Some(symbol) = reader.read_symbol().unwrap() {
                back.push(symbol);
            }
            prop_assert_eq!(&back, &symbols);
        }
    }

    #[test]
    fn garbage_never_panics(wire in prop::collection::vec(any::<u8>(), 0..300)) {
        if let Ok(mut reader) = lzkit::codec::open(&wire[..]) {
            for _ in 0..1000 {
                match reader.read_symbol() {
                    Ok(Some(_)) => {}
                    _ => break,
                }
            }
        }
    }
}
