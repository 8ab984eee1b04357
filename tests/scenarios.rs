//! End-to-end behavior on small, well-understood inputs.
use lzkit::codec::{self, Format, SymbolBuffer, SymbolReader, SymbolSlice, SymbolWriter};
use lzkit::{Algorithm, Error, Lz77, Lzw, Registry, Symbol, WindowConfig};

fn literals(bytes: &[u8]) -> Vec<Symbol> {
    bytes.iter().map(|&b| Symbol::Literal(b)).collect()
}

fn refs(bytes: &[u8]) -> Vec<Symbol> {
    bytes.iter().map(|&b| Symbol::DictRef(u32::from(b))).collect()
}

const TOBEORNOT: &[u8] = b"TOBEORNOTTOBEORTOBEORNOT";

#[test]
fn lz77_reuses_an_earlier_substring() {
    let data = b"abcdebcdfghij";
    let config = WindowConfig::new().with_max_distance(13).with_max_length(13);
    let lz77 = Lz77::with_config(config).unwrap();

    let mut expected = literals(b"abcde");
    expected.push(Symbol::BackRef { distance: 4, length: 3 });
    expected.extend(literals(b"fghij"));

    let symbols = lz77.compress_to_vec(data).unwrap();
    assert_eq!(symbols, expected);
    assert_eq!(lz77.decompress_to_vec(&expected).unwrap(), data);
}

#[test]
fn lzw_builds_up_its_dictionary() {
    let mut expected = refs(b"TOBEORNOT");
    expected.extend([257, 259, 261, 266, 260, 262, 264].iter().map(|&e| Symbol::DictRef(e)));

    let symbols = Lzw::new().compress_to_vec(TOBEORNOT).unwrap();
    assert_eq!(symbols, expected);
    assert!(!symbols.contains(&Symbol::Reset));
    assert_eq!(Lzw::new().decompress_to_vec(&symbols).unwrap(), TOBEORNOT);
}

#[test]
fn lzw_resets_a_full_dictionary() {
    let lzw = Lzw::with_max_entries(268).unwrap();
    let symbols = lzw.compress_to_vec(TOBEORNOT).unwrap();

    let reset = symbols.iter().position(|&s| s == Symbol::Reset).unwrap();
    assert!(reset > 0 && reset < symbols.len() - 1);
    // Right after a reset only single bytes are known.
    assert!(matches!(symbols[reset + 1], Symbol::DictRef(entry) if entry < 256));
    assert_eq!(lzw.decompress_to_vec(&symbols).unwrap(), TOBEORNOT);
}

#[test]
fn empty_input_gives_an_empty_stream() {
    let registry = Registry::default();
    for name in registry.names() {
        let algorithm = registry.get(name).unwrap();
        let mut buffer = SymbolBuffer::new();
        algorithm.compress(&mut &b""[..], &mut buffer).unwrap();
        assert_eq!(buffer.algorithm(), Some(name));
        assert!(buffer.symbols().is_empty());

        let mut out = vec![];
        algorithm.decompress(&mut buffer.reader(), &mut out).unwrap();
        assert!(out.is_empty());
    }
}

#[test]
fn small_window_matches_like_a_large_one() {
    // Repetitions at distance 7 only, so a window of 8 suffices.
    let data = b"0123456012345601234560123456xyz0123456";
    let wide = Lz77::with_config(WindowConfig::new().with_max_distance(8).with_max_length(8)).unwrap();
    let narrow = Lz77::with_config(
        WindowConfig::new()
            .with_max_distance(8)
            .with_max_length(8)
            .with_buffer_len(1),
    )
    .unwrap();

    let expected = wide.compress_to_vec(data).unwrap();
    assert!(expected.iter().any(|s| matches!(s, Symbol::BackRef { .. })));
    assert_eq!(narrow.compress_to_vec(data).unwrap(), expected);
    assert_eq!(narrow.decompress_to_vec(&expected).unwrap(), &data[..]);
}

#[test]
fn streams_are_bound_to_their_algorithm() {
    let registry = Registry::default();
    let mut wire = vec![];
    let mut writer = Format::Xml.writer(&mut wire);
    Lzw::new().compress(&mut &TOBEORNOT[..], &mut *writer).unwrap();
    drop(writer);

    let mut reader = codec::open(&wire[..]).unwrap();
    let mut out = vec![];
    let err = Lz77::new().decompress(&mut *reader, &mut out).unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(matches!(err, Error::AlgorithmMismatch { expected: "lz77", .. }));

    let reader = codec::open(&wire[..]).unwrap();
    assert_eq!(registry.for_reader(&*reader).unwrap().name(), "lzw");
}

#[test]
fn foreign_symbols_are_protocol_violations() {
    let lz77_symbols = Lz77::new().compress_to_vec(b"abcabcabc").unwrap();
    let err = Lzw::new().decompress_to_vec(&lz77_symbols).unwrap_err();
    assert!(err.is_protocol_violation());

    let lzw_symbols = Lzw::new().compress_to_vec(b"abcabcabc").unwrap();
    let err = Lz77::new().decompress_to_vec(&lzw_symbols).unwrap_err();
    assert!(err.is_protocol_violation());
}

#[test]
fn stream_of_symbols_survives_both_formats() {
    let symbols = [
        Symbol::Literal(b'a'),
        Symbol::BackRef { distance: 4, length: 3 },
        Symbol::DictRef(567),
        Symbol::Reset,
    ];
    for &format in Format::ALL.iter() {
        let mut wire = vec![];
        let mut writer = format.writer(&mut wire);
        writer.set_algorithm("testAlgo").unwrap();
        let mut source = SymbolSlice::untagged(&symbols);
        while let Some(symbol) = source.read_symbol().unwrap() {
            writer.write_symbol(symbol).unwrap();
        }
        writer.finish().unwrap();
        drop(writer);

        let mut reader = format.reader(&wire[..]).unwrap();
        assert_eq!(reader.algorithm(), Some("testAlgo"));
        let mut back = SymbolBuffer::new();
        while let Some(symbol) = reader.read_symbol().unwrap() {
            back.write_symbol(symbol).unwrap();
        }
        assert_eq!(back.symbols(), &symbols[..]);
    }
}

#[test]
fn xml_output_is_readable() {
    let mut wire = vec![];
    let mut writer = Format::Xml.writer(&mut wire);
    Lz77::new().compress(&mut &b"abcdebcdfghij"[..], &mut *writer).unwrap();
    drop(writer);

    let text = String::from_utf8(wire).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(text.contains("<compressedData algorithm=\"lz77\">\n  <byte value=\"97\"/>\n"));
    assert!(text.contains("  <reference distance=\"4\" length=\"3\"/>\n"));
    assert!(text.ends_with("</compressedData>\n"));
}
