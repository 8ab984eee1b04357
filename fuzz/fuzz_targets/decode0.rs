#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw_data: &[u8]| {
    let registry = lzkit::Registry::default();
    let mut reader = match lzkit::codec::open(raw_data) {
        Ok(reader) => reader,
        Err(_) => return,
    };
    if let Ok(algorithm) = registry.for_reader(&*reader) {
        let _ = algorithm.decompress(&mut *reader, &mut std::io::sink());
    }
});
