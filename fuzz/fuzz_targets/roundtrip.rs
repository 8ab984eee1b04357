#![no_main]
use libfuzzer_sys::fuzz_target;
use lzkit::codec::{self, Format};
use lzkit::{Algorithm, Lz77, Lzw};

fuzz_target!(|data: &[u8]| {
    let algorithms: [&dyn Algorithm; 3] = [&Lz77::new(), &Lzw::new(), &Lzw::with_max_entries(258).unwrap()];
    for algorithm in algorithms.iter() {
        for &format in Format::ALL.iter() {
            let mut wire = Vec::with_capacity(2*data.len() + 40);
            let mut writer = format.writer(&mut wire);
            algorithm.compress(&mut &data[..], &mut *writer).unwrap();
            drop(writer);

            let mut reader = codec::open(wire.as_slice()).unwrap();
            let mut compare = vec![];
            let result = algorithm.decompress(&mut *reader, &mut compare);
            assert!(result.is_ok(), "{:?}", result);
            assert_eq!(data, compare.as_slice());
        }
    }
});
