#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick the read widths.
    while idx < data.len() && idx < 1024 {
        let op = data[idx];
        idx += 1;

        let before = reader.bits_remaining();
        if op % 4 == 0 {
            let _ = reader.read_bit();
        } else {
            // Widths past 32 must be rejected without consuming input.
            let bits = op % 40;
            if reader.read_bits(bits).is_err() {
                assert_eq!(reader.bits_remaining(), before);
            }
        }
    }
});
