//! Select-code tables as seen by the passes.

use tessera_bitstream::{code_bits, select_code, select_index, select_width, SelectCodes};

fn decode(bits: &[char]) -> u64 {
    bits.iter()
        .enumerate()
        .filter(|(_, &c)| c == '1')
        .map(|(b, _)| 1u64 << b)
        .sum()
}

#[test]
fn memoized_bits_decode_to_their_input() {
    let mut codes = SelectCodes::new();
    for sz in 1..=64usize {
        for idx in 0..sz {
            let bits = codes.bits(sz, idx).unwrap();
            assert_eq!(bits.len() as u32, select_width(sz));
            assert_eq!(bits, code_bits(select_code(sz, idx).unwrap(), select_width(sz)));
            if sz > 1 {
                assert_eq!(select_index(sz, decode(&bits)), Some(idx), "sz={sz} idx={idx}");
            }
        }
        assert!(codes.bits(sz, sz).is_none());
    }
}

#[test]
fn power_of_two_widths_use_every_code() {
    for width in 1..=6u32 {
        let sz = 1usize << width;
        let mut used: Vec<u64> = (0..sz).map(|i| select_code(sz, i).unwrap()).collect();
        used.sort_unstable();
        assert_eq!(used, (0..sz as u64).collect::<Vec<_>>());
    }
}

#[test]
fn four_input_mux_bits() {
    assert_eq!(code_bits(select_code(4, 2).unwrap(), 2), vec!['1', '0']);
    assert_eq!(code_bits(select_code(4, 0).unwrap(), 2), vec!['1', '1']);
}
