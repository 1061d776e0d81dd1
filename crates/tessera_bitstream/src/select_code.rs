//! Logical mux input index to physical select code.
//!
//! For a mux of `sz` inputs, let `power2` be the largest power of two not
//! above `sz` and `pairs = sz - power2`. The first `2 * pairs` inputs sit in
//! two-input leaf muxes at the far end of the tree:
//!
//! ```text
//! idx < 2*pairs, even:  code = (power2 - 1 - idx/2) * 2 + 1
//! idx < 2*pairs, odd:   code = (power2 - 1 - idx/2) * 2
//! otherwise:            code = (sz - 1 - idx) * 2
//! pairs == 0:           code = sz - 1 - idx
//! ```
//!
//! Codes occupy `ceil(log2(sz))` select bits, written low bit first to
//! `<mux>.mem_out[b]`.

use std::collections::HashMap;

/// Number of select bits of a mux with `sz` inputs.
pub fn select_width(sz: usize) -> u32 {
    if sz <= 1 {
        0
    } else {
        usize::BITS - (sz - 1).leading_zeros()
    }
}

/// Returns the select code for logical input `idx` of a mux with `sz` inputs.
pub fn select_code(sz: usize, idx: usize) -> Option<u64> {
    if idx >= sz {
        return None;
    }
    let power2 = 1usize << (usize::BITS - 1 - sz.leading_zeros());
    let pairs = sz - power2;
    let code = if pairs == 0 {
        sz - 1 - idx
    } else if idx < 2 * pairs {
        let p = idx / 2;
        if idx % 2 == 0 {
            (power2 - 1 - p) * 2 + 1
        } else {
            (power2 - 1 - p) * 2
        }
    } else {
        (sz - 1 - idx) * 2
    };
    Some(code as u64)
}

/// Returns the logical input whose select code is `code`, if any.
/// Passes that decode repeatedly use [`SelectCodes::index_of`].
pub fn select_index(sz: usize, code: u64) -> Option<usize> {
    (0..sz).find(|&idx| select_code(sz, idx) == Some(code))
}

#[derive(Debug)]
struct CodeTable {
    codes: Vec<u64>,
    indices: HashMap<u64, usize>,
}

impl CodeTable {
    fn new(sz: usize) -> Self {
        let codes: Vec<u64> = (0..sz).filter_map(|idx| select_code(sz, idx)).collect();
        let indices = codes.iter().enumerate().map(|(idx, &code)| (code, idx)).collect();
        Self { codes, indices }
    }
}

/// Memoized code tables, one per mux width, in both directions.
#[derive(Debug, Default)]
pub struct SelectCodes {
    tables: HashMap<usize, CodeTable>,
}

impl SelectCodes {
    /// Creates an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, sz: usize) -> &CodeTable {
        self.tables.entry(sz).or_insert_with(|| CodeTable::new(sz))
    }

    /// Returns the codes of every input of a mux with `sz` inputs.
    pub fn table(&mut self, sz: usize) -> &[u64] {
        &self.entry(sz).codes
    }

    /// Returns the select code of input `idx`.
    pub fn code(&mut self, sz: usize, idx: usize) -> Option<u64> {
        self.table(sz).get(idx).copied()
    }

    /// Returns the logical input selected by `code`.
    pub fn index_of(&mut self, sz: usize, code: u64) -> Option<usize> {
        self.entry(sz).indices.get(&code).copied()
    }

    /// Returns the select bits of input `idx`, bit 0 first.
    pub fn bits(&mut self, sz: usize, idx: usize) -> Option<Vec<char>> {
        let code = self.code(sz, idx)?;
        Some(code_bits(code, select_width(sz)))
    }
}

/// Expands `code` into `width` characters, bit 0 first.
pub fn code_bits(code: u64, width: u32) -> Vec<char> {
    (0..width)
        .map(|b| if code & (1 << b) != 0 { '1' } else { '0' })
        .collect()
}
