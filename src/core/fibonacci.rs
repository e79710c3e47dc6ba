//! Fibonacci (Zeckendorf) coded integers.
//!
//! A value is written as a sum of non-consecutive Fibonacci numbers, least significant term
//! first, and terminated by two consecutive `1` bits.
use crate::core::{DataReader, ReadError};

/// Largest index whose Fibonacci number is supported.
pub const MAX_FIBONACCI_INDEX: usize = 92;

const TABLE_LEN: usize = 32;

const TABLE: [u64; TABLE_LEN] = build_table();

const fn build_table() -> [u64; TABLE_LEN] {
    let mut table = [0; TABLE_LEN];
    table[1] = 1;

    let mut i = 2;
    while i < TABLE_LEN {
        table[i] = table[i - 1] + table[i - 2];
        i += 1;
    }

    table
}

/// Returns the Fibonacci number at `index`, with `F(0) = 0` and `F(1) = 1`.
///
/// Small indices come from a table built at compile time, larger ones are computed from the
/// end of that table.
///
/// # Errors
///
/// Returns [`ReadError::IndexTooLarge`] if `index` is greater than [`MAX_FIBONACCI_INDEX`].
pub fn fibonacci_value(index: usize) -> Result<u64, ReadError> {
    if index > MAX_FIBONACCI_INDEX {
        return Err(ReadError::IndexTooLarge { index });
    }
    if let Some(&value) = TABLE.get(index) {
        return Ok(value);
    }

    let (mut prev, mut curr) = (TABLE[TABLE_LEN - 2], TABLE[TABLE_LEN - 1]);
    for _ in TABLE_LEN..=index {
        let next = prev + curr;
        prev = curr;
        curr = next;
    }

    Ok(curr)
}

impl DataReader<'_> {
    /// Reads a single Fibonacci coded integer.
    ///
    /// A set bit at scan position `i` contributes `F(i + 2)`. The bits scanned before a failure
    /// stay consumed.
    pub fn read_fibonacci_integer(&mut self) -> Result<u64, ReadError> {
        let mut total = 0u64;
        let mut last_bit = false;
        let mut index = 2;

        loop {
            let bit = self.read_bool()?;

            // two consecutive 1's signal the end of the value
            if last_bit && bit {
                return Ok(total);
            }

            if bit {
                let value = fibonacci_value(index)?;
                total = total
                    .checked_add(value)
                    .ok_or(ReadError::ValueOverflow { value: total })?;
            }
            last_bit = bit;
            index += 1;
        }
    }
}
