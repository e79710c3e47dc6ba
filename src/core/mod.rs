//! Bit-level primitives shared by every consent string decoder.
//!
//! All the binary formats handled by this crate are big-endian bit streams armored with
//! URL-safe base64. [`DataReader`] wraps the decoded bytes and exposes the typed reads the
//! section decoders need. Fixed-width reads never consume bits on failure: asking for more bits
//! than remain returns [`ReadError::OutOfRange`] and leaves the cursor where it was. After a
//! failed variable-width read (Fibonacci integers and ranges, range lists, vendor sets) the
//! cursor position is unspecified.
//!
use bitstream_io::{BigEndian, BitRead, BitReader};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::collections::BTreeSet;
use std::iter::repeat_with;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub(crate) mod base64;
pub mod fibonacci;
pub mod range;

/// A set of 1-based identifiers, such as purposes or vendors.
pub type IdSet = BTreeSet<u16>;

/// Number of bits per character in the 6-bit letter encoding used by language and country codes.
const CHAR_BITS: u32 = 6;

/// The error type for low-level bit reads.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReadError {
    /// Fewer bits remain in the buffer than the read requires.
    #[error("index out of range (requested {requested} bits, {remaining} remaining)")]
    OutOfRange { requested: u64, remaining: u64 },
    /// A field length is not a multiple of its unit size.
    #[error("bit string length {bits} must be a multiple of {unit}")]
    WrongLength { bits: u32, unit: u32 },
    /// The Fibonacci index exceeds what fits in 64 bits.
    #[error("fibonacci index {index} is too large")]
    IndexTooLarge { index: usize },
    /// Integer reads must be between 1 and 64 bits wide.
    #[error("invalid integer width {bits}")]
    InvalidWidth { bits: u32 },
    #[error("invalid range (start {start} is greater than end {end})")]
    InvalidRange { start: u16, end: u16 },
    #[error("value {value} does not fit in the target type")]
    ValueOverflow { value: u64 },
    #[error("range expands to more than {limit} identifiers")]
    RangeTooLarge { limit: usize },
}

/// A [`ReadError`] annotated with the name of the field being decoded.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("unable to read field {field}: {source}")]
pub struct FieldError {
    pub field: &'static str,
    #[source]
    pub source: ReadError,
}

/// Attaches a field name to read failures.
pub(crate) trait FieldContext<T> {
    fn field(self, field: &'static str) -> Result<T, FieldError>;
}

impl<T> FieldContext<T> for Result<T, ReadError> {
    fn field(self, field: &'static str) -> Result<T, FieldError> {
        self.map_err(|source| FieldError { field, source })
    }
}

pub(crate) trait FromDataReader: Sized {
    type Err;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err>;
}

/// A point in time encoded as deciseconds since the Unix epoch.
///
/// TCF strings store their creation and update dates in 36-bit fields with a resolution of
/// one tenth of a second.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_deciseconds(deciseconds: u64) -> Self {
        Self(deciseconds)
    }

    pub const fn deciseconds(self) -> u64 {
        self.0
    }

    /// Whole seconds since the Unix epoch, rounded down.
    pub const fn unix_seconds(self) -> u64 {
        self.0 / 10
    }

    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.0.saturating_mul(100))
    }
}

/// A big-endian bit cursor over a byte buffer.
pub struct DataReader<'a> {
    bit_reader: BitReader<&'a [u8], BigEndian>,
    len: u64,
    pos: u64,
}

impl<'a> DataReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bit_reader: BitReader::endian(bytes, BigEndian),
            len: bytes.len() as u64 * 8,
            pos: 0,
        }
    }

    pub(crate) fn parse<F>(&mut self) -> Result<F, <F as FromDataReader>::Err>
    where
        F: FromDataReader,
    {
        FromDataReader::from_data_reader(self)
    }

    /// Number of bits consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining_bits(&self) -> u64 {
        self.len - self.pos
    }

    pub fn has_unread(&self) -> bool {
        self.pos < self.len
    }

    fn ensure_available(&self, bits: u64) -> Result<(), ReadError> {
        let remaining = self.remaining_bits();
        if bits > remaining {
            return Err(ReadError::OutOfRange {
                requested: bits,
                remaining,
            });
        }
        Ok(())
    }

    /// Reads an unsigned big-endian integer of `bits` bits, with `0 < bits <= 64`.
    pub fn read_uint(&mut self, bits: u32) -> Result<u64, ReadError> {
        if bits == 0 || bits > u64::BITS {
            return Err(ReadError::InvalidWidth { bits });
        }
        self.ensure_available(bits.into())?;

        let remaining = self.remaining_bits();
        let value = self
            .bit_reader
            .read_unsigned_var::<u64>(bits)
            .map_err(|_| ReadError::OutOfRange {
                requested: bits.into(),
                remaining,
            })?;
        self.pos += u64::from(bits);

        Ok(value)
    }

    /// Reads an unsigned integer of `bits` bits into the requested integer type.
    pub fn read_fixed_integer<N>(&mut self, bits: u32) -> Result<N, ReadError>
    where
        N: TryFrom<u64>,
    {
        let value = self.read_uint(bits)?;
        N::try_from(value).map_err(|_| ReadError::ValueOverflow { value })
    }

    pub fn read_bool(&mut self) -> Result<bool, ReadError> {
        Ok(self.read_uint(1)? != 0)
    }

    /// Reads `chars` 6-bit groups, each mapped to `'A' + value`.
    pub fn read_chars(&mut self, chars: usize) -> Result<String, ReadError> {
        self.ensure_available((chars as u64).saturating_mul(CHAR_BITS.into()))?;

        repeat_with(|| self.read_fixed_integer::<u8>(CHAR_BITS))
            .take(chars)
            .map(|r| r.map(|n| char::from(b'A' + n)))
            .collect()
    }

    /// Reads a character field given by its total width in bits.
    pub fn read_string_field(&mut self, bits: u32) -> Result<String, ReadError> {
        if bits % CHAR_BITS != 0 {
            return Err(ReadError::WrongLength {
                bits,
                unit: CHAR_BITS,
            });
        }
        self.read_chars((bits / CHAR_BITS) as usize)
    }

    /// Reads `bits` flags and returns the 1-based positions of those which are set.
    pub fn read_boolean_set(&mut self, bits: u16) -> Result<IdSet, ReadError> {
        self.ensure_available(bits.into())?;

        let mut result = BTreeSet::new();
        for i in 1..=bits {
            if self.read_bool()? {
                result.insert(i);
            }
        }

        Ok(result)
    }

    pub fn read_timestamp(&mut self) -> Result<Timestamp, ReadError> {
        Ok(Timestamp::from_deciseconds(self.read_uint(36)?))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use test_case::test_case;

    /// Transform a string of literal binary digits into a vector of bytes.
    /// Zeroes will be appended to fill missing bits.
    pub(crate) fn b(s: &str) -> Vec<u8> {
        let chars = s
            .chars()
            .filter(|&c| c == '1' || c == '0')
            .collect::<Vec<_>>();
        chars
            .chunks(8)
            .map(|c| (8 - c.len(), String::from_iter(c)))
            .map(|(l, s)| u8::from_str_radix(&s, 2).map(|n| n << l))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_default()
    }

    #[test]
    fn bytes() {
        assert_eq!(b("00000001 00000010 00000011"), vec![1, 2, 3]);
        assert_eq!(b("000000 010000 001000 000011"), vec![1, 2, 3]);
        assert_eq!(b("000000 010000 001000 000011 1000"), vec![1, 2, 3, 128]);
        assert_eq!(b("000000 010000 001000 000011 100"), vec![1, 2, 3, 128]);
    }

    #[test]
    fn read_uint_sequence() {
        let buf = [0xaa];
        let mut r = DataReader::new(&buf);

        assert_eq!(r.read_uint(1), Ok(1));
        assert_eq!(r.read_uint(1), Ok(0));
        assert_eq!(r.read_uint(3), Ok(5));
        assert_eq!(r.read_uint(3), Ok(2));
        assert!(!r.has_unread());
        assert_eq!(r.remaining_bits(), 0);
    }

    #[test_case("000101", 6 => 5 ; "small")]
    #[test_case("101010", 6 => 42 ; "six bits")]
    #[test_case("000000000101", 12 => 5 ; "twelve bits")]
    #[test_case("11111111 11111111 11111111 11111111 11111111 11111111 11111111 11111111", 64 => u64::MAX ; "sixty four bits")]
    #[test_case("10000000 00000000 00000000 00000000 00000000 00000000 00000000 00000001", 64 => 0x8000_0000_0000_0001 ; "sixty four bits with both ends set")]
    fn read_uint(s: &str, bits: u32) -> u64 {
        DataReader::new(&b(s)).read_uint(bits).unwrap()
    }

    #[test]
    fn read_uint_every_width() {
        let buf = [0xff; 8];
        for bits in 1..=64 {
            let mut r = DataReader::new(&buf);
            let expected = if bits == 64 {
                u64::MAX
            } else {
                (1u64 << bits) - 1
            };
            assert_eq!(r.read_uint(bits), Ok(expected), "width {bits}");
            assert_eq!(r.remaining_bits(), 64 - u64::from(bits));
        }
    }

    #[test_case(0 ; "zero")]
    #[test_case(65 ; "above sixty four")]
    fn read_uint_invalid_width(bits: u32) {
        let buf = [0xff; 16];
        let mut r = DataReader::new(&buf);
        assert_eq!(r.read_uint(bits), Err(ReadError::InvalidWidth { bits }));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn out_of_range_does_not_consume() {
        let buf = [0b1010_0000];
        let mut r = DataReader::new(&buf);

        assert_eq!(r.read_uint(3), Ok(5));
        assert_eq!(
            r.read_uint(6),
            Err(ReadError::OutOfRange {
                requested: 6,
                remaining: 5
            })
        );
        assert_eq!(r.position(), 3);
        assert_eq!(r.read_uint(5), Ok(0));
        assert!(matches!(
            r.read_bool(),
            Err(ReadError::OutOfRange { remaining: 0, .. })
        ));
    }

    #[test]
    fn empty_buffer() {
        let mut r = DataReader::new(&[]);
        assert!(!r.has_unread());
        assert!(matches!(r.read_bool(), Err(ReadError::OutOfRange { .. })));
    }

    #[test]
    fn fixed_integer_overflow() {
        let buf = b("111111111");
        let mut r = DataReader::new(&buf);
        assert_eq!(
            r.read_fixed_integer::<u8>(9),
            Err(ReadError::ValueOverflow { value: 511 })
        );
    }

    #[test_case("101010", 1 => "k" ; "single char")]
    #[test_case("101010 101011", 2 => "kl" ; "two chars")]
    #[test_case("000100 001101", 2 => "EN" ; "language code")]
    fn read_chars(s: &str, chars: usize) -> String {
        DataReader::new(&b(s)).read_chars(chars).unwrap()
    }

    #[test]
    fn read_chars_in_sequence() {
        let buf = b("000000 000001 000010 000011");
        let mut r = DataReader::new(&buf);

        assert_eq!(r.read_chars(1).unwrap(), "A");
        assert_eq!(r.read_chars(2).unwrap(), "BC");
        assert_eq!(r.read_chars(1).unwrap(), "D");
    }

    #[test]
    fn read_chars_too_long() {
        let buf = [0x04];
        let mut r = DataReader::new(&buf);
        assert_eq!(
            r.read_chars(2),
            Err(ReadError::OutOfRange {
                requested: 12,
                remaining: 8
            })
        );
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_chars(1).unwrap(), "B");
    }

    #[test]
    fn read_string_field() {
        let buf = b("000100 001101");
        assert_eq!(DataReader::new(&buf).read_string_field(12).unwrap(), "EN");
        assert_eq!(
            DataReader::new(&buf).read_string_field(10),
            Err(ReadError::WrongLength { bits: 10, unit: 6 })
        );
    }

    #[test]
    fn read_boolean_set() {
        let buf = [0x5a];
        let mut r = DataReader::new(&buf);

        assert_eq!(r.read_boolean_set(2).unwrap(), IdSet::from([2]));
        assert_eq!(r.read_boolean_set(6).unwrap(), IdSet::from([2, 3, 5]));
        assert!(!r.has_unread());
    }

    #[test]
    fn read_boolean_set_too_long() {
        let buf = [0xff];
        let mut r = DataReader::new(&buf);
        assert!(matches!(
            r.read_boolean_set(9),
            Err(ReadError::OutOfRange {
                requested: 9,
                remaining: 8
            })
        ));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn read_timestamp() {
        let buf = [0x38, 0xdf, 0x6b, 0x35, 0xb0];
        let mut r = DataReader::new(&buf);
        let ts = r.read_timestamp().unwrap();

        assert_eq!(ts.deciseconds(), 15266657115);
        assert_eq!(ts.unix_seconds(), 1526665711);
        assert_eq!(
            ts.to_system_time(),
            UNIX_EPOCH + Duration::from_millis(1526665711500)
        );
        assert_eq!(r.remaining_bits(), 4);
    }

    #[test]
    fn field_context() {
        let mut r = DataReader::new(&[]);
        let err = r.read_uint(6).field("version").unwrap_err();
        assert_eq!(err.field, "version");
        assert!(matches!(err.source, ReadError::OutOfRange { .. }));
        assert_eq!(
            err.to_string(),
            "unable to read field version: index out of range (requested 6 bits, 0 remaining)"
        );
    }
}
