use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{DecodeError, Engine};

/// URL-safe base64 without padding.
///
/// Consent strings are not required to end on a byte boundary, so the bits of a final
/// partial byte are dropped instead of being rejected.
const CONSENT_STRING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Base64 quantum length, in characters.
const QUANTUM: usize = 4;

pub(crate) trait DecodeExt {
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError>;
}

impl DecodeExt for str {
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError> {
        CONSENT_STRING.decode(self)
    }
}

/// Decodes a GPP header, first filling it up to a whole number of quanta with `'A'`
/// (the encoding of six zero bits).
pub(crate) fn decode_zero_padded(s: &str) -> Result<Vec<u8>, DecodeError> {
    let missing = (QUANTUM - s.len() % QUANTUM) % QUANTUM;
    if missing == 0 {
        return s.decode_base64_url();
    }

    let mut padded = String::with_capacity(s.len() + missing);
    padded.push_str(s);
    padded.extend(std::iter::repeat_n('A', missing));
    padded.decode_base64_url()
}
