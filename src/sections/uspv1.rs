use crate::sections::{DecodableSection, SectionDecodeError, SectionId};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::str::{Chars, FromStr};

const USP_V1_VERSION: u8 = 1;
const USP_V1_LENGTH: usize = 4;
const KIND: &str = "uspv1";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Flag {
    Yes,
    No,
    NotApplicable,
}

impl Flag {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'Y' => Some(Self::Yes),
            'N' => Some(Self::No),
            '-' => Some(Self::NotApplicable),
            _ => None,
        }
    }
}

// See https://github.com/InteractiveAdvertisingBureau/USPrivacy/blob/master/CCPA/US%20Privacy%20String.md#us-privacy-string-format
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct UspV1 {
    pub version: u8,
    pub opt_out_notice: Flag,
    pub opt_out_sale: Flag,
    pub lspa_covered_transaction: Flag,
}

impl DecodableSection for UspV1 {
    const ID: SectionId = SectionId::UspV1;
}

impl FromStr for UspV1 {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();

        let version = chars
            .next()
            .ok_or_else(|| SectionDecodeError::UnexpectedEndOfString(s.to_string()))?;
        let version = version
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| SectionDecodeError::InvalidCharacter {
                character: version,
                kind: KIND,
                s: s.to_string(),
            })?;
        if version != USP_V1_VERSION {
            return Err(SectionDecodeError::WrongVersion {
                expected: USP_V1_VERSION,
                found: version,
            });
        }

        let opt_out_notice = parse_next_flag(&mut chars, s)?;
        let opt_out_sale = parse_next_flag(&mut chars, s)?;
        let lspa_covered_transaction = parse_next_flag(&mut chars, s)?;

        if chars.next().is_some() {
            return Err(SectionDecodeError::InvalidLength {
                expected: USP_V1_LENGTH,
                found: s.chars().count(),
            });
        }

        Ok(Self {
            version,
            opt_out_notice,
            opt_out_sale,
            lspa_covered_transaction,
        })
    }
}

fn parse_next_flag(chars: &mut Chars, original_str: &str) -> Result<Flag, SectionDecodeError> {
    let c = chars
        .next()
        .ok_or_else(|| SectionDecodeError::UnexpectedEndOfString(original_str.to_string()))?;

    Flag::from_char(c).ok_or_else(|| SectionDecodeError::InvalidCharacter {
        character: c,
        kind: KIND,
        s: original_str.to_string(),
    })
}
