//! Traits, helpers, and type definitions for working with consent string sections.
//!
//! All known section IDs are listed in the [`SectionId`] enum. Decoded sections are returned
//! wrapped in the [`Section`] enum.
//!
//! Each section format is implemented in its own submodule. The US state sections share
//! a single table-driven decoder in [`mspa`], since they only differ in which fields they
//! carry and in which order.
//!
//! Most record types are marked `#[non_exhaustive]` so that fields added by future minor
//! versions of the formats do not break callers.
//!
use crate::core::base64::DecodeExt;
use crate::core::{DataReader, FieldContext, FieldError, FromDataReader};
use crate::sections::mspa::MspaSection;
use crate::sections::tcfcav1::TcfCaV1;
use crate::sections::tcfeuv1::TcfEuV1;
use crate::sections::tcfeuv2::TcfEuV2;
use crate::sections::uspv1::UspV1;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use strum_macros::Display;
use thiserror::Error;

pub mod mspa;
pub mod tcfcav1;
pub mod tcfeuv1;
pub mod tcfeuv2;
pub mod uspv1;

/// Identifiers of the sections a GPP string may carry.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub enum SectionId {
    TcfEuV1 = 1,
    TcfEuV2 = 2,
    GppHeader = 3,
    GppSignalIntegrity = 4,
    TcfCaV1 = 5,
    UspV1 = 6,
    UsNat = 7,
    UsCa = 8,
    UsVa = 9,
    UsCo = 10,
    UsUt = 11,
    UsCt = 12,
    UsFl = 13,
    UsMt = 14,
    UsOr = 15,
    UsTx = 16,
    UsDe = 17,
    UsIa = 18,
    UsNe = 19,
    UsNh = 20,
    UsNj = 21,
    UsTn = 22,
}

/// A section type which can be decoded on its own from a GPP string.
pub trait DecodableSection: FromStr<Err = SectionDecodeError> {
    const ID: SectionId;
}

/// The error type for section decoding operations.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum SectionDecodeError {
    #[error("missing section {0}")]
    MissingSection(SectionId),
    #[error("unsupported section id {0}")]
    UnsupportedSection(u16),
    #[error("malformed base64 segment: {0}")]
    MalformedBase64(#[from] base64::DecodeError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("unexpected end of string in {0}")]
    UnexpectedEndOfString(String),
    #[error("invalid character {character:?} in {kind} string {s:?}")]
    InvalidCharacter {
        character: char,
        kind: &'static str,
        s: String,
    },
    #[error("invalid section version (expected {expected}, found {found})")]
    WrongVersion { expected: u8, found: u8 },
    #[error("unsupported section version {found}")]
    UnsupportedVersion { found: u8 },
    #[error("invalid length (expected {expected}, found {found})")]
    InvalidLength { expected: usize, found: usize },
    #[error("unrecognized segment type {segment_type}")]
    UnrecognizedSegmentType { segment_type: u8 },
    #[error("duplicate segment type {segment_type}")]
    DuplicateSegment { segment_type: u8 },
}

/// A decoded section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub enum Section {
    TcfEuV1(TcfEuV1),
    TcfEuV2(TcfEuV2),
    TcfCaV1(TcfCaV1),
    UspV1(UspV1),
    Mspa(MspaSection),
}

impl Section {
    pub fn id(&self) -> SectionId {
        match self {
            Section::TcfEuV1(_) => SectionId::TcfEuV1,
            Section::TcfEuV2(_) => SectionId::TcfEuV2,
            Section::TcfCaV1(_) => SectionId::TcfCaV1,
            Section::UspV1(_) => SectionId::UspV1,
            Section::Mspa(s) => s.section_id,
        }
    }
}

/// The decoder a section ID is routed to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecoderKind {
    TcfEuV1,
    TcfEuV2,
    TcfCaV1,
    UspV1,
    /// One of the MSPA field tables, US National or a single state.
    Mspa(SectionId),
    Unsupported(u16),
}

/// Maps a section ID to the decoder able to handle it.
///
/// IDs which are unknown, or which do not designate a payload section (the GPP header and
/// signal integrity IDs), resolve to [`DecoderKind::Unsupported`].
pub fn resolve_decoder(id: u16) -> DecoderKind {
    match SectionId::from_u16(id) {
        Some(SectionId::TcfEuV1) => DecoderKind::TcfEuV1,
        Some(SectionId::TcfEuV2) => DecoderKind::TcfEuV2,
        Some(SectionId::TcfCaV1) => DecoderKind::TcfCaV1,
        Some(SectionId::UspV1) => DecoderKind::UspV1,
        Some(
            s @ (SectionId::UsNat
            | SectionId::UsCa
            | SectionId::UsVa
            | SectionId::UsCo
            | SectionId::UsUt
            | SectionId::UsCt
            | SectionId::UsFl
            | SectionId::UsMt
            | SectionId::UsOr
            | SectionId::UsTx
            | SectionId::UsDe
            | SectionId::UsIa
            | SectionId::UsNe
            | SectionId::UsNh
            | SectionId::UsNj
            | SectionId::UsTn),
        ) => DecoderKind::Mspa(s),
        _ => DecoderKind::Unsupported(id),
    }
}

/// Decodes the raw string `s` of the section identified by `id`.
///
/// # Errors
///
/// Returns [`SectionDecodeError::UnsupportedSection`] if no decoder handles `id`, or the
/// decoder's error if `s` is not a valid section string.
pub fn decode_section(id: u16, s: &str) -> Result<Section, SectionDecodeError> {
    Ok(match resolve_decoder(id) {
        DecoderKind::TcfEuV1 => Section::TcfEuV1(s.parse()?),
        DecoderKind::TcfEuV2 => Section::TcfEuV2(s.parse()?),
        DecoderKind::TcfCaV1 => Section::TcfCaV1(s.parse()?),
        DecoderKind::UspV1 => Section::UspV1(s.parse()?),
        DecoderKind::Mspa(section_id) => Section::Mspa(MspaSection::decode(section_id, s)?),
        DecoderKind::Unsupported(id) => Err(SectionDecodeError::UnsupportedSection(id))?,
    })
}

pub(crate) trait Base64EncodedStr<T> {
    fn parse_base64_str(&self) -> Result<T, SectionDecodeError>;
}

impl<T> Base64EncodedStr<T> for str
where
    T: FromDataReader<Err = SectionDecodeError>,
{
    fn parse_base64_str(&self) -> Result<T, SectionDecodeError> {
        let r = self.decode_base64_url()?;
        DataReader::new(&r).parse()
    }
}

/// A trait representing an operation to parse segments for a Base64-URL encoded string
/// using '.' as separators into a type composed of a mandatory core segment and an arbitrary
/// number of optional segments.
///
/// This guarantees a given segment cannot appear twice.
pub(crate) trait SegmentedStr<T> {
    fn parse_segmented_str(&self) -> Result<T, SectionDecodeError>;
}

impl<T> SegmentedStr<T> for str
where
    T: OptionalSegmentParser,
{
    fn parse_segmented_str(&self) -> Result<T, SectionDecodeError> {
        let mut segments_iter = self.split('.');

        // first mandatory segment is the core segment
        let core = segments_iter
            .next()
            .ok_or_else(|| SectionDecodeError::UnexpectedEndOfString(self.to_string()))?
            .decode_base64_url()?;
        let mut output = DataReader::new(&core).parse()?;
        let mut seen = BTreeSet::new();

        for s in segments_iter {
            let b = s.decode_base64_url()?;
            let mut r = DataReader::new(&b);

            let segment_type = T::read_segment_type(&mut r)?;
            if !seen.insert(segment_type) {
                return Err(SectionDecodeError::DuplicateSegment { segment_type });
            }
            T::parse_optional_segment(segment_type, &mut r, &mut output)?;
        }

        Ok(output)
    }
}

/// A trait representing an operation to parse optional segments for a Base64-URL encoded string
pub(crate) trait OptionalSegmentParser:
    Sized + FromDataReader<Err = SectionDecodeError>
{
    fn read_segment_type(r: &mut DataReader) -> Result<u8, SectionDecodeError> {
        Ok(r.read_fixed_integer(3).field("segment_type")?)
    }

    fn parse_optional_segment(
        segment_type: u8,
        r: &mut DataReader,
        into: &mut Self,
    ) -> Result<(), SectionDecodeError>;
}
