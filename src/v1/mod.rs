//! Version 1 of the IAB Global Privacy Platform string.
//!
//! A GPP string contains a header which lists the sections which are present
//! in the next optional parts.
//!
//! A typical GPP string will look like this:
//!
//! ```text
//! DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN
//! ```
//!
//! It contains a header (`DBACNY`) and two sections separated by a `~` character.
//!
//! GPP string sections are usually encoded in a variation of URL-safe Base64.
//!
//! It is not mandatory though, and certain sections, such as the deprecated USP v1 are using
//! a simpler character set.
//! In the example above, the first section is a base64 encoded TCF EU v2 section.
//! The second section is a USP v1 section where `Y` and `N` characters simply mean yes and no
//! respectively.
//!
//! # Examples
//!
//! You can use the [`GPPString::parse_str`] method to try to parse a consent string:
//!
//! ```
//! use iab_consent::v1::GPPString;
//! use iab_consent::v1::GPPDecodeError;
//!
//! fn main() -> Result<(), GPPDecodeError> {
//!     let s = GPPString::parse_str("DBABTA~1YNN")?;
//!     Ok(())
//! }
//! ```
//!
//! Since [`GPPString`] implements the [`FromStr`] trait, you can also use [`str::parse`]:
//!
//! ```
//! use iab_consent::v1::GPPString;
//! use iab_consent::v1::GPPDecodeError;
//!
//! fn main() -> Result<(), GPPDecodeError> {
//!     let s: GPPString = "DBABTA~1YNN".parse()?;
//!     Ok(())
//! }
//! ```
//!
//! If parsing fails, a [`GPPDecodeError`] is returned instead. Sections themselves are only
//! decoded on demand, and a section which fails to decode never prevents the other ones from
//! being decoded.
//!
pub mod subsection;

use crate::core::base64::decode_zero_padded;
use crate::core::{DataReader, FieldContext, FieldError};
use crate::sections::{decode_section, DecodableSection, Section, SectionDecodeError, SectionId};
use fnv::FnvHashMap;
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::iter::FusedIterator;
use std::slice::Iter;
use std::str::FromStr;
use thiserror::Error;

const GPP_HEADER: u8 = 3;
const GPP_VERSION: u8 = 1;

/// Decoded sections keyed by section ID.
///
/// Every section listed in the header and present in the string has an entry, holding either
/// the decoded section or the reason it could not be decoded. Sections with an unsupported ID
/// hold a [`SectionDecodeError::UnsupportedSection`] error.
pub type SectionMap = FnvHashMap<u16, Result<Section, SectionDecodeError>>;

/// The error type for GPP String decoding operations.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum GPPDecodeError {
    /// The string does not contain any section after its header.
    #[error("not enough gpp segments")]
    NotEnoughSegments,
    #[error("malformed base64 header: {0}")]
    MalformedBase64(#[from] base64::DecodeError),
    /// The header is truncated.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The header has an invalid type for this version of GPP.
    #[error("invalid header type (expected {GPP_HEADER}, found {found})")]
    InvalidHeaderType { found: u8 },
    /// The header has an invalid GPP version.
    ///
    /// Note that there is currently only V1 of the standard.
    #[error("unsupported GPP version (expected {GPP_VERSION}, found {found})")]
    UnsupportedVersion { found: u8 },
    /// The number of sections listed in the header does not match the number of actual sections
    /// present in the string.
    ///
    /// Only returned with [`SectionCountPolicy::Strict`].
    #[error("ids do not match sections (number of ids {ids}, number of sections {sections})")]
    MismatchedSections { ids: usize, sections: usize },
}

/// What to do when the header does not list as many sections as the string carries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SectionCountPolicy {
    /// Sections are paired with IDs in order, extra sections or IDs are ignored.
    #[default]
    Tolerant,
    /// The string is rejected with [`GPPDecodeError::MismatchedSections`].
    Strict,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct DecodeOptions {
    pub section_count: SectionCountPolicy,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            section_count: SectionCountPolicy::Strict,
        }
    }
}

/// A decoded GPP header.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GppHeader {
    pub header_type: u8,
    pub version: u8,
    /// IDs of the sections which follow the header, in order.
    pub sections: Vec<u16>,
}

/// A raw section string along with the ID the header gives it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SectionSpan<'a> {
    pub section_id: u16,
    pub raw_value: &'a str,
}

/// Decodes a GPP header, without the `~` separator nor any section.
///
/// # Errors
///
/// Returns a [`GPPDecodeError`] if the header is not valid base64, has the wrong type or
/// version, or if its list of sections is truncated.
///
/// # Example
///
/// ```
/// use iab_consent::v1::parse_header;
///
/// let header = parse_header("DBACNY").unwrap();
/// assert_eq!(header.sections, vec![2, 6]);
/// ```
pub fn parse_header(s: &str) -> Result<GppHeader, GPPDecodeError> {
    let b = decode_zero_padded(s)?;
    let mut r = DataReader::new(&b);

    let header_type = r.read_fixed_integer(6).field("header_type")?;
    if header_type != GPP_HEADER {
        return Err(GPPDecodeError::InvalidHeaderType { found: header_type });
    }

    let version = r.read_fixed_integer(6).field("gpp_version")?;
    if version != GPP_VERSION {
        return Err(GPPDecodeError::UnsupportedVersion { found: version });
    }

    let sections = r.read_fibonacci_range().field("section_ids")?;
    trace!("parsed gpp header {s}, section ids {sections:?}");

    Ok(GppHeader {
        header_type,
        version,
        sections,
    })
}

/// Splits a GPP string into its sections and pairs them with the IDs listed in `header`.
///
/// # Errors
///
/// Returns [`GPPDecodeError::NotEnoughSegments`] if `s` has no section, and
/// [`GPPDecodeError::MismatchedSections`] if the strict section count policy is requested and
/// the header does not list exactly one ID per section.
pub fn split_sections<'a>(
    s: &'a str,
    header: &GppHeader,
    options: &DecodeOptions,
) -> Result<Vec<SectionSpan<'a>>, GPPDecodeError> {
    // the first segment is the header itself
    let segments = s.split('~').skip(1).collect::<Vec<_>>();
    if segments.is_empty() {
        return Err(GPPDecodeError::NotEnoughSegments);
    }

    if segments.len() != header.sections.len() {
        match options.section_count {
            SectionCountPolicy::Strict => {
                return Err(GPPDecodeError::MismatchedSections {
                    ids: header.sections.len(),
                    sections: segments.len(),
                });
            }
            SectionCountPolicy::Tolerant => debug!(
                "header lists {} section ids for {} sections",
                header.sections.len(),
                segments.len()
            ),
        }
    }

    Ok(header
        .sections
        .iter()
        .zip(segments)
        .map(|(&section_id, raw_value)| SectionSpan {
            section_id,
            raw_value,
        })
        .collect())
}

/// The representation of a parsed GPP consent string.
///
/// This structure gives access to the header, the list of section IDs which it contains, as
/// well as the raw section strings.
///
/// It also offers methods to decode either a specific section, or all sections at once.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GPPString {
    header: GppHeader,
    section_ids: Vec<u16>,
    sections: Vec<String>,
}

impl GPPString {
    /// Parses a string and returns a [`GPPString`] if successful.
    ///
    /// # Errors
    ///
    /// Returns a [`GPPDecodeError`] if unable to parse the string.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_consent::v1::GPPString;
    ///
    /// let r = GPPString::parse_str("DBABTA~1YNN");
    ///
    /// assert!(matches!(r, Ok(gpp_str)));
    /// ```
    ///
    pub fn parse_str(s: &str) -> Result<Self, GPPDecodeError> {
        s.parse()
    }

    /// Parses a string with non default options.
    ///
    /// # Errors
    ///
    /// Returns a [`GPPDecodeError`] if unable to parse the string.
    pub fn with_options(s: &str, options: &DecodeOptions) -> Result<Self, GPPDecodeError> {
        let header_str = s.split('~').next().unwrap_or_default();
        let header = parse_header(header_str)?;

        let (section_ids, sections) = split_sections(s, &header, options)?
            .into_iter()
            .map(|span| (span.section_id, span.raw_value.to_string()))
            .unzip();

        Ok(Self {
            header,
            section_ids,
            sections,
        })
    }

    pub fn header(&self) -> &GppHeader {
        &self.header
    }

    /// Returns a reference to a raw section contained in this GPP string.
    ///
    /// If the given section is not present within the GPP string, the method returns [`None`].
    ///
    /// # Example
    ///
    /// ```
    /// use iab_consent::sections::SectionId;
    /// use iab_consent::v1::GPPString;
    /// use iab_consent::v1::GPPDecodeError;
    ///
    /// fn main() -> Result<(), GPPDecodeError> {
    ///     let gpp_str = GPPString::parse_str("DBABTA~1YNN")?;
    ///     let s = gpp_str.section(SectionId::UspV1);
    ///
    ///     assert_eq!(s, Some("1YNN"));
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn section(&self, id: SectionId) -> Option<&str> {
        self.raw_section(id as u16)
    }

    /// Same as [`section`](GPPString::section), for any section ID including unknown ones.
    ///
    /// If the header lists the same ID twice, the first section wins.
    pub fn raw_section(&self, id: u16) -> Option<&str> {
        let idx = self.section_ids.iter().position(|&s| s == id)?;
        self.sections.get(idx).map(String::as_str)
    }

    /// Returns an iterator that yields the list of section IDs present in this GPP string.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_consent::v1::GPPString;
    /// use iab_consent::v1::GPPDecodeError;
    ///
    /// fn main() -> Result<(), GPPDecodeError> {
    ///     let gpp_str = GPPString::parse_str("DBABTA~1YNN")?;
    ///     let mut it = gpp_str.section_ids();
    ///
    ///     assert_eq!(it.next(), Some(&6));
    ///     assert_eq!(it.next(), None);
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn section_ids(&self) -> SectionIds<'_> {
        SectionIds(self.section_ids.iter())
    }

    /// Returns an iterator that yields the list of raw section strings present in this GPP string.
    pub fn sections(&self) -> Sections<'_> {
        Sections(self.sections.iter())
    }

    /// Decodes and returns a single section of this GPP string.
    ///
    /// The returned section is wrapped in a [`Section`] enum, meaning that it must be
    /// explicitly matched. If you know by advance which section type you want to decode, use
    /// the generic [`decode`](GPPString::decode) method instead.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_consent::sections::SectionId;
    /// use iab_consent::sections::Section;
    /// use iab_consent::v1::GPPString;
    /// use iab_consent::v1::GPPDecodeError;
    ///
    /// fn main() -> Result<(), GPPDecodeError> {
    ///     let gpp_str = GPPString::parse_str("DBABTA~1YNN")?;
    ///     let r = gpp_str.decode_section(SectionId::UspV1);
    ///
    ///     assert!(matches!(r, Ok(Section::UspV1(_))));
    ///
    ///     Ok(())
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`SectionDecodeError`] if decoding the section fails or if the section is not
    /// present in the string.
    ///
    pub fn decode_section(&self, id: SectionId) -> Result<Section, SectionDecodeError> {
        let s = self
            .section(id)
            .ok_or(SectionDecodeError::MissingSection(id))?;
        decode_section(id as u16, s)
    }

    /// Decodes and returns a single section of this GPP string, taking the section type as
    /// a type parameter.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_consent::sections::uspv1::UspV1;
    /// use iab_consent::v1::GPPString;
    /// use iab_consent::v1::GPPDecodeError;
    ///
    /// fn main() -> Result<(), GPPDecodeError> {
    ///     let gpp_str = GPPString::parse_str("DBABTA~1YNN")?;
    ///     let r = gpp_str.decode::<UspV1>();
    ///
    ///     assert!(matches!(r, Ok(UspV1 { .. })));
    ///
    ///     Ok(())
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`SectionDecodeError`] if decoding the section fails or if the section is not
    /// present in the string.
    ///
    pub fn decode<T>(&self) -> Result<T, SectionDecodeError>
    where
        T: DecodableSection,
    {
        self.section(T::ID)
            .ok_or(SectionDecodeError::MissingSection(T::ID))?
            .parse()
    }

    /// Decodes all sections present in this GPP string.
    ///
    /// Each section is decoded on its own: the returned map holds, for every section ID, either
    /// the decoded section or the error which prevented decoding it.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_consent::v1::GPPDecodeError;
    /// use iab_consent::v1::GPPString;
    ///
    /// fn main() -> Result<(), GPPDecodeError> {
    ///     let s = "DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN";
    ///     let gpp_string = GPPString::parse_str(s)?;
    ///
    ///     for (id, r) in gpp_string.decode_all_sections() {
    ///         assert!(matches!(r, Ok(_)));
    ///         println!("Section {id}: {:?}", &r);
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn decode_all_sections(&self) -> SectionMap {
        let mut decoded = SectionMap::default();

        for (&id, s) in self.section_ids.iter().zip(&self.sections) {
            decoded.entry(id).or_insert_with(|| {
                decode_section(id, s).inspect_err(|e| debug!("unable to decode section {id}: {e}"))
            });
        }

        decoded
    }
}

impl FromStr for GPPString {
    type Err = GPPDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::with_options(s, &DecodeOptions::default())
    }
}

/// Created with the method [`sections`](GPPString::sections).
pub struct Sections<'a>(Iter<'a, String>);

impl<'a> Iterator for Sections<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(String::as_str)
    }
}

impl ExactSizeIterator for Sections<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl FusedIterator for Sections<'_> {}

/// Created with the method [`section_ids`](GPPString::section_ids).
pub struct SectionIds<'a>(Iter<'a, u16>);

impl<'a> Iterator for SectionIds<'a> {
    type Item = &'a u16;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl ExactSizeIterator for SectionIds<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl FusedIterator for SectionIds<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReadError;
    use crate::sections::uspv1::{Flag, UspV1};
    use test_case::test_case;

    const TCF_EU_V2: &str = "CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA";

    #[test_case("DBABM" => vec![2] ; "tcf eu v2")]
    #[test_case("DBACNY" => vec![2, 6] ; "tcf eu v2 and usp")]
    #[test_case("DBABjw" => vec![5, 6] ; "group")]
    #[test_case("DBABL" => vec![7] ; "us nat")]
    #[test_case("DBABzw" => vec![6, 7] ; "usp and us nat")]
    #[test_case("DBABBg" => vec![8] ; "us ca")]
    #[test_case("DBABzYA" => vec![6, 7, 8] ; "group of three")]
    #[test_case("DBACOaw" => vec![2, 5, 6, 7, 8, 9, 10, 11, 12] ; "single then group")]
    #[test_case("DBACMYA" => vec![2, 5] ; "two singles")]
    #[test_case("DBABMA" => vec![2] ; "padded")]
    #[test_case("DBABTA" => vec![6] ; "usp")]
    #[test_case("DBACMBg" => vec![2, 23] ; "unknown id")]
    fn header(s: &str) -> Vec<u16> {
        let header = parse_header(s).unwrap();
        assert_eq!(header.header_type, GPP_HEADER);
        assert_eq!(header.version, GPP_VERSION);
        header.sections
    }

    #[test_case("BBACNY" => GPPDecodeError::InvalidHeaderType { found: 1 } ; "wrong type")]
    #[test_case("badheader" => GPPDecodeError::InvalidHeaderType { found: 27 } ; "garbage")]
    #[test_case("DCACNY" => GPPDecodeError::UnsupportedVersion { found: 2 } ; "wrong version")]
    #[test_case("DBAC" => GPPDecodeError::Field(FieldError {
        field: "section_ids",
        source: ReadError::OutOfRange { requested: 1, remaining: 0 },
    }) ; "truncated section ids")]
    #[test_case("" => matches GPPDecodeError::Field(FieldError { field: "header_type", .. }) ; "empty")]
    #[test_case("D$AB" => matches GPPDecodeError::MalformedBase64(_) ; "bad base64")]
    fn header_error(s: &str) -> GPPDecodeError {
        parse_header(s).unwrap_err()
    }

    #[test]
    fn split() {
        let s = format!("DBACNY~{TCF_EU_V2}~1YNN");
        let header = parse_header("DBACNY").unwrap();

        assert_eq!(
            split_sections(&s, &header, &DecodeOptions::default()).unwrap(),
            vec![
                SectionSpan {
                    section_id: 2,
                    raw_value: TCF_EU_V2,
                },
                SectionSpan {
                    section_id: 6,
                    raw_value: "1YNN",
                },
            ]
        );
    }

    #[test_case("DBACNY~1YNN" => 1 ; "missing section")]
    #[test_case("DBABTA~1YNN~1YNN" => 1 ; "extra section")]
    fn split_tolerant(s: &str) -> usize {
        let header = parse_header(s.split('~').next().unwrap()).unwrap();
        split_sections(s, &header, &DecodeOptions::default())
            .unwrap()
            .len()
    }

    #[test_case("DBACNY~1YNN" => GPPDecodeError::MismatchedSections { ids: 2, sections: 1 } ; "missing section")]
    #[test_case("DBABTA~1YNN~1YNN" => GPPDecodeError::MismatchedSections { ids: 1, sections: 2 } ; "extra section")]
    #[test_case("DBABTA" => GPPDecodeError::NotEnoughSegments ; "no section")]
    fn split_strict(s: &str) -> GPPDecodeError {
        let header = parse_header(s.split('~').next().unwrap()).unwrap();
        split_sections(s, &header, &DecodeOptions::strict()).unwrap_err()
    }

    #[test_case("DBABjw~BPXuQIAPXuQIAAfKABENB-CgAAAAAAAAAAAAAAAA.YAAAAAAAAAA~1YNN", SectionId::TcfCaV1 => Some("BPXuQIAPXuQIAAfKABENB-CgAAAAAAAAAAAAAAAA.YAAAAAAAAAA".to_string()) ; "tcf ca")]
    #[test_case("DBABjw~BPXuQIAPXuQIAAfKABENB-CgAAAAAAAAAAAAAAAA.YAAAAAAAAAA~1YNN", SectionId::UspV1 => Some("1YNN".to_string()) ; "usp v1")]
    #[test_case("DBABjw~BPXuQIAPXuQIAAfKABENB-CgAAAAAAAAAAAAAAAA.YAAAAAAAAAA~1YNN", SectionId::TcfEuV2 => None ; "tcf eu v2")]
    fn gpp_string_section(s: &str, section_id: SectionId) -> Option<String> {
        GPPString::from_str(s)
            .unwrap()
            .section(section_id)
            .map(|s| s.to_string())
    }

    #[test_case("DBABM~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA" => vec![2] ; "single section")]
    #[test_case("DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN" => vec![2, 6] ; "tcf eu and us sections")]
    #[test_case("DBABjw~BPXuQIAPXuQIAAfKABENB-CgAAAAAAAAAAAAAAAA.YAAAAAAAAAA~1YNN" => vec![5, 6] ; "tcf ca and us sections")]
    fn gpp_string_section_ids(s: &str) -> Vec<u16> {
        GPPString::from_str(s)
            .unwrap()
            .section_ids()
            .copied()
            .collect()
    }

    #[test_case("DBABM~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA" => vec!["CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA"] ; "single section")]
    #[test_case("DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN" => vec!["CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA", "1YNN"] ; "tcf eu and us sections")]
    fn gpp_string_sections(s: &str) -> Vec<String> {
        let gpp = GPPString::from_str(s).unwrap();
        assert_eq!(gpp.sections().len(), gpp.section_ids().len());
        gpp.sections().map(|s| s.to_string()).collect()
    }

    #[test_case("DBABTA~1YN-" => UspV1 {
        version: 1,
        opt_out_notice: Flag::Yes,
        opt_out_sale: Flag::No,
        lspa_covered_transaction: Flag::NotApplicable,
    } ; "mix")]
    #[test_case("DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN" => UspV1 {
        version: 1,
        opt_out_notice: Flag::Yes,
        opt_out_sale: Flag::No,
        lspa_covered_transaction: Flag::No,
    } ; "with other section")]
    fn gpp_string_decode_uspv1(s: &str) -> UspV1 {
        GPPString::from_str(s).unwrap().decode().unwrap()
    }

    #[test]
    fn decode_missing_section() {
        let gpp = GPPString::from_str("DBABTA~1YNN").unwrap();
        assert_eq!(
            gpp.decode_section(SectionId::TcfEuV2),
            Err(SectionDecodeError::MissingSection(SectionId::TcfEuV2))
        );
    }

    #[test]
    fn decode_all_isolates_failures() {
        let gpp = GPPString::from_str(&format!("DBACMBg~{TCF_EU_V2}~whatever")).unwrap();
        let sections = gpp.decode_all_sections();

        assert_eq!(sections.len(), 2);
        assert!(matches!(sections[&2], Ok(Section::TcfEuV2(_))));
        assert_eq!(
            sections[&23],
            Err(SectionDecodeError::UnsupportedSection(23))
        );
    }

    #[test]
    fn decode_all_keeps_going_after_failure() {
        let sections = GPPString::from_str("DBACNY~CPX~1YNN")
            .unwrap()
            .decode_all_sections();

        assert!(matches!(sections[&2], Err(SectionDecodeError::Field(_))));
        assert!(matches!(sections[&6], Ok(Section::UspV1(_))));
    }

    #[test]
    fn truncated_string() {
        let s = "DBACNY~CPytTYAPytTYABEACBENDXCoAP_AAH_AAAIwgoNf_X__b3_v-_7___t0eY1f9_7__-0zjhfdt-8N3f_X_L8X_2M7";

        assert_eq!(
            GPPString::with_options(s, &DecodeOptions::strict()),
            Err(GPPDecodeError::MismatchedSections {
                ids: 2,
                sections: 1
            })
        );

        let gpp = GPPString::from_str(s).unwrap();
        assert_eq!(gpp.section_ids().len(), 1);
        assert_eq!(gpp.raw_section(6), None);
    }

    #[test]
    fn non_gpp_tcfeuv2_string() {
        let r = GPPString::from_str("CP48G0AP48G0AEsACCPLAkEgAAAAAEPgAB5YAAAQaQD2F2K2kKFkPCmQWYAQBCijYEAhQAAAAkCBIAAgAUgQAgFIIAgAIFAAAAAAAAAQEgCQAAQABAAAIACgAAAAAAIAAAAAAAQQAAAAAIAAAAAAAAEAAAAAAAQAAAAIAABEhCAAQQAEAAAAAAAQAAAAAAAAAAABAAAAAAAAAAAAAAAAAAAAgAA");
        assert_eq!(r, Err(GPPDecodeError::InvalidHeaderType { found: 2 }));
    }

    #[test]
    fn header_only() {
        assert_eq!(
            GPPString::from_str("DBABL"),
            Err(GPPDecodeError::NotEnoughSegments)
        );
    }

    #[test]
    fn invalid_tcfca_section() {
        let r = GPPString::from_str("DBABjw~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN")
            .unwrap()
            .decode_all_sections();
        assert_eq!(
            r[&5],
            Err(SectionDecodeError::WrongVersion {
                expected: 1,
                found: 2
            })
        );
    }

    macro_rules! assert_implements {
        ($type:ty, [$($trait:path),+]) => {
            {
                $(const _: fn() = || {
                    fn _assert_impl<T: $trait>() {}
                    _assert_impl::<$type>();
                };)+
            }
        };
    }

    #[test]
    fn gpp_string_implements_traits() {
        assert_implements!(GPPString, [Send, Sync]);
    }

    #[test]
    fn section_implements_traits() {
        assert_implements!(Section, [Send, Sync]);
        assert_implements!(SectionMap, [Send, Sync]);
    }
}
