//! This crate decodes IAB privacy consent strings: the Global Privacy Platform (GPP)
//! [Consent String Specification](https://github.com/InteractiveAdvertisingBureau/Global-Privacy-Platform)
//! envelope and the sections it carries, as well as the standalone TCF v1.1 and TCF v2
//! consent strings which predate it.
//!
//! Supported sections are TCF EU v1 and v2, TCF Canada v1, the deprecated US Privacy (CCPA)
//! string, and the MSPA sections for US National and every US state defined by version 1.0 of
//! the GPP standard.
//!
//! NOTE: This is not an official IAB library. Encoding is not supported.
//!
//! # Decoding GPP strings
//!
//! A GPP Consent String is made of a mandatory header and a list of optional sections.
//!
//! [`decode_envelope`] decodes every section at once. Each section is decoded independently,
//! a broken section shows up as an error in the returned map without affecting the others:
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_consent::sections::Section;
//!
//! let s = "DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN";
//! let sections = iab_consent::decode_envelope(s)?;
//!
//! assert!(matches!(sections[&2], Ok(Section::TcfEuV2(_))));
//! assert!(matches!(sections[&6], Ok(Section::UspV1(_))));
//! # Ok(())
//! # }
//! ```
//!
//! The [`GPPString`](v1::GPPString) type gives finer control, such as access to raw sections
//! or decoding a single section:
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use std::str::FromStr;
//! use iab_consent::sections::SectionId;
//! use iab_consent::v1::GPPString;
//!
//! let s = "DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN";
//! let gpp_string = GPPString::from_str(s)?;
//!
//! for &id in gpp_string.section_ids() {
//!     let section_str = gpp_string.raw_section(id).ok_or("missing section")?;
//!     println!("{id}: {section_str}");
//! }
//!
//! let section = gpp_string.decode_section(SectionId::UspV1)?;
//! println!("Section: {:?}", &section);
//! # Ok(())
//! # }
//! ```
//!
//! # Accessing section data
//!
//! The following example checks that a vendor (id 755) has the right to create a
//! personalized ads profile (purpose ID 3) for the user who submitted the provided consent string.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use std::str::FromStr;
//! use iab_consent::sections::tcfeuv2::TcfEuV2;
//! use iab_consent::v1::GPPString;
//!
//! let s = "DBABMA~CPXuQIAPXuQIAAfKABENB-CgACAAAAAAAAYgF5wAQF5gAAAA.YAAAAAAAAAAA";
//! let gpp = GPPString::from_str(s)?;
//!
//! let has_user_consent = gpp
//!     .decode::<TcfEuV2>()
//!     .map(|tcf| tcf.suitable_to_process(&[3], 755))
//!     .unwrap_or(false);
//!
//! assert!(has_user_consent);
//! # Ok(())
//! # }
//! ```
//!
//! # Legacy TCF strings
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let tcf = iab_consent::decode_tcf_v1("BONMj34ONMj34ABACDENALqAAAAAplY")?;
//! assert!(tcf.purpose_allowed(1));
//! assert!(tcf.vendor_allowed(9));
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! This crate is conservative with regard to how it handles parsing failure. If a section cannot
//! be fully decoded, then it is considered as an error.
//!
//! This is done to avoid obtaining erroneous user consent information from potentially corrupted
//! payloads.
//!
//! # Features
//!
//! - `serde`: derives `serde::Serialize` on every decoded record.
//!
pub mod core;
pub mod sections;
pub mod v1;

use crate::sections::tcfeuv1::TcfEuV1;
use crate::sections::tcfeuv2::TcfEuV2;
use crate::sections::SectionDecodeError;
use crate::v1::{DecodeOptions, GPPDecodeError, GPPString, GppHeader, SectionMap};

/// Decodes the header of a GPP string.
///
/// `s` may be either a bare header or a full GPP string, in which case everything after the
/// first `~` is ignored.
///
/// # Errors
///
/// Returns a [`GPPDecodeError`] if the header is invalid.
pub fn decode_header(s: &str) -> Result<GppHeader, GPPDecodeError> {
    let header = s.split('~').next().unwrap_or_default();
    v1::parse_header(header)
}

/// Decodes all sections of a GPP string with the default options.
///
/// # Errors
///
/// Returns a [`GPPDecodeError`] if the envelope itself is invalid. Errors of individual
/// sections are reported in the returned map.
pub fn decode_envelope(s: &str) -> Result<SectionMap, GPPDecodeError> {
    decode_envelope_with(s, &DecodeOptions::default())
}

/// Same as [`decode_envelope`], with non default options.
///
/// # Errors
///
/// Returns a [`GPPDecodeError`] if the envelope itself is invalid.
pub fn decode_envelope_with(
    s: &str,
    options: &DecodeOptions,
) -> Result<SectionMap, GPPDecodeError> {
    Ok(GPPString::with_options(s, options)?.decode_all_sections())
}

/// Decodes a standalone TCF v1.1 consent string.
///
/// # Errors
///
/// Returns a [`SectionDecodeError`] if `s` is not a valid TCF v1.1 string.
pub fn decode_tcf_v1(s: &str) -> Result<TcfEuV1, SectionDecodeError> {
    s.parse()
}

/// Decodes a standalone TCF v2 consent string, optional segments included.
///
/// # Errors
///
/// Returns a [`SectionDecodeError`] if `s` is not a valid TCF v2 string.
pub fn decode_tcf_v2(s: &str) -> Result<TcfEuV2, SectionDecodeError> {
    s.parse()
}
