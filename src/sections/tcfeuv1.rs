//! TCF EU v1.1 consent strings.
//!
//! Unlike later versions, a v1.1 string is a single segment. Its vendor list is either a bit
//! field or a default consent value followed by ranges of vendors which are exceptions to it.
use crate::core::range::VendorSet;
use crate::core::{DataReader, FieldContext, FromDataReader, IdSet, Timestamp};
use crate::sections::{Base64EncodedStr, DecodableSection, SectionDecodeError, SectionId};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::str::FromStr;

const TCF_EU_V1_VERSION: u8 = 1;

// See https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework/blob/master/Consent%20string%20and%20vendor%20list%20formats%20v1.1%20Final.md
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct TcfEuV1 {
    pub created: Timestamp,
    pub last_updated: Timestamp,
    pub cmp_id: u16,
    pub cmp_version: u16,
    pub consent_screen: u8,
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub purposes_allowed: IdSet,
    /// Consent given to vendors not listed in [`Self::vendor_consents`].
    ///
    /// Only meaningful for range encoded vendor lists, always `false` for bit fields.
    pub default_consent: bool,
    pub vendor_consents: VendorSet,
}

impl TcfEuV1 {
    /// Whether the user consented to vendor `id`.
    ///
    /// For range encoded lists, vendors listed in a range get the opposite of the default
    /// consent. Vendors above the maximum vendor ID never have consent.
    pub fn vendor_allowed(&self, id: u16) -> bool {
        match &self.vendor_consents {
            VendorSet::BitField { ids, .. } => ids.contains(&id),
            VendorSet::Ranges {
                max_vendor_id,
                entries,
            } => {
                (1..=*max_vendor_id).contains(&id)
                    && self.default_consent ^ entries.iter().any(|e| e.contains(id))
            }
        }
    }

    /// Every vendor which the user consented to.
    pub fn allowed_vendors(&self) -> IdSet {
        (1..=self.vendor_consents.max_vendor_id())
            .filter(|&id| self.vendor_allowed(id))
            .collect()
    }

    pub fn purpose_allowed(&self, id: u16) -> bool {
        self.purposes_allowed.contains(&id)
    }

    pub fn every_purpose_allowed(&self, ids: &[u16]) -> bool {
        ids.iter().all(|&id| self.purpose_allowed(id))
    }
}

impl DecodableSection for TcfEuV1 {
    const ID: SectionId = SectionId::TcfEuV1;
}

impl FromStr for TcfEuV1 {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse_base64_str()
    }
}

impl FromDataReader for TcfEuV1 {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let version = r.read_fixed_integer(6).field("version")?;
        if version != TCF_EU_V1_VERSION {
            return Err(SectionDecodeError::WrongVersion {
                expected: TCF_EU_V1_VERSION,
                found: version,
            });
        }

        let created = r.read_timestamp().field("created")?;
        let last_updated = r.read_timestamp().field("last_updated")?;
        let cmp_id = r.read_fixed_integer(12).field("cmp_id")?;
        let cmp_version = r.read_fixed_integer(12).field("cmp_version")?;
        let consent_screen = r.read_fixed_integer(6).field("consent_screen")?;
        let consent_language = r.read_string_field(12).field("consent_language")?;
        let vendor_list_version = r.read_fixed_integer(12).field("vendor_list_version")?;
        let purposes_allowed = r.read_boolean_set(24).field("purposes_allowed")?;
        let (default_consent, vendor_consents) = read_vendor_consents(r)?;

        Ok(Self {
            created,
            last_updated,
            cmp_id,
            cmp_version,
            consent_screen,
            consent_language,
            vendor_list_version,
            purposes_allowed,
            default_consent,
            vendor_consents,
        })
    }
}

fn read_vendor_consents(r: &mut DataReader) -> Result<(bool, VendorSet), SectionDecodeError> {
    let max_vendor_id = r.read_fixed_integer(16).field("max_vendor_id")?;
    let is_range = r.read_bool().field("is_range_encoding")?;

    Ok(if is_range {
        let default_consent = r.read_bool().field("default_consent")?;
        let entries = r
            .read_counted_range_entries()
            .field("vendor_range_entries")?;
        (
            default_consent,
            VendorSet::Ranges {
                max_vendor_id,
                entries,
            },
        )
    } else {
        let ids = r.read_boolean_set(max_vendor_id).field("vendor_bit_field")?;
        (false, VendorSet::BitField { max_vendor_id, ids })
    })
}
