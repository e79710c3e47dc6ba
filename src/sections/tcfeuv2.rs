//! TCF EU v2 consent strings.
//!
//! A TCF v2 string is made of a mandatory core segment, optionally followed by
//! `.`-separated segments which identify themselves with a 3-bit type.
//!
use crate::core::range::{RangeEntry, VendorSet};
use crate::core::{DataReader, FieldContext, FromDataReader, IdSet, Timestamp};
use crate::sections::{
    DecodableSection, OptionalSegmentParser, SectionDecodeError, SectionId, SegmentedStr,
};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::Serialize;
use std::str::FromStr;

const TCF_EU_V2_VERSION: u8 = 2;
const DISCLOSED_VENDORS_SEGMENT_TYPE: u8 = 1;
const ALLOWED_VENDORS_SEGMENT_TYPE: u8 = 2;
const PUBLISHER_TC_SEGMENT_TYPE: u8 = 3;

/// A decoded TCF EU v2 string.
///
/// Optional segments which are absent from the string are left empty: an empty
/// [`VendorSet`] for the vendor lists, and a [`PublisherTc`] with no purposes.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct TcfEuV2 {
    pub core: Core,
    pub disclosed_vendors: VendorSet,
    pub allowed_vendors: VendorSet,
    pub publisher_tc: PublisherTc,
}

impl TcfEuV2 {
    /// Whether the user consented to vendor `id`.
    pub fn vendor_allowed(&self, id: u16) -> bool {
        self.core.vendor_consents.contains(id)
    }

    pub fn vendor_legitimate_interest_established(&self, id: u16) -> bool {
        self.core.vendor_legitimate_interests.contains(id)
    }

    /// Whether the user consented to purpose `id`.
    pub fn purpose_allowed(&self, id: u16) -> bool {
        self.core.purpose_consents.contains(&id)
    }

    pub fn every_purpose_allowed(&self, ids: &[u16]) -> bool {
        ids.iter().all(|&id| self.purpose_allowed(id))
    }

    pub fn purpose_legitimate_interest_established(&self, id: u16) -> bool {
        self.core.purpose_legitimate_interests.contains(&id)
    }

    pub fn every_special_feature_opt_in_given(&self, ids: &[u16]) -> bool {
        ids.iter()
            .all(|id| self.core.special_feature_optins.contains(id))
    }

    /// Whether the publisher flatly disallows vendor `vendor_id` for any of `purposes`.
    pub fn publisher_restricted(&self, purposes: &[u16], vendor_id: u16) -> bool {
        self.core.publisher_restrictions.iter().any(|r| {
            r.restriction_type == RestrictionType::FlatlyNotAllowed
                && purposes.contains(&r.purpose_id.into())
                && r.vendor_ranges.iter().any(|e| e.contains(vendor_id))
        })
    }

    /// Whether vendor `vendor_id` may process data for every purpose in `purposes` on the basis
    /// of consent.
    pub fn suitable_to_process(&self, purposes: &[u16], vendor_id: u16) -> bool {
        self.vendor_allowed(vendor_id)
            && self.every_purpose_allowed(purposes)
            && !self.publisher_restricted(purposes, vendor_id)
    }
}

impl DecodableSection for TcfEuV2 {
    const ID: SectionId = SectionId::TcfEuV2;
}

impl FromStr for TcfEuV2 {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse_segmented_str()
    }
}

impl FromDataReader for TcfEuV2 {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        Ok(Self {
            core: r.parse()?,
            disclosed_vendors: VendorSet::default(),
            allowed_vendors: VendorSet::default(),
            publisher_tc: PublisherTc::default(),
        })
    }
}

impl OptionalSegmentParser for TcfEuV2 {
    fn parse_optional_segment(
        segment_type: u8,
        r: &mut DataReader,
        into: &mut Self,
    ) -> Result<(), SectionDecodeError> {
        match segment_type {
            DISCLOSED_VENDORS_SEGMENT_TYPE => {
                into.disclosed_vendors = r.read_vendor_set().field("disclosed_vendors")?;
            }
            ALLOWED_VENDORS_SEGMENT_TYPE => {
                into.allowed_vendors = r.read_vendor_set().field("allowed_vendors")?;
            }
            PUBLISHER_TC_SEGMENT_TYPE => {
                into.publisher_tc = r.parse()?;
            }
            n => {
                return Err(SectionDecodeError::UnrecognizedSegmentType { segment_type: n });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct Core {
    pub created: Timestamp,
    pub last_updated: Timestamp,
    pub cmp_id: u16,
    pub cmp_version: u16,
    pub consent_screen: u8,
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub policy_version: u8,
    pub is_service_specific: bool,
    pub use_non_standard_stacks: bool,
    pub special_feature_optins: IdSet,
    pub purpose_consents: IdSet,
    pub purpose_legitimate_interests: IdSet,
    pub purpose_one_treatment: bool,
    pub publisher_country_code: String,
    pub vendor_consents: VendorSet,
    pub vendor_legitimate_interests: VendorSet,
    pub publisher_restrictions: Vec<PublisherRestriction>,
}

impl FromDataReader for Core {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let version = r.read_fixed_integer(6).field("version")?;
        if version != TCF_EU_V2_VERSION {
            return Err(SectionDecodeError::WrongVersion {
                expected: TCF_EU_V2_VERSION,
                found: version,
            });
        }

        Ok(Self {
            created: r.read_timestamp().field("created")?,
            last_updated: r.read_timestamp().field("last_updated")?,
            cmp_id: r.read_fixed_integer(12).field("cmp_id")?,
            cmp_version: r.read_fixed_integer(12).field("cmp_version")?,
            consent_screen: r.read_fixed_integer(6).field("consent_screen")?,
            consent_language: r.read_string_field(12).field("consent_language")?,
            vendor_list_version: r.read_fixed_integer(12).field("vendor_list_version")?,
            policy_version: r.read_fixed_integer(6).field("policy_version")?,
            is_service_specific: r.read_bool().field("is_service_specific")?,
            use_non_standard_stacks: r.read_bool().field("use_non_standard_stacks")?,
            special_feature_optins: r.read_boolean_set(12).field("special_feature_optins")?,
            purpose_consents: r.read_boolean_set(24).field("purpose_consents")?,
            purpose_legitimate_interests: r
                .read_boolean_set(24)
                .field("purpose_legitimate_interests")?,
            purpose_one_treatment: r.read_bool().field("purpose_one_treatment")?,
            publisher_country_code: r.read_string_field(12).field("publisher_country_code")?,
            vendor_consents: r.read_vendor_set().field("vendor_consents")?,
            vendor_legitimate_interests: r
                .read_vendor_set()
                .field("vendor_legitimate_interests")?,
            publisher_restrictions: read_publisher_restrictions(r)?,
        })
    }
}

pub(crate) fn read_publisher_restrictions(
    r: &mut DataReader,
) -> Result<Vec<PublisherRestriction>, SectionDecodeError> {
    let count = r
        .read_fixed_integer::<u16>(12)
        .field("publisher_restrictions")?;

    (0..count)
        .map(|_| r.parse())
        .collect::<Result<Vec<_>, _>>()
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PublisherRestriction {
    pub purpose_id: u8,
    pub restriction_type: RestrictionType,
    pub vendor_ranges: Vec<RangeEntry>,
}

impl FromDataReader for PublisherRestriction {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let purpose_id = r.read_fixed_integer(6).field("restriction_purpose_id")?;
        let restriction_type = RestrictionType::from_u8(
            r.read_fixed_integer(2).field("restriction_type")?,
        )
        .unwrap_or(RestrictionType::Undefined);
        let vendor_ranges = r
            .read_counted_range_entries()
            .field("restriction_vendor_ranges")?;

        Ok(Self {
            purpose_id,
            restriction_type,
            vendor_ranges,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum RestrictionType {
    FlatlyNotAllowed = 0,
    RequireConsent = 1,
    RequireLegitimateInterest = 2,
    Undefined = 3,
}

/// The publisher's own transparency and consent signals.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct PublisherTc {
    pub consents: IdSet,
    pub legitimate_interests: IdSet,
    pub num_custom_purposes: u8,
    pub custom_consents: IdSet,
    pub custom_legitimate_interests: IdSet,
}

impl FromDataReader for PublisherTc {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, SectionDecodeError> {
        let consents = r.read_boolean_set(24).field("pub_purposes_consent")?;
        let legitimate_interests = r.read_boolean_set(24).field("pub_purposes_li")?;
        let num_custom_purposes = r.read_fixed_integer::<u8>(6).field("num_custom_purposes")?;
        let custom_consents = r
            .read_boolean_set(num_custom_purposes.into())
            .field("custom_purposes_consent")?;
        let custom_legitimate_interests = r
            .read_boolean_set(num_custom_purposes.into())
            .field("custom_purposes_li")?;

        Ok(Self {
            consents,
            legitimate_interests,
            num_custom_purposes,
            custom_consents,
            custom_legitimate_interests,
        })
    }
}
