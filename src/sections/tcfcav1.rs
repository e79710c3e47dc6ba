//! TCF Canada v1 consent strings.
//!
//! The layout mirrors TCF EU v2, with express and implied consents in place of consents and
//! legitimate interests.
use crate::core::range::VendorSet;
use crate::core::{DataReader, FieldContext, FromDataReader, IdSet, Timestamp};
use crate::sections::tcfeuv2::{read_publisher_restrictions, PublisherRestriction};
use crate::sections::{
    DecodableSection, OptionalSegmentParser, SectionDecodeError, SectionId, SegmentedStr,
};
use log::trace;
#[cfg(feature = "serde")]
use serde::Serialize;
use std::str::FromStr;

const TCF_CA_V1_VERSION: u8 = 1;
const DISCLOSED_VENDORS_SEGMENT_TYPE: u8 = 1;
const PUBLISHER_PURPOSES_SEGMENT_TYPE: u8 = 3;

/// Width of the publisher restrictions count.
const PUBLISHER_RESTRICTIONS_COUNT_BITS: u64 = 12;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct TcfCaV1 {
    pub core: Core,
    pub disclosed_vendors: VendorSet,
    pub publisher_purposes: PublisherPurposes,
}

impl DecodableSection for TcfCaV1 {
    const ID: SectionId = SectionId::TcfCaV1;
}

impl FromStr for TcfCaV1 {
    type Err = SectionDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse_segmented_str()
    }
}

impl FromDataReader for TcfCaV1 {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        Ok(Self {
            core: r.parse()?,
            disclosed_vendors: VendorSet::default(),
            publisher_purposes: PublisherPurposes::default(),
        })
    }
}

impl OptionalSegmentParser for TcfCaV1 {
    fn parse_optional_segment(
        segment_type: u8,
        r: &mut DataReader,
        into: &mut Self,
    ) -> Result<(), SectionDecodeError> {
        match segment_type {
            DISCLOSED_VENDORS_SEGMENT_TYPE => {
                into.disclosed_vendors = r.read_vendor_set().field("disclosed_vendors")?;
            }
            PUBLISHER_PURPOSES_SEGMENT_TYPE => {
                into.publisher_purposes = r.parse()?;
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
    pub use_non_standard_stacks: bool,
    pub special_feature_express_consents: IdSet,
    pub purpose_express_consents: IdSet,
    pub purpose_implied_consents: IdSet,
    pub vendor_express_consents: VendorSet,
    pub vendor_implied_consents: VendorSet,
    pub publisher_restrictions: Vec<PublisherRestriction>,
}

impl FromDataReader for Core {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let version = r.read_fixed_integer(6).field("version")?;
        if version != TCF_CA_V1_VERSION {
            return Err(SectionDecodeError::WrongVersion {
                expected: TCF_CA_V1_VERSION,
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
        let policy_version = r.read_fixed_integer(6).field("policy_version")?;
        let use_non_standard_stacks = r.read_bool().field("use_non_standard_stacks")?;
        let special_feature_express_consents = r
            .read_boolean_set(12)
            .field("special_feature_express_consents")?;
        let purpose_express_consents = r.read_boolean_set(24).field("purpose_express_consents")?;
        let purpose_implied_consents = r.read_boolean_set(24).field("purpose_implied_consents")?;
        let vendor_express_consents = r.read_vendor_set().field("vendor_express_consents")?;
        let vendor_implied_consents = r.read_vendor_set().field("vendor_implied_consents")?;

        // strings from the 1.0 version of the format end here
        let publisher_restrictions = if r.remaining_bits() < PUBLISHER_RESTRICTIONS_COUNT_BITS {
            trace!(
                "no publisher restrictions in tcf ca string, {} bits left",
                r.remaining_bits()
            );
            vec![]
        } else {
            read_publisher_restrictions(r)?
        };

        Ok(Self {
            created,
            last_updated,
            cmp_id,
            cmp_version,
            consent_screen,
            consent_language,
            vendor_list_version,
            policy_version,
            use_non_standard_stacks,
            special_feature_express_consents,
            purpose_express_consents,
            purpose_implied_consents,
            vendor_express_consents,
            vendor_implied_consents,
            publisher_restrictions,
        })
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct PublisherPurposes {
    pub purpose_express_consents: IdSet,
    pub purpose_implied_consents: IdSet,
    pub num_custom_purposes: u8,
    pub custom_purpose_express_consents: IdSet,
    pub custom_purpose_implied_consents: IdSet,
}

impl FromDataReader for PublisherPurposes {
    type Err = SectionDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let purpose_express_consents = r
            .read_boolean_set(24)
            .field("pub_purposes_express_consent")?;
        let purpose_implied_consents = r
            .read_boolean_set(24)
            .field("pub_purposes_implied_consent")?;
        let num_custom_purposes = r.read_fixed_integer::<u8>(6).field("num_custom_purposes")?;
        let custom_purpose_express_consents = r
            .read_boolean_set(num_custom_purposes.into())
            .field("custom_purposes_express_consent")?;
        let custom_purpose_implied_consents = r
            .read_boolean_set(num_custom_purposes.into())
            .field("custom_purposes_implied_consent")?;

        Ok(Self {
            purpose_express_consents,
            purpose_implied_consents,
            num_custom_purposes,
            custom_purpose_express_consents,
            custom_purpose_implied_consents,
        })
    }
}
