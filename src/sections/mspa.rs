//! Multi-State Privacy Agreement (MSPA) sections: US National and the US state sections.
//!
//! Every MSPA section is a sequence of 2-bit values. The sections only differ in which fields
//! they carry, in which order, and in the padded length of their core segment, so a single
//! decoder walks a per section and version [`MspaLayout`] table.
//!
//! Fields a section does not carry keep their `NotApplicable` value (or stay empty for lists).
//!
use crate::core::base64::DecodeExt;
use crate::core::{DataReader, FieldContext};
use crate::sections::{SectionDecodeError, SectionId};
use crate::v1::subsection::parse_sub_sections;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Notice {
    #[default]
    NotApplicable = 0,
    Provided = 1,
    NotProvided = 2,
    Invalid = 3,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum OptOut {
    #[default]
    NotApplicable = 0,
    OptedOut = 1,
    DidNotOptOut = 2,
    Invalid = 3,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Consent {
    #[default]
    NotApplicable = 0,
    NoConsent = 1,
    Consent = 2,
    Invalid = 3,
}

/// Answer to the MSPA covered transaction and mode questions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MspaMode {
    #[default]
    NotApplicable = 0,
    Yes = 1,
    No = 2,
    Invalid = 3,
}

trait MspaValue: FromPrimitive {
    const INVALID: Self;
}

impl MspaValue for Notice {
    const INVALID: Self = Self::Invalid;
}

impl MspaValue for OptOut {
    const INVALID: Self = Self::Invalid;
}

impl MspaValue for Consent {
    const INVALID: Self = Self::Invalid;
}

impl MspaValue for MspaMode {
    const INVALID: Self = Self::Invalid;
}

/// A field of an MSPA core segment.
///
/// List fields carry their number of entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MspaField {
    SharingNotice,
    SaleOptOutNotice,
    SharingOptOutNotice,
    TargetedAdvertisingOptOutNotice,
    SensitiveDataProcessingOptOutNotice,
    SensitiveDataLimitUseNotice,
    SaleOptOut,
    SharingOptOut,
    TargetedAdvertisingOptOut,
    SensitiveDataProcessingConsents(u8),
    SensitiveDataProcessingOptOuts(u8),
    KnownChildSensitiveDataConsents(u8),
    PersonalDataConsents,
    MspaCoveredTransaction,
    MspaOptOutOptionMode,
    MspaServiceProviderMode,
}

impl MspaField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SharingNotice => "sharing_notice",
            Self::SaleOptOutNotice => "sale_opt_out_notice",
            Self::SharingOptOutNotice => "sharing_opt_out_notice",
            Self::TargetedAdvertisingOptOutNotice => "targeted_advertising_opt_out_notice",
            Self::SensitiveDataProcessingOptOutNotice => {
                "sensitive_data_processing_opt_out_notice"
            }
            Self::SensitiveDataLimitUseNotice => "sensitive_data_limit_use_notice",
            Self::SaleOptOut => "sale_opt_out",
            Self::SharingOptOut => "sharing_opt_out",
            Self::TargetedAdvertisingOptOut => "targeted_advertising_opt_out",
            Self::SensitiveDataProcessingConsents(_) => "sensitive_data_processing_consents",
            Self::SensitiveDataProcessingOptOuts(_) => "sensitive_data_processing_opt_outs",
            Self::KnownChildSensitiveDataConsents(_) => "known_child_sensitive_data_consents",
            Self::PersonalDataConsents => "personal_data_consents",
            Self::MspaCoveredTransaction => "mspa_covered_transaction",
            Self::MspaOptOutOptionMode => "mspa_opt_out_option_mode",
            Self::MspaServiceProviderMode => "mspa_service_provider_mode",
        }
    }

    /// Width of the field, in bits.
    pub fn bits(&self) -> usize {
        match self {
            Self::SensitiveDataProcessingConsents(n)
            | Self::SensitiveDataProcessingOptOuts(n)
            | Self::KnownChildSensitiveDataConsents(n) => 2 * usize::from(*n),
            _ => 2,
        }
    }
}

/// Field order and padded bit length of one version of an MSPA section.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MspaLayout {
    pub version: u8,
    /// Length of the core segment once decoded, padding included.
    pub bit_length: usize,
    pub fields: &'static [MspaField],
}

use MspaField::*;

const US_NAT_V1: &[MspaField] = &[
    SharingNotice,
    SaleOptOutNotice,
    SharingOptOutNotice,
    TargetedAdvertisingOptOutNotice,
    SensitiveDataProcessingOptOutNotice,
    SensitiveDataLimitUseNotice,
    SaleOptOut,
    SharingOptOut,
    TargetedAdvertisingOptOut,
    SensitiveDataProcessingConsents(12),
    KnownChildSensitiveDataConsents(2),
    PersonalDataConsents,
    MspaCoveredTransaction,
    MspaOptOutOptionMode,
    MspaServiceProviderMode,
];

const US_NAT_V2: &[MspaField] = &[
    SharingNotice,
    SaleOptOutNotice,
    SharingOptOutNotice,
    TargetedAdvertisingOptOutNotice,
    SensitiveDataProcessingOptOutNotice,
    SensitiveDataLimitUseNotice,
    SaleOptOut,
    SharingOptOut,
    TargetedAdvertisingOptOut,
    SensitiveDataProcessingConsents(16),
    KnownChildSensitiveDataConsents(3),
    PersonalDataConsents,
    MspaCoveredTransaction,
    MspaOptOutOptionMode,
    MspaServiceProviderMode,
];

const US_CA: &[MspaField] = &[
    SaleOptOutNotice,
    SharingOptOutNotice,
    SensitiveDataLimitUseNotice,
    SaleOptOut,
    SharingOptOut,
    SensitiveDataProcessingOptOuts(9),
    KnownChildSensitiveDataConsents(2),
    PersonalDataConsents,
    MspaCoveredTransaction,
    MspaOptOutOptionMode,
    MspaServiceProviderMode,
];

/// Layout shared by the consent based states: three notices and two opt-outs, followed by the
/// sensitive data consents, the known child consents and, for some, personal data consents.
macro_rules! consent_state {
    ($sensitive:literal, $known_child:literal) => {
        &[
            SharingNotice,
            SaleOptOutNotice,
            TargetedAdvertisingOptOutNotice,
            SaleOptOut,
            TargetedAdvertisingOptOut,
            SensitiveDataProcessingConsents($sensitive),
            KnownChildSensitiveDataConsents($known_child),
            MspaCoveredTransaction,
            MspaOptOutOptionMode,
            MspaServiceProviderMode,
        ]
    };
    ($sensitive:literal, $known_child:literal, personal_data) => {
        &[
            SharingNotice,
            SaleOptOutNotice,
            TargetedAdvertisingOptOutNotice,
            SaleOptOut,
            TargetedAdvertisingOptOut,
            SensitiveDataProcessingConsents($sensitive),
            KnownChildSensitiveDataConsents($known_child),
            PersonalDataConsents,
            MspaCoveredTransaction,
            MspaOptOutOptionMode,
            MspaServiceProviderMode,
        ]
    };
}

/// Layout shared by the opt-out based states (Utah and Iowa).
const US_OPT_OUT_STATE: &[MspaField] = &[
    SharingNotice,
    SaleOptOutNotice,
    TargetedAdvertisingOptOutNotice,
    SensitiveDataProcessingOptOutNotice,
    SaleOptOut,
    TargetedAdvertisingOptOut,
    SensitiveDataProcessingOptOuts(8),
    KnownChildSensitiveDataConsents(1),
    MspaCoveredTransaction,
    MspaOptOutOptionMode,
    MspaServiceProviderMode,
];

const US_VA: &[MspaField] = consent_state!(8, 1);
const US_CO: &[MspaField] = consent_state!(7, 1);
const US_CT: &[MspaField] = consent_state!(8, 3);
const US_FL: &[MspaField] = consent_state!(8, 3, personal_data);
const US_MT: &[MspaField] = consent_state!(8, 3, personal_data);
const US_OR: &[MspaField] = consent_state!(11, 3, personal_data);
const US_TX: &[MspaField] = consent_state!(8, 1, personal_data);
const US_DE: &[MspaField] = consent_state!(9, 5, personal_data);
const US_NE: &[MspaField] = consent_state!(8, 1, personal_data);
const US_NH: &[MspaField] = consent_state!(8, 3, personal_data);
const US_NJ: &[MspaField] = consent_state!(10, 5, personal_data);

// Tennessee has no covered transaction field
const US_TN: &[MspaField] = &[
    SharingNotice,
    SaleOptOutNotice,
    TargetedAdvertisingOptOutNotice,
    SaleOptOut,
    TargetedAdvertisingOptOut,
    SensitiveDataProcessingConsents(8),
    KnownChildSensitiveDataConsents(1),
    PersonalDataConsents,
    MspaOptOutOptionMode,
    MspaServiceProviderMode,
];

const fn v1(bit_length: usize, fields: &'static [MspaField]) -> MspaLayout {
    MspaLayout {
        version: 1,
        bit_length,
        fields,
    }
}

const US_NAT_LAYOUTS: &[MspaLayout] = &[
    v1(64, US_NAT_V1),
    MspaLayout {
        version: 2,
        bit_length: 72,
        fields: US_NAT_V2,
    },
];
const US_CA_LAYOUTS: &[MspaLayout] = &[v1(48, US_CA)];
const US_VA_LAYOUTS: &[MspaLayout] = &[v1(40, US_VA)];
const US_CO_LAYOUTS: &[MspaLayout] = &[v1(40, US_CO)];
const US_OPT_OUT_STATE_LAYOUTS: &[MspaLayout] = &[v1(48, US_OPT_OUT_STATE)];
const US_CT_LAYOUTS: &[MspaLayout] = &[v1(48, US_CT)];
const US_FL_LAYOUTS: &[MspaLayout] = &[v1(48, US_FL)];
const US_MT_LAYOUTS: &[MspaLayout] = &[v1(48, US_MT)];
const US_OR_LAYOUTS: &[MspaLayout] = &[v1(56, US_OR)];
const US_TX_LAYOUTS: &[MspaLayout] = &[v1(48, US_TX)];
const US_DE_LAYOUTS: &[MspaLayout] = &[v1(56, US_DE)];
const US_NE_LAYOUTS: &[MspaLayout] = &[v1(48, US_NE)];
const US_NH_LAYOUTS: &[MspaLayout] = &[v1(48, US_NH)];
const US_NJ_LAYOUTS: &[MspaLayout] = &[v1(56, US_NJ)];
const US_TN_LAYOUTS: &[MspaLayout] = &[v1(40, US_TN)];

/// Every known version of the section, or an empty slice if `section_id` is not an MSPA section.
pub fn layouts(section_id: SectionId) -> &'static [MspaLayout] {
    match section_id {
        SectionId::UsNat => US_NAT_LAYOUTS,
        SectionId::UsCa => US_CA_LAYOUTS,
        SectionId::UsVa => US_VA_LAYOUTS,
        SectionId::UsCo => US_CO_LAYOUTS,
        SectionId::UsUt | SectionId::UsIa => US_OPT_OUT_STATE_LAYOUTS,
        SectionId::UsCt => US_CT_LAYOUTS,
        SectionId::UsFl => US_FL_LAYOUTS,
        SectionId::UsMt => US_MT_LAYOUTS,
        SectionId::UsOr => US_OR_LAYOUTS,
        SectionId::UsTx => US_TX_LAYOUTS,
        SectionId::UsDe => US_DE_LAYOUTS,
        SectionId::UsNe => US_NE_LAYOUTS,
        SectionId::UsNh => US_NH_LAYOUTS,
        SectionId::UsNj => US_NJ_LAYOUTS,
        SectionId::UsTn => US_TN_LAYOUTS,
        _ => &[],
    }
}

pub fn layout_for(section_id: SectionId, version: u8) -> Option<&'static MspaLayout> {
    layouts(section_id).iter().find(|l| l.version == version)
}

/// A decoded MSPA section, US National or any US state.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct MspaSection {
    pub section_id: SectionId,
    pub version: u8,
    pub sharing_notice: Notice,
    pub sale_opt_out_notice: Notice,
    pub sharing_opt_out_notice: Notice,
    pub targeted_advertising_opt_out_notice: Notice,
    pub sensitive_data_processing_opt_out_notice: Notice,
    pub sensitive_data_limit_use_notice: Notice,
    pub sale_opt_out: OptOut,
    pub sharing_opt_out: OptOut,
    pub targeted_advertising_opt_out: OptOut,
    /// Sensitive data processing, for sections where it requires consent.
    pub sensitive_data_processing_consents: Vec<Consent>,
    /// Sensitive data processing, for sections where the user may opt out of it.
    pub sensitive_data_processing_opt_outs: Vec<OptOut>,
    pub known_child_sensitive_data_consents: Vec<Consent>,
    pub personal_data_consents: Consent,
    pub mspa_covered_transaction: MspaMode,
    pub mspa_opt_out_option_mode: MspaMode,
    pub mspa_service_provider_mode: MspaMode,
    /// Global Privacy Control, from the optional sub-sections.
    pub gpc: bool,
}

impl MspaSection {
    fn empty(section_id: SectionId, version: u8) -> Self {
        Self {
            section_id,
            version,
            sharing_notice: Notice::default(),
            sale_opt_out_notice: Notice::default(),
            sharing_opt_out_notice: Notice::default(),
            targeted_advertising_opt_out_notice: Notice::default(),
            sensitive_data_processing_opt_out_notice: Notice::default(),
            sensitive_data_limit_use_notice: Notice::default(),
            sale_opt_out: OptOut::default(),
            sharing_opt_out: OptOut::default(),
            targeted_advertising_opt_out: OptOut::default(),
            sensitive_data_processing_consents: vec![],
            sensitive_data_processing_opt_outs: vec![],
            known_child_sensitive_data_consents: vec![],
            personal_data_consents: Consent::default(),
            mspa_covered_transaction: MspaMode::default(),
            mspa_opt_out_option_mode: MspaMode::default(),
            mspa_service_provider_mode: MspaMode::default(),
            gpc: false,
        }
    }

    /// Decodes the MSPA section `section_id` from `s`, its core segment optionally followed by
    /// `.`-separated sub-sections.
    ///
    /// # Errors
    ///
    /// Returns [`SectionDecodeError::UnsupportedSection`] if `section_id` is not an MSPA
    /// section, [`SectionDecodeError::UnsupportedVersion`] if its version has no known layout,
    /// and [`SectionDecodeError::InvalidLength`] if the core segment does not have the exact
    /// length of that layout.
    pub fn decode(section_id: SectionId, s: &str) -> Result<Self, SectionDecodeError> {
        if layouts(section_id).is_empty() {
            return Err(SectionDecodeError::UnsupportedSection(section_id as u16));
        }

        let mut parts = s.split('.');
        let core = parts.next().unwrap_or_default().decode_base64_url()?;
        let mut r = DataReader::new(&core);

        let version = r.read_fixed_integer::<u8>(6).field("version")?;
        let layout = layout_for(section_id, version)
            .ok_or(SectionDecodeError::UnsupportedVersion { found: version })?;

        let found = core.len() * 8;
        if found != layout.bit_length {
            return Err(SectionDecodeError::InvalidLength {
                expected: layout.bit_length,
                found,
            });
        }

        let mut section = Self::empty(section_id, version);
        for field in layout.fields {
            section.read_field(*field, &mut r)?;
        }
        section.gpc = parse_sub_sections(parts)?.gpc;

        Ok(section)
    }

    fn read_field(
        &mut self,
        field: MspaField,
        r: &mut DataReader,
    ) -> Result<(), SectionDecodeError> {
        match field {
            SharingNotice => self.sharing_notice = read_value(r, field)?,
            SaleOptOutNotice => self.sale_opt_out_notice = read_value(r, field)?,
            SharingOptOutNotice => self.sharing_opt_out_notice = read_value(r, field)?,
            TargetedAdvertisingOptOutNotice => {
                self.targeted_advertising_opt_out_notice = read_value(r, field)?
            }
            SensitiveDataProcessingOptOutNotice => {
                self.sensitive_data_processing_opt_out_notice = read_value(r, field)?
            }
            SensitiveDataLimitUseNotice => {
                self.sensitive_data_limit_use_notice = read_value(r, field)?
            }
            SaleOptOut => self.sale_opt_out = read_value(r, field)?,
            SharingOptOut => self.sharing_opt_out = read_value(r, field)?,
            TargetedAdvertisingOptOut => self.targeted_advertising_opt_out = read_value(r, field)?,
            SensitiveDataProcessingConsents(n) => {
                self.sensitive_data_processing_consents = read_values(r, field, n)?
            }
            SensitiveDataProcessingOptOuts(n) => {
                self.sensitive_data_processing_opt_outs = read_values(r, field, n)?
            }
            KnownChildSensitiveDataConsents(n) => {
                self.known_child_sensitive_data_consents = read_values(r, field, n)?
            }
            PersonalDataConsents => self.personal_data_consents = read_value(r, field)?,
            MspaCoveredTransaction => self.mspa_covered_transaction = read_value(r, field)?,
            MspaOptOutOptionMode => self.mspa_opt_out_option_mode = read_value(r, field)?,
            MspaServiceProviderMode => self.mspa_service_provider_mode = read_value(r, field)?,
        }
        Ok(())
    }
}

fn read_value<T: MspaValue>(r: &mut DataReader, field: MspaField) -> Result<T, SectionDecodeError> {
    let value = r.read_fixed_integer::<u8>(2).field(field.name())?;
    Ok(T::from_u8(value).unwrap_or(T::INVALID))
}

fn read_values<T: MspaValue>(
    r: &mut DataReader,
    field: MspaField,
    count: u8,
) -> Result<Vec<T>, SectionDecodeError> {
    (0..count).map(|_| read_value(r, field)).collect()
}
