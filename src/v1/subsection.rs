//! Sub-sections which may follow the core segment of a GPP section, separated by `.`.
//!
//! Each sub-section is base64 encoded on its own and starts with a 2-bit type. The only type
//! defined so far carries the Global Privacy Control (GPC) signal.
use crate::core::base64::DecodeExt;
use crate::core::{DataReader, FieldContext};
use crate::sections::SectionDecodeError;
use log::debug;
#[cfg(feature = "serde")]
use serde::Serialize;

const GPC_SUBSECTION_TYPE: u8 = 1;

/// Merged content of all the sub-sections of a section.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SubSections {
    pub gpc: bool,
}

/// Decodes sub-sections and merges them.
///
/// A GPC signal set in any sub-section wins over an unset one. Sub-sections of unknown type
/// are skipped.
pub fn parse_sub_sections<'a, I>(parts: I) -> Result<SubSections, SectionDecodeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sub_sections = SubSections::default();

    for s in parts {
        let b = s.decode_base64_url()?;
        let mut r = DataReader::new(&b);

        match r.read_fixed_integer::<u8>(2).field("subsection_type")? {
            GPC_SUBSECTION_TYPE => {
                sub_sections.gpc |= r.read_bool().field("gpc")?;
            }
            n => debug!("skipping sub-section of unknown type {n}"),
        }
    }

    Ok(sub_sections)
}
