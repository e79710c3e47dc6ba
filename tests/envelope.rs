use iab_consent::sections::mspa::{Consent, MspaSection, Notice};
use iab_consent::sections::uspv1::Flag;
use iab_consent::sections::{Section, SectionDecodeError, SectionId};
use iab_consent::v1::{DecodeOptions, GPPDecodeError, GPPString};
use iab_consent::{decode_envelope, decode_envelope_with, decode_header};
use test_case::test_case;

const TCF_EU_V2: &str = "CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA";
const TCF_EU_V1: &str = "BONMj34ONMj34ABACDENALqAAAAAplY";

fn mspa(section: &Result<Section, SectionDecodeError>) -> &MspaSection {
    match section {
        Ok(Section::Mspa(s)) => s,
        other => panic!("expected an mspa section, got {other:?}"),
    }
}

#[test_case("DBABM" => vec![2] ; "bare header")]
#[test_case("DBACNY~CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA~1YNN" => vec![2, 6] ; "full string")]
#[test_case("DBADNb~x~y~z" => vec![2, 6, 7] ; "sections are not decoded")]
fn header(s: &str) -> Vec<u16> {
    decode_header(s).unwrap().sections
}

#[test]
fn every_section_type() {
    let s = format!("DBADNb~{TCF_EU_V2}~1YN-~BVVqAAEABAA.QA");
    let sections = decode_envelope(&s).unwrap();

    assert_eq!(sections.len(), 3);
    assert!(matches!(&sections[&2], Ok(Section::TcfEuV2(tcf)) if tcf.core.cmp_id == 31));
    assert!(matches!(
        &sections[&6],
        Ok(Section::UspV1(usp)) if usp.lspa_covered_transaction == Flag::NotApplicable
    ));

    let us_nat = mspa(&sections[&7]);
    assert_eq!(us_nat.section_id, SectionId::UsNat);
    assert_eq!(us_nat.sharing_notice, Notice::Provided);
    assert_eq!(us_nat.personal_data_consents, Consent::NoConsent);
    assert!(!us_nat.gpc);
}

#[test]
fn tcf_eu_v1_section() {
    let sections = decode_envelope(&format!("DBABY~{TCF_EU_V1}")).unwrap();

    match &sections[&1] {
        Ok(Section::TcfEuV1(tcf)) => {
            assert_eq!(tcf.purposes_allowed, [1, 3, 5].into());
            assert!(tcf.vendor_allowed(10));
            assert!(!tcf.vendor_allowed(3));
        }
        other => panic!("expected a tcf eu v1 section, got {other:?}"),
    }
}

#[test]
fn failures_are_isolated() {
    let s = format!("DBADNZg~{TCF_EU_V2}~1ABC~BWYbGwZo");
    let sections = decode_envelope(&s).unwrap();

    assert!(matches!(sections[&2], Ok(Section::TcfEuV2(_))));
    assert!(matches!(
        sections[&6],
        Err(SectionDecodeError::InvalidCharacter { character: 'A', .. })
    ));
    assert_eq!(mspa(&sections[&8]).section_id, SectionId::UsCa);
}

#[test]
fn unsupported_sections_are_reported() {
    let sections = decode_envelope(&format!("DBACNg~{TCF_EU_V2}~anything")).unwrap();

    assert!(matches!(sections[&2], Ok(Section::TcfEuV2(_))));
    assert_eq!(
        sections[&3],
        Err(SectionDecodeError::UnsupportedSection(3))
    );
}

#[test_case("DBABL~BVVqAAEABAA.QA" => false ; "gpc unset")]
#[test_case("DBABL~BVVqAAEABAA.YA" => true ; "gpc set")]
#[test_case("DBABL~BVVqAAEABAA.QA.YA" => true ; "merged sub sections")]
#[test_case("DBABL~BVVqAAEABAA" => false ; "no sub section")]
fn gpc(s: &str) -> bool {
    mspa(&decode_envelope(s).unwrap()[&7]).gpc
}

#[test]
fn decoding_is_idempotent() {
    let s = format!("DBACNY~{TCF_EU_V2}~1YNN");
    assert_eq!(decode_envelope(&s).unwrap(), decode_envelope(&s).unwrap());
}

#[test]
fn section_count_policy() {
    let s = format!("DBADNb~{TCF_EU_V2}~1YNN");

    let tolerant = decode_envelope(&s).unwrap();
    assert_eq!(tolerant.len(), 2);
    assert!(!tolerant.contains_key(&7));

    assert_eq!(
        decode_envelope_with(&s, &DecodeOptions::strict()),
        Err(GPPDecodeError::MismatchedSections {
            ids: 3,
            sections: 2
        })
    );
}

#[test_case("DCACNY~1YNN" => GPPDecodeError::UnsupportedVersion { found: 2 } ; "version")]
#[test_case("BBACNY~1YNN" => GPPDecodeError::InvalidHeaderType { found: 1 } ; "header type")]
#[test_case("DBABL" => GPPDecodeError::NotEnoughSegments ; "header only")]
#[test_case("D$AB~1YNN" => matches GPPDecodeError::MalformedBase64(_) ; "bad base64")]
fn envelope_error(s: &str) -> GPPDecodeError {
    decode_envelope(s).unwrap_err()
}

#[test]
fn raw_sections() {
    let s = format!("DBACNY~{TCF_EU_V2}~1YNN");
    let gpp = GPPString::parse_str(&s).unwrap();

    assert_eq!(gpp.header().sections, vec![2, 6]);
    assert_eq!(gpp.section(SectionId::TcfEuV2), Some(TCF_EU_V2));
    assert_eq!(gpp.raw_section(6), Some("1YNN"));
    assert_eq!(gpp.raw_section(7), None);
    assert_eq!(gpp.sections().collect::<Vec<_>>(), vec![TCF_EU_V2, "1YNN"]);
}
