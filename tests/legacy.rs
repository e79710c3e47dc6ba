use iab_consent::core::range::VendorSet;
use iab_consent::sections::SectionDecodeError;
use iab_consent::{decode_tcf_v1, decode_tcf_v2};
use test_case::test_case;

#[test]
fn tcf_v1() {
    let tcf = decode_tcf_v1("BOEFEAyOEFEAyAHABDENAI4AAAB9vABAASA").unwrap();

    assert_eq!(tcf.created.unix_seconds(), 1510082155);
    assert_eq!(tcf.cmp_id, 7);
    assert!(tcf.default_consent);
    assert!(matches!(
        tcf.vendor_consents,
        VendorSet::Ranges {
            max_vendor_id: 2011,
            ..
        }
    ));
    assert!(tcf.vendor_allowed(1));
    assert!(!tcf.vendor_allowed(9));
    assert!(!tcf.vendor_allowed(2012));
    assert!(tcf.every_purpose_allowed(&[1, 2, 3]));
}

#[test]
fn tcf_v2() {
    let tcf = decode_tcf_v2("CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA").unwrap();

    assert_eq!(tcf.core.cmp_id, 31);
    assert_eq!(tcf.core.consent_language, "EN");
    assert!(!tcf.vendor_allowed(1));
    assert!(tcf.disclosed_vendors.is_empty());
}

#[test_case("CPXxRfAPXxRfAAfKABENB-CgAAAAAAAAAAYgAAAAAAAA" => SectionDecodeError::WrongVersion { expected: 1, found: 2 } ; "v2 string")]
#[test_case("BONMj34O!" => matches SectionDecodeError::MalformedBase64(_) ; "bad base64")]
fn tcf_v1_error(s: &str) -> SectionDecodeError {
    decode_tcf_v1(s).unwrap_err()
}

#[test_case("BONMj34ONMj34ABACDENALqAAAAAplY" => SectionDecodeError::WrongVersion { expected: 2, found: 1 } ; "v1 string")]
#[test_case("CPX" => matches SectionDecodeError::Field(_) ; "truncated")]
fn tcf_v2_error(s: &str) -> SectionDecodeError {
    decode_tcf_v2(s).unwrap_err()
}
