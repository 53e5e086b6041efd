use std::sync::Arc;

use cookie_policy::{
    AesGcmEncrypter, Codec, ConfigErrorKind, Cookie, CookieOptions, CookiePolicy, CookieQueue,
    CookieValue, CryptoErrorKind, Encrypter, Protection, Secret, MAC_LENGTH,
};

fn encrypter() -> Arc<dyn Encrypter> {
    Arc::new(AesGcmEncrypter::new([7u8; 32]))
}

#[test]
fn secret_is_fully_redacted() {
    let key = Secret::new(b"master-key-material".to_vec());

    let debug_out = format!("{:?}", key);
    assert_eq!(debug_out, "[REDACTED]");
    assert!(!debug_out.contains("master"));
    assert_eq!(format!("{}", key), "[REDACTED]");
}

#[test]
fn encrypter_debug_never_shows_key() {
    let encrypter = AesGcmEncrypter::new([0xAB; 32]);
    let debug_out = format!("{:?}", encrypter);

    assert!(debug_out.contains("[REDACTED]"));
    assert!(!debug_out.contains("171"));
    assert!(!debug_out.to_lowercase().contains("ab, ab"));
}

#[test]
fn base64_key_must_be_32_bytes() {
    let err = AesGcmEncrypter::from_base64_key("c2hvcnQ=").unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::InvalidKey);

    let err = AesGcmEncrypter::from_base64_key("not base64!").unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::InvalidKey);

    let valid = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
    assert!(AesGcmEncrypter::from_base64_key(valid).is_ok());
}

#[test]
fn encrypt_codec_round_trips_and_hides_plaintext() {
    let codec = Codec::for_protection(Protection::Encrypt, Some(encrypter())).unwrap();

    let encoded = codec.encode("user-42").unwrap();
    assert!(!encoded.contains("user-42"));
    assert_eq!(codec.decode(&encoded).as_deref(), Some("user-42"));
}

#[test]
fn hmac_codec_keeps_value_readable() {
    let codec = Codec::for_protection(Protection::Hmac, Some(encrypter())).unwrap();

    let signed = codec.encode("theme=dark").unwrap();
    assert!(signed.starts_with("theme=dark"));
    assert_eq!(signed.len(), "theme=dark".len() + MAC_LENGTH);
    assert_eq!(codec.decode(&signed).as_deref(), Some("theme=dark"));
}

#[test]
fn codecs_reject_foreign_keys() {
    let other: Arc<dyn Encrypter> = Arc::new(AesGcmEncrypter::new([8u8; 32]));

    for protection in [Protection::Hmac, Protection::Encrypt] {
        let ours = Codec::for_protection(protection, Some(encrypter())).unwrap();
        let theirs = Codec::for_protection(protection, Some(other.clone())).unwrap();

        let encoded = theirs.encode("value").unwrap();
        assert_eq!(ours.decode(&encoded), None, "{protection} accepted a foreign value");
    }
}

#[test]
fn decrypt_reports_malformed_input() {
    let encrypter = AesGcmEncrypter::new([1u8; 32]);

    let err = encrypter.decrypt("***").unwrap_err();
    assert_eq!(err.kind(), CryptoErrorKind::Malformed);

    let err = encrypter.decrypt("AAAA").unwrap_err();
    assert_eq!(err.kind(), CryptoErrorKind::Malformed);
}

#[test]
fn unprotected_codec_needs_no_encrypter() {
    let codec = Codec::for_protection(Protection::Unprotected, None).unwrap();
    assert_eq!(codec.encode("plain").unwrap(), "plain");
    assert_eq!(codec.decode("plain").as_deref(), Some("plain"));

    let err = Codec::for_protection(Protection::Hmac, None).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::MissingEncrypter);
}

#[test]
fn array_values_decode_per_element() {
    let codec = Codec::for_protection(Protection::Encrypt, Some(encrypter())).unwrap();
    let good = codec.encode("kept").unwrap();

    let value = CookieValue::List(vec![
        CookieValue::Text(good.clone()),
        CookieValue::Text("forged".to_string()),
        CookieValue::List(vec![CookieValue::Text(good)]),
    ]);

    let decoded = codec.decode_value(value);

    assert_eq!(
        decoded,
        CookieValue::List(vec![
            CookieValue::Text("kept".to_string()),
            CookieValue::Absent,
            CookieValue::List(vec![CookieValue::Text("kept".to_string())]),
        ])
    );
}

#[test]
fn policy_defaults_match_documented_values() {
    let policy = CookiePolicy::default();

    assert_eq!(policy.domain_pattern(), ".%s");
    assert_eq!(policy.protection(), Protection::Encrypt);
    assert!(!policy.is_protected("PHPSESSID"));
    assert!(!policy.is_protected("csrf-token"));
    assert!(policy.is_protected("remember_me"));
}

#[test]
fn policy_builder_rejects_bad_patterns() {
    let err = CookiePolicy::builder().domain_pattern("").build().unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::InvalidDomainPattern);

    let err = CookiePolicy::builder()
        .domain_pattern("%s.%s")
        .build()
        .unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::InvalidDomainPattern);
}

#[test]
fn queue_keeps_insertion_order_and_duplicates() {
    let mut queue = CookieQueue::new(
        Some("example.com".into()),
        Some(".example.com".into()),
        true,
    );

    queue.set("a", "1", CookieOptions::new());
    queue.set("a", "2", CookieOptions::new());
    queue.delete("a");

    let values: Vec<_> = queue.scheduled().iter().map(Cookie::value).collect();
    assert_eq!(values, ["1", "2", ""]);

    let deletion = &queue.scheduled()[2];
    assert!(deletion.is_deletion());
    assert!(deletion.is_secure());
    assert_eq!(deletion.domain(), Some(".example.com"));
}

#[test]
fn set_cookie_header_round_trips_through_parse() {
    let cookie = Cookie::new("prefs", "a b/c")
        .with_domain(".example.com")
        .with_secure(true);

    let header = cookie.create_header();
    let parsed = Cookie::parse(&header).unwrap();

    assert_eq!(parsed, cookie);
}
