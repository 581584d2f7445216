use sealdrop::config::{HEADER_LEN, KEY_LEN, MAGIC, NONCE_LEN, TAG_LEN};
use sealdrop::crypto::{
    decode_key, decrypt, decrypt_with_key, encode_key, encrypt, encrypt_with_key, generate_key,
    EncryptionKey,
};
use sealdrop::CryptoError;

const SAMPLE: &[u8] = b"This is a test file for the secure file transfer system";

#[test]
fn test_sample_file_roundtrip() {
    assert_eq!(SAMPLE.len(), 55);

    let sealed = encrypt(SAMPLE).expect("Encryption should succeed");
    assert_eq!(
        sealed.envelope.len(),
        MAGIC.len() + NONCE_LEN + SAMPLE.len() + TAG_LEN,
        "Envelope should be marker + nonce + plaintext + tag"
    );

    let decrypted = decrypt(&sealed.envelope, &sealed.key).expect("Decryption should succeed");
    assert_eq!(decrypted, SAMPLE, "Decrypted should match original");
}

#[test]
fn test_57_byte_envelope_is_89_bytes() {
    let plaintext = [0x5Au8; 57];
    let sealed = encrypt(&plaintext).unwrap();
    assert_eq!(sealed.envelope.len(), 89);
    assert_eq!(decrypt(&sealed.envelope, &sealed.key).unwrap(), plaintext);
}

#[test]
fn test_empty_plaintext_roundtrip() {
    let sealed = encrypt(b"").expect("Empty input should encrypt");
    assert_eq!(sealed.envelope.len(), HEADER_LEN + TAG_LEN);

    let decrypted = decrypt(&sealed.envelope, &sealed.key).unwrap();
    assert!(decrypted.is_empty());
}

#[test]
fn test_roundtrip_various_sizes() {
    for size in [1usize, 15, 16, 17, 255, 4096, 100_000] {
        let plaintext: Vec<u8> = (0..size).map(|i| (i * 31 % 256) as u8).collect();
        let sealed = encrypt(&plaintext).unwrap();
        let decrypted = decrypt(&sealed.envelope, &sealed.key).unwrap();
        assert_eq!(decrypted, plaintext, "Roundtrip failed for size {}", size);
    }
}

#[test]
fn test_envelope_starts_with_marker() {
    let sealed = encrypt(b"marker check").unwrap();
    assert_eq!(&sealed.envelope[..4], b"SFT1");
}

#[test]
fn test_same_plaintext_encrypts_differently() {
    let a = encrypt(SAMPLE).unwrap();
    let b = encrypt(SAMPLE).unwrap();

    assert_ne!(a.key, b.key, "Each call should get a fresh key");
    assert_ne!(
        &a.envelope[MAGIC.len()..HEADER_LEN],
        &b.envelope[MAGIC.len()..HEADER_LEN],
        "Each call should get a fresh nonce"
    );
    assert_ne!(a.envelope, b.envelope, "Ciphertext should differ");
}

#[test]
fn test_same_key_fresh_nonce() {
    let key = generate_key().unwrap();
    let a = encrypt_with_key(&key, SAMPLE).unwrap();
    let b = encrypt_with_key(&key, SAMPLE).unwrap();

    assert_ne!(&a[4..16], &b[4..16], "Nonce must not repeat under one key");
    assert_ne!(a, b);
    assert_eq!(decrypt_with_key(&a, &key).unwrap(), SAMPLE);
    assert_eq!(decrypt_with_key(&b, &key).unwrap(), SAMPLE);
}

#[test]
fn test_every_bit_flip_is_detected() {
    let sealed = encrypt(b"tamper evident payload").unwrap();

    // ciphertext and tag region only; header flips are covered elsewhere
    for byte in HEADER_LEN..sealed.envelope.len() {
        for bit in 0..8 {
            let mut tampered = sealed.envelope.clone();
            tampered[byte] ^= 1 << bit;

            let result = decrypt(&tampered, &sealed.key);
            assert!(
                matches!(result, Err(CryptoError::AuthenticationFailed)),
                "Flip at byte {} bit {} was not detected",
                byte,
                bit
            );
        }
    }
}

#[test]
fn test_nonce_tamper_fails_authentication() {
    let sealed = encrypt(SAMPLE).unwrap();
    let mut tampered = sealed.envelope.clone();
    tampered[MAGIC.len()] ^= 0x01;

    assert!(matches!(
        decrypt(&tampered, &sealed.key),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn test_wrong_key_fails_decryption() {
    let sealed = encrypt(b"secret data").unwrap();
    let other = encode_key(&generate_key().unwrap());

    let result = decrypt(&sealed.envelope, &other);
    assert!(
        matches!(result, Err(CryptoError::AuthenticationFailed)),
        "Decryption with wrong key should fail"
    );
}

#[test]
fn test_marker_mismatch_rejected_before_key_is_read() {
    let sealed = encrypt(SAMPLE).unwrap();
    let mut tampered = sealed.envelope.clone();
    tampered[0] = b'X';

    // A garbage key would be MalformedKey, the marker check has to win
    let result = decrypt(&tampered, "not a key");
    assert!(matches!(result, Err(CryptoError::FormatMismatch)));

    let result = decrypt(&tampered, &sealed.key);
    assert!(matches!(result, Err(CryptoError::FormatMismatch)));
}

#[test]
fn test_truncated_container() {
    let sealed = encrypt(SAMPLE).unwrap();

    for len in [0, 3, 4, 15] {
        let result = decrypt(&sealed.envelope[..len], &sealed.key);
        assert!(
            matches!(
                result,
                Err(CryptoError::TruncatedContainer { expected: 16, got }) if got == len
            ),
            "Length {} should be truncated",
            len
        );
    }
}

#[test]
fn test_header_only_envelope_fails_authentication() {
    let sealed = encrypt(SAMPLE).unwrap();
    let result = decrypt(&sealed.envelope[..HEADER_LEN], &sealed.key);
    assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
}

#[test]
fn test_malformed_key_on_decrypt() {
    let sealed = encrypt(SAMPLE).unwrap();
    let result = decrypt(&sealed.envelope, "invalid!@#$");
    assert!(matches!(result, Err(CryptoError::MalformedKey)));
}

#[test]
fn test_key_text_roundtrip() {
    for _ in 0..32 {
        let key = generate_key().unwrap();
        let text = encode_key(&key);

        assert!(
            text.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "Key text should be url safe: {}",
            text
        );

        let decoded = decode_key(&text).expect("Should decode successfully");
        assert_eq!(key.as_bytes(), decoded.as_bytes());
    }
}

#[test]
fn test_fixed_key_roundtrip() {
    let mut raw = [0u8; KEY_LEN];
    for (i, b) in raw.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(37).wrapping_add(0xF0);
    }
    let key = EncryptionKey::from_bytes(raw);
    let decoded = EncryptionKey::decode(&key.encode()).unwrap();
    assert_eq!(decoded.as_bytes(), &raw);
}

#[test]
fn test_invalid_key_text() {
    let cases = [
        "invalid!@#$",
        // standard alphabet, not url safe
        "+/+/+/+/+/+/+/+/+/+/+/+/+/+/+/+/+/+/+/+/+/8",
        // whitespace
        " AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA\n",
        "",
    ];
    for text in cases {
        assert!(
            matches!(decode_key(text), Err(CryptoError::MalformedKey)),
            "{:?} should be rejected",
            text
        );
    }
}

#[test]
fn test_wrong_length_key_text() {
    // "abc", 3 bytes
    assert!(matches!(
        decode_key("YWJj"),
        Err(CryptoError::MalformedKey)
    ));

    // 33 zero bytes
    let long = "A".repeat(44);
    assert!(matches!(decode_key(&long), Err(CryptoError::MalformedKey)));
}
