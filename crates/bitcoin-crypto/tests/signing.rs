use bitcoin_crypto::hash::{double_sha256, sha256};
use bitcoin_crypto::random::random_bytes_with_stretching;
use bitcoin_crypto::{CryptoError, DerSignature, EcKeyPair, KeyConfig};

/// Deterministic-nonce vectors: (private key, message, DER signature over sha256(message))
const SIGNING_VECTORS: [(&str, &str, &str); 4] = [
    (
        "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
        "sample",
        "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
    ),
    (
        "0000000000000000000000000000000000000000000000000000000000000001",
        "Satoshi Nakamoto",
        "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
    ),
    (
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
        "Satoshi Nakamoto",
        "3045022100fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d002206b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
    ),
    (
        "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
        "Alan Turing",
        "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
    ),
];

#[test]
fn test_known_signatures() {
    for (key_hex, msg, expected) in SIGNING_VECTORS {
        let keypair = EcKeyPair::from_private_key(&hex::decode(key_hex).unwrap(), true).unwrap();
        let digest = sha256(msg.as_bytes());

        let signature = keypair.sign(digest.as_bytes()).unwrap();
        assert_eq!(hex::encode(&signature), expected, "message '{}'", msg);
        assert!(keypair.verify(digest.as_bytes(), &signature).unwrap());
    }
}

#[test]
fn test_known_signatures_verify_against_uncompressed_key() {
    for (key_hex, msg, expected) in SIGNING_VECTORS {
        let public_key =
            EcKeyPair::public_key_from_private_key(&hex::decode(key_hex).unwrap(), false).unwrap();
        assert_eq!(public_key.as_bytes().len(), 65);
        let digest = sha256(msg.as_bytes());
        let signature = hex::decode(expected).unwrap();
        assert!(
            EcKeyPair::verify_with_public_key(digest.as_bytes(), &signature, public_key.as_bytes())
                .unwrap()
        );
    }
}

#[test]
fn test_signature_over_wrong_digest_fails() {
    let (key_hex, _, expected) = SIGNING_VECTORS[1];
    let keypair = EcKeyPair::from_private_key(&hex::decode(key_hex).unwrap(), true).unwrap();
    let signature = hex::decode(expected).unwrap();
    let other = sha256(b"Satoshi Nakamoto.");
    assert!(!keypair.verify(other.as_bytes(), &signature).unwrap());
}

#[test]
fn test_single_byte_tampering_never_verifies() {
    let keypair = EcKeyPair::generate().unwrap();
    let digest = double_sha256(b"spend output 0 of some transaction");
    let signature = keypair.sign(digest.as_bytes()).unwrap();

    for i in 0..signature.len() {
        for flip in [0x01u8, 0x80] {
            let mut tampered = signature.clone();
            tampered[i] ^= flip;
            match keypair.verify(digest.as_bytes(), &tampered) {
                Ok(valid) => assert!(!valid, "byte {} flip {:#04x} still verified", i, flip),
                Err(CryptoError::InvalidSignature(_)) => {}
                Err(e) => panic!("unexpected error {:?}", e),
            }
        }
    }
}

#[test]
fn test_repadded_signature_is_rejected() {
    let keypair = EcKeyPair::generate().unwrap();
    let digest = double_sha256(b"malleable");
    let der = keypair.sign(digest.as_bytes()).unwrap();

    // Prefix an extra 0x00 to the encoded r integer
    let r_len = der[3] as usize;
    let mut body = vec![0x02, (r_len + 1) as u8, 0x00];
    body.extend_from_slice(&der[4..4 + r_len]);
    body.extend_from_slice(&der[4 + r_len..]);
    let mut padded = vec![0x30, body.len() as u8];
    padded.extend_from_slice(&body);

    assert!(matches!(
        keypair.verify(digest.as_bytes(), &padded),
        Err(CryptoError::InvalidSignature(_))
    ));
    assert!(keypair.verify(digest.as_bytes(), &der).unwrap());
}

#[test]
fn test_signature_reencodes_identically() {
    let keypair = EcKeyPair::generate().unwrap();
    for i in 0u8..16 {
        let digest = double_sha256(&[i]);
        let der = keypair.sign(digest.as_bytes()).unwrap();
        let parsed = DerSignature::from_der(&der).unwrap();
        assert_eq!(parsed.to_der(), der);
        assert!(parsed.r().len() <= 32 && parsed.s().len() <= 32);
    }
}

#[test]
fn test_shared_keypair_signs_from_many_threads() {
    let keypair = std::sync::Arc::new(EcKeyPair::generate().unwrap());
    let handles: Vec<_> = (0u8..8)
        .map(|i| {
            let keypair = std::sync::Arc::clone(&keypair);
            std::thread::spawn(move || {
                let digest = double_sha256(&[i; 10]);
                let sig = keypair.sign(digest.as_bytes()).unwrap();
                keypair.verify(digest.as_bytes(), &sig).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_hardened_random_bytes_as_private_key() {
    let keypair = loop {
        let material = random_bytes_with_stretching(32, 0).unwrap();
        if let Ok(keypair) = EcKeyPair::from_private_key(&material, true) {
            break keypair;
        }
    };
    let digest = double_sha256(b"hardened");
    let sig = keypair.sign(digest.as_bytes()).unwrap();
    assert!(keypair.verify(digest.as_bytes(), &sig).unwrap());
    assert_eq!(keypair.private_key_bytes().len(), 32);
}

#[test]
fn test_uncompressed_keys_from_config() {
    let config = KeyConfig {
        compressed_public_keys: false,
    };
    let keypair = EcKeyPair::generate_with_config(&config).unwrap();
    assert!(!keypair.is_compressed());
    assert_eq!(keypair.public_key().as_bytes()[0], 0x04);

    let compressed = keypair.public_key().to_compressed().unwrap();
    let reimported = EcKeyPair::from_private_key(&keypair.private_key_bytes(), true).unwrap();
    assert_eq!(&compressed, reimported.public_key());
}
