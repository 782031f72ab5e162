use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use p384::ecdsa::signature::hazmat::PrehashVerifier;
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::crypto::{generate_ecc_key_pair, generate_rsa_key_pair, PublicKey, Signer};
use crate::device::SignatureDevice;
use crate::errors::{DeviceError, ErrorClass};
use crate::repository::InMemoryDeviceRepository;
use crate::service::DeviceService;
use crate::traits::DeviceRepository;
use crate::types::Algorithm;

/// Verify a signature the way an external auditor would: SHA-256 digest, then
/// the algorithm's standard verification routine.
fn verify_signature(public_key: &PublicKey, data: &[u8], signature: &[u8]) -> bool {
    let digest = Sha256::digest(data);
    match public_key {
        PublicKey::Rsa(pk) => pk
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
            .is_ok(),
        PublicKey::Ecc(vk) => match p384::ecdsa::Signature::from_der(signature) {
            Ok(sig) => vk.verify_prehash(&digest, &sig).is_ok(),
            Err(_) => false,
        },
    }
}

/// Small ECC device for tests; RSA generation at test sizes is covered
/// separately.
fn ecc_device() -> SignatureDevice {
    let key_pair = generate_ecc_key_pair().expect("ECC key generation");
    SignatureDevice::new(Uuid::new_v4(), Some("test".into()), Algorithm::Ecc, key_pair)
        .expect("device construction")
}

fn service() -> DeviceService {
    DeviceService::new(Arc::new(InMemoryDeviceRepository::new()))
}

#[test]
fn rsa_generator_produces_requested_modulus() {
    let key_pair = generate_rsa_key_pair(512).expect("RSA key generation");
    match &key_pair.public {
        PublicKey::Rsa(pk) => assert_eq!(pk.n().bits(), 512),
        PublicKey::Ecc(_) => panic!("expected an RSA key pair"),
    }
}

#[test]
fn ecc_generator_produces_p384_keys() {
    let key_pair = generate_ecc_key_pair().expect("ECC key generation");
    match &key_pair.public {
        // Uncompressed SEC1 point on P-384: 1 + 2 * 48 bytes.
        PublicKey::Ecc(vk) => assert_eq!(vk.to_encoded_point(false).as_bytes().len(), 97),
        PublicKey::Rsa(_) => panic!("expected an ECC key pair"),
    }
}

#[test]
fn rsa_signer_round_trip() {
    let key_pair = generate_rsa_key_pair(512).expect("RSA key generation");
    let public = key_pair.public.clone();
    let signer = Signer::signer_for(Algorithm::Rsa, key_pair.private).expect("RSA signer");

    let data = b"Test data for RSA signing";
    let signature = signer.sign(data).expect("RSA sign");
    assert!(verify_signature(&public, data, &signature));
}

#[test]
fn ecc_signer_round_trip() {
    let key_pair = generate_ecc_key_pair().expect("ECC key generation");
    let public = key_pair.public.clone();
    let signer = Signer::signer_for(Algorithm::Ecc, key_pair.private).expect("ECC signer");

    let data = b"Test data for ECC signing";
    let signature = signer.sign(data).expect("ECC sign");
    assert!(verify_signature(&public, data, &signature));
}

#[test]
fn signer_for_rejects_mismatched_key() {
    let key_pair = generate_ecc_key_pair().expect("ECC key generation");
    let result = Signer::signer_for(Algorithm::Rsa, key_pair.private);
    assert!(matches!(result, Err(DeviceError::UnsupportedKey)));
}

#[test]
fn first_envelope_chains_to_device_id() {
    let device = ecc_device();
    let (secured_data, signature) = device.sign("hello").expect("first sign");

    let expected = format!("0_hello_{}", B64.encode(device.id().to_string().as_bytes()));
    assert_eq!(secured_data, expected);
    assert!(verify_signature(device.public_key(), secured_data.as_bytes(), &signature));
    assert_eq!(device.signature_counter(), 1);
    assert_eq!(device.last_signature(), Some(signature));
}

#[test]
fn later_envelopes_chain_to_previous_signature() {
    let device = ecc_device();
    let (_, first_signature) = device.sign("hello").expect("first sign");
    let (secured_data, second_signature) = device.sign("hello").expect("second sign");

    let expected = format!("1_hello_{}", B64.encode(&first_signature));
    assert_eq!(secured_data, expected);
    assert!(verify_signature(device.public_key(), secured_data.as_bytes(), &second_signature));
    assert_eq!(device.signature_counter(), 2);
    assert_eq!(device.last_signature(), Some(second_signature));
}

#[test]
fn rsa_device_signs_verifiable_chain_links() {
    let key_pair = generate_rsa_key_pair(512).expect("RSA key generation");
    let device = SignatureDevice::new(Uuid::new_v4(), Some("T".into()), Algorithm::Rsa, key_pair)
        .expect("device construction");

    let (first_data, first_signature) = device.sign("hello").expect("first sign");
    assert_eq!(
        first_data,
        format!("0_hello_{}", B64.encode(device.id().to_string().as_bytes()))
    );
    assert!(verify_signature(device.public_key(), first_data.as_bytes(), &first_signature));

    let (second_data, second_signature) = device.sign("hello").expect("second sign");
    assert_eq!(second_data, format!("1_hello_{}", B64.encode(&first_signature)));
    assert!(verify_signature(device.public_key(), second_data.as_bytes(), &second_signature));
    assert_eq!(device.signature_counter(), 2);
}

#[test]
fn payload_is_embedded_verbatim() {
    // Underscores in the payload are not escaped; the envelope layout is
    // still unambiguous because counter and suffix have restricted alphabets.
    let device = ecc_device();
    let (secured_data, _) = device.sign("a_b_c").expect("sign");
    assert!(secured_data.starts_with("0_a_b_c_"));
}

#[test]
fn failed_signing_leaves_the_chain_untouched() {
    // A 256-bit modulus is too small to carry a PKCS#1 v1.5 SHA-256
    // signature, so the signer itself errors.
    let key_pair = generate_rsa_key_pair(256).expect("RSA key generation");
    let device = SignatureDevice::new(Uuid::new_v4(), None, Algorithm::Rsa, key_pair)
        .expect("device construction");

    let result = device.sign("hello");
    assert!(matches!(result, Err(DeviceError::SigningFailed(_))));
    assert_eq!(device.signature_counter(), 0);
    assert_eq!(device.last_signature(), None);
}

#[test]
fn create_device_rejects_unsupported_algorithms() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let service = DeviceService::new(Arc::clone(&repository) as Arc<dyn DeviceRepository>);

    let err = service.create_device("AES", None).expect_err("AES must be rejected");
    assert_eq!(err, DeviceError::UnsupportedAlgorithm("AES".into()));
    assert_eq!(err.to_string(), "Unsupported algorithm AES");
    assert_eq!(err.class(), ErrorClass::BadRequest);

    let err = service.create_device("", None).expect_err("empty algorithm must be rejected");
    assert_eq!(err.to_string(), "Unsupported algorithm ");

    // Rejected creations never mutate the repository.
    assert!(repository.get_all().expect("get_all").is_empty());
}

#[test]
fn create_and_list_devices() {
    let service = service();
    let rsa = service.create_device("RSA", Some("T".into())).expect("create RSA device");
    let ecc = service.create_device("ECC", None).expect("create ECC device");

    assert_eq!(rsa.algorithm(), Algorithm::Rsa);
    assert_eq!(rsa.label(), Some("T"));
    assert_eq!(ecc.algorithm(), Algorithm::Ecc);
    assert_eq!(ecc.label(), None);

    let devices = service.list_devices().expect("list devices");
    assert_eq!(devices.len(), 2);
    let ids: Vec<String> = devices.iter().map(|d| d.id().to_string()).collect();
    assert!(ids.contains(&rsa.id().to_string()));
    assert!(ids.contains(&ecc.id().to_string()));

    let fetched = service.get_device(&rsa.id().to_string()).expect("device present");
    assert_eq!(fetched.signature_counter(), 0);
}

#[test]
fn sign_transaction_chains_and_persists() {
    let service = service();
    let device = service.create_device("ECC", None).expect("create device");
    let id = device.id().to_string();

    let (signed_data, signature) = service.sign_transaction(&id, "tx-1").expect("first sign");
    assert_eq!(signed_data, format!("0_tx-1_{}", B64.encode(id.as_bytes())));
    let raw = B64.decode(signature.as_bytes()).expect("signature base64");
    assert!(verify_signature(device.public_key(), signed_data.as_bytes(), &raw));

    let (signed_data, _) = service.sign_transaction(&id, "tx-2").expect("second sign");
    assert_eq!(signed_data, format!("1_tx-2_{}", B64.encode(&raw)));
    assert_eq!(device.signature_counter(), 2);
}

#[test]
fn sign_transaction_unknown_device() {
    let service = service();
    let err = service.sign_transaction("no-such-device", "x").expect_err("unknown id");
    assert_eq!(err, DeviceError::DeviceNotFound("no-such-device".into()));
    assert_eq!(err.class(), ErrorClass::NotFound);
}

#[test]
fn concurrent_signs_produce_gapless_counters() {
    let service = Arc::new(service());
    let device = service.create_device("ECC", None).expect("create device");
    let id = device.id().to_string();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = Arc::clone(&service);
            let id = id.clone();
            thread::spawn(move || service.sign_transaction(&id, "hello").expect("parallel sign"))
        })
        .collect();

    let mut counters = BTreeSet::new();
    for handle in handles {
        let (signed_data, signature) = handle.join().expect("thread join");
        let counter: u64 = signed_data
            .split('_')
            .next()
            .expect("counter prefix")
            .parse()
            .expect("decimal counter");
        counters.insert(counter);

        let raw = B64.decode(signature.as_bytes()).expect("signature base64");
        assert!(verify_signature(device.public_key(), signed_data.as_bytes(), &raw));
    }

    // No duplicates, no gaps.
    assert_eq!(counters, (0..10).collect::<BTreeSet<u64>>());
    assert_eq!(device.signature_counter(), 10);
}

#[test]
fn repository_rejects_duplicate_ids_and_unknown_updates() {
    let repository = InMemoryDeviceRepository::new();
    let device = Arc::new(ecc_device());
    let id = device.id().to_string();

    repository.save(&id, Arc::clone(&device)).expect("first save");
    let err = repository.save(&id, Arc::clone(&device)).expect_err("duplicate save");
    assert_eq!(err, DeviceError::DeviceAlreadyExists(id.clone()));
    assert_eq!(err.class(), ErrorClass::Internal);

    let orphan = Arc::new(ecc_device());
    let err = repository.update(&orphan).expect_err("update of unknown device");
    assert_eq!(err, DeviceError::DeviceNotFound(orphan.id().to_string()));
}

#[test]
fn algorithm_parsing_round_trips() {
    assert_eq!("RSA".parse::<Algorithm>().expect("RSA parses"), Algorithm::Rsa);
    assert_eq!("ECC".parse::<Algorithm>().expect("ECC parses"), Algorithm::Ecc);
    assert_eq!(Algorithm::Rsa.to_string(), "RSA");
    assert_eq!(Algorithm::Ecc.to_string(), "ECC");
    assert!("rsa".parse::<Algorithm>().is_err());
}
