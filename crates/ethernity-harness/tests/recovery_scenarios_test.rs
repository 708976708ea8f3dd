//! The six literal end-to-end recovery scenarios.

use ed25519_dalek::Signer;
use ethernity_app::{AuthStatus, Session, SessionConfig, SessionError};
use ethernity_core::constants::FRAME_VERSION;
use ethernity_core::frame::{Frame, FrameType, encode_frame};
use ethernity_core::{AuthPayload, encode_auth_payload};
use ethernity_crypto::digest::blake2b_256;
use ethernity_crypto::signature::auth_transcript;
use ethernity_harness::{
    auth_frame_text, build_age_container, build_envelope, frame_text, main_frame_pair,
    main_frame_text, shard_frame_texts, signing_key,
};

const PASSPHRASE: &str = "correct horse";

fn happy_path_ciphertext() -> Vec<u8> {
    let files: Vec<(&str, &[u8])> =
        vec![("notes.txt", b"first recovered file"), ("keys.json", b"{\"seed\":\"redacted\"}"), ("photo.bin", &[0xAB; 256])];
    let envelope = build_envelope(&files, true, None);
    build_age_container(PASSPHRASE.as_bytes(), 10, &envelope)
}

#[test]
fn happy_path_passphrase_recovers_three_files() {
    let doc_id = [0x01; 16];
    let key = signing_key(1);
    let ciphertext = happy_path_ciphertext();
    let doc_hash = blake2b_256(&ciphertext);
    let (f0, f1) = main_frame_pair(doc_id, &ciphertext);

    let mut session = Session::new();
    session.ingest_main(&format!("{f0}\n{f1}"));
    session.ingest_auth(&auth_frame_text(doc_id, &key, doc_hash));
    assert_eq!(session.snapshot().auth_status, AuthStatus::Verified);

    session.set_passphrase(PASSPHRASE);
    session.decrypt().unwrap();
    let files = session.extract().unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(session.snapshot().extracted_file_count, 3);
}

#[test]
fn shard_recovery_reconstructs_truncated_passphrase() {
    let doc_id = [0x02; 16];
    let key = signing_key(2);
    let full_secret = b"hunter2hunter";
    let secret_len = 12;
    let expected_secret = &full_secret[..secret_len];
    let doc_hash = [0x99u8; 32];

    let shards = shard_frame_texts(
        doc_id,
        &key,
        ethernity_core::KeyType::Passphrase,
        &full_secret[..secret_len],
        3,
        5,
        doc_hash,
        42,
    );

    let mut session = Session::new();
    for (index, text) in &shards {
        if [1u8, 2, 4].contains(index) {
            session.ingest_shards(text);
        }
    }

    session.combine_shards().unwrap();
    assert!(session.snapshot().passphrase_known);

    // The recovered secret decrypts a container sealed with it, confirming
    // the bytes (not just the presence of a passphrase) are correct.
    let plaintext = b"shard-recovered payload";
    let ciphertext = build_age_container(expected_secret, 10, plaintext);
    let (f0, f1) = main_frame_pair(doc_id, &ciphertext);
    session.ingest_main(&format!("{f0}\n{f1}"));
    let decrypted = session.decrypt().unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn surplus_shards_above_threshold_recover_the_same_secret_regardless_of_ingestion_order() {
    let doc_id = [0x08; 16];
    let key = signing_key(8);
    let full_secret = b"hunter2hunter";
    let secret_len = 12;
    let expected_secret = &full_secret[..secret_len];
    let doc_hash = [0x88u8; 32];

    let shards = shard_frame_texts(
        doc_id,
        &key,
        ethernity_core::KeyType::Passphrase,
        &full_secret[..secret_len],
        3,
        5,
        doc_hash,
        43,
    );

    // Four of five shares ingested, one more than the threshold of three, in
    // ascending-index order for the first session and descending for the
    // second: `combine` must pick the same lowest-indexed three shares
    // either way, so both sessions recover byte-identical secrets.
    let mut ascending = shards.clone();
    ascending.sort_by_key(|(index, _)| *index);
    let mut descending = ascending.clone();
    descending.reverse();

    let build = |ordered: &[(u8, String)]| {
        let mut session = Session::new();
        for (index, text) in ordered {
            if *index != 5 {
                session.ingest_shards(text);
            }
        }
        session.combine_shards().unwrap();
        session
    };

    let mut session_a = build(&ascending);
    let mut session_b = build(&descending);

    let ciphertext = build_age_container(expected_secret, 10, b"surplus shard payload");
    let (f0, f1) = main_frame_pair(doc_id, &ciphertext);
    session_a.ingest_main(&format!("{f0}\n{f1}"));
    session_b.ingest_main(&format!("{f0}\n{f1}"));

    let decrypted_a = session_a.decrypt().unwrap().to_vec();
    let decrypted_b = session_b.decrypt().unwrap().to_vec();
    assert_eq!(decrypted_a, decrypted_b);
    assert_eq!(decrypted_a, b"surplus shard payload");
}

#[test]
fn conflicting_redelivery_of_a_main_frame_is_counted_and_ignored() {
    let doc_id = [0x03; 16];
    let original = main_frame_text(doc_id, 0, 2, b"original payload");
    let mut session = Session::new();
    let first = session.ingest_main(&original);
    assert_eq!(first.added, 1);

    let mut tampered_data = b"original payload".to_vec();
    tampered_data[0] ^= 0xFF;
    let corrupted = main_frame_text(doc_id, 0, 2, &tampered_data);
    let second = session.ingest_main(&corrupted);
    assert_eq!(second.conflicts, 1);

    let closing = main_frame_text(doc_id, 1, 2, b"second chunk");
    session.ingest_main(&closing);
    assert_eq!(session.reassemble_ciphertext().unwrap(), b"original payloadsecond chunk");
}

#[test]
fn crc_tampered_frame_is_an_error_and_leaves_the_store_unchanged() {
    let doc_id = [0x04; 16];
    let text = main_frame_text(doc_id, 0, 1, b"payload");
    let mut bytes = ethernity_codecs::decode_base64(&text).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let tampered_text = ethernity_codecs::encode_base64(&bytes);

    let mut session = Session::new();
    let added = session.ingest_main(&tampered_text);
    assert_eq!(added.errors, 1);
    assert_eq!(session.snapshot().main_frame_count, 0);
}

#[test]
fn wrong_passphrase_is_an_error_and_does_not_clear_the_buffer() {
    let doc_id = [0x05; 16];
    let ciphertext = happy_path_ciphertext();
    let (f0, f1) = main_frame_pair(doc_id, &ciphertext);

    let mut session = Session::new();
    session.ingest_main(&format!("{f0}\n{f1}"));
    session.set_passphrase("wrong");

    let result = session.decrypt();
    assert!(matches!(result, Err(SessionError::Age(_))));
    assert!(session.snapshot().passphrase_known);
    assert!(!session.snapshot().decrypted);
}

#[test]
fn invalid_signature_does_not_block_decryption() {
    let doc_id = [0x06; 16];
    let key = signing_key(6);
    let ciphertext = happy_path_ciphertext();
    let doc_hash = blake2b_256(&ciphertext);
    let (f0, f1) = main_frame_pair(doc_id, &ciphertext);

    let sign_pub = key.verifying_key().to_bytes();
    let transcript = auth_transcript(1, &doc_hash, &sign_pub);
    let mut signature = key.sign(&transcript).to_bytes();
    signature[0] ^= 0x01;
    let payload = AuthPayload { version: 1, doc_hash, sign_pub, signature };
    let frame = Frame {
        version: FRAME_VERSION as u8,
        frame_type: FrameType::Auth,
        doc_id,
        index: 0,
        total: 1,
        data: encode_auth_payload(&payload),
    };
    let auth_text = frame_text(&encode_frame(&frame));

    let mut session = Session::new();
    session.ingest_main(&format!("{f0}\n{f1}"));
    session.ingest_auth(&auth_text);
    assert_eq!(session.snapshot().auth_status, AuthStatus::InvalidSignature);

    session.set_passphrase(PASSPHRASE);
    session.decrypt().unwrap();
    let files = session.extract().unwrap();
    assert_eq!(files.len(), 3);
}

#[test]
fn oversized_envelope_is_refused_before_extraction() {
    let doc_id = [0x07; 16];
    let files: Vec<(&str, &[u8])> = vec![("big.bin", &[0u8; 256])];
    let envelope = build_envelope(&files, true, None);
    let ciphertext = build_age_container(PASSPHRASE.as_bytes(), 10, &envelope);
    let (f0, f1) = main_frame_pair(doc_id, &ciphertext);

    let config = SessionConfig::new(20, 16 * 1024 * 1024, 64);
    let mut session = Session::with_config(config);
    session.ingest_main(&format!("{f0}\n{f1}"));
    session.set_passphrase(PASSPHRASE);

    assert!(matches!(session.decrypt(), Err(SessionError::EnvelopeTooLarge { .. })));
}
