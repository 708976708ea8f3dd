//! Property-based end-to-end tests over a full [`Session`].

use ethernity_app::{AuthStatus, Session};
use ethernity_crypto::digest::blake2b_256;
use ethernity_harness::{auth_frame_text, build_age_container, build_envelope, main_frame_pair, signing_key};
use proptest::prelude::*;

fn scenario_text(doc_id: [u8; 16], seed: u64) -> (String, String) {
    let files: Vec<(&str, &[u8])> = vec![("a.txt", b"alpha"), ("b.txt", b"beta")];
    let envelope = build_envelope(&files, true, None);
    let ciphertext = build_age_container(b"correct horse", 10, &envelope);
    let doc_hash = blake2b_256(&ciphertext);
    let key = signing_key(seed);
    let (f0, f1) = main_frame_pair(doc_id, &ciphertext);
    (format!("{f0}\n{f1}"), auth_frame_text(doc_id, &key, doc_hash))
}

proptest! {
    /// Replaying the same main+auth batch N times yields the same observable
    /// state as applying it once, and the repeats are counted as duplicates.
    #[test]
    fn repeated_ingestion_is_idempotent(repeats in 1u32..5, seed in any::<u64>()) {
        let doc_id = [0x77u8; 16];
        let (main_text, auth_text) = scenario_text(doc_id, seed);

        let mut session = Session::new();
        let mut total_duplicates = 0u32;
        for i in 0..repeats {
            let main_added = session.ingest_main(&main_text);
            let auth_added = session.ingest_auth(&auth_text);
            if i > 0 {
                total_duplicates += main_added.duplicates + auth_added.duplicates;
            }
        }

        prop_assert!(total_duplicates >= repeats.saturating_sub(1) * 2);
        prop_assert_eq!(session.snapshot().auth_status, AuthStatus::Verified);

        let mut once = Session::new();
        once.ingest_main(&main_text);
        once.ingest_auth(&auth_text);

        prop_assert_eq!(session.reassemble_ciphertext().unwrap(), once.reassemble_ciphertext().unwrap());
        prop_assert_eq!(session.snapshot().auth_status, once.snapshot().auth_status);
    }
}
