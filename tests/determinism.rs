//! Determinism guarantees for the normalize + fingerprint pipeline.
//!
//! Authoring clients and the server both fingerprint content; these tests
//! pin down that equal inputs always produce equal hashes and token sets,
//! across runs and across equivalent spellings.

use itemdup::{
    fingerprint_text, hash_text, normalize, FingerprintConfig, NormalizeConfig, MAX_TOKENS,
};

fn defaults() -> (NormalizeConfig, FingerprintConfig) {
    (NormalizeConfig::default(), FingerprintConfig::default())
}

#[test]
fn equivalent_author_inputs_share_a_hash() {
    let (normalize_cfg, fingerprint_cfg) = defaults();

    // The same question as different authors might actually type it.
    let variants = [
        "ما هو ناتج ٢ + ٣",    // clean form
        "ما هو ناتج ٢ + ٣؟",   // trailing question mark
        "مَا هُوَ نَاتِجُ ٢ + ٣",  // diacritics
        "ما هو ناتج 2 + 3",    // Western digits
        "ما  هو   ناتج ٢ + ٣", // sloppy whitespace
        "ما هو ناتج ٢+٣",      // compact equation spacing
    ];

    let hashes: Vec<String> = variants
        .iter()
        .map(|v| {
            fingerprint_text(v, &normalize_cfg, &fingerprint_cfg)
                .expect("fingerprint")
                .content_hash
        })
        .collect();

    for (i, hash) in hashes.iter().enumerate().skip(1) {
        assert_eq!(
            &hashes[0], hash,
            "variant {i} ({:?}) produced a different hash",
            variants[i],
        );
    }
}

#[test]
fn content_hash_format_is_stable() {
    let (normalize_cfg, fingerprint_cfg) = defaults();

    // Pinned digest: changing normalization or hashing behavior without
    // bumping the version would silently orphan every stored fingerprint.
    let fp = fingerprint_text("ما هو ناتج ٢ + ٣؟", &normalize_cfg, &fingerprint_cfg)
        .expect("fingerprint");
    assert_eq!(
        fp.content_hash,
        "29ec7e97d848418ea656cb2f0f01ca8074498bbe3991e80bccbfe83476442994"
    );

    let v2 = fingerprint_text(
        "ما هو ناتج ٢ + ٣؟",
        &normalize_cfg,
        &FingerprintConfig::default().with_version(2),
    )
    .expect("fingerprint");
    assert_eq!(
        v2.content_hash,
        "57775913f6be7e0e94d7556b5355ecad3f82277adb5ec1e3a58711b5d083519f"
    );

    // Diagnostic hash is plain SHA-256 over the raw bytes.
    assert_eq!(
        hash_text("hello world"),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
}

#[test]
fn normalization_is_idempotent() {
    let cfg = NormalizeConfig::default();

    let inputs = [
        "  مَدرسة   الأولاد  ",
        "٢س + ٥ = ١٣؟",
        "A  B\tC\nD",
        "اختر: (أ) أو [ب]",
        "Ωmega ΣUM 42",
        "ما هو ناتج ٢ + ٣",
    ];

    for input in inputs {
        let once = normalize(input, &cfg);
        let twice = normalize(&once, &cfg);
        assert_eq!(once, twice, "normalize is not idempotent for {input:?}");
    }
}

#[test]
fn token_extraction_is_deterministic_at_the_cap() {
    let (normalize_cfg, fingerprint_cfg) = defaults();

    // 800 distinct words produce well over the token cap.
    let words: Vec<String> = (0..800).map(|i| format!("كلمة{i}")).collect();
    let text = words.join(" ");

    let first = fingerprint_text(&text, &normalize_cfg, &fingerprint_cfg).expect("fingerprint");
    let second = fingerprint_text(&text, &normalize_cfg, &fingerprint_cfg).expect("fingerprint");

    assert_eq!(first.token_count(), MAX_TOKENS);
    assert_eq!(first.similarity_tokens, second.similarity_tokens);
    assert_eq!(first.content_hash, second.content_hash);
}

#[test]
fn version_bump_changes_hash_but_not_tokens() {
    let normalize_cfg = NormalizeConfig::default();
    let v1 = FingerprintConfig::default();
    let v2 = FingerprintConfig::default().with_version(2);

    let text = "اختر الإجابة الصحيحة من بين البدائل التالية";
    let a = fingerprint_text(text, &normalize_cfg, &v1).expect("fingerprint");
    let b = fingerprint_text(text, &normalize_cfg, &v2).expect("fingerprint");

    assert_ne!(a.content_hash, b.content_hash);
    assert_eq!(a.similarity_tokens, b.similarity_tokens);
    assert_eq!(a.normalized_content, b.normalized_content);
}

#[test]
fn disabled_stages_change_the_hash_partition() {
    let fingerprint_cfg = FingerprintConfig::default();

    let full = NormalizeConfig::default();
    let no_digits = NormalizeConfig::default().with_unify_digits(false);

    let western = "ما هو ناتج 2 + 3";
    let eastern = "ما هو ناتج ٢ + ٣";

    let unified = fingerprint_text(western, &full, &fingerprint_cfg).expect("fingerprint");
    let eastern_fp = fingerprint_text(eastern, &full, &fingerprint_cfg).expect("fingerprint");
    assert_eq!(unified.content_hash, eastern_fp.content_hash);

    let raw_digits = fingerprint_text(western, &no_digits, &fingerprint_cfg).expect("fingerprint");
    assert_ne!(raw_digits.content_hash, eastern_fp.content_hash);
}
