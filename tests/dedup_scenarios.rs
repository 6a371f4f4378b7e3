//! End-to-end dedup flows over a live service, covering the authoring
//! scenarios the engine exists for: re-submitted equations, surface-variant
//! questions, paraphrases, and genuinely new content.

use itemdup::{AnalyzeOptions, DetectService, ItemdupConfig, StoreYamlConfig};

fn service() -> DetectService {
    ItemdupConfig::default()
        .build_service()
        .expect("in-memory service")
}

#[test]
fn equation_spacing_variants_collapse_to_one_identity() {
    let service = service();
    let opts = AnalyzeOptions::default();

    service
        .analyze("item-1", "٢س + ٥ = ١٣", &opts)
        .expect("first analyze");

    // The compact spelling is under the tokenization minimum: it still
    // stores a fingerprint and hash, but reports nothing.
    let compact = service
        .analyze("item-2", "٢س+٥=١٣", &opts)
        .expect("compact analyze");
    assert_eq!(compact.token_count, 0);
    assert!(compact.exact_duplicates.is_empty());
    assert!(compact.similar_items.is_empty());
    assert_eq!(compact.uniqueness_score, 100.0);

    // Re-submitting the spaced form finds both earlier items by hash.
    let report = service
        .analyze("item-3", "٢س + ٥ = ١٣", &opts)
        .expect("third analyze");
    assert_eq!(report.content_hash, compact.content_hash);
    assert_eq!(report.duplicate_count, 2);
    assert!(!report.is_unique);

    let ids: Vec<&str> = report
        .exact_duplicates
        .iter()
        .map(|m| m.item_id.as_str())
        .collect();
    assert_eq!(ids, vec!["item-1", "item-2"], "oldest first");

    // item-1 is already reported as exact; item-2 has no tokens. Nothing
    // is left for the similar list.
    assert!(report.similar_items.is_empty());
}

#[test]
fn diacritics_and_punctuation_variants_are_exact_duplicates() {
    let service = service();
    let opts = AnalyzeOptions::default();

    service
        .analyze("item-1", "ما عاصمة المملكة العربية السعودية؟", &opts)
        .expect("first analyze");

    let report = service
        .analyze(
            "item-2",
            "مَا عَاصِمَةُ المَمْلَكَةِ العَرَبِيَّةِ السُّعُودِيَّةِ",
            &opts,
        )
        .expect("second analyze");

    assert_eq!(report.duplicate_count, 1);
    assert_eq!(report.exact_duplicates.len(), 1);
    assert_eq!(report.exact_duplicates[0].item_id, "item-1");
    assert_eq!(report.exact_duplicates[0].similarity_score, 1.0);
    assert!(!report.is_unique);
    assert!(report.similar_items.is_empty());
    assert_eq!(report.uniqueness_score, 0.0);
}

#[test]
fn paraphrase_is_reported_as_similar_not_exact() {
    let service = service();

    service
        .analyze(
            "item-1",
            "احسب مساحة المربع الذي طول ضلعه خمسة سنتيمترات",
            &AnalyzeOptions::default(),
        )
        .expect("first analyze");
    service
        .analyze(
            "item-2",
            "متى انتهت الحرب العالمية الثانية",
            &AnalyzeOptions::default(),
        )
        .expect("second analyze");

    // One word changed out of seven: high overlap, but not hash-equal.
    let report = service
        .analyze(
            "item-3",
            "احسب مساحة المربع الذي طول ضلعه سبعة سنتيمترات",
            &AnalyzeOptions::default().with_threshold(0.7),
        )
        .expect("third analyze");

    assert!(report.exact_duplicates.is_empty());
    assert!(report.is_unique);
    assert_eq!(report.duplicate_count, 0);

    assert_eq!(report.similar_items.len(), 1);
    assert_eq!(report.similar_items[0].item_id, "item-1");
    assert_eq!(report.similar_items[0].similarity_score, 0.786);

    // One of two corpus neighbors overlaps above the uniqueness level.
    assert_eq!(report.uniqueness_score, 50.0);
}

#[test]
fn default_threshold_hides_borderline_matches_but_not_the_score() {
    let service = service();

    service
        .analyze(
            "item-1",
            "احسب مساحة المربع الذي طول ضلعه خمسة سنتيمترات",
            &AnalyzeOptions::default(),
        )
        .expect("first analyze");

    // 0.786 similarity sits under the 0.8 default reporting threshold.
    let report = service
        .analyze(
            "item-2",
            "احسب مساحة المربع الذي طول ضلعه سبعة سنتيمترات",
            &AnalyzeOptions::default(),
        )
        .expect("second analyze");

    assert!(report.similar_items.is_empty());
    // The uniqueness score still sees the overlap.
    assert_eq!(report.uniqueness_score, 0.0);
}

#[test]
fn unrelated_corpus_leaves_new_content_fully_unique() {
    let service = service();
    let opts = AnalyzeOptions::default();

    let corpus = [
        ("item-1", "ما عاصمة المملكة العربية السعودية"),
        ("item-2", "احسب مساحة المربع الذي طول ضلعه خمسة سنتيمترات"),
        ("item-3", "اذكر أركان الإسلام الخمسة بالترتيب"),
    ];
    for (id, text) in corpus {
        service.analyze(id, text, &opts).expect("seed analyze");
    }

    let report = service
        .analyze("item-4", "متى انتهت الحرب العالمية الثانية", &opts)
        .expect("probe analyze");

    assert!(report.is_unique);
    assert_eq!(report.uniqueness_score, 100.0);
    assert!(report.exact_duplicates.is_empty());
    assert!(report.similar_items.is_empty());
    assert_eq!(report.duplicate_count, 0);
}

#[test]
fn report_wire_shape_is_complete() {
    let service = service();
    let opts = AnalyzeOptions::default();

    service
        .analyze("item-1", "ما عاصمة المملكة العربية السعودية؟", &opts)
        .expect("first analyze");
    let report = service
        .analyze("item-2", "ما عاصمة المملكة العربية السعودية", &opts)
        .expect("second analyze");

    let value = serde_json::to_value(&report).expect("serialize report");
    let object = value.as_object().expect("report is a JSON object");
    assert_eq!(object.len(), 10);
    for key in [
        "item_id",
        "content_hash",
        "uniqueness_score",
        "token_count",
        "content_length",
        "is_unique",
        "duplicate_count",
        "content_preview",
        "exact_duplicates",
        "similar_items",
    ] {
        assert!(object.contains_key(key), "missing field {key}");
    }

    // Matches found through the live service carry content previews.
    let first_match = &value["exact_duplicates"][0];
    assert_eq!(first_match["item_id"], "item-1");
    assert_eq!(first_match["similarity_score"], 1.0);
    assert_eq!(
        first_match["preview"],
        "ما عاصمة المملكة العربية السعودية"
    );
}

#[test]
fn re_analyzing_an_item_never_matches_itself() {
    let service = service();
    let opts = AnalyzeOptions::default();

    service
        .analyze("item-1", "اختر الإجابة الصحيحة من بين البدائل التالية", &opts)
        .expect("first analyze");

    // Same id, same content: the stored record is replaced, not duplicated.
    let report = service
        .analyze("item-1", "اختر الإجابة الصحيحة من بين البدائل التالية", &opts)
        .expect("re-analyze");

    assert!(report.is_unique);
    assert_eq!(report.duplicate_count, 0);
    assert!(report.exact_duplicates.is_empty());
    assert!(report.similar_items.is_empty());
    assert_eq!(service.corpus_len(), 1);
}

#[cfg(feature = "backend-redb")]
#[test]
fn duplicates_survive_a_service_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir
        .path()
        .join("fingerprints.redb")
        .to_string_lossy()
        .into_owned();

    let config = ItemdupConfig {
        store: StoreYamlConfig {
            backend: "redb".into(),
            path: Some(db_path),
            ..Default::default()
        },
        ..Default::default()
    };

    {
        let service = config.build_service().expect("first service");
        service
            .analyze("item-1", "ما عاصمة المملكة العربية السعودية؟", &AnalyzeOptions::default())
            .expect("seed analyze");
        assert_eq!(service.corpus_len(), 1);
    }

    // A fresh process over the same database file sees the old corpus.
    let service = config.build_service().expect("second service");
    assert_eq!(service.corpus_len(), 1);

    let report = service
        .analyze(
            "item-2",
            "ما عاصمة المملكة العربية السعودية",
            &AnalyzeOptions::default(),
        )
        .expect("probe analyze");
    assert_eq!(report.duplicate_count, 1);
    assert_eq!(report.exact_duplicates[0].item_id, "item-1");
}
