//! Integration tests for the submission checker

mod common;

use common::OneHotEmbedder;
use std::path::Path;
use submission_checker::checklist::BuiltinChecklists;
use submission_checker::error::CheckerError;
use submission_checker::input::InputManager;
use submission_checker::processing::text_processor::TextProcessor;
use submission_checker::{ChecklistEvaluator, Pathway};

fn builtin_evaluator() -> ChecklistEvaluator {
    ChecklistEvaluator::new(Box::new(OneHotEmbedder::default()), Box::new(BuiltinChecklists))
}

#[tokio::test]
async fn test_page_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_submission.txt");

    let result = manager.extract_pages(path).await;
    assert!(result.is_ok());

    let pages = result.unwrap();
    assert_eq!(pages.len(), 3);
    assert_eq!(pages.iter().map(|p| p.page_number).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(pages.iter().all(|p| p.document_id == "sample_submission.txt"));
    assert!(pages[0].raw_text.contains("Device Trade Name"));
    assert!(pages[2].raw_text.contains("Limit of detection"));
}

#[tokio::test]
async fn test_page_extraction_from_markdown() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_submission.md");

    let pages = manager.extract_pages(path).await.unwrap();
    assert_eq!(pages.len(), 1);

    let text = &pages[0].raw_text;
    assert!(text.contains("NeuroSense EEG Monitor"));
    assert!(text.contains("Special Controls"));
    // Should not contain markdown formatting
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_page_extraction_from_pdf_keeps_page_boundaries() {
    let mut manager = InputManager::new();
    let pages = manager
        .extract_pages(Path::new("tests/fixtures/sample_submission.pdf"))
        .await
        .unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages.iter().map(|p| p.page_number).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(pages[0].raw_text.contains("Intended Use"));
    assert!(!pages[0].raw_text.contains("Device Description"));
    assert!(pages[1].raw_text.contains("Device Description"));
    assert!(pages[2].raw_text.contains("Proposed labeling"));
    assert!(!pages[2].raw_text.contains("handheld meter"));
}

#[tokio::test]
async fn test_pdf_evidence_pages_follow_source_pages() {
    let mut manager = InputManager::new();
    let pages = manager
        .extract_pages(Path::new("tests/fixtures/sample_submission.pdf"))
        .await
        .unwrap();

    let report = builtin_evaluator().evaluate(&pages, None).unwrap();
    assert_eq!(report.pathway, Pathway::PremarketNotification);
    assert_eq!(report.field("intended_use").unwrap().evidence_pages, vec![1]);
    assert_eq!(report.field("device_description").unwrap().evidence_pages, vec![2]);
    assert_eq!(report.field("proposed_labeling").unwrap().evidence_pages, vec![3]);
}

#[tokio::test]
async fn test_normalization_drops_banners_and_joins_hyphen_breaks() {
    let mut manager = InputManager::new();
    let pages = manager
        .extract_pages(Path::new("tests/fixtures/sample_submission.txt"))
        .await
        .unwrap();

    let processor = TextProcessor::new();
    let page_two = processor.normalize_page(&pages[1]);

    assert!(page_two.text.contains("quantitative measurement"));
    assert!(!page_two.text.contains("Page 2 of 3"));
    assert!(!page_two.text.contains('\n'));
}

#[tokio::test]
async fn test_510k_summary_end_to_end() {
    let mut manager = InputManager::new();
    let pages = manager
        .extract_pages(Path::new("tests/fixtures/sample_submission.txt"))
        .await
        .unwrap();

    let report = builtin_evaluator().evaluate(&pages, None).unwrap();
    assert_eq!(report.pathway, Pathway::PremarketNotification);
    assert_eq!(report.field_results.len(), 12);

    let expected_found: [(&str, &[u32]); 9] = [
        ("submission_number", &[1, 2]),
        ("purpose", &[1]),
        ("device_trade_name", &[1]),
        ("regulatory_information", &[1]),
        ("intended_use", &[2]),
        ("device_description", &[2]),
        ("predicate_device", &[2]),
        ("substantial_equivalence", &[1]),
        ("analytical_sensitivity", &[3]),
    ];
    for (field_id, pages) in expected_found {
        let result = report.field(field_id).unwrap();
        assert!(result.found, "{} should be found", field_id);
        assert_eq!(result.evidence_pages, pages.to_vec(), "evidence pages of {}", field_id);
    }

    let missing: Vec<&str> = report.missing_fields().iter().map(|r| r.field_id.as_str()).collect();
    assert_eq!(missing, vec!["precision", "method_comparison", "proposed_labeling"]);
    assert!(!report.complete);

    assert_eq!(
        report.field("analytical_sensitivity").unwrap().matched_phrase.as_deref(),
        Some("limit of detection")
    );
}

#[tokio::test]
async fn test_de_novo_summary_end_to_end() {
    let mut manager = InputManager::new();
    let pages = manager
        .extract_pages(Path::new("tests/fixtures/sample_submission.md"))
        .await
        .unwrap();

    let report = builtin_evaluator().evaluate(&pages, None).unwrap();
    assert_eq!(report.pathway, Pathway::DeNovo);

    for field_id in [
        "request_number",
        "device_trade_name",
        "regulatory_information",
        "intended_use",
        "device_description",
        "special_controls",
    ] {
        let result = report.field(field_id).unwrap();
        assert!(result.found, "{} should be found", field_id);
        assert_eq!(result.evidence_pages, vec![1]);
    }

    let missing: Vec<&str> = report.missing_fields().iter().map(|r| r.field_id.as_str()).collect();
    assert_eq!(
        missing,
        vec!["risks_to_health", "analytical_performance", "clinical_studies", "benefit_risk", "labeling"]
    );
    assert_eq!(
        report.field("intended_use").unwrap().matched_phrase.as_deref(),
        Some("indications for use")
    );
}

#[tokio::test]
async fn test_report_json_shape() {
    let mut manager = InputManager::new();
    let pages = manager
        .extract_pages(Path::new("tests/fixtures/sample_submission.txt"))
        .await
        .unwrap();
    let report = builtin_evaluator().evaluate(&pages, None).unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["pathway"], "510k");
    assert_eq!(json["complete"], false);
    assert_eq!(json["fields"]["intended_use"]["found"], true);
    assert_eq!(json["fields"]["intended_use"]["pages"], serde_json::json!([2]));
    assert_eq!(json["fields"]["precision"]["pages"], serde_json::json!([]));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_submission.txt");

    // First extraction
    let pages1 = manager.extract_pages(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    // Second extraction should use cache
    let pages2 = manager.extract_pages(path).await.unwrap();
    assert_eq!(pages1, pages2);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/unsupported.xyz");

    let result = manager.extract_pages(path).await;
    assert!(matches!(result, Err(CheckerError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_missing_file() {
    let mut manager = InputManager::new();
    let result = manager.extract_pages(Path::new("tests/fixtures/absent.txt")).await;
    assert!(matches!(result, Err(CheckerError::InvalidInput(_))));
}
