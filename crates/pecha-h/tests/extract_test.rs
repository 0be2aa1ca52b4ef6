use pecha_common::PageId;
use pecha_h::backend::resolve_asset_url;
use pecha_h::extract::{
    TextCandidates, TextMethod, choose_text, clean_text, contains_tibetan, is_image_data_url,
    jp_marker_id,
};

fn page(s: &str) -> PageId {
    s.parse().unwrap()
}

#[test]
fn test_jp_marker_id() {
    assert_eq!(jp_marker_id(&page("1-1b")), "1-1-1b");
    assert_eq!(jp_marker_id(&page("12-340a")), "12-340-12-340a");
}

#[test]
fn test_clean_text_strips_page_marks() {
    let raw = "  བཀའ་འགྱུར། 1-2a\n\n ཆོས།\t 10-33b ";
    assert_eq!(clean_text(raw), "བཀའ་འགྱུར། ཆོས།");
}

#[test]
fn test_contains_tibetan() {
    assert!(contains_tibetan("abc ཀ"));
    assert!(!contains_tibetan("Loading... 1-1b"));
    assert!(!contains_tibetan(""));
}

#[test]
fn test_marker_text_preferred() {
    let candidates = TextCandidates {
        by_marker: "ཀ་ཁ 1-1b".into(),
        by_attribute: "ག་ང".into(),
        elements_found: 1,
    };
    let found = choose_text(&candidates).unwrap();
    assert_eq!(found.text, "ཀ་ཁ");
    assert_eq!(found.method, TextMethod::JpMarkers);
}

#[test]
fn test_attribute_text_used_when_markers_lack_tibetan() {
    let candidates = TextCandidates {
        by_marker: "menu footer".into(),
        by_attribute: "ག་ང".into(),
        elements_found: 2,
    };
    let found = choose_text(&candidates).unwrap();
    assert_eq!(found.text, "ག་ང");
    assert_eq!(found.method, TextMethod::DataPbname);
}

#[test]
fn test_no_tibetan_means_no_text() {
    let candidates = TextCandidates {
        by_marker: "Loading".into(),
        by_attribute: String::new(),
        elements_found: 0,
    };
    assert!(choose_text(&candidates).is_none());
}

#[test]
fn test_blank_canvas_is_not_an_image() {
    assert!(!is_image_data_url("data:,"));
    assert!(!is_image_data_url("data:image/png;base64,"));
    assert!(!is_image_data_url(""));
    assert!(is_image_data_url("data:image/png;base64,iVBORw0KGgo="));
}

#[test]
fn test_resolve_asset_url() {
    let base = "https://online.adarshah.org/";
    assert_eq!(
        resolve_asset_url(base, "/images/1-1b.jpg").unwrap().as_str(),
        "https://online.adarshah.org/images/1-1b.jpg"
    );
    assert_eq!(
        resolve_asset_url(base, "https://cdn.example.org/a.png")
            .unwrap()
            .as_str(),
        "https://cdn.example.org/a.png"
    );
    assert!(resolve_asset_url("not a url", "a.png").is_err());
}

#[test]
fn test_eval_error_messages() {
    use pecha_h::extract::EvalError;
    let err: Box<dyn std::error::Error> = Box::new(EvalError::Context("Cannot find context".into()));
    assert_eq!(
        err.to_string(),
        "execution context unavailable: Cannot find context"
    );
    assert_eq!(EvalError::Timeout.to_string(), "evaluation timed out");
}
