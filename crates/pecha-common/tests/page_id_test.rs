use pecha_common::{PageId, ParseError, Side};

fn id(s: &str) -> PageId {
    s.parse().unwrap()
}

#[test]
fn test_parse_and_render() {
    let page = id("1-1b");
    assert_eq!(page.volume(), 1);
    assert_eq!(page.folio(), 1);
    assert_eq!(page.side(), Side::B);
    assert_eq!(page.to_string(), "1-1b");

    let page = id("102-348a");
    assert_eq!(page.volume(), 102);
    assert_eq!(page.folio(), 348);
    assert_eq!(page.side(), Side::A);
    assert_eq!(page.to_string(), "102-348a");
}

#[test]
fn test_missing_side_is_rejected() {
    assert_eq!(
        "1-1".parse::<PageId>(),
        Err(ParseError::Shape("1-1".to_string()))
    );
}

#[test]
fn test_malformed_identifiers() {
    for input in [
        "", "1", "1-", "-1a", "1-a", "1-1c", "1-1B", "a-1b", "1--1b", "1-+1b", " 1-1b", "1-1b ",
        "1_1b", "99999999999-1a",
    ] {
        assert!(
            matches!(input.parse::<PageId>(), Err(ParseError::Shape(_))),
            "expected shape error for {:?}",
            input
        );
    }
}

#[test]
fn test_zero_components_are_rejected() {
    assert!(matches!(
        "0-1a".parse::<PageId>(),
        Err(ParseError::NotPositive(_))
    ));
    assert!(matches!(
        "1-0b".parse::<PageId>(),
        Err(ParseError::NotPositive(_))
    ));
    assert!(PageId::new(0, 1, Side::A).is_none());
}

#[test]
fn test_ordering_is_volume_folio_side() {
    let mut pages = vec![id("2-1a"), id("1-2a"), id("1-1b"), id("1-10a"), id("1-1a")];
    pages.sort();
    let rendered: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
    assert_eq!(rendered, vec!["1-1a", "1-1b", "1-2a", "1-10a", "2-1a"]);
}

#[test]
fn test_serde_uses_canonical_string() {
    let json = serde_json::to_string(&id("3-14b")).unwrap();
    assert_eq!(json, "\"3-14b\"");

    let back: PageId = serde_json::from_str("\"3-14b\"").unwrap();
    assert_eq!(back, id("3-14b"));

    assert!(serde_json::from_str::<PageId>("\"3-14\"").is_err());
}
