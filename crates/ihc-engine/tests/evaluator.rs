use std::collections::BTreeMap;

use ihc_engine::Evaluator;
use ihc_model::{
    Case, Catalogue, CatalogueItem, EXCESS_DETAIL_KEY, FREE_TEXT_CATEGORY, HighlightCategory,
    OmitList, StainRequirement,
};
use rust_decimal_macros::dec;

fn item(id: &str, slots: [&str; 2], highlight: Option<&str>) -> CatalogueItem {
    CatalogueItem {
        id: id.to_string(),
        fee: dec!(100),
        institute_ratio: BTreeMap::from([("lab-a".to_string(), dec!(0.5))]),
        requirements: [
            StainRequirement::parse(slots[0]),
            StainRequirement::parse(slots[1]),
        ],
        highlight: highlight.map(HighlightCategory::new),
    }
}

fn catalogue(items: Vec<CatalogueItem>) -> Catalogue {
    Catalogue::new(items, vec!["lab-a".to_string()]).expect("valid catalogue")
}

fn standard_catalogue() -> Catalogue {
    catalogue(vec![
        item("A 免疫染色（１種類）", ["CD3", ""], Some("ア")),
        item("B 免疫染色（２種類）", ["CD20", "_CD3"], None),
        item("ク 上記以外", ["", ""], Some("ク")),
        item(EXCESS_DETAIL_KEY, ["", ""], None),
    ])
}

fn case(stains: &[&str]) -> Case {
    Case::new("S24-0001", stains.iter().map(|s| (*s).to_string()).collect())
}

fn no_omissions() -> OmitList {
    OmitList::default()
}

#[test]
fn required_stain_flags_and_records_its_highlight() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&["CD3"]));
    assert_eq!(evaluation.flags["A 免疫染色（１種類）"], 1);
    assert_eq!(evaluation.flags["B 免疫染色（２種類）"], 0);
    assert_eq!(evaluation.details.get("ア").map(String::as_str), Some("CD3"));
}

#[test]
fn every_catalogue_item_gets_exactly_one_flag() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&["CD3", "X1"]));
    assert_eq!(evaluation.flags.len(), catalogue.len());
    for item in catalogue.items() {
        assert!(evaluation.flags.contains_key(&item.id), "{} missing", item.id);
    }
}

#[test]
fn excluded_stain_blocks_the_flag() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let with_conflict = evaluator.evaluate(&case(&["CD20", "CD3"]));
    assert_eq!(with_conflict.flags["B 免疫染色（２種類）"], 0);

    let without_conflict = evaluator.evaluate(&case(&["CD20"]));
    assert_eq!(without_conflict.flags["B 免疫染色（２種類）"], 1);
}

#[test]
fn negative_only_item_flags_when_the_stain_is_absent() {
    let catalogue = catalogue(vec![item("N", ["", "_CD3"], None)]);
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    assert_eq!(evaluator.evaluate(&case(&["CD20"])).flags["N"], 1);
    assert_eq!(evaluator.evaluate(&case(&[])).flags["N"], 1);
    assert_eq!(evaluator.evaluate(&case(&["CD3"])).flags["N"], 0);
}

#[test]
fn items_with_no_requirements_never_flag() {
    let catalogue = catalogue(vec![item("plain", ["", ""], None)]);
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    assert_eq!(evaluator.evaluate(&case(&["plain", "CD3", "X1"])).flags["plain"], 0);
    assert_eq!(evaluator.evaluate(&case(&[])).flags["plain"], 0);
}

#[test]
fn five_uncatalogued_stains_split_across_threshold() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&["X1", "X2", "X3", "X4", "X5"]));
    assert_eq!(evaluation.flags["ク 上記以外"], 1);
    assert_eq!(evaluation.flags[EXCESS_DETAIL_KEY], 2);
    assert_eq!(evaluation.details.get(FREE_TEXT_CATEGORY).map(String::as_str), Some("X1,X2,X3"));
    assert_eq!(evaluation.details.get(EXCESS_DETAIL_KEY).map(String::as_str), Some("X4,X5"));
}

#[test]
fn uncatalogued_stains_at_or_below_threshold_bill_once() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&["X1", "X2", "X3"]));
    assert_eq!(evaluation.flags["ク 上記以外"], 1);
    assert_eq!(evaluation.flags[EXCESS_DETAIL_KEY], 0);
    assert_eq!(evaluation.details.get(FREE_TEXT_CATEGORY).map(String::as_str), Some("X1,X2,X3"));
    assert!(!evaluation.details.contains_key(EXCESS_DETAIL_KEY));
}

#[test]
fn repeated_uncatalogued_stains_count_once_in_first_seen_order() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&["X2", "X1", "X2", "X1"]));
    assert_eq!(evaluation.details.get(FREE_TEXT_CATEGORY).map(String::as_str), Some("X2,X1"));
    assert_eq!(evaluation.flags[EXCESS_DETAIL_KEY], 0);
}

#[test]
fn stains_named_only_in_exclusion_slots_are_still_catalogued() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    // CD3 appears as a requirement and an exclusion; neither makes it
    // uncatalogued.
    let evaluation = evaluator.evaluate(&case(&["CD3"]));
    assert_eq!(evaluation.flags["ク 上記以外"], 0);
    assert!(!evaluation.details.contains_key(FREE_TEXT_CATEGORY));
}

#[test]
fn free_text_item_matched_by_requirement_records_no_detail() {
    let catalogue = catalogue(vec![
        item("A 免疫染色（１種類）", ["CD3", ""], Some("ア")),
        item("ク 上記以外", ["CD3", ""], Some("ク")),
    ]);
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    // CD3 is catalogued, so the ク item falls through to requirement
    // matching: it flags, but the ク detail stays reserved for
    // uncatalogued stain lists.
    let evaluation = evaluator.evaluate(&case(&["CD3"]));
    assert_eq!(evaluation.flags["ク 上記以外"], 1);
    assert!(!evaluation.details.contains_key(FREE_TEXT_CATEGORY));
    assert_eq!(evaluation.details.get("ア").map(String::as_str), Some("CD3"));
}

#[test]
fn omitted_stains_change_nothing() {
    let catalogue = standard_catalogue();
    let omit = OmitList::new(["HE".to_string(), "EVG".to_string()]);
    let evaluator = Evaluator::new(&catalogue, &omit);

    let with_noise = evaluator.evaluate(&case(&["HE", "CD3", "EVG", "X1", "HE"]));
    let without_noise = evaluator.evaluate(&case(&["CD3", "X1"]));
    assert_eq!(with_noise, without_noise);
}

#[test]
fn omitted_stains_never_reach_the_free_text_bucket() {
    let catalogue = standard_catalogue();
    let omit = OmitList::new(["HE".to_string()]);
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&["HE"]));
    assert_eq!(evaluation.flags["ク 上記以外"], 0);
    assert!(evaluation.details.is_empty());
}

#[test]
fn empty_stain_list_flags_zero_everywhere() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&[]));
    assert!(evaluation.flags.values().all(|&flag| flag == 0));
    assert!(evaluation.details.is_empty());
}

#[test]
fn shared_highlight_keys_keep_the_last_write() {
    let catalogue = catalogue(vec![
        item("first", ["CD3", ""], Some("ア")),
        item("second", ["CD20", ""], Some("ア")),
    ]);
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let evaluation = evaluator.evaluate(&case(&["CD3", "CD20"]));
    assert_eq!(evaluation.flags["first"], 1);
    assert_eq!(evaluation.flags["second"], 1);
    assert_eq!(evaluation.details.get("ア").map(String::as_str), Some("CD20"));
}

#[test]
fn batch_keeps_the_last_evaluation_for_a_repeated_case_id() {
    let catalogue = standard_catalogue();
    let omit = no_omissions();
    let evaluator = Evaluator::new(&catalogue, &omit);

    let cases = vec![
        Case::new("S24-0001", vec!["CD3".to_string()]),
        Case::new("S24-0002", vec!["CD20".to_string()]),
        Case::new("S24-0001", vec!["X1".to_string()]),
    ];
    let batch = evaluator.evaluate_batch(&cases);

    assert_eq!(batch.matrix.len(), 2);
    assert_eq!(batch.duplicates, ["S24-0001".to_string()]);
    // The later row won.
    assert_eq!(batch.matrix["S24-0001"]["A 免疫染色（１種類）"], 0);
    assert_eq!(batch.matrix["S24-0001"]["ク 上記以外"], 1);
}
