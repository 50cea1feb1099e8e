use geo::{coord, Rect};
use label_rows::{
    DisplayTransform, FrameAnnotations, RecordedFrame, RowFilter, RowFilterBuilder, TextLine,
};

const FIXTURE: &str = "tests/data/nutrition_label.json";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load_lines() -> Vec<TextLine> {
    RecordedFrame::load(FIXTURE)
        .expect("Failed to load fixture")
        .into_lines()
}

fn line_at(text: &str, row: f64) -> TextLine {
    TextLine {
        text: text.to_string(),
        bounds: Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.1, y: 0.1 }),
        row: Some(row),
        corner_points: None,
        elements: vec![],
        excluded: false,
    }
}

fn table(filter: &RowFilter, lines: Vec<TextLine>) -> Vec<Vec<String>> {
    let lines = filter.cluster(lines);
    filter
        .group(&lines)
        .into_iter()
        .map(|row| row.texts)
        .collect()
}

#[test]
fn nutrition_label_is_grouped_into_rows() {
    init();
    let filter = RowFilter::default();
    let lines = filter.cluster(load_lines());

    let rows = lines
        .iter()
        .map(|it| (it.text.as_str(), it.row, it.excluded))
        .collect::<Vec<_>>();
    log::debug!("{rows:#?}");
    assert_eq!(
        rows,
        vec![
            ("Nutrition Facts", Some(1.71), false),
            ("Calories", Some(4.0), false),
            ("230", Some(3.89), false),
            ("Total Fat", Some(6.29), false),
            ("8g", Some(6.17), false),
            ("Protein", Some(8.57), true),
            ("3g", Some(8.34), true),
            ("10%", Some(10.63), true),
        ]
    );

    assert_eq!(
        table(&filter, load_lines()),
        vec![
            vec!["Nutrition Facts".to_string()],
            vec!["Calories".to_string(), "230".to_string()],
            vec!["Total Fat".to_string(), "8g".to_string()],
        ]
    );
}

#[test]
fn clustering_is_deterministic() {
    let filter = RowFilter::default();
    assert_eq!(filter.cluster(load_lines()), filter.cluster(load_lines()));
}

#[test]
fn annotations_cover_kept_lines_only() {
    init();
    let filter = RowFilter::default();
    let transform = DisplayTransform::aspect_fill((1000, 1000), (500.0, 500.0));
    let annotations = filter.annotate(load_lines(), &transform);

    // "8g" is kept but has no corner points
    assert_eq!(annotations.shapes.len(), 4);
    assert_eq!(
        annotations
            .labels
            .iter()
            .map(|it| it.text.as_str())
            .collect::<Vec<_>>(),
        vec!["Nutrition", "Facts", "Calories", "230", "Total", "Fat", "8g"]
    );
    let calories = &annotations.labels[2];
    assert!((calories.rect.min().x - 150.0).abs() < 1e-9);
    assert!((calories.rect.min().y - 100.0).abs() < 1e-9);
    assert!((calories.rect.width() - 50.0).abs() < 1e-9);
    assert_eq!(annotations.table.len(), 3);
}

#[test]
fn empty_frame_yields_nothing() {
    let filter = RowFilter::default();
    assert!(filter.cluster(vec![]).is_empty());
    assert_eq!(
        filter.annotate(vec![], &DisplayTransform::identity()),
        FrameAnnotations::default()
    );
}

#[test]
fn keyword_lines_are_always_kept() {
    let filter = RowFilter::default();
    let lines = vec![line_at("CaLoRiEs", 40.0), line_at("calories per 100g", 0.0)];
    let excluded = filter.classify(&lines);
    assert_eq!(excluded, vec![false, false]);
    assert_eq!(filter.rescue(&lines, &excluded), vec![false, false]);
}

#[test]
fn numbers_on_a_labelled_row_are_rescued() {
    let filter = RowFilter::default();
    let lines = vec![line_at("Sugar", 1.0), line_at("12g", 1.0)];
    let excluded = filter.rescue(&lines, &filter.classify(&lines));
    assert_eq!(excluded, vec![false, false]);
}

#[test]
fn isolated_numbers_stay_excluded() {
    let filter = RowFilter::default();
    let lines = vec![line_at("12g", 3.0)];
    let excluded = filter.rescue(&lines, &filter.classify(&lines));
    assert_eq!(excluded, vec![true]);
}

#[test]
fn duplicate_texts_appear_once() {
    let filter = RowFilter::default();
    let lines = vec![
        line_at("Salt", 2.0),
        line_at("Salt", 2.2),
        line_at("Salt", 2.6),
        line_at("Sugar", 0.5),
    ];
    let groups = filter.group(&lines);
    let salts = groups
        .iter()
        .flat_map(|it| &it.texts)
        .filter(|it| *it == "Salt")
        .count();
    assert_eq!(salts, 1);
    assert!(groups.windows(2).all(|pair| pair[0].row < pair[1].row));
    assert_eq!(groups[0].texts, vec!["Sugar"]);
}

#[test]
fn wider_tolerance_merges_rows() {
    let filter = RowFilterBuilder::new().tolerance(3.0).build().unwrap();
    assert_eq!(
        table(&filter, load_lines()),
        vec![
            vec![
                "Nutrition Facts".to_string(),
                "Calories".to_string(),
                "230".to_string(),
            ],
            vec!["Total Fat".to_string(), "8g".to_string()],
            // rescued by "Total Fat", two rows away
            vec!["3g".to_string()],
        ]
    );
}
