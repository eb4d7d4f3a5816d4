use kin::{OutputFormat, RelationshipStore, RenderOptions};
use pretty_assertions::assert_eq;
use serde_json::Value;

const FAMILY: &str = "\
# family tree
Person1 --parent--> Person2
Person2 --parent--> Person3
Person2 --parent--> Person4
Person3 --parent--> Person5
Person4 --parent--> Person6
";

fn with_format(format: OutputFormat) -> RenderOptions {
    RenderOptions {
        format,
        ..RenderOptions::default()
    }
}

// =============================================================================
// ASCII
// =============================================================================

#[test]
fn ascii_levels_top_down() {
    let output = kin::render(FAMILY).unwrap();
    let row_of = |needle: &str| {
        output
            .lines()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("{needle} missing in:\n{output}"))
    };
    assert!(row_of("│ Person1 ") < row_of("│ Person2 "));
    assert!(row_of("│ Person2 ") < row_of("│ Person3 "));
    assert_eq!(row_of("│ Person3 "), row_of("│ Person4 "));
    assert!(row_of("│ Person3 ") < row_of("│ Person5 │"));
    assert_eq!(row_of("│ Person5 │"), row_of("│ Person6 │"));
}

#[test]
fn ascii_labels_list_outgoing() {
    let output = kin::render(FAMILY).unwrap();
    assert!(output.contains("│ Person3: parent │"), "got:\n{output}");
    assert!(output.contains("│ Person4: parent │"), "got:\n{output}");
}

#[test]
fn ascii_single_chain_is_straight() {
    let output = kin::render("A --x--> B\nB --y--> C\n").unwrap();
    let expected = "\
┌──────┐
│ A    │
│ B: x │
└───┬──┘
    │
    │
┌───┴──┐
│ B    │
│ C: y │
└───┬──┘
    │
    │
  ┌─┴─┐
  │ C │
  └───┘";
    assert_eq!(output, expected);
}

#[test]
fn ascii_width_limit() {
    let options = RenderOptions {
        max_width: Some(3),
        ..RenderOptions::default()
    };
    let err = kin::render_with_options(FAMILY, &options).unwrap_err();
    assert_eq!(err.to_string(), "graph too wide for 3 columns");
}

// =============================================================================
// Figure export
// =============================================================================

#[test]
fn json_has_edge_and_node_traces() {
    let output = kin::render_with_options(FAMILY, &with_format(OutputFormat::Json)).unwrap();
    let json: Value = serde_json::from_str(&output).unwrap();
    let data = json["data"].as_array().unwrap();

    let lines = data.iter().filter(|t| t["mode"] == "lines").count();
    let markers = data.iter().filter(|t| t["mode"] == "markers+text").count();
    assert_eq!(lines, 5);
    assert_eq!(markers, 6);
    assert_eq!(json["layout"]["showlegend"], false);
}

#[test]
fn json_node_text() {
    let output = kin::render_with_options(FAMILY, &with_format(OutputFormat::Json)).unwrap();
    let json: Value = serde_json::from_str(&output).unwrap();
    let person2 = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["text"].as_str().is_some_and(|s| s.starts_with("Person2")))
        .unwrap();
    assert_eq!(person2["text"], "Person2<br>Person3: parent<br>Person4: parent");
    assert_eq!(person2["x"][0], 0.0);
    assert_eq!(person2["y"][0], -1.0);
}

#[test]
fn script_export_to_file() {
    let mut store = RelationshipStore::new();
    store.add_relationship("Alice", "mother", "Bob");

    let path = std::env::temp_dir().join(format!("kin-export-{}.js", std::process::id()));
    kin::export(&store, &Default::default(), &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let json = written
        .strip_prefix("var graphJSON = ")
        .and_then(|s| s.strip_suffix(';'))
        .unwrap();
    let figure: Value = serde_json::from_str(json).unwrap();
    assert_eq!(figure["data"].as_array().unwrap().len(), 3);
}

#[test]
fn disconnected_edges_not_drawn() {
    let input = "A --parent--> B\nX --parent--> Y\n";
    let output = kin::render_with_options(input, &with_format(OutputFormat::Json)).unwrap();
    let json: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}
