use std::path::Path;

use approx::assert_relative_eq;
use truss2d::loader::{self, InputFormat};
use truss2d::{report, MaterialDefaults, Settings};

fn data(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn text_bridge_solves_to_statics() {
    let path = data("bridge.txt");
    let truss = loader::load_path(&path, InputFormat::detect(&path), &MaterialDefaults::default())
        .expect("bridge loads");
    assert_eq!(truss.node_count(), 5);
    assert_eq!(truss.bar_count(), 7);
    assert_eq!(
        truss.bars().map(|bar| (bar.start(), bar.end())).collect::<Vec<_>>(),
        vec![
            ("A", "B"),
            ("A", "D"),
            ("B", "C"),
            ("B", "D"),
            ("B", "E"),
            ("C", "E"),
            ("D", "E"),
        ]
    );

    let result = truss.solve().expect("bridge solves");
    let a = result.reaction("A").expect("A reacts");
    let c = result.reaction("C").expect("C reacts");
    assert_relative_eq!(a.x, -5_000.0, max_relative = 1.0e-9);
    assert_relative_eq!(a.y, 8_125.0, max_relative = 1.0e-9);
    assert_eq!(c.x, 0.0);
    assert_relative_eq!(c.y, 11_875.0, max_relative = 1.0e-9);

    let summary = report::render_summary(&result);
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 5 + 7);
    assert_eq!(lines[0], "-5000.0; 8125.0");
    assert_eq!(lines[1], "0.0; 0.0");
    assert_eq!(lines[2], "0.0; 11875.0");
}

#[test]
fn json_triangle_uses_per_bar_properties() {
    let path = data("triangle.json");
    assert_eq!(InputFormat::detect(&path), InputFormat::Json);
    let truss = loader::load_path(&path, InputFormat::Json, &MaterialDefaults::default())
        .expect("triangle loads");
    assert_eq!(truss.bar("1").map(|bar| bar.area()), Some(0.01));
    assert_eq!(truss.bar("3").map(|bar| bar.elastic_modulus()), Some(70.0e9));

    let result = truss.solve().expect("triangle solves");
    let value = report::to_json(&result);
    let ry_a = value["reactions"]["A"]["ry"].as_f64().expect("A ry");
    let ry_b = value["reactions"]["B"]["ry"].as_f64().expect("B ry");
    assert_relative_eq!(ry_a + ry_b, 1_000.0, max_relative = 1.0e-9);
    assert!(value["reactions"].get("C").is_none());
    assert_eq!(value["bar_results"]["2"]["end"], "C");
}

#[test]
fn settings_file_overrides_defaults() {
    let settings = Settings::from_path(data("settings.json")).expect("settings load");
    assert_eq!(settings.solver.singularity_tolerance, 1.0e-10);
    assert_eq!(settings.material.elastic_modulus, 70.0e9);
    assert_eq!(settings.material.area, 0.01);

    let truss = loader::load_path(data("bridge.txt"), InputFormat::Text, &settings.material)
        .expect("bridge loads");
    assert!(truss.bars().all(|bar| bar.elastic_modulus() == 70.0e9));
    truss.solve_with(&settings.solver).expect("bridge solves");
}

#[test]
fn latin1_file_loads_and_prints_padded_exponents() {
    let defaults = MaterialDefaults {
        elastic_modulus: 200.0e9,
        area: 0.01,
    };
    let truss = loader::load_path(data("strut_latin1.txt"), InputFormat::Text, &defaults)
        .expect("latin-1 strut loads");
    assert!(truss.node("N\u{f3}").is_some());

    let result = truss.solve().expect("strut solves");
    let summary = report::render_summary(&result);
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(
        lines,
        vec!["1000.0; 0.0", "0.0; 0.0", "-1000.0; -1.000e+05; -5.000e-07"]
    );
}

#[test]
fn summary_orders_bars_by_numeric_id() {
    let json = r#"{
        "nodes": [
            { "id": "A", "x": 0.0, "y": 0.0, "support": "P" },
            { "id": "B", "x": 1.0, "y": 0.0, "support": "Y" },
            { "id": "C", "x": 1.0, "y": 1.0, "load": [0.0, -1000.0], "support": "N" }
        ],
        "bars": [
            { "id": 10, "start": "A", "end": "B" },
            { "id": 2, "start": "B", "end": "C" },
            { "id": 3, "start": "A", "end": "C" }
        ]
    }"#;
    let result = loader::parse_json(json, &MaterialDefaults::default())
        .expect("payload parses")
        .solve()
        .expect("triangle solves");
    assert_eq!(result.bars()[0].id, "10");

    let summary = report::render_summary(&result);
    let bar_lines: Vec<&str> = summary.lines().skip(3).collect();
    assert_eq!(bar_lines.len(), 3);
    // Bar 2 is the vertical BC carrying the whole load in compression.
    assert!(bar_lines[0].starts_with("-1000.0; "), "{}", bar_lines[0]);
    assert!(bar_lines[1].starts_with("0.0; "), "{}", bar_lines[1]);
    assert!(bar_lines[2].starts_with("0.0; "), "{}", bar_lines[2]);
}

#[test]
fn non_finite_text_values_are_parse_errors() {
    let text = "2; 1\nA; 0; 0\nB; inf; 0\n0; 1\n1; 0\n0; 0\n0; 0\nP\nY\n";
    let error = loader::parse_text(text, &MaterialDefaults::default()).expect_err("inf");
    assert!(matches!(error, truss2d::InputError::Parse { line: 3, .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let error = loader::load_path(
        data("does-not-exist.txt"),
        InputFormat::Text,
        &MaterialDefaults::default(),
    )
    .expect_err("missing file");
    assert!(matches!(error, truss2d::InputError::Io(_)));
}
