//! File-level Integration Tests
//!
//! Table files on disk through read, classify and write, including the ML
//! scheme with a model file.

use std::path::Path;
use std::sync::Arc;

use eds_mineral::io::{read_table, render_output, write_text, OutputOptions};
use eds_mineral::model::TreeArrays;
use eds_mineral::{BaggedTreeModel, ClassifierConfig, Classifier, ClassifyError, Scheme};

const WEBER_PARTICLES: &str = "\
id;Na;Mg;Al;Si;S;K;Ca;Ti;Fe
quartz;3;0;2;95;0;0;0;0;0
clay;1;2;30;50;0;6;1;0;3
";

/// One stump on |Si|: <= 0.7 is Illite, above is Quartz.
fn si_stump_json() -> String {
    serde_json::json!({
        "classes": ["Illite", "Quartz"],
        "n_features": 14,
        "trees": [{
            "feature": [3, -2, -2],
            "threshold": [0.7, -2.0, -2.0],
            "left": [1, -1, -1],
            "right": [2, -1, -1],
            "value": [[5.0, 5.0], [4.0, 0.0], [0.0, 4.0]],
        }],
    })
    .to_string()
}

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn kandler_file_round_trip_keeps_input_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "particles.csv",
        "Particle,Na,Mg,Al,Si,P,S,Cl,K,Ca,Ti,Cr,Mn,Fe\n\
         \"a, 1\",45,0,0,0,0,0,50,0,0,0,0,0,0\n\
         \n\
         b,0,0,0,0,0,0,0,0,0,0,0,0,0\n",
    );

    let raw = read_table(&input, ',').unwrap();
    let result = Classifier::default()
        .classify(&raw.to_element_table().unwrap(), Scheme::Kandler)
        .unwrap();
    let options = OutputOptions {
        keep_input_columns: true,
        ..OutputOptions::default()
    };
    let text = render_output(Some(&raw), &result.output, options).unwrap();
    let output = dir.path().join("labels.csv");
    write_text(&output, &text).unwrap();

    let back = read_table(&output, ',').unwrap();
    assert_eq!(back.header().len(), 14 + 3);
    assert_eq!(&back.header()[14..], &["class", "group", "refractive_index"]);
    assert_eq!(back.records()[0][0], "a, 1");
    assert_eq!(&back.records()[0][14..], &["Hl", "Chlorides", "1.54+0.000i"]);
    assert_eq!(&back.records()[1][14..], &["Unknown", "Unknown", "NA"]);
}

#[test]
fn ml_scheme_with_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = write(dir.path(), "weber.json", &si_stump_json());
    let input = write(dir.path(), "particles.txt", WEBER_PARTICLES);

    let mut config = ClassifierConfig::default();
    config.model.path = Some(model_path);
    config.output.delimiter = ";".to_string();
    config.validate().unwrap();

    let classifier = Classifier::from_config(&config).unwrap();
    assert!(classifier.has_model());

    let raw = read_table(&input, config.delimiter()).unwrap();
    let result = classifier
        .classify(&raw.to_element_table().unwrap(), config.scheme())
        .unwrap();
    assert_eq!(result.output.labels(), vec!["Quartz", "Illite"]);
    assert_eq!(result.output.groups().unwrap(), vec!["Quartz", "Clay"]);

    let text = render_output(Some(&raw), &result.output, OutputOptions::from(&config)).unwrap();
    assert_eq!(
        text.lines().next(),
        Some("class;group;confidence")
    );
    assert!(text.contains("Illite;Clay;1.0000"));
}

#[test]
fn model_file_with_misordered_feature_names_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut model: serde_json::Value = serde_json::from_str(&si_stump_json()).unwrap();
    let mut names: Vec<String> = eds_mineral::dispatch::ratio_specs(Scheme::Ml)
        .iter()
        .map(|r| r.name.to_string())
        .collect();
    names.swap(0, 1);
    model["feature_names"] = serde_json::json!(names);
    let model_path = write(dir.path(), "weber.json", &model.to_string());
    let input = write(dir.path(), "particles.txt", WEBER_PARTICLES);

    let classifier = Classifier::default().with_model_file(&model_path).unwrap();
    let raw = read_table(&input, ';').unwrap();
    let err = classifier
        .classify(&raw.to_element_table().unwrap(), Scheme::Ml)
        .unwrap_err();
    assert!(
        matches!(err, ClassifyError::ModelFeatureOrder { position: 0, .. }),
        "{err}"
    );
}

#[test]
fn missing_model_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ClassifierConfig::default();
    config.model.path = Some(dir.path().join("absent.json"));
    let err = Classifier::from_config(&config).unwrap_err();
    assert!(matches!(err, ClassifyError::Model(_)), "{err}");
}

#[test]
fn model_with_wrong_feature_count_is_rejected() {
    let model = BaggedTreeModel::from_trees(
        vec!["A".to_string(), "B".to_string()],
        2,
        &[TreeArrays {
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            left: vec![1, -1, -1],
            right: vec![2, -1, -1],
            value: vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        }],
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "particles.txt", WEBER_PARTICLES);
    let raw = read_table(&input, ';').unwrap();

    let err = Classifier::default()
        .with_model(Arc::new(model))
        .classify(&raw.to_element_table().unwrap(), Scheme::Ml)
        .unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::ModelFeatureMismatch {
            expected: 2,
            found: 14
        }
    ));
}

#[test]
fn ragged_file_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "bad.csv", "Na,Mg\n1,2\n3\n");
    let err = read_table(&input, ',').unwrap_err();
    assert!(matches!(err, ClassifyError::Csv { line: 3, .. }), "{err}");
}

#[test]
fn missing_input_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_table(&dir.path().join("none.csv"), ',').unwrap_err();
    assert!(matches!(err, ClassifyError::Io(_, _)));
}

#[test]
fn non_numeric_cells_become_nan() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "gaps.csv",
        "Na,Mg,Al,Si,K,Ca,Fe\n1,5,0.5,10,0.2,0.3,0.1\nNaN,,n/a,null,-,x,1\n",
    );
    let raw = read_table(&input, ',').unwrap();
    let result = Classifier::default()
        .classify(&raw.to_element_table().unwrap(), Scheme::Donarummo)
        .unwrap();
    assert_eq!(result.output.labels(), vec!["Htr", "U-"]);
    assert_eq!(result.report.degenerate_rows, 1);
}
