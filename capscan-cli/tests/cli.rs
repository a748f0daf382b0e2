use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;

fn sample_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("capscan-parser")
        .join("samples")
        .join(name)
}

#[test]
fn combos_lists_sorted_identifiers() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("combos").arg(sample_path("ue-capability-attach.txt"));

    cmd.assert()
        .success()
        .stdout(predicate::eq("DC_3A-7A_n78A\nDC_3A_n78A\n"));
}

#[test]
fn combos_without_mrdc_section_fails_with_hint() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("combos").arg(sample_path("ue-capability-lte-only.txt"));

    cmd.assert().failure().code(1).stderr(
        predicate::str::contains("log does not contain rf-ParametersMRDC")
            .and(predicate::str::contains("EN-DC")),
    );
}

#[test]
fn report_as_json() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("report").arg(sample_path("ue-capability-attach.txt"));

    let output = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(report["network"]["mcc"], "310");
    assert_eq!(report["eutra"]["fields"]["ue-Category"], 4);
    assert_eq!(report["eutra"]["bands"][2], "B7");
    assert_eq!(report["utra"]["fields"]["multiModeCapability"], "fdd");
    assert_eq!(report["endc_combos"].as_array().map(Vec::len), Some(2));
}

#[test]
fn report_as_yaml() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("report")
        .arg(sample_path("ue-capability-lte-only.txt"))
        .arg("--format")
        .arg("yaml");

    cmd.assert().success().stdout(
        predicate::str::contains("mcc: '311'")
            .and(predicate::str::contains("- B13"))
            .and(predicate::str::contains("endc_combos: []")),
    );
}

#[test]
fn report_requires_capability_enquiry() {
    let mut dump = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(dump, "ueCapabilityInformation\n  rrc-TransactionIdentifier: 1").expect("write");

    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("report").arg(dump.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not contain ue-CapabilityRequest"));
}

#[test]
fn find_prints_subtree_from_stdin() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("find")
        .arg("-")
        .arg("sub")
        .write_stdin("root\n  a: 1\n  sub\n    b: 2\n  c: 3\n");

    cmd.assert()
        .success()
        .stdout(predicate::eq("-- line 3 --\n    b: 2\n"));
}

#[test]
fn find_prints_leaf_occurrences() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("find")
        .arg("-")
        .arg("ue-Category")
        .write_stdin("caps\n  ue-Category: 4\n  halfDuplex: false\n");

    cmd.assert().success().stdout(predicate::eq(
        "-- line 2 (no nested lines) --\n  ue-Category: 4\n",
    ));
}

#[test]
fn find_labels_each_occurrence_by_its_own_line() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("find")
        .arg("-")
        .arg("entry")
        .write_stdin("list\n  entry\n    x: 1\n  entry: leaf\n");

    cmd.assert().success().stdout(predicate::eq(
        "-- line 2 --\n    x: 1\n-- line 4 (no nested lines) --\n  entry: leaf\n",
    ));
}

#[test]
fn find_with_header_includes_matching_line() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("find")
        .arg("-")
        .arg("sub")
        .arg("--with-header")
        .write_stdin("root\n  sub\n    b: 2\n");

    cmd.assert()
        .success()
        .stdout(predicate::eq("-- line 2 --\n  sub\n    b: 2\n"));
}

#[test]
fn missing_marker_is_not_an_error() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("find")
        .arg(sample_path("ue-capability-attach.txt"))
        .arg("rf-ParametersNR");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no occurrence of rf-ParametersNR"));
}

#[test]
fn entries_splits_container_list() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("entries")
        .arg(sample_path("ue-capability-attach.txt"))
        .arg("ue-CapabilityRAT-ContainerList");

    cmd.assert().success().stdout(
        predicate::str::contains("-- entry 1 at line")
            .and(predicate::str::contains("-- entry 3 at line"))
            .and(predicate::str::contains("-- entry 4").not()),
    );
}

#[test]
fn instances_prints_matching_messages() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("instances")
        .arg("-")
        .arg("bandNR")
        .write_stdin("msg one\n  bandEUTRA: 3\n\nmsg two\n  bandNR: 78\n");

    cmd.assert()
        .success()
        .stdout(predicate::eq("msg two\n  bandNR: 78\n"));
}

#[test]
fn binary_input_is_rejected() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("combos").arg("-").write_stdin(vec![0x66u8, 0x6f, 0xff, 0x0a]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("line 1 cannot be measured"));
}

#[test]
fn user_config_changes_feature_table() {
    let mut config = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(config, "[extraction.eutra]\nsingle_line = [\"ue-Category\"]").expect("write");

    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("--config")
        .arg(config.path())
        .arg("report")
        .arg(sample_path("ue-capability-attach.txt"));

    let output = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    let fields = report["eutra"]["fields"].as_object().expect("fields");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields["ue-Category"], 4);
}

#[test]
fn rlf_lists_failure_signs() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("rlf").arg(sample_path("ue-radio-link-failure.txt"));

    cmd.assert().success().stdout(predicate::eq(
        "line 17: re-establishment request (otherFailure)\n\
         line 31: rlf info available\n\
         line 58: rlf report\n\
         line 64: rlf cause (t310-Expiry)\n\
         line 86: scg failure\n",
    ));
}

#[test]
fn rlf_without_failure_succeeds() {
    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.arg("rlf").arg(sample_path("ue-capability-attach.txt"));

    cmd.assert()
        .success()
        .stdout(predicate::eq("no radio link failure\n"));
}

#[test]
fn user_config_file_is_layered_under_explicit_config() {
    let home = tempfile::tempdir().expect("temp dir");
    let dir = home.path().join("capscan");
    std::fs::create_dir_all(&dir).expect("config dir");
    std::fs::write(dir.join("config.toml"), "[output]\nformat = \"yaml\"\n").expect("write");

    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .arg("report")
        .arg(sample_path("ue-capability-lte-only.txt"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("endc_combos: []"));

    let mut explicit = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(explicit, "[output]\nformat = \"json\"").expect("write");

    let mut cmd = cargo_bin_cmd!("capscan");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .arg("--config")
        .arg(explicit.path())
        .arg("report")
        .arg(sample_path("ue-capability-lte-only.txt"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"endc_combos\": []"));
}
