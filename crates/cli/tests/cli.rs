use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn tractsim() -> Command {
    let mut cmd = Command::cargo_bin("tractsim").unwrap();
    cmd.arg("--log-level").arg("warn");
    cmd
}

fn small_config(seed: u64) -> Value {
    json!({
        "options": {
            "generations": 5,
            "chromosome_lengths": [1.0],
            "seed": seed
        },
        "demography": [
            { "generation": 0,
              "subpopulations": [ {"males": 5, "females": 5}, {"males": 5, "females": 5} ],
              "migration": [[0.0, 0.1], [0.1, 0.0]] }
        ],
        "selection": [
            { "chromosome": 0, "position": 0.5, "effects": [
                { "selection": 0.1, "dominance": 0.5 },
                { "selection": 0.0, "dominance": 0.5 } ] }
        ],
        "allele_frequencies": [
            { "chromosome": 0, "position": 0.5, "frequencies": [0.5, 0.0] }
        ]
    })
}

fn write_config(dir: &Path, name: &str, config: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    path
}

#[test]
fn test_init_writes_valid_template() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("sim.json");

    tractsim()
        .arg("init")
        .arg("--output")
        .arg(&path)
        .arg("--generations")
        .arg("12")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written"));

    let config: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(config["options"]["generations"], 12);

    tractsim()
        .arg("validate")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("sim.json");
    fs::write(&path, "{}").unwrap();

    tractsim()
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    tractsim()
        .arg("init")
        .arg("--output")
        .arg(&path)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_validate_rejects_unsorted_demography() {
    let temp = tempdir().unwrap();
    let mut config = small_config(1);
    config["demography"] = json!([
        { "generation": 0, "subpopulations": [ {"males": 5, "females": 5}, {"males": 5, "females": 5} ] },
        { "generation": 4, "subpopulations": [ {"males": 5, "females": 5}, {"males": 5, "females": 5} ] },
        { "generation": 2, "subpopulations": [ {"males": 5, "females": 5}, {"males": 5, "females": 5} ] }
    ]);
    let path = write_config(temp.path(), "bad.json", &config);

    tractsim()
        .arg("validate")
        .arg("--config")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"));
}

#[test]
fn test_validate_rejects_malformed_json() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{ \"options\": ").unwrap();

    tractsim()
        .arg("validate")
        .arg("--config")
        .arg(&path)
        .assert()
        .code(1);
}

#[test]
fn test_run_writes_statistics_to_stdout() {
    let temp = tempdir().unwrap();
    let path = write_config(temp.path(), "sim.json", &small_config(3));

    tractsim()
        .arg("run")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "generation\tsubpopulation\tstatistic\tchromosome\tkey\tvalue\n",
        ))
        .stdout(predicate::str::contains("4\t1\tsize\t-\tfemales\t5.000000"))
        .stderr(predicate::str::contains("Simulation complete"));
}

#[test]
fn test_run_is_reproducible() {
    let temp = tempdir().unwrap();
    let path = write_config(temp.path(), "sim.json", &small_config(5));
    let first = temp.path().join("first.tsv");
    let second = temp.path().join("second.tsv");
    let reseeded = temp.path().join("reseeded.tsv");

    for (output, threads) in [(&first, "1"), (&second, "3")] {
        tractsim()
            .arg("--threads")
            .arg(threads)
            .arg("run")
            .arg("--config")
            .arg(&path)
            .arg("--output")
            .arg(output)
            .assert()
            .success();
    }
    tractsim()
        .arg("run")
        .arg("--config")
        .arg(&path)
        .arg("--seed")
        .arg("6")
        .arg("--output")
        .arg(&reseeded)
        .assert()
        .success();

    let first = fs::read(&first).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, fs::read(&second).unwrap());
    assert_ne!(first, fs::read(&reseeded).unwrap());
}

#[test]
fn test_run_exit_code_for_lost_tracked_site() {
    let temp = tempdir().unwrap();
    let mut config = small_config(7);
    config["options"]["tracked_sites"] = json!([{ "chromosome": 0, "position": 0.5 }]);
    config["allele_frequencies"][0]["frequencies"] = json!([1.0, 0.0]);
    config["demography"] = json!([
        { "generation": 0, "subpopulations": [ {"males": 5, "females": 5}, {"males": 5, "females": 5} ] },
        { "generation": 2, "subpopulations": [ {"males": 0, "females": 0}, {"males": 5, "females": 5} ] }
    ]);
    config["options"]["generations"] = json!(10);
    let path = write_config(temp.path(), "tracked.json", &config);

    tractsim()
        .arg("run")
        .arg("--config")
        .arg(&path)
        .arg("--output")
        .arg(temp.path().join("out.tsv"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("selected site lost"));

    // Statistics up to the last committed generation were flushed.
    let text = fs::read_to_string(temp.path().join("out.tsv")).unwrap();
    assert!(text.lines().any(|line| line.starts_with("2\t")));
}

#[test]
fn test_validate_rejects_migration_from_removed_subpopulation() {
    let temp = tempdir().unwrap();
    let mut config = small_config(9);
    config["demography"] = json!([
        { "generation": 0,
          "subpopulations": [ {"males": 5, "females": 5}, {"males": 5, "females": 5} ],
          "migration": [[0.0, 0.1], [0.1, 0.0]] },
        { "generation": 3,
          "subpopulations": [ {"males": 5, "females": 5}, {"males": 0, "females": 0} ],
          "migration": [[0.0, 0.1], [0.0, 0.0]] }
    ]);
    let path = write_config(temp.path(), "removed.json", &config);

    tractsim()
        .arg("validate")
        .arg("--config")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("which has no parents to give"));

    // `run` refuses before writing any statistics.
    tractsim()
        .arg("run")
        .arg("--config")
        .arg(&path)
        .arg("--output")
        .arg(temp.path().join("out.tsv"))
        .assert()
        .code(1);
    assert!(!temp.path().join("out.tsv").exists());
}

#[test]
fn test_run_exit_code_for_population_collapse() {
    let temp = tempdir().unwrap();
    let mut config = small_config(8);
    // Every founder is homozygous for a lethal mutation.
    config["selection"] = json!([
        { "chromosome": 0, "position": 0.5, "effects": [ { "selection": -1.0, "dominance": 1.0 } ] }
    ]);
    config["allele_frequencies"] = json!([
        { "chromosome": 0, "position": 0.5, "frequencies": [1.0] }
    ]);
    let path = write_config(temp.path(), "collapse.json", &config);

    tractsim()
        .arg("run")
        .arg("--config")
        .arg(&path)
        .arg("--output")
        .arg(temp.path().join("out.tsv"))
        .assert()
        .code(3);
}
