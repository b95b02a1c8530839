use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const BINARY: &str = "seqrenamer";
type TestResult = Result<(), Box<dyn std::error::Error>>;

fn path(file: &assert_fs::fixture::ChildPath) -> &str {
    file.path().to_str().unwrap()
}

#[test]
fn file_doesnt_exist() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let map = dir.child("map.tsv");

    Command::cargo_bin(BINARY)?
        .args(["encode", "-m", path(&map), "file_which_does_not_exist.fasta"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unable to open file"));

    Ok(())
}

#[test]
fn unknown_extension_needs_format() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("reads.txt");
    input.write_str(">s1\nACGT\n")?;
    let map = dir.child("map.tsv");

    Command::cargo_bin(BINARY)?
        .args(["encode", "-m", path(&map), path(&input)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--format"));

    Ok(())
}

#[test]
fn deduplicated_fasta_goes_to_stdout() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.fasta");
    input.write_str(">s1 d1\nACGT\n>s2 d2\nACGT\n")?;
    let map = dir.child("map.tsv");

    Command::cargo_bin(BINARY)?
        .args(["encode", "-d", "-l", "3", "-m", path(&map), path(&input)])
        .assert()
        .success()
        .stdout(predicate::str::diff(">SR000 d1\nACGT\n"));

    map.assert(
        "SR000\ts1\tIQiZThf2zKn/I1KtqStlEdsHYDQ\td1\n\
         SR000\ts2\tIQiZThf2zKn/I1KtqStlEdsHYDQ\td2\n",
    );

    Ok(())
}

#[test]
fn deduplicate_is_ignored_for_tables() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.csv");
    input.write_str("a,1\na,2\n")?;
    let map = dir.child("map.tsv");

    Command::cargo_bin(BINARY)?
        .args(["encode", "-d", "-l", "2", "-m", path(&map), path(&input)])
        .assert()
        .success()
        .stdout(predicate::str::diff("SR00,1\nSR00,2\n"))
        .stderr(predicate::str::contains("only used for fasta input"));

    Ok(())
}

#[test]
fn column_out_of_range() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.tsv");
    input.write_str("a\tb\nlonely\n")?;
    let map = dir.child("map.tsv");

    Command::cargo_bin(BINARY)?
        .args(["encode", "-c", "1", "-m", path(&map), path(&input)])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("lonely"));

    Ok(())
}

#[test]
fn negative_column_is_rejected() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.tsv");
    input.write_str("a\tb\n")?;
    let map = dir.child("map.tsv");

    Command::cargo_bin(BINARY)?
        .args(["encode", "--column=-1", "-m", path(&map), path(&input)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("column indices must be >= 0"));

    Ok(())
}

#[test]
fn missing_key() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.fasta");
    input.write_str(">SR999\nACGT\n")?;
    let map = dir.child("map.tsv");
    map.write_str("SR000\ts1\t.\n")?;

    Command::cargo_bin(BINARY)?
        .args(["decode", "-m", path(&map), path(&input)])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("SR999"));

    Ok(())
}

#[test]
fn ambiguous_table_key() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.csv");
    input.write_str("X,1\n")?;
    let map = dir.child("map.tsv");
    map.write_str("X\ta\nX\tb\n")?;

    Command::cargo_bin(BINARY)?
        .args(["decode", "-m", path(&map), path(&input)])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("a, b"));

    Ok(())
}

#[test]
fn malformed_map_file() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.csv");
    input.write_str("X,1\n")?;
    let map = dir.child("map.tsv");
    map.write_str("X\ta\nbroken line\n")?;

    Command::cargo_bin(BINARY)?
        .args(["decode", "-m", path(&map), path(&input)])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("broken line"));

    Ok(())
}

#[test]
fn reads_standard_input() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let map = dir.child("map.tsv");

    assert_cmd::Command::cargo_bin(BINARY)?
        .args(["encode", "-f", "fasta", "-p", "x", "-l", "1", "-m", path(&map), "-"])
        .write_stdin(">a\nAC\n>b\nGT\n")
        .assert()
        .success()
        .stdout(predicate::str::diff(">x0\nAC\n>x1\nGT\n"));

    map.assert("x0\ta\t.\nx1\tb\t.\n");

    Ok(())
}

#[test]
fn bad_settings_exit_as_invalid_configuration() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.tsv");
    input.write_str("a\tb\n")?;
    let map = dir.child("map.tsv");

    for (args, message) in [
        (["-l", "0"], "the id length must be at least 1"),
        (["-c", "-1"], "column indices must be >= 0"),
        (["--chunk-size", "0"], "--chunk-size must be at least 1"),
    ] {
        Command::cargo_bin(BINARY)?
            .arg("encode")
            .args(args)
            .args(["-m", path(&map), path(&input)])
            .assert()
            .code(1)
            .stderr(predicate::str::contains(message));
    }

    Ok(())
}

#[test]
fn parent_selector_only_renames_parents() -> TestResult {
    let dir = assert_fs::TempDir::new()?;
    let input = dir.child("in.gff3");
    input.write_str(
        "chr1\tsrc\tgene\t1\t9\t.\t+\t.\tID=g1\n\
         chr1\tsrc\tmRNA\t1\t9\t.\t+\t.\tID=t1;Parent=g1\n",
    )?;
    let map = dir.child("map.tsv");

    Command::cargo_bin(BINARY)?
        .args(["encode", "-c", "parent", "-l", "1", "-m", path(&map), path(&input)])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "chr1\tsrc\tgene\t1\t9\t.\t+\t.\tID=g1\n\
             chr1\tsrc\tmRNA\t1\t9\t.\t+\t.\tID=t1;Parent=SR0\n",
        ));

    map.assert("SR0\tg1\n");

    Ok(())
}
