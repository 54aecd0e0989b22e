use image::{Rgba, RgbaImage};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct StepTiming {
    name: String,
    time_ms: u64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct PreprocessResponse {
    total_time_ms: u64,
    steps: Vec<StepTiming>,
}

fn region_ocr() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_region-ocr"));
    command.env_remove("RUST_LOG").env_remove("REGION_OCR_PROFILE");
    command
}

/// Run `region-ocr clean` with `text` on stdin
fn clean_stdin(args: &[&str], text: &str) -> Output {
    let mut child = region_ocr()
        .arg("clean")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start region-ocr");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(text.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for region-ocr")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "region-ocr failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

/// Dark text-like block on a light speech bubble framed by a dark border
fn write_capture(path: &Path) {
    let image = RgbaImage::from_fn(40, 30, |x, y| {
        let border = x < 2 || y < 2 || x >= 38 || y >= 28;
        let ink = (15..25).contains(&x) && (12..18).contains(&y);
        if border || ink {
            Rgba([20, 20, 20, 255])
        } else {
            Rgba([235, 235, 235, 255])
        }
    });
    image.save(path).expect("Failed to write fixture");
}

#[test]
fn test_clean_default_profile() {
    let output = clean_stdin(&[], "| l am  here ,\nreally .\n");
    assert_eq!(stdout(&output), "I am here, really.");
}

#[test]
fn test_clean_manhwa_profile_with_transform() {
    let output = clean_stdin(
        &["--profile", "manhwa", "--transform", "upper-case"],
        "W H A T\nare you\ndoing ?",
    );
    assert_eq!(stdout(&output), "WHAT ARE YOU DOING?");
}

#[test]
fn test_clean_applies_site_rules() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules.json");
    fs::write(
        &rules,
        r##"{
            "global": {"replacements": [{"find": "teh", "replace": "the", "wholeWord": true}]},
            "sites": {"site:https://comic.example": {"deletions": ["#"]}}
        }"##,
    )
    .unwrap();
    let rules = rules.to_str().unwrap();

    let output = clean_stdin(&["--rules", rules], "teh #cat");
    assert_eq!(stdout(&output), "the #cat");

    let output = clean_stdin(
        &["--rules", rules, "--origin", "https://comic.example"],
        "teh #cat",
    );
    assert_eq!(stdout(&output), "the cat");
}

#[test]
fn test_clean_legacy_rules_and_file_input() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("rules.txt");
    fs::write(&legacy, "rn → m\nno arrow\n").unwrap();
    let input = dir.path().join("raw.txt");
    fs::write(&input, "the rnoon").unwrap();

    let output = region_ocr()
        .args(["clean", input.to_str().unwrap(), "--legacy-rules"])
        .arg(&legacy)
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "the moon");
}

#[test]
fn test_clean_dictionary_profile() {
    let dir = tempfile::tempdir().unwrap();
    let profile = dir.path().join("profile.json");
    fs::write(&profile, r#"{"clean_dict": true}"#).unwrap();

    let output = clean_stdin(&["--profile", profile.to_str().unwrap()], "Helle World");
    assert_eq!(stdout(&output), "Hello World");
}

#[test]
fn test_clean_dictionary_for_other_ocr_language() {
    let dir = tempfile::tempdir().unwrap();
    let profile = dir.path().join("profile.json");
    fs::write(&profile, r#"{"clean_dict": true, "tess_lang": "kor+eng"}"#).unwrap();

    let output = clean_stdin(&["--profile", profile.to_str().unwrap()], "Helle World");
    assert_eq!(stdout(&output), "Hello World");

    fs::write(&profile, r#"{"clean_dict": true, "tess_lang": "kor"}"#).unwrap();
    let output = clean_stdin(&["--profile", profile.to_str().unwrap()], "Helle World");
    assert_eq!(stdout(&output), "Hello World");
}

#[test]
fn test_unknown_profile_fails() {
    let output = region_ocr()
        .args(["clean", "--profile", "/nonexistent/profile.json"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_preprocess_writes_image_and_debug_stages() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("capture.png");
    let output_path = dir.path().join("conditioned.png");
    let debug_dir = dir.path().join("stages");
    write_capture(&input);

    let output = region_ocr()
        .arg("preprocess")
        .arg(&input)
        .arg("--output")
        .arg(&output_path)
        .arg("--debug-dir")
        .arg(&debug_dir)
        .output()
        .unwrap();

    let response: PreprocessResponse = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<_> = response.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["resize", "grayscale", "contrast"]);

    let conditioned = image::open(&output_path).unwrap();
    assert_eq!((conditioned.width(), conditioned.height()), (80, 60));

    let mut saved: Vec<_> = fs::read_dir(&debug_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    saved.sort();
    assert_eq!(saved, vec!["01-resize.png", "02-grayscale.png", "03-contrast.png"]);
}

#[test]
fn test_preprocess_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = region_ocr()
        .arg("preprocess")
        .arg(dir.path().join("missing.png"))
        .arg("--output")
        .arg(dir.path().join("out.png"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}
