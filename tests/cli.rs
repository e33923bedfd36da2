use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_scene() -> NamedTempFile {
    let scene = r##"<scene>
  <object>
    <name>Orb</name>
    <type>sphere</type>
    <radius>2</radius>
    <segments>8 6</segments>
    <color>#ff0000</color>
  </object>
  <object>
    <name>Sun</name>
    <type>light</type>
    <position>0 5 5</position>
    <intensity>80</intensity>
  </object>
</scene>
"##;
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(scene.as_bytes()).expect("write scene");
    tmp
}

#[test]
fn summary_mode_drags_and_prints_final_state() {
    let mut cmd = Command::cargo_bin("spinning-ball").expect("binary exists");
    cmd.args([
        "--summary-only",
        "--width",
        "800",
        "--height",
        "600",
        "--drag",
        "400,300",
        "--drag",
        "800,600",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 3 objects (1 lights)"))
        .stdout(contains(" - Ball (sphere)"))
        .stdout(contains("Target color rgb(255, 255, 200)"))
        .stdout(contains("Final stage state:"))
        .stdout(contains(
            " - Ball scale=(1.00, 1.00, 1.00) color=rgb(255, 255, 200)",
        ))
        .stdout(contains(" - nav offset=0.0% caption opacity=1.00"));
}

#[test]
fn summary_mode_loads_scene_file() {
    let scene = write_scene();
    let mut cmd = Command::cargo_bin("spinning-ball").expect("binary exists");
    cmd.arg("--scene")
        .arg(scene.path())
        .arg("--summary-only")
        .args(["--frames", "30"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 2 objects (1 lights)"))
        .stdout(contains(" - Orb (sphere)"))
        .stdout(contains(" - Sun (light)"))
        .stdout(contains(" - Orb scale="))
        .stdout(contains("color=rgb(255, 0, 0)"));
}

#[test]
fn unclamped_pointer_is_accepted() {
    let mut cmd = Command::cargo_bin("spinning-ball").expect("binary exists");
    cmd.args([
        "--summary-only",
        "--unclamped-pointer",
        "--width",
        "800",
        "--height",
        "600",
        "--drag",
        "0,0",
        "--drag",
        "400,0",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("Target color rgb(128, 0, 200)"));
}

#[test]
fn malformed_drag_point_is_rejected() {
    let mut cmd = Command::cargo_bin("spinning-ball").expect("binary exists");
    cmd.args(["--summary-only", "--drag", "12"]);
    cmd.assert().failure().stderr(contains("expected X,Y"));
}

#[test]
fn missing_scene_file_fails() {
    let mut cmd = Command::cargo_bin("spinning-ball").expect("binary exists");
    cmd.args(["--summary-only", "--scene", "/nonexistent/scene.xml"]);
    cmd.assert()
        .failure()
        .stderr(contains("failed to read scene"));
}
