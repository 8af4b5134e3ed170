//! Integration tests for the qrcad binary.
//!
//! These run the built binary end to end and cross-check its output
//! against an in-process run of the same pipeline.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use qrcad_core::{emit, encode, ErrorCorrection, RenderConfig};
use qrcad_io::dxf::DxfReader;

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_qrcad")
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("qrcad-test-{}-{}", std::process::id(), name))
}

#[test]
fn text_payload_round_trips_through_dxf() {
    let out = temp_path("hello.dxf");
    let output = Command::new(binary())
        .args([
            "--text",
            "Hello QR",
            "--ecc",
            "high",
            "--module-size",
            "2.0",
            "--corner-radius",
            "0.5",
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run qrcad");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("LWPOLYLINE"));
    assert!(text.trim_end().ends_with("EOF"));

    // Entity count must equal the dark-module count of this encoding,
    // and the parsed geometry must match an in-process emit.
    let matrix = encode::encode_text("Hello QR", ErrorCorrection::High).unwrap();
    let parsed = DxfReader::parse(&text).unwrap();
    assert_eq!(parsed.shape_count(), matrix.dark_count());

    let config = RenderConfig {
        module_size: 2.0,
        corner_radius: 0.5,
        ..RenderConfig::default()
    };
    let drawing = emit(&matrix, &config).unwrap();
    assert_eq!(parsed.layer_name, drawing.layer_name);
    for (a, b) in parsed.shapes.iter().zip(&drawing.shapes) {
        assert_eq!(a.vertex_count(), b.vertex_count());
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            assert!((va.x - vb.x).abs() < 1e-6);
            assert!((va.y - vb.y).abs() < 1e-6);
            assert!((va.bulge - vb.bulge).abs() < 1e-6);
        }
    }

    let _ = fs::remove_file(&out);
}

#[test]
fn identical_runs_produce_identical_files() {
    let out_a = temp_path("det-a.dxf");
    let out_b = temp_path("det-b.dxf");
    for out in [&out_a, &out_b] {
        let status = Command::new(binary())
            .args(["--text", "determinism", "--rounded", "-o", out.to_str().unwrap()])
            .status()
            .expect("failed to run qrcad");
        assert!(status.success());
    }
    assert_eq!(fs::read(&out_a).unwrap(), fs::read(&out_b).unwrap());
    let _ = fs::remove_file(&out_a);
    let _ = fs::remove_file(&out_b);
}

#[test]
fn missing_payload_exits_with_usage() {
    let output = Command::new(binary())
        .output()
        .expect("failed to run qrcad");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--text"));
}

#[test]
fn wifi_mode_requires_ssid() {
    let output = Command::new(binary())
        .args(["--wifi"])
        .output()
        .expect("failed to run qrcad");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--ssid"));
}

#[test]
fn wifi_payload_generates_output() {
    let out = temp_path("wifi.dxf");
    let status = Command::new(binary())
        .args([
            "--wifi",
            "--ssid",
            "home",
            "--password",
            "hunter2",
            "--auth",
            "wpa2",
            "-o",
            out.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run qrcad");
    assert!(status.success());
    assert!(out.exists());
    let _ = fs::remove_file(&out);
}

#[test]
fn unknown_flag_is_rejected() {
    let output = Command::new(binary())
        .args(["--text", "hi", "--frobnicate"])
        .output()
        .expect("failed to run qrcad");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("frobnicate"));
}

#[test]
fn summary_json_is_machine_readable() {
    let out = temp_path("summary.dxf");
    let output = Command::new(binary())
        .args(["--text", "summary", "--summary-json", "-o", out.to_str().unwrap()])
        .output()
        .expect("failed to run qrcad");
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = summary["entities"].as_u64().unwrap();
    let dark = summary["dark_modules"].as_u64().unwrap();
    assert_eq!(entities, dark);
    assert_eq!(summary["layer"], "QR");
    let _ = fs::remove_file(&out);
}

#[test]
fn preview_png_is_written() {
    let dxf = temp_path("preview.dxf");
    let png = temp_path("preview.png");
    let status = Command::new(binary())
        .args([
            "--text",
            "preview me",
            "-o",
            dxf.to_str().unwrap(),
            "--preview",
            png.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run qrcad");
    assert!(status.success());

    let bytes = fs::read(&png).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let _ = fs::remove_file(&dxf);
    let _ = fs::remove_file(&png);
}

#[test]
fn settings_file_drives_render_and_flags_override() {
    let settings_path = temp_path("settings.json");
    fs::write(
        &settings_path,
        r#"{"module_size": 2.0, "corner_radius": 0.5, "layer": "CUT", "ecc": "high"}"#,
    )
    .unwrap();

    let out = temp_path("settings.dxf");
    let status = Command::new(binary())
        .args([
            "--text",
            "settings",
            "--settings",
            settings_path.to_str().unwrap(),
            "--layer",
            "ENGRAVE",
            "-o",
            out.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run qrcad");
    assert!(status.success());

    let parsed = DxfReader::parse(&fs::read_to_string(&out).unwrap()).unwrap();
    // --layer overrides the settings file; module size comes from it.
    assert_eq!(parsed.layer_name, "ENGRAVE");
    let bbox = parsed.shapes[0].bounding_box().unwrap();
    assert!((bbox.width() - 2.0).abs() < 1e-6);

    let _ = fs::remove_file(&settings_path);
    let _ = fs::remove_file(&out);
}
