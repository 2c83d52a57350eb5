use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_photobooth")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "photobooth.exe"
            } else {
                "photobooth"
            });
            p
        })
}

fn exported(dir: &PathBuf, ext: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect()
}

#[test]
fn cli_shoot_writes_png_strip() {
    let dir = PathBuf::from("target").join("cli_smoke");
    let out = dir.join("png");
    let _ = std::fs::remove_dir_all(&out);
    std::fs::create_dir_all(&dir).unwrap();

    let cfg_path = dir.join("session.json");
    std::fs::write(
        &cfg_path,
        r##"{
            "layout": "4-square",
            "filter": "bw",
            "timer_secs": 1,
            "border": "#222222",
            "stickers": [{"glyph": "*", "x": 100, "y": 200, "scale": 1.5}]
        }"##,
    )
    .unwrap();

    let status = std::process::Command::new(exe())
        .args(["shoot", "--format", "png", "--config"])
        .arg(&cfg_path)
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();

    assert!(status.success());
    let pngs = exported(&out, "png");
    assert_eq!(pngs.len(), 1);
    let img = image::open(&pngs[0]).unwrap();
    assert_eq!(img.width(), 720, "still exports render at twice the strip width");
}

#[test]
fn cli_layouts_lists_every_layout() {
    let output = std::process::Command::new(exe())
        .arg("layouts")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    for name in ["4-diagonal", "3-diagonal", "4-square", "6-grid"] {
        assert!(text.contains(name), "missing {name} in {text}");
    }
}

#[test]
fn cli_stickers_lists_the_tray() {
    let output = std::process::Command::new(exe())
        .arg("stickers")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.lines().count(), photobooth::session::STICKER_TRAY.len());
    for glyph in photobooth::session::STICKER_TRAY {
        assert!(text.contains(glyph), "missing {glyph} in {text}");
    }
    assert!(text.contains("U+2B50"));
}

#[test]
fn cli_rejects_invalid_config() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let cfg_path = dir.join("bad.json");
    std::fs::write(&cfg_path, r#"{"timer_secs": 0}"#).unwrap();

    let status = std::process::Command::new(exe())
        .args(["shoot", "--config"])
        .arg(&cfg_path)
        .arg("--out")
        .arg(dir.join("bad-out"))
        .status()
        .unwrap();
    assert!(!status.success());
}
