use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn tmp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("echopay-cli-tests");
    fs::create_dir_all(&dir).ok();
    dir.join(name)
}

fn run_echopay(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_echopay"))
        .args(args)
        .output()
        .expect("failed to execute echopay");
    let text = String::from_utf8_lossy(&output.stderr).to_string()
        + &String::from_utf8_lossy(&output.stdout);
    (output.status.success(), text)
}

#[test]
fn test_send_writes_wav() {
    let wav = tmp_path("send_only.wav");

    let (ok, text) = run_echopay(&[
        "send",
        "--sender-id",
        "42",
        "--amount-paise",
        "12500",
        wav.to_str().unwrap(),
    ]);
    assert!(ok, "send failed: {}", text);
    assert!(text.contains("audio samples"), "unexpected output: {}", text);

    // 216 symbols of 34 ms at 48 kHz, 16-bit mono: roughly 720 KB
    let size = fs::metadata(&wav).expect("wav not created").len();
    assert!(size > 100_000, "wav too small: {} bytes", size);
}

#[test]
fn test_send_recv_round_trip() {
    let wav = tmp_path("round_trip.wav");

    let (ok, text) = run_echopay(&[
        "send",
        "--sender-id",
        "7",
        "--amount-paise",
        "999",
        wav.to_str().unwrap(),
    ]);
    assert!(ok, "send failed: {}", text);

    let (ok, text) = run_echopay(&["recv", wav.to_str().unwrap()]);
    assert!(ok, "recv failed: {}", text);
    assert!(text.contains("Packet accepted"), "got: {}", text);
    assert!(text.contains("sender_id:     7"), "got: {}", text);
    assert!(text.contains("amount_paise:  999"), "got: {}", text);
}

#[test]
fn test_recv_rejects_wrong_secret() {
    let wav = tmp_path("wrong_secret.wav");

    let (ok, _) = run_echopay(&[
        "send",
        "--sender-id",
        "1",
        "--amount-paise",
        "100",
        "--secret",
        "SOME_OTHER_SECRET",
        wav.to_str().unwrap(),
    ]);
    assert!(ok, "send failed");

    let (ok, text) = run_echopay(&["recv", wav.to_str().unwrap()]);
    assert!(!ok, "recv should reject a packet signed with another secret");
    assert!(text.contains("SignatureMismatch"), "got: {}", text);
}

#[test]
fn test_recv_fails_on_silence() {
    let wav = tmp_path("silence.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&wav, spec).unwrap();
    for _ in 0..48_000 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let (ok, text) = run_echopay(&["recv", wav.to_str().unwrap()]);
    assert!(!ok, "recv should fail on silence");
    assert!(text.contains("no packet found"), "got: {}", text);
}
