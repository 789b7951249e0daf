use serde_json::Value;
use serial_test::serial;
use std::io::Write;

fn run(args: &[&str]) -> (i32, String, String) {
    let mut argv = vec!["axiomind-holdem"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = axiomind_holdem_cli::run(argv, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn clear_env() {
    for key in [
        "AXIOMIND_HOLDEM_CONFIG",
        "AXIOMIND_HOLDEM_SEED",
        "AXIOMIND_HOLDEM_BUY_IN",
        "AXIOMIND_HOLDEM_COMMISSION_RATE",
    ] {
        unsafe {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn sim_output_verifies() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.jsonl");
    let path_str = path.to_string_lossy().to_string();

    let (code, out, err) = run(&["sim", "--games", "40", "--seats", "6", "--seed", "2024", "--output", &path_str]);
    assert_eq!(code, 0, "{}", err);
    assert!(out.contains("Hand records: 40 written to"));

    let (code, out, err) = run(&["verify", "--input", &path_str]);
    assert_eq!(code, 0, "{}", err);
    assert!(out.starts_with("Verified 40 hand records"));
}

#[test]
#[serial]
fn edited_history_fails_verification() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.jsonl");
    let path_str = path.to_string_lossy().to_string();
    let (code, _, _) = run(&["sim", "--games", "5", "--seats", "3", "--seed", "9", "--output", &path_str]);
    assert_eq!(code, 0);

    // move one chip from seat 0 to seat 1 in the last record
    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let last = lines.len() - 1;
    let mut record: Value = serde_json::from_str(&lines[last]).unwrap();
    let seats = record["seats"].as_array_mut().unwrap();
    let chips = seats[0]["final_chips"].as_u64().unwrap();
    seats[0]["final_chips"] = Value::from(chips + 1);
    lines[last] = record.to_string();
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    let (code, _, err) = run(&["verify", "--input", &path_str]);
    assert_eq!(code, 2);
    assert!(err.contains("record 5 (game 5)"), "{}", err);
    assert!(err.trim_end().ends_with("Error: Verification failed: 1 of 5 hand records failed"));
}

#[test]
#[serial]
fn cfg_reports_file_and_env_sources() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("holdem.toml");
    let mut f = std::fs::File::create(&cfg_path).unwrap();
    writeln!(f, "seed = 456\ncommission_rate = 2").unwrap();
    unsafe {
        std::env::set_var("AXIOMIND_HOLDEM_CONFIG", &cfg_path);
        std::env::set_var("AXIOMIND_HOLDEM_BUY_IN", "5000");
    }

    let (code, out, err) = run(&["cfg"]);
    clear_env();
    assert_eq!(code, 0, "{}", err);
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["commission_rate"]["value"].as_u64(), Some(2));
    assert_eq!(json["commission_rate"]["source"].as_str(), Some("file"));
    assert_eq!(json["buy_in"]["value"].as_u64(), Some(5000));
    assert_eq!(json["buy_in"]["source"].as_str(), Some("env"));
    assert_eq!(json["seed"]["source"].as_str(), Some("file"));
    assert!(json["seed"]["value"].as_str().unwrap().ends_with("1c8"));
}

#[test]
#[serial]
fn configured_seed_drives_deal() {
    clear_env();
    unsafe {
        std::env::set_var("AXIOMIND_HOLDEM_SEED", "31337");
    }
    let (code_env, from_env, _) = run(&["deal", "--seats", "3"]);
    clear_env();
    let (code_arg, from_arg, _) = run(&["deal", "--seats", "3", "--seed", "31337"]);
    assert_eq!((code_env, code_arg), (0, 0));
    assert_eq!(from_env, from_arg);
}

#[test]
#[serial]
fn invalid_config_exits_two() {
    clear_env();
    unsafe {
        std::env::set_var("AXIOMIND_HOLDEM_COMMISSION_RATE", "250");
    }
    let (code, out, err) = run(&["sim", "--games", "1"]);
    clear_env();
    assert_eq!(code, 2);
    assert!(out.is_empty());
    assert!(err.starts_with("Error: Configuration error:"), "{}", err);
}
