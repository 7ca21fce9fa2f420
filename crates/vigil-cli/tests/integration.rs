#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Mock, ServerGuard};
use predicates::prelude::*;
use tempfile::TempDir;

const HEADLINE: &str = "Date: 2025-01-10T08:00:00Z; Title: X; Description: Y";

fn vigil(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vigil").unwrap();
    cmd.current_dir(dir.path())
        .env("VIGIL_ROOT", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("VIGIL_NEWS_BASE_URL")
        .env_remove("VIGIL_OPENAI_BASE_URL")
        .env_remove("OPENAI_API_KEY")
        .env_remove("NEWS_API_KEY");
    cmd
}

/// `vigil` pointed at a local mock server for both collaborators.
fn vigil_online(dir: &TempDir, server: &ServerGuard) -> Command {
    let mut cmd = vigil(dir);
    cmd.env("VIGIL_NEWS_BASE_URL", server.url())
        .env("VIGIL_OPENAI_BASE_URL", server.url())
        .env("OPENAI_API_KEY", "sk-test")
        .env("NEWS_API_KEY", "news-test");
    cmd
}

fn completion(text: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o",
        "choices": [{"message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
    })
    .to_string()
}

/// Answer chat requests whose body mentions `marker` with `reply`.
fn chat_reply(server: &mut ServerGuard, marker: &str, reply: &str) -> Mock {
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex(marker.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(reply))
        .create()
}

/// Serve `body` for `endpoint`, expecting exactly one fetch.
fn news_listing(server: &mut ServerGuard, endpoint: &str, body: &str) -> Mock {
    server
        .mock("GET", format!("/{endpoint}").as_str())
        .match_query(Matcher::Any)
        .match_header("x-api-key", "news-test")
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create()
}

fn seed_prayer(dir: &TempDir, time_of_day: &str) {
    let record = serde_json::json!({
        "time_of_day": time_of_day,
        "headlines_used": [HEADLINE],
        "prayer_text": "Lord, thank you for this day. Amen."
    });
    std::fs::create_dir_all(dir.path().join(".vigil")).unwrap();
    std::fs::write(
        dir.path().join(".vigil/latest_prayer.json"),
        serde_json::to_string_pretty(&record).unwrap(),
    )
    .unwrap();
}

fn read_json(dir: &TempDir, rel: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.path().join(rel)).unwrap();
    serde_json::from_str(&text).unwrap()
}

// ---------------------------------------------------------------------------
// vigil pray
// ---------------------------------------------------------------------------

#[test]
fn pray_runs_pipeline_and_persists_record() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let topic = news_listing(
        &mut server,
        "everything",
        r#"{"status":"ok","articles":[{"publishedAt":"2025-01-10T08:00:00Z","title":"X","description":"Y"}]}"#,
    );
    let general = news_listing(&mut server, "top-headlines", r#"{"status":"ok","articles":[]}"#);
    chat_reply(&mut server, "filter news headlines", HEADLINE);
    chat_reply(
        &mut server,
        "reverent prayer helper",
        "Lord,\nthank you for this day.\n\nAmen.",
    );
    chat_reply(&mut server, "reverent private prayer", "<speak>enhanced</speak>");

    vigil_online(&dir, &server)
        .args(["pray", "--date", "2025-01-10", "--hour", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"time_of_day\": \"morning\""))
        .stdout(predicate::str::contains(HEADLINE));

    let record = read_json(&dir, ".vigil/latest_prayer.json");
    assert_eq!(record["time_of_day"], "morning");
    assert_eq!(record["headlines_used"][0], HEADLINE);
    let text = record["prayer_text"].as_str().unwrap();
    assert_eq!(text, "Lord, thank you for this day. Amen.");

    // Same day again: both listings come from the cache.
    vigil_online(&dir, &server)
        .args(["pray", "--date", "2025-01-10", "--hour", "20", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"time_of_day\": \"evening\""));
    topic.assert();
    general.assert();

    let saved = read_json(&dir, ".vigil/latest_prayer.json");
    assert_eq!(saved["time_of_day"], "morning", "dry run must not overwrite");

    vigil(&dir)
        .args(["cache", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cache/2025-01-10/everything/"))
        .stdout(predicate::str::contains("cache/2025-01-10/top-headlines/"));
}

#[test]
fn pray_writes_markup_side_file() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    news_listing(&mut server, "everything", r#"{"articles":[]}"#);
    news_listing(&mut server, "top-headlines", r#"{"articles":[]}"#);
    chat_reply(&mut server, "filter news headlines", "");
    chat_reply(&mut server, "reverent prayer helper", "Amen.");
    chat_reply(&mut server, "reverent private prayer", "<speak>Amen</speak>");

    let out = dir.path().join("prayer.ssml");
    vigil_online(&dir, &server)
        .args(["pray", "--show-markup", "--markup-out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("--- speech markup ---"));

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "<speak>Amen</speak>");
    let record = read_json(&dir, ".vigil/latest_prayer.json");
    assert_eq!(record["prayer_text"], "Amen.");
    assert_eq!(record["headlines_used"], serde_json::json!([]));
}

#[test]
fn pray_without_credentials_fails() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .arg("pray")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
    assert!(!dir.path().join(".vigil/latest_prayer.json").exists());
}

#[test]
fn pray_news_outage_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/everything")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status":"error","code":"apiKeyInvalid"}"#)
        .create();

    vigil_online(&dir, &server)
        .arg("pray")
        .assert()
        .failure()
        .stderr(predicate::str::contains("news service unavailable"));
    assert!(!dir.path().join(".vigil/latest_prayer.json").exists());
}

// ---------------------------------------------------------------------------
// vigil metadata
// ---------------------------------------------------------------------------

#[test]
fn metadata_requires_prayer_record() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .arg("metadata")
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing input artifact"));
}

#[test]
fn metadata_writes_slot_for_prayer_time_of_day() {
    let dir = TempDir::new().unwrap();
    seed_prayer(&dir, "evening");
    let mut server = mockito::Server::new();
    chat_reply(
        &mut server,
        "Evening Grace",
        "Title: Evening Grace: Rest\nDescription: An evening prayer for the nation.",
    );

    vigil_online(&dir, &server)
        .arg("metadata")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Evening Grace: Rest\""));

    let record = read_json(&dir, ".vigil/metadata_evening.json");
    assert_eq!(record["description"], "An evening prayer for the nation.");
    assert_eq!(record["time_of_day"], "evening");
    assert_eq!(record["prayer_text"], "Lord, thank you for this day. Amen.");
    assert!(!dir.path().join(".vigil/metadata_morning.json").exists());
}

#[test]
fn metadata_single_line_reply_keeps_previous_slot() {
    let dir = TempDir::new().unwrap();
    seed_prayer(&dir, "morning");
    let previous = serde_json::json!({
        "title": "Dawn of Hope: Day 1",
        "description": "d",
        "time_of_day": "morning",
        "headlines_used": [],
        "prayer_text": "p"
    });
    let slot = dir.path().join(".vigil/metadata_morning.json");
    std::fs::write(&slot, serde_json::to_string_pretty(&previous).unwrap()).unwrap();
    let before = std::fs::read_to_string(&slot).unwrap();

    let mut server = mockito::Server::new();
    let mock = chat_reply(&mut server, "Dawn of Hope: Day 1", "Dawn of Hope only a title");

    vigil_online(&dir, &server)
        .arg("metadata")
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed response"));

    mock.assert();
    assert_eq!(std::fs::read_to_string(&slot).unwrap(), before);
}

// ---------------------------------------------------------------------------
// vigil show
// ---------------------------------------------------------------------------

#[test]
fn show_prayer_prints_record() {
    let dir = TempDir::new().unwrap();
    seed_prayer(&dir, "morning");
    vigil(&dir)
        .args(["show", "prayer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Time of day: morning"))
        .stdout(predicate::str::contains(HEADLINE));
}

#[test]
fn show_metadata_missing_slot_fails() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .args(["show", "metadata", "--slot", "evening"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no evening metadata record yet"));
}

#[test]
fn show_metadata_rejects_unknown_slot() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .args(["show", "metadata", "--slot", "noon"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// vigil config
// ---------------------------------------------------------------------------

#[test]
fn config_init_is_write_if_missing() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    let path = dir.path().join(".vigil/config.yaml");
    assert!(path.exists());

    std::fs::write(&path, "metadata:\n  series:\n    morning: Morning Watch\n").unwrap();
    vigil(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("left unchanged"));
    vigil(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Morning Watch"))
        .stdout(predicate::str::contains("gpt-4o"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));

    std::fs::create_dir_all(dir.path().join(".vigil")).unwrap();
    std::fs::write(
        dir.path().join(".vigil/config.yaml"),
        "stages:\n  compose:\n    model: \"\"\n    max_tokens: 0\n    temperature: 0.7\n",
    )
    .unwrap();
    vigil(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] stages.compose.model is empty"));
}

#[test]
fn config_show_applies_env_overrides() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .args(["--json", "config", "show"])
        .env("VIGIL_NEWS_BASE_URL", "http://news.local/v2")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://news.local/v2"));
}

// ---------------------------------------------------------------------------
// vigil cache
// ---------------------------------------------------------------------------

#[test]
fn cache_prune_removes_old_days() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join(".vigil/cache/2000-01-01/everything");
    std::fs::create_dir_all(&old).unwrap();
    std::fs::write(old.join("q-abc.json"), "{}").unwrap();

    vigil(&dir)
        .args(["cache", "prune", "--keep-days", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 cached payload(s)"));
    assert!(!old.join("q-abc.json").exists());

    vigil(&dir)
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached payloads."));
}

#[test]
fn cache_prune_rejects_oversized_keep_days() {
    let dir = TempDir::new().unwrap();
    vigil(&dir)
        .args(["cache", "prune", "--keep-days", "4294967295"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--keep-days"));
}
