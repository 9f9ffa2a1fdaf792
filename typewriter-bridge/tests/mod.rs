use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use typewriter_bridge::app;
use typewriter_bridge::cli::CliArgs;
use typewriter_bridge::render::{visible_window, Mode, Renderer};
use typewriter_bridge::settings::{apply_overrides, resolve};
use typewriter_bridge::util::payload_text;
use typewriter_core::{
    DelayPolicy, Outcome, Position, SpanDelimiter, Strategy, TypewriterConfig,
};

// ============================================================================
// Helpers
// ============================================================================

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

/// Args pointing at an explicit config so the user's config dir is never read.
fn args_with_config(dir: &TempDir, config_json: &str) -> CliArgs {
    CliArgs {
        input: dir.path().join("input.txt"),
        config: Some(write_file(dir, "config.json", config_json)),
        ..CliArgs::default()
    }
}

// ============================================================================
// Settings Tests
// ============================================================================

#[test]
fn test_resolve_explicit_config() {
    let dir = TempDir::new().unwrap();
    let args = args_with_config(
        &dir,
        r#"{ "delay": { "kind": "fixed", "base": 0, "increment": 40 }, "seed": 3 }"#,
    );

    let config = resolve(&args).unwrap();
    assert_eq!(config.delay, DelayPolicy::fixed(Duration::from_millis(40)));
    assert_eq!(config.seed, Some(3));
    assert_eq!(config.strategy, Strategy::Sequential);
}

#[test]
fn test_resolve_flags_override_file() {
    let dir = TempDir::new().unwrap();
    let mut args = args_with_config(&dir, r#"{ "strip_delimiters": false, "seed": 3 }"#);
    args.speed = Some("20-80".into());
    args.delimiter = Some("@@".into());
    args.strip = true;
    args.timers = true;
    args.seed = Some(9);

    let config = resolve(&args).unwrap();
    assert_eq!(
        config.delay,
        DelayPolicy::Random {
            min: Duration::from_millis(20),
            max: Duration::from_millis(80),
        }
    );
    assert_eq!(config.delimiter, SpanDelimiter::symmetric("@@").unwrap());
    assert!(config.strip_delimiters);
    assert_eq!(config.strategy, Strategy::Timers);
    assert_eq!(config.seed, Some(9));
}

#[test]
fn test_resolve_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    let args = CliArgs {
        config: Some(dir.path().join("nope.json")),
        ..CliArgs::default()
    };
    assert!(resolve(&args).is_err());
}

#[test]
fn test_resolve_rejects_zero_delay_timers() {
    let dir = TempDir::new().unwrap();
    let mut args = args_with_config(&dir, "{}");
    args.speed = Some("0".into());
    args.timers = true;
    assert!(resolve(&args).is_err());
}

#[test]
fn test_overrides_reject_bad_values() {
    let mut config = TypewriterConfig::default();

    let bad_speed = CliArgs {
        speed: Some("fast".into()),
        ..CliArgs::default()
    };
    let err = apply_overrides(&mut config, &bad_speed).unwrap_err();
    assert!(err.to_string().contains("--speed"));

    let empty_marker = CliArgs {
        delimiter: Some(String::new()),
        ..CliArgs::default()
    };
    assert!(apply_overrides(&mut config, &empty_marker).is_err());
    assert_eq!(config, TypewriterConfig::default());
}

// ============================================================================
// Render Tests
// ============================================================================

#[test]
fn test_window_fits() {
    let (first, lines) = visible_window("a\nb", 1, 5);
    assert_eq!(first, 0);
    assert_eq!(lines, vec!["a", "b"]);
}

#[test]
fn test_window_follows_cursor() {
    let text = "a\nb\nc\nd";
    assert_eq!(visible_window(text, 0, 2), (0, vec!["a", "b"]));
    assert_eq!(visible_window(text, 3, 2), (2, vec!["c", "d"]));
}

#[test]
fn test_window_zero_rows() {
    assert_eq!(visible_window("a\nb", 1, 0), (0, Vec::<&str>::new()));
}

#[test]
fn test_plain_renderer_streams_text() {
    let mut out = Vec::new();
    {
        let mut renderer = Renderer::new(&mut out, Mode::Plain);
        renderer.begin().unwrap();
        for key in ["h", "i", "\n"] {
            renderer.keystroke(key).unwrap();
        }
        renderer.frame("ignored", Position::ORIGIN).unwrap();
        renderer.end("hi\n").unwrap();
    }
    assert_eq!(String::from_utf8(out).unwrap(), "hi\n");
}

#[test]
fn test_live_renderer_draws_and_restores() {
    let mut out = Vec::new();
    {
        let mut renderer = Renderer::new(&mut out, Mode::Live).with_size(20, 4);
        renderer.begin().unwrap();
        renderer.keystroke("x").unwrap();
        renderer.frame("hello\nworld", Position::new(1, 5)).unwrap();
        renderer.end("hello\nworld").unwrap();
    }
    let rendered = String::from_utf8_lossy(&out).to_string();
    assert!(rendered.contains("hello"));
    assert!(rendered.contains("world"));
    // Keystrokes are not streamed in live mode.
    assert!(!rendered.contains('x'));
    assert!(rendered.ends_with("hello\nworld\n"));
}

#[test]
fn test_live_renderer_restores_terminal_on_drop() {
    let mut out = Vec::new();
    {
        let mut renderer = Renderer::new(&mut out, Mode::Live).with_size(20, 4);
        renderer.begin().unwrap();
        renderer.frame("half", Position::new(0, 4)).unwrap();
    }
    let rendered = String::from_utf8_lossy(&out).to_string();
    // Leave alternate screen, then show cursor.
    assert!(rendered.ends_with("\x1b[?1049l\x1b[?25h"));
}

// ============================================================================
// Util Tests
// ============================================================================

#[test]
fn test_payload_text_variants() {
    let literal: Box<dyn std::any::Any + Send> = Box::new("boom");
    let formatted: Box<dyn std::any::Any + Send> = Box::new(format!("bad cursor {}", 3));
    let opaque: Box<dyn std::any::Any + Send> = Box::new(42u32);

    assert_eq!(payload_text(literal.as_ref()), "boom");
    assert_eq!(payload_text(formatted.as_ref()), "bad cursor 3");
    assert_eq!(payload_text(opaque.as_ref()), "<opaque panic payload>");
}

// ============================================================================
// App Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_app_plain_replay() {
    let dir = TempDir::new().unwrap();
    let mut args = args_with_config(&dir, "{}");
    write_file(&dir, "input.txt", "  ab\n\n\ncd  \n");
    args.speed = Some("5".into());
    args.plain = true;

    let mut out = Vec::new();
    let report = app::run(args, &mut out).await.unwrap();

    assert_eq!(report.outcome, Outcome::Done);
    assert_eq!(report.blocks_completed, 2);
    assert_eq!(report.keystrokes, 6);
    assert_eq!(report.final_cursor, Position::new(2, 0));
    assert_eq!(String::from_utf8(out).unwrap(), "ab\ncd\n");
}

#[tokio::test(start_paused = true)]
async fn test_app_timer_replay_with_span() {
    let dir = TempDir::new().unwrap();
    let mut args = args_with_config(&dir, "{}");
    write_file(&dir, "input.txt", "x =h=secret=h= y");
    args.speed = Some("5".into());
    args.timers = true;
    args.strip = true;
    args.plain = true;

    let mut out = Vec::new();
    let report = app::run(args, &mut out).await.unwrap();

    assert_eq!(report.outcome, Outcome::Done);
    // "x", " ", span, " ", "y", "\n"
    assert_eq!(report.keystrokes, 6);
    assert_eq!(String::from_utf8(out).unwrap(), "x secret y\n");
}

#[tokio::test]
async fn test_app_missing_input() {
    let dir = TempDir::new().unwrap();
    let mut args = args_with_config(&dir, "{}");
    args.plain = true;

    let err = app::run(args, Vec::new()).await.unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}
