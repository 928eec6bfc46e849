//! Configuration loading: full documents, defaults and error messages.

use std::fs;
use std::path::PathBuf;

use raidkeeper_core::{config, ConfigError};

const FULL: &str = r#"
array_tool:
  binary: /usr/local/bin/snapraid
  config_file: /etc/snapraid.conf
  completion_markers: ["Everything OK"]
  quiet: true
thresholds:
  delete: 100
  update: 250
  sync_warn: 2
  scrub_delayed_runs: 3
sync:
  prehash: false
  force_zero: true
scrub:
  percent: 8
  age_days: 21
  scrub_new: true
post:
  touch: false
  smart_report: false
  status_report: true
  spin_down: true
paths:
  state_dir: /srv/raidkeeper
  run_log: /var/log/raidkeeper.log
notify:
  email_to: ops@example.com
  email_from: nas@example.com
  sendmail: /usr/bin/msmtp
  subject_prefix: "[nas]"
  healthcheck_url: https://hc.example.com/ping/abc
"#;

#[test]
fn full_document_populates_every_section() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, FULL).expect("write");

    let cfg = config::load_at(&path).expect("load");
    assert_eq!(cfg.array_tool.binary, PathBuf::from("/usr/local/bin/snapraid"));
    assert_eq!(cfg.array_tool.completion_markers, vec!["Everything OK".to_string()]);
    assert!(cfg.array_tool.quiet);
    assert_eq!(cfg.thresholds.delete_threshold, 100);
    assert_eq!(cfg.thresholds.update_threshold, 250);
    assert_eq!(cfg.thresholds.sync_warn_threshold, 2);
    assert_eq!(cfg.thresholds.scrub_delayed_runs, 3);
    assert!(!cfg.sync.prehash && cfg.sync.force_zero);
    assert_eq!((cfg.scrub.percent, cfg.scrub.age_days), (8, 21));
    assert!(cfg.scrub.scrub_new);
    assert!(!cfg.post.touch && cfg.post.spin_down);
    assert_eq!(
        cfg.paths.sync_warn_counter_path(),
        PathBuf::from("/srv/raidkeeper/sync_warn.count")
    );
    assert_eq!(cfg.paths.run_log_path(), PathBuf::from("/var/log/raidkeeper.log"));
    assert_eq!(cfg.notify.subject_prefix, "[nas]");
    assert_eq!(
        cfg.notify.healthcheck_url.as_deref(),
        Some("https://hc.example.com/ping/abc")
    );
}

#[test]
fn serialized_default_reloads_identically() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    let yaml = serde_yaml::to_string(&config::Config::default()).expect("serialize");
    fs::write(&path, yaml).expect("write");
    assert_eq!(config::load_at(&path).expect("load"), config::Config::default());
}

#[test]
fn parse_error_names_the_file() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "thresholds:\n  delete: many\n").expect("write");

    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn blank_completion_markers_are_rejected() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "array_tool:\n  completion_markers: [\"  \"]\n").expect("write");
    assert!(matches!(
        config::load_at(&path).unwrap_err(),
        ConfigError::Invalid(_)
    ));
}
