//! Shared fixtures for integration tests.

#![allow(dead_code)]

use reldb_core::{Config, Record, Relationships, Store};
use serde::{Deserialize, Serialize};
use std::sync::Once;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project: String,
    pub labels: Vec<String>,
    pub title: String,
}

impl Task {
    pub fn new(project: &str, title: &str) -> Self {
        Self {
            project: project.to_string(),
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.labels.push(label.to_string());
        self
    }
}

impl Record for Task {
    const TYPE_NAME: &'static str = "task";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn relationships(&self) -> Relationships {
        Relationships::new()
            .with("projects", [&self.project])
            .with("labels", &self.labels)
    }
}

pub const RELATIONSHIPS: [&str; 2] = ["projects", "labels"];

pub fn open(config: Config) -> Store<Task> {
    init_tracing();
    Store::open(config, RELATIONSHIPS).unwrap()
}

/// Installs a test subscriber once; `RUST_LOG=reldb_core=debug` shows batch
/// splits and flushes.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
