use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::VecDeque;
use xtts_narrator::infrastructure::config::{
    ConfigStore, ConfigStoreError, PathPrompt, XTTS_FOLDER_KEY,
};

struct Answers(VecDeque<String>);

impl Answers {
    fn new(answers: &[&str]) -> Self {
        Self(answers.iter().map(|a| a.to_string()).collect())
    }
}

impl PathPrompt for Answers {
    fn ask(&mut self, _message: &str) -> Option<String> {
        self.0.pop_front()
    }

    fn notify(&mut self, _message: &str) {}
}

#[test]
fn it_should_recover_from_a_corrupt_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("database.json"));
    std::fs::write(store.path(), "").unwrap();
    let backend = dir.path().join("xtts");
    std::fs::create_dir(&backend).unwrap();

    let resolved = store
        .resolve_path(XTTS_FOLDER_KEY, &mut Answers::new(&[backend.to_str().unwrap()]))
        .unwrap();

    assert_eq!(resolved, backend);
    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(saved[XTTS_FOLDER_KEY], Value::String(backend.display().to_string()));
}

#[test]
fn it_should_keep_unrelated_settings_when_saving() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("database.json"));
    std::fs::write(store.path(), r#"{"xtts_folder": "/gone", "voice": "narrator.wav"}"#).unwrap();
    let backend = dir.path().join("xtts");
    std::fs::create_dir(&backend).unwrap();

    store
        .resolve_path(XTTS_FOLDER_KEY, &mut Answers::new(&[backend.to_str().unwrap()]))
        .unwrap();

    assert_eq!(store.get("voice").as_deref(), Some("narrator.wav"));
    assert_eq!(store.get(XTTS_FOLDER_KEY).as_deref(), backend.to_str());
}

#[test]
fn it_should_give_up_when_answers_run_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("database.json"));

    let result = store.resolve_path(XTTS_FOLDER_KEY, &mut Answers::new(&["", "/nope"]));

    assert!(matches!(result, Err(ConfigStoreError::PromptClosed)));
    assert!(!store.path().exists());
}
