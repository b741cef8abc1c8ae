use std::ffi::OsString;
use std::path::Path;

use mineboard_core::datastore::{DEFAULT_CATEGORIES, DataStore};
use mineboard_shared::NewTask;
use tempfile::tempdir;

fn board(data: &Path, rest: &[&str]) -> anyhow::Result<()> {
    let rc = data.join("boardrc");
    std::fs::write(&rc, "color=off\n").expect("write boardrc");

    let mut args: Vec<OsString> = vec![
        "board".into(),
        "--boardrc".into(),
        rc.into_os_string(),
        "--data".into(),
        data.as_os_str().to_owned(),
    ];
    args.extend(rest.iter().map(OsString::from));
    mineboard_core::run(args)
}

#[test]
fn datastore_roundtrip_and_toggles() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");
    assert_eq!(
        store.load_categories().expect("categories").len(),
        DEFAULT_CATEGORIES.len()
    );

    let created = store
        .add_task(NewTask {
            title: "Farm de ferro".to_string(),
            categories: vec![3],
            created_by: "Alex".to_string(),
        })
        .expect("add task");
    assert_eq!(created.id, 1);
    assert_eq!(created.categories[0].name, "Automação");

    store
        .toggle_assignment("Steve", created.id)
        .expect("join task");
    store.toggle_completion(created.id).expect("complete task");

    let reopened = DataStore::open(temp.path()).expect("reopen datastore");
    let tasks = reopened.load_tasks().expect("load tasks");
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].completed);
    assert!(tasks[0].has_player("Steve"));
}

#[test]
fn cli_flow_requires_nickname_then_mutates() {
    let temp = tempdir().expect("tempdir");

    let err = board(temp.path(), &["add", "Muralha", "-c", "Construção"])
        .expect_err("no nickname yet");
    assert!(format!("{err:#}").contains("board nick"));

    board(temp.path(), &["nick", "  Steve "]).expect("set nickname");
    board(temp.path(), &["add", "Muralha", "-c", "construção", "-c", "2"]).expect("add task");
    board(temp.path(), &["join", "1"]).expect("join task");
    board(temp.path(), &["done", "1"]).expect("complete task");

    let store = DataStore::open(temp.path()).expect("open datastore");
    let tasks = store.load_tasks().expect("load tasks");
    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task.title, "Muralha");
    assert_eq!(task.created_by, "Steve");
    assert!(task.completed);
    assert!(task.has_player("Steve"));
    let ids: Vec<i64> = task.categories.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn cli_reports_unknown_task_and_category() {
    let temp = tempdir().expect("tempdir");
    board(temp.path(), &["nick", "Alex"]).expect("set nickname");

    let err = board(temp.path(), &["done", "42"]).expect_err("unknown task");
    assert!(format!("{err:#}").contains("42"));

    let err = board(temp.path(), &["list", "--category", "Redstone"]).expect_err("unknown category");
    assert!(format!("{err:#}").contains("unknown category"));

    board(temp.path(), &["categories"]).expect("list categories");
    board(temp.path(), &[]).expect("default listing");
}
