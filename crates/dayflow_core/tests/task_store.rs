use dayflow_core::db::{open_db, open_db_in_memory};
use dayflow_core::{
    Category, RepoError, SqliteTaskRepository, StoreError, Task, TaskRepository, TaskStore,
};

fn spawn_store() -> TaskStore {
    TaskStore::spawn(open_db_in_memory().unwrap()).unwrap()
}

#[tokio::test]
async fn insert_assigns_ids_and_lists_newest_first() {
    let store = spawn_store();

    let first = store
        .insert(Task::new("E-Mails sortieren", Category::Work))
        .wait()
        .await
        .unwrap();
    let second = store
        .insert(Task::new("Kapitel 4 lernen", Category::Study))
        .wait()
        .await
        .unwrap();

    assert!(first > 0);
    assert!(second > first);
    let snapshot = store.snapshot();
    let ids: Vec<i64> = snapshot.iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(snapshot[0].category, Category::Study);
    assert!(!snapshot[0].done);
}

#[tokio::test]
async fn mutations_apply_in_submission_order() {
    let store = spawn_store();

    for title in ["eins", "zwei", "drei"] {
        let _ = store.insert(Task::new(title, Category::Other));
    }
    store
        .insert(Task::new("vier", Category::Other))
        .wait()
        .await
        .unwrap();

    let titles: Vec<String> = store.snapshot().iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, vec!["vier", "drei", "zwei", "eins"]);
}

#[tokio::test]
async fn explicit_id_replaces_existing_row() {
    let store = spawn_store();
    let id = store
        .insert(Task::new("Yoga Session", Category::Physical))
        .wait()
        .await
        .unwrap();

    let replacement = Task {
        id,
        title: "Yoga Session (lang)".to_string(),
        done: true,
        category: Category::Physical,
    };
    let replaced_id = store.insert(replacement.clone()).wait().await.unwrap();

    assert_eq!(replaced_id, id);
    assert_eq!(store.snapshot().as_slice(), &[replacement]);
}

#[tokio::test]
async fn update_and_delete_of_missing_ids_are_no_ops() {
    let store = spawn_store();
    let id = store
        .insert(Task::new("Mama anrufen", Category::Personal))
        .wait()
        .await
        .unwrap();

    let ghost = Task {
        id: id + 100,
        title: "ghost".to_string(),
        done: true,
        category: Category::Other,
    };
    store.update(ghost).wait().await.unwrap();
    store.delete_by_id(id + 100).wait().await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].title, "Mama anrufen");
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let store = spawn_store();
    let id = store
        .insert(Task::new("Rechnung überweisen", Category::Other))
        .wait()
        .await
        .unwrap();

    let updated = Task {
        id,
        title: "Rechnung bezahlen".to_string(),
        done: true,
        category: Category::Personal,
    };
    store.update(updated.clone()).wait().await.unwrap();

    assert_eq!(store.snapshot().as_slice(), &[updated]);
}

#[tokio::test]
async fn observers_get_latest_on_subscribe_and_every_push() {
    let store = spawn_store();
    let mut early = store.observe_all();
    assert!(early.next().await.unwrap().is_empty());

    let id = store
        .insert(Task::new("Vokabeln wiederholen", Category::Study))
        .wait()
        .await
        .unwrap();
    let pushed = early.next().await.unwrap();
    assert_eq!(pushed.len(), 1);

    let mut late = store.observe_all();
    assert_eq!(late.next().await.unwrap().len(), 1);

    store.delete_by_id(id).wait().await.unwrap();
    assert!(early.next().await.unwrap().is_empty());
    assert!(late.next().await.unwrap().is_empty());
    assert!(late.current().is_empty());
}

#[tokio::test]
async fn blank_title_insert_fails_without_publishing() {
    let store = spawn_store();
    let blank = Task {
        title: "   ".to_string(),
        ..Task::new("placeholder", Category::Other)
    };

    let err = store.insert(blank).wait().await.unwrap_err();
    assert!(matches!(err, StoreError::Repo(RepoError::Validation(_))));
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn tasks_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayflow.sqlite3");

    {
        let store = TaskStore::spawn(open_db(&path).unwrap()).unwrap();
        store
            .insert(Task::new("Einkaufen für die Woche", Category::Personal))
            .wait()
            .await
            .unwrap();
    }

    let reopened = TaskStore::spawn(open_db(&path).unwrap()).unwrap();
    let snapshot = reopened.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].category, Category::Personal);
}

#[test]
fn unknown_persisted_category_is_a_load_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tasks (title, done, category) VALUES ('Gitarre', 0, 'HOBBY');",
        [],
    )
    .unwrap();

    let repo_err = SqliteTaskRepository::new(&conn).list_tasks().unwrap_err();
    assert!(matches!(repo_err, RepoError::InvalidData(ref message) if message.contains("HOBBY")));

    let store_err = TaskStore::spawn(conn).err().expect("spawn should fail");
    assert!(matches!(store_err, StoreError::Repo(RepoError::InvalidData(_))));
}

#[tokio::test]
async fn committed_write_succeeds_when_the_list_cannot_be_reread() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayflow.sqlite3");
    let store = TaskStore::spawn(open_db(&path).unwrap()).unwrap();

    let other = open_db(&path).unwrap();
    other
        .execute(
            "INSERT INTO tasks (title, done, category) VALUES ('Gitarre', 0, 'HOBBY');",
            [],
        )
        .unwrap();

    let id = store
        .insert(Task::new("Wäsche", Category::Personal))
        .wait()
        .await
        .expect("the row is written even though the re-read fails");
    assert!(store.snapshot().is_empty());

    other
        .execute("DELETE FROM tasks WHERE category = 'HOBBY';", [])
        .unwrap();
    store.delete_by_id(id + 100).wait().await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, id);
    assert_eq!(snapshot[0].title, "Wäsche");
}
