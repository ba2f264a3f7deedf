//! File-backed record store and backend selection.

use std::fs;

use floodwatch::adapters::storage::{FileStore, open_store};
use floodwatch::app::ports::{RecordStore, StorageError};
use floodwatch::config::{MonitorConfig, StorageMode, fixed_str};
use floodwatch::monitor::AlertLevel;
use floodwatch::record::PersistenceRecord;

use super::mock_hw::{calm, scratch_dir};

fn record(ts: u64) -> PersistenceRecord {
    PersistenceRecord::build(&calm(), AlertLevel::Normal, "it", ts)
}

fn names(store: &impl RecordStore) -> Vec<String> {
    store.list().unwrap().into_iter().map(|i| i.name).collect()
}

#[test]
fn file_store_prunes_oldest_by_timestamp() {
    let dir = scratch_dir("prune");
    let mut store = FileStore::open(&dir, 3).unwrap();

    for ts in [9_000, 10_000, 1_000, 20_000] {
        store.save(&record(ts)).unwrap();
    }

    // 1_000 was the oldest; 9_000 sorts before 10_000 numerically.
    assert_eq!(
        names(&store),
        ["data_1_9000.json", "data_1_10000.json", "data_1_20000.json"]
    );
    assert!(!dir.join("data_1_1000.json").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn file_store_ignores_foreign_files() {
    let dir = scratch_dir("foreign");
    let mut store = FileStore::open(&dir, 10).unwrap();
    fs::write(dir.join("monitor.cfg"), b"blob").unwrap();
    fs::write(dir.join("notes.txt"), b"x").unwrap();

    store.save(&record(30_000)).unwrap();

    assert_eq!(store.count(), 1);
    assert_eq!(names(&store), ["data_1_30000.json"]);
    assert!(dir.join("monitor.cfg").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn file_store_read_and_delete() {
    let dir = scratch_dir("rw");
    let mut store = FileStore::open(&dir, 10).unwrap();
    let name = store.save(&record(60_000)).unwrap();

    let bytes = store.read(&format!("/{name}")).unwrap();
    let back = PersistenceRecord::from_json(&bytes).unwrap();
    assert_eq!(back, record(60_000));

    let listed = store.list().unwrap();
    assert_eq!(listed[0].size, bytes.len());

    assert_eq!(store.read("../monitor.cfg"), Err(StorageError::InvalidName));
    store.delete(&name).unwrap();
    assert_eq!(store.delete(&name), Err(StorageError::NotFound));
    assert_eq!(store.count(), 0);
    assert_eq!(store.kind(), "flash");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn open_store_memory_mode() {
    let store = open_store(&MonitorConfig::default());
    assert_eq!(store.kind(), "memory");
    assert_eq!(store.count(), 0);
}

#[test]
fn open_store_flash_mode_writes_files() {
    // Relative so it fits the 64-byte root field.
    let root = format!("target/floodwatch-it-open-{}", std::process::id());
    let _ = fs::remove_dir_all(&root);
    let config = MonitorConfig {
        storage_mode: StorageMode::Flash,
        storage_root: fixed_str(&root),
        ..MonitorConfig::default()
    };

    let mut store = open_store(&config);
    assert_eq!(store.kind(), "flash");
    store.save(&record(30_000)).unwrap();
    assert!(std::path::Path::new(&root).join("data_1_30000.json").exists());
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn records_survive_reboot_with_smaller_uptime() {
    let dir = scratch_dir("reboot");
    {
        let mut first = FileStore::open(&dir, 3).unwrap();
        for ts in [100_000, 200_000, 300_000] {
            first.save(&record(ts)).unwrap();
        }
    }

    // Uptime restarts near zero after a reset.
    let mut second = FileStore::open(&dir, 3).unwrap();
    let name = second.save(&record(30_000)).unwrap();

    assert_eq!(name, "data_2_30000.json");
    let back = PersistenceRecord::from_json(&second.read(&name).unwrap()).unwrap();
    assert_eq!(back.timestamp, 30_000);
    assert_eq!(
        names(&second),
        ["data_1_200000.json", "data_1_300000.json", "data_2_30000.json"]
    );
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn same_uptime_after_reboot_keeps_both_records() {
    let dir = scratch_dir("reboot-same");
    let before = FileStore::open(&dir, 10).unwrap().save(&record(30_000)).unwrap();
    let after = FileStore::open(&dir, 10).unwrap().save(&record(30_000)).unwrap();

    assert_ne!(before, after);
    let store = FileStore::open(&dir, 10).unwrap();
    assert_eq!(names(&store), [before, after]);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn untagged_records_sort_before_tagged_ones() {
    let dir = scratch_dir("legacy");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("data_900000.json"), record(900_000).to_json().unwrap()).unwrap();

    let mut store = FileStore::open(&dir, 1).unwrap();
    let name = store.save(&record(1_000)).unwrap();

    assert_eq!(name, "data_1_1000.json");
    assert_eq!(names(&store), [name]);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn save_succeeds_when_pruning_fails() {
    let dir = scratch_dir("stuck-prune");
    // A directory with a record name cannot be removed as a file.
    fs::create_dir_all(dir.join("data_0_1.json")).unwrap();

    let mut store = FileStore::open(&dir, 1).unwrap();
    let name = store.save(&record(5_000)).unwrap();

    assert_eq!(name, "data_1_5000.json");
    assert!(store.read(&name).is_ok());
    assert!(dir.join("data_0_1.json").is_dir());
    let _ = fs::remove_dir_all(&dir);
}
