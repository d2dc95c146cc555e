//! # Checkpoint Flow
//!
//! Live store → archive → validate against a network → restore or serve
//! read-only.

use shared_types::ScriptHash;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use xc_01_kv_store::{CheckpointStore, Family, RocksDbConfig, RocksDbStore, Store};
use xc_02_checkpoint::{CheckpointConfig, CheckpointError, CheckpointManager};

const MAGIC: u32 = 5566;

fn account() -> ScriptHash {
    ScriptHash::from_script(b"single validator")
}

fn populated_store(root: &Path) -> RocksDbStore {
    let store = RocksDbStore::open(RocksDbConfig::for_testing(root.join("live"))).unwrap();
    let mut view = store.snapshot();
    view.put(Family::Block, b"block-0", b"genesis");
    view.put(Family::Storage, b"balance", b"1000");
    view.commit().unwrap();
    store.put_general(b"engine-blob", b"opaque").unwrap();
    store
}

fn manager(root: &Path) -> CheckpointManager {
    CheckpointManager::new(CheckpointConfig::for_testing(root.join("scratch")))
}

#[test]
fn test_checkpoint_from_other_network_leaves_target_untouched() {
    let root = TempDir::new().unwrap();
    let store = populated_store(root.path());
    let manager = manager(root.path());
    let archive = root.path().join("net.tar.zst");
    manager.create(&store, &archive, MAGIC, &account()).unwrap();

    let target = root.path().join("node1");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("marker"), b"previous chain").unwrap();

    let err = manager.validate(&archive, 9999, &account()).unwrap_err();
    assert!(matches!(err, CheckpointError::InvalidCheckpoint(_)));

    let other_account = ScriptHash::from_script(b"someone else");
    assert!(matches!(
        manager.validate(&archive, MAGIC, &other_account),
        Err(CheckpointError::InvalidCheckpoint(_))
    ));

    assert_eq!(fs::read(target.join("marker")).unwrap(), b"previous chain");
    assert_eq!(fs::read_dir(&target).unwrap().count(), 1);
}

#[test]
fn test_restore_reproduces_store_contents() {
    let root = TempDir::new().unwrap();
    let store = populated_store(root.path());
    let manager = manager(root.path());
    let archive = root.path().join("cp.tar.zst");
    manager.create(&store, &archive, MAGIC, &account()).unwrap();

    // Writes after the checkpoint are not part of it.
    store.put_general(b"later", b"write").unwrap();

    let validated = manager.validate(&archive, MAGIC, &account()).unwrap();
    let target = root.path().join("restored");
    manager.restore(&validated, &target, false).unwrap();

    let restored = CheckpointStore::open(&target).unwrap();
    assert_eq!(
        restored.get(Family::Block, b"block-0").unwrap(),
        Some(b"genesis".to_vec())
    );
    assert_eq!(
        restored.get(Family::Storage, b"balance").unwrap(),
        Some(b"1000".to_vec())
    );
    assert_eq!(restored.get_general(b"engine-blob").unwrap(), Some(b"opaque".to_vec()));
    assert_eq!(restored.get_general(b"later").unwrap(), None);
}

#[test]
fn test_second_create_keeps_first_archive() {
    let root = TempDir::new().unwrap();
    let store = populated_store(root.path());
    let manager = manager(root.path());
    let archive = root.path().join("cp.tar.zst");
    manager.create(&store, &archive, MAGIC, &account()).unwrap();
    let first = fs::read(&archive).unwrap();

    store.put_general(b"more", b"data").unwrap();
    assert!(matches!(
        manager.create(&store, &archive, MAGIC, &account()),
        Err(CheckpointError::CheckpointExists(_))
    ));
    assert_eq!(fs::read(&archive).unwrap(), first);
}

#[test]
fn test_read_only_checkpoint_overlay_is_not_persisted() {
    let root = TempDir::new().unwrap();
    let store = populated_store(root.path());
    let manager = manager(root.path());
    let archive = root.path().join("cp.tar.zst");
    manager.create(&store, &archive, MAGIC, &account()).unwrap();

    {
        let extracted = manager.open_read_only(&archive, MAGIC, &account()).unwrap();
        extracted.put_general(b"engine-blob", b"changed").unwrap();
        assert_eq!(
            extracted.get_general(b"engine-blob").unwrap(),
            Some(b"changed".to_vec())
        );
    }

    let extracted = manager.open_read_only(&archive, MAGIC, &account()).unwrap();
    assert_eq!(
        extracted.get_general(b"engine-blob").unwrap(),
        Some(b"opaque".to_vec())
    );
}
