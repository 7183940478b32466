//! Cross-run persistence: a fresh backend instance pointed at an existing
//! directory picks up entries written by an earlier instance.

use corpus_cache::{Cacher, DiskCache, TensorCache, TensorRecord};
use tempfile::TempDir;

#[test]
fn test_disk_entries_survive_across_instances() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut cache = DiskCache::new(temp_dir.path()).unwrap();
        cache.store(11, &vec![9_i32, 8]).unwrap();
    }

    let cache: DiskCache<Vec<i32>> = DiskCache::new(temp_dir.path()).unwrap();
    assert!(cache.contains(11));
    assert_eq!(cache.load(11).unwrap(), vec![9, 8]);
}

#[test]
fn test_tensor_entries_survive_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let record = TensorRecord::from_f32(vec![2], &[0.25, 0.75]).unwrap();

    {
        let mut cache = TensorCache::new(temp_dir.path()).unwrap();
        cache.store(2, &record).unwrap();
    }

    let cache: TensorCache<TensorRecord> = TensorCache::new(temp_dir.path()).unwrap();
    assert!(cache.contains(2));
    assert_eq!(cache.load(2).unwrap(), record);
}

#[test]
fn test_backends_sharing_a_directory_do_not_collide() {
    let temp_dir = TempDir::new().unwrap();

    let mut generic = DiskCache::new(temp_dir.path()).unwrap();
    let mut tensors = TensorCache::new(temp_dir.path()).unwrap();

    generic.store(0, &vec![1_i32, 2]).unwrap();
    tensors.store(0, &TensorRecord::from_f32(vec![1], &[9.0]).unwrap()).unwrap();

    // Same index, two files: distinct default extensions keep them apart.
    assert!(temp_dir.path().join("0.bin").is_file());
    assert!(temp_dir.path().join("0.tensor").is_file());
    assert_eq!(generic.load(0).unwrap(), vec![1, 2]);
    assert_eq!(tensors.load(0).unwrap().to_f32().unwrap(), vec![9.0]);
}

#[test]
fn test_clean_by_one_instance_is_seen_by_the_next() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("cache");

    {
        let mut cache = DiskCache::new(&dir).unwrap();
        cache.store(0, &vec![1_i32]).unwrap();
        cache.clean().unwrap();
    }

    let cache: DiskCache<Vec<i32>> = DiskCache::new(&dir).unwrap();
    assert!(!cache.contains(0));
}
