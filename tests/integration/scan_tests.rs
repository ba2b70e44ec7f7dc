use dupsift::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupsift::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: &std::path::Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(results.groups.is_empty());
    assert_eq!(results.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.error_count(), 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"content a");
    write_file(&dir.path().join("b.txt"), b"content bb");
    write_file(&dir.path().join("c.txt"), b"content ccc");

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(!results.has_duplicates());
    assert_eq!(results.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    // Nothing shared a size, so nothing was read.
    assert_eq!(summary.full.hashed_files, 0);
    assert_eq!(summary.partial.hashed_files, 0);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    write_file(&a, b"X");
    write_file(&b, b"X");
    write_file(&dir.path().join("c"), b"Y");

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(results.groups.len(), 1);
    assert_eq!(results.groups[0].size, 1);
    assert_eq!(results.groups[0].paths, vec![a, b]);
    assert_eq!(results.duplicates, 2);
    assert_eq!(results.redundant_size, 1);
    assert_eq!(results.total_files, 3);
    assert_eq!(summary.full.unique_dropped, 1);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir").join("deeper");
    fs::create_dir_all(&sub).unwrap();

    write_file(&dir.path().join("top.txt"), b"nested duplicate");
    write_file(&sub.join("bottom.txt"), b"nested duplicate");

    let finder = DuplicateFinder::with_defaults();
    let (results, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(results.groups.len(), 1);
    assert_eq!(results.groups[0].len(), 2);
}

#[test]
fn test_scan_multiple_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write_file(&first.path().join("photo.jpg"), b"same bytes in both trees");
    write_file(&second.path().join("backup.jpg"), b"same bytes in both trees");

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder
        .find_duplicates(&[first.path().to_path_buf(), second.path().to_path_buf()])
        .unwrap();

    assert_eq!(results.groups.len(), 1);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_overlapping_roots_classify_each_path_once() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write_file(&sub.join("a"), b"one");
    write_file(&sub.join("b"), b"two");

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder
        .find_duplicates(&[dir.path().to_path_buf(), sub.clone()])
        .unwrap();

    // The same file reached through both roots is not its own duplicate.
    assert!(results.groups.is_empty());
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_group_ordering_by_size_then_path() {
    let dir = tempdir().unwrap();
    for name in ["z1", "z2"] {
        write_file(&dir.path().join(name), b"aa");
    }
    for name in ["m1", "m2"] {
        write_file(&dir.path().join(name), b"bb");
    }
    for name in ["a1", "a2"] {
        write_file(&dir.path().join(name), b"cccc");
    }

    let finder = DuplicateFinder::with_defaults();
    let (results, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    let firsts: Vec<PathBuf> = results
        .groups
        .iter()
        .map(|g| g.paths[0].clone())
        .collect();
    assert_eq!(
        firsts,
        vec![dir.path().join("m1"), dir.path().join("z1"), dir.path().join("a1")]
    );
    assert_eq!(results.groups[2].size, 4);
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write_file(&dir.path().join(format!("dup_{i}")), &[b'q'; 300]);
        write_file(&dir.path().join(format!("pair_{}", i % 3)), format!("pair {}", i % 3).as_bytes());
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(3));
    let (first, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();
    let (second, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let err = finder
        .find_duplicates(&[dir.path().join("nope")])
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(_)));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    write_file(&file, b"data");

    let finder = DuplicateFinder::with_defaults();
    let err = finder.find_duplicates(&[file]).unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[cfg(unix)]
#[test]
fn test_symlinks_ignored_unless_followed() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    write_file(&target, b"linked content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();
    assert!(results.groups.is_empty());
    assert_eq!(summary.ignored_entries, 1);

    // Followed, the link resolves to the same inode and is collapsed.
    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(true));
    let finder = DuplicateFinder::new(config);
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();
    assert!(results.groups.is_empty());
    assert_eq!(summary.hardlinks_filtered, 1);
}
