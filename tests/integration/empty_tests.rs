use dupsift::duplicates::{DuplicateFinder, FinderConfig};
use std::fs::{self, File};
use tempfile::tempdir;

#[test]
fn test_empty_files_form_one_group() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("e1")).unwrap();
    File::create(dir.path().join("e2")).unwrap();
    File::create(dir.path().join("e3")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(results.groups.len(), 1);
    assert_eq!(results.groups[0].size, 0);
    assert_eq!(results.groups[0].len(), 3);
    assert_eq!(results.redundant_size, 0);
    assert_eq!(summary.empty_files, 3);
    assert_eq!(summary.full.hashed_files, 0);
}

#[test]
fn test_single_empty_file_is_not_a_group() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("lonely")).unwrap();
    fs::write(dir.path().join("data"), b"x").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (results, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(results.groups.is_empty());
}

#[test]
fn test_ignore_empty_files() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("e1")).unwrap();
    File::create(dir.path().join("e2")).unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_ignore_empty(true));
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(results.groups.len(), 1);
    assert_eq!(results.groups[0].size, 3);
    assert_eq!(summary.empty_files_ignored, 2);
}

#[test]
fn test_empty_group_sorts_first() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();
    File::create(dir.path().join("y")).unwrap();
    File::create(dir.path().join("z")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (results, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(results.groups.len(), 2);
    assert_eq!(results.groups[0].size, 0);
    assert_eq!(results.groups[0].paths[0], dir.path().join("y"));
    assert_eq!(results.duplicates, 4);
}
