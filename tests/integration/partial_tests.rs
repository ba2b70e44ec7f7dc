use dupsift::duplicates::{DuplicateFinder, FinderConfig};
use dupsift::scanner::{MIN_PARTIAL_SIZE, PARTIAL_WINDOW};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const LARGE: usize = MIN_PARTIAL_SIZE as usize + 4096;

fn large_content(fill: u8) -> Vec<u8> {
    let mut data = vec![fill; LARGE];
    // Same head and tail regardless of the fill.
    for byte in data.iter_mut().take(PARTIAL_WINDOW as usize) {
        *byte = b'H';
    }
    for byte in data.iter_mut().rev().take(PARTIAL_WINDOW as usize) {
        *byte = b'T';
    }
    data
}

fn scan(root: &Path, config: FinderConfig) -> (dupsift::duplicates::Results, dupsift::duplicates::ScanSummary) {
    DuplicateFinder::new(config)
        .find_duplicates(&[root.to_path_buf()])
        .unwrap()
}

#[test]
fn test_middle_difference_is_not_a_duplicate() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), large_content(b'1')).unwrap();
    fs::write(dir.path().join("two"), large_content(b'2')).unwrap();

    let (results, summary) = scan(dir.path(), FinderConfig::default());

    assert!(results.groups.is_empty());
    assert_eq!(summary.partial.matched_groups, 1);
    assert_eq!(summary.full.input_files, 2);
    assert_eq!(summary.full.unique_dropped, 2);
}

#[test]
fn test_large_copies_confirmed_by_full_pass() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), large_content(b'x')).unwrap();
    fs::write(dir.path().join("two"), large_content(b'x')).unwrap();
    fs::write(dir.path().join("three"), large_content(b'x')).unwrap();

    let (results, summary) = scan(dir.path(), FinderConfig::default());

    assert_eq!(results.groups.len(), 1);
    assert_eq!(results.groups[0].len(), 3);
    assert_eq!(results.redundant_size, 2 * LARGE as u64);
    assert_eq!(summary.partial.bytes_read, 3 * 2 * PARTIAL_WINDOW);
    assert_eq!(summary.full.bytes_read, 3 * LARGE as u64);
}

#[test]
fn test_large_files_with_different_tails_read_only_windows() {
    let dir = tempdir().unwrap();
    let mut a = large_content(b'x');
    let mut b = large_content(b'x');
    *a.last_mut().unwrap() = b'A';
    *b.last_mut().unwrap() = b'B';
    fs::write(dir.path().join("a"), a).unwrap();
    fs::write(dir.path().join("b"), b).unwrap();

    let (results, summary) = scan(dir.path(), FinderConfig::default());

    assert!(results.groups.is_empty());
    assert_eq!(summary.partial.unique_dropped, 2);
    assert_eq!(summary.full.hashed_files, 0);
    assert_eq!(summary.partial.bytes_read, 2 * 2 * PARTIAL_WINDOW);
}

#[test]
fn test_skip_partial_goes_straight_to_full() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), large_content(b'1')).unwrap();
    fs::write(dir.path().join("two"), large_content(b'2')).unwrap();
    fs::write(dir.path().join("three"), large_content(b'2')).unwrap();

    let (results, summary) = scan(dir.path(), FinderConfig::default().with_skip_partial(true));

    assert_eq!(results.groups.len(), 1);
    assert_eq!(
        results.groups[0].paths,
        vec![dir.path().join("three"), dir.path().join("two")]
    );
    assert_eq!(summary.partial.input_files, 0);
    assert_eq!(summary.full.hashed_files, 3);
}

#[test]
fn test_below_threshold_skips_partial_pass() {
    let dir = tempdir().unwrap();
    let size = MIN_PARTIAL_SIZE as usize - 1;
    fs::write(dir.path().join("a"), vec![b'a'; size]).unwrap();
    fs::write(dir.path().join("b"), vec![b'b'; size]).unwrap();

    let (results, summary) = scan(dir.path(), FinderConfig::default());

    assert!(results.groups.is_empty());
    assert_eq!(summary.partial.input_files, 0);
    assert_eq!(summary.full.hashed_files, 2);
}
