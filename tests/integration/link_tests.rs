use dupsift::duplicates::{DuplicateFinder, FinderConfig};
use dupsift::scanner::NoInodeCapability;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[cfg(unix)]
#[test]
fn test_hardlinks_are_not_duplicates() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.bin");
    fs::write(&original, b"one inode, three names").unwrap();
    fs::hard_link(&original, dir.path().join("link1.bin")).unwrap();
    fs::hard_link(&original, dir.path().join("link2.bin")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(results.groups.is_empty());
    assert_eq!(summary.hardlinks_filtered, 2);
    assert_eq!(summary.full.input_files, 0);
}

#[cfg(unix)]
#[test]
fn test_hardlink_representative_still_matches_a_copy() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("b_original");
    fs::write(&original, b"shared content").unwrap();
    fs::hard_link(&original, dir.path().join("c_link")).unwrap();
    fs::write(dir.path().join("a_copy"), b"shared content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(summary.hardlinks_filtered, 1);
    assert_eq!(results.groups.len(), 1);
    // The first path of each inode survives.
    assert_eq!(
        results.groups[0].paths,
        vec![dir.path().join("a_copy"), dir.path().join("b_original")]
    );
}

#[test]
fn test_without_inode_capability_links_are_independent() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original");
    fs::write(&original, b"linked").unwrap();
    fs::hard_link(&original, dir.path().join("link")).unwrap();

    let config = FinderConfig::default().with_capability(Arc::new(NoInodeCapability));
    let finder = DuplicateFinder::new(config);
    let (results, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(summary.hardlinks_filtered, 0);
    assert_eq!(results.groups.len(), 1);
    assert_eq!(results.groups[0].len(), 2);
}
