use std::collections::BTreeMap;
use std::fs;

use router_syntax_core::{write_dir_atomic, write_file_atomic, WriteError};

fn files(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, body)| (name.to_string(), body.to_string()))
        .collect()
}

#[test]
fn single_file_replaces_existing_content() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("routeros-config.rsc");
    fs::write(&path, "old").expect("seed file");

    write_file_atomic(&path, "# new script\n").expect("write should succeed");

    assert_eq!(fs::read_to_string(&path).expect("read"), "# new script\n");
    let leftovers = fs::read_dir(dir.path()).expect("read_dir").count();
    assert_eq!(leftovers, 1);
}

#[test]
fn directory_is_created_with_every_file() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out = dir.path().join("openwrt-config");

    write_dir_atomic(&out, &files(&[("network", "n\n"), ("dhcp", "d\n")]))
        .expect("write should succeed");

    assert_eq!(fs::read_to_string(out.join("network")).expect("read"), "n\n");
    assert_eq!(fs::read_to_string(out.join("dhcp")).expect("read"), "d\n");
}

#[test]
fn existing_directory_is_swapped_not_merged() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out = dir.path().join("openwrt-config");
    write_dir_atomic(&out, &files(&[("network", "v1"), ("wireless", "v1")]))
        .expect("first write");

    write_dir_atomic(&out, &files(&[("network", "v2")])).expect("second write");

    assert_eq!(fs::read_to_string(out.join("network")).expect("read"), "v2");
    assert!(!out.join("wireless").exists());
    let siblings = fs::read_dir(dir.path()).expect("read_dir").count();
    assert_eq!(siblings, 1, "stage and backup directories are cleaned up");
}

#[test]
fn leftover_backup_from_an_earlier_run_does_not_block_the_swap() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out = dir.path().join("openwrt-config");
    write_dir_atomic(&out, &files(&[("network", "v1")])).expect("first write");
    let leftover = dir
        .path()
        .join(format!(".openwrt-config.old-{}", std::process::id()));
    fs::create_dir(&leftover).expect("seed leftover");
    fs::write(leftover.join("network"), "stale").expect("seed leftover file");

    write_dir_atomic(&out, &files(&[("network", "v2")])).expect("second write");

    assert_eq!(fs::read_to_string(out.join("network")).expect("read"), "v2");
    assert_eq!(
        fs::read_to_string(leftover.join("network")).expect("leftover untouched"),
        "stale"
    );
    let siblings = fs::read_dir(dir.path()).expect("read_dir").count();
    assert_eq!(siblings, 2, "only the output and the seeded leftover remain");
}

#[test]
fn invalid_names_leave_nothing_behind() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out = dir.path().join("openwrt-config");

    let err = write_dir_atomic(&out, &files(&[("network", "ok"), ("../escape", "bad")]))
        .expect_err("should reject");

    assert!(matches!(err, WriteError::InvalidName(_)));
    assert!(!out.exists());
}

#[test]
fn regular_file_in_place_of_directory_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out = dir.path().join("openwrt-config");
    fs::write(&out, "not a dir").expect("seed file");

    let err = write_dir_atomic(&out, &files(&[("network", "ok")])).expect_err("should reject");

    assert!(matches!(err, WriteError::NotADirectory(_)));
    assert_eq!(fs::read_to_string(&out).expect("read"), "not a dir");
}
