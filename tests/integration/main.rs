//! Integration tests for cachedump
//!
//! Each test runs the binary in its own temp directory; the host platform
//! reads `cache_storages/` and writes `cache_dumps/` relative to the
//! working directory, so tests are fully isolated.

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const TITLE: &str = "0100C090153B4000";

    fn cachedump(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("cachedump");
        cmd.current_dir(dir.path());
        cmd
    }

    fn seed_file(root: &Path, space: &str, index: &str, rel: &str, contents: &[u8]) {
        let path = root
            .join("cache_storages")
            .join(space)
            .join(TITLE)
            .join(index)
            .join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn seed_storage_dir(root: &Path, space: &str, index: &str) {
        fs::create_dir_all(root.join("cache_storages").join(space).join(TITLE).join(index))
            .unwrap();
    }

    #[test]
    fn help_displays() {
        let tmp = TempDir::new().unwrap();
        cachedump(&tmp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache save-data partitions"));
    }

    #[test]
    fn version_displays() {
        let tmp = TempDir::new().unwrap();
        cachedump(&tmp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cachedump"));
    }

    #[test]
    fn missing_control_data_is_a_precondition_failure() {
        let tmp = TempDir::new().unwrap();
        cachedump(&tmp)
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("control data unavailable"));
    }

    #[test]
    fn zero_partitions_exits_with_designated_code() {
        let tmp = TempDir::new().unwrap();
        // Application present but holding no cache storages.
        fs::create_dir_all(tmp.path().join("cache_storages/user").join(TITLE)).unwrap();

        cachedump(&tmp)
            .assert()
            .failure()
            .code(4)
            .stdout(predicate::str::contains("Cache storage properties"))
            .stderr(predicate::str::contains("no cache save-data records"));

        // Nothing was mounted, nothing was dumped.
        assert!(!tmp.path().join("cache_dumps").exists());
    }

    #[test]
    fn dumps_every_partition_into_the_destination_layout() {
        let tmp = TempDir::new().unwrap();
        seed_file(tmp.path(), "user", "0000", "a/b/c.txt", b"0123456789");
        seed_file(tmp.path(), "user", "0000", "top.bin", b"top");
        seed_file(tmp.path(), "user", "0003", "solo.bin", b"solo");

        cachedump(&tmp)
            .assert()
            .success()
            .stdout(predicate::str::contains("Mounting cache storage #0 (user)... OK!"))
            .stdout(predicate::str::contains("- [D] a:"))
            .stdout(predicate::str::contains("- [F] c.txt"))
            .stdout(predicate::str::contains("Process finished"));

        let dumps = tmp.path().join("cache_dumps").join(TITLE);
        assert_eq!(
            fs::read(dumps.join("0000/a/b/c.txt")).unwrap(),
            b"0123456789"
        );
        assert_eq!(fs::read(dumps.join("0000/top.bin")).unwrap(), b"top");
        assert_eq!(fs::read(dumps.join("0003/solo.bin")).unwrap(), b"solo");
    }

    #[test]
    fn unmountable_partition_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        seed_file(tmp.path(), "user", "0000", "first.bin", b"first");
        seed_file(tmp.path(), "user", "0002", "third.bin", b"third");
        // A stale registry record: the index entry exists but is a file,
        // so the mount's open step fails.
        fs::write(
            tmp.path().join("cache_storages/user").join(TITLE).join("0001"),
            b"stale",
        )
        .unwrap();

        cachedump(&tmp)
            .assert()
            .success()
            .stdout(predicate::str::contains("failed to open cache storage #1"));

        let dumps = tmp.path().join("cache_dumps").join(TITLE);
        assert_eq!(fs::read(dumps.join("0000/first.bin")).unwrap(), b"first");
        assert_eq!(fs::read(dumps.join("0002/third.bin")).unwrap(), b"third");
        assert!(!dumps.join("0001").exists());
    }

    #[test]
    fn removable_space_is_dumped_after_user_space() {
        let tmp = TempDir::new().unwrap();
        seed_file(tmp.path(), "user", "0000", "internal.bin", b"internal");
        seed_file(tmp.path(), "removable", "0001", "external.bin", b"external");

        let assert = cachedump(&tmp).assert().success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        let user_at = stdout.find("Mounting cache storage #0 (user)").unwrap();
        let removable_at = stdout
            .find("Mounting cache storage #1 (removable user)")
            .unwrap();
        assert!(user_at < removable_at);

        let dumps = tmp.path().join("cache_dumps").join(TITLE);
        assert_eq!(
            fs::read(dumps.join("0000/internal.bin")).unwrap(),
            b"internal"
        );
        assert_eq!(
            fs::read(dumps.join("0001/external.bin")).unwrap(),
            b"external"
        );
    }

    #[test]
    fn empty_partition_dumps_nothing_but_succeeds() {
        let tmp = TempDir::new().unwrap();
        seed_storage_dir(tmp.path(), "user", "0000");

        cachedump(&tmp)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Directory listing for cache storage #0:",
            ));
    }
}
