use super::*;
use tempfile::TempDir;

const SOURCE: &str = r#"
from conans import ConanFile

class Engine(ConanFile):
    name = "engine"
    version = "0.1.0"
    requires = ["glfw/3.3.4", "glad/0.1.34@snv/stable"]
    build_requires = "cmake/3.21.3"
    default_options = {"glad:gl_version": "4.6"}
"#;

fn lock_for(source: &str) -> PinLock {
    let manifest = Manifest::parse(source).unwrap();
    PinLock::from_manifest(&manifest, source, "conanfile.py")
}

#[test]
fn test_from_manifest() {
    let lock = lock_for(SOURCE);
    assert_eq!(lock.manifest, "conanfile.py");
    assert!(lock.hash.starts_with(hash::HASH_PREFIX));
    assert_eq!(lock.requires.len(), 2);
    assert_eq!(lock.requires[1].name, "glad");
    assert_eq!(lock.requires[1].version, "0.1.34");
    assert_eq!(lock.requires[1].reference.to_string(), "glad/0.1.34@snv/stable");
    assert_eq!(lock.build_requires[0].name, "cmake");
    assert_eq!(lock.options[0].to_string(), "glad:gl_version=4.6");
}

#[test]
fn test_json_shape() {
    let json = lock_for(SOURCE).to_json().unwrap();
    assert!(json.ends_with("}\n"));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["requires"][0]["reference"], "glfw/3.3.4");
    assert_eq!(value["options"][0]["package"], "glad");
    assert!(value["requires"][0].get("modifier").is_none());
}

#[test]
fn test_save_and_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(LOCKFILE_NAME);
    let lock = lock_for(SOURCE);
    lock.save(&path).unwrap();

    let loaded = PinLock::load(&path).unwrap();
    assert_eq!(loaded, lock);
}

#[test]
fn test_load_missing() {
    let temp = TempDir::new().unwrap();
    let err = PinLock::load(&temp.path().join(LOCKFILE_NAME)).unwrap_err();
    assert!(matches!(err, crate::error::PinledgerError::LockMissing { .. }));
}

#[test]
fn test_load_invalid_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(LOCKFILE_NAME);
    std::fs::write(&path, "{ not json").unwrap();
    let err = PinLock::load(&path).unwrap_err();
    assert!(matches!(
        err,
        crate::error::PinledgerError::LockParseFailed { .. }
    ));
}

#[test]
fn test_verify_accepts_formatting_change() {
    let locked = lock_for(SOURCE);
    let reformatted = format!("# pins\n{SOURCE}\n\n");
    let current = lock_for(&reformatted);

    assert_ne!(locked.hash, current.hash);
    assert!(locked.verify(&current).is_ok());
    assert!(locked.hash_only_change(&current));
}

#[test]
fn test_verify_reports_version_change() {
    let locked = lock_for(SOURCE);
    let current = lock_for(&SOURCE.replace("glfw/3.3.4", "glfw/3.3.5"));

    let err = locked.verify(&current).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Pin lock is out of date: glfw is required as glfw/3.3.5 but locked at glfw/3.3.4"
    );
}

#[test]
fn test_verify_reports_added_and_removed() {
    let locked = lock_for(SOURCE);

    let added = lock_for(&SOURCE.replace(
        r#""glfw/3.3.4","#,
        r#""glfw/3.3.4", "spdlog/1.8.5","#,
    ));
    assert!(
        locked
            .first_difference(&added)
            .unwrap()
            .contains("spdlog/1.8.5 is not in the lock")
    );

    let removed = lock_for(&SOURCE.replace(r#""glfw/3.3.4", "#, ""));
    assert_eq!(
        locked.first_difference(&removed).unwrap(),
        "locked requirement glfw/3.3.4 is no longer declared"
    );
}

#[test]
fn test_verify_reports_option_change() {
    let locked = lock_for(SOURCE);
    let current = lock_for(&SOURCE.replace(r#""4.6""#, r#""3.3""#));
    assert_eq!(
        locked.first_difference(&current).unwrap(),
        "option glad:gl_version is 3.3 but locked at 4.6"
    );
}

#[test]
fn test_channel_change_is_drift() {
    let locked = lock_for(SOURCE);
    let current = lock_for(&SOURCE.replace("@snv/stable", ""));
    assert!(locked.verify(&current).is_err());
}
