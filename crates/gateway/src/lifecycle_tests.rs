use super::*;

#[test]
fn config_paths_live_under_the_home() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_home(dir.path()).unwrap();

    assert!(config.lock_path.starts_with(&config.home));
    assert!(config.log_path.starts_with(&config.home));
    assert!(config.config_path.ends_with("mesh.toml"));
    assert!(config
        .socket_path
        .to_string_lossy()
        .ends_with(".sock"));
}

#[test]
fn home_hash_is_stable_and_distinct() {
    let a = home_hash(Path::new("/var/lib/mesh-a"));
    let b = home_hash(Path::new("/var/lib/mesh-b"));

    assert_eq!(a, home_hash(Path::new("/var/lib/mesh-a")));
    assert_ne!(a, b);
    assert_eq!(a.len(), 16);
}

#[test]
fn distinct_homes_get_distinct_sockets() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let config_a = Config::for_home(dir_a.path()).unwrap();
    let config_b = Config::for_home(dir_b.path()).unwrap();

    assert_ne!(config_a.socket_path, config_b.socket_path);
}
