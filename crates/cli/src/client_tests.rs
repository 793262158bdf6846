use super::*;

#[test]
fn socket_path_is_stable_per_home() {
    let dir = tempfile::tempdir().unwrap();

    let a = get_socket_path(dir.path());
    let b = get_socket_path(dir.path());

    assert_eq!(a, b);
    assert!(a.to_string_lossy().ends_with(".sock"));
}

#[test]
fn distinct_homes_get_distinct_sockets() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    assert_ne!(get_socket_path(dir_a.path()), get_socket_path(dir_b.path()));
}

#[test]
fn connect_without_daemon_reports_not_running() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        GatewayClient::connect(dir.path()),
        Err(ClientError::DaemonNotRunning)
    ));
}

#[test]
fn missing_pid_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(read_daemon_pid(dir.path()), None);
}

#[test]
fn pid_file_parses() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("meshd.pid"), "4242\n").unwrap();

    assert_eq!(read_daemon_pid(dir.path()), Some(4242));
}
