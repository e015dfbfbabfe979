use brite_logger::{Logger, LoggerError, parse_level};

#[test]
fn second_subscriber_in_one_process_is_refused() {
    let _server = Logger::builder()
        .name("brite-server")
        .level(parse_level("info").expect("level"))
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("brite-shell")
        .level(parse_level("debug").expect("level"))
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "got {err}");
}
