//! Unit tests for the port flag parsing used by the interface binary.

use jarvys_interface::config::parse_port;

#[test]
fn port_long_short_and_assign() {
    assert_eq!(
        parse_port(vec!["iface".into(), "--port".into(), "9001".into()], 8000),
        9001
    );
    assert_eq!(
        parse_port(vec!["iface".into(), "-p".into(), "9002".into()], 8000),
        9002
    );
    assert_eq!(
        parse_port(vec!["iface".into(), "--port=9003".into()], 8000),
        9003
    );
    assert_eq!(parse_port(vec!["iface".into()], 8000), 8000);
}

#[test]
fn garbage_port_values_fall_back_to_the_default() {
    assert_eq!(
        parse_port(vec!["iface".into(), "--port".into(), "lots".into()], 8000),
        8000
    );
    assert_eq!(
        parse_port(vec!["iface".into(), "--port=99999".into()], 8000),
        8000
    );
}
