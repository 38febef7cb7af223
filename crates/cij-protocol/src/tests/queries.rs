use super::{engine, run_ok};
use crate::ProtocolError;

const QUERIES: &[&str] = &[
    "^SU", "^CN", "^TM", "^TP", "^SD", "^LM", "^LL", "^LF", "^GM", "^MS", "^VV",
];

#[test]
fn test_queries_never_mutate() {
    let mut e = engine();
    run_ok(&mut e, &["^SJ 1", "^PR 1", "^PT", "^SM TEST"]);
    let before = e.snapshot();
    for query in QUERIES {
        let reply = e.process(query);
        assert!(reply.success, "{query}: {}", reply.response);
        assert_eq!(e.snapshot(), before, "{query} mutated state");
    }
}

#[test]
fn test_queries_reject_arguments() {
    let mut e = engine();
    for query in QUERIES {
        let reply = e.process(&format!("{query} 1"));
        assert_eq!(reply.error, Some(ProtocolError::InvalidFormat), "{query}");
    }
}

#[test]
fn test_echo_symmetry_for_errors() {
    let cases = ["^ZZ", "^PW 99999", "^PR 1", "^SM NOPE", "^LG nope", "^PW x", "^MB"];
    for line in cases {
        let mut e = engine();
        let terse = e.process(line);
        e.process("^EN");
        let verbose = e.process(line);

        assert_eq!(terse.error, verbose.error, "{line}");
        let code = terse.error.map(|err| err.code()).unwrap_or_default();
        assert!(terse.response.starts_with(&format!("? {code}: ")), "{}", terse.response);
        assert!(verbose.response.starts_with(&format!("Error {code}: ")), "{}", verbose.response);
    }
}

#[test]
fn test_status_verbose_block() {
    let mut e = engine();
    run_ok(&mut e, &["^EN", "^SJ 1"]);
    let reply = e.process("^SU");
    let lines: Vec<&str> = reply.response.split("\r\n").collect();
    assert_eq!(lines[0], "Printer Status");
    assert!(lines.contains(&"High Voltage: OFF"));
    assert!(lines.contains(&"Jet: ON"));
    assert!(lines.contains(&"Echo: ON"));
    assert!(lines.contains(&"Ink: FULL"));
    assert!(lines.contains(&"Message: DEFAULT"));
}

#[test]
fn test_status_terse_is_single_line() {
    let mut e = engine();
    let reply = e.process("^SU");
    assert!(!reply.response.contains("\r\n"));
    assert!(reply.response.starts_with("HV:0 JET:0 V300:0"));
}

#[test]
fn test_counters_report() {
    let mut e = engine();
    run_ok(&mut e, &["^SJ 1", "^PR 1", "^PT", "^PT"]);
    assert_eq!(
        e.process("^CN").response,
        "PC:2 C1:2 C2:2 C3:2 C4:2 PRC:2"
    );
}

#[test]
fn test_version_and_time() {
    let mut e = engine();
    assert_eq!(e.process("^VV").response, "VV:4.2.1");

    let time = e.process("^TM").response;
    let stamp = time.strip_prefix("TM:").expect("TM prefix");
    assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[test]
fn test_temperatures_and_diagnostics() {
    let mut e = engine();
    assert_eq!(e.process("^TP").response, "TPH:32.0 TEL:38.0");
    assert_eq!(
        e.process("^SD").response,
        "MOD:120 CHG:50 PRS:40.0 RPS:60 PHS:100 VIS:3.50 PWR:0.0 JTH:0.0"
    );
}

#[test]
fn test_codes_case_insensitive() {
    let mut e = engine();
    assert!(e.process("^sj 1").success);
    assert!(e.process("^Pr 1").success);
    assert!(e.snapshot().subsystems.high_voltage);
}

#[test]
fn test_jet_and_hv_query_forms() {
    let mut e = engine();
    assert_eq!(e.process("^SJ").response, "SJ:0");
    assert_eq!(e.process("^PR").response, "PR:0");
    run_ok(&mut e, &["^SJ 1", "^PR 1"]);
    assert_eq!(e.process("^SJ").response, "SJ:1");
    assert_eq!(e.process("^PR").response, "PR:1");
}
