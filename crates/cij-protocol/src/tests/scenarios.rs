use super::{engine, fails_with, run_ok};
use crate::ProtocolError;

#[test]
fn test_jet_start_is_idempotent() {
    let mut e = engine();
    run_ok(&mut e, &["^SJ 1", "^PR 1"]);
    let before = e.snapshot();

    let reply = e.process("^SJ 1");
    assert!(reply.success);
    let after = e.snapshot();
    assert!(after.subsystems.jet_running);
    // A second start must not disturb anything else.
    assert_eq!(before, after);
}

#[test]
fn test_stopping_jet_clears_coupled_flags() {
    let mut e = engine();
    run_ok(&mut e, &["^SJ 1", "^PR 1", "^MB", "^SJ 0"]);
    let s = e.snapshot();
    assert!(!s.subsystems.jet_running);
    assert!(!s.subsystems.high_voltage);
    assert!(!s.subsystems.valve_300);
    assert!(!s.session.one_to_one);
}

#[test]
fn test_stop_then_start_leaves_hv_off() {
    let mut e = engine();
    run_ok(&mut e, &["^SJ 1", "^PR 1", "^SJ 1", "^SJ 0"]);
    assert!(!e.snapshot().subsystems.high_voltage);
}

#[test]
fn test_hv_requires_running_jet() {
    let mut e = engine();
    let reply = e.process("^PR 1");
    fails_with(&reply, ProtocolError::CannotPrint.code());
    assert!(!e.snapshot().subsystems.high_voltage);
    assert!(!e.snapshot().subsystems.valve_300);
}

#[test]
fn test_print_cycle_end_to_end() {
    let mut e = engine();

    let reply = e.process("^SJ 1");
    assert!(reply.success);
    assert_eq!(reply.response, ">");

    let reply = e.process("^PR 1");
    assert!(reply.success);
    let status = e.process("^SU");
    assert!(status.response.contains("HV:1"), "{}", status.response);
    assert!(status.response.contains("V300:1"), "{}", status.response);

    let before = e.snapshot().counters;
    assert!(e.process("^PT").success);
    let after = e.snapshot().counters;
    assert_eq!(after.product, before.product + 1);
    assert_eq!(after.print, before.print + 1);

    assert!(e.process("^PR 0").success);
    let s = e.snapshot();
    assert!(!s.subsystems.high_voltage);
    assert!(s.subsystems.jet_running);
}

#[test]
fn test_force_print_requires_hv() {
    let mut e = engine();
    run_ok(&mut e, &["^SJ 1"]);
    let reply = e.process("^PT");
    fails_with(&reply, ProtocolError::CannotPrint.code());
    assert_eq!(e.snapshot().counters.print, 0);
}

#[test]
fn test_force_print_with_empty_ink_still_prints() {
    let mut e = engine();
    e.apply_telemetry(&crate::TelemetryUpdate::new().with_ink(crate::FluidLevel::Empty))
        .unwrap();
    run_ok(&mut e, &["^SJ 1", "^PR 1", "^PT"]);
    assert_eq!(e.snapshot().counters.print, 1);
}

#[test]
fn test_width_out_of_range_keeps_default() {
    let mut e = engine();
    let reply = e.process("^PW 20000");
    fails_with(&reply, ProtocolError::InvalidWidth.code());

    let query = e.process("^PW");
    assert!(query.success);
    assert_eq!(query.response, "PW:1000");

    let settings = e.process("^MS");
    assert!(settings.response.contains("PW:1000"), "{}", settings.response);
}

#[test]
fn test_login_flow() {
    let mut e = engine();
    let reply = e.process("^LG wrongpassword");
    fails_with(&reply, ProtocolError::AuthenticationFailed.code());
    assert!(!e.snapshot().session.logged_in);

    assert!(e.process("^LG ADMIN").success);
    assert!(e.snapshot().session.logged_in);

    assert!(e.process("^LO").success);
    assert!(!e.snapshot().session.logged_in);
}

#[test]
fn test_login_without_password_is_format_error() {
    let mut e = engine();
    fails_with(&e.process("^LG"), ProtocolError::InvalidFormat.code());
}

#[test]
fn test_one_to_one_requires_jet() {
    let mut e = engine();
    fails_with(&e.process("^MB"), ProtocolError::JetStopped.code());
    assert!(!e.snapshot().session.one_to_one);

    run_ok(&mut e, &["^SJ 1", "^FE 250", "^MB"]);
    let s = e.snapshot();
    assert!(s.session.one_to_one);
    assert!(!s.session.forced_photo_eye);
    assert_eq!(s.settings.trigger_delay, 0);

    run_ok(&mut e, &["^ME"]);
    assert!(!e.snapshot().session.one_to_one);
}
