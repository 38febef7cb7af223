use crate::{Engine, Reply};

fn engine() -> Engine {
    Engine::new()
}

/// Run each line in order, panicking on the first unexpected failure.
fn run_ok(engine: &mut Engine, lines: &[&str]) {
    for line in lines {
        let reply = engine.process(line);
        assert!(reply.success, "{line} failed: {}", reply.response);
    }
}

fn fails_with(reply: &Reply, code: u16) {
    assert!(!reply.success, "expected failure, got {}", reply.response);
    assert_eq!(reply.error.map(|e| e.code()), Some(code), "{}", reply.response);
}

mod queries;
mod scenarios;
