use std::sync::{Arc, Mutex, Once};
use std::thread;

use serde::Deserialize;
use serde_json::{json, Value};

use nui_events::{
    event_name_factory, window, BridgeConfig, DigestResolver, DispatchTarget, EventTarget, HostBridge,
    HostInbox, NuiEvent,
};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Deserialize, PartialEq)]
struct Visibility {
    visible: bool,
}

#[test]
fn window_hook_receives_emulated_message() {
    init_tracing();

    // The window is process-wide; use names no other test touches.
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut hook: NuiEvent<Visibility> = NuiEvent::on_window();
    hook.render("e2e-phone", "setVisibility", move |v| sink.lock().unwrap().push(v));

    let bridge = HostBridge::on_window();
    assert_eq!(bridge.emulate("e2e-phone", "setVisibility", &json!({"visible": true})).unwrap(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![Visibility { visible: true }]);

    drop(hook);
    let name = event_name_factory("e2e-phone", "setVisibility");
    assert_eq!(window().listener_count(&name), 0);
}

#[test]
fn inbox_feeds_hook_from_host_thread() {
    init_tracing();

    let target = Arc::new(EventTarget::new());
    let cfg = BridgeConfig::default();
    let resolver = Arc::new(cfg.resolver());
    let bridge = HostBridge::new(target.clone(), resolver.clone());
    let inbox = HostInbox::new(&cfg);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut hook: NuiEvent<Value> = NuiEvent::new(target.clone(), resolver);
    hook.render("mail", "newMessage", move |v| sink.lock().unwrap().push(v));

    let host = inbox.sender();
    thread::spawn(move || {
        for i in 0..10 {
            let raw = json!({"app": "mail", "method": "newMessage", "data": {"seq": i}}).to_string();
            host.post(raw).unwrap();
        }
        host.post("garbage").unwrap();
        host.post(r#"{"app":"mail","method":"deleted","data":1}"#).unwrap();
    })
    .join()
    .unwrap();

    let report = inbox.pump(&bridge);
    assert_eq!(report.delivered, 11);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.invocations, 10);

    let seqs: Vec<i64> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|v| v["seq"].as_i64().unwrap())
        .collect();
    assert_eq!(seqs, (0..10).collect::<Vec<i64>>());
}

#[test]
fn handler_swap_between_pumps_is_observed() {
    init_tracing();

    let target = Arc::new(EventTarget::new());
    let cfg = BridgeConfig::default();
    let bridge = HostBridge::new(target.clone(), Arc::new(cfg.resolver()));
    let inbox = HostInbox::new(&cfg);
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut hook: NuiEvent<u32> = NuiEvent::new(target.clone(), Arc::new(cfg.resolver()));
    let l = Arc::clone(&log);
    hook.render("bank", "balance", move |n| l.lock().unwrap().push(("first", n)));

    let host = inbox.sender();
    host.post(r#"{"app":"bank","method":"balance","data":10}"#).unwrap();
    inbox.pump(&bridge);

    let l = Arc::clone(&log);
    hook.render("bank", "balance", move |n| l.lock().unwrap().push(("second", n)));
    host.post(r#"{"app":"bank","method":"balance","data":20}"#).unwrap();
    inbox.pump(&bridge);

    assert_eq!(*log.lock().unwrap(), vec![("first", 10), ("second", 20)]);
    assert_eq!(target.stats().attached, 1);
}

#[test]
fn digest_resolver_routes_end_to_end() {
    init_tracing();

    let target = Arc::new(EventTarget::new());
    let resolver = Arc::new(DigestResolver);
    let bridge = HostBridge::new(target.clone(), resolver.clone());

    let seen = Arc::new(Mutex::new(0u32));
    let sink = Arc::clone(&seen);
    let mut hook: NuiEvent<Value> = NuiEvent::new(target.clone(), resolver);
    hook.render("inventory", "update", move |_| *sink.lock().unwrap() += 1);

    bridge
        .deliver_raw(r#"{"app":"inventory","method":"update","data":{}}"#)
        .unwrap();
    bridge
        .deliver_raw(r#"{"app":"inventory","method":"delete","data":{}}"#)
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), 1);

    let name = hook.event_name().cloned().unwrap();
    assert!(name.as_str().starts_with("nui."));
    assert_eq!(bridge.target().listener_count(&name), 1);
}
