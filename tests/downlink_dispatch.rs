//! Unicast downlink dispatch against the frame-counter gate, with the
//! flow stub controlling counter-advance timing.

mod common;

use common::{dev_eui, harness, provision_device, Harness};
use loraplane::control::{ActivateDeviceRequest, PushUnicastRequest};
use loraplane::Error;

async fn activate_with_fcnt_down(fx: &Harness, fcnt_down: u32) {
    provision_device(fx, dev_eui(1));
    fx.control
        .activate_device(ActivateDeviceRequest {
            dev_eui: dev_eui(1),
            dev_addr: "26000001".parse().unwrap(),
            nwk_s_key: "000102030405060708090a0b0c0d0e0f".parse().unwrap(),
            fcnt_up: 0,
            fcnt_down,
            skip_fcnt_check: false,
        })
        .await
        .unwrap();
}

fn push(fcnt_down: u32) -> PushUnicastRequest {
    PushUnicastRequest {
        dev_eui: dev_eui(1),
        fcnt_down,
        confirmed: true,
        port: 10,
        payload: vec![0xde, 0xad, 0xbe, 0xef],
    }
}

#[tokio::test]
async fn exact_counter_match_dispatches() {
    let fx = harness(false);
    activate_with_fcnt_down(&fx, 5).await;

    fx.control.push_unicast(push(5)).await.unwrap();

    let unicasts = fx.flow.unicasts.lock();
    assert_eq!(unicasts.len(), 1);
    assert_eq!(unicasts[0].dev_eui, dev_eui(1));
    assert_eq!(unicasts[0].fcnt_down, 5);
    assert!(unicasts[0].confirmed);
    assert_eq!(unicasts[0].port, 10);
    assert_eq!(unicasts[0].payload, vec![0xde, 0xad, 0xbe, 0xef]);
}

#[tokio::test]
async fn off_by_one_counters_both_fail_with_expected_value() {
    let fx = harness(false);
    activate_with_fcnt_down(&fx, 5).await;

    for wrong in [4, 6] {
        let err = fx.control.push_unicast(push(wrong)).await.unwrap_err();
        match err {
            Error::InvalidFCnt { expected } => assert_eq!(expected, 5),
            other => panic!("expected InvalidFCnt, got {other:?}"),
        }
    }
    assert_eq!(fx.flow.unicast_count(), 0);
}

#[tokio::test]
async fn repeat_push_succeeds_while_flow_has_not_advanced() {
    // The exact-match contract depends on the collaborator's
    // counter-advance timing: without an advance, the same expected value
    // keeps matching.
    let fx = harness(false);
    activate_with_fcnt_down(&fx, 5).await;

    fx.control.push_unicast(push(5)).await.unwrap();
    fx.control.push_unicast(push(5)).await.unwrap();
    assert_eq!(fx.flow.unicast_count(), 2);
}

#[tokio::test]
async fn repeat_push_fails_once_flow_advanced() {
    let fx = harness(true);
    activate_with_fcnt_down(&fx, 5).await;

    fx.control.push_unicast(push(5)).await.unwrap();

    let err = fx.control.push_unicast(push(5)).await.unwrap_err();
    match err {
        Error::InvalidFCnt { expected } => assert_eq!(expected, 6),
        other => panic!("expected InvalidFCnt, got {other:?}"),
    }

    // Resynchronizing on the reported value dispatches again.
    fx.control.push_unicast(push(6)).await.unwrap();
    assert_eq!(fx.flow.unicast_count(), 2);
}

#[tokio::test]
async fn reactivation_resets_the_counter_gate() {
    let fx = harness(true);
    activate_with_fcnt_down(&fx, 5).await;
    fx.control.push_unicast(push(5)).await.unwrap();

    // Reactivate with a fresh counter; the old expected value is gone.
    activate_with_fcnt_down(&fx, 0).await;
    fx.control.push_unicast(push(0)).await.unwrap();
    assert_eq!(fx.flow.unicast_count(), 2);
}

#[tokio::test]
async fn concurrent_pushes_for_one_device_cannot_double_send() {
    use std::sync::Arc;

    // With an advancing flow, two racing dispatches for the same device
    // and the same expected counter must produce exactly one send.
    let fx = Arc::new(harness(true));
    activate_with_fcnt_down(&fx, 5).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let fx = fx.clone();
        handles.push(tokio::spawn(async move {
            fx.control.push_unicast(push(5)).await
        }));
    }

    let mut ok = 0;
    let mut mismatches = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => ok += 1,
            Err(Error::InvalidFCnt { expected }) => {
                assert_eq!(expected, 6);
                mismatches += 1;
            }
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(mismatches, 1);
    assert_eq!(fx.flow.unicast_count(), 1);
}
