use crate::*;

#[tokio::test]
async fn test_first_answer_wins() {
    let h = Harness::start(Profile::Full, gallery_player()).await.unwrap();
    let mut controller = h.connect(CONTROLLER);
    let mut widget = h.connect(WIDGET);
    controller.recv_until(|m| matches!(m, Outbound::Request { .. })).await;

    controller.send(
        &h.hub,
        Inbound::Reject {
            origin: WIDGET.into(),
        },
    );
    let late = h
        .hub
        .local(Inbound::Accept {
            origin: WIDGET.into(),
        })
        .await;
    assert_eq!(late, Some(false));

    let snap = h.snapshot().await;
    assert!(!snap.trusted.contains(&WIDGET.to_string()));
    assert!(snap.pending.is_empty());
    assert!(widget.drain().is_empty());
}

#[tokio::test]
async fn test_hello_from_known_origin_is_ignored() {
    let h = Harness::start(Profile::Full, gallery_player()).await.unwrap();
    let mut controller = h.connect(CONTROLLER);
    let widget = h.connect(WIDGET);
    controller.recv_until(|m| matches!(m, Outbound::Request { .. })).await;

    widget.send(&h.hub, Inbound::Hello { payload: Map::new() });
    h.snapshot().await;
    assert!(!controller
        .drain()
        .iter()
        .any(|m| matches!(m, Outbound::Request { .. })));
}

#[tokio::test]
async fn test_revoked_peer_is_told_offline() {
    let h = Harness::start(Profile::Gallery, gallery_player()).await.unwrap();
    let mut controller = h.connect(CONTROLLER);
    controller.recv_until(|m| *m == title("Movie A")).await;

    let revoked = h
        .hub
        .local(Inbound::Reject {
            origin: CONTROLLER.into(),
        })
        .await;
    assert_eq!(revoked, Some(true));
    assert_eq!(controller.recv().await, Outbound::Online { online: false });

    // No longer trusted: its commands go nowhere.
    controller.send(&h.hub, Inbound::ListNext);
    h.snapshot().await;
    tokio::time::sleep(Duration::from_millis(PERIOD_MS)).await;
    assert!(!h.player.received("next"));
}

#[tokio::test]
async fn test_closed_connection_is_forgotten() {
    let h = Harness::start(Profile::Full, gallery_player()).await.unwrap();
    let mut controller = h.connect(CONTROLLER);
    let widget = h.connect(WIDGET);
    controller.recv_until(|m| matches!(m, Outbound::Request { .. })).await;
    controller.send(
        &h.hub,
        Inbound::Accept {
            origin: WIDGET.into(),
        },
    );
    h.eventually(|s| s.trusted.contains(&WIDGET.to_string())).await;

    drop(widget);
    h.eventually(|s| !s.trusted.contains(&WIDGET.to_string())).await;

    // The origin may introduce itself again and waits for a fresh answer.
    let _again = h.connect(WIDGET);
    let snap = h.eventually(|s| !s.pending.is_empty()).await;
    assert_eq!(snap.pending, vec![WIDGET.to_string()]);
}
