use crate::*;

/// The gallery walkthrough: a pre-trusted controller sees the player come
/// up, vouches for a widget, and the widget gets the whole state.
#[tokio::test]
async fn test_gallery_end_to_end() {
    let h = Harness::start(Profile::Gallery, gallery_player()).await.unwrap();

    let mut controller = h.connect(CONTROLLER);
    assert_eq!(
        controller.recv().await,
        Outbound::Version {
            version: "23.10".into()
        }
    );

    let seen = controller.recv_until(|m| *m == title("Movie A")).await;
    let index = seen
        .iter()
        .position(|m| *m == Outbound::PlaylistIndex { index: 7 })
        .expect("playlist index before title");
    assert!(index < seen.len() - 1);
    assert!(seen.contains(&Outbound::Online { online: true }));
    assert!(seen.contains(&Outbound::Volume { volume: 55 }));
    // Gallery players report no playback flags.
    assert!(!seen
        .iter()
        .any(|m| matches!(m, Outbound::Playing { .. } | Outbound::Muted { .. })));

    let mut widget = h.connect(WIDGET);
    let request = controller.recv_until(|m| matches!(m, Outbound::Request { .. })).await;
    assert_eq!(
        serde_json::to_value(request.last().unwrap()).unwrap(),
        serde_json::json!({"type": "acl:Request", "origin": WIDGET})
    );

    controller.send(
        &h.hub,
        Inbound::Accept {
            origin: WIDGET.into(),
        },
    );
    let mut resent = Vec::new();
    for _ in 0..6 {
        resent.push(widget.recv().await);
    }
    assert_eq!(
        resent,
        vec![
            Outbound::Version {
                version: "23.10".into()
            },
            Outbound::Online { online: true },
            Outbound::Volume { volume: 55 },
            Outbound::Playlist {
                titles: vec!["Movie A".into(), "Movie B".into()]
            },
            Outbound::PlaylistIndex { index: 7 },
            title("Movie A"),
        ]
    );

    // Once trusted, the widget drives the player.
    widget.send(&h.hub, Inbound::SetVolume { volume: 70.4 });
    h.player.respond("current?id", "3:7:70");
    let seen = widget.recv_until(|m| *m == Outbound::Volume { volume: 70 }).await;
    assert_eq!(seen.len(), 1);
    assert!(h.player.received("vol?70"));
}

#[tokio::test]
async fn test_steady_state_is_quiet() {
    let player = FakePlayer::default();
    player.respond("current?id", "-1:0:40:0:1");
    player.respond("current?title", "Clip");
    let h = Harness::start(Profile::Full, player).await.unwrap();

    let mut controller = h.connect(CONTROLLER);
    let seen = controller.recv_until(|m| *m == title("Clip")).await;
    assert!(seen.contains(&Outbound::Playing { playing: true }));
    assert!(seen.contains(&Outbound::Muted { muted: false }));
    // No playlist loaded and none ever shown: nothing to clear.
    assert!(!seen.iter().any(|m| matches!(m, Outbound::Playlist { .. })));

    controller.assert_quiet(4).await;
}

#[tokio::test]
async fn test_track_change_updates_index_then_title() {
    let h = Harness::start(Profile::Gallery, gallery_player()).await.unwrap();
    let mut controller = h.connect(CONTROLLER);
    controller.recv_until(|m| *m == title("Movie A")).await;

    h.player.respond("current?title", "Movie B");
    h.player.respond("current?id", "3:8:55");

    let seen = controller.recv_until(|m| *m == title("Movie B")).await;
    assert_eq!(
        seen,
        vec![Outbound::PlaylistIndex { index: 8 }, title("Movie B")]
    );
}

#[tokio::test]
async fn test_actions_reach_the_player() {
    let h = Harness::start(Profile::Gallery, gallery_player()).await.unwrap();
    let controller = h.connect(CONTROLLER);

    controller.send(&h.hub, Inbound::PlayPause);
    controller.send(&h.hub, Inbound::PlaylistPlay { index: 2 });
    controller.send(&h.hub, Inbound::Seek { position: 90.0 });
    controller.send(&h.hub, Inbound::Fullscreen);

    let deadline = tokio::time::Instant::now() + WAIT;
    let expected = ["play_pause", "item?2", "seek?90.00", "fullscr_win"];
    while !expected.iter().all(|p| h.player.received(p)) {
        assert!(
            tokio::time::Instant::now() < deadline,
            "commands missing: {:?}",
            h.player.requests()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_untrusted_actions_are_ignored() {
    let h = Harness::start(Profile::Full, gallery_player()).await.unwrap();
    let widget = h.connect(WIDGET);
    widget.send(&h.hub, Inbound::Stop);

    h.eventually(|s| s.state.online == Some(true)).await;
    tokio::time::sleep(Duration::from_millis(PERIOD_MS)).await;
    assert!(!h.player.received("stop"));
}
