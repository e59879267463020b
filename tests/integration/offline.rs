use crate::*;

#[tokio::test]
async fn test_backend_outage_and_recovery() {
    let h = Harness::start(Profile::Gallery, gallery_player()).await.unwrap();
    let mut controller = h.connect(CONTROLLER);
    controller.recv_until(|m| *m == title("Movie A")).await;

    h.player.set_down(true);
    let seen = controller.recv_until(|m| *m == title("")).await;
    assert_eq!(
        seen,
        vec![
            Outbound::Online { online: false },
            Outbound::Playlist { titles: vec![] },
            title(""),
        ]
    );
    // Further failures change nothing.
    controller.assert_quiet(3).await;

    let snap = h.snapshot().await;
    assert_eq!(snap.state.playlist_id, Some(-1));
    assert!(snap.state.playlist.is_empty());

    h.player.set_down(false);
    let seen = controller
        .recv_until(|m| matches!(m, Outbound::Playlist { titles } if !titles.is_empty()))
        .await;
    assert_eq!(seen[0], Outbound::Online { online: true });
}

#[tokio::test]
async fn test_garbled_status_goes_offline() {
    let player = gallery_player();
    player.respond("current?id", "3:seven:55");
    let h = Harness::start(Profile::Gallery, player).await.unwrap();

    let snap = h.eventually(|s| s.state.online.is_some()).await;
    assert_eq!(snap.state.online, Some(false));
}

#[tokio::test]
async fn test_empty_playlist_is_never_announced() {
    let player = FakePlayer::default();
    player.respond("current?id", "4:0:30");
    player.respond("current?title", "Solo");
    player.respond("playlist", "");
    let h = Harness::start(Profile::Gallery, player).await.unwrap();

    let mut controller = h.connect(CONTROLLER);
    let seen = controller.recv_until(|m| *m == title("Solo")).await;
    assert!(!seen.iter().any(|m| matches!(m, Outbound::Playlist { .. })));

    tokio::time::sleep(Duration::from_millis(PERIOD_MS * 3)).await;
    assert!(!controller
        .drain()
        .iter()
        .any(|m| matches!(m, Outbound::Playlist { .. })));
}
