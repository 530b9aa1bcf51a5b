//! Drives a full connect -> join -> input -> goal round trip through the
//! public `MatchRegistry`/`Match` surface, with no transport involved.

use goalkeeper_sim::message::InputPayload;
use goalkeeper_sim::{ClientMessage, GameEvent, InputRecord, JoinOptions, MatchConfig, MatchRegistry, Team};

#[test]
fn connect_join_input_and_goal_round_trip() {
    let mut registry = MatchRegistry::new();
    let match_ = registry
        .create_match(MatchConfig::default(), 1, "classic".into(), None)
        .unwrap();

    let host = "host-session".to_string();
    match_
        .join(host.clone(), &JoinOptions { team: Some(Team::Red), ..Default::default() })
        .unwrap();

    match_.handle_message(&host, ClientMessage::StartGame).unwrap();

    let mut tick: u64 = 0;
    let mut goal_event: Option<GameEvent> = None;

    'drive: for _ in 0..600 {
        tick += 1;
        match_
            .handle_message(
                &host,
                ClientMessage::Input(InputPayload::Single(InputRecord {
                    tick,
                    x: 1.0,
                    z: 0.0,
                    rot_y: 0.0,
                    jump_request_id: 0,
                })),
            )
            .unwrap();

        for event in match_.step() {
            if matches!(event, GameEvent::GoalScored { .. }) {
                goal_event = Some(event);
                break 'drive;
            }
        }
    }

    let event = goal_event.expect("player running the ball downfield should eventually score");
    match event {
        GameEvent::GoalScored { team, scorer, red_score, blue_score, .. } => {
            assert_eq!(team, Team::Red);
            assert_eq!(scorer.as_deref(), Some(host.as_str()));
            assert_eq!(red_score, 1);
            assert_eq!(blue_score, 0);
        }
        other => panic!("expected GoalScored, got {other:?}"),
    }
    assert_eq!(match_.red_score, 1);
    assert_eq!(match_.player(&host).unwrap().stats.goals, 1);

    // The server's match task would apply the delayed reset; driving it
    // directly here exercises the same codepath without needing tokio.
    let reset_event = match_.reset_positions();
    assert!(matches!(reset_event, GameEvent::GameReset));
    let player = match_.player(&host).unwrap();
    assert_eq!(player.x, Team::Red.spawn_x());
}
