use std::collections::HashMap;

use arena_shared::protocol::{
    BodyState, BootstrapMsg, JoinMsg, LeaveMsg, ServerMsg, StateRelayMsg, PROTOCOL_VERSION,
};
use tokio::sync::{mpsc, oneshot};

use crate::config::RelayConfig;
use crate::roster::Roster;
use crate::validate::{self, UpdateValidator, Verdict};

/// Commands from client connections to the session task
pub enum SessionCommand {
    Join {
        outbound: mpsc::UnboundedSender<ServerMsg>,
        response: oneshot::Sender<u32>,
    },
    Update {
        id: u32,
        state: BodyState,
    },
    Leave {
        id: u32,
    },
}

/// Roster plus one outbound queue per participant. Only the session task
/// touches it, so commands apply in arrival order.
pub struct Session {
    roster: Roster,
    outbound: HashMap<u32, mpsc::UnboundedSender<ServerMsg>>,
    validator: Box<dyn UpdateValidator>,
    spawn_state: BodyState,
}

impl Session {
    pub fn new(config: &RelayConfig) -> Self {
        Self::with_validator(config, validate::from_config(config))
    }

    pub fn with_validator(config: &RelayConfig, validator: Box<dyn UpdateValidator>) -> Self {
        Self {
            roster: Roster::new(),
            outbound: HashMap::new(),
            validator,
            spawn_state: config.spawn_state(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Register a participant. Its bootstrap is queued before anyone else
    /// hears about the join.
    pub fn join(&mut self, outbound: mpsc::UnboundedSender<ServerMsg>) -> u32 {
        let id = self.roster.add(self.spawn_state);

        let _ = outbound.send(ServerMsg::Bootstrap(BootstrapMsg {
            protocol_version: PROTOCOL_VERSION,
            self_id: id,
            players: self.roster.states(),
        }));
        self.outbound.insert(id, outbound);

        self.broadcast_except(
            id,
            ServerMsg::Join(JoinMsg {
                participant_id: id,
                state: self.spawn_state,
            }),
        );
        tracing::info!("Participant {} joined ({} connected)", id, self.roster.len());
        id
    }

    /// Apply and relay a state update. Returns false when it was dropped.
    pub fn update(&mut self, id: u32, state: BodyState) -> bool {
        if let Verdict::Reject(reason) = self.validator.validate(&state) {
            tracing::debug!("Dropped update from {}: {}", id, reason);
            return false;
        }
        let Some(entry) = self.roster.update(id, state) else {
            tracing::debug!("Dropped update from unknown participant {}", id);
            return false;
        };
        let msg = ServerMsg::State(StateRelayMsg {
            participant_id: id,
            state: entry.last_state,
            updated_at: entry.last_update,
        });
        self.broadcast_except(id, msg);
        true
    }

    /// Remove a participant. Returns false if it was not connected.
    pub fn leave(&mut self, id: u32) -> bool {
        self.outbound.remove(&id);
        if self.roster.remove(id).is_none() {
            return false;
        }
        self.broadcast_except(id, ServerMsg::Leave(LeaveMsg { participant_id: id }));
        tracing::info!("Participant {} left ({} connected)", id, self.roster.len());
        true
    }

    fn broadcast_except(&self, except: u32, msg: ServerMsg) {
        for (id, tx) in &self.outbound {
            if *id != except {
                // A closed queue means that participant is on its way out.
                let _ = tx.send(msg.clone());
            }
        }
    }
}

/// Run the relay session. Owns the roster and every outbound queue.
pub async fn run_session(mut cmd_rx: mpsc::Receiver<SessionCommand>, config: RelayConfig) {
    let mut session = Session::new(&config);
    tracing::info!("Session started with {:?} validation", config.validation);

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SessionCommand::Join { outbound, response } => {
                let id = session.join(outbound);
                if response.send(id).is_err() {
                    // Connection gave up before learning its id.
                    session.leave(id);
                }
            }
            SessionCommand::Update { id, state } => {
                session.update(id, state);
            }
            SessionCommand::Leave { id } => {
                session.leave(id);
            }
        }
    }

    tracing::info!("Session ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationMode;

    fn moved(x: f64) -> BodyState {
        BodyState {
            position: [x, 1.0, -2.0],
            velocity: [0.5, 0.0, 0.0],
            rotation: [0.0, 0.3, 0.0],
        }
    }

    fn connect(session: &mut Session) -> (u32, mpsc::UnboundedReceiver<ServerMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (session.join(tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMsg>) -> Vec<ServerMsg> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn first_participant_bootstraps_with_itself_only() {
        let mut session = Session::new(&RelayConfig::default());
        let (id, mut rx) = connect(&mut session);
        assert_eq!(id, 1);

        let msgs = drain(&mut rx);
        assert_eq!(msgs.len(), 1);
        match &msgs[0] {
            ServerMsg::Bootstrap(b) => {
                assert_eq!(b.protocol_version, PROTOCOL_VERSION);
                assert_eq!(b.self_id, 1);
                assert_eq!(b.players.len(), 1);
                assert_eq!(b.players[&1].position, [0.0, 4.0, 0.0]);
            }
            other => panic!("expected bootstrap, got {:?}", other),
        }
    }

    #[test]
    fn join_is_announced_to_others_only() {
        let mut session = Session::new(&RelayConfig::default());
        let (a, mut rx_a) = connect(&mut session);
        drain(&mut rx_a);

        let (b, mut rx_b) = connect(&mut session);
        match drain(&mut rx_a).as_slice() {
            [ServerMsg::Join(j)] => {
                assert_eq!(j.participant_id, b);
                assert_eq!(j.state.position, [0.0, 4.0, 0.0]);
            }
            other => panic!("expected one join, got {:?}", other),
        }
        match drain(&mut rx_b).as_slice() {
            [ServerMsg::Bootstrap(boot)] => {
                assert_eq!(boot.self_id, b);
                assert!(boot.players.contains_key(&a));
                assert!(boot.players.contains_key(&b));
            }
            other => panic!("expected only a bootstrap, got {:?}", other),
        }
    }

    #[test]
    fn update_relayed_verbatim_to_others() {
        let mut session = Session::new(&RelayConfig::default());
        let (a, mut rx_a) = connect(&mut session);
        let (_b, mut rx_b) = connect(&mut session);
        let (_c, mut rx_c) = connect(&mut session);
        drain(&mut rx_a);
        drain(&mut rx_b);
        drain(&mut rx_c);

        assert!(session.update(a, moved(3.0)));
        assert!(drain(&mut rx_a).is_empty());
        for rx in [&mut rx_b, &mut rx_c] {
            match drain(rx).as_slice() {
                [ServerMsg::State(s)] => {
                    assert_eq!(s.participant_id, a);
                    assert_eq!(s.state, moved(3.0));
                    assert!(s.updated_at > 0);
                }
                other => panic!("expected one state, got {:?}", other),
            }
        }
        assert_eq!(session.roster().get(a).unwrap().last_state, moved(3.0));
    }

    #[test]
    fn last_writer_wins() {
        let mut session = Session::new(&RelayConfig::default());
        let (a, _rx) = connect(&mut session);
        session.update(a, moved(1.0));
        session.update(a, moved(2.0));
        assert_eq!(session.roster().get(a).unwrap().last_state, moved(2.0));
    }

    #[test]
    fn leave_notifies_remaining_and_drops_entry() {
        let mut session = Session::new(&RelayConfig::default());
        let (a, mut rx_a) = connect(&mut session);
        let (b, mut rx_b) = connect(&mut session);
        drain(&mut rx_a);
        drain(&mut rx_b);

        assert!(session.leave(b));
        assert!(!session.roster().contains(b));
        match drain(&mut rx_a).as_slice() {
            [ServerMsg::Leave(l)] => assert_eq!(l.participant_id, b),
            other => panic!("expected leave, got {:?}", other),
        }
        assert!(drain(&mut rx_b).is_empty());
        assert!(!session.leave(b));
        assert_eq!(session.roster().len(), 1);
        assert!(session.roster().contains(a));
    }

    #[test]
    fn update_after_leave_is_dropped() {
        let mut session = Session::new(&RelayConfig::default());
        let (a, _rx_a) = connect(&mut session);
        let (b, mut rx_b) = connect(&mut session);
        session.leave(a);
        drain(&mut rx_b);
        assert!(!session.update(a, moved(1.0)));
        assert!(drain(&mut rx_b).is_empty());
        assert!(!session.roster().contains(a));
        assert!(session.roster().contains(b));
    }

    #[test]
    fn rejected_update_keeps_previous_state() {
        let config = RelayConfig {
            validation: ValidationMode::Bounds,
            ..Default::default()
        };
        let mut session = Session::new(&config);
        let (a, _rx_a) = connect(&mut session);
        let (_b, mut rx_b) = connect(&mut session);
        drain(&mut rx_b);

        assert!(session.update(a, moved(5.0)));
        drain(&mut rx_b);
        assert!(!session.update(a, moved(1e7)));
        assert!(drain(&mut rx_b).is_empty());
        assert_eq!(session.roster().get(a).unwrap().last_state, moved(5.0));
    }

    #[test]
    fn closed_outbound_queue_does_not_block_others() {
        let mut session = Session::new(&RelayConfig::default());
        let (a, rx_a) = connect(&mut session);
        let (_b, mut rx_b) = connect(&mut session);
        drop(rx_a);
        drain(&mut rx_b);

        let (c, _rx_c) = connect(&mut session);
        assert!(matches!(
            drain(&mut rx_b).as_slice(),
            [ServerMsg::Join(j)] if j.participant_id == c
        ));
        assert!(session.roster().contains(a));
    }

    #[tokio::test]
    async fn run_session_hands_out_ids_in_order() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        tokio::spawn(run_session(cmd_rx, RelayConfig::default()));

        let mut ids = Vec::new();
        for _ in 0..3 {
            let (out_tx, _out_rx) = mpsc::unbounded_channel();
            let (resp_tx, resp_rx) = oneshot::channel();
            cmd_tx
                .send(SessionCommand::Join {
                    outbound: out_tx,
                    response: resp_tx,
                })
                .await
                .unwrap();
            ids.push(resp_rx.await.unwrap());
        }
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
