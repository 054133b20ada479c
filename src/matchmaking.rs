//! Per-subject waiting lists. `Lobby` backs live play: join either pairs
//! FIFO with the earliest waiter or arms a grace timer that falls back to a
//! stealth bot. `OpenPool` backs async match creation with the same
//! pairing/fallback semantics, but hands the pairing decision back to the
//! caller instead of spawning a session.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::bot;
use crate::live::{self, LiveDeps, LiveSeat};
use crate::model::{Participant, PlayerRef};

struct LobbyTicket {
    id: Uuid,
    seat: LiveSeat,
    timer: Option<JoinHandle<()>>,
}

/// Live matchmaking queue. Each subject's list is a single locked resource;
/// pairing and timer fallback both remove the ticket under that lock, so
/// exactly one of the two outcomes applies.
#[derive(Default)]
pub struct Lobby {
    waiting: Mutex<HashMap<String, VecDeque<LobbyTicket>>>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a seat. Pairs immediately when someone is already waiting on
    /// the subject, otherwise starts the grace timer that synthesizes a bot
    /// opponent for the requester.
    pub fn join(self: &Arc<Self>, deps: Arc<LiveDeps>, subject: String, seat: LiveSeat) {
        let paired = {
            let mut waiting = self.waiting.lock().unwrap_or_else(|e| e.into_inner());
            waiting.entry(subject.clone()).or_default().pop_front()
        };

        if let Some(mut ticket) = paired {
            if let Some(timer) = ticket.timer.take() {
                timer.abort();
            }
            tracing::info!(
                %subject,
                waiter = ticket.seat.participant.id(),
                joiner = seat.participant.id(),
                "paired two waiting players"
            );
            live::spawn_session(deps, subject, [ticket.seat, seat]);
            return;
        }

        let ticket_id = Uuid::new_v4();
        let (target_level, target_points) = match &seat.participant {
            Participant::Human(p) => (p.level, p.points),
            Participant::Bot(b) => (b.level, b.points),
        };

        let timer = {
            let lobby = Arc::clone(self);
            let deps = Arc::clone(&deps);
            let subject = subject.clone();
            let grace = deps.cfg.queue_grace;
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                // If the ticket is gone a pairing won the race; nothing to do.
                let Some(ticket) = lobby.take(&subject, ticket_id) else {
                    return;
                };
                let profile = bot::create_bot(target_level, target_points);
                tracing::info!(
                    %subject,
                    waiter = ticket.seat.participant.id(),
                    bot = %profile.id,
                    "grace period elapsed, starting bot session"
                );
                live::spawn_session(deps, subject, [ticket.seat, LiveSeat::bot(profile)]);
            })
        };

        let mut waiting = self.waiting.lock().unwrap_or_else(|e| e.into_inner());
        waiting.entry(subject).or_default().push_back(LobbyTicket {
            id: ticket_id,
            seat,
            timer: Some(timer),
        });
    }

    fn take(&self, subject: &str, ticket_id: Uuid) -> Option<LobbyTicket> {
        let mut waiting = self.waiting.lock().unwrap_or_else(|e| e.into_inner());
        let queue = waiting.get_mut(subject)?;
        let pos = queue.iter().position(|t| t.id == ticket_id)?;
        queue.remove(pos)
    }

    #[cfg(test)]
    fn waiting_len(&self, subject: &str) -> usize {
        self.waiting
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(subject)
            .map(|q| q.len())
            .unwrap_or(0)
    }
}

struct PoolTicket {
    id: Uuid,
    player: PlayerRef,
    reply: oneshot::Sender<Uuid>,
}

/// What `OpenPool::join` resolved to for the caller.
pub enum PoolOutcome {
    /// Someone was waiting: the caller creates the match and reports its id
    /// back through the waiter's reply channel.
    Paired {
        waiter: PlayerRef,
        reply: oneshot::Sender<Uuid>,
    },
    /// Nobody was waiting: the caller holds a ticket and listens for the
    /// match id; on grace timeout it reclaims the ticket via [`OpenPool::take`].
    Waiting {
        ticket_id: Uuid,
        rx: oneshot::Receiver<Uuid>,
    },
}

/// Shared per-subject pool used when creating async matches without an
/// explicit opponent.
#[derive(Default)]
pub struct OpenPool {
    waiting: Mutex<HashMap<String, VecDeque<PoolTicket>>>,
}

impl OpenPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, subject: &str, player: PlayerRef) -> PoolOutcome {
        let mut waiting = self.waiting.lock().unwrap_or_else(|e| e.into_inner());
        let queue = waiting.entry(subject.to_string()).or_default();
        // Never pair a player with their own waiting ticket.
        if let Some(pos) = queue.iter().position(|t| t.player.id != player.id) {
            let ticket = queue.remove(pos).unwrap_or_else(|| unreachable!());
            return PoolOutcome::Paired {
                waiter: ticket.player,
                reply: ticket.reply,
            };
        }
        let (reply, rx) = oneshot::channel();
        let ticket_id = Uuid::new_v4();
        queue.push_back(PoolTicket {
            id: ticket_id,
            player,
            reply,
        });
        PoolOutcome::Waiting { ticket_id, rx }
    }

    /// Removes the caller's own ticket after a grace timeout. `None` means a
    /// pairing already consumed it and the match id is on its way.
    pub fn take(&self, subject: &str, ticket_id: Uuid) -> Option<PlayerRef> {
        let mut waiting = self.waiting.lock().unwrap_or_else(|e| e.into_inner());
        let queue = waiting.get_mut(subject)?;
        let pos = queue.iter().position(|t| t.id == ticket_id)?;
        queue.remove(pos).map(|t| t.player)
    }
}
