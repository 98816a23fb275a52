//! The tail -> classify -> notify loop.

use thiserror::Error;

use crate::area::AreaMembers;
use crate::classify::classify;
use crate::event::{EventName, GameEvent, Notification};
use crate::tail::{LogTail, TailError};

/// Debug output shows at most this many characters of each line.
const DEBUG_LINE_PREVIEW: usize = 76;

/// Failure to hand a notification to its sink. Never fatal to the loop.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The delivery queue is full; the event was dropped.
    #[error("delivery queue full, dropped {event}")]
    QueueFull { event: EventName },
    /// The delivery worker is gone.
    #[error("delivery worker stopped")]
    Closed,
}

/// Receiver of forwardable events.
///
/// Implementations must return promptly: the dispatcher calls `send` inline
/// between reading lines.
pub trait EventSink {
    fn send(&mut self, notification: Notification) -> Result<(), DeliveryError>;
}

/// Collects notifications in memory, for dry runs.
impl EventSink for Vec<Notification> {
    fn send(&mut self, notification: Notification) -> Result<(), DeliveryError> {
        self.push(notification);
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn send(&mut self, notification: Notification) -> Result<(), DeliveryError> {
        (**self).send(notification)
    }
}

/// What happened to a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Matched no pattern.
    Ignored,
    /// A join or leave line; only area membership changed.
    Tracked,
    /// A level-up or death belonging to another player.
    Suppressed,
    /// Handed to the sink.
    Forwarded(EventName),
    /// The sink refused it.
    Dropped(EventName),
}

/// Per-session counters, reported on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub lines: u64,
    pub forwarded: u64,
    pub dropped: u64,
}

/// Drives classification for one monitored player and routes results to a sink.
///
/// Owns the area membership state; nothing else mutates it.
pub struct Dispatcher<S> {
    player_name: String,
    members: AreaMembers,
    sink: S,
    stats: DispatchStats,
}

impl<S: EventSink> Dispatcher<S> {
    pub fn new(player_name: impl Into<String>, sink: S) -> Self {
        let player_name = player_name.into();
        Self {
            members: AreaMembers::for_player(player_name.clone()),
            player_name,
            sink,
            stats: DispatchStats::default(),
        }
    }

    pub const fn members(&self) -> &AreaMembers {
        &self.members
    }

    pub const fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Classifies one line and forwards it if it is a forwardable event.
    ///
    /// Sink failures are logged and counted; they never propagate.
    pub fn handle_line(&mut self, line: &str) -> Dispatch {
        self.stats.lines += 1;
        tracing::debug!(line = %preview(line), "read line");

        let Some(event) = classify(line, &mut self.members) else {
            return Dispatch::Ignored;
        };

        let Some(notification) = event.to_notification(&self.player_name) else {
            return match event {
                GameEvent::Joined(_) | GameEvent::Left(_) => Dispatch::Tracked,
                _ => {
                    tracing::debug!(?event, "event belongs to another player");
                    Dispatch::Suppressed
                }
            };
        };

        let name = notification.event;
        describe(&event);
        match self.sink.send(notification) {
            Ok(()) => {
                self.stats.forwarded += 1;
                Dispatch::Forwarded(name)
            }
            Err(err) => {
                self.stats.dropped += 1;
                tracing::warn!(event = %name, error = %err, "failed to forward event");
                Dispatch::Dropped(name)
            }
        }
    }

    /// Pulls lines from `tail` until it fails.
    ///
    /// Only returns on a fatal read error; per-line problems are handled
    /// inside [`Self::handle_line`]. Cancellation-safe, since
    /// [`LogTail::next_line`] is.
    pub async fn run(&mut self, tail: &mut LogTail) -> Result<(), TailError> {
        loop {
            let line = tail.next_line().await?;
            self.handle_line(&line);
        }
    }
}

fn describe(event: &GameEvent) {
    match event {
        GameEvent::Trade(trade) => tracing::info!(
            buyer = %trade.buyer_name,
            item = %trade.item_name,
            cost = %trade.item_cost,
            "trade request detected"
        ),
        GameEvent::LevelUp(level) => tracing::info!(
            character = %level.player_log_name,
            class = %level.class_name,
            "level up detected"
        ),
        GameEvent::Death(death) => {
            tracing::info!(character = %death.player_log_name, "death detected");
        }
        GameEvent::Joined(_) | GameEvent::Left(_) => {}
    }
}

fn preview(line: &str) -> &str {
    match line.char_indices().nth(DEBUG_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<Notification>,
        fail: bool,
    }

    impl EventSink for Recorder {
        fn send(&mut self, notification: Notification) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Closed);
            }
            self.sent.push(notification);
            Ok(())
        }
    }

    const TRADE_LINE: &str = r#"2024/01/01 12:00:00 ... @From Bob: Hi, I would like to buy your Widget listed for 5 exalted in Standard (stash tab "Tab1"; position: left 2, top 3)"#;
    const ALICE_JOINED: &str = "2024/01/01 12:00:00 1 a [INFO Client 123] : Alice has joined the area.";
    const ALICE_LEFT: &str = "2024/01/01 12:00:05 1 a [INFO Client 123] : Alice has left the area.";
    const ALICE_SLAIN: &str = "2024/01/01 12:00:01 1 a [INFO Client 123] : Alice has been slain.";

    #[test]
    fn trade_is_forwarded() {
        let mut dispatcher = Dispatcher::new("You", Recorder::default());
        assert_eq!(
            dispatcher.handle_line(TRADE_LINE),
            Dispatch::Forwarded(EventName::TradeIncoming)
        );

        let sent = &dispatcher.sink().sent;
        assert_eq!(sent.len(), 1);
        let payload = &sent[0].payload;
        assert_eq!(payload["buyer_name"], "Bob");
        assert_eq!(payload["item_name"], "Widget");
        assert_eq!(payload["item_cost"], "5 exalted");
        assert_eq!(payload["tab_name"], "Tab1");
        assert_eq!(payload["left"], "2");
        assert_eq!(payload["top"], "3");
        assert_eq!(payload["player_name"], "You");
    }

    #[test]
    fn party_member_death_is_suppressed() {
        let mut dispatcher = Dispatcher::new("You", Recorder::default());
        assert_eq!(dispatcher.handle_line(ALICE_JOINED), Dispatch::Tracked);
        assert!(dispatcher.members().contains("Alice"));
        assert_eq!(dispatcher.handle_line(ALICE_SLAIN), Dispatch::Suppressed);
        assert!(dispatcher.sink().sent.is_empty());
    }

    #[test]
    fn own_death_is_forwarded() {
        let mut dispatcher = Dispatcher::new("You", Recorder::default());
        assert_eq!(
            dispatcher.handle_line(ALICE_SLAIN),
            Dispatch::Forwarded(EventName::PlayerDied)
        );
        let sent = &dispatcher.sink().sent;
        assert_eq!(sent[0].payload["is_monitored_player"], "true");
        assert_eq!(sent[0].payload["player_log_name"], "Alice");
    }

    #[test]
    fn death_after_member_leaves_is_forwarded() {
        let mut dispatcher = Dispatcher::new("You", Recorder::default());
        dispatcher.handle_line(ALICE_JOINED);
        dispatcher.handle_line(ALICE_LEFT);
        assert_eq!(
            dispatcher.handle_line(ALICE_SLAIN),
            Dispatch::Forwarded(EventName::PlayerDied)
        );
    }

    #[test]
    fn sink_failure_does_not_stop_dispatch() {
        let mut dispatcher = Dispatcher::new("You", Recorder {
            fail: true,
            ..Recorder::default()
        });
        assert_eq!(
            dispatcher.handle_line(TRADE_LINE),
            Dispatch::Dropped(EventName::TradeIncoming)
        );
        assert_eq!(dispatcher.handle_line(ALICE_JOINED), Dispatch::Tracked);
        assert_eq!(
            dispatcher.handle_line(TRADE_LINE),
            Dispatch::Dropped(EventName::TradeIncoming)
        );
        assert_eq!(
            dispatcher.stats(),
            DispatchStats {
                lines: 3,
                forwarded: 0,
                dropped: 2,
            }
        );
    }

    #[test]
    fn irrelevant_lines_are_ignored() {
        let mut dispatcher = Dispatcher::new("You", Recorder::default());
        assert_eq!(dispatcher.handle_line("random noise"), Dispatch::Ignored);
        assert_eq!(dispatcher.stats().lines, 1);
        assert!(dispatcher.members().is_empty());
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let line = "é".repeat(100);
        assert_eq!(preview(&line).chars().count(), DEBUG_LINE_PREVIEW);
        assert_eq!(preview("short"), "short");
    }
}
