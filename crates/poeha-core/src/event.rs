//! Events recognized in the game client log and the notifications built from them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

const DATE_FORMAT: &str = "%Y/%m/%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Wall-clock stamp written at the start of every client log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogTimestamp {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl LogTimestamp {
    /// Parses the `YYYY/MM/DD` and `HH:MM:SS` fields of a log line.
    ///
    /// Returns `None` for digits that do not form a real calendar date or time
    /// (e.g. `2024/13/40`).
    pub fn parse(date: &str, time: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
        let time = NaiveTime::parse_from_str(time, TIME_FORMAT).ok()?;
        Some(Self { date, time })
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn time_string(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

impl fmt::Display for LogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date_string(), self.time_string())
    }
}

/// An incoming trade whisper from another player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeEvent {
    pub timestamp: LogTimestamp,
    pub buyer_name: String,
    pub item_name: String,
    /// Price as written by the trade site, e.g. `5 exalted`.
    pub item_cost: String,
    pub league: String,
    pub tab_name: String,
    /// Stash grid column.
    pub left: u32,
    /// Stash grid row.
    pub top: u32,
}

/// A player entering or leaving the monitored player's area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaChange {
    pub timestamp: LogTimestamp,
    pub player: String,
}

/// A character reaching a new level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpEvent {
    pub timestamp: LogTimestamp,
    /// Character name as it appears in the log.
    pub player_log_name: String,
    pub class_name: String,
    /// `true` when the character is not a tracked area member.
    pub is_monitored_player: bool,
}

/// A character being slain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathEvent {
    pub timestamp: LogTimestamp,
    pub player_log_name: String,
    pub is_monitored_player: bool,
}

/// A single classified log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Trade(TradeEvent),
    /// Only mutates area membership; never forwarded.
    Joined(AreaChange),
    /// Only mutates area membership; never forwarded.
    Left(AreaChange),
    LevelUp(LevelUpEvent),
    Death(DeathEvent),
}

impl GameEvent {
    /// The webhook event name for this kind, if the kind is ever sent.
    pub const fn event_name(&self) -> Option<EventName> {
        match self {
            Self::Trade(_) => Some(EventName::TradeIncoming),
            Self::LevelUp(_) => Some(EventName::PlayerLeveled),
            Self::Death(_) => Some(EventName::PlayerDied),
            Self::Joined(_) | Self::Left(_) => None,
        }
    }

    /// Whether this event should reach the notification sink.
    ///
    /// Trades always do. Level-ups and deaths only do when they concern the
    /// monitored player.
    pub const fn is_forwardable(&self) -> bool {
        match self {
            Self::Trade(_) => true,
            Self::LevelUp(event) => event.is_monitored_player,
            Self::Death(event) => event.is_monitored_player,
            Self::Joined(_) | Self::Left(_) => false,
        }
    }

    /// Builds the webhook payload, or `None` when the event is not forwardable.
    pub fn to_notification(&self, player_name: &str) -> Option<Notification> {
        if !self.is_forwardable() {
            return None;
        }
        let event = self.event_name()?;
        let mut payload = BTreeMap::new();
        payload.insert("player_name".to_string(), player_name.to_string());

        match self {
            Self::Trade(trade) => {
                insert_timestamp(&mut payload, trade.timestamp);
                payload.insert("buyer_name".to_string(), trade.buyer_name.clone());
                payload.insert("item_name".to_string(), trade.item_name.clone());
                payload.insert("item_cost".to_string(), trade.item_cost.clone());
                payload.insert("league".to_string(), trade.league.clone());
                payload.insert("tab_name".to_string(), trade.tab_name.clone());
                payload.insert("left".to_string(), trade.left.to_string());
                payload.insert("top".to_string(), trade.top.to_string());
            }
            Self::LevelUp(level) => {
                insert_timestamp(&mut payload, level.timestamp);
                payload.insert("player_log_name".to_string(), level.player_log_name.clone());
                payload.insert("class_name".to_string(), level.class_name.clone());
                payload.insert(
                    "is_monitored_player".to_string(),
                    level.is_monitored_player.to_string(),
                );
            }
            Self::Death(death) => {
                insert_timestamp(&mut payload, death.timestamp);
                payload.insert("player_log_name".to_string(), death.player_log_name.clone());
                payload.insert(
                    "is_monitored_player".to_string(),
                    death.is_monitored_player.to_string(),
                );
            }
            Self::Joined(_) | Self::Left(_) => return None,
        }

        Some(Notification { event, payload })
    }
}

fn insert_timestamp(payload: &mut BTreeMap<String, String>, timestamp: LogTimestamp) {
    payload.insert("date".to_string(), timestamp.date_string());
    payload.insert("time".to_string(), timestamp.time_string());
}

/// A normalized event ready for delivery: a name plus string-valued fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub event: EventName,
    pub payload: BTreeMap<String, String>,
}

/// Webhook event names, the single source of truth for the wire strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    TradeIncoming,
    PlayerLeveled,
    PlayerDied,
}

impl EventName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TradeIncoming => "poe_trade_incoming",
            Self::PlayerLeveled => "poe_player_leveled",
            Self::PlayerDied => "poe_player_died",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
