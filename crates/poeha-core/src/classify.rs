//! Classification of client log lines into [`GameEvent`]s.
//!
//! Patterns are tried in a fixed order and the first match wins:
//! trade whisper, area joined, area left, level up, death. Everything else is
//! ignored, which is the common case.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::area::AreaMembers;
use crate::event::{AreaChange, DeathEvent, GameEvent, LevelUpEvent, LogTimestamp, TradeEvent};

/// Prefix shared by client status lines: date, time, then the `[INFO Client <pid>] : ` tag.
macro_rules! client_info_pattern {
    ($body:literal) => {
        concat!(
            r"^(?P<date>\d{4}/\d{2}/\d{2}) (?P<time>\d{2}:\d{2}:\d{2}) .*?\[INFO Client \d+\] : ",
            $body
        )
    };
}

/// Trade whispers carry no `[INFO Client]` tag; they are anchored on `@From`.
static TRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<date>\d{4}/\d{2}/\d{2}) (?P<time>\d{2}:\d{2}:\d{2}).*@From (?P<buyer>[^:]+): ",
        r"Hi, I would like to buy your (?P<item>.*?) listed for (?P<cost>.*?) in (?P<league>[^(]+) ",
        r#"\(stash tab "(?P<tab>.*?)"; position: left (?P<left>\d+), top (?P<top>\d+)\)"#,
    ))
    .unwrap()
});

static AREA_JOINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(client_info_pattern!(r"(?P<name>[^\\]+) has joined the area\.")).unwrap()
});

static AREA_LEFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(client_info_pattern!(r"(?P<name>[^\\]+) has left the area\.")).unwrap()
});

static LEVEL_UP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(client_info_pattern!(
        r"(?P<name>\S+) \((?P<class>[^)]+)\) is now level \d+"
    ))
    .unwrap()
});

static DEATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(client_info_pattern!(r"(?P<name>\S+) has been slain\.")).unwrap()
});

/// Classifies one log line, updating `members` on join and leave lines.
///
/// Returns `None` for lines that match no pattern; `members` is untouched in
/// that case. Level-up and death events are marked as concerning the
/// monitored player when the character is not a tracked area member.
pub fn classify(line: &str, members: &mut AreaMembers) -> Option<GameEvent> {
    if let Some(trade) = parse_trade(line) {
        return Some(GameEvent::Trade(trade));
    }

    if let Some(change) = parse_area_change(&AREA_JOINED_RE, line) {
        members.add(&change.player);
        tracing::debug!(player = %change.player, members = ?members.names(), "player joined area");
        return Some(GameEvent::Joined(change));
    }

    if let Some(change) = parse_area_change(&AREA_LEFT_RE, line) {
        members.remove(&change.player);
        tracing::debug!(player = %change.player, members = ?members.names(), "player left area");
        return Some(GameEvent::Left(change));
    }

    if let Some(caps) = LEVEL_UP_RE.captures(line) {
        if let Some(timestamp) = timestamp(&caps) {
            let name = &caps["name"];
            return Some(GameEvent::LevelUp(LevelUpEvent {
                timestamp,
                player_log_name: name.to_string(),
                class_name: caps["class"].to_string(),
                is_monitored_player: !members.contains(name),
            }));
        }
    }

    if let Some(caps) = DEATH_RE.captures(line) {
        if let Some(timestamp) = timestamp(&caps) {
            let name = &caps["name"];
            return Some(GameEvent::Death(DeathEvent {
                timestamp,
                player_log_name: name.to_string(),
                is_monitored_player: !members.contains(name),
            }));
        }
    }

    None
}

fn timestamp(caps: &Captures<'_>) -> Option<LogTimestamp> {
    LogTimestamp::parse(&caps["date"], &caps["time"])
}

fn parse_trade(line: &str) -> Option<TradeEvent> {
    let caps = TRADE_RE.captures(line)?;
    Some(TradeEvent {
        timestamp: timestamp(&caps)?,
        buyer_name: caps["buyer"].to_string(),
        item_name: caps["item"].to_string(),
        item_cost: caps["cost"].to_string(),
        league: caps["league"].trim().to_string(),
        tab_name: caps["tab"].to_string(),
        left: caps["left"].parse().ok()?,
        top: caps["top"].parse().ok()?,
    })
}

fn parse_area_change(re: &Regex, line: &str) -> Option<AreaChange> {
    let caps = re.captures(line)?;
    Some(AreaChange {
        timestamp: timestamp(&caps)?,
        player: caps["name"].to_string(),
    })
}
