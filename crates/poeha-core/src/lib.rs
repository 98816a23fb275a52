//! Core engine for the Path of Exile to Home Assistant bridge.
//!
//! This crate contains the pieces that turn a growing game client log into
//! webhook-ready events:
//! - Tailing: following `Client.txt` from its live end (`tail`)
//! - Classification: matching log lines against the recognized event shapes
//! - Area membership: remembering which other players share the current area
//! - Dispatch: routing forwardable events to a notification sink

pub mod area;
pub mod classify;
pub mod dispatch;
pub mod event;
pub mod tail;

pub use area::AreaMembers;
pub use classify::classify;
pub use dispatch::{DeliveryError, Dispatch, DispatchStats, Dispatcher, EventSink};
pub use event::{
    AreaChange, DeathEvent, EventName, GameEvent, LevelUpEvent, LogTimestamp, Notification,
    TradeEvent,
};
pub use tail::{LogTail, TailError};
