//! Outbound messaging (Telegram today).

pub mod port;
