// Discord side of leveling: XP on chat messages, rank cards, level role admin.

pub mod rank_card;
pub mod rewards;
pub mod slash_commands;
