/// Identity of a player as handed to us by the hosting community.
pub type PlayerId = String;

/// The community scope a single game runs in.
pub type GroupId = String;

/// Opaque handle to the shared channel where a game is narrated.
pub type ChannelRef = String;
