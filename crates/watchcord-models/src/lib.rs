pub mod channel;
pub mod gateway;
pub mod member;
pub mod presence;
pub mod user;
pub mod voice;

pub use channel::Channel;
pub use gateway::{GatewayEvent, ReactionAdd};
pub use member::{Member, Role};
pub use presence::{
    Activity, ActivityAssets, CustomStatus, GenericActivity, ListeningActivity, OnlineStatus,
    PlayingActivity, SpotifyTrack, StreamingActivity,
};
pub use user::{ImageFormat, User};
pub use voice::{ChannelRef, VoiceState};
