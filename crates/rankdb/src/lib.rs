pub mod codec;
pub mod rankdb;

pub use codec::{decode, encode, Announcement, AnnouncementKind};
pub use rankdb::RankDb;
