//! Fixed-layout rank announcement datagram (§4.1).
//!
//! Eight bytes, little-endian: a 32-bit type tag (0 = LAUNCH, 1 = EXIT)
//! followed by a 32-bit rank. The rank occupies the union slot regardless
//! of kind — this mirrors the `construct`-library `Union` layout the
//! original Python announcement protocol used.

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use sdnmpi_core::SdnError;

pub const ANNOUNCEMENT_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    Launch,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub rank: i32,
}

/// Decode an 8-byte announcement payload. Fails if the length isn't exactly
/// 8 bytes or the type tag isn't 0 or 1.
pub fn decode(bytes: &[u8]) -> Result<Announcement, SdnError> {
    if bytes.len() != ANNOUNCEMENT_LEN {
        return Err(SdnError::MalformedAnnouncement(format!(
            "expected {} bytes, got {}",
            ANNOUNCEMENT_LEN,
            bytes.len()
        )));
    }

    let mut cursor = bytes;
    let tag = cursor
        .read_i32::<LE>()
        .map_err(|e| SdnError::MalformedAnnouncement(e.to_string()))?;
    let rank = cursor
        .read_i32::<LE>()
        .map_err(|e| SdnError::MalformedAnnouncement(e.to_string()))?;

    let kind = match tag {
        0 => AnnouncementKind::Launch,
        1 => AnnouncementKind::Exit,
        other => {
            return Err(SdnError::MalformedAnnouncement(format!(
                "unknown announcement type tag {}",
                other
            )))
        }
    };

    Ok(Announcement { kind, rank })
}

/// Encode an announcement back into its 8-byte wire form.
pub fn encode(kind: AnnouncementKind, rank: i32) -> [u8; ANNOUNCEMENT_LEN] {
    let tag: i32 = match kind {
        AnnouncementKind::Launch => 0,
        AnnouncementKind::Exit => 1,
    };
    let mut buf = Vec::with_capacity(ANNOUNCEMENT_LEN);
    buf.write_i32::<LE>(tag).unwrap();
    buf.write_i32::<LE>(rank).unwrap();
    buf.try_into().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_launch_and_exit() {
        for (kind, rank) in [(AnnouncementKind::Launch, 7), (AnnouncementKind::Exit, 7)] {
            let bytes = encode(kind, rank);
            let decoded = decode(&bytes).unwrap();
            assert_eq!(decoded.kind, kind);
            assert_eq!(decoded.rank, rank);
        }
    }

    #[test]
    fn decodes_the_s5_scenario_bytes() {
        let launch = [0x00, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00];
        let decoded = decode(&launch).unwrap();
        assert_eq!(decoded.kind, AnnouncementKind::Launch);
        assert_eq!(decoded.rank, 7);

        let exit = [0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00];
        let decoded = decode(&exit).unwrap();
        assert_eq!(decoded.kind, AnnouncementKind::Exit);
        assert_eq!(decoded.rank, 7);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(decode(&[0u8; 7]).is_err());
        assert!(decode(&[0u8; 9]).is_err());
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let bytes = [0x02, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00];
        assert!(decode(&bytes).is_err());
    }
}
