//! Constants and helpers for the [XEmbed protocol].
//!
//! [XEmbed protocol]: https://specifications.freedesktop.org/xembed-spec/xembed-spec-latest.html

pub const XEMBED: &str = "_XEMBED";
pub const XEMBED_INFO: &str = "_XEMBED_INFO";

/// Highest protocol version we speak.
pub const PROTOCOL_VERSION: u32 = 0;

/// Flag in `_XEMBED_INFO` asking the embedder to map the client.
pub const XEMBED_MAPPED: u32 = 1 << 0;

#[repr(u32)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Message {
    EmbeddedNotify = 0,
    WindowActivate = 1,
    WindowDeactivate = 2,
    RequestFocus = 3,
    FocusIn = 4,
    FocusOut = 5,
}

/// Contents of a client's `_XEMBED_INFO` property.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Info {
    pub version: u32,
    pub flags: u32,
}

impl Info {
    /// Parse the property value. Returns `None` when the property is missing or truncated.
    pub fn parse(values: &[u32]) -> Option<Self> {
        match values {
            [version, flags, ..] => Some(Info { version: *version, flags: *flags }),
            _ => None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.flags & XEMBED_MAPPED != 0
    }

    /// Version to announce in `XEMBED_EMBEDDED_NOTIFY`.
    pub fn negotiated_version(&self) -> u32 {
        self.version.min(PROTOCOL_VERSION)
    }
}

/// Data fields of an `_XEMBED` client message.
pub fn message_data(time: u32, message: Message, detail: u32, data1: u32, data2: u32) -> [u32; 5] {
    [time, message as u32, detail, data1, data2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info() {
        assert_eq!(Info::parse(&[0, 1]), Some(Info { version: 0, flags: XEMBED_MAPPED }));
        assert_eq!(Info::parse(&[1]), None);
        assert_eq!(Info::parse(&[]), None);
    }

    #[test]
    fn test_mapped_flag_and_version() {
        let info = Info::parse(&[3, 0]).unwrap();
        assert!(!info.is_mapped());
        assert_eq!(info.negotiated_version(), PROTOCOL_VERSION);
    }

    #[test]
    fn test_embedded_notify_layout() {
        assert_eq!(message_data(42, Message::EmbeddedNotify, 0, 0x400001, 0), [42, 0, 0, 0x400001, 0]);
    }
}
