use std::collections::HashMap;

use crate::{
    atoms::TrayAtoms,
    backend::{Atom, ClientMessage, Timestamp, TrayEvent, WindowId},
};

const REQUEST_DOCK: u32 = 0;
const BEGIN_MESSAGE: u32 = 1;
const CANCEL_MESSAGE: u32 = 2;

/// Outcome of running an event through the [`Dispatcher`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Filter<T> {
    /// Not a tray message; hand it on to normal event processing unchanged.
    Continue,
    /// A tray message. It is consumed here and must not be processed any further.
    Remove(T),
}

/// A decoded `_NET_SYSTEM_TRAY_OPCODE` message.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TrayRequest {
    Dock { timestamp: Timestamp, window: WindowId },
    BeginMessage { window: WindowId, timeout: u32, length: u32, id: u32 },
    CancelMessage { window: WindowId, id: u32 },
    Unknown { opcode: u32 },
    Malformed { format: u8 },
}

type Decoder = fn(&ClientMessage) -> TrayRequest;

/// Maps client message types to their decoders. Anything not in the table passes through.
#[derive(Clone)]
pub struct Dispatcher {
    table: HashMap<Atom, Decoder>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("message_types", &self.table.keys().collect::<Vec<_>>()).finish()
    }
}

impl Dispatcher {
    pub fn new(atoms: &TrayAtoms) -> Self {
        let mut table: HashMap<Atom, Decoder> = HashMap::new();
        table.insert(atoms.opcode, decode_opcode);
        Dispatcher { table }
    }

    pub fn filter(&self, event: &TrayEvent) -> Filter<TrayRequest> {
        let TrayEvent::ClientMessage(message) = event else {
            return Filter::Continue;
        };
        match self.table.get(&message.type_) {
            Some(decode) => Filter::Remove(decode(message)),
            None => Filter::Continue,
        }
    }
}

/// Layout: `[timestamp, opcode, ...]`; for docking `data[2]` is the icon window.
fn decode_opcode(message: &ClientMessage) -> TrayRequest {
    if message.format != 32 {
        return TrayRequest::Malformed { format: message.format };
    }
    let [timestamp, opcode, d2, d3, d4] = message.data;
    match opcode {
        REQUEST_DOCK => TrayRequest::Dock { timestamp, window: d2 },
        BEGIN_MESSAGE => TrayRequest::BeginMessage { window: message.window, timeout: d2, length: d3, id: d4 },
        CANCEL_MESSAGE => TrayRequest::CancelMessage { window: message.window, id: d2 },
        opcode => TrayRequest::Unknown { opcode },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms() -> TrayAtoms {
        TrayAtoms { selection: 300, opcode: 301, visual: 302, orientation: 303, manager: 304, xembed_info: 305 }
    }

    fn opcode_message(data: [u32; 5]) -> TrayEvent {
        TrayEvent::ClientMessage(ClientMessage::new(0x600001, atoms().opcode, data))
    }

    #[test]
    fn test_dock_request_extracts_window_from_third_field() {
        let dispatcher = Dispatcher::new(&atoms());
        assert_eq!(
            dispatcher.filter(&opcode_message([77, 0, 0x1200003, 0, 0])),
            Filter::Remove(TrayRequest::Dock { timestamp: 77, window: 0x1200003 })
        );
    }

    #[test]
    fn test_other_message_types_pass_through() {
        let dispatcher = Dispatcher::new(&atoms());
        let manager = TrayEvent::ClientMessage(ClientMessage::new(0x100, atoms().manager, [1, 300, 5, 0, 0]));
        assert_eq!(dispatcher.filter(&manager), Filter::Continue);
        assert_eq!(dispatcher.filter(&TrayEvent::Destroyed { window: 5 }), Filter::Continue);
        assert_eq!(dispatcher.filter(&TrayEvent::Other), Filter::Continue);
    }

    #[test]
    fn test_balloon_messages_are_consumed() {
        let dispatcher = Dispatcher::new(&atoms());
        assert_eq!(
            dispatcher.filter(&opcode_message([1, 1, 5000, 12, 9])),
            Filter::Remove(TrayRequest::BeginMessage { window: 0x600001, timeout: 5000, length: 12, id: 9 })
        );
        assert_eq!(
            dispatcher.filter(&opcode_message([1, 2, 9, 0, 0])),
            Filter::Remove(TrayRequest::CancelMessage { window: 0x600001, id: 9 })
        );
        assert_eq!(dispatcher.filter(&opcode_message([1, 17, 0, 0, 0])), Filter::Remove(TrayRequest::Unknown { opcode: 17 }));
    }

    #[test]
    fn test_wrong_format_is_malformed() {
        let dispatcher = Dispatcher::new(&atoms());
        let message = ClientMessage { format: 8, ..ClientMessage::new(1, atoms().opcode, [0; 5]) };
        assert_eq!(dispatcher.filter(&TrayEvent::ClientMessage(message)), Filter::Remove(TrayRequest::Malformed { format: 8 }));
    }
}
