use std::fs;
use std::path::PathBuf;

use log::debug;

use super::{BridgeError, ConnectionType, FileMode, RequestProcessor, Ticket};

const TICKET: &str = "replay";

/// Serves a previously saved response document instead of asking QuickBooks.
/// Useful for running the export offline against a captured response.
#[derive(Debug)]
pub struct ReplayBridge {
    path: PathBuf,
    connected: bool,
    in_session: bool,
}

impl ReplayBridge {
    pub fn new(path: impl Into<PathBuf>) -> ReplayBridge {
        ReplayBridge {
            path: path.into(),
            connected: false,
            in_session: false,
        }
    }
}

impl RequestProcessor for ReplayBridge {
    fn open_connection(&mut self, _app_name: &str, _connection: ConnectionType) -> Result<(), BridgeError> {
        if !self.path.is_file() {
            return Err(BridgeError::Unavailable(format!("no saved response at {}", self.path.display())));
        }

        self.connected = true;
        Ok(())
    }

    fn begin_session(&mut self, _company_file: &str, _mode: FileMode) -> Result<Ticket, BridgeError> {
        if !self.connected {
            return Err(BridgeError::NotConnected);
        }

        self.in_session = true;
        Ok(Ticket(TICKET.to_owned()))
    }

    fn process_request(&mut self, ticket: &Ticket, request: &str) -> Result<String, BridgeError> {
        if !self.in_session || ticket.0 != TICKET {
            return Err(BridgeError::UnknownTicket(ticket.0.clone()));
        }

        debug!("replaying {} for request:\n{}", self.path.display(), request);
        Ok(fs::read_to_string(&self.path)?)
    }

    fn end_session(&mut self, ticket: &Ticket) -> Result<(), BridgeError> {
        if !self.in_session || ticket.0 != TICKET {
            return Err(BridgeError::UnknownTicket(ticket.0.clone()));
        }

        self.in_session = false;
        Ok(())
    }

    fn close_connection(&mut self) -> Result<(), BridgeError> {
        if !self.connected {
            return Err(BridgeError::NotConnected);
        }

        self.in_session = false;
        self.connected = false;
        Ok(())
    }
}
