use enum_dispatch::enum_dispatch;
use log::{error, info, warn};
use thiserror::Error;

pub mod command;
pub mod replay;


use command::CommandBridge;
use replay::ReplayBridge;

pub const APP_NAME: &str = "Proof of Concept";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("request processor unavailable: {0}")]
    Unavailable(String),
    #[error("no open connection")]
    NotConnected,
    #[error("unknown session ticket {0}")]
    UnknownTicket(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    LocalDesktop,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::LocalDesktop => "localQBD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Use whichever company file is open in QuickBooks.
    DoNotCare,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::DoNotCare => "qbFileOpenDoNotCare",
        }
    }
}

/// Opaque handle for an open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket(pub String);

/// The request/response channel to QuickBooks. Callers should go through
/// [`Connection`] and [`Session`], which release what they acquire.
#[enum_dispatch]
pub trait RequestProcessor {
    fn open_connection(&mut self, app_name: &str, connection: ConnectionType) -> Result<(), BridgeError>;
    fn begin_session(&mut self, company_file: &str, mode: FileMode) -> Result<Ticket, BridgeError>;
    fn process_request(&mut self, ticket: &Ticket, request: &str) -> Result<String, BridgeError>;
    fn end_session(&mut self, ticket: &Ticket) -> Result<(), BridgeError>;
    fn close_connection(&mut self) -> Result<(), BridgeError>;
}

#[enum_dispatch(RequestProcessor)]
pub enum Bridge {
    CommandBridge,
    ReplayBridge,
}

/// An open connection, closed when dropped.
pub struct Connection<'a, P: RequestProcessor> {
    processor: &'a mut P,
}

impl<'a, P: RequestProcessor> Connection<'a, P> {
    pub fn open(processor: &'a mut P, app_name: &str, connection: ConnectionType) -> Result<Self, BridgeError> {
        processor.open_connection(app_name, connection)?;
        info!("connection opened");

        Ok(Connection { processor })
    }

    pub fn begin_session(&mut self, company_file: &str, mode: FileMode) -> Result<Session<'_, P>, BridgeError> {
        let ticket = self.processor.begin_session(company_file, mode)?;
        info!("session started");

        Ok(Session {
            processor: &mut *self.processor,
            ticket,
        })
    }
}

impl<P: RequestProcessor> Drop for Connection<'_, P> {
    fn drop(&mut self) {
        match self.processor.close_connection() {
            Ok(()) => info!("connection closed"),
            Err(err) => warn!("failed to close connection, err={}", err),
        }
    }
}

/// A session on an open connection, ended when dropped. Borrowing the
/// connection keeps the session from outliving it.
pub struct Session<'a, P: RequestProcessor> {
    processor: &'a mut P,
    ticket: Ticket,
}

impl<P: RequestProcessor> Session<'_, P> {
    pub fn send(&mut self, request: &str) -> Result<String, BridgeError> {
        let response = self.processor.process_request(&self.ticket, request)?;
        info!("request processed");

        Ok(response)
    }
}

impl<P: RequestProcessor> Drop for Session<'_, P> {
    fn drop(&mut self) {
        match self.processor.end_session(&self.ticket) {
            Ok(()) => info!("session ended"),
            Err(err) => warn!("failed to end session, err={}", err),
        }
    }
}

fn submit<P: RequestProcessor>(processor: &mut P, request: &str) -> Result<String, BridgeError> {
    let mut connection = Connection::open(processor, APP_NAME, ConnectionType::LocalDesktop)?;
    let mut session = connection.begin_session("", FileMode::DoNotCare)?;
    let response = session.send(request)?;

    Ok(response)
}

/// Submits the request and returns the response document. A bridge failure is
/// logged and yields an empty response, which later stages treat as "nothing
/// came back".
pub fn query_quickbooks<P: RequestProcessor>(processor: &mut P, request: &str) -> String {
    match submit(processor, request) {
        Ok(response) => response,
        Err(err) => {
            error!("connection problem: {}", err);
            String::new()
        },
    }
}
