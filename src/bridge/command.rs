use std::io::{self, ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use log::debug;

use super::{BridgeError, ConnectionType, FileMode, RequestProcessor, Ticket};

pub const DEFAULT_PROGRAM: &str = "qbxmlrp2-bridge";

#[derive(Debug)]
struct Connected {
    app_name: String,
    connection: ConnectionType,
}

#[derive(Debug)]
struct OpenSession {
    ticket: Ticket,
    company_file: String,
    mode: FileMode,
}

/// Hands each request to an external helper program that talks to the
/// QuickBooks request processor on the desktop.
///
/// The helper receives the request document on stdin and the connection and
/// session parameters as arguments, and prints the response document on
/// stdout. A non-zero exit status means QuickBooks rejected the request; the
/// helper's stderr is reported as the reason.
#[derive(Debug)]
pub struct CommandBridge {
    program: String,
    args: Vec<String>,
    connected: Option<Connected>,
    session: Option<OpenSession>,
    sessions_started: u32,
}

impl CommandBridge {
    pub fn new(program: impl Into<String>) -> CommandBridge {
        CommandBridge::with_args(program, Vec::new())
    }

    /// `args` go before the connection and session arguments, e.g. a script
    /// path for an interpreter.
    pub fn with_args(program: impl Into<String>, args: Vec<String>) -> CommandBridge {
        CommandBridge {
            program: program.into(),
            args,
            connected: None,
            session: None,
            sessions_started: 0,
        }
    }
}

impl Default for CommandBridge {
    fn default() -> Self {
        CommandBridge::new(DEFAULT_PROGRAM)
    }
}

impl RequestProcessor for CommandBridge {
    fn open_connection(&mut self, app_name: &str, connection: ConnectionType) -> Result<(), BridgeError> {
        self.connected = Some(Connected {
            app_name: app_name.to_owned(),
            connection,
        });

        Ok(())
    }

    fn begin_session(&mut self, company_file: &str, mode: FileMode) -> Result<Ticket, BridgeError> {
        if self.connected.is_none() {
            return Err(BridgeError::NotConnected);
        }

        self.sessions_started += 1;
        let ticket = Ticket(format!("{}-{}", self.program, self.sessions_started));
        self.session = Some(OpenSession {
            ticket: ticket.clone(),
            company_file: company_file.to_owned(),
            mode,
        });

        Ok(ticket)
    }

    fn process_request(&mut self, ticket: &Ticket, request: &str) -> Result<String, BridgeError> {
        let connected = self.connected.as_ref().ok_or(BridgeError::NotConnected)?;
        let session = match &self.session {
            Some(session) if &session.ticket == ticket => session,
            _ => return Err(BridgeError::UnknownTicket(ticket.0.clone())),
        };

        debug!("running {} for session {}", self.program, ticket.0);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--app-name")
            .arg(&connected.app_name)
            .arg("--connection")
            .arg(connected.connection.as_str())
            .arg("--company-file")
            .arg(&session.company_file)
            .arg("--file-mode")
            .arg(session.mode.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => BridgeError::Unavailable(format!("{} is not installed", self.program)),
                _ => BridgeError::Io(err),
            })?;

        // stdin is fed while stdout and stderr drain, and the child is
        // reaped even if feeding it fails
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(request.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();

            (writer.join(), output)
        });

        let output = output?;
        if !output.status.success() {
            let reason = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(BridgeError::Rejected(reason));
        }
        written.map_err(|_| io::Error::other("failed to write request to helper"))??;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn end_session(&mut self, ticket: &Ticket) -> Result<(), BridgeError> {
        match self.session.take() {
            Some(session) if &session.ticket == ticket => Ok(()),
            other => {
                self.session = other;
                Err(BridgeError::UnknownTicket(ticket.0.clone()))
            },
        }
    }

    fn close_connection(&mut self) -> Result<(), BridgeError> {
        self.session = None;
        self.connected.take().map(|_| ()).ok_or(BridgeError::NotConnected)
    }
}
