// GMP client: connection, login and request plumbing
//
// Entity operations (targets, tasks, configs, reports, results) are
// implemented as inherent methods in separate files; this module owns the
// transport, the stored authentication token and the shared request path.

use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::auth::{AuthToken, Credentials};
use crate::error::Error;
use crate::transport::{
    DEFAULT_BUFSIZE, DEFAULT_READ_TIMEOUT, DEFAULT_SOCKET_PATH, Socket, Transport,
    TransportConfig,
};
use crate::xml::{Document, Element, Params};

/// Debug level above which request and response bodies are logged.
const PAYLOAD_DEBUG_LEVEL: u8 = 3;

/// Construction-time settings for a [`GmpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub socket_path: PathBuf,
    pub credentials: Credentials,
    pub bufsize: usize,
    pub read_timeout: Duration,
    /// Diagnostic verbosity. Above 3, request and response bodies are
    /// logged at `debug` level. Never changes behavior.
    pub debug: u8,
    /// Open the socket in [`GmpClient::new`].
    pub auto_connect: bool,
    /// Log in in [`GmpClient::new`]. Only honored with `auto_connect`.
    pub auto_login: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            credentials: Credentials::default(),
            bufsize: DEFAULT_BUFSIZE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            debug: 0,
            auto_connect: true,
            auto_login: true,
        }
    }
}

impl ClientConfig {
    fn transport(&self) -> TransportConfig {
        TransportConfig {
            path: self.socket_path.clone(),
            read_timeout: self.read_timeout,
            bufsize: self.bufsize,
        }
    }
}

/// Blocking GMP client bound to one gvmd connection.
///
/// Requests are issued strictly one at a time; every call takes `&mut self`.
/// After a successful [`login`](Self::login) the authentication body is
/// prepended to every request.
pub struct GmpClient<S: Socket = UnixStream> {
    transport: Transport<S>,
    credentials: Credentials,
    token: Option<AuthToken>,
    debug: u8,
}

impl GmpClient<UnixStream> {
    /// Create a client, connecting and logging in as the config requests.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut client = Self::from_transport(Transport::new(config.transport()), &config);
        if config.auto_connect {
            client.connect()?;
            if config.auto_login {
                client.login()?;
            }
        }
        Ok(client)
    }
}

impl<S: Socket> GmpClient<S> {
    /// Create a client over an already-open stream. Never connects or
    /// logs in on its own.
    pub fn with_stream(config: &ClientConfig, stream: S) -> Self {
        Self::from_transport(Transport::with_stream(config.transport(), stream), config)
    }

    fn from_transport(transport: Transport<S>, config: &ClientConfig) -> Self {
        if config.debug > PAYLOAD_DEBUG_LEVEL {
            debug!(
                socket = %config.socket_path.display(),
                user = %config.credentials.username,
                "configured GMP client"
            );
        }
        Self {
            transport,
            credentials: config.credentials.clone(),
            token: None,
            debug: config.debug,
        }
    }

    /// Set the diagnostic verbosity.
    pub fn set_debug(&mut self, level: u8) {
        self.debug = level;
    }

    /// Open the socket now instead of on first use.
    pub fn connect(&mut self) -> Result<(), Error> {
        self.transport.connect()
    }

    /// Close the socket. The next request reconnects and reuses the stored
    /// authentication token.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn socket_path(&self) -> &Path {
        &self.transport.config().path
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate with the configured credentials.
    ///
    /// On success the `<authenticate>` body is stored and prepended to
    /// every later request. On failure the stored token is untouched.
    pub fn login(&mut self) -> Result<(), Error> {
        let token = self.credentials.authenticate_request();
        debug!(user = %self.credentials.username, "logging in");

        let request = format!("{}<help/>", token.expose());
        let bytes = self.transport.send_and_receive(request.as_bytes())?;
        let doc = Document::parse(&bytes)?;

        let status = doc.status_of("authenticate_response")?;
        if status != 200 {
            return Err(Error::Authentication {
                status,
                message: status_text(&doc, "authenticate_response")
                    .unwrap_or("Authentication failed")
                    .to_owned(),
            });
        }

        self.token = Some(token);
        debug!("login successful");
        Ok(())
    }

    /// Whether a login has succeeded on this client.
    pub fn logged_in(&self) -> bool {
        self.token.is_some()
    }

    // ── Raw requests ─────────────────────────────────────────────────

    /// Send `request` with the authentication body prepended and return
    /// the response text.
    pub fn request_raw(&mut self, request: &str) -> Result<String, Error> {
        let bytes = self.exchange(request)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send `request` with the authentication body prepended and parse the
    /// response.
    ///
    /// A refused `authenticate_response` is an [`Error::Authentication`].
    /// Without a stored token the daemon's verdict on the command decides:
    /// a 401, or no status at all, is an [`Error::Authentication`], and any
    /// other answer is returned for the caller to inspect.
    pub fn request_xml(&mut self, request: &str) -> Result<Document, Error> {
        let bytes = self.exchange(request)?;
        let doc = Document::parse(&bytes)?;

        if doc.find("authenticate_response").is_some() {
            let status = doc.status_of("authenticate_response")?;
            if !is_success(status) {
                return Err(Error::Authentication {
                    status,
                    message: status_text(&doc, "authenticate_response")
                        .unwrap_or("authentication rejected")
                        .to_owned(),
                });
            }
        } else if self.logged_in() {
            return Err(Error::XmlParsing {
                message: "missing <authenticate_response> in response".into(),
                body: doc.to_xml(),
            });
        } else {
            let status = response_element(&doc, request)
                .and_then(|n| n.attribute("status"))
                .and_then(|s| s.trim().parse::<u16>().ok());
            if matches!(status, None | Some(401)) {
                warn!(?status, "request sent without a login was refused");
                return Err(Error::Authentication {
                    status: status.unwrap_or(401),
                    message: "not logged in".into(),
                });
            }
        }

        Ok(doc)
    }

    /// Send an unauthenticated request and parse the response.
    pub(crate) fn request_unauthenticated(&mut self, request: &str) -> Result<Document, Error> {
        let bytes = self.send(request)?;
        Document::parse(&bytes)
    }

    /// The shared path of every entity operation: render, send, check the
    /// command status, and fold failures into [`Error::Response`].
    pub(crate) fn command(&mut self, element: &Element) -> Result<Document, Error> {
        let request = element.to_xml();
        debug!(command = element.name(), "sending command");
        self.request_xml(&request)
            .and_then(|doc| check_command_status(doc, element.name()))
            .map_err(|e| e.into_response(&request))
    }

    /// Attribute-only command, the shape of every query and control verb.
    pub(crate) fn command_with_attributes(
        &mut self,
        name: &str,
        attrs: &Params,
    ) -> Result<Document, Error> {
        self.command(&Element::with_attributes(name, attrs))
    }

    fn exchange(&mut self, request: &str) -> Result<Vec<u8>, Error> {
        match &self.token {
            Some(token) => {
                let full = format!("{}{request}", token.expose());
                self.log_payload("SENDING", request);
                let bytes = self.transport.send_and_receive(full.as_bytes())?;
                self.log_payload("RECEIVED", &String::from_utf8_lossy(&bytes));
                Ok(bytes)
            }
            None => self.send(request),
        }
    }

    fn send(&mut self, request: &str) -> Result<Vec<u8>, Error> {
        self.log_payload("SENDING", request);
        let bytes = self.transport.send_and_receive(request.as_bytes())?;
        self.log_payload("RECEIVED", &String::from_utf8_lossy(&bytes));
        Ok(bytes)
    }

    fn log_payload(&self, direction: &str, body: &str) {
        if self.debug > PAYLOAD_DEBUG_LEVEL {
            debug!("{direction}: {body}");
        }
    }
}

// ── Response status helpers ──────────────────────────────────────────

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn status_text<'a>(doc: &'a Document, element: &str) -> Option<&'a str> {
    doc.find(element).and_then(|n| n.attribute("status_text"))
}

/// `<create_target .../>` is answered by `<create_target_response>`.
fn response_element<'a>(doc: &'a Document, request: &str) -> Option<&'a crate::xml::Node> {
    let command = request
        .trim_start()
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .next()?;
    doc.find(&format!("{command}_response"))
}

/// A missing `<{command}_response>`, or one without a numeric status, is an
/// [`Error::XmlParsing`]: the reply was cut short or is not for `command`.
fn check_command_status(doc: Document, command: &str) -> Result<Document, Error> {
    let element = format!("{command}_response");
    let status = doc.status_of(&element)?;
    if is_success(status) {
        return Ok(doc);
    }

    let message = status_text(&doc, &element)
        .unwrap_or("command rejected")
        .to_owned();
    if status == 401 {
        return Err(Error::Authentication { status, message });
    }
    Err(Error::Response {
        message: format!("{command} failed: {message}"),
        request: None,
        status: Some(status),
        source: None,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::mock::{ScriptedSocket, Step};

    fn client(steps: Vec<Step>) -> GmpClient<ScriptedSocket> {
        GmpClient::with_stream(&ClientConfig::default(), ScriptedSocket::new(steps))
    }

    fn written(client: &GmpClient<ScriptedSocket>) -> String {
        let socket = client.transport_stream();
        String::from_utf8(socket.written.clone()).unwrap()
    }

    impl GmpClient<ScriptedSocket> {
        fn transport_stream(&self) -> &ScriptedSocket {
            self.transport.stream_ref().unwrap()
        }

        fn script(&mut self, steps: Vec<Step>) {
            self.transport.stream_mut().unwrap().steps.extend(steps);
        }
    }

    const AUTH_OK: &str = r#"<authenticate_response status="200" status_text="OK"><role>Admin</role></authenticate_response><help_response status="200" status_text="OK"/>"#;

    #[test]
    fn login_success_stores_token() {
        let mut client = client(vec![Step::Data(AUTH_OK.as_bytes().to_vec())]);
        assert!(!client.logged_in());

        client.login().unwrap();

        assert!(client.logged_in());
        assert_eq!(
            written(&client),
            concat!(
                "<authenticate><credentials><username>admin</username>",
                "<password>admin</password></credentials></authenticate><help/>\n"
            )
        );
    }

    #[test]
    fn login_rejection_is_auth_error_and_keeps_logged_out() {
        let mut client = client(vec![Step::Data(
            br#"<authenticate_response status="400" status_text="Authentication failed"/>"#
                .to_vec(),
        )]);

        let err = client.login().unwrap_err();

        match err {
            Error::Authentication { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Authentication failed");
            }
            other => panic!("expected Authentication, got: {other:?}"),
        }
        assert!(!client.logged_in());
    }

    #[test]
    fn login_without_status_is_parse_error() {
        let mut client = client(vec![Step::Data(b"<authenticate_response/>".to_vec())]);
        let err = client.login().unwrap_err();
        assert!(matches!(err, Error::XmlParsing { .. }), "got: {err:?}");
        assert!(!client.logged_in());
    }

    #[test]
    fn authenticated_request_is_prefixed_with_token() {
        let mut client = client(vec![Step::Data(AUTH_OK.as_bytes().to_vec())]);
        client.login().unwrap();
        client.transport.stream_mut().unwrap().written.clear();
        client.script(vec![Step::Data(
            br#"<authenticate_response status="200"/><get_version_response status="200"/>"#
                .to_vec(),
        )]);

        client.request_xml("<get_version/>").unwrap();

        let sent = written(&client);
        assert!(sent.starts_with("<authenticate><credentials>"), "sent: {sent}");
        assert!(sent.ends_with("</authenticate><get_version/>\n"), "sent: {sent}");
    }

    #[test]
    fn unauthenticated_request_surfaces_auth_error() {
        let mut client = client(vec![Step::Data(
            br#"<get_tasks_response status="401" status_text="Authenticate first"/>"#.to_vec(),
        )]);

        let err = client.request_xml("<get_tasks/>").unwrap_err();

        assert!(err.is_auth_failure(), "got: {err:?}");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn unauthenticated_request_accepted_by_daemon_is_returned() {
        let mut client = client(vec![Step::Data(
            br#"<get_version_response status="200" status_text="OK"><version>22.4</version></get_version_response>"#
                .to_vec(),
        )]);

        let doc = client.request_xml("<get_version/>").unwrap();

        assert_eq!(
            doc.root().child_text("get_version_response/version"),
            Some("22.4")
        );
    }

    #[test]
    fn unauthenticated_request_without_status_is_auth_error() {
        let mut client = client(vec![Step::Data(b"<get_tasks_response/>".to_vec())]);

        let err = client.request_xml("<get_tasks/>").unwrap_err();

        assert!(err.is_auth_failure(), "got: {err:?}");
        assert_eq!(err.status(), Some(401));
    }

    fn logged_in(reply: &[u8]) -> GmpClient<ScriptedSocket> {
        let mut client = client(vec![Step::Data(AUTH_OK.as_bytes().to_vec())]);
        client.login().unwrap();
        client.script(vec![Step::Data(reply.to_vec())]);
        client
    }

    fn assert_parse_failure(err: &Error) {
        match err {
            Error::Response { source, request, .. } => {
                assert!(request.is_some(), "request missing: {err:?}");
                let cause = source.as_ref().unwrap();
                assert!(
                    matches!(cause.downcast_ref::<Error>(), Some(Error::XmlParsing { .. })),
                    "cause: {cause:?}"
                );
            }
            other => panic!("expected Response, got: {other:?}"),
        }
    }

    #[test]
    fn truncated_reply_is_not_an_empty_target_list() {
        let mut client = logged_in(br#"<authenticate_response status="200"/>"#);

        let err = client.target_get_all(&Params::new()).unwrap_err();

        assert_parse_failure(&err);
    }

    #[test]
    fn truncated_reply_is_not_a_missing_task() {
        let mut client = logged_in(br#"<authenticate_response status="200"/>"#);

        let err = client.task_get_byid("t-1").unwrap_err();

        assert_parse_failure(&err);
    }

    #[test]
    fn command_response_without_status_is_parse_failure() {
        let mut client = logged_in(
            br#"<authenticate_response status="200"/><get_tasks_response><task id="t-1"/></get_tasks_response>"#,
        );

        let err = client.task_get_all(&Params::new()).unwrap_err();

        assert_parse_failure(&err);
    }

    #[test]
    fn command_response_with_invalid_status_is_parse_failure() {
        let mut client = logged_in(
            br#"<authenticate_response status="200"/><get_targets_response status="ok"/>"#,
        );

        let err = client.target_get_all(&Params::new()).unwrap_err();

        assert_parse_failure(&err);
    }

    #[test]
    fn rejected_command_status_becomes_response_error() {
        let mut client = client(vec![Step::Data(AUTH_OK.as_bytes().to_vec())]);
        client.login().unwrap();
        client.script(vec![Step::Data(
            br#"<authenticate_response status="200"/><create_target_response status="400" status_text="Target exists already"/>"#
                .to_vec(),
        )]);

        let err = client
            .command(&Element::new("create_target"))
            .unwrap_err();

        match err {
            Error::Response {
                message,
                request,
                status,
                ..
            } => {
                assert!(message.contains("Target exists already"), "{message}");
                assert_eq!(request.as_deref(), Some("<create_target/>"));
                assert_eq!(status, Some(400));
            }
            other => panic!("expected Response, got: {other:?}"),
        }
    }
}
