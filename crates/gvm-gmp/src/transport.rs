// Unix socket transport with timeout-bounded framing.
//
// GMP has no length prefix or terminator, so a response is considered
// complete when a read comes back short or the socket stays silent for the
// read timeout. The `Socket` trait is the seam tests use to script reads.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::Error;

/// Default gvmd socket location.
pub const DEFAULT_SOCKET_PATH: &str = "/run/gvmd/gvmd.sock";

/// Default receive buffer size in bytes.
pub const DEFAULT_BUFSIZE: usize = 16384;

/// Default per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);

/// A blocking byte stream the transport can drive.
pub trait Socket: Read + Write {
    /// Open a stream to the given socket path.
    fn open(path: &Path) -> io::Result<Self>
    where
        Self: Sized;

    /// Set the timeout for subsequent reads.
    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()>;
}

impl Socket for UnixStream {
    fn open(path: &Path) -> io::Result<Self> {
        UnixStream::connect(path)
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        UnixStream::set_read_timeout(self, dur)
    }
}

/// Socket location and framing parameters.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub path: PathBuf,
    pub read_timeout: Duration,
    pub bufsize: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SOCKET_PATH),
            read_timeout: DEFAULT_READ_TIMEOUT,
            bufsize: DEFAULT_BUFSIZE,
        }
    }
}

/// Exclusive owner of one connection to gvmd.
///
/// The stream is opened lazily on the first exchange unless
/// [`connect`](Self::connect) was called first.
///
/// Known limitation: a response whose length is an exact multiple of
/// `bufsize` ends on a full read, so the drain loop waits one extra
/// `read_timeout` before it concludes the message is complete.
pub struct Transport<S: Socket = UnixStream> {
    config: TransportConfig,
    stream: Option<S>,
}

impl<S: Socket> Transport<S> {
    /// Create a transport that has not connected yet.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Create a transport around an already-open stream.
    pub fn with_stream(config: TransportConfig, stream: S) -> Self {
        Self {
            config,
            stream: Some(stream),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the socket, replacing any existing stream.
    pub fn connect(&mut self) -> Result<(), Error> {
        debug!(path = %self.config.path.display(), "connecting to gvmd");
        let stream = S::open(&self.config.path).map_err(|source| Error::Connection {
            path: self.config.path.clone(),
            source,
        })?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Drop the stream. The next exchange reconnects.
    pub fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            debug!("disconnected from gvmd");
        }
    }

    /// Write `request` and drain the response.
    pub fn send_and_receive(&mut self, request: &[u8]) -> Result<Vec<u8>, Error> {
        if self.stream.is_none() {
            self.connect()?;
        }
        let bufsize = self.config.bufsize.max(1);
        let read_timeout = self.config.read_timeout;
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::response("connection not open"));
        };

        write_request(stream, request)?;

        stream
            .set_read_timeout(Some(read_timeout))
            .map_err(|e| io_failure("failed to set read timeout", e))?;

        drain(stream, bufsize)
    }
}

#[cfg(test)]
impl<S: Socket> Transport<S> {
    pub(crate) fn stream_ref(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    pub(crate) fn stream_mut(&mut self) -> Option<&mut S> {
        self.stream.as_mut()
    }
}

fn write_request<S: Socket>(stream: &mut S, request: &[u8]) -> Result<(), Error> {
    stream
        .write_all(request)
        .and_then(|()| stream.write_all(b"\n"))
        .and_then(|()| stream.flush())
        .map_err(|e| io_failure("failed to send request", e))
}

/// Read until a short read or a timeout. End of stream is an error: a
/// response is always expected.
fn drain<S: Socket>(stream: &mut S, bufsize: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; bufsize];
    let mut response = Vec::new();

    loop {
        match stream.read(&mut buf) {
            Ok(0) => {
                return Err(Error::response("connection closed by gvmd during read"));
            }
            Ok(n) => {
                trace!(bytes = n, "read chunk");
                response.extend_from_slice(&buf[..n]);
                if n < bufsize {
                    break;
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                trace!("read timed out, response complete");
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(io_failure("failed to read response", e)),
        }
    }

    Ok(response)
}

fn io_failure(message: &str, err: io::Error) -> Error {
    Error::Response {
        message: message.into(),
        request: None,
        status: None,
        source: Some(Box::new(err)),
    }
}


#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::mock::{ScriptedSocket, Step};
    use super::*;

    fn config(bufsize: usize) -> TransportConfig {
        TransportConfig {
            bufsize,
            ..TransportConfig::default()
        }
    }

    #[test]
    fn full_buffer_then_timeout_yields_exact_bytes() {
        let chunk = b"<get_version_response/>".to_vec();
        let socket = ScriptedSocket::new([Step::Data(chunk.clone()), Step::Timeout]);
        let mut transport = Transport::with_stream(config(chunk.len()), socket);

        let response = transport.send_and_receive(b"<get_version/>").unwrap();

        assert_eq!(response, chunk);
        assert_eq!(transport.stream.as_ref().unwrap().reads, 2);
    }

    #[test]
    fn short_read_stops_after_one_read() {
        let socket = ScriptedSocket::new([
            Step::Data(b"<ok/>".to_vec()),
            Step::Data(b"never read".to_vec()),
        ]);
        let mut transport = Transport::with_stream(config(64), socket);

        let response = transport.send_and_receive(b"<help/>").unwrap();

        assert_eq!(response, b"<ok/>");
        assert_eq!(transport.stream.as_ref().unwrap().reads, 1);
    }

    #[test]
    fn multi_chunk_response_is_concatenated() {
        let socket = ScriptedSocket::new([
            Step::Data(b"abcd".to_vec()),
            Step::Data(b"efgh".to_vec()),
            Step::Data(b"ij".to_vec()),
        ]);
        let mut transport = Transport::with_stream(config(4), socket);

        let response = transport.send_and_receive(b"<x/>").unwrap();

        assert_eq!(response, b"abcdefghij");
        assert_eq!(transport.stream.as_ref().unwrap().reads, 3);
    }

    #[test]
    fn immediate_timeout_yields_empty_response() {
        let socket = ScriptedSocket::new([Step::Timeout]);
        let mut transport = Transport::with_stream(config(16), socket);

        let response = transport.send_and_receive(b"<x/>").unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn end_of_stream_is_a_response_error() {
        let socket = ScriptedSocket::new([Step::Data(b"abcd".to_vec()), Step::Eof]);
        let mut transport = Transport::with_stream(config(4), socket);

        let err = transport.send_and_receive(b"<x/>").unwrap_err();
        assert!(matches!(err, Error::Response { .. }), "got: {err:?}");
    }

    #[test]
    fn request_is_written_with_trailing_newline() {
        let socket = ScriptedSocket::new([Step::Data(b"<ok/>".to_vec())]);
        let mut transport = Transport::with_stream(config(64), socket);

        transport.send_and_receive(b"<get_version/>").unwrap();

        assert_eq!(
            transport.stream.as_ref().unwrap().written,
            b"<get_version/>\n"
        );
    }

    #[test]
    fn lazy_connect_failure_is_a_connection_error() {
        let mut transport: Transport<ScriptedSocket> = Transport::new(TransportConfig {
            path: PathBuf::from("/nonexistent/gvmd.sock"),
            ..TransportConfig::default()
        });

        let err = transport.send_and_receive(b"<x/>").unwrap_err();
        match err {
            Error::Connection { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/gvmd.sock"));
            }
            other => panic!("expected Connection error, got: {other:?}"),
        }
        assert!(!transport.is_connected());
    }

    #[test]
    fn disconnect_drops_the_stream() {
        let socket = ScriptedSocket::new([]);
        let mut transport = Transport::with_stream(config(16), socket);
        assert!(transport.is_connected());

        transport.disconnect();
        assert!(!transport.is_connected());
    }
}
