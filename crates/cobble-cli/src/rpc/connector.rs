//! Byte-stream establishment for RPC proxies.

use std::io;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, BufReader};
use tokio::net::UnixStream;

/// Reliable ordered byte stream split into its two halves.
pub(crate) struct Connection {
    pub(crate) reader: Box<dyn AsyncBufRead + Send + Unpin>,
    pub(crate) writer: Box<dyn AsyncWrite + Send + Unpin>,
}

impl Connection {
    pub(crate) fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            reader: Box::new(BufReader::new(reader)),
            writer: Box::new(writer),
        }
    }
}

/// Opens connections to one logical peer.
#[async_trait]
pub(crate) trait Connector: Send + Sync {
    /// Human-readable peer description used in diagnostics.
    fn describe(&self) -> String;

    async fn connect(&self) -> io::Result<Connection>;
}

/// Connects to a Unix domain socket.
#[derive(Debug, Clone)]
pub(crate) struct UnixConnector {
    label: String,
    path: Utf8PathBuf,
}

impl UnixConnector {
    pub(crate) fn new(label: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl Connector for UnixConnector {
    fn describe(&self) -> String {
        format!("{} ({})", self.label, self.path)
    }

    async fn connect(&self) -> io::Result<Connection> {
        let stream = UnixStream::connect(self.path.as_std_path()).await?;
        let (reader, writer) = stream.into_split();
        Ok(Connection::new(reader, writer))
    }
}
