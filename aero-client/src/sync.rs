//! Sync bus listener
//!
//! 客户端侧的同步总线连接：TCP 连接服务端，先发握手帧，之后循环读取
//! 服务端广播的帧 (u32 BE 长度 + JSON)。连接断开返回 `Ok(None)`，
//! 是否重连由调用方决定。

use shared::message::{BusMessage, HandshakePayload, MAX_FRAME_LEN, PROTOCOL_VERSION};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{ClientError, ClientResult};

/// A live connection to the vendor server's sync bus
pub struct SyncListener {
    stream: TcpStream,
}

impl SyncListener {
    /// Connect and perform the protocol handshake
    pub async fn connect(addr: &str, client_name: impl Into<String>) -> ClientResult<Self> {
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Sync(format!("connect to {addr} failed: {e}")))?;

        let handshake = BusMessage::handshake(&HandshakePayload {
            version: PROTOCOL_VERSION,
            client_name: Some(client_name.into()),
        })
        .map_err(|e| ClientError::Sync(format!("handshake encode failed: {e}")))?;
        let frame = handshake
            .to_frame()
            .map_err(|e| ClientError::Sync(format!("handshake encode failed: {e}")))?;
        stream
            .write_all(&frame)
            .await
            .map_err(|e| ClientError::Sync(format!("handshake send failed: {e}")))?;
        stream
            .flush()
            .await
            .map_err(|e| ClientError::Sync(format!("handshake flush failed: {e}")))?;

        tracing::info!("sync bus connected: {}", addr);
        Ok(Self { stream })
    }

    /// Read the next broadcast frame
    ///
    /// Returns `Ok(None)` when the server closes the connection.
    pub async fn next_message(&mut self) -> ClientResult<Option<BusMessage>> {
        let mut len_buf = [0u8; 4];
        match self.stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None);
            }
            Err(e) => {
                return Err(ClientError::Sync(format!("read frame length failed: {e}")));
            }
        }

        let len = u32::from_be_bytes(len_buf);
        if len == 0 || len > MAX_FRAME_LEN {
            return Err(ClientError::Sync(format!("invalid frame length: {len}")));
        }

        let mut body = vec![0u8; len as usize];
        self.stream
            .read_exact(&mut body)
            .await
            .map_err(|e| ClientError::Sync(format!("read frame body failed: {e}")))?;

        let msg = BusMessage::from_frame_body(&body)
            .map_err(|e| ClientError::Sync(format!("invalid frame body: {e}")))?;
        Ok(Some(msg))
    }
}
