//! Line-delimited JSON framing for the duplex link.
//!
//! Inbound: splits the byte stream on `\n` and yields each complete
//! line as a `String` (terminator stripped, CRLF tolerated). Parsing
//! into [`crate::protocol::ServerMessage`] happens above the codec so
//! that one malformed line costs one message, not the connection.
//!
//! Outbound: serializes a [`ClientMessage`] as one JSON object plus a
//! terminating `\n`.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::CavisError;
use crate::protocol::ClientMessage;

/// Longest wire line the decoder will buffer before giving up.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Framed codec for the CAVIS wire protocol.
#[derive(Debug)]
pub struct WireCodec {
    max_line: usize,
}

impl WireCodec {
    pub fn new() -> Self {
        Self {
            max_line: MAX_LINE_BYTES,
        }
    }

    /// Override the line limit (tests, constrained deployments).
    pub fn with_max_line(max_line: usize) -> Self {
        Self { max_line }
    }
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for WireCodec {
    type Item = String;
    type Error = CavisError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(pos) = src.iter().position(|&b| b == b'\n') else {
            if src.len() > self.max_line {
                return Err(CavisError::LineTooLong {
                    size: src.len(),
                    max: self.max_line,
                });
            }
            return Ok(None);
        };

        if pos > self.max_line {
            return Err(CavisError::LineTooLong {
                size: pos,
                max: self.max_line,
            });
        }

        let mut line = src.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        let text = String::from_utf8(line.to_vec())
            .map_err(|e| CavisError::MalformedMessage(e.to_string()))?;
        Ok(Some(text))
    }
}

impl Encoder<ClientMessage> for WireCodec {
    type Error = CavisError;

    fn encode(&mut self, item: ClientMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json =
            serde_json::to_vec(&item).map_err(|e| CavisError::MalformedMessage(e.to_string()))?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut WireCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn splits_complete_lines() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"finish\"}\n{\"type\":\"setup\",\"n\":4}\n"[..]);
        let lines = decode_all(&mut codec, &mut buf);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"type":"finish"}"#);
        assert_eq!(lines[1], r#"{"type":"setup","n":4}"#);
        assert!(buf.is_empty());
    }

    #[test]
    fn holds_partial_line() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"fin"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"ish\"}\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), r#"{"type":"finish"}"#);
    }

    #[test]
    fn strips_crlf() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"finish\"}\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), r#"{"type":"finish"}"#);
    }

    #[test]
    fn oversize_line_is_an_error() {
        let mut codec = WireCodec::with_max_line(16);
        let mut buf = BytesMut::from(vec![b'x'; 64].as_slice());
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CavisError::LineTooLong { .. })
        ));
    }

    #[test]
    fn encodes_newline_terminated_json() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(ClientMessage::Stop, &mut buf).unwrap();
        assert_eq!(&buf[..], b"{\"type\":\"stop\"}\n");
    }
}
