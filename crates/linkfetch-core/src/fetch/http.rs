//! Network links through a libcurl easy handle.
//!
//! curl pushes body data into a callback, the engine pulls through `Read`. The
//! transfer runs on its own thread and hands chunks over a bounded channel; a
//! full channel stalls the transfer, so a throttled reader slows the socket too.
//! Dropping the stream makes the next send fail, which aborts the transfer.

use curl::easy::Easy;
use std::cell::Cell;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::time::Duration;

use super::{ByteStream, FetchError, Fetcher};
use crate::config::HttpConfig;

/// Chunks buffered between the transfer thread and the reader.
const CHANNEL_DEPTH: usize = 8;

enum Chunk {
    Data(Vec<u8>),
    Done,
    Failed(FetchError),
}

#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    opts: HttpConfig,
}

impl CurlFetcher {
    pub fn new(opts: HttpConfig) -> Self {
        Self { opts }
    }
}

impl Fetcher for CurlFetcher {
    /// Returns once the first body chunk, the end of an empty body, or an error
    /// is known, so connection failures and HTTP errors surface here.
    fn fetch(&self, link: &str) -> Result<ByteStream, FetchError> {
        let (tx, rx) = mpsc::sync_channel(CHANNEL_DEPTH);
        let opts = self.opts.clone();
        let link_owned = link.to_string();
        std::thread::Builder::new()
            .name("linkfetch-curl".to_string())
            .spawn(move || {
                let last = match transfer(&opts, &link_owned, &tx) {
                    Ok(()) => Chunk::Done,
                    Err(e) => Chunk::Failed(e),
                };
                let _ = tx.send(last);
            })?;

        let mut stream = CurlStream {
            rx,
            buf: Vec::new(),
            pos: 0,
            finished: false,
        };
        match stream.rx.recv() {
            Ok(Chunk::Data(data)) => stream.buf = data,
            Ok(Chunk::Done) => stream.finished = true,
            Ok(Chunk::Failed(e)) => return Err(e),
            Err(_) => return Err(FetchError::Disconnected),
        }
        tracing::debug!(link, "transfer started");
        Ok(Box::new(stream))
    }
}

fn configure(easy: &mut Easy, opts: &HttpConfig, link: &str) -> Result<(), curl::Error> {
    easy.url(link)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(Duration::from_secs(opts.connect_timeout_secs))?;
    // Abort if throughput stays below the floor for the whole window.
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(Duration::from_secs(opts.low_speed_time_secs))?;
    easy.timeout(Duration::from_secs(opts.timeout_secs))?;
    easy.useragent(&opts.user_agent)?;
    Ok(())
}

/// Status code from an HTTP status line ("HTTP/1.1 404 Not Found").
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

fn is_error_status(code: u32) -> bool {
    code != 0 && !(200..300).contains(&code)
}

fn transfer(opts: &HttpConfig, link: &str, tx: &SyncSender<Chunk>) -> Result<(), FetchError> {
    let mut easy = Easy::new();
    configure(&mut easy, opts, link)?;

    // Last HTTP status line seen; redirects and 1xx replace it. Stays 0 for FTP.
    let status = Cell::new(0u32);
    let reader_gone = Cell::new(false);
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Some(code) = parse_status_line(line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            if is_error_status(status.get()) {
                return Ok(0);
            }
            if tx.send(Chunk::Data(data.to_vec())).is_err() {
                reader_gone.set(true);
                return Ok(0);
            }
            Ok(data.len())
        })?;
        if let Err(e) = transfer.perform() {
            if e.is_write_error() {
                if is_error_status(status.get()) {
                    return Err(FetchError::Status(status.get()));
                }
                if reader_gone.get() {
                    tracing::debug!(link, "reader dropped, transfer aborted");
                    return Ok(());
                }
            }
            return Err(e.into());
        }
    }

    if is_error_status(status.get()) {
        return Err(FetchError::Status(status.get()));
    }
    Ok(())
}

struct CurlStream {
    rx: Receiver<Chunk>,
    buf: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl Read for CurlStream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.buf.len() {
                let n = out.len().min(self.buf.len() - self.pos);
                out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished || out.is_empty() {
                return Ok(0);
            }
            match self.rx.recv() {
                Ok(Chunk::Data(data)) => {
                    self.buf = data;
                    self.pos = 0;
                }
                Ok(Chunk::Done) => self.finished = true,
                Ok(Chunk::Failed(e)) => {
                    self.finished = true;
                    return Err(io::Error::new(io::ErrorKind::Other, e));
                }
                Err(_) => {
                    self.finished = true;
                    return Err(io::Error::new(io::ErrorKind::Other, FetchError::Disconnected));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_lines() {
        assert_eq!(parse_status_line(b"HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status_line(b"HTTP/2 404\r\n"), Some(404));
        assert_eq!(parse_status_line(b"Content-Length: 5\r\n"), None);
        assert_eq!(parse_status_line(b"220 FTP ready\r\n"), None);
    }

    #[test]
    fn error_status_excludes_success_and_unknown() {
        assert!(!is_error_status(0));
        assert!(!is_error_status(200));
        assert!(!is_error_status(206));
        assert!(is_error_status(301));
        assert!(is_error_status(404));
        assert!(is_error_status(503));
    }

    #[test]
    fn stream_replays_chunks_then_error() {
        let (tx, rx) = mpsc::sync_channel(4);
        tx.send(Chunk::Data(b"abc".to_vec())).unwrap();
        tx.send(Chunk::Data(b"de".to_vec())).unwrap();
        tx.send(Chunk::Failed(FetchError::Status(500))).unwrap();
        let mut stream = CurlStream {
            rx,
            buf: Vec::new(),
            pos: 0,
            finished: false,
        };
        let mut out = [0u8; 2];
        assert_eq!(stream.read(&mut out).unwrap(), 2);
        assert_eq!(&out, b"ab");
        assert_eq!(stream.read(&mut out).unwrap(), 1);
        assert_eq!(stream.read(&mut out).unwrap(), 2);
        assert_eq!(&out, b"de");
        let err = stream.read(&mut out).unwrap_err();
        assert!(err.to_string().contains("HTTP 500"), "{}", err);
        assert_eq!(stream.read(&mut out).unwrap(), 0);
    }
}
