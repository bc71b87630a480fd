use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncBufRead;
use tokio_stream::wrappers::SplitStream;
use tracing::{trace, warn};

use crate::tracker::events::TrackerEvent;

use super::transport::DeviceTransport;

/// Device transport reading one notification per line. Works with a terminal, a pipe from a
/// bridge program, or a recorded session.
///
/// ```text
/// 3              orientation code
/// orientation 3  same
/// battery 80
/// disconnect
/// task Review PR
/// job ACME-42
/// ```
pub struct LineTransport<R> {
    lines: SplitStream<R>,
}

impl<R: AsyncBufRead + Unpin> LineTransport<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: SplitStream::new(tokio::io::AsyncBufReadExt::split(reader, b'\n')),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> DeviceTransport for LineTransport<R> {
    async fn next_event(&mut self) -> Result<Option<TrackerEvent>> {
        while let Some(line) = self.lines.next().await {
            let line = match String::from_utf8(line?) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Ignoring input that is not UTF-8: {e}");
                    continue;
                }
            };
            trace!("Received {line:?}");
            match parse_line(&line) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => continue,
                // Noise on the line must not take the tracker down.
                Err(e) => warn!("Ignoring input: {e}"),
            }
        }
        Ok(None)
    }
}

/// `Ok(None)` for blank lines and `#` comments.
pub fn parse_line(line: &str) -> Result<Option<TrackerEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if let Ok(code) = line.parse::<i64>() {
        return Ok(Some(TrackerEvent::Orientation(code)));
    }

    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(command, rest)| (command, rest.trim()))
        .unwrap_or((line, ""));

    let event = match command.to_lowercase().as_str() {
        "orientation" | "face" => TrackerEvent::Orientation(
            rest.parse()
                .map_err(|_| anyhow!("Orientation code expected, got {rest:?}"))?,
        ),
        "battery" => {
            let level = rest
                .trim_end_matches('%')
                .parse::<u8>()
                .ok()
                .filter(|level| *level <= 100)
                .ok_or_else(|| anyhow!("Battery percentage expected, got {rest:?}"))?;
            TrackerEvent::Battery(level)
        }
        "disconnect" | "disconnected" => TrackerEvent::Disconnected,
        "task" => TrackerEvent::Annotate {
            task: Some(rest.to_string()),
            job: None,
        },
        "job" => TrackerEvent::Annotate {
            task: None,
            job: Some(rest.to_string()),
        },
        _ => return Err(anyhow!("Unrecognized line {line:?}")),
    };
    Ok(Some(event))
}
