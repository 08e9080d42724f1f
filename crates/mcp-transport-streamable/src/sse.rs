//! The Server-Sent Events wire grammar: one `SseEvent` per JSON-RPC
//! message pushed down a GET stream, encoded as `id:`/`event:`/`data:`
//! lines terminated by a blank line, and decoded the same way on the
//! client side for `Last-Event-ID` based reconnection.

use std::fmt::Write as _;

/// A single SSE frame. `event` is left unset for plain message frames —
/// every MCP push is untyped JSON-RPC, so the `event:` line is only
/// ever used for the reserved `endpoint` handshake frame some clients
/// expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub id: Option<u64>,
    pub event: Option<String>,
    pub data: String,
}

impl SseEvent {
    pub fn message(data: String) -> Self {
        Self { id: None, event: None, data }
    }

    /// Render as wire bytes, including the trailing blank line that
    /// terminates the frame. Multi-line payloads are split across
    /// repeated `data:` lines, per the SSE grammar.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        if let Some(id) = self.id {
            let _ = writeln!(out, "id: {id}");
        }
        if let Some(event) = &self.event {
            let _ = writeln!(out, "event: {event}");
        }
        for line in self.data.split('\n') {
            let _ = writeln!(out, "data: {line}");
        }
        out.push('\n');
        out
    }
}

/// Stateful line-by-line SSE decoder. Feed it bytes as they arrive off
/// the wire; it yields complete events at each blank-line boundary and
/// tracks the last seen `id:` for `Last-Event-ID` bookkeeping.
#[derive(Default)]
pub struct SseDecoder {
    buffer: String,
    pending_id: Option<u64>,
    pending_event: Option<String>,
    pending_data: Vec<String>,
    pub last_event_id: Option<u64>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of UTF-8 text, returning any events completed by it.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line = self.buffer[..newline].trim_end_matches('\r').to_string();
            self.buffer.drain(..=newline);

            if line.is_empty() {
                if let Some(event) = self.finish_pending() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue; // comment / keep-alive ping
            }
            self.apply_field(&line);
        }
        events
    }

    fn apply_field(&mut self, line: &str) {
        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };
        match field {
            "id" => self.pending_id = value.parse().ok(),
            "event" => self.pending_event = Some(value.to_string()),
            "data" => self.pending_data.push(value.to_string()),
            _ => {}
        }
    }

    fn finish_pending(&mut self) -> Option<SseEvent> {
        if self.pending_data.is_empty() && self.pending_id.is_none() && self.pending_event.is_none() {
            return None;
        }
        let event = SseEvent {
            id: self.pending_id.take(),
            event: self.pending_event.take(),
            data: self.pending_data.join("\n"),
        };
        self.pending_data.clear();
        if let Some(id) = event.id {
            self.last_event_id = Some(id);
        }
        Some(event)
    }
}
