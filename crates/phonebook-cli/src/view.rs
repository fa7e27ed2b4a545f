//! Console input and output for the menu loop.
//!
//! The controller only talks to the [`View`] trait, so tests can script a
//! session without a terminal.
//!
//! [`ConsoleView`] reads its input on a background thread and waits for the
//! next line on a channel. An [`InterruptHandle`] feeds the same channel, so
//! a Ctrl-C delivered while a prompt is pending ends that prompt with
//! [`ViewError::Interrupted`] instead of killing the process.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use colored::Colorize;
use phonebook_types::Contact;
use thiserror::Error;
use tracing::{debug, warn};

/// Shown by [`View::show_contacts`] when there is nothing to list.
pub const EMPTY_DIRECTORY: &str = "The directory is empty.";

#[derive(Debug, Error)]
pub enum ViewError {
    /// The user pressed Ctrl-C while a prompt was pending.
    #[error("input interrupted")]
    Interrupted,

    /// The input stream ended; no more lines will arrive.
    #[error("input closed")]
    Closed,

    #[error("console error: {0}")]
    Io(#[from] io::Error),
}

/// User-facing input and output.
pub trait View {
    /// Show `prompt` and block until the user enters one line.
    ///
    /// The returned line has its line terminator removed.
    fn input_text(&mut self, prompt: &str) -> Result<String, ViewError>;

    /// Write one line. An empty `text` writes a blank line.
    fn print_line(&mut self, text: &str);

    /// Print each contact as `[id] name | phone | comment`.
    fn show_contacts(&mut self, contacts: &[Contact]) {
        if contacts.is_empty() {
            self.print_line(EMPTY_DIRECTORY);
            return;
        }
        for contact in contacts {
            self.print_line(&contact.to_string());
        }
    }

    fn notify(&mut self, message: &str) {
        self.print_line(message);
    }

    fn error(&mut self, message: &str);
}

/// What the console input channel carries.
#[derive(Debug)]
enum InputEvent {
    Line(String),
    Interrupted,
    Closed,
    Failed(io::Error),
}

/// Delivers interrupts to a [`ConsoleView`] from another thread.
#[derive(Clone, Debug)]
pub struct InterruptHandle {
    events: Sender<InputEvent>,
}

impl InterruptHandle {
    /// Cancel the pending prompt, or the next one if none is pending.
    ///
    /// Returns `false` once the view is gone.
    pub fn interrupt(&self) -> bool {
        self.events.send(InputEvent::Interrupted).is_ok()
    }
}

/// A [`View`] over a line reader and a writer, normally stdin and stdout.
pub struct ConsoleView<W> {
    events: Receiver<InputEvent>,
    interrupts: InterruptHandle,
    closed: bool,
    output: W,
}

impl<W: Write> ConsoleView<W> {
    /// Start reading `input` on a background thread.
    pub fn spawn<R>(input: R, output: W) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, events) = mpsc::channel();
        let reader = tx.clone();
        thread::Builder::new()
            .name("console-input".into())
            .spawn(move || read_lines(input, reader))?;
        Ok(Self {
            events,
            interrupts: InterruptHandle { events: tx },
            closed: false,
            output,
        })
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupts.clone()
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.output, "{line}") {
            warn!(error = %e, "failed to write to console");
        }
    }
}

/// Forward lines from `input` until it ends, fails, or the view is dropped.
fn read_lines<R: BufRead>(mut input: R, events: Sender<InputEvent>) {
    loop {
        let mut line = String::new();
        let event = match input.read_line(&mut line) {
            Ok(0) => InputEvent::Closed,
            Ok(_) => InputEvent::Line(line),
            Err(e) => InputEvent::Failed(e),
        };
        let last = !matches!(event, InputEvent::Line(_));
        if events.send(event).is_err() || last {
            debug!("console reader stopped");
            return;
        }
    }
}

impl<W: Write> View for ConsoleView<W> {
    fn input_text(&mut self, prompt: &str) -> Result<String, ViewError> {
        if self.closed {
            return Err(ViewError::Closed);
        }
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        // The view holds a sender itself, so `recv` only fails if that
        // invariant is broken; treat it like a closed stream.
        match self.events.recv() {
            Ok(InputEvent::Line(mut line)) => {
                let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed_len);
                Ok(line)
            }
            Ok(InputEvent::Interrupted) => {
                self.write_line("");
                Err(ViewError::Interrupted)
            }
            Ok(InputEvent::Failed(e)) => {
                self.closed = true;
                Err(e.into())
            }
            Ok(InputEvent::Closed) | Err(_) => {
                self.closed = true;
                Err(ViewError::Closed)
            }
        }
    }

    fn print_line(&mut self, text: &str) {
        if text.is_empty() {
            self.write_line("");
        } else {
            self.write_line(&text.green().to_string());
        }
    }

    fn error(&mut self, message: &str) {
        self.write_line(&format!("Error: {message}").red().to_string());
    }
}
