//! The main loop: poll the byte link, reassemble frames, dispatch queued
//! commands to the display engine, and tick the cursor blink.

use display_engine::{DisplayEngine, Reply};
use platform::{ByteLink, Clock, DebugSink, Mailbox};
use transport::{Dispatcher, QueueSelector, Reassembler};

/// Reply bytes for `ECHO`, matching the original firmware's fixed
/// loop-back pattern used to verify the link is alive.
pub const ECHO_REPLY: [u8; 6] = [6, 5, 4, 3, 2, 1];

/// What happened during one [`MainLoop::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainLoopOutcome {
    /// Normal iteration; keep running.
    Continue,
    /// An `ABORT` command was dequeued; the caller should stop the loop.
    ShutdownRequested,
}

/// Owns the reassembler, dispatcher, and display engine, and drives one
/// iteration of poll → dispatch → tick per [`MainLoop::step`] call.
pub struct MainLoop<L, C, M, S> {
    link: L,
    clock: C,
    sink: S,
    reassembler: Reassembler,
    dispatcher: Dispatcher,
    engine: DisplayEngine<M>,
}

impl<L, C, M, S> MainLoop<L, C, M, S>
where
    L: ByteLink,
    C: Clock,
    M: Mailbox,
    S: DebugSink,
{
    /// Assemble a main loop from its collaborators. The engine starts
    /// uninitialized; call [`crate::run_boot`] before the first `step`.
    pub fn new(link: L, clock: C, mailbox: M, sink: S) -> Self {
        Self {
            link,
            clock,
            sink,
            reassembler: Reassembler::new(),
            dispatcher: Dispatcher::new(),
            engine: DisplayEngine::new(mailbox),
        }
    }

    /// The display engine, for boot sequencing or inspection.
    pub fn engine_mut(&mut self) -> &mut DisplayEngine<M> {
        &mut self.engine
    }

    /// The byte link, for injecting bytes and inspecting what was sent.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// The byte link, for injecting bytes and inspecting what was sent.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// The clock, for advancing simulated time in tests.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Drive one iteration: poll for bytes, dispatch every fully-reassembled
    /// command to its queue, then tick the cursor blink.
    pub fn step(&mut self) -> MainLoopOutcome {
        self.reassembler
            .poll(&mut self.link, &mut self.dispatcher, &self.sink);

        while let Some(cmd) = self.dispatcher.dequeue() {
            match cmd.queue {
                QueueSelector::Vga => match self.engine.handle(&cmd, &self.sink) {
                    Ok(Reply::None) => {}
                    Ok(Reply::One(b)) => self.link.send(b),
                    Ok(Reply::Two(a, b)) => self.link.send_all(&[a, b]),
                    Err(_) => {}
                },
                QueueSelector::System => {
                    self.link.send_all(&ECHO_REPLY);
                }
                QueueSelector::Other1 => {}
                QueueSelector::Abort => return MainLoopOutcome::ShutdownRequested,
            }
        }

        self.engine.tick_cursor(&self.clock);
        MainLoopOutcome::Continue
    }
}
