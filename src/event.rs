use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, MouseEvent};

use crate::api::Completion;

pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
    /// The location fragment changed (push, back or forward).
    FragmentChanged,
    /// A service request finished.
    Completed(Completion),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    /// Channel only; no terminal polling. Used by tests and headless runs.
    pub fn channel() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    pub fn new(tick_rate: Duration) -> Self {
        let handler = Self::channel();
        let tx = handler.tx.clone();

        thread::spawn(move || {
            loop {
                let sent = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => tx.send(AppEvent::Key(key)),
                        Ok(Event::Mouse(mouse)) => tx.send(AppEvent::Mouse(mouse)),
                        Ok(Event::Resize(w, h)) => tx.send(AppEvent::Resize(w, h)),
                        _ => Ok(()),
                    }
                } else {
                    tx.send(AppEvent::Tick)
                };
                if sent.is_err() {
                    return;
                }
            }
        });

        handler
    }

    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }

    pub fn try_next(&self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}
