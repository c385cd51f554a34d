use crate::app::AppEvent;
use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

const INPUT_POLL: Duration = Duration::from_millis(200);

/// Single ordered queue of key presses and clock ticks.
pub struct EventQueue {
    rx: Receiver<AppEvent>,
    stop: Arc<AtomicBool>,
}

impl EventQueue {
    pub fn start(tick_interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        spawn_input(tx.clone(), Arc::clone(&stop));
        spawn_ticker(tx, tick_interval, Arc::clone(&stop));
        EventQueue { rx, stop }
    }

    /// Waits up to `timeout` for the next event; `None` means nothing arrived.
    pub fn next(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => bail!("event sources stopped"),
        }
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn spawn_input(tx: Sender<AppEvent>, stop: Arc<AtomicBool>) {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            let ready = match event::poll(INPUT_POLL) {
                Ok(ready) => ready,
                Err(err) => {
                    warn!(error = %err, "terminal poll failed");
                    break;
                }
            };
            if !ready {
                continue;
            }
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(Event::Resize(..)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    warn!(error = %err, "terminal read failed");
                    break;
                }
            };
            if tx.send(forwarded).is_err() {
                break;
            }
        }
    });
}

fn spawn_ticker(tx: Sender<AppEvent>, interval: Duration, stop: Arc<AtomicBool>) {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if stop.load(Ordering::Relaxed) || tx.send(AppEvent::Tick).is_err() {
            break;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_feeds_queue_until_stopped() {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        spawn_ticker(tx, Duration::from_millis(5), Arc::clone(&stop));

        let first = rx.recv_timeout(Duration::from_secs(2)).expect("tick");
        assert_eq!(first, AppEvent::Tick);

        stop.store(true, Ordering::Relaxed);
        while rx.recv_timeout(Duration::from_secs(2)).is_ok() {}
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(20)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn queue_reports_timeout_as_none() {
        let (tx, rx) = mpsc::channel();
        let queue = EventQueue {
            rx,
            stop: Arc::new(AtomicBool::new(false)),
        };
        assert_eq!(queue.next(Duration::from_millis(5)).unwrap(), None);
        tx.send(AppEvent::Resize).unwrap();
        assert_eq!(
            queue.next(Duration::from_millis(5)).unwrap(),
            Some(AppEvent::Resize)
        );
        drop(tx);
        assert!(queue.next(Duration::from_millis(5)).is_err());
    }
}
