//! Save-on-signal support.
//!
//! Signals are consumed by a dedicated iterator thread that only records
//! requests in atomic flags; the search driver honors them at its
//! single-threaded checkpoint between root moves, where saving the
//! transposition table cannot race the worker pool.

#[cfg(unix)]
pub mod unix {
    use log::info;
    use signal_hook::consts::signal::{SIGHUP, SIGINT};
    use signal_hook::iterator::Signals;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[derive(Clone)]
    pub struct SaveRequests {
        save: Arc<AtomicBool>,
        save_and_exit: Arc<AtomicBool>,
    }

    impl SaveRequests {
        /// Consumes a pending SIGHUP save request.
        pub fn take_save(&self) -> bool {
            self.save.swap(false, Ordering::Relaxed)
        }

        pub fn save_and_exit(&self) -> bool {
            self.save_and_exit.load(Ordering::Relaxed)
        }
    }

    pub fn install() -> SaveRequests {
        let requests = SaveRequests {
            save: Arc::new(AtomicBool::new(false)),
            save_and_exit: Arc::new(AtomicBool::new(false)),
        };
        let mut signals =
            Signals::new([SIGHUP, SIGINT]).expect("cannot install signal handlers");
        let recorded = requests.clone();
        thread::spawn(move || {
            for signal in signals.forever() {
                match signal {
                    SIGHUP => {
                        info!("SIGHUP received, table save requested");
                        recorded.save.store(true, Ordering::Relaxed);
                    }
                    SIGINT => {
                        info!("SIGINT received, will save the table and exit");
                        recorded.save_and_exit.store(true, Ordering::Relaxed);
                    }
                    _ => unreachable!(),
                }
            }
        });
        requests
    }
}

#[cfg(not(unix))]
pub mod unix {
    #[derive(Clone)]
    pub struct SaveRequests;

    impl SaveRequests {
        pub fn take_save(&self) -> bool {
            false
        }

        pub fn save_and_exit(&self) -> bool {
            false
        }
    }

    pub fn install() -> SaveRequests {
        log::info!("save-on-signal not available on this platform");
        SaveRequests
    }
}
