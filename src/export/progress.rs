/// Receives export progress as a whole percentage.
///
/// Values arrive in non-decreasing order and a successful export always ends with 100.
pub trait ProgressObserver {
    /// Called whenever the percentage advances.
    fn on_progress(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressObserver for F {
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

/// Observer that ignores every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: u8) {}
}

/// Upper bound of the frame production phase.
pub const PRODUCE_PHASE_END: u8 = 80;
/// Upper bound of the encoding phase; 100 is reserved for completion.
pub const ENCODE_PHASE_END: u8 = 99;

/// Maps phase-local counts onto the shared 0..=100 scale and suppresses repeats.
pub(crate) struct ProgressTracker<'a> {
    observer: &'a mut dyn ProgressObserver,
    last: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(observer: &'a mut dyn ProgressObserver) -> Self {
        Self {
            observer,
            last: None,
        }
    }

    /// `done` of `total` frames produced, mapped to 0..=80.
    pub(crate) fn produced(&mut self, done: usize, total: usize) {
        self.report(scaled(0, PRODUCE_PHASE_END, done, total));
    }

    /// `done` of `total` frames encoded, mapped to 80..=99.
    pub(crate) fn encoded(&mut self, done: usize, total: usize) {
        self.report(scaled(PRODUCE_PHASE_END, ENCODE_PHASE_END, done, total));
    }

    pub(crate) fn finish(&mut self) {
        self.report(100);
    }

    fn report(&mut self, percent: u8) {
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        self.observer.on_progress(percent);
    }
}

fn scaled(lo: u8, hi: u8, done: usize, total: usize) -> u8 {
    if total == 0 {
        return hi;
    }
    let done = done.min(total) as u64;
    let span = u64::from(hi - lo);
    lo + (span * done / total as u64) as u8
}
