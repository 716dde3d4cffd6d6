use crate::domain::ports::ProgressSink;
use std::io::Write;

pub const SUCCESS_MARK: u8 = b'.';
pub const FAILURE_MARK: u8 = b'F';

/// Prints one `.` per accepted record and one `F` per rejected record,
/// successes first within each batch.
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl ConsoleProgress<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressSink for ConsoleProgress<W> {
    fn batch_delivered(&mut self, sent: usize, failed: usize) {
        let accepted = sent.saturating_sub(failed);
        let mut line = Vec::with_capacity(accepted + failed);
        line.resize(accepted, SUCCESS_MARK);
        line.resize(accepted + failed, FAILURE_MARK);

        // 進度輸出僅供顯示，寫入失敗不影響匯出
        let _ = self.out.write_all(&line);
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn batch_delivered(&mut self, _sent: usize, _failed: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successes_are_printed_before_failures() {
        let mut progress = ConsoleProgress::new(Vec::new());
        progress.batch_delivered(5, 2);
        progress.batch_delivered(2, 0);
        progress.finish();

        assert_eq!(progress.into_inner(), b"...FF..\n".to_vec());
    }

    #[test]
    fn test_more_failures_than_sent_does_not_underflow() {
        let mut progress = ConsoleProgress::new(Vec::new());
        progress.batch_delivered(1, 3);

        assert_eq!(progress.into_inner(), b"FFF".to_vec());
    }
}
