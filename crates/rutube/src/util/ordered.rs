use std::collections::BTreeMap;

use tokio::sync::mpsc;

/// Reorders `(sequence, item)` pairs arriving on a channel and yields the
/// items strictly by ascending sequence, starting at 0.
///
/// Out-of-order arrivals are parked in a buffer; `next` awaits the channel
/// whenever the expected sequence has not arrived yet, so the consumer blocks
/// instead of polling. The stream ends when the channel is closed and the
/// buffer holds nothing for the expected sequence.
pub(crate) struct OrderedReceiver<T> {
    buffer: BTreeMap<u64, T>,
    next_seq: u64,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T> OrderedReceiver<T> {
    pub fn new(rx: mpsc::UnboundedReceiver<(u64, T)>) -> Self {
        Self {
            buffer: BTreeMap::new(),
            next_seq: 0,
            rx,
        }
    }

    pub async fn next(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.buffer.remove(&self.next_seq) {
                self.next_seq += 1;
                return Some(item);
            }

            match self.rx.recv().await {
                Some((seq, item)) if seq == self.next_seq => {
                    self.next_seq += 1;
                    return Some(item);
                }
                Some((seq, item)) => {
                    self.buffer.insert(seq, item);
                }
                None => return None,
            }
        }
    }
}
