/// Tells the outside world the display should move forward.
///
/// Emitted after the cursor has been advanced; `from` and `to` are
/// transcript indices.
pub trait AdvanceSignal: Send {
    fn advance(&mut self, from: usize, to: usize) -> Result<(), Box<dyn std::error::Error>>;
}

/// Only logs the advance.
pub struct LogAdvanceSignal;

impl AdvanceSignal for LogAdvanceSignal {
    fn advance(&mut self, from: usize, to: usize) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Advance signal: {from} -> {to}");
        Ok(())
    }
}
