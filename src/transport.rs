/// Byte channel to a 7941W module.
///
/// The reader assumes exclusive access for the whole request/response cycle;
/// share a transport between callers only behind external locking.
pub trait ReaderTransport {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Write data to the transport
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read data with a timeout in milliseconds.
    /// Returns `Ok(0)` when the timeout elapses without data.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Discard any bytes waiting in the input buffer
    fn clear_input(&mut self) -> Result<(), Self::Error>;

    /// Push out buffered output
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
