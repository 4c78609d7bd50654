use std::io::{Read, Write};

/// Deterministic test payload that does not repeat on small power-of-two boundaries.
pub fn pattern(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

fn interrupted() -> std::io::Error {
    std::io::Error::from(std::io::ErrorKind::Interrupted)
}

/// Source yielding at most `cap` bytes per call, optionally interrupting one call.
pub struct CappedReader {
    data: std::io::Cursor<Vec<u8>>,
    cap: usize,
    calls: usize,
    interrupt_call: Option<usize>,
}

impl CappedReader {
    pub fn new(data: Vec<u8>, cap: usize) -> Self {
        Self {
            data: std::io::Cursor::new(data),
            cap,
            calls: 0,
            interrupt_call: None,
        }
    }

    /// Fail the `call`-th read (0-based) with `Interrupted`.
    pub fn interrupt_on(mut self, call: usize) -> Self {
        self.interrupt_call = Some(call);
        self
    }
}

impl Read for CappedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let call = self.calls;
        self.calls += 1;
        if self.interrupt_call == Some(call) {
            return Err(interrupted());
        }
        let len = buf.len().min(self.cap);
        self.data.read(&mut buf[..len])
    }
}

/// Destination accepting at most `cap` bytes per call, optionally interrupting one call.
pub struct CappedWriter {
    pub data: Vec<u8>,
    cap: usize,
    calls: usize,
    interrupt_call: Option<usize>,
}

impl CappedWriter {
    pub fn new(cap: usize) -> Self {
        Self {
            data: Vec::new(),
            cap,
            calls: 0,
            interrupt_call: None,
        }
    }

    /// Fail the `call`-th write (0-based) with `Interrupted`.
    pub fn interrupt_on(mut self, call: usize) -> Self {
        self.interrupt_call = Some(call);
        self
    }
}

impl Write for CappedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let call = self.calls;
        self.calls += 1;
        if self.interrupt_call == Some(call) {
            return Err(interrupted());
        }
        let len = buf.len().min(self.cap);
        self.data.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Source that fails hard once `fail_at` bytes have been handed out.
pub struct FailingReader {
    data: std::io::Cursor<Vec<u8>>,
    fail_at: u64,
}

impl FailingReader {
    pub fn new(data: Vec<u8>, fail_at: usize) -> Self {
        Self {
            data: std::io::Cursor::new(data),
            fail_at: fail_at as u64,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.fail_at.saturating_sub(self.data.position()) as usize;
        if remaining == 0 {
            return Err(std::io::Error::other("injected read failure"));
        }
        let len = buf.len().min(remaining);
        self.data.read(&mut buf[..len])
    }
}

/// Destination that fails hard once it has accepted `fail_at` bytes.
pub struct FailingWriter {
    pub data: Vec<u8>,
    fail_at: usize,
}

impl FailingWriter {
    pub fn new(fail_at: usize) -> Self {
        Self {
            data: Vec::new(),
            fail_at,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let remaining = self.fail_at - self.data.len();
        if remaining == 0 {
            return Err(std::io::Error::other("injected write failure"));
        }
        let len = buf.len().min(remaining);
        self.data.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writes `data` to `name` inside `dir` with the given mode, bypassing the process umask.
pub fn create_source(
    dir: &std::path::Path,
    name: &str,
    data: &[u8],
    mode: u32,
) -> anyhow::Result<std::path::PathBuf> {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, data)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))?;
    Ok(path)
}
