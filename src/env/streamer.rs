use crate::error::SimError;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::thread::JoinHandle;

/// Writes JSON lines to a file from a background thread. Can be shared
/// between worker threads; lines appear in the order they were sent.
pub struct Streamer {
    path: PathBuf,
    handle: JoinHandle<std::io::Result<usize>>,
    sender: SyncSender<String>,
}

impl Streamer {
    pub fn new(path: &Path) -> Result<Self, SimError> {
        let mut output = BufWriter::new(File::create(path).map_err(|e| SimError::io(path, e))?);
        let (sender, recv) = sync_channel::<String>(2 * rayon::current_num_threads());
        let handle = std::thread::spawn(move || -> std::io::Result<usize> {
            let mut lines = 0;
            for data in recv.into_iter() {
                writeln!(output, "{}", data)?;
                lines += 1;
            }
            output.flush()?;
            Ok(lines)
        });
        Ok(Self {
            path: path.to_path_buf(),
            handle,
            sender,
        })
    }

    pub fn send<T: Serialize>(&self, value: &T) -> Result<(), SimError> {
        let serialized_value = serde_json::to_string(value)?;
        self.sender.send(serialized_value).map_err(|_| {
            SimError::io(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "writer thread stopped"),
            )
        })
    }

    /// Waits for everything sent to reach the file and returns the number
    /// of lines written.
    pub fn join(self) -> Result<usize, SimError> {
        drop(self.sender);
        let path = self.path;
        match self.handle.join() {
            Ok(written) => written.map_err(|e| SimError::io(path, e)),
            Err(_) => Err(SimError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::Other, "writer thread panicked"),
            )),
        }
    }
}
