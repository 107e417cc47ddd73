use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::LinkStream;

/// Unix domain socket transport.
///
/// Controller simulators and bench rigs expose the controller's byte stream
/// on a socket path instead of a tty. The bytes on the socket are exactly what
/// the serial line would carry.
pub struct UnixSocketLink;

impl UnixSocketLink {
    /// Maximum socket path length.
    /// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Connect to a listening simulator socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<LinkStream> {
        let path = path.as_ref();
        let path_bytes = path.as_os_str().len();
        if path_bytes >= Self::MAX_PATH_LEN {
            return Err(TransportError::InvalidSetting(format!(
                "socket path too long ({path_bytes} bytes, max {}): {}",
                Self::MAX_PATH_LEN,
                path.display()
            )));
        }

        let stream = UnixStream::connect(path).map_err(|e| TransportError::Open {
            target: path.display().to_string(),
            source: e,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(LinkStream::from_unix(stream))
    }

    /// A connected pair of streams, one for each end of an in-process link.
    pub fn pair() -> Result<(LinkStream, LinkStream)> {
        let (left, right) = UnixStream::pair()?;
        Ok((LinkStream::from_unix(left), LinkStream::from_unix(right)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixListener;

    use super::*;

    #[test]
    fn connect_to_listening_socket() {
        let dir = std::env::temp_dir().join(format!("loadlink-uds-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let sock_path = dir.join("sim.sock");
        let _ = std::fs::remove_file(&sock_path);
        let listener = UnixListener::bind(&sock_path).unwrap();

        let handle = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            server.write_all(b"<AD08100>").unwrap();
        });

        let mut client = UnixSocketLink::connect(&sock_path).unwrap();
        let mut buf = [0u8; 9];
        client.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"<AD08100>");

        handle.join().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn path_too_long_is_rejected() {
        let long_path = "/tmp/".to_string() + &"a".repeat(200) + ".sock";
        let result = UnixSocketLink::connect(&long_path);
        assert!(matches!(result, Err(TransportError::InvalidSetting(_))));
    }
}
