//! Kernel uevent channel
//!
//! Opens a `NETLINK_KOBJECT_UEVENT` datagram socket subscribed to the kernel's
//! uevent multicast group and no other. The socket is owned by
//! [`UeventSocket`] and closed when it is dropped.
//!
//! # Platform Support
//!
//! - **Linux**: netlink via `nix`
//! - **Other**: opening the channel always fails

use common::{Error, MessageSource, Result};
use protocol::UEVENT_GROUP;

#[cfg(target_os = "linux")]
mod imp {
    use super::*;
    use nix::sys::socket::{
        AddressFamily, MsgFlags, NetlinkAddr, SockFlag, SockProtocol, SockType, bind, recv,
        socket,
    };
    use std::os::fd::{AsRawFd, OwnedFd};
    use tracing::{debug, info};

    /// Bound uevent socket
    #[derive(Debug)]
    pub struct UeventSocket {
        fd: OwnedFd,
    }

    impl UeventSocket {
        /// Open the channel and join the uevent multicast group
        ///
        /// Binding with pid 0 lets the kernel assign the port id. Joining the
        /// group usually requires elevated privilege.
        pub fn open() -> Result<Self> {
            Self::bind_to(0)
        }

        /// Open a socket bound to `pid`; the fd is closed if binding fails
        pub(crate) fn bind_to(pid: u32) -> Result<Self> {
            let fd = socket(
                AddressFamily::Netlink,
                SockType::Datagram,
                SockFlag::SOCK_CLOEXEC,
                SockProtocol::NetlinkKObjectUEvent,
            )
            .map_err(|e| Error::ChannelOpen(e.into()))?;
            debug!("Created uevent socket (fd={})", fd.as_raw_fd());

            bind(fd.as_raw_fd(), &NetlinkAddr::new(pid, UEVENT_GROUP)).map_err(|e| {
                Error::ChannelBind {
                    groups: UEVENT_GROUP,
                    source: e.into(),
                }
            })?;
            info!("Bound uevent socket to multicast group {:#x}", UEVENT_GROUP);

            Ok(Self { fd })
        }

        pub fn groups(&self) -> u32 {
            UEVENT_GROUP
        }
    }

    impl MessageSource for UeventSocket {
        fn recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
            // Datagrams longer than buf are truncated by the kernel
            let len = recv(self.fd.as_raw_fd(), buf, MsgFlags::empty())
                .map_err(|e| Error::Receive(e.into()))?;
            Ok(Some(len))
        }
    }

    impl Drop for UeventSocket {
        fn drop(&mut self) {
            debug!("Closing uevent socket (fd={})", self.fd.as_raw_fd());
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::*;
    use std::io;

    /// Placeholder; kernel uevents are Linux-only
    #[derive(Debug)]
    pub struct UeventSocket {
        _private: (),
    }

    impl UeventSocket {
        pub fn open() -> Result<Self> {
            Err(Error::ChannelOpen(io::Error::new(
                io::ErrorKind::Unsupported,
                "kernel uevent channel requires Linux",
            )))
        }

        pub fn groups(&self) -> u32 {
            UEVENT_GROUP
        }
    }

    impl MessageSource for UeventSocket {
        fn recv(&mut self, _buf: &mut [u8]) -> Result<Option<usize>> {
            Err(Error::Receive(io::Error::from(io::ErrorKind::Unsupported)))
        }
    }
}

pub use imp::UeventSocket;
